//! Lexer-automaton builder.
//!
//! All token regexes — recognized and ignored — are compiled into one
//! byte-driven DFA by the position/followpos method. Every regex root acts
//! as the accept marker for its token, with priority equal to declaration
//! order, so a DFA state accepting several tokens resolves to the earliest
//! declared one.
//!
//! The subset construction runs over the 7-bit alphabet. Output is a dense
//! `128 × states` transition table with `-1` for "no edge" plus one accept
//! entry per state.

use std::collections::{BTreeSet, HashMap};

use crate::meta::{MetaInfo, TokenId};
use crate::regex::{ByteRange, RegexExpr, RepetitionMode, RootExpr};

/// Number of input byte values the automaton distinguishes.
pub const ALPHABET: usize = 128;

/// The packed lexical automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerDfa {
    pub state_count: usize,
    /// `transitions[state * ALPHABET + byte]`; -1 means no edge.
    pub transitions: Vec<i32>,
    /// Accept token of each state, if any.
    pub accepts: Vec<Option<TokenId>>,
}

impl LexerDfa {
    /// One scanner step. Bytes outside the 7-bit alphabet are dead.
    pub fn step(&self, state: usize, byte: u8) -> i32 {
        if byte as usize >= ALPHABET {
            return -1;
        }
        self.transitions[state * ALPHABET + byte as usize]
    }
}

/// Position index into the joint regex forest.
type Pos = u32;

enum Position {
    /// A matchable leaf.
    Byte(ByteRange),
    /// The accept marker of one token's root.
    Accept(TokenId),
}

/// Per-node attributes produced by the bottom-up walk.
struct Facts {
    nullable: bool,
    first: BTreeSet<Pos>,
    last: BTreeSet<Pos>,
}

#[derive(Default)]
struct Forest {
    positions: Vec<Position>,
    follow: Vec<BTreeSet<Pos>>,
}

impl Forest {
    fn add(&mut self, position: Position) -> Pos {
        self.positions.push(position);
        self.follow.push(BTreeSet::new());
        (self.positions.len() - 1) as Pos
    }

    /// Evaluates one token's tree and returns its root firstpos; the accept
    /// marker is linked behind every terminal position of the tree.
    fn eval_root(&mut self, root: &RootExpr, token: TokenId) -> BTreeSet<Pos> {
        let child = self.eval(&root.expr);
        let marker = self.add(Position::Accept(token));
        for &pos in &child.last {
            self.follow[pos as usize].insert(marker);
        }
        child.first
    }

    fn eval(&mut self, expr: &RegexExpr) -> Facts {
        match expr {
            RegexExpr::Entity(range) => {
                let pos = self.add(Position::Byte(*range));
                Facts {
                    nullable: false,
                    first: BTreeSet::from([pos]),
                    last: BTreeSet::from([pos]),
                }
            }

            RegexExpr::Sequence(children) => {
                let facts: Vec<Facts> = children.iter().map(|c| self.eval(c)).collect();

                // adjacent children: lastpos feeds the successor's firstpos
                for pair in facts.windows(2) {
                    for &pos in &pair[0].last {
                        self.follow[pos as usize].extend(pair[1].first.iter().copied());
                    }
                }

                let nullable = facts.iter().all(|f| f.nullable);

                let mut first = BTreeSet::new();
                for f in &facts {
                    first.extend(f.first.iter().copied());
                    if !f.nullable {
                        break;
                    }
                }
                let mut last = BTreeSet::new();
                for f in facts.iter().rev() {
                    last.extend(f.last.iter().copied());
                    if !f.nullable {
                        break;
                    }
                }

                Facts { nullable, first, last }
            }

            RegexExpr::Choice(children) => {
                let mut nullable = false;
                let mut first = BTreeSet::new();
                let mut last = BTreeSet::new();
                for child in children {
                    let f = self.eval(child);
                    nullable |= f.nullable;
                    first.extend(f.first.iter().copied());
                    last.extend(f.last.iter().copied());
                }
                Facts { nullable, first, last }
            }

            RegexExpr::Closure(child, mode) => {
                let f = self.eval(child);
                // anything that can repeat loops back to its own start
                if *mode != RepetitionMode::Optional {
                    for &pos in &f.last {
                        self.follow[pos as usize].extend(f.first.iter().copied());
                    }
                }
                let nullable = match mode {
                    RepetitionMode::Optional | RepetitionMode::Star => true,
                    RepetitionMode::Plus => f.nullable,
                };
                Facts { nullable, first: f.first, last: f.last }
            }
        }
    }
}

/// Builds the joint DFA for every token of the grammar.
pub fn build_lexer_dfa(meta: &MetaInfo) -> LexerDfa {
    let mut forest = Forest::default();

    let mut initial = BTreeSet::new();
    for token in meta.tokens() {
        initial.extend(forest.eval_root(&token.regex, token.id));
    }

    let mut sets: Vec<BTreeSet<Pos>> = vec![initial.clone()];
    let mut lookup: HashMap<BTreeSet<Pos>, usize> = HashMap::from([(initial, 0)]);
    let mut transitions: Vec<i32> = vec![-1; ALPHABET];
    let mut accepts: Vec<Option<TokenId>> = vec![accept_of(&forest, &sets[0])];

    let mut state = 0;
    while state < sets.len() {
        let src = sets[state].clone();
        for byte in 0..ALPHABET as u8 {
            let mut target: BTreeSet<Pos> = BTreeSet::new();
            for &pos in &src {
                if let Position::Byte(range) = &forest.positions[pos as usize] {
                    if range.contains(byte) {
                        target.extend(forest.follow[pos as usize].iter().copied());
                    }
                }
            }
            if target.is_empty() {
                continue;
            }

            let dest = match lookup.get(&target) {
                Some(&id) => id,
                None => {
                    let id = sets.len();
                    lookup.insert(target.clone(), id);
                    accepts.push(accept_of(&forest, &target));
                    sets.push(target);
                    transitions.extend(std::iter::repeat(-1).take(ALPHABET));
                    id
                }
            };
            transitions[state * ALPHABET + byte as usize] = dest as i32;
        }
        state += 1;
    }

    log::debug!("lexer dfa: {} states over {} positions", sets.len(), forest.positions.len());

    LexerDfa { state_count: sets.len(), transitions, accepts }
}

/// Minimum-priority accept marker contained in a position set.
fn accept_of(forest: &Forest, set: &BTreeSet<Pos>) -> Option<TokenId> {
    set.iter()
        .filter_map(|&pos| match forest.positions[pos as usize] {
            Position::Accept(token) => Some(token),
            Position::Byte(_) => None,
        })
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::MetaInfo;

    fn build(grammar: &str) -> LexerDfa {
        let meta = MetaInfo::resolve(grammar, None).unwrap();
        build_lexer_dfa(&meta)
    }

    /// Longest-match simulation: (matched length, token).
    fn longest(dfa: &LexerDfa, input: &str) -> Option<(usize, TokenId)> {
        let mut state = 0i32;
        let mut best = None;
        for (i, &b) in input.as_bytes().iter().enumerate() {
            state = dfa.step(state as usize, b);
            if state < 0 {
                break;
            }
            if let Some(token) = dfa.accepts[state as usize] {
                best = Some((i + 1, token));
            }
        }
        best
    }

    const KEYWORDS: &str = r#"
        token kw_if = "if";
        token id = "[a-z]+";
        ignore ws = "[ \t\r\n]+";
        rule R : token = kw_if!;
    "#;

    #[test]
    fn declaration_order_breaks_ties() {
        let dfa = build(KEYWORDS);
        assert_eq!(longest(&dfa, "if"), Some((2, 0)));
        assert_eq!(longest(&dfa, "i"), Some((1, 1)));
    }

    #[test]
    fn longest_match_wins() {
        let dfa = build(KEYWORDS);
        assert_eq!(longest(&dfa, "iffy"), Some((4, 1)));
        assert_eq!(longest(&dfa, "if "), Some((2, 0)));
    }

    #[test]
    fn ignored_tokens_accept_with_their_own_id() {
        let dfa = build(KEYWORDS);
        assert_eq!(longest(&dfa, " \t x"), Some((3, 2)));
    }

    #[test]
    fn dead_input_has_no_match() {
        let dfa = build(KEYWORDS);
        assert_eq!(longest(&dfa, "9"), None);
        assert_eq!(longest(&dfa, "é"), None);
    }

    #[test]
    fn closures_loop() {
        let dfa = build(r#"
            token num = "[0-9]+";
            token float = "[0-9]+\.[0-9]+";
            rule R : token = num!;
        "#);
        assert_eq!(longest(&dfa, "123"), Some((3, 0)));
        assert_eq!(longest(&dfa, "12.5"), Some((4, 1)));
        assert_eq!(longest(&dfa, "12."), Some((2, 0)));
    }

    #[test]
    fn initial_state_never_accepts() {
        let dfa = build(KEYWORDS);
        assert_eq!(dfa.accepts[0], None);
    }

    #[test]
    fn construction_is_deterministic() {
        let a = build(KEYWORDS);
        let b = build(KEYWORDS);
        assert_eq!(a, b);
    }
}
