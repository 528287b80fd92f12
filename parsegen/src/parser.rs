//! The packed parser and its runtime driver.
//!
//! [`Parser::try_new`] runs the whole construction pipeline — grammar
//! description, meta info, lexer DFA, LALR automaton — and packs the
//! results into dense tables. The parser is immutable afterwards and may be
//! shared across threads; each call to [`Parser::parse`] drives one
//! caller-owned [`Arena`].
//!
//! Scanning is longest-match: the scanner remembers the last accepting
//! state and restarts after the emitted token. Ignored tokens never reach
//! the shift-reduce loop.

use crate::arena::Arena;
use crate::ast::item::{AstItem, Span, TokenValue};
use crate::ast::proxy::ProxyRegistry;
use crate::dfa::{build_lexer_dfa, LexerDfa};
use crate::error::{BuildError, RuntimeError};
use crate::lalr::{build_parser_automaton, Action};
use crate::meta::{MetaInfo, TokenId};

/// One packed action-table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PackedAction {
    Error,
    Shift(u32),
    Reduce(u32),
}

/// A grammar compiled into tables, ready to parse.
pub struct Parser {
    meta: MetaInfo,
    env: Option<ProxyRegistry>,

    term_count: usize,
    var_count: usize,

    dfa: LexerDfa,

    actions: Vec<PackedAction>,
    eof_actions: Vec<PackedAction>,
    /// `gotos[state * var_count + variable]`; -1 means no entry.
    gotos: Vec<i32>,
}

impl Parser {
    /// Builds a parser whose handles construct ASTs through `registry`.
    pub fn try_new(config: &str, registry: ProxyRegistry) -> Result<Parser, BuildError> {
        Parser::build(config, Some(registry))
    }

    /// Builds a recognizer: tables only, every handle bound to the dummy
    /// proxy. Parsing anything that must construct a node fails at run
    /// time.
    pub fn recognizer(config: &str) -> Result<Parser, BuildError> {
        Parser::build(config, None)
    }

    fn build(config: &str, env: Option<ProxyRegistry>) -> Result<Parser, BuildError> {
        let meta = MetaInfo::resolve(config, env.as_ref())?;
        let dfa = build_lexer_dfa(&meta);
        let pda = build_parser_automaton(&meta)?;

        let term_count = meta.term_count();
        let var_count = meta.variables().len();
        let state_count = pda.states.len();

        let mut actions = vec![PackedAction::Error; state_count * term_count];
        let mut eof_actions = vec![PackedAction::Error; state_count];
        let mut gotos = vec![-1i32; state_count * var_count];

        for state in &pda.states {
            for (&token, &action) in &state.actions {
                actions[state.id * term_count + token] = match action {
                    Action::Shift(dest) => PackedAction::Shift(dest as u32),
                    Action::Reduce(prod) => PackedAction::Reduce(prod as u32),
                };
            }
            if let Some(prod) = state.eof_reduce {
                eof_actions[state.id] = PackedAction::Reduce(prod as u32);
            }
            for (&var, &dest) in &state.gotos {
                gotos[state.id * var_count + var] = dest as i32;
            }
        }

        Ok(Parser { meta, env, term_count, var_count, dfa, actions, eof_actions, gotos })
    }

    /// The resolved grammar behind this parser.
    pub fn meta(&self) -> &MetaInfo {
        &self.meta
    }

    /// Longest match starting at `offset`, ignored tokens included.
    fn scan_token(&self, bytes: &[u8], offset: usize) -> Option<TokenValue> {
        let mut state = 0usize;
        let mut best: Option<(usize, TokenId)> = None;

        for (i, &byte) in bytes[offset..].iter().enumerate() {
            let next = self.dfa.step(state, byte);
            if next < 0 {
                break;
            }
            state = next as usize;
            if let Some(token) = self.dfa.accepts[state] {
                best = Some((i + 1, token));
            }
        }

        best.map(|(length, tag)| TokenValue { tag, span: Span::new(offset, length) })
    }

    /// The recognized-token stream of `text`, ignored tokens filtered out.
    pub fn tokens<'p, 't>(&'p self, text: &'t str) -> Tokens<'p, 't> {
        Tokens { parser: self, bytes: text.as_bytes(), offset: 0, done: false }
    }

    /// Parses `text`, materializing the AST in `arena`. On failure the
    /// arena stays valid and may be reused.
    pub fn parse<'a>(&self, arena: &'a Arena, text: &str) -> Result<AstItem<'a>, RuntimeError> {
        let bytes = text.as_bytes();
        let mut ctx = Context { states: Vec::new(), items: Vec::new() };

        let mut offset = 0;
        while offset < bytes.len() {
            let token = self
                .scan_token(bytes, offset)
                .ok_or(RuntimeError::InvalidToken { offset })?;
            offset = token.span.end();

            if token.tag >= self.term_count {
                continue;
            }
            log::trace!("token {} at {:?}", self.meta.tokens()[token.tag].name, token.span);
            self.feed(&mut ctx, arena, Some(token), bytes.len())?;
        }
        self.feed(&mut ctx, arena, None, bytes.len())?;

        match (ctx.states.len(), ctx.items.pop()) {
            (1, Some(item)) => Ok(item),
            _ => Err(RuntimeError::Internal("unbalanced parse stack".into())),
        }
    }

    /// Runs actions until `token` is consumed (or, for eof, until accept).
    fn feed<'a>(
        &self,
        ctx: &mut Context<'a>,
        arena: &'a Arena,
        token: Option<TokenValue>,
        text_len: usize,
    ) -> Result<(), RuntimeError> {
        let offset = token.map(|t| t.span.offset).unwrap_or(text_len);
        let root = self.meta.root_variable().id;

        loop {
            let state = ctx.current_state();
            let action = match token {
                Some(t) => self.actions[state * self.term_count + t.tag],
                None => self.eof_actions[state],
            };

            match action {
                PackedAction::Shift(dest) => {
                    log::trace!("shift to {dest}");
                    let t = token.expect("shift actions exist only in token columns");
                    ctx.push(dest as usize, AstItem::from_token(t));
                    return Ok(());
                }

                PackedAction::Reduce(prod) => {
                    let production = self.meta.production(prod as usize);
                    let count = production.rhs.len();
                    log::trace!(
                        "reduce {} (rhs {count})",
                        self.meta.variables()[production.lhs].name
                    );

                    let item = {
                        let rhs = ctx.top_items(count);
                        production.handle.invoke(self.env.as_ref(), arena, rhs, offset)?
                    };
                    ctx.pop(count);

                    // the root production closing over an emptied stack at
                    // end of input is the accept configuration
                    if token.is_none() && ctx.states.is_empty() && production.lhs == root {
                        ctx.push(0, item);
                        return Ok(());
                    }

                    let goto = self.gotos[ctx.current_state() * self.var_count + production.lhs];
                    if goto < 0 {
                        return Err(RuntimeError::ParseFailure { offset });
                    }
                    ctx.push(goto as usize, item);
                }

                PackedAction::Error => {
                    return Err(RuntimeError::ParseFailure { offset });
                }
            }
        }
    }
}

/// Parallel state and item stacks of one parse.
struct Context<'a> {
    states: Vec<usize>,
    items: Vec<AstItem<'a>>,
}

impl<'a> Context<'a> {
    fn current_state(&self) -> usize {
        self.states.last().copied().unwrap_or(0)
    }

    fn push(&mut self, state: usize, item: AstItem<'a>) {
        self.states.push(state);
        self.items.push(item);
    }

    fn pop(&mut self, count: usize) {
        self.states.truncate(self.states.len() - count);
        self.items.truncate(self.items.len() - count);
    }

    fn top_items(&self, count: usize) -> &[AstItem<'a>] {
        &self.items[self.items.len() - count..]
    }
}

/// Iterator over the recognized tokens of one input.
pub struct Tokens<'p, 't> {
    parser: &'p Parser,
    bytes: &'t [u8],
    offset: usize,
    done: bool,
}

impl<'p, 't> Iterator for Tokens<'p, 't> {
    type Item = Result<TokenValue, RuntimeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done || self.offset >= self.bytes.len() {
                return None;
            }
            match self.parser.scan_token(self.bytes, self.offset) {
                None => {
                    self.done = true;
                    return Some(Err(RuntimeError::InvalidToken { offset: self.offset }));
                }
                Some(token) => {
                    self.offset = token.span.end();
                    if token.tag < self.parser.term_count {
                        return Some(Ok(token));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const SUMS: &str = r#"
        token plus = "\+";
        token num = "[0-9]+";
        ignore ws = "[ \t\r\n]+";
        rule Sum : token
            = num!
            = Sum! plus num
            ;
        rule Total : token
            = Sum!
            ;
    "#;

    #[test]
    fn recognizer_parses_select_only_grammars() {
        init_logger();
        let parser = Parser::recognizer(SUMS).unwrap();
        let arena = Arena::new();
        let item = parser.parse(&arena, "1 + 23 + 4").unwrap();
        // the selected item is the first number, span widened over the rhs
        let token = item.token().unwrap();
        assert_eq!(token.tag, 1);
        assert_eq!(item.span(), Span::new(0, 10));
    }

    #[test]
    fn parse_failure_reports_the_offset() {
        let parser = Parser::recognizer(SUMS).unwrap();
        let arena = Arena::new();

        let err = parser.parse(&arena, "1 +").unwrap_err();
        assert_eq!(err, RuntimeError::ParseFailure { offset: 3 });

        let err = parser.parse(&arena, "+ 1").unwrap_err();
        assert_eq!(err, RuntimeError::ParseFailure { offset: 0 });
    }

    #[test]
    fn invalid_token_reports_the_offset() {
        let parser = Parser::recognizer(SUMS).unwrap();
        let arena = Arena::new();
        let err = parser.parse(&arena, "1 + @").unwrap_err();
        assert_eq!(err, RuntimeError::InvalidToken { offset: 4 });
    }

    #[test]
    fn arena_survives_a_failed_parse() {
        let parser = Parser::recognizer(SUMS).unwrap();
        let arena = Arena::new();
        assert!(parser.parse(&arena, "+").is_err());
        assert!(parser.parse(&arena, "7").is_ok());
    }

    #[test]
    fn token_stream_filters_ignored() {
        let parser = Parser::recognizer(SUMS).unwrap();
        let stream: Vec<TokenValue> =
            parser.tokens("12 +\t3").map(|t| t.unwrap()).collect();
        assert_eq!(stream.len(), 3);
        assert_eq!(stream[0], TokenValue { tag: 1, span: Span::new(0, 2) });
        assert_eq!(stream[1], TokenValue { tag: 0, span: Span::new(3, 1) });
        assert_eq!(stream[2], TokenValue { tag: 1, span: Span::new(5, 1) });
    }

    #[test]
    fn whitespace_spans_never_surface() {
        let parser = Parser::recognizer(
            r#"
            token id = "[a-z]";
            ignore ws = "[ \t\r\n]+";
            rule R : token = id!;
            "#,
        )
        .unwrap();
        let stream: Vec<TokenValue> = parser.tokens("a\n b").map(|t| t.unwrap()).collect();
        assert_eq!(
            stream,
            vec![
                TokenValue { tag: 0, span: Span::new(0, 1) },
                TokenValue { tag: 0, span: Span::new(3, 1) },
            ]
        );
    }

    #[test]
    fn token_stream_stops_at_invalid_input() {
        let parser = Parser::recognizer(SUMS).unwrap();
        let results: Vec<_> = parser.tokens("1@2").collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert_eq!(
            results[1],
            Err(RuntimeError::InvalidToken { offset: 1 })
        );
    }

    #[test]
    fn scanning_is_deterministic() {
        let parser = Parser::recognizer(SUMS).unwrap();
        let first: Vec<_> = parser.tokens("1 + 2 + 3").collect();
        let second: Vec<_> = parser.tokens("1 + 2 + 3").collect();
        assert_eq!(first, second);
    }

    #[test]
    fn tables_are_identical_across_builds() {
        let a = Parser::recognizer(SUMS).unwrap();
        let b = Parser::recognizer(SUMS).unwrap();
        assert_eq!(a.dfa, b.dfa);
        assert_eq!(a.actions, b.actions);
        assert_eq!(a.eof_actions, b.eof_actions);
        assert_eq!(a.gotos, b.gotos);
    }

    #[test]
    fn parser_is_shareable_across_threads() {
        let parser = Parser::recognizer(SUMS).unwrap();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let arena = Arena::new();
                    let item = parser.parse(&arena, "1+2").unwrap();
                    assert_eq!(item.span(), Span::new(0, 3));
                });
            }
        });
    }

    #[test]
    fn empty_input_without_epsilon_root_fails() {
        let parser = Parser::recognizer(SUMS).unwrap();
        let arena = Arena::new();
        let err = parser.parse(&arena, "").unwrap_err();
        assert_eq!(err, RuntimeError::ParseFailure { offset: 0 });
    }
}
