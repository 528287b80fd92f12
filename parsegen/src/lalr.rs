//! Parser-automaton builder: two-stage LALR(1).
//!
//! Stage A builds the LR(0) skeleton by the canonical subset construction:
//! item-set closure, goto, and a worklist over kernels. Stage B derives an
//! *extended grammar* from the skeleton — every `(symbol, target state)`
//! transition becomes an extended symbol — and computes FIRST/FOLLOW sets
//! plus nullability and end-of-input reachability over it by fixpoint.
//! Stage C folds the extended follow sets back onto the LR(0) states as
//! reduce actions; any collision on a `(state, token)` cell or on the
//! end-of-input action is a construction error.
//!
//! # Determinism
//!
//! States are numbered in discovery order from a FIFO worklist that
//! enumerates symbols in id order, so identical grammars produce identical
//! automata.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::io;

use crate::error::BuildError;
use crate::meta::{MetaInfo, ProdId, SymbolRef, TokenId, VarId};

/// Parser state index.
pub type StateId = usize;

/// An LR(0) item: a production and a cursor into its rhs.
///
/// Items order by production id, then cursor, which keeps item sets and
/// everything derived from them canonical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    pub prod: ProdId,
    pub cursor: usize,
}

impl Item {
    /// The symbol right after the cursor, if the item is not final.
    fn next_symbol(&self, meta: &MetaInfo) -> Option<SymbolRef> {
        meta.production(self.prod).rhs.get(self.cursor).copied()
    }

    fn advanced(&self) -> Item {
        Item { prod: self.prod, cursor: self.cursor + 1 }
    }

    fn is_final(&self, meta: &MetaInfo) -> bool {
        self.cursor == meta.production(self.prod).rhs.len()
    }
}

/// An ordered set of items; equality is structural.
pub type ItemSet = BTreeSet<Item>;

/// A shift or reduce entry of the action table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(StateId),
    Reduce(ProdId),
}

/// One state of the automaton, identified by its kernel item set.
#[derive(Debug)]
pub struct ParserState {
    pub id: StateId,
    pub kernel: ItemSet,
    pub actions: BTreeMap<TokenId, Action>,
    pub eof_reduce: Option<ProdId>,
    pub gotos: BTreeMap<VarId, StateId>,
}

/// The finished LALR(1) automaton.
#[derive(Debug)]
pub struct ParserAutomaton {
    pub states: Vec<ParserState>,
}

/// Computes the closure of a kernel: every item of the kernel plus `(p, 0)`
/// for each production of a variable sitting right after a cursor,
/// transitively.
pub fn closure(meta: &MetaInfo, kernel: &ItemSet) -> ItemSet {
    let mut result = kernel.clone();
    let mut queued: BTreeSet<VarId> = BTreeSet::new();
    let mut pending: Vec<VarId> = Vec::new();

    for item in kernel {
        if let Some(SymbolRef::Variable(var)) = item.next_symbol(meta) {
            if queued.insert(var) {
                pending.push(var);
            }
        }
    }

    while let Some(var) = pending.pop() {
        for &prod in &meta.variables()[var].productions {
            let item = Item { prod, cursor: 0 };
            if result.insert(item) {
                if let Some(SymbolRef::Variable(next)) = item.next_symbol(meta) {
                    if queued.insert(next) {
                        pending.push(next);
                    }
                }
            }
        }
    }

    result
}

/// Kernel of the goto target: items of `closure(src)` with `symbol` after
/// the cursor, advanced by one.
pub fn goto_kernel(meta: &MetaInfo, src: &ItemSet, symbol: SymbolRef) -> ItemSet {
    src.iter()
        .filter(|item| item.next_symbol(meta) == Some(symbol))
        .map(Item::advanced)
        .collect()
}

/// Builds the LALR(1) automaton for a resolved grammar.
pub fn build_parser_automaton(meta: &MetaInfo) -> Result<ParserAutomaton, BuildError> {
    let mut builder = Builder::new(meta);
    builder.build_skeleton();
    builder.build_extended_grammar();
    builder.compute_first_sets();
    builder.compute_follow_sets();
    builder.assign_reductions()?;

    log::debug!(
        "parser automaton: {} states, {} extended productions",
        builder.states.len(),
        builder.ext_prods.len()
    );

    Ok(ParserAutomaton { states: builder.states })
}

/// Extended-grammar attributes of one extended nonterminal.
#[derive(Debug, Default, Clone)]
struct ExtNonterm {
    first: BTreeSet<TokenId>,
    follow: BTreeSet<TokenId>,
    nullable: bool,
    /// Whether this occurrence may be the last thing before end of input.
    ends: bool,
}

#[derive(Debug, Clone, Copy)]
enum ExtSym {
    Term(TokenId),
    Nonterm(usize),
}

#[derive(Debug)]
struct ExtProd {
    lhs: usize,
    rhs: Vec<ExtSym>,
    prod: ProdId,
    /// State the parser sits in once the whole rhs has been consumed.
    reduce_state: StateId,
}

struct Builder<'m> {
    meta: &'m MetaInfo,
    states: Vec<ParserState>,
    closures: Vec<ItemSet>,
    /// Extended nonterminals keyed by `(variable, origin state)`; the
    /// augmented root has no origin.
    ext_lookup: BTreeMap<(VarId, Option<StateId>), usize>,
    ext: Vec<ExtNonterm>,
    ext_prods: Vec<ExtProd>,
}

impl<'m> Builder<'m> {
    fn new(meta: &'m MetaInfo) -> Builder<'m> {
        Builder {
            meta,
            states: Vec::new(),
            closures: Vec::new(),
            ext_lookup: BTreeMap::new(),
            ext: Vec::new(),
            ext_prods: Vec::new(),
        }
    }

    fn intern_state(
        &mut self,
        lookup: &mut HashMap<ItemSet, StateId>,
        kernel: ItemSet,
    ) -> (StateId, bool) {
        if let Some(&id) = lookup.get(&kernel) {
            return (id, false);
        }
        let id = self.states.len();
        lookup.insert(kernel.clone(), id);
        self.closures.push(closure(self.meta, &kernel));
        self.states.push(ParserState {
            id,
            kernel,
            actions: BTreeMap::new(),
            eof_reduce: None,
            gotos: BTreeMap::new(),
        });
        (id, true)
    }

    /// Stage A: LR(0) states with shift and goto edges.
    fn build_skeleton(&mut self) {
        let meta = self.meta;
        let initial: ItemSet = meta
            .root_variable()
            .productions
            .iter()
            .map(|&prod| Item { prod, cursor: 0 })
            .collect();

        let symbols: Vec<SymbolRef> = (0..meta.term_count())
            .map(SymbolRef::Token)
            .chain((0..meta.variables().len()).map(SymbolRef::Variable))
            .collect();

        let mut lookup: HashMap<ItemSet, StateId> = HashMap::new();
        let mut worklist: VecDeque<StateId> = VecDeque::new();

        let (start, _) = self.intern_state(&mut lookup, initial);
        worklist.push_back(start);

        while let Some(src) = worklist.pop_front() {
            for &symbol in &symbols {
                let dest_kernel = goto_kernel(meta, &self.closures[src], symbol);
                if dest_kernel.is_empty() {
                    continue;
                }
                let (dest, fresh) = self.intern_state(&mut lookup, dest_kernel);
                if fresh {
                    worklist.push_back(dest);
                }
                match symbol {
                    SymbolRef::Token(token) => {
                        self.states[src].actions.insert(token, Action::Shift(dest));
                    }
                    SymbolRef::Variable(var) => {
                        self.states[src].gotos.insert(var, dest);
                    }
                }
            }
        }
    }

    fn intern_ext(&mut self, key: (VarId, Option<StateId>)) -> usize {
        if let Some(&id) = self.ext_lookup.get(&key) {
            return id;
        }
        let id = self.ext.len();
        self.ext_lookup.insert(key, id);
        self.ext.push(ExtNonterm::default());
        id
    }

    /// Target state of a transition that stage A is known to have recorded.
    fn target_of(&self, state: StateId, symbol: SymbolRef) -> StateId {
        match symbol {
            SymbolRef::Token(token) => match self.states[state].actions[&token] {
                Action::Shift(dest) => dest,
                Action::Reduce(_) => unreachable!("reductions are assigned after stage B"),
            },
            SymbolRef::Variable(var) => self.states[state].gotos[&var],
        }
    }

    /// Stage B, part one: one extended production per cursor-0 closure item
    /// per state, with every symbol occurrence versioned by the state it
    /// transitions into.
    fn build_extended_grammar(&mut self) {
        let meta = self.meta;
        let root = meta.root_variable().id;

        for state in 0..self.states.len() {
            let introduced: Vec<Item> =
                self.closures[state].iter().copied().filter(|item| item.cursor == 0).collect();

            for item in introduced {
                let prod = meta.production(item.prod);

                let lhs_key = if state == 0 && prod.lhs == root {
                    (root, None)
                } else {
                    (prod.lhs, Some(self.target_of(state, SymbolRef::Variable(prod.lhs))))
                };
                let lhs = self.intern_ext(lhs_key);

                let mut rhs = Vec::with_capacity(prod.rhs.len());
                let mut current = state;
                for &symbol in &prod.rhs {
                    let next = self.target_of(current, symbol);
                    rhs.push(match symbol {
                        SymbolRef::Token(token) => ExtSym::Term(token),
                        SymbolRef::Variable(var) => {
                            ExtSym::Nonterm(self.intern_ext((var, Some(next))))
                        }
                    });
                    current = next;
                }

                self.ext_prods.push(ExtProd {
                    lhs,
                    rhs,
                    prod: item.prod,
                    reduce_state: current,
                });
            }
        }

        // the augmented root is the only symbol born adjacent to eof
        let aug_root = self.intern_ext((root, None));
        self.ext[aug_root].ends = true;
    }

    /// Stage B, part two: FIRST sets and nullability to fixpoint.
    fn compute_first_sets(&mut self) {
        let mut growing = true;
        while growing {
            growing = false;
            for ep in &self.ext_prods {
                let mut all_nullable = true;
                for &sym in &ep.rhs {
                    match sym {
                        ExtSym::Term(token) => {
                            if self.ext[ep.lhs].first.insert(token) {
                                growing = true;
                            }
                            all_nullable = false;
                        }
                        ExtSym::Nonterm(n) => {
                            let source = self.ext[n].first.clone();
                            for token in source {
                                if self.ext[ep.lhs].first.insert(token) {
                                    growing = true;
                                }
                            }
                            if !self.ext[n].nullable {
                                all_nullable = false;
                            }
                        }
                    }
                    if !all_nullable {
                        break;
                    }
                }
                if all_nullable && !self.ext[ep.lhs].nullable {
                    self.ext[ep.lhs].nullable = true;
                    growing = true;
                }
            }
        }
    }

    /// Stage B, part three: FOLLOW sets and eof reachability to fixpoint.
    fn compute_follow_sets(&mut self) {
        let mut growing = true;
        while growing {
            growing = false;
            for ep in &self.ext_prods {
                // FIRST of the successor feeds the symbol before it
                for i in 1..ep.rhs.len() {
                    let ExtSym::Nonterm(left) = ep.rhs[i - 1] else { continue };
                    match ep.rhs[i] {
                        ExtSym::Term(token) => {
                            if self.ext[left].follow.insert(token) {
                                growing = true;
                            }
                        }
                        ExtSym::Nonterm(right) => {
                            let source = self.ext[right].first.clone();
                            for token in source {
                                if self.ext[left].follow.insert(token) {
                                    growing = true;
                                }
                            }
                        }
                    }
                }

                // lhs FOLLOW and the eof flag ride down the nullable tail
                for i in (0..ep.rhs.len()).rev() {
                    match ep.rhs[i] {
                        ExtSym::Term(_) => break,
                        ExtSym::Nonterm(var) => {
                            if self.ext[ep.lhs].ends && !self.ext[var].ends {
                                self.ext[var].ends = true;
                                growing = true;
                            }
                            let source = self.ext[ep.lhs].follow.clone();
                            for token in source {
                                if self.ext[var].follow.insert(token) {
                                    growing = true;
                                }
                            }
                            if !self.ext[var].nullable {
                                break;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Stage C: merge follow sets per `(reduce state, production)` and
    /// register reductions, rejecting every collision.
    fn assign_reductions(&mut self) -> Result<(), BuildError> {
        let meta = self.meta;

        let mut merged_ending: BTreeSet<(StateId, ProdId)> = BTreeSet::new();
        let mut merged_follow: BTreeMap<(StateId, ProdId), BTreeSet<TokenId>> = BTreeMap::new();
        for ep in &self.ext_prods {
            let key = (ep.reduce_state, ep.prod);
            if self.ext[ep.lhs].ends {
                merged_ending.insert(key);
            }
            merged_follow.entry(key).or_default().extend(self.ext[ep.lhs].follow.iter().copied());
        }

        for state in 0..self.states.len() {
            let finals: Vec<Item> =
                self.closures[state].iter().copied().filter(|item| item.is_final(meta)).collect();

            for item in finals {
                let key = (state, item.prod);

                if merged_ending.contains(&key) {
                    if let Some(existing) = self.states[state].eof_reduce {
                        return Err(BuildError::Conflict(format!(
                            "state {state} on end of input: reduce {:?} vs reduce {:?}",
                            meta.variables()[meta.production(existing).lhs].name,
                            meta.variables()[meta.production(item.prod).lhs].name,
                        )));
                    }
                    self.states[state].eof_reduce = Some(item.prod);
                }

                if let Some(follow) = merged_follow.get(&key) {
                    for &token in follow {
                        if let Some(&existing) = self.states[state].actions.get(&token) {
                            return Err(BuildError::Conflict(format!(
                                "state {state} on token {:?}: {} vs reduce {:?}",
                                meta.tokens()[token].name,
                                describe_action(meta, existing),
                                meta.variables()[meta.production(item.prod).lhs].name,
                            )));
                        }
                        self.states[state].actions.insert(token, Action::Reduce(item.prod));
                    }
                }
            }
        }

        Ok(())
    }
}

fn describe_action(meta: &MetaInfo, action: Action) -> String {
    match action {
        Action::Shift(state) => format!("shift to state {state}"),
        Action::Reduce(prod) => {
            format!("reduce {:?}", meta.variables()[meta.production(prod).lhs].name)
        }
    }
}

/// Writes one item in `Lhs -> a . B c` form.
fn write_item<W: io::Write>(out: &mut W, meta: &MetaInfo, item: Item) -> io::Result<()> {
    let production = meta.production(item.prod);
    write!(out, "{} ->", meta.variables()[production.lhs].name)?;
    for (i, &symbol) in production.rhs.iter().enumerate() {
        if i == item.cursor {
            write!(out, " .")?;
        }
        write!(out, " {}", meta.symbol_name(symbol))?;
    }
    if item.cursor == production.rhs.len() {
        write!(out, " .")?;
    }
    Ok(())
}

/// Writes every state of the automaton with its closure and edges, for
/// grammar debugging.
pub fn write_automaton<W: io::Write>(
    out: &mut W,
    meta: &MetaInfo,
    pda: &ParserAutomaton,
) -> io::Result<()> {
    writeln!(out, "states: {}", pda.states.len())?;
    for state in &pda.states {
        writeln!(out, "\nstate {}:", state.id)?;
        for item in closure(meta, &state.kernel) {
            write!(out, "    ")?;
            write_item(out, meta, item)?;
            writeln!(out)?;
        }
        for (&token, &action) in &state.actions {
            writeln!(
                out,
                "    on {}: {}",
                meta.tokens()[token].name,
                describe_action(meta, action)
            )?;
        }
        if let Some(prod) = state.eof_reduce {
            writeln!(out, "    on <eof>: {}", describe_action(meta, Action::Reduce(prod)))?;
        }
        for (&var, &dest) in &state.gotos {
            writeln!(out, "    goto {} -> state {}", meta.variables()[var].name, dest)?;
        }
    }
    Ok(())
}
