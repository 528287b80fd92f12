//! Meta-info resolver: from a configuration record to typed tables.
//!
//! [`MetaInfo`] owns everything the automata builders and the runtime
//! driver need: the type table, the symbol tables (tokens with their parsed
//! regex trees, variables), and the production list with one AST handle per
//! production. Resolution runs in fixed phases:
//!
//! 1. register types (the predefined `token` type first);
//! 2. resolve class parents and member specs;
//! 3. register symbols — recognized tokens, ignored tokens, variables; the
//!    last declared variable is the root;
//! 4. parse every token's regex literal;
//! 5. compile productions and synthesize their handles.
//!
//! Symbols and productions live in dense vectors and refer to each other by
//! integer id, so no reference cycles arise.

use indexmap::IndexMap;
use smartstring::alias::String;

use crate::ast::handle::{AstHandle, Generator, Mutator, ProxySlot};
use crate::ast::proxy::ProxyRegistry;
use crate::config::{self, GrammarConfig, RuleAlt, RuleMark};
use crate::error::BuildError;
use crate::regex::{parse_regex, RootExpr};

pub use crate::ast::item::TokenId;

/// Nonterminal index.
pub type VarId = usize;
/// Production index.
pub type ProdId = usize;
/// Index into the type table.
pub type TypeId = usize;

/// Member qualifier of a type spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    None,
    Vector,
    Optional,
}

/// A resolved `(qualifier, type)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSpec {
    pub qual: Qualifier,
    pub ty: TypeId,
}

impl TypeSpec {
    pub fn is_vector(&self) -> bool {
        self.qual == Qualifier::Vector
    }

    pub fn is_optional(&self) -> bool {
        self.qual == Qualifier::Optional
    }
}

/// A member of a class type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDef {
    pub name: String,
    pub spec: TypeSpec,
}

/// One entry of the type table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
    /// The built-in token type.
    Token,
    Enum { name: String, values: Vec<String> },
    Base { name: String },
    Class { name: String, base: Option<TypeId>, members: Vec<MemberDef> },
}

impl TypeDef {
    pub fn name(&self) -> &str {
        match self {
            TypeDef::Token => "token",
            TypeDef::Enum { name, .. } => name,
            TypeDef::Base { name } => name,
            TypeDef::Class { name, .. } => name,
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, TypeDef::Enum { .. })
    }

    pub fn is_base(&self) -> bool {
        matches!(self, TypeDef::Base { .. })
    }

    pub fn is_class(&self) -> bool {
        matches!(self, TypeDef::Class { .. })
    }
}

/// A terminal symbol and its parsed regex.
#[derive(Debug)]
pub struct TokenInfo {
    pub id: TokenId,
    pub name: String,
    pub regex: RootExpr,
}

/// A nonterminal symbol.
#[derive(Debug)]
pub struct VariableInfo {
    pub id: VarId,
    pub name: String,
    pub spec: TypeSpec,
    pub productions: Vec<ProdId>,
}

/// Reference to a declared symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SymbolRef {
    Token(TokenId),
    Variable(VarId),
}

/// One production with its AST handle.
#[derive(Debug)]
pub struct ProductionInfo {
    pub id: ProdId,
    pub lhs: VarId,
    pub rhs: Vec<SymbolRef>,
    pub handle: AstHandle,
}

/// The fully resolved grammar: types, symbols, productions, handles.
#[derive(Debug)]
pub struct MetaInfo {
    types: Vec<TypeDef>,
    type_lookup: IndexMap<String, TypeId>,
    /// Recognized tokens first, then ignored; ids are contiguous.
    tokens: Vec<TokenInfo>,
    term_count: usize,
    variables: Vec<VariableInfo>,
    symbol_lookup: IndexMap<String, SymbolRef>,
    productions: Vec<ProductionInfo>,
}

impl MetaInfo {
    /// Parses and resolves a grammar description. `env` supplies the type
    /// proxies; `None` binds every handle to the dummy proxy (tables-only
    /// mode).
    pub fn resolve(config_text: &str, env: Option<&ProxyRegistry>) -> Result<MetaInfo, BuildError> {
        let config = config::parse_config(config_text)?;
        Builder::default().build(&config, env)
    }

    pub fn types(&self) -> &[TypeDef] {
        &self.types
    }

    pub fn type_def(&self, id: TypeId) -> &TypeDef {
        &self.types[id]
    }

    pub fn type_by_name(&self, name: &str) -> Option<TypeId> {
        self.type_lookup.get(name).copied()
    }

    /// All tokens, recognized then ignored.
    pub fn tokens(&self) -> &[TokenInfo] {
        &self.tokens
    }

    /// Number of recognized tokens; ids at or above this are ignored.
    pub fn term_count(&self) -> usize {
        self.term_count
    }

    pub fn variables(&self) -> &[VariableInfo] {
        &self.variables
    }

    pub fn productions(&self) -> &[ProductionInfo] {
        &self.productions
    }

    pub fn production(&self, id: ProdId) -> &ProductionInfo {
        &self.productions[id]
    }

    /// The root variable: the last one declared.
    pub fn root_variable(&self) -> &VariableInfo {
        self.variables.last().expect("grammar has at least one variable")
    }

    pub fn symbol(&self, name: &str) -> Option<SymbolRef> {
        self.symbol_lookup.get(name).copied()
    }

    /// Display name of a symbol, for diagnostics.
    pub fn symbol_name(&self, symbol: SymbolRef) -> &str {
        match symbol {
            SymbolRef::Token(id) => &self.tokens[id].name,
            SymbolRef::Variable(id) => &self.variables[id].name,
        }
    }

    /// Writes the production list in `Lhs -> rhs...` form, for grammar
    /// debugging.
    pub fn write_productions<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "productions: {}", self.productions.len())?;
        for production in &self.productions {
            write!(out, "{}: {} ->", production.id, self.variables[production.lhs].name)?;
            for &symbol in &production.rhs {
                write!(out, " {}", self.symbol_name(symbol))?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct Builder {
    types: Vec<TypeDef>,
    type_lookup: IndexMap<String, TypeId>,
    tokens: Vec<TokenInfo>,
    term_count: usize,
    variables: Vec<VariableInfo>,
    symbol_lookup: IndexMap<String, SymbolRef>,
    productions: Vec<ProductionInfo>,
}

impl Builder {
    fn build(
        mut self,
        config: &GrammarConfig,
        env: Option<&ProxyRegistry>,
    ) -> Result<MetaInfo, BuildError> {
        self.register_types(config)?;
        self.resolve_members(config)?;
        self.register_symbols(config)?;
        self.compile_productions(config, env)?;

        Ok(MetaInfo {
            types: self.types,
            type_lookup: self.type_lookup,
            tokens: self.tokens,
            term_count: self.term_count,
            variables: self.variables,
            symbol_lookup: self.symbol_lookup,
            productions: self.productions,
        })
    }

    fn add_type(&mut self, def: TypeDef) -> Result<(), BuildError> {
        let name = String::from(def.name());
        let id = self.types.len();
        if self.type_lookup.insert(name.clone(), id).is_some() {
            return Err(BuildError::Resolve(format!("duplicate type name {name:?}")));
        }
        self.types.push(def);
        Ok(())
    }

    fn register_types(&mut self, config: &GrammarConfig) -> Result<(), BuildError> {
        self.add_type(TypeDef::Token)?;
        for def in &config.enums {
            self.add_type(TypeDef::Enum { name: def.name.clone(), values: def.values.clone() })?;
        }
        for def in &config.bases {
            self.add_type(TypeDef::Base { name: def.name.clone() })?;
        }
        for def in &config.nodes {
            self.add_type(TypeDef::Class {
                name: def.name.clone(),
                base: None,
                members: Vec::new(),
            })?;
        }
        Ok(())
    }

    fn resolve_members(&mut self, config: &GrammarConfig) -> Result<(), BuildError> {
        for def in &config.nodes {
            let parent = match &def.parent {
                None => None,
                Some(parent_name) => {
                    let id = self.lookup_type(parent_name)?;
                    if !self.types[id].is_base() {
                        return Err(BuildError::Resolve(format!(
                            "parent {parent_name:?} of node {:?} is not a base",
                            def.name
                        )));
                    }
                    Some(id)
                }
            };

            let mut members = Vec::with_capacity(def.members.len());
            for member in &def.members {
                members.push(MemberDef {
                    name: member.name.clone(),
                    spec: self.translate_spec(&member.spec)?,
                });
            }

            let id = self.lookup_type(&def.name)?;
            if let TypeDef::Class { base, members: slot, .. } = &mut self.types[id] {
                *base = parent;
                *slot = members;
            }
        }
        Ok(())
    }

    fn lookup_type(&self, name: &str) -> Result<TypeId, BuildError> {
        self.type_lookup
            .get(name)
            .copied()
            .ok_or_else(|| BuildError::Resolve(format!("unknown type {name:?}")))
    }

    fn translate_spec(&self, spec: &config::QualType) -> Result<TypeSpec, BuildError> {
        let qual = match spec.qual.as_str() {
            "" => Qualifier::None,
            "vec" => Qualifier::Vector,
            "opt" => Qualifier::Optional,
            other => {
                return Err(BuildError::Resolve(format!("unknown qualifier {other:?}")));
            }
        };
        Ok(TypeSpec { qual, ty: self.lookup_type(&spec.name)? })
    }

    fn add_symbol(&mut self, name: &String, symbol: SymbolRef) -> Result<(), BuildError> {
        if self.symbol_lookup.insert(name.clone(), symbol).is_some() {
            return Err(BuildError::Resolve(format!("duplicate symbol name {name:?}")));
        }
        Ok(())
    }

    fn register_symbols(&mut self, config: &GrammarConfig) -> Result<(), BuildError> {
        self.term_count = config.tokens.len();

        for (i, def) in config.tokens.iter().chain(&config.ignored_tokens).enumerate() {
            let regex = parse_regex(&def.regex).map_err(|e| BuildError::Regex {
                token: def.name.to_string(),
                message: e.to_string(),
            })?;
            self.add_symbol(&def.name, SymbolRef::Token(i))?;
            self.tokens.push(TokenInfo { id: i, name: def.name.clone(), regex });
        }

        for (i, rule) in config.rules.iter().enumerate() {
            let spec = self.translate_spec(&rule.spec)?;
            self.add_symbol(&rule.name, SymbolRef::Variable(i))?;
            self.variables.push(VariableInfo {
                id: i,
                name: rule.name.clone(),
                spec,
                productions: Vec::new(),
            });
        }

        if self.variables.is_empty() {
            return Err(BuildError::Resolve("grammar declares no rules".into()));
        }
        Ok(())
    }

    fn compile_productions(
        &mut self,
        config: &GrammarConfig,
        env: Option<&ProxyRegistry>,
    ) -> Result<(), BuildError> {
        for (var, rule) in config.rules.iter().enumerate() {
            for alt in &rule.alts {
                let mut rhs = Vec::with_capacity(alt.rhs.len());
                for rule_symbol in &alt.rhs {
                    let symbol =
                        self.symbol_lookup.get(rule_symbol.symbol.as_str()).copied().ok_or_else(
                            || {
                                BuildError::Resolve(format!(
                                    "unknown symbol {:?} in rule {:?}",
                                    rule_symbol.symbol, rule.name
                                ))
                            },
                        )?;
                    if let SymbolRef::Token(id) = symbol {
                        if id >= self.term_count {
                            return Err(BuildError::Resolve(format!(
                                "ignored token {:?} cannot appear in rule {:?}",
                                rule_symbol.symbol, rule.name
                            )));
                        }
                    }
                    rhs.push(symbol);
                }

                let handle = self.synthesize_handle(self.variables[var].spec, alt, &rule.name, env)?;

                let id = self.productions.len();
                self.productions.push(ProductionInfo { id, lhs: var, rhs, handle });
                self.variables[var].productions.push(id);
            }
        }
        Ok(())
    }

    /// Derives the generator/mutator pair of one rule alternative.
    fn synthesize_handle(
        &self,
        lhs_spec: TypeSpec,
        alt: &RuleAlt,
        rule_name: &str,
        env: Option<&ProxyRegistry>,
    ) -> Result<AstHandle, BuildError> {
        let handle_err = |message: std::string::String| BuildError::Handle {
            rule: rule_name.to_string(),
            message,
        };

        let is_vec = lhs_spec.is_vector();
        let is_opt = lhs_spec.is_optional();
        let lhs_type = &self.types[lhs_spec.ty];
        let is_enum = !is_vec && lhs_type.is_enum();
        let is_obj = !is_vec && (lhs_type.is_class() || lhs_type.is_base());

        // the type whose proxy the handle drives; hints and selection can
        // narrow it
        let mut result_ty = lhs_spec.ty;

        let generator = match &alt.hint {
            Some(hint) if is_opt && (hint.name == "_" || hint.qual == "opt") => {
                Generator::OptionalEmpty
            }
            Some(hint) if is_enum => {
                let TypeDef::Enum { values, .. } = lhs_type else { unreachable!() };
                let ordinal = values
                    .iter()
                    .position(|v| *v == hint.name)
                    .ok_or_else(|| handle_err(format!("unknown enum value {:?}", hint.name)))?;
                Generator::Enum(ordinal as u32)
            }
            Some(hint) => {
                if hint.name != "_" {
                    result_ty = self
                        .type_lookup
                        .get(hint.name.as_str())
                        .copied()
                        .ok_or_else(|| handle_err(format!("unknown type {:?} in hint", hint.name)))?;
                }
                if is_vec {
                    Generator::Vector
                } else if is_obj {
                    if !self.types[result_ty].is_class() {
                        return Err(handle_err(format!(
                            "cannot construct {:?}: not a class",
                            self.types[result_ty].name()
                        )));
                    }
                    Generator::Object
                } else {
                    return Err(handle_err("hint incompatible with the rule type".into()));
                }
            }
            None => {
                let mut selected = alt
                    .rhs
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.mark == RuleMark::Select);
                let index = match (selected.next(), selected.next()) {
                    (None, _) => return Err(handle_err("rule does not return".into())),
                    (Some(_), Some(_)) => {
                        return Err(handle_err("multiple items selected to return".into()))
                    }
                    (Some((index, _)), None) => index,
                };

                let symbol = self
                    .symbol_lookup
                    .get(alt.rhs[index].symbol.as_str())
                    .copied()
                    .ok_or_else(|| {
                        BuildError::Resolve(format!(
                            "unknown symbol {:?} in rule {:?}",
                            alt.rhs[index].symbol, rule_name
                        ))
                    })?;
                if let SymbolRef::Variable(v) = symbol {
                    result_ty = self.variables[v].spec.ty;
                }
                Generator::Select(index)
            }
        };

        let mut pushed = Vec::new();
        let mut assigned = Vec::new();
        for (i, rule_symbol) in alt.rhs.iter().enumerate() {
            match &rule_symbol.mark {
                RuleMark::Merge => pushed.push(i),
                RuleMark::Field(field) => {
                    let TypeDef::Class { members, .. } = &self.types[result_ty] else {
                        return Err(handle_err(format!(
                            "member assignment on non-class type {:?}",
                            self.types[result_ty].name()
                        )));
                    };
                    let member = members
                        .iter()
                        .position(|m| m.name == *field)
                        .ok_or_else(|| handle_err(format!("unknown member {field:?}")))?;
                    assigned.push((member, i));
                }
                RuleMark::None | RuleMark::Select => {}
            }
        }

        let mutator = if is_vec {
            if !assigned.is_empty() {
                return Err(handle_err("unexpected member assignment in a vector rule".into()));
            }
            if pushed.is_empty() {
                Mutator::Placeholder
            } else {
                Mutator::Merger(pushed)
            }
        } else if is_obj {
            if !pushed.is_empty() {
                return Err(handle_err("unexpected merge mark in an object rule".into()));
            }
            if assigned.is_empty() {
                Mutator::Placeholder
            } else {
                Mutator::Setter(assigned)
            }
        } else {
            if !pushed.is_empty() || !assigned.is_empty() {
                return Err(handle_err("unexpected mark on this rule type".into()));
            }
            Mutator::Placeholder
        };

        // only handles that actually drive a proxy need one bound
        let uses_proxy =
            !(matches!(generator, Generator::Select(_)) && matches!(mutator, Mutator::Placeholder));
        let slot = if uses_proxy {
            match env {
                None => ProxySlot::Dummy,
                Some(registry) => {
                    let name = self.types[result_ty].name();
                    ProxySlot::Registered(registry.lookup(name).ok_or_else(|| {
                        BuildError::Resolve(format!("no proxy registered for type {name:?}"))
                    })?)
                }
            }
        } else {
            ProxySlot::Dummy
        };

        Ok(AstHandle::new(slot, generator, mutator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::handle::{Generator, Mutator};

    const CALC: &str = r#"
        token plus = "\+";
        token num = "[0-9]+";
        ignore ws = "[ ]+";

        enum Op { Add; }

        base Expression;
        node BinaryExpr : Expression {
            Op op;
            Expression lhs;
            Expression rhs;
        }
        node NumberExpr : Expression {
            token value;
        }

        rule AddOp : Op
            = plus -> Add
            ;
        rule Factor : Expression
            = num:value -> NumberExpr
            ;
        rule Expr : Expression
            = Expr:lhs AddOp:op Factor:rhs -> BinaryExpr
            = Factor!
            ;
    "#;

    #[test]
    fn symbols_get_dense_ids() {
        let meta = MetaInfo::resolve(CALC, None).unwrap();
        assert_eq!(meta.term_count(), 2);
        assert_eq!(meta.tokens().len(), 3);
        assert_eq!(meta.tokens()[2].name, "ws");
        assert_eq!(meta.tokens()[2].id, 2);
        assert_eq!(meta.variables().len(), 3);
        assert_eq!(meta.root_variable().name, "Expr");
        assert_eq!(meta.symbol("num"), Some(SymbolRef::Token(1)));
        assert_eq!(meta.symbol("Expr"), Some(SymbolRef::Variable(2)));
        assert_eq!(meta.symbol("ws"), Some(SymbolRef::Token(2)));
    }

    #[test]
    fn productions_are_ordered_and_linked() {
        let meta = MetaInfo::resolve(CALC, None).unwrap();
        assert_eq!(meta.productions().len(), 4);
        let expr = meta.root_variable();
        assert_eq!(expr.productions, vec![2, 3]);
        let binary = meta.production(2);
        assert_eq!(binary.rhs.len(), 3);
        assert_eq!(binary.rhs[1], SymbolRef::Variable(0));
    }

    #[test]
    fn handles_follow_hints_and_marks() {
        let meta = MetaInfo::resolve(CALC, None).unwrap();
        assert_eq!(meta.production(0).handle.generator(), &Generator::Enum(0));
        assert_eq!(meta.production(1).handle.generator(), &Generator::Object);
        assert_eq!(meta.production(1).handle.mutator(), &Mutator::Setter(vec![(0, 0)]));
        assert_eq!(
            meta.production(2).handle.mutator(),
            &Mutator::Setter(vec![(1, 0), (0, 1), (2, 2)])
        );
        assert_eq!(meta.production(3).handle.generator(), &Generator::Select(0));
        assert_eq!(meta.production(3).handle.mutator(), &Mutator::Placeholder);
    }

    #[test]
    fn vector_rules_merge() {
        let grammar = r#"
            token num = "[0-9]+";
            base Expression;
            node NumberExpr : Expression { token value; }
            rule Factor : Expression = num:value -> NumberExpr;
            rule List : Expression'vec
                = Factor& -> _
                = List! Factor&
                ;
        "#;
        let meta = MetaInfo::resolve(grammar, None).unwrap();
        assert_eq!(meta.production(1).handle.generator(), &Generator::Vector);
        assert_eq!(meta.production(1).handle.mutator(), &Mutator::Merger(vec![0]));
        assert_eq!(meta.production(2).handle.generator(), &Generator::Select(0));
        assert_eq!(meta.production(2).handle.mutator(), &Mutator::Merger(vec![1]));
    }

    #[test]
    fn optional_hint_yields_empty_optional() {
        let grammar = r#"
            token x = "x";
            base Thing;
            node Leaf : Thing { token t; }
            rule Leaf : Leaf = x:t -> _;
            rule MaybeLeaf : Thing'opt
                = Leaf!
                = -> _'opt
                ;
        "#;
        let meta = MetaInfo::resolve(grammar, None).unwrap();
        assert_eq!(meta.production(2).handle.generator(), &Generator::OptionalEmpty);
    }

    #[test]
    fn production_dump_is_readable() {
        let meta = MetaInfo::resolve(CALC, None).unwrap();
        let mut buffer = Vec::new();
        meta.write_productions(&mut buffer).unwrap();
        let text = std::string::String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("productions: 4"));
        assert!(text.contains("2: Expr -> Expr AddOp Factor"));
        assert!(text.contains("0: AddOp -> plus"));
    }

    #[test]
    fn ignored_tokens_stay_out_of_rules() {
        let err = MetaInfo::resolve(
            "token a = \"x\"; ignore ws = \" \"; rule R : token = a! ws;",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::Resolve(ref m) if m.contains("ignored token")));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = MetaInfo::resolve(
            "token a = \"x\"; token a = \"y\"; rule R : token = a!;",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::Resolve(ref m) if m.contains("duplicate symbol")));

        let err = MetaInfo::resolve(
            "token a = \"x\"; base T; base T; rule R : token = a!;",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::Resolve(ref m) if m.contains("duplicate type")));
    }

    #[test]
    fn selector_marks_are_validated() {
        let base = "token a = \"x\"; ";
        let err =
            MetaInfo::resolve(&format!("{base}rule R : token = a;"), None).unwrap_err();
        assert!(matches!(err, BuildError::Handle { ref message, .. } if message.contains("does not return")));

        let err =
            MetaInfo::resolve(&format!("{base}rule R : token = a! a!;"), None).unwrap_err();
        assert!(matches!(err, BuildError::Handle { ref message, .. } if message.contains("multiple")));
    }

    #[test]
    fn marks_must_match_the_rule_type() {
        let grammar = r#"
            token a = "x";
            base T;
            node N : T { token t; }
            rule N : N = a:t -> _;
            rule R : T = a& N!;
        "#;
        let err = MetaInfo::resolve(grammar, None).unwrap_err();
        assert!(matches!(err, BuildError::Handle { ref message, .. } if message.contains("merge mark")));
    }

    #[test]
    fn unknown_member_is_rejected() {
        let grammar = r#"
            token a = "x";
            base T;
            node N : T { token t; }
            rule N : N = a:missing -> _;
        "#;
        let err = MetaInfo::resolve(grammar, None).unwrap_err();
        assert!(matches!(err, BuildError::Handle { ref message, .. } if message.contains("unknown member")));
    }

    #[test]
    fn enum_hint_on_non_enum_is_rejected() {
        let grammar = r#"
            token a = "x";
            rule R : token = a -> Whatever;
        "#;
        let err = MetaInfo::resolve(grammar, None).unwrap_err();
        assert!(matches!(err, BuildError::Handle { ref message, .. } if message.contains("unknown type")));
    }

    #[test]
    fn class_parent_must_be_base() {
        let grammar = r#"
            token a = "x";
            node P { token t; }
            node C : P { token t; }
            rule R : C = a:t -> _;
        "#;
        let err = MetaInfo::resolve(grammar, None).unwrap_err();
        assert!(matches!(err, BuildError::Resolve(ref m) if m.contains("not a base")));
    }

    #[test]
    fn bad_regex_names_the_token() {
        let err = MetaInfo::resolve("token broken = \"*\"; rule R : token = broken!;", None)
            .unwrap_err();
        match err {
            BuildError::Regex { token, message } => {
                assert_eq!(token, "broken");
                assert!(message.contains("invalid closure"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn registry_backed_handles_resolve_proxies() {
        use crate::ast::item::{AstClass, AstItem};
        use crate::error::RuntimeError;

        struct NumberExprClass;
        impl AstClass for NumberExprClass {
            type Node<'a> = ();
            fn fresh<'a>() -> Self::Node<'a> {}
            fn assign<'a>(_: &mut (), _: usize, _: AstItem<'a>) -> Result<(), RuntimeError> {
                Ok(())
            }
        }

        let grammar = r#"
            token num = "[0-9]+";
            base Expression;
            node NumberExpr : Expression { token value; }
            rule Factor : Expression = num:value -> NumberExpr;
        "#;

        let mut registry = ProxyRegistry::new();
        registry.register_base("Expression");
        registry.register_class::<NumberExprClass>("NumberExpr");
        let meta = MetaInfo::resolve(grammar, Some(&registry)).unwrap();
        assert_eq!(meta.productions().len(), 1);

        let empty = ProxyRegistry::new();
        let err = MetaInfo::resolve(grammar, Some(&empty)).unwrap_err();
        assert!(matches!(err, BuildError::Resolve(ref m) if m.contains("no proxy")));
    }
}
