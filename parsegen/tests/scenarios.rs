//! End-to-end construction scenarios against small grammars.

use parsegen::{
    Arena, AstClass, AstEnum, AstItem, Parser, ProxyRegistry, RuntimeError, Span, TokenValue,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ---------------------------------------------------------------------------
// balanced parentheses: nested nodes through optional members

const PARENS: &str = r#"
    token lp = "\(";
    token rp = "\)";
    node S { S'opt inner; S'opt next; }
    rule S : S
        = lp S:inner rp S:next -> _
        = -> _
        ;
"#;

struct SClass;

#[derive(Default)]
struct SNode<'a> {
    inner: Option<&'a SNode<'a>>,
    next: Option<&'a SNode<'a>>,
}

impl AstClass for SClass {
    type Node<'a> = SNode<'a>;

    fn fresh<'a>() -> SNode<'a> {
        SNode::default()
    }

    fn assign<'a>(
        node: &mut SNode<'a>,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        let child = value
            .node::<SClass>()
            .ok_or_else(|| RuntimeError::Proxy("expected a nested S".into()))?;
        match member {
            0 => node.inner = Some(child),
            1 => node.next = Some(child),
            _ => return Err(RuntimeError::Proxy("unknown member".into())),
        }
        Ok(())
    }
}

fn parens_parser() -> Parser {
    let mut registry = ProxyRegistry::new();
    registry.register_class::<SClass>("S");
    Parser::try_new(PARENS, registry).unwrap()
}

#[test]
fn nested_parentheses_build_nested_nodes() {
    init_logger();
    let parser = parens_parser();
    let arena = Arena::new();

    let item = parser.parse(&arena, "(())").unwrap();
    assert_eq!(item.span(), Span::new(0, 4));

    let root = item.node::<SClass>().unwrap();
    let mid = root.inner.expect("outer pair wraps an inner node");
    assert!(root.next.is_some());
    let leaf = mid.inner.expect("inner pair wraps an empty node");
    assert!(leaf.inner.is_none() && leaf.next.is_none());
}

#[test]
fn empty_input_is_a_valid_sentence_here() {
    let parser = parens_parser();
    let arena = Arena::new();
    let item = parser.parse(&arena, "").unwrap();
    assert_eq!(item.span(), Span::new(0, 0));
    let root = item.node::<SClass>().unwrap();
    assert!(root.inner.is_none() && root.next.is_none());
}

#[test]
fn unbalanced_input_fails_with_an_offset() {
    let parser = parens_parser();
    let arena = Arena::new();
    assert_eq!(
        parser.parse(&arena, "(()").unwrap_err(),
        RuntimeError::ParseFailure { offset: 3 }
    );
    assert_eq!(
        parser.parse(&arena, ")").unwrap_err(),
        RuntimeError::ParseFailure { offset: 0 }
    );
}

#[test]
fn sibling_chains_parse_too() {
    let parser = parens_parser();
    let arena = Arena::new();
    let item = parser.parse(&arena, "()()").unwrap();
    let root = item.node::<SClass>().unwrap();
    // first pair, then its sibling through `next`
    assert!(root.inner.is_some());
    assert!(root.next.unwrap().inner.is_some());
}

// ---------------------------------------------------------------------------
// vectors: merge marks collect into one arena vector

const NUMBERS: &str = r#"
    token num = "[0-9]+";
    ignore ws = "[ ]+";
    base Item;
    node Num : Item { token value; }
    rule Num : Num = num:value -> _;
    rule List : Item'vec
        = Num& -> _
        = List! Num&
        ;
    rule Numbers : Item'vec = List!;
"#;

struct NumClass;

#[derive(Default)]
struct NumNode {
    value: Option<TokenValue>,
}

impl AstClass for NumClass {
    type Node<'a> = NumNode;

    fn fresh<'a>() -> Self::Node<'a> {
        NumNode::default()
    }

    fn assign<'a>(
        node: &mut NumNode,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        match member {
            0 => {
                node.value = value.token();
                Ok(())
            }
            _ => Err(RuntimeError::Proxy("unknown member".into())),
        }
    }
}

#[test]
fn merge_marks_collect_in_order() {
    init_logger();
    let mut registry = ProxyRegistry::new();
    registry.register_base("Item");
    registry.register_class::<NumClass>("Num");
    let parser = Parser::try_new(NUMBERS, registry).unwrap();

    let arena = Arena::new();
    let text = "10 20 30";
    let item = parser.parse(&arena, text).unwrap();
    assert_eq!(item.span(), Span::new(0, 8));

    let elements = item.items().unwrap();
    assert_eq!(elements.len(), 3);
    for (element, expected) in elements.iter().zip(["10", "20", "30"]) {
        let token = element.node::<NumClass>().unwrap().value.unwrap();
        assert_eq!(&text[token.span.offset..token.span.end()], expected);
    }
}

// ---------------------------------------------------------------------------
// enums and optionals

#[derive(Debug, PartialEq, Eq)]
enum Flag {
    On,
    Off,
}

impl AstEnum for Flag {
    fn from_ordinal(ordinal: u32) -> Option<Self> {
        match ordinal {
            0 => Some(Flag::On),
            1 => Some(Flag::Off),
            _ => None,
        }
    }
}

#[test]
fn enum_hints_carry_declaration_ordinals() {
    let grammar = r#"
        token on = "on";
        token off = "off";
        enum Flag { On; Off; }
        rule Flag : Flag
            = on -> On
            = off -> Off
            ;
        rule Setting : Flag = Flag!;
    "#;
    let mut registry = ProxyRegistry::new();
    registry.register_enum::<Flag>("Flag");
    let parser = Parser::try_new(grammar, registry).unwrap();

    let arena = Arena::new();
    let item = parser.parse(&arena, "off").unwrap();
    assert_eq!(item.enum_value::<Flag>(), Some(Flag::Off));
    assert_eq!(item.span(), Span::new(0, 3));
}

struct LeafClass;

#[derive(Default)]
struct LeafNode {
    t: Option<TokenValue>,
}

impl AstClass for LeafClass {
    type Node<'a> = LeafNode;

    fn fresh<'a>() -> Self::Node<'a> {
        LeafNode::default()
    }

    fn assign<'a>(
        node: &mut LeafNode,
        _member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        node.t = value.token();
        Ok(())
    }
}

struct WrapClass;

#[derive(Default)]
struct WrapNode<'a> {
    found: Option<&'a LeafNode>,
}

impl AstClass for WrapClass {
    type Node<'a> = WrapNode<'a>;

    fn fresh<'a>() -> WrapNode<'a> {
        WrapNode::default()
    }

    fn assign<'a>(
        node: &mut WrapNode<'a>,
        _member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        node.found = if value.is_empty_optional() {
            None
        } else {
            Some(
                value
                    .node::<LeafClass>()
                    .ok_or_else(|| RuntimeError::Proxy("expected a leaf".into()))?,
            )
        };
        Ok(())
    }
}

fn optional_parser() -> Parser {
    let grammar = r#"
        token x = "x";
        base T;
        node Leaf : T { token t; }
        node Wrap { T'opt found; }
        rule Leaf : Leaf = x:t -> _;
        rule MaybeLeaf : T'opt
            = Leaf!
            = -> _'opt
            ;
        rule Wrap : Wrap = MaybeLeaf:found -> _;
    "#;
    let mut registry = ProxyRegistry::new();
    registry.register_base("T");
    registry.register_class::<LeafClass>("Leaf");
    registry.register_class::<WrapClass>("Wrap");
    Parser::try_new(grammar, registry).unwrap()
}

#[test]
fn present_optionals_pass_the_payload_through() {
    let parser = optional_parser();
    let arena = Arena::new();
    let item = parser.parse(&arena, "x").unwrap();
    let wrap = item.node::<WrapClass>().unwrap();
    assert!(wrap.found.is_some());
}

#[test]
fn absent_optionals_assign_none() {
    let parser = optional_parser();
    let arena = Arena::new();
    let item = parser.parse(&arena, "").unwrap();
    let wrap = item.node::<WrapClass>().unwrap();
    assert!(wrap.found.is_none());
}

// ---------------------------------------------------------------------------
// recognizer mode

#[test]
fn recognizer_tables_build_but_construction_fails_loudly() {
    let parser = Parser::recognizer(PARENS).unwrap();
    let arena = Arena::new();
    match parser.parse(&arena, "()") {
        Err(RuntimeError::Proxy(message)) => assert!(message.contains("dummy")),
        other => panic!("expected a proxy failure, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// spans cover reductions exactly

#[test]
fn reduction_spans_cover_their_children() {
    let parser = parens_parser();
    let arena = Arena::new();

    let item = parser.parse(&arena, "(()())").unwrap();
    assert_eq!(item.span(), Span::new(0, 6));

    let item = parser.parse(&arena, "()").unwrap();
    assert_eq!(item.span(), Span::new(0, 2));
}
