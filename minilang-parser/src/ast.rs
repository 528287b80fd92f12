//! Native AST of the demonstration language.
//!
//! Abstract bases are sum types over their concrete node references; nodes
//! are plain structs whose members follow the grammar's declaration order.
//! Members stay `Option` because nodes are born empty and filled member by
//! member during reductions; a member a production never assigns remains
//! `None`.

use parsegen::{AstClass, AstEnum, AstItem, RuntimeError, TokenValue};

// ---------------------------------------------------------------------------
// enums

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolValue {
    True,
    False,
}

impl AstEnum for BoolValue {
    fn from_ordinal(ordinal: u32) -> Option<Self> {
        match ordinal {
            0 => Some(BoolValue::True),
            1 => Some(BoolValue::False),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Asterisk,
    Slash,
    Modulus,
    Plus,
    Minus,
    And,
    Or,
    Xor,
    Gt,
    GtEq,
    Ls,
    LsEq,
    Eq,
    NotEq,
    LogicAnd,
    LogicOr,
}

impl AstEnum for BinaryOp {
    fn from_ordinal(ordinal: u32) -> Option<Self> {
        use BinaryOp::*;
        let all = [
            Asterisk, Slash, Modulus, Plus, Minus, And, Or, Xor, Gt, GtEq, Ls, LsEq, Eq, NotEq,
            LogicAnd, LogicOr,
        ];
        all.get(ordinal as usize).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpCommand {
    Break,
    Continue,
}

impl AstEnum for JumpCommand {
    fn from_ordinal(ordinal: u32) -> Option<Self> {
        match ordinal {
            0 => Some(JumpCommand::Break),
            1 => Some(JumpCommand::Continue),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Val,
    Var,
}

impl AstEnum for Mutability {
    fn from_ordinal(ordinal: u32) -> Option<Self> {
        match ordinal {
            0 => Some(Mutability::Val),
            1 => Some(Mutability::Var),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// conversion helpers

fn expect_token(value: &AstItem<'_>, what: &str) -> Result<TokenValue, RuntimeError> {
    value.token().ok_or_else(|| RuntimeError::Proxy(format!("expected a token for {what}")))
}

fn expect_enum<E: AstEnum>(value: &AstItem<'_>, what: &str) -> Result<E, RuntimeError> {
    value.enum_value::<E>().ok_or_else(|| RuntimeError::Proxy(format!("expected an enum for {what}")))
}

fn expect_items<'a>(value: &AstItem<'a>, what: &str) -> Result<&'a [AstItem<'a>], RuntimeError> {
    value.items().ok_or_else(|| RuntimeError::Proxy(format!("expected a vector for {what}")))
}

fn bad_member(class: &str, member: usize) -> RuntimeError {
    RuntimeError::Proxy(format!("{class} has no member {member}"))
}

fn statement_list<'a>(
    value: &AstItem<'a>,
    what: &str,
) -> Result<Vec<Statement<'a>>, RuntimeError> {
    expect_items(value, what)?.iter().map(Statement::from_item).collect()
}

// ---------------------------------------------------------------------------
// literals

#[derive(Debug, Clone, Copy)]
pub enum Literal<'a> {
    Bool(&'a BoolLiteral),
    Int(&'a IntLiteral),
}

impl<'a> Literal<'a> {
    pub fn from_item(item: &AstItem<'a>) -> Result<Literal<'a>, RuntimeError> {
        if let Some(node) = item.node::<BoolLiteralClass>() {
            return Ok(Literal::Bool(node));
        }
        if let Some(node) = item.node::<IntLiteralClass>() {
            return Ok(Literal::Int(node));
        }
        Err(RuntimeError::Proxy("expected a literal node".into()))
    }
}

pub struct BoolLiteralClass;

#[derive(Debug, Default)]
pub struct BoolLiteral {
    pub content: Option<BoolValue>,
}

impl AstClass for BoolLiteralClass {
    type Node<'a> = BoolLiteral;

    fn fresh<'a>() -> Self::Node<'a> {
        BoolLiteral::default()
    }

    fn assign<'a>(
        node: &mut BoolLiteral,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        match member {
            0 => node.content = Some(expect_enum(&value, "BoolLiteral.content")?),
            _ => return Err(bad_member("BoolLiteral", member)),
        }
        Ok(())
    }
}

pub struct IntLiteralClass;

#[derive(Debug, Default)]
pub struct IntLiteral {
    pub content: Option<TokenValue>,
}

impl AstClass for IntLiteralClass {
    type Node<'a> = IntLiteral;

    fn fresh<'a>() -> Self::Node<'a> {
        IntLiteral::default()
    }

    fn assign<'a>(
        node: &mut IntLiteral,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        match member {
            0 => node.content = Some(expect_token(&value, "IntLiteral.content")?),
            _ => return Err(bad_member("IntLiteral", member)),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// types

#[derive(Debug, Clone, Copy)]
pub enum TypeExpr<'a> {
    Named(&'a NamedType),
}

impl<'a> TypeExpr<'a> {
    pub fn from_item(item: &AstItem<'a>) -> Result<TypeExpr<'a>, RuntimeError> {
        item.node::<NamedTypeClass>()
            .map(TypeExpr::Named)
            .ok_or_else(|| RuntimeError::Proxy("expected a type node".into()))
    }
}

pub struct NamedTypeClass;

#[derive(Debug, Default)]
pub struct NamedType {
    pub name: Option<TokenValue>,
}

impl AstClass for NamedTypeClass {
    type Node<'a> = NamedType;

    fn fresh<'a>() -> Self::Node<'a> {
        NamedType::default()
    }

    fn assign<'a>(
        node: &mut NamedType,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        match member {
            0 => node.name = Some(expect_token(&value, "NamedType.name")?),
            _ => return Err(bad_member("NamedType", member)),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// expressions

#[derive(Debug, Clone, Copy)]
pub enum Expr<'a> {
    Binary(&'a BinaryExpr<'a>),
    Named(&'a NamedExpr),
    Literal(&'a LiteralExpr<'a>),
}

impl<'a> Expr<'a> {
    pub fn from_item(item: &AstItem<'a>) -> Result<Expr<'a>, RuntimeError> {
        if let Some(node) = item.node::<BinaryExprClass>() {
            return Ok(Expr::Binary(node));
        }
        if let Some(node) = item.node::<NamedExprClass>() {
            return Ok(Expr::Named(node));
        }
        if let Some(node) = item.node::<LiteralExprClass>() {
            return Ok(Expr::Literal(node));
        }
        Err(RuntimeError::Proxy("expected an expression node".into()))
    }
}

pub struct BinaryExprClass;

#[derive(Debug, Default)]
pub struct BinaryExpr<'a> {
    pub op: Option<BinaryOp>,
    pub lhs: Option<Expr<'a>>,
    pub rhs: Option<Expr<'a>>,
}

impl AstClass for BinaryExprClass {
    type Node<'a> = BinaryExpr<'a>;

    fn fresh<'a>() -> BinaryExpr<'a> {
        BinaryExpr::default()
    }

    fn assign<'a>(
        node: &mut BinaryExpr<'a>,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        match member {
            0 => node.op = Some(expect_enum(&value, "BinaryExpr.op")?),
            1 => node.lhs = Some(Expr::from_item(&value)?),
            2 => node.rhs = Some(Expr::from_item(&value)?),
            _ => return Err(bad_member("BinaryExpr", member)),
        }
        Ok(())
    }
}

pub struct NamedExprClass;

#[derive(Debug, Default)]
pub struct NamedExpr {
    pub id: Option<TokenValue>,
}

impl AstClass for NamedExprClass {
    type Node<'a> = NamedExpr;

    fn fresh<'a>() -> Self::Node<'a> {
        NamedExpr::default()
    }

    fn assign<'a>(
        node: &mut NamedExpr,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        match member {
            0 => node.id = Some(expect_token(&value, "NamedExpr.id")?),
            _ => return Err(bad_member("NamedExpr", member)),
        }
        Ok(())
    }
}

pub struct LiteralExprClass;

#[derive(Debug, Default)]
pub struct LiteralExpr<'a> {
    pub content: Option<Literal<'a>>,
}

impl AstClass for LiteralExprClass {
    type Node<'a> = LiteralExpr<'a>;

    fn fresh<'a>() -> LiteralExpr<'a> {
        LiteralExpr::default()
    }

    fn assign<'a>(
        node: &mut LiteralExpr<'a>,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        match member {
            0 => node.content = Some(Literal::from_item(&value)?),
            _ => return Err(bad_member("LiteralExpr", member)),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// statements

#[derive(Debug, Clone, Copy)]
pub enum Statement<'a> {
    VariableDecl(&'a VariableDeclStmt<'a>),
    Jump(&'a JumpStmt),
    Return(&'a ReturnStmt<'a>),
    Expr(&'a ExprStmt<'a>),
    Compound(&'a CompoundStmt<'a>),
    While(&'a WhileStmt<'a>),
    Choice(&'a ChoiceStmt<'a>),
}

impl<'a> Statement<'a> {
    pub fn from_item(item: &AstItem<'a>) -> Result<Statement<'a>, RuntimeError> {
        if let Some(node) = item.node::<VariableDeclStmtClass>() {
            return Ok(Statement::VariableDecl(node));
        }
        if let Some(node) = item.node::<JumpStmtClass>() {
            return Ok(Statement::Jump(node));
        }
        if let Some(node) = item.node::<ReturnStmtClass>() {
            return Ok(Statement::Return(node));
        }
        if let Some(node) = item.node::<ExprStmtClass>() {
            return Ok(Statement::Expr(node));
        }
        if let Some(node) = item.node::<CompoundStmtClass>() {
            return Ok(Statement::Compound(node));
        }
        if let Some(node) = item.node::<WhileStmtClass>() {
            return Ok(Statement::While(node));
        }
        if let Some(node) = item.node::<ChoiceStmtClass>() {
            return Ok(Statement::Choice(node));
        }
        Err(RuntimeError::Proxy("expected a statement node".into()))
    }
}

pub struct VariableDeclStmtClass;

#[derive(Debug, Default)]
pub struct VariableDeclStmt<'a> {
    pub mutability: Option<Mutability>,
    pub name: Option<TokenValue>,
    pub ty: Option<TypeExpr<'a>>,
    pub value: Option<Expr<'a>>,
}

impl AstClass for VariableDeclStmtClass {
    type Node<'a> = VariableDeclStmt<'a>;

    fn fresh<'a>() -> VariableDeclStmt<'a> {
        VariableDeclStmt::default()
    }

    fn assign<'a>(
        node: &mut VariableDeclStmt<'a>,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        match member {
            0 => node.mutability = Some(expect_enum(&value, "VariableDeclStmt.mut")?),
            1 => node.name = Some(expect_token(&value, "VariableDeclStmt.name")?),
            2 => node.ty = Some(TypeExpr::from_item(&value)?),
            3 => node.value = Some(Expr::from_item(&value)?),
            _ => return Err(bad_member("VariableDeclStmt", member)),
        }
        Ok(())
    }
}

pub struct JumpStmtClass;

#[derive(Debug, Default)]
pub struct JumpStmt {
    pub command: Option<JumpCommand>,
}

impl AstClass for JumpStmtClass {
    type Node<'a> = JumpStmt;

    fn fresh<'a>() -> Self::Node<'a> {
        JumpStmt::default()
    }

    fn assign<'a>(
        node: &mut JumpStmt,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        match member {
            0 => node.command = Some(expect_enum(&value, "JumpStmt.command")?),
            _ => return Err(bad_member("JumpStmt", member)),
        }
        Ok(())
    }
}

pub struct ReturnStmtClass;

#[derive(Debug, Default)]
pub struct ReturnStmt<'a> {
    pub expr: Option<Expr<'a>>,
}

impl AstClass for ReturnStmtClass {
    type Node<'a> = ReturnStmt<'a>;

    fn fresh<'a>() -> ReturnStmt<'a> {
        ReturnStmt::default()
    }

    fn assign<'a>(
        node: &mut ReturnStmt<'a>,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        match member {
            0 => node.expr = Some(Expr::from_item(&value)?),
            _ => return Err(bad_member("ReturnStmt", member)),
        }
        Ok(())
    }
}

pub struct ExprStmtClass;

#[derive(Debug, Default)]
pub struct ExprStmt<'a> {
    pub expr: Option<Expr<'a>>,
}

impl AstClass for ExprStmtClass {
    type Node<'a> = ExprStmt<'a>;

    fn fresh<'a>() -> ExprStmt<'a> {
        ExprStmt::default()
    }

    fn assign<'a>(
        node: &mut ExprStmt<'a>,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        match member {
            0 => node.expr = Some(Expr::from_item(&value)?),
            _ => return Err(bad_member("ExprStmt", member)),
        }
        Ok(())
    }
}

pub struct CompoundStmtClass;

#[derive(Debug, Default)]
pub struct CompoundStmt<'a> {
    pub children: Option<Vec<Statement<'a>>>,
}

impl AstClass for CompoundStmtClass {
    type Node<'a> = CompoundStmt<'a>;

    fn fresh<'a>() -> CompoundStmt<'a> {
        CompoundStmt::default()
    }

    fn assign<'a>(
        node: &mut CompoundStmt<'a>,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        match member {
            0 => node.children = Some(statement_list(&value, "CompoundStmt.children")?),
            _ => return Err(bad_member("CompoundStmt", member)),
        }
        Ok(())
    }
}

pub struct WhileStmtClass;

#[derive(Debug, Default)]
pub struct WhileStmt<'a> {
    pub pred: Option<Expr<'a>>,
    pub body: Option<Statement<'a>>,
}

impl AstClass for WhileStmtClass {
    type Node<'a> = WhileStmt<'a>;

    fn fresh<'a>() -> WhileStmt<'a> {
        WhileStmt::default()
    }

    fn assign<'a>(
        node: &mut WhileStmt<'a>,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        match member {
            0 => node.pred = Some(Expr::from_item(&value)?),
            1 => node.body = Some(Statement::from_item(&value)?),
            _ => return Err(bad_member("WhileStmt", member)),
        }
        Ok(())
    }
}

pub struct ChoiceStmtClass;

#[derive(Debug, Default)]
pub struct ChoiceStmt<'a> {
    pub pred: Option<Expr<'a>>,
    pub positive: Option<Statement<'a>>,
    /// `None` when the choice has no `else` arm.
    pub negative: Option<Statement<'a>>,
}

impl AstClass for ChoiceStmtClass {
    type Node<'a> = ChoiceStmt<'a>;

    fn fresh<'a>() -> ChoiceStmt<'a> {
        ChoiceStmt::default()
    }

    fn assign<'a>(
        node: &mut ChoiceStmt<'a>,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        match member {
            0 => node.pred = Some(Expr::from_item(&value)?),
            1 => node.positive = Some(Statement::from_item(&value)?),
            2 => {
                node.negative = if value.is_empty_optional() {
                    None
                } else {
                    Some(Statement::from_item(&value)?)
                }
            }
            _ => return Err(bad_member("ChoiceStmt", member)),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// declarations

pub struct TypedNameClass;

#[derive(Debug, Default)]
pub struct TypedName<'a> {
    pub name: Option<TokenValue>,
    pub ty: Option<TypeExpr<'a>>,
}

impl AstClass for TypedNameClass {
    type Node<'a> = TypedName<'a>;

    fn fresh<'a>() -> TypedName<'a> {
        TypedName::default()
    }

    fn assign<'a>(
        node: &mut TypedName<'a>,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        match member {
            0 => node.name = Some(expect_token(&value, "TypedName.name")?),
            1 => node.ty = Some(TypeExpr::from_item(&value)?),
            _ => return Err(bad_member("TypedName", member)),
        }
        Ok(())
    }
}

pub struct FuncDeclClass;

#[derive(Debug, Default)]
pub struct FuncDecl<'a> {
    pub name: Option<TokenValue>,
    pub params: Option<Vec<&'a TypedName<'a>>>,
    pub ret: Option<TypeExpr<'a>>,
    pub body: Option<Vec<Statement<'a>>>,
}

impl AstClass for FuncDeclClass {
    type Node<'a> = FuncDecl<'a>;

    fn fresh<'a>() -> FuncDecl<'a> {
        FuncDecl::default()
    }

    fn assign<'a>(
        node: &mut FuncDecl<'a>,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        match member {
            0 => node.name = Some(expect_token(&value, "FuncDecl.name")?),
            1 => {
                node.params = Some(
                    expect_items(&value, "FuncDecl.params")?
                        .iter()
                        .map(|item| {
                            item.node::<TypedNameClass>().ok_or_else(|| {
                                RuntimeError::Proxy("expected a typed name".into())
                            })
                        })
                        .collect::<Result<_, _>>()?,
                )
            }
            2 => node.ret = Some(TypeExpr::from_item(&value)?),
            3 => node.body = Some(statement_list(&value, "FuncDecl.body")?),
            _ => return Err(bad_member("FuncDecl", member)),
        }
        Ok(())
    }
}

pub struct TranslationUnitClass;

#[derive(Debug, Default)]
pub struct TranslationUnit<'a> {
    pub functions: Option<Vec<&'a FuncDecl<'a>>>,
}

impl AstClass for TranslationUnitClass {
    type Node<'a> = TranslationUnit<'a>;

    fn fresh<'a>() -> TranslationUnit<'a> {
        TranslationUnit::default()
    }

    fn assign<'a>(
        node: &mut TranslationUnit<'a>,
        member: usize,
        value: AstItem<'a>,
    ) -> Result<(), RuntimeError> {
        match member {
            0 => {
                node.functions = Some(
                    expect_items(&value, "TranslationUnit.functions")?
                        .iter()
                        .map(|item| {
                            item.node::<FuncDeclClass>().ok_or_else(|| {
                                RuntimeError::Proxy("expected a function declaration".into())
                            })
                        })
                        .collect::<Result<_, _>>()?,
                )
            }
            _ => return Err(bad_member("TranslationUnit", member)),
        }
        Ok(())
    }
}
