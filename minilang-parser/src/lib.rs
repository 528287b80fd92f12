//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0
//! or (at your option) any later version (LGPL-3.0-or-later).
//!
//! Demonstration language parsed through the [`parsegen`] runtime.
//!
//! The language has functions, statements (with the classic open/close
//! split so every `else` pairs with the nearest unmatched `if`) and a full
//! expression precedence tower. This crate supplies:
//!
//! - the grammar descriptions ([`grammar::PROGRAM`], [`grammar::EXPRESSION`]);
//! - the native AST in [`ast`], bases as sum types over concrete nodes;
//! - proxy registries binding every grammar type to its Rust counterpart;
//! - thin parse entry points extracting the typed root.

pub mod ast;
pub mod grammar;

use parsegen::{Arena, BuildError, Parser, ProxyRegistry, RuntimeError};

use crate::ast::{
    BinaryExprClass, BoolLiteralClass, BoolValue, BinaryOp, ChoiceStmtClass, CompoundStmtClass,
    Expr, ExprStmtClass, FuncDeclClass, IntLiteralClass, JumpCommand, JumpStmtClass,
    LiteralExprClass, Mutability, NamedExprClass, NamedTypeClass, ReturnStmtClass, TranslationUnit,
    TranslationUnitClass, TypedNameClass, VariableDeclStmtClass, WhileStmtClass,
};

/// Proxies for every type the full grammar names.
pub fn program_registry() -> ProxyRegistry {
    let mut registry = ProxyRegistry::new();

    registry.register_enum::<BoolValue>("BoolValue");
    registry.register_enum::<BinaryOp>("BinaryOp");
    registry.register_enum::<JumpCommand>("JumpCommand");
    registry.register_enum::<Mutability>("VariableMutability");

    registry.register_base("Literal");
    registry.register_base("Type");
    registry.register_base("Expression");
    registry.register_base("Statement");

    registry.register_class::<BoolLiteralClass>("BoolLiteral");
    registry.register_class::<IntLiteralClass>("IntLiteral");
    registry.register_class::<NamedTypeClass>("NamedType");
    registry.register_class::<BinaryExprClass>("BinaryExpr");
    registry.register_class::<NamedExprClass>("NamedExpr");
    registry.register_class::<LiteralExprClass>("LiteralExpr");
    registry.register_class::<VariableDeclStmtClass>("VariableDeclStmt");
    registry.register_class::<JumpStmtClass>("JumpStmt");
    registry.register_class::<ReturnStmtClass>("ReturnStmt");
    registry.register_class::<ExprStmtClass>("ExprStmt");
    registry.register_class::<CompoundStmtClass>("CompoundStmt");
    registry.register_class::<WhileStmtClass>("WhileStmt");
    registry.register_class::<ChoiceStmtClass>("ChoiceStmt");
    registry.register_class::<TypedNameClass>("TypedName");
    registry.register_class::<FuncDeclClass>("FuncDecl");
    registry.register_class::<TranslationUnitClass>("TranslationUnit");

    registry
}

/// Proxies for the expression-only grammar.
pub fn expr_registry() -> ProxyRegistry {
    let mut registry = ProxyRegistry::new();

    registry.register_enum::<BoolValue>("BoolValue");
    registry.register_enum::<BinaryOp>("BinaryOp");

    registry.register_base("Literal");
    registry.register_base("Expression");

    registry.register_class::<BoolLiteralClass>("BoolLiteral");
    registry.register_class::<IntLiteralClass>("IntLiteral");
    registry.register_class::<BinaryExprClass>("BinaryExpr");
    registry.register_class::<NamedExprClass>("NamedExpr");
    registry.register_class::<LiteralExprClass>("LiteralExpr");

    registry
}

/// Builds the parser for whole programs.
pub fn program_parser() -> Result<Parser, BuildError> {
    let parser = Parser::try_new(grammar::PROGRAM, program_registry())?;
    log::debug!("program parser ready: {} productions", parser.meta().productions().len());
    Ok(parser)
}

/// Builds the parser for bare expressions.
pub fn expr_parser() -> Result<Parser, BuildError> {
    let parser = Parser::try_new(grammar::EXPRESSION, expr_registry())?;
    log::debug!("expression parser ready: {} productions", parser.meta().productions().len());
    Ok(parser)
}

/// Parses a program and extracts the translation unit.
pub fn parse_program<'a>(
    parser: &Parser,
    arena: &'a Arena,
    text: &str,
) -> Result<&'a TranslationUnit<'a>, RuntimeError> {
    let item = parser.parse(arena, text)?;
    item.node::<TranslationUnitClass>()
        .ok_or_else(|| RuntimeError::Internal("root is not a translation unit".into()))
}

/// Parses a bare expression.
pub fn parse_expr<'a>(
    parser: &Parser,
    arena: &'a Arena,
    text: &str,
) -> Result<Expr<'a>, RuntimeError> {
    let item = parser.parse(arena, text)?;
    Expr::from_item(&item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_parsers_build() {
        program_parser().unwrap();
        expr_parser().unwrap();
    }

    #[test]
    fn recognizers_build_without_proxies() {
        Parser::recognizer(grammar::PROGRAM).unwrap();
        Parser::recognizer(grammar::EXPRESSION).unwrap();
    }
}
