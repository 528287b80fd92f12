//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0
//! or (at your option) any later version (LGPL-3.0-or-later).
//!
//! Runtime lexer/parser generator with arena-backed AST construction.
//!
//! From a single textual grammar description, `parsegen` builds — at run
//! time — a longest-match tokenizer and an LALR(1) shift-reduce parser
//! that materializes a strongly-typed AST in a caller-owned [`Arena`].
//! The pipeline:
//!
//! 1. [`config`] parses the grammar description into a neutral record;
//! 2. [`regex`] builds a tree per token regex literal;
//! 3. [`meta`] resolves types, symbols and productions, and binds one
//!    AST-construction handle per production;
//! 4. [`dfa`] compiles all token regexes into one DFA by the
//!    position/followpos method;
//! 5. [`lalr`] builds the parsing automaton: an LR(0) skeleton, then
//!    LALR(1) lookaheads from an extended grammar derived from it;
//! 6. [`parser`] packs the tables and drives scanning and shift-reduce
//!    parsing.
//!
//! AST construction is type-erased: the caller registers a
//! [`TypeProxy`] per enum, base and class in a [`ProxyRegistry`], and
//! reductions produce [`AstItem`] values whose nodes live in the arena.
//!
//! # Example
//!
//! ```
//! use parsegen::{Arena, Parser};
//!
//! let parser = Parser::recognizer(r#"
//!     token word = "[a-z]+";
//!     ignore ws = "[ \t\r\n]+";
//!     rule First : token = word!;
//!     rule Line : token = First! word;
//! "#).unwrap();
//!
//! let arena = Arena::new();
//! let item = parser.parse(&arena, "hello world").unwrap();
//! assert_eq!(item.span().length, 11);
//! ```

pub mod arena;
pub mod ast;
pub mod config;
pub mod dfa;
pub mod error;
pub mod lalr;
pub mod meta;
pub mod parser;
pub mod regex;

pub use arena::Arena;
pub use ast::item::{AstClass, AstEnum, AstItem, AstValue, ObjRef, Span, TokenValue, VecRef};
pub use ast::proxy::{BaseProxy, ClassProxy, DummyProxy, EnumProxy, ProxyRegistry, TypeProxy};
pub use error::{BuildError, RuntimeError};
pub use meta::{MetaInfo, ProdId, TokenId, TypeId, VarId};
pub use parser::{Parser, Tokens};
