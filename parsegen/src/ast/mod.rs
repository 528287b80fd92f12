//! AST items, type proxies and production handles.
//!
//! The parser never learns the caller's node types. It moves [`item::AstItem`]
//! values around, and every operation that needs type knowledge goes through
//! a [`proxy::TypeProxy`] looked up by type name at build time. Handles bind
//! one generator and one mutator to each production.

pub mod handle;
pub mod item;
pub mod proxy;
