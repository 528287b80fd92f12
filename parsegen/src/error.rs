//! Error types for grammar construction and parsing.
//!
//! Construction and parsing fail in disjoint ways and are kept as two
//! separate enums: [`BuildError`] is raised while a [`crate::Parser`] is
//! being built from a grammar description, [`RuntimeError`] while input is
//! being scanned or parsed. Build errors carry a byte offset into the
//! grammar text where one is available, together with a short context
//! window to make the message actionable without line/column bookkeeping.

use thiserror::Error;

/// Errors raised while building a parser from a grammar description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The grammar description itself is malformed.
    #[error("grammar syntax: {message} at offset {offset} near {context:?}")]
    Syntax {
        message: String,
        /// Byte offset into the grammar text.
        offset: usize,
        /// Up to 20 bytes of grammar text starting at `offset`.
        context: String,
    },

    /// A token's regex literal is malformed.
    #[error("regex for token {token:?}: {message}")]
    Regex { token: String, message: String },

    /// Type or symbol resolution failed.
    #[error("{0}")]
    Resolve(String),

    /// A rule's marks or hint cannot be turned into an AST handle.
    #[error("rule {rule:?}: {message}")]
    Handle { rule: String, message: String },

    /// The grammar is not LALR(1): two actions landed on the same cell.
    #[error("parser conflict: {0}")]
    Conflict(String),
}

impl BuildError {
    /// Builds a [`BuildError::Syntax`] with a context window clipped out of
    /// the grammar text at `offset`.
    pub(crate) fn syntax(message: impl Into<String>, text: &str, offset: usize) -> Self {
        let window = &text.as_bytes()[offset.min(text.len())..];
        let window = &window[..window.len().min(20)];
        BuildError::Syntax {
            message: message.into(),
            offset,
            context: String::from_utf8_lossy(window).into_owned(),
        }
    }
}

/// Errors raised while scanning or parsing input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The scanner reached a dead state (or end of input) without any
    /// recorded match.
    #[error("invalid token at offset {offset}")]
    InvalidToken { offset: usize },

    /// The action table yielded no action for the current state and token.
    #[error("parse error at offset {offset}")]
    ParseFailure { offset: usize },

    /// A type proxy rejected an operation (wrong item kind, unknown member,
    /// or a dummy proxy being driven).
    #[error("proxy: {0}")]
    Proxy(String),

    /// Internal invariant violation; indicates a bug in table construction.
    #[error("internal: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_context_is_clipped() {
        let text = "token a = \"x\"; and then a very long tail of text";
        let err = BuildError::syntax("unexpected token", text, 15);
        match err {
            BuildError::Syntax { offset, context, .. } => {
                assert_eq!(offset, 15);
                assert_eq!(context.len(), 20);
                assert!(context.starts_with("and then"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn syntax_context_at_eof() {
        let err = BuildError::syntax("unexpected eof", "abc", 3);
        match err {
            BuildError::Syntax { context, .. } => assert!(context.is_empty()),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn errors_display() {
        let err = RuntimeError::InvalidToken { offset: 7 };
        assert_eq!(err.to_string(), "invalid token at offset 7");
    }
}
