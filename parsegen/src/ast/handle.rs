//! Per-production AST construction handles.
//!
//! Every production carries one [`AstHandle`]: a generator that produces
//! the reduction's item and a mutator that folds rhs items into it. The
//! shift-reduce driver invokes the handle with the arena and the slice of
//! items popped for the rhs; the result inherits a span covering the whole
//! rhs (or a zero-length span at the current offset for an empty rhs).

use crate::arena::Arena;
use crate::ast::item::{AstItem, Span};
use crate::ast::proxy::{DummyProxy, ProxyRegistry, TypeProxy};
use crate::error::RuntimeError;

/// How the reduction's item comes into being.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generator {
    /// Yield an enum value with the given ordinal.
    Enum(u32),
    /// Allocate a fresh node of the handle's target class.
    Object,
    /// Allocate a fresh, empty vector.
    Vector,
    /// Yield an empty optional.
    OptionalEmpty,
    /// Pass rhs item `i` through unchanged.
    Select(usize),
}

/// How rhs items are folded into the generated item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutator {
    /// Nothing to fold.
    Placeholder,
    /// `(member index, rhs index)` assignments into the produced object.
    Setter(Vec<(usize, usize)>),
    /// Rhs indices pushed into the produced vector, in order.
    Merger(Vec<usize>),
}

/// Which proxy the handle drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProxySlot {
    /// No registry was supplied, or the handle never touches a proxy.
    Dummy,
    /// Index into the registry handed to the parser at build time.
    Registered(usize),
}

static DUMMY: DummyProxy = DummyProxy;

/// Generator/mutator pair bound to one production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstHandle {
    pub(crate) slot: ProxySlot,
    pub(crate) generator: Generator,
    pub(crate) mutator: Mutator,
}

impl AstHandle {
    pub(crate) fn new(slot: ProxySlot, generator: Generator, mutator: Mutator) -> AstHandle {
        AstHandle { slot, generator, mutator }
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn mutator(&self) -> &Mutator {
        &self.mutator
    }

    /// Runs the handle over the popped rhs items.
    ///
    /// `fallback_offset` is the current input offset; it becomes the span
    /// anchor of reductions over an empty rhs.
    pub(crate) fn invoke<'a>(
        &self,
        env: Option<&ProxyRegistry>,
        arena: &'a Arena,
        rhs: &[AstItem<'a>],
        fallback_offset: usize,
    ) -> Result<AstItem<'a>, RuntimeError> {
        let proxy: &dyn TypeProxy = match self.slot {
            ProxySlot::Dummy => &DUMMY,
            ProxySlot::Registered(index) => env
                .ok_or_else(|| RuntimeError::Internal("handle bound to a missing registry".into()))?
                .get(index),
        };

        let mut item = match self.generator {
            Generator::Enum(ordinal) => proxy.construct_enum(ordinal)?,
            Generator::Object => proxy.construct_object(arena)?,
            Generator::Vector => proxy.construct_vector(arena)?,
            Generator::OptionalEmpty => proxy.construct_optional()?,
            Generator::Select(index) => *rhs
                .get(index)
                .ok_or_else(|| RuntimeError::Internal("select index out of bounds".into()))?,
        };

        match &self.mutator {
            Mutator::Placeholder => {}
            Mutator::Setter(pairs) => {
                for &(member, rhs_index) in pairs {
                    proxy.assign_field(&item, member, rhs[rhs_index])?;
                }
            }
            Mutator::Merger(indices) => {
                for &rhs_index in indices {
                    proxy.push_back(&item, rhs[rhs_index])?;
                }
            }
        }

        let span = match (rhs.first(), rhs.last()) {
            (Some(first), Some(last)) => {
                Span::new(first.span().offset, last.span().end() - first.span().offset)
            }
            _ => Span::new(fallback_offset, 0),
        };
        item.set_span(span);

        Ok(item)
    }
}
