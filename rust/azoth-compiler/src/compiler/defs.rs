//! Definition-compilation collaborator: wraps definition heads into the
//! deferred-definition core form consumed by the definition compiler.

use crate::compiler::ast::{DefKind, Form, Span};
use crate::compiler::ir::{DefPayload, Definition, Ir};

/// Wrap a two-argument (or declaration) head. The head pieces and body are
/// kept as opaque surface syntax; the definition compiler performs its own
/// scoping pass later.
pub fn wrap_deferred(
    kind: DefKind,
    span: Span,
    name: String,
    args: Vec<Form>,
    guard: Option<Form>,
    body: Option<Form>,
) -> Ir {
    Ir::Define(Box::new(Definition {
        kind,
        span,
        payload: DefPayload::Deferred { name, args, guard, body },
    }))
}

/// Wrap a fully-expanded four-argument head. Name, argument patterns and
/// guards are already lowered; only the body stays opaque.
pub fn wrap_expanded(
    kind: DefKind,
    span: Span,
    name: Ir,
    args: Vec<Ir>,
    guards: Vec<Ir>,
    body: Form,
) -> Ir {
    Ir::Define(Box::new(Definition {
        kind,
        span,
        payload: DefPayload::Expanded { name: Box::new(name), args, guards, body },
    }))
}
