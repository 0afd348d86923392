//! Module-compilation collaborator and attribute metadata calls.

use crate::compiler::ast::{Form, Span};
use crate::compiler::ir::{Callee, Ir, META_MODULE};
use crate::compiler::scope::Scope;
use crate::compiler::translate;
use crate::ExpandError;

/// Build the metadata-merge call storing `name => value` on `module`.
pub fn merge_attribute(span: Span, module: Ir, name: &str, value: Ir) -> Ir {
    let pair = Ir::Tuple {
        items: vec![Ir::Atom { name: name.to_string(), span }, value],
        span,
    };
    Ir::Call {
        callee: Callee::runtime(META_MODULE, "merge"),
        args: vec![module, Ir::List { items: vec![pair], span }],
        span,
    }
}

/// Build the metadata-read call for attribute `name` on `module`.
pub fn read_attribute(span: Span, module: Ir, name: &str) -> Ir {
    Ir::Call {
        callee: Callee::runtime(META_MODULE, "read"),
        args: vec![module, Ir::Atom { name: name.to_string(), span }],
        span,
    }
}

/// Compile a module body under the given reference.
///
/// The body is lowered with the module name in scope (when the reference is
/// a literal name) and outside any function body. Module-local bindings and
/// aliases stay inside; the counter advance and any modules scheduled by the
/// body survive into the caller's scope.
pub fn compile(
    span: Span,
    reference: Ir,
    body: &[Form],
    scope: Scope,
) -> Result<(Ir, Scope), ExpandError> {
    let outer = scope.clone();
    let mut inner = scope;
    if let Ir::Atom { name, .. } = &reference {
        inner.module = Some(name.clone());
    }
    inner.function = None;
    let (body, inner) = translate::translate_sequence(body, inner)?;
    let scope = outer.merge(&inner);
    Ok((Ir::ModuleDef { name: Box::new(reference), body, span }, scope))
}
