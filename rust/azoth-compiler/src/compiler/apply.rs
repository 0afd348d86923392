//! Apply-translation collaborator.
//!
//! Decides once, at lowering time, between a statically-dispatched remote
//! call (both targets resolved to compile-time atoms) and the fully dynamic
//! runtime apply.

use crate::compiler::ast::{Form, Span};
use crate::compiler::ir::{Callee, Ir, RUNTIME_MODULE};
use crate::compiler::scope::Scope;
use crate::compiler::translate;
use crate::ExpandError;

/// Translate an `apply(left, right, args)` site whose argument list is a
/// literal sequence. `left` and `right` are already lowered under their
/// respective scopes; the argument list is lowered here.
pub fn translate_apply(
    span: Span,
    left: Ir,
    right: Ir,
    args: &[Form],
    original: &Scope,
    scope_left: Scope,
    scope_right: Scope,
) -> Result<(Ir, Scope), ExpandError> {
    let base = original.merge(&scope_left).merge(&scope_right);
    let (lowered, scope) = translate::translate_sequence(args, base)?;
    let static_target = matches!((&left, &right), (Ir::Atom { .. }, Ir::Atom { .. }));
    let call = if static_target {
        let name = match &right {
            Ir::Atom { name, .. } => name.clone(),
            _ => String::new(),
        };
        Ir::Call {
            callee: Callee::Remote { module: Box::new(left), name },
            args: lowered,
            span,
        }
    } else {
        Ir::Call {
            callee: Callee::runtime(RUNTIME_MODULE, "apply"),
            args: vec![left, right, Ir::List { items: lowered, span }],
            span,
        }
    };
    Ok((call, scope))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::testing_helpers::*;

    #[test]
    fn test_atom_targets_dispatch_statically() {
        let scope = Scope::new("test.az");
        let left = Ir::Atom { name: "Net".to_string(), span: sp() };
        let right = Ir::Atom { name: "connect".to_string(), span: sp() };
        let (ir, _) = translate_apply(
            sp(),
            left,
            right,
            &[int(1)],
            &scope,
            scope.clone(),
            scope.clone(),
        )
        .unwrap();
        let Ir::Call { callee: Callee::Remote { name, .. }, args, .. } = ir else {
            panic!("expected remote call, got {ir:?}");
        };
        assert_eq!(name, "connect");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_dynamic_target_falls_back_to_runtime_apply() {
        let mut scope = Scope::new("test.az");
        let id = scope.bind("m");
        let left = Ir::Var { name: "m".to_string(), id: Some(id), span: sp() };
        let right = Ir::Atom { name: "connect".to_string(), span: sp() };
        let (ir, _) = translate_apply(
            sp(),
            left,
            right,
            &[int(1), int(2)],
            &scope,
            scope.clone(),
            scope.clone(),
        )
        .unwrap();
        let Ir::Call { callee: Callee::Runtime { module, name }, args, .. } = ir else {
            panic!("expected runtime apply, got {ir:?}");
        };
        assert_eq!((module.as_str(), name.as_str()), (RUNTIME_MODULE, "apply"));
        assert_eq!(args.len(), 3);
        assert!(matches!(&args[2], Ir::List { items, .. } if items.len() == 2));
    }
}
