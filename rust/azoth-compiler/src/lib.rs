//! Azoth Compiler — special-form lowering
//!
//! Converts the fixed set of Azoth surface special forms (operators,
//! attribute access, `case`/`try`/`receive`, module and function
//! definitions, dynamic-call sites and forced-variable references) into the
//! core IR consumed by the rest of the compiler. Ordinary sub-expressions
//! go through the general translator in [`compiler::translate`]; the scope
//! state threaded through every call lives in [`compiler::scope`].

pub mod compiler;
pub mod diagnostics;

use compiler::ast::{Form, Span};
use compiler::ir::Ir;
use compiler::scope::Scope;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Expand options ──────────────────────────────────────────────────

/// Options controlling the lowering stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExpandOptions {
    /// Strip `@doc`/`@moduledoc` attributes instead of storing them.
    /// Default: `false`.
    pub strip_docs: bool,
}

/// A fatal lowering failure. Errors are raised at the point of detection
/// and abort the current compilation unit; no partial core form is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    /// Malformed form shape.
    #[error("{file}:{line}: syntax error: {message}")]
    Syntax { file: String, line: usize, message: String },
    /// A form used outside its required lexical context.
    #[error("{file}:{line}: scope error: {message}")]
    Scope { file: String, line: usize, message: String },
}

impl ExpandError {
    pub fn syntax(file: &str, span: Span, message: impl Into<String>) -> ExpandError {
        ExpandError::Syntax { file: file.to_string(), line: span.line, message: message.into() }
    }

    pub fn scope_error(file: &str, span: Span, message: impl Into<String>) -> ExpandError {
        ExpandError::Scope { file: file.to_string(), line: span.line, message: message.into() }
    }

    pub fn line(&self) -> usize {
        match self {
            ExpandError::Syntax { line, .. } | ExpandError::Scope { line, .. } => *line,
        }
    }
}

/// Lower one surface form under an existing scope.
pub fn expand(form: &Form, scope: Scope) -> Result<(Ir, Scope), ExpandError> {
    compiler::special::expand(form, scope)
}

/// Lower one top-level compilation unit from a fresh scope.
///
/// After a successful lowering, `Scope::scheduled` lists the modules the
/// driver still has to compile, in definition order.
pub fn expand_unit(
    form: &Form,
    file: &str,
    opts: ExpandOptions,
) -> Result<(Ir, Scope), ExpandError> {
    expand(form, Scope::with_options(file, opts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ast::{DefKind, OpKind, SectionKind};
    use crate::compiler::ir::{Callee, DefPayload, Ir, META_MODULE, RUNTIME_MODULE};
    use crate::compiler::testing_helpers::*;
    use crate::compiler::translate;

    fn module_scope() -> Scope {
        let mut scope = Scope::new("test.az");
        scope.module = Some("Net".to_string());
        scope
    }

    // ── Operators ──

    #[test]
    fn test_unary_minus_folds_to_negated_literal() {
        let scope = Scope::new("test.az");
        let (folded, _) = expand(&op(OpKind::Sub, vec![int(42)]), scope.clone()).unwrap();
        let (direct, _) = translate::translate(&int(-42), scope.clone()).unwrap();
        assert_eq!(folded, direct);
        let (folded, _) = expand(&op(OpKind::Sub, vec![float(2.5)]), scope).unwrap();
        assert_eq!(folded, Ir::Float { value: -2.5, span: sp() });
    }

    #[test]
    fn test_unary_plus_is_the_literal_itself() {
        let scope = Scope::new("test.az");
        let (folded, _) = expand(&op(OpKind::Add, vec![int(7)]), scope.clone()).unwrap();
        let (direct, _) = translate::translate(&int(7), scope).unwrap();
        assert_eq!(folded, direct);
    }

    #[test]
    fn test_operators_lower_to_canonical_op_call() {
        for kind in [OpKind::Add, OpKind::Send, OpKind::Concat, OpKind::StrictEq] {
            let scope = Scope::new("test.az");
            let args = vec![int(1), int(2)];
            let (ir, _) = expand(&op(kind, args.clone()), scope.clone()).unwrap();
            let (expected_args, _) = translate::translate_sequence(&args, scope).unwrap();
            assert_eq!(ir, Ir::OpCall { op: kind, args: expected_args, span: sp() });
        }
    }

    #[test]
    fn test_expand_and_translate_agree_on_operators() {
        let form = op(OpKind::Mul, vec![var("x"), int(3)]);
        let (via_expand, _) = expand(&form, Scope::new("test.az")).unwrap();
        let (via_translate, _) = translate::translate(&form, Scope::new("test.az")).unwrap();
        assert_eq!(via_expand, via_translate);
    }

    // ── Attribute access ──

    #[test]
    fn test_attribute_with_value_lowers_to_merge() {
        let (ir, _) = expand(&attr("timeout", vec![int(50)]), module_scope()).unwrap();
        let Ir::Call { callee: Callee::Runtime { module, name }, args, .. } = ir else {
            panic!("expected runtime call, got {ir:?}");
        };
        assert_eq!((module.as_str(), name.as_str()), (META_MODULE, "merge"));
        assert_eq!(args[0], Ir::Atom { name: "Net".to_string(), span: sp() });
    }

    #[test]
    fn test_attribute_without_value_lowers_to_read() {
        let (ir, _) = expand(&attr("timeout", vec![]), module_scope()).unwrap();
        let Ir::Call { callee: Callee::Runtime { name, .. }, args, .. } = ir else {
            panic!("expected runtime call, got {ir:?}");
        };
        assert_eq!(name, "read");
        assert_eq!(args[1], Ir::Atom { name: "timeout".to_string(), span: sp() });
    }

    #[test]
    fn test_attribute_with_two_args_reports_count() {
        let err = expand(&attr("timeout", vec![int(1), int(2)]), module_scope()).unwrap_err();
        let ExpandError::Syntax { message, .. } = err else {
            panic!("expected syntax error, got {err:?}");
        };
        assert!(message.contains("@timeout"));
        assert!(message.contains("got 2"));
    }

    #[test]
    fn test_attribute_outside_module_is_a_scope_error() {
        let err = expand(&attr("timeout", vec![int(1)]), Scope::new("test.az")).unwrap_err();
        assert!(matches!(err, ExpandError::Scope { .. }));
        let mut inside_fun = module_scope();
        inside_fun.function = Some("connect".to_string());
        let err = expand(&attr("timeout", vec![int(1)]), inside_fun).unwrap_err();
        assert!(matches!(err, ExpandError::Scope { .. }));
    }

    #[test]
    fn test_doc_attributes_strip_under_flag() {
        let mut scope = module_scope();
        scope.opts.strip_docs = true;
        for name in ["doc", "moduledoc"] {
            let (ir, _) = expand(&attr(name, vec![str_lit("docs")]), scope.clone()).unwrap();
            assert_eq!(ir, Ir::nil(sp()));
        }
        // without the flag the attribute still merges
        let (ir, _) = expand(&attr("doc", vec![str_lit("docs")]), module_scope()).unwrap();
        assert!(matches!(ir, Ir::Call { .. }));
    }

    // ── Case / Try / Receive ──

    #[test]
    fn test_case_lowers_scrutinee_and_clauses() {
        let form = case_form(
            var("x"),
            vec![
                arrow(vec![atom("ok")], vec![int(1)]),
                arrow_guarded(vec![var("n")], call("is_int", vec![var("n")]), vec![var("n")]),
            ],
        );
        let (ir, _) = expand(&form, Scope::new("test.az")).unwrap();
        let Ir::Case { clauses, .. } = ir else { panic!("expected case, got {ir:?}") };
        assert_eq!(clauses.len(), 2);
        assert!(clauses[1].guard.is_some());
    }

    #[test]
    fn test_try_isolates_rescue_bindings_from_after() {
        let form = try_form(vec![
            section(SectionKind::Do, vec![int(1)]),
            section(SectionKind::Rescue, vec![arrow(vec![var("e")], vec![var("e")])]),
            section(SectionKind::After, vec![var("e")]),
        ]);
        let (ir, _) = expand(&form, Scope::new("test.az")).unwrap();
        let Ir::Try { handlers, after, .. } = ir else { panic!("expected try, got {ir:?}") };
        let Ir::Var { id: Some(rescue_id), .. } = &handlers[0].patterns[0] else {
            panic!("expected bound rescue var");
        };
        // `e` is not visible in the after section: it re-binds fresh
        let Ir::Var { id: Some(after_id), .. } = &after[0] else {
            panic!("expected bound after var");
        };
        assert_ne!(rescue_id, after_id);
        assert!(after_id > rescue_id);
    }

    #[test]
    fn test_try_counter_is_monotonic_across_branches() {
        let do_body = vec![var("a")];
        let base = Scope::new("test.az");
        let (_, s_do) = translate::translate_sequence(&do_body, base.clone()).unwrap();
        let form = try_form(vec![
            section(SectionKind::Do, do_body),
            section(SectionKind::Rescue, vec![arrow(vec![var("e")], vec![int(0)])]),
        ]);
        let (_, merged) = expand(&form, base).unwrap();
        assert!(merged.counter() >= s_do.counter());
    }

    #[test]
    fn test_try_do_only_counter() {
        // no rescue/catch/after: the do advance still folds into the merge
        let base = Scope::new("test.az");
        let form = try_form(vec![section(SectionKind::Do, vec![var("a"), var("b")])]);
        let (_, merged) = expand(&form, base).unwrap();
        assert_eq!(merged.counter(), 2);
        assert_eq!(merged.lookup("a"), None);
    }

    #[test]
    fn test_try_unpacks_single_block_do_body() {
        let form = try_form(vec![section(
            SectionKind::Do,
            vec![block(vec![int(1), int(2)])],
        )]);
        let (ir, _) = expand(&form, Scope::new("test.az")).unwrap();
        let Ir::Try { body, .. } = ir else { panic!("expected try") };
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn test_try_conflates_rescue_and_catch_handlers() {
        let form = try_form(vec![
            section(SectionKind::Do, vec![int(1)]),
            section(SectionKind::Rescue, vec![arrow(vec![atom("error")], vec![int(1)])]),
            section(SectionKind::Catch, vec![arrow(vec![atom("exit")], vec![int(2)])]),
        ]);
        let (ir, _) = expand(&form, Scope::new("test.az")).unwrap();
        let Ir::Try { handlers, after, .. } = ir else { panic!("expected try") };
        assert_eq!(handlers.len(), 2);
        assert!(after.is_empty());
    }

    #[test]
    fn test_try_without_do_is_a_syntax_error() {
        let form = try_form(vec![section(SectionKind::After, vec![int(1)])]);
        let err = expand(&form, Scope::new("test.az")).unwrap_err();
        assert!(matches!(err, ExpandError::Syntax { .. }));
    }

    #[test]
    fn test_receive_splits_timeout_off_the_end() {
        let form = receive_form(vec![
            section(
                SectionKind::Do,
                vec![
                    arrow(vec![atom("ping")], vec![atom("pong")]),
                    arrow(vec![atom("stop")], vec![atom("bye")]),
                ],
            ),
            section(SectionKind::After, vec![arrow(vec![int(500)], vec![atom("late")])]),
        ]);
        let (ir, _) = expand(&form, Scope::new("test.az")).unwrap();
        let Ir::Receive { clauses, timeout: Some(timeout), .. } = ir else {
            panic!("expected receive with timeout, got {ir:?}");
        };
        // message branches keep their relative order, timeout is the last clause
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].patterns[0], Ir::Atom { name: "ping".to_string(), span: sp() });
        assert_eq!(clauses[1].patterns[0], Ir::Atom { name: "stop".to_string(), span: sp() });
        assert_eq!(*timeout.delay, Ir::Int { value: 500, span: sp() });
        assert_eq!(timeout.body, vec![Ir::Atom { name: "late".to_string(), span: sp() }]);
    }

    #[test]
    fn test_receive_without_after_has_no_timeout() {
        let form = receive_form(vec![section(
            SectionKind::Do,
            vec![arrow(vec![atom("ping")], vec![atom("pong")])],
        )]);
        let (ir, _) = expand(&form, Scope::new("test.az")).unwrap();
        assert!(matches!(ir, Ir::Receive { timeout: None, .. }));
    }

    #[test]
    fn test_empty_receive_is_a_syntax_error() {
        let err = expand(&receive_form(vec![]), Scope::new("test.az")).unwrap_err();
        assert!(matches!(err, ExpandError::Syntax { .. }));
    }

    // ── Module definitions ──

    #[test]
    fn test_nested_module_is_renamed_aliased_and_scheduled() {
        let form = defmodule(
            modpath(&["A"]),
            vec![defmodule(modpath(&["B"]), vec![])],
        );
        let (ir, scope) = expand_unit(&form, "test.az", ExpandOptions::default()).unwrap();
        assert_eq!(scope.scheduled, vec!["A".to_string(), "A.B".to_string()]);
        let Ir::ModuleDef { body, .. } = ir else { panic!("expected module def, got {ir:?}") };
        let Ir::Seq { forms, .. } = &body[0] else {
            panic!("expected implicit alias + module pair, got {:?}", body[0]);
        };
        assert_eq!(
            forms[0],
            Ir::Alias { name: "B".to_string(), target: "A.B".to_string(), span: sp() }
        );
        let Ir::ModuleDef { name, .. } = &forms[1] else {
            panic!("expected nested module def, got {:?}", forms[1]);
        };
        assert_eq!(**name, Ir::Atom { name: "A.B".to_string(), span: sp() });
    }

    #[test]
    fn test_top_level_module_is_not_nested_or_aliased() {
        let form = defmodule(modpath(&["B"]), vec![]);
        let (ir, scope) = expand_unit(&form, "test.az", ExpandOptions::default()).unwrap();
        assert_eq!(scope.scheduled, vec!["B".to_string()]);
        assert!(matches!(ir, Ir::ModuleDef { .. }));
    }

    #[test]
    fn test_rooted_reference_skips_nesting() {
        let inner = defmodule(rooted_path(&["B"]), vec![]);
        let form = defmodule(modpath(&["A"]), vec![inner]);
        let (_, scope) = expand_unit(&form, "test.az", ExpandOptions::default()).unwrap();
        assert_eq!(scope.scheduled, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_module_without_do_is_a_syntax_error() {
        let form = Form::DefModule {
            reference: Box::new(modpath(&["A"])),
            sections: vec![],
            span: sp(),
        };
        let err = expand(&form, Scope::new("test.az")).unwrap_err();
        let ExpandError::Syntax { message, .. } = err else { panic!("expected syntax error") };
        assert_eq!(message, "expected do: argument");
    }

    #[test]
    fn test_dynamic_module_reference_skips_scheduling() {
        let form = Form::DefModule {
            reference: Box::new(var("m")),
            sections: vec![section(SectionKind::Do, vec![])],
            span: sp(),
        };
        let (ir, scope) = expand_unit(&form, "test.az", ExpandOptions::default()).unwrap();
        assert!(scope.scheduled.is_empty());
        assert!(matches!(ir, Ir::ModuleDef { .. }));
    }

    // ── Definitions ──

    #[test]
    fn test_deferred_def_keeps_scope_unchanged() {
        let scope = module_scope();
        let head = when(call("size", vec![var("x")]), call("is_list", vec![var("x")]));
        let body = block(vec![call("length", vec![var("x")])]);
        let form = def_form(DefKind::Fun, vec![head, body.clone()]);
        let (ir, out) = expand(&form, scope.clone()).unwrap();
        assert_eq!(out, scope);
        let Ir::Define(def) = ir else { panic!("expected definition") };
        let DefPayload::Deferred { name, args, guard, body: kept } = def.payload else {
            panic!("expected deferred payload");
        };
        assert_eq!(name, "size");
        assert_eq!(args, vec![var("x")]);
        assert_eq!(guard, Some(call("is_list", vec![var("x")])));
        assert_eq!(kept, Some(body));
    }

    #[test]
    fn test_one_argument_def_is_a_declaration() {
        let form = def_form(DefKind::Macro, vec![call("debug", vec![var("expr")])]);
        let (ir, _) = expand(&form, module_scope()).unwrap();
        let Ir::Define(def) = ir else { panic!("expected definition") };
        assert_eq!(def.kind, DefKind::Macro);
        assert!(matches!(def.payload, DefPayload::Deferred { body: None, .. }));
    }

    #[test]
    fn test_expanded_def_translates_head_and_keeps_body_opaque() {
        let body = block(vec![var("x")]);
        let form = def_form(
            DefKind::Fun,
            vec![
                atom("size"),
                list(vec![var("x")]),
                list(vec![call("is_list", vec![var("x")])]),
                body.clone(),
            ],
        );
        let (ir, out) = expand(&form, module_scope()).unwrap();
        // head translation advanced the counter; body stayed opaque
        assert!(out.counter() > 0);
        let Ir::Define(def) = ir else { panic!("expected definition") };
        let DefPayload::Expanded { args, guards, body: kept, .. } = def.payload else {
            panic!("expected expanded payload");
        };
        assert_eq!(args.len(), 1);
        assert_eq!(guards.len(), 1);
        assert_eq!(kept, body);
    }

    #[test]
    fn test_all_def_kinds_require_module_scope() {
        for kind in [DefKind::Fun, DefKind::PrivFun, DefKind::Macro, DefKind::PrivMacro] {
            let form = def_form(kind, vec![call("f", vec![])]);
            let err = expand(&form, Scope::new("test.az")).unwrap_err();
            assert!(matches!(err, ExpandError::Scope { .. }), "{kind} should need a module");
        }
    }

    #[test]
    fn test_def_with_three_args_is_a_syntax_error() {
        let form = def_form(DefKind::Fun, vec![atom("a"), atom("b"), atom("c")]);
        let err = expand(&form, module_scope()).unwrap_err();
        assert!(matches!(err, ExpandError::Syntax { .. }));
    }

    // ── Dynamic calls ──

    #[test]
    fn test_apply_with_literal_args_routes_to_static_dispatch() {
        let form = apply_form(vec![
            modpath(&["Net"]),
            atom("connect"),
            list(vec![int(1), int(2)]),
        ]);
        let (ir, _) = expand(&form, Scope::new("test.az")).unwrap();
        let Ir::Call { callee: Callee::Remote { module, name }, args, .. } = ir else {
            panic!("expected static dispatch, got {ir:?}");
        };
        assert_eq!(*module, Ir::Atom { name: "Net".to_string(), span: sp() });
        assert_eq!(name, "connect");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_apply_with_dynamic_args_routes_to_runtime_apply() {
        let form = apply_form(vec![var("target")]);
        let (ir, _) = expand(&form, Scope::new("test.az")).unwrap();
        let Ir::Call { callee: Callee::Runtime { module, name }, .. } = ir else {
            panic!("expected runtime apply, got {ir:?}");
        };
        assert_eq!((module.as_str(), name.as_str()), (RUNTIME_MODULE, "apply"));
    }

    // ── Forced variables ──

    #[test]
    fn test_force_var_binds_literal_name() {
        let (ir, scope) = expand(&force_var(vec![var("x")]), Scope::new("test.az")).unwrap();
        assert_eq!(ir, Ir::Var { name: "x".to_string(), id: None, span: sp() });
        // later plain reads keep resolving non-hygienically
        let (again, _) = translate::translate(&var("x"), scope).unwrap();
        assert_eq!(again, Ir::Var { name: "x".to_string(), id: None, span: sp() });
    }

    #[test]
    fn test_force_var_rejects_bad_shapes() {
        for args in [vec![int(1)], vec![var("x"), var("y")], vec![]] {
            let err = expand(&force_var(args), Scope::new("test.az")).unwrap_err();
            let ExpandError::Syntax { message, .. } = err else {
                panic!("expected syntax error");
            };
            assert_eq!(message, "invalid args for var!");
        }
    }

    #[test]
    fn test_force_var_is_rejected_inside_try() {
        let form = try_form(vec![section(SectionKind::Do, vec![force_var(vec![var("x")])])]);
        let err = expand(&form, Scope::new("test.az")).unwrap_err();
        assert!(matches!(err, ExpandError::Scope { .. }));
    }
}
