//! Special-form lowering.
//!
//! Single entry point: [`expand`] receives one surface form and the ambient
//! scope, dispatches by form variant to exactly one lowering family, and
//! returns the lowered core form plus the scope for whatever follows.
//! Ordinary sub-forms go back through the general translator.

use crate::compiler::apply;
use crate::compiler::ast::{DefKind, Form, OpKind, Section, SectionKind, Span};
use crate::compiler::clauses;
use crate::compiler::defs;
use crate::compiler::ir::{Callee, Ir, Timeout, RUNTIME_MODULE};
use crate::compiler::module;
use crate::compiler::scope::Scope;
use crate::compiler::translate;
use crate::ExpandError;

/// Lower one special form. Non-special forms fall back to the general
/// translator, so `expand` is total over `Form`.
pub fn expand(form: &Form, scope: Scope) -> Result<(Ir, Scope), ExpandError> {
    match form {
        Form::Op { op, args, span } => expand_op(*op, args, *span, scope),
        Form::Attribute { name, args, span } => expand_attribute(name, args, *span, scope),
        Form::Case { scrutinee, block, span } => expand_case(scrutinee, block, *span, scope),
        Form::Try { sections, span } => expand_try(sections, *span, scope),
        Form::Receive { sections, span } => expand_receive(sections, *span, scope),
        Form::DefModule { reference, sections, span } => {
            expand_defmodule(reference, sections, *span, scope)
        }
        Form::Def { kind, args, span } => expand_def(*kind, args, *span, scope),
        Form::Apply { args, span } => expand_apply(args, *span, scope),
        Form::ForceVar { args, span } => expand_force_var(args, *span, scope),
        Form::AliasDirective { target, as_name, span } => {
            expand_alias(target, as_name.as_deref(), *span, scope)
        }
        other => translate::translate(other, scope),
    }
}

// ── Operators ──

fn expand_op(
    op: OpKind,
    args: &[Form],
    span: Span,
    scope: Scope,
) -> Result<(Ir, Scope), ExpandError> {
    match (op, args) {
        // unary + on a numeric literal: the literal itself
        (OpKind::Add, [lit]) if lit.is_numeric_literal() => translate::translate(lit, scope),
        // unary - on a numeric literal: folded negation
        (OpKind::Sub, [Form::Int { value, span }]) => {
            Ok((Ir::Int { value: value.wrapping_neg(), span: *span }, scope))
        }
        (OpKind::Sub, [Form::Float { value, span }]) => {
            Ok((Ir::Float { value: -value, span: *span }, scope))
        }
        _ => {
            let (args, scope) = translate::translate_sequence(args, scope)?;
            Ok((Ir::OpCall { op, args, span }, scope))
        }
    }
}

// ── Attribute access ──

fn expand_attribute(
    name: &str,
    args: &[Form],
    span: Span,
    scope: Scope,
) -> Result<(Ir, Scope), ExpandError> {
    if !scope.module_scope() {
        return Err(ExpandError::scope_error(
            &scope.file,
            span,
            format!("cannot access attribute @{name} outside a module"),
        ));
    }
    if scope.opts.strip_docs && (name == "doc" || name == "moduledoc") {
        return Ok((Ir::nil(span), scope));
    }
    let current = Ir::Atom { name: scope.module.clone().unwrap_or_default(), span };
    match args {
        [value] => {
            let (value, scope) = translate::translate(value, scope)?;
            Ok((module::merge_attribute(span, current, name, value), scope))
        }
        [] => Ok((module::read_attribute(span, current, name), scope)),
        more => Err(ExpandError::syntax(
            &scope.file,
            span,
            format!("@{name} expects at most one argument, got {}", more.len()),
        )),
    }
}

// ── Case / Try / Receive ──

fn expand_case(
    scrutinee: &Form,
    block: &[Form],
    span: Span,
    scope: Scope,
) -> Result<(Ir, Scope), ExpandError> {
    let clauses = clauses::extract_clauses(span, SectionKind::Do, block, &scope)?;
    let (scrutinee, scope) = translate::translate(scrutinee, scope)?;
    let (clauses, scope) = clauses::lower_clauses(span, &clauses, scope)?;
    Ok((Ir::Case { scrutinee: Box::new(scrutinee), clauses, span }, scope))
}

fn expand_try(
    sections: &[Section],
    span: Span,
    scope: Scope,
) -> Result<(Ir, Scope), ExpandError> {
    let caller = scope.clone();
    let mut base = scope;
    base.no_local_naming = true;

    let do_section = find_section(sections, SectionKind::Do).ok_or_else(|| {
        ExpandError::syntax(&base.file, span, "missing do block in try")
    })?;
    let (body, s_do) =
        translate::translate_sequence(unpack_block(&do_section.body), base.clone())?;

    // rescue and catch conflate into one exception-clause list
    let mut handler_clauses = Vec::new();
    for section in sections
        .iter()
        .filter(|s| matches!(s.kind, SectionKind::Rescue | SectionKind::Catch))
    {
        handler_clauses.extend(clauses::extract_clauses(
            section.span,
            section.kind,
            &section.body,
            &base,
        )?);
    }
    let (handlers, s_catch) =
        clauses::lower_clauses(span, &handler_clauses, base.merge(&s_do))?;

    let (after, s_last) = match find_section(sections, SectionKind::After) {
        Some(section) => {
            translate::translate_sequence(&section.body, base.merge(&s_catch))?
        }
        None => (Vec::new(), s_catch),
    };

    // branch bindings stay inside; the deepest counter advance survives
    Ok((Ir::Try { body, handlers, after, span }, caller.merge(&s_last)))
}

fn expand_receive(
    sections: &[Section],
    span: Span,
    scope: Scope,
) -> Result<(Ir, Scope), ExpandError> {
    let message_block = find_section(sections, SectionKind::Do)
        .map(|s| s.body.as_slice())
        .unwrap_or(&[]);
    match find_section(sections, SectionKind::After) {
        Some(after) => {
            let mut all =
                clauses::extract_clauses(span, SectionKind::Do, message_block, &scope)?;
            let after_clauses =
                clauses::extract_clauses(after.span, SectionKind::After, &after.body, &scope)?;
            let [timeout_clause] = after_clauses.as_slice() else {
                return Err(ExpandError::syntax(
                    &scope.file,
                    after.span,
                    "expected a single -> clause in after",
                ));
            };
            if timeout_clause.patterns.len() != 1 {
                return Err(ExpandError::syntax(
                    &scope.file,
                    after.span,
                    "expected a single timeout expression in after",
                ));
            }
            // lower message clauses and the timeout clause together so they
            // share one pattern-match compilation and one resulting scope,
            // then split the timeout clause back off the end
            all.extend(after_clauses);
            let (mut lowered, scope) = clauses::lower_clauses(span, &all, scope)?;
            let Some(timeout) = lowered.pop() else {
                return Err(ExpandError::syntax(
                    &scope.file,
                    after.span,
                    "expected a single -> clause in after",
                ));
            };
            let Some(delay) = timeout.patterns.into_iter().next() else {
                return Err(ExpandError::syntax(
                    &scope.file,
                    after.span,
                    "expected a single timeout expression in after",
                ));
            };
            let timeout = Timeout { delay: Box::new(delay), body: timeout.body };
            Ok((Ir::Receive { clauses: lowered, timeout: Some(timeout), span }, scope))
        }
        None => {
            if message_block.is_empty() {
                return Err(ExpandError::syntax(
                    &scope.file,
                    span,
                    "expected do or after block in receive",
                ));
            }
            let extracted =
                clauses::extract_clauses(span, SectionKind::Do, message_block, &scope)?;
            let (clauses, scope) = clauses::lower_clauses(span, &extracted, scope)?;
            Ok((Ir::Receive { clauses, timeout: None, span }, scope))
        }
    }
}

// ── Module definitions ──

fn expand_defmodule(
    reference: &Form,
    sections: &[Section],
    span: Span,
    scope: Scope,
) -> Result<(Ir, Scope), ExpandError> {
    // reference only; its scope effects are discarded
    let (reference_ir, _) = translate::translate(reference, scope.clone())?;
    let do_section = find_section(sections, SectionKind::Do).ok_or_else(|| {
        ExpandError::syntax(&scope.file, span, "expected do: argument")
    })?;

    let Ir::Atom { name: literal, .. } = &reference_ir else {
        // dynamic reference: no nesting, no alias, no scheduling
        return module::compile(span, reference_ir, &do_section.body, scope);
    };
    let literal = literal.clone();

    let rooted = matches!(reference, Form::ModPath { rooted: true, .. });
    let effective = match (&scope.module, rooted) {
        (Some(enclosing), false) => format!("{enclosing}.{literal}"),
        _ => literal.clone(),
    };

    let mut scope = scope;
    let alias_ir = if effective == literal {
        None
    } else {
        // nesting changed the effective name: bind the written reference's
        // first segment so short-name references resolve in this scope
        let first = first_segment(reference, &literal);
        let target = Form::ModPath {
            segments: effective.split('.').map(str::to_string).collect(),
            rooted: true,
            span,
        };
        let implicit = Form::AliasDirective {
            target: Box::new(target),
            as_name: Some(first),
            span,
        };
        let (ir, next) = expand(&implicit, scope)?;
        scope = next;
        Some(ir)
    };

    scope.schedule(effective.clone());
    let effective_ref = Ir::Atom { name: effective, span };
    let (module_ir, scope) = module::compile(span, effective_ref, &do_section.body, scope)?;
    match alias_ir {
        Some(alias) => Ok((Ir::Seq { forms: vec![alias, module_ir], span }, scope)),
        None => Ok((module_ir, scope)),
    }
}

fn expand_alias(
    target: &Form,
    as_name: Option<&str>,
    span: Span,
    scope: Scope,
) -> Result<(Ir, Scope), ExpandError> {
    let Form::ModPath { segments, rooted, .. } = target else {
        return Err(ExpandError::syntax(&scope.file, span, "invalid alias target"));
    };
    let full = translate::resolve_path(segments, *rooted, &scope);
    let short = match as_name {
        Some(name) => name.to_string(),
        None => segments.last().cloned().ok_or_else(|| {
            ExpandError::syntax(&scope.file, span, "invalid alias target")
        })?,
    };
    let mut scope = scope;
    scope.add_alias(short.clone(), full.clone());
    Ok((Ir::Alias { name: short, target: full, span }, scope))
}

// ── Function and macro definitions ──

fn expand_def(
    kind: DefKind,
    args: &[Form],
    span: Span,
    scope: Scope,
) -> Result<(Ir, Scope), ExpandError> {
    if !scope.module_scope() {
        return Err(ExpandError::scope_error(
            &scope.file,
            span,
            format!("cannot define {kind} outside a module"),
        ));
    }
    match args {
        // declaration without implementation
        [head] => expand_deferred_def(kind, head, None, span, scope),
        [head, body] => expand_deferred_def(kind, head, Some(body), span, scope),
        [name, fun_args, guards, body] => {
            let (name, scope) = translate::translate(name, scope)?;
            let (fun_args, scope) = translate_head_list(fun_args, scope)?;
            let (guards, scope) = translate_head_list(guards, scope)?;
            let ir = defs::wrap_expanded(kind, span, name, fun_args, guards, body.clone());
            // body bindings never escape; guard scope is what follows
            Ok((ir, scope))
        }
        _ => Err(ExpandError::syntax(
            &scope.file,
            span,
            format!("invalid {kind} definition"),
        )),
    }
}

fn expand_deferred_def(
    kind: DefKind,
    head: &Form,
    body: Option<&Form>,
    span: Span,
    scope: Scope,
) -> Result<(Ir, Scope), ExpandError> {
    let (head, guard) = clauses::extract_guard(head);
    let (name, args) = clauses::extract_name_and_args(&scope, &head)?;
    let ir = defs::wrap_deferred(kind, span, name, args, guard, body.cloned());
    // definitions leak no bindings: the caller scope is returned untouched
    Ok((ir, scope))
}

fn translate_head_list(form: &Form, scope: Scope) -> Result<(Vec<Ir>, Scope), ExpandError> {
    match form {
        Form::List { items, .. } => translate::translate_sequence(items, scope),
        other => {
            let (ir, scope) = translate::translate(other, scope)?;
            Ok((vec![ir], scope))
        }
    }
}

// ── Dynamic calls ──

fn expand_apply(args: &[Form], span: Span, scope: Scope) -> Result<(Ir, Scope), ExpandError> {
    match args {
        [left, right, Form::List { items, .. }] => {
            let original = scope.clone();
            let (left, s_left) = translate::translate(left, scope)?;
            let (right, s_right) = translate::translate(right, original.merge(&s_left))?;
            apply::translate_apply(span, left, right, items, &original, s_left, s_right)
        }
        _ => {
            let (args, scope) = translate::translate_sequence(args, scope)?;
            let callee = Callee::runtime(RUNTIME_MODULE, "apply");
            Ok((Ir::Call { callee, args, span }, scope))
        }
    }
}

// ── Forced variables ──

fn expand_force_var(
    args: &[Form],
    span: Span,
    scope: Scope,
) -> Result<(Ir, Scope), ExpandError> {
    if scope.no_local_naming {
        return Err(ExpandError::scope_error(
            &scope.file,
            span,
            "cannot use var! where named locals are disallowed",
        ));
    }
    match args {
        [Form::Var { name, span: var_span }] => {
            let mut scope = scope;
            scope.bind_forced(name);
            Ok((Ir::Var { name: name.clone(), id: None, span: *var_span }, scope))
        }
        _ => Err(ExpandError::syntax(&scope.file, span, "invalid args for var!")),
    }
}

// ── Helpers ──

fn find_section(sections: &[Section], kind: SectionKind) -> Option<&Section> {
    sections.iter().find(|s| s.kind == kind)
}

/// A `do` body holding a single implicit block is unpacked into its
/// sub-expressions before lowering.
fn unpack_block(body: &[Form]) -> &[Form] {
    match body {
        [Form::Block { forms, .. }] => forms,
        other => other,
    }
}

fn first_segment(reference: &Form, literal: &str) -> String {
    match reference {
        Form::ModPath { segments, .. } => segments
            .first()
            .cloned()
            .unwrap_or_else(|| literal.to_string()),
        _ => literal
            .split('.')
            .next()
            .unwrap_or(literal)
            .to_string(),
    }
}
