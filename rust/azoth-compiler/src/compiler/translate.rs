//! General expression translator.
//!
//! Handles ordinary sub-expressions and hands every special form to
//! [`crate::compiler::special`]. Sibling forms are always translated
//! left-to-right, each receiving the scope produced by the previous one.

use crate::compiler::ast::Form;
use crate::compiler::ir::{Callee, Ir};
use crate::compiler::scope::Scope;
use crate::compiler::special;
use crate::ExpandError;

/// Translate one surface form into a core form, threading the scope.
pub fn translate(form: &Form, scope: Scope) -> Result<(Ir, Scope), ExpandError> {
    match form {
        Form::Int { value, span } => Ok((Ir::Int { value: *value, span: *span }, scope)),
        Form::Float { value, span } => Ok((Ir::Float { value: *value, span: *span }, scope)),
        Form::Atom { name, span } => {
            Ok((Ir::Atom { name: name.clone(), span: *span }, scope))
        }
        Form::Str { value, span } => {
            Ok((Ir::Str { value: value.clone(), span: *span }, scope))
        }
        Form::Var { name, span } => {
            let mut scope = scope;
            let id = match scope.lookup(name) {
                Some(id) => id,
                None => Some(scope.bind(name)),
            };
            Ok((Ir::Var { name: name.clone(), id, span: *span }, scope))
        }
        Form::ModPath { segments, rooted, span } => {
            let name = resolve_path(segments, *rooted, &scope);
            Ok((Ir::Atom { name, span: *span }, scope))
        }
        Form::Block { forms, span } => {
            let (forms, scope) = translate_sequence(forms, scope)?;
            Ok((Ir::Seq { forms, span: *span }, scope))
        }
        Form::List { items, span } => {
            let (items, scope) = translate_sequence(items, scope)?;
            Ok((Ir::List { items, span: *span }, scope))
        }
        Form::Tuple { items, span } => {
            let (items, scope) = translate_sequence(items, scope)?;
            Ok((Ir::Tuple { items, span: *span }, scope))
        }
        Form::Call { name, args, span } => {
            let (args, scope) = translate_sequence(args, scope)?;
            let callee = Callee::Local { name: name.clone() };
            Ok((Ir::Call { callee, args, span: *span }, scope))
        }
        Form::Remote { module, name, args, span } => {
            let (module, scope) = translate(module, scope)?;
            let (args, scope) = translate_sequence(args, scope)?;
            let callee = Callee::Remote { module: Box::new(module), name: name.clone() };
            Ok((Ir::Call { callee, args, span: *span }, scope))
        }
        Form::Arrow { span, .. } | Form::When { span, .. } => {
            Err(ExpandError::syntax(&scope.file, *span, "unexpected clause outside of a block"))
        }
        Form::Op { .. }
        | Form::Attribute { .. }
        | Form::Case { .. }
        | Form::Try { .. }
        | Form::Receive { .. }
        | Form::DefModule { .. }
        | Form::Def { .. }
        | Form::Apply { .. }
        | Form::ForceVar { .. }
        | Form::AliasDirective { .. } => special::expand(form, scope),
    }
}

/// Translate a sequence of forms, threading the scope across the sequence.
pub fn translate_sequence(
    forms: &[Form],
    scope: Scope,
) -> Result<(Vec<Ir>, Scope), ExpandError> {
    let mut out = Vec::with_capacity(forms.len());
    let mut scope = scope;
    for form in forms {
        let (ir, next) = translate(form, scope)?;
        out.push(ir);
        scope = next;
    }
    Ok((out, scope))
}

/// Resolve a dotted module path to its full name. Rooted paths bypass the
/// alias table; otherwise an alias on the first segment rewrites it.
pub fn resolve_path(segments: &[String], rooted: bool, scope: &Scope) -> String {
    if !rooted {
        if let Some((first, rest)) = segments.split_first() {
            if let Some(target) = scope.resolve_alias(first) {
                let mut name = target.to_string();
                for segment in rest {
                    name.push('.');
                    name.push_str(segment);
                }
                return name;
            }
        }
    }
    segments.join(".")
}
