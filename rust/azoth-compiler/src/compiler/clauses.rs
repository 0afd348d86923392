//! Pattern-clause extraction and the shared pattern-match compiler.
//!
//! `case`, `receive` and `try` handlers all funnel through
//! [`extract_clauses`] and [`lower_clauses`]; definition heads use
//! [`extract_guard`] and [`extract_name_and_args`].

use crate::compiler::ast::{Form, SectionKind, Span};
use crate::compiler::ir::IrClause;
use crate::compiler::scope::Scope;
use crate::compiler::translate;
use crate::ExpandError;

/// An extracted `(patterns, guard, body)` clause, still in surface syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub patterns: Vec<Form>,
    pub guard: Option<Form>,
    pub body: Vec<Form>,
    pub span: Span,
}

/// Extract the ordered clause list from a section block. Every form in the
/// block must be an arrow clause.
pub fn extract_clauses(
    span: Span,
    kind: SectionKind,
    block: &[Form],
    scope: &Scope,
) -> Result<Vec<Clause>, ExpandError> {
    let mut clauses = Vec::with_capacity(block.len());
    for form in block {
        match form {
            Form::Arrow { patterns, guard, body, span } => clauses.push(Clause {
                patterns: patterns.clone(),
                guard: guard.as_deref().cloned(),
                body: body.clone(),
                span: *span,
            }),
            other => {
                return Err(ExpandError::syntax(
                    &scope.file,
                    other.span(),
                    format!("expected -> clauses in {kind} at line {}", span.line),
                ));
            }
        }
    }
    Ok(clauses)
}

/// Split a guarded definition head into the bare head and its guard.
pub fn extract_guard(call: &Form) -> (Form, Option<Form>) {
    match call {
        Form::When { head, guard, .. } => ((**head).clone(), Some((**guard).clone())),
        other => (other.clone(), None),
    }
}

/// Extract the definition name and argument patterns from a guard-stripped
/// head. A bare identifier is a zero-argument head.
pub fn extract_name_and_args(
    scope: &Scope,
    head: &Form,
) -> Result<(String, Vec<Form>), ExpandError> {
    match head {
        Form::Call { name, args, .. } => Ok((name.clone(), args.clone())),
        Form::Var { name, .. } => Ok((name.clone(), Vec::new())),
        other => Err(ExpandError::syntax(&scope.file, other.span(), "invalid definition head")),
    }
}

/// Lower a clause list. Each clause is lowered from the same base scope, so
/// bindings made in one clause are invisible to its siblings; the returned
/// scope is the base merged with every explored clause.
pub fn lower_clauses(
    _span: Span,
    clauses: &[Clause],
    scope: Scope,
) -> Result<(Vec<IrClause>, Scope), ExpandError> {
    let base = scope;
    let mut merged = base.clone();
    let mut out = Vec::with_capacity(clauses.len());
    for clause in clauses {
        let mut branch = base.clone();
        let mut patterns = Vec::with_capacity(clause.patterns.len());
        for pattern in &clause.patterns {
            let (ir, next) = translate::translate(pattern, branch)?;
            patterns.push(ir);
            branch = next;
        }
        let guard = match &clause.guard {
            Some(guard) => {
                let (ir, next) = translate::translate(guard, branch)?;
                branch = next;
                Some(ir)
            }
            None => None,
        };
        let (body, branch) = translate::translate_sequence(&clause.body, branch)?;
        merged = merged.merge(&branch);
        out.push(IrClause { patterns, guard, body, span: clause.span });
    }
    Ok((out, merged))
}
