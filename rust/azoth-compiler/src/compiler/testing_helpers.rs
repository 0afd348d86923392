//! Form-construction helpers shared by the unit tests.
//!
//! Everything is span-less (dummy spans): the tests care about structure,
//! not source locations.

use crate::compiler::ast::{DefKind, Form, OpKind, Section, SectionKind, Span};

pub fn sp() -> Span {
    Span::dummy()
}

pub fn int(value: i64) -> Form {
    Form::Int { value, span: sp() }
}

pub fn float(value: f64) -> Form {
    Form::Float { value, span: sp() }
}

pub fn atom(name: &str) -> Form {
    Form::Atom { name: name.to_string(), span: sp() }
}

pub fn str_lit(value: &str) -> Form {
    Form::Str { value: value.to_string(), span: sp() }
}

pub fn var(name: &str) -> Form {
    Form::Var { name: name.to_string(), span: sp() }
}

pub fn modpath(segments: &[&str]) -> Form {
    Form::ModPath {
        segments: segments.iter().map(|s| s.to_string()).collect(),
        rooted: false,
        span: sp(),
    }
}

pub fn rooted_path(segments: &[&str]) -> Form {
    Form::ModPath {
        segments: segments.iter().map(|s| s.to_string()).collect(),
        rooted: true,
        span: sp(),
    }
}

pub fn block(forms: Vec<Form>) -> Form {
    Form::Block { forms, span: sp() }
}

pub fn list(items: Vec<Form>) -> Form {
    Form::List { items, span: sp() }
}

pub fn tuple(items: Vec<Form>) -> Form {
    Form::Tuple { items, span: sp() }
}

pub fn call(name: &str, args: Vec<Form>) -> Form {
    Form::Call { name: name.to_string(), args, span: sp() }
}

pub fn arrow(patterns: Vec<Form>, body: Vec<Form>) -> Form {
    Form::Arrow { patterns, guard: None, body, span: sp() }
}

pub fn arrow_guarded(patterns: Vec<Form>, guard: Form, body: Vec<Form>) -> Form {
    Form::Arrow { patterns, guard: Some(Box::new(guard)), body, span: sp() }
}

pub fn when(head: Form, guard: Form) -> Form {
    Form::When { head: Box::new(head), guard: Box::new(guard), span: sp() }
}

pub fn op(kind: OpKind, args: Vec<Form>) -> Form {
    Form::Op { op: kind, args, span: sp() }
}

pub fn attr(name: &str, args: Vec<Form>) -> Form {
    Form::Attribute { name: name.to_string(), args, span: sp() }
}

pub fn section(kind: SectionKind, body: Vec<Form>) -> Section {
    Section::new(kind, body, sp())
}

pub fn case_form(scrutinee: Form, clauses: Vec<Form>) -> Form {
    Form::Case { scrutinee: Box::new(scrutinee), block: clauses, span: sp() }
}

pub fn try_form(sections: Vec<Section>) -> Form {
    Form::Try { sections, span: sp() }
}

pub fn receive_form(sections: Vec<Section>) -> Form {
    Form::Receive { sections, span: sp() }
}

pub fn defmodule(reference: Form, body: Vec<Form>) -> Form {
    Form::DefModule {
        reference: Box::new(reference),
        sections: vec![section(SectionKind::Do, body)],
        span: sp(),
    }
}

pub fn def_form(kind: DefKind, args: Vec<Form>) -> Form {
    Form::Def { kind, args, span: sp() }
}

pub fn apply_form(args: Vec<Form>) -> Form {
    Form::Apply { args, span: sp() }
}

pub fn force_var(args: Vec<Form>) -> Form {
    Form::ForceVar { args, span: sp() }
}
