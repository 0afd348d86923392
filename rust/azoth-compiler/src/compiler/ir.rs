//! Core IR emitted by the lowering stage and consumed by later passes.

use crate::compiler::ast::{DefKind, Form, OpKind, Span};
use serde::{Deserialize, Serialize};

/// Runtime service handling module attribute storage.
pub const META_MODULE: &str = "azoth_meta";
/// Runtime service backing fully dynamic invocation.
pub const RUNTIME_MODULE: &str = "azoth_runtime";

/// A lowered core form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Ir {
    Int {
        value: i64,
        span: Span,
    },
    Float {
        value: f64,
        span: Span,
    },
    Atom {
        name: String,
        span: Span,
    },
    Str {
        value: String,
        span: Span,
    },
    /// Variable reference. `id: Some(n)` is the hygienic rename; `id: None`
    /// binds the literal written name (the `var!` escape hatch).
    Var {
        name: String,
        id: Option<u32>,
        span: Span,
    },
    Seq {
        forms: Vec<Ir>,
        span: Span,
    },
    List {
        items: Vec<Ir>,
        span: Span,
    },
    Tuple {
        items: Vec<Ir>,
        span: Span,
    },
    /// Canonical operator-call form.
    OpCall {
        op: OpKind,
        args: Vec<Ir>,
        span: Span,
    },
    Call {
        callee: Callee,
        args: Vec<Ir>,
        span: Span,
    },
    Case {
        scrutinee: Box<Ir>,
        clauses: Vec<IrClause>,
        span: Span,
    },
    Try {
        body: Vec<Ir>,
        handlers: Vec<IrClause>,
        after: Vec<Ir>,
        span: Span,
    },
    Receive {
        clauses: Vec<IrClause>,
        timeout: Option<Timeout>,
        span: Span,
    },
    ModuleDef {
        name: Box<Ir>,
        body: Vec<Ir>,
        span: Span,
    },
    Define(Box<Definition>),
    /// Alias directive binding a short name to a full module name.
    Alias {
        name: String,
        target: String,
        span: Span,
    },
}

impl Ir {
    /// The no-op literal used where an effect is suppressed entirely.
    pub fn nil(span: Span) -> Ir {
        Ir::Atom { name: "nil".to_string(), span }
    }
}

/// Call target of a lowered call form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Callee {
    Local {
        name: String,
    },
    Remote {
        module: Box<Ir>,
        name: String,
    },
    /// Compiler-provided runtime service, never lowered further.
    Runtime {
        module: String,
        name: String,
    },
}

impl Callee {
    pub fn runtime(module: &str, name: &str) -> Callee {
        Callee::Runtime { module: module.to_string(), name: name.to_string() }
    }
}

/// A lowered pattern clause of a `case`/`receive`/`try` handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrClause {
    pub patterns: Vec<Ir>,
    pub guard: Option<Ir>,
    pub body: Vec<Ir>,
    pub span: Span,
}

/// The timeout branch of a `receive`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeout {
    pub delay: Box<Ir>,
    pub body: Vec<Ir>,
}

/// A function or macro definition, wrapped for the definition compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub kind: DefKind,
    pub span: Span,
    pub payload: DefPayload,
}

/// Definition payload shapes.
///
/// `Deferred` keeps the head pieces and body as un-lowered surface syntax
/// verbatim; the definition compiler runs its own scoping pass later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefPayload {
    Deferred {
        name: String,
        args: Vec<Form>,
        guard: Option<Form>,
        /// `None` is a declaration without implementation.
        body: Option<Form>,
    },
    Expanded {
        name: Box<Ir>,
        args: Vec<Ir>,
        guards: Vec<Ir>,
        body: Form,
    },
}
