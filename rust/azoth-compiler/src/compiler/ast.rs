use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Source location in the original `.az` file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// 1-based line number
    pub line: usize,
    /// 1-based column number
    pub col: usize,
}

impl Span {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    pub fn dummy() -> Self {
        Self { line: 0, col: 0 }
    }
}

/// The fixed operator set recognized by the operator lowering family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum OpKind {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = "<-")]
    Send,
    #[strum(serialize = "++")]
    Concat,
    #[strum(serialize = "--")]
    Diff,
    #[strum(serialize = "not")]
    Not,
    #[strum(serialize = "and")]
    And,
    #[strum(serialize = "or")]
    Or,
    #[strum(serialize = "xor")]
    Xor,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = "<=")]
    Le,
    #[strum(serialize = ">=")]
    Ge,
    #[strum(serialize = "==")]
    Eq,
    #[strum(serialize = "!=")]
    Ne,
    #[strum(serialize = "===")]
    StrictEq,
    #[strum(serialize = "!==")]
    StrictNe,
}

/// The four definition kinds handled by the definition lowering family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum DefKind {
    #[strum(serialize = "def")]
    Fun,
    #[strum(serialize = "defp")]
    PrivFun,
    #[strum(serialize = "defmacro")]
    Macro,
    #[strum(serialize = "defmacrop")]
    PrivMacro,
}

impl DefKind {
    pub fn is_macro(self) -> bool {
        matches!(self, DefKind::Macro | DefKind::PrivMacro)
    }

    pub fn is_private(self) -> bool {
        matches!(self, DefKind::PrivFun | DefKind::PrivMacro)
    }
}

/// Keyword sections attached to block constructs (`do`, `rescue`, `catch`, `after`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum SectionKind {
    #[strum(serialize = "do")]
    Do,
    #[strum(serialize = "rescue")]
    Rescue,
    #[strum(serialize = "catch")]
    Catch,
    #[strum(serialize = "after")]
    After,
}

/// One keyword section of a `try`/`receive`/`defmodule` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub body: Vec<Form>,
    pub span: Span,
}

impl Section {
    pub fn new(kind: SectionKind, body: Vec<Form>, span: Span) -> Self {
        Self { kind, body, span }
    }
}

/// A surface-syntax form as produced by the parser.
///
/// Closed sum: one variant per form kind, so the lowering dispatch is
/// exhaustive and a new form cannot silently fall through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Form {
    // ── Ordinary forms (general translator territory) ──
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
    Var {
        name: String,
        span: Span,
    },
    /// Dotted module reference, e.g. `Net.Socket`. `rooted` when written
    /// from the top-level namespace marker and thus exempt from nesting.
    ModPath {
        segments: Vec<String>,
        rooted: bool,
        span: Span,
    },
    /// Expression sequence (implicit in `do` blocks).
    Block {
        forms: Vec<Form>,
        span: Span,
    },
    List {
        items: Vec<Form>,
        span: Span,
    },
    Tuple {
        items: Vec<Form>,
        span: Span,
    },
    /// Local call `name(args)`.
    Call {
        name: String,
        args: Vec<Form>,
        span: Span,
    },
    /// Remote call `module.name(args)`.
    Remote {
        module: Box<Form>,
        name: String,
        args: Vec<Form>,
        span: Span,
    },
    /// `patterns [when guard] -> body`, only valid inside a clause block.
    Arrow {
        patterns: Vec<Form>,
        guard: Option<Box<Form>>,
        body: Vec<Form>,
        span: Span,
    },
    /// Guarded head `head when guard`, as written on a definition call.
    When {
        head: Box<Form>,
        guard: Box<Form>,
        span: Span,
    },

    // ── Special forms (this stage's territory) ──
    Op {
        op: OpKind,
        args: Vec<Form>,
        span: Span,
    },
    /// Module attribute access `@name` / `@name value`.
    Attribute {
        name: String,
        args: Vec<Form>,
        span: Span,
    },
    Case {
        scrutinee: Box<Form>,
        block: Vec<Form>,
        span: Span,
    },
    Try {
        sections: Vec<Section>,
        span: Span,
    },
    Receive {
        sections: Vec<Section>,
        span: Span,
    },
    DefModule {
        reference: Box<Form>,
        sections: Vec<Section>,
        span: Span,
    },
    Def {
        kind: DefKind,
        args: Vec<Form>,
        span: Span,
    },
    /// Explicit dynamic-call site `apply(...)`.
    Apply {
        args: Vec<Form>,
        span: Span,
    },
    /// Hygiene escape hatch `var!(name)`.
    ForceVar {
        args: Vec<Form>,
        span: Span,
    },
    /// `alias Target[, as: Name]`; also synthesized by `defmodule` nesting.
    AliasDirective {
        target: Box<Form>,
        as_name: Option<String>,
        span: Span,
    },
}

impl Form {
    pub fn span(&self) -> Span {
        match self {
            Form::Int { span, .. }
            | Form::Float { span, .. }
            | Form::Atom { span, .. }
            | Form::Str { span, .. }
            | Form::Var { span, .. }
            | Form::ModPath { span, .. }
            | Form::Block { span, .. }
            | Form::List { span, .. }
            | Form::Tuple { span, .. }
            | Form::Call { span, .. }
            | Form::Remote { span, .. }
            | Form::Arrow { span, .. }
            | Form::When { span, .. }
            | Form::Op { span, .. }
            | Form::Attribute { span, .. }
            | Form::Case { span, .. }
            | Form::Try { span, .. }
            | Form::Receive { span, .. }
            | Form::DefModule { span, .. }
            | Form::Def { span, .. }
            | Form::Apply { span, .. }
            | Form::ForceVar { span, .. }
            | Form::AliasDirective { span, .. } => *span,
        }
    }

    /// True for the literal shapes that unary `+`/`-` folding applies to.
    pub fn is_numeric_literal(&self) -> bool {
        matches!(self, Form::Int { .. } | Form::Float { .. })
    }
}
