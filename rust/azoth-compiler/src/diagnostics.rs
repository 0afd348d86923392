//! Rendering of expansion errors as human-readable diagnostics.

use crate::ExpandError;

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

/// A rendered diagnostic with source location
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<String>,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn from_expand_error(err: &ExpandError) -> Diagnostic {
        let (code, file, line, message) = match err {
            ExpandError::Syntax { file, line, message } => {
                ("E0001", file.clone(), *line, message.clone())
            }
            ExpandError::Scope { file, line, message } => {
                ("E0002", file.clone(), *line, message.clone())
            }
        };
        Diagnostic {
            severity: Severity::Error,
            code: Some(code.to_string()),
            message,
            file: Some(file),
            line: Some(line),
        }
    }

    /// Render with ANSI colors for terminal
    pub fn render_ansi(&self) -> String {
        let mut out = String::new();
        let severity_label = match self.severity {
            Severity::Error => red("error"),
            Severity::Warning => yellow("warning"),
            Severity::Note => cyan("note"),
        };
        if let Some(ref code) = self.code {
            out.push_str(&format!("{}[{}]: ", severity_label, bold(code)));
        } else {
            out.push_str(&format!("{}: ", severity_label));
        }
        out.push_str(&bold(&self.message));
        out.push('\n');
        if let (Some(ref file), Some(line)) = (&self.file, self.line) {
            out.push_str(&format!("  {} {}:{}\n", cyan("-->"), file, line));
        }
        out
    }

    /// Render without colors (for LSP, tests)
    pub fn render_plain(&self) -> String {
        let mut out = String::new();
        let severity_label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        };
        if let Some(ref code) = self.code {
            out.push_str(&format!("{}[{}]: ", severity_label, code));
        } else {
            out.push_str(&format!("{}: ", severity_label));
        }
        out.push_str(&self.message);
        out.push('\n');
        if let (Some(ref file), Some(line)) = (&self.file, self.line) {
            out.push_str(&format!("  --> {}:{}\n", file, line));
        }
        out
    }
}

fn red(s: &str) -> String {
    format!("\x1b[31m{}\x1b[0m", s)
}

fn yellow(s: &str) -> String {
    format!("\x1b[33m{}\x1b[0m", s)
}

fn cyan(s: &str) -> String {
    format!("\x1b[36m{}\x1b[0m", s)
}

fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}
