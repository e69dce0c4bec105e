//! Diagnostic module - Error and warning reporting infrastructure.
//!
//! This module provides types for creating, collecting, and rendering
//! compiler diagnostics. Each diagnostic has a severity [`Level`], a primary
//! message anchored at a [`Span`], and optionally a [`DiagnosticCode`],
//! secondary span labels ("first defined here", "function has type ...") and
//! help suggestions.
//!
//! Passes accumulate diagnostics into a [`Handler`]; nothing aborts on the
//! first error. The driver renders the accumulated report once the pass
//! finishes and decides from `has_errors` whether to continue the pipeline.
//!
//! # Examples
//!
//! ```
//! use homc_util::diagnostic::{DiagnosticBuilder, DiagnosticCode, Handler};
//! use homc_util::span::Span;
//!
//! let handler = Handler::new();
//! DiagnosticBuilder::error("unexpected token")
//!     .code(DiagnosticCode::E_PARSE_UNEXPECTED_TOKEN)
//!     .span(Span::DUMMY)
//!     .help("try checking the syntax")
//!     .emit(&handler);
//!
//! assert!(handler.has_errors());
//! ```

mod builder;
mod codes;
pub mod render;

pub use builder::DiagnosticBuilder;
pub use codes::DiagnosticCode;

use crate::span::Span;
use std::cell::RefCell;
use std::fmt;

/// Diagnostic severity level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// An error that prevents compilation
    Error,
    /// A warning that doesn't prevent compilation
    Warning,
    /// Additional information about a diagnostic
    Note,
    /// A suggestion for fixing an issue
    Help,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
            Level::Help => write!(f, "help"),
        }
    }
}

/// A secondary message attached to its own source location
///
/// Labels carry the "defined here" / "expected because of this" parts of a
/// diagnostic; each is rendered with its own snippet under the primary one.
#[derive(Clone, Debug)]
pub struct SpanLabel {
    /// Where the label points
    pub span: Span,
    /// What it says
    pub message: String,
}

/// A diagnostic message with severity and location
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Diagnostic severity level
    pub level: Level,
    /// Main diagnostic message
    pub message: String,
    /// Primary source location
    pub span: Span,
    /// Optional diagnostic code
    pub code: Option<DiagnosticCode>,
    /// Secondary locations with their messages
    pub labels: Vec<SpanLabel>,
    /// Help suggestions for fixing the issue
    pub helps: Vec<String>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(level: Level, message: impl Into<String>, span: Span) -> Self {
        Self {
            level,
            message: message.into(),
            span,
            code: None,
            labels: Vec::new(),
            helps: Vec::new(),
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Error, message, span)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Warning, message, span)
    }

    /// Set the diagnostic code
    pub fn with_code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach a secondary message at its own location
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(SpanLabel {
            span,
            message: message.into(),
        });
        self
    }

    /// Add a help suggestion
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.helps.push(help.into());
        self
    }
}

/// Handler for collecting diagnostics
///
/// The `Handler` is append-only within a pass; rendering and error-count
/// queries read the accumulated list.
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    /// Create a new handler
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    /// Emit a pre-built diagnostic
    pub fn emit_diagnostic(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Check if any errors have been reported
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Error)
    }

    /// Get the number of errors
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    /// Get the number of warnings
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Warning)
            .count()
    }

    /// Get all diagnostics
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Clear all diagnostics
    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_display() {
        assert_eq!(format!("{}", Level::Error), "error");
        assert_eq!(format!("{}", Level::Warning), "warning");
        assert_eq!(format!("{}", Level::Note), "note");
        assert_eq!(format!("{}", Level::Help), "help");
    }

    #[test]
    fn test_diagnostic_error() {
        let diag = Diagnostic::error("boom", Span::DUMMY);
        assert_eq!(diag.level, Level::Error);
        assert_eq!(diag.message, "boom");
    }

    #[test]
    fn test_diagnostic_warning() {
        let diag = Diagnostic::warning("careful", Span::DUMMY);
        assert_eq!(diag.level, Level::Warning);
    }

    #[test]
    fn test_diagnostic_with_code() {
        let diag =
            Diagnostic::error("dup", Span::DUMMY).with_code(DiagnosticCode::E_VALIDATE_DUPLICATE);
        assert_eq!(diag.code, Some(DiagnosticCode::E_VALIDATE_DUPLICATE));
    }

    #[test]
    fn test_diagnostic_with_label_and_help() {
        let diag = Diagnostic::error("dup", Span::DUMMY)
            .with_label(Span::new(0, 1, 1, 1), "first defined here")
            .with_help("rename one of them");
        assert_eq!(diag.labels.len(), 1);
        assert_eq!(diag.labels[0].message, "first defined here");
        assert_eq!(diag.helps, vec!["rename one of them"]);
    }

    #[test]
    fn test_handler_new() {
        let handler = Handler::new();
        assert!(!handler.has_errors());
        assert_eq!(handler.error_count(), 0);
        assert_eq!(handler.warning_count(), 0);
    }

    #[test]
    fn test_handler_counts() {
        let handler = Handler::new();
        handler.emit_diagnostic(Diagnostic::error("e1", Span::DUMMY));
        handler.emit_diagnostic(Diagnostic::warning("w1", Span::DUMMY));
        handler.emit_diagnostic(Diagnostic::error("e2", Span::DUMMY));
        assert!(handler.has_errors());
        assert_eq!(handler.error_count(), 2);
        assert_eq!(handler.warning_count(), 1);
        assert_eq!(handler.diagnostics().len(), 3);
    }

    #[test]
    fn test_handler_clear() {
        let handler = Handler::new();
        handler.emit_diagnostic(Diagnostic::error("e", Span::DUMMY));
        handler.clear();
        assert!(!handler.has_errors());
    }
}
