//! Diagnostic builder for fluent diagnostic construction.

use super::{Diagnostic, DiagnosticCode, Handler, Level, SpanLabel};
use crate::span::Span;

/// Builder for constructing diagnostics with a fluent API
///
/// # Examples
///
/// ```
/// use homc_util::diagnostic::{DiagnosticBuilder, DiagnosticCode};
/// use homc_util::span::Span;
///
/// let diag = DiagnosticBuilder::error("duplicated dis `A`")
///     .code(DiagnosticCode::E_VALIDATE_DUPLICATE)
///     .span(Span::new(10, 11, 2, 5))
///     .label(Span::new(0, 1, 1, 5), "first defined here")
///     .build();
///
/// assert_eq!(diag.labels.len(), 1);
/// ```
pub struct DiagnosticBuilder {
    level: Level,
    message: String,
    span: Span,
    code: Option<DiagnosticCode>,
    labels: Vec<SpanLabel>,
    helps: Vec<String>,
}

impl DiagnosticBuilder {
    /// Create a new diagnostic builder
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            span: Span::DUMMY,
            code: None,
            labels: Vec::new(),
            helps: Vec::new(),
        }
    }

    /// Create an error builder
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    /// Create a warning builder
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    /// Set the diagnostic code
    pub fn code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Set the primary source span
    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Attach a secondary message at its own location
    pub fn label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(SpanLabel {
            span,
            message: message.into(),
        });
        self
    }

    /// Add a help suggestion
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.helps.push(help.into());
        self
    }

    /// Build the diagnostic
    pub fn build(self) -> Diagnostic {
        Diagnostic {
            level: self.level,
            message: self.message,
            span: self.span,
            code: self.code,
            labels: self.labels,
            helps: self.helps,
        }
    }

    /// Build and emit the diagnostic to the given handler
    pub fn emit(self, handler: &Handler) {
        handler.emit_diagnostic(self.build());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_error() {
        let diag = DiagnosticBuilder::error("test error").span(Span::DUMMY).build();
        assert_eq!(diag.level, Level::Error);
        assert_eq!(diag.message, "test error");
    }

    #[test]
    fn test_builder_warning() {
        let diag = DiagnosticBuilder::warning("test warning").build();
        assert_eq!(diag.level, Level::Warning);
    }

    #[test]
    fn test_builder_fluent() {
        let diag = DiagnosticBuilder::error("type mismatch")
            .code(DiagnosticCode::E_TYPE_MISMATCH)
            .span(Span::new(0, 2, 1, 1))
            .label(Span::new(5, 6, 1, 6), "expected because of this")
            .help("try a different type")
            .build();

        assert_eq!(diag.code, Some(DiagnosticCode::E_TYPE_MISMATCH));
        assert_eq!(diag.labels.len(), 1);
        assert_eq!(diag.helps.len(), 1);
    }

    #[test]
    fn test_builder_emit() {
        let handler = Handler::new();
        DiagnosticBuilder::error("emitted").span(Span::DUMMY).emit(&handler);
        assert!(handler.has_errors());
        assert_eq!(handler.error_count(), 1);
    }
}
