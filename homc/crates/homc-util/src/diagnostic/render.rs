//! Deterministic text rendering for diagnostics.
//!
//! Renders a [`Diagnostic`] against the [`SourceMap`] as the familiar
//! compiler report format: a colored severity line, a `-->` location line,
//! the affected source with caret squiggles underneath, and each secondary
//! label with its own snippet. Multi-line spans are drawn with `/-`, `|`,
//! `\-` gutter bars.
//!
//! The output is a pure function of the input: identical diagnostics and
//! sources produce byte-identical text (modulo the color escapes, which
//! `colored` drops automatically when not writing to a terminal).

use colored::{Color, Colorize};

use super::{Diagnostic, Handler, Level, SpanLabel};
use crate::span::{SourceFile, SourceMap, Span};

/// Render every diagnostic in the handler: warnings first, then errors,
/// each group in source order.
pub fn render_report(handler: &Handler, sources: &SourceMap) -> String {
    let mut diags = handler.diagnostics();
    diags.sort_by_key(|d| (level_rank(d.level), d.span.file_id, d.span.start));

    let mut out = String::new();
    for diag in &diags {
        out.push_str(&render_diagnostic(diag, sources));
        out.push('\n');
    }
    out
}

fn level_rank(level: Level) -> u8 {
    match level {
        Level::Warning => 0,
        Level::Error => 1,
        Level::Note => 2,
        Level::Help => 3,
    }
}

/// Render a single diagnostic
pub fn render_diagnostic(diag: &Diagnostic, sources: &SourceMap) -> String {
    let color = match diag.level {
        Level::Error => Color::Red,
        Level::Warning => Color::Yellow,
        _ => Color::Cyan,
    };

    let head = match diag.code {
        Some(code) => format!("{}[{}]: {}", diag.level, code, diag.message),
        None => format!("{}: {}", diag.level, diag.message),
    };

    let line_digits = line_digits(diag, sources);

    let mut out = String::new();
    out.push_str(&head.color(color).to_string());
    out.push('\n');
    out.push_str(&render_snippet(diag.span, None, color, line_digits, sources));

    for label in &diag.labels {
        out.push('\n');
        out.push_str(&render_label(label, line_digits, sources));
    }

    for help in &diag.helps {
        out.push('\n');
        out.push_str(&format!("{}: {}", "help".color(Color::Cyan), help));
    }

    out.push('\n');
    out
}

fn render_label(label: &SpanLabel, line_digits: usize, sources: &SourceMap) -> String {
    if label.span.is_dummy() || sources.get(label.span.file_id).is_none() {
        return format!("{}: {}", "note".color(Color::Cyan), label.message);
    }
    render_snippet(
        label.span,
        Some(&label.message),
        Color::Cyan,
        line_digits,
        sources,
    )
}

/// Width of the widest line number mentioned by the diagnostic
fn line_digits(diag: &Diagnostic, sources: &SourceMap) -> usize {
    let mut max_line = 1usize;
    let mut visit = |span: Span| {
        if let Some(file) = sources.get(span.file_id) {
            let (line, _) = file.offset_to_line_col(span.end);
            max_line = max_line.max(line);
        }
    };
    visit(diag.span);
    for label in &diag.labels {
        visit(label.span);
    }
    max_line.to_string().len()
}

fn render_snippet(
    span: Span,
    comment: Option<&str>,
    color: Color,
    line_digits: usize,
    sources: &SourceMap,
) -> String {
    let Some(file) = sources.get(span.file_id) else {
        return String::new();
    };
    let (line, column) = file.offset_to_line_col(span.start);

    let mut out = format!("--> file {}, line {}, column {}\n", file.name(), line, column);
    let parts = file.line_spans(span);
    if parts.len() == 1 {
        out.push_str(&render_single_line(&file, parts[0], color, line_digits));
    } else {
        out.push_str(&render_multi_line(&file, &parts, color, line_digits));
    }

    if let Some(comment) = comment {
        out.push('\n');
        out.push_str(comment);
    }
    out
}

/// Single-line spans are underlined with carets:
///
/// ```text
///  3 | let x = f(y);
///             ^^^^
/// ```
fn render_single_line(
    file: &SourceFile,
    part: crate::span::LineSpan,
    color: Color,
    line_digits: usize,
) -> String {
    let prefix = format!("{:>width$} | ", part.line, width = line_digits);
    let text = file.line_at(part.line).unwrap_or("");
    let pad = " ".repeat(prefix.len() + part.start_column - 1);
    let carets = "^".repeat(part.end_column - part.start_column);
    format!("{}{}\n{}{}", prefix, text, pad, carets.color(color))
}

/// Multi-line spans are drawn with gutter bars:
///
/// ```text
///  1 |   fun f() {
///    | /-----^^^^
///  2 | |     ret x;
///  3 | | }
///    | \-^
/// ```
fn render_multi_line(
    file: &SourceFile,
    parts: &[crate::span::LineSpan],
    color: Color,
    line_digits: usize,
) -> String {
    let blank = format!("{:>width$} | ", "", width = line_digits);
    let mut lines = Vec::new();

    let first = parts[0];
    let first_text = file.line_at(first.line).unwrap_or("");
    lines.push(format!(
        "{}{}{}",
        format!("{:>width$} | ", first.line, width = line_digits),
        "  ",
        first_text
    ));
    let first_underline = format!(
        "{}{}",
        "-".repeat(first.start_column - 1),
        "^".repeat(first.end_column - first.start_column)
    );
    lines.push(format!(
        "{}{}{}",
        blank,
        "/-".color(color),
        first_underline.color(color)
    ));

    for part in &parts[1..parts.len() - 1] {
        let text = file.line_at(part.line).unwrap_or("");
        lines.push(format!(
            "{}{}{}",
            format!("{:>width$} | ", part.line, width = line_digits),
            "| ".color(color),
            text
        ));
    }

    let last = parts[parts.len() - 1];
    let last_text = file.line_at(last.line).unwrap_or("");
    lines.push(format!(
        "{}{}{}",
        format!("{:>width$} | ", last.line, width = line_digits),
        "| ".color(color),
        last_text
    ));
    let last_underline = "^".repeat(last.end_column - last.start_column);
    lines.push(format!(
        "{}{}{}",
        blank,
        "\\-".color(color),
        last_underline.color(color)
    ));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticBuilder;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_render_single_line_error() {
        plain();
        let mut sources = SourceMap::new();
        let file_id = sources.add_file("test.hom", "let x = y;");
        let handler = Handler::new();
        DiagnosticBuilder::error("unknown variable `y`")
            .span(Span::with_file(8, 9, file_id, 1, 9))
            .emit(&handler);

        let report = render_report(&handler, &sources);
        assert!(report.contains("error: unknown variable `y`"));
        assert!(report.contains("--> file test.hom, line 1, column 9"));
        assert!(report.contains("1 | let x = y;"));
        assert!(report.contains("^"));
    }

    #[test]
    fn test_render_label() {
        plain();
        let mut sources = SourceMap::new();
        let file_id = sources.add_file("test.hom", "dis A { X }\ndis A { Y }");
        let handler = Handler::new();
        DiagnosticBuilder::error("duplicated dis `A`")
            .span(Span::with_file(16, 17, file_id, 2, 5))
            .label(Span::with_file(4, 5, file_id, 1, 5), "first defined here")
            .emit(&handler);

        let report = render_report(&handler, &sources);
        assert!(report.contains("duplicated dis `A`"));
        assert!(report.contains("first defined here"));
        assert!(report.contains("line 1, column 5"));
        assert!(report.contains("line 2, column 5"));
    }

    #[test]
    fn test_render_multi_line_span() {
        plain();
        let mut sources = SourceMap::new();
        let file_id = sources.add_file("test.hom", "fit x {\n  A => y\n}");
        let handler = Handler::new();
        DiagnosticBuilder::error("fit is not exhaustive")
            .span(Span::with_file(0, 18, file_id, 1, 1))
            .emit(&handler);

        let report = render_report(&handler, &sources);
        assert!(report.contains("/-"));
        assert!(report.contains("\\-"));
        assert!(report.contains("2 |"));
    }

    #[test]
    fn test_warnings_precede_errors() {
        plain();
        let mut sources = SourceMap::new();
        let file_id = sources.add_file("test.hom", "let a = 1;");
        let handler = Handler::new();
        DiagnosticBuilder::error("late error")
            .span(Span::with_file(0, 3, file_id, 1, 1))
            .emit(&handler);
        DiagnosticBuilder::warning("early warning")
            .span(Span::with_file(4, 5, file_id, 1, 5))
            .emit(&handler);

        let report = render_report(&handler, &sources);
        let warn_at = report.find("early warning").unwrap();
        let err_at = report.find("late error").unwrap();
        assert!(warn_at < err_at);
    }

    #[test]
    fn test_errors_in_source_order() {
        plain();
        let mut sources = SourceMap::new();
        let file_id = sources.add_file("test.hom", "a b");
        let handler = Handler::new();
        DiagnosticBuilder::error("second")
            .span(Span::with_file(2, 3, file_id, 1, 3))
            .emit(&handler);
        DiagnosticBuilder::error("first")
            .span(Span::with_file(0, 1, file_id, 1, 1))
            .emit(&handler);

        let report = render_report(&handler, &sources);
        assert!(report.find("first").unwrap() < report.find("second").unwrap());
    }

    #[test]
    fn test_render_is_deterministic() {
        plain();
        let mut sources = SourceMap::new();
        let file_id = sources.add_file("test.hom", "let x = y;");
        let handler = Handler::new();
        DiagnosticBuilder::error("unknown variable `y`")
            .span(Span::with_file(8, 9, file_id, 1, 9))
            .help("declare it with `let`")
            .emit(&handler);

        let once = render_report(&handler, &sources);
        let twice = render_report(&handler, &sources);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_dummy_label_becomes_note() {
        plain();
        let mut sources = SourceMap::new();
        let file_id = sources.add_file("test.hom", "f(1)");
        let handler = Handler::new();
        DiagnosticBuilder::error("argument mismatch")
            .span(Span::with_file(0, 4, file_id, 1, 1))
            .label(Span::DUMMY, "function has type (Int, Int) -> Int")
            .emit(&handler);

        let report = render_report(&handler, &sources);
        assert!(report.contains("note: function has type (Int, Int) -> Int"));
    }
}
