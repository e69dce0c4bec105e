//! homc-par - Parser
//!
//! Turns the token stream into the Homie AST. The parser is built from
//! backtracking combinators ([`combinator`]) with explicit commit points:
//! alternations try productions in order, and once a production has seen
//! its leading keyword it commits, so later failures produce precise
//! diagnostics instead of silently trying the next alternative.
//!
//! Expressions are parsed as a flat run of terms and operators and folded
//! by precedence climbing ([`precedence`]), with an implicit function-call
//! operator inserted between adjacent terms.
//!
//! Every AST node receives the span wrapping its source extent and, for
//! expressions, a stable [`NodeId`] that the type checker later uses to
//! attach types without mutating the tree.

pub mod ast;
pub mod builder;
pub mod combinator;
mod expr;
mod helpers;
mod items;
mod pattern;
mod precedence;
mod stmt;
mod types;

pub use ast::*;
pub use combinator::{ParseOutcome, ParseState, Parser};
pub use expr::expr_parser;
pub use items::program_parser;
pub use pattern::pattern_parser;
pub use stmt::statement_parser;
pub use types::type_parser;

use homc_lex::{Token, TokenKind};
use homc_util::{DiagnosticBuilder, DiagnosticCode, Handler};

/// Parse a token stream into a program.
///
/// Error tokens left by the lexer are reported first; the grammar only
/// runs on a clean stream. Returns `None` when any diagnostic was emitted.
pub fn parse(tokens: &[Token], handler: &Handler) -> Option<Program> {
    let mut lex_errors = false;
    for token in tokens {
        if token.kind == TokenKind::Error {
            lex_errors = true;
            let text = token.text.as_str();
            if text.starts_with('"') {
                DiagnosticBuilder::error("unterminated string literal")
                    .code(DiagnosticCode::E_LEX_UNTERMINATED_STRING)
                    .span(token.span)
                    .emit(handler);
            } else {
                DiagnosticBuilder::error(format!("unrecognized symbol `{}`", text))
                    .code(DiagnosticCode::E_LEX_UNKNOWN_SYMBOL)
                    .span(token.span)
                    .emit(handler);
            }
        }
    }
    if lex_errors {
        return None;
    }

    let mut state = ParseState::new(tokens);
    match program_parser().run(&mut state, false) {
        ParseOutcome::Ok(program) => Some(program),
        ParseOutcome::Backtracked => {
            handler.emit_diagnostic(combinator::internal_diag(state.peek().span));
            None
        }
        ParseOutcome::Err(diags) => {
            for diag in diags {
                handler.emit_diagnostic(diag);
            }
            None
        }
    }
}
