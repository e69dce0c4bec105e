//! homc-lex - Lexical Analyzer
//!
//! Transforms Homie source text into a flat token stream with source
//! locations. Lexing happens in two stages:
//!
//! 1. **Raw scanning**: the cursor is partitioned into runs — whitespace,
//!    comments (inline `//` and nested block `/* */`), alphanumeric runs,
//!    symbolic runs, delimiters, and string literals. Runs cover the input
//!    without gaps.
//! 2. **Cooking**: whitespace and comments are dropped; alphanumeric runs
//!    become keywords, integer literals, or identifiers (uppercase names
//!    for types/variants, lowercase for variables); symbolic runs are split
//!    by overlapping longest match into the multi-character symbols `->`,
//!    `=>`, `::` and then single symbols.
//!
//! The lexer never fails: unterminated strings and unrecognized symbols
//! become [`TokenKind::Error`] tokens, and the parser turns those into
//! diagnostics. An explicit [`TokenKind::Eof`] token with a zero-width span
//! just past the end of the file terminates every stream.
//!
//! # Examples
//!
//! ```
//! use homc_lex::{lex, TokenKind};
//! use homc_util::span::SourceFile;
//!
//! let file = SourceFile::new(0, "demo.hom", "let x = 42;");
//! let tokens = lex(&file);
//! assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
//! assert_eq!(tokens[0].text.as_str(), "let");
//! ```

pub mod cursor;
mod lexer;
pub mod token;

pub use cursor::Cursor;
pub use lexer::Lexer;
pub use token::{Delim, Keyword, Sym, Token, TokenKind};

use homc_util::span::SourceFile;

/// Tokenize a source file
///
/// Convenience wrapper around [`Lexer`].
pub fn lex(file: &SourceFile) -> Vec<Token> {
    Lexer::new(file).lex()
}
