//! Core lexer implementation: raw scanning and token cooking.

use homc_util::span::SourceFile;
use homc_util::{Span, Symbol};

use crate::cursor::{Cursor, Mark};
use crate::token::{Delim, Keyword, Sym, Token, TokenKind};

/// Characters that form symbolic runs.
const SYMBOL_CHARS: &str = ".,:;?!<=>+-/*%^|&";

/// Multi-character symbols, tried by overlapping longest match when a
/// symbolic run is split. The set is exactly these three.
const MULTI_SYMBOLS: [(&str, Sym); 3] = [
    ("->", Sym::Arrow),
    ("=>", Sym::FatArrow),
    ("::", Sym::ColonColon),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RawKind {
    Whitespace,
    Comment,
    Alnum,
    Symbolic,
    Delim,
    /// `closed` records whether the terminating quote was found
    StringLit { closed: bool },
    Unknown,
}

struct RawToken {
    kind: RawKind,
    span: Span,
}

/// Lexer for Homie source files.
///
/// Scans the file into raw runs and cooks them into the token stream;
/// see the crate docs for the two-stage pipeline.
pub struct Lexer<'a> {
    file: &'a SourceFile,
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer over the given file.
    pub fn new(file: &'a SourceFile) -> Self {
        Self {
            file,
            cursor: Cursor::new(file.content()),
        }
    }

    /// Tokenizes the whole file.
    ///
    /// Never fails; lexing problems surface as [`TokenKind::Error`] tokens.
    /// The stream always ends with a zero-width [`TokenKind::Eof`] token.
    pub fn lex(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while !self.cursor.is_at_end() {
            let raw = self.raw_token();
            self.cook(&raw, &mut tokens);
        }

        let end = self.cursor.position();
        tokens.push(Token::new(
            Symbol::intern("<eof>"),
            TokenKind::Eof,
            Span::with_file(end, end, self.file.id(), self.cursor.line(), self.cursor.column()),
        ));
        tokens
    }

    fn span_from(&self, mark: Mark) -> Span {
        Span::with_file(
            mark.position,
            self.cursor.position(),
            self.file.id(),
            mark.line,
            mark.column,
        )
    }

    fn raw_token(&mut self) -> RawToken {
        let mark = self.cursor.mark();
        let c = self.cursor.current_char();

        let kind = if c.is_whitespace() {
            self.eat_whitespace();
            RawKind::Whitespace
        } else if self.cursor.starts_with("//") {
            self.eat_inline_comment();
            RawKind::Comment
        } else if self.cursor.starts_with("/*") {
            self.eat_block_comment();
            RawKind::Comment
        } else if is_alnum(c) {
            self.eat_while(is_alnum);
            RawKind::Alnum
        } else if SYMBOL_CHARS.contains(c) {
            self.eat_while(|c| SYMBOL_CHARS.contains(c));
            RawKind::Symbolic
        } else if Delim::from_char(c).is_some() {
            self.cursor.advance();
            RawKind::Delim
        } else if c == '"' {
            let closed = self.eat_string_literal();
            RawKind::StringLit { closed }
        } else {
            self.cursor.advance();
            RawKind::Unknown
        };

        RawToken {
            kind,
            span: self.span_from(mark),
        }
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while !self.cursor.is_at_end() && pred(self.cursor.current_char()) {
            self.cursor.advance();
        }
    }

    fn eat_whitespace(&mut self) {
        self.eat_while(char::is_whitespace);
    }

    fn eat_inline_comment(&mut self) {
        self.eat_while(|c| c != '\n');
        if !self.cursor.is_at_end() {
            self.cursor.advance();
        }
    }

    /// Block comments nest by open count.
    fn eat_block_comment(&mut self) {
        let mut open = 0usize;
        while !self.cursor.is_at_end() {
            if self.cursor.starts_with("/*") {
                open += 1;
                self.cursor.advance_n(2);
            } else if self.cursor.starts_with("*/") {
                self.cursor.advance_n(2);
                open = open.saturating_sub(1);
            } else {
                self.cursor.advance();
            }

            if open == 0 {
                break;
            }
        }
    }

    /// Eats a string literal up to the next unescaped quote.
    ///
    /// Returns whether the closing quote was found before end of file.
    fn eat_string_literal(&mut self) -> bool {
        self.cursor.advance();
        while !self.cursor.is_at_end() {
            match self.cursor.current_char() {
                '\\' => {
                    self.cursor.advance();
                    if !self.cursor.is_at_end() {
                        self.cursor.advance();
                    }
                }
                '"' => {
                    self.cursor.advance();
                    return true;
                }
                _ => self.cursor.advance(),
            }
        }
        false
    }

    fn cook(&self, raw: &RawToken, tokens: &mut Vec<Token>) {
        match raw.kind {
            RawKind::Whitespace | RawKind::Comment => {}
            RawKind::Alnum => tokens.push(self.cook_alnum(raw.span)),
            RawKind::Symbolic => self.cook_symbolic(raw.span, tokens),
            RawKind::Delim => {
                let text = self.file.extract(raw.span.start..raw.span.end);
                let kind = match text.chars().next().and_then(Delim::from_char) {
                    Some(delim) => TokenKind::Delim(delim),
                    None => TokenKind::Error,
                };
                tokens.push(Token::new(Symbol::intern(text), kind, raw.span));
            }
            RawKind::StringLit { closed } => {
                let text = self.file.extract(raw.span.start..raw.span.end);
                let kind = if closed && text.len() >= 2 {
                    TokenKind::Str
                } else {
                    TokenKind::Error
                };
                tokens.push(Token::new(Symbol::intern(text), kind, raw.span));
            }
            RawKind::Unknown => {
                let text = self.file.extract(raw.span.start..raw.span.end);
                tokens.push(Token::new(Symbol::intern(text), TokenKind::Error, raw.span));
            }
        }
    }

    fn cook_alnum(&self, span: Span) -> Token {
        let text = self.file.extract(span.start..span.end);
        let kind = if text == "_" {
            TokenKind::Sym(Sym::Underscore)
        } else if let Some(kw) = Keyword::from_str(text) {
            TokenKind::Kw(kw)
        } else if text.bytes().all(|b| b.is_ascii_digit()) {
            TokenKind::Int
        } else if text.starts_with(|c: char| c.is_ascii_uppercase()) {
            TokenKind::TypeName
        } else {
            TokenKind::VarName
        };
        Token::new(Symbol::intern(text), kind, span)
    }

    /// Splits a symbolic run into tokens: first the two-character symbols
    /// `->`, `=>`, `::` by overlapping longest match, then single symbols.
    /// Characters with no mapping become error tokens.
    fn cook_symbolic(&self, span: Span, tokens: &mut Vec<Token>) {
        let text = self.file.extract(span.start..span.end);
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let rest = &text[i..];
            let multi = MULTI_SYMBOLS
                .iter()
                .find(|(s, _)| rest.starts_with(s))
                .copied();

            let (len, kind) = match multi {
                Some((s, sym)) => (s.len(), TokenKind::Sym(sym)),
                None => {
                    let c = bytes[i] as char;
                    match Sym::from_char(c) {
                        Some(sym) => (1, TokenKind::Sym(sym)),
                        None => (1, TokenKind::Error),
                    }
                }
            };

            // symbolic runs are single-line ASCII, so columns offset directly
            let sub_span = Span::with_file(
                span.start + i,
                span.start + i + len,
                span.file_id,
                span.line,
                span.column + i as u32,
            );
            tokens.push(Token::new(Symbol::intern(&text[i..i + len]), kind, sub_span));
            i += len;
        }
    }
}

fn is_alnum(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
