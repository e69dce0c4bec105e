//! Small grammar helpers shared across the rule modules.

use homc_lex::{Delim, Keyword, Sym, Token, TokenKind};

use crate::combinator::{extract, interspersed, kind, sequence, Parser};

pub(crate) fn kw(keyword: Keyword) -> Parser<Token> {
    kind(TokenKind::Kw(keyword))
}

pub(crate) fn sym(symbol: Sym) -> Parser<Token> {
    kind(TokenKind::Sym(symbol))
}

pub(crate) fn delim(d: Delim) -> Parser<Token> {
    kind(TokenKind::Delim(d))
}

/// `open p close`, committing once the opening delimiter matched.
fn delimited<T: 'static>(open: Delim, p: Parser<T>, close: Delim) -> Parser<T> {
    extract(
        sequence::<T>()
            .then_drop(delim(open))
            .commit()
            .then_parse(p)
            .then_drop(delim(close))
            .build(),
    )
}

pub(crate) fn braced<T: 'static>(p: Parser<T>) -> Parser<T> {
    delimited(Delim::OpenBrace, p, Delim::CloseBrace)
}

pub(crate) fn bracketed<T: 'static>(p: Parser<T>) -> Parser<T> {
    delimited(Delim::OpenBracket, p, Delim::CloseBracket)
}

pub(crate) fn parenthesized<T: 'static>(p: Parser<T>) -> Parser<T> {
    delimited(Delim::OpenParen, p, Delim::CloseParen)
}

/// Comma-like list with at least one item; a trailing separator is allowed.
pub(crate) fn interspersed_positive<T: 'static, S: 'static>(
    p: Parser<T>,
    sep: Parser<S>,
) -> Parser<Vec<T>> {
    interspersed(p, sep, 1, true)
}
