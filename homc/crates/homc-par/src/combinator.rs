//! Backtracking parser combinators.
//!
//! A parser is a function from a token cursor and a *backtracking* flag to
//! one of three outcomes:
//!
//! | outcome       | meaning                                                  |
//! |---------------|----------------------------------------------------------|
//! | `Ok(value)`   | success, cursor advanced                                 |
//! | `Backtracked` | soft failure while backtracking is allowed; try the next |
//! |               | alternative from the saved cursor position               |
//! | `Err(diags)`  | hard failure after a commit point; do not try others     |
//!
//! Sequences carry *commit points*: once a sequence has seen enough tokens
//! to unambiguously select its production (`dis`, `fun`, `let`, ...), the
//! backtracking flag is switched off for the remaining parts, so later
//! failures report precise diagnostics instead of being swallowed by the
//! enclosing alternation.
//!
//! Two sequence forms exist: [`SequenceParser`] collects homogeneous values
//! into a `Vec`, and [`BuilderParser`] threads parsed values into a node
//! builder's setters and finalizes the node with a span wrapping its first
//! and last consumed token (plus a fresh [`NodeId`]).

use std::cell::OnceCell;
use std::rc::Rc;

use homc_lex::{Token, TokenKind};
use homc_util::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Span, Symbol};

use crate::ast::NodeId;

/// Token cursor plus the node-id allocator.
///
/// `save`/`restore` move the cursor only; node ids handed out along an
/// abandoned path are simply never referenced again, which keeps every id
/// unique across the whole parse.
pub struct ParseState<'a> {
    tokens: &'a [Token],
    index: usize,
    next_id: u32,
}

impl<'a> ParseState<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            index: 0,
            next_id: 0,
        }
    }

    /// Current token; a zero-width Eof is synthesized past the end.
    pub fn peek(&self) -> Token {
        match self.tokens.get(self.index) {
            Some(token) => *token,
            None => {
                let span = self
                    .tokens
                    .last()
                    .map(|t| {
                        Span::with_file(t.span.end, t.span.end, t.span.file_id, t.span.line, t.span.column)
                    })
                    .unwrap_or(Span::DUMMY);
                Token::new(Symbol::intern("<eof>"), TokenKind::Eof, span)
            }
        }
    }

    /// Consume and return the current token.
    pub fn take(&mut self) -> Token {
        let token = self.peek();
        if self.index < self.tokens.len() {
            self.index += 1;
        }
        token
    }

    /// Span of the most recently consumed token (zero-width at the start).
    pub fn prev_span(&self) -> Span {
        match self.index.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => {
                let p = self.peek().span;
                Span::with_file(p.start, p.start, p.file_id, p.line, p.column)
            }
        }
    }

    pub fn save(&self) -> usize {
        self.index
    }

    pub fn restore(&mut self, index: usize) {
        self.index = index;
    }

    /// Allocate a fresh node id.
    pub fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Outcome of running a parser.
#[derive(Debug)]
pub enum ParseOutcome<T> {
    Ok(T),
    Backtracked,
    Err(Vec<Diagnostic>),
}

pub(crate) fn internal_diag(span: Span) -> Diagnostic {
    DiagnosticBuilder::error("internal error: parser reached an unreachable state")
        .code(DiagnosticCode::E_INTERNAL)
        .span(span)
        .build()
}

fn expected_diag(expected: &str, found: Token) -> Diagnostic {
    if found.kind == TokenKind::Eof {
        DiagnosticBuilder::error(format!("unexpected end of file, expected {}", expected))
            .code(DiagnosticCode::E_PARSE_UNEXPECTED_EOF)
            .span(found.span)
            .build()
    } else {
        DiagnosticBuilder::error(format!(
            "expected {}, found `{}`",
            expected,
            found.text.as_str()
        ))
        .code(DiagnosticCode::E_PARSE_UNEXPECTED_TOKEN)
        .span(found.span)
        .build()
    }
}

/// A first-class parser value.
///
/// Parsers are cheaply cloneable handles (`Rc` inside); the grammar wires
/// them together once and reuses the resulting graph.
pub struct Parser<T> {
    run: Rc<dyn Fn(&mut ParseState<'_>, bool) -> ParseOutcome<T>>,
}

impl<T> Clone for Parser<T> {
    fn clone(&self) -> Self {
        Parser {
            run: Rc::clone(&self.run),
        }
    }
}

impl<T: 'static> Parser<T> {
    pub fn new(f: impl Fn(&mut ParseState<'_>, bool) -> ParseOutcome<T> + 'static) -> Self {
        Parser { run: Rc::new(f) }
    }

    pub fn run(&self, state: &mut ParseState<'_>, backtracking: bool) -> ParseOutcome<T> {
        (self.run)(state, backtracking)
    }

    /// `a | b`: try `a`; on a soft failure restore the cursor and try `b`.
    /// Hard failures propagate without trying `b`.
    pub fn or(self, right: Parser<T>) -> Parser<T> {
        Parser::new(move |state, backtracking| {
            let saved = state.save();
            match self.run(state, true) {
                ParseOutcome::Backtracked => {
                    state.restore(saved);
                    right.run(state, backtracking)
                }
                other => other,
            }
        })
    }

    pub fn map<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Parser<U> {
        Parser::new(move |state, backtracking| match self.run(state, backtracking) {
            ParseOutcome::Ok(value) => ParseOutcome::Ok(f(value)),
            ParseOutcome::Backtracked => ParseOutcome::Backtracked,
            ParseOutcome::Err(diags) => ParseOutcome::Err(diags),
        })
    }

    pub fn replace<U: Clone + 'static>(self, value: U) -> Parser<U> {
        self.map(move |_| value.clone())
    }

    /// Monadic bind into a fallible builder step.
    pub fn and_then<U: 'static>(
        self,
        f: impl Fn(T) -> Result<U, Vec<Diagnostic>> + 'static,
    ) -> Parser<U> {
        Parser::new(move |state, backtracking| match self.run(state, backtracking) {
            ParseOutcome::Ok(value) => match f(value) {
                Ok(mapped) => ParseOutcome::Ok(mapped),
                Err(diags) => ParseOutcome::Err(diags),
            },
            ParseOutcome::Backtracked => ParseOutcome::Backtracked,
            ParseOutcome::Err(diags) => ParseOutcome::Err(diags),
        })
    }

    /// Like [`Parser::and_then`], with access to the parse state so the
    /// builder can allocate node ids.
    pub fn and_then_state<U: 'static>(
        self,
        f: impl Fn(T, &mut ParseState<'_>) -> Result<U, Vec<Diagnostic>> + 'static,
    ) -> Parser<U> {
        Parser::new(move |state, backtracking| match self.run(state, backtracking) {
            ParseOutcome::Ok(value) => match f(value, state) {
                Ok(mapped) => ParseOutcome::Ok(mapped),
                Err(diags) => ParseOutcome::Err(diags),
            },
            ParseOutcome::Backtracked => ParseOutcome::Backtracked,
            ParseOutcome::Err(diags) => ParseOutcome::Err(diags),
        })
    }

    /// Run `self`, then `next` with backtracking disabled, keeping `self`'s
    /// value. This is the "statement `;`" shape: once the statement parsed,
    /// a missing terminator is a hard error.
    pub fn commit_then_drop<U: 'static>(self, next: Parser<U>) -> Parser<T> {
        Parser::new(move |state, backtracking| match self.run(state, backtracking) {
            ParseOutcome::Ok(value) => match next.run(state, false) {
                ParseOutcome::Ok(_) => ParseOutcome::Ok(value),
                ParseOutcome::Backtracked => {
                    ParseOutcome::Err(vec![internal_diag(state.peek().span)])
                }
                ParseOutcome::Err(diags) => ParseOutcome::Err(diags),
            },
            ParseOutcome::Backtracked => ParseOutcome::Backtracked,
            ParseOutcome::Err(diags) => ParseOutcome::Err(diags),
        })
    }
}

/// Match a single token of the given kind.
pub fn kind(k: TokenKind) -> Parser<Token> {
    Parser::new(move |state, backtracking| {
        if state.peek().kind == k {
            ParseOutcome::Ok(state.take())
        } else if backtracking {
            ParseOutcome::Backtracked
        } else {
            ParseOutcome::Err(vec![expected_diag(k.describe(), state.peek())])
        }
    })
}

/// Succeed only at the end-of-file token, without consuming it.
pub fn expect_eof() -> Parser<()> {
    Parser::new(|state, backtracking| {
        if state.peek().kind == TokenKind::Eof {
            ParseOutcome::Ok(())
        } else if backtracking {
            ParseOutcome::Backtracked
        } else {
            ParseOutcome::Err(vec![expected_diag("<eof>", state.peek())])
        }
    })
}

/// Always fail. As the last alternative of an `or` chain this names what
/// the chain was looking for.
pub fn fail<T: 'static>(expected: &'static str) -> Parser<T> {
    Parser::new(move |state, backtracking| {
        if backtracking {
            ParseOutcome::Backtracked
        } else {
            ParseOutcome::Err(vec![expected_diag(expected, state.peek())])
        }
    })
}

/// Negative lookahead: succeed (consuming nothing) iff `p` fails here.
pub fn not<T: 'static>(p: Parser<T>) -> Parser<()> {
    Parser::new(move |state, backtracking| {
        let saved = state.save();
        match p.run(state, true) {
            ParseOutcome::Ok(_) => {
                state.restore(saved);
                if backtracking {
                    ParseOutcome::Backtracked
                } else {
                    let found = state.peek();
                    ParseOutcome::Err(vec![DiagnosticBuilder::error(format!(
                        "unexpected token `{}`",
                        found.text.as_str()
                    ))
                    .code(DiagnosticCode::E_PARSE_UNEXPECTED_TOKEN)
                    .span(found.span)
                    .build()])
                }
            }
            _ => {
                state.restore(saved);
                ParseOutcome::Ok(())
            }
        }
    })
}

/// Produce a value without consuming input.
pub fn supply<T: 'static>(f: impl Fn() -> T + 'static) -> Parser<T> {
    Parser::new(move |_state, _backtracking| ParseOutcome::Ok(f()))
}

/// Succeed with `()` without consuming input.
pub fn nothing() -> Parser<()> {
    Parser::new(|_state, _backtracking| ParseOutcome::Ok(()))
}

/// Repeat `p` until it soft-fails; at least `min` matches are required.
pub fn repeat<T: 'static>(p: Parser<T>, min: usize) -> Parser<Vec<T>> {
    Parser::new(move |state, backtracking| {
        let start = state.save();
        let mut items = Vec::new();
        loop {
            let before = state.save();
            let allow_backtrack = backtracking || items.len() >= min;
            match p.run(state, allow_backtrack) {
                ParseOutcome::Ok(item) => {
                    items.push(item);
                    if state.save() == before {
                        // inner parser consumed nothing; stop rather than spin
                        break;
                    }
                }
                ParseOutcome::Backtracked => break,
                ParseOutcome::Err(diags) => return ParseOutcome::Err(diags),
            }
        }

        if items.len() < min {
            state.restore(start);
            ParseOutcome::Backtracked
        } else {
            ParseOutcome::Ok(items)
        }
    })
}

/// Parse `p (sep p)*` with at least `min` items.
///
/// With `trailing`, a separator may trail the last item; otherwise the
/// cursor is restored to before a separator that is not followed by an
/// item.
pub fn interspersed<T: 'static, S: 'static>(
    p: Parser<T>,
    sep: Parser<S>,
    min: usize,
    trailing: bool,
) -> Parser<Vec<T>> {
    Parser::new(move |state, backtracking| {
        let start = state.save();
        let mut items = Vec::new();
        let mut before_sep = None;
        loop {
            let allow_backtrack = backtracking || items.len() >= min;
            let before_item = state.save();
            match p.run(state, allow_backtrack) {
                ParseOutcome::Ok(item) => {
                    items.push(item);
                    if state.save() == before_item {
                        break;
                    }
                }
                ParseOutcome::Backtracked => {
                    if items.len() < min {
                        state.restore(start);
                        return ParseOutcome::Backtracked;
                    }
                    if trailing {
                        state.restore(before_item);
                    } else {
                        // give back the separator that has no item after it
                        state.restore(before_sep.unwrap_or(before_item));
                    }
                    break;
                }
                ParseOutcome::Err(diags) => return ParseOutcome::Err(diags),
            }

            let allow_backtrack = backtracking || items.len() >= min;
            before_sep = Some(state.save());
            match sep.run(state, allow_backtrack) {
                ParseOutcome::Ok(_) => {}
                ParseOutcome::Backtracked => {
                    if items.len() < min {
                        state.restore(start);
                        return ParseOutcome::Backtracked;
                    }
                    break;
                }
                ParseOutcome::Err(diags) => return ParseOutcome::Err(diags),
            }
        }
        ParseOutcome::Ok(items)
    })
}

/// Try `p`; on a soft failure restore the cursor and yield `default`.
pub fn optional<T: Clone + 'static>(p: Parser<T>, default: T) -> Parser<T> {
    Parser::new(move |state, _backtracking| {
        let saved = state.save();
        match p.run(state, true) {
            ParseOutcome::Backtracked => {
                state.restore(saved);
                ParseOutcome::Ok(default.clone())
            }
            other => other,
        }
    })
}

/// Tie the knot for a recursive grammar rule.
///
/// `build` receives a forward reference to the parser being defined; the
/// cell behind it is filled in once `build` returns.
pub fn recursive<T: 'static>(build: impl FnOnce(Parser<T>) -> Parser<T>) -> Parser<T> {
    let cell: Rc<OnceCell<Parser<T>>> = Rc::new(OnceCell::new());
    let forward = {
        let cell = Rc::clone(&cell);
        Parser::new(move |state, backtracking| match cell.get() {
            Some(parser) => parser.run(state, backtracking),
            None => ParseOutcome::Err(vec![internal_diag(state.peek().span)]),
        })
    };
    let built = build(forward);
    let _ = cell.set(built.clone());
    built
}

/// Unwrap a one-element sequence result.
pub fn extract<T: 'static>(p: Parser<Vec<T>>) -> Parser<T> {
    p.and_then(|mut items| {
        if items.is_empty() {
            Err(vec![internal_diag(Span::DUMMY)])
        } else {
            Ok(items.remove(0))
        }
    })
}

enum SeqPart<T> {
    Commit,
    Parse(Parser<T>),
    Drop(Parser<()>),
}

/// A sequence of parsers collecting homogeneous values.
///
/// `then_drop` parts run for their side effect on the cursor only;
/// `commit()` disables backtracking for everything after it.
pub struct SequenceParser<T> {
    parts: Vec<SeqPart<T>>,
}

/// Start an empty [`SequenceParser`].
pub fn sequence<T: 'static>() -> SequenceParser<T> {
    SequenceParser { parts: Vec::new() }
}

impl<T: 'static> SequenceParser<T> {
    pub fn commit(mut self) -> Self {
        self.parts.push(SeqPart::Commit);
        self
    }

    pub fn then_parse(mut self, p: Parser<T>) -> Self {
        self.parts.push(SeqPart::Parse(p));
        self
    }

    pub fn then_drop<U: 'static>(mut self, p: Parser<U>) -> Self {
        self.parts.push(SeqPart::Drop(p.map(|_| ())));
        self
    }

    pub fn build(self) -> Parser<Vec<T>> {
        let parts = Rc::new(self.parts);
        Parser::new(move |state, mut backtracking| {
            let mut items = Vec::new();
            for part in parts.iter() {
                match part {
                    SeqPart::Commit => backtracking = false,
                    SeqPart::Parse(p) => match p.run(state, backtracking) {
                        ParseOutcome::Ok(item) => items.push(item),
                        ParseOutcome::Backtracked => return ParseOutcome::Backtracked,
                        ParseOutcome::Err(diags) => return ParseOutcome::Err(diags),
                    },
                    SeqPart::Drop(p) => match p.run(state, backtracking) {
                        ParseOutcome::Ok(()) => {}
                        ParseOutcome::Backtracked => return ParseOutcome::Backtracked,
                        ParseOutcome::Err(diags) => return ParseOutcome::Err(diags),
                    },
                }
            }
            ParseOutcome::Ok(items)
        })
    }
}

/// A builder finalized by a [`BuilderParser`].
///
/// `finish` returns `None` when a field the grammar should have set is
/// missing; the parser turns that into an internal diagnostic rather than
/// ignoring it.
pub trait NodeBuilder: Default + 'static {
    type Output;

    fn finish(self, span: Span, id: NodeId) -> Option<Self::Output>;
}

enum BuildPart<B> {
    Commit,
    Step(Rc<dyn Fn(&mut B, &mut ParseState<'_>, bool) -> ParseOutcome<()>>),
}

/// A sequence of parsers threading values into a node builder.
///
/// On success the builder is finalized with the span wrapping the first and
/// last consumed token and a fresh node id.
pub struct BuilderParser<B: NodeBuilder> {
    parts: Vec<BuildPart<B>>,
}

/// Start an empty [`BuilderParser`] for builder type `B`.
pub fn builder<B: NodeBuilder>() -> BuilderParser<B> {
    BuilderParser { parts: Vec::new() }
}

impl<B: NodeBuilder> BuilderParser<B> {
    pub fn commit(mut self) -> Self {
        self.parts.push(BuildPart::Commit);
        self
    }

    pub fn then_drop<U: 'static>(mut self, p: Parser<U>) -> Self {
        self.parts.push(BuildPart::Step(Rc::new(
            move |_builder, state, backtracking| match p.run(state, backtracking) {
                ParseOutcome::Ok(_) => ParseOutcome::Ok(()),
                ParseOutcome::Backtracked => ParseOutcome::Backtracked,
                ParseOutcome::Err(diags) => ParseOutcome::Err(diags),
            },
        )));
        self
    }

    pub fn then_parse<U: 'static>(mut self, set: fn(&mut B, U), p: Parser<U>) -> Self {
        self.parts.push(BuildPart::Step(Rc::new(
            move |builder, state, backtracking| match p.run(state, backtracking) {
                ParseOutcome::Ok(value) => {
                    set(builder, value);
                    ParseOutcome::Ok(())
                }
                ParseOutcome::Backtracked => ParseOutcome::Backtracked,
                ParseOutcome::Err(diags) => ParseOutcome::Err(diags),
            },
        )));
        self
    }

    pub fn build(self) -> Parser<B::Output>
    where
        B::Output: 'static,
    {
        let parts = Rc::new(self.parts);
        Parser::new(move |state, mut backtracking| {
            let mut node_builder = B::default();
            let begin = state.peek().span;
            let start_index = state.save();

            for part in parts.iter() {
                match part {
                    BuildPart::Commit => backtracking = false,
                    BuildPart::Step(step) => match step(&mut node_builder, state, backtracking) {
                        ParseOutcome::Ok(()) => {}
                        ParseOutcome::Backtracked => return ParseOutcome::Backtracked,
                        ParseOutcome::Err(diags) => return ParseOutcome::Err(diags),
                    },
                }
            }

            let span = if state.save() > start_index {
                begin.to(state.prev_span())
            } else {
                Span::with_file(begin.start, begin.start, begin.file_id, begin.line, begin.column)
            };
            let id = state.fresh_id();
            match node_builder.finish(span, id) {
                Some(node) => ParseOutcome::Ok(node),
                None => ParseOutcome::Err(vec![internal_diag(span)]),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homc_lex::lex;
    use homc_util::span::SourceFile;

    fn tokens(input: &str) -> Vec<Token> {
        let file = SourceFile::new(0, "test.hom", input);
        lex(&file)
    }

    fn is_ok<T>(outcome: &ParseOutcome<T>) -> bool {
        matches!(outcome, ParseOutcome::Ok(_))
    }

    #[test]
    fn test_kind_matches() {
        let toks = tokens("let");
        let mut state = ParseState::new(&toks);
        let outcome = kind(TokenKind::Kw(homc_lex::Keyword::Let)).run(&mut state, false);
        assert!(is_ok(&outcome));
        assert_eq!(state.save(), 1);
    }

    #[test]
    fn test_kind_backtracks() {
        let toks = tokens("let");
        let mut state = ParseState::new(&toks);
        let outcome = kind(TokenKind::Int).run(&mut state, true);
        assert!(matches!(outcome, ParseOutcome::Backtracked));
    }

    #[test]
    fn test_kind_errs_when_committed() {
        let toks = tokens("let");
        let mut state = ParseState::new(&toks);
        let outcome = kind(TokenKind::Int).run(&mut state, false);
        match outcome {
            ParseOutcome::Err(diags) => {
                assert!(diags[0].message.contains("integer literal"));
            }
            _ => panic!("expected a hard error"),
        }
    }

    #[test]
    fn test_or_takes_second_alternative() {
        let toks = tokens("42");
        let mut state = ParseState::new(&toks);
        let p = kind(TokenKind::VarName).or(kind(TokenKind::Int));
        assert!(is_ok(&p.run(&mut state, false)));
        assert_eq!(state.save(), 1);
    }

    #[test]
    fn test_or_propagates_hard_error() {
        // after the committed `(` the mismatch is fatal; the alternative
        // must not be tried
        let toks = tokens("( 42");
        let mut state = ParseState::new(&toks);
        let open = kind(TokenKind::Delim(homc_lex::Delim::OpenParen));
        let grouped = extract(
            sequence::<Token>()
                .then_drop(open)
                .commit()
                .then_parse(kind(TokenKind::VarName))
                .build(),
        );
        let p = grouped.or(kind(TokenKind::Int));
        assert!(matches!(p.run(&mut state, true), ParseOutcome::Err(_)));
    }

    #[test]
    fn test_repeat_collects() {
        let toks = tokens("1 2 3");
        let mut state = ParseState::new(&toks);
        let outcome = repeat(kind(TokenKind::Int), 0).run(&mut state, false);
        match outcome {
            ParseOutcome::Ok(items) => assert_eq!(items.len(), 3),
            _ => panic!("expected ok"),
        }
    }

    #[test]
    fn test_repeat_minimum_not_met() {
        let toks = tokens("x");
        let mut state = ParseState::new(&toks);
        let outcome = repeat(kind(TokenKind::Int), 1).run(&mut state, true);
        assert!(matches!(outcome, ParseOutcome::Backtracked));
        assert_eq!(state.save(), 0);
    }

    #[test]
    fn test_interspersed() {
        let toks = tokens("1, 2, 3");
        let mut state = ParseState::new(&toks);
        let comma = kind(TokenKind::Sym(homc_lex::Sym::Comma));
        let outcome = interspersed(kind(TokenKind::Int), comma, 1, true).run(&mut state, false);
        match outcome {
            ParseOutcome::Ok(items) => assert_eq!(items.len(), 3),
            _ => panic!("expected ok"),
        }
    }

    #[test]
    fn test_interspersed_trailing_separator() {
        let toks = tokens("1, 2,");
        let mut state = ParseState::new(&toks);
        let comma = kind(TokenKind::Sym(homc_lex::Sym::Comma));
        let outcome = interspersed(kind(TokenKind::Int), comma, 1, true).run(&mut state, false);
        match outcome {
            ParseOutcome::Ok(items) => assert_eq!(items.len(), 2),
            _ => panic!("expected ok"),
        }
        // trailing comma consumed
        assert_eq!(state.save(), 4);
    }

    #[test]
    fn test_interspersed_no_trailing_restores_separator() {
        let toks = tokens("1, 2,");
        let mut state = ParseState::new(&toks);
        let comma = kind(TokenKind::Sym(homc_lex::Sym::Comma));
        let outcome = interspersed(kind(TokenKind::Int), comma, 1, false).run(&mut state, false);
        assert!(is_ok(&outcome));
        // cursor sits on the trailing comma
        assert_eq!(state.save(), 3);
    }

    #[test]
    fn test_optional_present_and_absent() {
        let toks = tokens("42");
        let mut state = ParseState::new(&toks);
        let p = optional(kind(TokenKind::Int).map(|t| Some(t)), None);
        assert!(matches!(p.run(&mut state, false), ParseOutcome::Ok(Some(_))));

        let toks = tokens("x");
        let mut state = ParseState::new(&toks);
        let p = optional(kind(TokenKind::Int).map(|t| Some(t)), None);
        assert!(matches!(p.run(&mut state, false), ParseOutcome::Ok(None)));
        assert_eq!(state.save(), 0);
    }

    #[test]
    fn test_not_lookahead() {
        let toks = tokens("x");
        let mut state = ParseState::new(&toks);
        let p = not(kind(TokenKind::Int));
        assert!(is_ok(&p.run(&mut state, false)));
        assert_eq!(state.save(), 0);

        let toks = tokens("42");
        let mut state = ParseState::new(&toks);
        let p = not(kind(TokenKind::Int));
        assert!(matches!(p.run(&mut state, true), ParseOutcome::Backtracked));
    }

    #[test]
    fn test_supply_and_nothing() {
        let toks = tokens("");
        let mut state = ParseState::new(&toks);
        assert!(matches!(
            supply(|| 7u32).run(&mut state, false),
            ParseOutcome::Ok(7)
        ));
        assert!(is_ok(&nothing().run(&mut state, false)));
    }

    #[test]
    fn test_expect_eof() {
        let toks = tokens("");
        let mut state = ParseState::new(&toks);
        assert!(is_ok(&expect_eof().run(&mut state, false)));

        let toks = tokens("x");
        let mut state = ParseState::new(&toks);
        assert!(matches!(
            expect_eof().run(&mut state, false),
            ParseOutcome::Err(_)
        ));
    }

    #[test]
    fn test_fail_reports_expectation() {
        let toks = tokens("42");
        let mut state = ParseState::new(&toks);
        match fail::<Token>("statement").run(&mut state, false) {
            ParseOutcome::Err(diags) => assert!(diags[0].message.contains("statement")),
            _ => panic!("expected a hard error"),
        }
    }

    #[test]
    fn test_recursive_parser() {
        // nested ::= '(' nested ')' | int
        let toks = tokens("((42))");
        let mut state = ParseState::new(&toks);
        let nested = recursive(|nested| {
            let open = kind(TokenKind::Delim(homc_lex::Delim::OpenParen));
            let close = kind(TokenKind::Delim(homc_lex::Delim::CloseParen));
            extract(
                sequence::<Token>()
                    .then_drop(open)
                    .commit()
                    .then_parse(nested)
                    .then_drop(close)
                    .build(),
            )
            .or(kind(TokenKind::Int))
        });
        match nested.run(&mut state, false) {
            ParseOutcome::Ok(token) => assert_eq!(token.text.as_str(), "42"),
            _ => panic!("expected ok"),
        }
    }

    #[test]
    fn test_fresh_ids_are_unique() {
        let toks = tokens("a b");
        let mut state = ParseState::new(&toks);
        let first = state.fresh_id();
        let second = state.fresh_id();
        assert_ne!(first, second);
    }
}
