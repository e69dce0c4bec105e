//! Property tests for the lexer.

use homc_lex::{lex, TokenKind};
use homc_util::span::SourceFile;
use proptest::prelude::*;

/// Tokens that lex to themselves, for the fixed arm of the generator.
const FIXED_TOKENS: &[&str] = &[
    "fun", "fit", "dis", "giv", "mod", "let", "ret", "wrt", "->", "=>", "::", "(", ")", "{", "}",
    "[", "]", ",", ";", "_", ".", "=",
];

/// Fragments that each lex to exactly one token.
fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        proptest::sample::select(FIXED_TOKENS).prop_map(|s| s.to_string()),
        "[a-z][a-z0-9_]{0,8}",
        "[A-Z][A-Za-z0-9]{0,8}",
        "[0-9]{1,6}",
        Just("\"text\"".to_string()),
    ]
}

proptest! {
    /// Concatenating the text of all non-Eof tokens reproduces the source
    /// minus stripped whitespace.
    #[test]
    fn lex_round_trip(fragments in prop::collection::vec(fragment(), 0..40)) {
        let source = fragments.join(" ");
        let expected: String = fragments.concat();

        let file = SourceFile::new(0, "prop.hom", source.as_str());
        let rebuilt: String = lex(&file)
            .iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| t.text.as_str())
            .collect();

        prop_assert_eq!(rebuilt, expected);
    }

    /// Token locations never overlap and never move backwards, on any
    /// printable input.
    #[test]
    fn location_monotonicity(input in "[ -~\t\n]{0,200}") {
        let file = SourceFile::new(0, "prop.hom", input.as_str());
        let tokens = lex(&file);

        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        for pair in tokens.windows(2) {
            prop_assert!(pair[0].span.end <= pair[1].span.start);
        }
        for token in &tokens {
            prop_assert!(token.span.start <= token.span.end);
        }
    }

    /// Lexing arbitrary input never panics and always ends with Eof.
    #[test]
    fn lexing_total(input in "\\PC{0,200}") {
        let file = SourceFile::new(0, "prop.hom", input.as_str());
        let tokens = lex(&file);
        prop_assert!(!tokens.is_empty());
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }
}
