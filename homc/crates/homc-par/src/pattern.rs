//! Fit pattern parsing.
//!
//! `Pattern := UName PatternArg* | '_' | Value | '(' Pattern ')'`
//!
//! A bare variant name in argument position matches that variant without
//! refining its fields; parentheses are needed to nest a pattern with
//! arguments.

use homc_lex::{Sym, TokenKind};

use crate::ast::PatternNode;
use crate::builder::VariantPatternBuilder;
use crate::combinator::{builder, fail, kind, recursive, repeat, supply, Parser};
use crate::expr::value_parser;
use crate::helpers::{parenthesized, sym};

pub fn pattern_parser() -> Parser<PatternNode> {
    recursive(|pattern| {
        enum_pattern_parser(pattern.clone())
            .or(catchall_parser())
            .or(value_pattern_parser())
            .or(parenthesized(pattern))
            .or(fail("pattern"))
    })
}

/// `Variant sub sub ...` — commits once the variant name matched.
fn enum_pattern_parser(pattern: Parser<PatternNode>) -> Parser<PatternNode> {
    builder::<VariantPatternBuilder>()
        .then_parse(VariantPatternBuilder::name, kind(TokenKind::TypeName))
        .commit()
        .then_parse(
            VariantPatternBuilder::args,
            repeat(enum_pattern_arg_parser(pattern), 0),
        )
        .build()
        .map(PatternNode::Variant)
}

fn enum_pattern_arg_parser(pattern: Parser<PatternNode>) -> Parser<PatternNode> {
    bare_variant_parser()
        .or(catchall_parser())
        .or(value_pattern_parser())
        .or(parenthesized(pattern))
        .or(fail("pattern"))
}

/// A variant name alone; nested arguments require parentheses.
fn bare_variant_parser() -> Parser<PatternNode> {
    builder::<VariantPatternBuilder>()
        .then_parse(VariantPatternBuilder::name, kind(TokenKind::TypeName))
        .then_parse(VariantPatternBuilder::args, supply(Vec::new))
        .build()
        .map(PatternNode::Variant)
}

fn catchall_parser() -> Parser<PatternNode> {
    sym(Sym::Underscore).map(|token| PatternNode::Catchall(token.span))
}

fn value_pattern_parser() -> Parser<PatternNode> {
    value_parser().map(PatternNode::Value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::VariantPatternNode;
    use crate::combinator::{ParseOutcome, ParseState};
    use homc_lex::lex;
    use homc_util::span::SourceFile;

    fn parse_pattern(input: &str) -> ParseOutcome<PatternNode> {
        let file = SourceFile::new(0, "test.hom", input);
        let tokens = lex(&file);
        let mut state = ParseState::new(&tokens);
        pattern_parser().run(&mut state, false)
    }

    fn expect_variant(input: &str) -> VariantPatternNode {
        match parse_pattern(input) {
            ParseOutcome::Ok(PatternNode::Variant(variant)) => variant,
            other => panic!("failed to parse {:?}: {:?}", input, other),
        }
    }

    #[test]
    fn test_bare_variant() {
        let pattern = expect_variant("Zero");
        assert_eq!(pattern.name.text.as_str(), "Zero");
        assert!(pattern.args.is_empty());
    }

    #[test]
    fn test_variant_with_args() {
        let pattern = expect_variant("Succ Zero");
        assert_eq!(pattern.args.len(), 1);
        assert!(matches!(pattern.args[0], PatternNode::Variant(_)));
    }

    #[test]
    fn test_catchall() {
        assert!(matches!(
            parse_pattern("_"),
            ParseOutcome::Ok(PatternNode::Catchall(_))
        ));
    }

    #[test]
    fn test_value_pattern() {
        assert!(matches!(
            parse_pattern("42"),
            ParseOutcome::Ok(PatternNode::Value(_))
        ));
    }

    #[test]
    fn test_nested_parenthesized_pattern() {
        let pattern = expect_variant("Succ (Succ _)");
        assert_eq!(pattern.args.len(), 1);
        match &pattern.args[0] {
            PatternNode::Variant(inner) => {
                assert_eq!(inner.name.text.as_str(), "Succ");
                assert_eq!(inner.args.len(), 1);
                assert!(matches!(inner.args[0], PatternNode::Catchall(_)));
            }
            other => panic!("unexpected inner pattern: {:?}", other),
        }
    }

    #[test]
    fn test_catchall_args() {
        let pattern = expect_variant("Pair _ _");
        assert_eq!(pattern.args.len(), 2);
    }
}
