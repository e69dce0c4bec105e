//! Type syntax parsing.
//!
//! `Type := (DisConstructor | DisType | '(' Type,* ')') ('->' Type)*`
//!
//! The arrow-separated terms are collected first and folded into function
//! types right-associatively; a parenthesized group is only legal directly
//! before an arrow.

use homc_lex::{Delim, Sym, TokenKind};
use homc_util::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Span};

use crate::ast::{
    DisConstructorNode, DisTypeNode, FunctionTypeArgsNode, FunctionTypeNode, TypeNode,
};
use crate::builder::{CtorBuilder, DisTypeBuilder, FunctionTypeArgsBuilder};
use crate::combinator::{builder, fail, interspersed, kind, optional, recursive, Parser};
use crate::helpers::{bracketed, delim, interspersed_positive, sym};

/// One arrow-separated term of a type.
enum TypeTerm {
    Single(TypeNode),
    Group(FunctionTypeArgsNode),
}

pub fn type_parser() -> Parser<TypeNode> {
    recursive(|ty| {
        interspersed(type_term_parser(ty), sym(Sym::Arrow), 1, false).and_then(make_type)
    })
}

fn type_term_parser(ty: Parser<TypeNode>) -> Parser<TypeTerm> {
    dis_constructor_type_parser(ty.clone())
        .map(|ctor| TypeTerm::Single(TypeNode::Ctor(Box::new(ctor))))
        .or(dis_type_parser(ty.clone()).map(|dis| TypeTerm::Single(TypeNode::Dis(dis))))
        .or(function_args_type_parser(ty).map(TypeTerm::Group))
        .or(fail("type"))
}

/// `[T, ?, Dis[Int]]`: generic arguments, with `?` as the wildcard.
pub(crate) fn generic_args_parser(ty: Parser<TypeNode>) -> Parser<Vec<TypeNode>> {
    let wildcard = sym(Sym::Question).map(|token| TypeNode::Wildcard(token.span));
    bracketed(interspersed_positive(wildcard.or(ty), sym(Sym::Comma)))
}

pub(crate) fn dis_type_parser(ty: Parser<TypeNode>) -> Parser<DisTypeNode> {
    builder::<DisTypeBuilder>()
        .then_parse(DisTypeBuilder::name, kind(TokenKind::TypeName))
        .then_parse(
            DisTypeBuilder::generics,
            optional(generic_args_parser(ty), Vec::new()),
        )
        .build()
}

/// `Name[G]::Variant`; commits once the `::` is seen.
pub(crate) fn dis_constructor_type_parser(ty: Parser<TypeNode>) -> Parser<DisConstructorNode> {
    builder::<CtorBuilder>()
        .then_parse(CtorBuilder::name, kind(TokenKind::TypeName))
        .then_parse(
            CtorBuilder::generics,
            optional(generic_args_parser(ty), Vec::new()),
        )
        .then_drop(sym(Sym::ColonColon))
        .commit()
        .then_parse(CtorBuilder::variant, kind(TokenKind::TypeName))
        .build()
}

fn function_args_type_parser(ty: Parser<TypeNode>) -> Parser<FunctionTypeArgsNode> {
    builder::<FunctionTypeArgsBuilder>()
        .then_drop(delim(Delim::OpenParen))
        .commit()
        .then_parse(
            FunctionTypeArgsBuilder::parts,
            interspersed(ty, sym(Sym::Comma), 0, false),
        )
        .then_drop(delim(Delim::CloseParen))
        .build()
}

fn invalid_type(span: Span) -> Diagnostic {
    DiagnosticBuilder::error("invalid type")
        .code(DiagnosticCode::E_PARSE_INVALID_TYPE)
        .span(span)
        .build()
}

fn make_type(mut terms: Vec<TypeTerm>) -> Result<TypeNode, Vec<Diagnostic>> {
    if terms.len() == 1 {
        return match terms.remove(0) {
            TypeTerm::Single(ty) => Ok(ty),
            TypeTerm::Group(group) => Err(vec![invalid_type(group.span)]),
        };
    }
    make_function_type(terms)
}

/// Fold `a -> b -> c` as `a -> (b -> c)`; a group before an arrow supplies
/// the argument list.
fn make_function_type(mut terms: Vec<TypeTerm>) -> Result<TypeNode, Vec<Diagnostic>> {
    let (args, first_span) = match terms.remove(0) {
        TypeTerm::Group(group) => (group.parts, group.span),
        TypeTerm::Single(ty) => {
            let span = ty.span();
            (vec![ty], span)
        }
    };

    let ret = if terms.len() == 1 {
        match terms.remove(0) {
            TypeTerm::Single(ty) => ty,
            TypeTerm::Group(group) => return Err(vec![invalid_type(group.span)]),
        }
    } else {
        make_function_type(terms)?
    };

    let span = first_span.to(ret.span());
    Ok(TypeNode::Fun(Box::new(FunctionTypeNode { args, ret, span })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::{ParseOutcome, ParseState};
    use homc_lex::lex;
    use homc_util::span::SourceFile;

    fn parse_type(input: &str) -> ParseOutcome<TypeNode> {
        let file = SourceFile::new(0, "test.hom", input);
        let tokens = lex(&file);
        let mut state = ParseState::new(&tokens);
        type_parser().run(&mut state, false)
    }

    fn expect_type(input: &str) -> TypeNode {
        match parse_type(input) {
            ParseOutcome::Ok(ty) => ty,
            other => panic!("failed to parse type {:?}: {:?}", input, other),
        }
    }

    #[test]
    fn test_simple_type() {
        match expect_type("Int") {
            TypeNode::Dis(dis) => {
                assert_eq!(dis.name.text.as_str(), "Int");
                assert!(dis.generics.is_empty());
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_generic_type() {
        match expect_type("Pair[Int, Nat]") {
            TypeNode::Dis(dis) => {
                assert_eq!(dis.name.text.as_str(), "Pair");
                assert_eq!(dis.generics.len(), 2);
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_wildcard_generic() {
        match expect_type("Pair[?, Int]") {
            TypeNode::Dis(dis) => {
                assert!(matches!(dis.generics[0], TypeNode::Wildcard(_)));
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_constructor_type() {
        match expect_type("Nat::Succ") {
            TypeNode::Ctor(ctor) => {
                assert_eq!(ctor.name.text.as_str(), "Nat");
                assert_eq!(ctor.variant.text.as_str(), "Succ");
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_function_type() {
        match expect_type("(Int, Nat) -> Int") {
            TypeNode::Fun(fun) => {
                assert_eq!(fun.args.len(), 2);
                assert!(matches!(fun.ret, TypeNode::Dis(_)));
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_curried_function_type_is_right_associative() {
        match expect_type("Int -> Int -> Int") {
            TypeNode::Fun(outer) => {
                assert_eq!(outer.args.len(), 1);
                assert!(matches!(outer.ret, TypeNode::Fun(_)));
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_bare_group_is_invalid() {
        assert!(matches!(parse_type("(Int, Nat)"), ParseOutcome::Err(_)));
    }
}
