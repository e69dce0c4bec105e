//! Top-level item parsing: dis declarations, functions, expressions.

use homc_lex::{Keyword, Sym, TokenKind};

use crate::ast::{ArgNode, DisNode, DisVariantNode, FunNode, GenericParams, Item, Program, TypeNode};
use crate::builder::{ArgBuilder, DisBuilder, DisVariantBuilder, FunBuilder, GenericParamsBuilder};
use crate::combinator::{
    builder, extract, fail, interspersed, kind, optional, repeat, sequence, Parser,
};
use crate::expr::expr_parser;
use crate::helpers::{braced, bracketed, interspersed_positive, kw, parenthesized, sym};
use crate::stmt::{block_parser, statement_parser};
use crate::types::type_parser;

/// `Program := Item* Eof`
pub fn program_parser() -> Parser<Program> {
    extract(
        sequence::<Vec<Item>>()
            .then_parse(repeat(item_parser(), 0))
            .then_drop(kind(TokenKind::Eof))
            .build(),
    )
    .map(|items| Program { items })
}

fn item_parser() -> Parser<Item> {
    dis_parser()
        .map(Item::Dis)
        .or(fun_parser().map(Item::Fun))
        .or(expr_parser().map(Item::Expr))
        .or(fail("item"))
}

/// `dis Name[T, U] { Variant, Variant(field: T), ... }`
pub(crate) fn dis_parser() -> Parser<DisNode> {
    let variants = braced(interspersed_positive(dis_variant_parser(), sym(Sym::Comma)));
    builder::<DisBuilder>()
        .then_drop(kw(Keyword::Dis))
        .commit()
        .then_parse(DisBuilder::name, kind(TokenKind::TypeName))
        .then_parse(DisBuilder::generics, generic_params_parser())
        .then_parse(DisBuilder::variants, variants)
        .build()
}

/// Generic parameter list; produces an empty node when no brackets follow.
pub(crate) fn generic_params_parser() -> Parser<GenericParams> {
    let inner = bracketed(interspersed_positive(kind(TokenKind::TypeName), sym(Sym::Comma)));
    builder::<GenericParamsBuilder>()
        .then_parse(GenericParamsBuilder::params, optional(inner, Vec::new()))
        .build()
}

fn dis_variant_parser() -> Parser<DisVariantNode> {
    builder::<DisVariantBuilder>()
        .then_parse(DisVariantBuilder::name, kind(TokenKind::TypeName))
        .commit()
        .then_parse(DisVariantBuilder::args, optional(args_parser(), Vec::new()))
        .build()
}

fn arg_parser() -> Parser<ArgNode> {
    builder::<ArgBuilder>()
        .then_parse(ArgBuilder::name, kind(TokenKind::VarName))
        .commit()
        .then_drop(sym(Sym::Colon))
        .then_parse(ArgBuilder::ty, type_parser())
        .build()
}

fn args_parser() -> Parser<Vec<ArgNode>> {
    parenthesized(interspersed(arg_parser(), sym(Sym::Comma), 0, true))
}

/// `fun name[T](args) -> Ret { body }`
pub(crate) fn fun_parser() -> Parser<FunNode> {
    let return_type = extract(
        sequence::<TypeNode>()
            .then_drop(sym(Sym::Arrow))
            .commit()
            .then_parse(type_parser())
            .build(),
    )
    .map(Some);

    builder::<FunBuilder>()
        .then_drop(kw(Keyword::Fun))
        .commit()
        .then_parse(FunBuilder::name, kind(TokenKind::VarName))
        .then_parse(FunBuilder::generics, generic_params_parser())
        .then_parse(FunBuilder::args, args_parser())
        .then_parse(FunBuilder::ret, optional(return_type, None))
        .then_parse(FunBuilder::body, block_parser(statement_parser()))
        .build()
}
