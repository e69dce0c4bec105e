//! Expression parsing.
//!
//! An expression is a run of terms and operators, folded by the precedence
//! pass in [`crate::precedence`]. Terms are literals, fit expressions,
//! parenthesized groups, generic function instantiations, variables, and
//! dis constructors.

use homc_lex::{Delim, Keyword, Sym, TokenKind};

use crate::ast::{
    DisConstructorNode, ExprNode, FitExprBranch, FitExprNode, FunInstNode, TupleLikeNode,
    ValueNode, VarNode,
};
use crate::builder::{
    FitExprBranchBuilder, FitExprBuilder, FunInstBuilder, TupleLikeBuilder, ValueBuilder,
    VarBuilder,
};
use crate::combinator::{builder, fail, interspersed, kind, not, recursive, repeat, Parser};
use crate::helpers::{braced, delim, interspersed_positive, kw, sym};
use crate::pattern::pattern_parser;
use crate::precedence::{self, Assoc, ExprPart, OpKind, OperatorPart};
use crate::types::{dis_constructor_type_parser, generic_args_parser, type_parser};

pub fn expr_parser() -> Parser<ExprNode> {
    recursive(|expr| {
        let part = operator_parser()
            .map(ExprPart::Operator)
            .or(expr_term_parser(expr).map(ExprPart::Term))
            .or(fail("expression or operator"));
        repeat(part, 1).and_then_state(precedence::make_expr)
    })
}

fn expr_term_parser(expr: Parser<ExprNode>) -> Parser<ExprNode> {
    value_parser()
        .map(ExprNode::Value)
        .or(fit_expr_parser(expr.clone()).map(|node| ExprNode::Fit(Box::new(node))))
        .or(tuple_like_parser(expr).map(ExprNode::TupleLike))
        .or(fun_inst_parser().map(ExprNode::FunInst))
        .or(var_parser().map(ExprNode::Var))
        .or(dis_constructor_expr_parser().map(ExprNode::Ctor))
        .or(fail("expression"))
}

fn op(symbol: Sym, kind: OpKind, precedence: u8) -> Parser<OperatorPart> {
    sym(symbol).map(move |token| OperatorPart {
        kind,
        precedence,
        assoc: Assoc::Left,
        span: token.span,
    })
}

fn operator_parser() -> Parser<OperatorPart> {
    op(Sym::Dot, OpKind::Dot, 0)
        .or(op(Sym::Star, OpKind::Star, 2))
        .or(op(Sym::Slash, OpKind::Slash, 2))
        .or(op(Sym::Percent, OpKind::Percent, 2))
        .or(op(Sym::Plus, OpKind::Plus, 3))
        .or(op(Sym::Minus, OpKind::Minus, 3))
        .or(op(Sym::Equals, OpKind::Equals, 4))
}

pub(crate) fn value_parser() -> Parser<ValueNode> {
    builder::<ValueBuilder>()
        .then_parse(
            ValueBuilder::token,
            kind(TokenKind::Int).or(kind(TokenKind::Str)).or(fail("value")),
        )
        .build()
}

fn var_parser() -> Parser<VarNode> {
    builder::<VarBuilder>()
        .then_parse(VarBuilder::name, kind(TokenKind::VarName))
        .build()
}

/// `name[T, ...]`: only matches when the generic brackets are present;
/// a bare name stays a variable.
fn fun_inst_parser() -> Parser<FunInstNode> {
    builder::<FunInstBuilder>()
        .then_parse(FunInstBuilder::name, kind(TokenKind::VarName))
        .then_parse(FunInstBuilder::generics, generic_args_parser(type_parser()))
        .build()
}

fn tuple_like_parser(expr: Parser<ExprNode>) -> Parser<TupleLikeNode> {
    builder::<TupleLikeBuilder>()
        .then_drop(delim(Delim::OpenParen))
        .commit()
        .then_parse(
            TupleLikeBuilder::parts,
            interspersed(expr, sym(Sym::Comma), 0, false),
        )
        .then_drop(delim(Delim::CloseParen))
        .build()
}

pub(crate) fn dis_constructor_expr_parser() -> Parser<DisConstructorNode> {
    dis_constructor_type_parser(type_parser())
}

fn fit_expr_parser(expr: Parser<ExprNode>) -> Parser<FitExprNode> {
    let branch = fit_expr_branch_parser(expr.clone());
    builder::<FitExprBuilder>()
        .then_drop(kw(Keyword::Fit))
        .commit()
        .then_parse(FitExprBuilder::scrutinee, expr)
        .then_parse(
            FitExprBuilder::branches,
            braced(interspersed_positive(branch, sym(Sym::Comma))),
        )
        .build()
}

fn fit_expr_branch_parser(expr: Parser<ExprNode>) -> Parser<FitExprBranch> {
    builder::<FitExprBranchBuilder>()
        .then_drop(not(delim(Delim::CloseBrace)))
        .commit()
        .then_parse(FitExprBranchBuilder::pattern, pattern_parser())
        .then_drop(sym(Sym::FatArrow))
        .then_parse(FitExprBranchBuilder::body, expr)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::PatternNode;
    use crate::combinator::{ParseOutcome, ParseState};
    use homc_lex::lex;
    use homc_util::span::SourceFile;

    fn parse_expr(input: &str) -> ParseOutcome<ExprNode> {
        let file = SourceFile::new(0, "test.hom", input);
        let tokens = lex(&file);
        let mut state = ParseState::new(&tokens);
        expr_parser().run(&mut state, false)
    }

    fn expect_expr(input: &str) -> ExprNode {
        match parse_expr(input) {
            ParseOutcome::Ok(expr) => expr,
            other => panic!("failed to parse {:?}: {:?}", input, other),
        }
    }

    #[test]
    fn test_integer_literal() {
        match expect_expr("42") {
            ExprNode::Value(value) => assert_eq!(value.token.text.as_str(), "42"),
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_variable() {
        assert!(matches!(expect_expr("x"), ExprNode::Var(_)));
    }

    #[test]
    fn test_call_with_arguments() {
        match expect_expr("f(a, b)") {
            ExprNode::Call(call) => {
                assert!(matches!(*call.callee, ExprNode::Var(_)));
                assert_eq!(call.args.len(), 2);
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_call_with_no_arguments() {
        match expect_expr("f()") {
            ExprNode::Call(call) => assert_eq!(call.args.len(), 0),
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_member_access() {
        match expect_expr("b.p") {
            ExprNode::Member(member) => {
                assert_eq!(member.member.text.as_str(), "p");
                assert!(matches!(*member.expr, ExprNode::Var(_)));
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_chained_member_access() {
        match expect_expr("b.p.q") {
            ExprNode::Member(member) => {
                assert_eq!(member.member.text.as_str(), "q");
                assert!(matches!(*member.expr, ExprNode::Member(_)));
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_arithmetic_becomes_builtin_call() {
        match expect_expr("a + b") {
            ExprNode::Call(call) => {
                match *call.callee {
                    ExprNode::Var(ref var) => {
                        assert_eq!(var.name.text.as_str(), "__builtin_operator_add")
                    }
                    ref other => panic!("unexpected callee: {:?}", other),
                }
                assert_eq!(call.args.len(), 2);
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_precedence_mul_binds_tighter_than_add() {
        // a + b * c  =>  add(a, mul(b, c))
        match expect_expr("a + b * c") {
            ExprNode::Call(add) => match &add.args[1] {
                ExprNode::Call(mul) => match mul.callee.as_ref() {
                    ExprNode::Var(var) => {
                        assert_eq!(var.name.text.as_str(), "__builtin_operator_mul")
                    }
                    other => panic!("unexpected callee: {:?}", other),
                },
                other => panic!("unexpected rhs: {:?}", other),
            },
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_left_associative_subtraction() {
        // a - b - c  =>  sub(sub(a, b), c)
        match expect_expr("a - b - c") {
            ExprNode::Call(outer) => match &outer.args[0] {
                ExprNode::Call(inner) => assert_eq!(inner.args.len(), 2),
                other => panic!("unexpected lhs: {:?}", other),
            },
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_assignment_to_member() {
        match expect_expr("b.p = x") {
            ExprNode::Assign(assign) => {
                assert!(matches!(*assign.target, ExprNode::Member(_)));
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_assignment_to_literal_rejected() {
        assert!(matches!(parse_expr("1 = x"), ParseOutcome::Err(_)));
    }

    #[test]
    fn test_parenthesized_expression_unwraps() {
        assert!(matches!(expect_expr("(x)"), ExprNode::Var(_)));
    }

    #[test]
    fn test_bare_tuple_rejected() {
        assert!(matches!(parse_expr("(a, b)"), ParseOutcome::Err(_)));
    }

    #[test]
    fn test_leading_operator_rejected() {
        assert!(matches!(parse_expr("+ a"), ParseOutcome::Err(_)));
    }

    #[test]
    fn test_two_operators_rejected() {
        assert!(matches!(parse_expr("a + * b"), ParseOutcome::Err(_)));
    }

    #[test]
    fn test_constructor_expression() {
        match expect_expr("Bool::True") {
            ExprNode::Ctor(ctor) => {
                assert_eq!(ctor.name.text.as_str(), "Bool");
                assert_eq!(ctor.variant.text.as_str(), "True");
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_generic_constructor_call() {
        match expect_expr("Pair[Int, Int]::P(1, 2)") {
            ExprNode::Call(call) => {
                assert!(matches!(*call.callee, ExprNode::Ctor(_)));
                assert_eq!(call.args.len(), 2);
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_fun_instantiation() {
        match expect_expr("id[Int]") {
            ExprNode::FunInst(inst) => {
                assert_eq!(inst.name.text.as_str(), "id");
                assert_eq!(inst.generics.len(), 1);
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_fit_expression() {
        match expect_expr("fit b { Zero => a, Succ => b.p, _ => c }") {
            ExprNode::Fit(fit) => {
                assert_eq!(fit.branches.len(), 3);
                assert!(matches!(fit.branches[2].pattern, PatternNode::Catchall(_)));
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_recursive_call_in_fit_branch() {
        let expr = expect_expr("fit b { Zero => a, Succ => Nat::Succ(add(a, b.p)) }");
        match expr {
            ExprNode::Fit(fit) => {
                assert!(matches!(fit.branches[1].body, ExprNode::Call(_)));
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_expression_spans_cover_extent() {
        let input = "add(a, b)";
        match expect_expr(input) {
            ExprNode::Call(call) => {
                assert_eq!(call.span.start, 0);
                assert_eq!(call.span.end, input.len());
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }
}
