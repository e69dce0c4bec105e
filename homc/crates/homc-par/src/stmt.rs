//! Statement parsing.
//!
//! `Stmt := Ret | Block | Write | Let | FitStmt | Expr`, each terminated by
//! `;` inside a block. The statement alternation commits at each leading
//! keyword, so a malformed `let` reports a `let` error instead of falling
//! through to the expression rule.

use homc_lex::{Delim, Keyword, Sym, TokenKind};

use crate::ast::{
    BlockNode, ExprNode, FitStmtBranch, FitStmtNode, LetNode, RetNode, StmtNode, WriteNode,
};
use crate::builder::{
    BlockBuilder, FitStmtBranchBuilder, FitStmtBuilder, LetBuilder, RetBuilder, WriteBuilder,
};
use crate::combinator::{builder, fail, kind, not, optional, recursive, repeat, Parser};
use crate::expr::expr_parser;
use crate::helpers::{braced, delim, interspersed_positive, kw, sym};
use crate::pattern::pattern_parser;

pub fn statement_parser() -> Parser<StmtNode> {
    recursive(|stmt| {
        let expr = expr_parser();
        ret_parser(expr.clone())
            .map(StmtNode::Ret)
            .or(block_parser(stmt.clone()).map(StmtNode::Block))
            .or(wrt_parser().map(StmtNode::Write))
            .or(let_parser(expr.clone()).map(StmtNode::Let))
            .or(fit_stmt_parser(expr.clone(), stmt).map(StmtNode::Fit))
            .or(expr.map(StmtNode::Expr))
            .or(fail("statement"))
    })
}

/// `{ (stmt ';')* }`; the semicolon is committed once its statement parsed.
pub(crate) fn block_parser(stmt: Parser<StmtNode>) -> Parser<BlockNode> {
    let terminated = stmt.commit_then_drop(sym(Sym::Semicolon));
    builder::<BlockBuilder>()
        .then_parse(BlockBuilder::statements, braced(repeat(terminated, 0)))
        .build()
}

fn ret_parser(expr: Parser<ExprNode>) -> Parser<RetNode> {
    builder::<RetBuilder>()
        .then_drop(kw(Keyword::Ret))
        .commit()
        .then_parse(RetBuilder::expr, optional(expr.map(Some), None))
        .build()
}

fn wrt_parser() -> Parser<WriteNode> {
    builder::<WriteBuilder>()
        .then_drop(kw(Keyword::Wrt))
        .commit()
        .then_parse(WriteBuilder::token, kind(TokenKind::Str))
        .build()
}

fn let_parser(expr: Parser<ExprNode>) -> Parser<LetNode> {
    builder::<LetBuilder>()
        .then_drop(kw(Keyword::Let))
        .commit()
        .then_parse(LetBuilder::name, kind(TokenKind::VarName))
        .then_drop(sym(Sym::Equals))
        .then_parse(LetBuilder::value, expr)
        .build()
}

fn fit_stmt_parser(expr: Parser<ExprNode>, stmt: Parser<StmtNode>) -> Parser<FitStmtNode> {
    let branch = fit_stmt_branch_parser(stmt);
    builder::<FitStmtBuilder>()
        .then_drop(kw(Keyword::Fit))
        .commit()
        .then_parse(FitStmtBuilder::scrutinee, expr)
        .then_parse(
            FitStmtBuilder::branches,
            braced(interspersed_positive(branch, sym(Sym::Comma))),
        )
        .build()
}

fn fit_stmt_branch_parser(stmt: Parser<StmtNode>) -> Parser<FitStmtBranch> {
    builder::<FitStmtBranchBuilder>()
        .then_drop(not(delim(Delim::CloseBrace)))
        .commit()
        .then_parse(FitStmtBranchBuilder::pattern, pattern_parser())
        .then_drop(sym(Sym::FatArrow))
        .then_parse(FitStmtBranchBuilder::body, stmt)
        .build()
}
