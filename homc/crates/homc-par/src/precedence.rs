//! Precedence climbing over a flat run of terms and operators.
//!
//! The expression grammar first collects a run of alternating terms and
//! operators. A shunting pass then inserts an implicit *function call*
//! operator between a term and a following parenthesized group, and the
//! run is folded into a tree by precedence (lower binds tighter):
//!
//! | operator | precedence |
//! |----------|------------|
//! | `.`      | 0          |
//! | call     | 1          |
//! | `* / %`  | 2          |
//! | `+ -`    | 3          |
//! | `=`      | 4          |
//!
//! All operators are left-associative. While folding, `.` with a variable
//! on the right becomes a member access, `=` with a variable or member on
//! the left becomes an assignment, the call operator attaches the group's
//! elements as arguments, and the remaining operators become calls of the
//! builtin operator functions.

use std::collections::VecDeque;

use homc_lex::{Token, TokenKind};
use homc_util::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Span, Symbol};

use crate::ast::{AssignNode, CallNode, ExprNode, MemberNode, VarNode};
use crate::combinator::{internal_diag, ParseState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Assoc {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OpKind {
    Call,
    Dot,
    Star,
    Slash,
    Percent,
    Plus,
    Minus,
    Equals,
}

impl OpKind {
    /// The builtin function a user-level arithmetic operator resolves to.
    fn builtin_name(self) -> Option<&'static str> {
        match self {
            OpKind::Star => Some("__builtin_operator_mul"),
            OpKind::Slash => Some("__builtin_operator_div"),
            OpKind::Percent => Some("__builtin_operator_mod"),
            OpKind::Plus => Some("__builtin_operator_add"),
            OpKind::Minus => Some("__builtin_operator_sub"),
            OpKind::Call | OpKind::Dot | OpKind::Equals => None,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct OperatorPart {
    pub kind: OpKind,
    pub precedence: u8,
    pub assoc: Assoc,
    pub span: Span,
}

/// One element of the flat expression run.
pub(crate) enum ExprPart {
    Operator(OperatorPart),
    Term(ExprNode),
}

const CALL_PRECEDENCE: u8 = 1;

fn malformed(message: impl Into<String>, span: Span) -> Diagnostic {
    DiagnosticBuilder::error(message)
        .code(DiagnosticCode::E_PARSE_MALFORMED_EXPR)
        .span(span)
        .build()
}

/// Fold a validated run of parts into a single expression.
pub(crate) fn make_expr(
    parts: Vec<ExprPart>,
    state: &mut ParseState<'_>,
) -> Result<ExprNode, Vec<Diagnostic>> {
    let mut iter = parts.into_iter();
    let first = match iter.next() {
        Some(part) => part,
        None => return Err(vec![internal_diag(Span::DUMMY)]),
    };
    let first = match first {
        ExprPart::Operator(op) => {
            return Err(vec![malformed(
                "expression cannot begin with an operator",
                op.span,
            )])
        }
        ExprPart::Term(term) => unwrap_tuple_like(term)?,
    };

    let mut queue: VecDeque<ExprPart> = VecDeque::new();
    queue.push_back(ExprPart::Term(first));

    for part in iter {
        let last_is_operator = matches!(queue.back(), Some(ExprPart::Operator(_)));
        match &part {
            ExprPart::Term(term) if !last_is_operator => {
                // two adjacent terms: the right one must be a call argument
                // group, joined by the implicit call operator
                if let ExprNode::TupleLike(tuple) = term {
                    queue.push_back(ExprPart::Operator(OperatorPart {
                        kind: OpKind::Call,
                        precedence: CALL_PRECEDENCE,
                        assoc: Assoc::Left,
                        span: tuple.span,
                    }));
                } else {
                    return Err(vec![malformed(
                        "expected operator or function call",
                        term.span(),
                    )]);
                }
            }
            ExprPart::Operator(op) if last_is_operator => {
                return Err(vec![malformed("expected expression", op.span)]);
            }
            _ => {}
        }
        queue.push_back(part);
    }

    build_expr(&mut queue, None, state)
}

/// Returns true when `x {left} y {right} z` groups as `x {left} (y {right} z)`:
/// the right operator binds tighter, or they are the same right-associative
/// operator.
fn right_op_first(left: Option<&OperatorPart>, right: &OperatorPart) -> bool {
    match left {
        None => true,
        Some(left) => {
            if left.kind == right.kind {
                left.assoc == Assoc::Right
            } else {
                left.precedence > right.precedence
            }
        }
    }
}

fn build_expr(
    parts: &mut VecDeque<ExprPart>,
    last_operator: Option<&OperatorPart>,
    state: &mut ParseState<'_>,
) -> Result<ExprNode, Vec<Diagnostic>> {
    let mut left = match parts.pop_front() {
        Some(ExprPart::Term(term)) => term,
        _ => return Err(vec![internal_diag(Span::DUMMY)]),
    };

    while let Some(ExprPart::Operator(next)) = parts.front() {
        if !right_op_first(last_operator, next) {
            break;
        }
        let op = match parts.pop_front() {
            Some(ExprPart::Operator(op)) => op,
            _ => return Err(vec![internal_diag(Span::DUMMY)]),
        };
        let right = build_expr(parts, Some(&op), state)?;
        left = build_node(left, &op, right, state)?;
    }

    Ok(left)
}

fn build_node(
    left: ExprNode,
    op: &OperatorPart,
    right: ExprNode,
    state: &mut ParseState<'_>,
) -> Result<ExprNode, Vec<Diagnostic>> {
    let left = unwrap_tuple_like(left)?;
    let right = if op.kind == OpKind::Call {
        right
    } else {
        unwrap_tuple_like(right)?
    };

    match op.kind {
        OpKind::Call => {
            let tuple = match right {
                ExprNode::TupleLike(tuple) => tuple,
                other => {
                    return Err(vec![malformed(
                        "expected function call arguments",
                        other.span(),
                    )])
                }
            };
            let span = left.span().to(tuple.span);
            Ok(ExprNode::Call(CallNode {
                id: state.fresh_id(),
                callee: Box::new(left),
                args: tuple.parts,
                span,
            }))
        }
        OpKind::Dot => match right {
            ExprNode::Var(var) => {
                let span = left.span().to(var.span);
                Ok(ExprNode::Member(MemberNode {
                    id: state.fresh_id(),
                    expr: Box::new(left),
                    member: var.name,
                    span,
                }))
            }
            other => Err(vec![malformed("expected member name", other.span())]),
        },
        OpKind::Equals => {
            if matches!(left, ExprNode::Var(_) | ExprNode::Member(_)) {
                let span = left.span().to(right.span());
                Ok(ExprNode::Assign(AssignNode {
                    id: state.fresh_id(),
                    target: Box::new(left),
                    value: Box::new(right),
                    span,
                }))
            } else {
                Err(vec![malformed(
                    "can only assign to variables and members",
                    left.span(),
                )])
            }
        }
        kind => {
            let Some(name) = kind.builtin_name() else {
                return Err(vec![internal_diag(op.span)]);
            };
            let callee = ExprNode::Var(VarNode {
                id: state.fresh_id(),
                name: Token::new(Symbol::intern(name), TokenKind::VarName, op.span),
                span: op.span,
            });
            let span = left.span().to(right.span());
            Ok(ExprNode::Call(CallNode {
                id: state.fresh_id(),
                callee: Box::new(callee),
                args: vec![left, right],
                span,
            }))
        }
    }
}

/// A parenthesized group in operand position must hold exactly one
/// expression; that expression replaces the group.
fn unwrap_tuple_like(node: ExprNode) -> Result<ExprNode, Vec<Diagnostic>> {
    match node {
        ExprNode::TupleLike(mut tuple) => {
            if tuple.parts.len() == 1 {
                Ok(tuple.parts.remove(0))
            } else {
                Err(vec![malformed(
                    "unexpected function call syntax",
                    tuple.span,
                )])
            }
        }
        other => Ok(other),
    }
}
