//! Lowering from the typed AST into the stack IR.
//!
//! Runs only on programs that validated and type-checked cleanly; every
//! inconsistency found here is an internal error, reported rather than
//! silently mis-lowered. Frame slots are assigned by a recursive pre-scan
//! of `let` statements (re-bound names share their slot); arguments map to
//! slots in declaration order. Each dis variant additionally produces a
//! constructor function `__<Dis>__<variant_id>`.

use homc_lex::TokenKind;
use homc_par::ast::{
    DisConstructorNode, ExprNode, FitExprNode, FitStmtNode, FunNode, Item, MemberNode,
    PatternNode, Program, StmtNode,
};
use homc_sem::{substitute, Decl, DisTy, Ty, TypingContext};
use homc_util::{FxHashMap, Symbol};
use thiserror::Error;

use crate::ll;

/// Internal lowering failure; never user-caused on a clean pipeline.
#[derive(Debug, Error)]
pub enum LowerError {
    #[error("integer literal `{0}` does not fit in 64 bits")]
    IntOutOfRange(String),

    #[error("string literals can only be written with `wrt`")]
    StringOutsideWrt,

    #[error("objects are limited to 7 fields, variant `{0}` has {1}")]
    ObjectTooBig(String, usize),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Lower a typed program.
pub fn lower(program: &Program, ctx: &TypingContext) -> Result<ll::Program, LowerError> {
    let mut functions = Vec::new();
    for item in &program.items {
        match item {
            Item::Fun(fun) => functions.push(lower_fun(fun, ctx)?),
            Item::Dis(dis) => {
                for (variant_id, variant) in dis.variants.iter().enumerate() {
                    if variant.args.len() > 7 {
                        return Err(LowerError::ObjectTooBig(
                            variant.name.text.as_str().to_string(),
                            variant.args.len(),
                        ));
                    }
                    functions.push(ll::constructor(
                        dis.name.text,
                        variant_id,
                        variant.args.len(),
                    ));
                }
            }
            // bare top-level expressions have no runtime representation
            Item::Expr(_) => {}
        }
    }
    Ok(ll::Program { functions })
}

fn lower_fun(fun: &FunNode, ctx: &TypingContext) -> Result<ll::Fun, LowerError> {
    let mut var_to_slot = FxHashMap::default();
    collect_lets(&fun.body.statements, &mut var_to_slot);

    let arg_to_slot = fun
        .args
        .iter()
        .enumerate()
        .map(|(slot, arg)| (arg.name.text, slot))
        .collect();

    let lower_ctx = LowerCtx {
        var_to_slot,
        arg_to_slot,
        ctx,
    };

    let body = fun
        .body
        .statements
        .iter()
        .map(|stmt| lower_ctx.lower_stmt(stmt))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ll::Fun {
        name: fun.name.text,
        local_count: lower_ctx.var_to_slot.len(),
        body,
    })
}

/// Assign a frame slot to every distinct `let` name in the body,
/// including lets nested in blocks and fit-statement arms.
fn collect_lets(statements: &[StmtNode], var_to_slot: &mut FxHashMap<Symbol, usize>) {
    for stmt in statements {
        match stmt {
            StmtNode::Let(node) => {
                let next = var_to_slot.len();
                var_to_slot.entry(node.name.text).or_insert(next);
            }
            StmtNode::Block(block) => collect_lets(&block.statements, var_to_slot),
            StmtNode::Fit(fit) => {
                for branch in &fit.branches {
                    collect_lets(std::slice::from_ref(&branch.body), var_to_slot);
                }
            }
            _ => {}
        }
    }
}

struct LowerCtx<'a> {
    var_to_slot: FxHashMap<Symbol, usize>,
    arg_to_slot: FxHashMap<Symbol, usize>,
    ctx: &'a TypingContext,
}

impl LowerCtx<'_> {
    fn lower_stmt(&self, stmt: &StmtNode) -> Result<ll::Inst, LowerError> {
        match stmt {
            StmtNode::Ret(ret) => {
                let value = match &ret.expr {
                    Some(expr) => Some(self.lower_expr(expr)?),
                    None => None,
                };
                Ok(ll::Inst::Ret(value))
            }
            StmtNode::Write(write) => Ok(ll::Inst::Print(write.value.clone())),
            StmtNode::Let(node) => {
                let slot = *self
                    .var_to_slot
                    .get(&node.name.text)
                    .ok_or_else(|| internal("let variable has no frame slot"))?;
                Ok(ll::Inst::Let {
                    slot,
                    value: self.lower_expr(&node.value)?,
                })
            }
            StmtNode::Block(block) => {
                let insts = block
                    .statements
                    .iter()
                    .map(|stmt| self.lower_stmt(stmt))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ll::Inst::Block(insts))
            }
            StmtNode::Fit(fit) => self.lower_fit_stmt(fit),
            StmtNode::Expr(ExprNode::Assign(assign)) => Ok(ll::Inst::Assign {
                target: self.lower_address(&assign.target)?,
                value: self.lower_expr(&assign.value)?,
            }),
            StmtNode::Expr(expr) => Ok(ll::Inst::Eval(self.lower_expr(expr)?)),
        }
    }

    fn lower_expr(&self, expr: &ExprNode) -> Result<ll::Expr, LowerError> {
        match expr {
            ExprNode::Value(value) => match value.token.kind {
                TokenKind::Int => value
                    .token
                    .text
                    .as_str()
                    .parse::<i64>()
                    .map(ll::Expr::Int)
                    .map_err(|_| LowerError::IntOutOfRange(value.token.text.as_str().to_string())),
                _ => Err(LowerError::StringOutsideWrt),
            },
            ExprNode::Var(var) => {
                let name = var.name.text;
                if let Some(&slot) = self.var_to_slot.get(&name) {
                    Ok(ll::Expr::Var(slot))
                } else if let Some(&slot) = self.arg_to_slot.get(&name) {
                    Ok(ll::Expr::Arg(slot))
                } else {
                    Ok(ll::Expr::FunName(name))
                }
            }
            ExprNode::FunInst(inst) => Ok(ll::Expr::FunName(inst.name.text)),
            ExprNode::Call(call) => {
                let args = call
                    .args
                    .iter()
                    .map(|arg| self.lower_expr(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                let callee = self.lower_expr(&call.callee)?;
                Ok(ll::Expr::Call {
                    callee: Box::new(callee),
                    args,
                })
            }
            ExprNode::Member(member) => {
                let index = self.member_index(member)?;
                Ok(ll::Expr::Member {
                    object: Box::new(self.lower_expr(&member.expr)?),
                    index,
                })
            }
            ExprNode::Ctor(ctor) => self.lower_constructor(ctor),
            ExprNode::Fit(fit) => self.lower_fit_expr(fit),
            ExprNode::Assign(_) => Err(internal("assignment outside statement position")),
            ExprNode::TupleLike(_) => Err(internal("ungrouped expression survived parsing")),
        }
    }

    fn lower_address(&self, expr: &ExprNode) -> Result<ll::Address, LowerError> {
        match expr {
            ExprNode::Var(var) => {
                let name = var.name.text;
                if let Some(&slot) = self.var_to_slot.get(&name) {
                    Ok(ll::Address::Var(slot))
                } else if let Some(&slot) = self.arg_to_slot.get(&name) {
                    Ok(ll::Address::Arg(slot))
                } else {
                    Err(internal("assignment target is not addressable"))
                }
            }
            ExprNode::Member(member) => {
                let index = self.member_index(member)?;
                Ok(ll::Address::Member {
                    object: Box::new(self.lower_expr(&member.expr)?),
                    index,
                })
            }
            _ => Err(internal("assignment target is not addressable")),
        }
    }

    /// Field index of a member access, resolved through the refined
    /// variant recorded for the receiver expression.
    fn member_index(&self, member: &MemberNode) -> Result<usize, LowerError> {
        let receiver_ty = self
            .ctx
            .expr_ty(member.expr.id())
            .ok_or_else(|| internal("member receiver has no recorded type"))?;
        let dis_ty = match receiver_ty {
            Ty::Dis(dis) => dis,
            _ => return Err(internal("member receiver is not a dis value")),
        };
        let variant_name = match &dis_ty.pattern {
            homc_sem::TyPattern::Variant(pat) => pat.name,
            _ => return Err(internal("member receiver variant is not known")),
        };
        let decl = self
            .ctx
            .dis(dis_ty.name)
            .and_then(Decl::known)
            .ok_or_else(|| internal("member receiver dis is not declared"))?;
        decl.variant(variant_name)
            .and_then(|variant| variant.arg_index(member.member.text))
            .ok_or_else(|| internal("member field is not declared"))
    }

    fn lower_constructor(&self, ctor: &DisConstructorNode) -> Result<ll::Expr, LowerError> {
        let decl = self
            .ctx
            .dis(ctor.name.text)
            .and_then(Decl::known)
            .ok_or_else(|| internal("constructor dis is not declared"))?;
        let variant_id = decl
            .variant_id(ctor.variant.text)
            .ok_or_else(|| internal("constructor variant is not declared"))?;
        let variant = &decl.variants[variant_id];

        if variant.args.is_empty() {
            Ok(ll::Expr::Create {
                tag: variant_id,
                fields: Vec::new(),
            })
        } else {
            Ok(ll::Expr::FunName(ll::constructor_name(
                ctor.name.text,
                variant_id,
            )))
        }
    }

    fn lower_fit_expr(&self, fit: &FitExprNode) -> Result<ll::Expr, LowerError> {
        let scrutinee_ty = self.scrutinee_ty(&fit.scrutinee)?;
        let branches = fit
            .branches
            .iter()
            .map(|branch| {
                Ok(ll::FitBranch {
                    pattern: self.lower_pattern(&scrutinee_ty, &branch.pattern)?,
                    body: self.lower_expr(&branch.body)?,
                })
            })
            .collect::<Result<Vec<_>, LowerError>>()?;
        Ok(ll::Expr::Fit {
            scrutinee: Box::new(self.lower_expr(&fit.scrutinee)?),
            branches,
        })
    }

    fn lower_fit_stmt(&self, fit: &FitStmtNode) -> Result<ll::Inst, LowerError> {
        let scrutinee_ty = self.scrutinee_ty(&fit.scrutinee)?;
        let branches = fit
            .branches
            .iter()
            .map(|branch| {
                Ok(ll::FitArm {
                    pattern: self.lower_pattern(&scrutinee_ty, &branch.pattern)?,
                    body: Box::new(self.lower_stmt(&branch.body)?),
                })
            })
            .collect::<Result<Vec<_>, LowerError>>()?;
        Ok(ll::Inst::Fit {
            scrutinee: self.lower_expr(&fit.scrutinee)?,
            branches,
        })
    }

    fn scrutinee_ty(&self, scrutinee: &ExprNode) -> Result<DisTy, LowerError> {
        match self.ctx.expr_ty(scrutinee.id()) {
            Some(Ty::Dis(dis)) => Ok(dis.clone()),
            _ => Err(internal("fit scrutinee is not a dis value")),
        }
    }

    /// Compile a written pattern against the matched dis type. Catchall
    /// and literal patterns compile to `None` (no runtime inspection).
    fn lower_pattern(
        &self,
        dis_ty: &DisTy,
        pattern: &PatternNode,
    ) -> Result<Option<ll::Pattern>, LowerError> {
        let variant_pattern = match pattern {
            PatternNode::Variant(variant) => variant,
            PatternNode::Catchall(_) | PatternNode::Value(_) => return Ok(None),
        };

        let decl = self
            .ctx
            .dis(dis_ty.name)
            .and_then(Decl::known)
            .ok_or_else(|| internal("pattern dis is not declared"))?;
        let variant_id = decl
            .variant_id(variant_pattern.name.text)
            .ok_or_else(|| internal("pattern variant is not declared"))?;
        let variant = &decl.variants[variant_id];

        let mut children = Vec::new();
        for (written, field) in variant_pattern.args.iter().zip(variant.args.iter()) {
            let field_ty = substitute(&field.ty, &dis_ty.generics);
            match field_ty {
                Ty::Dis(field_dis) => children.push(self.lower_pattern(&field_dis, written)?),
                // non-dis fields are not inspected at runtime
                _ => children.push(None),
            }
        }

        Ok(Some(ll::Pattern {
            tag: variant_id,
            children,
        }))
    }
}

fn internal(message: &str) -> LowerError {
    LowerError::Internal(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use homc_lex::lex;
    use homc_util::span::SourceFile;
    use homc_util::Handler;

    fn lower_source(input: &str) -> ll::Program {
        let file = SourceFile::new(0, "test.hom", input);
        let tokens = lex(&file);
        let handler = Handler::new();
        let program = homc_par::parse(&tokens, &handler).expect("program should parse");
        homc_sem::validate(&program, &handler);
        let ctx = homc_sem::check(&program, &handler);
        assert!(
            !handler.has_errors(),
            "program should check: {:?}",
            handler.diagnostics().iter().map(|d| d.message.clone()).collect::<Vec<_>>()
        );
        lower(&program, &ctx).expect("lowering should succeed")
    }

    fn find_fun<'a>(program: &'a ll::Program, name: &str) -> &'a ll::Fun {
        program
            .functions
            .iter()
            .find(|fun| fun.name.as_str() == name)
            .unwrap_or_else(|| panic!("missing function {}", name))
    }

    #[test]
    fn test_constructors_for_each_variant() {
        let program = lower_source("dis Bool { True, False } fun main() -> Bool { ret Bool::True; }");
        assert!(program.functions.iter().any(|f| f.name.as_str() == "__Bool__0"));
        assert!(program.functions.iter().any(|f| f.name.as_str() == "__Bool__1"));
    }

    #[test]
    fn test_zero_arg_constructor_inlines_create() {
        let program = lower_source("dis Bool { True, False } fun main() -> Bool { ret Bool::True; }");
        let main = find_fun(&program, "main");
        match &main.body[0] {
            ll::Inst::Ret(Some(ll::Expr::Create { tag, fields })) => {
                assert_eq!(*tag, 0);
                assert!(fields.is_empty());
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_constructor_with_args_becomes_fun_name() {
        let program = lower_source(
            "dis Nat { Zero, Succ(p: Nat) }\n\
             fun one() -> Nat { ret Nat::Succ(Nat::Zero); }\n",
        );
        let one = find_fun(&program, "one");
        match &one.body[0] {
            ll::Inst::Ret(Some(ll::Expr::Call { callee, args })) => {
                assert!(matches!(callee.as_ref(), ll::Expr::FunName(name) if name.as_str() == "__Nat__1"));
                assert_eq!(args.len(), 1);
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_let_slots_and_var_reads() {
        let program = lower_source("fun f() -> Int { let x = 1; let y = 2; ret x; }");
        let f = find_fun(&program, "f");
        assert_eq!(f.local_count, 2);
        assert!(matches!(f.body[0], ll::Inst::Let { slot: 0, .. }));
        assert!(matches!(f.body[1], ll::Inst::Let { slot: 1, .. }));
        match &f.body[2] {
            ll::Inst::Ret(Some(ll::Expr::Var(0))) => {}
            other => panic!("unexpected ret: {:?}", other),
        }
    }

    #[test]
    fn test_nested_lets_get_slots() {
        let program = lower_source("fun f() { let x = 1; { let y = 2; }; }");
        assert_eq!(find_fun(&program, "f").local_count, 2);
    }

    #[test]
    fn test_args_map_to_arg_slots() {
        let program = lower_source("fun f(a: Int, b: Int) -> Int { ret b; }");
        let f = find_fun(&program, "f");
        match &f.body[0] {
            ll::Inst::Ret(Some(ll::Expr::Arg(1))) => {}
            other => panic!("unexpected ret: {:?}", other),
        }
    }

    #[test]
    fn test_fit_branch_count_preserved() {
        let program = lower_source(
            "dis Nat { Zero, Succ(p: Nat) }\n\
             fun f(n: Nat) -> Int { ret fit n { Zero => 0, Succ => 1 }; }\n",
        );
        let f = find_fun(&program, "f");
        match &f.body[0] {
            ll::Inst::Ret(Some(ll::Expr::Fit { branches, .. })) => {
                assert_eq!(branches.len(), 2);
                assert_eq!(branches[0].pattern.as_ref().map(|p| p.tag), Some(0));
                assert_eq!(branches[1].pattern.as_ref().map(|p| p.tag), Some(1));
            }
            other => panic!("unexpected ret: {:?}", other),
        }
    }

    #[test]
    fn test_catchall_branch_has_no_pattern() {
        let program = lower_source(
            "dis Nat { Zero, Succ(p: Nat) }\n\
             fun f(n: Nat) -> Int { ret fit n { Zero => 0, _ => 1 }; }\n",
        );
        let f = find_fun(&program, "f");
        match &f.body[0] {
            ll::Inst::Ret(Some(ll::Expr::Fit { branches, .. })) => {
                assert!(branches[1].pattern.is_none());
            }
            other => panic!("unexpected ret: {:?}", other),
        }
    }

    #[test]
    fn test_nested_pattern_children() {
        let program = lower_source(
            "dis Nat { Zero, Succ(p: Nat) }\n\
             fun f(n: Nat) -> Int { ret fit n { Succ (Succ _) => 2, _ => 0 }; }\n",
        );
        let f = find_fun(&program, "f");
        match &f.body[0] {
            ll::Inst::Ret(Some(ll::Expr::Fit { branches, .. })) => {
                let pattern = branches[0].pattern.as_ref().unwrap();
                assert_eq!(pattern.tag, 1);
                assert_eq!(pattern.children.len(), 1);
                let child = pattern.children[0].as_ref().unwrap();
                assert_eq!(child.tag, 1);
                // the nested catchall is not inspected
                assert!(matches!(child.children.as_slice(), [None]));
            }
            other => panic!("unexpected ret: {:?}", other),
        }
    }

    #[test]
    fn test_member_lowered_to_field_index() {
        let program = lower_source(
            "dis Pair[A, B] { P(a: A, b: B) }\n\
             fun second(p: Pair[Int, Int]) -> Int {\n\
                 ret fit p { P => p.b };\n\
             }\n",
        );
        let second = find_fun(&program, "second");
        match &second.body[0] {
            ll::Inst::Ret(Some(ll::Expr::Fit { branches, .. })) => match &branches[0].body {
                ll::Expr::Member { index, .. } => assert_eq!(*index, 1),
                other => panic!("unexpected branch body: {:?}", other),
            },
            other => panic!("unexpected ret: {:?}", other),
        }
    }

    #[test]
    fn test_assignment_lowering() {
        let program = lower_source("fun f() { let x = 1; x = 2; }");
        let f = find_fun(&program, "f");
        match &f.body[1] {
            ll::Inst::Assign {
                target: ll::Address::Var(0),
                value: ll::Expr::Int(2),
            } => {}
            other => panic!("unexpected assign: {:?}", other),
        }
    }

    #[test]
    fn test_write_lowering() {
        let program = lower_source("fun main() { wrt \"hi\\n\"; }");
        let main = find_fun(&program, "main");
        match &main.body[0] {
            ll::Inst::Print(text) => assert_eq!(text, "hi\n"),
            other => panic!("unexpected inst: {:?}", other),
        }
    }

    #[test]
    fn test_operator_lowering_uses_builtin() {
        let program = lower_source("fun f(a: Int, b: Int) -> Int { ret a + b; }");
        let f = find_fun(&program, "f");
        match &f.body[0] {
            ll::Inst::Ret(Some(ll::Expr::Call { callee, args })) => {
                assert!(
                    matches!(callee.as_ref(), ll::Expr::FunName(name) if name.as_str() == "__builtin_operator_add")
                );
                assert_eq!(args.len(), 2);
            }
            other => panic!("unexpected ret: {:?}", other),
        }
    }
}
