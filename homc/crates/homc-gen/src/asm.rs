//! x86-64 assembly emission (NASM syntax) for the stack IR.
//!
//! Runtime contract:
//!
//! - objects are allocated through the external `_make_obj0/1/3/7` entry
//!   points, chosen by field count and padded with zeros up to the bucket
//!   size; the first argument is the variant tag;
//! - a value word carries the variant tag in its top byte: `shr rax, 56`
//!   reads the tag, `shl rax, 8` / `shr rax, 8` masks it off to recover
//!   the payload address;
//! - calls push their arguments right to left, then evaluate the callee
//!   into rax and `call rax` with rdi pointing at the argument block;
//!   arguments live at `[rbp + 8 + 8*i]` in the callee, locals at
//!   `[rbp - 8 - 8*slot]`;
//! - `wrt` issues the write syscall with the string bytes inlined next to
//!   the code.

use homc_ll::{Address, Expr, FitArm, FitBranch, Fun, Inst, Pattern, Program};
use thiserror::Error;

use crate::builtins;

#[derive(Debug, Error)]
pub enum GenError {
    #[error("object too big to allocate: {0} fields")]
    ObjectTooBig(usize),
}

/// Emit a full program: prelude, builtin operator functions, then every
/// lowered function. Output is deterministic for identical input.
pub fn emit_program(program: &Program) -> Result<String, GenError> {
    let mut ctx = AsmContext::new();
    let mut out = String::new();

    line(&mut out, "section .text");
    line(&mut out, "global main");
    line(&mut out, "extern _make_obj0");
    line(&mut out, "extern _make_obj1");
    line(&mut out, "extern _make_obj3");
    line(&mut out, "extern _make_obj7");
    out.push('\n');

    out.push_str(&builtins::emit_builtins());

    for fun in &program.functions {
        out.push('\n');
        emit_fun(&mut out, &mut ctx, fun)?;
    }

    Ok(out)
}

/// Label allocator; every label carries a per-program unique suffix.
struct AsmContext {
    next_id: usize,
}

impl AsmContext {
    fn new() -> Self {
        Self { next_id: 0 }
    }

    fn unique(&mut self, name: &str) -> String {
        self.next_id += 1;
        format!("{}_{}", name, self.next_id)
    }
}

fn line(out: &mut String, text: &str) {
    out.push_str(text);
    out.push('\n');
}

fn emit_fun(out: &mut String, ctx: &mut AsmContext, fun: &Fun) -> Result<(), GenError> {
    line(out, &format!("{}:", fun.name));
    line(out, "mov rbp, rsp");
    if fun.local_count > 0 {
        line(out, &format!("sub rsp, {}", fun.local_count * 8));
    }
    for inst in &fun.body {
        emit_inst(out, ctx, inst)?;
    }
    line(out, "mov rsp, rbp");
    line(out, "ret");
    Ok(())
}

fn emit_inst(out: &mut String, ctx: &mut AsmContext, inst: &Inst) -> Result<(), GenError> {
    match inst {
        Inst::Let { slot, value } => {
            emit_expr(out, ctx, value)?;
            line(out, &format!("mov [rbp - {}], rax", 8 + 8 * slot));
        }
        Inst::Ret(value) => {
            if let Some(value) = value {
                emit_expr(out, ctx, value)?;
            }
            line(out, "mov rsp, rbp");
            line(out, "ret");
        }
        Inst::Print(text) => {
            let bytes = text.as_bytes();
            let data = ctx.unique("str");
            let after = ctx.unique("after_str");
            line(out, &format!("jmp {}", after));
            line(out, &format!("{}:", data));
            let encoded: Vec<String> = bytes.iter().map(|b| b.to_string()).collect();
            line(out, &format!("db {}", encoded.join(", ")));
            line(out, &format!("{}:", after));
            line(out, "mov rax, 1");
            line(out, "mov rdi, 1");
            line(out, &format!("mov rsi, {}", data));
            line(out, &format!("mov rdx, {}", bytes.len()));
            line(out, "syscall");
        }
        Inst::Assign { target, value } => {
            emit_address(out, ctx, target)?;
            line(out, "push rax");
            emit_expr(out, ctx, value)?;
            line(out, "pop rcx");
            line(out, "mov [rcx], rax");
        }
        Inst::Fit {
            scrutinee,
            branches,
        } => {
            emit_expr(out, ctx, scrutinee)?;
            line(out, "push rax");
            let fit_end = ctx.unique("fit_end");
            let (last, init) = match branches.split_last() {
                Some(parts) => parts,
                None => return Ok(()),
            };
            for branch in init {
                emit_fit_arm(out, ctx, branch, &fit_end)?;
            }
            emit_inst(out, ctx, &last.body)?;
            line(out, &format!("{}:", fit_end));
            line(out, "add rsp, 8");
        }
        Inst::Block(insts) => {
            for inst in insts {
                emit_inst(out, ctx, inst)?;
            }
        }
        Inst::Eval(value) => emit_expr(out, ctx, value)?,
    }
    Ok(())
}

fn emit_fit_arm(
    out: &mut String,
    ctx: &mut AsmContext,
    arm: &FitArm,
    fit_end: &str,
) -> Result<(), GenError> {
    match &arm.pattern {
        None => {
            emit_inst(out, ctx, &arm.body)?;
            line(out, &format!("jmp {}", fit_end));
        }
        Some(pattern) => {
            let branch_end = ctx.unique("branch_end");
            line(out, "mov rax, [rsp]");
            emit_pattern(out, ctx, pattern);
            line(out, &format!("jnz {}", branch_end));
            emit_inst(out, ctx, &arm.body)?;
            line(out, &format!("jmp {}", fit_end));
            line(out, &format!("{}:", branch_end));
        }
    }
    Ok(())
}

/// Leave the target address in rax.
fn emit_address(out: &mut String, ctx: &mut AsmContext, address: &Address) -> Result<(), GenError> {
    match address {
        Address::Var(slot) => line(out, &format!("lea rax, [rbp - {}]", 8 + 8 * slot)),
        Address::Arg(slot) => line(out, &format!("lea rax, [rbp + {}]", 8 + 8 * slot)),
        Address::Member { object, index } => {
            emit_expr(out, ctx, object)?;
            emit_mask_tag(out);
            line(out, &format!("add rax, {}", 8 * index));
        }
    }
    Ok(())
}

fn emit_expr(out: &mut String, ctx: &mut AsmContext, expr: &Expr) -> Result<(), GenError> {
    match expr {
        Expr::Int(value) => line(out, &format!("mov rax, {}", value)),
        Expr::FunName(name) => line(out, &format!("mov rax, {}", name)),
        Expr::Var(slot) => {
            line(out, &format!("lea rax, [rbp - {}]", 8 + 8 * slot));
            line(out, "mov rax, [rax]");
        }
        Expr::Arg(slot) => {
            line(out, &format!("lea rax, [rbp + {}]", 8 + 8 * slot));
            line(out, "mov rax, [rax]");
        }
        Expr::Call { callee, args } => emit_call(out, ctx, callee, args)?,
        Expr::Member { object, index } => {
            emit_expr(out, ctx, object)?;
            emit_mask_tag(out);
            line(out, &format!("add rax, {}", 8 * index));
            line(out, "mov rax, [rax]");
        }
        Expr::Create { tag, fields } => emit_create(out, ctx, *tag, fields)?,
        Expr::Fit {
            scrutinee,
            branches,
        } => {
            emit_expr(out, ctx, scrutinee)?;
            line(out, "push rax");
            let fit_end = ctx.unique("fit_end");
            let (last, init) = match branches.split_last() {
                Some(parts) => parts,
                None => return Ok(()),
            };
            for branch in init {
                emit_fit_branch(out, ctx, branch, &fit_end)?;
            }
            emit_expr(out, ctx, &last.body)?;
            line(out, &format!("{}:", fit_end));
            line(out, "add rsp, 8");
        }
    }
    Ok(())
}

fn emit_fit_branch(
    out: &mut String,
    ctx: &mut AsmContext,
    branch: &FitBranch,
    fit_end: &str,
) -> Result<(), GenError> {
    match &branch.pattern {
        None => {
            emit_expr(out, ctx, &branch.body)?;
            line(out, &format!("jmp {}", fit_end));
        }
        Some(pattern) => {
            let branch_end = ctx.unique("branch_end");
            line(out, "mov rax, [rsp]");
            emit_pattern(out, ctx, pattern);
            line(out, &format!("jnz {}", branch_end));
            emit_expr(out, ctx, &branch.body)?;
            line(out, &format!("jmp {}", fit_end));
            line(out, &format!("{}:", branch_end));
        }
    }
    Ok(())
}

fn emit_call(
    out: &mut String,
    ctx: &mut AsmContext,
    callee: &Expr,
    args: &[Expr],
) -> Result<(), GenError> {
    line(out, "push rbp");
    for arg in args.iter().rev() {
        emit_expr(out, ctx, arg)?;
        line(out, "push rax");
    }
    emit_expr(out, ctx, callee)?;
    line(out, "mov rdi, rsp");
    line(out, "call rax");
    line(out, &format!("add rsp, {}", args.len() * 8));
    line(out, "pop rbp");
    Ok(())
}

/// Allocate through the bucket matching the field count, padding with
/// zeros up to the bucket size.
fn emit_create(
    out: &mut String,
    ctx: &mut AsmContext,
    tag: usize,
    fields: &[Expr],
) -> Result<(), GenError> {
    let (bucket, capacity) = match fields.len() {
        0 => ("_make_obj0", 0),
        1 => ("_make_obj1", 1),
        2..=3 => ("_make_obj3", 3),
        4..=7 => ("_make_obj7", 7),
        n => return Err(GenError::ObjectTooBig(n)),
    };

    let mut args = Vec::with_capacity(capacity + 1);
    args.push(Expr::Int(tag as i64));
    args.extend(fields.iter().cloned());
    args.extend(std::iter::repeat(Expr::Int(0)).take(capacity - fields.len()));

    emit_call(out, ctx, &Expr::FunName(homc_util::Symbol::intern(bucket)), &args)
}

/// Tag check: takes the value in rax, destroys it, and sets ZF iff the
/// pattern matches.
fn emit_pattern(out: &mut String, ctx: &mut AsmContext, pattern: &Pattern) {
    let mut inner = String::new();
    let match_end = ctx.unique("match_end");
    let mut gap = 0usize;
    for child in &pattern.children {
        match child {
            None => gap += 8,
            Some(child_pattern) => {
                line(&mut inner, &format!("add qword [rsp], {}", gap));
                line(&mut inner, "mov rax, [rsp]");
                line(&mut inner, "mov rax, [rax]");
                emit_pattern(&mut inner, ctx, child_pattern);
                line(&mut inner, &format!("jnz {}", match_end));
                gap = 8;
            }
        }
    }

    if inner.is_empty() {
        emit_read_tag(out);
        line(out, &format!("cmp rax, {}", pattern.tag));
        return;
    }

    let after_match_end = ctx.unique("after_match_end");
    line(out, "mov rbx, rax");
    emit_read_tag(out);
    line(out, &format!("cmp rax, {}", pattern.tag));
    line(out, &format!("jne {}", after_match_end));
    line(out, "mov rax, rbx");
    emit_mask_tag(out);
    line(out, "push rax");
    out.push_str(&inner);
    line(out, &format!("{}:", match_end));
    line(out, "pop rax");
    line(out, &format!("{}:", after_match_end));
}

/// `value >> 56`: the variant tag.
fn emit_read_tag(out: &mut String) {
    line(out, "shr rax, 56");
}

/// `value & mask`: the payload address with the tag byte cleared.
fn emit_mask_tag(out: &mut String) {
    line(out, "shl rax, 8");
    line(out, "shr rax, 8");
}
