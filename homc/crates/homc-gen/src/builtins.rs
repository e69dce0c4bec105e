//! Assembly bodies for the builtin operator functions.
//!
//! All builtins follow the same calling convention as user functions:
//! arguments at `[rbp + 8 + 8*i]` after the `mov rbp, rsp` prologue. The
//! comparison selects take `(a, b, t, f)` and return `t` or `f` without a
//! branch.

/// Emit the builtin function prelude.
pub fn emit_builtins() -> String {
    let mut out = String::new();

    binary_op(&mut out, "__builtin_operator_add", "add rax, [rbp + 16]");
    binary_op(&mut out, "__builtin_operator_sub", "sub rax, [rbp + 16]");
    binary_op(&mut out, "__builtin_operator_mul", "imul rax, [rbp + 16]");
    division(&mut out, "__builtin_operator_div", "rax");
    division(&mut out, "__builtin_operator_mod", "rdx");
    select(&mut out, "__builtin_operator_eq", "cmove");
    select(&mut out, "__builtin_operator_less", "cmovl");

    out
}

fn binary_op(out: &mut String, name: &str, op_line: &str) {
    out.push_str(&format!(
        "{name}:\n\
         mov rbp, rsp\n\
         mov rax, [rbp + 8]\n\
         {op_line}\n\
         mov rsp, rbp\n\
         ret\n"
    ));
}

/// idiv leaves the quotient in rax and the remainder in rdx.
fn division(out: &mut String, name: &str, result_reg: &str) {
    out.push_str(&format!(
        "{name}:\n\
         mov rbp, rsp\n\
         mov rax, [rbp + 8]\n\
         cqo\n\
         mov rcx, [rbp + 16]\n\
         idiv rcx\n\
         mov rax, {result_reg}\n\
         mov rsp, rbp\n\
         ret\n"
    ));
}

/// Branchless select: compare the first two arguments, conditionally move
/// the third over the fourth.
fn select(out: &mut String, name: &str, cmov: &str) {
    out.push_str(&format!(
        "{name}:\n\
         mov rbp, rsp\n\
         mov rcx, [rbp + 8]\n\
         cmp rcx, [rbp + 16]\n\
         mov rax, [rbp + 32]\n\
         mov rcx, [rbp + 24]\n\
         {cmov} rax, rcx\n\
         mov rsp, rbp\n\
         ret\n"
    ));
}
