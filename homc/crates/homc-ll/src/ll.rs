//! The stack/frame intermediate representation.
//!
//! Functions carry a local slot count; arguments and locals are addressed
//! by slot index. Expressions produce a value in the designated result
//! register of the backend; fit compiles to a tag test per branch with a
//! null pattern marking the catchall arm. The IR owns its tree and holds
//! no references back into the AST.

use std::fmt;

use homc_util::Symbol;

/// A complete lowered program.
#[derive(Debug, Clone)]
pub struct Program {
    pub functions: Vec<Fun>,
}

/// One lowered function: frame size plus body instructions.
#[derive(Debug, Clone)]
pub struct Fun {
    pub name: Symbol,
    pub local_count: usize,
    pub body: Vec<Inst>,
}

/// A statement-level instruction.
#[derive(Debug, Clone)]
pub enum Inst {
    Let { slot: usize, value: Expr },
    Ret(Option<Expr>),
    Print(String),
    Assign { target: Address, value: Expr },
    Fit { scrutinee: Expr, branches: Vec<FitArm> },
    Block(Vec<Inst>),
    Eval(Expr),
}

/// A value-producing expression.
#[derive(Debug, Clone)]
pub enum Expr {
    Int(i64),
    /// Read a local slot.
    Var(usize),
    /// Read an argument slot.
    Arg(usize),
    /// Address of a top-level function.
    FunName(Symbol),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// Read field `index` of a variant object.
    Member {
        object: Box<Expr>,
        index: usize,
    },
    /// Allocate a variant object with the given tag and fields.
    Create {
        tag: usize,
        fields: Vec<Expr>,
    },
    Fit {
        scrutinee: Box<Expr>,
        branches: Vec<FitBranch>,
    },
}

/// A writable location.
#[derive(Debug, Clone)]
pub enum Address {
    Var(usize),
    Arg(usize),
    Member { object: Box<Expr>, index: usize },
}

/// An arm of an expression-position fit.
#[derive(Debug, Clone)]
pub struct FitBranch {
    /// `None` is the catchall arm.
    pub pattern: Option<Pattern>,
    pub body: Expr,
}

/// An arm of a statement-position fit.
#[derive(Debug, Clone)]
pub struct FitArm {
    pub pattern: Option<Pattern>,
    pub body: Box<Inst>,
}

/// A compiled pattern: a variant tag to compare, plus one child slot per
/// field. `None` children are not inspected at runtime (catchall or
/// non-dis field).
#[derive(Debug, Clone)]
pub struct Pattern {
    pub tag: usize,
    pub children: Vec<Option<Pattern>>,
}

/// Name of the generated constructor function for a variant.
pub fn constructor_name(dis: Symbol, variant_id: usize) -> Symbol {
    Symbol::intern(&format!("__{}__{}", dis, variant_id))
}

/// Synthesize the constructor function for a variant: it allocates an
/// object tagged with the variant id from its arguments.
pub fn constructor(dis: Symbol, variant_id: usize, arg_count: usize) -> Fun {
    Fun {
        name: constructor_name(dis, variant_id),
        local_count: 0,
        body: vec![Inst::Ret(Some(Expr::Create {
            tag: variant_id,
            fields: (0..arg_count).map(Expr::Arg).collect(),
        }))],
    }
}

// ----------------------------------------------------------------------
// Pretty printing (the `--ll` output)
// ----------------------------------------------------------------------

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, fun) in self.functions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", fun)?;
        }
        Ok(())
    }
}

impl fmt::Display for Fun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fun {}[{}] {{", self.name, self.local_count)?;
        for inst in &self.body {
            writeln!(f, "{}{};", indent(1), InstAt(inst, 1))?;
        }
        writeln!(f, "}}")
    }
}

#[derive(Clone, Copy)]
struct InstAt<'a>(&'a Inst, usize);

impl fmt::Display for InstAt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let InstAt(inst, depth) = *self;
        match inst {
            Inst::Let { slot, value } => write!(f, "let ({}) = {}", slot, ExprAt(value, depth)),
            Inst::Ret(Some(value)) => write!(f, "ret {}", ExprAt(value, depth)),
            Inst::Ret(None) => write!(f, "ret"),
            Inst::Print(text) => write!(
                f,
                "wrt \"{}\"",
                text.replace('\n', "\\n").replace('\t', "\\t")
            ),
            Inst::Assign { target, value } => {
                write!(f, "{} = {}", AddressAt(target, depth), ExprAt(value, depth))
            }
            Inst::Fit {
                scrutinee,
                branches,
            } => {
                writeln!(f, "fit {} {{", ExprAt(scrutinee, depth))?;
                for branch in branches {
                    let pattern = match &branch.pattern {
                        Some(pattern) => pattern.to_string(),
                        None => "_".to_string(),
                    };
                    writeln!(
                        f,
                        "{}{} => {},",
                        indent(depth + 1),
                        pattern,
                        InstAt(&branch.body, depth + 1)
                    )?;
                }
                write!(f, "{}}}", indent(depth))
            }
            Inst::Block(insts) => {
                writeln!(f, "{{")?;
                for inst in insts {
                    writeln!(f, "{}{};", indent(depth + 1), InstAt(inst, depth + 1))?;
                }
                write!(f, "{}}}", indent(depth))
            }
            Inst::Eval(value) => write!(f, "{}", ExprAt(value, depth)),
        }
    }
}

#[derive(Clone, Copy)]
struct ExprAt<'a>(&'a Expr, usize);

impl fmt::Display for ExprAt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ExprAt(expr, depth) = *self;
        match expr {
            Expr::Int(value) => write!(f, "{}", value),
            Expr::Var(slot) => write!(f, "({})", slot),
            Expr::Arg(slot) => write!(f, "[{}]", slot),
            Expr::FunName(name) => write!(f, "{}", name),
            Expr::Call { callee, args } => {
                write!(f, "({}", ExprAt(callee, depth))?;
                for arg in args {
                    write!(f, " {}", ExprAt(arg, depth))?;
                }
                write!(f, ")")
            }
            Expr::Member { object, index } => {
                write!(f, "({}).{}", ExprAt(object, depth), index)
            }
            Expr::Create { tag, fields } => {
                write!(f, "(<{}>", tag)?;
                for field in fields {
                    write!(f, " {}", ExprAt(field, depth))?;
                }
                write!(f, ")")
            }
            Expr::Fit {
                scrutinee,
                branches,
            } => {
                writeln!(f, "fit {} {{", ExprAt(scrutinee, depth))?;
                for branch in branches {
                    let pattern = match &branch.pattern {
                        Some(pattern) => pattern.to_string(),
                        None => "_".to_string(),
                    };
                    writeln!(
                        f,
                        "{}{} => {},",
                        indent(depth + 1),
                        pattern,
                        ExprAt(&branch.body, depth + 1)
                    )?;
                }
                write!(f, "{}}}", indent(depth))
            }
        }
    }
}

#[derive(Clone, Copy)]
struct AddressAt<'a>(&'a Address, usize);

impl fmt::Display for AddressAt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let AddressAt(address, depth) = *self;
        match address {
            Address::Var(slot) => write!(f, "&({})", slot),
            Address::Arg(slot) => write!(f, "&[{}]", slot),
            Address::Member { object, index } => {
                write!(f, "&({}).{}", ExprAt(object, depth), index)
            }
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.tag)?;
        for child in &self.children {
            match child {
                Some(pattern) => {
                    if pattern.children.is_empty() {
                        write!(f, " {}", pattern)?;
                    } else {
                        write!(f, " ({})", pattern)?;
                    }
                }
                None => write!(f, " _")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_name() {
        let name = constructor_name(Symbol::intern("Bool"), 0);
        assert_eq!(name.as_str(), "__Bool__0");
    }

    #[test]
    fn test_constructor_body() {
        let fun = constructor(Symbol::intern("Nat"), 1, 1);
        assert_eq!(fun.name.as_str(), "__Nat__1");
        assert_eq!(fun.local_count, 0);
        match &fun.body[0] {
            Inst::Ret(Some(Expr::Create { tag, fields })) => {
                assert_eq!(*tag, 1);
                assert_eq!(fields.len(), 1);
                assert!(matches!(fields[0], Expr::Arg(0)));
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_pretty_print_fun() {
        let fun = Fun {
            name: Symbol::intern("main"),
            local_count: 1,
            body: vec![
                Inst::Let {
                    slot: 0,
                    value: Expr::Int(42),
                },
                Inst::Ret(Some(Expr::Var(0))),
            ],
        };
        let printed = fun.to_string();
        assert!(printed.contains("fun main[1] {"));
        assert!(printed.contains("let (0) = 42;"));
        assert!(printed.contains("ret (0);"));
    }

    #[test]
    fn test_pretty_print_pattern() {
        let pattern = Pattern {
            tag: 1,
            children: vec![None, Some(Pattern { tag: 0, children: vec![] })],
        };
        assert_eq!(pattern.to_string(), "<1> _ <0>");
    }

    #[test]
    fn test_pretty_print_is_deterministic() {
        let program = Program {
            functions: vec![constructor(Symbol::intern("Bool"), 0, 0)],
        };
        assert_eq!(program.to_string(), program.to_string());
    }
}
