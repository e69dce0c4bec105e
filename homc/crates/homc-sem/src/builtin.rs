//! Builtin simple types and operator functions.
//!
//! The arithmetic operators of the surface language resolve to these
//! function declarations; the code generator emits their bodies as a
//! prelude. Equality and less-than are declared as branchless selects
//! `(Int, Int, T, T) -> T` and are reachable only through explicit
//! instantiation, since `==` is not part of the operator set.

use homc_util::{Span, Symbol};

use crate::types::{FunDecl, FunTy, Ty};

pub fn int() -> Ty {
    Ty::Simple(Symbol::intern("Int"))
}

pub fn string() -> Ty {
    Ty::Simple(Symbol::intern("String"))
}

pub fn void() -> Ty {
    Ty::Simple(Symbol::intern("Void"))
}

/// The closed set of builtin simple types.
pub fn is_simple_type(name: Symbol) -> bool {
    matches!(name.as_str(), "Int" | "String" | "Void")
}

/// Names of the builtin operator functions, in emission order.
pub const OPERATOR_FUNCTIONS: [&str; 5] = [
    "__builtin_operator_add",
    "__builtin_operator_sub",
    "__builtin_operator_mul",
    "__builtin_operator_div",
    "__builtin_operator_mod",
];

/// Names of the builtin comparison selects.
pub const SELECT_FUNCTIONS: [&str; 2] = ["__builtin_operator_eq", "__builtin_operator_less"];

/// All builtin function declarations, for seeding the function tables.
pub fn builtin_functions() -> Vec<(Symbol, FunDecl)> {
    let mut functions = Vec::new();

    for name in OPERATOR_FUNCTIONS {
        functions.push((
            Symbol::intern(name),
            FunDecl {
                generic_count: 0,
                ty: FunTy {
                    args: vec![int(), int()],
                    result: Box::new(int()),
                },
                name_span: Span::DUMMY,
            },
        ));
    }

    for name in SELECT_FUNCTIONS {
        let t = Ty::Var {
            index: 0,
            name: Symbol::intern("T"),
        };
        functions.push((
            Symbol::intern(name),
            FunDecl {
                generic_count: 1,
                ty: FunTy {
                    args: vec![int(), int(), t.clone(), t.clone()],
                    result: Box::new(t),
                },
                name_span: Span::DUMMY,
            },
        ));
    }

    functions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_types() {
        assert!(is_simple_type(Symbol::intern("Int")));
        assert!(is_simple_type(Symbol::intern("String")));
        assert!(is_simple_type(Symbol::intern("Void")));
        assert!(!is_simple_type(Symbol::intern("Nat")));
    }

    #[test]
    fn test_builtin_function_table() {
        let functions = builtin_functions();
        assert_eq!(functions.len(), 7);

        let (name, add) = &functions[0];
        assert_eq!(name.as_str(), "__builtin_operator_add");
        assert_eq!(add.generic_count, 0);
        assert_eq!(add.ty.args.len(), 2);

        let (name, eq) = &functions[5];
        assert_eq!(name.as_str(), "__builtin_operator_eq");
        assert_eq!(eq.generic_count, 1);
        assert_eq!(eq.ty.args.len(), 4);
    }
}
