//! Subtyping and least upper bounds.
//!
//! Subtyping is induced entirely by variant patterns: a dis type refined to
//! a variant is a subtype of the same dis type with a wider pattern.
//! Function types are contravariant in their arguments and covariant in
//! their result; dis generics are invariant. The error type absorbs every
//! check so cascades stay silent.

use crate::types::{DisTy, FunTy, Ty, TyPattern, VariantPat};

pub fn is_subtype(sub: &Ty, sup: &Ty) -> bool {
    if matches!(sub, Ty::Error) || matches!(sup, Ty::Error) {
        return true;
    }
    if sub == sup {
        return true;
    }
    match (sub, sup) {
        (Ty::Fun(sub), Ty::Fun(sup)) => {
            sub.args.len() == sup.args.len()
                && is_subtype(&sub.result, &sup.result)
                && sub
                    .args
                    .iter()
                    .zip(sup.args.iter())
                    .all(|(sub_arg, sup_arg)| is_subtype(sup_arg, sub_arg))
        }
        (Ty::Dis(sub), Ty::Dis(sup)) => {
            sub.name == sup.name
                && sub.generics == sup.generics
                && is_subpattern(&sub.pattern, &sup.pattern)
        }
        _ => false,
    }
}

pub fn is_subpattern(sub: &TyPattern, sup: &TyPattern) -> bool {
    if sub == sup {
        return true;
    }
    match (sub, sup) {
        (_, TyPattern::Catchall) => true,
        (TyPattern::Catchall, _) => false,
        (TyPattern::Variant(sub), TyPattern::Variant(sup)) => {
            if sub.name != sup.name {
                return false;
            }
            match (&sub.children, &sup.children) {
                (_, None) => true,
                (None, Some(_)) => false,
                (Some(sub_children), Some(sup_children)) => {
                    sub_children.len() == sup_children.len()
                        && sub_children
                            .iter()
                            .zip(sup_children.iter())
                            .all(|(a, b)| is_subpattern(a, b))
                }
            }
        }
        _ => false,
    }
}

/// The widest common ancestor of two patterns.
pub fn find_superpattern(a: &TyPattern, b: &TyPattern) -> TyPattern {
    match (a, b) {
        (TyPattern::Catchall, _) | (_, TyPattern::Catchall) => TyPattern::Catchall,
        (TyPattern::Value, TyPattern::Value) => TyPattern::Value,
        (TyPattern::Variant(a), TyPattern::Variant(b)) => {
            if a.name != b.name {
                return TyPattern::Catchall;
            }
            let children = match (&a.children, &b.children) {
                (Some(a_children), Some(b_children)) if a_children.len() == b_children.len() => {
                    Some(
                        a_children
                            .iter()
                            .zip(b_children.iter())
                            .map(|(a, b)| find_superpattern(a, b))
                            .collect(),
                    )
                }
                _ => None,
            };
            TyPattern::Variant(VariantPat {
                name: a.name,
                children,
            })
        }
        _ => TyPattern::Catchall,
    }
}

/// Least upper bound: a type `T` with `a <: T` and `b <: T`.
///
/// Structural mismatches produce the error type.
pub fn find_supertype(a: &Ty, b: &Ty) -> Ty {
    if matches!(a, Ty::Error) || matches!(b, Ty::Error) {
        return Ty::Error;
    }
    if a == b {
        return a.clone();
    }
    match (a, b) {
        (Ty::Fun(a), Ty::Fun(b)) => {
            if a.args != b.args {
                return Ty::Error;
            }
            let result = find_supertype(&a.result, &b.result);
            if matches!(result, Ty::Error) {
                return Ty::Error;
            }
            Ty::Fun(FunTy {
                args: a.args.clone(),
                result: Box::new(result),
            })
        }
        (Ty::Dis(a), Ty::Dis(b)) => {
            if a.name == b.name && a.generics == b.generics {
                Ty::Dis(DisTy {
                    name: a.name,
                    generics: a.generics.clone(),
                    pattern: find_superpattern(&a.pattern, &b.pattern),
                })
            } else {
                Ty::Error
            }
        }
        _ => Ty::Error,
    }
}
