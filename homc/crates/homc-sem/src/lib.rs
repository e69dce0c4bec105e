//! homc-sem - Semantic Analysis
//!
//! Two passes over the AST:
//!
//! 1. **Validation** ([`validate`]): name resolution, uniqueness and arity
//!    checks with a lexical frame stack. Runs on the raw AST and reports
//!    every structural problem in one sweep.
//! 2. **Type checking** ([`check`]): attaches a type to every expression,
//!    keyed by node id in the [`TypingContext`]. Supports parametric
//!    generics (type variables by binder index), structural subtyping
//!    induced by variant patterns, path-dependent narrowing of fit
//!    scrutinees, least-upper-bound typing of fit expressions, and
//!    exhaustiveness checking with witness reporting.
//!
//! The driver runs validation first and only type-checks when the handler
//! is still clean, so the checker can assume resolved names.

pub mod builtin;
pub mod check;
pub mod context;
pub mod convert;
pub mod exhaust;
pub mod subtype;
pub mod types;
pub mod validate;

pub use check::check;
pub use context::TypingContext;
pub use types::{
    substitute, ArgDecl, Decl, DisDecl, DisTy, FunDecl, FunTy, Ty, TyPattern, VariantDecl,
    VariantPat,
};
pub use validate::validate;
