//! Semantic types and resolved declarations.
//!
//! A [`DisTy`] refers to its declaration by name only; declarations live in
//! the string-keyed tables of the typing context. Narrowing is encoded in
//! the `pattern` field: a catchall pattern is the unrefined dis type, a
//! variant pattern pins one variant and may recursively refine its fields.

use std::fmt;

use homc_util::{Span, Symbol};

/// A semantic type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    /// Produced by any failed check; absorbs all further checks so one
    /// mistake is reported once.
    Error,
    /// `?` in a generic argument position.
    Wildcard,
    /// A builtin simple type: Int, String, Void.
    Simple(Symbol),
    /// A generic parameter of the enclosing declaration, by binder index.
    Var { index: usize, name: Symbol },
    Fun(FunTy),
    Dis(DisTy),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunTy {
    pub args: Vec<Ty>,
    pub result: Box<Ty>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DisTy {
    pub name: Symbol,
    pub generics: Vec<Ty>,
    pub pattern: TyPattern,
}

/// A (possibly partial) variant pattern refining a [`DisTy`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TyPattern {
    /// `_`: matches every variant; the pattern of an unnarrowed dis type.
    Catchall,
    /// One variant, with optional refinement of its fields.
    Variant(VariantPat),
    /// A literal pattern; never exhausts anything and refines nothing.
    Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariantPat {
    pub name: Symbol,
    /// `None` leaves the variant's fields unrefined; when present the
    /// length equals the variant's field count.
    pub children: Option<Vec<TyPattern>>,
}

impl TyPattern {
    pub fn is_catchall(&self) -> bool {
        matches!(self, TyPattern::Catchall)
    }

    fn is_compound(&self) -> bool {
        matches!(
            self,
            TyPattern::Variant(VariantPat {
                children: Some(children),
                ..
            }) if !children.is_empty()
        )
    }
}

impl fmt::Display for TyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TyPattern::Catchall => write!(f, "_"),
            TyPattern::Value => write!(f, "<value>"),
            TyPattern::Variant(pat) => {
                write!(f, "{}", pat.name)?;
                if let Some(children) = &pat.children {
                    for child in children {
                        if child.is_compound() {
                            write!(f, " ({})", child)?;
                        } else {
                            write!(f, " {}", child)?;
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Error => write!(f, "<error>"),
            Ty::Wildcard => write!(f, "?"),
            Ty::Simple(name) => write!(f, "{}", name),
            Ty::Var { name, .. } => write!(f, "{}", name),
            Ty::Fun(fun) => write!(f, "{}", fun),
            Ty::Dis(dis) => write!(f, "{}", dis),
        }
    }
}

impl fmt::Display for FunTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ") -> ")?;
        match self.result.as_ref() {
            Ty::Fun(inner) => write!(f, "({})", inner),
            other => write!(f, "{}", other),
        }
    }
}

impl fmt::Display for DisTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.generics.is_empty() {
            write!(f, "[")?;
            for (i, ty) in self.generics.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", ty)?;
            }
            write!(f, "]")?;
        }
        if let TyPattern::Variant(pat) = &self.pattern {
            write!(f, "::{}", pat.name)?;
        }
        Ok(())
    }
}

/// Substitute generic parameters by binder index.
pub fn substitute(ty: &Ty, subst: &[Ty]) -> Ty {
    match ty {
        Ty::Fun(fun) => Ty::Fun(FunTy {
            args: fun.args.iter().map(|arg| substitute(arg, subst)).collect(),
            result: Box::new(substitute(&fun.result, subst)),
        }),
        Ty::Dis(dis) => Ty::Dis(DisTy {
            name: dis.name,
            generics: dis
                .generics
                .iter()
                .map(|generic| substitute(generic, subst))
                .collect(),
            pattern: dis.pattern.clone(),
        }),
        Ty::Var { index, .. } => subst.get(*index).cloned().unwrap_or(Ty::Error),
        other => other.clone(),
    }
}

/// A resolved dis declaration.
#[derive(Clone, Debug)]
pub struct DisDecl {
    pub generic_count: usize,
    pub variants: Vec<VariantDecl>,
    /// Span of the declaring name, for "defined here" labels.
    pub name_span: Span,
}

impl DisDecl {
    pub fn has_variant(&self, name: Symbol) -> bool {
        self.variants.iter().any(|variant| variant.name == name)
    }

    pub fn variant(&self, name: Symbol) -> Option<&VariantDecl> {
        self.variants.iter().find(|variant| variant.name == name)
    }

    pub fn variant_id(&self, name: Symbol) -> Option<usize> {
        self.variants.iter().position(|variant| variant.name == name)
    }
}

/// One variant of a dis declaration.
#[derive(Clone, Debug)]
pub struct VariantDecl {
    pub name: Symbol,
    pub args: Vec<ArgDecl>,
    pub span: Span,
}

impl VariantDecl {
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    pub fn has_arg(&self, name: Symbol) -> bool {
        self.args.iter().any(|arg| arg.name == name)
    }

    pub fn arg(&self, name: Symbol) -> Option<&ArgDecl> {
        self.args.iter().find(|arg| arg.name == name)
    }

    pub fn arg_index(&self, name: Symbol) -> Option<usize> {
        self.args.iter().position(|arg| arg.name == name)
    }
}

#[derive(Clone, Debug)]
pub struct ArgDecl {
    pub name: Symbol,
    pub ty: Ty,
}

/// A resolved function declaration.
#[derive(Clone, Debug)]
pub struct FunDecl {
    pub generic_count: usize,
    pub ty: FunTy,
    /// Span of the declaring name; dummy for builtins.
    pub name_span: Span,
}

/// A declaration table slot.
///
/// Duplicated declarations poison their slot: every later lookup sees the
/// poison and stays silent instead of cascading.
#[derive(Clone, Debug)]
pub enum Decl<T> {
    Known(T),
    Poisoned,
}

impl<T> Decl<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Decl::Known(decl) => Some(decl),
            Decl::Poisoned => None,
        }
    }
}
