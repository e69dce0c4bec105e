//! Fit exhaustiveness checking.
//!
//! For each fit over a dis type, the branch patterns are partitioned by
//! variant and each variant's argument positions are checked recursively.
//! When coverage is incomplete the checker produces a *witness*: a concrete
//! pattern matched by no branch, reported back to the user. A catchall
//! anywhere short-circuits the positions below it.
//!
//! Patterns on scalar positions (Int, String, generic parameters) are only
//! exhausted by a catchall; a literal pattern never completes coverage.

use indexmap::IndexMap;

use crate::context::TypingContext;
use crate::types::{substitute, ArgDecl, Decl, DisDecl, Ty, TyPattern, VariantDecl, VariantPat};

pub struct ExhaustivenessChecker<'a> {
    ctx: &'a TypingContext,
}

impl<'a> ExhaustivenessChecker<'a> {
    pub fn new(ctx: &'a TypingContext) -> Self {
        Self { ctx }
    }

    /// Check a fit's patterns against the scrutinee type; returns the
    /// witness pattern when the fit is not exhaustive.
    pub fn check_fit(&self, scrutinee: &Ty, patterns: &[TyPattern]) -> Option<TyPattern> {
        self.patterns_exhaust_ty(scrutinee, patterns).err()
    }

    fn patterns_exhaust_ty(&self, ty: &Ty, patterns: &[TyPattern]) -> Result<(), TyPattern> {
        match ty {
            Ty::Fun(_) => {
                // functions cannot be inspected; any pattern at all covers
                if patterns.is_empty() {
                    Err(TyPattern::Catchall)
                } else {
                    Ok(())
                }
            }
            Ty::Dis(dis) => match self.ctx.dis(dis.name) {
                Some(Decl::Known(decl)) => {
                    self.patterns_exhaust_dis(decl, &dis.generics, patterns)
                }
                // poisoned or unknown declarations were reported already
                _ => Ok(()),
            },
            _ => {
                if patterns.iter().any(TyPattern::is_catchall) {
                    Ok(())
                } else {
                    Err(TyPattern::Catchall)
                }
            }
        }
    }

    fn patterns_exhaust_dis(
        &self,
        decl: &DisDecl,
        generics: &[Ty],
        patterns: &[TyPattern],
    ) -> Result<(), TyPattern> {
        if patterns.iter().any(TyPattern::is_catchall) {
            return Ok(());
        }

        let mut by_variant: IndexMap<homc_util::Symbol, Vec<&VariantPat>> = decl
            .variants
            .iter()
            .map(|variant| (variant.name, Vec::new()))
            .collect();
        for pattern in patterns {
            if let TyPattern::Variant(pat) = pattern {
                if let Some(bucket) = by_variant.get_mut(&pat.name) {
                    bucket.push(pat);
                }
            }
        }

        for variant in &decl.variants {
            let bucket = by_variant.get(&variant.name).map(Vec::as_slice).unwrap_or(&[]);
            self.patterns_exhaust_variant(variant, generics, bucket)?;
        }
        Ok(())
    }

    fn patterns_exhaust_variant(
        &self,
        variant: &VariantDecl,
        generics: &[Ty],
        patterns: &[&VariantPat],
    ) -> Result<(), TyPattern> {
        if patterns.is_empty() {
            return Err(TyPattern::Variant(VariantPat {
                name: variant.name,
                children: Some(vec![TyPattern::Catchall; variant.arg_count()]),
            }));
        }

        self.patterns_exhaust_variant_args(&variant.args, generics, patterns.to_vec(), 0, Vec::new())
            .map_err(|children| {
                TyPattern::Variant(VariantPat {
                    name: variant.name,
                    children: Some(children),
                })
            })
    }

    /// Walk one argument position at a time; `current` accumulates the
    /// witness prefix for the positions already fixed.
    fn patterns_exhaust_variant_args(
        &self,
        args: &[ArgDecl],
        generics: &[Ty],
        patterns: Vec<&VariantPat>,
        index: usize,
        current: Vec<TyPattern>,
    ) -> Result<(), Vec<TyPattern>> {
        if index >= args.len() {
            return Ok(());
        }

        let arg_ty = substitute(&args[index].ty, generics);
        let child_at = |pat: &VariantPat| -> TyPattern {
            pat.children
                .as_ref()
                .and_then(|children| children.get(index))
                .cloned()
                .unwrap_or(TyPattern::Catchall)
        };

        let arg_patterns: Vec<TyPattern> = patterns.iter().map(|pat| child_at(pat)).collect();
        let refining: Vec<TyPattern> = arg_patterns
            .iter()
            .filter(|pat| !pat.is_catchall())
            .cloned()
            .collect();

        match self.patterns_exhaust_ty(&arg_ty, &refining) {
            Ok(()) => {
                // this position is covered; split by its refinement and
                // check the remaining positions within each split
                let with_catchall: Vec<&VariantPat> = patterns
                    .iter()
                    .copied()
                    .filter(|pat| child_at(pat).is_catchall())
                    .collect();

                let mut grouped: IndexMap<TyPattern, Vec<&VariantPat>> = IndexMap::new();
                for pat in &patterns {
                    let child = child_at(pat);
                    if !child.is_catchall() {
                        grouped.entry(child).or_default().push(pat);
                    }
                }

                for (child, mut group) in grouped {
                    group.extend(with_catchall.iter().copied());
                    let mut prefix = current.clone();
                    prefix.push(child);
                    self.patterns_exhaust_variant_args(args, generics, group, index + 1, prefix)?;
                }
                Ok(())
            }
            Err(missing) => {
                let survivors: Vec<&VariantPat> = patterns
                    .iter()
                    .copied()
                    .filter(|pat| child_at(pat).is_catchall())
                    .collect();
                if survivors.is_empty() {
                    let mut witness = current;
                    witness.push(missing);
                    witness.extend(vec![TyPattern::Catchall; args.len() - index - 1]);
                    Err(witness)
                } else {
                    let mut prefix = current;
                    prefix.push(TyPattern::Catchall);
                    self.patterns_exhaust_variant_args(args, generics, survivors, index + 1, prefix)
                }
            }
        }
    }
}
