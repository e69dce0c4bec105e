//! Conversion of parsed type syntax into semantic types.
//!
//! Conversion happens inside the generic frame of the enclosing
//! declaration: a name bound as a generic parameter becomes a type
//! variable by binder index, a declared dis becomes an unrefined [`DisTy`],
//! a constructor type pins one variant, and the builtin simple types map
//! to themselves. Every failure reports a diagnostic and yields the error
//! type.

use homc_par::ast::{DisConstructorNode, DisTypeNode, PatternNode, TypeNode};
use homc_util::{DiagnosticBuilder, DiagnosticCode, Handler};

use crate::builtin;
use crate::context::TypingContext;
use crate::types::{Decl, DisTy, FunTy, Ty, TyPattern, VariantPat};

pub fn convert_type(ctx: &TypingContext, handler: &Handler, node: &TypeNode) -> Ty {
    match node {
        TypeNode::Dis(dis) => convert_dis_type(ctx, handler, dis),
        TypeNode::Ctor(ctor) => convert_constructor_type(ctx, handler, ctor),
        TypeNode::Fun(fun) => {
            let args: Vec<Ty> = fun
                .args
                .iter()
                .map(|arg| convert_type(ctx, handler, arg))
                .collect();
            let result = convert_type(ctx, handler, &fun.ret);
            if args.iter().any(|ty| matches!(ty, Ty::Error)) || matches!(result, Ty::Error) {
                return Ty::Error;
            }
            Ty::Fun(FunTy {
                args,
                result: Box::new(result),
            })
        }
        TypeNode::Wildcard(_) => Ty::Wildcard,
    }
}

fn convert_dis_type(ctx: &TypingContext, handler: &Handler, node: &DisTypeNode) -> Ty {
    let name = node.name.text;

    if let Some(index) = ctx.generic_index(name) {
        if !node.generics.is_empty() {
            DiagnosticBuilder::error(format!("type variable `{}` cannot be generic", name))
                .code(DiagnosticCode::E_TYPE_UNKNOWN)
                .span(node.span)
                .emit(handler);
            return Ty::Error;
        }
        return Ty::Var { index, name };
    }

    match ctx.dis(name) {
        Some(Decl::Poisoned) => Ty::Error,
        Some(Decl::Known(decl)) => {
            if decl.generic_count != node.generics.len() {
                DiagnosticBuilder::error(format!(
                    "dis `{}` takes {} generic argument{} but {} {} provided",
                    name,
                    decl.generic_count,
                    plural(decl.generic_count),
                    node.generics.len(),
                    were(node.generics.len()),
                ))
                .code(DiagnosticCode::E_VALIDATE_GENERIC_COUNT)
                .span(node.span)
                .label(decl.name_span, "defined here")
                .emit(handler);
                return Ty::Error;
            }
            let generics: Vec<Ty> = node
                .generics
                .iter()
                .map(|generic| convert_type(ctx, handler, generic))
                .collect();
            if generics.iter().any(|ty| matches!(ty, Ty::Error)) {
                return Ty::Error;
            }
            Ty::Dis(DisTy {
                name,
                generics,
                pattern: TyPattern::Catchall,
            })
        }
        None => {
            if builtin::is_simple_type(name) {
                if !node.generics.is_empty() {
                    DiagnosticBuilder::error(format!("type `{}` is not generic", name))
                        .code(DiagnosticCode::E_TYPE_UNKNOWN)
                        .span(node.span)
                        .emit(handler);
                    return Ty::Error;
                }
                return Ty::Simple(name);
            }
            DiagnosticBuilder::error(format!("type `{}` is not defined", name))
                .code(DiagnosticCode::E_TYPE_UNKNOWN)
                .span(node.span)
                .emit(handler);
            Ty::Error
        }
    }
}

fn convert_constructor_type(
    ctx: &TypingContext,
    handler: &Handler,
    node: &DisConstructorNode,
) -> Ty {
    let name = node.name.text;
    let decl = match ctx.dis(name) {
        Some(Decl::Known(decl)) => decl,
        Some(Decl::Poisoned) => return Ty::Error,
        None => {
            DiagnosticBuilder::error(format!("dis `{}` is not defined", name))
                .code(DiagnosticCode::E_VALIDATE_UNKNOWN_DIS)
                .span(node.name.span)
                .emit(handler);
            return Ty::Error;
        }
    };

    if !decl.has_variant(node.variant.text) {
        DiagnosticBuilder::error(format!(
            "dis `{}` has no variant `{}`",
            name, node.variant.text
        ))
        .code(DiagnosticCode::E_VALIDATE_NO_VARIANT)
        .span(node.variant.span)
        .label(decl.name_span, "defined here")
        .emit(handler);
        return Ty::Error;
    }

    let generics: Vec<Ty> = node
        .generics
        .iter()
        .map(|generic| convert_type(ctx, handler, generic))
        .collect();

    Ty::Dis(DisTy {
        name,
        generics,
        pattern: TyPattern::Variant(VariantPat {
            name: node.variant.text,
            children: None,
        }),
    })
}

/// Convert a written fit pattern into the internal pattern representation.
///
/// A variant pattern with zero written arguments leaves the variant's
/// fields unrefined.
pub fn convert_pattern(pattern: &PatternNode) -> TyPattern {
    match pattern {
        PatternNode::Catchall(_) => TyPattern::Catchall,
        PatternNode::Value(_) => TyPattern::Value,
        PatternNode::Variant(variant) => {
            let children = if variant.args.is_empty() {
                None
            } else {
                Some(variant.args.iter().map(convert_pattern).collect())
            };
            TyPattern::Variant(VariantPat {
                name: variant.name.text,
                children,
            })
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

fn were(count: usize) -> &'static str {
    if count == 1 {
        "was"
    } else {
        "were"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DisDecl, VariantDecl};
    use homc_lex::lex;
    use homc_par::combinator::{ParseOutcome, ParseState};
    use homc_par::type_parser;
    use homc_util::span::SourceFile;
    use homc_util::{Span, Symbol};

    fn sym(s: &str) -> Symbol {
        Symbol::intern(s)
    }

    fn parse_type_node(input: &str) -> TypeNode {
        let file = SourceFile::new(0, "test.hom", input);
        let tokens = lex(&file);
        let mut state = ParseState::new(&tokens);
        match type_parser().run(&mut state, false) {
            ParseOutcome::Ok(node) => node,
            other => panic!("failed to parse {:?}: {:?}", input, other),
        }
    }

    fn nat_context() -> TypingContext {
        let mut ctx = TypingContext::new();
        ctx.dises.insert(
            sym("Nat"),
            Decl::Known(DisDecl {
                generic_count: 0,
                variants: vec![
                    VariantDecl {
                        name: sym("Zero"),
                        args: vec![],
                        span: Span::DUMMY,
                    },
                    VariantDecl {
                        name: sym("Succ"),
                        args: vec![],
                        span: Span::DUMMY,
                    },
                ],
                name_span: Span::DUMMY,
            }),
        );
        ctx
    }

    #[test]
    fn test_convert_builtin() {
        let ctx = TypingContext::new();
        let handler = Handler::new();
        let ty = convert_type(&ctx, &handler, &parse_type_node("Int"));
        assert_eq!(ty, builtin::int());
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_convert_unknown_type() {
        let ctx = TypingContext::new();
        let handler = Handler::new();
        let ty = convert_type(&ctx, &handler, &parse_type_node("Missing"));
        assert_eq!(ty, Ty::Error);
        assert!(handler.has_errors());
    }

    #[test]
    fn test_convert_dis_type() {
        let ctx = nat_context();
        let handler = Handler::new();
        let ty = convert_type(&ctx, &handler, &parse_type_node("Nat"));
        match ty {
            Ty::Dis(dis) => {
                assert_eq!(dis.name, sym("Nat"));
                assert!(dis.pattern.is_catchall());
            }
            other => panic!("unexpected type: {:?}", other),
        }
    }

    #[test]
    fn test_convert_generic_count_mismatch() {
        let ctx = nat_context();
        let handler = Handler::new();
        let ty = convert_type(&ctx, &handler, &parse_type_node("Nat[Int]"));
        assert_eq!(ty, Ty::Error);
        assert!(handler.has_errors());
    }

    #[test]
    fn test_convert_constructor_type() {
        let ctx = nat_context();
        let handler = Handler::new();
        let ty = convert_type(&ctx, &handler, &parse_type_node("Nat::Succ"));
        match ty {
            Ty::Dis(dis) => match dis.pattern {
                TyPattern::Variant(pat) => {
                    assert_eq!(pat.name, sym("Succ"));
                    assert!(pat.children.is_none());
                }
                other => panic!("unexpected pattern: {:?}", other),
            },
            other => panic!("unexpected type: {:?}", other),
        }
    }

    #[test]
    fn test_convert_missing_variant() {
        let ctx = nat_context();
        let handler = Handler::new();
        let ty = convert_type(&ctx, &handler, &parse_type_node("Nat::Three"));
        assert_eq!(ty, Ty::Error);
        assert!(handler.has_errors());
    }

    #[test]
    fn test_convert_function_type() {
        let ctx = nat_context();
        let handler = Handler::new();
        let ty = convert_type(&ctx, &handler, &parse_type_node("(Nat, Int) -> Nat"));
        match ty {
            Ty::Fun(fun) => {
                assert_eq!(fun.args.len(), 2);
                assert!(matches!(fun.result.as_ref(), Ty::Dis(_)));
            }
            other => panic!("unexpected type: {:?}", other),
        }
    }

    #[test]
    fn test_convert_wildcard() {
        let ctx = nat_context();
        let handler = Handler::new();
        // wildcard appears inside generic argument lists
        let node = parse_type_node("Nat");
        let _ = node;
        assert_eq!(
            convert_type(&ctx, &handler, &TypeNode::Wildcard(Span::DUMMY)),
            Ty::Wildcard
        );
    }

    #[test]
    fn test_convert_pattern_shorthand() {
        let file = SourceFile::new(0, "test.hom", "Succ");
        let tokens = lex(&file);
        let mut state = ParseState::new(&tokens);
        let pattern = match homc_par::pattern_parser().run(&mut state, false) {
            ParseOutcome::Ok(pattern) => pattern,
            other => panic!("failed to parse pattern: {:?}", other),
        };
        match convert_pattern(&pattern) {
            TyPattern::Variant(pat) => {
                assert_eq!(pat.name, sym("Succ"));
                assert!(pat.children.is_none());
            }
            other => panic!("unexpected pattern: {:?}", other),
        }
    }

    #[test]
    fn test_convert_pattern_with_children() {
        let file = SourceFile::new(0, "test.hom", "Succ (Succ _)");
        let tokens = lex(&file);
        let mut state = ParseState::new(&tokens);
        let pattern = match homc_par::pattern_parser().run(&mut state, false) {
            ParseOutcome::Ok(pattern) => pattern,
            other => panic!("failed to parse pattern: {:?}", other),
        };
        match convert_pattern(&pattern) {
            TyPattern::Variant(pat) => {
                let children = pat.children.unwrap();
                assert_eq!(children.len(), 1);
                assert!(matches!(children[0], TyPattern::Variant(_)));
            }
            other => panic!("unexpected pattern: {:?}", other),
        }
    }
}
