//! The type checker.
//!
//! Runs after validation on a structurally sound AST. Declarations are
//! collected first (dis headers, then variant field types, then function
//! signatures), then every function body is walked and each expression's
//! type is recorded in the context under its node id.
//!
//! Fit branches narrow: when the scrutinee is syntactically a variable and
//! the branch pattern names a variant, the branch body is checked in a
//! frame where that variable is rebound to the scrutinee's dis type refined
//! by the pattern. Member access through the narrowed variable then
//! resolves against the statically known variant.

use homc_par::ast::{
    BlockNode, DisConstructorNode, ExprNode, FitExprNode, FitStmtNode, FunInstNode, FunNode,
    Item, MemberNode, PatternNode, Program, RetNode, StmtNode, ValueNode, VarNode,
};
use homc_lex::TokenKind;
use homc_util::{
    DiagnosticBuilder, DiagnosticCode, FxHashSet, Handler, Span, Symbol,
};

use crate::builtin;
use crate::context::TypingContext;
use crate::convert::{convert_pattern, convert_type};
use crate::exhaust::ExhaustivenessChecker;
use crate::subtype::{find_supertype, is_subtype};
use crate::types::{
    substitute, ArgDecl, Decl, DisDecl, DisTy, FunDecl, FunTy, Ty, TyPattern, VariantDecl,
    VariantPat,
};

/// Type-check a program, recording expression types in the returned
/// context. Diagnostics go to the handler; the context is complete even
/// when errors were found (failed expressions carry the error type).
pub fn check(program: &Program, handler: &Handler) -> TypingContext {
    let mut checker = TypeChecker {
        ctx: TypingContext::new(),
        handler,
        current_result: None,
    };
    checker.check_program(program);
    checker.ctx
}

struct TypeChecker<'a> {
    ctx: TypingContext,
    handler: &'a Handler,
    /// Declared result type and its span for the function being checked.
    current_result: Option<(Ty, Span)>,
}

impl<'a> TypeChecker<'a> {
    fn check_program(&mut self, program: &Program) {
        self.collect_dis_headers(program);
        self.collect_dis_variants(program);
        self.collect_functions(program);

        for item in &program.items {
            match item {
                Item::Dis(_) => {}
                Item::Fun(fun) => self.check_fun(fun),
                Item::Expr(expr) => {
                    self.type_expr(expr);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Declaration collection
    // ------------------------------------------------------------------

    /// First pass: dis names, generic counts and variant names. Field
    /// types need these headers because dis declarations may refer to each
    /// other (and to themselves) in any order.
    fn collect_dis_headers(&mut self, program: &Program) {
        let mut seen: FxHashSet<Symbol> = FxHashSet::default();
        let mut duplicated: FxHashSet<Symbol> = FxHashSet::default();
        for item in &program.items {
            let Item::Dis(dis) = item else { continue };
            if !seen.insert(dis.name.text) {
                duplicated.insert(dis.name.text);
            }
        }

        for item in &program.items {
            let Item::Dis(dis) = item else { continue };
            let name = dis.name.text;
            if self.ctx.dises.contains_key(&name) {
                continue;
            }

            // duplicates were reported by the validator; poison the slot
            if duplicated.contains(&name)
                || builtin::is_simple_type(name)
                || !unique_names(dis.generics.params.iter().map(|p| p.text))
                || !unique_names(dis.variants.iter().map(|v| v.name.text))
            {
                self.ctx.dises.insert(name, Decl::Poisoned);
                continue;
            }

            let variants = dis
                .variants
                .iter()
                .map(|variant| VariantDecl {
                    name: variant.name.text,
                    args: Vec::new(),
                    span: variant.name.span,
                })
                .collect();
            self.ctx.dises.insert(
                name,
                Decl::Known(DisDecl {
                    generic_count: dis.generics.params.len(),
                    variants,
                    name_span: dis.name.span,
                }),
            );
        }
    }

    /// Second pass: convert variant field types inside each dis's generic
    /// frame and fill in the headers.
    fn collect_dis_variants(&mut self, program: &Program) {
        for item in &program.items {
            let Item::Dis(dis) = item else { continue };
            let name = dis.name.text;
            if !matches!(self.ctx.dises.get(&name), Some(Decl::Known(_))) {
                continue;
            }

            self.ctx.push();
            self.ctx.add_generics(&dis.generics);
            let mut variants = Vec::new();
            for variant in &dis.variants {
                let args = variant
                    .args
                    .iter()
                    .map(|arg| ArgDecl {
                        name: arg.name.text,
                        ty: convert_type(&self.ctx, self.handler, &arg.ty),
                    })
                    .collect();
                variants.push(VariantDecl {
                    name: variant.name.text,
                    args,
                    span: variant.name.span,
                });
            }
            self.ctx.pop();

            if let Some(Decl::Known(decl)) = self.ctx.dises.get_mut(&name) {
                decl.variants = variants;
            }
        }
    }

    fn collect_functions(&mut self, program: &Program) {
        for (name, decl) in builtin::builtin_functions() {
            self.ctx.functions.insert(name, Decl::Known(decl));
        }

        let mut seen: FxHashSet<Symbol> = FxHashSet::default();
        let mut duplicated: FxHashSet<Symbol> = FxHashSet::default();
        for item in &program.items {
            let Item::Fun(fun) = item else { continue };
            if !seen.insert(fun.name.text) {
                duplicated.insert(fun.name.text);
            }
        }

        for item in &program.items {
            let Item::Fun(fun) = item else { continue };
            let name = fun.name.text;
            if duplicated.contains(&name)
                || !unique_names(fun.generics.params.iter().map(|p| p.text))
            {
                self.ctx.functions.insert(name, Decl::Poisoned);
                continue;
            }

            let ty = self.fun_type(fun);
            self.ctx.functions.insert(
                name,
                Decl::Known(FunDecl {
                    generic_count: fun.generics.params.len(),
                    ty,
                    name_span: fun.name.span,
                }),
            );
        }
    }

    fn fun_type(&mut self, fun: &FunNode) -> FunTy {
        self.ctx.push();
        self.ctx.add_generics(&fun.generics);
        let args = fun
            .args
            .iter()
            .map(|arg| convert_type(&self.ctx, self.handler, &arg.ty))
            .collect();
        let result = match &fun.ret {
            Some(ret) => convert_type(&self.ctx, self.handler, ret),
            None => builtin::void(),
        };
        self.ctx.pop();
        FunTy {
            args,
            result: Box::new(result),
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn check_fun(&mut self, fun: &FunNode) {
        let decl = match self.ctx.fun(fun.name.text) {
            Some(Decl::Known(decl)) => decl.clone(),
            _ => return,
        };

        let result_span = fun
            .ret
            .as_ref()
            .map(|ret| ret.span())
            .unwrap_or(fun.name.span);
        self.current_result = Some((decl.ty.result.as_ref().clone(), result_span));

        self.ctx.push();
        self.ctx.add_generics(&fun.generics);
        for (arg, ty) in fun.args.iter().zip(decl.ty.args.iter()) {
            self.ctx.add_local(arg.name.text, ty.clone());
        }
        self.check_block(&fun.body);
        self.ctx.pop();

        self.current_result = None;
    }

    fn check_block(&mut self, block: &BlockNode) {
        self.ctx.push();
        for stmt in &block.statements {
            self.check_stmt(stmt);
        }
        self.ctx.pop();
    }

    fn check_stmt(&mut self, stmt: &StmtNode) {
        match stmt {
            StmtNode::Ret(ret) => self.type_ret(ret),
            StmtNode::Block(block) => self.check_block(block),
            StmtNode::Write(_) => {}
            StmtNode::Let(node) => {
                let ty = self.type_expr(&node.value);
                self.ctx.add_local(node.name.text, ty);
            }
            StmtNode::Fit(fit) => self.type_fit_stmt(fit),
            StmtNode::Expr(expr) => {
                self.type_expr(expr);
            }
        }
    }

    fn type_ret(&mut self, ret: &RetNode) {
        let ret_ty = match &ret.expr {
            Some(expr) => self.type_expr(expr),
            None => builtin::void(),
        };
        if let Some((expected, decl_span)) = self.current_result.clone() {
            if !is_subtype(&ret_ty, &expected) {
                DiagnosticBuilder::error(format!(
                    "mismatched return type: expected `{}`, found `{}`",
                    expected, ret_ty
                ))
                .code(DiagnosticCode::E_TYPE_RETURN_MISMATCH)
                .span(ret.span)
                .label(decl_span, "return type declared here")
                .emit(self.handler);
            }
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn type_expr(&mut self, expr: &ExprNode) -> Ty {
        let ty = match expr {
            ExprNode::Value(value) => self.type_value(value),
            ExprNode::Var(var) => self.type_var(var),
            ExprNode::FunInst(inst) => self.type_fun_inst(inst),
            ExprNode::Call(call) => self.type_call(call),
            ExprNode::Member(member) => self.type_member(member),
            ExprNode::Assign(assign) => self.type_assign(assign),
            ExprNode::Fit(fit) => self.type_fit_expr(fit),
            ExprNode::Ctor(ctor) => self.type_constructor(ctor),
            ExprNode::TupleLike(tuple) => {
                DiagnosticBuilder::error("internal error: ungrouped expression survived parsing")
                    .code(DiagnosticCode::E_INTERNAL)
                    .span(tuple.span)
                    .emit(self.handler);
                Ty::Error
            }
        };
        self.ctx.set_expr_ty(expr.id(), ty.clone());
        ty
    }

    fn type_value(&mut self, value: &ValueNode) -> Ty {
        match value.token.kind {
            TokenKind::Int => builtin::int(),
            TokenKind::Str => builtin::string(),
            _ => Ty::Error,
        }
    }

    fn type_var(&mut self, var: &VarNode) -> Ty {
        let name = var.name.text;
        if let Some(ty) = self.ctx.local(name) {
            return ty;
        }

        let fun = match self.ctx.fun(name) {
            Some(Decl::Poisoned) => return Ty::Error,
            Some(Decl::Known(decl)) => Some((decl.generic_count, decl.ty.clone(), decl.name_span)),
            None => None,
        };
        match fun {
            Some((0, ty, _)) => Ty::Fun(ty),
            Some((generic_count, _, name_span)) => {
                DiagnosticBuilder::error(format!(
                    "function `{}` takes {} generic argument{} but 0 were provided",
                    name,
                    generic_count,
                    plural(generic_count),
                ))
                .code(DiagnosticCode::E_VALIDATE_GENERIC_COUNT)
                .span(var.span)
                .label(name_span, "defined here")
                .emit(self.handler);
                Ty::Error
            }
            None => {
                DiagnosticBuilder::error(format!("unknown variable `{}`", name))
                    .code(DiagnosticCode::E_VALIDATE_UNKNOWN_VAR)
                    .span(var.span)
                    .emit(self.handler);
                Ty::Error
            }
        }
    }

    fn type_fun_inst(&mut self, inst: &FunInstNode) -> Ty {
        let name = inst.name.text;
        let decl = match self.ctx.fun(name) {
            Some(Decl::Known(decl)) => Some(decl.clone()),
            Some(Decl::Poisoned) => None,
            None => {
                DiagnosticBuilder::error(format!("unknown function `{}`", name))
                    .code(DiagnosticCode::E_VALIDATE_UNKNOWN_FUN)
                    .span(inst.name.span)
                    .emit(self.handler);
                None
            }
        };

        let generics: Vec<Ty> = inst
            .generics
            .iter()
            .map(|generic| convert_type(&self.ctx, self.handler, generic))
            .collect();

        let Some(decl) = decl else { return Ty::Error };
        if generics.iter().any(|ty| matches!(ty, Ty::Error)) {
            return Ty::Error;
        }
        if decl.generic_count != generics.len() {
            DiagnosticBuilder::error(format!(
                "function `{}` takes {} generic argument{} but {} {} provided",
                name,
                decl.generic_count,
                plural(decl.generic_count),
                generics.len(),
                were(generics.len()),
            ))
            .code(DiagnosticCode::E_VALIDATE_GENERIC_COUNT)
            .span(inst.span)
            .label(decl.name_span, "defined here")
            .emit(self.handler);
            return Ty::Error;
        }

        substitute(&Ty::Fun(decl.ty), &generics)
    }

    fn type_constructor(&mut self, ctor: &DisConstructorNode) -> Ty {
        let name = ctor.name.text;
        let decl = match self.ctx.dis(name) {
            Some(Decl::Known(decl)) => decl.clone(),
            Some(Decl::Poisoned) => return Ty::Error,
            None => {
                DiagnosticBuilder::error(format!("dis `{}` is not defined", name))
                    .code(DiagnosticCode::E_VALIDATE_UNKNOWN_DIS)
                    .span(ctor.name.span)
                    .emit(self.handler);
                return Ty::Error;
            }
        };

        if decl.generic_count != ctor.generics.len() {
            DiagnosticBuilder::error(format!(
                "dis `{}` takes {} generic argument{} but {} {} provided",
                name,
                decl.generic_count,
                plural(decl.generic_count),
                ctor.generics.len(),
                were(ctor.generics.len()),
            ))
            .code(DiagnosticCode::E_VALIDATE_GENERIC_COUNT)
            .span(ctor.span)
            .label(decl.name_span, "defined here")
            .emit(self.handler);
            return Ty::Error;
        }

        let Some(variant) = decl.variant(ctor.variant.text) else {
            DiagnosticBuilder::error(format!(
                "dis `{}` has no variant `{}`",
                name, ctor.variant.text
            ))
            .code(DiagnosticCode::E_VALIDATE_NO_VARIANT)
            .span(ctor.variant.span)
            .label(decl.name_span, "defined here")
            .emit(self.handler);
            return Ty::Error;
        };

        let generics: Vec<Ty> = ctor
            .generics
            .iter()
            .map(|generic| convert_type(&self.ctx, self.handler, generic))
            .collect();

        let variant_ty = Ty::Dis(DisTy {
            name,
            generics: generics.clone(),
            pattern: TyPattern::Variant(VariantPat {
                name: ctor.variant.text,
                children: None,
            }),
        });
        let arg_tys: Vec<Ty> = variant
            .args
            .iter()
            .map(|arg| substitute(&arg.ty, &generics))
            .collect();

        if arg_tys.is_empty() {
            variant_ty
        } else {
            Ty::Fun(FunTy {
                args: arg_tys,
                result: Box::new(variant_ty),
            })
        }
    }

    fn type_call(&mut self, call: &homc_par::ast::CallNode) -> Ty {
        let callee_ty = self.type_expr(&call.callee);
        let arg_tys: Vec<Ty> = call.args.iter().map(|arg| self.type_expr(arg)).collect();

        if matches!(callee_ty, Ty::Error) || arg_tys.iter().any(|ty| matches!(ty, Ty::Error)) {
            return Ty::Error;
        }

        let fun = match callee_ty {
            Ty::Fun(fun) => fun,
            other => {
                DiagnosticBuilder::error(format!("type `{}` is not callable", other))
                    .code(DiagnosticCode::E_TYPE_NOT_CALLABLE)
                    .span(call.callee.span())
                    .emit(self.handler);
                return Ty::Error;
            }
        };
        if fun.args.iter().any(|ty| matches!(ty, Ty::Error)) {
            return Ty::Error;
        }

        if fun.args.len() != call.args.len() {
            DiagnosticBuilder::error(format!(
                "function takes {} argument{} but {} {} provided",
                fun.args.len(),
                plural(fun.args.len()),
                call.args.len(),
                were(call.args.len()),
            ))
            .code(DiagnosticCode::E_TYPE_ARITY)
            .span(call.span)
            .label(call.callee.span(), format!("function has type {}", fun))
            .emit(self.handler);
        }

        let mut mismatched = false;
        for ((arg, arg_ty), expected) in call.args.iter().zip(&arg_tys).zip(&fun.args) {
            if !is_subtype(arg_ty, expected) {
                DiagnosticBuilder::error(format!(
                    "mismatched types: expected `{}`, found `{}`",
                    expected, arg_ty
                ))
                .code(DiagnosticCode::E_TYPE_MISMATCH)
                .span(arg.span())
                .label(call.callee.span(), format!("function has type {}", fun))
                .emit(self.handler);
                mismatched = true;
            }
        }

        if mismatched {
            Ty::Error
        } else {
            *fun.result
        }
    }

    fn type_member(&mut self, member: &MemberNode) -> Ty {
        let inner_ty = self.type_expr(&member.expr);
        let member_name = member.member.text;

        let dis_ty = match inner_ty {
            Ty::Error => return Ty::Error,
            Ty::Dis(dis) => dis,
            other => {
                DiagnosticBuilder::error(format!(
                    "cannot get member `{}` on non-dis type `{}`",
                    member_name, other
                ))
                .code(DiagnosticCode::E_TYPE_BAD_MEMBER_BASE)
                .span(member.span)
                .emit(self.handler);
                return Ty::Error;
            }
        };

        let variant_pat = match &dis_ty.pattern {
            TyPattern::Variant(pat) => pat.clone(),
            _ => {
                DiagnosticBuilder::error(format!(
                    "cannot get member `{}` on non-variant type `{}`",
                    member_name,
                    Ty::Dis(dis_ty.clone())
                ))
                .code(DiagnosticCode::E_TYPE_BAD_MEMBER_BASE)
                .span(member.span)
                .label(member.expr.span(), "the variant of this value is not known here")
                .help("apply `fit` to narrow the value to a variant first")
                .emit(self.handler);
                return Ty::Error;
            }
        };

        let decl = match self.ctx.dis(dis_ty.name) {
            Some(Decl::Known(decl)) => decl.clone(),
            _ => return Ty::Error,
        };
        let Some(variant) = decl.variant(variant_pat.name) else {
            return Ty::Error;
        };
        let Some(arg) = variant.arg(member_name) else {
            DiagnosticBuilder::error(format!(
                "variant `{}` of dis `{}` has no member `{}`",
                variant_pat.name, dis_ty.name, member_name
            ))
            .code(DiagnosticCode::E_TYPE_NO_MEMBER)
            .span(member.member.span)
            .label(variant.span, "variant defined here")
            .emit(self.handler);
            return Ty::Error;
        };

        // project the field type; a refined child pattern carries into the
        // member's type
        let mut arg_ty = substitute(&arg.ty, &dis_ty.generics);
        if let Ty::Dis(arg_dis) = &mut arg_ty {
            if let (Some(children), Some(index)) =
                (&variant_pat.children, variant.arg_index(member_name))
            {
                if let Some(child) = children.get(index) {
                    arg_dis.pattern = child.clone();
                }
            }
        }
        arg_ty
    }

    fn type_assign(&mut self, assign: &homc_par::ast::AssignNode) -> Ty {
        let target_ty = self.type_expr(&assign.target);
        let value_ty = self.type_expr(&assign.value);
        if !is_subtype(&value_ty, &target_ty) {
            DiagnosticBuilder::error(format!(
                "mismatched types: expected `{}`, found `{}`",
                target_ty, value_ty
            ))
            .code(DiagnosticCode::E_TYPE_MISMATCH)
            .span(assign.value.span())
            .emit(self.handler);
        }
        target_ty
    }

    // ------------------------------------------------------------------
    // Fit
    // ------------------------------------------------------------------

    fn type_fit_expr(&mut self, fit: &FitExprNode) -> Ty {
        let scrutinee_ty = self.type_expr(&fit.scrutinee);
        if matches!(scrutinee_ty, Ty::Error) {
            return Ty::Error;
        }
        let dis_ty = match &scrutinee_ty {
            Ty::Dis(dis) => dis.clone(),
            other => {
                DiagnosticBuilder::error(format!("fit requires a dis value, found `{}`", other))
                    .code(DiagnosticCode::E_TYPE_PATTERN_NON_DIS)
                    .span(fit.scrutinee.span())
                    .emit(self.handler);
                return Ty::Error;
            }
        };

        let mut patterns_ok = true;
        for branch in &fit.branches {
            patterns_ok &= self.validate_pattern_for_ty(&branch.pattern, &scrutinee_ty);
        }
        if patterns_ok {
            self.check_exhaustiveness(
                &scrutinee_ty,
                fit.branches.iter().map(|branch| &branch.pattern),
                fit.span,
            );
        }

        let mut result: Option<Ty> = None;
        for branch in &fit.branches {
            let branch_ty = self.narrowed(&fit.scrutinee, &dis_ty, &branch.pattern, |checker| {
                checker.type_expr(&branch.body)
            });
            result = Some(match result {
                None => branch_ty,
                Some(acc) => find_supertype(&acc, &branch_ty),
            });
        }
        result.unwrap_or(Ty::Error)
    }

    fn type_fit_stmt(&mut self, fit: &FitStmtNode) {
        let scrutinee_ty = self.type_expr(&fit.scrutinee);
        if matches!(scrutinee_ty, Ty::Error) {
            return;
        }
        let dis_ty = match &scrutinee_ty {
            Ty::Dis(dis) => dis.clone(),
            other => {
                DiagnosticBuilder::error(format!("fit requires a dis value, found `{}`", other))
                    .code(DiagnosticCode::E_TYPE_PATTERN_NON_DIS)
                    .span(fit.scrutinee.span())
                    .emit(self.handler);
                return;
            }
        };

        let mut patterns_ok = true;
        for branch in &fit.branches {
            patterns_ok &= self.validate_pattern_for_ty(&branch.pattern, &scrutinee_ty);
        }
        if patterns_ok {
            self.check_exhaustiveness(
                &scrutinee_ty,
                fit.branches.iter().map(|branch| &branch.pattern),
                fit.span,
            );
        }

        for branch in &fit.branches {
            self.narrowed(&fit.scrutinee, &dis_ty, &branch.pattern, |checker| {
                checker.check_stmt(&branch.body);
            });
        }
    }

    /// Run `body` with the scrutinee variable narrowed by the branch
    /// pattern, when narrowing applies.
    fn narrowed<R>(
        &mut self,
        scrutinee: &ExprNode,
        scrutinee_ty: &DisTy,
        pattern: &PatternNode,
        body: impl FnOnce(&mut Self) -> R,
    ) -> R {
        if let (ExprNode::Var(var), PatternNode::Variant(_)) = (scrutinee, pattern) {
            let narrowed_ty = Ty::Dis(DisTy {
                name: scrutinee_ty.name,
                generics: scrutinee_ty.generics.clone(),
                pattern: convert_pattern(pattern),
            });
            self.ctx.push();
            self.ctx.add_local(var.name.text, narrowed_ty);
            let result = body(self);
            self.ctx.pop();
            result
        } else {
            body(self)
        }
    }

    fn check_exhaustiveness<'p>(
        &self,
        scrutinee_ty: &Ty,
        patterns: impl Iterator<Item = &'p PatternNode>,
        span: Span,
    ) {
        let converted: Vec<TyPattern> = patterns.map(convert_pattern).collect();
        let checker = ExhaustivenessChecker::new(&self.ctx);
        if let Some(witness) = checker.check_fit(scrutinee_ty, &converted) {
            DiagnosticBuilder::error("fit is not exhaustive")
                .code(DiagnosticCode::E_TYPE_NON_EXHAUSTIVE)
                .span(span)
                .help(format!("pattern `{}` is not matched", witness))
                .emit(self.handler);
        }
    }

    /// Check a written pattern against the matched type; reports and
    /// returns false on structural problems.
    fn validate_pattern_for_ty(&self, pattern: &PatternNode, ty: &Ty) -> bool {
        let PatternNode::Variant(variant) = pattern else {
            return true;
        };
        let dis_ty = match ty {
            Ty::Dis(dis) => dis,
            Ty::Error => return true,
            other => {
                DiagnosticBuilder::error(format!(
                    "cannot match pattern `{}` against non-dis type `{}`",
                    variant.name.text, other
                ))
                .code(DiagnosticCode::E_TYPE_PATTERN_NON_DIS)
                .span(variant.name.span)
                .emit(self.handler);
                return false;
            }
        };

        let decl = match self.ctx.dis(dis_ty.name) {
            Some(Decl::Known(decl)) => decl.clone(),
            _ => return false,
        };
        let Some(variant_decl) = decl.variant(variant.name.text) else {
            DiagnosticBuilder::error(format!(
                "dis `{}` has no variant `{}`",
                dis_ty.name, variant.name.text
            ))
            .code(DiagnosticCode::E_VALIDATE_NO_VARIANT)
            .span(variant.name.span)
            .label(decl.name_span, "defined here")
            .emit(self.handler);
            return false;
        };

        if !variant.args.is_empty() && variant.args.len() != variant_decl.arg_count() {
            DiagnosticBuilder::error(format!(
                "variant `{}` has {} field{} but the pattern names {}",
                variant.name.text,
                variant_decl.arg_count(),
                plural(variant_decl.arg_count()),
                variant.args.len(),
            ))
            .code(DiagnosticCode::E_TYPE_VARIANT_ARITY)
            .span(variant.span)
            .label(variant_decl.span, "variant defined here")
            .emit(self.handler);
            return false;
        }

        let mut ok = true;
        for (arg, child) in variant_decl.args.iter().zip(&variant.args) {
            let child_ty = substitute(&arg.ty, &dis_ty.generics);
            ok &= self.validate_pattern_for_ty(child, &child_ty);
        }
        ok
    }
}

fn unique_names(names: impl Iterator<Item = Symbol>) -> bool {
    let mut seen = FxHashSet::default();
    names.into_iter().all(|name| seen.insert(name))
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
