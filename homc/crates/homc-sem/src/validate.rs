//! Structural validation: name resolution, arity, uniqueness, scope.
//!
//! The validator runs before type checking on the raw AST. It collects the
//! top-level dis and function declarations, then walks every node with a
//! stack of lexical frames, reporting duplicated declarations, unknown
//! names, generic-argument count mismatches, and misplaced assignments.
//! Collection never aborts: all problems are reported together.

use homc_lex::Token;
use homc_par::ast::{
    ArgNode, AssignNode, BlockNode, DisConstructorNode, DisNode, ExprNode, FitExprNode,
    FitStmtNode, FunInstNode, FunNode, FunctionTypeNode, GenericParams, Item, LetNode,
    PatternNode, Program, StmtNode, TypeNode, VarNode,
};
use homc_util::{DiagnosticBuilder, DiagnosticCode, FxHashMap, Handler, Span, Symbol};

use crate::builtin;

/// Validate a program, reporting into the handler.
pub fn validate(program: &Program, handler: &Handler) {
    let mut validator = Validator::new(handler);
    validator.collect_dis_declarations(program);
    validator.collect_fun_declarations(program);
    validator.validate_program(program);
}

struct DisInfo {
    generic_count: usize,
    variant_arg_counts: FxHashMap<Symbol, usize>,
    name_span: Span,
}

struct FunInfo {
    generic_count: usize,
    name_span: Span,
}

enum Slot<T> {
    Known(T),
    Poisoned,
}

#[derive(Default)]
struct Frame {
    generics: FxHashMap<Symbol, Token>,
    locals: FxHashMap<Symbol, Token>,
}

struct Validator<'a> {
    handler: &'a Handler,
    dises: FxHashMap<Symbol, Slot<DisInfo>>,
    functions: FxHashMap<Symbol, Slot<FunInfo>>,
    stack: Vec<Frame>,
}

impl<'a> Validator<'a> {
    fn new(handler: &'a Handler) -> Self {
        let mut functions = FxHashMap::default();
        for (name, decl) in builtin::builtin_functions() {
            functions.insert(
                name,
                Slot::Known(FunInfo {
                    generic_count: decl.generic_count,
                    name_span: Span::DUMMY,
                }),
            );
        }
        Self {
            handler,
            dises: FxHashMap::default(),
            functions,
            stack: vec![Frame::default()],
        }
    }

    fn has_local(&self, name: Symbol) -> bool {
        self.stack.iter().any(|frame| frame.locals.contains_key(&name))
    }

    fn duplicate(&self, what: &str, name: Symbol, span: Span, first: Span) {
        DiagnosticBuilder::error(format!("duplicated {} `{}`", what, name))
            .code(DiagnosticCode::E_VALIDATE_DUPLICATE)
            .span(span)
            .label(first, "first defined here")
            .emit(self.handler);
    }

    // ------------------------------------------------------------------
    // Declaration collection
    // ------------------------------------------------------------------

    fn collect_dis_declarations(&mut self, program: &Program) {
        let mut previous: FxHashMap<Symbol, Span> = FxHashMap::default();
        for item in &program.items {
            let Item::Dis(dis) = item else { continue };
            let name = dis.name.text;
            let mut poisoned = false;

            if builtin::is_simple_type(name) {
                DiagnosticBuilder::error(format!("dis `{}` collides with a builtin type", name))
                    .code(DiagnosticCode::E_VALIDATE_DUPLICATE)
                    .span(dis.name.span)
                    .emit(self.handler);
                poisoned = true;
            }
            if let Some(first) = previous.get(&name) {
                self.duplicate("dis", name, dis.name.span, *first);
                poisoned = true;
            } else {
                previous.insert(name, dis.name.span);
            }

            let slot = if poisoned {
                Slot::Poisoned
            } else {
                Slot::Known(DisInfo {
                    generic_count: dis.generics.params.len(),
                    variant_arg_counts: dis
                        .variants
                        .iter()
                        .map(|variant| (variant.name.text, variant.args.len()))
                        .collect(),
                    name_span: dis.name.span,
                })
            };
            self.dises.insert(name, slot);
        }
    }

    fn collect_fun_declarations(&mut self, program: &Program) {
        let mut previous: FxHashMap<Symbol, Span> = FxHashMap::default();
        for item in &program.items {
            let Item::Fun(fun) = item else { continue };
            let name = fun.name.text;
            let mut poisoned = false;

            if let Some(first) = previous.get(&name) {
                self.duplicate("function", name, fun.name.span, *first);
                poisoned = true;
            } else {
                previous.insert(name, fun.name.span);
            }

            let slot = if poisoned {
                Slot::Poisoned
            } else {
                Slot::Known(FunInfo {
                    generic_count: fun.generics.params.len(),
                    name_span: fun.name.span,
                })
            };
            self.functions.insert(name, slot);
        }
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    fn validate_program(&mut self, program: &Program) {
        for item in &program.items {
            match item {
                Item::Dis(dis) => self.validate_dis(dis),
                Item::Fun(fun) => self.validate_fun(fun),
                Item::Expr(expr) => self.validate_expr(expr, true),
            }
        }
    }

    fn validate_generics(&mut self, generics: &GenericParams) {
        let mut previous: FxHashMap<Symbol, Token> = FxHashMap::default();
        for param in &generics.params {
            if let Some(first) = previous.get(&param.text) {
                self.duplicate("generic parameter", param.text, param.span, first.span);
            } else {
                previous.insert(param.text, *param);
            }
        }
    }

    fn validate_dis(&mut self, dis: &DisNode) {
        self.stack.push(Frame::default());
        self.validate_generics(&dis.generics);
        if let Some(frame) = self.stack.last_mut() {
            for param in &dis.generics.params {
                frame.generics.insert(param.text, *param);
            }
        }

        let mut previous: FxHashMap<Symbol, Token> = FxHashMap::default();
        for variant in &dis.variants {
            self.validate_arg_list(&variant.args);
            if let Some(first) = previous.get(&variant.name.text) {
                self.duplicate("variant", variant.name.text, variant.name.span, first.span);
            } else {
                previous.insert(variant.name.text, variant.name);
            }
        }

        self.stack.pop();
    }

    fn validate_arg_list(&mut self, args: &[ArgNode]) {
        let mut previous: FxHashMap<Symbol, Token> = FxHashMap::default();
        for arg in args {
            self.validate_type(&arg.ty);
            if let Some(first) = previous.get(&arg.name.text) {
                self.duplicate("argument", arg.name.text, arg.name.span, first.span);
            } else {
                previous.insert(arg.name.text, arg.name);
            }
        }
    }

    fn validate_fun(&mut self, fun: &FunNode) {
        self.stack.push(Frame::default());
        self.validate_generics(&fun.generics);
        if let Some(frame) = self.stack.last_mut() {
            for param in &fun.generics.params {
                frame.generics.insert(param.text, *param);
            }
        }

        self.validate_arg_list(&fun.args);
        if let Some(frame) = self.stack.last_mut() {
            for arg in &fun.args {
                frame.locals.insert(arg.name.text, arg.name);
            }
        }

        if let Some(ret) = &fun.ret {
            self.validate_type(ret);
        }
        self.validate_block(&fun.body);

        self.stack.pop();
    }

    fn validate_block(&mut self, block: &BlockNode) {
        self.stack.push(Frame::default());
        for stmt in &block.statements {
            self.validate_stmt(stmt);
        }
        self.stack.pop();
    }

    fn validate_stmt(&mut self, stmt: &StmtNode) {
        match stmt {
            StmtNode::Ret(ret) => {
                if let Some(expr) = &ret.expr {
                    self.validate_expr(expr, false);
                }
            }
            StmtNode::Block(block) => self.validate_block(block),
            StmtNode::Write(_) => {}
            StmtNode::Let(node) => self.validate_let(node),
            StmtNode::Fit(fit) => self.validate_fit_stmt(fit),
            StmtNode::Expr(expr) => self.validate_expr(expr, true),
        }
    }

    fn validate_let(&mut self, node: &LetNode) {
        self.validate_expr(&node.value, false);

        let first = self
            .stack
            .last()
            .and_then(|frame| frame.locals.get(&node.name.text))
            .map(|token| token.span);
        match first {
            Some(first_span) => {
                self.duplicate("variable", node.name.text, node.name.span, first_span)
            }
            None => {
                if let Some(frame) = self.stack.last_mut() {
                    frame.locals.insert(node.name.text, node.name);
                }
            }
        }
    }

    /// `is_statement` is true when the expression is itself a statement;
    /// only there may an assignment appear.
    fn validate_expr(&mut self, expr: &ExprNode, is_statement: bool) {
        match expr {
            ExprNode::Value(_) => {}
            ExprNode::Var(var) => self.validate_var(var),
            ExprNode::FunInst(inst) => self.validate_fun_inst(inst),
            ExprNode::Call(call) => {
                self.validate_expr(&call.callee, false);
                for arg in &call.args {
                    self.validate_expr(arg, false);
                }
            }
            ExprNode::Member(member) => self.validate_expr(&member.expr, false),
            ExprNode::Assign(assign) => self.validate_assign(assign, is_statement),
            ExprNode::Fit(fit) => self.validate_fit_expr(fit),
            ExprNode::Ctor(ctor) => self.validate_dis_constructor(ctor),
            ExprNode::TupleLike(tuple) => {
                for part in &tuple.parts {
                    self.validate_expr(part, false);
                }
            }
        }
    }

    fn validate_var(&mut self, var: &VarNode) {
        let name = var.name.text;
        if self.has_local(name) {
            return;
        }
        match self.functions.get(&name) {
            Some(Slot::Poisoned) => {}
            Some(Slot::Known(fun)) => {
                if fun.generic_count != 0 {
                    DiagnosticBuilder::error(format!(
                        "function `{}` takes {} generic argument{} but 0 were provided",
                        name,
                        fun.generic_count,
                        if fun.generic_count == 1 { "" } else { "s" },
                    ))
                    .code(DiagnosticCode::E_VALIDATE_GENERIC_COUNT)
                    .span(var.name.span)
                    .label(fun.name_span, "defined here")
                    .emit(self.handler);
                }
            }
            None => {
                DiagnosticBuilder::error(format!("unknown variable `{}`", name))
                    .code(DiagnosticCode::E_VALIDATE_UNKNOWN_VAR)
                    .span(var.name.span)
                    .emit(self.handler);
            }
        }
    }

    fn validate_fun_inst(&mut self, inst: &FunInstNode) {
        for generic in &inst.generics {
            self.validate_type(generic);
        }

        match self.functions.get(&inst.name.text) {
            Some(Slot::Poisoned) => {}
            Some(Slot::Known(fun)) => {
                if inst.generics.len() != fun.generic_count {
                    DiagnosticBuilder::error(format!(
                        "function `{}` takes {} generic argument{} but {} {} provided",
                        inst.name.text,
                        fun.generic_count,
                        if fun.generic_count == 1 { "" } else { "s" },
                        inst.generics.len(),
                        if inst.generics.len() == 1 { "was" } else { "were" },
                    ))
                    .code(DiagnosticCode::E_VALIDATE_GENERIC_COUNT)
                    .span(inst.name.span)
                    .label(fun.name_span, "defined here")
                    .emit(self.handler);
                }
            }
            None => {
                DiagnosticBuilder::error(format!("unknown function `{}`", inst.name.text))
                    .code(DiagnosticCode::E_VALIDATE_UNKNOWN_FUN)
                    .span(inst.name.span)
                    .emit(self.handler);
            }
        }
    }

    fn validate_dis_constructor(&mut self, ctor: &DisConstructorNode) {
        for generic in &ctor.generics {
            self.validate_type(generic);
        }

        match self.dises.get(&ctor.name.text) {
            Some(Slot::Poisoned) => {}
            Some(Slot::Known(dis)) => {
                if dis.generic_count != ctor.generics.len() {
                    DiagnosticBuilder::error(format!(
                        "dis `{}` takes {} generic argument{} but {} {} provided",
                        ctor.name.text,
                        dis.generic_count,
                        if dis.generic_count == 1 { "" } else { "s" },
                        ctor.generics.len(),
                        if ctor.generics.len() == 1 { "was" } else { "were" },
                    ))
                    .code(DiagnosticCode::E_VALIDATE_GENERIC_COUNT)
                    .span(ctor.span)
                    .label(dis.name_span, "defined here")
                    .emit(self.handler);
                }
                if !dis.variant_arg_counts.contains_key(&ctor.variant.text) {
                    DiagnosticBuilder::error(format!(
                        "dis `{}` has no variant `{}`",
                        ctor.name.text, ctor.variant.text
                    ))
                    .code(DiagnosticCode::E_VALIDATE_NO_VARIANT)
                    .span(ctor.variant.span)
                    .label(dis.name_span, "defined here")
                    .emit(self.handler);
                }
            }
            None => {
                DiagnosticBuilder::error(format!("dis `{}` is not defined", ctor.name.text))
                    .code(DiagnosticCode::E_VALIDATE_UNKNOWN_DIS)
                    .span(ctor.name.span)
                    .emit(self.handler);
            }
        }
    }

    fn validate_assign(&mut self, assign: &AssignNode, is_statement: bool) {
        if !is_statement {
            DiagnosticBuilder::error("assignment can only be used in statement position")
                .code(DiagnosticCode::E_VALIDATE_BAD_ASSIGN)
                .span(assign.span)
                .emit(self.handler);
        }
        if !matches!(*assign.target, ExprNode::Var(_) | ExprNode::Member(_)) {
            DiagnosticBuilder::error("can only assign to variables and members")
                .code(DiagnosticCode::E_VALIDATE_BAD_ASSIGN)
                .span(assign.target.span())
                .emit(self.handler);
        }
        self.validate_expr(&assign.target, false);
        self.validate_expr(&assign.value, false);
    }

    fn validate_fit_expr(&mut self, fit: &FitExprNode) {
        self.validate_expr(&fit.scrutinee, false);
        for branch in &fit.branches {
            self.validate_pattern(&branch.pattern);
            self.validate_expr(&branch.body, true);
        }
    }

    fn validate_fit_stmt(&mut self, fit: &FitStmtNode) {
        self.validate_expr(&fit.scrutinee, false);
        for branch in &fit.branches {
            self.validate_pattern(&branch.pattern);
            self.validate_stmt(&branch.body);
        }
    }

    fn validate_pattern(&mut self, pattern: &PatternNode) {
        if let PatternNode::Variant(variant) = pattern {
            for arg in &variant.args {
                self.validate_pattern(arg);
            }
        }
    }

    fn validate_type(&mut self, ty: &TypeNode) {
        match ty {
            TypeNode::Dis(dis) => {
                for generic in &dis.generics {
                    self.validate_type(generic);
                }
            }
            TypeNode::Ctor(ctor) => self.validate_dis_constructor(ctor),
            TypeNode::Fun(fun) => self.validate_fun_type(fun),
            TypeNode::Wildcard(_) => {}
        }
    }

    fn validate_fun_type(&mut self, fun: &FunctionTypeNode) {
        for arg in &fun.args {
            self.validate_type(arg);
        }
        self.validate_type(&fun.ret);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homc_lex::lex;
    use homc_util::span::SourceFile;

    fn validate_source(input: &str) -> Handler {
        let file = SourceFile::new(0, "test.hom", input);
        let tokens = lex(&file);
        let handler = Handler::new();
        let program = homc_par::parse(&tokens, &handler).expect("program should parse");
        validate(&program, &handler);
        handler
    }

    fn messages(handler: &Handler) -> Vec<String> {
        handler.diagnostics().iter().map(|d| d.message.clone()).collect()
    }

    #[test]
    fn test_clean_program() {
        let handler = validate_source(
            "dis Nat { Zero, Succ(p: Nat) }\n\
             fun add(a: Nat, b: Nat) -> Nat {\n\
                 ret fit b { Zero => a, Succ => Nat::Succ(add(a, b.p)) };\n\
             }\n",
        );
        assert!(!handler.has_errors(), "unexpected: {:?}", messages(&handler));
    }

    #[test]
    fn test_duplicated_dis() {
        let handler = validate_source("dis A { X } dis A { Y }");
        assert!(handler.has_errors());
        let diags = handler.diagnostics();
        let dup = diags
            .iter()
            .find(|d| d.message == "duplicated dis `A`")
            .expect("missing duplicate diagnostic");
        assert_eq!(dup.labels[0].message, "first defined here");
    }

    #[test]
    fn test_dis_collides_with_builtin() {
        let handler = validate_source("dis Int { X }");
        assert!(messages(&handler)
            .iter()
            .any(|m| m.contains("collides with a builtin type")));
    }

    #[test]
    fn test_duplicated_function() {
        let handler = validate_source("fun f() { } fun f() { }");
        assert!(messages(&handler).iter().any(|m| m == "duplicated function `f`"));
    }

    #[test]
    fn test_duplicated_variant() {
        let handler = validate_source("dis A { X, X }");
        assert!(messages(&handler).iter().any(|m| m == "duplicated variant `X`"));
    }

    #[test]
    fn test_duplicated_generic() {
        let handler = validate_source("dis A[T, T] { X }");
        assert!(messages(&handler)
            .iter()
            .any(|m| m == "duplicated generic parameter `T`"));
    }

    #[test]
    fn test_duplicated_argument() {
        let handler = validate_source("fun f(a: Int, a: Int) { }");
        assert!(messages(&handler).iter().any(|m| m == "duplicated argument `a`"));
    }

    #[test]
    fn test_duplicated_let_in_same_frame() {
        let handler = validate_source("fun f() { let x = 1; let x = 2; }");
        assert!(messages(&handler).iter().any(|m| m == "duplicated variable `x`"));
    }

    #[test]
    fn test_shadowing_in_nested_block_is_fine() {
        let handler = validate_source("fun f() { let x = 1; { let x = 2; }; }");
        assert!(!handler.has_errors(), "unexpected: {:?}", messages(&handler));
    }

    #[test]
    fn test_unknown_variable() {
        let handler = validate_source("fun f() { ret y; }");
        assert!(messages(&handler).iter().any(|m| m == "unknown variable `y`"));
    }

    #[test]
    fn test_argument_resolves_as_local() {
        let handler = validate_source("fun f(x: Int) -> Int { ret x; }");
        assert!(!handler.has_errors(), "unexpected: {:?}", messages(&handler));
    }

    #[test]
    fn test_function_name_resolves_as_var() {
        let handler = validate_source("fun f() { } fun g() { f(); }");
        assert!(!handler.has_errors(), "unexpected: {:?}", messages(&handler));
    }

    #[test]
    fn test_generic_function_requires_instantiation() {
        let handler = validate_source("fun id[T](x: T) -> T { ret x; } fun g() { id(); }");
        assert!(messages(&handler)
            .iter()
            .any(|m| m.contains("takes 1 generic argument but 0 were provided")));
    }

    #[test]
    fn test_fun_inst_generic_count() {
        let handler =
            validate_source("fun id[T](x: T) -> T { ret x; } fun g() { id[Int, Int](1); }");
        assert!(messages(&handler)
            .iter()
            .any(|m| m.contains("takes 1 generic argument but 2 were provided")));
    }

    #[test]
    fn test_unknown_function_inst() {
        let handler = validate_source("fun g() { missing[Int](); }");
        assert!(messages(&handler).iter().any(|m| m == "unknown function `missing`"));
    }

    #[test]
    fn test_unknown_dis_in_constructor() {
        let handler = validate_source("fun g() { ret Ghost::X; }");
        assert!(messages(&handler).iter().any(|m| m == "dis `Ghost` is not defined"));
    }

    #[test]
    fn test_missing_variant_in_constructor() {
        let handler = validate_source("dis A { X } fun g() { ret A::Y; }");
        assert!(messages(&handler).iter().any(|m| m == "dis `A` has no variant `Y`"));
    }

    #[test]
    fn test_constructor_generic_count() {
        let handler = validate_source("dis Box[T] { B(v: T) } fun g() { ret Box::B; }");
        assert!(messages(&handler)
            .iter()
            .any(|m| m.contains("dis `Box` takes 1 generic argument but 0 were provided")));
    }

    #[test]
    fn test_assignment_in_expression_position() {
        let handler = validate_source("fun f() { let x = 1; f((x = 2)); }");
        assert!(messages(&handler)
            .iter()
            .any(|m| m == "assignment can only be used in statement position"));
    }

    #[test]
    fn test_assignment_as_statement_is_fine() {
        let handler = validate_source("fun f() { let x = 1; x = 2; }");
        assert!(!handler.has_errors(), "unexpected: {:?}", messages(&handler));
    }

    #[test]
    fn test_assignment_in_fit_branch_statement() {
        let handler = validate_source(
            "dis B { T, F } fun f(b: B) { let x = 1; fit b { T => x = 2, F => x = 3 }; }",
        );
        assert!(!handler.has_errors(), "unexpected: {:?}", messages(&handler));
    }

    #[test]
    fn test_builtin_operators_resolve() {
        let handler = validate_source("fun f(a: Int, b: Int) -> Int { ret a + b * 2; }");
        assert!(!handler.has_errors(), "unexpected: {:?}", messages(&handler));
    }
}
