//! Typing context: declaration tables, scope frames, expression types.

use homc_par::ast::{GenericParams, NodeId};
use homc_util::{FxHashMap, Symbol};
use indexmap::IndexMap;

use crate::types::{Decl, DisDecl, FunDecl, Ty};

#[derive(Default)]
struct Frame {
    locals: FxHashMap<Symbol, Ty>,
    generics: FxHashMap<Symbol, usize>,
}

/// All semantic information produced by the type checker.
///
/// Declaration tables are insertion-ordered so diagnostics and lowering see
/// declarations in source order. Expression types are recorded under the
/// node ids assigned by the parser; the AST itself stays untouched.
pub struct TypingContext {
    pub dises: IndexMap<Symbol, Decl<DisDecl>>,
    pub functions: IndexMap<Symbol, Decl<FunDecl>>,
    pub expr_types: FxHashMap<NodeId, Ty>,
    stack: Vec<Frame>,
}

impl TypingContext {
    pub fn new() -> Self {
        Self {
            dises: IndexMap::new(),
            functions: IndexMap::new(),
            expr_types: FxHashMap::default(),
            stack: vec![Frame::default()],
        }
    }

    pub fn push(&mut self) {
        self.stack.push(Frame::default());
    }

    pub fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    pub fn add_local(&mut self, name: Symbol, ty: Ty) {
        if let Some(frame) = self.stack.last_mut() {
            frame.locals.insert(name, ty);
        }
    }

    /// Innermost binding for `name`, if any.
    pub fn local(&self, name: Symbol) -> Option<Ty> {
        self.stack
            .iter()
            .rev()
            .find_map(|frame| frame.locals.get(&name).cloned())
    }

    /// Bind the generic parameters of a declaration in the current frame,
    /// indexed in declaration order.
    pub fn add_generics(&mut self, generics: &GenericParams) {
        if let Some(frame) = self.stack.last_mut() {
            for (index, param) in generics.params.iter().enumerate() {
                frame.generics.insert(param.text, index);
            }
        }
    }

    pub fn generic_index(&self, name: Symbol) -> Option<usize> {
        self.stack
            .iter()
            .rev()
            .find_map(|frame| frame.generics.get(&name).copied())
    }

    pub fn dis(&self, name: Symbol) -> Option<&Decl<DisDecl>> {
        self.dises.get(&name)
    }

    pub fn fun(&self, name: Symbol) -> Option<&Decl<FunDecl>> {
        self.functions.get(&name)
    }

    pub fn set_expr_ty(&mut self, id: NodeId, ty: Ty) {
        self.expr_types.insert(id, ty);
    }

    pub fn expr_ty(&self, id: NodeId) -> Option<&Ty> {
        self.expr_types.get(&id)
    }
}

impl Default for TypingContext {
    fn default() -> Self {
        Self::new()
    }
}
