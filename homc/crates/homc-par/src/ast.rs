//! AST node definitions for the Homie language.
//!
//! Every node carries the `Span` covering its source extent; expression
//! nodes additionally carry a [`NodeId`], the key under which the type
//! checker records their type. The AST is immutable after parsing.

use homc_lex::Token;
use homc_util::{define_idx, Span};

define_idx!(NodeId);

/// AST root: the items of one source file
#[derive(Debug, Clone)]
pub struct Program {
    pub items: Vec<Item>,
}

/// Top-level item
#[derive(Debug, Clone)]
pub enum Item {
    /// Discriminated sum declaration
    Dis(DisNode),
    /// Function declaration
    Fun(FunNode),
    /// Bare top-level expression
    Expr(ExprNode),
}

/// `dis Name[T, U] { V1, V2(a: T) }`
#[derive(Debug, Clone)]
pub struct DisNode {
    pub name: Token,
    pub generics: GenericParams,
    pub variants: Vec<DisVariantNode>,
    pub span: Span,
}

impl DisNode {
    pub fn variant(&self, name: &str) -> Option<&DisVariantNode> {
        self.variants.iter().find(|v| v.name.text.as_str() == name)
    }
}

/// Generic parameter list; empty when no brackets were written
#[derive(Debug, Clone)]
pub struct GenericParams {
    pub params: Vec<Token>,
    pub span: Span,
}

/// One variant of a dis, with named, typed fields
#[derive(Debug, Clone)]
pub struct DisVariantNode {
    pub name: Token,
    pub args: Vec<ArgNode>,
    pub span: Span,
}

/// `name: Type` (variant field or function parameter)
#[derive(Debug, Clone)]
pub struct ArgNode {
    pub name: Token,
    pub ty: TypeNode,
    pub span: Span,
}

/// `fun name[T](args) -> Ret { body }`
#[derive(Debug, Clone)]
pub struct FunNode {
    pub name: Token,
    pub generics: GenericParams,
    pub args: Vec<ArgNode>,
    /// Missing annotation means the function returns Void
    pub ret: Option<TypeNode>,
    pub body: BlockNode,
    pub span: Span,
}

/// Parsed type syntax
#[derive(Debug, Clone)]
pub enum TypeNode {
    /// `Name` or `Name[T, ...]` (dis, builtin, or generic parameter)
    Dis(DisTypeNode),
    /// `Name[G]::Variant` used in type position
    Ctor(Box<DisConstructorNode>),
    /// `(A, B) -> R`
    Fun(Box<FunctionTypeNode>),
    /// `?` in a generic argument position
    Wildcard(Span),
}

impl TypeNode {
    pub fn span(&self) -> Span {
        match self {
            TypeNode::Dis(node) => node.span,
            TypeNode::Ctor(node) => node.span,
            TypeNode::Fun(node) => node.span,
            TypeNode::Wildcard(span) => *span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DisTypeNode {
    pub name: Token,
    pub generics: Vec<TypeNode>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionTypeNode {
    pub args: Vec<TypeNode>,
    pub ret: TypeNode,
    pub span: Span,
}

/// Parenthesized type list; transient, only appears while a function type
/// is being assembled
#[derive(Debug, Clone)]
pub struct FunctionTypeArgsNode {
    pub parts: Vec<TypeNode>,
    pub span: Span,
}

/// `Name[G]::Variant`, usable as an expression and as a type
#[derive(Debug, Clone)]
pub struct DisConstructorNode {
    pub id: NodeId,
    pub name: Token,
    pub generics: Vec<TypeNode>,
    pub variant: Token,
    pub span: Span,
}

/// `{ stmt; stmt; }`
#[derive(Debug, Clone)]
pub struct BlockNode {
    pub statements: Vec<StmtNode>,
    pub span: Span,
}

/// Statement
#[derive(Debug, Clone)]
pub enum StmtNode {
    Ret(RetNode),
    Block(BlockNode),
    Write(WriteNode),
    Let(LetNode),
    Fit(FitStmtNode),
    Expr(ExprNode),
}

impl StmtNode {
    pub fn span(&self) -> Span {
        match self {
            StmtNode::Ret(node) => node.span,
            StmtNode::Block(node) => node.span,
            StmtNode::Write(node) => node.span,
            StmtNode::Let(node) => node.span,
            StmtNode::Fit(node) => node.span,
            StmtNode::Expr(node) => node.span(),
        }
    }
}

/// `ret` / `ret expr`
#[derive(Debug, Clone)]
pub struct RetNode {
    pub expr: Option<ExprNode>,
    pub span: Span,
}

/// `wrt "literal"`; the value is the unescaped string content
#[derive(Debug, Clone)]
pub struct WriteNode {
    pub value: String,
    pub span: Span,
}

/// `let name = expr`
#[derive(Debug, Clone)]
pub struct LetNode {
    pub name: Token,
    pub value: ExprNode,
    pub span: Span,
}

/// `fit expr { Pat => stmt, ... }` in statement position
#[derive(Debug, Clone)]
pub struct FitStmtNode {
    pub scrutinee: ExprNode,
    pub branches: Vec<FitStmtBranch>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FitStmtBranch {
    pub pattern: PatternNode,
    pub body: StmtNode,
    pub span: Span,
}

/// Expression
#[derive(Debug, Clone)]
pub enum ExprNode {
    Value(ValueNode),
    Var(VarNode),
    FunInst(FunInstNode),
    Call(CallNode),
    Member(MemberNode),
    Assign(AssignNode),
    Fit(Box<FitExprNode>),
    Ctor(DisConstructorNode),
    /// Parenthesized expression list; consumed as call arguments or
    /// unwrapped to its single element during expression building
    TupleLike(TupleLikeNode),
}

impl ExprNode {
    pub fn span(&self) -> Span {
        match self {
            ExprNode::Value(node) => node.span,
            ExprNode::Var(node) => node.span,
            ExprNode::FunInst(node) => node.span,
            ExprNode::Call(node) => node.span,
            ExprNode::Member(node) => node.span,
            ExprNode::Assign(node) => node.span,
            ExprNode::Fit(node) => node.span,
            ExprNode::Ctor(node) => node.span,
            ExprNode::TupleLike(node) => node.span,
        }
    }

    pub fn id(&self) -> NodeId {
        match self {
            ExprNode::Value(node) => node.id,
            ExprNode::Var(node) => node.id,
            ExprNode::FunInst(node) => node.id,
            ExprNode::Call(node) => node.id,
            ExprNode::Member(node) => node.id,
            ExprNode::Assign(node) => node.id,
            ExprNode::Fit(node) => node.id,
            ExprNode::Ctor(node) => node.id,
            ExprNode::TupleLike(node) => node.id,
        }
    }
}

/// Integer or string literal
#[derive(Debug, Clone)]
pub struct ValueNode {
    pub id: NodeId,
    pub token: Token,
    pub span: Span,
}

/// Variable or zero-generic function reference
#[derive(Debug, Clone)]
pub struct VarNode {
    pub id: NodeId,
    pub name: Token,
    pub span: Span,
}

/// `name[T, ...]`: generic function instantiation
#[derive(Debug, Clone)]
pub struct FunInstNode {
    pub id: NodeId,
    pub name: Token,
    pub generics: Vec<TypeNode>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CallNode {
    pub id: NodeId,
    pub callee: Box<ExprNode>,
    pub args: Vec<ExprNode>,
    pub span: Span,
}

/// `expr.field`
#[derive(Debug, Clone)]
pub struct MemberNode {
    pub id: NodeId,
    pub expr: Box<ExprNode>,
    pub member: Token,
    pub span: Span,
}

/// `target = value`; legal only in statement position
#[derive(Debug, Clone)]
pub struct AssignNode {
    pub id: NodeId,
    pub target: Box<ExprNode>,
    pub value: Box<ExprNode>,
    pub span: Span,
}

/// `fit expr { Pat => expr, ... }` in expression position
#[derive(Debug, Clone)]
pub struct FitExprNode {
    pub id: NodeId,
    pub scrutinee: ExprNode,
    pub branches: Vec<FitExprBranch>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FitExprBranch {
    pub pattern: PatternNode,
    pub body: ExprNode,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TupleLikeNode {
    pub id: NodeId,
    pub parts: Vec<ExprNode>,
    pub span: Span,
}

/// Fit branch pattern
#[derive(Debug, Clone)]
pub enum PatternNode {
    /// `Variant sub sub ...`; zero written args leave the variant's fields
    /// unrefined
    Variant(VariantPatternNode),
    /// `_`
    Catchall(Span),
    /// Literal pattern
    Value(ValueNode),
}

impl PatternNode {
    pub fn span(&self) -> Span {
        match self {
            PatternNode::Variant(node) => node.span,
            PatternNode::Catchall(span) => *span,
            PatternNode::Value(node) => node.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VariantPatternNode {
    pub name: Token,
    pub args: Vec<PatternNode>,
    pub span: Span,
}
