//! Node builders.
//!
//! The grammar cannot construct AST nodes directly: a node's location is
//! only known once its last token has been consumed. Each node therefore
//! has a small builder with one setter per field; a [`BuilderParser`]
//! threads parsed sub-values into the setters and finalizes the node with
//! the wrapped source span. The builders are generated by the
//! `node_builder!` / `expr_builder!` macros (the latter for nodes carrying
//! a [`NodeId`]).

use homc_lex::Token;
use homc_util::{Span, Symbol};

use crate::ast::*;
use crate::combinator::NodeBuilder;

macro_rules! node_builder {
    ($builder:ident => $node:ident { $($field:ident: $ty:ty),+ $(,)? }) => {
        #[derive(Default)]
        pub struct $builder {
            $($field: Option<$ty>),+
        }

        impl $builder {
            $(
                pub fn $field(builder: &mut Self, value: $ty) {
                    builder.$field = Some(value);
                }
            )+
        }

        impl NodeBuilder for $builder {
            type Output = $node;

            fn finish(self, span: Span, _id: NodeId) -> Option<$node> {
                Some($node {
                    $($field: self.$field?,)+
                    span,
                })
            }
        }
    };
}

macro_rules! expr_builder {
    ($builder:ident => $node:ident { $($field:ident: $ty:ty),+ $(,)? }) => {
        #[derive(Default)]
        pub struct $builder {
            $($field: Option<$ty>),+
        }

        impl $builder {
            $(
                pub fn $field(builder: &mut Self, value: $ty) {
                    builder.$field = Some(value);
                }
            )+
        }

        impl NodeBuilder for $builder {
            type Output = $node;

            fn finish(self, span: Span, id: NodeId) -> Option<$node> {
                Some($node {
                    $($field: self.$field?,)+
                    id,
                    span,
                })
            }
        }
    };
}

node_builder!(DisBuilder => DisNode {
    name: Token,
    generics: GenericParams,
    variants: Vec<DisVariantNode>,
});

node_builder!(GenericParamsBuilder => GenericParams {
    params: Vec<Token>,
});

node_builder!(DisVariantBuilder => DisVariantNode {
    name: Token,
    args: Vec<ArgNode>,
});

node_builder!(ArgBuilder => ArgNode {
    name: Token,
    ty: TypeNode,
});

node_builder!(FunBuilder => FunNode {
    name: Token,
    generics: GenericParams,
    args: Vec<ArgNode>,
    ret: Option<TypeNode>,
    body: BlockNode,
});

node_builder!(DisTypeBuilder => DisTypeNode {
    name: Token,
    generics: Vec<TypeNode>,
});

node_builder!(FunctionTypeArgsBuilder => FunctionTypeArgsNode {
    parts: Vec<TypeNode>,
});

node_builder!(BlockBuilder => BlockNode {
    statements: Vec<StmtNode>,
});

node_builder!(RetBuilder => RetNode {
    expr: Option<ExprNode>,
});

node_builder!(LetBuilder => LetNode {
    name: Token,
    value: ExprNode,
});

node_builder!(FitStmtBuilder => FitStmtNode {
    scrutinee: ExprNode,
    branches: Vec<FitStmtBranch>,
});

node_builder!(FitStmtBranchBuilder => FitStmtBranch {
    pattern: PatternNode,
    body: StmtNode,
});

node_builder!(FitExprBranchBuilder => FitExprBranch {
    pattern: PatternNode,
    body: ExprNode,
});

node_builder!(VariantPatternBuilder => VariantPatternNode {
    name: Token,
    args: Vec<PatternNode>,
});

expr_builder!(CtorBuilder => DisConstructorNode {
    name: Token,
    generics: Vec<TypeNode>,
    variant: Token,
});

expr_builder!(ValueBuilder => ValueNode {
    token: Token,
});

expr_builder!(VarBuilder => VarNode {
    name: Token,
});

expr_builder!(FunInstBuilder => FunInstNode {
    name: Token,
    generics: Vec<TypeNode>,
});

expr_builder!(TupleLikeBuilder => TupleLikeNode {
    parts: Vec<ExprNode>,
});

expr_builder!(FitExprBuilder => FitExprNode {
    scrutinee: ExprNode,
    branches: Vec<FitExprBranch>,
});

/// Builder for `wrt` statements; cooks the raw string token into its
/// unescaped content.
#[derive(Default)]
pub struct WriteBuilder {
    token: Option<Token>,
}

impl WriteBuilder {
    pub fn token(builder: &mut Self, value: Token) {
        builder.token = Some(value);
    }
}

impl NodeBuilder for WriteBuilder {
    type Output = WriteNode;

    fn finish(self, span: Span, _id: NodeId) -> Option<WriteNode> {
        let token = self.token?;
        Some(WriteNode {
            value: cook_string_literal(token.text),
            span,
        })
    }
}

/// Strip the surrounding quotes and resolve escape sequences.
///
/// A literal with an unresolvable escape is kept verbatim; the lexer has
/// already guaranteed the quotes are present.
pub(crate) fn cook_string_literal(text: Symbol) -> String {
    let raw = text.as_str();
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    unescape::unescape(inner).unwrap_or_else(|| inner.to_string())
}
