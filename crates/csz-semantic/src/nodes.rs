//! Typed AST arena.
//!
//! Nodes are immutable once built and addressed by [`NodeId`]. The emitter
//! never mutates the tree; per-node semantics come from the resolver's
//! [`SemanticFact`](crate::SemanticFact).

use csz_common::Span;

use crate::types::TypeId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Compile-time constant value.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Decimal literal kept in its source spelling.
    Decimal(String),
    Char(char),
    String(String),
}

impl ConstValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => i64::try_from(*v).ok(),
            Self::Char(c) => Some(*c as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LogicalAnd,
    LogicalOr,
    Coalesce,
}

impl BinaryOp {
    pub const ALL: [Self; 19] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Rem,
        Self::Shl,
        Self::Shr,
        Self::BitAnd,
        Self::BitOr,
        Self::BitXor,
        Self::Eq,
        Self::Ne,
        Self::Lt,
        Self::Le,
        Self::Gt,
        Self::Ge,
        Self::LogicalAnd,
        Self::LogicalOr,
        Self::Coalesce,
    ];

    /// Target-language operator token.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Eq => "===",
            Self::Ne => "!==",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
            Self::Coalesce => "??",
        }
    }

    /// Runtime helper method name used by emulated arithmetic.
    pub const fn helper_name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Rem => "mod",
            Self::Shl => "shl",
            Self::Shr => "shr",
            Self::BitAnd => "band",
            Self::BitOr => "bor",
            Self::BitXor => "xor",
            Self::Eq => "eq",
            Self::Ne => "neq",
            Self::Lt => "lt",
            Self::Le => "lte",
            Self::Gt => "gt",
            Self::Ge => "gte",
            Self::LogicalAnd => "and",
            Self::LogicalOr => "or",
            Self::Coalesce => "coalesce",
        }
    }

    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge
        )
    }

    pub const fn is_logical(self) -> bool {
        matches!(self, Self::LogicalAnd | Self::LogicalOr | Self::Coalesce)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Compound(BinaryOp),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOp {
    pub const fn is_increment_or_decrement(self) -> bool {
        matches!(
            self,
            Self::PreIncrement | Self::PreDecrement | Self::PostIncrement | Self::PostDecrement
        )
    }

    pub const fn is_postfix(self) -> bool {
        matches!(self, Self::PostIncrement | Self::PostDecrement)
    }

    pub const fn is_increment(self) -> bool {
        matches!(self, Self::PreIncrement | Self::PostIncrement)
    }

    pub const fn token(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Not => "!",
            Self::BitNot => "~",
            Self::PreIncrement | Self::PostIncrement => "++",
            Self::PreDecrement | Self::PostDecrement => "--",
        }
    }
}

/// Call argument, optionally named.
#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    pub name: Option<String>,
    pub value: NodeId,
}

impl Argument {
    pub fn positional(value: NodeId) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: NodeId) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LambdaParam {
    pub name: String,
    pub ty: Option<TypeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(ConstValue),
    /// Simple name: local, parameter, implicit-this member or type.
    Name(String),
    This,
    Base,
    MemberAccess {
        target: NodeId,
        name: String,
    },
    Invocation {
        target: NodeId,
        args: Vec<Argument>,
    },
    ElementAccess {
        target: NodeId,
        args: Vec<NodeId>,
    },
    Assignment {
        op: AssignOp,
        target: NodeId,
        value: NodeId,
    },
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Conditional {
        condition: NodeId,
        when_true: NodeId,
        when_false: NodeId,
    },
    /// Lambda or anonymous method; `body` is an expression or a block statement.
    Lambda {
        params: Vec<LambdaParam>,
        body: NodeId,
    },
    AnonymousObject {
        initializers: Vec<(String, NodeId)>,
    },
    ObjectCreation {
        args: Vec<Argument>,
    },
    TypeOf(TypeId),
    Cast {
        operand: NodeId,
        ty: TypeId,
    },
    Is {
        operand: NodeId,
        ty: TypeId,
    },
    As {
        operand: NodeId,
        ty: TypeId,
    },
    Parenthesized(NodeId),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Expression(NodeId),
    Return(Option<NodeId>),
    VarDecl {
        name: String,
        ty: TypeId,
        init: Option<NodeId>,
    },
    Block(Vec<NodeId>),
    If {
        condition: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Expr(Expr),
    Stmt(Stmt),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { kind, span });
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn expr(&self, id: NodeId) -> Option<&Expr> {
        match &self.get(id)?.kind {
            NodeKind::Expr(expr) => Some(expr),
            NodeKind::Stmt(_) => None,
        }
    }

    pub fn stmt(&self, id: NodeId) -> Option<&Stmt> {
        match &self.get(id)?.kind {
            NodeKind::Stmt(stmt) => Some(stmt),
            NodeKind::Expr(_) => None,
        }
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.get(id).map_or(Span::DUMMY, |n| n.span)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Visit the direct children of `id` in source order.
    pub fn for_each_child(&self, id: NodeId, mut f: impl FnMut(NodeId)) {
        let Some(node) = self.get(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Expr(expr) => match expr {
                Expr::Literal(_)
                | Expr::Name(_)
                | Expr::This
                | Expr::Base
                | Expr::TypeOf(_) => {}
                Expr::MemberAccess { target, .. } => f(*target),
                Expr::Invocation { target, args } => {
                    f(*target);
                    args.iter().for_each(|a| f(a.value));
                }
                Expr::ElementAccess { target, args } => {
                    f(*target);
                    args.iter().for_each(|&a| f(a));
                }
                Expr::Assignment { target, value, .. } => {
                    f(*target);
                    f(*value);
                }
                Expr::Binary { left, right, .. } => {
                    f(*left);
                    f(*right);
                }
                Expr::Unary { operand, .. }
                | Expr::Cast { operand, .. }
                | Expr::Is { operand, .. }
                | Expr::As { operand, .. }
                | Expr::Parenthesized(operand) => f(*operand),
                Expr::Conditional {
                    condition,
                    when_true,
                    when_false,
                } => {
                    f(*condition);
                    f(*when_true);
                    f(*when_false);
                }
                Expr::Lambda { body, .. } => f(*body),
                Expr::AnonymousObject { initializers } => {
                    initializers.iter().for_each(|(_, v)| f(*v));
                }
                Expr::ObjectCreation { args } => args.iter().for_each(|a| f(a.value)),
            },
            NodeKind::Stmt(stmt) => match stmt {
                Stmt::Expression(expr) => f(*expr),
                Stmt::Return(value) => {
                    if let Some(value) = value {
                        f(*value);
                    }
                }
                Stmt::VarDecl { init, .. } => {
                    if let Some(init) = init {
                        f(*init);
                    }
                }
                Stmt::Block(stmts) => stmts.iter().for_each(|&s| f(s)),
                Stmt::If {
                    condition,
                    then_branch,
                    else_branch,
                } => {
                    f(*condition);
                    f(*then_branch);
                    if let Some(else_branch) = else_branch {
                        f(*else_branch);
                    }
                }
            },
        }
    }
}
