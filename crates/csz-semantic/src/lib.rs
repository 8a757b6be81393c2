//! Front-end model consumed by the csz emitter.
//!
//! The parser and semantic resolver are external to csz. This crate fixes the
//! interface the emitter consumes from them:
//!
//! - [`types`]: semantic types addressed by [`TypeId`] handles
//! - [`members`]: methods, properties, fields, operators and indexers
//! - [`nodes`]: the typed AST arena ([`NodeId`], [`Expr`], [`Stmt`])
//! - [`facts`]: the per-node [`SemanticFact`] returned by `resolve`
//! - [`model`]: the [`SemanticModel`] oracle trait and the in-memory [`Compilation`]
//! - [`builder`]: a [`CompilationBuilder`] for embedders and tests

pub mod builder;
pub mod facts;
pub mod members;
pub mod model;
pub mod nodes;
pub mod types;

pub use builder::CompilationBuilder;
pub use facts::{FactKind, SemanticFact};
pub use members::{MemberArena, MemberAttributes, MemberData, MemberId, MemberKind, Parameter};
pub use model::{
    Compilation, FieldDecl, MethodBody, SemanticModel, SourceFile, SourceId, TypeDeclaration,
};
pub use nodes::{
    Argument, AssignOp, BinaryOp, ConstValue, Expr, LambdaParam, Node, NodeArena, NodeId,
    NodeKind, Stmt, UnaryOp,
};
pub use types::{
    KnownType, TypeArena, TypeAttributes, TypeData, TypeId, TypeKind, TypeParameter, Variance,
};
