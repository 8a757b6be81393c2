//! Programmatic construction of a resolved [`Compilation`].
//!
//! Each node helper records the fact the resolver would have produced for
//! it, so emitter tests and embedders can describe programs without a
//! parser.

use csz_common::Span;

use crate::facts::{FactKind, SemanticFact};
use crate::members::{MemberData, MemberId, MemberKind};
use crate::model::{Compilation, FieldDecl, MethodBody, SourceId, TypeDeclaration};
use crate::nodes::{
    Argument, AssignOp, BinaryOp, ConstValue, Expr, LambdaParam, NodeId, NodeKind, Stmt, UnaryOp,
};
use crate::types::{KnownType, TypeData, TypeId};

pub struct CompilationBuilder {
    compilation: Compilation,
    source: SourceId,
    cursor: u32,
}

impl Default for CompilationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilationBuilder {
    pub fn new() -> Self {
        Self::with_source("Program.cs", "")
    }

    pub fn with_source(name: &str, text: &str) -> Self {
        let mut compilation = Compilation::new();
        let source = compilation.add_source(name, text);
        Self {
            compilation,
            source,
            cursor: 0,
        }
    }

    pub fn finish(self) -> Compilation {
        self.compilation
    }

    pub fn compilation(&self) -> &Compilation {
        &self.compilation
    }

    // =========================================================================
    // Types and members
    // =========================================================================

    pub fn known(&self, known: KnownType) -> TypeId {
        self.compilation.types.known(known)
    }

    pub fn add_type(&mut self, data: TypeData) -> TypeId {
        self.compilation.add_type(data)
    }

    /// Register a generic definition and its type parameters.
    pub fn add_generic_type(&mut self, data: TypeData) -> (TypeId, Vec<TypeId>) {
        let id = self.compilation.add_type(data);
        let params = self.compilation.types.add_type_parameters(id);
        (id, params)
    }

    pub fn construct(&mut self, definition: TypeId, args: Vec<TypeId>) -> TypeId {
        self.compilation.types.construct(definition, args)
    }

    pub fn array_of(&mut self, element: TypeId) -> TypeId {
        self.compilation.types.array_of(element, 1)
    }

    pub fn nullable_of(&mut self, underlying: TypeId) -> TypeId {
        self.compilation.types.nullable_of(underlying)
    }

    pub fn type_mut(&mut self, id: TypeId) -> &mut TypeData {
        self.compilation.types.get_mut(id)
    }

    pub fn add_member(&mut self, data: MemberData) -> MemberId {
        self.compilation.add_member(data)
    }

    pub fn member_mut(&mut self, id: MemberId) -> &mut MemberData {
        self.compilation.members.get_mut(id)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// The declaration of `ty`, created on first use.
    pub fn declaration_mut(&mut self, ty: TypeId) -> &mut TypeDeclaration {
        let source = self.source;
        let decls = &mut self.compilation.declarations;
        let index = match decls.iter().position(|d| d.ty == ty) {
            Some(index) => index,
            None => {
                decls.push(TypeDeclaration::new(ty, source));
                decls.len() - 1
            }
        };
        &mut decls[index]
    }

    pub fn add_method_body(&mut self, member: MemberId, body: NodeId) {
        let data = self.compilation.members.get(member);
        let owner = data.declaring_type;
        let parameters = data.parameters.iter().map(|p| p.name.clone()).collect();
        let is_ctor = data.kind == MemberKind::Constructor;
        let method = MethodBody {
            member,
            parameters,
            body: Some(body),
        };
        let decl = self.declaration_mut(owner);
        if is_ctor {
            decl.constructors.push(method);
        } else {
            decl.methods.push(method);
        }
    }

    pub fn add_field_decl(&mut self, member: MemberId, init: Option<NodeId>) {
        let owner = self.compilation.members.get(member).declaring_type;
        self.declaration_mut(owner)
            .fields
            .push(FieldDecl { member, init });
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Place the next node at byte offset `offset`.
    pub fn at(&mut self, offset: u32) -> &mut Self {
        self.cursor = offset;
        self
    }

    fn node(&mut self, kind: NodeKind, fact: Option<SemanticFact>) -> NodeId {
        let span = Span::new(self.cursor, self.cursor + 1);
        self.cursor += 1;
        let id = self.compilation.nodes.add(kind, span);
        if let Some(fact) = fact {
            self.compilation.set_fact(id, fact);
        }
        id
    }

    fn expr(&mut self, expr: Expr, fact: SemanticFact) -> NodeId {
        self.node(NodeKind::Expr(expr), Some(fact))
    }

    fn stmt(&mut self, stmt: Stmt) -> NodeId {
        self.node(NodeKind::Stmt(stmt), None)
    }

    pub fn fact_mut(&mut self, node: NodeId) -> &mut SemanticFact {
        self.compilation.facts.entry(node).or_default()
    }

    fn type_of(&self, node: NodeId) -> Option<TypeId> {
        self.compilation.facts.get(&node).and_then(|f| f.ty)
    }

    pub fn literal(&mut self, value: ConstValue, ty: TypeId) -> NodeId {
        let fact = SemanticFact::new(FactKind::Constant)
            .with_type(ty)
            .with_constant(value.clone());
        self.expr(Expr::Literal(value), fact)
    }

    pub fn int(&mut self, value: i64) -> NodeId {
        let ty = self.known(KnownType::Int32);
        self.literal(ConstValue::Int(value), ty)
    }

    pub fn string(&mut self, value: &str) -> NodeId {
        let ty = self.known(KnownType::String);
        self.literal(ConstValue::String(value.to_string()), ty)
    }

    pub fn boolean(&mut self, value: bool) -> NodeId {
        let ty = self.known(KnownType::Boolean);
        self.literal(ConstValue::Bool(value), ty)
    }

    pub fn null(&mut self) -> NodeId {
        let ty = self.known(KnownType::Object);
        self.literal(ConstValue::Null, ty)
    }

    pub fn local(&mut self, name: &str, ty: TypeId) -> NodeId {
        let fact = SemanticFact::new(FactKind::LocalVariable).with_type(ty);
        self.expr(Expr::Name(name.to_string()), fact)
    }

    pub fn this(&mut self, ty: TypeId) -> NodeId {
        self.expr(Expr::This, SemanticFact::new(FactKind::ThisRead).with_type(ty))
    }

    pub fn base(&mut self, ty: TypeId) -> NodeId {
        self.expr(Expr::Base, SemanticFact::new(FactKind::ThisRead).with_type(ty))
    }

    pub fn type_name(&mut self, ty: TypeId) -> NodeId {
        let name = self.compilation.types.get(ty).name.clone();
        self.expr(
            Expr::Name(name),
            SemanticFact::new(FactKind::TypeName).with_type(ty),
        )
    }

    /// `target.Member` for a field, property or method group.
    pub fn member(&mut self, target: NodeId, member: MemberId) -> NodeId {
        let data = self.compilation.members.get(member);
        let name = data.name.clone();
        let mut fact = SemanticFact::new(FactKind::MemberAccess).with_member(member);
        fact.ty = data.return_type;
        self.expr(Expr::MemberAccess { target, name }, fact)
    }

    /// Bare `Member` resolved through implicit `this` (or the enclosing type for statics).
    pub fn implicit_member(&mut self, member: MemberId) -> NodeId {
        let data = self.compilation.members.get(member);
        let name = data.name.clone();
        let mut fact = SemanticFact::new(FactKind::MemberAccess).with_member(member);
        fact.ty = data.return_type;
        fact.implicit_this = !data.is_static;
        self.expr(Expr::Name(name), fact)
    }

    /// `receiver.Method(args)`.
    pub fn call(&mut self, receiver: NodeId, member: MemberId, args: Vec<NodeId>) -> NodeId {
        let target = self.member(receiver, member);
        self.invoke(target, member, args.into_iter().map(Argument::positional).collect())
    }

    /// `DeclaringType.Method(args)` for a static member.
    pub fn call_static(&mut self, member: MemberId, args: Vec<NodeId>) -> NodeId {
        let owner = self.compilation.members.get(member).declaring_type;
        let receiver = self.type_name(owner);
        self.call(receiver, member, args)
    }

    /// Invocation of an already-built callee expression.
    pub fn invoke(&mut self, target: NodeId, member: MemberId, args: Vec<Argument>) -> NodeId {
        let mut fact = SemanticFact::new(FactKind::Invocation).with_member(member);
        fact.ty = self.compilation.members.get(member).return_type;
        self.expr(Expr::Invocation { target, args }, fact)
    }

    /// Invocation of a delegate-typed value.
    pub fn invoke_delegate(&mut self, target: NodeId, args: Vec<NodeId>, ty: TypeId) -> NodeId {
        let fact = SemanticFact::new(FactKind::Invocation).with_type(ty);
        let args = args.into_iter().map(Argument::positional).collect();
        self.expr(Expr::Invocation { target, args }, fact)
    }

    /// Dynamic invocation resolved at compile time against `candidates`.
    pub fn dynamic_call(
        &mut self,
        receiver: NodeId,
        name: &str,
        candidates: Vec<MemberId>,
        args: Vec<NodeId>,
    ) -> NodeId {
        let dynamic = self.compilation.types.dynamic();
        let target = self.expr(
            Expr::MemberAccess {
                target: receiver,
                name: name.to_string(),
            },
            SemanticFact::new(FactKind::MemberAccess).with_type(dynamic),
        );
        let mut fact = SemanticFact::new(FactKind::DynamicInvocation).with_type(dynamic);
        fact.candidates = candidates;
        let args = args.into_iter().map(Argument::positional).collect();
        self.expr(Expr::Invocation { target, args }, fact)
    }

    /// `target[args]`; `indexer` is `None` for native array access.
    pub fn element(
        &mut self,
        target: NodeId,
        args: Vec<NodeId>,
        indexer: Option<MemberId>,
        ty: TypeId,
    ) -> NodeId {
        let fact = match indexer {
            Some(member) => SemanticFact::new(FactKind::MemberAccess)
                .with_member(member)
                .with_type(ty),
            None => SemanticFact::new(FactKind::ArrayAccess).with_type(ty),
        };
        self.expr(Expr::ElementAccess { target, args }, fact)
    }

    pub fn assign(&mut self, target: NodeId, value: NodeId) -> NodeId {
        self.assignment(AssignOp::Assign, target, value)
    }

    pub fn compound(&mut self, op: BinaryOp, target: NodeId, value: NodeId) -> NodeId {
        self.assignment(AssignOp::Compound(op), target, value)
    }

    fn assignment(&mut self, op: AssignOp, target: NodeId, value: NodeId) -> NodeId {
        let mut fact = SemanticFact::new(FactKind::Operator);
        fact.ty = self.type_of(target);
        self.expr(Expr::Assignment { op, target, value }, fact)
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId, ty: TypeId) -> NodeId {
        let fact = SemanticFact::new(FactKind::Operator).with_type(ty);
        self.expr(Expr::Binary { op, left, right }, fact)
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        let mut fact = SemanticFact::new(FactKind::Operator);
        fact.ty = self.type_of(operand);
        self.expr(Expr::Unary { op, operand }, fact)
    }

    pub fn conditional(
        &mut self,
        condition: NodeId,
        when_true: NodeId,
        when_false: NodeId,
        ty: TypeId,
    ) -> NodeId {
        self.expr(
            Expr::Conditional {
                condition,
                when_true,
                when_false,
            },
            SemanticFact::new(FactKind::None).with_type(ty),
        )
    }

    pub fn parenthesized(&mut self, inner: NodeId) -> NodeId {
        let mut fact = SemanticFact::new(FactKind::None);
        fact.ty = self.type_of(inner);
        self.expr(Expr::Parenthesized(inner), fact)
    }

    pub fn lambda(&mut self, params: &[(&str, TypeId)], body: NodeId, delegate: TypeId) -> NodeId {
        let params = params
            .iter()
            .map(|(name, ty)| LambdaParam {
                name: (*name).to_string(),
                ty: Some(*ty),
            })
            .collect();
        self.expr(
            Expr::Lambda { params, body },
            SemanticFact::new(FactKind::Lambda).with_type(delegate),
        )
    }

    pub fn anonymous(&mut self, ty: TypeId, initializers: Vec<(&str, NodeId)>) -> NodeId {
        let initializers = initializers
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        self.expr(
            Expr::AnonymousObject { initializers },
            SemanticFact::new(FactKind::None).with_type(ty),
        )
    }

    pub fn new_object(&mut self, ty: TypeId, ctor: Option<MemberId>, args: Vec<NodeId>) -> NodeId {
        let mut fact = SemanticFact::new(FactKind::Invocation).with_type(ty);
        fact.member = ctor;
        let args = args.into_iter().map(Argument::positional).collect();
        self.expr(Expr::ObjectCreation { args }, fact)
    }

    pub fn type_of_expr(&mut self, ty: TypeId) -> NodeId {
        let system_type = self.known(KnownType::Type);
        self.expr(
            Expr::TypeOf(ty),
            SemanticFact::new(FactKind::TypeName).with_type(system_type),
        )
    }

    pub fn cast(&mut self, operand: NodeId, ty: TypeId) -> NodeId {
        self.expr(
            Expr::Cast { operand, ty },
            SemanticFact::new(FactKind::None).with_type(ty),
        )
    }

    pub fn is_type(&mut self, operand: NodeId, ty: TypeId) -> NodeId {
        let boolean = self.known(KnownType::Boolean);
        self.expr(
            Expr::Is { operand, ty },
            SemanticFact::new(FactKind::None).with_type(boolean),
        )
    }

    pub fn as_type(&mut self, operand: NodeId, ty: TypeId) -> NodeId {
        self.expr(
            Expr::As { operand, ty },
            SemanticFact::new(FactKind::None).with_type(ty),
        )
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn expr_stmt(&mut self, expr: NodeId) -> NodeId {
        self.stmt(Stmt::Expression(expr))
    }

    pub fn ret(&mut self, value: Option<NodeId>) -> NodeId {
        self.stmt(Stmt::Return(value))
    }

    pub fn var_decl(&mut self, name: &str, ty: TypeId, init: Option<NodeId>) -> NodeId {
        self.stmt(Stmt::VarDecl {
            name: name.to_string(),
            ty,
            init,
        })
    }

    pub fn block(&mut self, stmts: Vec<NodeId>) -> NodeId {
        self.stmt(Stmt::Block(stmts))
    }

    pub fn if_stmt(
        &mut self,
        condition: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    ) -> NodeId {
        self.stmt(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }
}

#[cfg(test)]
#[path = "../tests/builder.rs"]
mod tests;
