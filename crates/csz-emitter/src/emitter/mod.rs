//! The expression and statement printer.
//!
//! `Printer` walks resolved nodes once and streams JavaScript into an
//! [`OutputStack`]. The implementation is split across submodules by
//! construct, each adding methods to the same struct:
//!
//! - `helpers`: output, temporaries, purity and literal helpers
//! - `names`: type and member naming
//! - `templates`: inline template application
//! - `invocation`: calls, object creation, element access
//! - `assignment`: assignments, compound assignments, increments
//! - `operators`: binary/unary operators, casts, literals
//! - `lambdas`: closures and hoisting
//! - `anonymous`: anonymous object types
//! - `statements`: statements and method bodies
//! - `declarations`: type definitions and metadata

use csz_common::limits::MAX_EMIT_DEPTH;
use csz_semantic::{Expr, NodeId, SemanticModel, TypeId};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::bridge::{BridgeId, BridgeTypes};
use crate::error::{EmitError, EmitResult};
use crate::interceptor::{EmitInterceptor, Interception};
use crate::locals::LocalsScope;
use crate::options::EmitterOptions;
use crate::output::OutputStack;
use crate::temp_vars::TempVarPool;

mod anonymous;
mod assignment;
mod declarations;
mod helpers;
mod invocation;
mod lambdas;
mod names;
mod operators;
mod statements;
mod templates;

pub use anonymous::AnonymousShape;
pub use names::NameOptions;

pub struct Printer<'a> {
    pub(crate) model: &'a dyn SemanticModel,
    pub(crate) options: &'a EmitterOptions,
    pub(crate) out: OutputStack,

    // Per-function state
    pub(crate) temps: TempVarPool,
    pub(crate) locals: LocalsScope,
    /// Temporaries released when the current statement ends.
    pub(crate) statement_temps: Vec<String>,
    /// `tmp` template tags to temporary names, cleared per statement.
    pub(crate) template_tmps: FxHashMap<String, String>,
    /// Expression of the statement being emitted; its value is discarded.
    pub(crate) statement_expr: Option<NodeId>,
    /// The last expression emitted nothing (interceptor cancel or removed call).
    pub(crate) suppressed: bool,
    depth: u32,

    // Per-type state
    pub(crate) current_type: Option<TypeId>,
    pub(crate) current_bridge: Option<BridgeId>,
    /// Hoisted lambda body text to its function name.
    pub(crate) hoisted: IndexMap<String, String>,

    // Program-wide state
    pub(crate) bridges: BridgeTypes,
    pub(crate) name_cache: FxHashMap<(TypeId, NameOptions, Option<String>), String>,
    pub(crate) anonymous: IndexMap<Vec<(String, TypeId)>, AnonymousShape>,
    interceptors: Vec<Box<dyn EmitInterceptor + 'a>>,
}

impl<'a> Printer<'a> {
    pub fn new(model: &'a dyn SemanticModel, options: &'a EmitterOptions) -> Self {
        Self {
            model,
            options,
            out: OutputStack::new(options),
            temps: TempVarPool::new(),
            locals: LocalsScope::new(),
            statement_temps: Vec::new(),
            template_tmps: FxHashMap::default(),
            statement_expr: None,
            suppressed: false,
            depth: 0,
            current_type: None,
            current_bridge: None,
            hoisted: IndexMap::new(),
            bridges: BridgeTypes::from_model(model),
            name_cache: FxHashMap::default(),
            anonymous: IndexMap::new(),
            interceptors: Vec::new(),
        }
    }

    pub fn add_interceptor(&mut self, interceptor: Box<dyn EmitInterceptor + 'a>) {
        self.interceptors.push(interceptor);
    }

    pub fn bridges(&self) -> &BridgeTypes {
        &self.bridges
    }

    /// Take everything written to the root buffer so far.
    pub fn take_output(&mut self) -> String {
        self.out.take()
    }

    /// Emit `node` into a private buffer and return the text.
    pub fn expression_text(&mut self, node: NodeId) -> EmitResult<String> {
        self.capture(|p| p.emit_expression(node))
    }

    /// Run `f` with output redirected into a fresh buffer.
    ///
    /// The frame is popped on every path, so an error inside `f` never
    /// leaves the writer stack unbalanced.
    pub(crate) fn capture<F>(&mut self, f: F) -> EmitResult<String>
    where
        F: FnOnce(&mut Self) -> EmitResult<()>,
    {
        self.out.push_writer(None, None, None, None);
        let result = f(self);
        let text = self.out.pop_writer(true);
        result.map(|()| text)
    }

    // =========================================================================
    // Expression dispatch
    // =========================================================================

    /// Emit one expression.
    ///
    /// Decision order: interceptors, then inline templates (inside the
    /// construct-specific lowering), then structural lowering.
    pub fn emit_expression(&mut self, node: NodeId) -> EmitResult<()> {
        self.depth += 1;
        let result = if self.depth > MAX_EMIT_DEPTH {
            Err(EmitError::EmitDepthExceeded {
                node,
                span: self.span(node),
                limit: MAX_EMIT_DEPTH,
            })
        } else {
            self.emit_expression_inner(node)
        };
        self.depth -= 1;
        result
    }

    fn emit_expression_inner(&mut self, node: NodeId) -> EmitResult<()> {
        for interceptor in &self.interceptors {
            match interceptor.intercept(self.model, node) {
                Interception::Continue => {}
                Interception::Cancel => {
                    trace!(?node, "emission cancelled by interceptor");
                    self.suppressed = true;
                    return Ok(());
                }
                Interception::Replace(text) => {
                    self.out.write(&text);
                    return Ok(());
                }
            }
        }

        let Some(expr) = self.model.nodes().expr(node) else {
            return Ok(());
        };
        match expr {
            Expr::Literal(_) => self.emit_literal(node),
            Expr::Name(name) => self.emit_name(node, name),
            Expr::This => {
                self.out.write("this");
                Ok(())
            }
            Expr::Base => {
                self.out.write("this");
                Ok(())
            }
            Expr::MemberAccess { target, name } => self.emit_member_access(node, *target, name),
            Expr::Invocation { target, args } => self.emit_invocation(node, *target, args),
            Expr::ElementAccess { target, args } => {
                self.emit_element_access(node, *target, args)
            }
            Expr::Assignment { op, target, value } => {
                self.emit_assignment(node, *op, *target, *value)
            }
            Expr::Binary { op, left, right } => self.emit_binary(node, *op, *left, *right),
            Expr::Unary { op, operand } => self.emit_unary(node, *op, *operand),
            Expr::Conditional {
                condition,
                when_true,
                when_false,
            } => self.emit_conditional(*condition, *when_true, *when_false),
            Expr::Lambda { params, body } => self.emit_lambda(node, params, *body),
            Expr::AnonymousObject { initializers } => {
                self.emit_anonymous_object(node, initializers)
            }
            Expr::ObjectCreation { args } => self.emit_object_creation(node, args),
            Expr::TypeOf(ty) => self.emit_type_of(*ty),
            Expr::Cast { operand, ty } => self.emit_type_check(node, "cast", *operand, *ty),
            Expr::Is { operand, ty } => self.emit_type_check(node, "is", *operand, *ty),
            Expr::As { operand, ty } => self.emit_type_check(node, "as", *operand, *ty),
            Expr::Parenthesized(inner) => {
                let inner = self.expression_text(*inner)?;
                self.out.write("(");
                self.out.write(&inner);
                self.out.write(")");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/printer.rs"]
mod tests;
