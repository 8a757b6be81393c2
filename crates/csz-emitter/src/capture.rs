//! Capture analysis for lambdas and anonymous methods.
//!
//! A lambda that captures nothing (no outer local, no outer type parameter,
//! no `this`) can be emitted once as a shared, hoisted function.

use csz_common::limits::MAX_CAPTURE_DEPTH;
use csz_semantic::{Expr, FactKind, NodeId, SemanticModel, Stmt, TypeId};
use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use tracing::trace;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptureInfo {
    /// Outer locals referenced by the body, in first-use order.
    pub locals: IndexSet<String>,
    pub uses_this: bool,
    /// Open type parameters referenced by the body.
    pub type_parameters: Vec<TypeId>,
    /// The walk stopped at the depth limit; the result is conservative.
    pub truncated: bool,
}

impl CaptureInfo {
    pub fn is_capture_free(&self) -> bool {
        self.locals.is_empty()
            && !self.uses_this
            && self.type_parameters.is_empty()
            && !self.truncated
    }
}

pub struct CaptureAnalyzer<'m> {
    model: &'m dyn SemanticModel,
    declared: FxHashSet<String>,
    info: CaptureInfo,
}

impl<'m> CaptureAnalyzer<'m> {
    pub fn new(model: &'m dyn SemanticModel) -> Self {
        Self {
            model,
            declared: FxHashSet::default(),
            info: CaptureInfo::default(),
        }
    }

    /// Analyze the lambda expression `lambda`.
    pub fn analyze(mut self, lambda: NodeId) -> CaptureInfo {
        self.collect_declarations(lambda, 0);
        self.visit(lambda, 0);
        trace!(
            ?lambda,
            locals = self.info.locals.len(),
            uses_this = self.info.uses_this,
            type_parameters = self.info.type_parameters.len(),
            "capture analysis"
        );
        self.info
    }

    /// Names introduced inside the lambda: its parameters, nested lambda
    /// parameters and variable declarations.
    fn collect_declarations(&mut self, node: NodeId, depth: u32) {
        if depth > MAX_CAPTURE_DEPTH {
            return;
        }
        let nodes = self.model.nodes();
        if let Some(Expr::Lambda { params, .. }) = nodes.expr(node) {
            self.declared.extend(params.iter().map(|p| p.name.clone()));
        }
        if let Some(Stmt::VarDecl { name, .. }) = nodes.stmt(node) {
            self.declared.insert(name.clone());
        }
        let mut children = Vec::new();
        nodes.for_each_child(node, |child| children.push(child));
        for child in children {
            self.collect_declarations(child, depth + 1);
        }
    }

    fn visit(&mut self, node: NodeId, depth: u32) {
        if depth > MAX_CAPTURE_DEPTH {
            self.info.truncated = true;
            return;
        }
        let model = self.model;
        let nodes = model.nodes();
        let fact = model.resolve(node);

        if fact.implicit_this {
            self.info.uses_this = true;
        }
        if let Some(ty) = fact.ty {
            self.note_type(ty);
        }
        for &arg in &fact.type_arguments {
            self.note_type(arg);
        }

        if let Some(expr) = nodes.expr(node) {
            match expr {
                Expr::This | Expr::Base => self.info.uses_this = true,
                Expr::Name(name) => {
                    if fact.kind == FactKind::LocalVariable && !self.declared.contains(name) {
                        self.info.locals.insert(name.clone());
                    }
                }
                Expr::TypeOf(ty)
                | Expr::Cast { ty, .. }
                | Expr::Is { ty, .. }
                | Expr::As { ty, .. } => self.note_type(*ty),
                Expr::Lambda { params, .. } => {
                    for ty in params.iter().filter_map(|p| p.ty) {
                        self.note_type(ty);
                    }
                }
                _ => {}
            }
        }
        if let Some(Stmt::VarDecl { ty, .. }) = nodes.stmt(node) {
            self.note_type(*ty);
        }

        let mut children = Vec::new();
        nodes.for_each_child(node, |child| children.push(child));
        for child in children {
            self.visit(child, depth + 1);
        }
    }

    fn note_type(&mut self, ty: TypeId) {
        let types = self.model.types();
        let mut found = Vec::new();
        types.collect_type_parameters(ty, &mut found);
        for param in found {
            if !self.info.type_parameters.contains(&param) {
                self.info.type_parameters.push(param);
            }
        }
    }
}

/// Convenience wrapper around [`CaptureAnalyzer`].
pub fn analyze_captures(model: &dyn SemanticModel, lambda: NodeId) -> CaptureInfo {
    CaptureAnalyzer::new(model).analyze(lambda)
}

#[cfg(test)]
#[path = "../tests/capture.rs"]
mod tests;
