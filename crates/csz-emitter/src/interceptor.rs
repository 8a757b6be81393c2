//! Hooks that can override the emission of individual nodes.

use csz_semantic::{NodeId, SemanticModel};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Interception {
    /// Emit the node normally.
    Continue,
    /// Emit nothing, including the statement terminator.
    Cancel,
    /// Emit the given text verbatim.
    Replace(String),
}

pub trait EmitInterceptor {
    fn intercept(&self, model: &dyn SemanticModel, node: NodeId) -> Interception;
}

impl<F> EmitInterceptor for F
where
    F: Fn(&dyn SemanticModel, NodeId) -> Interception,
{
    fn intercept(&self, model: &dyn SemanticModel, node: NodeId) -> Interception {
        self(model, node)
    }
}
