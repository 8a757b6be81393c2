//! csz: a type-directed C#-to-JavaScript emitter and the runtime type model
//! its output runs against.
//!
//! This crate ties the workspace together:
//!
//! - [`common`], [`semantic`], [`runtime`] and [`emitter`] re-export the
//!   member crates
//! - [`compile`] emits a resolved compilation and collects the metadata
//!   records the runtime registry ingests
//! - [`config`] loads [`EmitterOptions`] from a JSON project file
//! - [`tracing_config`] installs the tracing subscriber on request

use anyhow::{Context, Result, anyhow};
use tracing::info;

pub use csz_common as common;
pub use csz_emitter as emitter;
pub use csz_runtime as runtime;
pub use csz_semantic as semantic;

pub use csz_emitter::{EmittedProgram, EmittedUnit, EmitterOptions, ProgramEmitter};
pub use csz_runtime::{TypeHandle, TypeMetadata, TypeRegistry};
pub use csz_semantic::{Compilation, CompilationBuilder, SemanticModel};

pub mod config;
pub mod tracing_config;

/// Result of compiling one model.
#[derive(Clone, Debug, Default)]
pub struct CompileOutput {
    pub program: EmittedProgram,
    /// Metadata for every emitted type, in declaration order.
    pub metadata: Vec<TypeMetadata>,
}

impl CompileOutput {
    /// Load the collected metadata into `registry` as one batch.
    pub fn register(&self, registry: &TypeRegistry) -> Result<Vec<TypeHandle>> {
        registry
            .load(&self.metadata)
            .context("failed to register emitted type metadata")
    }
}

/// Emit `model` and collect its type metadata.
///
/// An emission failure is reported with its located diagnostic text when
/// the source file is known to the model.
pub fn compile(model: &dyn SemanticModel, options: &EmitterOptions) -> Result<CompileOutput> {
    let program = csz_emitter::emit_program(model, options).map_err(|failure| {
        match failure.diagnostic(model) {
            Some(diagnostic) => anyhow!(
                "{}: error CSZ{}: {}",
                diagnostic.file,
                diagnostic.code,
                diagnostic.message_text
            ),
            None => anyhow!(failure),
        }
    })?;
    let metadata = collect_metadata(model, options);
    info!(
        units = program.units.len(),
        types = metadata.len(),
        "compilation finished"
    );
    Ok(CompileOutput { program, metadata })
}

/// Metadata records for the declared types that produce a definition.
///
/// External types and types bound to a global name have no runtime record.
pub fn collect_metadata(model: &dyn SemanticModel, options: &EmitterOptions) -> Vec<TypeMetadata> {
    let mut printer = csz_emitter::Printer::new(model, options);
    let types = model.types();
    model
        .declarations()
        .iter()
        .filter(|decl| {
            let attributes = &types.get(decl.ty).attributes;
            !attributes.external && attributes.global_name.is_none()
        })
        .map(|decl| printer.type_metadata(decl.ty))
        .collect()
}
