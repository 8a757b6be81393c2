//! Whole-program emission: one output unit per target file.

use csz_common::Diagnostic;
use csz_semantic::{SemanticModel, SourceId};
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::emitter::Printer;
use crate::error::EmitError;
use crate::interceptor::EmitInterceptor;
use crate::options::EmitterOptions;

/// Emitted text of one output file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmittedUnit {
    pub file_name: String,
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmittedProgram {
    pub units: Vec<EmittedUnit>,
}

impl EmittedProgram {
    pub fn unit(&self, file_name: &str) -> Option<&EmittedUnit> {
        self.units.iter().find(|u| u.file_name == file_name)
    }
}

/// A hard emission error together with the source it occurred in.
#[derive(Debug)]
pub struct EmitFailure {
    pub error: EmitError,
    pub source: SourceId,
}

impl EmitFailure {
    /// Located diagnostic, when the source is known to the model.
    pub fn diagnostic(&self, model: &dyn SemanticModel) -> Option<Diagnostic> {
        let source = model.source(self.source)?;
        Some(self.error.to_diagnostic(&source.line_map, &source.name))
    }
}

impl std::fmt::Display for EmitFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.error, f)
    }
}

impl std::error::Error for EmitFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

pub struct ProgramEmitter<'a> {
    model: &'a dyn SemanticModel,
    options: &'a EmitterOptions,
    interceptors: Vec<Box<dyn EmitInterceptor + 'a>>,
}

impl<'a> ProgramEmitter<'a> {
    pub fn new(model: &'a dyn SemanticModel, options: &'a EmitterOptions) -> Self {
        Self {
            model,
            options,
            interceptors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_interceptor(mut self, interceptor: impl EmitInterceptor + 'a) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    /// Emit every declared type, grouping definitions by output file.
    ///
    /// Stops at the first error; no partial output is returned.
    #[tracing::instrument(level = "debug", skip_all, fields(types = self.model.declarations().len()))]
    pub fn emit(self) -> Result<EmittedProgram, EmitFailure> {
        let mut printer = Printer::new(self.model, self.options);
        for interceptor in self.interceptors {
            printer.add_interceptor(interceptor);
        }

        let types = self.model.types();
        let new_line = self.options.new_line.as_str();
        let mut units: IndexMap<String, String> = IndexMap::new();
        for decl in self.model.declarations() {
            let file_name = match printer.bridges().find(types, decl.ty) {
                Some(id) => printer.bridges().get(id).file_name.clone(),
                None => "output.js".to_string(),
            };
            printer.emit_type(decl).map_err(|error| EmitFailure {
                error,
                source: decl.source,
            })?;
            let text = printer.take_output();
            if text.is_empty() {
                continue;
            }
            debug!(%file_name, bytes = text.len(), "type emitted");
            let unit = units.entry(file_name).or_default();
            if !unit.is_empty() {
                unit.push_str(new_line);
            }
            unit.push_str(&text);
        }

        info!(units = units.len(), "program emitted");
        Ok(EmittedProgram {
            units: units
                .into_iter()
                .map(|(file_name, text)| EmittedUnit { file_name, text })
                .collect(),
        })
    }
}

/// Emit `model` with `options` and no interceptors.
pub fn emit_program(
    model: &dyn SemanticModel,
    options: &EmitterOptions,
) -> Result<EmittedProgram, EmitFailure> {
    ProgramEmitter::new(model, options).emit()
}

#[cfg(test)]
#[path = "../tests/program.rs"]
mod tests;
