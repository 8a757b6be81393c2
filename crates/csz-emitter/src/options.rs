//! Emitter configuration.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Es5,
    Es2015,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewLine {
    #[default]
    Lf,
    Crlf,
}

impl NewLine {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmitterOptions {
    pub target: Target,
    pub indent_size: usize,
    pub new_line: NewLine,
    /// Global object holding the runtime helpers (`Csz.cast`, `Csz.define`, ...).
    pub runtime_namespace: String,
    /// Alias of the per-assembly object holding hoisted lambdas and anonymous types.
    pub assembly_alias: String,
    /// Share capture-free lambdas as named functions per type.
    pub hoist_lambdas: bool,
    pub emit_metadata: bool,
    /// Emit metadata for anonymous types as well.
    pub anonymous_type_metadata: bool,
    /// Active conditional-compilation symbols.
    pub defined_symbols: Vec<String>,
    /// Prefix names of types from other output modules with the module name.
    pub qualify_cross_module_names: bool,
    pub omit_trailing_semicolon: bool,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self {
            target: Target::Es5,
            indent_size: 4,
            new_line: NewLine::Lf,
            runtime_namespace: "Csz".to_string(),
            assembly_alias: "$asm".to_string(),
            hoist_lambdas: true,
            emit_metadata: true,
            anonymous_type_metadata: false,
            defined_symbols: Vec::new(),
            qualify_cross_module_names: false,
            omit_trailing_semicolon: false,
        }
    }
}

impl EmitterOptions {
    pub fn es2015() -> Self {
        Self {
            target: Target::Es2015,
            ..Self::default()
        }
    }

    pub const fn is_es5(&self) -> bool {
        matches!(self.target, Target::Es5)
    }

    pub fn is_symbol_defined(&self, symbol: &str) -> bool {
        self.defined_symbols.iter().any(|s| s == symbol)
    }
}
