//! Project configuration.
//!
//! A project file is JSON with comments and trailing commas allowed:
//!
//! ```json
//! {
//!     "extends": "./base.json",
//!     "emitter": { "target": "es2015", "hoistLambdas": "false" }
//! }
//! ```
//!
//! Boolean options also accept string spellings (`"true"`, `"yes"`, `"1"`).
//! Options missing from a file are inherited from the file it extends and
//! finally from [`EmitterOptions::default`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use csz_emitter::{EmitterOptions, NewLine, Target};
use serde::{Deserialize, Deserializer};
use tracing::debug;

fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{s}'. Expected true, false, 'true', or 'false'"
            ))),
        },
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub emitter: Option<EmitterSection>,
}

/// The `emitter` section as written; every field is optional.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmitterSection {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub indent_size: Option<usize>,
    #[serde(default)]
    pub new_line: Option<String>,
    #[serde(default)]
    pub runtime_namespace: Option<String>,
    #[serde(default)]
    pub assembly_alias: Option<String>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub hoist_lambdas: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub emit_metadata: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub anonymous_type_metadata: Option<bool>,
    #[serde(default)]
    pub defined_symbols: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub qualify_cross_module_names: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub omit_trailing_semicolon: Option<bool>,
}

pub fn parse_project_config(source: &str) -> Result<ProjectConfig> {
    let normalized = remove_trailing_commas(&strip_comments(source));
    serde_json::from_str(&normalized).context("failed to parse project JSON")
}

/// Read `path` and every file it extends, nearest settings winning.
pub fn load_project_config(path: &Path) -> Result<ProjectConfig> {
    let mut visited = HashSet::new();
    load_project_config_inner(path, &mut visited)
}

fn load_project_config_inner(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<ProjectConfig> {
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical.clone()) {
        bail!("project extends cycle detected at {}", canonical.display());
    }

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read project file: {}", path.display()))?;
    let mut config = parse_project_config(&source)
        .with_context(|| format!("failed to parse project file: {}", path.display()))?;

    if let Some(extends) = config.extends.take() {
        let base_dir = path
            .parent()
            .ok_or_else(|| anyhow!("project file has no parent directory"))?;
        let mut base_path = PathBuf::from(extends);
        if base_path.extension().is_none() {
            base_path.set_extension("json");
        }
        let base_path = if base_path.is_absolute() {
            base_path
        } else {
            base_dir.join(base_path)
        };
        debug!(base = %base_path.display(), "loading extended project file");
        let base = load_project_config_inner(&base_path, visited)?;
        config.emitter = match (base.emitter, config.emitter) {
            (Some(base), Some(child)) => Some(merge_sections(base, child)),
            (base, child) => child.or(base),
        };
    }

    visited.remove(&canonical);
    Ok(config)
}

fn merge_sections(base: EmitterSection, child: EmitterSection) -> EmitterSection {
    EmitterSection {
        target: child.target.or(base.target),
        indent_size: child.indent_size.or(base.indent_size),
        new_line: child.new_line.or(base.new_line),
        runtime_namespace: child.runtime_namespace.or(base.runtime_namespace),
        assembly_alias: child.assembly_alias.or(base.assembly_alias),
        hoist_lambdas: child.hoist_lambdas.or(base.hoist_lambdas),
        emit_metadata: child.emit_metadata.or(base.emit_metadata),
        anonymous_type_metadata: child
            .anonymous_type_metadata
            .or(base.anonymous_type_metadata),
        defined_symbols: child.defined_symbols.or(base.defined_symbols),
        qualify_cross_module_names: child
            .qualify_cross_module_names
            .or(base.qualify_cross_module_names),
        omit_trailing_semicolon: child
            .omit_trailing_semicolon
            .or(base.omit_trailing_semicolon),
    }
}

/// Apply a parsed section over the default options.
pub fn resolve_emitter_options(section: Option<&EmitterSection>) -> Result<EmitterOptions> {
    let mut options = EmitterOptions::default();
    let Some(section) = section else {
        return Ok(options);
    };

    if let Some(target) = section.target.as_deref() {
        options.target = parse_target(target)?;
    }
    if let Some(new_line) = section.new_line.as_deref() {
        options.new_line = parse_new_line(new_line)?;
    }
    if let Some(indent_size) = section.indent_size {
        options.indent_size = indent_size;
    }
    if let Some(namespace) = &section.runtime_namespace {
        if namespace.is_empty() {
            bail!("emitter.runtimeNamespace must not be empty");
        }
        options.runtime_namespace = namespace.clone();
    }
    if let Some(alias) = &section.assembly_alias {
        if alias.is_empty() {
            bail!("emitter.assemblyAlias must not be empty");
        }
        options.assembly_alias = alias.clone();
    }
    if let Some(symbols) = &section.defined_symbols {
        options.defined_symbols = symbols.clone();
    }
    options.hoist_lambdas = section.hoist_lambdas.unwrap_or(options.hoist_lambdas);
    options.emit_metadata = section.emit_metadata.unwrap_or(options.emit_metadata);
    options.anonymous_type_metadata = section
        .anonymous_type_metadata
        .unwrap_or(options.anonymous_type_metadata);
    options.qualify_cross_module_names = section
        .qualify_cross_module_names
        .unwrap_or(options.qualify_cross_module_names);
    options.omit_trailing_semicolon = section
        .omit_trailing_semicolon
        .unwrap_or(options.omit_trailing_semicolon);
    Ok(options)
}

/// Load a project file and resolve its emitter options.
pub fn load_options(path: &Path) -> Result<EmitterOptions> {
    let config = load_project_config(path)?;
    resolve_emitter_options(config.emitter.as_ref())
        .with_context(|| format!("invalid emitter options in {}", path.display()))
}

fn parse_target(value: &str) -> Result<Target> {
    match normalize_option(value).as_str() {
        "es5" => Ok(Target::Es5),
        "es6" | "es2015" => Ok(Target::Es2015),
        _ => bail!("unsupported emitter.target '{}'", value),
    }
}

fn parse_new_line(value: &str) -> Result<NewLine> {
    match normalize_option(value).as_str() {
        "lf" => Ok(NewLine::Lf),
        "crlf" => Ok(NewLine::Crlf),
        _ => bail!("unsupported emitter.newLine '{}'", value),
    }
}

fn normalize_option(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !matches!(ch, '-' | '_') && !ch.is_whitespace())
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

/// Remove `//` and `/* */` comments outside string literals.
///
/// Newlines inside comments are kept so parse errors report the right line.
fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match (ch, chars.peek().copied()) {
            ('"', _) => {
                in_string = true;
                out.push(ch);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    previous = next;
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

fn remove_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == ',' {
            let mut lookahead = chars.clone();
            while lookahead.peek().is_some_and(|c| c.is_whitespace()) {
                lookahead.next();
            }
            if matches!(lookahead.peek(), Some('}' | ']')) {
                continue;
            }
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
