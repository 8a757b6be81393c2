//! Local variable naming for one method body.

use rustc_hash::{FxHashMap, FxHashSet};

const RESERVED_WORDS: &[&str] = &[
    "arguments",
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "yield",
];

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Maps source local names to emitted names.
///
/// `var` has function scope, so names declared in sibling blocks of one
/// method must not collide; a block scope restores the visible mapping but
/// keeps the method-wide `used` set.
#[derive(Debug, Default)]
pub struct LocalsScope {
    names: FxHashMap<String, String>,
    used: FxHashSet<String>,
    snapshots: Vec<FxHashMap<String, String>>,
}

impl LocalsScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a method body with `parameters` in scope.
    pub fn build_locals_map(&mut self, parameters: &[String]) -> Vec<String> {
        self.clear_locals_map();
        parameters.iter().map(|p| self.declare(p)).collect()
    }

    pub fn clear_locals_map(&mut self) {
        self.names.clear();
        self.used.clear();
        self.snapshots.clear();
    }

    /// Declare `name` and return the emitted identifier.
    pub fn declare(&mut self, name: &str) -> String {
        let base = if is_reserved_word(name) {
            format!("${name}")
        } else {
            name.to_string()
        };
        let mut emitted = base.clone();
        let mut suffix = 1;
        while self.used.contains(&emitted) {
            emitted = format!("{base}${suffix}");
            suffix += 1;
        }
        self.used.insert(emitted.clone());
        self.names.insert(name.to_string(), emitted.clone());
        emitted
    }

    /// Emitted name of `name`; unknown names pass through unchanged.
    pub fn resolve(&self, name: &str) -> String {
        self.names.get(name).cloned().unwrap_or_else(|| name.to_string())
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn enter_block(&mut self) {
        self.snapshots.push(self.names.clone());
    }

    pub fn exit_block(&mut self) {
        if let Some(names) = self.snapshots.pop() {
            self.names = names;
        }
    }

    /// Swap in an empty scope for a nested function, returning the outer one.
    pub fn enter_function(&mut self) -> Self {
        let outer = std::mem::take(self);
        // Captured locals keep their outer spelling.
        self.names = outer.names.clone();
        self.used = outer.used.clone();
        outer
    }

    pub fn exit_function(&mut self, outer: Self) {
        *self = outer;
    }
}

#[cfg(test)]
#[path = "../tests/locals.rs"]
mod tests;
