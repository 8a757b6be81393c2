//! Per-method pool of temporary variables.
//!
//! Temporaries are named `$t0`, `$t1`, ... and reused once released. Every
//! name ever handed out is declared once at the top of the enclosing
//! function body.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

#[derive(Debug, Default)]
pub struct TempVarPool {
    /// Name to in-use flag, in allocation order.
    names: IndexMap<String, bool>,
    /// Names owned by enclosing functions that this pool must not shadow.
    reserved: FxHashSet<String>,
    counter: u32,
}

impl TempVarPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool for a nested function body; it never reuses an enclosing name.
    pub fn nested(&self) -> Self {
        let mut reserved = self.reserved.clone();
        reserved.extend(self.names.keys().cloned());
        Self {
            names: IndexMap::new(),
            reserved,
            counter: 0,
        }
    }

    /// First released name, or a fresh one.
    pub fn get_temp_var_name(&mut self) -> String {
        if let Some((name, in_use)) = self.names.iter_mut().find(|(_, in_use)| !**in_use) {
            *in_use = true;
            return name.clone();
        }
        loop {
            let name = format!("$t{}", self.counter);
            self.counter += 1;
            if !self.reserved.contains(&name) {
                self.names.insert(name.clone(), true);
                return name;
            }
        }
    }

    /// Release `name` for reuse. Unknown names are ignored.
    pub fn remove_temp_var(&mut self, name: &str) {
        if let Some(in_use) = self.names.get_mut(name) {
            *in_use = false;
        }
    }

    pub fn in_use(&self, name: &str) -> bool {
        self.names.get(name).copied().unwrap_or(false)
    }

    /// Every name allocated so far, in allocation order.
    pub fn declared_names(&self) -> Vec<String> {
        self.names.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/temp_vars.rs"]
mod tests;
