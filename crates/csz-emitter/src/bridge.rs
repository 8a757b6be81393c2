//! BridgeType registry: emission identity and module placement of every
//! declared type.

use csz_semantic::{SemanticModel, TypeDeclaration, TypeId, TypeArena};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeType {
    /// Full definition name, e.g. `Demo.Outer.Inner`.
    pub key: String,
    pub ty: TypeId,
    pub module: Option<String>,
    pub file_name: String,
    /// Keys of types this one depends on, in discovery order.
    pub dependencies: IndexSet<String>,
}

/// Index of a [`BridgeType`] inside its registry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BridgeId(pub u32);

#[derive(Debug, Default)]
pub struct BridgeTypes {
    entries: Vec<BridgeType>,
    by_key: IndexMap<String, BridgeId>,
    by_type: FxHashMap<TypeId, BridgeId>,
}

/// Dotted definition name without generic arity, used as the registry key.
pub fn definition_key(types: &TypeArena, ty: TypeId) -> String {
    let data = types.get(types.definition_of(ty));
    match data.declaring_type {
        Some(parent) => format!("{}.{}", definition_key(types, parent), data.name),
        None if data.namespace.is_empty() => data.name.clone(),
        None => format!("{}.{}", data.namespace, data.name),
    }
}

impl BridgeTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every declaration of `model`.
    pub fn from_model(model: &dyn SemanticModel) -> Self {
        let mut bridges = Self::new();
        for decl in model.declarations() {
            bridges.register(model, decl);
        }
        bridges
    }

    pub fn register(&mut self, model: &dyn SemanticModel, decl: &TypeDeclaration) -> BridgeId {
        if let Some(&id) = self.by_type.get(&decl.ty) {
            return id;
        }
        let types = model.types();
        let data = types.get(decl.ty);
        let module = data.attributes.module.clone();
        let file_name = match (&data.attributes.file_name, &module) {
            (Some(file), _) => file.clone(),
            (None, Some(module)) => format!("{module}.js"),
            (None, None) => model.source(decl.source).map_or_else(
                || "output.js".to_string(),
                |source| match source.name.strip_suffix(".cs") {
                    Some(stem) => format!("{stem}.js"),
                    None => format!("{}.js", source.name),
                },
            ),
        };
        let key = definition_key(types, decl.ty);
        let id = BridgeId(self.entries.len() as u32);
        self.entries.push(BridgeType {
            key: key.clone(),
            ty: decl.ty,
            module,
            file_name,
            dependencies: IndexSet::new(),
        });
        self.by_key.insert(key, id);
        self.by_type.insert(decl.ty, id);
        id
    }

    pub fn get(&self, id: BridgeId) -> &BridgeType {
        &self.entries[id.0 as usize]
    }

    /// BridgeType of `ty`'s definition, if it is declared in this compilation.
    pub fn find(&self, types: &TypeArena, ty: TypeId) -> Option<BridgeId> {
        self.by_type.get(&types.definition_of(ty)).copied()
    }

    pub fn by_key(&self, key: &str) -> Option<BridgeId> {
        self.by_key.get(key).copied()
    }

    pub fn add_dependency(&mut self, from: BridgeId, key: &str) {
        let entry = &mut self.entries[from.0 as usize];
        if entry.key != key {
            entry.dependencies.insert(key.to_string());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (BridgeId, &BridgeType)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (BridgeId(i as u32), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/bridge.rs"]
mod tests;
