//! Type records and the registry that owns them.
//!
//! Every runtime type is a [`TypeRecord`] addressed by a [`TypeHandle`].
//! Generic instances and array types are memoized by structural key
//! (definition plus ordered argument handles), so handle equality is
//! runtime type identity. The registry is shared across threads; records
//! are immutable once published and their derived sets (base type,
//! interfaces) are computed lazily on first use.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use csz_common::limits::INLINE_GENERIC_ARGS;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::attributes::Attribute;
use crate::error::ReflectionError;
use crate::metadata::{MemberKind, RuntimeTypeKind, TypeMetadata, TypeRefMetadata, Variance};
use crate::value::Invoker;

/// Handle of a runtime type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeHandle(pub u32);

impl TypeHandle {
    pub const OBJECT: Self = Self(0);
    pub const VALUE_TYPE: Self = Self(1);
    pub const STRING: Self = Self(2);
    pub const BOOLEAN: Self = Self(3);
    pub const CHAR: Self = Self(4);
    pub const SBYTE: Self = Self(5);
    pub const BYTE: Self = Self(6);
    pub const INT16: Self = Self(7);
    pub const UINT16: Self = Self(8);
    pub const INT32: Self = Self(9);
    pub const UINT32: Self = Self(10);
    pub const INT64: Self = Self(11);
    pub const UINT64: Self = Self(12);
    pub const SINGLE: Self = Self(13);
    pub const DOUBLE: Self = Self(14);
    pub const DECIMAL: Self = Self(15);
    pub const ARRAY: Self = Self(16);
    pub const DELEGATE: Self = Self(17);
    pub const TYPE: Self = Self(18);
    /// `System.Nullable$1` generic definition.
    pub const NULLABLE: Self = Self(19);
    const NULLABLE_T: Self = Self(20);

    pub const FIRST_USER: u32 = 21;
}

type Arguments = SmallVec<[TypeHandle; INLINE_GENERIC_ARGS]>;

/// Resolved form of [`TypeRefMetadata`]: names are replaced by handles,
/// parameter positions stay symbolic until instantiated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TypeRef {
    Handle(TypeHandle),
    Param(usize),
    Generic(TypeHandle, Vec<TypeRef>),
    Array(Box<TypeRef>, u32),
}

#[derive(Clone, Debug)]
pub(crate) struct MemberDef {
    pub name: String,
    pub kind: MemberKind,
    pub is_static: bool,
    pub is_public: bool,
    pub parameters: Vec<TypeRef>,
    pub return_type: Option<TypeRef>,
    pub explicit_interface: Option<TypeRef>,
    pub attributes: Vec<Attribute>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericParameter {
    pub name: String,
    pub variance: Variance,
    pub handle: TypeHandle,
}

#[derive(Hash, PartialEq, Eq)]
enum InstanceKey {
    Generic(TypeHandle, Arguments),
    Array(TypeHandle, u32),
}

#[derive(Debug)]
pub struct TypeRecord {
    pub handle: TypeHandle,
    /// Alias-form full name, e.g. `Demo.G$2(System.Int32, System.String)`.
    pub name: String,
    pub kind: RuntimeTypeKind,
    pub sealed: bool,
    /// Type parameters, for generic definitions.
    pub generic_parameters: Vec<GenericParameter>,
    /// Generic definition, for generic instances.
    pub definition: Option<TypeHandle>,
    pub arguments: Arguments,
    /// Element type and rank, for arrays.
    pub element: Option<(TypeHandle, u32)>,
    /// Owner and position, for generic parameters.
    pub parameter_of: Option<(TypeHandle, usize)>,
    pub attributes: Vec<Attribute>,
    pub(crate) base_ref: Option<TypeRef>,
    pub(crate) interface_refs: Vec<TypeRef>,
    pub(crate) members: Vec<MemberDef>,
    base: OnceCell<Option<TypeHandle>>,
    interfaces: OnceCell<Arc<[TypeHandle]>>,
    all_interfaces: OnceCell<Arc<[TypeHandle]>>,
}

impl TypeRecord {
    fn new(handle: TypeHandle, name: String, kind: RuntimeTypeKind) -> Self {
        Self {
            handle,
            name,
            kind,
            sealed: false,
            generic_parameters: Vec::new(),
            definition: None,
            arguments: SmallVec::new(),
            element: None,
            parameter_of: None,
            attributes: Vec::new(),
            base_ref: None,
            interface_refs: Vec::new(),
            members: Vec::new(),
            base: OnceCell::new(),
            interfaces: OnceCell::new(),
            all_interfaces: OnceCell::new(),
        }
    }

    pub fn is_generic_definition(&self) -> bool {
        !self.generic_parameters.is_empty()
    }

    pub fn is_value_type(&self) -> bool {
        self.kind.is_value_type()
    }
}

/// Thread-safe registry of runtime types.
pub struct TypeRegistry {
    records: DashMap<TypeHandle, Arc<TypeRecord>>,
    by_name: DashMap<String, TypeHandle>,
    instances: DashMap<InstanceKey, TypeHandle>,
    pub(crate) invokers: DashMap<(TypeHandle, usize), Invoker>,
    next_id: AtomicU32,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

const BUILTINS: [(TypeHandle, &str, RuntimeTypeKind, Option<TypeHandle>); 19] = [
    (TypeHandle::OBJECT, "System.Object", RuntimeTypeKind::Class, None),
    (TypeHandle::VALUE_TYPE, "System.ValueType", RuntimeTypeKind::Class, Some(TypeHandle::OBJECT)),
    (TypeHandle::STRING, "System.String", RuntimeTypeKind::Class, Some(TypeHandle::OBJECT)),
    (TypeHandle::BOOLEAN, "System.Boolean", RuntimeTypeKind::Struct, Some(TypeHandle::VALUE_TYPE)),
    (TypeHandle::CHAR, "System.Char", RuntimeTypeKind::Struct, Some(TypeHandle::VALUE_TYPE)),
    (TypeHandle::SBYTE, "System.SByte", RuntimeTypeKind::Struct, Some(TypeHandle::VALUE_TYPE)),
    (TypeHandle::BYTE, "System.Byte", RuntimeTypeKind::Struct, Some(TypeHandle::VALUE_TYPE)),
    (TypeHandle::INT16, "System.Int16", RuntimeTypeKind::Struct, Some(TypeHandle::VALUE_TYPE)),
    (TypeHandle::UINT16, "System.UInt16", RuntimeTypeKind::Struct, Some(TypeHandle::VALUE_TYPE)),
    (TypeHandle::INT32, "System.Int32", RuntimeTypeKind::Struct, Some(TypeHandle::VALUE_TYPE)),
    (TypeHandle::UINT32, "System.UInt32", RuntimeTypeKind::Struct, Some(TypeHandle::VALUE_TYPE)),
    (TypeHandle::INT64, "System.Int64", RuntimeTypeKind::Struct, Some(TypeHandle::VALUE_TYPE)),
    (TypeHandle::UINT64, "System.UInt64", RuntimeTypeKind::Struct, Some(TypeHandle::VALUE_TYPE)),
    (TypeHandle::SINGLE, "System.Single", RuntimeTypeKind::Struct, Some(TypeHandle::VALUE_TYPE)),
    (TypeHandle::DOUBLE, "System.Double", RuntimeTypeKind::Struct, Some(TypeHandle::VALUE_TYPE)),
    (TypeHandle::DECIMAL, "System.Decimal", RuntimeTypeKind::Struct, Some(TypeHandle::VALUE_TYPE)),
    (TypeHandle::ARRAY, "System.Array", RuntimeTypeKind::Class, Some(TypeHandle::OBJECT)),
    (TypeHandle::DELEGATE, "System.Delegate", RuntimeTypeKind::Class, Some(TypeHandle::OBJECT)),
    (TypeHandle::TYPE, "System.Type", RuntimeTypeKind::Class, Some(TypeHandle::OBJECT)),
];

impl TypeRegistry {
    /// Create a registry pre-populated with the `System` primitives.
    pub fn new() -> Self {
        let registry = Self {
            records: DashMap::new(),
            by_name: DashMap::new(),
            instances: DashMap::new(),
            invokers: DashMap::new(),
            next_id: AtomicU32::new(TypeHandle::FIRST_USER),
        };
        for (handle, name, kind, base) in BUILTINS {
            let mut record = TypeRecord::new(handle, name.to_string(), kind);
            record.sealed = kind.is_value_type() || handle == TypeHandle::STRING;
            record.base_ref = base.map(TypeRef::Handle);
            registry.publish(record);
        }

        let mut nullable = TypeRecord::new(
            TypeHandle::NULLABLE,
            "System.Nullable$1".to_string(),
            RuntimeTypeKind::Struct,
        );
        nullable.sealed = true;
        nullable.base_ref = Some(TypeRef::Handle(TypeHandle::VALUE_TYPE));
        nullable.generic_parameters.push(GenericParameter {
            name: "T".to_string(),
            variance: Variance::Invariant,
            handle: TypeHandle::NULLABLE_T,
        });
        let mut param = TypeRecord::new(
            TypeHandle::NULLABLE_T,
            "T".to_string(),
            RuntimeTypeKind::GenericParameter,
        );
        param.parameter_of = Some((TypeHandle::NULLABLE, 0));
        registry.publish(nullable);
        registry.records.insert(param.handle, Arc::new(param));
        registry
    }

    fn allocate(&self) -> TypeHandle {
        TypeHandle(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn publish(&self, record: TypeRecord) {
        self.by_name.insert(record.name.clone(), record.handle);
        self.records.insert(record.handle, Arc::new(record));
    }

    pub fn get(&self, handle: TypeHandle) -> Option<Arc<TypeRecord>> {
        self.records.get(&handle).map(|r| r.value().clone())
    }

    /// Record for a handle this registry issued.
    ///
    /// # Panics
    /// Panics on a handle from another registry.
    pub(crate) fn record(&self, handle: TypeHandle) -> Arc<TypeRecord> {
        self.get(handle)
            .unwrap_or_else(|| panic!("type handle {handle:?} was not issued by this registry"))
    }

    pub fn lookup(&self, name: &str) -> Option<TypeHandle> {
        self.by_name.get(name).map(|h| *h)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn type_name(&self, handle: TypeHandle) -> String {
        self.record(handle).name.clone()
    }

    pub fn kind(&self, handle: TypeHandle) -> RuntimeTypeKind {
        self.record(handle).kind
    }

    pub fn is_value_type(&self, handle: TypeHandle) -> bool {
        self.record(handle).is_value_type()
    }

    pub fn generic_definition(&self, handle: TypeHandle) -> Option<TypeHandle> {
        self.record(handle).definition
    }

    pub fn generic_arguments(&self, handle: TypeHandle) -> Vec<TypeHandle> {
        self.record(handle).arguments.to_vec()
    }

    pub fn element_type(&self, handle: TypeHandle) -> Option<TypeHandle> {
        self.record(handle).element.map(|(element, _)| element)
    }

    pub(crate) fn definition_or_self(&self, handle: TypeHandle) -> TypeHandle {
        self.record(handle).definition.unwrap_or(handle)
    }

    /// Generic instance of `definition` applied to `arguments`.
    ///
    /// Structurally equal requests return the same handle, including when
    /// raced from several threads.
    pub fn make_generic(
        &self,
        definition: TypeHandle,
        arguments: &[TypeHandle],
    ) -> Result<TypeHandle, ReflectionError> {
        let def = self.get(definition).ok_or_else(|| {
            ReflectionError::TypeNotFound(format!("handle #{}", definition.0))
        })?;
        if def.generic_parameters.len() != arguments.len() {
            return Err(ReflectionError::GenericArityMismatch {
                type_name: def.name.clone(),
                expected: def.generic_parameters.len(),
                actual: arguments.len(),
            });
        }
        Ok(self.intern_generic(&def, arguments))
    }

    fn intern_generic(&self, def: &TypeRecord, arguments: &[TypeHandle]) -> TypeHandle {
        let key = InstanceKey::Generic(def.handle, SmallVec::from_slice(arguments));
        if let Some(existing) = self.instances.get(&key) {
            return *existing;
        }

        let names: Vec<String> = arguments.iter().map(|&a| self.type_name(a)).collect();
        let name = format!("{}({})", def.name, names.join(", "));
        let handle = *self.instances.entry(key).or_insert_with(|| {
            let handle = self.allocate();
            trace!(handle = handle.0, name = %name, "TypeRegistry::intern_generic");
            let mut record = TypeRecord::new(handle, name.clone(), def.kind);
            record.sealed = def.sealed;
            record.definition = Some(def.handle);
            record.arguments = SmallVec::from_slice(arguments);
            self.records.insert(handle, Arc::new(record));
            handle
        });
        handle
    }

    /// Array of `element` with the given rank (at least one).
    pub fn make_array(&self, element: TypeHandle, rank: u32) -> TypeHandle {
        let rank = rank.max(1);
        let key = InstanceKey::Array(element, rank);
        if let Some(existing) = self.instances.get(&key) {
            return *existing;
        }

        let element_name = self.type_name(element);
        let name = if rank == 1 {
            format!("Array({element_name})")
        } else {
            format!("Array({element_name}, {rank})")
        };
        let handle = *self.instances.entry(key).or_insert_with(|| {
            let handle = self.allocate();
            let mut record = TypeRecord::new(handle, name.clone(), RuntimeTypeKind::Array);
            record.sealed = true;
            record.element = Some((element, rank));
            self.records.insert(handle, Arc::new(record));
            handle
        });
        handle
    }

    pub fn nullable_of(&self, underlying: TypeHandle) -> TypeHandle {
        let def = self.record(TypeHandle::NULLABLE);
        self.intern_generic(&def, &[underlying])
    }

    /// Register a single type definition.
    pub fn define(&self, metadata: &TypeMetadata) -> Result<TypeHandle, ReflectionError> {
        let handles = self.load(std::slice::from_ref(metadata))?;
        Ok(handles[0])
    }

    /// Register a batch of type definitions.
    ///
    /// Names are reserved before any reference is resolved, so blocks in the
    /// batch may refer to each other (and to themselves) in any order. On
    /// error nothing from the batch stays registered.
    pub fn load(&self, batch: &[TypeMetadata]) -> Result<Vec<TypeHandle>, ReflectionError> {
        let mut seen = FxHashSet::default();
        for meta in batch {
            if !seen.insert(meta.name.as_str()) || self.by_name.contains_key(&meta.name) {
                return Err(ReflectionError::DuplicateType(meta.name.clone()));
            }
        }

        let pending: FxHashMap<&str, (TypeHandle, usize)> = batch
            .iter()
            .map(|meta| {
                (
                    meta.name.as_str(),
                    (self.allocate(), meta.generic_parameters.len()),
                )
            })
            .collect();

        let mut records = Vec::with_capacity(batch.len());
        for meta in batch {
            let (handle, _) = pending[meta.name.as_str()];
            records.push(self.build_record(meta, handle, &pending)?);
        }

        let mut handles = Vec::with_capacity(records.len());
        for (record, params) in records {
            debug!(handle = record.handle.0, name = %record.name, "TypeRegistry::load");
            handles.push(record.handle);
            for param in params {
                self.records.insert(param.handle, Arc::new(param));
            }
            self.publish(record);
        }
        Ok(handles)
    }

    fn build_record(
        &self,
        meta: &TypeMetadata,
        handle: TypeHandle,
        pending: &FxHashMap<&str, (TypeHandle, usize)>,
    ) -> Result<(TypeRecord, Vec<TypeRecord>), ReflectionError> {
        let arity = meta.generic_parameters.len();
        let resolve = |r: &TypeRefMetadata| self.resolve_ref(r, pending, arity);

        let mut record = TypeRecord::new(handle, meta.name.clone(), meta.kind);
        record.sealed = meta.sealed || meta.kind.is_value_type();
        record.attributes = meta.attributes.clone();
        record.base_ref = match &meta.base {
            Some(base) => Some(resolve(base)?),
            None => default_base(meta.kind).map(TypeRef::Handle),
        };
        record.interface_refs = meta.interfaces.iter().map(resolve).collect::<Result<_, _>>()?;
        for member in &meta.members {
            record.members.push(MemberDef {
                name: member.name.clone(),
                kind: member.kind,
                is_static: member.is_static,
                is_public: member.is_public,
                parameters: member.parameters.iter().map(resolve).collect::<Result<_, _>>()?,
                return_type: member.return_type.as_ref().map(resolve).transpose()?,
                explicit_interface: member.explicit_interface.as_ref().map(resolve).transpose()?,
                attributes: member.attributes.clone(),
            });
        }

        let mut params = Vec::with_capacity(arity);
        for (position, param) in meta.generic_parameters.iter().enumerate() {
            let param_handle = self.allocate();
            record.generic_parameters.push(GenericParameter {
                name: param.name.clone(),
                variance: param.variance,
                handle: param_handle,
            });
            let mut param_record = TypeRecord::new(
                param_handle,
                param.name.clone(),
                RuntimeTypeKind::GenericParameter,
            );
            param_record.parameter_of = Some((handle, position));
            params.push(param_record);
        }
        Ok((record, params))
    }

    fn resolve_ref(
        &self,
        reference: &TypeRefMetadata,
        pending: &FxHashMap<&str, (TypeHandle, usize)>,
        arity: usize,
    ) -> Result<TypeRef, ReflectionError> {
        match reference {
            TypeRefMetadata::Named(name) => self
                .resolve_name(name, pending)
                .map(|(handle, _)| TypeRef::Handle(handle)),
            TypeRefMetadata::Param(position) if *position < arity => {
                Ok(TypeRef::Param(*position))
            }
            TypeRefMetadata::Param(position) => Err(ReflectionError::TypeNotFound(format!(
                "type parameter #{position}"
            ))),
            TypeRefMetadata::Generic {
                definition,
                arguments,
            } => {
                let (handle, expected) = self.resolve_name(definition, pending)?;
                if expected != arguments.len() {
                    return Err(ReflectionError::GenericArityMismatch {
                        type_name: definition.clone(),
                        expected,
                        actual: arguments.len(),
                    });
                }
                let arguments = arguments
                    .iter()
                    .map(|a| self.resolve_ref(a, pending, arity))
                    .collect::<Result<_, _>>()?;
                Ok(TypeRef::Generic(handle, arguments))
            }
            TypeRefMetadata::Array { element, rank } => Ok(TypeRef::Array(
                Box::new(self.resolve_ref(element, pending, arity)?),
                *rank,
            )),
        }
    }

    fn resolve_name(
        &self,
        name: &str,
        pending: &FxHashMap<&str, (TypeHandle, usize)>,
    ) -> Result<(TypeHandle, usize), ReflectionError> {
        if let Some(found) = pending.get(name) {
            return Ok(*found);
        }
        let handle = self
            .lookup(name)
            .ok_or_else(|| ReflectionError::TypeNotFound(name.to_string()))?;
        Ok((handle, self.record(handle).generic_parameters.len()))
    }

    /// Arguments that replace `TypeRef::Param` positions inside `record`'s
    /// definition: the instance arguments, or the definition's own
    /// parameter types when `record` is the open definition.
    pub(crate) fn substitution(&self, record: &TypeRecord) -> Arguments {
        if record.definition.is_some() {
            record.arguments.clone()
        } else {
            record.generic_parameters.iter().map(|p| p.handle).collect()
        }
    }

    pub(crate) fn instantiate(&self, reference: &TypeRef, arguments: &[TypeHandle]) -> TypeHandle {
        match reference {
            TypeRef::Handle(handle) => *handle,
            TypeRef::Param(position) => arguments
                .get(*position)
                .copied()
                .unwrap_or(TypeHandle::OBJECT),
            TypeRef::Generic(definition, inner) => {
                let resolved: Arguments = inner
                    .iter()
                    .map(|r| self.instantiate(r, arguments))
                    .collect();
                let def = self.record(*definition);
                self.intern_generic(&def, &resolved)
            }
            TypeRef::Array(element, rank) => {
                let element = self.instantiate(element, arguments);
                self.make_array(element, *rank)
            }
        }
    }

    /// Definition-level record plus the substitution for `handle`.
    pub(crate) fn shape(&self, handle: TypeHandle) -> (Arc<TypeRecord>, Arguments) {
        let record = self.record(handle);
        let arguments = self.substitution(&record);
        match record.definition {
            Some(definition) => (self.record(definition), arguments),
            None => (record, arguments),
        }
    }

    /// Direct base type. `None` only for `System.Object` and interfaces.
    pub fn base_type(&self, handle: TypeHandle) -> Option<TypeHandle> {
        let record = self.record(handle);
        *record.base.get_or_init(|| match record.kind {
            RuntimeTypeKind::Array => Some(TypeHandle::ARRAY),
            RuntimeTypeKind::GenericParameter => Some(TypeHandle::OBJECT),
            _ => {
                let (def, arguments) = self.shape(handle);
                def.base_ref
                    .as_ref()
                    .map(|base| self.instantiate(base, &arguments))
            }
        })
    }

    /// Interfaces listed directly on the type's declaration.
    pub fn interfaces(&self, handle: TypeHandle) -> Arc<[TypeHandle]> {
        let record = self.record(handle);
        Arc::clone(record.interfaces.get_or_init(|| {
            let (def, arguments) = self.shape(handle);
            def.interface_refs
                .iter()
                .map(|r| self.instantiate(r, &arguments))
                .collect()
        }))
    }

    /// Full transitive interface set: direct interfaces, the interfaces they
    /// extend, and everything implemented by base types.
    pub fn all_interfaces(&self, handle: TypeHandle) -> Arc<[TypeHandle]> {
        let record = self.record(handle);
        Arc::clone(record.all_interfaces.get_or_init(|| {
            let mut seen = FxHashSet::default();
            let mut result = Vec::new();
            for interface in self.interfaces(handle).iter() {
                if seen.insert(*interface) {
                    result.push(*interface);
                }
                for inherited in self.all_interfaces(*interface).iter() {
                    if seen.insert(*inherited) {
                        result.push(*inherited);
                    }
                }
            }
            if let Some(base) = self.base_type(handle) {
                for inherited in self.all_interfaces(base).iter() {
                    if seen.insert(*inherited) {
                        result.push(*inherited);
                    }
                }
            }
            result.into()
        }))
    }
}

const fn default_base(kind: RuntimeTypeKind) -> Option<TypeHandle> {
    match kind {
        RuntimeTypeKind::Class | RuntimeTypeKind::GenericParameter => Some(TypeHandle::OBJECT),
        RuntimeTypeKind::Struct | RuntimeTypeKind::Enum => Some(TypeHandle::VALUE_TYPE),
        RuntimeTypeKind::Delegate => Some(TypeHandle::DELEGATE),
        RuntimeTypeKind::Array => Some(TypeHandle::ARRAY),
        RuntimeTypeKind::Interface => None,
    }
}

#[cfg(test)]
#[path = "../tests/registry.rs"]
mod tests;
