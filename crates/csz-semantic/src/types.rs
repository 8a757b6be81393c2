//! Semantic types as produced by the front-end resolver.
//!
//! Types are addressed by [`TypeId`] handles into a [`TypeArena`]. Constructed
//! generic types and array types are interned: requesting the same
//! application twice yields the same handle, so handle equality is type
//! identity within one compilation.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::members::MemberId;

/// Handle of a semantic type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    Interface,
    Struct,
    Enum,
    Array,
    Delegate,
    Anonymous,
    TypeParameter,
    Dynamic,
}

/// Well-known BCL types the emitter special-cases.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownType {
    Object,
    ValueType,
    String,
    Boolean,
    Char,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    Nullable,
    Void,
    Array,
    Delegate,
    Type,
}

impl KnownType {
    pub const ALL: [Self; 21] = [
        Self::Object,
        Self::ValueType,
        Self::String,
        Self::Boolean,
        Self::Char,
        Self::SByte,
        Self::Byte,
        Self::Int16,
        Self::UInt16,
        Self::Int32,
        Self::UInt32,
        Self::Int64,
        Self::UInt64,
        Self::Single,
        Self::Double,
        Self::Decimal,
        Self::Nullable,
        Self::Void,
        Self::Array,
        Self::Delegate,
        Self::Type,
    ];

    /// Simple name inside the `System` namespace.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Object => "Object",
            Self::ValueType => "ValueType",
            Self::String => "String",
            Self::Boolean => "Boolean",
            Self::Char => "Char",
            Self::SByte => "SByte",
            Self::Byte => "Byte",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Single => "Single",
            Self::Double => "Double",
            Self::Decimal => "Decimal",
            Self::Nullable => "Nullable",
            Self::Void => "Void",
            Self::Array => "Array",
            Self::Delegate => "Delegate",
            Self::Type => "Type",
        }
    }

    /// Integral types that fit a JavaScript number exactly.
    pub const fn is_small_integer(self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::SByte
                | Self::Byte
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
        )
    }

    pub const fn is_long(self) -> bool {
        matches!(self, Self::Int64 | Self::UInt64)
    }

    pub const fn is_integer(self) -> bool {
        self.is_small_integer() || self.is_long()
    }

    pub const fn is_floating(self) -> bool {
        matches!(self, Self::Single | Self::Double)
    }

    pub const fn is_numeric(self) -> bool {
        self.is_integer() || self.is_floating() || matches!(self, Self::Decimal)
    }

    const fn kind(self) -> TypeKind {
        match self {
            Self::Object | Self::String | Self::Array | Self::Delegate | Self::Type => {
                TypeKind::Class
            }
            _ => TypeKind::Struct,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variance {
    #[default]
    Invariant,
    Covariant,
    Contravariant,
}

/// A generic parameter declared on a type definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub variance: Variance,
}

impl TypeParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variance: Variance::Invariant,
        }
    }

    pub fn covariant(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variance: Variance::Covariant,
        }
    }

    pub fn contravariant(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variance: Variance::Contravariant,
        }
    }
}

/// Attribute-driven emission configuration attached to a type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeAttributes {
    /// `[Global]`-style: members live on the global object under this name.
    pub global_name: Option<String>,
    /// `[Mixin]`-style: members are mixed into an existing target object.
    pub mixin: Option<String>,
    /// `[Name]` override for the emitted type name.
    pub custom_name: Option<String>,
    /// Type arguments are erased at every emission site.
    pub ignore_generics: bool,
    /// Native type already present in the target runtime; no definition is emitted.
    pub external: bool,
    /// Output module the type is emitted into.
    pub module: Option<String>,
    /// Output file the type is emitted into.
    pub file_name: Option<String>,
    /// Metadata is emitted even when reflection is otherwise off.
    pub reflectable: bool,
}

#[derive(Clone, Debug)]
pub struct TypeData {
    pub kind: TypeKind,
    pub name: String,
    pub namespace: String,
    pub declaring_type: Option<TypeId>,
    /// Parameters of a generic definition (empty for non-generic and constructed types).
    pub type_parameters: Vec<TypeParameter>,
    /// Definition of a constructed generic type.
    pub definition: Option<TypeId>,
    pub type_arguments: Vec<TypeId>,
    pub known: Option<KnownType>,
    pub base: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub element_type: Option<TypeId>,
    pub rank: u32,
    pub is_sealed: bool,
    pub is_static: bool,
    /// For type parameters: owning definition and position.
    pub parameter_owner: Option<(TypeId, usize)>,
    /// For anonymous types: property names and types in declaration order.
    pub anonymous_properties: Vec<(String, TypeId)>,
    pub attributes: TypeAttributes,
    pub members: Vec<MemberId>,
}

impl TypeData {
    pub fn new(kind: TypeKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: namespace.into(),
            declaring_type: None,
            type_parameters: Vec::new(),
            definition: None,
            type_arguments: Vec::new(),
            known: None,
            base: None,
            interfaces: Vec::new(),
            element_type: None,
            rank: 0,
            is_sealed: matches!(kind, TypeKind::Struct | TypeKind::Enum | TypeKind::Delegate),
            is_static: false,
            parameter_owner: None,
            anonymous_properties: Vec::new(),
            attributes: TypeAttributes::default(),
            members: Vec::new(),
        }
    }

    pub fn class(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(TypeKind::Class, namespace, name)
    }

    pub fn interface(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(TypeKind::Interface, namespace, name)
    }

    pub fn structure(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(TypeKind::Struct, namespace, name)
    }

    #[must_use]
    pub fn with_base(mut self, base: TypeId) -> Self {
        self.base = Some(base);
        self
    }

    #[must_use]
    pub fn with_interfaces(mut self, interfaces: Vec<TypeId>) -> Self {
        self.interfaces = interfaces;
        self
    }

    #[must_use]
    pub fn with_type_parameters(mut self, params: Vec<TypeParameter>) -> Self {
        self.type_parameters = params;
        self
    }

    #[must_use]
    pub fn nested_in(mut self, parent: TypeId) -> Self {
        self.declaring_type = Some(parent);
        self
    }

    #[must_use]
    pub fn sealed(mut self) -> Self {
        self.is_sealed = true;
        self
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: TypeAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn is_generic_definition(&self) -> bool {
        !self.type_parameters.is_empty()
    }

    pub fn is_value_type(&self) -> bool {
        matches!(self.kind, TypeKind::Struct | TypeKind::Enum)
    }
}

/// Arena of semantic types with interning of constructed and array types.
#[derive(Debug)]
pub struct TypeArena {
    types: Vec<TypeData>,
    constructed: FxHashMap<(TypeId, Vec<TypeId>), TypeId>,
    arrays: FxHashMap<(TypeId, u32), TypeId>,
    known: FxHashMap<KnownType, TypeId>,
    dynamic: TypeId,
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    pub fn new() -> Self {
        let mut arena = Self {
            types: Vec::new(),
            constructed: FxHashMap::default(),
            arrays: FxHashMap::default(),
            known: FxHashMap::default(),
            dynamic: TypeId(0),
        };
        for known in KnownType::ALL {
            let mut data = TypeData::new(known.kind(), "System", known.name());
            data.known = Some(known);
            data.is_sealed = !matches!(
                known,
                KnownType::Object | KnownType::ValueType | KnownType::Array | KnownType::Delegate
            );
            let id = arena.push(data);
            arena.known.insert(known, id);
        }
        let object = arena.known(KnownType::Object);
        let value_type = arena.known(KnownType::ValueType);
        for known in KnownType::ALL {
            let id = arena.known(known);
            let base = match known {
                KnownType::Object => None,
                KnownType::String
                | KnownType::Array
                | KnownType::Delegate
                | KnownType::Type
                | KnownType::ValueType => Some(object),
                _ => Some(value_type),
            };
            arena.types[id.0 as usize].base = base;
        }
        let nullable = arena.known(KnownType::Nullable);
        arena.types[nullable.0 as usize].type_parameters = vec![TypeParameter::new("T")];
        arena.push(TypeData {
            parameter_owner: Some((nullable, 0)),
            ..TypeData::new(TypeKind::TypeParameter, "", "T")
        });
        arena.dynamic = arena.push(TypeData::new(TypeKind::Dynamic, "", "dynamic"));
        arena
    }

    fn push(&mut self, data: TypeData) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(data);
        id
    }

    /// Register a declared type.
    pub fn add(&mut self, data: TypeData) -> TypeId {
        self.push(data)
    }

    /// Register the type parameters of a generic definition and return their handles.
    pub fn add_type_parameters(&mut self, owner: TypeId) -> Vec<TypeId> {
        let params = self.get(owner).type_parameters.clone();
        params
            .into_iter()
            .enumerate()
            .map(|(index, param)| {
                self.push(TypeData {
                    parameter_owner: Some((owner, index)),
                    ..TypeData::new(TypeKind::TypeParameter, "", param.name)
                })
            })
            .collect()
    }

    pub fn get(&self, id: TypeId) -> &TypeData {
        &self.types[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut TypeData {
        &mut self.types[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn known(&self, known: KnownType) -> TypeId {
        self.known[&known]
    }

    pub fn dynamic(&self) -> TypeId {
        self.dynamic
    }

    pub fn is_known(&self, id: TypeId, known: KnownType) -> bool {
        self.get(id).known == Some(known)
    }

    /// Construct (or look up) `definition<args>`.
    pub fn construct(&mut self, definition: TypeId, args: Vec<TypeId>) -> TypeId {
        if let Some(&id) = self.constructed.get(&(definition, args.clone())) {
            return id;
        }
        let def = self.get(definition);
        let data = TypeData {
            kind: def.kind,
            name: def.name.clone(),
            namespace: def.namespace.clone(),
            declaring_type: def.declaring_type,
            type_parameters: Vec::new(),
            definition: Some(definition),
            type_arguments: args.clone(),
            known: def.known,
            base: def.base,
            interfaces: def.interfaces.clone(),
            element_type: None,
            rank: 0,
            is_sealed: def.is_sealed,
            is_static: def.is_static,
            parameter_owner: None,
            anonymous_properties: Vec::new(),
            attributes: def.attributes.clone(),
            members: def.members.clone(),
        };
        let id = self.push(data);
        self.constructed.insert((definition, args), id);
        id
    }

    pub fn nullable_of(&mut self, underlying: TypeId) -> TypeId {
        let nullable = self.known(KnownType::Nullable);
        self.construct(nullable, vec![underlying])
    }

    pub fn array_of(&mut self, element: TypeId, rank: u32) -> TypeId {
        if let Some(&id) = self.arrays.get(&(element, rank)) {
            return id;
        }
        let mut data = TypeData::new(TypeKind::Array, "System", "Array");
        data.element_type = Some(element);
        data.rank = rank;
        data.base = Some(self.known(KnownType::Array));
        data.is_sealed = true;
        let id = self.push(data);
        self.arrays.insert((element, rank), id);
        id
    }

    /// The `T` of `Nullable<T>`, if `id` is a nullable value type.
    pub fn nullable_underlying(&self, id: TypeId) -> Option<TypeId> {
        let data = self.get(id);
        if data.known == Some(KnownType::Nullable) && data.definition.is_some() {
            data.type_arguments.first().copied()
        } else {
            None
        }
    }

    /// Known primitive code after unwrapping `Nullable<T>`.
    pub fn primitive_code(&self, id: TypeId) -> Option<KnownType> {
        let id = self.nullable_underlying(id).unwrap_or(id);
        let data = self.get(id);
        if data.kind == TypeKind::Enum {
            return Some(KnownType::Int32);
        }
        data.known
    }

    /// Generic definition of `id`, or `id` itself.
    pub fn definition_of(&self, id: TypeId) -> TypeId {
        self.get(id).definition.unwrap_or(id)
    }

    /// Number of generic parameters declared directly on `id`'s definition.
    pub fn arity(&self, id: TypeId) -> usize {
        self.get(self.definition_of(id)).type_parameters.len()
    }

    /// Whether `id` mentions an open type parameter anywhere in its structure.
    pub fn contains_type_parameter(&self, id: TypeId) -> bool {
        let data = self.get(id);
        match data.kind {
            TypeKind::TypeParameter => true,
            TypeKind::Array => data
                .element_type
                .is_some_and(|element| self.contains_type_parameter(element)),
            _ => data
                .type_arguments
                .iter()
                .any(|&arg| self.contains_type_parameter(arg)),
        }
    }

    /// Collect every type parameter mentioned by `id` into `out`, in first-seen order.
    pub fn collect_type_parameters(&self, id: TypeId, out: &mut Vec<TypeId>) {
        let data = self.get(id);
        match data.kind {
            TypeKind::TypeParameter => {
                if !out.contains(&id) {
                    out.push(id);
                }
            }
            TypeKind::Array => {
                if let Some(element) = data.element_type {
                    self.collect_type_parameters(element, out);
                }
            }
            _ => {
                for &arg in &data.type_arguments {
                    self.collect_type_parameters(arg, out);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/types.rs"]
mod tests;
