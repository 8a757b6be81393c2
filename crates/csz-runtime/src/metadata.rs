//! Serialized type metadata.
//!
//! The emitter writes one [`TypeMetadata`] block per reflectable type as JSON
//! (`Csz.setMetadata("Demo.Foo", {...})`); [`TypeRegistry::load`] ingests the
//! same structures. Type references inside a block are symbolic and are
//! resolved against the registry when the block is loaded.
//!
//! [`TypeRegistry::load`]: crate::TypeRegistry::load

use serde::{Deserialize, Serialize};

use crate::attributes::Attribute;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuntimeTypeKind {
    Class,
    Interface,
    Struct,
    Enum,
    Delegate,
    Array,
    GenericParameter,
}

impl RuntimeTypeKind {
    pub const fn is_value_type(self) -> bool {
        matches!(self, Self::Struct | Self::Enum)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Variance {
    #[default]
    Invariant,
    Covariant,
    Contravariant,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemberKind {
    Constructor,
    Event,
    Field,
    Method,
    Property,
}

/// Symbolic type reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeRefMetadata {
    /// A registered type by its full name (`System.Int32`, `Demo.G$2`).
    Named(String),
    /// Position of a type parameter of the enclosing definition.
    Param(usize),
    /// Application of a generic definition.
    Generic {
        definition: String,
        arguments: Vec<TypeRefMetadata>,
    },
    Array {
        element: Box<TypeRefMetadata>,
        rank: u32,
    },
}

impl TypeRefMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn generic(definition: impl Into<String>, arguments: Vec<TypeRefMetadata>) -> Self {
        Self::Generic {
            definition: definition.into(),
            arguments,
        }
    }

    pub fn array(element: TypeRefMetadata, rank: u32) -> Self {
        Self::Array {
            element: Box::new(element),
            rank,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericParameterMetadata {
    pub name: String,
    #[serde(default)]
    pub variance: Variance,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberMetadata {
    pub name: String,
    pub kind: MemberKind,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<TypeRefMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeRefMetadata>,
    /// Interface this member explicitly implements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_interface: Option<TypeRefMetadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

const fn default_true() -> bool {
    true
}

impl MemberMetadata {
    pub fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_static: false,
            is_public: true,
            parameters: Vec::new(),
            return_type: None,
            explicit_interface: None,
            attributes: Vec::new(),
        }
    }

    pub fn method(name: impl Into<String>) -> Self {
        Self::new(name, MemberKind::Method)
    }

    pub fn constructor() -> Self {
        Self::new(".ctor", MemberKind::Constructor)
    }

    pub fn with_parameters(mut self, parameters: Vec<TypeRefMetadata>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn returns(mut self, ty: TypeRefMetadata) -> Self {
        self.return_type = Some(ty);
        self
    }

    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }

    pub fn implements(mut self, interface: TypeRefMetadata) -> Self {
        self.explicit_interface = Some(interface);
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// Metadata for one type definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMetadata {
    /// Full definition name; generic definitions carry the `$N` arity suffix.
    pub name: String,
    pub kind: RuntimeTypeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_parameters: Vec<GenericParameterMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<TypeRefMetadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeRefMetadata>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sealed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberMetadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

impl TypeMetadata {
    pub fn new(name: impl Into<String>, kind: RuntimeTypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            generic_parameters: Vec::new(),
            base: None,
            interfaces: Vec::new(),
            sealed: false,
            members: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, RuntimeTypeKind::Class)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, RuntimeTypeKind::Interface)
    }

    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(name, RuntimeTypeKind::Struct)
    }

    pub fn with_generic_parameters(mut self, params: &[(&str, Variance)]) -> Self {
        self.generic_parameters = params
            .iter()
            .map(|(name, variance)| GenericParameterMetadata {
                name: (*name).to_string(),
                variance: *variance,
            })
            .collect();
        self
    }

    pub fn with_base(mut self, base: TypeRefMetadata) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_interfaces(mut self, interfaces: Vec<TypeRefMetadata>) -> Self {
        self.interfaces = interfaces;
        self
    }

    pub fn with_member(mut self, member: MemberMetadata) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn sealed(mut self) -> Self {
        self.sealed = true;
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
