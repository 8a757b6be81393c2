//! Attribute records attached to types and members.

use serde::{Deserialize, Serialize};

use crate::registry::{TypeHandle, TypeRegistry};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Attribute {
    Reflectable {
        value: bool,
    },
    Name {
        value: String,
    },
    Template {
        code: String,
    },
    Obsolete {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default)]
        error: bool,
    },
    Conditional {
        symbol: String,
    },
    #[serde(rename_all = "camelCase")]
    Custom {
        type_name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        arguments: Vec<AttributeValue>,
        #[serde(default = "inherited_default")]
        inherited: bool,
    },
}

const fn inherited_default() -> bool {
    true
}

/// Attribute filter used by queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeKind {
    Reflectable,
    Name,
    Template,
    Obsolete,
    Conditional,
    Custom(String),
}

impl Attribute {
    pub fn custom(type_name: impl Into<String>, arguments: Vec<AttributeValue>) -> Self {
        Self::Custom {
            type_name: type_name.into(),
            arguments,
            inherited: true,
        }
    }

    pub fn matches(&self, kind: &AttributeKind) -> bool {
        match (self, kind) {
            (Self::Reflectable { .. }, AttributeKind::Reflectable)
            | (Self::Name { .. }, AttributeKind::Name)
            | (Self::Template { .. }, AttributeKind::Template)
            | (Self::Obsolete { .. }, AttributeKind::Obsolete)
            | (Self::Conditional { .. }, AttributeKind::Conditional) => true,
            (Self::Custom { type_name, .. }, AttributeKind::Custom(wanted)) => type_name == wanted,
            _ => false,
        }
    }

    /// Whether derived types see this attribute when inherited attributes
    /// are requested. Naming and template attributes describe one
    /// declaration only.
    pub const fn is_inherited(&self) -> bool {
        match self {
            Self::Name { .. } | Self::Template { .. } | Self::Conditional { .. } => false,
            Self::Reflectable { .. } | Self::Obsolete { .. } => true,
            Self::Custom { inherited, .. } => *inherited,
        }
    }
}

impl TypeRegistry {
    /// Attributes of `ty`, optionally filtered. With `inherit`, inheritable
    /// attributes of base types follow the type's own, nearest base first.
    pub fn get_attributes(
        &self,
        ty: TypeHandle,
        filter: Option<&AttributeKind>,
        inherit: bool,
    ) -> Vec<Attribute> {
        let keep = |attr: &Attribute| filter.is_none_or(|kind| attr.matches(kind));
        let mut result: Vec<Attribute> = self
            .record(self.definition_or_self(ty))
            .attributes
            .iter()
            .filter(|attr| keep(attr))
            .cloned()
            .collect();
        if inherit {
            let mut current = self.base_type(ty);
            while let Some(base) = current {
                let record = self.record(self.definition_or_self(base));
                result.extend(
                    record
                        .attributes
                        .iter()
                        .filter(|attr| attr.is_inherited() && keep(attr))
                        .cloned(),
                );
                current = self.base_type(base);
            }
        }
        result
    }

    pub fn has_attribute(&self, ty: TypeHandle, kind: &AttributeKind, inherit: bool) -> bool {
        !self.get_attributes(ty, Some(kind), inherit).is_empty()
    }
}
