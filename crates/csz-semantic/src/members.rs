//! Members declared on semantic types.

use crate::nodes::ConstValue;
use crate::types::TypeId;

/// Handle of a member.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Method,
    Constructor,
    Property,
    Field,
    Event,
    Operator,
    Indexer,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeId,
    /// `params T[]` variadic tail.
    pub is_params: bool,
    pub default: Option<ConstValue>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            is_params: false,
            default: None,
        }
    }

    pub fn params(name: impl Into<String>, array_ty: TypeId) -> Self {
        Self {
            is_params: true,
            ..Self::new(name, array_ty)
        }
    }

    #[must_use]
    pub fn with_default(mut self, value: ConstValue) -> Self {
        self.default = Some(value);
        self
    }
}

/// Attribute-driven emission configuration attached to a member.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemberAttributes {
    /// Inline template replacing the normal call/access emission.
    pub template: Option<String>,
    /// Always spread the `params` tail instead of wrapping it in an array.
    pub expand_params: bool,
    /// Erase method type arguments at call sites.
    pub ignore_generics: bool,
    pub custom_name: Option<String>,
    /// `[Conditional("SYMBOL")]`: calls vanish unless the symbol is defined.
    pub conditional: Option<String>,
    /// Partial method declaration with no implementing part.
    pub partial_without_body: bool,
}

#[derive(Clone, Debug)]
pub struct MemberData {
    pub name: String,
    pub kind: MemberKind,
    pub declaring_type: TypeId,
    pub is_static: bool,
    /// Virtual, abstract or override.
    pub is_virtual: bool,
    pub is_extension: bool,
    /// Position among same-named overloads; non-zero overloads get a `$n` suffix.
    pub overload_index: u32,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeId>,
    pub type_parameters: Vec<String>,
    pub attributes: MemberAttributes,
}

impl MemberData {
    pub fn new(kind: MemberKind, name: impl Into<String>, declaring_type: TypeId) -> Self {
        Self {
            name: name.into(),
            kind,
            declaring_type,
            is_static: false,
            is_virtual: false,
            is_extension: false,
            overload_index: 0,
            parameters: Vec::new(),
            return_type: None,
            type_parameters: Vec::new(),
            attributes: MemberAttributes::default(),
        }
    }

    pub fn method(name: impl Into<String>, declaring_type: TypeId) -> Self {
        Self::new(MemberKind::Method, name, declaring_type)
    }

    pub fn constructor(declaring_type: TypeId) -> Self {
        Self::new(MemberKind::Constructor, "ctor", declaring_type)
    }

    pub fn field(name: impl Into<String>, declaring_type: TypeId, ty: TypeId) -> Self {
        Self {
            return_type: Some(ty),
            ..Self::new(MemberKind::Field, name, declaring_type)
        }
    }

    pub fn property(name: impl Into<String>, declaring_type: TypeId, ty: TypeId) -> Self {
        Self {
            return_type: Some(ty),
            ..Self::new(MemberKind::Property, name, declaring_type)
        }
    }

    pub fn indexer(declaring_type: TypeId, parameters: Vec<Parameter>, ty: TypeId) -> Self {
        Self {
            parameters,
            return_type: Some(ty),
            ..Self::new(MemberKind::Indexer, "Item", declaring_type)
        }
    }

    pub fn operator(name: impl Into<String>, declaring_type: TypeId) -> Self {
        Self {
            is_static: true,
            ..Self::new(MemberKind::Operator, name, declaring_type)
        }
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    #[must_use]
    pub fn returns(mut self, ty: TypeId) -> Self {
        self.return_type = Some(ty);
        self
    }

    #[must_use]
    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    #[must_use]
    pub fn virtual_member(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    #[must_use]
    pub fn extension(mut self) -> Self {
        self.is_extension = true;
        self.is_static = true;
        self
    }

    #[must_use]
    pub fn with_type_parameters(mut self, names: &[&str]) -> Self {
        self.type_parameters = names.iter().map(|n| (*n).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.attributes.template = Some(template.into());
        self
    }

    #[must_use]
    pub fn with_overload_index(mut self, index: u32) -> Self {
        self.overload_index = index;
        self
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: MemberAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Index of the `params` parameter, if any.
    pub fn params_index(&self) -> Option<usize> {
        self.parameters.iter().position(|p| p.is_params)
    }

    pub fn parameter_index(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p.name == name)
    }
}

#[derive(Debug, Default)]
pub struct MemberArena {
    members: Vec<MemberData>,
}

impl MemberArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, data: MemberData) -> MemberId {
        let id = MemberId(self.members.len() as u32);
        self.members.push(data);
        id
    }

    pub fn get(&self, id: MemberId) -> &MemberData {
        &self.members[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: MemberId) -> &mut MemberData {
        &mut self.members[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
