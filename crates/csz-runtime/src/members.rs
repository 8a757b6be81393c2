//! Member lookup, constructor selection and invocation.

use bitflags::bitflags;
use tracing::debug;

use crate::attributes::Attribute;
use crate::error::ReflectionError;
use crate::metadata::{MemberKind, RuntimeTypeKind};
use crate::registry::{MemberDef, TypeHandle, TypeRegistry};
use crate::value::{Invoker, RuntimeValue};

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct MemberTypes: u32 {
        const CONSTRUCTOR = 1;
        const EVENT = 2;
        const FIELD = 4;
        const METHOD = 8;
        const PROPERTY = 16;
        const ALL = 31;
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct BindingFlags: u32 {
        const IGNORE_CASE = 1;
        const DECLARED_ONLY = 2;
        const INSTANCE = 4;
        const STATIC = 8;
        const PUBLIC = 16;
        const NON_PUBLIC = 32;
        const DEFAULT = Self::INSTANCE.bits() | Self::STATIC.bits() | Self::PUBLIC.bits();
        const ALL_MEMBERS = Self::DEFAULT.bits() | Self::NON_PUBLIC.bits();
    }
}

impl From<MemberKind> for MemberTypes {
    fn from(kind: MemberKind) -> Self {
        match kind {
            MemberKind::Constructor => Self::CONSTRUCTOR,
            MemberKind::Event => Self::EVENT,
            MemberKind::Field => Self::FIELD,
            MemberKind::Method => Self::METHOD,
            MemberKind::Property => Self::PROPERTY,
        }
    }
}

/// A member as seen through a particular (possibly constructed) type:
/// parameter and return types are already substituted.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberInfo {
    pub declaring_type: TypeHandle,
    /// Position within the declaring definition's member list.
    pub index: usize,
    pub name: String,
    pub member_type: MemberTypes,
    pub is_static: bool,
    pub is_public: bool,
    pub parameters: Vec<TypeHandle>,
    pub return_type: Option<TypeHandle>,
    pub attributes: Vec<Attribute>,
}

impl TypeRegistry {
    /// `ty` followed by its base types, nearest first.
    fn lookup_chain(&self, ty: TypeHandle, flags: BindingFlags) -> Vec<TypeHandle> {
        let mut chain = vec![ty];
        if !flags.contains(BindingFlags::DECLARED_ONLY)
            && self.kind(ty) != RuntimeTypeKind::Interface
        {
            let mut current = self.base_type(ty);
            while let Some(base) = current {
                chain.push(base);
                current = self.base_type(base);
            }
        }
        chain
    }

    fn member_info(&self, owner: TypeHandle, index: usize, def: &MemberDef) -> MemberInfo {
        let (_, arguments) = self.shape(owner);
        MemberInfo {
            declaring_type: owner,
            index,
            name: def.name.clone(),
            member_type: def.kind.into(),
            is_static: def.is_static,
            is_public: def.is_public,
            parameters: def
                .parameters
                .iter()
                .map(|p| self.instantiate(p, &arguments))
                .collect(),
            return_type: def
                .return_type
                .as_ref()
                .map(|r| self.instantiate(r, &arguments)),
            attributes: def.attributes.clone(),
        }
    }

    fn collect_members(
        &self,
        ty: TypeHandle,
        types: MemberTypes,
        flags: BindingFlags,
        mut accept: impl FnMut(&MemberDef) -> bool,
    ) -> Vec<MemberInfo> {
        let mut result = Vec::new();
        for (depth, owner) in self.lookup_chain(ty, flags).into_iter().enumerate() {
            let (def, _) = self.shape(owner);
            for (index, member) in def.members.iter().enumerate() {
                let kind = MemberTypes::from(member.kind);
                if !types.intersects(kind) || (depth > 0 && kind == MemberTypes::CONSTRUCTOR) {
                    continue;
                }
                let visibility = if member.is_public {
                    BindingFlags::PUBLIC
                } else {
                    BindingFlags::NON_PUBLIC
                };
                let binding = if member.is_static {
                    BindingFlags::STATIC
                } else {
                    BindingFlags::INSTANCE
                };
                if flags.contains(visibility) && flags.contains(binding) && accept(member) {
                    result.push(self.member_info(owner, index, member));
                }
            }
        }
        result
    }

    /// All members of the requested kinds, derived members before inherited.
    pub fn get_members(
        &self,
        ty: TypeHandle,
        types: MemberTypes,
        flags: BindingFlags,
    ) -> Vec<MemberInfo> {
        self.collect_members(ty, types, flags, |_| true)
    }

    pub fn get_members_named(
        &self,
        ty: TypeHandle,
        types: MemberTypes,
        flags: BindingFlags,
        name: &str,
    ) -> Vec<MemberInfo> {
        let ignore_case = flags.contains(BindingFlags::IGNORE_CASE);
        self.collect_members(ty, types, flags, |member| {
            if ignore_case {
                member.name.eq_ignore_ascii_case(name)
            } else {
                member.name == name
            }
        })
    }

    /// Unique member lookup. With `parameters`, only members whose
    /// substituted parameter types equal the list exactly are considered.
    /// A member on a derived type hides same-shaped members further up the
    /// chain; two matches on one declaring type are ambiguous.
    pub fn get_member(
        &self,
        ty: TypeHandle,
        types: MemberTypes,
        flags: BindingFlags,
        name: &str,
        parameters: Option<&[TypeHandle]>,
    ) -> Result<Option<MemberInfo>, ReflectionError> {
        let mut matches = self
            .get_members_named(ty, types, flags, name)
            .into_iter()
            .filter(|m| parameters.is_none_or(|p| m.parameters == p));
        let Some(first) = matches.next() else {
            return Ok(None);
        };
        if matches.any(|m| m.declaring_type == first.declaring_type) {
            return Err(ReflectionError::AmbiguousMatch {
                type_name: self.type_name(ty),
                member: name.to_string(),
            });
        }
        Ok(Some(first))
    }

    pub fn get_method(
        &self,
        ty: TypeHandle,
        name: &str,
        parameters: Option<&[TypeHandle]>,
    ) -> Result<Option<MemberInfo>, ReflectionError> {
        self.get_member(ty, MemberTypes::METHOD, BindingFlags::DEFAULT, name, parameters)
    }

    pub fn get_constructors(&self, ty: TypeHandle) -> Vec<MemberInfo> {
        self.get_members(
            ty,
            MemberTypes::CONSTRUCTOR,
            BindingFlags::ALL_MEMBERS | BindingFlags::DECLARED_ONLY,
        )
    }

    /// Pick the constructor applicable to the given argument types (`None`
    /// stands for a null argument). More than one applicable candidate is
    /// ambiguous; there is no preference for exact matches.
    pub fn select_constructor(
        &self,
        ty: TypeHandle,
        arguments: &[Option<TypeHandle>],
    ) -> Result<MemberInfo, ReflectionError> {
        let mut applicable: Vec<MemberInfo> = self
            .get_constructors(ty)
            .into_iter()
            .filter(|ctor| ctor.parameters.len() == arguments.len())
            .filter(|ctor| {
                ctor.parameters
                    .iter()
                    .zip(arguments)
                    .all(|(&param, arg)| match arg {
                        Some(arg) => self.is_assignable_from(param, Some(*arg)),
                        None => {
                            !self.is_value_type(param)
                                || self.generic_definition(param) == Some(TypeHandle::NULLABLE)
                        }
                    })
            })
            .collect();
        match applicable.len() {
            0 => Err(ReflectionError::NoMatch {
                type_name: self.type_name(ty),
                member: ".ctor".to_string(),
            }),
            1 => Ok(applicable.remove(0)),
            count => {
                debug!(count, ty = %self.type_name(ty), "ambiguous constructor selection");
                Err(ReflectionError::AmbiguousMatch {
                    type_name: self.type_name(ty),
                    member: ".ctor".to_string(),
                })
            }
        }
    }

    /// Member of `ty` that implements `interface`'s member `name`: an
    /// explicit implementation if one exists, otherwise the public instance
    /// member with the same name and parameter count.
    pub fn get_interface_implementation(
        &self,
        ty: TypeHandle,
        interface: TypeHandle,
        name: &str,
    ) -> Option<MemberInfo> {
        if !self.is_assignable_from(interface, Some(ty)) {
            return None;
        }
        let contract = self
            .get_members_named(interface, MemberTypes::ALL, BindingFlags::INSTANCE | BindingFlags::PUBLIC, name)
            .into_iter()
            .next()?;

        for owner in self.lookup_chain(ty, BindingFlags::empty()) {
            let (def, arguments) = self.shape(owner);
            let explicit = def.members.iter().enumerate().find(|(_, member)| {
                member.name == name
                    && member.explicit_interface.as_ref().is_some_and(|r| {
                        let implemented = self.instantiate(r, &arguments);
                        implemented == interface
                            || self.is_assignable_from(interface, Some(implemented))
                    })
            });
            if let Some((index, member)) = explicit {
                return Some(self.member_info(owner, index, member));
            }
        }

        self.get_members_named(
            ty,
            contract.member_type,
            BindingFlags::INSTANCE | BindingFlags::PUBLIC,
            name,
        )
        .into_iter()
        .find(|m| m.parameters.len() == contract.parameters.len())
    }

    /// Attach an implementation to the member with the given signature
    /// declared on `ty` (or its generic definition).
    pub fn bind_invoker(
        &self,
        ty: TypeHandle,
        name: &str,
        parameters: &[TypeHandle],
        invoker: Invoker,
    ) -> Result<(), ReflectionError> {
        let member = self
            .get_member(
                ty,
                MemberTypes::ALL,
                BindingFlags::ALL_MEMBERS | BindingFlags::DECLARED_ONLY,
                name,
                Some(parameters),
            )?
            .ok_or_else(|| ReflectionError::NoMatch {
                type_name: self.type_name(ty),
                member: name.to_string(),
            })?;
        let owner = self.definition_or_self(member.declaring_type);
        self.invokers.insert((owner, member.index), invoker);
        Ok(())
    }

    pub fn invoke(
        &self,
        member: &MemberInfo,
        target: Option<&RuntimeValue>,
        arguments: &[RuntimeValue],
    ) -> Result<RuntimeValue, ReflectionError> {
        if arguments.len() != member.parameters.len() {
            return Err(ReflectionError::ArgumentCount {
                member: member.name.clone(),
                expected: member.parameters.len(),
                actual: arguments.len(),
            });
        }
        let owner = self.definition_or_self(member.declaring_type);
        let invoker = self
            .invokers
            .get(&(owner, member.index))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ReflectionError::MissingInvoker {
                type_name: self.type_name(member.declaring_type),
                member: member.name.clone(),
            })?;
        invoker(target, arguments)
    }
}

#[cfg(test)]
#[path = "../tests/members.rs"]
mod tests;
