use csz_common::limits::MAX_TYPE_NAME_DEPTH;
use csz_semantic::{MemberId, MemberKind, TypeId, TypeKind};
use tracing::trace;

use super::Printer;

/// Flags of a [`Printer::to_name`] request.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NameOptions {
    /// Omit type arguments of constructed generics.
    pub definition_only: bool,
    /// Omit the namespace of top-level types.
    pub exclude_namespace: bool,
    /// Runtime alias form `G$2(A, B)` instead of the static form `G$2<A, B>`.
    pub as_alias: bool,
}

impl NameOptions {
    pub const ALIAS: Self = Self {
        definition_only: false,
        exclude_namespace: false,
        as_alias: true,
    };

    pub const STATIC: Self = Self {
        definition_only: false,
        exclude_namespace: false,
        as_alias: false,
    };

    pub const DEFINITION: Self = Self {
        definition_only: true,
        exclude_namespace: false,
        as_alias: true,
    };
}

impl<'a> Printer<'a> {
    // =========================================================================
    // Type Names
    // =========================================================================

    /// Canonical name of `ty`.
    ///
    /// Results are cached per `(type, options, current module)` so repeated
    /// requests yield the same string for the whole run.
    pub fn to_name(&mut self, ty: TypeId, options: NameOptions) -> String {
        self.note_dependencies(ty, 0);
        let key = (ty, options, self.current_module());
        if let Some(name) = self.name_cache.get(&key) {
            return name.clone();
        }
        let name = self.compute_name(ty, options, 0);
        trace!(?ty, ?options, %name, "type name");
        self.name_cache.insert(key, name.clone());
        name
    }

    /// Runtime alias name; valid as a JavaScript expression.
    pub fn type_alias(&mut self, ty: TypeId) -> String {
        self.to_name(ty, NameOptions::ALIAS)
    }

    pub(crate) fn current_module(&self) -> Option<String> {
        self.current_bridge
            .and_then(|id| self.bridges.get(id).module.clone())
    }

    fn compute_name(&mut self, ty: TypeId, options: NameOptions, depth: u32) -> String {
        if depth > MAX_TYPE_NAME_DEPTH {
            return "System.Object".to_string();
        }
        let types = self.model.types();
        let data = types.get(ty);
        let definition = types.definition_of(ty);
        let def = types.get(definition);

        if let Some(global) = def.attributes.global_name.as_ref().or(def.attributes.mixin.as_ref()) {
            return global.clone();
        }
        match data.kind {
            TypeKind::Array => {
                if !options.as_alias {
                    return "Array".to_string();
                }
                let element = data
                    .element_type
                    .map_or_else(|| "System.Object".to_string(), |element| {
                        self.compute_name(element, NameOptions::ALIAS, depth + 1)
                    });
                return if data.rank > 1 {
                    format!("Array({element}, {})", data.rank)
                } else {
                    format!("Array({element})")
                };
            }
            TypeKind::Delegate => return "Function".to_string(),
            TypeKind::Dynamic => return "System.Object".to_string(),
            TypeKind::TypeParameter => return data.name.clone(),
            TypeKind::Anonymous => return self.anonymous_type_name(ty),
            _ => {}
        }

        let mut name = self.definition_name(definition, options, depth);
        if self.options.qualify_cross_module_names {
            let current = self.current_module();
            if let Some(module) = &def.attributes.module
                && current.as_ref() != Some(module)
            {
                name = format!("{module}.{name}");
            }
        }

        if !options.definition_only
            && !data.type_arguments.is_empty()
            && !def.attributes.ignore_generics
        {
            let arg_options = NameOptions {
                definition_only: false,
                exclude_namespace: false,
                as_alias: options.as_alias,
            };
            let args: Vec<String> = data
                .type_arguments
                .iter()
                .map(|&arg| self.compute_name(arg, arg_options, depth + 1))
                .collect();
            name = if options.as_alias {
                format!("{name}({})", args.join(", "))
            } else {
                format!("{name}<{}>", args.join(", "))
            };
        }
        name
    }

    /// Name of a definition: custom name, or parent chain plus arity suffix.
    fn definition_name(&mut self, definition: TypeId, options: NameOptions, depth: u32) -> String {
        let def = self.model.types().get(definition);
        if let Some(custom) = &def.attributes.custom_name {
            return custom.clone();
        }
        let simple = if def.type_parameters.is_empty() {
            def.name.clone()
        } else {
            format!("{}${}", def.name, def.type_parameters.len())
        };
        match def.declaring_type {
            Some(parent) => {
                let parent_options = NameOptions {
                    definition_only: true,
                    ..options
                };
                let parent = self.compute_name(parent, parent_options, depth + 1);
                format!("{parent}.{simple}")
            }
            None if options.exclude_namespace || def.namespace.is_empty() => simple,
            None => format!("{}.{simple}", def.namespace),
        }
    }

    /// Record dependency edges from the current type to declared types of
    /// other output modules mentioned by `ty`.
    fn note_dependencies(&mut self, ty: TypeId, depth: u32) {
        if depth > MAX_TYPE_NAME_DEPTH {
            return;
        }
        let Some(current) = self.current_bridge else {
            return;
        };
        let types = self.model.types();
        if let Some(target) = self.bridges.find(types, ty) {
            let target = self.bridges.get(target);
            if target.module != self.bridges.get(current).module {
                let key = target.key.clone();
                self.bridges.add_dependency(current, &key);
            }
        }
        let data = types.get(ty);
        for &arg in &data.type_arguments {
            self.note_dependencies(arg, depth + 1);
        }
        if let Some(element) = data.element_type {
            self.note_dependencies(element, depth + 1);
        }
    }

    // =========================================================================
    // Member Names
    // =========================================================================

    /// Emitted name of a member; overloads after the first get a `$n` suffix.
    pub fn member_name(&self, member: MemberId) -> String {
        let data = self.model.members().get(member);
        if let Some(custom) = &data.attributes.custom_name {
            return custom.clone();
        }
        match (data.kind, data.overload_index) {
            (MemberKind::Constructor, 0) => "ctor".to_string(),
            (MemberKind::Constructor, index) => format!("$ctor{index}"),
            (_, 0) => data.name.clone(),
            (_, index) => format!("{}${index}", data.name),
        }
    }
}
