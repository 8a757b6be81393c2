use csz_runtime::{
    Attribute, MemberMetadata, RuntimeTypeKind, TypeMetadata, TypeRefMetadata,
    metadata::{GenericParameterMetadata, MemberKind as RuntimeMemberKind, Variance as RuntimeVariance},
};
use csz_semantic::{
    KnownType, MemberKind, MethodBody, NodeId, TypeDeclaration, TypeId, TypeKind, Variance,
};
use smallvec::SmallVec;
use tracing::debug;

use super::statements::FunctionBody;
use super::{NameOptions, Printer};
use crate::error::{EmitError, EmitResult};

/// Members of one `Csz.define` body, split by placement.
#[derive(Default)]
struct DefinitionParts {
    static_fields: Vec<(String, String)>,
    static_inits: Vec<(String, NodeId)>,
    static_methods: Vec<(String, String)>,
    fields: Vec<(String, String)>,
    inits: Vec<(String, NodeId)>,
    constructors: Vec<(String, String)>,
    methods: Vec<(String, String)>,
}

/// Indentation of generated functions by placement.
#[derive(Copy, Clone)]
struct Levels {
    constructor: u32,
    member: u32,
    static_member: u32,
}

impl<'a> Printer<'a> {
    // =========================================================================
    // Type Definitions
    // =========================================================================

    /// Emit one declared type: dependency annotation, definition, metadata,
    /// hoisted lambdas and any anonymous types first used inside it.
    #[tracing::instrument(level = "debug", skip_all, fields(ty = decl.ty.0))]
    pub fn emit_type(&mut self, decl: &TypeDeclaration) -> EmitResult<()> {
        let types = self.model.types();
        let data = types.get(decl.ty);
        if data.attributes.external {
            debug!(name = %data.name, "external type skipped");
            return Ok(());
        }
        self.current_type = Some(decl.ty);
        self.current_bridge = self.bridges.find(types, decl.ty);
        self.hoisted.clear();

        let result = self.emit_type_inner(decl);
        self.current_type = None;
        self.current_bridge = None;
        result
    }

    fn emit_type_inner(&mut self, decl: &TypeDeclaration) -> EmitResult<()> {
        let types = self.model.types();
        let data = types.get(decl.ty);
        let name = self.to_name(decl.ty, NameOptions::DEFINITION);

        let definition = self.capture(|p| {
            let target = data.attributes.global_name.as_ref().or(data.attributes.mixin.as_ref());
            let parts = p.definition_parts(decl, target.is_some())?;
            match target {
                Some(target) => p.write_mixin(target, &parts),
                None => p.write_definition(decl.ty, &name, &parts)?,
            }
            Ok(())
        })?;

        let dependencies: Vec<String> = match self.current_bridge {
            Some(bridge) => self.bridges.get(bridge).dependencies.iter().cloned().collect(),
            None => Vec::new(),
        };
        if !dependencies.is_empty() {
            self.write(&format!("/** @dependencies {} */", dependencies.join(", ")));
            self.write_line();
        }
        self.out.write_block_text(&definition);
        self.write_line();

        if self.options.emit_metadata && data.attributes.global_name.is_none() {
            let metadata = self.type_metadata(decl.ty);
            let json = metadata
                .to_json()
                .map_err(|err| self.metadata_error(decl, &name, &err))?;
            self.write(&format!(
                "{}({}, {json})",
                self.rt("setMetadata"),
                Self::quote_string(&name)
            ));
            self.write_semicolon();
            self.write_line();
        }
        self.emit_hoisted_section();
        self.emit_pending_anonymous_types();
        Ok(())
    }

    /// Serialization failure of the metadata of `decl`, located at its first
    /// member body.
    pub(crate) fn metadata_error(
        &self,
        decl: &TypeDeclaration,
        name: &str,
        err: &serde_json::Error,
    ) -> EmitError {
        let node = decl
            .constructors
            .iter()
            .chain(&decl.methods)
            .find_map(|m| m.body)
            .or_else(|| decl.fields.iter().find_map(|f| f.init))
            .unwrap_or(NodeId(0));
        EmitError::MetadataSerialization {
            node,
            span: self.span(node),
            type_name: name.to_string(),
            reason: err.to_string(),
        }
    }

    /// Generate every member body of `decl`, each at the indentation level
    /// it is written at.
    fn definition_parts(&mut self, decl: &TypeDeclaration, mixin: bool) -> EmitResult<DefinitionParts> {
        let members = self.model.members();
        let mut parts = DefinitionParts::default();
        let owner = self.type_alias(decl.ty);

        let base = self.out.level() + u32::from(self.is_generic_definition(decl.ty));
        let levels = if mixin {
            Levels {
                constructor: base + 1,
                member: base + 1,
                static_member: base + 1,
            }
        } else {
            Levels {
                constructor: base + 1,
                member: base + 2,
                static_member: base + 3,
            }
        };

        for field in &decl.fields {
            let data = members.get(field.member);
            let name = self.member_name(field.member);
            let constant = field.init.and_then(|init| {
                let fact = self.fact(init);
                fact.constant.clone().map(|value| (value, fact.ty))
            });
            let default = match &constant {
                Some((value, ty)) => self.constant_text(value, *ty),
                None => match data.return_type {
                    Some(ty) => self.default_value_text(ty),
                    None => "null".to_string(),
                },
            };
            let pending = field.init.filter(|_| constant.is_none());
            if data.is_static {
                parts.static_fields.push((name.clone(), default));
                if let Some(init) = pending {
                    parts.static_inits.push((format!("{owner}.{name}"), init));
                }
            } else {
                parts.fields.push((name.clone(), default));
                if let Some(init) = pending {
                    parts.inits.push((format!("this.{name}"), init));
                }
            }
        }

        if !parts.static_inits.is_empty() {
            let inits = std::mem::take(&mut parts.static_inits);
            let text = self.at_level(levels.static_member, |p| {
                p.function_text(&[], FunctionBody::Initializers(&inits), false)
            })?;
            parts.static_methods.push(("init".to_string(), text));
        }
        if !parts.inits.is_empty() {
            let inits = std::mem::take(&mut parts.inits);
            let text = self.at_level(levels.constructor, |p| {
                p.function_text(&[], FunctionBody::Initializers(&inits), false)
            })?;
            parts.constructors.push(("init".to_string(), text));
        }

        for ctor in &decl.constructors {
            let data = members.get(ctor.member);
            let level = if data.is_static {
                levels.static_member
            } else {
                levels.constructor
            };
            let Some(text) = self.at_level(level, |p| p.member_body_text(ctor))? else {
                continue;
            };
            if data.is_static {
                parts.static_methods.push(("ctor".to_string(), text));
            } else {
                parts.constructors.push((self.member_name(ctor.member), text));
            }
        }

        for method in &decl.methods {
            let data = members.get(method.member);
            let level = if data.is_static {
                levels.static_member
            } else {
                levels.member
            };
            let Some(text) = self.at_level(level, |p| p.member_body_text(method))? else {
                continue;
            };
            let name = self.member_name(method.member);
            if data.is_static {
                parts.static_methods.push((name, text));
            } else {
                parts.methods.push((name, text));
            }
        }
        Ok(parts)
    }

    /// Run `f` with the indentation level set to `level`.
    fn at_level<T>(&mut self, level: u32, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.out.level();
        self.out.set_level(level);
        let result = f(self);
        self.out.set_level(saved);
        result
    }

    /// Function text of a method or constructor, or `None` when it has no
    /// body or is removed at every call site.
    fn member_body_text(&mut self, body: &MethodBody) -> EmitResult<Option<String>> {
        let data = self.model.members().get(body.member);
        if data.attributes.partial_without_body || data.attributes.template.is_some() {
            return Ok(None);
        }
        let Some(block) = body.body else {
            return Ok(None);
        };
        let mut params = Vec::with_capacity(body.parameters.len() + data.type_parameters.len());
        if !data.attributes.ignore_generics {
            params.extend(data.type_parameters.iter().cloned());
        }
        params.extend(body.parameters.iter().cloned());
        self.locals.clear_locals_map();
        let text = self.function_text(&params, FunctionBody::Block(block), false)?;
        Ok(Some(text))
    }

    fn is_generic_definition(&self, ty: TypeId) -> bool {
        let data = self.model.types().get(ty);
        !data.type_parameters.is_empty() && !data.attributes.ignore_generics
    }

    /// `Csz.define("Demo.Foo", { ... });`, wrapped in a type-parameter
    /// function for generic definitions.
    fn write_definition(
        &mut self,
        ty: TypeId,
        name: &str,
        parts: &DefinitionParts,
    ) -> EmitResult<()> {
        let types = self.model.types();
        let data = types.get(ty);
        let generic = self.is_generic_definition(ty);

        self.write(&format!("{}({}, ", self.rt("define"), Self::quote_string(name)));
        if generic {
            let params: Vec<&str> = data.type_parameters.iter().map(|p| p.name.as_str()).collect();
            self.write(&format!("function ({}) {{", params.join(", ")));
            self.write_line();
            self.increase_indent();
            self.write("return {");
        } else {
            self.write("{");
        }
        self.write_line();
        self.increase_indent();

        let mut entries: Vec<Box<dyn FnOnce(&mut Self)>> = Vec::new();
        let inherits = self.inherits(ty);
        if !inherits.is_empty() {
            let text = format!("inherits: [{}]", inherits.join(", "));
            entries.push(Box::new(move |p: &mut Self| p.write(&text)));
        }
        let kind = match data.kind {
            TypeKind::Interface => Some("interface"),
            TypeKind::Struct => Some("struct"),
            TypeKind::Enum => Some("enum"),
            _ => None,
        };
        if let Some(kind) = kind {
            entries.push(Box::new(move |p: &mut Self| p.write(&format!("$kind: \"{kind}\""))));
        }
        if !parts.static_fields.is_empty() || !parts.static_methods.is_empty() {
            let fields = parts.static_fields.clone();
            let methods = parts.static_methods.clone();
            entries.push(Box::new(move |p: &mut Self| {
                p.write("statics: {");
                p.write_line();
                p.increase_indent();
                let mut groups: Vec<(&str, &[(String, String)])> = Vec::new();
                if !fields.is_empty() {
                    groups.push(("fields", fields.as_slice()));
                }
                if !methods.is_empty() {
                    groups.push(("methods", methods.as_slice()));
                }
                p.write_groups(&groups);
                p.decrease_indent();
                p.write("}");
            }));
        }
        if !parts.fields.is_empty() {
            let fields = parts.fields.clone();
            entries.push(Box::new(move |p: &mut Self| p.write_group("fields", &fields)));
        }
        let constructors = parts.constructors.clone();
        for (name, text) in constructors {
            entries.push(Box::new(move |p: &mut Self| {
                p.write(&format!("{name}: "));
                p.write(&text);
            }));
        }
        if !parts.methods.is_empty() {
            let methods = parts.methods.clone();
            entries.push(Box::new(move |p: &mut Self| p.write_group("methods", &methods)));
        }

        let count = entries.len();
        for (i, entry) in entries.into_iter().enumerate() {
            entry(self);
            if i + 1 < count {
                self.write(",");
            }
            self.write_line();
        }

        self.decrease_indent();
        if generic {
            self.write("};");
            self.write_line();
            self.decrease_indent();
            self.write("})");
        } else {
            self.write("})");
        }
        self.write_semicolon();
        Ok(())
    }

    /// `Csz.apply(Target, { ... });` for types merged into a global object.
    fn write_mixin(&mut self, target: &str, parts: &DefinitionParts) {
        self.write(&format!("{}({target}, {{", self.rt("apply")));
        self.write_line();
        self.increase_indent();
        let entries: Vec<&(String, String)> = parts
            .static_fields
            .iter()
            .chain(&parts.static_methods)
            .chain(&parts.fields)
            .chain(&parts.methods)
            .collect();
        let count = entries.len();
        for (i, (name, text)) in entries.into_iter().enumerate() {
            self.write(&format!("{name}: "));
            self.write(text);
            if i + 1 < count {
                self.write(",");
            }
            self.write_line();
        }
        self.decrease_indent();
        self.write("})");
        self.write_semicolon();
    }

    fn write_groups(&mut self, groups: &[(&str, &[(String, String)])]) {
        let count = groups.len();
        for (i, (name, entries)) in groups.iter().enumerate() {
            self.write_group(name, entries);
            if i + 1 < count {
                self.write(",");
            }
            self.write_line();
        }
    }

    /// `name: { a: ..., b: ... }` with one entry per line.
    fn write_group(&mut self, name: &str, entries: &[(String, String)]) {
        self.write(&format!("{name}: {{"));
        self.write_line();
        self.increase_indent();
        let count = entries.len();
        for (i, (key, text)) in entries.iter().enumerate() {
            self.write(&format!("{key}: "));
            self.write(text);
            if i + 1 < count {
                self.write(",");
            }
            self.write_line();
        }
        self.decrease_indent();
        self.write("}");
    }

    /// Base type (unless `System.Object`) followed by the interfaces.
    fn inherits(&mut self, ty: TypeId) -> SmallVec<[String; 4]> {
        let types = self.model.types();
        let data = types.get(ty);
        let mut out = SmallVec::new();
        if let Some(base) = data.base
            && !types.is_known(base, KnownType::Object)
            && !types.is_known(base, KnownType::ValueType)
        {
            out.push(self.type_alias(base));
        }
        for &interface in &data.interfaces {
            out.push(self.type_alias(interface));
        }
        out
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Runtime metadata record describing `ty`.
    pub fn type_metadata(&mut self, ty: TypeId) -> TypeMetadata {
        let types = self.model.types();
        let members = self.model.members();
        let data = types.get(ty);
        let name = self.to_name(ty, NameOptions::DEFINITION);
        let kind = match data.kind {
            TypeKind::Interface => RuntimeTypeKind::Interface,
            TypeKind::Struct => RuntimeTypeKind::Struct,
            TypeKind::Enum => RuntimeTypeKind::Enum,
            TypeKind::Delegate => RuntimeTypeKind::Delegate,
            _ => RuntimeTypeKind::Class,
        };
        let mut metadata = TypeMetadata::new(name, kind);
        metadata.generic_parameters = data
            .type_parameters
            .iter()
            .map(|p| GenericParameterMetadata {
                name: p.name.clone(),
                variance: match p.variance {
                    Variance::Invariant => RuntimeVariance::Invariant,
                    Variance::Covariant => RuntimeVariance::Covariant,
                    Variance::Contravariant => RuntimeVariance::Contravariant,
                },
            })
            .collect();
        metadata.base = data
            .base
            .filter(|&base| !types.is_known(base, KnownType::Object))
            .map(|base| self.type_ref(base, ty));
        metadata.interfaces = data.interfaces.iter().map(|&i| self.type_ref(i, ty)).collect();
        metadata.sealed = data.is_sealed;
        if data.attributes.reflectable {
            metadata.attributes.push(Attribute::Reflectable { value: true });
        }
        if let Some(custom) = &data.attributes.custom_name {
            metadata.attributes.push(Attribute::Name {
                value: custom.clone(),
            });
        }

        for &member in &data.members {
            let member_data = members.get(member);
            let kind = match member_data.kind {
                MemberKind::Method | MemberKind::Operator => RuntimeMemberKind::Method,
                MemberKind::Constructor => RuntimeMemberKind::Constructor,
                MemberKind::Property | MemberKind::Indexer => RuntimeMemberKind::Property,
                MemberKind::Field => RuntimeMemberKind::Field,
                MemberKind::Event => RuntimeMemberKind::Event,
            };
            let name = match member_data.kind {
                MemberKind::Constructor => ".ctor".to_string(),
                _ => member_data.name.clone(),
            };
            let mut entry = MemberMetadata::new(name, kind).with_parameters(
                member_data
                    .parameters
                    .iter()
                    .map(|p| self.type_ref(p.ty, ty))
                    .collect(),
            );
            if let Some(ret) = member_data.return_type
                && !types.is_known(ret, KnownType::Void)
            {
                entry = entry.returns(self.type_ref(ret, ty));
            }
            if member_data.is_static {
                entry = entry.static_member();
            }
            if let Some(template) = &member_data.attributes.template {
                entry = entry.with_attribute(Attribute::Template {
                    code: template.clone(),
                });
            }
            if let Some(custom) = &member_data.attributes.custom_name {
                entry = entry.with_attribute(Attribute::Name {
                    value: custom.clone(),
                });
            }
            if let Some(symbol) = &member_data.attributes.conditional {
                entry = entry.with_attribute(Attribute::Conditional {
                    symbol: symbol.clone(),
                });
            }
            metadata.members.push(entry);
        }
        metadata
    }

    /// Symbolic reference to `ty` as seen from the definition `owner`.
    fn type_ref(&mut self, ty: TypeId, owner: TypeId) -> TypeRefMetadata {
        let types = self.model.types();
        let data = types.get(ty);
        match data.kind {
            TypeKind::TypeParameter => match data.parameter_owner {
                Some((param_owner, index)) if param_owner == types.definition_of(owner) => {
                    TypeRefMetadata::Param(index)
                }
                _ => TypeRefMetadata::named("System.Object"),
            },
            TypeKind::Array => {
                let element = match data.element_type {
                    Some(element) => self.type_ref(element, owner),
                    None => TypeRefMetadata::named("System.Object"),
                };
                TypeRefMetadata::array(element, data.rank.max(1))
            }
            _ if !data.type_arguments.is_empty() => {
                let definition = self.to_name(types.definition_of(ty), NameOptions::DEFINITION);
                let arguments = data
                    .type_arguments
                    .iter()
                    .map(|&arg| self.type_ref(arg, owner))
                    .collect();
                TypeRefMetadata::generic(definition, arguments)
            }
            _ => TypeRefMetadata::named(self.to_name(ty, NameOptions::DEFINITION)),
        }
    }
}
