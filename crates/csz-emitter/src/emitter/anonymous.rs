use csz_semantic::{NodeId, TypeId};
use serde_json::json;
use tracing::debug;

use super::Printer;
use crate::error::EmitResult;

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// One anonymous object shape, shared by every initializer with the same
/// property names and types.
#[derive(Clone, Debug, PartialEq)]
pub struct AnonymousShape {
    pub index: usize,
    pub properties: Vec<(String, TypeId)>,
    pub(crate) emitted: bool,
}

impl AnonymousShape {
    /// Emitted name without the assembly prefix.
    pub fn name(&self) -> String {
        format!("$AnonymousType${}", self.index)
    }
}

impl<'a> Printer<'a> {
    // =========================================================================
    // Anonymous Types
    // =========================================================================

    pub(crate) fn anonymous_type_name(&mut self, ty: TypeId) -> String {
        let properties = self.model.types().get(ty).anonymous_properties.clone();
        let index = self.register_anonymous(properties);
        format!("{}.$AnonymousType${index}", self.options.assembly_alias)
    }

    fn register_anonymous(&mut self, properties: Vec<(String, TypeId)>) -> usize {
        let next = self.anonymous.len() + 1;
        self.anonymous
            .entry(properties.clone())
            .or_insert_with(|| {
                debug!(index = next, "new anonymous type");
                AnonymousShape {
                    index: next,
                    properties,
                    emitted: false,
                }
            })
            .index
    }

    pub(super) fn emit_anonymous_object(
        &mut self,
        node: NodeId,
        initializers: &[(String, NodeId)],
    ) -> EmitResult<()> {
        let name = match self.type_of(node) {
            Some(ty) => self.anonymous_type_name(ty),
            None => {
                let properties = initializers
                    .iter()
                    .map(|(name, value)| {
                        let ty = self.type_of(*value).unwrap_or_else(|| self.model.types().dynamic());
                        (name.clone(), ty)
                    })
                    .collect();
                let index = self.register_anonymous(properties);
                format!("{}.$AnonymousType${index}", self.options.assembly_alias)
            }
        };
        let args = initializers
            .iter()
            .map(|(_, value)| self.expression_text(*value))
            .collect::<EmitResult<Vec<_>>>()?;
        self.write(&format!("new {name}({})", args.join(", ")));
        Ok(())
    }

    /// Object literal used by the `plain` template modifier.
    pub(crate) fn plain_object_text(
        &mut self,
        initializers: &[(String, NodeId)],
    ) -> EmitResult<String> {
        if initializers.is_empty() {
            return Ok("{}".to_string());
        }
        let fields = initializers
            .iter()
            .map(|(name, value)| Ok(format!("{name}: {}", self.expression_text(*value)?)))
            .collect::<EmitResult<Vec<_>>>()?;
        Ok(format!("{{ {} }}", fields.join(", ")))
    }

    /// Define every anonymous type registered since the last call.
    pub(super) fn emit_pending_anonymous_types(&mut self) {
        let pending: Vec<AnonymousShape> = self
            .anonymous
            .values_mut()
            .filter(|shape| !shape.emitted)
            .map(|shape| {
                shape.emitted = true;
                shape.clone()
            })
            .collect();
        for shape in pending {
            self.emit_anonymous_definition(&shape);
        }
    }

    fn emit_anonymous_definition(&mut self, shape: &AnonymousShape) {
        let asm = self.options.assembly_alias.clone();
        let name = shape.name();
        let full = format!("{asm}.{name}");
        let names: Vec<&str> = shape.properties.iter().map(|(n, _)| n.as_str()).collect();

        self.write_line();
        self.write(&format!(
            "{}({}, {asm}, {{",
            self.rt("define"),
            Self::quote_string(&name)
        ));
        self.write_line();
        self.increase_indent();
        self.write("$kind: \"anonymous\",");
        self.write_line();

        self.write(&format!("ctor: function ({}) {{", names.join(", ")));
        self.write_line();
        self.increase_indent();
        for property in &names {
            self.write(&format!("this.{property} = {property};"));
            self.write_line();
        }
        self.decrease_indent();
        self.write("},");
        self.write_line();

        for property in &names {
            self.write(&format!("{}: function () {{", getter_name(property)));
            self.write_line();
            self.increase_indent();
            self.write(&format!("return this.{property};"));
            self.write_line();
            self.decrease_indent();
            self.write("},");
            self.write_line();
        }

        let equality = if names.is_empty() {
            "true".to_string()
        } else {
            names
                .iter()
                .map(|p| format!("{}(this.{p}, o.{p})", self.rt("equals")))
                .collect::<Vec<_>>()
                .join(" && ")
        };
        self.write("equals: function (o) {");
        self.write_line();
        self.increase_indent();
        self.write(&format!("if (!{}(o, {full})) {{", self.rt("is")));
        self.write_line();
        self.increase_indent();
        self.write("return false;");
        self.write_line();
        self.decrease_indent();
        self.write("}");
        self.write_line();
        self.write(&format!("return {equality};"));
        self.write_line();
        self.decrease_indent();
        self.write("},");
        self.write_line();

        let mut hash_parts = vec![fnv1a(&name).to_string()];
        hash_parts.extend(names.iter().map(|p| format!("this.{p}")));
        self.write("getHashCode: function () {");
        self.write_line();
        self.increase_indent();
        self.write(&format!(
            "return {}([{}]);",
            self.rt("addHash"),
            hash_parts.join(", ")
        ));
        self.write_line();
        self.decrease_indent();
        self.write("},");
        self.write_line();

        let fields: Vec<String> = names.iter().map(|p| format!("{p}: this.{p}")).collect();
        self.write("toJSON: function () {");
        self.write_line();
        self.increase_indent();
        if fields.is_empty() {
            self.write("return {};");
        } else {
            self.write(&format!("return {{ {} }};", fields.join(", ")));
        }
        self.write_line();
        self.decrease_indent();
        self.write("}");
        self.write_line();
        self.decrease_indent();
        self.write("})");
        self.write_semicolon();
        self.write_line();

        if self.options.anonymous_type_metadata {
            let properties: Vec<serde_json::Value> = shape
                .properties
                .iter()
                .map(|(n, ty)| json!({ "name": n, "type": self.type_alias(*ty) }))
                .collect();
            let metadata = json!({ "kind": "anonymous", "properties": properties });
            self.write(&format!("{}({full}, {metadata})", self.rt("setMetadata")));
            self.write_semicolon();
            self.write_line();
        }
    }
}

/// `getName` for property `name`.
fn getter_name(property: &str) -> String {
    let mut chars = property.chars();
    match chars.next() {
        Some(first) => format!("get{}{}", first.to_uppercase(), chars.as_str()),
        None => "get".to_string(),
    }
}

/// 32-bit FNV-1a of `text`.
pub(crate) fn fnv1a(text: &str) -> u32 {
    text.bytes()
        .fold(FNV_OFFSET, |hash, byte| (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME))
}
