use csz_common::limits::MAX_VERSION_FIELD_COUNT;
use csz_semantic::{ConstValue, Expr, KnownType, MemberId, NodeId, Stmt, TypeId, TypeKind};
use rustc_hash::FxHashMap;
use tracing::trace;

use super::Printer;
use crate::bridge::definition_key;
use crate::error::{EmitError, EmitResult};
use crate::template::{InlineTemplate, Modifier, Placeholder, PlaceholderKey, Segment};

/// Value bound to one parameter of a templated member.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ArgSlot {
    Single(NodeId),
    /// `params` parameter: the tail elements (expanded form) or the one array argument.
    Params { elements: Vec<NodeId>, expanded: bool },
    /// Omitted optional parameter.
    Default(ConstValue, TypeId),
    /// Pre-rendered text, e.g. a parameter name of a wrapper function.
    Text(String),
    Missing,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ThisArg {
    None,
    Node(NodeId),
    Text(String),
}

/// One application of an inline template.
pub(crate) struct TemplateCall<'t> {
    pub node: NodeId,
    pub member: MemberId,
    pub template: &'t str,
    pub this: ThisArg,
    pub slots: Vec<ArgSlot>,
    pub type_arguments: Vec<TypeId>,
}

/// What a placeholder key resolved to.
enum Bound<'s> {
    Slot(&'s ArgSlot),
    Receiver(&'s ThisArg),
    TypeArgument(TypeId),
    /// A `gettmp` tag, looked up in the tmp table.
    Tag,
}

#[derive(Copy, Clone)]
enum TemplateFailure {
    Unresolved,
    Unsupported,
    NonLiteral,
}

impl<'a> Printer<'a> {
    // =========================================================================
    // Template Application
    // =========================================================================

    /// Render `call.template` with its placeholders substituted.
    pub(crate) fn apply_template(&mut self, call: &TemplateCall<'_>) -> EmitResult<String> {
        let template =
            InlineTemplate::parse(call.template).map_err(|err| EmitError::MalformedTemplate {
                node: call.node,
                span: self.span(call.node),
                template: call.template.to_string(),
                reason: err.reason,
            })?;
        trace!(node = ?call.node, template = call.template, "applying inline template");

        let mut rendered: FxHashMap<(PlaceholderKey, Modifier, bool), String> =
            FxHashMap::default();
        let mut prelude = Vec::new();
        let mut out = String::new();

        for segment in &template.segments {
            let placeholder = match segment {
                Segment::Text(text) => {
                    out.push_str(text);
                    continue;
                }
                Segment::Placeholder(placeholder) => placeholder,
            };
            let memo_key = (
                placeholder.key.clone(),
                placeholder.modifier,
                placeholder.spread,
            );
            if let Some(text) = rendered.get(&memo_key) {
                out.push_str(text);
                continue;
            }

            let bound = self.bind_placeholder(call, placeholder)?;
            if placeholder.spread
                && let Bound::Slot(ArgSlot::Params {
                    elements,
                    expanded: false,
                }) = &bound
            {
                // A single array argument cannot be spread textually; turn
                // the enclosing call into an apply-style call.
                let array = match elements.first() {
                    Some(&element) => self.expression_text(element)?,
                    None => "[]".to_string(),
                };
                self.splice_apply(call, placeholder, &mut out, &array)?;
                continue;
            }

            let text = self.render_placeholder(call, placeholder, &bound)?;
            let repeated =
                template.occurrences(&placeholder.key, placeholder.modifier) > 1;
            if !repeated || !self.evaluates_argument(placeholder, &bound) {
                out.push_str(&text);
                rendered.insert(memo_key, text);
                continue;
            }
            if placeholder.modifier == Modifier::Tmp {
                // `text` already assigns the temporary; later occurrences read it.
                out.push_str(&text);
                if let Some(temp) = self.template_tmps.get(&placeholder.key.to_string()) {
                    rendered.insert(memo_key, temp.clone());
                }
                continue;
            }
            let temp = self.statement_temp();
            prelude.push(format!("{temp} = {text}"));
            out.push_str(&temp);
            rendered.insert(memo_key, temp);
        }

        if prelude.is_empty() {
            Ok(out)
        } else {
            Ok(format!("({}, {out})", prelude.join(", ")))
        }
    }

    fn bind_placeholder<'s>(
        &self,
        call: &'s TemplateCall<'_>,
        placeholder: &Placeholder,
    ) -> EmitResult<Bound<'s>> {
        let member = self.model.members().get(call.member);
        let unresolved = || self.template_error(call, placeholder, TemplateFailure::Unresolved);
        match &placeholder.key {
            PlaceholderKey::This => match &call.this {
                ThisArg::None => Err(unresolved()),
                this => Ok(Bound::Receiver(this)),
            },
            PlaceholderKey::Index(index) => {
                call.slots.get(*index).map(Bound::Slot).ok_or_else(unresolved)
            }
            PlaceholderKey::Name(_) if placeholder.modifier == Modifier::GetTmp => {
                Ok(Bound::Tag)
            }
            PlaceholderKey::Name(name) => {
                if let Some(index) = member.parameter_index(name) {
                    return call.slots.get(index).map(Bound::Slot).ok_or_else(unresolved);
                }
                if let Some(index) = member.type_parameters.iter().position(|p| p == name)
                    && let Some(&ty) = call.type_arguments.get(index)
                {
                    return Ok(Bound::TypeArgument(ty));
                }
                Err(unresolved())
            }
        }
    }

    fn render_placeholder(
        &mut self,
        call: &TemplateCall<'_>,
        placeholder: &Placeholder,
        bound: &Bound<'_>,
    ) -> EmitResult<String> {
        let member = self.model.members().get(call.member);
        let is_params = matches!(bound, Bound::Slot(ArgSlot::Params { .. }));

        if placeholder.spread && (placeholder.modifier != Modifier::None || !is_params) {
            return Err(self.template_error(call, placeholder, TemplateFailure::Unsupported));
        }

        match placeholder.modifier {
            Modifier::None | Modifier::Array => {
                if placeholder.modifier == Modifier::Array && !is_params {
                    return Err(self.template_error(call, placeholder, TemplateFailure::Unsupported));
                }
                match bound {
                    Bound::Receiver(this) => self.receiver_text(this),
                    Bound::TypeArgument(ty) => Ok(self.type_alias(*ty)),
                    Bound::Slot(ArgSlot::Params { elements, expanded }) => {
                        let spread = placeholder.spread
                            || (placeholder.modifier == Modifier::None
                                && member.attributes.expand_params);
                        self.params_text(elements, *expanded, spread)
                    }
                    Bound::Slot(slot) => self.slot_text(slot),
                    Bound::Tag => Err(self.template_error(
                        call,
                        placeholder,
                        TemplateFailure::Unresolved,
                    )),
                }
            }
            Modifier::Type => match bound {
                Bound::TypeArgument(ty) => Ok(self.type_alias(*ty)),
                Bound::Slot(ArgSlot::Single(node)) => {
                    let node = *node;
                    match self.type_of(node) {
                        Some(ty) if self.is_nameable(ty) => Ok(self.type_alias(ty)),
                        _ => {
                            let value = self.expression_text(node)?;
                            Ok(format!("{}({value})", self.rt("getType")))
                        }
                    }
                }
                Bound::Slot(ArgSlot::Default(_, ty)) => Ok(self.type_alias(*ty)),
                Bound::Receiver(this) => {
                    let value = self.receiver_text(this)?;
                    Ok(format!("{}({value})", self.rt("getType")))
                }
                _ => Err(self.template_error(call, placeholder, TemplateFailure::Unsupported)),
            },
            Modifier::Tmp => {
                let value = match bound {
                    Bound::Receiver(this) => self.receiver_text(this)?,
                    Bound::Slot(slot) => self.slot_text(slot)?,
                    Bound::TypeArgument(_) | Bound::Tag => {
                        return Err(self.template_error(
                            call,
                            placeholder,
                            TemplateFailure::Unsupported,
                        ));
                    }
                };
                let temp = self.statement_temp();
                self.template_tmps
                    .insert(placeholder.key.to_string(), temp.clone());
                Ok(format!("{temp} = {value}"))
            }
            Modifier::GetTmp => match self.template_tmps.get(&placeholder.key.to_string()) {
                Some(temp) => Ok(temp.clone()),
                None => Err(self.template_error(call, placeholder, TemplateFailure::Unresolved)),
            },
            Modifier::Body => match bound {
                Bound::Slot(ArgSlot::Single(node)) => match self.lambda_body_value(*node) {
                    Some(value) => self.expression_text(value),
                    None => Err(self.template_error(call, placeholder, TemplateFailure::Unsupported)),
                },
                _ => Err(self.template_error(call, placeholder, TemplateFailure::Unsupported)),
            },
            Modifier::Plain => match bound {
                Bound::Slot(ArgSlot::Single(node)) => {
                    if let Some(Expr::AnonymousObject { initializers }) = self.expr(*node) {
                        self.plain_object_text(initializers)
                    } else {
                        self.expression_text(*node)
                    }
                }
                Bound::Slot(slot) => self.slot_text(slot),
                _ => Err(self.template_error(call, placeholder, TemplateFailure::Unsupported)),
            },
            Modifier::Raw => match self.bound_constant(bound) {
                Some(ConstValue::String(text)) => Ok(text),
                _ => Err(self.template_error(call, placeholder, TemplateFailure::NonLiteral)),
            },
            Modifier::Default | Modifier::DefaultFn => {
                let ty = match bound {
                    Bound::TypeArgument(ty) | Bound::Slot(ArgSlot::Default(_, ty)) => *ty,
                    Bound::Slot(ArgSlot::Single(node)) => match self.type_of(*node) {
                        Some(ty) => ty,
                        None => return Err(self.template_error(call, placeholder, TemplateFailure::Unsupported)),
                    },
                    _ => return Err(self.template_error(call, placeholder, TemplateFailure::Unsupported)),
                };
                let value = self.default_value_text(ty);
                if placeholder.modifier == Modifier::DefaultFn {
                    Ok(format!("function () {{ return {value}; }}"))
                } else {
                    Ok(value)
                }
            }
            Modifier::Version => match self.bound_constant(bound) {
                Some(value) => match value.as_i64() {
                    Some(count) if (0..=MAX_VERSION_FIELD_COUNT).contains(&count) => {
                        Ok(count.to_string())
                    }
                    Some(count) => Err(EmitError::InvalidFieldCount {
                        node: call.node,
                        span: self.span(call.node),
                        value: count.to_string(),
                    }),
                    None => Err(self.template_error(call, placeholder, TemplateFailure::NonLiteral)),
                },
                None => Err(self.template_error(call, placeholder, TemplateFailure::NonLiteral)),
            },
        }
    }

    /// Rewrite `callee(lead, ` at the end of `out` into
    /// `callee.apply(context, [lead].concat(array)` so that the template's
    /// own closing parenthesis finishes the call.
    fn splice_apply(
        &self,
        call: &TemplateCall<'_>,
        placeholder: &Placeholder,
        out: &mut String,
        array: &str,
    ) -> EmitResult<()> {
        let Some(open) = find_open_paren(out) else {
            return Err(self.template_error(call, placeholder, TemplateFailure::Unsupported));
        };
        let callee_start = out[..open]
            .rfind(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '$' | '.')))
            .map_or(0, |i| i + 1);
        let callee = out[callee_start..open].to_string();
        if callee.is_empty() {
            return Err(self.template_error(call, placeholder, TemplateFailure::Unsupported));
        }
        let lead = out[open + 1..]
            .trim_end()
            .trim_end_matches(',')
            .trim()
            .to_string();
        let context = callee
            .rfind('.')
            .map_or("null", |dot| &callee[..dot])
            .to_string();
        let arguments = if lead.is_empty() {
            array.to_string()
        } else {
            format!("[{lead}].concat({array})")
        };
        out.truncate(callee_start);
        out.push_str(&format!("{callee}.apply({context}, {arguments}"));
        Ok(())
    }

    // =========================================================================
    // Placeholder Values
    // =========================================================================

    fn receiver_text(&mut self, this: &ThisArg) -> EmitResult<String> {
        match this {
            ThisArg::None => Ok("this".to_string()),
            ThisArg::Node(node) => self.expression_text(*node),
            ThisArg::Text(text) => Ok(text.clone()),
        }
    }

    pub(crate) fn slot_text(&mut self, slot: &ArgSlot) -> EmitResult<String> {
        match slot {
            ArgSlot::Single(node) => self.expression_text(*node),
            ArgSlot::Params { elements, expanded } => self.params_text(elements, *expanded, false),
            ArgSlot::Default(value, ty) => Ok(self.constant_text(value, Some(*ty))),
            ArgSlot::Text(text) => Ok(text.clone()),
            ArgSlot::Missing => Ok("undefined".to_string()),
        }
    }

    /// A `params` tail: spliced (`a, b`) or wrapped (`[a, b]`).
    pub(crate) fn params_text(
        &mut self,
        elements: &[NodeId],
        expanded: bool,
        spread: bool,
    ) -> EmitResult<String> {
        let texts = elements
            .iter()
            .map(|&e| self.expression_text(e))
            .collect::<EmitResult<Vec<_>>>()?;
        if expanded && !spread {
            Ok(format!("[{}]", texts.join(", ")))
        } else {
            Ok(texts.join(", "))
        }
    }

    /// Whether the rendered text of `placeholder` runs an impure argument,
    /// so that repeating it would repeat the side effect.
    fn evaluates_argument(&self, placeholder: &Placeholder, bound: &Bound<'_>) -> bool {
        match placeholder.modifier {
            Modifier::None | Modifier::Array | Modifier::Plain | Modifier::Tmp => {
                !self.bound_is_pure(bound)
            }
            Modifier::Type => match bound {
                Bound::Slot(ArgSlot::Single(node)) => {
                    self.type_of(*node).is_none_or(|ty| !self.is_nameable(ty))
                        && !self.is_pure(*node)
                }
                Bound::Receiver(_) => !self.bound_is_pure(bound),
                _ => false,
            },
            Modifier::Body => match bound {
                Bound::Slot(ArgSlot::Single(node)) => self
                    .lambda_body_value(*node)
                    .is_some_and(|value| !self.is_pure(value)),
                _ => false,
            },
            Modifier::GetTmp
            | Modifier::Raw
            | Modifier::Default
            | Modifier::DefaultFn
            | Modifier::Version => false,
        }
    }

    fn bound_is_pure(&self, bound: &Bound<'_>) -> bool {
        match bound {
            Bound::Receiver(ThisArg::Node(node)) | Bound::Slot(ArgSlot::Single(node)) => {
                self.is_pure(*node)
            }
            Bound::Slot(ArgSlot::Params { elements, .. }) => {
                elements.iter().all(|&e| self.is_pure(e))
            }
            _ => true,
        }
    }

    fn bound_constant(&self, bound: &Bound<'_>) -> Option<ConstValue> {
        match bound {
            Bound::Slot(ArgSlot::Single(node)) => self.fact(*node).constant.clone(),
            Bound::Slot(ArgSlot::Default(value, _)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Value expression of a parameterless lambda: its expression body or
    /// the operand of a single `return`.
    fn lambda_body_value(&self, node: NodeId) -> Option<NodeId> {
        let Some(Expr::Lambda { body, .. }) = self.expr(node) else {
            return None;
        };
        let nodes = self.model.nodes();
        if nodes.expr(*body).is_some() {
            return Some(*body);
        }
        match nodes.stmt(*body)? {
            Stmt::Block(stmts) if stmts.len() == 1 => match nodes.stmt(stmts[0])? {
                Stmt::Return(value) => *value,
                _ => None,
            },
            Stmt::Return(value) => *value,
            _ => None,
        }
    }

    /// Types whose name is enough to identify the runtime type of a value.
    pub(crate) fn is_nameable(&self, ty: TypeId) -> bool {
        let data = self.model.types().get(ty);
        data.is_sealed
            || matches!(data.kind, TypeKind::Enum | TypeKind::Array | TypeKind::Delegate)
            || data.known.is_some_and(|k| {
                k.is_numeric() || matches!(k, KnownType::Boolean | KnownType::Char | KnownType::String)
            })
    }

    /// JavaScript default value of `ty`.
    pub(crate) fn default_value_text(&mut self, ty: TypeId) -> String {
        let types = self.model.types();
        if types.nullable_underlying(ty).is_some() {
            return "null".to_string();
        }
        let data = types.get(ty);
        match data.kind {
            TypeKind::TypeParameter => {
                let name = self.type_alias(ty);
                return format!("{}({name})", self.rt("getDefaultValue"));
            }
            TypeKind::Enum => return "0".to_string(),
            TypeKind::Struct => {}
            _ => return "null".to_string(),
        }
        match data.known {
            Some(KnownType::Boolean) => "false".to_string(),
            Some(KnownType::Decimal) => format!("{}(0)", self.rt("Decimal")),
            Some(k) if k.is_long() => format!("{}(0)", self.rt("Long")),
            Some(k) if k.is_numeric() => "0".to_string(),
            _ => {
                let name = self.type_alias(ty);
                format!("{}({name})", self.rt("getDefaultValue"))
            }
        }
    }

    // =========================================================================
    // Errors
    // =========================================================================

    fn template_error(
        &self,
        call: &TemplateCall<'_>,
        placeholder: &Placeholder,
        failure: TemplateFailure,
    ) -> EmitError {
        let node = call.node;
        let span = self.span(node);
        let member = self.member_display_name(call.member);
        let placeholder = format!("{{{}}}", placeholder.raw);
        match failure {
            TemplateFailure::Unresolved => EmitError::UnresolvedTemplatePlaceholder {
                node,
                span,
                member,
                placeholder,
            },
            TemplateFailure::Unsupported => EmitError::UnsupportedTemplateModifier {
                node,
                span,
                member,
                placeholder,
            },
            TemplateFailure::NonLiteral => EmitError::NonLiteralTemplateArgument {
                node,
                span,
                member,
                placeholder,
            },
        }
    }

    /// `Namespace.Type.Member`, for diagnostics.
    pub(crate) fn member_display_name(&self, member: MemberId) -> String {
        let data = self.model.members().get(member);
        let owner = definition_key(self.model.types(), data.declaring_type);
        format!("{owner}.{}", data.name)
    }
}

/// Byte offset of the innermost unclosed `(` in `text`.
fn find_open_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' if depth == 0 => return Some(i),
            '(' => depth -= 1,
            _ => {}
        }
    }
    None
}
