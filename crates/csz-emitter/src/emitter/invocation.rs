use csz_semantic::{
    Argument, Expr, FactKind, MemberData, MemberId, MemberKind, NodeId, SemanticFact, TypeId,
    TypeKind,
};
use tracing::{debug, trace};

use super::Printer;
use super::templates::{ArgSlot, TemplateCall, ThisArg};
use crate::error::{EmitError, EmitResult};

const DELEGATE_METHODS: [&str; 3] = ["Invoke", "BeginInvoke", "EndInvoke"];

impl<'a> Printer<'a> {
    // =========================================================================
    // Names and Member Access
    // =========================================================================

    pub(super) fn emit_name(&mut self, node: NodeId, name: &str) -> EmitResult<()> {
        let fact = self.fact(node);
        if let Some(constant) = &fact.constant {
            let text = self.constant_text(constant, fact.ty);
            self.write(&text);
            return Ok(());
        }
        match fact.kind {
            FactKind::LocalVariable => {
                let local = self.locals.resolve(name);
                self.write(&local);
            }
            FactKind::TypeName => {
                let text = match fact.ty {
                    Some(ty) => self.type_alias(ty),
                    None => name.to_string(),
                };
                self.write(&text);
            }
            FactKind::ThisRead => self.write("this"),
            _ => match fact.member {
                Some(member) => {
                    let text = self.member_reference(node, None, member)?;
                    self.write(&text);
                }
                None => self.write(name),
            },
        }
        Ok(())
    }

    pub(super) fn emit_member_access(
        &mut self,
        node: NodeId,
        target: NodeId,
        name: &str,
    ) -> EmitResult<()> {
        let text = match self.fact(node).member {
            Some(member) => self.member_reference(node, Some(target), member)?,
            None => {
                let target = self.expression_text(target)?;
                format!("{target}.{name}")
            }
        };
        self.write(&text);
        Ok(())
    }

    /// A field, property or method group read through `target` (or
    /// implicit `this` / the declaring type when `target` is `None`).
    fn member_reference(
        &mut self,
        node: NodeId,
        target: Option<NodeId>,
        member: MemberId,
    ) -> EmitResult<String> {
        let data = self.model.members().get(member);
        if let Some(template) = &data.attributes.template
            && data.kind != MemberKind::Method
        {
            let this = self.this_arg(target, data);
            return self.apply_template(&TemplateCall {
                node,
                member,
                template,
                this,
                slots: Vec::new(),
                type_arguments: Vec::new(),
            });
        }

        let name = self.member_name(member);
        if data.kind == MemberKind::Method {
            return self.method_group(node, target, member);
        }
        let owner = self.owner_text(target, data)?;
        Ok(format!("{owner}.{name}"))
    }

    /// Receiver text for an instance member, or the declaring type for a
    /// static one.
    fn owner_text(&mut self, target: Option<NodeId>, data: &MemberData) -> EmitResult<String> {
        match target {
            Some(target) if self.fact(target).kind == FactKind::TypeName || !data.is_static => {
                if matches!(self.expr(target), Some(Expr::Base)) {
                    return Ok("this".to_string());
                }
                self.expression_text(target)
            }
            _ if data.is_static => Ok(self.type_alias(data.declaring_type)),
            _ => Ok("this".to_string()),
        }
    }

    fn this_arg(&self, target: Option<NodeId>, data: &MemberData) -> ThisArg {
        match target {
            _ if data.is_static && !data.is_extension => ThisArg::None,
            Some(target) => ThisArg::Node(target),
            None => ThisArg::Text("this".to_string()),
        }
    }

    /// Method group converted to a delegate.
    fn method_group(
        &mut self,
        node: NodeId,
        target: Option<NodeId>,
        member: MemberId,
    ) -> EmitResult<String> {
        let data = self.model.members().get(member);
        if let Some(template) = &data.attributes.template {
            let params: Vec<String> = data.parameters.iter().map(|p| p.name.clone()).collect();
            let this = match target {
                Some(target) if !data.is_static => {
                    let text = self.expression_text(target)?;
                    let (init, reference) = self.hoist_if_impure(target, text);
                    (init, ThisArg::Text(reference))
                }
                None if !data.is_static => (None, ThisArg::Text("this".to_string())),
                _ => (None, ThisArg::None),
            };
            let body = self.apply_template(&TemplateCall {
                node,
                member,
                template,
                this: this.1.clone(),
                slots: params.iter().cloned().map(ArgSlot::Text).collect(),
                type_arguments: Vec::new(),
            })?;
            let function = format!("function ({}) {{ return {body}; }}", params.join(", "));
            let self_bound = template.starts_with("<self>");
            let text = match (&this.1, self_bound) {
                (ThisArg::Text(receiver), true) => {
                    format!("{}({receiver}, {function})", self.rt("fn.bind"))
                }
                _ => function,
            };
            return Ok(match this.0 {
                Some(init) => format!("({init}, {text})"),
                None => text,
            });
        }

        let name = self.member_name(member);
        if data.is_static {
            let owner = self.owner_text(target, data)?;
            return Ok(format!("{owner}.{name}"));
        }
        let receiver = match target {
            Some(target) if !matches!(self.expr(target), Some(Expr::Base)) => {
                let text = self.expression_text(target)?;
                self.hoist_if_impure(target, text)
            }
            _ => (None, "this".to_string()),
        };
        let (init, receiver) = receiver;
        let bound = format!("{}({receiver}, {receiver}.{name})", self.rt("fn.bind"));
        Ok(match init {
            Some(init) => format!("({init}, {bound})"),
            None => bound,
        })
    }

    // =========================================================================
    // Invocation
    // =========================================================================

    pub(super) fn emit_invocation(
        &mut self,
        node: NodeId,
        target: NodeId,
        args: &[Argument],
    ) -> EmitResult<()> {
        let fact = self.fact(node);
        if fact.kind == FactKind::DynamicInvocation {
            return self.emit_dynamic_invocation(node, target, args, fact);
        }
        let Some(member) = fact.member else {
            // Delegate or otherwise unresolved callee.
            let callee = self.expression_text(target)?;
            let args = self.plain_arguments(args)?;
            self.write(&format!("{callee}({args})"));
            return Ok(());
        };
        let text = self.invocation_text(node, target, args, fact, member)?;
        if let Some(text) = text {
            self.write(&text);
        }
        Ok(())
    }

    fn emit_dynamic_invocation(
        &mut self,
        node: NodeId,
        target: NodeId,
        args: &[Argument],
        fact: &'a SemanticFact,
    ) -> EmitResult<()> {
        let members = self.model.members();
        let matching: Vec<MemberId> = fact
            .candidates
            .iter()
            .copied()
            .filter(|&m| accepts_argument_count(members.get(m), args.len()))
            .collect();
        let name = match self.expr(target) {
            Some(Expr::MemberAccess { name, .. } | Expr::Name(name)) => name.clone(),
            _ => "<dynamic>".to_string(),
        };
        trace!(%name, candidates = fact.candidates.len(), matching = matching.len(), "dynamic call");
        match matching.as_slice() {
            [] => {
                let callee = self.expression_text(target)?;
                let args = self.plain_arguments(args)?;
                self.write(&format!("{callee}({args})"));
                Ok(())
            }
            [member] => {
                let mut resolved = fact.clone();
                resolved.kind = FactKind::Invocation;
                resolved.member = Some(*member);
                // Arguments of a dynamic call are always positional.
                resolved.argument_map.clear();
                resolved.expanded_form = members.get(*member).params_index().is_some();
                let resolved: &SemanticFact = &resolved;
                if let Some(text) = self.invocation_text(node, target, args, resolved, *member)? {
                    self.write(&text);
                }
                Ok(())
            }
            many => Err(EmitError::AmbiguousDynamicCall {
                node,
                span: self.span(node),
                name,
                candidates: many.len(),
                arguments: args.len(),
            }),
        }
    }

    /// Text of a resolved call, or `None` when the call is removed.
    fn invocation_text(
        &mut self,
        node: NodeId,
        target: NodeId,
        args: &[Argument],
        fact: &SemanticFact,
        member: MemberId,
    ) -> EmitResult<Option<String>> {
        let types = self.model.types();
        let data = self.model.members().get(member);
        let owner = types.get(data.declaring_type);

        if owner.kind == TypeKind::Delegate && DELEGATE_METHODS.contains(&data.name.as_str()) {
            return Err(EmitError::DirectDelegateInvoke {
                node,
                span: self.span(node),
                method: data.name.clone(),
            });
        }
        if data.attributes.partial_without_body {
            debug!(member = %data.name, "call to partial method without body removed");
            self.suppressed = true;
            return Ok(None);
        }
        if let Some(symbol) = &data.attributes.conditional
            && !self.options.is_symbol_defined(symbol)
        {
            debug!(member = %data.name, %symbol, "conditional call removed");
            self.suppressed = true;
            return Ok(None);
        }

        let receiver = match self.expr(target) {
            Some(Expr::MemberAccess { target, .. }) => Some(*target),
            _ => None,
        };
        let is_base = receiver.is_some_and(|r| matches!(self.expr(r), Some(Expr::Base)));
        let extension_receiver = if data.is_extension && fact.is_extension_call {
            receiver
        } else {
            None
        };
        let slots = self.bind_arguments(data, args, fact, extension_receiver);

        if let Some(template) = &data.attributes.template
            && !is_base
        {
            let this = match extension_receiver {
                Some(receiver) => ThisArg::Node(receiver),
                None => self.this_arg(receiver, data),
            };
            return self
                .apply_template(&TemplateCall {
                    node,
                    member,
                    template,
                    this,
                    slots,
                    type_arguments: fact.type_arguments.clone(),
                })
                .map(Some);
        }

        let mut leading = self.generic_arguments(data, fact);
        let mut arguments = self.slot_arguments(data, &slots)?;
        leading.append(&mut arguments.leading);
        arguments.leading = leading;
        let name = self.member_name(member);

        let text = if data.is_extension {
            // Receiver syntax binds the receiver as the first slot.
            let owner = self.type_alias(data.declaring_type);
            arguments.call(&format!("{owner}.{name}"), &owner)
        } else if is_base {
            let base = self.type_alias(data.declaring_type);
            let method = format!("{base}.prototype.{name}");
            if arguments.spread.is_some() {
                arguments.call(&method, "this")
            } else {
                arguments.leading.insert(0, "this".to_string());
                format!("{method}.call({})", arguments.leading.join(", "))
            }
        } else if data.is_static {
            let owner = self.owner_text(receiver, data)?;
            arguments.call(&format!("{owner}.{name}"), &owner)
        } else {
            let (init, receiver) = match receiver {
                Some(receiver) => {
                    let text = self.expression_text(receiver)?;
                    if arguments.spread.is_some() {
                        self.hoist_if_impure(receiver, text)
                    } else {
                        (None, text)
                    }
                }
                None => (None, "this".to_string()),
            };
            let callee = if owner.kind == TypeKind::Interface && !owner.attributes.external {
                let interface = self.type_alias(data.declaring_type);
                format!("{}({receiver}, {interface}, \"{name}\")", self.rt("iface"))
            } else {
                format!("{receiver}.{name}")
            };
            let call = arguments.call(&callee, &receiver);
            match init {
                Some(init) => format!("({init}, {call})"),
                None => call,
            }
        };
        Ok(Some(text))
    }

    /// Type arguments passed as leading arguments of a generic method.
    fn generic_arguments(&mut self, data: &MemberData, fact: &SemanticFact) -> Vec<String> {
        if data.type_parameters.is_empty() || data.attributes.ignore_generics {
            return Vec::new();
        }
        fact.type_arguments
            .iter()
            .map(|&ty| self.type_alias(ty))
            .collect()
    }

    // =========================================================================
    // Argument Binding
    // =========================================================================

    /// Bind call arguments to the parameters of `data`.
    pub(super) fn bind_arguments(
        &self,
        data: &MemberData,
        args: &[Argument],
        fact: &SemanticFact,
        extension_receiver: Option<NodeId>,
    ) -> Vec<ArgSlot> {
        let params = &data.parameters;
        let mut slots = vec![ArgSlot::Missing; params.len()];
        let mut tail = Vec::new();
        let offset = match extension_receiver {
            Some(receiver) if !slots.is_empty() => {
                slots[0] = ArgSlot::Single(receiver);
                1
            }
            _ => 0,
        };
        let params_index = data.params_index();

        for (i, arg) in args.iter().enumerate() {
            let index = match &arg.name {
                Some(name) => data.parameter_index(name),
                None => Some(fact.argument_map.get(i).copied().unwrap_or(i + offset)),
            };
            let Some(index) = index else {
                continue;
            };
            match params.get(index) {
                Some(param) if param.is_params => tail.push(arg.value),
                Some(_) => slots[index] = ArgSlot::Single(arg.value),
                None if params_index.is_some() => tail.push(arg.value),
                None => {}
            }
        }
        if let Some(index) = params_index {
            slots[index] = ArgSlot::Params {
                elements: tail,
                expanded: fact.expanded_form,
            };
        }
        for (slot, param) in slots.iter_mut().zip(params) {
            if *slot == ArgSlot::Missing
                && let Some(default) = &param.default
            {
                *slot = ArgSlot::Default(default.clone(), param.ty);
            }
        }
        slots
    }

    /// Argument texts of a plain call; trailing omitted parameters are dropped.
    ///
    /// An `expandParams` member given its `params` array directly gets that
    /// array as [`CallArguments::spread`].
    fn slot_arguments(&mut self, data: &MemberData, slots: &[ArgSlot]) -> EmitResult<CallArguments> {
        let used = slots
            .iter()
            .rposition(|s| *s != ArgSlot::Missing)
            .map_or(0, |i| i + 1);
        let mut arguments = CallArguments {
            leading: Vec::with_capacity(used),
            spread: None,
        };
        for slot in &slots[..used] {
            let text = match slot {
                ArgSlot::Params {
                    elements,
                    expanded: false,
                } if data.attributes.expand_params => {
                    arguments.spread = Some(match elements.first() {
                        Some(&array) => self.expression_text(array)?,
                        None => "[]".to_string(),
                    });
                    continue;
                }
                ArgSlot::Params { elements, expanded } => {
                    let spread = data.attributes.expand_params;
                    self.params_text(elements, *expanded, spread)?
                }
                other => self.slot_text(other)?,
            };
            if !text.is_empty() {
                arguments.leading.push(text);
            }
        }
        Ok(arguments)
    }

    fn plain_arguments(&mut self, args: &[Argument]) -> EmitResult<String> {
        let texts = args
            .iter()
            .map(|a| self.expression_text(a.value))
            .collect::<EmitResult<Vec<_>>>()?;
        Ok(texts.join(", "))
    }

    // =========================================================================
    // Object Creation
    // =========================================================================

    pub(super) fn emit_object_creation(
        &mut self,
        node: NodeId,
        args: &[Argument],
    ) -> EmitResult<()> {
        let fact = self.fact(node);
        let Some(ty) = fact.ty else {
            let args = self.plain_arguments(args)?;
            self.write(&format!("new Object({args})"));
            return Ok(());
        };
        let types = self.model.types();
        let data = types.get(ty);

        if data.kind == TypeKind::TypeParameter {
            let name = self.type_alias(ty);
            self.write(&format!("{}({name})", self.rt("createInstance")));
            return Ok(());
        }
        if data.kind == TypeKind::Delegate
            && let [arg] = args
        {
            return self.emit_expression(arg.value);
        }

        let ctor = match fact.member {
            Some(ctor) => Some(ctor),
            None => self.select_constructor(node, ty, args.len())?,
        };
        let Some(ctor) = ctor else {
            let alias = self.type_alias(ty);
            let args = self.plain_arguments(args)?;
            self.write(&format!("new {alias}({args})"));
            return Ok(());
        };

        let ctor_data = self.model.members().get(ctor);
        let slots = self.bind_arguments(ctor_data, args, fact, None);
        if let Some(template) = &ctor_data.attributes.template {
            let text = self.apply_template(&TemplateCall {
                node,
                member: ctor,
                template,
                this: ThisArg::None,
                slots,
                type_arguments: Vec::new(),
            })?;
            self.write(&text);
            return Ok(());
        }

        let alias = self.type_alias(ty);
        let arguments = self.slot_arguments(ctor_data, &slots)?;
        let constructor = match ctor_data.overload_index {
            0 => alias,
            _ => format!("{alias}.{}", self.member_name(ctor)),
        };
        let text = match &arguments.spread {
            None => format!("new {constructor}({})", arguments.leading.join(", ")),
            Some(array) => {
                let mut bound = vec!["null".to_string()];
                bound.extend(arguments.leading.iter().cloned());
                format!(
                    "new (Function.prototype.bind.apply({constructor}, [{}].concat({array})))()",
                    bound.join(", ")
                )
            }
        };
        self.write(&text);
        Ok(())
    }

    /// Constructor of `ty` accepting `argc` arguments when the resolver left
    /// the choice open.
    fn select_constructor(
        &mut self,
        node: NodeId,
        ty: TypeId,
        argc: usize,
    ) -> EmitResult<Option<MemberId>> {
        let types = self.model.types();
        let members = self.model.members();
        let candidates: Vec<MemberId> = types
            .get(types.definition_of(ty))
            .members
            .iter()
            .copied()
            .filter(|&m| {
                let data = members.get(m);
                data.kind == MemberKind::Constructor
                    && !data.is_static
                    && accepts_argument_count(data, argc)
            })
            .collect();
        match candidates.as_slice() {
            [] => Ok(None),
            [ctor] => Ok(Some(*ctor)),
            many => Err(EmitError::AmbiguousConstructor {
                node,
                span: self.span(node),
                type_name: self.to_name(ty, super::NameOptions::STATIC),
                candidates: many.len(),
                arguments: argc,
            }),
        }
    }

    // =========================================================================
    // Element Access
    // =========================================================================

    pub(super) fn emit_element_access(
        &mut self,
        node: NodeId,
        target: NodeId,
        args: &[NodeId],
    ) -> EmitResult<()> {
        let text = self.element_read_text(node, target, args)?;
        self.write(&text);
        Ok(())
    }

    fn element_read_text(
        &mut self,
        node: NodeId,
        target: NodeId,
        args: &[NodeId],
    ) -> EmitResult<String> {
        let fact = self.fact(node);
        if let Some(member) = fact.member
            && let Some(template) = &self.model.members().get(member).attributes.template
        {
            let data = self.model.members().get(member);
            let argument_list: Vec<Argument> =
                args.iter().map(|&a| Argument::positional(a)).collect();
            let slots = self.bind_arguments(data, &argument_list, fact, None);
            return self.apply_template(&TemplateCall {
                node,
                member,
                template,
                this: ThisArg::Node(target),
                slots,
                type_arguments: Vec::new(),
            });
        }

        self.check_index_count(node, target, args)?;
        let target_text = self.expression_text(target)?;
        let indices = args
            .iter()
            .map(|&a| self.expression_text(a))
            .collect::<EmitResult<Vec<_>>>()?;
        Ok(if self.is_native_subscript(node, target) {
            format!("{target_text}[{}]", indices.join(", "))
        } else {
            format!("{target_text}.get([{}])", indices.join(", "))
        })
    }

    /// Single-dimension arrays (and untyped targets) use `t[i]`; everything
    /// else goes through `get`/`set` accessors.
    pub(super) fn is_native_subscript(&self, node: NodeId, target: NodeId) -> bool {
        let fact = self.fact(node);
        if fact.member.is_some() {
            return false;
        }
        match self.type_of(target) {
            Some(ty) => {
                let data = self.model.types().get(ty);
                data.kind != TypeKind::Array || data.rank <= 1
            }
            None => true,
        }
    }

    /// More than one index on a single-dimension indexer is a hard error.
    pub(super) fn check_index_count(
        &mut self,
        node: NodeId,
        target: NodeId,
        args: &[NodeId],
    ) -> EmitResult<()> {
        let fact = self.fact(node);
        let dimensions = match fact.member {
            Some(member) => self.model.members().get(member).parameters.len(),
            None => match self.type_of(target) {
                Some(ty) => {
                    let data = self.model.types().get(ty);
                    if data.kind == TypeKind::Array {
                        data.rank.max(1) as usize
                    } else {
                        1
                    }
                }
                None => args.len(),
            },
        };
        if dimensions == 1 && args.len() > 1 {
            let target_name = match self.type_of(target) {
                Some(ty) => self.to_name(ty, super::NameOptions::STATIC),
                None => "<unknown>".to_string(),
            };
            return Err(EmitError::MultiIndexOnSingleDimension {
                node,
                span: self.span(node),
                target: target_name,
                count: args.len(),
            });
        }
        Ok(())
    }
}

/// Arguments of a plain call.
struct CallArguments {
    leading: Vec<String>,
    /// Array whose elements complete the argument list at run time.
    spread: Option<String>,
}

impl CallArguments {
    /// `callee(a, b)`, or `callee.apply(context, ...)` when the tail is an array.
    fn call(&self, callee: &str, context: &str) -> String {
        match &self.spread {
            None => format!("{callee}({})", self.leading.join(", ")),
            Some(array) => format!("{callee}.apply({context}, {})", self.apply_list(array)),
        }
    }

    /// The argument array of an `apply` call: `array` itself, or the leading
    /// arguments concatenated with it.
    fn apply_list(&self, array: &str) -> String {
        if self.leading.is_empty() {
            array.to_string()
        } else {
            format!("[{}].concat({array})", self.leading.join(", "))
        }
    }
}

/// Whether a member can be called with `argc` positional arguments.
fn accepts_argument_count(data: &MemberData, argc: usize) -> bool {
    let params = &data.parameters;
    let required = params
        .iter()
        .filter(|p| !p.is_params && p.default.is_none())
        .count();
    if data.params_index().is_some() {
        argc >= required
    } else {
        argc >= required && argc <= params.len()
    }
}
