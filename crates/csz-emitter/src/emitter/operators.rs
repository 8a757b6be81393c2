use csz_semantic::{BinaryOp, Expr, KnownType, NodeId, TypeId, TypeKind, UnaryOp};
use tracing::trace;

use super::Printer;
use super::templates::{ArgSlot, TemplateCall, ThisArg};
use crate::error::EmitResult;
use crate::strategy::{
    NumericClass, OperandClass, binary_lowering, is_overflow_checked, unary_lowering,
};

impl<'a> Printer<'a> {
    // =========================================================================
    // Literals
    // =========================================================================

    pub(super) fn emit_literal(&mut self, node: NodeId) -> EmitResult<()> {
        let fact = self.fact(node);
        let value = match (&fact.constant, self.expr(node)) {
            (Some(constant), _) => constant,
            (None, Some(Expr::Literal(value))) => value,
            _ => return Ok(()),
        };
        let text = self.constant_text(value, fact.ty);
        self.write(&text);
        Ok(())
    }

    // =========================================================================
    // Binary and Unary Operators
    // =========================================================================

    pub(super) fn emit_binary(
        &mut self,
        node: NodeId,
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    ) -> EmitResult<()> {
        let fact = self.fact(node);
        if let Some(member) = fact.member {
            let text = self.user_operator_text(node, member, &[left, right], fact.lifted)?;
            self.write(&text);
            return Ok(());
        }

        let class = self.binary_class(op, left, right);
        let lowering = binary_lowering(op, class);
        trace!(?op, ?class, ?lowering, "binary lowering");
        let left = self.expression_text(left)?;
        let right = self.expression_text(right)?;
        let text = lowering.render(op, &left, &right, &self.options.runtime_namespace);
        let text = self.checked_text(node, op, class, text);
        self.write(&text);
        Ok(())
    }

    /// Operand classification of `left op right`; string concatenation is
    /// always native.
    pub(super) fn binary_class(&self, op: BinaryOp, left: NodeId, right: NodeId) -> OperandClass {
        let left = self.type_of(left);
        let right = self.type_of(right);
        if op == BinaryOp::Add
            && (self.is_known(left, KnownType::String) || self.is_known(right, KnownType::String))
        {
            return OperandClass::NATIVE;
        }
        OperandClass::of_operands(self.model.types(), left, right)
    }

    /// Overflow check around 32-bit arithmetic in a `checked` context.
    pub(super) fn checked_text(
        &mut self,
        node: NodeId,
        op: BinaryOp,
        class: OperandClass,
        text: String,
    ) -> String {
        let fact = self.fact(node);
        if !fact.checked
            || class.nullable
            || class.numeric != NumericClass::Integer
            || !is_overflow_checked(op)
        {
            return text;
        }
        let ty = match fact.ty {
            Some(ty) => self.type_alias(ty),
            None => self.rt("Int32"),
        };
        format!("{}({text}, {ty})", self.rt("Int.check"))
    }

    /// Call of a user-defined operator, lifted over nullable operands when
    /// the resolver chose the lifted form.
    pub(super) fn user_operator_text(
        &mut self,
        node: NodeId,
        member: csz_semantic::MemberId,
        operands: &[NodeId],
        lifted: bool,
    ) -> EmitResult<String> {
        let data = self.model.members().get(member);
        if let Some(template) = &data.attributes.template {
            return self.apply_template(&TemplateCall {
                node,
                member,
                template,
                this: ThisArg::None,
                slots: operands.iter().map(|&o| ArgSlot::Single(o)).collect(),
                type_arguments: Vec::new(),
            });
        }
        let owner = self.type_alias(data.declaring_type);
        let name = self.member_name(member);
        let args = operands
            .iter()
            .map(|&o| self.expression_text(o))
            .collect::<EmitResult<Vec<_>>>()?
            .join(", ");
        Ok(if lifted {
            let lift = if operands.len() == 1 { "lift1" } else { "lift2" };
            format!("{}({owner}.{name}, {args})", self.rt(&format!("Nullable.{lift}")))
        } else {
            format!("{owner}.{name}({args})")
        })
    }

    pub(super) fn emit_unary(&mut self, node: NodeId, op: UnaryOp, operand: NodeId) -> EmitResult<()> {
        if op.is_increment_or_decrement() {
            return self.emit_increment(node, op, operand);
        }
        let fact = self.fact(node);
        if let Some(member) = fact.member {
            let text = self.user_operator_text(node, member, &[operand], fact.lifted)?;
            self.write(&text);
            return Ok(());
        }
        let class = OperandClass::of_type(self.model.types(), self.type_of(operand));
        let lowering = unary_lowering(op, class);
        let operand = self.expression_text(operand)?;
        let text = lowering.render(op, &operand, &self.options.runtime_namespace);
        let text = if op == UnaryOp::Minus {
            // Negation overflows like subtraction from zero.
            self.checked_text(node, BinaryOp::Sub, class, text)
        } else {
            text
        };
        self.write(&text);
        Ok(())
    }

    pub(super) fn emit_conditional(
        &mut self,
        condition: NodeId,
        when_true: NodeId,
        when_false: NodeId,
    ) -> EmitResult<()> {
        self.emit_expression(condition)?;
        self.write(" ? ");
        self.emit_expression(when_true)?;
        self.write(" : ");
        self.emit_expression(when_false)
    }

    // =========================================================================
    // Type Operators
    // =========================================================================

    pub(super) fn emit_type_of(&mut self, ty: TypeId) -> EmitResult<()> {
        let alias = self.type_alias(ty);
        self.write(&alias);
        Ok(())
    }

    /// `(T)x`, `x is T` and `x as T`.
    pub(super) fn emit_type_check(
        &mut self,
        node: NodeId,
        helper: &str,
        operand: NodeId,
        ty: TypeId,
    ) -> EmitResult<()> {
        let source = self.type_of(operand);
        let value = self.expression_text(operand)?;
        if helper == "cast" {
            if source == Some(ty) {
                self.write(&value);
                return Ok(());
            }
            if let Some(text) = self.numeric_conversion(source, ty, &value) {
                trace!(node = node.0, "numeric conversion");
                self.write(&text);
                return Ok(());
            }
        }
        let alias = self.type_alias(ty);
        self.write(&format!("{}({value}, {alias})", self.rt(helper)));
        Ok(())
    }

    /// Conversion between numeric representations, or `None` when either
    /// side is not numeric.
    fn numeric_conversion(&self, source: Option<TypeId>, target: TypeId, value: &str) -> Option<String> {
        let types = self.model.types();
        let source = source?;
        if types.nullable_underlying(source).is_some() || types.nullable_underlying(target).is_some() {
            return None;
        }
        let from = types.primitive_code(source).filter(|k| k.is_numeric())?;
        let to = types.primitive_code(target).filter(|k| k.is_numeric())?;
        let from_class = OperandClass::of_type(types, Some(source)).numeric;
        let to_class = OperandClass::of_type(types, Some(target)).numeric;
        if types.get(target).kind == TypeKind::Enum && from_class == NumericClass::Integer {
            return Some(value.to_string());
        }
        let number = match from_class {
            NumericClass::Decimal | NumericClass::Long => {
                format!("{}.toNumber({value})", self.rt(from_class.helper_namespace()))
            }
            _ => value.to_string(),
        };
        Some(match to_class {
            _ if from == to => value.to_string(),
            NumericClass::Decimal | NumericClass::Long if from_class == to_class => {
                value.to_string()
            }
            NumericClass::Decimal | NumericClass::Long => {
                format!("{}({number})", self.rt(to_class.helper_namespace()))
            }
            NumericClass::Integer => {
                let alias = types.get(target).name.clone();
                format!("{}({number}, \"{alias}\")", self.rt("Int.clip"))
            }
            NumericClass::Native => number,
        })
    }
}
