use csz_semantic::{AssignOp, BinaryOp, Expr, NodeId, UnaryOp};
use tracing::trace;

use super::Printer;
use crate::error::EmitResult;
use crate::strategy::{NumericClass, OperandClass, binary_lowering};

/// Assignable location after its receiver and indices have been evaluated.
#[derive(Debug)]
struct Place {
    /// Temporaries assigned before the location is used.
    init: Vec<String>,
    kind: PlaceKind,
}

#[derive(Debug)]
enum PlaceKind {
    /// Locals, fields, native array slots: plain JavaScript l-values.
    Simple(String),
    /// Indexer or multi-dimensional array reached through `get`/`set`.
    Accessor { receiver: String, indices: String },
}

impl Place {
    fn read(&self) -> String {
        match &self.kind {
            PlaceKind::Simple(text) => text.clone(),
            PlaceKind::Accessor { receiver, indices } => format!("{receiver}.get([{indices}])"),
        }
    }

    fn write(&self, value: &str) -> String {
        match &self.kind {
            PlaceKind::Simple(text) => format!("{text} = {value}"),
            PlaceKind::Accessor { receiver, indices } => {
                format!("{receiver}.set([{indices}], {value})")
            }
        }
    }

    const fn is_accessor(&self) -> bool {
        matches!(self.kind, PlaceKind::Accessor { .. })
    }
}

impl<'a> Printer<'a> {
    // =========================================================================
    // Assignment
    // =========================================================================

    pub(super) fn emit_assignment(
        &mut self,
        node: NodeId,
        op: AssignOp,
        target: NodeId,
        value: NodeId,
    ) -> EmitResult<()> {
        let text = match op {
            AssignOp::Assign => self.simple_assignment(node, target, value)?,
            AssignOp::Compound(op) => self.compound_assignment(node, op, target, value)?,
        };
        self.write(&text);
        Ok(())
    }

    fn simple_assignment(
        &mut self,
        node: NodeId,
        target: NodeId,
        value: NodeId,
    ) -> EmitResult<String> {
        let consumed = self.is_consumed(node);
        let place = self.place(target, false)?;
        let value_text = self.expression_text(value)?;
        if !place.is_accessor() {
            return Ok(place.write(&value_text));
        }
        if !consumed {
            return Ok(place.write(&value_text));
        }
        // `set` has no useful result, so the assigned value is repeated.
        let (init, reference) = self.hoist_if_impure(value, value_text);
        let mut parts = place.init.clone();
        parts.push(place.write(&init.unwrap_or_else(|| reference.clone())));
        parts.push(reference);
        Ok(sequence(parts, true))
    }

    fn compound_assignment(
        &mut self,
        node: NodeId,
        op: BinaryOp,
        target: NodeId,
        value: NodeId,
    ) -> EmitResult<String> {
        let consumed = self.is_consumed(node);
        let fact = self.fact(node);
        let class = self.binary_class(op, target, value);
        let lowering = binary_lowering(op, class);
        let accessor = self.is_accessor_target(target);
        let checked = fact.checked && class.numeric == NumericClass::Integer;
        trace!(?op, ?class, ?lowering, accessor, "compound assignment");

        if fact.member.is_none() && lowering.is_native() && !accessor && !checked {
            let target = self.expression_text(target)?;
            let value = self.expression_text(value)?;
            return Ok(format!("{target} {}= {value}", op.token()));
        }

        let place = self.place(target, true)?;
        let current = place.read();
        let combined = match fact.member {
            Some(member) => {
                let owner = self.type_alias(self.model.members().get(member).declaring_type);
                let name = self.member_name(member);
                let value = self.expression_text(value)?;
                format!("{owner}.{name}({current}, {value})")
            }
            None => {
                let value = self.expression_text(value)?;
                let text = lowering.render(op, &current, &value, &self.options.runtime_namespace);
                self.checked_text(node, op, class, text)
            }
        };
        Ok(self.store(place, combined, consumed))
    }

    /// Write `value` into `place`, yielding the stored value when consumed.
    fn store(&mut self, place: Place, value: String, consumed: bool) -> String {
        let mut parts = place.init.clone();
        if place.is_accessor() && consumed {
            let temp = self.statement_temp();
            parts.push(place.write(&format!("{temp} = {value}")));
            parts.push(temp);
        } else {
            parts.push(place.write(&value));
        }
        sequence(parts, consumed)
    }

    // =========================================================================
    // Increment and Decrement
    // =========================================================================

    pub(super) fn emit_increment(
        &mut self,
        node: NodeId,
        op: UnaryOp,
        operand: NodeId,
    ) -> EmitResult<()> {
        let consumed = self.is_consumed(node);
        let fact = self.fact(node);
        let class = OperandClass::of_type(self.model.types(), self.type_of(operand));
        let native = !class.nullable
            && matches!(class.numeric, NumericClass::Native | NumericClass::Integer)
            && !(fact.checked && class.numeric == NumericClass::Integer)
            && fact.member.is_none()
            && !self.is_accessor_target(operand);

        if native {
            let target = self.expression_text(operand)?;
            let text = if op.is_postfix() {
                format!("{target}{}", op.token())
            } else {
                format!("{}{target}", op.token())
            };
            self.write(&text);
            return Ok(());
        }

        let bop = if op.is_increment() {
            BinaryOp::Add
        } else {
            BinaryOp::Sub
        };
        let one = match class.numeric {
            NumericClass::Decimal | NumericClass::Long => {
                format!("{}(1)", self.rt(class.numeric.helper_namespace()))
            }
            _ => "1".to_string(),
        };
        let place = self.place(operand, true)?;
        let current = place.read();
        let step = |printer: &mut Self, value: &str| -> String {
            match fact.member {
                Some(member) => {
                    let data = printer.model.members().get(member);
                    let owner = printer.type_alias(data.declaring_type);
                    let name = printer.member_name(member);
                    format!("{owner}.{name}({value})")
                }
                None => {
                    let lowering = binary_lowering(bop, class);
                    let text =
                        lowering.render(bop, value, &one, &printer.options.runtime_namespace);
                    printer.checked_text(node, bop, class, text)
                }
            }
        };

        let text = if op.is_postfix() && consumed {
            let old = self.statement_temp();
            let mut parts = place.init.clone();
            parts.push(format!("{old} = {current}"));
            let next = step(self, &old);
            parts.push(place.write(&next));
            parts.push(old);
            sequence(parts, true)
        } else {
            let next = step(self, &current);
            self.store(place, next, consumed)
        };
        self.write(&text);
        Ok(())
    }

    // =========================================================================
    // Places
    // =========================================================================

    fn is_accessor_target(&self, target: NodeId) -> bool {
        match self.expr(target) {
            Some(Expr::ElementAccess { target: inner, .. }) => {
                !self.is_native_subscript(target, *inner)
            }
            Some(Expr::Parenthesized(inner)) => self.is_accessor_target(*inner),
            _ => false,
        }
    }

    /// Evaluate the receiver and indices of `target`. With `reuse`, the
    /// location is read and then written, so anything with side effects is
    /// evaluated once into a temporary.
    fn place(&mut self, target: NodeId, reuse: bool) -> EmitResult<Place> {
        let mut init = Vec::new();
        let kind = match self.expr(target) {
            Some(Expr::Parenthesized(inner)) => return self.place(*inner, reuse),
            Some(Expr::MemberAccess { target: receiver, name })
                if reuse && !self.is_pure(*receiver) && !self.is_static_access(target) =>
            {
                let name = match self.fact(target).member {
                    Some(member) => self.member_name(member),
                    None => name.clone(),
                };
                let receiver = self.reused_operand(*receiver, &mut init, false)?;
                PlaceKind::Simple(format!("{receiver}.{name}"))
            }
            Some(Expr::ElementAccess { target: array, args }) => {
                self.check_index_count(target, *array, args)?;
                let accessor = !self.is_native_subscript(target, *array);
                let receiver = if reuse {
                    self.reused_operand(*array, &mut init, accessor)?
                } else {
                    self.expression_text(*array)?
                };
                let mut indices = Vec::with_capacity(args.len());
                for &index in args {
                    indices.push(if reuse {
                        self.reused_operand(index, &mut init, accessor)?
                    } else {
                        self.expression_text(index)?
                    });
                }
                let indices = indices.join(", ");
                if accessor {
                    PlaceKind::Accessor { receiver, indices }
                } else {
                    PlaceKind::Simple(format!("{receiver}[{indices}]"))
                }
            }
            _ => PlaceKind::Simple(self.expression_text(target)?),
        };
        Ok(Place { init, kind })
    }

    fn is_static_access(&self, node: NodeId) -> bool {
        self.fact(node)
            .member
            .is_some_and(|m| self.model.members().get(m).is_static)
    }

    /// Text of an operand that is evaluated once but referenced twice.
    /// Accessor operands are always spilled unless they are constants or
    /// `this`.
    fn reused_operand(
        &mut self,
        node: NodeId,
        init: &mut Vec<String>,
        always: bool,
    ) -> EmitResult<String> {
        let text = self.expression_text(node)?;
        let keep = if always {
            self.fact(node).is_constant()
                || matches!(self.expr(node), Some(Expr::This | Expr::Literal(_)))
        } else {
            self.is_pure(node)
        };
        if keep {
            return Ok(text);
        }
        let temp = self.statement_temp();
        init.push(format!("{temp} = {text}"));
        Ok(temp)
    }
}

/// Comma sequence, parenthesized when its value is consumed.
fn sequence(parts: Vec<String>, consumed: bool) -> String {
    if parts.len() == 1 {
        return parts.into_iter().next().unwrap_or_default();
    }
    let joined = parts.join(", ");
    if consumed {
        format!("({joined})")
    } else {
        joined
    }
}
