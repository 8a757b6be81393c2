use csz_common::Span;
use csz_semantic::{ConstValue, Expr, FactKind, KnownType, MemberKind, NodeId, SemanticFact, TypeId};

use super::Printer;

impl<'a> Printer<'a> {
    // =========================================================================
    // Output Helpers
    // =========================================================================

    pub(super) fn write(&mut self, text: &str) {
        self.out.write(text);
    }

    pub(super) fn write_line(&mut self) {
        self.out.write_line();
    }

    /// Write a semicolon (respecting options).
    pub(super) fn write_semicolon(&mut self) {
        if !self.options.omit_trailing_semicolon {
            self.out.write(";");
        }
    }

    pub(super) fn increase_indent(&mut self) {
        self.out.indent();
    }

    pub(super) fn decrease_indent(&mut self) {
        self.out.outdent();
    }

    /// Qualified runtime helper, e.g. `Csz.cast`.
    pub(crate) fn rt(&self, name: &str) -> String {
        format!("{}.{name}", self.options.runtime_namespace)
    }

    // =========================================================================
    // Semantic Lookups
    // =========================================================================

    pub(crate) fn fact(&self, node: NodeId) -> &'a SemanticFact {
        self.model.resolve(node)
    }

    pub(crate) fn type_of(&self, node: NodeId) -> Option<TypeId> {
        self.fact(node).ty
    }

    pub(crate) fn span(&self, node: NodeId) -> Span {
        self.model.nodes().span(node)
    }

    pub(crate) fn expr(&self, node: NodeId) -> Option<&'a Expr> {
        self.model.nodes().expr(node)
    }

    pub(crate) fn is_known(&self, ty: Option<TypeId>, known: KnownType) -> bool {
        ty.is_some_and(|ty| self.model.types().is_known(ty, known))
    }

    /// Whether evaluating `node` twice is indistinguishable from evaluating
    /// it once: literals, `this`, locals, type names and simple field reads.
    pub(crate) fn is_pure(&self, node: NodeId) -> bool {
        let fact = self.fact(node);
        if fact.is_constant() {
            return true;
        }
        match self.expr(node) {
            Some(Expr::Literal(_) | Expr::This | Expr::Base | Expr::TypeOf(_)) => true,
            Some(Expr::Name(_)) => matches!(
                fact.kind,
                FactKind::LocalVariable | FactKind::TypeName | FactKind::ThisRead
            ) || self.is_field(fact),
            Some(Expr::MemberAccess { target, .. }) => {
                self.is_field(fact) && self.is_pure(*target)
            }
            Some(Expr::Parenthesized(inner)) => self.is_pure(*inner),
            _ => false,
        }
    }

    fn is_field(&self, fact: &SemanticFact) -> bool {
        fact.member
            .is_some_and(|m| self.model.members().get(m).kind == MemberKind::Field)
    }

    /// Whether the value of `node` is used by its parent.
    pub(crate) fn is_consumed(&self, node: NodeId) -> bool {
        self.statement_expr != Some(node)
    }

    // =========================================================================
    // Temporaries
    // =========================================================================

    /// Temporary released at the end of the current statement.
    pub(crate) fn statement_temp(&mut self) -> String {
        let name = self.temps.get_temp_var_name();
        self.statement_temps.push(name.clone());
        name
    }

    pub(crate) fn release_statement_temps(&mut self) {
        for name in std::mem::take(&mut self.statement_temps) {
            self.temps.remove_temp_var(&name);
        }
        self.template_tmps.clear();
    }

    /// `text` if it is pure, otherwise a temporary assigned from it.
    ///
    /// Returns `(initializer, reference)`: the initializer goes first in a
    /// comma sequence and is `None` when no temporary was needed.
    pub(crate) fn hoist_if_impure(
        &mut self,
        node: NodeId,
        text: String,
    ) -> (Option<String>, String) {
        if self.is_pure(node) {
            (None, text)
        } else {
            let temp = self.statement_temp();
            (Some(format!("{temp} = {text}")), temp)
        }
    }

    // =========================================================================
    // Literals
    // =========================================================================

    pub(crate) fn quote_string(value: &str) -> String {
        serde_json::to_string(value)
            .unwrap_or_else(|_| format!("\"{}\"", value.escape_default()))
            .replace('\u{2028}', "\\u2028")
            .replace('\u{2029}', "\\u2029")
    }

    /// JavaScript text of a constant of static type `ty`.
    pub(crate) fn constant_text(&self, value: &ConstValue, ty: Option<TypeId>) -> String {
        let types = self.model.types();
        let known = ty.and_then(|ty| types.primitive_code(ty));
        let number = match value {
            ConstValue::Null => return "null".to_string(),
            ConstValue::Bool(b) => return b.to_string(),
            ConstValue::String(s) => return Self::quote_string(s),
            ConstValue::Char(c) => (*c as u32).to_string(),
            ConstValue::Int(v) => v.to_string(),
            ConstValue::UInt(v) => v.to_string(),
            ConstValue::Float(v) => float_text(*v),
            ConstValue::Decimal(text) => text.clone(),
        };
        match known {
            Some(KnownType::Decimal) => format!("{}({number})", self.rt("Decimal")),
            Some(k) if k.is_long() => format!("{}({number})", self.rt("Long")),
            _ => number,
        }
    }
}

fn float_text(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        value.to_string()
    }
}
