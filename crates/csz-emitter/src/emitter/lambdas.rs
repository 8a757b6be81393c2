use csz_semantic::{KnownType, LambdaParam, MemberKind, NodeId};
use tracing::debug;

use super::statements::FunctionBody;
use super::{NameOptions, Printer};
use crate::capture::analyze_captures;
use crate::error::EmitResult;
use crate::temp_vars::TempVarPool;

/// Hoisted functions are generated unindented and re-indented on output.
const HOISTED_LEVEL: u32 = 0;

impl<'a> Printer<'a> {
    // =========================================================================
    // Lambdas
    // =========================================================================

    pub(super) fn emit_lambda(
        &mut self,
        node: NodeId,
        params: &[LambdaParam],
        body: NodeId,
    ) -> EmitResult<()> {
        let info = analyze_captures(self.model, node);
        let names: Vec<String> = params.iter().map(|p| p.name.clone()).collect();
        let body = match self.model.nodes().stmt(body) {
            Some(_) => FunctionBody::Block(body),
            None => FunctionBody::Expression {
                node: body,
                returns: self.lambda_returns(node),
            },
        };

        if self.options.hoist_lambdas && info.is_capture_free() && self.current_type.is_some() {
            let text = self.hoisted_function_text(&names, body)?;
            let reference = self.hoist_function(text);
            self.write(&reference);
            return Ok(());
        }

        let arrow = !self.options.is_es5();
        let text = self.function_text(&names, body, arrow)?;
        if info.uses_this && !arrow {
            self.write(&format!("{}(this, {text})", self.rt("fn.bind")));
        } else {
            self.write(&text);
        }
        Ok(())
    }

    /// Function text independent of the enclosing method, so identical
    /// lambdas produce identical text.
    fn hoisted_function_text(
        &mut self,
        names: &[String],
        body: FunctionBody<'_>,
    ) -> EmitResult<String> {
        let locals = std::mem::take(&mut self.locals);
        let temps = std::mem::replace(&mut self.temps, TempVarPool::new());
        let level = self.out.level();
        self.out.set_level(HOISTED_LEVEL);
        let text = self.function_text(names, body, false);
        self.out.set_level(level);
        self.temps = temps;
        self.locals = locals;
        text
    }

    /// Register a hoisted function, reusing the name of an identical body.
    fn hoist_function(&mut self, text: String) -> String {
        let next = format!("f{}", self.hoisted.len() + 1);
        let name = self.hoisted.entry(text).or_insert(next).clone();
        debug!(%name, "hoisted capture-free lambda");
        let owner = match self.current_type {
            Some(ty) => self.to_name(ty, NameOptions::DEFINITION),
            None => String::new(),
        };
        format!("{}.$.{owner}.{name}", self.options.assembly_alias)
    }

    /// Whether an expression-bodied lambda returns its value; false when
    /// the target delegate returns void.
    fn lambda_returns(&self, node: NodeId) -> bool {
        let Some(delegate) = self.type_of(node) else {
            return true;
        };
        let members = self.model.members();
        let invoke = self
            .model
            .types()
            .get(delegate)
            .members
            .iter()
            .map(|&m| members.get(m))
            .find(|m| m.kind == MemberKind::Method && m.name == "Invoke");
        match invoke {
            Some(invoke) => invoke
                .return_type
                .is_some_and(|ty| !self.is_known(Some(ty), KnownType::Void)),
            None => true,
        }
    }

    /// `Csz.apply(Csz.ns("Demo.Foo", $asm.$), { f1: ... });` for the
    /// current type, or nothing when no lambda was hoisted.
    pub(super) fn emit_hoisted_section(&mut self) {
        if self.hoisted.is_empty() {
            return;
        }
        let owner = match self.current_type {
            Some(ty) => self.to_name(ty, NameOptions::DEFINITION),
            None => return,
        };
        let hoisted = std::mem::take(&mut self.hoisted);
        self.write_line();
        self.write(&format!(
            "{}({}({}, {}.$), {{",
            self.rt("apply"),
            self.rt("ns"),
            Self::quote_string(&owner),
            self.options.assembly_alias
        ));
        self.write_line();
        self.increase_indent();
        let count = hoisted.len();
        for (i, (text, name)) in hoisted.into_iter().enumerate() {
            self.write(&format!("{name}: "));
            self.out.write_block_text(&text);
            if i + 1 < count {
                self.write(",");
            }
            self.write_line();
        }
        self.decrease_indent();
        self.write("})");
        self.write_semicolon();
        self.write_line();
    }
}
