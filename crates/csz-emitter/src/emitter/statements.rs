use csz_semantic::{NodeId, Stmt};
use rustc_hash::FxHashMap;
use tracing::trace;

use super::Printer;
use crate::error::EmitResult;
use crate::locals::LocalsScope;
use crate::temp_vars::TempVarPool;

/// Body of a function being generated.
#[derive(Copy, Clone, Debug)]
pub(crate) enum FunctionBody<'b> {
    /// A block statement.
    Block(NodeId),
    /// An expression-bodied lambda; `returns` is false for void delegates.
    Expression { node: NodeId, returns: bool },
    /// Field initializers: `target = value;` per entry.
    Initializers(&'b [(String, NodeId)]),
}

/// Per-function printer state saved while a nested function is generated.
struct FunctionState {
    temps: TempVarPool,
    locals: LocalsScope,
    statement_temps: Vec<String>,
    template_tmps: FxHashMap<String, String>,
    statement_expr: Option<NodeId>,
}

impl<'a> Printer<'a> {
    // =========================================================================
    // Functions
    // =========================================================================

    /// Generate `function (params) { ... }` (or an arrow function) with its
    /// own temporaries and locals, starting at the current indentation level.
    pub(crate) fn function_text(
        &mut self,
        params: &[String],
        body: FunctionBody<'_>,
        arrow: bool,
    ) -> EmitResult<String> {
        let saved = self.enter_function_scope();
        let result = self.function_text_inner(params, body, arrow);
        self.exit_function_scope(saved);
        result
    }

    fn enter_function_scope(&mut self) -> FunctionState {
        let nested = self.temps.nested();
        FunctionState {
            temps: std::mem::replace(&mut self.temps, nested),
            locals: self.locals.enter_function(),
            statement_temps: std::mem::take(&mut self.statement_temps),
            template_tmps: std::mem::take(&mut self.template_tmps),
            statement_expr: self.statement_expr.take(),
        }
    }

    fn exit_function_scope(&mut self, saved: FunctionState) {
        self.temps = saved.temps;
        self.locals.exit_function(saved.locals);
        self.statement_temps = saved.statement_temps;
        self.template_tmps = saved.template_tmps;
        self.statement_expr = saved.statement_expr;
    }

    fn function_text_inner(
        &mut self,
        params: &[String],
        body: FunctionBody<'_>,
        arrow: bool,
    ) -> EmitResult<String> {
        let params: Vec<String> = params.iter().map(|p| self.locals.declare(p)).collect();
        let header = if arrow {
            format!("({}) => {{", params.join(", "))
        } else {
            format!("function ({}) {{", params.join(", "))
        };
        let level = self.out.level();

        let text = self.capture(|p| {
            p.write(&header);
            p.write_line();
            p.increase_indent();
            match body {
                FunctionBody::Block(block) => p.emit_block_contents(block)?,
                FunctionBody::Expression { node, returns } => {
                    p.emit_statement_expression(node, returns)?;
                }
                FunctionBody::Initializers(entries) => {
                    for (target, value) in entries {
                        let value = p.expression_text(*value)?;
                        p.release_statement_temps();
                        p.write(&format!("{target} = {value}"));
                        p.write_semicolon();
                        p.write_line();
                    }
                }
            }
            p.decrease_indent();
            p.write("}");
            Ok(())
        })?;

        let new_line = self.out.new_line();
        let Some(header_end) = text.find(new_line) else {
            return Ok(text);
        };
        let rest = &text[header_end + new_line.len()..];
        if rest.trim() == "}" {
            return Ok(format!("{header} }}"));
        }
        let temps = self.temps.declared_names();
        if temps.is_empty() {
            return Ok(text);
        }
        let indent = self.out.indent_unit().repeat(level as usize + 1);
        Ok(format!(
            "{header}{new_line}{indent}var {};{new_line}{rest}",
            temps.join(", ")
        ))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn emit_statement(&mut self, stmt: NodeId) -> EmitResult<()> {
        let Some(kind) = self.model.nodes().stmt(stmt) else {
            return Ok(());
        };
        match kind {
            Stmt::Expression(expr) => self.emit_statement_expression(*expr, false),
            Stmt::Return(value) => {
                match value {
                    Some(value) => {
                        let text = self.expression_text(*value)?;
                        self.write("return ");
                        self.write(&text);
                    }
                    None => self.write("return"),
                }
                self.release_statement_temps();
                self.write_semicolon();
                self.write_line();
                Ok(())
            }
            Stmt::VarDecl { name, init, .. } => {
                let init = match init {
                    Some(init) => Some(self.expression_text(*init)?),
                    None => None,
                };
                let emitted = self.locals.declare(name);
                let keyword = if self.options.is_es5() { "var" } else { "let" };
                match init {
                    Some(init) => self.write(&format!("{keyword} {emitted} = {init}")),
                    None => self.write(&format!("{keyword} {emitted}")),
                }
                self.release_statement_temps();
                self.write_semicolon();
                self.write_line();
                Ok(())
            }
            Stmt::Block(_) => {
                self.emit_block(stmt)?;
                self.write_line();
                Ok(())
            }
            Stmt::If { .. } => {
                self.emit_if(stmt)?;
                self.write_line();
                Ok(())
            }
        }
    }

    /// Expression statement, or `return expr;` with `returns`.
    ///
    /// A statement whose expression emits nothing (a removed call) leaves
    /// no trace, not even the terminator.
    fn emit_statement_expression(&mut self, expr: NodeId, returns: bool) -> EmitResult<()> {
        let snapshot = self.out.save_writer();
        self.suppressed = false;
        self.statement_expr = (!returns).then_some(expr);
        if returns {
            self.write("return ");
        }
        let result = self.emit_expression(expr);
        self.statement_expr = None;
        self.release_statement_temps();
        result?;

        if self.suppressed {
            trace!(?expr, "statement removed");
            self.suppressed = false;
            self.out.restore_writer(snapshot);
            return Ok(());
        }
        self.write_semicolon();
        self.write_line();
        Ok(())
    }

    /// `{ ... }` without a trailing newline.
    fn emit_block(&mut self, block: NodeId) -> EmitResult<()> {
        self.write("{");
        self.write_line();
        self.increase_indent();
        self.locals.enter_block();
        let result = self.emit_block_contents(block);
        self.locals.exit_block();
        self.decrease_indent();
        result?;
        self.write("}");
        Ok(())
    }

    /// Statements of a block, or the single statement itself.
    fn emit_block_contents(&mut self, block: NodeId) -> EmitResult<()> {
        match self.model.nodes().stmt(block) {
            Some(Stmt::Block(stmts)) => {
                for &stmt in stmts {
                    self.emit_statement(stmt)?;
                }
                Ok(())
            }
            _ => self.emit_statement(block),
        }
    }

    /// `if (...) { ... } else ...` without a trailing newline.
    fn emit_if(&mut self, stmt: NodeId) -> EmitResult<()> {
        let Some(Stmt::If {
            condition,
            then_branch,
            else_branch,
        }) = self.model.nodes().stmt(stmt)
        else {
            return Ok(());
        };
        let condition = self.expression_text(*condition)?;
        self.release_statement_temps();
        self.write(&format!("if ({condition}) "));
        self.emit_block(*then_branch)?;
        if let Some(else_branch) = else_branch {
            self.write(" else ");
            if matches!(self.model.nodes().stmt(*else_branch), Some(Stmt::If { .. })) {
                self.emit_if(*else_branch)?;
            } else {
                self.emit_block(*else_branch)?;
            }
        }
        Ok(())
    }
}
