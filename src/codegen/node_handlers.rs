//! # Node-Specific Handlers
//!
//! One emission rule per [`NodeKind`]. Exec-flow nodes are handled by
//! [`BlueprintCodeGenerator::visit`], which writes the node's statements and
//! returns the tasks for whatever runs next. Pure nodes are handled by
//! [`BlueprintCodeGenerator::emit_pure`], which assigns the node's output
//! temporary wherever a consumer first needs it.

use super::block::{BlockId, Stmt};
use super::helpers::Helper;
use super::traverse::{Routine, Task};
use super::ts_codegen::BlueprintCodeGenerator;
use super::typescript::{render_literal, string_literal, ts_type};
use crate::analysis::data_flow::string_setting;
use crate::analysis::VisitedPath;
use crate::diagnostics::DiagnosticKind;
use crate::graph::{NodeConnection, NodeDefinition, NodeInstance};
use crate::metadata::{CompareOp, ConstantKind, Conversion, LogicOp, MathOp, NodeKind, StringOp};

const FALLBACK_MESSAGE: &str = "Hello World";

impl<'a> BlueprintCodeGenerator<'a> {
    /// Emit one exec-flow node into `block` and return its successors.
    pub(crate) fn visit(
        &mut self,
        routine: &mut Routine,
        node: &'a NodeInstance,
        mut path: VisitedPath,
        block: BlockId,
    ) -> Vec<Task<'a>> {
        let Some(definition) = self.definition(node) else {
            self.report(
                DiagnosticKind::Reference,
                Some(&node.id),
                format!("definition '{}' is not in the catalog", node.definition_id),
            );
            routine
                .arena
                .line(block, format!("// Unknown node type: {}", node.definition_id));
            return Vec::new();
        };

        let Some(kind) = NodeKind::from_definition_id(&definition.id) else {
            self.report(
                DiagnosticKind::UnsupportedKind,
                Some(&node.id),
                format!("no emitter for node type '{}'", definition.id),
            );
            routine
                .arena
                .line(block, format!("// Unsupported node type: {}", definition.id));
            return self.follow(routine, node, definition, &path, block);
        };

        tracing::trace!("[BGC] Visiting {} ({:?})", node.id, kind);
        if self.options.emit_node_comments && has_statements(kind) {
            routine
                .arena
                .line(block, format!("// {} ({})", definition.name, node.id));
        }

        match kind {
            NodeKind::FunctionStart | NodeKind::Lifecycle(_) => self.follow(routine, node, definition, &path, block),
            NodeKind::FunctionParameter => Vec::new(),
            NodeKind::FunctionReturn => {
                // Emitted once, after the walk.
                if routine.return_node.is_none() {
                    routine.return_node = Some(node.id.clone());
                }
                Vec::new()
            }
            NodeKind::End => Vec::new(),
            NodeKind::Print => {
                self.emit_print(routine, node, &mut path, block);
                self.follow(routine, node, definition, &path, block)
            }
            NodeKind::DebugLog => {
                let message = self.value(routine, node, "message", &mut path, block);
                let log = self.use_helper(Helper::Log);
                routine.arena.line(block, format!("{}({});", log, message));
                self.follow(routine, node, definition, &path, block)
            }
            NodeKind::Delay => {
                let duration = self.value(routine, node, "duration", &mut path, block);
                let delay = self.use_helper(Helper::Delay);
                routine.is_async = true;
                routine.arena.line(block, format!("await {}({});", delay, duration));
                self.follow(routine, node, definition, &path, block)
            }
            NodeKind::Sequence => self.emit_sequence(routine, node, definition, &path, block),
            NodeKind::Parallel => self.emit_parallel(routine, node, definition, &path, block),
            NodeKind::IfCondition => self.emit_if(routine, node, definition, &mut path, block),
            NodeKind::ForLoop => self.emit_for(routine, node, definition, &mut path, block),
            NodeKind::Switch => self.emit_switch(routine, node, definition, &mut path, block),
            NodeKind::SetVariable => {
                let name = string_setting(node, definition, "name").unwrap_or_else(|| "variable".to_string());
                let value = self.value(routine, node, "value", &mut path, block);
                let target = self.variable_access(&name);
                routine.arena.line(block, format!("{} = {};", target, value));
                self.follow(routine, node, definition, &path, block)
            }
            NodeKind::DebugBreak => {
                routine.arena.line(block, "debugger;");
                self.follow(routine, node, definition, &path, block)
            }
            NodeKind::DebugWatch => {
                let value = self.value(routine, node, "value", &mut path, block);
                let label = self.value(routine, node, "label", &mut path, block);
                let log = self.use_helper(Helper::Log);
                let to_string = self.use_helper(Helper::ToString);
                routine
                    .arena
                    .line(block, format!("{}({} + ': ' + {}({}));", log, label, to_string, value));
                self.follow(routine, node, definition, &path, block)
            }
            // Pure nodes wired into exec flow: compute in place.
            NodeKind::Constant(_)
            | NodeKind::Math(_)
            | NodeKind::RandomNumber
            | NodeKind::Abs
            | NodeKind::Text(_)
            | NodeKind::Logic(_)
            | NodeKind::Compare(_)
            | NodeKind::GetVariable
            | NodeKind::Convert(_) => {
                self.emit_pure(routine, node, &mut path, block);
                self.follow(routine, node, definition, &path, block)
            }
        }
    }

    /// Continue along every exec output, in connection order.
    fn follow(
        &self,
        routine: &mut Routine,
        node: &NodeInstance,
        definition: &NodeDefinition,
        path: &VisitedPath,
        block: BlockId,
    ) -> Vec<Task<'a>> {
        let edges = self.index.exec_out_edges(node, definition);
        self.branch_into(routine, &edges, path, block)
    }

    fn emit_print(&mut self, routine: &mut Routine, node: &'a NodeInstance, path: &mut VisitedPath, block: BlockId) {
        let connected = self.resolver().source_edge(&node.id, "value").is_some();
        let argument = if connected {
            self.value(routine, node, "value", path, block)
        } else {
            // `message` is the slot name older documents used.
            match node.literal("value").or_else(|| node.literal("message")) {
                Some(value) => render_literal(value),
                None => string_literal(FALLBACK_MESSAGE),
            }
        };
        let log = self.use_helper(Helper::Log);
        routine.arena.line(block, format!("{}({});", log, argument));
    }

    /// Each declared exec output in declaration order, each target in its own
    /// block on a fork of the path.
    fn emit_sequence(
        &self,
        routine: &mut Routine,
        node: &NodeInstance,
        definition: &'a NodeDefinition,
        path: &VisitedPath,
        block: BlockId,
    ) -> Vec<Task<'a>> {
        let mut tasks = Vec::new();
        for output in definition.exec_outputs() {
            for edge in self.index.outgoing(&node.id, &output.id) {
                if path.contains(&edge.to_node_id) {
                    continue;
                }
                tasks.push(Task {
                    node_id: edge.to_node_id.as_str(),
                    path: path.clone(),
                    block: routine.arena.inline(block),
                });
            }
        }
        tasks
    }

    /// One async closure per branch, then a join on all of them.
    fn emit_parallel(
        &mut self,
        routine: &mut Routine,
        node: &NodeInstance,
        definition: &'a NodeDefinition,
        path: &VisitedPath,
        block: BlockId,
    ) -> Vec<Task<'a>> {
        let branches: Vec<&'a NodeConnection> = definition
            .exec_outputs()
            .flat_map(|output| self.index.outgoing(&node.id, &output.id).iter().copied())
            .filter(|edge| !path.contains(&edge.to_node_id))
            .collect();
        if branches.is_empty() {
            return Vec::new();
        }

        routine.is_async = true;
        let suffix = node.numeric_suffix().unwrap_or("0");
        let mut calls = Vec::with_capacity(branches.len());
        let mut tasks = Vec::with_capacity(branches.len());

        for (k, edge) in branches.into_iter().enumerate() {
            let task = routine.unique_local(&format!("task_{}_{}", suffix, k + 1));
            routine.arena.line(block, format!("const {} = async () => {{", task));
            let body = routine.arena.nested(block);
            routine.arena.line(block, "};");
            calls.push(format!("{}()", task));
            tasks.push(Task {
                node_id: edge.to_node_id.as_str(),
                path: path.clone(),
                block: body,
            });
        }
        routine
            .arena
            .line(block, format!("await Promise.all([{}]);", calls.join(", ")));
        tasks
    }

    /// First exec output is the `true` branch, second the `false` branch.
    fn emit_if(
        &mut self,
        routine: &mut Routine,
        node: &'a NodeInstance,
        definition: &'a NodeDefinition,
        path: &mut VisitedPath,
        block: BlockId,
    ) -> Vec<Task<'a>> {
        let condition = self.value(routine, node, "condition", path, block);

        routine.arena.line(block, format!("if ({}) {{", condition));
        let then_block = routine.arena.nested(block);
        let else_block = routine.arena.alloc();
        routine.arena.push(block, Stmt::Else(else_block));
        routine.arena.line(block, "}");

        let mut outputs = definition.exec_outputs();
        let mut tasks = Vec::new();
        for target in [then_block, else_block] {
            if let Some(output) = outputs.next() {
                let edges = self.index.outgoing(&node.id, &output.id);
                tasks.extend(self.branch_into(routine, edges, path, target));
            }
        }
        tasks
    }

    /// First exec output is the loop body, second runs after the loop.
    fn emit_for(
        &mut self,
        routine: &mut Routine,
        node: &'a NodeInstance,
        definition: &'a NodeDefinition,
        path: &mut VisitedPath,
        block: BlockId,
    ) -> Vec<Task<'a>> {
        let count = self.value(routine, node, "count", path, block);
        let index = self
            .names
            .get(&node.id, "index")
            .map(str::to_string)
            .unwrap_or_else(|| format!("index_{}", node.numeric_suffix().unwrap_or("0")));
        routine.declare(&index, "number");

        routine.arena.line(
            block,
            format!("for ({i} = 0; {i} < {count}; {i}++) {{", i = index, count = count),
        );
        let body = routine.arena.nested(block);
        routine.arena.line(block, "}");

        let mut outputs = definition.exec_outputs();
        let mut tasks = Vec::new();
        for target in [body, block] {
            if let Some(output) = outputs.next() {
                let edges = self.index.outgoing(&node.id, &output.id);
                tasks.extend(self.branch_into(routine, edges, path, target));
            }
        }
        tasks
    }

    fn emit_switch(
        &mut self,
        routine: &mut Routine,
        node: &'a NodeInstance,
        definition: &'a NodeDefinition,
        path: &mut VisitedPath,
        block: BlockId,
    ) -> Vec<Task<'a>> {
        let value = self.value(routine, node, "value", path, block);

        routine.arena.line(block, format!("switch ({}) {{", value));
        let cases = routine.arena.nested(block);
        routine.arena.line(block, "}");

        let mut tasks = Vec::new();
        for output in definition.exec_outputs() {
            let edges = self.index.outgoing(&node.id, &output.id);
            if edges.is_empty() {
                continue;
            }
            routine.arena.line(cases, format!("{} {{", case_label(&output.id)));
            let case_block = routine.arena.nested(cases);
            let body = routine.arena.inline(case_block);
            routine.arena.line(case_block, "break;");
            routine.arena.line(cases, "}");
            tasks.extend(self.branch_into(routine, edges, path, body));
        }
        tasks
    }

    /// Assign a pure node's output temporary.
    pub(crate) fn emit_pure(
        &mut self,
        routine: &mut Routine,
        node: &'a NodeInstance,
        path: &mut VisitedPath,
        block: BlockId,
    ) {
        let Some(definition) = self.definition(node) else {
            return;
        };
        let Some(kind) = NodeKind::from_definition_id(&definition.id) else {
            return;
        };
        let Some(output) = definition.data_outputs().next() else {
            return;
        };
        let Some(target) = self.names.get(&node.id, &output.id).map(str::to_string) else {
            return;
        };
        let Some(expression) = self.pure_expression(routine, node, definition, kind, path, block) else {
            return;
        };

        routine.declare(&target, ts_type(output.kind));
        routine.arena.line(block, format!("{} = {};", target, expression));
    }

    fn pure_expression(
        &mut self,
        routine: &mut Routine,
        node: &'a NodeInstance,
        definition: &NodeDefinition,
        kind: NodeKind,
        path: &mut VisitedPath,
        block: BlockId,
    ) -> Option<String> {
        let expression = match kind {
            NodeKind::Constant(constant) => constant_literal(node, constant),
            NodeKind::Math(op) => {
                let a = self.value(routine, node, "a", path, block);
                let b = self.value(routine, node, "b", path, block);
                let helper = self.use_helper(match op {
                    MathOp::Add => Helper::Add,
                    MathOp::Subtract => Helper::Subtract,
                    MathOp::Multiply => Helper::Multiply,
                    MathOp::Divide => Helper::Divide,
                });
                format!("{}({}, {})", helper, a, b)
            }
            NodeKind::RandomNumber => {
                let min = self.value(routine, node, "min", path, block);
                let max = self.value(routine, node, "max", path, block);
                format!("{min} + Math.random() * ({max} - {min})", min = min, max = max)
            }
            NodeKind::Abs => {
                let value = self.value(routine, node, "value", path, block);
                format!("Math.abs({})", value)
            }
            NodeKind::Text(op) => match op {
                StringOp::Concat => {
                    let a = self.value(routine, node, "a", path, block);
                    let b = self.value(routine, node, "b", path, block);
                    format!("String({}) + String({})", a, b)
                }
                StringOp::Length => {
                    let text = self.value(routine, node, "text", path, block);
                    format!("String({}).length", text)
                }
                StringOp::Contains => {
                    let text = self.value(routine, node, "text", path, block);
                    let search = self.value(routine, node, "search", path, block);
                    format!("String({}).includes(String({}))", text, search)
                }
                StringOp::Replace => {
                    let text = self.value(routine, node, "text", path, block);
                    let search = self.value(routine, node, "search", path, block);
                    let replace = self.value(routine, node, "replace", path, block);
                    format!("String({}).split(String({})).join(String({}))", text, search, replace)
                }
            },
            NodeKind::Logic(LogicOp::Not) => {
                let value = self.value(routine, node, "value", path, block);
                format!("{}({})", self.use_helper(Helper::LogicNot), value)
            }
            NodeKind::Logic(op) => {
                let a = self.value(routine, node, "a", path, block);
                let b = self.value(routine, node, "b", path, block);
                let helper = self.use_helper(if op == LogicOp::And { Helper::LogicAnd } else { Helper::LogicOr });
                format!("{}({}, {})", helper, a, b)
            }
            NodeKind::Compare(op) => {
                let a = self.value(routine, node, "a", path, block);
                let b = self.value(routine, node, "b", path, block);
                let helper = self.use_helper(match op {
                    CompareOp::Equal => Helper::Equal,
                    CompareOp::Greater => Helper::Greater,
                    CompareOp::Less => Helper::Less,
                });
                format!("{}({}, {})", helper, a, b)
            }
            NodeKind::GetVariable => {
                let name = string_setting(node, definition, "name").unwrap_or_else(|| "variable".to_string());
                self.variable_access(&name)
            }
            NodeKind::Convert(conversion) => {
                let value = self.value(routine, node, "value", path, block);
                let helper = self.use_helper(match conversion {
                    Conversion::ToString => Helper::ToString,
                    Conversion::ToNumber => Helper::ToNumber,
                    Conversion::ToBoolean => Helper::ToBoolean,
                });
                format!("{}({})", helper, value)
            }
            _ => return None,
        };
        Some(expression)
    }
}

/// Whether the node writes statements of its own, and so gets a comment.
fn has_statements(kind: NodeKind) -> bool {
    !matches!(
        kind,
        NodeKind::FunctionStart
            | NodeKind::Lifecycle(_)
            | NodeKind::FunctionParameter
            | NodeKind::FunctionReturn
            | NodeKind::End
    )
}

fn constant_literal(node: &NodeInstance, constant: ConstantKind) -> String {
    if constant == ConstantKind::Null {
        return "null".to_string();
    }
    match node.literal("value") {
        Some(value) => render_literal(value),
        None => match constant {
            ConstantKind::Number => "0".to_string(),
            ConstantKind::String => string_literal(""),
            ConstantKind::Boolean => "false".to_string(),
            ConstantKind::Null => "null".to_string(),
        },
    }
}

/// `case_2` -> `case 2:`, `default` -> `default:`, anything else a string case.
fn case_label(output_id: &str) -> String {
    if output_id == "default" {
        return "default:".to_string();
    }
    let value = output_id.strip_prefix("case_").unwrap_or(output_id);
    if value.parse::<f64>().is_ok() {
        format!("case {}:", value)
    } else {
        format!("case {}:", string_literal(value))
    }
}
