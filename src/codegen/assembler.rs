//! # Program Assembly
//!
//! Drives the traversal for each routine and wraps the results in the shell
//! the blueprint type calls for: a single exported function, or a component
//! class with one method per populated lifecycle hook.
//!
//! Output order: header, imports (or inlined helpers), variables, signature,
//! temporaries, body, trailing return.

use super::helpers::{import_statement, inline_declarations};
use super::traverse::{Routine, Task};
use super::ts_codegen::{source_type, BlueprintCodeGenerator};
use super::typescript::{literal_type, render_literal};
use crate::analysis::data_flow::{parameter_name, parameter_type, DELTA_TIME};
use crate::analysis::naming::identifier;
use crate::analysis::VisitedPath;
use crate::config::{CompilerOptions, HelperMode};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::graph::{Blueprint, BlueprintType, NodeInstance};
use crate::metadata::{LifecycleHook, NodeKind};
use serde::Serialize;
use std::collections::BTreeSet;

/// One entry of a generated function's parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub ty: String,
    /// Rendered default value, when the parameter node declares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Parameter {
    pub fn signature(&self) -> String {
        match &self.default {
            Some(default) => format!("{}: {} = {}", self.name, self.ty, default),
            None => format!("{}: {}", self.name, self.ty),
        }
    }
}

/// What the generator learned about the routine(s) it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub parameters: Vec<Parameter>,
    /// Unwrapped return type; `void` when nothing is returned.
    pub return_type: String,
    /// Helper names referenced, in library order.
    pub helpers: Vec<String>,
    pub is_async: bool,
}

#[derive(Debug, Clone)]
pub struct GeneratedProgram {
    pub source: String,
    pub analysis: Analysis,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> BlueprintCodeGenerator<'a> {
    /// Generate the complete TypeScript unit for the blueprint.
    pub fn generate_program(mut self) -> GeneratedProgram {
        for connection in self.index.dangling().to_vec() {
            self.report(
                DiagnosticKind::Reference,
                None,
                format!(
                    "connection '{}' references a missing node ({} -> {})",
                    connection.id, connection.from_node_id, connection.to_node_id
                ),
            );
        }

        match self.blueprint.kind {
            BlueprintType::Function => self.generate_function(),
            BlueprintType::Component => self.generate_component(),
        }
    }

    fn generate_function(mut self) -> GeneratedProgram {
        let mut routine = Routine::new();
        let root = routine.root;

        let blueprint = self.blueprint;
        let entries: Vec<&'a NodeInstance> = blueprint
            .nodes
            .iter()
            .filter(|node| {
                matches!(
                    self.kind_of(node),
                    Some(NodeKind::FunctionStart) | Some(NodeKind::Lifecycle(LifecycleHook::Start))
                )
            })
            .collect();

        if entries.is_empty() {
            tracing::info!("[BGC] No start node found");
            routine.arena.line(root, "// No start node found");
        } else {
            tracing::info!("[BGC] Traversing {} entry node(s)", entries.len());
            let seeds = self.seeds(&mut routine, &entries);
            self.walk(&mut routine, seeds);
        }

        let return_type = self.emit_return(&mut routine);
        let parameters = self.parameters();

        tracing::info!("[BGC] Assembling function");
        let unit = self.options.indent_unit();
        let mut lines = self.header();
        lines.extend(self.helper_section(Vec::new()));

        let variables = self.variable_declarations();
        if !variables.is_empty() {
            for (name, ty, init) in &variables {
                lines.push(match init {
                    Some(init) => format!("let {}: {} = {};", name, ty, init),
                    None => format!("let {}: {};", name, ty),
                });
            }
            lines.push(String::new());
        }

        let signature: Vec<String> = parameters.iter().map(Parameter::signature).collect();
        let (keyword, returns) = if routine.is_async {
            ("export async function", format!("Promise<{}>", return_type))
        } else {
            ("export function", return_type.clone())
        };
        lines.push(format!(
            "{} {}({}): {} {{",
            keyword,
            self.unit_name(),
            signature.join(", "),
            returns
        ));
        lines.extend(routine_body(&routine, 1, &unit));
        lines.push("}".to_string());

        let analysis = Analysis {
            parameters,
            return_type,
            helpers: self.helper_names(),
            is_async: routine.is_async,
        };
        self.finish(lines, analysis)
    }

    fn generate_component(mut self) -> GeneratedProgram {
        let mut methods: Vec<(LifecycleHook, Routine)> = Vec::new();

        for hook in LifecycleHook::ALL {
            let entries: Vec<&'a NodeInstance> = self
                .nodes_of_kind(NodeKind::Lifecycle(hook))
                .into_iter()
                .filter(|node| {
                    self.definition(node)
                        .map(|definition| !self.index.exec_out_edges(node, definition).is_empty())
                        .unwrap_or(false)
                })
                .collect();
            if entries.is_empty() {
                continue;
            }

            tracing::info!("[BGC] Traversing lifecycle hook {}", hook.method_name());
            let mut routine = Routine::new();
            let seeds = self.seeds(&mut routine, &entries);
            self.walk(&mut routine, seeds);

            if let Some(node_id) = routine.return_node.clone() {
                self.report(
                    DiagnosticKind::UnsupportedKind,
                    Some(&node_id),
                    format!("return node reached in {}; component methods return nothing", hook.method_name()),
                );
            }
            methods.push((hook, routine));
        }

        tracing::info!("[BGC] Assembling component with {} method(s)", methods.len());
        let unit = self.options.indent_unit();
        let class_name = self.unit_name();
        let mut lines = self.header();
        lines.extend(self.helper_section(vec!["import { _decorator, Component } from 'cc';".to_string()]));
        lines.push("const { ccclass } = _decorator;".to_string());
        lines.push(String::new());
        lines.push(format!("@ccclass('{}')", class_name));
        lines.push(format!("export class {} extends Component {{", class_name));

        let fields = self.variable_declarations();
        for (name, ty, init) in &fields {
            let init = init.as_deref().unwrap_or("null");
            lines.push(format!("{}{}: {} = {};", unit, name, ty, init));
        }

        for (i, (hook, routine)) in methods.iter().enumerate() {
            if i > 0 || !fields.is_empty() {
                lines.push(String::new());
            }
            let params = if hook.takes_delta_time() {
                format!("{}: number", DELTA_TIME)
            } else {
                String::new()
            };
            let asyncness = if routine.is_async { "async " } else { "" };
            lines.push(format!("{}{}{}({}) {{", unit, asyncness, hook.method_name(), params));
            lines.extend(routine_body(routine, 2, &unit));
            lines.push(format!("{}}}", unit));
        }
        lines.push("}".to_string());

        let analysis = Analysis {
            parameters: Vec::new(),
            return_type: "void".to_string(),
            helpers: self.helper_names(),
            is_async: methods.iter().any(|(_, routine)| routine.is_async),
        };
        self.finish(lines, analysis)
    }

    /// One task per entry, each in its own block on a fresh path.
    fn seeds(&self, routine: &mut Routine, entries: &[&'a NodeInstance]) -> Vec<Task<'a>> {
        let root = routine.root;
        entries
            .iter()
            .map(|node| Task {
                node_id: node.id.as_str(),
                path: VisitedPath::new(),
                block: routine.arena.inline(root),
            })
            .collect()
    }

    /// Emit the trailing `return` and report the unwrapped return type.
    ///
    /// The first return node the walk reached wins; failing that, the first
    /// one declared.
    fn emit_return(&mut self, routine: &mut Routine) -> String {
        let returns = self.nodes_of_kind(NodeKind::FunctionReturn);
        let chosen = routine
            .return_node
            .as_deref()
            .and_then(|id| self.index.node(id))
            .or_else(|| returns.first().copied());
        let Some(node) = chosen else {
            return "void".to_string();
        };
        if returns.len() > 1 {
            self.report(
                DiagnosticKind::ShapeAmbiguity,
                Some(&node.id),
                format!("blueprint has {} return nodes; only '{}' is used", returns.len(), node.id),
            );
        }

        let source = self.resolver().resolve(node, "value");
        let Some(return_type) = source_type(&source) else {
            return "void".to_string();
        };

        let root = routine.root;
        if !routine.arena.is_empty(root) {
            routine.arena.line(root, "");
        }
        let mut path = VisitedPath::new();
        let value = self.value(routine, node, "value", &mut path, root);
        routine.arena.line(root, format!("return {};", value));
        return_type
    }

    /// Function parameters in instance order.
    fn parameters(&self) -> Vec<Parameter> {
        self.nodes_of_kind(NodeKind::FunctionParameter)
            .into_iter()
            .filter_map(|node| {
                let definition = self.definition(node)?;
                Some(Parameter {
                    name: parameter_name(node, definition),
                    ty: parameter_type(node, definition),
                    default: node.literal("default_value").map(render_literal),
                })
            })
            .collect()
    }

    /// `(identifier, type, initializer)` for declared variables, then for
    /// variables the code uses without declaring.
    fn variable_declarations(&self) -> Vec<(String, String, Option<String>)> {
        let mut declared = BTreeSet::new();
        let mut variables = Vec::new();
        for (name, value) in &self.blueprint.variables {
            let ident = identifier(name);
            if declared.insert(ident.clone()) {
                variables.push((ident, literal_type(value).to_string(), Some(render_literal(value))));
            }
        }
        for ident in &self.variables_used {
            if declared.insert(ident.clone()) {
                variables.push((ident.clone(), "any".to_string(), None));
            }
        }
        variables
    }

    fn header(&self) -> Vec<String> {
        let mut lines = vec![
            "/**".to_string(),
            format!(" * Generated from blueprint: {}", self.blueprint.name),
        ];
        if self.options.header_timestamp {
            lines.push(format!(" * Generated at: {}", chrono::Utc::now().to_rfc3339()));
        }
        lines.push(" * Compiled with BGC (Blueprint Graph Compiler)".to_string());
        lines.push(" * Auto-generated - do not modify manually".to_string());
        lines.push(" */".to_string());
        lines.push(String::new());
        lines
    }

    /// Import lines followed by either the helper import or the inlined
    /// helper declarations.
    fn helper_section(&self, mut imports: Vec<String>) -> Vec<String> {
        let mut lines = Vec::new();
        if self.options.helper_mode == HelperMode::Import {
            imports.extend(import_statement(&self.helpers, &self.options.helper_module));
        }
        if !imports.is_empty() {
            lines.extend(imports);
            lines.push(String::new());
        }
        if self.options.helper_mode == HelperMode::Inline {
            for declaration in inline_declarations(&self.helpers) {
                lines.extend(declaration.lines().map(str::to_string));
                lines.push(String::new());
            }
        }
        lines
    }

    fn unit_name(&self) -> String {
        unit_name(self.blueprint, self.options)
    }

    fn helper_names(&self) -> Vec<String> {
        self.helpers.iter().map(|h| h.name().to_string()).collect()
    }

    fn finish(self, lines: Vec<String>, analysis: Analysis) -> GeneratedProgram {
        let mut source = lines.join("\n");
        source.push('\n');
        tracing::info!("[BGC] Code generation complete ({} bytes)", source.len());
        GeneratedProgram {
            source,
            analysis,
            diagnostics: self.diagnostics.into_vec(),
        }
    }
}

/// Function or class name: prefix plus the blueprint name as an identifier.
pub fn unit_name(blueprint: &Blueprint, options: &CompilerOptions) -> String {
    let name = if blueprint.name.trim().is_empty() {
        "Blueprint"
    } else {
        blueprint.name.as_str()
    };
    format!("{}{}", options.function_prefix, identifier(name))
}

/// Temporaries, a blank line, then the statements.
fn routine_body(routine: &Routine, depth: usize, unit: &str) -> Vec<String> {
    let indent = unit.repeat(depth);
    let mut lines: Vec<String> = routine
        .temporaries()
        .iter()
        .map(|(name, ty)| format!("{}let {}: {};", indent, name, ty))
        .collect();
    let body = routine.arena.render(routine.root, depth, unit);
    if !lines.is_empty() && !body.is_empty() {
        lines.push(String::new());
    }
    lines.extend(body);
    lines
}
