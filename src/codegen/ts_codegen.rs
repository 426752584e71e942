//! # TypeScript Code Generator for Blueprints
//!
//! Generates TypeScript source from blueprint graphs.
//!
//! The generator owns the per-compilation state: the connection index, the
//! temporary-name table, the helper-usage set and the diagnostics sink. The
//! work is split across sibling modules that each add an `impl` block:
//! [`traverse`](super::traverse) walks execution edges,
//! [`node_handlers`](super::node_handlers) emits one node, and
//! [`assembler`](super::assembler) wraps routines into a function or class.

use super::block::BlockId;
use super::helpers::Helper;
use super::traverse::Routine;
use super::typescript::{literal_type, render_literal, ts_type};
use crate::analysis::naming::identifier;
use crate::analysis::{ConnectionIndex, DataResolver, SourceExpr, TemporaryNames, VisitedPath};
use crate::config::CompilerOptions;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::graph::{Blueprint, BlueprintType, NodeDefinition, NodeInstance};
use crate::metadata::{NodeCatalog, NodeKind};
use std::collections::{BTreeSet, HashSet};

/// Blueprint-specific TypeScript code generator
pub struct BlueprintCodeGenerator<'a> {
    pub(crate) blueprint: &'a Blueprint,
    pub(crate) catalog: &'a NodeCatalog,
    pub(crate) options: &'a CompilerOptions,
    pub(crate) index: ConnectionIndex<'a>,
    pub(crate) names: TemporaryNames,
    pub(crate) helpers: BTreeSet<Helper>,
    /// Variable identifiers read or written by emitted code.
    pub(crate) variables_used: BTreeSet<String>,
    pub(crate) diagnostics: Diagnostics,
    /// Pure nodes whose inputs are being materialized right now.
    materializing: HashSet<&'a str>,
    /// Pure nodes that read a blueprint variable, directly or through their inputs.
    variable_readers: HashSet<&'a str>,
    /// Variable readers emitted by the materialization in progress.
    fresh: HashSet<&'a str>,
}

impl<'a> BlueprintCodeGenerator<'a> {
    pub fn new(blueprint: &'a Blueprint, catalog: &'a NodeCatalog, options: &'a CompilerOptions) -> Self {
        let index = ConnectionIndex::build(blueprint);
        let names = TemporaryNames::allocate(blueprint, catalog);
        tracing::debug!("[BGC] Allocated {} temporary names", names.len());
        let variable_readers = variable_readers(blueprint, catalog, &index);

        Self {
            blueprint,
            catalog,
            options,
            index,
            names,
            helpers: BTreeSet::new(),
            variables_used: BTreeSet::new(),
            diagnostics: Diagnostics::new(),
            materializing: HashSet::new(),
            variable_readers,
            fresh: HashSet::new(),
        }
    }

    pub(crate) fn resolver(&self) -> DataResolver<'_, 'a> {
        DataResolver::new(&self.index, self.catalog, &self.names)
    }

    pub(crate) fn definition(&self, node: &NodeInstance) -> Option<&'a NodeDefinition> {
        let catalog = self.catalog;
        catalog.find(&node.definition_id)
    }

    /// Kind of a node whose definition is in the catalog and has an emitter.
    pub(crate) fn kind_of(&self, node: &NodeInstance) -> Option<NodeKind> {
        self.definition(node)
            .and_then(|definition| NodeKind::from_definition_id(&definition.id))
    }

    /// Nodes of one kind, in instance order.
    pub(crate) fn nodes_of_kind(&self, kind: NodeKind) -> Vec<&'a NodeInstance> {
        let blueprint = self.blueprint;
        blueprint
            .nodes
            .iter()
            .filter(|node| self.kind_of(node) == Some(kind))
            .collect()
    }

    pub(crate) fn use_helper(&mut self, helper: Helper) -> &'static str {
        self.helpers.insert(helper);
        helper.name()
    }

    pub(crate) fn report(&mut self, kind: DiagnosticKind, node_id: Option<&str>, message: impl Into<String>) {
        self.diagnostics.report(kind, node_id, message);
    }

    /// How emitted code reads or writes blueprint variable `name`.
    pub(crate) fn variable_access(&mut self, name: &str) -> String {
        let ident = identifier(name);
        self.variables_used.insert(ident.clone());
        match self.blueprint.kind {
            BlueprintType::Component => format!("this.{}", ident),
            BlueprintType::Function => ident,
        }
    }

    /// Expression for the value feeding `param_id` on `node`.
    ///
    /// Pure producers not yet computed on this path are emitted into `block`
    /// first, and join `path` so later nodes on the path reuse them.
    pub(crate) fn value(
        &mut self,
        routine: &mut Routine,
        node: &'a NodeInstance,
        param_id: &str,
        path: &mut VisitedPath,
        block: BlockId,
    ) -> String {
        let fan_in = self.resolver().fan_in(&node.id, param_id);
        if fan_in > 1 {
            let used = self
                .resolver()
                .source_edge(&node.id, param_id)
                .map(|edge| edge.id.clone())
                .unwrap_or_default();
            self.report(
                DiagnosticKind::ShapeAmbiguity,
                Some(&node.id),
                format!(
                    "input '{}' has {} incoming connections; only '{}' is used",
                    param_id, fan_in, used
                ),
            );
        }

        let source = self.resolver().resolve(node, param_id);
        match source {
            SourceExpr::Literal { value, .. } => render_literal(&value),
            SourceExpr::Parameter { name, .. } => name,
            SourceExpr::Temporary { name, node_id, kind, .. } => {
                routine.declare(&name, ts_type(kind));
                if let Some(producer) = self.index.node(&node_id) {
                    let pure = self.kind_of(producer).map(NodeKind::is_pure).unwrap_or(false);
                    if pure && !self.is_current(producer, path) && !self.materializing.contains(producer.id.as_str()) {
                        let outermost = self.materializing.is_empty();
                        self.materialize(routine, producer, path, block);
                        if outermost {
                            self.fresh.clear();
                        }
                    }
                }
                name
            }
            SourceExpr::Undefined => {
                let edge = self.resolver().source_edge(&node.id, param_id);
                if let Some(edge) = edge {
                    self.report(
                        DiagnosticKind::Reference,
                        Some(&node.id),
                        format!(
                            "input '{}' reads '{}.{}', which produces no value",
                            param_id, edge.from_node_id, edge.from_param_id
                        ),
                    );
                }
                "undefined".to_string()
            }
        }
    }

    /// Whether the producer's temporary already holds a usable value.
    ///
    /// Other pure nodes stay valid for the rest of the path once computed.
    /// Variable readers are recomputed at every use, since any `set_variable`
    /// on the path may have written the variable in between.
    fn is_current(&self, producer: &NodeInstance, path: &VisitedPath) -> bool {
        if self.variable_readers.contains(producer.id.as_str()) {
            self.fresh.contains(producer.id.as_str())
        } else {
            path.contains(&producer.id)
        }
    }

    /// Emit `producer` and every pure node it depends on that is not already
    /// current, dependencies first.
    pub(crate) fn materialize(
        &mut self,
        routine: &mut Routine,
        producer: &'a NodeInstance,
        path: &mut VisitedPath,
        block: BlockId,
    ) {
        let mut stack: Vec<(&'a NodeInstance, bool)> = vec![(producer, false)];

        while let Some((node, expanded)) = stack.pop() {
            if !expanded && self.is_current(node, path) {
                continue;
            }
            if expanded {
                self.emit_pure(routine, node, path, block);
                self.materializing.remove(node.id.as_str());
                if self.variable_readers.contains(node.id.as_str()) {
                    self.fresh.insert(node.id.as_str());
                } else {
                    path.insert(node.id.as_str());
                }
                continue;
            }
            if self.materializing.contains(node.id.as_str()) {
                self.report(
                    DiagnosticKind::ShapeAmbiguity,
                    Some(&node.id),
                    "data cycle: value is read before it is computed",
                );
                continue;
            }

            tracing::trace!("[BGC] Materializing pure node {}", node.id);
            self.materializing.insert(node.id.as_str());
            stack.push((node, true));
            for dependency in self.pure_dependencies(node).into_iter().rev() {
                stack.push((dependency, false));
            }
        }
    }

    fn pure_dependencies(&self, node: &NodeInstance) -> Vec<&'a NodeInstance> {
        let Some(definition) = self.definition(node) else {
            return Vec::new();
        };
        let resolver = self.resolver();
        definition
            .inputs
            .iter()
            .filter(|param| !param.kind.is_exec())
            .filter_map(|param| resolver.source_edge(&node.id, &param.id))
            .filter_map(|edge| self.index.node(&edge.from_node_id))
            .filter(|producer| self.kind_of(producer).map(NodeKind::is_pure).unwrap_or(false))
            .collect()
    }
}

/// Ids of `get_variable` nodes and of every pure node fed by one, transitively.
fn variable_readers<'a>(blueprint: &'a Blueprint, catalog: &NodeCatalog, index: &ConnectionIndex<'a>) -> HashSet<&'a str> {
    let kind = |node: &NodeInstance| {
        catalog
            .find(&node.definition_id)
            .and_then(|definition| NodeKind::from_definition_id(&definition.id))
    };

    let mut readers: HashSet<&'a str> = blueprint
        .nodes
        .iter()
        .filter(|node| kind(node) == Some(NodeKind::GetVariable))
        .map(|node| node.id.as_str())
        .collect();
    let mut pending: Vec<&'a str> = readers.iter().copied().collect();

    while let Some(node_id) = pending.pop() {
        for edge in index.leaving(node_id) {
            let Some(consumer) = index.node(&edge.to_node_id) else {
                continue;
            };
            let pure = kind(consumer).map(NodeKind::is_pure).unwrap_or(false);
            if pure && readers.insert(consumer.id.as_str()) {
                pending.push(consumer.id.as_str());
            }
        }
    }
    readers
}

/// TypeScript type of a resolved source; `None` when there is nothing to read.
pub(crate) fn source_type(source: &SourceExpr) -> Option<String> {
    match source {
        SourceExpr::Literal { value, .. } => Some(literal_type(value).to_string()),
        SourceExpr::Parameter { ty, .. } => Some(ty.clone()),
        SourceExpr::Temporary { kind, .. } => Some(ts_type(*kind).to_string()),
        SourceExpr::Undefined => None,
    }
}
