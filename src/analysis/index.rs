//! # Connection Index
//!
//! Per-compilation lookup tables over a blueprint's nodes and connections.
//! Built once, read everywhere during traversal.

use crate::graph::{Blueprint, NodeConnection, NodeDefinition, NodeInstance};
use std::collections::HashMap;

/// Node and edge lookups for one compilation.
///
/// Edge lists preserve the blueprint's connection order, which is the order
/// fan-out targets fire in.
pub struct ConnectionIndex<'a> {
    nodes: HashMap<&'a str, &'a NodeInstance>,
    /// `"{fromNodeId}:{fromParamId}"` -> edges.
    outgoing: HashMap<String, Vec<&'a NodeConnection>>,
    /// Every edge leaving a node, any param.
    by_source: HashMap<&'a str, Vec<&'a NodeConnection>>,
    /// `"{toNodeId}:{toParamId}"` -> edges.
    incoming: HashMap<String, Vec<&'a NodeConnection>>,
    dangling: Vec<&'a NodeConnection>,
}

pub fn endpoint_key(node_id: &str, param_id: &str) -> String {
    format!("{}:{}", node_id, param_id)
}

impl<'a> ConnectionIndex<'a> {
    pub fn build(blueprint: &'a Blueprint) -> Self {
        let mut nodes = HashMap::with_capacity(blueprint.nodes.len());
        for node in &blueprint.nodes {
            // First instance wins if ids collide.
            nodes.entry(node.id.as_str()).or_insert(node);
        }

        let mut outgoing: HashMap<String, Vec<&NodeConnection>> = HashMap::new();
        let mut by_source: HashMap<&str, Vec<&NodeConnection>> = HashMap::new();
        let mut incoming: HashMap<String, Vec<&NodeConnection>> = HashMap::new();
        let mut dangling = Vec::new();

        for connection in &blueprint.connections {
            if !nodes.contains_key(connection.from_node_id.as_str())
                || !nodes.contains_key(connection.to_node_id.as_str())
            {
                dangling.push(connection);
                continue;
            }
            outgoing
                .entry(endpoint_key(&connection.from_node_id, &connection.from_param_id))
                .or_default()
                .push(connection);
            by_source
                .entry(connection.from_node_id.as_str())
                .or_default()
                .push(connection);
            incoming
                .entry(endpoint_key(&connection.to_node_id, &connection.to_param_id))
                .or_default()
                .push(connection);
        }

        tracing::debug!(
            "[BGC] Indexed {} nodes, {} endpoints, {} dangling connections",
            nodes.len(),
            outgoing.len(),
            dangling.len()
        );

        Self {
            nodes,
            outgoing,
            by_source,
            incoming,
            dangling,
        }
    }

    pub fn node(&self, node_id: &str) -> Option<&'a NodeInstance> {
        self.nodes.get(node_id).copied()
    }

    /// Edges leaving one output slot.
    pub fn outgoing(&self, node_id: &str, param_id: &str) -> &[&'a NodeConnection] {
        self.outgoing
            .get(&endpoint_key(node_id, param_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Edges arriving at one input slot.
    pub fn incoming(&self, node_id: &str, param_id: &str) -> &[&'a NodeConnection] {
        self.incoming
            .get(&endpoint_key(node_id, param_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every edge leaving `node_id`, any param, in connection order.
    pub fn leaving(&self, node_id: &str) -> &[&'a NodeConnection] {
        self.by_source.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Execution edges leaving `node`, classified by the declared kind of the
    /// source param rather than its name.
    pub fn exec_out_edges(&self, node: &NodeInstance, definition: &NodeDefinition) -> Vec<&'a NodeConnection> {
        self.by_source
            .get(node.id.as_str())
            .map(|edges| {
                edges
                    .iter()
                    .copied()
                    .filter(|c| definition.is_exec_output(&c.from_param_id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Connections whose endpoints name nodes missing from the blueprint.
    pub fn dangling(&self) -> &[&'a NodeConnection] {
        &self.dangling
    }
}
