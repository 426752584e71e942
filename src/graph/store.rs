//! # Blueprint Store Operations
//!
//! The only sanctioned way to mutate a [`Blueprint`]: scaffolding, adding and
//! removing nodes, wiring and unwiring connections. The compiler never calls
//! into this module; it reads a finished snapshot.

use super::{Blueprint, BlueprintType, NodeConnection, NodeInstance, Position};
use crate::error::{BlueprintError, Result};
use crate::metadata::{LifecycleHook, NodeCatalog, FUNCTION_START_ID};
use serde_json::{json, Value};
use std::collections::BTreeMap;

impl Blueprint {
    /// An empty blueprint with no nodes.
    pub fn new(name: impl Into<String>, kind: BlueprintType) -> Self {
        let name = name.into();
        Self {
            id: format!("blueprint_{}", crate::analysis::naming::sanitize(&name)),
            name,
            kind,
            nodes: Vec::new(),
            connections: Vec::new(),
            variables: BTreeMap::new(),
            description: None,
        }
    }

    /// A blueprint with the default entry nodes already placed: every lifecycle
    /// hook for components, a single `function_start` for functions.
    pub fn scaffold(name: impl Into<String>, kind: BlueprintType, catalog: &NodeCatalog) -> Self {
        let mut blueprint = Self::new(name, kind);

        let entries: Vec<(&str, Position)> = match kind {
            BlueprintType::Component => LifecycleHook::ALL
                .iter()
                .enumerate()
                .map(|(i, hook)| {
                    let column = (i / 4) as f64;
                    let row = (i % 4) as f64;
                    (hook.definition_id(), Position::new(100.0 + column * 300.0, 100.0 + row * 100.0))
                })
                .collect(),
            BlueprintType::Function => vec![(FUNCTION_START_ID, Position::new(100.0, 200.0))],
        };

        for (definition_id, position) in entries {
            let id = blueprint.next_node_id();
            let name = catalog
                .find(definition_id)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| definition_id.to_string());
            let mut node = NodeInstance::new(id, definition_id).at(position);
            node.name = name;
            blueprint.nodes.push(node);
        }

        tracing::debug!(
            "[BGC] Scaffolded {} blueprint '{}' with {} entry nodes",
            kind,
            blueprint.name,
            blueprint.nodes.len()
        );
        blueprint
    }

    /// Place a new instance of `definition_id` and return it.
    ///
    /// Constant nodes get their literal seeded (`0`, `""`, `false`).
    pub fn add_node(
        &mut self,
        catalog: &NodeCatalog,
        definition_id: &str,
        position: Position,
    ) -> Result<&NodeInstance> {
        let definition = catalog
            .find(definition_id)
            .ok_or_else(|| BlueprintError::DefinitionNotFound(definition_id.to_string()))?;

        let mut node = NodeInstance::new(self.next_node_id(), definition_id).at(position);
        node.name = definition.name.clone();

        let seed = match definition_id {
            "number_constant" => Some(json!(0)),
            "string_constant" => Some(json!("")),
            "boolean_constant" => Some(json!(false)),
            _ => None,
        };
        if let Some(value) = seed {
            node.inputs.insert("value".to_string(), value);
        }

        tracing::debug!("[BGC] Added node {} ({})", node.id, definition_id);
        self.nodes.push(node);
        Ok(&self.nodes[self.nodes.len() - 1])
    }

    /// Remove a node and every connection touching it.
    pub fn remove_node(&mut self, node_id: &str) -> Result<NodeInstance> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == node_id)
            .ok_or_else(|| BlueprintError::NodeNotFound(node_id.to_string()))?;

        let node = self.nodes.remove(index);
        let before = self.connections.len();
        self.connections.retain(|c| !c.touches(node_id));

        tracing::debug!(
            "[BGC] Removed node {} and {} connections",
            node_id,
            before - self.connections.len()
        );
        Ok(node)
    }

    /// Wire an output slot to an input slot after checking both endpoints.
    ///
    /// Direction and exec/data agreement are enforced; data kinds are not.
    pub fn connect(
        &mut self,
        catalog: &NodeCatalog,
        from_node_id: &str,
        from_param_id: &str,
        to_node_id: &str,
        to_param_id: &str,
    ) -> Result<&NodeConnection> {
        let invalid = |reason: &str| BlueprintError::InvalidConnection {
            from_node: from_node_id.to_string(),
            from_param: from_param_id.to_string(),
            to_node: to_node_id.to_string(),
            to_param: to_param_id.to_string(),
            reason: reason.to_string(),
        };

        let from = self
            .find_node(from_node_id)
            .ok_or_else(|| BlueprintError::NodeNotFound(from_node_id.to_string()))?;
        let to = self
            .find_node(to_node_id)
            .ok_or_else(|| BlueprintError::NodeNotFound(to_node_id.to_string()))?;

        let from_def = catalog
            .find(&from.definition_id)
            .ok_or_else(|| BlueprintError::DefinitionNotFound(from.definition_id.clone()))?;
        let to_def = catalog
            .find(&to.definition_id)
            .ok_or_else(|| BlueprintError::DefinitionNotFound(to.definition_id.clone()))?;

        let from_param = from_def.find_output(from_param_id).ok_or_else(|| BlueprintError::ParamNotFound {
            node_id: from_node_id.to_string(),
            param_id: from_param_id.to_string(),
            direction: "output",
        })?;
        let to_param = to_def.find_input(to_param_id).ok_or_else(|| BlueprintError::ParamNotFound {
            node_id: to_node_id.to_string(),
            param_id: to_param_id.to_string(),
            direction: "input",
        })?;

        if from_param.kind.is_exec() != to_param.kind.is_exec() {
            return Err(invalid("exec slots only connect to exec slots"));
        }
        if self.connections.iter().any(|c| {
            c.from_node_id == from_node_id
                && c.from_param_id == from_param_id
                && c.to_node_id == to_node_id
                && c.to_param_id == to_param_id
        }) {
            return Err(invalid("connection already exists"));
        }

        let connection = NodeConnection::new(
            self.next_connection_id(),
            from_node_id,
            from_param_id,
            to_node_id,
            to_param_id,
        );
        Ok(self.add_connection(connection))
    }

    /// Append a connection as-is, without endpoint checks.
    pub fn add_connection(&mut self, connection: NodeConnection) -> &NodeConnection {
        tracing::debug!(
            "[BGC] Connected {}.{} -> {}.{}",
            connection.from_node_id,
            connection.from_param_id,
            connection.to_node_id,
            connection.to_param_id
        );
        self.connections.push(connection);
        &self.connections[self.connections.len() - 1]
    }

    pub fn remove_connection(&mut self, connection_id: &str) -> Result<NodeConnection> {
        let index = self
            .connections
            .iter()
            .position(|c| c.id == connection_id)
            .ok_or_else(|| BlueprintError::ConnectionNotFound(connection_id.to_string()))?;
        Ok(self.connections.remove(index))
    }

    /// Set the literal override used when `param_id` is unconnected.
    pub fn set_input(&mut self, node_id: &str, param_id: &str, value: Value) -> Result<()> {
        let node = self
            .find_node_mut(node_id)
            .ok_or_else(|| BlueprintError::NodeNotFound(node_id.to_string()))?;
        node.inputs.insert(param_id.to_string(), value);
        Ok(())
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    fn next_node_id(&self) -> String {
        format!("node_{}", next_sequence(self.nodes.iter().map(|n| n.id.as_str())))
    }

    fn next_connection_id(&self) -> String {
        format!("conn_{}", next_sequence(self.connections.iter().map(|c| c.id.as_str())))
    }
}

/// One more than the largest numeric id suffix in use.
fn next_sequence<'a>(ids: impl Iterator<Item = &'a str>) -> u64 {
    ids.filter_map(|id| super::numeric_suffix(id).and_then(|s| s.parse::<u64>().ok()))
        .max()
        .map(|n| n + 1)
        .unwrap_or(1)
}
