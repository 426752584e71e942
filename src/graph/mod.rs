//! # Blueprint Graph Model
//!
//! The node, connection and blueprint structures the editor produces and the
//! compiler reads. Field names follow the persisted JSON format (camelCase),
//! so a `.bp` document deserializes straight into these types.
//!
//! Mutations (adding and removing nodes or connections, scaffolding new
//! blueprints) live in [`store`].

pub mod store;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Kind of value a param slot carries.
///
/// `Exec` marks a control-flow endpoint rather than a data slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Number,
    Boolean,
    Object,
    Exec,
    Select,
}

impl ParamKind {
    pub fn is_exec(self) -> bool {
        self == ParamKind::Exec
    }
}

/// A named, typed slot declaration on a node definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeParam {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParamKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Slot has no visual port (e.g. function-parameter metadata inputs).
    #[serde(default, rename = "noPort", alias = "hidden", skip_serializing_if = "is_false")]
    pub hidden: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl NodeParam {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            default_value: None,
            description: None,
            options: None,
            hidden: false,
        }
    }

    /// Shorthand for an exec slot.
    pub fn exec(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, ParamKind::Exec)
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// The class of a node: its ports and identity in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDefinition {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub inputs: Vec<NodeParam>,
    #[serde(default)]
    pub outputs: Vec<NodeParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl NodeDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            description: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            color: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn input(mut self, param: NodeParam) -> Self {
        self.inputs.push(param);
        self
    }

    pub fn output(mut self, param: NodeParam) -> Self {
        self.outputs.push(param);
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn find_input(&self, param_id: &str) -> Option<&NodeParam> {
        self.inputs.iter().find(|p| p.id == param_id)
    }

    pub fn find_output(&self, param_id: &str) -> Option<&NodeParam> {
        self.outputs.iter().find(|p| p.id == param_id)
    }

    /// Exec outputs in declaration order.
    pub fn exec_outputs(&self) -> impl Iterator<Item = &NodeParam> {
        self.outputs.iter().filter(|p| p.kind.is_exec())
    }

    /// Data outputs in declaration order.
    pub fn data_outputs(&self) -> impl Iterator<Item = &NodeParam> {
        self.outputs.iter().filter(|p| !p.kind.is_exec())
    }

    /// True when the node takes part in execution flow (has an exec input).
    pub fn has_exec_input(&self) -> bool {
        self.inputs.iter().any(|p| p.kind.is_exec())
    }

    /// Whether `param_id` names an output declared with kind `exec`.
    pub fn is_exec_output(&self, param_id: &str) -> bool {
        self.find_output(param_id)
            .map(|p| p.kind.is_exec())
            .unwrap_or(false)
    }

    /// Param ids that appear more than once within one direction.
    pub fn duplicate_param_ids(&self) -> Vec<String> {
        let mut duplicates = Vec::new();
        for params in [&self.inputs, &self.outputs] {
            for (i, param) in params.iter().enumerate() {
                if params[..i].iter().any(|p| p.id == param.id) && !duplicates.contains(&param.id) {
                    duplicates.push(param.id.clone());
                }
            }
        }
        duplicates
    }
}

/// Canvas position. Layout only; ignored by the compiler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A placed occurrence of a definition inside one blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInstance {
    pub id: String,
    pub definition_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: Position,
    /// Literal overrides for unconnected input slots.
    #[serde(default)]
    pub inputs: BTreeMap<String, Value>,
    /// Runtime / preview values. Never read by the compiler.
    #[serde(default)]
    pub outputs: BTreeMap<String, Value>,
}

impl NodeInstance {
    pub fn new(id: impl Into<String>, definition_id: impl Into<String>) -> Self {
        let definition_id = definition_id.into();
        Self {
            id: id.into(),
            name: definition_id.clone(),
            definition_id,
            position: Position::default(),
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_input(mut self, param_id: impl Into<String>, value: Value) -> Self {
        self.inputs.insert(param_id.into(), value);
        self
    }

    /// Literal override for `param_id`, ignoring explicit JSON nulls.
    pub fn literal(&self, param_id: &str) -> Option<&Value> {
        self.inputs.get(param_id).filter(|v| !v.is_null())
    }

    /// Trailing run of ASCII digits in the node id (`"node_12"` -> `"12"`).
    pub fn numeric_suffix(&self) -> Option<&str> {
        numeric_suffix(&self.id)
    }
}

pub(crate) fn numeric_suffix(id: &str) -> Option<&str> {
    let start = id
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    Some(&id[start..])
}

/// A directed edge from an output slot to an input slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConnection {
    pub id: String,
    pub from_node_id: String,
    pub from_param_id: String,
    pub to_node_id: String,
    pub to_param_id: String,
}

impl NodeConnection {
    pub fn new(
        id: impl Into<String>,
        from_node_id: impl Into<String>,
        from_param_id: impl Into<String>,
        to_node_id: impl Into<String>,
        to_param_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            from_node_id: from_node_id.into(),
            from_param_id: from_param_id.into(),
            to_node_id: to_node_id.into(),
            to_param_id: to_param_id.into(),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.from_node_id == node_id || self.to_node_id == node_id
    }
}

/// Whether a blueprint compiles to a standalone function or a component class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlueprintType {
    Function,
    #[default]
    Component,
}

impl fmt::Display for BlueprintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlueprintType::Function => write!(f, "function"),
            BlueprintType::Component => write!(f, "component"),
        }
    }
}

/// The user-authored node graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: BlueprintType,
    pub nodes: Vec<NodeInstance>,
    pub connections: Vec<NodeConnection>,
    /// Blueprint-global variables and their initial values.
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Blueprint {
    pub fn find_node(&self, node_id: &str) -> Option<&NodeInstance> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn find_node_mut(&mut self, node_id: &str) -> Option<&mut NodeInstance> {
        self.nodes.iter_mut().find(|n| n.id == node_id)
    }

    pub fn find_connection(&self, connection_id: &str) -> Option<&NodeConnection> {
        self.connections.iter().find(|c| c.id == connection_id)
    }

    /// Connections leaving `node_id` from `param_id`, in insertion order.
    pub fn connections_from<'a>(
        &'a self,
        node_id: &'a str,
        param_id: &'a str,
    ) -> impl Iterator<Item = &'a NodeConnection> + 'a {
        self.connections
            .iter()
            .filter(move |c| c.from_node_id == node_id && c.from_param_id == param_id)
    }

    /// Connections arriving at `node_id` on `param_id`, in insertion order.
    pub fn connections_to<'a>(
        &'a self,
        node_id: &'a str,
        param_id: &'a str,
    ) -> impl Iterator<Item = &'a NodeConnection> + 'a {
        self.connections
            .iter()
            .filter(move |c| c.to_node_id == node_id && c.to_param_id == param_id)
    }

    /// Node ids that appear more than once.
    pub fn duplicate_node_ids(&self) -> Vec<&str> {
        let mut duplicates: Vec<&str> = Vec::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if self.nodes[..i].iter().any(|n| n.id == node.id) && !duplicates.contains(&node.id.as_str()) {
                duplicates.push(&node.id);
            }
        }
        duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_suffix() {
        assert_eq!(numeric_suffix("node_12"), Some("12"));
        assert_eq!(numeric_suffix("node_1700000000_start"), None);
        assert_eq!(numeric_suffix("42"), Some("42"));
        assert_eq!(numeric_suffix(""), None);
    }

    #[test]
    fn test_param_kind_serializes_as_type() {
        let param = NodeParam::new("value", "Value", ParamKind::Number).with_default(json!(0));
        let encoded = serde_json::to_value(&param).unwrap();
        assert_eq!(encoded["type"], json!("number"));
        assert_eq!(encoded["defaultValue"], json!(0));
        assert!(encoded.get("noPort").is_none());
    }

    #[test]
    fn test_hidden_accepts_no_port() {
        let param: NodeParam = serde_json::from_value(json!({
            "id": "param_name", "name": "Name", "type": "string", "noPort": true
        }))
        .unwrap();
        assert!(param.hidden);
    }

    #[test]
    fn test_exec_output_uses_declared_kind() {
        let def = NodeDefinition::new("custom", "Custom", "Test")
            .input(NodeParam::exec("exec", "Exec"))
            .output(NodeParam::exec("next", "Next"))
            .output(NodeParam::new("executor", "Executor", ParamKind::String));

        assert!(def.is_exec_output("next"));
        assert!(!def.is_exec_output("executor"));
        assert!(def.has_exec_input());
        assert_eq!(def.exec_outputs().count(), 1);
    }

    #[test]
    fn test_duplicate_param_ids() {
        let def = NodeDefinition::new("dup", "Dup", "Test")
            .input(NodeParam::new("a", "A", ParamKind::Number))
            .input(NodeParam::new("a", "A again", ParamKind::Number))
            .output(NodeParam::new("a", "Out", ParamKind::Number));
        assert_eq!(def.duplicate_param_ids(), vec!["a".to_string()]);
    }

    #[test]
    fn test_blueprint_defaults_on_deserialize() {
        let bp: Blueprint = serde_json::from_value(json!({
            "nodes": [{ "id": "node_1", "definitionId": "print" }],
            "connections": []
        }))
        .unwrap();
        assert_eq!(bp.kind, BlueprintType::Component);
        assert!(bp.variables.is_empty());
        assert_eq!(bp.nodes[0].position, Position::default());
    }
}
