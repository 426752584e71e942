//! # Data-Flow Resolution
//!
//! Answers "where does the value on this input slot come from?".
//!
//! An unconnected slot yields its literal (instance override, else the
//! declared default). A connected slot yields the producer's output
//! temporary, except for function parameters, which are referenced by name
//! and never copied into a local.

use super::index::ConnectionIndex;
use super::naming::{identifier, TemporaryNames};
use crate::graph::{NodeConnection, NodeDefinition, NodeInstance, ParamKind};
use crate::metadata::{NodeCatalog, NodeKind};
use serde_json::Value;

/// The resolved source of an input value.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceExpr {
    /// An unconnected slot's literal value.
    Literal { value: Value, kind: Option<ParamKind> },
    /// A routine parameter, referenced directly.
    Parameter { name: String, ty: String },
    /// The output temporary of another node.
    Temporary {
        name: String,
        node_id: String,
        param_id: String,
        kind: ParamKind,
    },
    /// Nothing to read: no edge, no literal, no default, or a broken reference.
    Undefined,
}

pub struct DataResolver<'r, 'a> {
    index: &'r ConnectionIndex<'a>,
    catalog: &'r NodeCatalog,
    names: &'r TemporaryNames,
}

impl<'r, 'a> DataResolver<'r, 'a> {
    pub fn new(index: &'r ConnectionIndex<'a>, catalog: &'r NodeCatalog, names: &'r TemporaryNames) -> Self {
        Self { index, catalog, names }
    }

    /// Resolve the value feeding `param_id` on `node`.
    ///
    /// With several inbound edges only the first, in connection order, is
    /// honored; see [`DataResolver::fan_in`].
    pub fn resolve(&self, node: &NodeInstance, param_id: &str) -> SourceExpr {
        match self.index.incoming(&node.id, param_id).first() {
            Some(edge) => self.from_edge(edge),
            None => self.literal(node, param_id),
        }
    }

    /// Number of edges targeting one input slot.
    pub fn fan_in(&self, node_id: &str, param_id: &str) -> usize {
        self.index.incoming(node_id, param_id).len()
    }

    /// The producing edge, if the slot is connected.
    pub fn source_edge(&self, node_id: &str, param_id: &str) -> Option<&'a NodeConnection> {
        self.index.incoming(node_id, param_id).first().copied()
    }

    fn literal(&self, node: &NodeInstance, param_id: &str) -> SourceExpr {
        let param = self
            .catalog
            .find(&node.definition_id)
            .and_then(|d| d.find_input(param_id));
        let kind = param.map(|p| p.kind);

        if let Some(value) = node.literal(param_id) {
            return SourceExpr::Literal { value: value.clone(), kind };
        }
        match param.and_then(|p| p.default_value.as_ref()).filter(|v| !v.is_null()) {
            Some(value) => SourceExpr::Literal { value: value.clone(), kind },
            None => SourceExpr::Undefined,
        }
    }

    fn from_edge(&self, edge: &NodeConnection) -> SourceExpr {
        let Some(producer) = self.index.node(&edge.from_node_id) else {
            return SourceExpr::Undefined;
        };
        let Some(definition) = self.catalog.find(&producer.definition_id) else {
            return SourceExpr::Undefined;
        };

        match NodeKind::from_definition_id(&definition.id) {
            Some(NodeKind::FunctionParameter) => SourceExpr::Parameter {
                name: parameter_name(producer, definition),
                ty: parameter_type(producer, definition),
            },
            Some(NodeKind::Lifecycle(hook)) if hook.takes_delta_time() && edge.from_param_id == DELTA_TIME => {
                SourceExpr::Parameter {
                    name: DELTA_TIME.to_string(),
                    ty: "number".to_string(),
                }
            }
            _ => {
                let Some(output) = definition.find_output(&edge.from_param_id) else {
                    return SourceExpr::Undefined;
                };
                match self.names.get(&producer.id, &output.id) {
                    Some(name) => SourceExpr::Temporary {
                        name: name.to_string(),
                        node_id: producer.id.clone(),
                        param_id: output.id.clone(),
                        kind: output.kind,
                    },
                    None => SourceExpr::Undefined,
                }
            }
        }
    }
}

pub const DELTA_TIME: &str = "deltaTime";

/// Declared name of a function-parameter node, as an identifier.
pub fn parameter_name(node: &NodeInstance, definition: &NodeDefinition) -> String {
    let name = string_setting(node, definition, "param_name").unwrap_or_else(|| "param".to_string());
    identifier(&name)
}

/// Declared type of a function-parameter node; `any` when unset.
pub fn parameter_type(node: &NodeInstance, definition: &NodeDefinition) -> String {
    string_setting(node, definition, "param_type")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "any".to_string())
}

/// A string-valued literal setting: instance override, else declared default.
pub fn string_setting(node: &NodeInstance, definition: &NodeDefinition, param_id: &str) -> Option<String> {
    node.literal(param_id)
        .or_else(|| definition.find_input(param_id).and_then(|p| p.default_value.as_ref()))
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Blueprint, BlueprintType, NodeConnection};
    use serde_json::json;

    struct Fixture {
        blueprint: Blueprint,
        catalog: NodeCatalog,
    }

    impl Fixture {
        fn new() -> Self {
            let mut blueprint = Blueprint::new("Flow", BlueprintType::Function);
            blueprint.nodes.push(
                NodeInstance::new("node_1", "function_parameter")
                    .with_input("param_name", json!("x"))
                    .with_input("param_type", json!("number")),
            );
            blueprint.nodes.push(NodeInstance::new("node_2", "number_constant").with_input("value", json!(42)));
            blueprint.nodes.push(NodeInstance::new("node_3", "add_numbers").with_input("b", json!(5)));
            blueprint.nodes.push(NodeInstance::new("node_4", "print"));
            blueprint.add_connection(NodeConnection::new("c1", "node_1", "value", "node_3", "a"));
            blueprint.add_connection(NodeConnection::new("c2", "node_2", "value", "node_4", "value"));
            blueprint.add_connection(NodeConnection::new("c3", "node_3", "result", "node_4", "value"));
            Self {
                blueprint,
                catalog: NodeCatalog::builtin(),
            }
        }
    }

    #[test]
    fn test_parameter_resolves_to_name() {
        let f = Fixture::new();
        let index = ConnectionIndex::build(&f.blueprint);
        let names = TemporaryNames::allocate(&f.blueprint, &f.catalog);
        let resolver = DataResolver::new(&index, &f.catalog, &names);

        let add = f.blueprint.find_node("node_3").unwrap();
        assert_eq!(
            resolver.resolve(add, "a"),
            SourceExpr::Parameter {
                name: "x".to_string(),
                ty: "number".to_string()
            }
        );
    }

    #[test]
    fn test_unconnected_uses_override_then_default() {
        let f = Fixture::new();
        let index = ConnectionIndex::build(&f.blueprint);
        let names = TemporaryNames::allocate(&f.blueprint, &f.catalog);
        let resolver = DataResolver::new(&index, &f.catalog, &names);

        let add = f.blueprint.find_node("node_3").unwrap();
        assert_eq!(
            resolver.resolve(add, "b"),
            SourceExpr::Literal {
                value: json!(5),
                kind: Some(ParamKind::Number)
            }
        );

        let mut bare = add.clone();
        bare.inputs.clear();
        assert_eq!(
            resolver.resolve(&bare, "b"),
            SourceExpr::Literal {
                value: json!(0),
                kind: Some(ParamKind::Number)
            }
        );
        assert_eq!(resolver.resolve(&bare, "missing"), SourceExpr::Undefined);
    }

    #[test]
    fn test_fan_in_first_edge_wins() {
        let f = Fixture::new();
        let index = ConnectionIndex::build(&f.blueprint);
        let names = TemporaryNames::allocate(&f.blueprint, &f.catalog);
        let resolver = DataResolver::new(&index, &f.catalog, &names);

        let print = f.blueprint.find_node("node_4").unwrap();
        assert_eq!(resolver.fan_in("node_4", "value"), 2);
        match resolver.resolve(print, "value") {
            SourceExpr::Temporary { name, node_id, .. } => {
                assert_eq!(node_id, "node_2");
                assert_eq!(name, "numberconstant_2_value");
            }
            other => panic!("expected temporary, got {:?}", other),
        }
    }

    #[test]
    fn test_parameter_defaults() {
        let catalog = NodeCatalog::builtin();
        let def = catalog.find("function_parameter").unwrap();
        let node = NodeInstance::new("node_1", "function_parameter").with_input("param_name", json!("my value"));
        assert_eq!(parameter_name(&node, def), "my_value");
        assert_eq!(parameter_type(&node, def), "any");
    }
}
