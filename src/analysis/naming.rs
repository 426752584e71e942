//! # Temporary Naming
//!
//! Every data output of every node gets a deterministic local name:
//! `{definition name}_{node number}_{output id}`, e.g. `add_12_result`.
//! Names are allocated up front for the whole blueprint so that any consumer
//! can refer to a producer's temporary before the producer is emitted.

use crate::graph::{Blueprint, NodeInstance};
use crate::metadata::NodeCatalog;
use std::collections::{HashMap, HashSet};

/// Lowercase and strip everything that is not ASCII alphanumeric.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Turn arbitrary text into a usable identifier, keeping case.
pub fn identifier(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if ident.is_empty() {
        ident.push('_');
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Pre-allocated temporary names keyed by (node id, output param id).
#[derive(Debug, Default)]
pub struct TemporaryNames {
    names: HashMap<(String, String), String>,
}

impl TemporaryNames {
    pub fn allocate(blueprint: &Blueprint, catalog: &NodeCatalog) -> Self {
        let mut names = HashMap::new();
        let mut taken: HashSet<String> = HashSet::new();

        for (position, node) in blueprint.nodes.iter().enumerate() {
            let Some(definition) = catalog.find(&node.definition_id) else {
                continue;
            };
            let prefix = prefix_for(&definition.name, &definition.id);
            let number = node_number(node, position);

            for output in definition.data_outputs() {
                let key = (node.id.clone(), output.id.clone());
                if names.contains_key(&key) {
                    continue;
                }
                let base = format!("{}_{}_{}", prefix, number, identifier(&output.id));
                let mut name = base.clone();
                let mut n = 2;
                while taken.contains(&name) {
                    name = format!("{}_{}", base, n);
                    n += 1;
                }
                taken.insert(name.clone());
                names.insert(key, name);
            }
        }

        Self { names }
    }

    pub fn get(&self, node_id: &str, param_id: &str) -> Option<&str> {
        self.names
            .get(&(node_id.to_string(), param_id.to_string()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn prefix_for(display_name: &str, definition_id: &str) -> String {
    let mut prefix = sanitize(display_name);
    if prefix.is_empty() {
        // Display names outside ASCII sanitize away entirely.
        prefix = sanitize(definition_id);
    }
    if prefix.is_empty() {
        prefix = "node".to_string();
    }
    if prefix.starts_with(|c: char| c.is_ascii_digit()) {
        prefix.insert(0, 'n');
    }
    prefix
}

fn node_number(node: &NodeInstance, position: usize) -> String {
    node.numeric_suffix()
        .map(str::to_string)
        .unwrap_or_else(|| position.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BlueprintType, NodeDefinition, NodeParam, ParamKind};

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("Number Constant"), "numberconstant");
        assert_eq!(sanitize("数字常量"), "");
        assert_eq!(sanitize("A-b_C 9"), "abc9");
    }

    #[test]
    fn test_identifier() {
        assert_eq!(identifier("my var"), "my_var");
        assert_eq!(identifier("9lives"), "_9lives");
        assert_eq!(identifier(""), "_");
        assert_eq!(identifier("deltaTime"), "deltaTime");
    }

    #[test]
    fn test_names_follow_rule() {
        let catalog = NodeCatalog::builtin();
        let mut bp = Blueprint::new("Names", BlueprintType::Function);
        bp.nodes.push(NodeInstance::new("node_12", "add_numbers"));
        bp.nodes.push(NodeInstance::new("node_3", "for_loop"));

        let names = TemporaryNames::allocate(&bp, &catalog);
        assert_eq!(names.get("node_12", "result"), Some("add_12_result"));
        assert_eq!(names.get("node_3", "index"), Some("forloop_3_index"));
        // Exec outputs never get temporaries.
        assert_eq!(names.get("node_3", "loop_body"), None);
    }

    #[test]
    fn test_colliding_prefixes_stay_distinct() {
        let mut catalog = NodeCatalog::new();
        catalog.insert(
            NodeDefinition::new("a", "Sum!", "Test").output(NodeParam::new("out", "Out", ParamKind::Number)),
        );
        catalog.insert(
            NodeDefinition::new("b", "sum", "Test").output(NodeParam::new("out", "Out", ParamKind::Number)),
        );
        let mut bp = Blueprint::new("Names", BlueprintType::Function);
        bp.nodes.push(NodeInstance::new("x_1", "a"));
        bp.nodes.push(NodeInstance::new("y_1", "b"));

        let names = TemporaryNames::allocate(&bp, &catalog);
        assert_eq!(names.get("x_1", "out"), Some("sum_1_out"));
        assert_eq!(names.get("y_1", "out"), Some("sum_1_out_2"));
    }

    #[test]
    fn test_non_ascii_names_fall_back_to_definition_id() {
        let mut catalog = NodeCatalog::new();
        catalog.insert(
            NodeDefinition::new("number_constant", "数字常量", "常量")
                .output(NodeParam::new("value", "数值", ParamKind::Number)),
        );
        let mut bp = Blueprint::new("Names", BlueprintType::Function);
        bp.nodes.push(NodeInstance::new("node_start", "number_constant"));

        let names = TemporaryNames::allocate(&bp, &catalog);
        assert_eq!(names.get("node_start", "value"), Some("numberconstant_0_value"));
    }
}
