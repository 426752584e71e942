//! # Node Catalog
//!
//! Immutable-at-compile-time collection of node definitions, looked up by id.
//! The built-in set mirrors the editor's default palette.

use crate::error::{BlueprintError, Result};
use crate::graph::{NodeDefinition, NodeParam, ParamKind};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Node definitions indexed by id, iterated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct NodeCatalog {
    definitions: Vec<NodeDefinition>,
    index: HashMap<String, usize>,
}

impl NodeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list of definitions. Later entries replace earlier ones
    /// with the same id.
    pub fn from_definitions(definitions: impl IntoIterator<Item = NodeDefinition>) -> Self {
        let mut catalog = Self::new();
        for definition in definitions {
            catalog.insert(definition);
        }
        catalog
    }

    pub fn find(&self, id: &str) -> Option<&NodeDefinition> {
        self.index.get(id).map(|&i| &self.definitions[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Add a definition, replacing any existing one with the same id.
    pub fn insert(&mut self, definition: NodeDefinition) {
        match self.index.get(&definition.id) {
            Some(&i) => self.definitions[i] = definition,
            None => {
                self.index.insert(definition.id.clone(), self.definitions.len());
                self.definitions.push(definition);
            }
        }
    }

    pub fn update(&mut self, id: &str, edit: impl FnOnce(&mut NodeDefinition)) -> Result<()> {
        let i = *self
            .index
            .get(id)
            .ok_or_else(|| BlueprintError::DefinitionNotFound(id.to_string()))?;
        edit(&mut self.definitions[i]);
        if self.definitions[i].id != id {
            // The edit renamed the definition; rebuild the index.
            self.reindex();
        }
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<NodeDefinition> {
        let i = self.index.remove(id)?;
        let removed = self.definitions.remove(i);
        self.reindex();
        Some(removed)
    }

    /// Import definitions whose ids are not yet known. Returns how many were added.
    pub fn merge(&mut self, definitions: impl IntoIterator<Item = NodeDefinition>) -> usize {
        let mut added = 0;
        for definition in definitions {
            if !self.contains(&definition.id) {
                self.insert(definition);
                added += 1;
            }
        }
        added
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeDefinition> {
        self.definitions.iter()
    }

    pub fn definitions(&self) -> &[NodeDefinition] {
        &self.definitions
    }

    pub fn into_definitions(self) -> Vec<NodeDefinition> {
        self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions grouped by category, categories in first-seen order.
    pub fn by_category(&self) -> Vec<(&str, Vec<&NodeDefinition>)> {
        let mut groups: Vec<(&str, Vec<&NodeDefinition>)> = Vec::new();
        for definition in &self.definitions {
            match groups.iter_mut().find(|(c, _)| *c == definition.category) {
                Some((_, members)) => members.push(definition),
                None => groups.push((&definition.category, vec![definition])),
            }
        }
        groups
    }

    fn reindex(&mut self) {
        self.index = self
            .definitions
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id.clone(), i))
            .collect();
    }

    /// The default palette shipped with the editor.
    pub fn builtin() -> Self {
        Self::from_definitions(builtin_definitions())
    }
}

impl From<Vec<NodeDefinition>> for NodeCatalog {
    fn from(definitions: Vec<NodeDefinition>) -> Self {
        Self::from_definitions(definitions)
    }
}

fn data(id: &str, name: &str, kind: ParamKind) -> NodeParam {
    NodeParam::new(id, name, kind)
}

fn data_default(id: &str, name: &str, kind: ParamKind, default: Value) -> NodeParam {
    NodeParam::new(id, name, kind).with_default(default)
}

fn exec_in() -> NodeParam {
    NodeParam::exec("exec", "Exec")
}

fn exec_out() -> NodeParam {
    NodeParam::exec("exec", "Then")
}

fn binary_number(id: &str, name: &str, description: &str, identity: i64) -> NodeDefinition {
    NodeDefinition::new(id, name, "Math")
        .describe(description)
        .input(data_default("a", "A", ParamKind::Number, json!(identity)))
        .input(data_default("b", "B", ParamKind::Number, json!(identity)))
        .output(data("result", "Result", ParamKind::Number))
        .color("#2196F3")
}

fn compare(id: &str, name: &str, description: &str) -> NodeDefinition {
    NodeDefinition::new(id, name, "Compare")
        .describe(description)
        .input(data_default("a", "A", ParamKind::Number, json!(0)))
        .input(data_default("b", "B", ParamKind::Number, json!(0)))
        .output(data("result", "Result", ParamKind::Boolean))
        .color("#FF9800")
}

fn lifecycle(id: &str, description: &str, delta_time: bool) -> NodeDefinition {
    let mut definition = NodeDefinition::new(id, id, "Lifecycle")
        .describe(description)
        .output(NodeParam::exec("exec", "Exec"))
        .color("#FF9800");
    if delta_time {
        definition = definition.output(data("deltaTime", "Delta Time", ParamKind::Number));
    }
    definition
}

fn fan_out(id: &str, name: &str, label: &str, description: &str) -> NodeDefinition {
    NodeDefinition::new(id, name, "Flow Control")
        .describe(description)
        .input(exec_in())
        .output(NodeParam::exec("exec_1", format!("{} 1", label)))
        .output(NodeParam::exec("exec_2", format!("{} 2", label)))
        .output(NodeParam::exec("exec_3", format!("{} 3", label)))
        .color("#FF5722")
}

fn builtin_definitions() -> Vec<NodeDefinition> {
    vec![
        // Function signature
        NodeDefinition::new("function_parameter", "Function Parameter", "Function")
            .describe("Declares an input parameter of the function")
            .input(data_default("param_name", "Name", ParamKind::String, json!("param")).hidden())
            .input(data_default("param_type", "Type", ParamKind::String, json!("any")).hidden())
            .input(data("default_value", "Default", ParamKind::Object).hidden())
            .output(data("value", "Value", ParamKind::Object))
            .color("#9C27B0"),
        NodeDefinition::new("function_return", "Function Return", "Function")
            .describe("Declares the value the function returns")
            .input(exec_in())
            .input(data("value", "Value", ParamKind::Object))
            .color("#E91E63"),
        // Constants
        NodeDefinition::new("number_constant", "Number Constant", "Constants")
            .describe("A fixed number")
            .output(data("value", "Value", ParamKind::Number))
            .color("#3F51B5"),
        NodeDefinition::new("string_constant", "String Constant", "Constants")
            .describe("A fixed string")
            .output(data("value", "Value", ParamKind::String))
            .color("#3F51B5"),
        NodeDefinition::new("boolean_constant", "Boolean Constant", "Constants")
            .describe("A fixed true/false value")
            .output(data("value", "Value", ParamKind::Boolean))
            .color("#3F51B5"),
        NodeDefinition::new("null_constant", "Null Constant", "Constants")
            .describe("The null value")
            .output(data("value", "Value", ParamKind::Object))
            .color("#3F51B5"),
        // Events
        NodeDefinition::new("function_start", "Function Start", "Events")
            .describe("Where a function blueprint starts executing")
            .output(NodeParam::exec("exec", "Exec"))
            .color("#4CAF50"),
        NodeDefinition::new("print", "Print", "Events")
            .describe("Prints a value to the console")
            .input(exec_in())
            .input(data_default("value", "Value", ParamKind::Number, json!(0)))
            .output(exec_out())
            .color("#4CAF50"),
        NodeDefinition::new("end", "End", "Events")
            .describe("Where execution stops")
            .input(exec_in())
            .color("#F44336"),
        NodeDefinition::new("delay", "Delay", "Events")
            .describe("Waits before continuing")
            .input(exec_in())
            .input(data_default("duration", "Duration (ms)", ParamKind::Number, json!(1000)))
            .output(exec_out())
            .color("#9C27B0"),
        // Component lifecycle
        lifecycle("onLoad", "Called when the component is loaded, before start", false),
        lifecycle("start", "Called before the first frame the component is active", false),
        lifecycle("update", "Called every frame", true),
        lifecycle("lateUpdate", "Called every frame after all update calls", true),
        lifecycle("onEnable", "Called when the component is enabled", false),
        lifecycle("onDisable", "Called when the component is disabled", false),
        lifecycle("onDestroy", "Called when the component is destroyed", false),
        // Flow control
        fan_out("sequence", "Sequence", "Then", "Runs each output in order"),
        fan_out("parallel", "Parallel", "Branch", "Runs every output concurrently and waits for all"),
        NodeDefinition::new("if_condition", "Branch", "Flow Control")
            .describe("Chooses a path based on a condition")
            .input(exec_in())
            .input(data_default("condition", "Condition", ParamKind::Boolean, json!(true)))
            .output(NodeParam::exec("true", "True"))
            .output(NodeParam::exec("false", "False"))
            .color("#FF5722"),
        NodeDefinition::new("for_loop", "For Loop", "Flow Control")
            .describe("Runs the body a fixed number of times")
            .input(exec_in())
            .input(data_default("count", "Count", ParamKind::Number, json!(10)))
            .output(NodeParam::exec("loop_body", "Loop Body"))
            .output(data("index", "Index", ParamKind::Number))
            .output(NodeParam::exec("completed", "Completed"))
            .color("#795548"),
        NodeDefinition::new("switch", "Switch", "Flow Control")
            .describe("Chooses a path based on a value")
            .input(exec_in())
            .input(data_default("value", "Value", ParamKind::Number, json!(0)))
            .output(NodeParam::exec("case_0", "Case 0"))
            .output(NodeParam::exec("case_1", "Case 1"))
            .output(NodeParam::exec("default", "Default"))
            .color("#607D8B"),
        // Math
        binary_number("add_numbers", "Add", "Adds two numbers", 0),
        binary_number("subtract_numbers", "Subtract", "Subtracts B from A", 0),
        binary_number("multiply_numbers", "Multiply", "Multiplies two numbers", 1),
        binary_number("divide_numbers", "Divide", "Divides A by B", 1),
        NodeDefinition::new("random_number", "Random Number", "Math")
            .describe("A random number between min and max")
            .input(data_default("min", "Min", ParamKind::Number, json!(0)))
            .input(data_default("max", "Max", ParamKind::Number, json!(100)))
            .output(data("result", "Result", ParamKind::Number))
            .color("#2196F3"),
        NodeDefinition::new("math_abs", "Absolute", "Math")
            .describe("The absolute value of a number")
            .input(data_default("value", "Value", ParamKind::Number, json!(0)))
            .output(data("result", "Result", ParamKind::Number))
            .color("#2196F3"),
        // Strings
        NodeDefinition::new("string_concat", "Concatenate", "String")
            .describe("Joins two strings")
            .input(data_default("a", "A", ParamKind::String, json!("")))
            .input(data_default("b", "B", ParamKind::String, json!("")))
            .output(data("result", "Result", ParamKind::String))
            .color("#8BC34A"),
        NodeDefinition::new("string_length", "String Length", "String")
            .describe("Number of characters in a string")
            .input(data_default("text", "Text", ParamKind::String, json!("")))
            .output(data("length", "Length", ParamKind::Number))
            .color("#8BC34A"),
        NodeDefinition::new("string_contains", "Contains", "String")
            .describe("Whether the text contains the search string")
            .input(data_default("text", "Text", ParamKind::String, json!("")))
            .input(data_default("search", "Search", ParamKind::String, json!("")))
            .output(data("result", "Result", ParamKind::Boolean))
            .color("#8BC34A"),
        NodeDefinition::new("string_replace", "Replace", "String")
            .describe("Replaces every occurrence of the search string")
            .input(data_default("text", "Text", ParamKind::String, json!("")))
            .input(data_default("search", "Search", ParamKind::String, json!("")))
            .input(data_default("replace", "Replace", ParamKind::String, json!("")))
            .output(data("result", "Result", ParamKind::String))
            .color("#8BC34A"),
        // Logic
        NodeDefinition::new("logic_and", "And", "Logic")
            .input(data_default("a", "A", ParamKind::Boolean, json!(true)))
            .input(data_default("b", "B", ParamKind::Boolean, json!(true)))
            .output(data("result", "Result", ParamKind::Boolean))
            .color("#E91E63"),
        NodeDefinition::new("logic_or", "Or", "Logic")
            .input(data_default("a", "A", ParamKind::Boolean, json!(false)))
            .input(data_default("b", "B", ParamKind::Boolean, json!(false)))
            .output(data("result", "Result", ParamKind::Boolean))
            .color("#E91E63"),
        NodeDefinition::new("logic_not", "Not", "Logic")
            .input(data_default("value", "Value", ParamKind::Boolean, json!(true)))
            .output(data("result", "Result", ParamKind::Boolean))
            .color("#E91E63"),
        // Comparison
        compare("compare_equal", "Equal", "Whether A equals B"),
        compare("compare_greater", "Greater", "Whether A is greater than B"),
        compare("compare_less", "Less", "Whether A is less than B"),
        // Variables
        NodeDefinition::new("get_variable", "Get Variable", "Variables")
            .describe("Reads a blueprint variable")
            .input(data_default("name", "Name", ParamKind::String, json!("variable")))
            .output(data("value", "Value", ParamKind::Object))
            .color("#673AB7"),
        NodeDefinition::new("set_variable", "Set Variable", "Variables")
            .describe("Writes a blueprint variable")
            .input(exec_in())
            .input(data_default("name", "Name", ParamKind::String, json!("variable")))
            .input(data("value", "Value", ParamKind::Object))
            .output(exec_out())
            .color("#673AB7"),
        // Conversion
        NodeDefinition::new("to_string", "To String", "Conversion")
            .input(data("value", "Value", ParamKind::Object))
            .output(data("result", "Result", ParamKind::String))
            .color("#00BCD4"),
        NodeDefinition::new("to_number", "To Number", "Conversion")
            .input(data_default("value", "Value", ParamKind::String, json!("0")))
            .output(data("result", "Result", ParamKind::Number))
            .color("#00BCD4"),
        NodeDefinition::new("to_boolean", "To Boolean", "Conversion")
            .input(data("value", "Value", ParamKind::Object))
            .output(data("result", "Result", ParamKind::Boolean))
            .color("#00BCD4"),
        // Debugging
        NodeDefinition::new("debug_log", "Debug Log", "Debug")
            .describe("Logs a debug message")
            .input(exec_in())
            .input(data_default("message", "Message", ParamKind::String, json!("Hello World")))
            .output(exec_out())
            .color("#FF9800"),
        NodeDefinition::new("debug_break", "Breakpoint", "Debug")
            .describe("Pauses in an attached debugger")
            .input(exec_in())
            .output(exec_out())
            .color("#F44336"),
        NodeDefinition::new("debug_watch", "Watch", "Debug")
            .describe("Logs a labelled value")
            .input(exec_in())
            .input(data("value", "Value", ParamKind::Object))
            .input(data_default("label", "Label", ParamKind::String, json!("Watch")))
            .output(exec_out())
            .color("#FF9800"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::NodeKind;

    #[test]
    fn test_builtin_kinds_all_registered() {
        let catalog = NodeCatalog::builtin();
        for definition in catalog.iter() {
            assert!(
                NodeKind::from_definition_id(&definition.id).is_some(),
                "no kind for {}",
                definition.id
            );
            assert!(definition.duplicate_param_ids().is_empty(), "{}", definition.id);
        }
    }

    #[test]
    fn test_pure_kinds_have_no_exec_input() {
        let catalog = NodeCatalog::builtin();
        for definition in catalog.iter() {
            if let Some(kind) = NodeKind::from_definition_id(&definition.id) {
                if kind.is_pure() || kind.is_entry() {
                    assert!(!definition.has_exec_input(), "{}", definition.id);
                }
            }
        }
    }

    #[test]
    fn test_insert_replaces_by_id() {
        let mut catalog = NodeCatalog::new();
        catalog.insert(NodeDefinition::new("a", "First", "Test"));
        catalog.insert(NodeDefinition::new("b", "B", "Test"));
        catalog.insert(NodeDefinition::new("a", "Second", "Test"));

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find("a").unwrap().name, "Second");
        assert_eq!(catalog.definitions()[0].id, "a");
    }

    #[test]
    fn test_merge_keeps_existing() {
        let mut catalog = NodeCatalog::builtin();
        let before = catalog.len();
        let added = catalog.merge(vec![
            NodeDefinition::new("print", "Overridden", "Events"),
            NodeDefinition::new("teleport", "Teleport", "Custom"),
        ]);

        assert_eq!(added, 1);
        assert_eq!(catalog.len(), before + 1);
        assert_eq!(catalog.find("print").unwrap().name, "Print");
        assert!(catalog.contains("teleport"));
    }

    #[test]
    fn test_remove_and_update_keep_index_consistent() {
        let mut catalog = NodeCatalog::builtin();
        assert!(catalog.remove("print").is_some());
        assert!(catalog.find("print").is_none());
        assert_eq!(catalog.find("delay").unwrap().id, "delay");

        catalog.update("delay", |d| d.name = "Wait".to_string()).unwrap();
        assert_eq!(catalog.find("delay").unwrap().name, "Wait");
        assert!(catalog.update("print", |_| {}).is_err());
    }

    #[test]
    fn test_by_category_preserves_order() {
        let catalog = NodeCatalog::builtin();
        let groups = catalog.by_category();
        assert_eq!(groups[0].0, "Function");
        let lifecycle = groups.iter().find(|(c, _)| *c == "Lifecycle").unwrap();
        assert_eq!(lifecycle.1.len(), 7);
    }
}
