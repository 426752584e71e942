//! Common test utilities for building blueprints and compiling them.
use bgc::*;
use serde_json::Value;

/// Builds a blueprint against the built-in catalog.
///
/// Scaffolded blueprints start with their entry nodes: `node_1` is the
/// `function_start` node of a function, and components get `node_1` through
/// `node_7`, one per lifecycle hook in runtime order.
#[allow(dead_code)]
pub struct GraphBuilder {
    pub blueprint: Blueprint,
    pub catalog: NodeCatalog,
}

#[allow(dead_code)]
impl GraphBuilder {
    pub fn function(name: &str) -> Self {
        let catalog = NodeCatalog::builtin();
        let blueprint = Blueprint::scaffold(name, BlueprintType::Function, &catalog);
        Self { blueprint, catalog }
    }

    pub fn component(name: &str) -> Self {
        let catalog = NodeCatalog::builtin();
        let blueprint = Blueprint::scaffold(name, BlueprintType::Component, &catalog);
        Self { blueprint, catalog }
    }

    /// A blueprint with no nodes at all.
    pub fn empty(name: &str, kind: BlueprintType) -> Self {
        Self {
            blueprint: Blueprint::new(name, kind),
            catalog: NodeCatalog::builtin(),
        }
    }

    /// Id of the first node whose definition is `definition_id`.
    pub fn entry(&self, definition_id: &str) -> String {
        self.blueprint
            .nodes
            .iter()
            .find(|n| n.definition_id == definition_id)
            .map(|n| n.id.clone())
            .expect("no such entry node")
    }

    pub fn node(&mut self, definition_id: &str) -> String {
        self.node_with(definition_id, &[])
    }

    pub fn node_with(&mut self, definition_id: &str, inputs: &[(&str, Value)]) -> String {
        let id = self
            .blueprint
            .add_node(&self.catalog, definition_id, Position::default())
            .expect("Failed to add node")
            .id
            .clone();
        for (param, value) in inputs {
            self.blueprint
                .set_input(&id, param, value.clone())
                .expect("Failed to set input");
        }
        id
    }

    /// A `print` node with a literal value.
    pub fn print(&mut self, value: Value) -> String {
        self.node_with("print", &[("value", value)])
    }

    /// Wire through the checked store operation.
    pub fn wire(&mut self, from: &str, from_param: &str, to: &str, to_param: &str) -> &mut Self {
        self.blueprint
            .connect(&self.catalog, from, from_param, to, to_param)
            .expect("Failed to connect");
        self
    }

    /// Append a connection without endpoint checks.
    pub fn raw_wire(&mut self, id: &str, from: &str, from_param: &str, to: &str, to_param: &str) -> &mut Self {
        self.blueprint
            .add_connection(NodeConnection::new(id, from, from_param, to, to_param));
        self
    }

    pub fn compile(&self) -> CompileOutput {
        self.compile_with(&CompilerOptions::default())
    }

    pub fn compile_with(&self, options: &CompilerOptions) -> CompileOutput {
        compile_with_options(&self.blueprint, &self.catalog, options)
    }
}

/// Route library logs to the test harness. Safe to call from every test.
#[allow(dead_code)]
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Asserts `first` occurs in `source`, and before `second`.
#[allow(dead_code)]
pub fn assert_before(source: &str, first: &str, second: &str) {
    let a = source
        .find(first)
        .unwrap_or_else(|| panic!("'{}' not found in:\n{}", first, source));
    let b = source
        .find(second)
        .unwrap_or_else(|| panic!("'{}' not found in:\n{}", second, source));
    assert!(a < b, "'{}' should come before '{}' in:\n{}", first, second, source);
}

#[allow(dead_code)]
pub fn has_diagnostic(output: &CompileOutput, kind: DiagnosticKind) -> bool {
    output.diagnostics.iter().any(|d| d.kind == kind)
}
