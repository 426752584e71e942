//! # Compiler Options
//!
//! Knobs for the shape of generated TypeScript. Every field has a default, so
//! a partial JSON file (or none at all) is a valid configuration.

use crate::error::{BlueprintError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How helper routines reach the generated unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HelperMode {
    /// `import { … } from '<helper_module>'`; the library is emitted separately.
    #[default]
    Import,
    /// Paste the bodies of the used helpers into the unit itself.
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    pub helper_mode: HelperMode,
    pub helper_module: String,
    /// Spaces per nesting level.
    pub indent: usize,
    /// Prepended to the function or class name.
    pub function_prefix: String,
    /// Emit `// {definition name} ({node id})` ahead of each executed node.
    pub emit_node_comments: bool,
    /// Record generation time in the header. Off keeps output reproducible.
    pub header_timestamp: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            helper_mode: HelperMode::Import,
            helper_module: "./blueprint-helpers".to_string(),
            indent: 4,
            function_prefix: "BP_".to_string(),
            emit_node_comments: true,
            header_timestamp: false,
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| BlueprintError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn with_helper_mode(mut self, mode: HelperMode) -> Self {
        self.helper_mode = mode;
        self
    }

    pub fn with_helper_module(mut self, module: impl Into<String>) -> Self {
        self.helper_module = module.into();
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_function_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.function_prefix = prefix.into();
        self
    }

    pub fn with_node_comments(mut self, enabled: bool) -> Self {
        self.emit_node_comments = enabled;
        self
    }

    pub fn with_header_timestamp(mut self, enabled: bool) -> Self {
        self.header_timestamp = enabled;
        self
    }

    pub(crate) fn indent_unit(&self) -> String {
        " ".repeat(self.indent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = CompilerOptions::from_json(r#"{ "helper_mode": "inline", "indent": 2 }"#).unwrap();
        assert_eq!(options.helper_mode, HelperMode::Inline);
        assert_eq!(options.indent, 2);
        assert_eq!(options.helper_module, "./blueprint-helpers");
        assert_eq!(options.function_prefix, "BP_");
        assert!(options.emit_node_comments);
        assert!(!options.header_timestamp);
    }

    #[test]
    fn test_builder() {
        let options = CompilerOptions::new()
            .with_function_prefix("Gen_")
            .with_node_comments(false)
            .with_indent(2);
        assert_eq!(options.function_prefix, "Gen_");
        assert!(!options.emit_node_comments);
        assert_eq!(options.indent_unit(), "  ");
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(CompilerOptions::from_json(r#"{ "helper_mode": "bundle" }"#).is_err());
    }
}
