//! # Blueprint Documents
//!
//! The `.bp` file format: a blueprint plus the node definitions it was built
//! against and some bookkeeping metadata.
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "name": "Greeter",
//!   "blueprint": { "nodes": [], "connections": [], ... },
//!   "nodeDefinitions": [ ... ],
//!   "metadata": { "createdAt": "...", "lastModified": "...", "author": "..." }
//! }
//! ```
//!
//! Loading is all-or-nothing: a document that fails structural validation is
//! rejected as a whole.

use crate::error::{BlueprintError, Result};
use crate::graph::{Blueprint, NodeDefinition};
use crate::metadata::NodeCatalog;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use std::collections::HashSet;

pub const DOCUMENT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DocumentMetadata {
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            last_modified: now,
            author: None,
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintDocument {
    pub version: String,
    pub name: String,
    pub blueprint: Blueprint,
    pub node_definitions: Vec<NodeDefinition>,
    pub metadata: DocumentMetadata,
}

impl BlueprintDocument {
    pub fn new(blueprint: Blueprint, node_definitions: Vec<NodeDefinition>) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            name: blueprint.name.clone(),
            blueprint,
            node_definitions,
            metadata: DocumentMetadata::now(),
        }
    }

    /// Wrap a blueprint together with the whole catalog it was edited against.
    pub fn with_catalog(blueprint: Blueprint, catalog: &NodeCatalog) -> Self {
        Self::new(blueprint, catalog.definitions().to_vec())
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.metadata.author = Some(author.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = Some(description.into());
        self
    }

    /// Bump `lastModified` to now.
    pub fn touch(&mut self) {
        self.metadata.last_modified = Utc::now();
    }

    /// Pretty-printed JSON, two-space indented.
    pub fn serialize(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a document.
    ///
    /// Syntax errors surface as [`BlueprintError::Json`]; well-formed JSON of
    /// the wrong shape, or a document that fails [`validate`](Self::validate),
    /// as [`BlueprintError::MalformedDocument`].
    pub fn deserialize(text: &str) -> Result<Self> {
        let document: Self = serde_json::from_str(text).map_err(|e| match e.classify() {
            Category::Data => BlueprintError::MalformedDocument(e.to_string()),
            _ => BlueprintError::Json(e),
        })?;
        document.validate()?;
        tracing::debug!(
            "[BGC] Loaded document '{}' ({} nodes, {} definitions)",
            document.name,
            document.blueprint.nodes.len(),
            document.node_definitions.len()
        );
        Ok(document)
    }

    /// Structural checks serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let major = self.version.split('.').next().unwrap_or_default();
        if major != "1" {
            return Err(malformed(format!("unsupported document version '{}'", self.version)));
        }

        if let Some(id) = self.blueprint.duplicate_node_ids().first() {
            return Err(malformed(format!("duplicate node id '{}'", id)));
        }

        let mut connection_ids = HashSet::new();
        for connection in &self.blueprint.connections {
            if !connection_ids.insert(connection.id.as_str()) {
                return Err(malformed(format!("duplicate connection id '{}'", connection.id)));
            }
        }

        let mut definition_ids = HashSet::new();
        for definition in &self.node_definitions {
            if !definition_ids.insert(definition.id.as_str()) {
                return Err(malformed(format!("duplicate node definition '{}'", definition.id)));
            }
            if let Some(param) = definition.duplicate_param_ids().first() {
                return Err(malformed(format!(
                    "node definition '{}' declares param '{}' twice",
                    definition.id, param
                )));
            }
        }
        Ok(())
    }

    /// The document's own definitions as a catalog.
    pub fn catalog(&self) -> NodeCatalog {
        NodeCatalog::from_definitions(self.node_definitions.iter().cloned())
    }
}

fn malformed(message: String) -> BlueprintError {
    BlueprintError::MalformedDocument(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BlueprintType, NodeInstance};

    #[test]
    fn test_new_document_has_current_version() {
        let blueprint = Blueprint::new("Doc", BlueprintType::Function);
        let document = BlueprintDocument::new(blueprint, Vec::new()).author("ada");
        assert_eq!(document.version, DOCUMENT_VERSION);
        assert_eq!(document.name, "Doc");
        assert_eq!(document.metadata.author.as_deref(), Some("ada"));
        assert_eq!(document.metadata.created_at, document.metadata.last_modified);
    }

    #[test]
    fn test_wrong_major_version_rejected() {
        let mut document = BlueprintDocument::new(Blueprint::new("Doc", BlueprintType::Function), Vec::new());
        document.version = "2.0.0".to_string();
        assert!(matches!(document.validate(), Err(BlueprintError::MalformedDocument(_))));
    }

    #[test]
    fn test_duplicate_node_ids_rejected() {
        let mut blueprint = Blueprint::new("Doc", BlueprintType::Function);
        blueprint.nodes.push(NodeInstance::new("node_1", "print"));
        blueprint.nodes.push(NodeInstance::new("node_1", "delay"));
        let document = BlueprintDocument::new(blueprint, Vec::new());
        let err = document.validate().unwrap_err();
        assert!(err.to_string().contains("node_1"));
    }
}
