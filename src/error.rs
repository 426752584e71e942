//! # Errors
//!
//! Hard failures only. Compilation itself never fails; problems found while
//! compiling a graph are reported as [`Diagnostic`](crate::diagnostics::Diagnostic)s.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the store, the document loader and the persistence layer.
#[derive(Error, Debug)]
pub enum BlueprintError {
    #[error("Failed to parse blueprint JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed blueprint document: {0}")]
    MalformedDocument(String),

    #[error("Node definition '{0}' not found in catalog")]
    DefinitionNotFound(String),

    #[error("Node '{0}' not found in blueprint")]
    NodeNotFound(String),

    #[error("Connection '{0}' not found in blueprint")]
    ConnectionNotFound(String),

    #[error("Node '{node_id}' has no {direction} param '{param_id}'")]
    ParamNotFound {
        node_id: String,
        param_id: String,
        direction: &'static str,
    },

    #[error("Cannot connect {from_node}.{from_param} to {to_node}.{to_param}: {reason}")]
    InvalidConnection {
        from_node: String,
        from_param: String,
        to_node: String,
        to_param: String,
        reason: String,
    },

    #[error("Invalid file name '{0}'")]
    InvalidFileName(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, BlueprintError>;
