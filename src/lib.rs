//! # Blueprint Graph Compiler (BGC)
//!
//! Compiler for turning visual Blueprint node graphs into TypeScript source.
//!
//! A blueprint is either a **function** (compiled to one exported function)
//! or a **component** (compiled to a Cocos Creator component class with one
//! method per lifecycle hook). Compilation never fails: unknown nodes,
//! dangling connections and unsupported node kinds degrade to comments in the
//! output and are reported as [`Diagnostic`]s.
//!
//! ## Quick Start
//!
//! ```rust
//! use bgc::{compile, Blueprint, BlueprintType, NodeCatalog, Position};
//! use serde_json::json;
//!
//! let catalog = NodeCatalog::builtin();
//! let mut blueprint = Blueprint::scaffold("Hello", BlueprintType::Function, &catalog);
//! let start = blueprint.nodes[0].id.clone();
//! let print = blueprint.add_node(&catalog, "print", Position::default())?.id.clone();
//! blueprint.set_input(&print, "value", json!("hi"))?;
//! blueprint.connect(&catalog, &start, "exec", &print, "exec")?;
//!
//! let source = compile(&blueprint, &catalog);
//! assert!(source.contains("log(\"hi\");"));
//! # Ok::<(), bgc::BlueprintError>(())
//! ```
//!
//! ## Architecture
//!
//! BGC follows a multi-phase compilation pipeline:
//!
//! 1. **Indexing** - Connection lookups and exec/data classification
//! 2. **Naming** - One temporary per connected data output
//! 3. **Execution Flow Walk** - Exec edges from each entry, with cycle guards
//! 4. **Data Resolution** - Pure nodes materialized on demand
//! 5. **Assembly** - Signature, declarations, helpers and body

pub mod analysis;
pub mod codegen;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod graph;
pub mod metadata;
pub mod storage;

// Re-export the main compilation API
pub use compiler::{
    compile, compile_document, compile_project, compile_with_options, generate_helper_library,
    CompileOutput, CompileReport, CompiledUnit, ProjectOutput,
};

// Re-export the graph model
pub use graph::{
    Blueprint, BlueprintType, NodeConnection, NodeDefinition, NodeInstance, NodeParam, ParamKind,
    Position,
};

// Re-export metadata types
pub use metadata::{LifecycleHook, NodeCatalog, NodeKind};

pub use codegen::{Analysis, Helper, Parameter};
pub use config::{CompilerOptions, HelperMode};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use document::BlueprintDocument;
pub use error::{BlueprintError, Result};
pub use storage::{DirectoryPersistence, Persistence};
