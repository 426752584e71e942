//! # Code Generation
//!
//! TypeScript emission for blueprint graphs.

mod assembler;
mod block;
pub mod helpers;
mod node_handlers;
mod traverse;
mod ts_codegen;
pub mod typescript;

pub use assembler::{unit_name, Analysis, GeneratedProgram, Parameter};
pub use helpers::{generate_helper_library, Helper};
pub use ts_codegen::BlueprintCodeGenerator;
