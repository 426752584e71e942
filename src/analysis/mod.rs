//! # Graph Analysis
//!
//! Read-only views over a blueprint that the code generator consults while
//! walking it: connection lookups, data-flow resolution, temporary naming and
//! the per-path visited set.

pub mod data_flow;
pub mod index;
pub mod naming;
pub mod visited;

pub use data_flow::{DataResolver, SourceExpr};
pub use index::ConnectionIndex;
pub use naming::TemporaryNames;
pub use visited::VisitedPath;
