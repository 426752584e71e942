//! # Compile Diagnostics
//!
//! Compilation never fails. Anything the generator had to paper over (a
//! dangling reference, a node kind without an emitter, an ambiguous graph
//! shape) is recorded here and logged, and the output carries a comment or a
//! first-found choice instead.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A connection or node refers to a node, definition or param that does not exist.
    Reference,
    /// The definition exists but the generator has no emission rule for it.
    UnsupportedKind,
    /// The graph admits more than one reading; the first-found one was used.
    ShapeAmbiguity,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Reference => write!(f, "reference"),
            DiagnosticKind::UnsupportedKind => write!(f, "unsupported kind"),
            DiagnosticKind::ShapeAmbiguity => write!(f, "shape ambiguity"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, node_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            kind,
            node_id: node_id.map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node_id {
            Some(id) => write!(f, "{} [{}]: {}", self.kind, id, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// Ordered, de-duplicated diagnostic sink.
///
/// Branches that re-emit the same node report the same problem again; only the
/// first report is kept.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, kind: DiagnosticKind, node_id: Option<&str>, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(kind, node_id, message);
        if self.entries.contains(&diagnostic) {
            return;
        }
        tracing::warn!("[BGC] {}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_are_dropped() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(DiagnosticKind::Reference, Some("node_1"), "missing definition");
        diagnostics.report(DiagnosticKind::Reference, Some("node_1"), "missing definition");
        diagnostics.report(DiagnosticKind::Reference, Some("node_2"), "missing definition");
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::new(DiagnosticKind::ShapeAmbiguity, Some("node_4"), "two returns");
        assert_eq!(d.to_string(), "shape ambiguity [node_4]: two returns");
        let d = Diagnostic::new(DiagnosticKind::UnsupportedKind, None, "x");
        assert_eq!(d.to_string(), "unsupported kind: x");
    }
}
