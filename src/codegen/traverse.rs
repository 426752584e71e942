//! # Control-Flow Traversal
//!
//! Walks execution edges from the entry nodes of one routine with an explicit
//! work stack. Each task carries the node to visit, the visited path it was
//! reached on, and the block its statements go into.
//!
//! A node with a single successor keeps writing into its own block. Several
//! successors each get a fresh inline block reserved in order, so output
//! order follows fan-out order no matter when the stack reaches each task.

use super::block::{BlockArena, BlockId};
use super::ts_codegen::BlueprintCodeGenerator;
use crate::analysis::VisitedPath;
use crate::graph::NodeConnection;
use std::collections::HashSet;

pub(crate) struct Task<'a> {
    pub node_id: &'a str,
    pub path: VisitedPath,
    pub block: BlockId,
}

/// Statements and bookkeeping for one generated function or method.
pub(crate) struct Routine {
    pub arena: BlockArena,
    pub root: BlockId,
    temporaries: Vec<(String, String)>,
    declared: HashSet<String>,
    locals: HashSet<String>,
    pub is_async: bool,
    /// First return node the walk reached.
    pub return_node: Option<String>,
}

impl Routine {
    pub fn new() -> Self {
        let mut arena = BlockArena::new();
        let root = arena.alloc();
        Self {
            arena,
            root,
            temporaries: Vec::new(),
            declared: HashSet::new(),
            locals: HashSet::new(),
            is_async: false,
            return_node: None,
        }
    }

    /// Declare a temporary at the top of the routine, once.
    pub fn declare(&mut self, name: &str, ty: &str) {
        if self.declared.insert(name.to_string()) {
            self.temporaries.push((name.to_string(), ty.to_string()));
        }
    }

    pub fn temporaries(&self) -> &[(String, String)] {
        &self.temporaries
    }

    /// A routine-unique local name derived from `base`.
    pub fn unique_local(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut n = 2;
        while self.locals.contains(&name) || self.declared.contains(&name) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        self.locals.insert(name.clone());
        name
    }
}

impl<'a> BlueprintCodeGenerator<'a> {
    /// Run the work stack until every reachable task has been visited.
    pub(crate) fn walk(&mut self, routine: &mut Routine, seeds: Vec<Task<'a>>) {
        let mut stack: Vec<Task<'a>> = seeds.into_iter().rev().collect();

        while let Some(task) = stack.pop() {
            if task.path.contains(task.node_id) {
                tracing::trace!("[BGC] Cycle guard: {} already on this path", task.node_id);
                continue;
            }
            let Some(node) = self.index.node(task.node_id) else {
                continue;
            };
            let path = task.path.with(task.node_id);
            let next = self.visit(routine, node, path, task.block);
            stack.extend(next.into_iter().rev());
        }
    }

    /// Tasks for the targets of `edges`, reserving one inline block per target
    /// when there is more than one.
    pub(crate) fn branch_into(
        &self,
        routine: &mut Routine,
        edges: &[&'a NodeConnection],
        path: &VisitedPath,
        block: BlockId,
    ) -> Vec<Task<'a>> {
        match edges {
            [] => Vec::new(),
            [edge] => vec![Task {
                node_id: edge.to_node_id.as_str(),
                path: path.clone(),
                block,
            }],
            many => {
                tracing::debug!("[BGC] Fan-out to {} targets", many.len());
                many.iter()
                    .map(|edge| Task {
                        node_id: edge.to_node_id.as_str(),
                        path: path.clone(),
                        block: routine.arena.inline(block),
                    })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_once_in_first_use_order() {
        let mut routine = Routine::new();
        routine.declare("b_1_result", "number");
        routine.declare("a_2_value", "string");
        routine.declare("b_1_result", "number");
        let names: Vec<_> = routine.temporaries().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["b_1_result", "a_2_value"]);
    }

    #[test]
    fn test_unique_locals() {
        let mut routine = Routine::new();
        assert_eq!(routine.unique_local("task_5_1"), "task_5_1");
        assert_eq!(routine.unique_local("task_5_1"), "task_5_1_2");
        routine.declare("x", "any");
        assert_eq!(routine.unique_local("x"), "x_2");
    }
}
