//! # Statement Blocks
//!
//! Generated statements are collected into an arena of blocks instead of
//! strings, because the traversal fills blocks out of order: a branch's block
//! is reserved when the branching node is emitted and populated later, when
//! the work stack reaches it.

pub type BlockId = usize;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Line(String),
    /// A child block one indentation level deeper.
    Nested(BlockId),
    /// A child block at the current indentation level.
    Inline(BlockId),
    /// `} else {` and the child block, skipped when the child stays empty.
    Else(BlockId),
}

#[derive(Debug, Default)]
pub struct BlockArena {
    blocks: Vec<Vec<Stmt>>,
}

impl BlockArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self) -> BlockId {
        self.blocks.push(Vec::new());
        self.blocks.len() - 1
    }

    pub fn push(&mut self, block: BlockId, stmt: Stmt) {
        if let Some(stmts) = self.blocks.get_mut(block) {
            stmts.push(stmt);
        }
    }

    pub fn line(&mut self, block: BlockId, line: impl Into<String>) {
        self.push(block, Stmt::Line(line.into()));
    }

    /// Reserve a child block rendered at the current indentation.
    pub fn inline(&mut self, parent: BlockId) -> BlockId {
        let child = self.alloc();
        self.push(parent, Stmt::Inline(child));
        child
    }

    /// Reserve a child block rendered one level deeper.
    pub fn nested(&mut self, parent: BlockId) -> BlockId {
        let child = self.alloc();
        self.push(parent, Stmt::Nested(child));
        child
    }

    /// True when rendering `block` would produce no lines.
    pub fn is_empty(&self, block: BlockId) -> bool {
        let mut pending = vec![block];
        while let Some(id) = pending.pop() {
            for stmt in self.blocks.get(id).map(Vec::as_slice).unwrap_or(&[]) {
                match stmt {
                    Stmt::Line(_) => return false,
                    Stmt::Nested(child) | Stmt::Inline(child) | Stmt::Else(child) => pending.push(*child),
                }
            }
        }
        true
    }

    /// Flatten `root` into indented lines. Iterative; nesting depth is unbounded.
    pub fn render(&self, root: BlockId, depth: usize, unit: &str) -> Vec<String> {
        let mut lines = Vec::new();
        let mut stack: Vec<(BlockId, usize, usize)> = vec![(root, 0, depth)];

        while let Some((block, position, depth)) = stack.pop() {
            let Some(stmt) = self.blocks.get(block).and_then(|b| b.get(position)) else {
                continue;
            };
            stack.push((block, position + 1, depth));

            match stmt {
                Stmt::Line(line) if line.is_empty() => lines.push(String::new()),
                Stmt::Line(line) => lines.push(format!("{}{}", unit.repeat(depth), line)),
                Stmt::Nested(child) => stack.push((*child, 0, depth + 1)),
                Stmt::Inline(child) => stack.push((*child, 0, depth)),
                Stmt::Else(child) => {
                    if !self.is_empty(*child) {
                        lines.push(format!("{}}} else {{", unit.repeat(depth)));
                        stack.push((*child, 0, depth + 1));
                    }
                }
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_filled_out_of_order() {
        let mut arena = BlockArena::new();
        let root = arena.alloc();
        arena.line(root, "if (c) {");
        let then = arena.nested(root);
        let otherwise = arena.alloc();
        arena.push(root, Stmt::Else(otherwise));
        arena.line(root, "}");
        arena.line(root, "done();");

        // Filled after the parent has moved on.
        arena.line(then, "a();");

        assert_eq!(arena.render(root, 0, "  "), vec!["if (c) {", "  a();", "}", "done();"]);

        arena.line(otherwise, "b();");
        assert_eq!(
            arena.render(root, 1, "  "),
            vec!["  if (c) {", "    a();", "  } else {", "    b();", "  }", "  done();"]
        );
    }

    #[test]
    fn test_emptiness_sees_through_inline_blocks() {
        let mut arena = BlockArena::new();
        let root = arena.alloc();
        let child = arena.inline(root);
        let grandchild = arena.inline(child);
        assert!(arena.is_empty(root));
        arena.line(grandchild, "x();");
        assert!(!arena.is_empty(root));
    }

    #[test]
    fn test_deep_nesting_renders() {
        let mut arena = BlockArena::new();
        let root = arena.alloc();
        let mut block = root;
        for _ in 0..10_000 {
            block = arena.nested(block);
        }
        arena.line(block, "x");
        let lines = arena.render(root, 0, "");
        assert_eq!(lines, vec!["x"]);
    }
}
