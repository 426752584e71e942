//! # Visited Path
//!
//! The set of node ids already emitted on the current execution path.
//!
//! Branches fork the path: each branch extends the parent's path without the
//! siblings seeing each other's additions. The path is a persistent linked
//! list, so forking is a pointer copy and branches share the common prefix.
//!
//! Every link also carries a 256-bit filter of the ids behind it. A miss in
//! the filter answers `contains` in constant time; a hit walks the list, so
//! lookups on paths of a few hundred nodes or more approach O(depth).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

type Filter = [u64; 4];

struct Link {
    node_id: String,
    filter: Filter,
    next: Option<Rc<Link>>,
}

/// Filter word and bit for one id.
fn slot(node_id: &str) -> (usize, u64) {
    let mut hasher = DefaultHasher::new();
    node_id.hash(&mut hasher);
    let hash = hasher.finish();
    (((hash >> 6) & 3) as usize, 1 << (hash & 63))
}

#[derive(Clone, Default)]
pub struct VisitedPath {
    head: Option<Rc<Link>>,
    len: usize,
}

impl VisitedPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, node_id: &str) -> bool {
        let Some(head) = self.head.as_deref() else {
            return false;
        };
        let (word, bit) = slot(node_id);
        if head.filter[word] & bit == 0 {
            return false;
        }

        let mut cursor = Some(head);
        while let Some(link) = cursor {
            if link.node_id == node_id {
                return true;
            }
            cursor = link.next.as_deref();
        }
        false
    }

    /// A new path that also contains `node_id`. `self` is unchanged.
    pub fn with(&self, node_id: impl Into<String>) -> Self {
        let node_id = node_id.into();
        let mut filter = self.head.as_ref().map(|link| link.filter).unwrap_or_default();
        let (word, bit) = slot(&node_id);
        filter[word] |= bit;

        Self {
            head: Some(Rc::new(Link {
                node_id,
                filter,
                next: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    pub fn insert(&mut self, node_id: impl Into<String>) {
        *self = self.with(node_id);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::fmt::Debug for VisitedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids = Vec::with_capacity(self.len);
        let mut cursor = self.head.as_deref();
        while let Some(link) = cursor {
            ids.push(link.node_id.as_str());
            cursor = link.next.as_deref();
        }
        ids.reverse();
        f.debug_list().entries(ids).finish()
    }
}

impl Drop for VisitedPath {
    // Unlink iteratively; the default recursive drop overflows on long paths.
    fn drop(&mut self) {
        let mut head = self.head.take();
        while let Some(link) = head {
            match Rc::try_unwrap(link) {
                Ok(mut link) => head = link.next.take(),
                Err(_) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_siblings_share_prefix_only() {
        let root = VisitedPath::new().with("start").with("sequence");
        let left = root.with("a");
        let right = root.with("b");

        assert!(left.contains("sequence"));
        assert!(right.contains("start"));
        assert!(!left.contains("b"));
        assert!(!right.contains("a"));
        assert!(!root.contains("a"));
        assert_eq!(left.len(), 3);
    }

    #[test]
    fn test_insert_extends_in_place() {
        let mut path = VisitedPath::new();
        assert!(path.is_empty());
        path.insert("x");
        assert!(path.contains("x"));
        assert_eq!(format!("{:?}", path.with("y")), r#"["x", "y"]"#);
    }

    #[test]
    fn test_lookups_on_long_path() {
        let mut path = VisitedPath::new();
        for i in 0..5_000 {
            path.insert(format!("node_{}", i));
        }
        assert!(path.contains("node_0"));
        assert!(path.contains("node_4999"));
        assert!(!path.contains("node_5000"));
        assert!(!VisitedPath::new().contains("node_0"));

        let short = VisitedPath::new().with("node_1").with("node_2");
        for i in 3..100 {
            assert!(!short.contains(&format!("node_{}", i)));
        }
    }

    #[test]
    fn test_long_path_drops_without_overflow() {
        let mut path = VisitedPath::new();
        for i in 0..200_000 {
            path.insert(format!("node_{}", i));
        }
        assert_eq!(path.len(), 200_000);
        drop(path);
    }
}
