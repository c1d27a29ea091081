//! Locating sub-canvases by identifier path and enumerating canvas trees.

use std::collections::HashSet;

use crate::canvas::{Canvas as _, CanvasHandle, handle_key};
use crate::error::{VectraError, VectraResult};

/// Locate a canvas by colon-delimited identifier path, e.g. `"A:B"` for the
/// grandchild `B` of root child `A`. An absent or empty id returns the root.
pub fn resolve_canvas(root: &CanvasHandle, canvas_id: Option<&str>) -> VectraResult<CanvasHandle> {
    let Some(id) = canvas_id else {
        return Ok(root.clone());
    };

    let mut current = root.clone();
    for segment in id.split(':').filter(|s| !s.is_empty()) {
        let child = current
            .children()
            .into_iter()
            .find(|c| c.id() == segment)
            .ok_or_else(|| VectraError::CanvasNotFound(id.to_string()))?;
        current = child;
    }
    Ok(current)
}

/// One line of a cascade listing: the full colon-joined path of a node.
pub type CascadePath = String;

/// Lazy depth-first pre-order enumeration of every descendant of `root`.
///
/// Paths are built as `<parent path>:<child id>`, starting from `prefix`.
/// The traversal keeps an identity-based visited set; a node reached twice
/// means the tree has a cycle and the iterator yields `CanvasCycle` once and
/// then stops. Construct a fresh iterator to restart.
pub fn cascade(root: &CanvasHandle, prefix: &str) -> Cascade {
    let mut visited = HashSet::new();
    visited.insert(handle_key(root));

    let mut stack = Vec::new();
    push_children(&mut stack, prefix, root);

    Cascade {
        stack,
        visited,
        poisoned: false,
    }
}

pub struct Cascade {
    stack: Vec<(CascadePath, CanvasHandle)>,
    visited: HashSet<usize>,
    poisoned: bool,
}

impl Iterator for Cascade {
    type Item = VectraResult<CascadePath>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.poisoned {
            return None;
        }
        let (path, node) = self.stack.pop()?;
        if !self.visited.insert(handle_key(&node)) {
            self.poisoned = true;
            return Some(Err(VectraError::CanvasCycle(path)));
        }
        push_children(&mut self.stack, &path, &node);
        Some(Ok(path))
    }
}

fn push_children(stack: &mut Vec<(CascadePath, CanvasHandle)>, path: &str, node: &CanvasHandle) {
    // Reversed so the pre-order pop matches document order.
    for child in node.children().into_iter().rev() {
        stack.push((format!("{path}:{}", child.id()), child));
    }
}
