use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::VectraResult;
use crate::rend_desc::RendDesc;

/// Shared, read-only handle to a canvas node. Documents are never mutated
/// after load, so jobs built from the same load may hold the same handles
/// without any locking.
pub type CanvasHandle = Arc<dyn Canvas + Send + Sync>;

/// A document or sub-document: a tree of layers with an associated render
/// description. The layer graph itself is opaque to this crate; the pipeline
/// only needs identity, geometry defaults, children and metadata.
pub trait Canvas: std::fmt::Debug {
    /// Identifier of this node, unique among its siblings.
    fn id(&self) -> &str;

    /// The stored render defaults for this canvas.
    fn rend_desc(&self) -> &RendDesc;

    /// Nested/exported child canvases, in document order.
    fn children(&self) -> Vec<CanvasHandle>;

    /// Document metadata key/value pairs.
    fn meta_data(&self) -> BTreeMap<String, String>;
}

/// Pointer-identity key for a handle, used by tree walks to detect revisits.
pub(crate) fn handle_key(handle: &CanvasHandle) -> usize {
    Arc::as_ptr(handle) as *const () as usize
}

/// Load/save collaborator for a concrete document format.
pub trait DocumentIo {
    /// Load a document, surfacing file-not-found, parse and version-mismatch
    /// failures as distinct [`LoadError`](crate::LoadError) causes.
    fn load(&self, path: &Path) -> VectraResult<CanvasHandle>;

    /// Re-serialize a canvas tree to disk.
    fn save(&self, path: &Path, canvas: &CanvasHandle) -> VectraResult<()>;
}

/// Straightforward in-memory canvas node, used by the bundled JSON document
/// format and by tests.
#[derive(Debug)]
pub struct MemoryCanvas {
    id: String,
    desc: RendDesc,
    meta: BTreeMap<String, String>,
    children: Vec<CanvasHandle>,
}

impl MemoryCanvas {
    pub fn new(id: impl Into<String>, desc: RendDesc) -> Self {
        Self {
            id: id.into(),
            desc,
            meta: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: CanvasHandle) -> Self {
        self.children.push(child);
        self
    }

    pub fn into_handle(self) -> CanvasHandle {
        Arc::new(self)
    }
}

impl Canvas for MemoryCanvas {
    fn id(&self) -> &str {
        &self.id
    }

    fn rend_desc(&self) -> &RendDesc {
        &self.desc
    }

    fn children(&self) -> Vec<CanvasHandle> {
        self.children.clone()
    }

    fn meta_data(&self) -> BTreeMap<String, String> {
        self.meta.clone()
    }
}
