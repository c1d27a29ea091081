//! Bundled JSON document format.
//!
//! The render pipeline treats documents as opaque [`Canvas`] trees behind the
//! [`DocumentIo`] seam; this module provides the default implementation of
//! that seam so the CLI can work on real files without an external format
//! plugin.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::canvas::{Canvas, CanvasHandle, DocumentIo, MemoryCanvas};
use crate::error::{LoadError, VectraError, VectraResult};
use crate::rend_desc::RendDesc;

/// File extension of the bundled document format.
pub const DOCUMENT_EXTENSION: &str = "vcv";

/// Newest document format version this build understands.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
struct DocumentFile {
    version: u32,
    canvas: CanvasNode,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
struct CanvasNode {
    id: String,
    desc: RendDesc,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    meta: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<CanvasNode>,
}

impl CanvasNode {
    fn into_handle(self) -> CanvasHandle {
        let mut canvas = MemoryCanvas::new(self.id, self.desc);
        for (k, v) in self.meta {
            canvas = canvas.with_meta(k, v);
        }
        for child in self.children {
            canvas = canvas.with_child(child.into_handle());
        }
        canvas.into_handle()
    }

    fn snapshot(canvas: &CanvasHandle, visited: &mut HashSet<usize>) -> VectraResult<Self> {
        let key = crate::canvas::handle_key(canvas);
        if !visited.insert(key) {
            return Err(VectraError::CanvasCycle(canvas.id().to_string()));
        }
        let mut children = Vec::new();
        for child in canvas.children() {
            children.push(Self::snapshot(&child, visited)?);
        }
        visited.remove(&key);
        Ok(Self {
            id: canvas.id().to_string(),
            desc: canvas.rend_desc().clone(),
            meta: canvas.meta_data(),
            children,
        })
    }
}

/// JSON-backed [`DocumentIo`] implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDocumentIo;

impl DocumentIo for JsonDocumentIo {
    fn load(&self, path: &Path) -> VectraResult<CanvasHandle> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => LoadError::Parse {
                path: path.to_path_buf(),
                detail: e.to_string(),
            },
        })?;

        let file: DocumentFile =
            serde_json::from_slice(&bytes).map_err(|e| LoadError::Parse {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;

        if file.version > FORMAT_VERSION {
            return Err(LoadError::VersionMismatch {
                path: path.to_path_buf(),
                found: file.version,
                supported: FORMAT_VERSION,
            }
            .into());
        }

        tracing::debug!(path = %path.display(), version = file.version, "loaded document");
        Ok(file.canvas.into_handle())
    }

    fn save(&self, path: &Path, canvas: &CanvasHandle) -> VectraResult<()> {
        let mut visited = HashSet::new();
        let file = DocumentFile {
            version: FORMAT_VERSION,
            canvas: CanvasNode::snapshot(canvas, &mut visited)?,
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| VectraError::render(format!("serialize document: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| VectraError::render(format!("write '{}': {e}", path.display())))?;
        Ok(())
    }
}
