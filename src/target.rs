//! Output backend capability and the registry that constructs backends.
//!
//! Backends register themselves by name (and optionally by the output file
//! extensions they serve) at process start; the pipeline looks them up
//! through this one typed interface instead of any ambient global table.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::canvas::CanvasHandle;
use crate::error::{VectraError, VectraResult};
use crate::progress::ProgressObserver;
use crate::rend_desc::RendDesc;

/// An output backend bound to one render. Exactly one operation: drive the
/// render to completion (or cancellation) while reporting progress.
pub trait Target: Send + std::fmt::Debug {
    fn render(&mut self, progress: &dyn ProgressObserver) -> VectraResult<()>;
}

/// Non-geometry settings a backend may consult.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetParams {
    /// Renderer quality, 0..=10.
    pub quality: u32,
    pub gamma: f64,
    /// Worker threads the backend may use internally. Internal parallelism
    /// must not change pixel output.
    pub threads: Option<usize>,
}

/// Everything a backend needs to bind itself to a render.
pub struct TargetSpec {
    pub out_path: PathBuf,
    pub desc: RendDesc,
    pub params: TargetParams,
    /// The resolved canvas, shared read-only for the render's duration.
    pub canvas: CanvasHandle,
}

/// Backend constructor. Binding failures are reported as `TargetInit`.
pub type TargetFactory = Arc<dyn Fn(&TargetSpec) -> VectraResult<Box<dyn Target>> + Send + Sync>;

/// Name-to-constructor registry with extension-based inference.
///
/// Lookup contract: an explicit backend name always wins; extension
/// inference only applies when no name was requested.
#[derive(Default, Clone)]
pub struct TargetRegistry {
    by_name: BTreeMap<String, TargetFactory>,
    ext_to_name: BTreeMap<String, String>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under `name`, serving the given output extensions
    /// (lowercase, without the leading dot).
    pub fn register(
        &mut self,
        name: impl Into<String>,
        extensions: &[&str],
        factory: TargetFactory,
    ) {
        let name = name.into();
        for ext in extensions {
            self.ext_to_name
                .insert(ext.to_ascii_lowercase(), name.clone());
        }
        self.by_name.insert(name, factory);
    }

    /// Registered backend names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.by_name.keys().cloned().collect()
    }

    /// Construct a target for `spec`, choosing the backend by explicit name
    /// or, failing that, by the output path's extension.
    pub fn create(
        &self,
        explicit_name: Option<&str>,
        spec: TargetSpec,
    ) -> VectraResult<Box<dyn Target>> {
        let factory = match explicit_name {
            Some(name) => self
                .by_name
                .get(name)
                .ok_or_else(|| VectraError::unknown_target(name.to_string()))?,
            None => {
                let ext = spec
                    .out_path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_ascii_lowercase)
                    .ok_or_else(|| {
                        VectraError::unknown_target(format!(
                            "no target name given and '{}' has no extension",
                            spec.out_path.display()
                        ))
                    })?;
                let name = self.ext_to_name.get(&ext).ok_or_else(|| {
                    VectraError::unknown_target(format!("no target registered for '.{ext}'"))
                })?;
                &self.by_name[name]
            }
        };
        factory(&spec)
    }
}

/// Backend that walks the full render loop without producing output.
///
/// Useful for benchmarking and for exercising the render protocol: it checks
/// cancellation once per scan-line and reports progress once per line.
#[derive(Debug)]
pub struct NullTarget {
    desc: RendDesc,
}

impl NullTarget {
    pub const NAME: &'static str = "null";

    pub fn new(spec: &TargetSpec) -> VectraResult<Self> {
        spec.desc.validate_finalized().map_err(|e| {
            VectraError::target_init(format!("null target rejected description: {e}"))
        })?;
        Ok(Self {
            desc: spec.desc.clone(),
        })
    }

    /// Register the null backend. It serves no extensions; it must be
    /// requested by name.
    pub fn register(registry: &mut TargetRegistry) {
        registry.register(
            Self::NAME,
            &[],
            Arc::new(|spec| Ok(Box::new(Self::new(spec)?) as Box<dyn Target>)),
        );
    }
}

impl Target for NullTarget {
    fn render(&mut self, progress: &dyn ProgressObserver) -> VectraResult<()> {
        let frames = self.desc.frame_count();
        let lines_total = frames * u64::from(self.desc.height);
        let mut done = 0u64;
        for _frame in 0..frames {
            for _line in 0..self.desc.height {
                if progress.cancelled() {
                    return Err(VectraError::Cancelled);
                }
                done += 1;
            }
            progress.report(done as f64 / lines_total as f64);
        }
        Ok(())
    }
}

/// Registry pre-populated with the built-in backends.
pub fn default_registry() -> TargetRegistry {
    let mut registry = TargetRegistry::new();
    NullTarget::register(&mut registry);
    registry
}
