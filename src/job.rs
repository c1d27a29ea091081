//! Job construction: turning a loosely-specified request into a validated
//! unit of render work.
//!
//! Construction is staged (load, resolve, bind) and fails fast: every
//! resolution-stage error is detected before any rendering work begins.

use std::path::PathBuf;

use crate::canvas::{Canvas as _, CanvasHandle, DocumentIo};
use crate::document::DOCUMENT_EXTENSION;
use crate::error::{VectraError, VectraResult};
use crate::info::InfoSelection;
use crate::params::{RenderOverrides, ResolvedRender, resolve_params};
use crate::resolve::resolve_canvas;
use crate::target::{Target, TargetParams, TargetRegistry, TargetSpec};

/// What a job is asked to produce.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum JobMode {
    /// Render through an output target (or re-serialize when the output path
    /// is a document file and no explicit target was requested).
    #[default]
    Render,
    /// Emit a `key=value` report for the given comma-separated selectors.
    CanvasInfo { selectors: String },
    /// Emit the cascade listing of nested/exported canvases.
    ListCanvases,
}

/// Raw, loosely-specified request for one unit of work, as produced by the
/// shell.
#[derive(Clone, Debug, Default)]
pub struct JobSpec {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    /// Colon-delimited identifier path of the sub-canvas to operate on.
    pub canvas_id: Option<String>,
    /// Explicit backend name; wins over output-extension inference.
    pub target_name: Option<String>,
    pub overrides: RenderOverrides,
    pub mode: JobMode,
}

impl JobSpec {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }
}

/// The bound output side of a job. The enum makes "exactly one of bound
/// target / re-serialize" structurally true.
#[derive(Debug)]
pub enum JobOutput {
    Target {
        out_path: PathBuf,
        target: Box<dyn Target>,
    },
    Reserialize {
        out_path: PathBuf,
    },
    CanvasInfo {
        selection: InfoSelection,
    },
    ListCanvases,
}

impl JobOutput {
    pub fn describe(&self) -> String {
        match self {
            Self::Target { out_path, .. } | Self::Reserialize { out_path } => {
                out_path.display().to_string()
            }
            Self::CanvasInfo { .. } => "(canvas-info)".to_string(),
            Self::ListCanvases => "(list-canvases)".to_string(),
        }
    }
}

/// One fully-resolved unit of work. Owns its bound target exclusively; the
/// underlying document is shared read-only with any other job built from the
/// same load.
#[derive(Debug)]
pub struct Job {
    pub source: PathBuf,
    pub root: CanvasHandle,
    pub canvas: CanvasHandle,
    /// Finalized description and settings; frozen once the job exists.
    pub resolved: ResolvedRender,
    pub output: JobOutput,
}

impl Job {
    /// Run the load, resolve and bind stages for `spec`.
    ///
    /// Stage failures map onto the error taxonomy: `Load*` from the document
    /// collaborator, `CanvasNotFound`/`InvalidParameter` from resolution,
    /// `UnknownTarget`/`TargetInit` from binding. A failed job is discarded,
    /// never retried.
    pub fn build(
        spec: JobSpec,
        io: &dyn DocumentIo,
        registry: &TargetRegistry,
    ) -> VectraResult<Self> {
        let root = io.load(&spec.input)?;
        let canvas = resolve_canvas(&root, spec.canvas_id.as_deref())?;
        let resolved = resolve_params(canvas.rend_desc(), &spec.overrides)?;

        let output = match spec.mode {
            JobMode::CanvasInfo { ref selectors } => JobOutput::CanvasInfo {
                selection: InfoSelection::parse(selectors),
            },
            JobMode::ListCanvases => JobOutput::ListCanvases,
            JobMode::Render => {
                resolved.desc.validate_finalized()?;

                let out_path = spec.output.clone().ok_or_else(|| {
                    VectraError::invalid_parameter("render jobs require an output file")
                })?;

                let is_document_output = spec.target_name.is_none()
                    && out_path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case(DOCUMENT_EXTENSION));

                if is_document_output {
                    JobOutput::Reserialize { out_path }
                } else {
                    let target = registry.create(
                        spec.target_name.as_deref(),
                        TargetSpec {
                            out_path: out_path.clone(),
                            desc: resolved.desc.clone(),
                            params: TargetParams {
                                quality: resolved.quality,
                                gamma: resolved.gamma,
                                threads: resolved.threads,
                            },
                            canvas: canvas.clone(),
                        },
                    )?;
                    JobOutput::Target { out_path, target }
                }
            }
        };

        let job = Self {
            source: spec.input,
            root,
            canvas,
            resolved,
            output,
        };
        job.trace_geometry();
        Ok(job)
    }

    /// `input ==> output` description used for progress labels.
    pub fn label(&self) -> String {
        format!("{} ==> {}", self.source.display(), self.output.describe())
    }

    fn trace_geometry(&self) {
        let d = &self.resolved.desc;
        tracing::debug!(
            source = %self.source.display(),
            w = d.width,
            h = d.height,
            antialias = d.antialias,
            pixel_aspect = d.pixel_aspect(),
            image_aspect = d.image_aspect(),
            span = d.span(),
            "job geometry"
        );
        tracing::debug!(
            tl = ?(d.top_left.x, d.top_left.y),
            br = ?(d.bottom_right.x, d.bottom_right.y),
            focus = ?(d.focus().x, d.focus().y),
            "job window"
        );
    }
}
