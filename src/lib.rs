//! Vectra renders declarative, time-based vector-canvas documents into pixel
//! output through pluggable target backends.
//!
//! The crate is built around the job pipeline:
//!
//! - Resolve loosely-specified render parameters over a document's stored
//!   defaults into a finalized [`RendDesc`]
//! - Locate the requested sub-canvas and bind an output [`Target`]
//! - Drive a queue of [`Job`]s through a cancellable, progress-reporting
//!   [`JobRunner`]
//!
//! Layer evaluation, compositing and concrete codecs live behind the
//! [`Canvas`] and [`Target`] seams and are not implemented here.
#![forbid(unsafe_code)]

pub mod canvas;
pub mod document;
pub mod error;
pub mod info;
pub mod job;
pub mod params;
pub mod progress;
pub mod rend_desc;
pub mod resolve;
pub mod runner;
pub mod target;

pub use canvas::{Canvas, CanvasHandle, DocumentIo, MemoryCanvas};
pub use document::{DOCUMENT_EXTENSION, FORMAT_VERSION, JsonDocumentIo};
pub use error::{LoadError, VectraError, VectraResult};
pub use info::{ALL_FIELDS, InfoField, InfoSelection, canvas_info_lines};
pub use job::{Job, JobMode, JobOutput, JobSpec};
pub use params::{DEFAULT_GAMMA, DEFAULT_QUALITY, RenderOverrides, ResolvedRender, resolve_params};
pub use progress::{ProgressObserver, RenderProgress};
pub use rend_desc::{Color, FrameRate, RendDesc, Time};
pub use resolve::{Cascade, cascade, resolve_canvas};
pub use runner::{BatchResult, JobReport, JobRunner, JobStatus, RunnerConfig};
pub use target::{
    NullTarget, Target, TargetFactory, TargetParams, TargetRegistry, TargetSpec, default_registry,
};
