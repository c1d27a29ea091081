//! Sequential batch execution of resolved jobs.
//!
//! Jobs run strictly in queue order in the calling thread. The first
//! unrecoverable failure stops the batch: later jobs are reported as skipped
//! and outputs already produced are left untouched. Renders are assumed
//! deterministic and expensive, so nothing is retried automatically.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::canvas::DocumentIo;
use crate::error::{VectraError, VectraResult};
use crate::info::canvas_info_lines;
use crate::job::{Job, JobOutput};
use crate::progress::RenderProgress;
use crate::resolve::cascade;

/// Explicit runner behavior, threaded in instead of living in process-wide
/// globals.
#[derive(Clone, Debug, Default)]
pub struct RunnerConfig {
    /// Suppress progress display.
    pub quiet: bool,
    /// Record and report per-job wall-clock duration.
    pub benchmarks: bool,
}

/// Terminal state of one queued job.
#[derive(Debug)]
pub enum JobStatus {
    Ok {
        /// Wall-clock duration, recorded when benchmarking is enabled.
        elapsed: Option<Duration>,
    },
    Failed {
        reason: String,
    },
    /// Not attempted because an earlier job failed.
    Skipped,
}

/// Per-job entry of the batch report surface.
#[derive(Debug)]
pub struct JobReport {
    pub source: std::path::PathBuf,
    pub label: String,
    pub status: JobStatus,
    /// Report lines produced by info/listing jobs, in output order.
    pub lines: Vec<String>,
}

/// Outcome of a whole batch, in queue order.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub reports: Vec<JobReport>,
}

impl BatchResult {
    pub fn all_ok(&self) -> bool {
        self.reports
            .iter()
            .all(|r| matches!(r.status, JobStatus::Ok { .. }))
    }

    pub fn first_failure(&self) -> Option<&JobReport> {
        self.reports
            .iter()
            .find(|r| matches!(r.status, JobStatus::Failed { .. }))
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

/// What one successful job produced.
#[derive(Debug)]
pub struct JobOutcome {
    pub elapsed: Option<Duration>,
    pub lines: Vec<String>,
}

/// Drains job queues sequentially.
pub struct JobRunner<'a> {
    config: RunnerConfig,
    io: &'a dyn DocumentIo,
}

impl<'a> JobRunner<'a> {
    pub fn new(config: RunnerConfig, io: &'a dyn DocumentIo) -> Self {
        Self { config, io }
    }

    /// Execute the queue in order, stopping at the first failure. Jobs after
    /// a failure are reported as skipped; outputs of jobs that already
    /// succeeded are kept as-is.
    pub fn run(&self, queue: Vec<Job>) -> BatchResult {
        let mut result = BatchResult::default();
        let mut jobs = queue.into_iter();

        for mut job in jobs.by_ref() {
            let source = job.source.clone();
            let label = job.label();
            let progress = Arc::new(RenderProgress::new(label.clone()));

            match self.run_job(&mut job, &progress) {
                Ok(outcome) => {
                    if let Some(elapsed) = outcome.elapsed {
                        tracing::info!(source = %source.display(), ?elapsed, "job finished");
                    }
                    result.reports.push(JobReport {
                        source,
                        label,
                        status: JobStatus::Ok {
                            elapsed: outcome.elapsed,
                        },
                        lines: outcome.lines,
                    });
                }
                Err(err) => {
                    tracing::error!(source = %source.display(), error = %err, "job failed");
                    result.reports.push(JobReport {
                        source,
                        label,
                        status: JobStatus::Failed {
                            reason: err.to_string(),
                        },
                        lines: Vec::new(),
                    });
                    break;
                }
            }
        }

        for job in jobs {
            result.reports.push(JobReport {
                source: job.source.clone(),
                label: job.label(),
                status: JobStatus::Skipped,
                lines: Vec::new(),
            });
        }

        result
    }

    /// Execute a single job against the given observer. Exposed so an
    /// external controller can hold the observer and cancel mid-render.
    pub fn run_job(&self, job: &mut Job, progress: &RenderProgress) -> VectraResult<JobOutcome> {
        if !self.config.quiet {
            tracing::info!(label = %progress.label(), "rendering");
        }
        let timer = self.config.benchmarks.then(Instant::now);

        let lines = match &mut job.output {
            JobOutput::Target { target, .. } => {
                target.render(progress)?;
                Vec::new()
            }
            JobOutput::Reserialize { out_path } => {
                self.io.save(out_path, &job.canvas).map_err(|e| match e {
                    e @ VectraError::Render(_) => e,
                    other => VectraError::render(other.to_string()),
                })?;
                Vec::new()
            }
            JobOutput::CanvasInfo { selection } => {
                canvas_info_lines(job.canvas.as_ref(), &job.resolved.desc, selection)
            }
            JobOutput::ListCanvases => {
                let prefix = format!("{}#", job.source.display());
                cascade(&job.root, &prefix).collect::<VectraResult<Vec<_>>>()?
            }
        };

        Ok(JobOutcome {
            elapsed: timer.map(|t| t.elapsed()),
            lines,
        })
    }
}
