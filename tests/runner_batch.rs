use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use vectra::{
    Canvas as _, DocumentIo, Job, JobRunner, JobSpec, JobStatus, JsonDocumentIo, MemoryCanvas,
    ProgressObserver, RenderProgress, RendDesc, RunnerConfig, Target, TargetRegistry, TargetSpec,
    VectraError, VectraResult,
};

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("runner_batch");
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

fn write_doc(name: &str) -> PathBuf {
    let path = scratch(name);
    let canvas = MemoryCanvas::new("root", RendDesc::default()).into_handle();
    JsonDocumentIo.save(&path, &canvas).unwrap();
    path
}

/// Writes its output file only after the full scan-line loop completes, so a
/// cancelled render leaves no output behind.
#[derive(Debug)]
struct FileTarget {
    out_path: PathBuf,
    lines: u32,
    lines_done: Arc<AtomicU64>,
}

impl Target for FileTarget {
    fn render(&mut self, progress: &dyn ProgressObserver) -> VectraResult<()> {
        for line in 0..self.lines {
            if progress.cancelled() {
                return Err(VectraError::Cancelled);
            }
            self.lines_done.fetch_add(1, Ordering::Relaxed);
            progress.report(f64::from(line + 1) / f64::from(self.lines));
        }
        std::fs::write(&self.out_path, b"frame data")
            .map_err(|e| VectraError::render(e.to_string()))?;
        Ok(())
    }
}

#[derive(Debug)]
struct FailingTarget;

impl Target for FailingTarget {
    fn render(&mut self, _progress: &dyn ProgressObserver) -> VectraResult<()> {
        Err(VectraError::render("codec rejected frame"))
    }
}

fn test_registry(lines_done: Arc<AtomicU64>) -> TargetRegistry {
    let mut registry = TargetRegistry::new();
    registry.register(
        "file",
        &["frames"],
        Arc::new(move |spec: &TargetSpec| {
            Ok(Box::new(FileTarget {
                out_path: spec.out_path.clone(),
                lines: spec.desc.height,
                lines_done: lines_done.clone(),
            }) as Box<dyn Target>)
        }),
    );
    registry.register(
        "broken",
        &[],
        Arc::new(|_spec: &TargetSpec| Ok(Box::new(FailingTarget) as Box<dyn Target>)),
    );
    registry
}

fn render_spec(input: &PathBuf, out: &str, target: &str) -> JobSpec {
    JobSpec {
        input: input.clone(),
        output: Some(scratch(out)),
        target_name: Some(target.to_string()),
        ..JobSpec::new(input)
    }
}

#[test]
fn batch_stops_on_first_failure_and_keeps_prior_output() {
    let input = write_doc("batch.vcv");
    let lines_done = Arc::new(AtomicU64::new(0));
    let registry = test_registry(lines_done.clone());
    let io = JsonDocumentIo;

    let jobs = vec![
        Job::build(render_spec(&input, "j1.frames", "file"), &io, &registry).unwrap(),
        Job::build(render_spec(&input, "j2.frames", "broken"), &io, &registry).unwrap(),
        Job::build(render_spec(&input, "j3.frames", "file"), &io, &registry).unwrap(),
    ];

    let runner = JobRunner::new(RunnerConfig::default(), &io);
    let result = runner.run(jobs);

    assert_eq!(result.reports.len(), 3);
    assert!(matches!(result.reports[0].status, JobStatus::Ok { .. }));
    assert!(matches!(
        &result.reports[1].status,
        JobStatus::Failed { reason } if reason.contains("codec rejected frame")
    ));
    assert!(matches!(result.reports[2].status, JobStatus::Skipped));
    assert!(!result.all_ok());
    assert!(result.first_failure().is_some());

    // J1's output survives the batch failure; J3 was never started.
    assert!(scratch("j1.frames").exists());
    assert!(!scratch("j3.frames").exists());
}

#[test]
fn successful_batch_reports_all_ok() {
    let input = write_doc("allok.vcv");
    let registry = test_registry(Arc::new(AtomicU64::new(0)));
    let io = JsonDocumentIo;

    let jobs = vec![
        Job::build(render_spec(&input, "ok1.frames", "file"), &io, &registry).unwrap(),
        Job::build(render_spec(&input, "ok2.frames", "file"), &io, &registry).unwrap(),
    ];

    let result = JobRunner::new(RunnerConfig::default(), &io).run(jobs);
    assert!(result.all_ok());
    assert!(scratch("ok1.frames").exists());
    assert!(scratch("ok2.frames").exists());
}

#[test]
fn benchmark_flag_records_elapsed_time() {
    let input = write_doc("bench.vcv");
    let registry = test_registry(Arc::new(AtomicU64::new(0)));
    let io = JsonDocumentIo;

    let jobs = vec![
        Job::build(render_spec(&input, "bench.frames", "file"), &io, &registry).unwrap(),
    ];
    let config = RunnerConfig {
        benchmarks: true,
        ..RunnerConfig::default()
    };
    let result = JobRunner::new(config, &io).run(jobs);
    match &result.reports[0].status {
        JobStatus::Ok { elapsed } => assert!(elapsed.is_some()),
        other => panic!("expected success, got {other:?}"),
    }

    let result = JobRunner::new(RunnerConfig::default(), &io).run(vec![
        Job::build(render_spec(&input, "nobench.frames", "file"), &io, &registry).unwrap(),
    ]);
    match &result.reports[0].status {
        JobStatus::Ok { elapsed } => assert!(elapsed.is_none()),
        other => panic!("expected success, got {other:?}"),
    }
}

#[test]
fn pre_cancelled_observer_returns_promptly_without_output() {
    let input = write_doc("cancel.vcv");
    let lines_done = Arc::new(AtomicU64::new(0));
    let registry = test_registry(lines_done.clone());
    let io = JsonDocumentIo;

    let mut job = Job::build(
        render_spec(&input, "cancelled.frames", "file"),
        &io,
        &registry,
    )
    .unwrap();

    let progress = RenderProgress::new(job.label());
    progress.cancel();

    let runner = JobRunner::new(RunnerConfig::default(), &io);
    let err = runner.run_job(&mut job, &progress).unwrap_err();
    assert!(matches!(err, VectraError::Cancelled));

    // Cancellation is polled before the first scan-line; nothing rendered,
    // no output file produced.
    assert_eq!(lines_done.load(Ordering::Relaxed), 0);
    assert!(!scratch("cancelled.frames").exists());
}

#[test]
fn reserialize_job_writes_loadable_document() {
    let input = write_doc("reser_src.vcv");
    let registry = test_registry(Arc::new(AtomicU64::new(0)));
    let io = JsonDocumentIo;

    let out = scratch("reser_copy.vcv");
    let spec = JobSpec {
        input: input.clone(),
        output: Some(out.clone()),
        ..JobSpec::new(&input)
    };
    let jobs = vec![Job::build(spec, &io, &registry).unwrap()];
    let result = JobRunner::new(RunnerConfig::default(), &io).run(jobs);
    assert!(result.all_ok());

    let reloaded = io.load(&out).unwrap();
    assert_eq!(reloaded.id(), "root");
}

#[test]
fn empty_queue_yields_empty_result() {
    let io = JsonDocumentIo;
    let result = JobRunner::new(RunnerConfig::default(), &io).run(Vec::new());
    assert!(result.is_empty());
    assert!(result.all_ok());
}
