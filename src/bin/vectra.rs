use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};

use vectra::{
    BatchResult, Job, JobMode, JobRunner, JobSpec, JsonDocumentIo, RenderOverrides, RunnerConfig,
    default_registry,
};

const EXIT_OK: u8 = 0;
const EXIT_NOTHING_TO_DO: u8 = 1;
const EXIT_BAD_INPUT: u8 = 2;
const EXIT_RENDER_FAILURE: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "vectra", version, about = "Render a vector-canvas document")]
struct Cli {
    /// Input canvas document.
    input: Option<PathBuf>,

    /// Output filename.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output target backend (default: inferred from the output extension).
    #[arg(short = 't', long)]
    target: Option<String>,

    /// Image width (use zero for file default).
    #[arg(short = 'w', long)]
    width: Option<u32>,

    /// Image height (use zero for file default).
    #[arg(long)]
    height: Option<u32>,

    /// Diagonal size of the image window (span).
    #[arg(short = 's', long)]
    span: Option<f64>,

    /// Antialias amount (1..30).
    #[arg(short = 'a', long)]
    antialias: Option<u32>,

    /// Image quality (0..10).
    #[arg(short = 'Q', long)]
    quality: Option<u32>,

    /// Gamma (default 2.2).
    #[arg(short = 'g', long)]
    gamma: Option<f64>,

    /// Worker threads for the renderer.
    #[arg(short = 'T', long)]
    threads: Option<usize>,

    /// Render the canvas with the given id instead of the root.
    #[arg(short = 'c', long)]
    canvas: Option<String>,

    /// Frame rate override.
    #[arg(long)]
    fps: Option<u32>,

    /// Render a single frame at <seconds>.
    #[arg(long)]
    time: Option<f64>,

    /// Starting time.
    #[arg(long, alias = "start-time")]
    begin_time: Option<f64>,

    /// Ending time.
    #[arg(long)]
    end_time: Option<f64>,

    /// Physical resolution (dots-per-inch), both axes.
    #[arg(long)]
    dpi: Option<f64>,

    /// Physical X resolution (dots-per-inch).
    #[arg(long = "dpi-x")]
    dpi_x: Option<f64>,

    /// Physical Y resolution (dots-per-inch).
    #[arg(long = "dpi-y")]
    dpi_y: Option<f64>,

    /// Increase output verbosity.
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (no progress display).
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Print per-job benchmarks.
    #[arg(short = 'b', long)]
    benchmarks: bool,

    /// Print the given comma-separated details of the canvas.
    #[arg(long, value_name = "FIELDS")]
    canvas_info: Option<String>,

    /// List the nested/exported canvases in the document.
    #[arg(long)]
    list_canvases: bool,

    /// Print the list of available targets.
    #[arg(long)]
    targets: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let registry = default_registry();

    if cli.targets {
        for name in registry.names() {
            println!("{name}");
        }
        return ExitCode::from(EXIT_OK);
    }

    let Some(input) = cli.input.clone() else {
        eprintln!("Nothing to do!");
        return ExitCode::from(EXIT_NOTHING_TO_DO);
    };

    let mode = if let Some(fields) = cli.canvas_info.clone() {
        JobMode::CanvasInfo { selectors: fields }
    } else if cli.list_canvases {
        JobMode::ListCanvases
    } else if cli.output.is_some() {
        JobMode::Render
    } else {
        eprintln!("Nothing to do!");
        return ExitCode::from(EXIT_NOTHING_TO_DO);
    };

    let spec = JobSpec {
        input,
        output: cli.output.clone(),
        canvas_id: cli.canvas.clone(),
        target_name: cli.target.clone(),
        overrides: overrides_from(&cli),
        mode,
    };

    let io = JsonDocumentIo;
    let source = spec.input.clone();
    let job = match Job::build(spec, &io, &registry) {
        Ok(job) => job,
        Err(err) => {
            eprintln!("{}: {err}", source.display());
            return ExitCode::from(EXIT_BAD_INPUT);
        }
    };

    let runner = JobRunner::new(
        RunnerConfig {
            quiet: cli.quiet,
            benchmarks: cli.benchmarks,
        },
        &io,
    );
    let result = runner.run(vec![job]);
    report(&result)
}

fn overrides_from(cli: &Cli) -> RenderOverrides {
    RenderOverrides {
        width: cli.width,
        height: cli.height,
        span: cli.span,
        antialias: cli.antialias,
        quality: cli.quality,
        gamma: cli.gamma,
        threads: cli.threads,
        fps: cli.fps,
        time: cli.time,
        begin_time: cli.begin_time,
        end_time: cli.end_time,
        dpi: cli.dpi,
        dpi_x: cli.dpi_x,
        dpi_y: cli.dpi_y,
    }
}

fn report(result: &BatchResult) -> ExitCode {
    let mut exit = EXIT_OK;
    for job in &result.reports {
        for line in &job.lines {
            println!("{line}");
        }
        match &job.status {
            vectra::JobStatus::Ok { elapsed } => {
                if let Some(elapsed) = elapsed {
                    println!(
                        "{}: rendered in {:.3} seconds",
                        job.source.display(),
                        elapsed.as_secs_f64()
                    );
                }
            }
            vectra::JobStatus::Failed { reason } => {
                eprintln!("{}: {reason}", job.source.display());
                exit = EXIT_RENDER_FAILURE;
            }
            vectra::JobStatus::Skipped => {
                eprintln!("{}: not run", job.source.display());
            }
        }
    }
    ExitCode::from(exit)
}

fn init_logging(verbosity: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
