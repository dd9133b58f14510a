use clap::Parser;
use deepscan::app::{ConsoleView, OutputFormat};
use deepscan::pipeline::services::{ImmediateScheduler, Scheduler, TokioScheduler};
use deepscan::{AppError, Configuration, CoordinatorBuilder, FileDescriptor, ReentryPolicy};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};

/// Run video files through the deepfake analysis pipeline.
#[derive(Parser, Debug)]
#[command(name = "deepscan", version, about)]
struct Args {
    /// Video files to analyze, in order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long, env = "DEEPSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for reproducible verdicts
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the per-stage delay
    #[arg(long)]
    fast: bool,

    /// Refuse a new run while another is active instead of superseding it
    #[arg(long)]
    reject_concurrent: bool,

    /// Print JSON reports instead of text
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();
    init_logging(args.verbose);

    let configuration = Configuration::load(args.config.as_deref())?;
    let scheduler: Arc<dyn Scheduler> = if args.fast {
        Arc::new(ImmediateScheduler)
    } else {
        Arc::new(TokioScheduler)
    };
    let mut builder = CoordinatorBuilder::new(configuration).scheduler(scheduler);
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    if args.reject_concurrent {
        builder = builder.reentry_policy(ReentryPolicy::Reject);
    }
    let coordinator = builder.build()?;

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let mut view = ConsoleView::new(std::io::stdout(), format);

    for path in &args.files {
        let file = match FileDescriptor::from_path(path) {
            Ok(file) => file,
            Err(e) => {
                error!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        tokio::select! {
            outcome = coordinator.analyze(file, &mut view) => match outcome {
                Ok(Some(_)) => {}
                Ok(None) => info!("Run for {} was cancelled", path.display()),
                Err(e) if e.is_rejection() => {}
                Err(e) => return Err(e),
            },
            _ = tokio::signal::ctrl_c() => {
                if let Some(token) = coordinator.clear() {
                    info!("Interrupted, cancelled run {}", token);
                }
                break;
            }
        }
    }

    Ok(())
}
