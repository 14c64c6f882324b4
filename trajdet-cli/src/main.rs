use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use trajdet_core::trace::read_trace;
use trajdet_core::{run_trace, PropertyBag, RunConfig, Table};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "trajdet")]
#[command(about = "trajdet - Replay electron trajectory events through detectors", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded trace and write every detector's artifacts
    Replay {
        /// Run configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,
        /// Recorded events, one JSON object per line
        #[arg(short, long)]
        trace: PathBuf,
        /// Overrides the configuration's results directory
        #[arg(short, long)]
        results_dir: Option<PathBuf>,
    },
    /// Print a results table (.csv) or detector log (.log)
    Inspect {
        /// Artifact to print
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Commands::Replay {
            config,
            trace,
            results_dir,
        } => replay(&config, &trace, results_dir),
        Commands::Inspect { file } => inspect(&file),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn replay(
    config_path: &Path,
    trace_path: &Path,
    results_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = RunConfig::load(config_path)?;
    let results_dir = results_dir.unwrap_or_else(|| config.results_dir.clone());
    let events = read_trace(trace_path)?;
    info!(
        detectors = config.detectors.len(),
        events = events.len(),
        results_dir = %results_dir.display(),
        "starting replay"
    );

    let artifacts = run_trace(&config, events, &results_dir)?;

    // One line per detector
    for written in artifacts {
        println!(
            "{}: {} {}",
            written.base_name,
            written.results.display(),
            written.log.display()
        );
    }

    Ok(())
}

fn inspect(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match file.extension().and_then(|ext| ext.to_str()) {
        Some("log") => {
            let props = PropertyBag::load_from_path(file)?;
            for (key, value) in props.iter() {
                println!("{} = {}", key, value);
            }
        }
        Some("csv") => {
            let table = Table::read(file)?;
            println!("{}", table.header.join("\t"));
            for row in &table.rows {
                println!("{}", row.join("\t"));
            }
        }
        _ => {
            return Err(format!(
                "don't know how to inspect '{}' (expected .csv or .log)",
                file.display()
            )
            .into())
        }
    }
    Ok(())
}
