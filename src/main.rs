//! tiercloud - render one word cloud per cluster-hierarchy node.
//!
//! Exit codes:
//!   0 - every node rendered
//!   1 - bad input, invalid tree, or a render failure

mod cli;

use anyhow::{Context, Result};
use cli::Args;
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    let args = Args::parse_args();
    init_logging(&args)?;

    info!("tiercloud v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let config = args.to_config();
    let report = tiercloud::run(&config).with_context(|| {
        format!(
            "failed to render clouds from {}",
            config.weights_path.display()
        )
    })?;

    println!(
        "Wrote {} images ({} skipped)",
        report.written.len(),
        report.skipped.len()
    );
    Ok(())
}

/// Initialize logging; `RUST_LOG` wins over the verbosity flags.
fn init_logging(args: &Args) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.log_level()).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}
