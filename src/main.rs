use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use hostpulse::config::{Config, load_config, load_config_from_path};
use hostpulse::report::Report;
use hostpulse::system::kill::{ProcessTerminator, TerminateOutcome};
use hostpulse::system::process::SortKey;
use hostpulse::telemetry::Engine;
use hostpulse::telemetry::notice::{NoticeState, battery_notice};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "hostpulse",
    about = "Live host telemetry: metric windows, top processes and power estimates"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sampling period in milliseconds
    #[arg(long)]
    refresh_rate: Option<u64>,

    /// Process sort key: memory, cpu
    #[arg(long)]
    sort: Option<String>,

    /// Number of processes to show
    #[arg(long)]
    top: Option<usize>,

    /// Print each report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Print a single report and exit.
    #[arg(long, default_value_t = false)]
    once: bool,

    /// Stop after this many reports.
    #[arg(long)]
    iterations: Option<usize>,

    /// Request graceful termination of a process and exit.
    #[arg(long, value_name = "PID")]
    kill: Option<u32>,

    /// Emit logs on stderr as JSON lines.
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    init_logging(cli.log_json);
    let config = load_config_for_cli(&cli);

    if let Some(pid) = cli.kill {
        let outcome = ProcessTerminator::new().terminate(pid);
        println!("{}", outcome.message());
        return match outcome {
            TerminateOutcome::AccessDenied { .. } => Err(eyre!(outcome.message())),
            _ => Ok(()),
        };
    }

    let limit = report_limit(cli.once, cli.iterations)?;
    let sort_key = SortKey::from_str_config(&config.processes.default_sort);
    let engine = Engine::start(&config)?;
    let result = run(&engine, &cli, sort_key, limit).await;
    engine.shutdown().await;
    result
}

fn init_logging(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hostpulse=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().with_current_span(true).init();
    } else {
        builder.init();
    }
}

/// How many reports to print, `None` for unbounded.
fn report_limit(once: bool, iterations: Option<usize>) -> Result<Option<usize>> {
    match (once, iterations) {
        (true, _) => Ok(Some(1)),
        (false, Some(0)) => Err(eyre!("--iterations must be greater than 0")),
        (false, limit) => Ok(limit),
    }
}

async fn run(engine: &Engine, cli: &Cli, sort_key: SortKey, limit: Option<usize>) -> Result<()> {
    let hub = engine.hub();
    let mut updates = hub.subscribe_snapshots();
    let mut notices = NoticeState::default();
    let mut printed = 0usize;

    // Registered once so an interrupt during printing is not lost.
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let report = Report::collect(&hub, sort_key);
        if cli.json {
            println!("{}", report.to_json()?);
        } else {
            let sample = report.battery.as_ref().map(|status| &status.sample);
            let notice = battery_notice(sample, &mut notices);
            println!("{}\n", report.render_text(notice.as_ref()));
        }

        printed += 1;
        if limit.is_some_and(|limit| printed >= limit) {
            break;
        }

        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("interrupted, shutting down");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(rate) = cli.refresh_rate {
        config.general.sample_interval_ms = rate;
    }
    if let Some(ref sort) = cli.sort {
        config.processes.default_sort = sort.clone();
    }
    if let Some(top) = cli.top {
        config.processes.top_n = top;
    }

    config
}
