use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use jobharvest_client::{
    BrowserFetcher, BrowserSettings, FetchChain, HeavyBrowserFetcher, HttpFetcher,
    HttpFetcherConfig, IdentityPool, SelectorExtractor,
};
use jobharvest_core::{
    AppError, CycleSummary, HarvestService, OutputFormat, RetryPolicy, ScheduleConfig, Scheduler,
    TracingHarvestReporter,
};
use jobharvest_store::{OutputStore, StoreConfig};

mod input;

type Chain = FetchChain<HttpFetcher, BrowserFetcher, HeavyBrowserFetcher>;

#[derive(Parser)]
#[command(
    name = "jobharvest",
    version,
    about = "Job-board scraper with browser fallback and incremental output"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every input URL once and exit
    Run {
        #[command(flatten)]
        harvest: HarvestArgs,
    },

    /// Scrape now, then again every N hours until interrupted
    Schedule {
        /// Hours between cycles
        #[arg(
            long,
            env = "JOBHARVEST_INTERVAL_HOURS",
            default_value_t = 2,
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        interval_hours: u64,

        #[command(flatten)]
        harvest: HarvestArgs,
    },
}

#[derive(Args, Clone)]
struct HarvestArgs {
    /// Seed URLs: .txt (one per line), .csv or .xlsx (`url` column)
    #[arg(
        short,
        long,
        env = "JOBHARVEST_INPUT",
        default_value = "data/input_urls.csv"
    )]
    input: PathBuf,

    /// Directory holding jobs.csv, jobs.json and jobs.xlsx
    #[arg(short, long, env = "JOBHARVEST_OUTPUT_DIR", default_value = "data")]
    output_dir: PathBuf,

    /// Output formats to maintain (csv, json, excel)
    #[arg(
        short,
        long,
        env = "JOBHARVEST_FORMATS",
        value_delimiter = ',',
        num_args = 1..,
        default_values_t = OutputFormat::all()
    )]
    formats: Vec<OutputFormat>,

    /// Per-request timeout in seconds
    #[arg(
        long,
        env = "JOBHARVEST_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout_secs: u64,

    /// Fetch attempts per URL before it is marked unscraped
    #[arg(
        long,
        env = "JOBHARVEST_MAX_RETRIES",
        default_value_t = 3,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    max_retries: u32,

    /// Skip the primary headless browser
    #[arg(long, default_value_t = false)]
    no_browser: bool,

    /// Skip the secondary headless browser
    #[arg(long, default_value_t = false)]
    no_heavy_browser: bool,

    /// File with one user agent per line, replacing the built-in pool
    #[arg(long, env = "JOBHARVEST_USER_AGENTS")]
    user_agents: Option<PathBuf>,

    /// Chrome/Chromium binary for the browser strategies
    #[arg(long, env = "CHROME_BIN")]
    chrome_bin: Option<PathBuf>,
}

impl HarvestArgs {
    fn store_config(&self) -> Result<StoreConfig, AppError> {
        StoreConfig::new(self.output_dir.clone(), &self.formats)
    }

    fn identities(&self) -> Result<IdentityPool, AppError> {
        match &self.user_agents {
            Some(path) => {
                let agents = input::read_lines(path)?;
                info!(path = %path.display(), count = agents.len(), "Loaded user agents");
                Ok(IdentityPool::with_user_agents(agents))
            }
            None => Ok(IdentityPool::default()),
        }
    }

    fn build_service(
        &self,
        cancel: &CancellationToken,
    ) -> Result<HarvestService<Chain, SelectorExtractor>, AppError> {
        let timeout = Duration::from_secs(self.timeout_secs);
        let identities = self.identities()?;

        let http = HttpFetcher::with_config(HttpFetcherConfig { timeout }, identities.clone())?;
        let settings = BrowserSettings::default()
            .with_timeout(timeout)
            .with_chrome_path(self.chrome_bin.clone());
        let primary =
            (!self.no_browser).then(|| BrowserFetcher::new(settings.clone(), identities.clone()));
        let secondary =
            (!self.no_heavy_browser).then(|| HeavyBrowserFetcher::new(settings, identities));

        let chain = FetchChain::new(http, primary, secondary).with_cancel(cancel.clone());
        Ok(HarvestService::new(chain, SelectorExtractor)
            .with_retry(RetryPolicy::new(self.max_retries)))
    }
}

/// One complete cycle built from scratch: input re-read, registry rebuilt
/// from disk, fresh fetchers.
async fn harvest_once(
    args: HarvestArgs,
    cancel: CancellationToken,
) -> Result<CycleSummary, AppError> {
    let seeds = input::read_input_file(&args.input)?;
    let store = OutputStore::new(args.store_config()?);
    let mut registry = store.bootstrap_registry();
    let service = args.build_service(&cancel)?;

    service
        .run_cycle(&seeds, &mut registry, &store, &cancel, &TracingHarvestReporter)
        .await
}

async fn cmd_run(args: HarvestArgs, cancel: CancellationToken) -> Result<ExitCode> {
    info!("Running harvest once");
    let summary = harvest_once(args, cancel).await?;
    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        error!(
            unscraped = summary.unscraped.len(),
            "No jobs could be extracted"
        );
        Ok(ExitCode::FAILURE)
    }
}

async fn cmd_schedule(
    args: HarvestArgs,
    interval_hours: u64,
    cancel: CancellationToken,
) -> Result<ExitCode> {
    // Surface bad configuration before the first cycle instead of logging
    // the same failure every interval.
    args.store_config()?;
    args.identities()?;

    info!(interval_hours, "Starting scheduled harvest");
    let scheduler = Scheduler::new(ScheduleConfig::every_hours(interval_hours));
    let cycle_cancel = cancel.clone();
    scheduler
        .run(cancel, move || {
            harvest_once(args.clone(), cycle_cancel.clone())
        })
        .await;
    Ok(ExitCode::SUCCESS)
}

/// Cancel the token on Ctrl-C or, on unix, SIGTERM. The batch stops between
/// URLs, keeps what it has collected and closes every browser.
fn install_interrupt_handler(cancel: CancellationToken) -> std::io::Result<()> {
    #[cfg(unix)]
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    tokio::spawn(async move {
        #[cfg(unix)]
        let signal = tokio::select! {
            result = tokio::signal::ctrl_c() => result.map(|()| "SIGINT"),
            _ = terminate.recv() => Ok("SIGTERM"),
        };
        #[cfg(not(unix))]
        let signal = tokio::signal::ctrl_c().await.map(|()| "Ctrl-C");

        match signal {
            Ok(signal) => {
                warn!(signal, "Shutdown requested, stopping after the current URL");
                cancel.cancel();
            }
            Err(e) => error!(error = %e, "Failed to listen for shutdown signals"),
        }
    });
    Ok(())
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let cancel = CancellationToken::new();
    install_interrupt_handler(cancel.clone())?;

    match cli.command {
        Commands::Run { harvest } => cmd_run(harvest, cancel).await,
        Commands::Schedule {
            interval_hours,
            harvest,
        } => cmd_schedule(harvest, interval_hours, cancel).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobharvest=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_defaults() {
        let cli = Cli::try_parse_from(["jobharvest", "run"]).unwrap();
        let Commands::Run { harvest } = cli.command else {
            panic!("expected run");
        };
        assert_eq!(harvest.formats, OutputFormat::all());
        assert_eq!(harvest.output_dir, PathBuf::from("data"));
        assert_eq!(harvest.max_retries, 3);
        assert!(!harvest.no_browser);
    }

    #[test]
    fn formats_accept_comma_list() {
        let cli = Cli::try_parse_from(["jobharvest", "run", "--formats", "json,xlsx"]).unwrap();
        let Commands::Run { harvest } = cli.command else {
            panic!("expected run");
        };
        assert_eq!(harvest.formats, vec![OutputFormat::Json, OutputFormat::Excel]);
    }

    #[test]
    fn schedule_rejects_zero_interval() {
        assert!(
            Cli::try_parse_from(["jobharvest", "schedule", "--interval-hours", "0"]).is_err()
        );
        let cli =
            Cli::try_parse_from(["jobharvest", "schedule", "--interval-hours", "6"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Schedule {
                interval_hours: 6,
                ..
            }
        ));
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["jobharvest", "run", "--formats", "parquet"]).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn sigterm_cancels_the_batch() {
        let cancel = CancellationToken::new();
        install_interrupt_handler(cancel.clone()).unwrap();

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), cancel.cancelled())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_input_fails_the_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "jobharvest",
            "run",
            "--no-browser",
            "--no-heavy-browser",
            "--input",
            dir.path().join("absent.txt").to_str().unwrap(),
            "--output-dir",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        let Commands::Run { harvest } = cli.command else {
            panic!("expected run");
        };
        let err = harvest_once(harvest, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[tokio::test]
    async fn empty_input_fails_the_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("urls.txt");
        std::fs::write(&input, "# nothing yet\n").unwrap();
        let cli = Cli::try_parse_from([
            "jobharvest",
            "run",
            "--no-browser",
            "--no-heavy-browser",
            "--input",
            input.to_str().unwrap(),
            "--output-dir",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        let Commands::Run { harvest } = cli.command else {
            panic!("expected run");
        };
        let code = cmd_run(harvest, CancellationToken::new()).await;
        assert!(code.is_err());
    }
}
