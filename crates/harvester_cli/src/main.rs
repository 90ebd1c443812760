mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use harvest_logging::{harvest_error, harvest_info, LogDestination};
use harvester_engine::{
    run_session, FetchSettings, HarvestSettings, HarvestSummary, SnapshotPage, WebDriverPage,
};
use log::LevelFilter;

use crate::config::{Overrides, Target};

#[derive(Parser)]
#[command(
    name = "harvester",
    about = "Harvest a progressively disclosed movie listing into a CSV table",
    version
)]
struct Cli {
    /// Catalog preset (netflix, hulu, prime-video) or a RON settings file
    #[arg(default_value = "hulu")]
    target: Target,

    /// Read static HTML over HTTP instead of driving a browser
    #[arg(long)]
    snapshot: bool,

    /// Maximum number of distinct titles to collect
    #[arg(long)]
    cap: Option<usize>,

    /// Directory the CSV is written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// WebDriver endpoint, e.g. http://localhost:4444
    #[arg(long)]
    webdriver: Option<String>,

    /// Run the browser with a visible window
    #[arg(long)]
    show_browser: bool,

    /// Print the resolved settings as RON and exit
    #[arg(long)]
    print_settings: bool,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,

    /// Log to the terminal only, without writing harvest.log
    #[arg(long)]
    no_log_file: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let destination = if cli.no_log_file {
        LogDestination::Terminal
    } else {
        LogDestination::Both
    };
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    harvest_logging::initialize(destination, level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            harvest_error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let overrides = Overrides {
        cap: cli.cap,
        output_dir: cli.output_dir,
        webdriver_url: cli.webdriver,
        show_browser: cli.show_browser,
    };
    let settings = config::resolve(&cli.target, &overrides)?;

    if cli.print_settings {
        println!("{}", config::to_ron(&settings)?);
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let summary = runtime.block_on(harvest(settings, cli.snapshot))?;

    harvest_info!(
        "wrote {} row(s) to {} ({:?})",
        summary.rows_written,
        summary.output_path.display(),
        summary.stop_reason()
    );
    println!("{}", summary.output_path.display());
    Ok(())
}

async fn harvest(settings: HarvestSettings, snapshot: bool) -> Result<HarvestSummary> {
    let summary = if snapshot {
        let page = SnapshotPage::fetching(FetchSettings::default())?;
        run_session(page, settings).await?
    } else {
        let page = WebDriverPage::connect(&settings.webdriver_url, settings.headless)
            .await
            .with_context(|| {
                format!(
                    "could not open a browser session at {}",
                    settings.webdriver_url
                )
            })?;
        run_session(page, settings).await?
    };
    Ok(summary)
}
