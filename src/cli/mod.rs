pub mod repl;

use std::{
    future::Future,
    io::IsTerminal,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, level_filters::LevelFilter};

use crate::{
    classify::{BrowserDetection, Classifier},
    relay::{
        self,
        client::{local_relay_url, HttpUrlSource},
        spawn_relay, UrlStore, DEFAULT_RELAY_ADDR,
    },
    storage::log_store::{CsvLogStore, DEFAULT_LOG_FILE_NAME},
    tracker::{
        shutdown::detect_shutdown, FlushPolicy, TrackingOptions, TrackingSession, TrackingSummary,
    },
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, ensure_dir},
        logging::enable_logging,
    },
    visualize::{chart::ChartStyle, plot_per_category, plot_per_site},
    window_api::GenericWindowManager,
};

#[derive(Parser, Debug)]
#[command(name = "focuslog", version, long_about = None)]
#[command(about = "Logs time spent per window and per website", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long = "log-file", help = "Activity log. Defaults to time_logs.csv in the application directory")]
    log_file: Option<PathBuf>,
    #[arg(long = "relay-addr", default_value = DEFAULT_RELAY_ADDR, help = "Address the url relay listens on")]
    relay_addr: SocketAddr,
    #[arg(
        long = "relay-url",
        help = "Relay queried for the active browser url. Defaults to the relay started on --relay-addr"
    )]
    relay_url: Option<String>,
    #[arg(long = "relay-timeout", default_value = "2", value_parser = parse_seconds, help = "Seconds to wait for the relay")]
    relay_timeout: Duration,
    #[arg(long = "poll-interval", default_value = "1", value_parser = parse_seconds, help = "Seconds between two window checks")]
    poll_interval: Duration,
    #[arg(long = "browser-detection", default_value_t = BrowserDetection::Markers, help = "How browser windows are recognised")]
    browser_detection: BrowserDetection,
    #[arg(long = "flush-policy", default_value_t = FlushPolicy::OnExit, help = "When tracked records are written to the log")]
    flush_policy: FlushPolicy,
    #[arg(long, help = "Print logs to the console")]
    log: bool,
    #[arg(long = "log-filter")]
    log_filter: Option<LevelFilter>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    #[command(about = "Track focused windows until interrupted")]
    Track,
    #[command(about = "Plot time spent on each website")]
    PlotBrowser,
    #[command(about = "Plot time spent by category")]
    PlotCategory,
    #[command(about = "Only run the url relay until interrupted")]
    Relay,
}

fn parse_seconds(value: &str) -> Result<Duration, String> {
    let seconds = value.parse::<f64>().map_err(|e| e.to_string())?;
    Duration::try_from_secs_f64(seconds).map_err(|e| e.to_string())
}

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub store: CsvLogStore,
    pub relay_addr: SocketAddr,
    pub relay_url: String,
    pub relay_timeout: Duration,
    pub detection: BrowserDetection,
    pub tracking: TrackingOptions,
}

impl AppContext {
    fn from_args(args: &Args, app_dir: &Path) -> Self {
        let log_file = args
            .log_file
            .clone()
            .unwrap_or_else(|| app_dir.join(DEFAULT_LOG_FILE_NAME));
        Self {
            store: CsvLogStore::new(log_file),
            relay_addr: args.relay_addr,
            relay_url: args
                .relay_url
                .clone()
                .unwrap_or_else(|| local_relay_url(args.relay_addr)),
            relay_timeout: args.relay_timeout,
            detection: args.browser_detection,
            tracking: TrackingOptions {
                poll_interval: args.poll_interval,
                flush_policy: args.flush_policy,
            },
        }
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = match args.dir.clone() {
        Some(dir) => ensure_dir(dir)?,
        None => create_application_default_path()?,
    };
    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        args.log_filter
    };
    enable_logging(&app_dir, logging_level, args.log)?;

    let context = AppContext::from_args(&args, &app_dir);
    info!("Starting with {:?}", context);

    match args.command {
        Some(Commands::Relay) => run_relay(&context).await,
        Some(Commands::PlotBrowser) => plot_browser(&context),
        Some(Commands::PlotCategory) => plot_category(&context),
        Some(Commands::Track) => {
            with_relay(&context, async {
                println!("Time Tracker Started. Press Ctrl+C to stop.");
                let session = prepare_tracking(&context)?;
                run_tracking(&context, session).await.map(|_| ())
            })
            .await
        }
        None => with_relay(&context, repl::run_shell(&context)).await,
    }
}

/// Keeps the url relay running in the background while `action` runs.
async fn with_relay(context: &AppContext, action: impl Future<Output = Result<()>>) -> Result<()> {
    let shutdown = CancellationToken::new();
    let relay = spawn_relay(context.relay_addr, UrlStore::default(), shutdown.clone()).await;

    let result = action.await;

    shutdown.cancel();
    if let Some(relay) = relay {
        relay
            .await
            .inspect_err(|e| error!("Relay task failed {e:?}"))
            .ok();
    }
    result
}

async fn run_relay(context: &AppContext) -> Result<()> {
    let listener = TcpListener::bind(context.relay_addr).await?;
    println!("Relay started on http://{}", listener.local_addr()?);
    let shutdown = CancellationToken::new();
    let watcher = tokio::spawn(detect_shutdown(shutdown.clone()));

    let result = relay::serve(listener, UrlStore::default(), shutdown.clone()).await;
    shutdown.cancel();
    watcher.await.ok();
    result
}

/// Builds a tracking session. Fails when the platform can't report focused windows.
pub fn prepare_tracking(context: &AppContext) -> Result<TrackingSession> {
    let manager = GenericWindowManager::new()?;
    let url_source = HttpUrlSource::new(&context.relay_url, context.relay_timeout)?;
    Ok(TrackingSession::new(
        Box::new(manager),
        Classifier::new(Box::new(url_source), context.detection),
        context.store.clone(),
        Box::new(DefaultClock),
        context.tracking,
        CancellationToken::new(),
    ))
}

/// Runs `session` until Ctrl+C. Errors here come from saving the log and are fatal.
pub async fn run_tracking(context: &AppContext, session: TrackingSession) -> Result<TrackingSummary> {
    let shutdown = session.shutdown_token();
    let watcher = tokio::spawn(detect_shutdown(shutdown.clone()));

    let result = session.run().await;
    shutdown.cancel();
    watcher.await.ok();

    let summary = result.inspect_err(|e| error!("Failed to save tracked records {e:?}"))?;
    println!(
        "Logs saved to {} ({} records)",
        context.store.path().display(),
        summary.saved
    );
    Ok(summary)
}

pub(crate) fn chart_style() -> ChartStyle {
    ChartStyle {
        colored: std::io::stdout().is_terminal(),
    }
}

pub fn plot_browser(context: &AppContext) -> Result<()> {
    plot_per_site(&context.store, &mut std::io::stdout().lock(), chart_style())
}

pub fn plot_category(context: &AppContext) -> Result<()> {
    plot_per_category(&context.store, &mut std::io::stdout().lock(), chart_style())
}
