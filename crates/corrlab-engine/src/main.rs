/*
[INPUT]:  CLI arguments, optional YAML configuration, OS shutdown signals
[OUTPUT]: Analysis submission/tracking and catalog search against a service
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use corrlab_adapter::{AnalysisRequest, ApiClient, ClientConfig, Market};
use corrlab_engine::{
    AnalysisEngine, EngineConfig, ServiceHealth, TaskPhase, link,
};

#[derive(Parser, Debug)]
#[command(name = "corrlab", version, about = "Correlation analysis task tracker")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
    #[arg(long = "base-url", value_name = "URL")]
    base_url: Option<String>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a new analysis and track it to completion
    Submit {
        #[arg(long, value_name = "YYYY-MM-DD")]
        start_date: NaiveDate,
        #[arg(long, value_name = "YYYY-MM-DD")]
        end_date: NaiveDate,
        /// Rolling correlation window in trading days
        #[arg(long, default_value_t = 60)]
        window: u32,
        /// Ticker to include; repeat for each symbol
        #[arg(long = "ticker", value_name = "TICKER", required = true)]
        tickers: Vec<String>,
    },
    /// Attach to an existing task and track it to completion
    Watch {
        /// Task identifier
        #[arg(long, conflicts_with = "url")]
        task_id: Option<String>,
        /// Share URL to recover the task identifier from
        #[arg(long)]
        url: Option<String>,
    },
    /// Search the stock catalog
    Search {
        query: String,
        #[arg(long, default_value = "all")]
        market: Market,
        #[arg(long, default_value_t = 30)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    let config = load_config(&args)?;
    let client = ApiClient::with_config_and_base_url(ClientConfig::default(), &config.base_url)
        .map_err(|err| anyhow!("create ApiClient failed: {err}"))?;

    match args.command {
        Command::Submit {
            start_date,
            end_date,
            window,
            tickers,
        } => {
            let request = AnalysisRequest {
                start_date,
                end_date,
                window,
                tickers,
            };
            info!(
                start_date = %request.start_date,
                end_date = %request.end_date,
                window = request.window,
                ticker_count = request.tickers.len(),
                "submitting analysis"
            );
            let response = client
                .start_analysis(&request)
                .await
                .context("submit analysis")?;
            info!(task_id = %response.task_id, "analysis accepted");
            track(client, config, response.task_id).await
        }
        Command::Watch { task_id, url } => {
            let task_id = match (task_id, url) {
                (Some(task_id), _) => task_id,
                (None, Some(url)) => link::task_id_from_url(&url)
                    .ok_or_else(|| anyhow!("no task id found in URL: {url}"))?,
                (None, None) => bail!("pass --task-id or --url"),
            };
            track(client, config, task_id).await
        }
        Command::Search {
            query,
            market,
            limit,
        } => {
            let response = client
                .search_stocks(&query, market, limit)
                .await
                .context("search stocks")?;
            if response.stocks.is_empty() {
                info!(query = %query, "no matches");
                return Ok(());
            }
            for stock in &response.stocks {
                println!(
                    "{}\t{}\t{}\t{}",
                    stock.ticker,
                    stock.code,
                    stock.market,
                    stock.name
                );
            }
            Ok(())
        }
    }
}

/// Track one task to a terminal phase, mirroring status and health changes
/// into the log.
async fn track(client: ApiClient, config: EngineConfig, task_id: String) -> Result<()> {
    let engine = Arc::new(AnalysisEngine::new(client, config));
    setup_signal_handlers(engine.clone());

    let mut health_rx = engine.health();
    tokio::spawn(async move {
        while health_rx.changed().await.is_ok() {
            match *health_rx.borrow() {
                ServiceHealth::Reachable { active_tasks } => {
                    info!(active_tasks, "service reachable");
                }
                ServiceHealth::Unreachable => warn!("service unreachable"),
                ServiceHealth::Unknown => {}
            }
        }
    });

    let mut state_rx = engine.subscribe();
    engine.start_task(task_id);

    loop {
        {
            let state = state_rx.borrow_and_update();
            match state.phase {
                TaskPhase::Polling => {
                    info!(
                        progress = %format!("{:.0}%", state.progress * 100.0),
                        message = state.message.as_deref().unwrap_or("waiting"),
                        current_stock = state.current_stock.as_deref().unwrap_or(""),
                        "analysis running"
                    );
                }
                TaskPhase::Completed => break,
                TaskPhase::Failed => break,
                TaskPhase::Idle => {
                    // A non-zero epoch means the task was reset mid-flight.
                    if state.epoch > 0 {
                        break;
                    }
                }
            }
        }
        if state_rx.changed().await.is_err() {
            break;
        }
    }

    let state = engine.state();
    match state.phase {
        TaskPhase::Completed => {
            let report = state
                .result
                .ok_or_else(|| anyhow!("completed state without a report"))?;
            let kinds: Vec<&str> = report.sections().iter().map(|s| s.kind()).collect();
            info!(sections = ?kinds, "analysis completed");
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("render report")?
            );
            Ok(())
        }
        TaskPhase::Failed => {
            let error = state
                .error
                .ok_or_else(|| anyhow!("failed state without an error"))?;
            bail!("analysis failed ({:?}): {}", error.kind, error.message)
        }
        TaskPhase::Idle => bail!("tracking interrupted"),
        TaskPhase::Polling => bail!("tracking ended while polling"),
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(args: &Cli) -> Result<EngineConfig> {
    let mut config = match &args.config_path {
        Some(path) => {
            let path_str = path.to_str().context("config path must be valid utf-8")?;
            EngineConfig::from_file(path_str).context("load config")?
        }
        None => EngineConfig::default(),
    };
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    Ok(config)
}

fn setup_signal_handlers(engine: Arc<AnalysisEngine>) {
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT; clearing current task");
        engine.reset();
    });
}
