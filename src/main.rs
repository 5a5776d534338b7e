//! Bookgraph RAG server entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Init logger once (`-v` flags > RUST_LOG > config)
//!   4. Load the graph and build the first knowledge snapshot
//!   5. Spawn Ctrl-C watcher
//!   6. Serve HTTP until shutdown

use bookgraph_rag::{AppState, config, error::AppError, http, logger};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Missing .env is fine.
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = logger::init(&config.server.log_level, args.verbosity)?;

    info!(
        bind = %config.server.bind,
        graph_path = %config.knowledge.graph_path.display(),
        top_k = config.knowledge.top_k,
        llm = %config.llm.provider,
        embedding = %config.embedding.provider,
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    // A graph that cannot be loaded at startup is fatal.
    let state = AppState::init(&config).await?;

    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, shutting down");
            ctrlc_token.cancel();
        }
    });

    http::serve(&config.server.bind, state, shutdown).await
}

struct CliArgs {
    verbosity: u8,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: bookgraph-rag [OPTIONS] [CONFIG]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            a if !a.starts_with('-') && config_path.is_none() => config_path = Some(a.to_string()),
            _ => {}
        }
    }

    CliArgs { verbosity, config_path }
}
