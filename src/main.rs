// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! UniFi MCP CLI
//!
//! Serves the controller over MCP on stdio, or runs one-shot commands

use clap::Parser;
use unifi_mcp::cli::{Cli, Runner};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load environment before anything reads UNIFI_* or RUST_LOG
    let env_loaded = match &cli.env_file {
        Some(path) => dotenvy::from_path(path).map_err(|e| (path.display().to_string(), e)),
        None => {
            dotenvy::dotenv().ok();
            Ok(())
        }
    };

    // stdout carries protocol traffic, logs go to stderr
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(cli.log_filter(rust_log.as_deref()))
        .init();

    if let Err((path, e)) = env_loaded {
        eprintln!("Error: Failed to load {path}: {e}");
        std::process::exit(1);
    }

    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
