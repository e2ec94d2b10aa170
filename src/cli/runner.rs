//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::UnifiConfig;
use crate::error::{Error, Result};
use crate::http::{SharedClient, UnifiClient};
use crate::mcp::McpServer;
use crate::tools::{self, ToolCall};
use crate::types::{site_path, JsonValue};
use serde_json::json;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match self.cli.command.clone().unwrap_or(Commands::Serve) {
            Commands::Serve => self.serve().await,
            Commands::Tools => {
                self.list_tools();
                Ok(())
            }
            Commands::Call { tool, args } => self.call(&tool, args.as_deref()).await,
            Commands::Check => self.check().await,
        }
    }

    /// Serve MCP on stdio until input closes or Ctrl-C
    async fn serve(&self) -> Result<()> {
        let config = UnifiConfig::from_env()?;
        info!(
            "Serving UniFi controller at {} (site '{}')",
            config.base_url()?,
            config.site
        );

        let shared = Arc::new(SharedClient::new(config));
        let server = McpServer::new(Arc::clone(&shared));

        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();

        let result = tokio::select! {
            result = server.serve(stdin, stdout) => result,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received, shutting down");
                Ok(())
            }
        };

        shared.close().await;
        result
    }

    /// Print tool declarations
    fn list_tools(&self) {
        let tools: Vec<JsonValue> = tools::tool_definitions()
            .into_iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "inputSchema": tool.input_schema
                })
            })
            .collect();
        self.output_message(&json!({ "tools": tools }));
    }

    /// Run a single tool against the configured controller
    async fn call(&self, tool: &str, args: Option<&str>) -> Result<()> {
        let arguments = match args {
            Some(raw) => serde_json::from_str(raw)
                .map_err(|e| Error::invalid_argument(tool, format!("Invalid arguments JSON: {e}")))?,
            None => JsonValue::Null,
        };
        let call = ToolCall::parse(tool, arguments)?;

        let config = UnifiConfig::from_env()?;
        let client = UnifiClient::new(&config)?;

        let result = tools::execute(&call, &client, &config.site).await;
        client.close().await;

        self.output_message(&result?);
        Ok(())
    }

    /// Check connection
    async fn check(&self) -> Result<()> {
        let config = UnifiConfig::from_env()?;
        let client = UnifiClient::new(&config)?;

        info!("Checking connection to {}", client.base_url());

        let status = match client.get(&site_path(&config.site, "stat/sysinfo")).await {
            Ok(_) => {
                let scheme = client.session().await.scheme();
                json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "SUCCEEDED",
                        "message": "Connection successful",
                        "login_scheme": scheme.map(|s| s.as_str()),
                        "site": config.site
                    }
                })
            }
            Err(e) => json!({
                "type": "CONNECTION_STATUS",
                "connectionStatus": {
                    "status": "FAILED",
                    "message": format!("Connection failed: {e}")
                }
            }),
        };

        client.close().await;
        self.output_message(&status);
        Ok(())
    }

    /// Print a JSON message on stdout
    fn output_message(&self, msg: &JsonValue) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
