//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// UniFi controller bridge for the Model Context Protocol
#[derive(Parser, Debug)]
#[command(name = "unifi-mcp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Environment file to load before reading UNIFI_* settings
    #[arg(short, long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Output format for one-shot commands
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Log filter: `RUST_LOG` when set and valid, else `info` (`debug` with `--verbose`)
    pub fn log_filter(&self, rust_log: Option<&str>) -> EnvFilter {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };
        rust_log
            .filter(|directives| !directives.trim().is_empty())
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(level.as_str()))
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the MCP server on stdin/stdout
    Serve,

    /// Print the tool declarations
    Tools,

    /// Run one tool and print its result
    Call {
        /// Tool name, e.g. `list_devices`
        tool: String,

        /// Inline arguments JSON
        #[arg(long)]
        args: Option<String>,
    },

    /// Log in to the controller, report the login scheme, log out
    Check,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_is_default() {
        let cli = Cli::try_parse_from(["unifi-mcp"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.format, OutputFormat::Pretty);
    }

    #[test]
    fn test_call_with_args() {
        let cli = Cli::try_parse_from([
            "unifi-mcp",
            "call",
            "list_devices",
            "--args",
            r#"{"site_name":"branch"}"#,
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Some(Commands::Call { tool, args }) => {
                assert_eq!(tool, "list_devices");
                assert_eq!(args.as_deref(), Some(r#"{"site_name":"branch"}"#));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_log_filter_prefers_rust_log() {
        use tracing::level_filters::LevelFilter;

        let quiet = Cli::try_parse_from(["unifi-mcp"]).unwrap();
        assert_eq!(quiet.log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            quiet.log_filter(Some("warn")).max_level_hint(),
            Some(LevelFilter::WARN)
        );

        let verbose = Cli::try_parse_from(["unifi-mcp", "-v"]).unwrap();
        assert_eq!(verbose.log_filter(None).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(
            verbose.log_filter(Some("error")).max_level_hint(),
            Some(LevelFilter::ERROR)
        );
    }

    #[test]
    fn test_global_env_file() {
        let cli = Cli::try_parse_from(["unifi-mcp", "check", "--env-file", "prod.env"]).unwrap();
        assert_eq!(cli.env_file, Some(PathBuf::from("prod.env")));
        assert!(matches!(cli.command, Some(Commands::Check)));
    }
}
