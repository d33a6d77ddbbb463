//! askvl CLI - send a messages file to a DashScope vision model.
//!
//! Prints the model's reply on stdout. Logs and errors go to stderr.

#![allow(clippy::print_stdout)] // the reply is the program's output

use std::path::PathBuf;
use std::process::ExitCode;

use askvl::config::load_config_from;
use askvl::schema::event_report_format;
use askvl::{DashScope, FileConfig, Overrides, Result, Runner, Settings};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Ask a DashScope vision model about a list of chat messages.
#[derive(Debug, Parser)]
#[command(name = "askvl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "ASKVL_CONFIG")]
    config: Option<PathBuf>,

    /// Messages file (JSON, normally an array of chat messages) [default: messages.json]
    #[arg(short, long, env = "ASKVL_MESSAGES")]
    messages: Option<PathBuf>,

    /// Model identifier [default: qwen-vl-max]
    #[arg(long, env = "DASHSCOPE_MODEL")]
    model: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    #[arg(long, env = "DASHSCOPE_BASE_URL")]
    base_url: Option<String>,

    /// API key
    #[arg(long, env = "DASHSCOPE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Request timeout in seconds (no timeout by default)
    #[arg(long)]
    timeout: Option<u64>,

    /// Constrain the reply with the event-report JSON schema instead of
    /// plain JSON-object mode
    #[arg(long)]
    schema: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            messages: self.messages.clone(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            timeout_secs: self.timeout,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(reply) => {
            println!("{reply}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize stderr logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "askvl={level},{}",
            if verbosity >= 2 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2)
        .init();
}

/// Resolve settings, then run the single request.
async fn run(cli: Cli) -> Result<String> {
    let file = match &cli.config {
        Some(path) => load_config_from(path).await?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(file, cli.overrides());
    tracing::debug!(?settings, "resolved settings");

    let client = DashScope::new(settings.provider)?;
    let mut runner = Runner::new(client, settings.messages);
    if cli.schema {
        runner = runner.with_response_format(event_report_format());
    }

    runner.run().await
}
