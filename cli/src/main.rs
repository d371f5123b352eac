// Pokerbench CLI - Command Line Interface Entry Point

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use pokerbench_config::{BenchConfig, ConfigLoader, parse_override};
use pokerbench_core::BenchmarkRunner;
use tracing::info;

/// Plays N hands against the hands API and reports throughput
#[derive(Parser, Debug)]
#[command(name = "pokerbench")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config_overrides: CliConfigOverrides,

    /// User API key for the researcher API
    #[arg(long = "api-key", env = "POKERBENCH_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Strategy to play with: allin or checkcall [default: allin]
    #[arg(short = 'a', long = "agent")]
    agent: Option<String>,

    /// Total hands to be played [default: 1000]
    #[arg(short = 'n', long = "hands", visible_alias = "num-hands")]
    hands: Option<usize>,

    /// Hands allowed in flight at once [default: 5]
    #[arg(long = "concurrency")]
    concurrency: Option<usize>,

    /// Game configuration used for new hands
    #[arg(long = "game-name")]
    game_name: Option<String>,

    /// Base address of the hands API
    #[arg(long = "base-url")]
    base_url: Option<String>,

    /// Fail a hand after this many actions
    #[arg(long = "max-turns")]
    max_turns: Option<u32>,

    /// Fail a hand after this many seconds
    #[arg(long = "hand-timeout", value_name = "SECS")]
    hand_timeout: Option<u64>,

    /// Additional config file, applied after the global and project files
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
}

/// CLI configuration overrides
#[derive(Debug, clap::Args)]
struct CliConfigOverrides {
    /// Configuration override in key=value format
    #[arg(short = 'c', long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,
}

impl Cli {
    /// Load layered configuration, then apply the dedicated flags on top.
    fn load_config(&self, loader: ConfigLoader) -> Result<BenchConfig> {
        let overrides = self
            .config_overrides
            .overrides
            .iter()
            .map(String::as_str)
            .map(parse_override)
            .collect::<Result<Vec<_>, _>>()?;

        let loader = match &self.config {
            Some(path) => loader.with_config_file(path.clone()),
            None => loader,
        };
        let mut config = loader.load_with_cli_overrides(overrides)?;

        if let Some(agent) = &self.agent {
            config.run.strategy = agent.clone();
        }
        if let Some(hands) = self.hands {
            config.run.num_hands = hands;
        }
        if let Some(concurrency) = self.concurrency {
            config.run.max_concurrent_hands = concurrency;
        }
        if let Some(game_name) = &self.game_name {
            config.run.game_name = game_name.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }
        if self.max_turns.is_some() {
            config.run.max_turns = self.max_turns;
        }
        if self.hand_timeout.is_some() {
            config.run.hand_timeout_secs = self.hand_timeout;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info".to_string())
                .as_str(),
        )
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Ok(dir) = std::env::current_dir() {
        loader = loader.with_project_dir(dir);
    }
    let config = cli.load_config(loader)?;

    // Unknown strategies are rejected here, before any connection is opened
    let cancel = pokerbench_cancel::cancel_token();
    let runner =
        BenchmarkRunner::from_config(&config, &cli.api_key)?.with_cancellation(cancel.clone());
    let ctrl_c = pokerbench_cancel::cancel_on_ctrl_c(cancel.clone());

    info!(
        concurrency = config.run.max_concurrent_hands,
        base_url = %config.api.base_url,
        "Pokerbench starting..."
    );
    runner.run(config.run.num_hands).await;

    // Release the Ctrl-C listener
    cancel.cancel();
    let _ = ctrl_c.await;
    Ok(())
}
