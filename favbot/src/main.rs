//! favbot - search a social platform and favorite matching posts

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use libfavbot::config::DEFAULT_CONFIG_PATH;
use libfavbot::logging::{LogFormat, LoggingConfig};
use libfavbot::platforms::mastodon::MastodonApi;
use libfavbot::{Config, FavbotError, FavoriteBot, SleepCoordinator};
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "favbot")]
#[command(version, about = "Search a social platform and favorite matching posts")]
#[command(long_about = r#"Search a social platform for the configured terms and favorite matching posts.

Requests are paced by `request_interval` seconds. When the platform answers
"too many requests", favbot sleeps for `request_window` seconds and retries once.

EXAMPLES:
    # Use ./config.json
    favbot

    # Use another configuration file
    favbot --config ~/.config/favbot/config.json

    # Also list followers and the home timeline after the run
    favbot --show-followers --show-timeline

EXIT CODES:
    0 - Success
    1 - Error (configuration missing or invalid, authentication failed, etc.)
"#)]
struct Cli {
    /// Path to JSON configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, value_name = "PATH")]
    config: PathBuf,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,

    /// Log output format (text or pretty)
    #[arg(long, default_value = "text", env = "FAVBOT_LOG_FORMAT")]
    log_format: LogFormat,

    /// List followers after the run
    #[arg(long)]
    show_followers: bool,

    /// List the home timeline after the run
    #[arg(long)]
    show_timeline: bool,
}

fn main() {
    let cli = Cli::parse();

    LoggingConfig::new(cli.log_format, "info".to_string(), cli.verbose).init();

    if let Err(e) = run(&cli) {
        let code = e
            .downcast_ref::<FavbotError>()
            .map(FavbotError::exit_code)
            .unwrap_or(1);
        error!("{:#}", e);
        std::process::exit(code);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    tracing::info!("Loading configurations from {}", cli.config.display());
    let config = Config::load_from_path(&cli.config)?;

    let api = MastodonApi::from_config(&config).context("Failed to set up platform client")?;
    let pacer = SleepCoordinator::new(config.rate_limit());
    let mut bot = FavoriteBot::new(api, pacer);

    bot.run(&config)?;

    if cli.show_followers {
        bot.followers(None, true);
    }
    if cli.show_timeline {
        bot.home_timeline(config.search_limit(), true);
    }

    Ok(())
}
