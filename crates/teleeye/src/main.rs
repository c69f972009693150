// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TeleEye - a Telegram directory bot.
//!
//! This is the binary entry point.

mod serve;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// TeleEye - index Telegram groups by tag and search them.
#[derive(Parser, Debug)]
#[command(name = "teleeye", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bot.
    Serve,
    /// Search the local directory.
    Search {
        /// Whitespace-separated tags.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => teleeye_config::load_and_validate_path(path),
        None => teleeye_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            teleeye_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Search { query }) => serve::run_search(config, &query.join(" ")).await,
        Some(Commands::Config) => render_config(&config).map(|rendered| print!("{rendered}")),
        None => {
            println!("teleeye: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Renders the effective configuration as TOML, secrets masked.
fn render_config(
    config: &teleeye_config::TeleEyeConfig,
) -> Result<String, teleeye_core::TeleEyeError> {
    toml::to_string_pretty(config)
        .map_err(|e| teleeye_core::TeleEyeError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn search_joins_all_words() {
        let cli = Cli::parse_from(["teleeye", "search", "rust", "夜猫子"]);
        match cli.command {
            Some(Commands::Search { query }) => assert_eq!(query.join(" "), "rust 夜猫子"),
            other => panic!("expected search, got {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["teleeye", "serve", "--config", "/tmp/teleeye.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/teleeye.toml")));
        assert!(matches!(cli.command, Some(Commands::Serve)));
    }

    #[test]
    fn default_config_renders_as_toml() {
        let config = teleeye_config::load_and_validate_str("").expect("defaults are valid");
        let rendered = render_config(&config).unwrap();
        assert!(rendered.contains("[conversation]"));
        assert!(rendered.contains("ttl_secs = 300"));
        assert!(!rendered.contains("bot_token"));
    }

    #[test]
    fn rendered_config_masks_bot_token() {
        let mut config = teleeye_config::load_and_validate_str("").expect("defaults are valid");
        config.telegram.bot_token = Some("123456:SECRET".to_string());

        let rendered = render_config(&config).unwrap();
        assert!(!rendered.contains("123456:SECRET"));
        assert!(rendered.contains(r#"bot_token = "[REDACTED]""#));
    }
}
