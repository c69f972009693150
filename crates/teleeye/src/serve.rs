// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `teleeye serve` and `teleeye search`.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use teleeye_agent::shutdown::install_signal_handler;
use teleeye_agent::{AgentLoop, Dispatcher, DispatcherDeps};
use teleeye_config::TeleEyeConfig;
use teleeye_core::{ChannelAdapter, PluginAdapter, TeleEyeError};
use teleeye_directory::{KeywordExtractor, Language, SearchRanker, TextCatalog, Validators};
use teleeye_storage::SqliteStorage;
use teleeye_telegram::TelegramChannel;

const PURGE_INTERVAL: Duration = Duration::from_secs(600);

/// Runs the bot until SIGINT or SIGTERM.
pub async fn run_serve(config: TeleEyeConfig) -> Result<(), TeleEyeError> {
    init_tracing(&config.bot.log_level);

    info!(name = config.bot.name.as_str(), "starting teleeye serve");

    let storage = Arc::new(open_storage(&config).await?);

    let mut telegram = TelegramChannel::new(config.telegram.clone())?;
    telegram.connect().await?;
    let channel: Arc<dyn ChannelAdapter> = Arc::new(telegram);

    let extractor = Arc::new(KeywordExtractor::new(
        Validators::new(),
        config.conversation.max_auto_tags,
    ));
    let dispatcher = Dispatcher::new(
        &config,
        DispatcherDeps {
            channel: Arc::clone(&channel),
            state: storage.clone(),
            records: storage.clone(),
            extractor,
        },
    )?;

    let cancel = install_signal_handler();
    let purge = tokio::spawn(purge_expired(Arc::clone(&storage), cancel.clone()));

    let agent = AgentLoop::new(Arc::clone(&channel), Arc::new(dispatcher));
    let result = agent.run(cancel.clone()).await;

    cancel.cancel();
    if let Err(e) = purge.await {
        warn!(error = %e, "purge task failed");
    }
    channel.shutdown().await?;
    storage.shutdown().await?;

    info!("teleeye stopped");
    result
}

/// Runs one ranked search against the local database and prints the results.
pub async fn run_search(config: TeleEyeConfig, query: &str) -> Result<(), TeleEyeError> {
    let storage = Arc::new(open_storage(&config).await?);
    let ranker = SearchRanker::new(
        storage.clone(),
        Arc::new(Validators::new()),
        config.search.max_results,
    );
    let language: Language = config
        .bot
        .default_language
        .parse()
        .map_err(|_| TeleEyeError::Config("unsupported default language".into()))?;

    let results = ranker.search(query).await?;
    println!(
        "{}",
        TextCatalog::new(language).search_results(language, query, &results)
    );
    storage.shutdown().await
}

async fn open_storage(config: &TeleEyeConfig) -> Result<SqliteStorage, TeleEyeError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(storage)
}

/// Deletes expired conversations that were never read again.
async fn purge_expired(storage: Arc<SqliteStorage>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(PURGE_INTERVAL);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                match storage.purge_expired_conversations().await {
                    Ok(0) => {}
                    Ok(count) => debug!(count, "purged expired conversations"),
                    Err(e) => warn!(error = %e, "failed to purge expired conversations"),
                }
            }
            _ = cancel.cancelled() => break,
        }
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("teleeye={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
