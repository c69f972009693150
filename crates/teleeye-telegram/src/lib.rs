// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the TeleEye directory bot.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide:
//! long polling for messages, inline button presses and the bot's own
//! membership changes, inline keyboards on outbound messages, and handle
//! resolution through `getChat`.

pub mod handler;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, Recipient};
use teloxide::{ApiError, RequestError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use teleeye_config::model::TelegramConfig;
use teleeye_core::error::TeleEyeError;
use teleeye_core::traits::{ChannelAdapter, PluginAdapter};
use teleeye_core::types::{
    AdapterType, HealthStatus, InboundEvent, Keyboard, MessageId, OutboundMessage, ResolvedGroup,
};

const INBOUND_BUFFER: usize = 100;

/// Telegram channel adapter implementing [`ChannelAdapter`].
pub struct TelegramChannel {
    bot: Bot,
    config: TelegramConfig,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Creates a new Telegram channel adapter.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: TelegramConfig) -> Result<Self, TeleEyeError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            TeleEyeError::Config("telegram.bot_token is required for Telegram adapter".into())
        })?;

        if token.trim().is_empty() {
            return Err(TeleEyeError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_BUFFER);

        Ok(Self {
            bot,
            config,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }
}

fn channel_error(what: &str, e: RequestError) -> TeleEyeError {
    TeleEyeError::Channel {
        message: format!("failed to {what}: {e}"),
        source: Some(Box::new(e)),
    }
}

fn forward(tx: &mpsc::Sender<InboundEvent>, event: InboundEvent) {
    if tx.try_send(event).is_err() {
        warn!("inbound channel full or closed, dropping event");
    }
}

fn to_markup(keyboard: Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.into_iter().map(|row| {
        row.into_iter()
            .map(|button| InlineKeyboardButton::callback(button.label, button.data))
            .collect::<Vec<_>>()
    }))
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, TeleEyeError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), TeleEyeError> {
        debug!("Telegram channel shutting down");
        if let Some(handle) = &self.polling_handle {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), TeleEyeError> {
        if self.polling_handle.is_some() {
            return Ok(());
        }

        let bot = self.bot.clone();
        let private_only = self.config.private_only;
        let messages_tx = self.inbound_tx.clone();
        let callbacks_tx = self.inbound_tx.clone();
        let members_tx = self.inbound_tx.clone();

        info!(private_only, "starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = dptree::entry()
                .branch(Update::filter_message().endpoint(move |msg: Message| {
                    let tx = messages_tx.clone();
                    async move {
                        if private_only && !handler::is_private(&msg) {
                            debug!(chat_id = msg.chat.id.0, "ignoring non-private message");
                        } else if let Some(event) = handler::message_event(&msg) {
                            forward(&tx, event);
                        } else {
                            debug!(msg_id = msg.id.0, "ignoring unsupported message type");
                        }
                        respond(())
                    }
                }))
                .branch(Update::filter_callback_query().endpoint(
                    move |bot: Bot, query: CallbackQuery| {
                        let tx = callbacks_tx.clone();
                        async move {
                            if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
                                debug!(error = %e, "failed to answer callback query");
                            }
                            if let Some(event) = handler::callback_event(&query) {
                                forward(&tx, event);
                            }
                            respond(())
                        }
                    },
                ))
                .branch(Update::filter_my_chat_member().endpoint(
                    move |update: ChatMemberUpdated| {
                        let tx = members_tx.clone();
                        async move {
                            if let Some(event) = handler::membership_event(&update) {
                                forward(&tx, event);
                            }
                            respond(())
                        }
                    },
                ));

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, TeleEyeError> {
        let request = self.bot.send_message(ChatId(msg.chat_id), msg.text);
        let sent = match msg.keyboard {
            Some(keyboard) => request.reply_markup(to_markup(keyboard)).await,
            None => request.await,
        }
        .map_err(|e| channel_error("send message", e))?;

        Ok(MessageId(sent.id.0.to_string()))
    }

    async fn receive(&self) -> Result<InboundEvent, TeleEyeError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| TeleEyeError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }

    async fn resolve_group(&self, handle: &str) -> Result<ResolvedGroup, TeleEyeError> {
        let not_found = || TeleEyeError::GroupNotFound {
            handle: handle.to_string(),
        };
        let recipient = Recipient::ChannelUsername(format!("@{handle}"));

        let chat = match self.bot.get_chat(recipient.clone()).await {
            Ok(chat) => chat,
            Err(RequestError::Api(ApiError::ChatNotFound)) => return Err(not_found()),
            Err(e) => return Err(channel_error("resolve group", e)),
        };
        if chat.is_private() {
            return Err(not_found());
        }

        let member_count = self
            .bot
            .get_chat_member_count(recipient)
            .await
            .map_err(|e| channel_error("count members", e))?;

        Ok(ResolvedGroup {
            chat_id: chat.id.0,
            handle: chat.username().unwrap_or(handle).to_string(),
            title: chat.title().unwrap_or_default().to_string(),
            kind: handler::group_kind(chat.is_private(), chat.is_group(), chat.is_channel()),
            description: chat.description().unwrap_or_default().to_string(),
            member_count,
        })
    }
}
