use async_trait::async_trait;
use teloxide::{payloads::SendMessageSetters, prelude::*, types::ParseMode};
use tracing::debug;

use common::{Error, Notifier, Result};

/// Sends HTML-formatted messages to one chat through the Telegram Bot API.
///
/// No retries. The bot's HTTP client carries teloxide's default request
/// timeout.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: i64) -> Self {
        Self {
            bot: Bot::new(token),
            chat_id: ChatId(chat_id),
        }
    }

    /// Use a preconfigured bot, e.g. one pointed at a different API URL.
    pub fn with_bot(bot: Bot, chat_id: i64) -> Self {
        Self {
            bot,
            chat_id: ChatId(chat_id),
        }
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        self.bot
            .send_message(self.chat_id, message)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(|e| Error::Telegram(e.to_string()))?;
        debug!(chat_id = ?self.chat_id, "Telegram message delivered");
        Ok(())
    }
}
