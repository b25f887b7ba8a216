//! Telegram bot settings.

/// Public Bot API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Credentials and endpoint for the Telegram Bot API.
///
/// An empty token or chat id disables delivery without failing.
#[derive(Debug, Clone, Default)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    /// Base URL without trailing slash; overridden in tests.
    pub api_base: String,
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable             | Default                    |
    /// |----------------------|----------------------------|
    /// | `TELEGRAM_BOT_TOKEN` | empty (disabled)           |
    /// | `TELEGRAM_CHAT_ID`   | empty (disabled)           |
    /// | `TELEGRAM_API_BASE`  | `https://api.telegram.org` |
    pub fn from_env() -> Self {
        let api_base = std::env::var("TELEGRAM_API_BASE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Self {
            bot_token: std::env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
            chat_id: std::env::var("TELEGRAM_CHAT_ID").unwrap_or_default(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Both the token and the chat id are set.
    pub fn is_configured(&self) -> bool {
        !self.bot_token.trim().is_empty() && !self.chat_id.trim().is_empty()
    }

    /// `sendMessage` endpoint for this bot.
    pub fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}
