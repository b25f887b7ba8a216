//! Alert notifications for threshold crossings.
//!
//! [`TelegramNotifier`] posts a formatted Markdown message to a Telegram
//! chat through the Bot API. The pipeline depends on the
//! [`AlertNotifier`] trait so tests can substitute a recorder.

pub mod config;
pub mod message;
pub mod notifier;
pub mod telegram;

pub use config::TelegramConfig;
pub use notifier::AlertNotifier;
pub use telegram::{TelegramError, TelegramNotifier};
