//! Telegram transport using teloxide.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, ParseMode};
use tracing::warn;

use crate::chatbot::transport::{MenuOption, Transport};

/// Telegram implementation of the outbound send capability.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramClient {
    async fn send_text(&self, contact_id: i64, text: &str) -> Result<(), String> {
        self.bot
            .send_message(ChatId(contact_id), text)
            .parse_mode(ParseMode::Html)
            .await
            .map(|_| ())
            .map_err(|e| {
                let msg = format!("Failed to send: {e}");
                warn!("{}", msg);
                msg
            })
    }

    /// Menus are one-time resized reply keyboards, one option per row.
    async fn send_menu(
        &self,
        contact_id: i64,
        body: &str,
        options: &[MenuOption],
    ) -> Result<(), String> {
        let rows: Vec<Vec<KeyboardButton>> = options
            .iter()
            .map(|option| vec![KeyboardButton::new(option.title)])
            .collect();
        let keyboard = KeyboardMarkup::new(rows)
            .one_time_keyboard()
            .resize_keyboard();

        self.bot
            .send_message(ChatId(contact_id), body)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await
            .map(|_| ())
            .map_err(|e| {
                let msg = format!("Failed to send menu: {e}");
                warn!("{}", msg);
                msg
            })
    }
}
