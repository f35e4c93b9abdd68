//! Telegram delivery of user-facing events.
//!
//! Uses teloxide `Bot` directly (send-only, no dispatcher). Each event
//! becomes one HTML message titled with the configured prefix and the
//! service name.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{debug, info, warn};

use super::{Event, EventKind, EventPriority, Notifier};

/// Marker prepended to the title of high-priority events.
const ATTENTION_SYMBOL: &str = "\u{1f6a8}";

/// Sends events to a single Telegram chat.
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: i64,
    title_prefix: String,
}

impl TelegramNotifier {
    /// Create a notifier for `chat_id` using the given bot token.
    pub fn new(bot_token: &str, chat_id: i64, title_prefix: String) -> Self {
        info!(chat_id, "initializing Telegram notifier");
        Self {
            bot: Bot::new(bot_token),
            chat_id,
            title_prefix,
        }
    }

    /// Chat the notifier delivers to.
    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    /// Render the HTML body for an event.
    pub fn format_message(&self, event: &Event) -> String {
        format_event_text(&self.title_prefix, event)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send_events_to_user(&self, events: &[Event]) -> bool {
        let mut errors = false;
        for event in events.iter().filter(|e| e.kind == EventKind::User) {
            let text = self.format_message(event);
            match self
                .bot
                .send_message(ChatId(self.chat_id), text)
                .parse_mode(ParseMode::Html)
                .disable_notification(is_silent(event.priority))
                .await
            {
                Ok(_) => debug!(service = %event.service, "event sent to Telegram"),
                Err(e) => {
                    warn!(chat_id = self.chat_id, error = %e, "problem sending event to user");
                    errors = true;
                }
            }
        }
        errors
    }
}

/// Build `<b>{symbol} {prefix} {SERVICE}</b>\n{message}` with HTML escaping.
pub fn format_event_text(title_prefix: &str, event: &Event) -> String {
    format!(
        "<b>{symbol} {prefix} {service}</b>\n{message}",
        symbol = priority_symbol(event.priority),
        prefix = html_escape(title_prefix),
        service = event.service.label(),
        message = html_escape(&event.message),
    )
}

/// Title marker for a priority; only high priority gets one.
pub fn priority_symbol(priority: EventPriority) -> &'static str {
    if priority == EventPriority::High {
        ATTENTION_SYMBOL
    } else {
        ""
    }
}

/// Whether the recipient's device should stay quiet for this priority.
pub fn is_silent(priority: EventPriority) -> bool {
    priority == EventPriority::Low
}

/// Escape HTML special characters for Telegram.
fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
