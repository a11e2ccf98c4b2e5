//! Telegram delivery through the Bot API.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, Recipient};

use super::Notifier;
use crate::config::ChatTarget;
use crate::error::PollError;

pub struct TelegramNotifier {
    bot: Bot,
    chat: ChatTarget,
}

impl TelegramNotifier {
    pub fn new(token: &str, chat: ChatTarget) -> Self {
        Self { bot: Bot::new(token), chat }
    }
}

fn recipient(chat: &ChatTarget) -> Recipient {
    match chat {
        ChatTarget::Id(id) => Recipient::Id(ChatId(*id)),
        ChatTarget::Username(name) => Recipient::ChannelUsername(name.clone()),
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn channel_name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, text: &str) -> Result<(), PollError> {
        self.bot
            .send_message(recipient(&self.chat), text)
            .await
            .map(|_| ())
            .map_err(|e| PollError::Delivery(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_mapping() {
        assert_eq!(recipient(&ChatTarget::Id(-100)), Recipient::Id(ChatId(-100)));
        assert_eq!(
            recipient(&ChatTarget::Username("@reviews".into())),
            Recipient::ChannelUsername("@reviews".into())
        );
    }
}
