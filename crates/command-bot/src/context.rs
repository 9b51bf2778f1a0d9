//! Builds dispatch origins from Signal messages.

use command_core::{ContextAssembler, MessageOrigin, MessageRef, QuotedMessage};
use signal_client::BotMessage;

/// Maps a [`BotMessage`] to the origin the dispatcher works with.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalContextAssembler;

impl ContextAssembler<BotMessage> for SignalContextAssembler {
    fn assemble(&self, message: &BotMessage) -> MessageOrigin {
        MessageOrigin {
            invoker_id: message.source.clone(),
            invoker_name: message.source_name.clone().filter(|n| !n.trim().is_empty()),
            destination: message.reply_target().to_string(),
            message: MessageRef {
                author: message.source.clone(),
                id: message.timestamp,
            },
            quoted: message.quote.as_ref().map(|q| QuotedMessage {
                author: q.author.clone(),
                id: q.id,
                text: q.text.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_client::QuotedText;

    fn message(group_id: Option<&str>) -> BotMessage {
        BotMessage {
            source: "+14155551234".into(),
            source_name: Some("Ann".into()),
            text: "!getpp".into(),
            timestamp: 1677652288000,
            is_group: group_id.is_some(),
            group_id: group_id.map(String::from),
            receiving_account: "+15555555555".into(),
            quote: Some(QuotedText {
                id: 1677652200000,
                author: "+14155559999".into(),
                text: None,
            }),
        }
    }

    #[test]
    fn test_direct_message_origin() {
        let origin = SignalContextAssembler.assemble(&message(None));

        assert_eq!(origin.invoker_id, "+14155551234");
        assert_eq!(origin.invoker_name.as_deref(), Some("Ann"));
        assert_eq!(origin.destination, "+14155551234");
        assert_eq!(origin.message.id, 1677652288000);
        assert_eq!(origin.quoted.unwrap().author, "+14155559999");
    }

    #[test]
    fn test_group_message_replies_to_group() {
        let origin = SignalContextAssembler.assemble(&message(Some("group.abc")));

        assert_eq!(origin.destination, "group.abc");
        assert_eq!(origin.message.author, "+14155551234");
    }
}
