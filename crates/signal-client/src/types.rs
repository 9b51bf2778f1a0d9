//! Signal API types.

use serde::{Deserialize, Serialize};

/// Incoming Signal message.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub envelope: Envelope,
    pub account: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub source: String,
    #[serde(rename = "sourceNumber")]
    pub source_number: Option<String>,
    #[serde(rename = "sourceUuid", default)]
    pub source_uuid: Option<String>,
    #[serde(rename = "sourceName")]
    pub source_name: Option<String>,
    pub timestamp: i64,
    #[serde(rename = "dataMessage")]
    pub data_message: Option<DataMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataMessage {
    pub message: Option<String>,
    pub timestamp: i64,
    #[serde(rename = "groupInfo")]
    pub group_info: Option<GroupInfo>,
    #[serde(default)]
    pub quote: Option<Quote>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupInfo {
    #[serde(rename = "groupId")]
    pub group_id: String,
}

/// Message a data message replied to.
#[derive(Debug, Clone, Deserialize)]
pub struct Quote {
    pub id: i64,
    pub author: Option<String>,
    #[serde(rename = "authorNumber")]
    pub author_number: Option<String>,
    #[serde(rename = "authorUuid")]
    pub author_uuid: Option<String>,
    pub text: Option<String>,
}

/// Outgoing message request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SendMessageRequest {
    pub message: String,
    pub number: Option<String>,
    pub recipients: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub base64_attachments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_author: Option<String>,
}

/// Send message response.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageResponse {
    pub timestamp: Option<SignalTimestamp>,
}

/// signal-cli-rest-api reports timestamps either as numbers or strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub struct SignalTimestamp(pub i64);

impl TryFrom<serde_json::Value> for SignalTimestamp {
    type Error = String;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match &value {
            serde_json::Value::Number(n) => n.as_i64().map(Self),
            serde_json::Value::String(s) => s.parse().ok().map(Self),
            _ => None,
        }
        .ok_or_else(|| format!("invalid timestamp: {}", value))
    }
}

/// Reaction request.
#[derive(Debug, Clone, Serialize)]
pub struct ReactionRequest {
    pub reaction: String,
    pub recipient: String,
    pub target_author: String,
    pub timestamp: i64,
}

/// Remote delete request.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteDeleteRequest {
    pub recipient: String,
    pub timestamp: i64,
}

/// Quote data carried on a [`BotMessage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedText {
    pub id: i64,
    pub author: String,
    pub text: Option<String>,
}

/// Parsed message for bot processing.
#[derive(Debug, Clone)]
pub struct BotMessage {
    /// The identity that sent the message.
    pub source: String,
    /// Sender profile name, if shared.
    pub source_name: Option<String>,
    /// The message text.
    pub text: String,
    /// Message timestamp.
    pub timestamp: i64,
    /// Whether this is a group message.
    pub is_group: bool,
    /// Group ID if this is a group message.
    pub group_id: Option<String>,
    /// The bot's number that received this message.
    pub receiving_account: String,
    /// Message this one replied to.
    pub quote: Option<QuotedText>,
}

impl BotMessage {
    /// Extract bot message from incoming envelope.
    pub fn from_incoming(msg: &IncomingMessage) -> Option<Self> {
        let data = msg.envelope.data_message.as_ref()?;
        let text = data.message.clone()?;

        let quote = data.quote.as_ref().and_then(|q| {
            let author = q
                .author_number
                .clone()
                .or_else(|| q.author.clone())
                .or_else(|| q.author_uuid.clone())?;
            Some(QuotedText {
                id: q.id,
                author,
                text: q.text.clone(),
            })
        });

        Some(Self {
            source: msg.envelope.source.clone(),
            source_name: msg.envelope.source_name.clone(),
            text,
            timestamp: msg.envelope.timestamp,
            is_group: data.group_info.is_some(),
            group_id: data.group_info.as_ref().map(|g| g.group_id.clone()),
            receiving_account: msg.account.clone(),
            quote,
        })
    }

    /// Get the reply target (group ID or source number).
    pub fn reply_target(&self) -> &str {
        self.group_id.as_deref().unwrap_or(&self.source)
    }
}
