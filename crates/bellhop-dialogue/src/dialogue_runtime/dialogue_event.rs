//! Total extraction of the triggering input from a webhook event body.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
struct WebhookEnvelope {
    #[serde(default)]
    entry: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WebhookEntry {
    #[serde(default)]
    changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WebhookChange {
    #[serde(default)]
    value: WebhookChangeValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WebhookChangeValue {
    #[serde(default)]
    messages: Vec<WebhookMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WebhookMessage {
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    interactive: Option<InteractivePayload>,
    /// Older payloads carried the button reply at the message top level.
    #[serde(default)]
    button_reply: Option<ReplySelection>,
    #[serde(default)]
    text: Option<TextPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct InteractivePayload {
    #[serde(default)]
    button_reply: Option<ReplySelection>,
    #[serde(default)]
    list_reply: Option<ReplySelection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ReplySelection {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TextPayload {
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The closed set of inbound shapes the dialogue reacts to. `Empty` means no
/// addressable message was present at all; the other variants carry the
/// normalized (lower-cased, trimmed) triggering input.
pub enum InboundMessage {
    Empty,
    Text { sender: String, input: String },
    ButtonReply { sender: String, input: String },
    ListReply { sender: String, input: String },
}

impl InboundMessage {
    pub fn sender(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Text { sender, .. }
            | Self::ButtonReply { sender, .. }
            | Self::ListReply { sender, .. } => Some(sender),
        }
    }

    pub fn input(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::Text { input, .. }
            | Self::ButtonReply { input, .. }
            | Self::ListReply { input, .. } => input,
        }
    }
}

fn normalize_input(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Extracts the first message of the first change of the first entry, never
/// raising on missing or oddly-typed fields. Precedence when several reply
/// shapes coexist: button reply, then list reply, then text body. A message
/// with a sender but no recognized shape yields an empty input, which every
/// step treats as unrecognized.
pub fn extract_inbound_message(body: &Value) -> InboundMessage {
    let envelope = serde_json::from_value::<WebhookEnvelope>(body.clone()).unwrap_or_default();
    let Some(message) = envelope
        .entry
        .first()
        .and_then(|entry| entry.changes.first())
        .and_then(|change| change.value.messages.first())
    else {
        return InboundMessage::Empty;
    };

    let Some(sender) = message
        .from
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
    else {
        return InboundMessage::Empty;
    };

    let button_id = message
        .interactive
        .as_ref()
        .and_then(|interactive| interactive.button_reply.as_ref())
        .or(message.button_reply.as_ref())
        .and_then(|reply| reply.id.as_deref());
    if let Some(id) = button_id {
        return InboundMessage::ButtonReply {
            sender,
            input: normalize_input(id),
        };
    }

    let list_id = message
        .interactive
        .as_ref()
        .and_then(|interactive| interactive.list_reply.as_ref())
        .and_then(|reply| reply.id.as_deref());
    if let Some(id) = list_id {
        return InboundMessage::ListReply {
            sender,
            input: normalize_input(id),
        };
    }

    let body_text = message
        .text
        .as_ref()
        .and_then(|text| text.body.as_deref())
        .unwrap_or("");
    InboundMessage::Text {
        sender,
        input: normalize_input(body_text),
    }
}
