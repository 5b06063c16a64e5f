use serde_json::{json, Value};

/// WhatsApp caps interactive button messages at three buttons.
pub const MAX_BUTTONS: usize = 3;
/// WhatsApp caps list messages at ten rows per section.
pub const MAX_LIST_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One selectable option: the id comes back verbatim in the reply event.
pub struct ReplyOption {
    pub id: String,
    pub title: String,
}

impl ReplyOption {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The closed set of reply shapes the dialogue can produce. Presentation
/// only; never persisted.
pub enum OutboundPayload {
    Text {
        body: String,
    },
    Buttons {
        body: String,
        buttons: Vec<ReplyOption>,
    },
    List {
        header: String,
        body: String,
        button: String,
        section_title: String,
        rows: Vec<ReplyOption>,
    },
}

impl OutboundPayload {
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text { body: body.into() }
    }

    /// Builds a button message, truncating to the platform cap of
    /// [`MAX_BUTTONS`].
    pub fn buttons(body: impl Into<String>, mut buttons: Vec<ReplyOption>) -> Self {
        buttons.truncate(MAX_BUTTONS);
        Self::Buttons {
            body: body.into(),
            buttons,
        }
    }

    /// Builds a single-section list message, truncating to the platform cap
    /// of [`MAX_LIST_ROWS`].
    pub fn list(
        header: impl Into<String>,
        body: impl Into<String>,
        button: impl Into<String>,
        section_title: impl Into<String>,
        mut rows: Vec<ReplyOption>,
    ) -> Self {
        rows.truncate(MAX_LIST_ROWS);
        Self::List {
            header: header.into(),
            body: body.into(),
            button: button.into(),
            section_title: section_title.into(),
            rows,
        }
    }

    /// Renders the Cloud API request body for `recipient`.
    pub fn to_request_body(&self, recipient: &str) -> Value {
        match self {
            Self::Text { body } => json!({
                "messaging_product": "whatsapp",
                "to": recipient,
                "type": "text",
                "text": {"body": body},
            }),
            Self::Buttons { body, buttons } => {
                let buttons = buttons
                    .iter()
                    .map(|option| {
                        json!({
                            "type": "reply",
                            "reply": {"id": option.id, "title": option.title},
                        })
                    })
                    .collect::<Vec<_>>();
                json!({
                    "messaging_product": "whatsapp",
                    "to": recipient,
                    "type": "interactive",
                    "interactive": {
                        "type": "button",
                        "body": {"text": body},
                        "action": {"buttons": buttons},
                    },
                })
            }
            Self::List {
                header,
                body,
                button,
                section_title,
                rows,
            } => {
                let rows = rows
                    .iter()
                    .map(|option| json!({"id": option.id, "title": option.title}))
                    .collect::<Vec<_>>();
                json!({
                    "messaging_product": "whatsapp",
                    "to": recipient,
                    "type": "interactive",
                    "interactive": {
                        "type": "list",
                        "header": {"type": "text", "text": header},
                        "body": {"text": body},
                        "action": {
                            "button": button,
                            "sections": [{"title": section_title, "rows": rows}],
                        },
                    },
                })
            }
        }
    }
}
