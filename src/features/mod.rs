pub mod chat;

/// One inline button descriptor; the transport renders these as an inline
/// keyboard and returns the `callback_id` when pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineControl {
    pub label: String,
    pub callback_id: String,
}

impl InlineControl {
    pub fn new(label: impl Into<String>, callback_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_id: callback_id.into(),
        }
    }
}

/// Outgoing chat payload: the boundary between features and the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingPayload {
    pub text: String,
    pub controls: Vec<InlineControl>,
}

impl OutgoingPayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            controls: Vec::new(),
        }
    }

    pub fn with_controls(text: impl Into<String>, controls: Vec<InlineControl>) -> Self {
        Self {
            text: text.into(),
            controls,
        }
    }
}
