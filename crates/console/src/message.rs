//! Envelope for traffic arriving in the host's message inbox.

use serde_json::Value;

/// Prefix marking a text message as console output.
pub const CONSOLE_TAG: &str = "__IDE_CONSOLE__";

/// A message posted into the host inbox.
///
/// The inbox is shared with unrelated traffic, so not every message is
/// console output.
#[derive(Clone, Debug, PartialEq)]
pub enum HostMessage {
    /// A plain string payload.
    Text(String),
    /// Any structured (non-string) payload.
    Structured(Value),
}

impl HostMessage {
    /// Build a tagged console message.
    #[inline]
    pub fn console(payload: &str) -> Self {
        Self::Text(tag_console_text(payload))
    }
}

impl From<String> for HostMessage {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for HostMessage {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Value> for HostMessage {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

/// Prefix `payload` with the console tag.
#[inline]
pub fn tag_console_text(payload: &str) -> String {
    let mut text = String::with_capacity(CONSOLE_TAG.len() + payload.len());
    text.push_str(CONSOLE_TAG);
    text.push_str(payload);
    text
}

/// The console payload carried by `message`, if it is tagged text.
///
/// No origin check is made: any text with the tag is accepted.
#[inline]
pub fn console_payload(message: &HostMessage) -> Option<&str> {
    match message {
        HostMessage::Text(text) => text.strip_prefix(CONSOLE_TAG),
        HostMessage::Structured(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tagged_text_yields_payload() {
        let message = HostMessage::from("__IDE_CONSOLE__hello");
        assert_eq!(console_payload(&message), Some("hello"));
        assert_eq!(console_payload(&HostMessage::console("")), Some(""));
    }

    #[test]
    fn untagged_and_structured_messages_are_ignored() {
        assert_eq!(console_payload(&HostMessage::from("unrelated")), None);
        assert_eq!(console_payload(&HostMessage::from("x__IDE_CONSOLE__y")), None);
        let structured = HostMessage::from(json!({ "type": "__IDE_CONSOLE__" }));
        assert_eq!(console_payload(&structured), None);
    }

    #[test]
    fn only_the_leading_tag_is_removed() {
        let message = HostMessage::console("__IDE_CONSOLE__twice");
        assert_eq!(console_payload(&message), Some("__IDE_CONSOLE__twice"));
    }
}
