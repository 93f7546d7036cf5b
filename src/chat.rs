//! Flatten OpenAI-style chat messages to one string of content per message.
//!
//! `content` may be a string, or an array of parts where each part may carry
//! a `text` field. Part texts are joined with `\n`; parts without text
//! (images, audio, …) are skipped.
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::error::{ChatError, json_kind};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// `None` only when the key is absent; an explicit `null` is `Other`.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
    /// Anything else; rejected by [`normalize`].
    Other(Value),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A message ready for the native chat formatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn text(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            content: Some(MessageContent::Text(content.into())),
        }
    }

    pub fn parts<I, S>(role: impl Into<String>, texts: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let parts = texts
            .into_iter()
            .map(|text| ContentPart { text: text.map(Into::into) })
            .collect();
        Self {
            role: Some(role.into()),
            content: Some(MessageContent::Parts(parts)),
        }
    }
}

fn present<'de, D>(de: D) -> Result<Option<MessageContent>, D::Error>
where
    D: Deserializer<'de>,
{
    MessageContent::deserialize(de).map(Some)
}

// ------------------------------- Normalize -------------------------------- //

/// Flatten each message's content, keeping its role (`""` when absent).
///
/// Parts are strict: a part that is not an object, or whose `text` is
/// neither a string nor `null` (`{"text": 5}`), is not coerced to a string.
/// The whole message is rejected with [`ChatError::InvalidContentType`].
pub fn normalize(messages: &[ChatMessage]) -> Result<Vec<FormattedChatMessage>, ChatError> {
    messages
        .iter()
        .enumerate()
        .map(|(index, message)| {
            let content = match &message.content {
                None => return Err(ChatError::MissingContent { index }),
                Some(MessageContent::Text(text)) => text.clone(),
                Some(MessageContent::Parts(parts)) => parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("\n"),
                Some(MessageContent::Other(value)) => {
                    let found = match value {
                        // an array only lands here when some part is not `{text?: string}`
                        Value::Array(_) => "array with non-text parts",
                        other => json_kind(other),
                    };
                    return Err(ChatError::InvalidContentType { index, found });
                }
            };
            trace!(index, len = content.len(), "flattened chat message");
            Ok(FormattedChatMessage {
                role: message.role.clone().unwrap_or_default(),
                content,
            })
        })
        .collect()
}

/// Decode a JSON array of messages, then [`normalize`] it.
pub fn normalize_value(messages: Value) -> Result<Vec<FormattedChatMessage>, ChatError> {
    let messages: Vec<ChatMessage> = crate::path_de::from_value_with_path(messages)
        .map_err(|e| ChatError::Decode(e.to_string()))?;
    normalize(&messages)
}

pub fn normalize_str(src: &str) -> Result<Vec<FormattedChatMessage>, ChatError> {
    let messages: Vec<ChatMessage> = crate::path_de::from_str_with_path(src)
        .map_err(|e| ChatError::Decode(e.to_string()))?;
    normalize(&messages)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(v: Value) -> ChatMessage {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn absent_and_null_content_differ() {
        assert_eq!(decode(json!({"role": "user"})).content, None);
        assert_eq!(
            decode(json!({"role": "user", "content": null})).content,
            Some(MessageContent::Other(Value::Null))
        );
    }

    #[test]
    fn parts_skip_missing_text_and_ignore_other_keys() {
        let msg = decode(json!({
            "role": "user",
            "content": [
                {"type": "text", "text": "look"},
                {"type": "image_url", "image_url": {"url": "data:..."}},
                {"text": null},
                {"text": "here"}
            ]
        }));
        let out = normalize(&[msg]).unwrap();
        assert_eq!(out[0].content, "look\nhere");
    }

    #[test]
    fn empty_parts_give_empty_content() {
        let out = normalize(&[ChatMessage::parts::<_, String>("user", [])]).unwrap();
        assert_eq!(out[0].content, "");
    }

    #[test]
    fn missing_role_becomes_empty() {
        let msg = ChatMessage { role: None, content: Some(MessageContent::Text("x".into())) };
        assert_eq!(normalize(&[msg]).unwrap()[0].role, "");
    }

    #[test]
    fn invalid_content_reports_index_and_kind() {
        let msgs = [
            ChatMessage::text("system", "ok"),
            decode(json!({"role": "user", "content": {"text": "x"}})),
        ];
        assert_eq!(
            normalize(&msgs).unwrap_err(),
            ChatError::InvalidContentType { index: 1, found: "object" }
        );
        let bad_part = decode(json!({"role": "user", "content": ["x"]}));
        assert!(matches!(
            normalize(&[bad_part]).unwrap_err(),
            ChatError::InvalidContentType { index: 0, .. }
        ));
    }

    #[test]
    fn decode_errors_name_the_path() {
        let err = normalize_str(r#"[{"role": 1, "content": "x"}]"#).unwrap_err();
        let ChatError::Decode(msg) = err else { panic!("expected decode error") };
        assert!(msg.contains("[0].role"), "{msg}");
    }
}
