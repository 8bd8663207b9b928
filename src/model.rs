//! Data models shared across the chat and REST layers.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Role of the message sender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single chat message as the backend stores it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub conversation_id: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub content: String,

    /// Sender role; the backend calls this field `type`
    #[serde(rename = "type")]
    pub role: Role,

    /// Reasoning text split out of an assistant reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub attachments: Vec<Value>,

    #[serde(default)]
    pub metadata: Value,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub user_id: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub created_at: String,
}

impl Message {
    /// Build a message locally, stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        conversation_id: impl Into<String>,
        role: Role,
        content: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            conversation_id: conversation_id.into(),
            content: content.into(),
            role,
            thinking: None,
            attachments: Vec::new(),
            metadata: Value::Object(Default::default()),
            user_id: user_id.into(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Build a client-side identifier such as `msg_1718000000000`.
pub fn local_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Utc::now().timestamp_millis())
}

/// Decode an explicit `null` as the type's default, like a missing key.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Whether a conversation talks to an agent or directly to a model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    Agent,
    Model,
}

/// A chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    pub id: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub user_id: String,

    #[serde(rename = "type")]
    pub kind: ConversationKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub title: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub status: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub created_at: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub updated_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

/// Payload for creating a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewConversation {
    #[serde(rename = "type")]
    pub kind: ConversationKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// The uniform `{ success, data, message }` wrapper around every REST reply.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,

    pub data: Option<T>,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub message: String,
}

/// Page request parameters.
#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq)]
pub struct PaginationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Page bookkeeping kept next to a cached list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            total: 0,
            pages: 0,
        }
    }
}

/// A decoded list payload.
///
/// List endpoints answer with a bare array, with `{ data: [...], total, ... }`
/// or with `{ items: [...], total, ... }`. All of them decode into this.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub total: Option<u64>,
    pub pages: Option<u32>,
}

impl<T> Page<T> {
    /// Page bookkeeping with the same fallbacks the list screens use.
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page.unwrap_or(1),
            page_size: self.page_size.unwrap_or(20),
            total: self.total.unwrap_or(self.items.len() as u64),
            pages: self.pages.unwrap_or(1),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPage<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(alias = "items")]
        data: Vec<T>,
        #[serde(default)]
        page: Option<u32>,
        #[serde(default, alias = "limit")]
        page_size: Option<u32>,
        #[serde(default)]
        total: Option<u64>,
        #[serde(default)]
        pages: Option<u32>,
    },
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Page<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawPage::<T>::deserialize(deserializer)? {
            RawPage::Bare(items) => Page {
                items,
                page: None,
                page_size: None,
                total: None,
                pages: None,
            },
            RawPage::Wrapped {
                data,
                page,
                page_size,
                total,
                pages,
            } => Page {
                items: data,
                page,
                page_size,
                total,
                pages,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_uses_type_for_role() {
        let message: Message = serde_json::from_value(json!({
            "id": "m1",
            "conversation_id": "c1",
            "content": "hi",
            "type": "assistant",
            "user_id": "u1",
            "created_at": "2024-01-01T00:00:00"
        }))
        .unwrap();
        assert_eq!(message.role, Role::Assistant);
        assert!(message.attachments.is_empty());

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "assistant");
        assert!(value.get("thinking").is_none());
    }

    #[test]
    fn test_local_id_prefix() {
        let id = local_id("msg");
        assert!(id.starts_with("msg_"));
        assert!(id["msg_".len()..].parse::<i64>().is_ok());
    }

    #[test]
    fn test_page_shapes() {
        let bare: Page<u32> = serde_json::from_value(json!([1, 2, 3])).unwrap();
        assert_eq!(bare.items, vec![1, 2, 3]);
        assert_eq!(bare.pagination().total, 3);

        let wrapped: Page<u32> =
            serde_json::from_value(json!({"data": [1], "total": 9, "page": 2, "page_size": 1, "pages": 9}))
                .unwrap();
        assert_eq!(wrapped.items, vec![1]);
        assert_eq!(
            wrapped.pagination(),
            Pagination { page: 2, page_size: 1, total: 9, pages: 9 }
        );

        let items: Page<u32> = serde_json::from_value(json!({"items": [4, 5]})).unwrap();
        assert_eq!(items.items, vec![4, 5]);
        assert_eq!(items.pagination().pages, 1);
    }

    #[test]
    fn test_null_fields_decode_as_defaults() {
        let page: Page<Conversation> = serde_json::from_value(json!({
            "data": [{
                "id": "c1",
                "user_id": "u1",
                "type": "agent",
                "agent_id": "a1",
                "title": null,
                "status": "active",
                "created_at": "2024-01-01T00:00:00",
                "updated_at": null
            }],
            "total": 1,
            "page": 1,
            "page_size": 20,
            "pages": 1
        }))
        .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "");
        assert_eq!(page.items[0].updated_at, "");

        let messages: Vec<Message> = serde_json::from_value(json!([{
            "id": "m1",
            "conversation_id": "c1",
            "content": "hi",
            "type": "user",
            "attachments": null,
            "user_id": null,
            "created_at": null
        }]))
        .unwrap();
        assert_eq!(messages[0].created_at, "");
        assert!(messages[0].attachments.is_empty());

        let envelope: Envelope<Value> =
            serde_json::from_value(json!({"success": true, "data": [], "message": null})).unwrap();
        assert_eq!(envelope.message, "");
    }

    #[test]
    fn test_envelope_without_data() {
        let envelope: Envelope<Value> =
            serde_json::from_value(json!({"success": false, "code": 404, "message": "not found"})).unwrap();
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message, "not found");
    }
}
