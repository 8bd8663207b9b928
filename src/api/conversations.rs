//! Conversations and their messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{resource, Resource};
use crate::client::ClientError;
use crate::model::{Conversation, Message, PaginationParams};

resource!(
    /// `/chat/conversations`
    Conversations,
    Conversation,
    "chat/conversations"
);

/// Request body for persisting a user message.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutgoingMessage<'a> {
    pub content: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub attachments: &'a [Value],
    pub metadata: Value,
}

#[derive(Debug, Clone, Serialize)]
struct SendRequest<'a> {
    conversation_id: &'a str,
    content: &'a str,
}

/// Result of a non-streaming `POST /chat/send`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SendReply {
    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub user_message_id: String,
    pub ai_message_id: String,
    pub ai_response: String,
}

impl Conversations<'_> {
    /// One page of a conversation's messages (page 1, 50 per page by default).
    pub async fn messages(
        &self,
        conversation_id: &str,
        params: PaginationParams,
    ) -> Result<Vec<Message>, ClientError> {
        let query = PaginationParams {
            page: Some(params.page.unwrap_or(1)),
            page_size: Some(params.page_size.unwrap_or(50)),
        };
        self.client()
            .get_with_query(&format!("{}/messages", Self::item_path(conversation_id)), &query)
            .await
    }

    /// Persist a user message without asking for a reply.
    pub async fn post_message(
        &self,
        conversation_id: &str,
        content: &str,
        attachments: &[Value],
    ) -> Result<Message, ClientError> {
        let body = OutgoingMessage {
            content,
            kind: "user",
            attachments,
            metadata: Value::Object(Default::default()),
        };
        self.client()
            .post(&format!("conversations/{}/messages", conversation_id), &body)
            .await
    }

    /// Ask for a complete, non-streamed reply.
    pub async fn send(&self, conversation_id: &str, content: &str) -> Result<SendReply, ClientError> {
        self.client()
            .post(
                "chat/send",
                &SendRequest {
                    conversation_id,
                    content,
                },
            )
            .await
    }

    /// Chat history across conversations, as the backend reports it.
    pub async fn history(&self) -> Result<Value, ClientError> {
        self.client().get("chat/history").await
    }
}
