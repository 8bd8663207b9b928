//! Chat state: the conversation list, the open conversation's messages and
//! the streaming flag.
//!
//! [`ChatStore`] caches what the chat screens bind to and keeps it in step
//! with the backend. Messages are only ever appended while chatting; a
//! reload through [`ChatStore::get_messages`] replaces them wholesale.

use serde_json::Value;
use tracing::{error, info};

use crate::api::Resource;
use crate::client::{ApiClient, ClientError};
use crate::model::{local_id, Conversation, Message, NewConversation, Pagination, PaginationParams, Role};
use crate::stream::{ingest, SessionOutcome, StreamHandler, StreamRequest, StreamSession};
use crate::thinking::{extract_thinking_content, has_thinking_content};

/// Clears the streaming flag when the call that raised it finishes or is dropped.
struct StreamingFlag<'a>(&'a mut bool);

impl<'a> StreamingFlag<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for StreamingFlag<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Client-side chat state bound to one backend.
#[derive(Debug)]
pub struct ChatStore {
    client: ApiClient,
    conversations: Vec<Conversation>,
    current_conversation: Option<Conversation>,
    messages: Vec<Message>,
    streaming: bool,
    pagination: Pagination,
}

impl ChatStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            conversations: Vec::new(),
            current_conversation: None,
            messages: Vec::new(),
            streaming: false,
            pagination: Pagination::default(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn current_conversation(&self) -> Option<&Conversation> {
        self.current_conversation.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// True while a [`ChatStore::stream_message`] call is in flight.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn active_conversations(&self) -> impl Iterator<Item = &Conversation> {
        self.conversations.iter().filter(|c| c.status == "active")
    }

    pub fn archived_conversations(&self) -> impl Iterator<Item = &Conversation> {
        self.conversations.iter().filter(|c| c.status == "archived")
    }

    /// Reload the conversation list. On failure the list is emptied.
    pub async fn get_conversations(&mut self) -> Result<(), ClientError> {
        match self.client.conversations().list().await {
            Ok(page) => {
                self.pagination = page.pagination();
                self.conversations = page.items;
                info!("Loaded {} conversations", self.conversations.len());
                Ok(())
            }
            Err(e) => {
                error!("Failed to load conversations: {}", e);
                self.conversations.clear();
                Err(e)
            }
        }
    }

    /// Create a conversation and put it at the top of the list.
    pub async fn create_conversation(
        &mut self,
        new: &NewConversation,
    ) -> Result<Conversation, ClientError> {
        let conversation = self.client.conversations().create(new).await?;
        self.conversations.insert(0, conversation.clone());
        Ok(conversation)
    }

    /// Fetch a conversation and make it current.
    pub async fn get_conversation(&mut self, id: &str) -> Result<Conversation, ClientError> {
        let conversation = self.client.conversations().get(id).await?;
        self.current_conversation = Some(conversation.clone());
        Ok(conversation)
    }

    /// Update a conversation, then reload the list.
    pub async fn update_conversation(
        &mut self,
        id: &str,
        changes: &Value,
    ) -> Result<Option<Conversation>, ClientError> {
        let updated = self.client.conversations().update(id, changes).await?;
        self.get_conversations().await?;
        Ok(updated)
    }

    /// Delete a conversation, then reload the list.
    pub async fn delete_conversation(&mut self, id: &str) -> Result<(), ClientError> {
        self.client.conversations().delete(id).await?;
        self.get_conversations().await
    }

    /// Replace the message list with one page of a conversation's history.
    pub async fn get_messages(
        &mut self,
        conversation_id: &str,
        params: PaginationParams,
    ) -> Result<(), ClientError> {
        self.messages = self
            .client
            .conversations()
            .messages(conversation_id, params)
            .await?;
        info!("Loaded {} messages", self.messages.len());
        Ok(())
    }

    /// Send a message and wait for the complete reply.
    ///
    /// The user message is persisted and appended first, then the reply is
    /// requested and appended.
    pub async fn send_message(
        &mut self,
        conversation_id: &str,
        content: &str,
        attachments: &[Value],
    ) -> Result<Message, ClientError> {
        let conversations = self.client.conversations();
        let user_message = conversations
            .post_message(conversation_id, content, attachments)
            .await?;
        self.messages.push(user_message);

        let reply = conversations.send(conversation_id, content).await?;
        let mut message = Message::new(
            reply.ai_message_id,
            conversation_id,
            Role::Assistant,
            reply.ai_response,
            self.client.user_id(),
        );
        if has_thinking_content(&message.content) {
            let thinking = extract_thinking_content(&message.content).thinking;
            message.thinking = Some(thinking).filter(|t| !t.is_empty());
        }
        self.messages.push(message.clone());
        Ok(message)
    }

    /// Send a message and stream the reply.
    ///
    /// The user message is appended before the request goes out. The
    /// assistant message is appended only when the server marks the reply
    /// done; `Ok(None)` means the stream ended without that mark and nothing
    /// was appended. Failures are reported to `handler.on_error` and returned.
    pub async fn stream_message<H>(
        &mut self,
        request: StreamRequest,
        handler: &mut H,
    ) -> Result<Option<Message>, ClientError>
    where
        H: StreamHandler + ?Sized,
    {
        let _flag = StreamingFlag::raise(&mut self.streaming);
        info!("Streaming message to conversation {}", request.conversation_id);

        let user_id = self.client.user_id().to_string();
        let mut user_message = Message::new(
            local_id("user"),
            &request.conversation_id,
            Role::User,
            &request.content,
            &user_id,
        );
        user_message.attachments = request.attachments.clone();
        self.messages.push(user_message);

        let response = match self.client.post_stream("chat/stream", &request).await {
            Ok(response) => response,
            Err(e) => {
                error!("Stream request failed: {}", e);
                handler.on_error(&e.to_string());
                return Err(e);
            }
        };

        let session = StreamSession::new(&request.conversation_id, user_id);
        match ingest(response, session, handler).await {
            SessionOutcome::Completed(message) => {
                self.messages.push(message.clone());
                Ok(Some(message))
            }
            SessionOutcome::Failed(e) => Err(e),
            SessionOutcome::Incomplete { .. } => Ok(None),
        }
    }

    pub fn clear_current_conversation(&mut self) {
        self.current_conversation = None;
        self.messages.clear();
    }

    /// Drop all cached state.
    pub fn reset(&mut self) {
        self.conversations.clear();
        self.current_conversation = None;
        self.messages.clear();
        self.streaming = false;
        self.pagination = Pagination::default();
    }
}
