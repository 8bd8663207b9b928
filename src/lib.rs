//! # agentdesk - client library for the agent management platform
//!
//! A typed async client for the platform's REST backend: agents,
//! conversations, knowledge bases, workflows, plugins, models, training jobs,
//! dashboard and settings, plus streaming chat.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Uniform `{ success, data, message }` envelope handling
//! - Streaming chat replies via Server-Sent Events
//! - Separation of "thinking" text from the visible reply
//! - A chat store that caches conversations and messages for UI binding
//!
//! ## Architecture
//!
//! - **`ApiClient`**: one configured HTTP client plus typed GET/POST/PUT/DELETE
//! - **`api::Resource`**: list/get/create/update/delete over a collection path
//! - **`stream`**: turns a `text/event-stream` body into chunk/done/error events
//!   and drives a session against a [`stream::StreamHandler`]
//! - **`thinking`**: whole-text and incremental thinking/reply splitting
//! - **`ChatStore`**: conversation list, message list and streaming flag
//!
//! ## Example
//! ```no_run
//! use agentdesk::chat::ChatStore;
//! use agentdesk::client::ApiClient;
//! use agentdesk::model::Message;
//! use agentdesk::options::ClientOptions;
//! use agentdesk::stream::{StreamHandler, StreamRequest};
//!
//! struct Printer;
//!
//! impl StreamHandler for Printer {
//!     fn on_chunk(&mut self, chunk: &str) {
//!         print!("{}", chunk);
//!     }
//!
//!     fn on_complete(&mut self, message: &Message) {
//!         println!("\n[{}]", message.id);
//!     }
//!
//!     fn on_error(&mut self, reason: &str) {
//!         eprintln!("error: {}", reason);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ClientOptions::new("http://localhost:5000/api").with_token("dev-token-12345");
//!     let mut store = ChatStore::new(ApiClient::new(options)?);
//!
//!     let request = StreamRequest::new("66a1f0c2e4b0a1b2c3d4e5f6", "Hello!");
//!     store.stream_message(request, &mut Printer).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chat;
pub mod client;
pub mod http;
pub mod model;
pub mod options;
pub mod sse;
pub mod stream;
pub mod thinking;

// Re-exports for convenience
pub use chat::ChatStore;
pub use client::{ApiClient, ClientError};
pub use model::{Conversation, Message, Role};
pub use stream::{StreamEvent, StreamHandler, StreamRequest};
pub use thinking::{extract_thinking_content, has_thinking_content, ParsedMessage};
