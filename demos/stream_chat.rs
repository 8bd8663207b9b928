//! Stream a chat reply from a running backend.
//!
//! Run with:
//! ```bash
//! export AGENTDESK_BASE_URL="http://localhost:5000/api"
//! export AGENTDESK_TOKEN="dev-token-12345"
//! cargo run --example stream_chat -- "Write a haiku about Rust"
//! ```

use std::io::Write;

use agentdesk::chat::ChatStore;
use agentdesk::client::ApiClient;
use agentdesk::model::{ConversationKind, Message, NewConversation};
use agentdesk::stream::{StreamHandler, StreamRequest};
use agentdesk::thinking::extract_thinking_content;
use tracing_subscriber::EnvFilter;

struct Console;

impl StreamHandler for Console {
    fn on_chunk(&mut self, chunk: &str) {
        print!("{}", chunk);
        let _ = std::io::stdout().flush();
    }

    fn on_complete(&mut self, message: &Message) {
        let parsed = extract_thinking_content(&message.content);
        println!("\n\n=== Stream Complete ({}) ===", message.id);
        if !parsed.thinking.is_empty() {
            println!("Thinking:\n{}\n", parsed.thinking);
        }
        println!("Reply:\n{}", parsed.reply);
    }

    fn on_error(&mut self, reason: &str) {
        eprintln!("\nError in stream: {}", reason);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Hello!".to_string());

    let mut store = ChatStore::new(ApiClient::from_env()?);

    let conversation = store
        .create_conversation(&NewConversation {
            kind: ConversationKind::Model,
            agent_id: None,
            model_id: None,
            title: Some("stream demo".to_string()),
        })
        .await?;

    let request = StreamRequest::new(conversation.id, prompt).with_thinking(true);
    store.stream_message(request, &mut Console).await?;

    println!("\n{} messages in the conversation", store.messages().len());
    Ok(())
}
