//! Streaming chat ingestion.
//!
//! A `POST /chat/stream` answers with an event stream whose payload lines
//! look like:
//!
//! ```text
//! data: {"chunk": "<partial text>"}
//! data: {"done": true, "message_id": "<id>"}
//! data: {"error": "<message>"}
//! ```
//!
//! [`events`] turns such a body into [`StreamEvent`]s. [`ingest`] drives a
//! whole session: it accumulates the reply, feeds the
//! [`IncrementalSplitter`], and reports to a [`StreamHandler`].

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client::ClientError;
use crate::model::{local_id, Message, Role};
use crate::sse::sse_data;
use crate::thinking::{extract_thinking_content, IncrementalSplitter};

/// One decoded event from the chat stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A fragment of the assistant reply, verbatim.
    Chunk(String),
    /// End of the reply; carries the id the server stored it under.
    Done { message_id: Option<String> },
    /// The server gave up mid-stream.
    Error(String),
}

/// Body of a `data: ` line.
#[derive(Debug, Clone, Deserialize)]
struct StreamPayload {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    chunk: Option<String>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    message_id: Option<String>,
}

impl StreamPayload {
    /// Events in processing order: a non-empty error excludes everything
    /// else, otherwise the chunk comes before the end marker.
    fn into_events(self) -> Vec<StreamEvent> {
        if let Some(error) = self.error.filter(|e| !e.is_empty()) {
            return vec![StreamEvent::Error(error)];
        }
        let mut events = Vec::with_capacity(2);
        if let Some(chunk) = self.chunk.filter(|c| !c.is_empty()) {
            events.push(StreamEvent::Chunk(chunk));
        }
        if self.done {
            events.push(StreamEvent::Done {
                message_id: self.message_id,
            });
        }
        events
    }
}

/// A `data: ` line whose payload is not valid JSON.
///
/// Recoverable: the line is skipped and the session carries on.
#[derive(Error, Debug)]
#[error("malformed stream payload {line:?}: {source}")]
pub struct MalformedLine {
    pub line: String,
    #[source]
    pub source: serde_json::Error,
}

/// Decode the payload of one `data: ` line.
pub fn decode_line(data: &str) -> Result<Vec<StreamEvent>, MalformedLine> {
    serde_json::from_str::<StreamPayload>(data)
        .map(StreamPayload::into_events)
        .map_err(|source| MalformedLine {
            line: data.to_string(),
            source,
        })
}

/// Turn a chat stream body into events.
///
/// Malformed payloads are logged and skipped. The stream ends when the body
/// ends; it does not stop by itself after `Done` or `Error`.
pub fn events<S, E>(byte_stream: S) -> impl Stream<Item = Result<StreamEvent, ClientError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<ClientError>,
{
    sse_data(byte_stream).flat_map(|result| {
        let items = match result {
            Ok(data) => match decode_line(&data) {
                Ok(events) => events.into_iter().map(Ok).collect(),
                Err(malformed) => {
                    warn!("Skipping stream line: {}", malformed);
                    Vec::new()
                }
            },
            Err(e) => vec![Err(e)],
        };
        stream::iter(items)
    })
}

/// Callbacks for a streaming session. All of them default to doing nothing.
pub trait StreamHandler {
    /// Called once per non-empty chunk, with the chunk exactly as received.
    fn on_chunk(&mut self, _chunk: &str) {}

    /// Called once when the server marks the reply done.
    fn on_complete(&mut self, _message: &Message) {}

    /// Called once when the session fails.
    fn on_error(&mut self, _reason: &str) {}
}

/// A handler that ignores every callback.
impl StreamHandler for () {}

/// Request body of `POST /chat/stream`.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct StreamRequest {
    pub conversation_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub show_thinking: bool,
}

impl StreamRequest {
    pub fn new(conversation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<Value>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_thinking(mut self, show_thinking: bool) -> Self {
        self.show_thinking = show_thinking;
        self
    }
}

/// How a session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The server sent `done`; the assembled reply.
    Completed(Message),
    /// The session failed; `on_error` has been called.
    Failed(ClientError),
    /// The body ended without `done`. Neither `on_complete` nor `on_error`
    /// was called and the partial text is not a message.
    Incomplete { partial: String },
}

/// Per-session accumulation state.
#[derive(Debug)]
pub struct StreamSession {
    conversation_id: String,
    user_id: String,
    full_response: String,
    splitter: IncrementalSplitter,
}

impl StreamSession {
    pub fn new(conversation_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            user_id: user_id.into(),
            full_response: String::new(),
            splitter: IncrementalSplitter::new(),
        }
    }

    /// Everything received so far, in arrival order.
    pub fn full_response(&self) -> &str {
        &self.full_response
    }

    pub fn splitter(&self) -> &IncrementalSplitter {
        &self.splitter
    }

    fn push_chunk(&mut self, chunk: &str) {
        self.full_response.push_str(chunk);
        self.splitter.push(chunk);
    }

    fn finish(self, message_id: Option<String>) -> Message {
        let id = message_id.unwrap_or_else(|| local_id("msg"));
        let mut message = Message::new(
            id,
            self.conversation_id,
            Role::Assistant,
            self.full_response,
            self.user_id,
        );
        let mut thinking = self.splitter.into_parsed().thinking.trim().to_string();
        if thinking.is_empty() {
            // Fenced blocks and tags split across chunks only show up in the whole text
            thinking = extract_thinking_content(&message.content).thinking;
        }
        if !thinking.is_empty() {
            message.thinking = Some(thinking);
        }
        message
    }

    /// Consume an event stream until `done`, an error, or the end of the body.
    pub async fn run<S, H>(mut self, events: S, handler: &mut H) -> SessionOutcome
    where
        S: Stream<Item = Result<StreamEvent, ClientError>>,
        H: StreamHandler + ?Sized,
    {
        futures::pin_mut!(events);

        while let Some(event) = events.next().await {
            match event {
                Ok(StreamEvent::Chunk(chunk)) => {
                    debug!("Stream chunk: {} bytes", chunk.len());
                    self.push_chunk(&chunk);
                    handler.on_chunk(&chunk);
                }
                Ok(StreamEvent::Done { message_id }) => {
                    info!("Stream complete, {} bytes", self.full_response.len());
                    let message = self.finish(message_id);
                    handler.on_complete(&message);
                    return SessionOutcome::Completed(message);
                }
                Ok(StreamEvent::Error(reason)) => {
                    warn!("Stream error from server: {}", reason);
                    handler.on_error(&reason);
                    return SessionOutcome::Failed(ClientError::Server(reason));
                }
                Err(e) => {
                    warn!("Stream read failed: {}", e);
                    handler.on_error(&e.to_string());
                    return SessionOutcome::Failed(e);
                }
            }
        }

        warn!(
            "Stream ended without a done event after {} bytes",
            self.full_response.len()
        );
        SessionOutcome::Incomplete {
            partial: self.full_response,
        }
    }
}

/// Format the message reported for a failed stream request.
pub fn transport_failure(status: StatusCode, body: &str) -> String {
    format!("stream request failed: {} - {}", status.as_u16(), body)
}

/// Run a session over an HTTP response.
///
/// A non-success status fails the session without touching the body. A
/// `204 No Content` has nothing to stream and fails with
/// [`ClientError::StreamUnavailable`].
pub async fn ingest<H>(
    response: reqwest::Response,
    session: StreamSession,
    handler: &mut H,
) -> SessionOutcome
where
    H: StreamHandler + ?Sized,
{
    let status = response.status();
    debug!("Stream response status: {}", status);

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("Stream request failed: {} {}", status, body);
        handler.on_error(&transport_failure(status, &body));
        return SessionOutcome::Failed(ClientError::Transport { status, body });
    }

    if status == StatusCode::NO_CONTENT {
        let err = ClientError::StreamUnavailable;
        handler.on_error(&err.to_string());
        return SessionOutcome::Failed(err);
    }

    session.run(events(response.bytes_stream()), handler).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        chunks: Vec<String>,
        completed: Vec<Message>,
        errors: Vec<String>,
    }

    impl StreamHandler for Recorder {
        fn on_chunk(&mut self, chunk: &str) {
            self.chunks.push(chunk.to_string());
        }

        fn on_complete(&mut self, message: &Message) {
            self.completed.push(message.clone());
        }

        fn on_error(&mut self, reason: &str) {
            self.errors.push(reason.to_string());
        }
    }

    fn body(parts: &[&'static str]) -> impl Stream<Item = Result<Bytes, ClientError>> + Send {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok::<_, ClientError>(Bytes::from_static(p.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    fn run(parts: &[&'static str]) -> (SessionOutcome, Recorder) {
        let mut recorder = Recorder::default();
        let session = StreamSession::new("c1", "u1");
        let outcome =
            futures::executor::block_on(session.run(events(body(parts)), &mut recorder));
        (outcome, recorder)
    }

    #[test]
    fn test_decode_line() {
        assert_eq!(
            decode_line(r#"{"chunk": "Hel"}"#).unwrap(),
            vec![StreamEvent::Chunk("Hel".to_string())]
        );
        assert_eq!(
            decode_line(r#"{"done": true, "message_id": null}"#).unwrap(),
            vec![StreamEvent::Done { message_id: None }]
        );
        assert_eq!(
            decode_line(r#"{"error": "boom", "chunk": "ignored"}"#).unwrap(),
            vec![StreamEvent::Error("boom".to_string())]
        );
        assert_eq!(
            decode_line(r#"{"chunk": "tail", "done": true, "message_id": "m9"}"#).unwrap(),
            vec![
                StreamEvent::Chunk("tail".to_string()),
                StreamEvent::Done { message_id: Some("m9".to_string()) },
            ]
        );
        assert!(decode_line(r#"{"chunk": ""}"#).unwrap().is_empty());
        assert_eq!(
            decode_line(r#"{"error": "", "chunk": "still here"}"#).unwrap(),
            vec![StreamEvent::Chunk("still here".to_string())]
        );
        assert!(decode_line(r#"{"done": false}"#).unwrap().is_empty());
        assert!(decode_line("{not json").is_err());
    }

    #[test]
    fn test_chunks_then_done() {
        let (outcome, recorder) = run(&[
            "data: {\"chunk\":\"Hel\"}\n\n",
            "data: {\"chunk\":\"lo\"}\n\n",
            "data: {\"done\": true, \"message_id\":\"m1\"}\n\n",
        ]);

        assert_eq!(recorder.chunks, vec!["Hel", "lo"]);
        assert_eq!(recorder.completed.len(), 1);
        assert!(recorder.errors.is_empty());

        let message = &recorder.completed[0];
        assert_eq!(message.id, "m1");
        assert_eq!(message.content, "Hello");
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.conversation_id, "c1");
        assert!(matches!(outcome, SessionOutcome::Completed(m) if m.content == "Hello"));
    }

    #[test]
    fn test_done_without_id_gets_fallback() {
        let (_, recorder) = run(&["data: {\"chunk\":\"x\"}\ndata: {\"done\": true}\n"]);
        assert!(recorder.completed[0].id.starts_with("msg_"));
    }

    #[test]
    fn test_error_stops_session() {
        let (outcome, recorder) = run(&[
            "data: {\"chunk\":\"partial\"}\n",
            "data: {\"error\": \"boom\"}\n",
            "data: {\"chunk\":\"late\"}\n",
            "data: {\"done\": true}\n",
        ]);

        assert_eq!(recorder.chunks, vec!["partial"]);
        assert_eq!(recorder.errors, vec!["boom"]);
        assert!(recorder.completed.is_empty());
        assert!(matches!(outcome, SessionOutcome::Failed(ClientError::Server(r)) if r == "boom"));
    }

    #[test]
    fn test_malformed_and_foreign_lines_skipped() {
        let (outcome, recorder) = run(&[
            ": keep-alive\n",
            "data: {oops\n",
            "event: message\n",
            "data: {\"chunk\":\"ok\"}\n",
            "data: {\"done\": true, \"message_id\": \"m2\"}\n",
        ]);

        assert_eq!(recorder.chunks, vec!["ok"]);
        assert!(recorder.errors.is_empty());
        assert!(matches!(outcome, SessionOutcome::Completed(m) if m.id == "m2"));
    }

    #[test]
    fn test_end_without_done_is_incomplete() {
        let (outcome, recorder) = run(&["data: {\"chunk\":\"a\"}\n", "data: {\"chunk\":\"b\"}\n"]);

        assert_eq!(recorder.chunks, vec!["a", "b"]);
        assert!(recorder.completed.is_empty());
        assert!(recorder.errors.is_empty());
        match outcome {
            SessionOutcome::Incomplete { partial } => assert_eq!(partial, "ab"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_full_response_is_ordered_concatenation() {
        let chunks = ["<think>", "plan", "</think>", "An", "swer", " 思考"];
        let mut session = StreamSession::new("c", "u");
        let mut recorder = Recorder::default();
        for chunk in chunks {
            session.push_chunk(chunk);
            recorder.on_chunk(chunk);
        }
        assert_eq!(session.full_response(), chunks.concat());
        assert_eq!(recorder.chunks, chunks);
    }

    #[test]
    fn test_thinking_attached_to_completed_message() {
        let (_, recorder) = run(&[
            "data: {\"chunk\":\"<think>consider\"}\n",
            "data: {\"chunk\":\" it</think>\"}\n",
            "data: {\"chunk\":\"Answer\"}\n",
            "data: {\"done\": true, \"message_id\": \"m3\"}\n",
        ]);

        let message = &recorder.completed[0];
        assert_eq!(message.content, "<think>consider it</think>Answer");
        assert_eq!(message.thinking.as_deref(), Some("consider it"));
        assert_eq!(recorder.chunks[0], "<think>consider");
    }

    #[test]
    fn test_empty_error_does_not_end_session() {
        let (outcome, recorder) = run(&[
            "data: {\"error\": \"\"}\n",
            "data: {\"chunk\":\"fine\"}\n",
            "data: {\"done\": true, \"message_id\": \"m5\"}\n",
        ]);

        assert!(recorder.errors.is_empty());
        assert_eq!(recorder.chunks, vec!["fine"]);
        assert!(matches!(outcome, SessionOutcome::Completed(m) if m.id == "m5"));
    }

    #[test]
    fn test_fenced_thinking_falls_back_to_whole_text() {
        let (_, recorder) = run(&[
            "data: {\"chunk\":\"```thinking\\nweigh it\\n```\\n\"}\n",
            "data: {\"chunk\":\"Result\"}\n",
            "data: {\"done\": true}\n",
        ]);

        assert_eq!(recorder.completed[0].thinking.as_deref(), Some("weigh it"));
    }

    #[test]
    fn test_tag_split_across_chunks_falls_back_to_whole_text() {
        let (_, recorder) = run(&[
            "data: {\"chunk\":\"<thi\"}\n",
            "data: {\"chunk\":\"nk>hidden</think>shown\"}\n",
            "data: {\"done\": true}\n",
        ]);

        assert_eq!(recorder.completed[0].thinking.as_deref(), Some("hidden"));
    }

    #[test]
    fn test_stream_request_body() {
        let request = StreamRequest::new("c1", "hi");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"conversation_id": "c1", "content": "hi"})
        );

        let request = StreamRequest::new("c1", "hi")
            .with_model("m1")
            .with_thinking(true);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model_id"], "m1");
        assert_eq!(value["show_thinking"], true);
    }

    #[test]
    fn test_transport_failure_message() {
        let message = transport_failure(StatusCode::INTERNAL_SERVER_ERROR, "kaput");
        assert!(message.contains("500"));
        assert!(message.contains("kaput"));
    }
}
