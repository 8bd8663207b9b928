//! Server-Sent Events (SSE) line framing for the chat stream.
//!
//! SSE format:
//! ```text
//! data: {"chunk": "Hel"}
//!
//! data: {"chunk": "lo"}
//!
//! data: {"done": true, "message_id": "m1"}
//! ```
//!
//! Only `data: ` lines carry payloads. Event names, ids and retry
//! directives are not part of the protocol and are skipped like any other
//! line.

use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream, StreamExt};

use crate::client::ClientError;

/// Literal prefix of a payload line.
pub const DATA_PREFIX: &str = "data: ";

/// Extension trait for `reqwest::Response` to enable SSE streaming.
///
/// # Example
/// ```ignore
/// use agentdesk::sse::SSEResponseExt;
///
/// let response = client.post(url).send().await?;
/// let mut stream = Box::pin(response.sse());
/// while let Some(result) = stream.next().await {
///     let data = result?;
///     println!("SSE data: {}", data);
/// }
/// ```
pub trait SSEResponseExt {
    /// Convert the response into a stream of SSE payloads.
    ///
    /// Yields the content after the `data: ` prefix for each payload line,
    /// in arrival order, until the body ends.
    fn sse(self) -> impl Stream<Item = Result<String, ClientError>> + Send;
}

impl SSEResponseExt for reqwest::Response {
    fn sse(self) -> impl Stream<Item = Result<String, ClientError>> + Send {
        sse_data(self.bytes_stream())
    }
}

/// Frame an arbitrary byte stream into SSE payloads.
///
/// Bytes are buffered until a newline arrives, so a line split across two
/// reads is reassembled before it is inspected. A trailing line without a
/// newline is still processed when the byte stream ends.
pub fn sse_data<S, E>(byte_stream: S) -> impl Stream<Item = Result<String, ClientError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<ClientError>,
{
    stream::unfold(
        (Box::pin(byte_stream), BytesMut::new(), false),
        |(mut byte_stream, mut buffer, mut stream_ended)| async move {
            loop {
                // Emit the next complete payload line already in the buffer
                while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                    let line = buffer.split_to(pos + 1);
                    if let Some(data) = parse_sse_line(&String::from_utf8_lossy(&line)) {
                        return Some((Ok(data.to_string()), (byte_stream, buffer, stream_ended)));
                    }
                }

                if stream_ended {
                    // Process an unterminated final line, if any
                    if !buffer.is_empty() {
                        let line = buffer.split();
                        if let Some(data) = parse_sse_line(&String::from_utf8_lossy(&line)) {
                            return Some((Ok(data.to_string()), (byte_stream, buffer, stream_ended)));
                        }
                    }
                    return None;
                }

                match byte_stream.next().await {
                    Some(Ok(chunk)) => buffer.extend_from_slice(&chunk),
                    Some(Err(e)) => {
                        // A read failure ends the stream after being reported
                        return Some((Err(e.into()), (byte_stream, buffer, true)));
                    }
                    None => stream_ended = true,
                }
            }
        },
    )
}

/// Parse an SSE line to extract the data portion.
///
/// Only the line terminator is stripped; the `data: ` prefix must start the
/// line exactly.
///
/// # Example
/// ```
/// use agentdesk::sse::parse_sse_line;
///
/// assert_eq!(parse_sse_line("data: {\"chunk\": \"hi\"}\n"), Some("{\"chunk\": \"hi\"}"));
/// assert_eq!(parse_sse_line("event: ping"), None);
/// ```
pub fn parse_sse_line(line: &str) -> Option<&str> {
    line.trim_end_matches(['\n', '\r']).strip_prefix(DATA_PREFIX)
}
