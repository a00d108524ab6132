//! Server-sent event decoding for streamed message responses
//!
//! Only text deltas are surfaced; the stream ends at `message_stop` or when the body ends.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::Value;
use tracing::{debug, warn};

use super::base::TextStream;
use crate::errors::ProviderError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: Option<String>,
    pub data: String,
}

/// Incremental SSE parser that tolerates events and lines split across chunks
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of the body, returning every event it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if let Some(event) = self.take_event() {
                    events.push(event);
                }
            } else if line.starts_with(':') {
                continue;
            } else if let Some(name) = field(line, "event") {
                self.event = Some(name.to_string());
            } else if let Some(data) = field(line, "data") {
                self.data.push(data.to_string());
            }
        }

        events
    }

    /// Flush a trailing event that was not terminated by a blank line
    pub fn finish(&mut self) -> Option<SseEvent> {
        if !self.buffer.is_empty() {
            if let Some(event) = self.push(b"\n").pop() {
                return Some(event);
            }
        }
        self.take_event()
    }

    fn take_event(&mut self) -> Option<SseEvent> {
        if self.data.is_empty() {
            self.event = None;
            return None;
        }
        Some(SseEvent {
            event: self.event.take(),
            data: std::mem::take(&mut self.data).join("\n"),
        })
    }
}

fn field<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(name)?.strip_prefix(':')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// What a single decoded event means for the caller
#[derive(Debug, PartialEq)]
enum StreamStep {
    Text(String),
    Skip,
    Stop,
}

fn interpret(event: &SseEvent) -> Result<StreamStep, ProviderError> {
    let json: Value = serde_json::from_str(&event.data)?;
    let event_type = json
        .get("type")
        .and_then(|t| t.as_str())
        .or(event.event.as_deref())
        .unwrap_or("unknown");

    match event_type {
        "content_block_delta" => match json.pointer("/delta/type").and_then(|t| t.as_str()) {
            Some("text_delta") => Ok(StreamStep::Text(
                json.pointer("/delta/text")
                    .and_then(|t| t.as_str())
                    .unwrap_or_default()
                    .to_string(),
            )),
            _ => Ok(StreamStep::Skip),
        },
        "message_stop" => Ok(StreamStep::Stop),
        "error" => {
            let message = json
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown stream error")
                .to_string();
            warn!("Error event in message stream: {}", message);
            Err(ProviderError::Stream(message))
        }
        other => {
            debug!("Ignoring stream event: {}", other);
            Ok(StreamStep::Skip)
        }
    }
}

/// Turn a raw SSE body into a stream of text fragments
pub fn text_stream<S, E>(body: S) -> TextStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<ProviderError> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut decoder = SseDecoder::new();
        let mut body = Box::pin(body);

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    let e: ProviderError = e.into();
                    yield Err(e);
                    return;
                }
            };
            for event in decoder.push(&chunk) {
                match interpret(&event) {
                    Ok(StreamStep::Text(text)) => yield Ok(text),
                    Ok(StreamStep::Skip) => {}
                    Ok(StreamStep::Stop) => return,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        }

        if let Some(event) = decoder.finish() {
            match interpret(&event) {
                Ok(StreamStep::Text(text)) => yield Ok(text),
                Ok(_) => {}
                Err(e) => yield Err(e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use futures::TryStreamExt;

    const BODY: &str = concat!(
        "event: message_start\n",
        "data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\"}}\n\n",
        "event: content_block_start\n",
        "data: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\n\n",
        "event: ping\n",
        "data: {\"type\":\"ping\"}\n\n",
        "event: content_block_delta\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hello\"}}\n\n",
        "event: content_block_delta\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\", world\"}}\n\n",
        "event: message_delta\n",
        "data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\"},\"usage\":{\"output_tokens\":4}}\n\n",
        "event: message_stop\n",
        "data: {\"type\":\"message_stop\"}\n\n",
    );

    fn chunked(body: &str, size: usize) -> TextStream {
        let chunks: Vec<Result<Bytes, ProviderError>> = body
            .as_bytes()
            .chunks(size)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        text_stream(stream::iter(chunks))
    }

    #[test]
    fn test_decoder_splits_events() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"event: ping\ndata: {\"type\":\"ping\"}\n\n: comment\n\ndata: a\ndata: b\n\n");
        assert_eq!(
            events,
            vec![
                SseEvent {
                    event: Some("ping".to_string()),
                    data: "{\"type\":\"ping\"}".to_string()
                },
                SseEvent {
                    event: None,
                    data: "a\nb".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_decoder_handles_crlf_and_partial_lines() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: par").is_empty());
        assert!(decoder.push(b"tial\r\n").is_empty());
        let events = decoder.push(b"\r\n");
        assert_eq!(events[0].data, "partial");
    }

    #[test]
    fn test_decoder_finish_flushes_trailing_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: tail").is_empty());
        assert_eq!(decoder.finish().map(|e| e.data), Some("tail".to_string()));
        assert_eq!(decoder.finish(), None);
    }

    #[tokio::test]
    async fn test_text_stream_yields_deltas() -> Result<(), ProviderError> {
        let fragments: Vec<String> = chunked(BODY, BODY.len()).try_collect().await?;
        assert_eq!(fragments, vec!["Hello", ", world"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_text_stream_survives_tiny_chunks() -> Result<(), ProviderError> {
        let fragments: Vec<String> = chunked(BODY, 7).try_collect().await?;
        assert_eq!(fragments.concat(), "Hello, world");
        Ok(())
    }

    #[tokio::test]
    async fn test_text_stream_stops_at_message_stop() -> Result<(), ProviderError> {
        let body = format!(
            "{}data: {{\"type\":\"content_block_delta\",\"delta\":{{\"type\":\"text_delta\",\"text\":\"late\"}}}}\n\n",
            BODY
        );
        let fragments: Vec<String> = chunked(&body, 64).try_collect().await?;
        assert_eq!(fragments.concat(), "Hello, world");
        Ok(())
    }

    #[tokio::test]
    async fn test_text_stream_surfaces_error_event() {
        let body = concat!(
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"Hi\"}}\n\n",
            "event: error\n",
            "data: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\n",
        );
        let mut stream = chunked(body, body.len());
        assert_eq!(stream.try_next().await, Ok(Some("Hi".to_string())));
        assert_eq!(
            stream.try_next().await,
            Err(ProviderError::Stream("Overloaded".to_string()))
        );
    }
}
