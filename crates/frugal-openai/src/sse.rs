// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `data:`-line SSE parsing for OpenAI-compatible streams.
//!
//! These backends send unnamed events whose data is a JSON chunk, terminated
//! by the literal `[DONE]`.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use frugal_core::FrugalError;
use futures::stream::{Stream, StreamExt};

use crate::types::ChatChunk;

/// A decoded frame.
#[derive(Debug, Clone)]
pub enum WireEvent {
    Chunk(ChatChunk),
    Done,
}

pub type WireStream = Pin<Box<dyn Stream<Item = Result<WireEvent, FrugalError>> + Send>>;

/// Parses a streaming response body into [`WireEvent`]s.
pub fn parse_sse_stream(response: reqwest::Response) -> WireStream {
    let mapped = response
        .bytes_stream()
        .eventsource()
        .filter_map(|result| async move {
            match result {
                Ok(event) => {
                    let data = event.data.trim();
                    if data.is_empty() {
                        return None;
                    }
                    if data == "[DONE]" {
                        return Some(Ok(WireEvent::Done));
                    }
                    Some(
                        serde_json::from_str::<ChatChunk>(data)
                            .map(WireEvent::Chunk)
                            .map_err(|e| FrugalError::Provider {
                                message: format!("failed to parse stream chunk: {e}"),
                                source: Some(Box::new(e)),
                            }),
                    )
                }
                Err(e) => Some(Err(FrugalError::provider(format!("SSE stream error: {e}")))),
            }
        });

    Box::pin(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn mock_sse_response(sse_text: &str) -> reqwest::Response {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_text.to_string()),
            )
            .mount(&server)
            .await;

        reqwest::get(&server.uri()).await.unwrap()
    }

    #[tokio::test]
    async fn parses_chunks_then_done() {
        let sse = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
            "data: [DONE]\n\n",
        );
        let events: Vec<_> = parse_sse_stream(mock_sse_response(sse).await)
            .collect()
            .await;
        assert_eq!(events.len(), 2);
        match &events[0] {
            Ok(WireEvent::Chunk(chunk)) => {
                assert_eq!(chunk.choices[0].delta.content.as_deref(), Some("Hi"));
            }
            other => panic!("expected chunk, got {other:?}"),
        }
        assert!(matches!(events[1], Ok(WireEvent::Done)));
    }

    #[tokio::test]
    async fn comments_and_keepalives_are_ignored() {
        let sse = ": keep-alive\n\ndata: [DONE]\n\n";
        let events: Vec<_> = parse_sse_stream(mock_sse_response(sse).await)
            .collect()
            .await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Ok(WireEvent::Done)));
    }

    #[tokio::test]
    async fn malformed_chunk_is_error() {
        let sse = "data: {nope\n\n";
        let mut stream = parse_sse_stream(mock_sse_response(sse).await);
        assert!(stream.next().await.unwrap().is_err());
    }
}
