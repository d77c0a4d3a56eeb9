// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE stream parser for Anthropic Messages API streaming responses.
//!
//! Anthropic frames are event-typed (`event: content_block_delta`), so the
//! event name selects the payload type.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use frugal_core::FrugalError;
use futures::stream::{Stream, StreamExt};
use serde::de::DeserializeOwned;

use crate::types::{ApiErrorResponse, SseContentBlockDelta, SseMessageDelta, SseMessageStart};

/// Stream of typed Anthropic events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, FrugalError>> + Send>>;

/// Typed SSE events from the Anthropic streaming protocol.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// Initial message metadata (id, model, input usage).
    MessageStart(SseMessageStart),
    /// Incremental update to a content block.
    ContentBlockDelta(SseContentBlockDelta),
    /// Message-level delta (stop_reason, output usage).
    MessageDelta(SseMessageDelta),
    /// The message is complete.
    MessageStop,
    /// Keep-alive ping.
    Ping,
    /// API error during streaming.
    Error(ApiErrorResponse),
}

fn parse<T: DeserializeOwned>(name: &str, data: &str) -> Result<T, FrugalError> {
    serde_json::from_str(data).map_err(|e| FrugalError::Provider {
        message: format!("failed to parse {name}: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parses a reqwest streaming response into a stream of typed [`StreamEvent`]s.
///
/// Block start/stop markers and unknown event types are skipped.
pub fn parse_sse_stream(response: reqwest::Response) -> EventStream {
    let event_stream = response.bytes_stream().eventsource();

    let mapped = event_stream.filter_map(|result| async move {
        match result {
            Ok(event) => {
                let data = event.data.as_str();
                let parsed = match event.event.as_str() {
                    "message_start" => parse(&event.event, data).map(StreamEvent::MessageStart),
                    "content_block_delta" => {
                        parse(&event.event, data).map(StreamEvent::ContentBlockDelta)
                    }
                    "message_delta" => parse(&event.event, data).map(StreamEvent::MessageDelta),
                    "message_stop" => Ok(StreamEvent::MessageStop),
                    "ping" => Ok(StreamEvent::Ping),
                    "error" => parse(&event.event, data).map(StreamEvent::Error),
                    _ => return None,
                };
                Some(parsed)
            }
            Err(e) => Some(Err(FrugalError::provider(format!("SSE stream error: {e}")))),
        }
    });

    Box::pin(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SseDelta;

    /// Serves raw SSE text through wiremock to get a real reqwest::Response.
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
    async fn parse_content_block_delta() {
        let sse = "event: content_block_delta\ndata: {\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hello\"}}\n\n";
        let mut stream = parse_sse_stream(mock_sse_response(sse).await);

        match stream.next().await.unwrap().unwrap() {
            StreamEvent::ContentBlockDelta(delta) => {
                assert_eq!(delta.index, 0);
                assert!(matches!(delta.delta, SseDelta::TextDelta { ref text } if text == "Hello"));
            }
            other => panic!("expected ContentBlockDelta, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn parse_message_start_usage() {
        let sse = "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\",\"model\":\"claude-3-5-sonnet-20241022\",\"content\":[],\"usage\":{\"input_tokens\":25,\"output_tokens\":1}}}\n\n";
        let mut stream = parse_sse_stream(mock_sse_response(sse).await);

        match stream.next().await.unwrap().unwrap() {
            StreamEvent::MessageStart(ms) => {
                assert_eq!(ms.message.id, "msg_1");
                assert_eq!(ms.message.usage.input_tokens, 25);
            }
            other => panic!("expected MessageStart, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn block_markers_and_unknown_events_are_skipped() {
        let sse = concat!(
            "event: content_block_start\ndata: {\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\n\n",
            "event: unknown_future_event\ndata: {\"foo\":\"bar\"}\n\n",
            "event: content_block_stop\ndata: {\"index\":0}\n\n",
            "event: message_stop\ndata: {}\n\n",
        );
        let mut stream = parse_sse_stream(mock_sse_response(sse).await);

        let event = stream.next().await.unwrap().unwrap();
        assert!(matches!(event, StreamEvent::MessageStop));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn parse_message_delta_with_usage() {
        let sse = "event: message_delta\ndata: {\"delta\":{\"stop_reason\":\"end_turn\"},\"usage\":{\"output_tokens\":25}}\n\n";
        let mut stream = parse_sse_stream(mock_sse_response(sse).await);

        match stream.next().await.unwrap().unwrap() {
            StreamEvent::MessageDelta(md) => {
                assert_eq!(md.delta.stop_reason.as_deref(), Some("end_turn"));
                assert_eq!(md.usage.unwrap().output_tokens, 25);
            }
            other => panic!("expected MessageDelta, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn parse_error_event() {
        let sse = "event: error\ndata: {\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\n";
        let mut stream = parse_sse_stream(mock_sse_response(sse).await);

        match stream.next().await.unwrap().unwrap() {
            StreamEvent::Error(err) => {
                assert_eq!(err.error.type_, "overloaded_error");
                assert_eq!(err.error.message, "Overloaded");
            }
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_payload_is_an_error_item() {
        let sse = "event: content_block_delta\ndata: not-json\n\n";
        let mut stream = parse_sse_stream(mock_sse_response(sse).await);
        assert!(stream.next().await.unwrap().is_err());
    }
}
