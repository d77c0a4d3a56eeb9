// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events framing for streamed completions.
//!
//! Every event is an unnamed `data:` frame carrying one JSON object:
//! ```text
//! data: {"content":"Hel","model":"deepseek-chat"}
//!
//! data: {"done":true,"model_used":"deepseek-chat",...}
//! ```
//! A failure mid-stream ends with `data: {"error":"..."}` instead of the
//! summary frame.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use frugal_agent::{EventStream, StreamEvent};
use futures::stream::{Stream, StreamExt};

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

fn to_event(event: &StreamEvent) -> Event {
    Event::default().json_data(event).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to encode stream event");
        Event::default().data(r#"{"error":"failed to encode stream event"}"#)
    })
}

/// Wraps pipeline events as an SSE response body.
pub fn into_sse(events: EventStream) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let frames = events.map(|event| Ok(to_event(&event)));
    Sse::new(frames).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}
