// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming completion: forward deltas as they arrive, then summarize.
//!
//! The aggregator accumulates the full text and any usage the backend
//! reports. Once the upstream stream ends the answer is judged exactly once
//! and a terminal summary frame closes the stream. Streaming never
//! escalates, since the content has already been delivered.

use std::pin::Pin;
use std::time::Duration;

use async_stream::stream;
use frugal_core::{
    ModelId, ProviderStream, ProviderStreamChunk, StreamEventType, TokenEstimator, TokenUsage,
};
use frugal_cost::{CostCalculator, round_usd};
use frugal_router::RoutingDecision;
use futures::{Stream, StreamExt};
use tracing::{info, warn};

use crate::judge::QualityJudge;
use crate::record::{EvaluationSummary, StreamEvent, StreamSummary};
use crate::telemetry;

/// Events delivered to the client, ending in exactly one terminal event.
pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// Accumulates text and usage from normalized provider chunks.
#[derive(Debug, Default)]
pub struct StreamAggregator {
    text: String,
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}

impl StreamAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds `chunk` in and returns the text fragment to forward, if any.
    ///
    /// Later non-zero usage figures replace earlier ones.
    pub fn push(&mut self, chunk: &ProviderStreamChunk) -> Option<String> {
        if let Some(usage) = chunk.usage {
            if usage.input_tokens > 0 {
                self.input_tokens = Some(usage.input_tokens);
            }
            if usage.output_tokens > 0 {
                self.output_tokens = Some(usage.output_tokens);
            }
        }
        match &chunk.text {
            Some(fragment) if !fragment.is_empty() => {
                self.text.push_str(fragment);
                Some(fragment.clone())
            }
            _ => None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Reported usage, estimating whatever the backend never supplied.
    pub fn usage(&self, estimator: &TokenEstimator, estimated_input: u32) -> TokenUsage {
        TokenUsage {
            input_tokens: self.input_tokens.unwrap_or(estimated_input),
            output_tokens: self
                .output_tokens
                .unwrap_or_else(|| estimator.count(&self.text)),
        }
    }
}

/// Everything the generator needs once the upstream stream is open.
pub(crate) struct StreamContext {
    pub decision: RoutingDecision,
    pub prompt: String,
    pub estimator: TokenEstimator,
    pub calculator: CostCalculator,
    pub judge: std::sync::Arc<QualityJudge>,
    pub idle_timeout: Duration,
}

/// Drives `upstream` to completion, yielding deltas then one terminal event.
pub(crate) fn aggregate(mut upstream: ProviderStream, ctx: StreamContext) -> EventStream {
    let model: ModelId = ctx.decision.final_model;

    Box::pin(stream! {
        let mut aggregator = StreamAggregator::new();

        loop {
            let next = match tokio::time::timeout(ctx.idle_timeout, upstream.next()).await {
                Ok(next) => next,
                Err(_) => {
                    warn!(%model, timeout = ?ctx.idle_timeout, "upstream stream idle, aborting");
                    yield StreamEvent::Error {
                        error: format!("upstream stream idle for {:?}", ctx.idle_timeout),
                    };
                    return;
                }
            };

            match next {
                None => break,
                Some(Err(e)) => {
                    warn!(%model, error = %e, "upstream stream failed");
                    yield StreamEvent::Error { error: e.to_string() };
                    return;
                }
                Some(Ok(chunk)) => {
                    if chunk.event_type == StreamEventType::Error {
                        let error = chunk
                            .error
                            .unwrap_or_else(|| "upstream stream error".to_string());
                        warn!(%model, %error, "upstream reported stream error");
                        yield StreamEvent::Error { error };
                        return;
                    }
                    if let Some(content) = aggregator.push(&chunk) {
                        yield StreamEvent::Delta { content, model };
                    }
                    if chunk.event_type == StreamEventType::MessageStop {
                        break;
                    }
                }
            }
        }

        let usage = aggregator.usage(&ctx.estimator, ctx.decision.estimated_input_tokens);
        let evaluation = ctx.judge.evaluate(&ctx.prompt, aggregator.text(), model).await;
        let cost = ctx.calculator.breakdown(model, &usage);

        info!(
            %model,
            intent = %ctx.decision.intent,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            cost_usd = cost.cost,
            score = evaluation.score,
            "stream completed"
        );
        telemetry::completion(model, ctx.decision.intent, &usage, cost.cost);

        yield StreamEvent::Done(StreamSummary {
            done: true,
            model_used: model,
            intent_detected: ctx.decision.intent,
            complexity_level: ctx.decision.complexity,
            estimated_cost: round_usd(cost.cost),
            tokens_used: usage.total(),
            savings_vs_gpt4: round_usd(cost.savings()),
            quality_score: evaluation.score,
            quality_passed: evaluation.passed,
            evaluation: EvaluationSummary::from(&evaluation),
        });
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_forwards_text_and_skips_empty_fragments() {
        let mut agg = StreamAggregator::new();
        assert_eq!(agg.push(&ProviderStreamChunk::text("Hel")), Some("Hel".into()));
        assert_eq!(agg.push(&ProviderStreamChunk::text("")), None);
        assert_eq!(agg.push(&ProviderStreamChunk::text("lo")), Some("lo".into()));
        assert_eq!(agg.push(&ProviderStreamChunk::stop()), None);
        assert_eq!(agg.text(), "Hello");
    }

    #[test]
    fn later_usage_replaces_earlier() {
        let mut agg = StreamAggregator::new();
        agg.push(&ProviderStreamChunk::usage(
            StreamEventType::MessageStart,
            TokenUsage {
                input_tokens: 9,
                output_tokens: 1,
            },
        ));
        agg.push(&ProviderStreamChunk::usage(
            StreamEventType::MessageDelta,
            TokenUsage {
                input_tokens: 0,
                output_tokens: 42,
            },
        ));
        let usage = agg.usage(&TokenEstimator::word_heuristic(), 100);
        assert_eq!(usage.input_tokens, 9);
        assert_eq!(usage.output_tokens, 42);
    }

    #[test]
    fn missing_usage_is_estimated() {
        let mut agg = StreamAggregator::new();
        agg.push(&ProviderStreamChunk::text("one two three four five six seven eight nine ten"));
        let usage = agg.usage(&TokenEstimator::word_heuristic(), 17);
        assert_eq!(usage.input_tokens, 17);
        assert_eq!(usage.output_tokens, 13);
    }
}
