// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM-as-judge quality scoring.
//!
//! A fixed cheap model grades each answer against a rubric. Every failure
//! mode (transport, upstream status, unparsable verdict) degrades to a
//! passing fallback verdict so a struggling judge never blocks the answer.

use std::sync::Arc;

use frugal_core::{
    ChatMessage, Evaluation, FrugalError, ModelId, ProviderAdapter, ProviderRequest,
};
use frugal_cost::ModelProfile;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::telemetry;

pub const JUDGE_MAX_TOKENS: u32 = 500;
pub const JUDGE_TEMPERATURE: f64 = 0.3;

/// Score assigned when no verdict could be obtained.
pub const FALLBACK_SCORE: f64 = 7.0;
pub const FALLBACK_REASONING: &str = "Quality evaluation unavailable; defaulting to pass";

/// The neutral, passing verdict.
pub fn fallback_evaluation() -> Evaluation {
    Evaluation::new(FALLBACK_SCORE, FALLBACK_REASONING, Vec::new(), Vec::new())
}

#[derive(Debug, Deserialize)]
struct Verdict {
    score: f64,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    weaknesses: Vec<String>,
}

/// Scores responses with a designated judge model.
pub struct QualityJudge {
    backend: Option<(Arc<dyn ProviderAdapter>, &'static ModelProfile)>,
}

impl std::fmt::Debug for QualityJudge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualityJudge")
            .field("model", &self.model())
            .finish()
    }
}

impl QualityJudge {
    /// `profile` must belong to the backend `provider` talks to.
    pub fn new(provider: Arc<dyn ProviderAdapter>, profile: &'static ModelProfile) -> Self {
        Self {
            backend: Some((provider, profile)),
        }
    }

    /// A judge that never calls out and always returns the fallback verdict.
    pub fn disabled() -> Self {
        Self { backend: None }
    }

    pub fn model(&self) -> Option<ModelId> {
        self.backend.as_ref().map(|(_, profile)| profile.id)
    }

    /// Grades `response` to `prompt`. Never fails.
    pub async fn evaluate(&self, prompt: &str, response: &str, model_used: ModelId) -> Evaluation {
        let Some((provider, profile)) = &self.backend else {
            return fallback_evaluation();
        };

        match self.try_evaluate(provider.as_ref(), profile, prompt, response, model_used).await {
            Ok(evaluation) => {
                debug!(
                    model = %model_used,
                    score = evaluation.score,
                    passed = evaluation.passed,
                    "quality evaluated"
                );
                evaluation
            }
            Err(e) => {
                warn!(model = %model_used, error = %e, "quality evaluation failed, using fallback");
                telemetry::judge_fallback();
                fallback_evaluation()
            }
        }
    }

    async fn try_evaluate(
        &self,
        provider: &dyn ProviderAdapter,
        profile: &ModelProfile,
        prompt: &str,
        response: &str,
        model_used: ModelId,
    ) -> Result<Evaluation, FrugalError> {
        let request = ProviderRequest {
            model: profile.api_model.to_string(),
            messages: vec![ChatMessage::user(rubric_prompt(prompt, response, model_used))],
            max_tokens: JUDGE_MAX_TOKENS,
            temperature: JUDGE_TEMPERATURE,
            stream: false,
        };
        let reply = provider
            .complete(request)
            .await
            .map_err(|e| FrugalError::Evaluation(e.to_string()))?;
        parse_verdict(&reply.content)
    }
}

/// The grading instructions sent to the judge.
pub fn rubric_prompt(prompt: &str, response: &str, model_used: ModelId) -> String {
    format!(
        "You are an expert evaluator of AI assistant answers. Rate the answer below \
         from 0 to 10, considering relevance to the question, factual accuracy, \
         completeness, and clarity.\n\n\
         QUESTION:\n{prompt}\n\n\
         ANSWER (from {model_used}):\n{response}\n\n\
         Respond with only a JSON object in exactly this form:\n\
         {{\"score\": <number from 0 to 10>, \"reasoning\": \"<one or two sentences>\", \
         \"strengths\": [\"...\"], \"weaknesses\": [\"...\"]}}"
    )
}

/// Parses the first JSON object in `text` into an [`Evaluation`].
pub fn parse_verdict(text: &str) -> Result<Evaluation, FrugalError> {
    let json = extract_json_object(text)
        .ok_or_else(|| FrugalError::Evaluation("no JSON object in judge reply".into()))?;
    let verdict: Verdict = serde_json::from_str(json)
        .map_err(|e| FrugalError::Evaluation(format!("malformed verdict: {e}")))?;
    if !verdict.score.is_finite() {
        return Err(FrugalError::Evaluation("non-finite score".into()));
    }
    Ok(Evaluation::new(
        verdict.score,
        verdict.reasoning,
        verdict.strengths,
        verdict.weaknesses,
    ))
}

/// Returns the first balanced `{...}` substring, ignoring braces inside strings.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use frugal_core::ProviderKind;
    use frugal_cost::ModelRegistry;
    use frugal_test_utils::{MockOutcome, MockProvider};
    use tracing_test::traced_test;

    fn judge_with(mock: &MockProvider) -> QualityJudge {
        QualityJudge::new(
            Arc::new(mock.clone()),
            ModelRegistry::new().profile(ModelId::DeepSeekChat),
        )
    }

    #[test]
    fn extracts_object_surrounded_by_prose() {
        let text = "Sure! Here is my verdict:\n{\"score\": 8, \"reasoning\": \"good\"}\nThanks.";
        assert_eq!(
            extract_json_object(text),
            Some("{\"score\": 8, \"reasoning\": \"good\"}")
        );
    }

    #[test]
    fn braces_inside_strings_do_not_close_the_object() {
        let text = r#"{"score": 6, "reasoning": "uses } and { in \"code\"", "strengths": []} trailing"#;
        let json = extract_json_object(text).unwrap();
        assert!(json.ends_with("\"strengths\": []}"));
    }

    #[test]
    fn nested_objects_are_kept_whole() {
        let text = r#"{"score": 9, "meta": {"a": 1}} {"score": 1}"#;
        assert_eq!(extract_json_object(text), Some(r#"{"score": 9, "meta": {"a": 1}}"#));
    }

    #[test]
    fn unbalanced_or_missing_object_is_none() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("{\"score\": 5"), None);
    }

    #[test]
    fn parse_verdict_clamps_and_thresholds() {
        let eval = parse_verdict(r#"{"score": 12, "reasoning": "r", "strengths": ["s"]}"#).unwrap();
        assert_eq!(eval.score, 10.0);
        assert!(eval.passed);
        assert_eq!(eval.strengths, vec!["s".to_string()]);
        assert!(eval.weaknesses.is_empty());

        let eval = parse_verdict(r#"{"score": 6.5, "reasoning": "thin"}"#).unwrap();
        assert!(!eval.passed);
    }

    #[test]
    fn parse_verdict_rejects_missing_score() {
        assert!(parse_verdict(r#"{"reasoning": "no score"}"#).is_err());
        assert!(parse_verdict("not json").is_err());
    }

    #[test]
    fn rubric_mentions_question_answer_and_model() {
        let prompt = rubric_prompt("What is Rust?", "A language.", ModelId::QwenTurbo);
        assert!(prompt.contains("What is Rust?"));
        assert!(prompt.contains("A language."));
        assert!(prompt.contains("qwen-turbo"));
        assert!(prompt.contains("\"score\""));
    }

    #[tokio::test]
    async fn evaluate_uses_fixed_judge_settings() {
        let mock = MockProvider::with_replies(
            ProviderKind::DeepSeek,
            [r#"{"score": 8.5, "reasoning": "solid", "strengths": ["clear"], "weaknesses": []}"#],
        );
        let eval = judge_with(&mock)
            .evaluate("Reverse a string", "s.chars().rev()", ModelId::DeepSeekCoder)
            .await;
        assert_eq!(eval.score, 8.5);
        assert!(eval.passed);

        let calls = mock.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "deepseek-chat");
        assert_eq!(calls[0].max_tokens, JUDGE_MAX_TOKENS);
        assert_eq!(calls[0].temperature, JUDGE_TEMPERATURE);
        assert!(!calls[0].stream);
    }

    #[tokio::test]
    #[traced_test]
    async fn judge_failure_falls_back_to_pass() {
        let mock = MockProvider::new(ProviderKind::DeepSeek);
        mock.push(MockOutcome::Upstream {
            status: 500,
            body: "boom".into(),
        })
        .await;
        let eval = judge_with(&mock).evaluate("q", "a", ModelId::QwenPlus).await;
        assert_eq!(eval, fallback_evaluation());
        assert_eq!(eval.score, 7.0);
        assert!(eval.passed);
        assert!(logs_contain("quality evaluation failed, using fallback"));
    }

    #[tokio::test]
    async fn unparsable_verdict_falls_back_to_pass() {
        let mock = MockProvider::with_replies(ProviderKind::DeepSeek, ["I think it's fine."]);
        let eval = judge_with(&mock).evaluate("q", "a", ModelId::QwenPlus).await;
        assert_eq!(eval.reasoning, FALLBACK_REASONING);
        assert!(eval.passed);
    }

    #[tokio::test]
    async fn disabled_judge_never_calls_out() {
        let judge = QualityJudge::disabled();
        assert_eq!(judge.model(), None);
        assert_eq!(
            judge.evaluate("q", "a", ModelId::Gpt4oMini).await,
            fallback_evaluation()
        );
    }
}
