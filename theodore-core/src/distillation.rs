//! C5 — Field Distiller. Calls LLM #2 with the aggregated extracted text and
//! asks it to fill in the fixed field schema (SPEC_FULL.md §4.5).

use std::sync::Arc;
use std::time::{Duration, Instant};

use ai_client::{ChatClient, ChatRequest, WireMessage};

use crate::cost::estimate_cost_usd;
use crate::error::{DistillationFailureCause, TheodoreError};
use crate::fields::{render_schema_markdown, FieldRecord};
use crate::types::{DistillationResult, Phase};

/// Below this many filled fields, the result is rejected outright rather
/// than returned half-empty (SPEC_FULL.md §4.5 "zero-success threshold").
const MIN_FILLED_FIELDS: usize = 5;

pub struct FieldDistiller {
    client: Arc<dyn ChatClient>,
    model_id: String,
    timeout: Duration,
}

impl FieldDistiller {
    pub fn new(client: Arc<dyn ChatClient>, model_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            model_id: model_id.into(),
            timeout,
        }
    }

    pub async fn distill(
        &self,
        display_name: &str,
        aggregated_text: &str,
    ) -> Result<DistillationResult, TheodoreError> {
        let started = Instant::now();
        let prompt_text = build_prompt(display_name, aggregated_text);

        let request = ChatRequest::new(&self.model_id, vec![WireMessage::user(prompt_text.clone())])
            .with_temperature(0.1)
            .with_max_tokens(8000);

        let response = tokio::time::timeout(self.timeout, self.client.chat(&request))
            .await
            .map_err(|_| TheodoreError::Timeout { phase: Phase::Distillation })?
            .map_err(|e| TheodoreError::DistillationFailed {
                cause: classify_chat_error(&e),
                detail: e.to_string(),
            })?;

        let content = response.content().ok_or_else(|| TheodoreError::DistillationFailed {
            cause: DistillationFailureCause::Network,
            detail: "provider returned no message content".to_string(),
        })?;

        let object = parse_field_object(content)?;
        let fields = FieldRecord::from_json_object(&object);

        if fields.len() < MIN_FILLED_FIELDS {
            return Err(TheodoreError::DistillationFailed {
                cause: DistillationFailureCause::SchemaUnderfilled,
                detail: format!(
                    "model filled {} of the schema's fields, below the minimum of {}",
                    fields.len(),
                    MIN_FILLED_FIELDS
                ),
            });
        }

        let usage = response.usage.unwrap_or_default();
        let tokens_in = usage.prompt_tokens;
        let tokens_out = usage.completion_tokens;
        let cost_usd = estimate_cost_usd(&self.model_id, tokens_in, tokens_out);

        Ok(DistillationResult {
            fields,
            prompt_text,
            model_id: self.model_id.clone(),
            tokens_in,
            tokens_out,
            cost_usd,
            distillation_seconds: started.elapsed().as_secs_f64(),
        })
    }
}

fn classify_chat_error(error: &ai_client::AiClientError) -> DistillationFailureCause {
    match error {
        ai_client::AiClientError::Api { .. } => DistillationFailureCause::HttpStatus,
        _ => DistillationFailureCause::Network,
    }
}

fn build_prompt(display_name: &str, aggregated_text: &str) -> String {
    format!(
        r#"You are extracting structured company intelligence about {display_name} from the
text below, which was scraped from its website.

Fill in as many of the following fields as the text supports. Omit a field entirely
if the text does not support it; never guess.

{schema}

Respond with exactly one JSON object mapping field names to values. List fields must be
JSON arrays of strings. Return only the JSON object, no other prose.

=== SOURCE TEXT ===

{aggregated_text}"#,
        schema = render_schema_markdown(),
    )
}

fn parse_field_object(content: &str) -> Result<serde_json::Map<String, serde_json::Value>, TheodoreError> {
    let stripped = ai_client::util::strip_code_blocks(content);

    let start = stripped.find('{');
    let end = stripped.rfind('}');
    let (Some(start), Some(end)) = (start, end) else {
        return Err(TheodoreError::DistillationFailed {
            cause: DistillationFailureCause::Parse,
            detail: content.chars().take(200).collect(),
        });
    };
    if end < start {
        return Err(TheodoreError::DistillationFailed {
            cause: DistillationFailureCause::Parse,
            detail: content.chars().take(200).collect(),
        });
    }

    let value: serde_json::Value =
        serde_json::from_str(&stripped[start..=end]).map_err(|e| TheodoreError::DistillationFailed {
            cause: DistillationFailureCause::Parse,
            detail: e.to_string(),
        })?;

    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(TheodoreError::DistillationFailed {
            cause: DistillationFailureCause::Parse,
            detail: "top-level JSON value was not an object".to_string(),
        }),
    }
}
