//! C3 — Path Selector. Calls LLM #1 with the candidate path list and a fixed
//! profile prompt, then parses a strict JSON contract out of the response
//! (SPEC_FULL.md §4.3).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ai_client::{ChatClient, ChatRequest, WireMessage};
use serde::Deserialize;
use tracing::warn;

use crate::cost::estimate_cost_usd;
use crate::error::{SelectionFailureCause, TheodoreError};
use crate::fields::render_schema_markdown;
use crate::types::{Phase, SelectionResult};

const DEFAULT_RATIONALE: &str = "Selected by model";

pub struct PathSelector {
    client: Arc<dyn ChatClient>,
    model_id: String,
    timeout: Duration,
}

impl PathSelector {
    pub fn new(client: Arc<dyn ChatClient>, model_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            model_id: model_id.into(),
            timeout,
        }
    }

    pub async fn select(
        &self,
        display_name: &str,
        paths: &[String],
    ) -> Result<SelectionResult, TheodoreError> {
        let started = Instant::now();
        let prompt_text = build_prompt(display_name, paths);

        let request = ChatRequest::new(
            &self.model_id,
            vec![WireMessage::user(prompt_text.clone())],
        )
        .with_temperature(0.1)
        .with_max_tokens(4000);

        let response = tokio::time::timeout(self.timeout, self.client.chat(&request))
            .await
            .map_err(|_| TheodoreError::Timeout { phase: Phase::Selection })?
            .map_err(|e| TheodoreError::SelectionFailed {
                cause: classify_chat_error(&e),
                detail: e.to_string(),
            })?;

        let content = response.content().ok_or_else(|| TheodoreError::SelectionFailed {
            cause: SelectionFailureCause::EmptyResult,
            detail: "provider returned no message content".to_string(),
        })?;

        let parsed = parse_selection_response(content)?;

        let mut selected = Vec::new();
        let mut rationale = HashMap::new();
        let mut rejected_count = 0;

        for candidate in parsed.selected_paths {
            if paths.contains(&candidate) {
                let text = parsed
                    .path_explanations
                    .get(&candidate)
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_RATIONALE.to_string());
                rationale.insert(candidate.clone(), text);
                selected.push(candidate);
            } else {
                warn!(path = %candidate, "selector chose a path outside the candidate list, dropping");
                rejected_count += 1;
            }
        }

        if selected.is_empty() {
            return Err(TheodoreError::SelectionFailed {
                cause: SelectionFailureCause::EmptyResult,
                detail: "no valid selections after filtering against candidate paths".to_string(),
            });
        }

        let usage = response.usage.unwrap_or_default();
        let tokens_in = usage.prompt_tokens;
        let tokens_out = usage.completion_tokens;
        let cost_usd = estimate_cost_usd(&self.model_id, tokens_in, tokens_out);

        Ok(SelectionResult {
            selected,
            rationale,
            rejected_count,
            prompt_text,
            model_id: self.model_id.clone(),
            tokens_in,
            tokens_out,
            cost_usd,
            selection_seconds: started.elapsed().as_secs_f64(),
        })
    }
}

fn classify_chat_error(error: &ai_client::AiClientError) -> SelectionFailureCause {
    match error {
        ai_client::AiClientError::Api { .. } => SelectionFailureCause::HttpStatus,
        _ => SelectionFailureCause::Network,
    }
}

fn build_prompt(display_name: &str, paths: &[String]) -> String {
    let paths_json = serde_json::to_string(paths).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"You are choosing which pages of {display_name}'s website are most likely to contain company intelligence.

We plan to extract a structured record with this field schema:

{schema}

Here are the candidate paths on the site (as a JSON array):

{paths_json}

Choose the 5 to 15 paths most likely to carry information for the fields above (e.g. "/about", "/team", "/careers", "/pricing"). Respond with exactly one JSON object of the form:

{{"selected_paths": ["/about", "/team", ...], "path_explanations": {{"/about": "...", "/team": "..."}}}}

Return only the JSON object, no other prose."#,
        schema = render_schema_markdown(),
    )
}

#[derive(Debug, Deserialize)]
struct RawSelection {
    selected_paths: Vec<String>,
    #[serde(default)]
    path_explanations: HashMap<String, String>,
}

/// Parse the selector's response. Handles a bare JSON array (legacy format,
/// SPEC_FULL.md §8 boundary behavior), Markdown-fenced JSON, and the normal
/// object form, via a first-`{`/last-`}` scan when the object form is used.
fn parse_selection_response(content: &str) -> Result<RawSelection, TheodoreError> {
    let stripped = ai_client::util::strip_code_blocks(content);

    if let Ok(array) = serde_json::from_str::<Vec<String>>(stripped) {
        return Ok(RawSelection {
            selected_paths: array,
            path_explanations: HashMap::new(),
        });
    }

    let start = stripped.find('{');
    let end = stripped.rfind('}');
    let (Some(start), Some(end)) = (start, end) else {
        return Err(TheodoreError::SelectionFailed {
            cause: SelectionFailureCause::Parse,
            detail: content.chars().take(200).collect(),
        });
    };
    if end < start {
        return Err(TheodoreError::SelectionFailed {
            cause: SelectionFailureCause::Parse,
            detail: content.chars().take(200).collect(),
        });
    }

    serde_json::from_str(&stripped[start..=end]).map_err(|e| TheodoreError::SelectionFailed {
        cause: SelectionFailureCause::Parse,
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_object() {
        let body = r#"{"selected_paths": ["/about"], "path_explanations": {"/about": "bio page"}}"#;
        let parsed = parse_selection_response(body).unwrap();
        assert_eq!(parsed.selected_paths, vec!["/about".to_string()]);
    }

    #[test]
    fn parses_object_wrapped_in_markdown_fence() {
        let body = "```json\n{\"selected_paths\": [\"/about\", \"/team\"]}\n```";
        let parsed = parse_selection_response(body).unwrap();
        assert_eq!(parsed.selected_paths.len(), 2);
    }

    #[test]
    fn parses_legacy_array_format() {
        let body = r#"["/about", "/team"]"#;
        let parsed = parse_selection_response(body).unwrap();
        assert_eq!(parsed.selected_paths, vec!["/about".to_string(), "/team".to_string()]);
        assert!(parsed.path_explanations.is_empty());
    }

    #[test]
    fn unparseable_prose_fails() {
        let body = "I'd be happy to help, here are paths: /about, /team";
        let result = parse_selection_response(body);
        assert!(matches!(
            result,
            Err(TheodoreError::SelectionFailed {
                cause: SelectionFailureCause::Parse,
                ..
            })
        ));
    }
}
