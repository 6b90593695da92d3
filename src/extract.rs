//! Extraction client: turns OCR text into a JSON-shaped candidate expense via
//! a chat-completion service. The reply may arrive fenced; fences are
//! stripped before parsing, and the raw content is kept for diagnostics.

use crate::api;
use crate::error::CoreError;
use crate::retry::RetryPolicy;
use serde::Deserialize;
use serde_json::Value;

pub const SYSTEM_INSTRUCTION: &str =
    "You are a receipt reader for a personal expense tracker. \
     You reply with a single JSON object and nothing else.";

/// Category names the service may choose from; anything else falls back to
/// Others during validation.
pub(crate) const PROMPT_CATEGORIES: &str = "Food, Utilities, School, Internet, Health, Others";

fn user_prompt(receipt_text: &str) -> String {
    format!(
        "Extract one expense from this receipt text.\n\
         Receipt:\n{}\n\n\
         Reply with strict JSON: {{\"title\": string, \"date\": \"MM/DD/YYYY\", \
         \"amount\": number, \"category\": string}}. \
         The category must be one of: {}. \
         If the receipt shows no date, use today's. Do not add commentary.",
        receipt_text, PROMPT_CATEGORIES
    )
}

/// Candidate expense as the service produced it. All fields optional so a
/// partial reply is represented, not rejected at parse time; `raw` is the
/// unparsed content for diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawCandidate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(skip)]
    pub raw: String,
}

impl RawCandidate {
    /// Required fields the service failed to produce, in contract order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        // A blank title is tolerated (defaulted later); an absent one is not.
        if self.title.is_none() {
            missing.push("title");
        }
        if self.date.as_deref().map_or(true, |s| s.trim().is_empty()) {
            missing.push("date");
        }
        if self.amount.is_none() || self.amount == Some(Value::Null) {
            missing.push("amount");
        }
        if self
            .category
            .as_deref()
            .map_or(true, |s| s.trim().is_empty())
        {
            missing.push("category");
        }
        missing
    }
}

/// Seam the pipeline consumes; lets tests stub the service.
pub trait DraftExtractor {
    fn extract(&self, receipt_text: &str) -> Result<RawCandidate, CoreError>;
}

pub struct ExtractionClient {
    retry: RetryPolicy,
}

impl ExtractionClient {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }
}

impl Default for ExtractionClient {
    fn default() -> Self {
        Self::new(RetryPolicy::none())
    }
}

impl DraftExtractor for ExtractionClient {
    fn extract(&self, receipt_text: &str) -> Result<RawCandidate, CoreError> {
        let config = api::service_config()?;
        let body = serde_json::json!({
            "model": config.completion_model,
            "messages": [
                { "role": "system", "content": SYSTEM_INSTRUCTION },
                { "role": "user", "content": user_prompt(receipt_text) }
            ]
        });
        let text = api::post_json(
            &config.completion_url,
            config.completion_api_key.as_deref(),
            &body,
            &self.retry,
        )?;
        let value: Value = serde_json::from_str(&text).map_err(|e| CoreError::MalformedResponse {
            message: format!("Completion response is not JSON: {}", e),
            raw: text.clone(),
        })?;
        let content = value
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| CoreError::MalformedResponse {
                message: "Completion response has no message content".to_string(),
                raw: text.clone(),
            })?;
        parse_candidate(content)
    }
}

/// Parse the (possibly fenced) content field into a candidate.
pub fn parse_candidate(content: &str) -> Result<RawCandidate, CoreError> {
    let stripped = strip_code_fences(content);
    let mut candidate: RawCandidate =
        serde_json::from_str(stripped).map_err(|e| CoreError::MalformedResponse {
            message: format!("Extraction JSON unparseable: {}", e),
            raw: content.to_string(),
        })?;
    candidate.raw = content.to_string();
    Ok(candidate)
}

/// Drop a leading ```/```json line and a trailing ``` line, if present.
pub(crate) fn strip_code_fences(s: &str) -> &str {
    let trimmed = s.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the fence's language tag (e.g. "json") up to the first newline.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => return trimmed,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
