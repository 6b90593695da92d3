//! OCR client: sends a captured image to the text-detection service and
//! returns the detected text. An empty result is not an error here; the
//! pipeline decides that an empty receipt is a terminal failure.

use crate::api;
use crate::error::CoreError;
use crate::retry::RetryPolicy;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::Value;

/// Seam the pipeline consumes; lets tests stub the service.
pub trait TextDetector {
    /// Full detected text of the image; empty when the service saw none.
    fn detect_text(&self, image: &[u8]) -> Result<String, CoreError>;
}

pub struct OcrClient {
    retry: RetryPolicy,
}

impl OcrClient {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }
}

impl Default for OcrClient {
    fn default() -> Self {
        Self::new(RetryPolicy::none())
    }
}

impl TextDetector for OcrClient {
    fn detect_text(&self, image: &[u8]) -> Result<String, CoreError> {
        let config = api::service_config()?;
        let body = serde_json::json!({
            "requests": [{
                "image": { "content": BASE64.encode(image) },
                "features": [{ "type": "TEXT_DETECTION" }]
            }]
        });
        let text = api::post_json(
            &config.ocr_url,
            config.ocr_api_key.as_deref(),
            &body,
            &self.retry,
        )?;
        let value: Value = serde_json::from_str(&text).map_err(|e| CoreError::MalformedResponse {
            message: format!("OCR response is not JSON: {}", e),
            raw: text.clone(),
        })?;
        Ok(text_from_response(&value).unwrap_or_default())
    }
}

/// `responses[0].fullTextAnnotation.text`, per the service contract.
pub(crate) fn text_from_response(value: &Value) -> Option<String> {
    value
        .get("responses")?
        .get(0)?
        .get("fullTextAnnotation")?
        .get("text")?
        .as_str()
        .map(String::from)
}
