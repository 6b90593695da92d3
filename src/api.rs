//! Shared HTTP plumbing for the OCR and extraction services: one reqwest
//! client, one runtime, service endpoints configured once by the host.

use crate::error::CoreError;
use crate::retry::RetryPolicy;
use crate::rust_log;
use once_cell::sync::Lazy;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

static CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("reqwest client")
});

static RUNTIME: Lazy<tokio::runtime::Runtime> =
    Lazy::new(|| tokio::runtime::Runtime::new().expect("tokio runtime"));

/// Endpoints and credentials for the two external services. Set once by the
/// host at startup; the clients read it per call.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Text-detection endpoint (key may be embedded in the URL by the host).
    pub ocr_url: String,
    pub ocr_api_key: Option<String>,
    /// Chat-completion endpoint.
    pub completion_url: String,
    pub completion_api_key: Option<String>,
    pub completion_model: String,
}

static SERVICE_CONFIG: Lazy<Mutex<Option<ServiceConfig>>> = Lazy::new(|| Mutex::new(None));

pub fn set_service_config(config: ServiceConfig) {
    rust_log!("[gastos_rs] scan services configured");
    *SERVICE_CONFIG.lock().unwrap() = Some(config);
}

pub fn service_config() -> Result<ServiceConfig, CoreError> {
    SERVICE_CONFIG
        .lock()
        .unwrap()
        .clone()
        .ok_or_else(|| CoreError::State("Scan services not configured".to_string()))
}

/// Run a fire-and-forget task on the shared runtime (best-effort work that
/// must not block the caller).
pub fn spawn_background<F>(fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    RUNTIME.spawn(fut);
}

fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status.as_u16() == 429 || status.is_server_error()
}

/// POST a JSON body, return the response body text. Retries transport errors
/// and 429/5xx per the policy; any other non-success status fails at once.
pub(crate) fn post_json(
    url: &str,
    api_key: Option<&str>,
    body: &serde_json::Value,
    retry: &RetryPolicy,
) -> Result<String, CoreError> {
    RUNTIME.block_on(async {
        let mut attempt = 0usize;
        loop {
            let mut req = CLIENT
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .json(body);
            if let Some(key) = api_key {
                req = req.bearer_auth(key);
            }
            let err = match req.send().await {
                Err(e) => CoreError::Network(e.to_string()),
                Ok(resp) => {
                    let status = resp.status();
                    let text = resp
                        .text()
                        .await
                        .map_err(|e| CoreError::Network(e.to_string()))?;
                    if status.is_success() {
                        return Ok(text);
                    }
                    if !is_retryable_status(status) {
                        return Err(CoreError::Network(format!("{} {}", status, text)));
                    }
                    CoreError::Network(format!("{} {}", status, text))
                }
            };
            match retry.delay_before(attempt) {
                Some(delay) => {
                    rust_log!(
                        "[gastos_rs] scan: request failed, retrying in {}ms: {}",
                        delay.as_millis(),
                        err
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => return Err(err),
            }
        }
    })
}
