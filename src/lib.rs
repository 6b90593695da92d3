//! Gastos client core: the headless engine behind the expense tracker app.
//! Owns the expense ledger, the monthly/yearly/weekly rollups, the category
//! registry and the receipt-scanning pipeline; the screens are thin
//! collaborators on top of this crate.

pub mod aggregate;
mod api;
mod dates;
mod error;
mod extract;
mod ids;
mod ledger;
pub mod log_bridge;
mod models;
mod normalize;
mod ocr;
mod pipeline;
mod registry;
mod retry;
pub mod storage;

pub use api::{set_service_config, spawn_background, ServiceConfig};
pub use dates::{DateKey, MONTHS};
pub use error::CoreError;
pub use extract::{parse_candidate, DraftExtractor, ExtractionClient, RawCandidate};
pub use ids::RecordId;
pub use ledger::{DayBucket, ExpenseChanges, Ledger, LedgerStore};
pub use log_bridge::drain_rust_logs;
pub use models::{
    Category, DayDoc, DayEntryDoc, DisplayRow, ExpenseDraft, ExpenseRecord, LedgerDocument,
    ViewMode,
};
pub use normalize::normalize;
pub use ocr::{OcrClient, TextDetector};
pub use pipeline::{ScanFailure, ScanPipeline, ScanState};
pub use registry::{CategoryRegistry, OTHERS_LABEL};
pub use retry::RetryPolicy;

/// Call once at startup with the app documents directory path.
pub fn init_storage(storage_path: &str) -> Result<(), CoreError> {
    storage::init(storage_path)?;
    rust_log!("[gastos_rs] storage ready");
    Ok(())
}

/// Default scanning pipeline over the real service clients, no retry.
pub fn scan_pipeline() -> ScanPipeline<OcrClient, ExtractionClient> {
    ScanPipeline::new(OcrClient::default(), ExtractionClient::default())
}
