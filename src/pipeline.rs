//! Receipt ingestion state machine: image bytes -> OCR -> extraction ->
//! normalization -> `ExpenseDraft`. Exactly one run may be in flight; every
//! failure is terminal for its run and the caller decides whether to retry
//! by starting a new capture.

use crate::error::CoreError;
use crate::extract::DraftExtractor;
use crate::models::ExpenseDraft;
use crate::normalize::normalize;
use crate::ocr::TextDetector;
use crate::registry::CategoryRegistry;
use crate::rust_log;
use std::fmt;

/// Why a scan run ended without a draft. Each ingestion failure maps to
/// exactly one of these; none is process-fatal.
#[derive(Clone, Debug, PartialEq)]
pub enum ScanFailure {
    /// The OCR service answered but saw no text in the image.
    NoTextDetected,
    /// OCR service/network failure.
    OcrError(String),
    /// Extraction service/network failure.
    ExtractionError(String),
    /// Extraction replied with unparseable JSON; `raw` keeps the reply.
    MalformedExtraction { message: String, raw: String },
    /// Extraction JSON parsed but required fields are absent.
    IncompleteExtraction {
        missing: Vec<&'static str>,
        raw: String,
    },
    /// A field failed validation (bad date, non-numeric amount).
    InvalidDraft { field: &'static str, value: String },
}

impl fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanFailure::NoTextDetected => write!(f, "no text detected in image"),
            ScanFailure::OcrError(e) => write!(f, "text detection failed: {}", e),
            ScanFailure::ExtractionError(e) => write!(f, "extraction failed: {}", e),
            ScanFailure::MalformedExtraction { message, .. } => {
                write!(f, "extraction returned malformed JSON: {}", message)
            }
            ScanFailure::IncompleteExtraction { missing, .. } => {
                write!(f, "extraction missing fields: {}", missing.join(", "))
            }
            ScanFailure::InvalidDraft { field, value } => {
                write!(f, "invalid {}: {:?}", field, value)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ScanState {
    Idle,
    Capturing,
    AwaitingOcr,
    AwaitingExtraction,
    Validating,
    Ready(ExpenseDraft),
    Failed(ScanFailure),
}

impl ScanState {
    /// A run is active from capture until it lands in Ready or Failed.
    fn run_in_flight(&self) -> bool {
        !matches!(self, ScanState::Idle | ScanState::Failed(_))
    }
}

pub struct ScanPipeline<D, E> {
    detector: D,
    extractor: E,
    state: ScanState,
}

impl<D: TextDetector, E: DraftExtractor> ScanPipeline<D, E> {
    pub fn new(detector: D, extractor: E) -> Self {
        Self {
            detector,
            extractor,
            state: ScanState::Idle,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Start a capture. Ignored (returns false) while a run is in flight;
    /// from Failed it implicitly resets and starts fresh.
    pub fn begin_capture(&mut self) -> bool {
        if self.state.run_in_flight() {
            rust_log!("[gastos_rs] scan: begin_capture ignored (run in flight)");
            return false;
        }
        self.state = ScanState::Capturing;
        true
    }

    /// User abandoned the capture; back to Idle.
    pub fn cancel_capture(&mut self) {
        if matches!(self.state, ScanState::Capturing) {
            self.state = ScanState::Idle;
        }
    }

    /// Drive the run to completion with the captured image. The two service
    /// calls are strictly sequential; the extractor is never consulted after
    /// an OCR failure. Ignored unless a capture is in progress.
    pub fn process_image(
        &mut self,
        image: &[u8],
        registry: &CategoryRegistry,
    ) -> &ScanState {
        if !matches!(self.state, ScanState::Capturing) {
            rust_log!("[gastos_rs] scan: process_image ignored (no capture in progress)");
            return &self.state;
        }

        self.state = ScanState::AwaitingOcr;
        let text = match self.detector.detect_text(image) {
            Err(e) => return self.fail(ScanFailure::OcrError(e.to_string())),
            Ok(text) if text.trim().is_empty() => {
                return self.fail(ScanFailure::NoTextDetected)
            }
            Ok(text) => text,
        };

        self.state = ScanState::AwaitingExtraction;
        let candidate = match self.extractor.extract(&text) {
            Err(CoreError::MalformedResponse { message, raw }) => {
                return self.fail(ScanFailure::MalformedExtraction { message, raw })
            }
            Err(e) => return self.fail(ScanFailure::ExtractionError(e.to_string())),
            Ok(candidate) => candidate,
        };
        let missing = candidate.missing_fields();
        if !missing.is_empty() {
            return self.fail(ScanFailure::IncompleteExtraction {
                missing,
                raw: candidate.raw,
            });
        }

        self.state = ScanState::Validating;
        match normalize(&candidate, registry) {
            Ok(draft) => {
                rust_log!(
                    "[gastos_rs] scan: draft ready title={:?} amount={} date_key={}",
                    draft.title,
                    draft.amount,
                    draft.occurred_on
                );
                self.state = ScanState::Ready(draft);
            }
            Err(failure) => return self.fail(failure),
        }
        &self.state
    }

    /// Hand the draft to the caller and reset to Idle. The caller commits it
    /// with `LedgerStore::insert(draft.into_record())`.
    pub fn take_draft(&mut self) -> Option<ExpenseDraft> {
        match std::mem::replace(&mut self.state, ScanState::Idle) {
            ScanState::Ready(draft) => Some(draft),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Clear a terminal state without starting a capture.
    pub fn reset(&mut self) {
        self.state = ScanState::Idle;
    }

    fn fail(&mut self, failure: ScanFailure) -> &ScanState {
        rust_log!("[gastos_rs] scan: run failed: {}", failure);
        self.state = ScanState::Failed(failure);
        &self.state
    }
}
