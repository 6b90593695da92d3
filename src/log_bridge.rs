//! Buffers core log lines so the host app can drain and surface them.

use once_cell::sync::Lazy;
use std::sync::Mutex;

static LOG_BUFFER: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(Vec::new()));

const MAX_BUFFER_LEN: usize = 400;

fn should_log(s: &str) -> bool {
    let lower = s.to_lowercase();
    // Errors and warnings always surface.
    if lower.contains("error") || lower.contains("warn") || lower.contains("failed") {
        return true;
    }
    // Keep ledger/scan/storage signals; drop everything else to reduce noise.
    lower.contains("scan") || lower.contains("ledger") || lower.contains("storage")
}

/// Push a log line (also prints to stderr). Called by the rust_log! macro.
pub fn push(s: String) {
    if !should_log(&s) {
        return;
    }
    eprintln!("{}", s);
    if let Ok(mut v) = LOG_BUFFER.lock() {
        v.push(s);
        let n = v.len();
        if n > MAX_BUFFER_LEN {
            v.drain(0..n - MAX_BUFFER_LEN);
        }
    }
}

/// Drain and clear buffered log lines; the host prints each line.
pub fn drain_rust_logs() -> Vec<String> {
    LOG_BUFFER
        .lock()
        .map(|mut v| std::mem::take(&mut *v))
        .unwrap_or_default()
}

#[macro_export]
macro_rules! rust_log {
    ($($t:tt)*) => {
        $crate::log_bridge::push(format!($($t)*))
    };
}
