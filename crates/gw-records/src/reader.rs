//! Best-effort record tokenizer.

use std::path::Path;

use log::warn;

use crate::RecordResult;

/// The result of scanning one record file: the decoded words plus the number
/// of tokens that failed hex parsing and were skipped.
#[derive(Debug, Clone, Default)]
pub struct RecordScan {
    /// Decoded words in stream order.
    pub values: Vec<u32>,
    /// Count of malformed (non-hex, non-header) tokens that were skipped.
    pub skipped: usize,
}

impl RecordScan {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// Scan record text into words.
///
/// Separators are commas, semicolons, and line breaks.  Tokens starting with
/// `memory_initialization` (the radix and vector header keywords) are
/// recognized and dropped; a leading `0x`/`0X` is stripped; anything else
/// that is not valid hexadecimal is counted in [`RecordScan::skipped`].
pub fn scan_str(text: &str) -> RecordScan {
    let mut scan = RecordScan::default();

    for raw in text.split([',', ';', '\n', '\r']) {
        let token = raw.trim();
        if token.is_empty() {
            continue;
        }
        let lower = token.to_ascii_lowercase();
        if lower.starts_with("memory_initialization") {
            continue;
        }
        let digits = lower.strip_prefix("0x").unwrap_or(&lower);
        match u32::from_str_radix(digits, 16) {
            Ok(v) => scan.values.push(v),
            Err(_) => scan.skipped += 1,
        }
    }

    if scan.skipped > 0 {
        warn!(
            "skipped {} malformed record token(s) ({} valid)",
            scan.skipped,
            scan.values.len()
        );
    }
    scan
}

/// Read and scan a record file from disk.
pub fn scan_path(path: &Path) -> RecordResult<RecordScan> {
    let text = std::fs::read_to_string(path)?;
    Ok(scan_str(&text))
}
