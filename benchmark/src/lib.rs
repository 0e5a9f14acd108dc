// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! reportbin Benchmarking Fixtures
//!
//! Payload builders shared by the criterion benches.
//!
//! # Benchmark Categories
//!
//! - **Identifier Generation**: cost of drawing one 8-symbol identifier
//! - **Report Round Trip**: write + read through the in-memory store at
//!   various payload sizes

use serde_json::{json, Value};

/// Approximate serialized payload sizes to benchmark (in bytes).
pub const PAYLOAD_SIZES: &[usize] = &[64, 1024, 16 * 1024, 256 * 1024];

/// Build a report-shaped JSON document whose encoding is roughly `target_bytes` long.
pub fn report_payload(target_bytes: usize) -> Value {
    // Each row encodes to ~40 bytes
    let rows = (target_bytes / 40).max(1);
    json!({
        "title": "benchmark report",
        "generated_by": "reportbin-benchmark",
        "rows": (0..rows)
            .map(|i| json!({"idx": i, "label": "row", "ok": i % 2 == 0}))
            .collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_size_is_close_to_target() {
        for &size in PAYLOAD_SIZES {
            let encoded = serde_json::to_string(&report_payload(size)).unwrap();
            assert!(encoded.len() >= size / 2, "{} too small for {}", encoded.len(), size);
            assert!(encoded.len() <= size * 2 + 128, "{} too big for {}", encoded.len(), size);
        }
    }
}
