//! Fuzz target: sketch response parser
//!
//! Feeds arbitrary text through fence stripping, JSON decoding,
//! validation, summary and export.  Checks:
//! - No panics
//! - Confidence stays within [0, 1]
//! - A parse failure always scores 0
//!
//! cargo fuzz run fuzz_sketch_response

#![no_main]

use libfuzzer_sys::fuzz_target;
use tankguard::vision::{AnalysisOutcome, Platform, parse_response};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let out = parse_response(text, Some("fuzz.png"), Platform::Generic);
    let c = out.confidence();
    assert!((0.0..=1.0).contains(&c));
    if matches!(out, AnalysisOutcome::ParseFailed { .. }) {
        assert_eq!(c, 0.0);
    }

    let _ = out.validate();
    let _ = out.summary();
    let _ = out.to_json();
});
