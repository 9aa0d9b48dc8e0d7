//! Percent-encoding of single path steps and request segments.
//!
//! Only RFC 3986 unreserved characters (`A-Z a-z 0-9 - . _ ~`) pass through
//! unchanged; everything else, including `/`, is escaped so an encoded step
//! never splits into two.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::TypeError;

const STEP: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode one step.
pub fn encode_step(step: &str) -> String {
    utf8_percent_encode(step, STEP).to_string()
}

/// Decode a percent-encoded step. Fails on sequences that are not UTF-8.
pub fn decode_step(encoded: &str) -> Result<String, TypeError> {
    percent_decode_str(encoded)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| TypeError::InvalidStep(format!("{encoded}: {e}")))
}
