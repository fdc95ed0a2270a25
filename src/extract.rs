//! Best-effort extraction of a JSON object embedded in model prose.
//!
//! Generative services frequently wrap the requested JSON in
//! explanation text. The policy is: take the substring from the first
//! `{` to the last `}`, parse it, and report any failure as `None` so
//! callers can fall back to their defaults.

use serde_json::Value;

/// Extract and parse the outermost JSON object from free text.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}
