//! Textual codec for embedding vectors.
//!
//! Vectors persist as JSON float-array text on the item record. Decoding
//! is total: empty, blank, or malformed text yields an empty vector so a
//! corrupt stored vector degrades search quality instead of breaking it.

/// Encode a vector as JSON array text.
pub fn encode(vector: &[f32]) -> String {
    serde_json::to_string(vector).unwrap_or_else(|_| "[]".to_string())
}

/// Decode JSON array text into a vector. Never fails.
pub fn decode(text: &str) -> Vec<f32> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Vec<f32>>(text) {
        Ok(vector) => vector,
        Err(err) => {
            let preview: String = text.chars().take(100).collect();
            log::warn!("failed to decode stored vector ({err}): {preview}");
            Vec::new()
        }
    }
}
