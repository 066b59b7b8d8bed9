//! Extraction of structured content from model output.

use serde_json::{json, Value};
use tracing::warn;

/// Parses the JSON object embedded in `text`.
///
/// Takes the span from the first `{` to the last `}`. When there is no such
/// span or it is not valid JSON, returns `{"rawContent": text}`.
pub fn parse_generated_content(text: &str) -> Value {
    let span = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => {
            warn!("Generated content contains no JSON object, using raw content");
            return raw_content(text);
        }
    };

    match serde_json::from_str(span) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Failed to parse generated content as JSON, using raw content");
            raw_content(text)
        }
    }
}

fn raw_content(text: &str) -> Value {
    json!({ "rawContent": text })
}
