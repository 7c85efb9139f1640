//! LLM response parsing into typed decisions.
//!
//! The LLM returns raw text (ideally JSON). This module extracts and
//! validates it into a [`Decision`]. Unlike a lenient fallback, a response
//! that survives none of the recovery strategies is an error: the engine
//! turns it into an `IDLE` fallback with a diagnostic note.

use soul_types::{ActionType, Decision, Target};

use crate::error::RunnerError;

/// Intermediate shape of the LLM's JSON before validation.
#[derive(Debug, serde::Deserialize)]
struct RawDecision {
    action: String,
    #[serde(default)]
    target: serde_json::Value,
    #[serde(default)]
    thought: String,
}

/// Parse an LLM response into a validated [`Decision`].
///
/// Recovery strategies, in order:
/// 1. Direct `serde_json` deserialization
/// 2. JSON extracted from a markdown code block
/// 3. Trailing commas stripped
/// 4. Code block extraction, then trailing commas stripped
///
/// # Errors
///
/// Returns [`RunnerError::Parse`] if no strategy yields a well-formed
/// object, or if its action or target is invalid.
pub fn parse_decision(raw: &str) -> Result<Decision, RunnerError> {
    let trimmed = raw.trim();

    let mut candidates = vec![trimmed.to_owned(), strip_trailing_commas(trimmed)];
    if let Some(block) = extract_json_from_codeblock(trimmed) {
        candidates.insert(1, block.to_owned());
        candidates.push(strip_trailing_commas(block));
    }

    let parsed = candidates
        .iter()
        .find_map(|candidate| serde_json::from_str::<RawDecision>(candidate).ok())
        .ok_or_else(|| RunnerError::Parse(format!("no decision object in response: {trimmed}")))?;

    convert(&parsed)
}

/// Validate a deserialized response.
fn convert(raw: &RawDecision) -> Result<Decision, RunnerError> {
    let action = ActionType::from_name(&raw.action)
        .ok_or_else(|| RunnerError::Parse(format!("unknown action: {}", raw.action)))?;
    let target = parse_target(&raw.target)?;
    Ok(Decision::new(action, raw.thought.trim()).with_target(target))
}

/// Interpret the `target` field.
///
/// Accepts `null`, `{}`, `{"x": int, "y": int}`, and
/// `{"entity_id": str}` (or `{"id": str}`).
fn parse_target(value: &serde_json::Value) -> Result<Target, RunnerError> {
    let object = match value {
        serde_json::Value::Null => return Ok(Target::None),
        serde_json::Value::Object(map) if map.is_empty() => return Ok(Target::None),
        serde_json::Value::Object(map) => map,
        other => return Err(RunnerError::Parse(format!("target is not an object: {other}"))),
    };

    if let (Some(x), Some(y)) = (object.get("x"), object.get("y")) {
        let x = coordinate(x, "x")?;
        let y = coordinate(y, "y")?;
        return Ok(Target::Coordinate { x, y });
    }

    if let Some(id) = object.get("entity_id").or_else(|| object.get("id")) {
        return id
            .as_str()
            .filter(|id| !id.trim().is_empty())
            .map(|id| Target::EntityReference { id: id.trim().to_owned() })
            .ok_or_else(|| RunnerError::Parse(format!("entity target is not a string: {id}")));
    }

    Err(RunnerError::Parse(format!(
        "target needs x and y or entity_id: {value}"
    )))
}

fn coordinate(value: &serde_json::Value, axis: &str) -> Result<i32, RunnerError> {
    value
        .as_i64()
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| RunnerError::Parse(format!("target {axis} is not an integer: {value}")))
}

/// Extract JSON from a markdown code block.
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let fence = text.find("```")?;
    let after_fence = fence.checked_add(3)?;
    let rest = text.get(after_fence..)?;
    // Skip the info string (e.g. `json`) up to the end of the line.
    let body_start = rest.find('\n').and_then(|nl| nl.checked_add(1)).unwrap_or(0);
    let body = rest.get(body_start..)?;
    let end = body.find("```")?;
    body.get(..end).map(str::trim)
}

/// Strip trailing commas before closing braces and brackets (common LLM error).
fn strip_trailing_commas(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ',' {
            let lookahead: String = chars
                .clone()
                .skip_while(|next| next.is_whitespace())
                .take(1)
                .collect();
            if lookahead == "}" || lookahead == "]" {
                continue;
            }
        }
        result.push(c);
    }

    result
}
