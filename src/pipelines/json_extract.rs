//! Utility functions for cleaning and parsing planner responses.
//!
//! Both orchestrators go through `parse_wrapped_list` so that fence stripping,
//! prose removal and wrapper unwrapping behave identically for plans and
//! roadmaps.
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Sanitize raw model output before JSON extraction
pub fn sanitize_raw_output(raw: &str) -> String {
    let mut sanitized = raw.to_string();

    // Markdown code fences
    sanitized = sanitized.replace("```json", "");
    sanitized = sanitized.replace("```JSON", "");
    sanitized = sanitized.replace("```", "");

    // Smart quotes
    sanitized = sanitized.replace('\u{201C}', "\"");
    sanitized = sanitized.replace('\u{201D}', "\"");
    sanitized = sanitized.replace('\u{2018}', "'");
    sanitized = sanitized.replace('\u{2019}', "'");

    sanitized.trim().to_string()
}

/// Remove trailing commas before `}` or `]` outside of string literals
pub fn remove_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut result = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escape_next = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if escape_next {
            escape_next = false;
        } else if in_string {
            match ch {
                '\\' => escape_next = true,
                '"' => in_string = false,
                _ => {}
            }
        } else if ch == '"' {
            in_string = true;
        } else if ch == ',' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && matches!(chars[j], '}' | ']') {
                i += 1;
                continue;
            }
        }

        result.push(ch);
        i += 1;
    }

    result
}

/// Byte offset one past the bracket that closes the one at `start`.
/// Tracks strings and escapes; `None` when the input ends first.
fn find_balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => stack.push(ch),
            '}' | ']' if !in_string => {
                let expected = if ch == '}' { '{' } else { '[' };
                if stack.pop() != Some(expected) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(start + offset + ch.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}

fn parses(candidate: &str) -> bool {
    serde_json::from_str::<Value>(candidate).is_ok()
}

/// Every well-formed JSON document in the output, in order of appearance.
///
/// The text as-is or sanitized wins outright; otherwise each balanced
/// `{...}` / `[...]` span that parses is a candidate.
fn json_candidates(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if parses(trimmed) {
        return vec![trimmed.to_string()];
    }

    let sanitized = sanitize_raw_output(text);
    let cleaned = remove_trailing_commas(&sanitized);
    if parses(&cleaned) {
        tracing::debug!("Parsed JSON after sanitizing");
        return vec![cleaned];
    }

    let mut candidates = Vec::new();
    for (start, ch) in sanitized.char_indices() {
        if ch != '{' && ch != '[' {
            continue;
        }
        if let Some(end) = find_balanced_end(&sanitized, start) {
            let candidate = remove_trailing_commas(&sanitized[start..end]);
            if parses(&candidate) {
                tracing::debug!(offset = start, "Found embedded JSON span");
                candidates.push(candidate);
            }
        }
    }
    candidates
}

/// Extract the first well-formed JSON object or array from model output.
pub fn extract_json(text: &str) -> anyhow::Result<String> {
    match json_candidates(text).into_iter().next() {
        Some(json) => Ok(json),
        None => anyhow::bail!(
            "Failed to extract valid JSON from response. Text length: {}, Preview (first 200 chars): {}",
            text.len(),
            text.chars().take(200).collect::<String>()
        ),
    }
}

fn unwrap_list(value: Value, key: &str) -> anyhow::Result<Value> {
    match value {
        Value::Array(items) => Ok(Value::Array(items)),
        Value::Object(mut map) => {
            if let Some(inner @ Value::Array(_)) = map.remove(key) {
                Ok(inner)
            } else if map.len() == 1 {
                match map.into_iter().next() {
                    Some((_, inner @ Value::Array(_))) => Ok(inner),
                    _ => anyhow::bail!("Wrapper object does not hold an array"),
                }
            } else {
                anyhow::bail!("Expected an array or an object with a '{}' array", key)
            }
        }
        other => anyhow::bail!("Expected a JSON array, got {}", type_name(&other)),
    }
}

/// Parse a list out of a response that is either a bare array or an object
/// wrapping the array under `key` (or under its only key).
///
/// Embedded spans are tried in order, so a stray `[1]` in the prose does not
/// shadow the payload after it. The first span's error is reported when none fit.
pub fn parse_wrapped_list<T: DeserializeOwned>(raw: &str, key: &str) -> anyhow::Result<Vec<T>> {
    let candidates = json_candidates(raw);
    if candidates.is_empty() {
        extract_json(raw)?;
    }

    let mut first_error = None;
    for json in candidates {
        let attempt = serde_json::from_str::<Value>(&json)
            .map_err(anyhow::Error::from)
            .and_then(|value| unwrap_list(value, key))
            .and_then(|list| serde_json::from_value::<Vec<T>>(list).map_err(anyhow::Error::from));

        match attempt {
            Ok(items) => return Ok(items),
            Err(e) => {
                tracing::debug!(error = %e, "JSON span does not hold the expected list");
                first_error.get_or_insert(e);
            }
        }
    }

    Err(first_error.unwrap_or_else(|| anyhow::anyhow!("No JSON found in response")))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
