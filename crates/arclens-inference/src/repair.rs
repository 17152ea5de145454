//! Recovery for malformed or truncated model JSON output.
//!
//! Long structured responses get cut off mid-string or mid-array when the
//! model hits its output limit. Rather than discarding an expensive call,
//! these helpers strip markdown fences, close unbalanced brackets, and as
//! a last resort salvage whole top-level objects or known fields by regex.

use regex::Regex;
use serde_json::Value;
use tracing::warn;

use arclens_core::{Error, Result};

use crate::oracle::PageTranscription;

/// Strip a leading ```json / ``` fence and a trailing ``` fence.
fn strip_fences(raw: &str) -> &str {
    let mut s = raw.trim();
    for prefix in ["```json", "```JSON", "```"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest.trim_start();
            break;
        }
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest.trim_end();
    }
    s
}

/// Repair truncated JSON by closing any open string and unclosed
/// brackets, after dropping a trailing comma. Well-formed input passes
/// through unchanged apart from fence stripping.
pub fn repair_truncated_json(raw: &str) -> String {
    let mut cleaned = strip_fences(raw).to_string();

    let mut in_string = false;
    let mut escaped = false;
    let mut stack: Vec<char> = Vec::new();
    for c in cleaned.chars() {
        if in_string {
            if c == '\\' {
                escaped = !escaped;
            } else if c == '"' && !escaped {
                in_string = false;
            } else {
                escaped = false;
            }
        } else {
            match c {
                '"' => in_string = true,
                '{' => stack.push('}'),
                '[' => stack.push(']'),
                '}' | ']' if stack.last() == Some(&c) => {
                    stack.pop();
                }
                _ => {}
            }
        }
    }

    let trimmed = cleaned.trim_end();
    if let Some(stripped) = trimmed.strip_suffix(',') {
        cleaned = stripped.to_string();
    }
    if in_string {
        cleaned.push('"');
    }
    while let Some(close) = stack.pop() {
        cleaned.push(close);
    }
    cleaned
}

/// Parse a response expected to be a JSON array, salvaging what can be
/// salvaged.
///
/// First tries a full parse after repair (a lone object is wrapped into a
/// one-element list). If that fails, scans for balanced top-level objects
/// and keeps every one that parses on its own, silently dropping the
/// broken tail.
pub fn salvage_json_list(raw: &str) -> Vec<Value> {
    let repaired = repair_truncated_json(raw);
    if let Ok(parsed) = serde_json::from_str::<Value>(&repaired) {
        return match parsed {
            Value::Array(items) => items,
            other => vec![other],
        };
    }

    warn!("Full parse of model list output failed, salvaging objects");
    let cleaned = strip_fences(raw);
    let mut objects = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in cleaned.char_indices() {
        if in_string {
            if c == '\\' {
                escaped = !escaped;
            } else if c == '"' && !escaped {
                in_string = false;
            } else {
                escaped = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(s) = start.take() {
                        let candidate = &cleaned[s..=i];
                        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                            objects.push(value);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    objects
}

/// Parse a transcription response, falling back to field-level regex
/// extraction when even the repaired JSON will not parse. Errors only if
/// no transcription text can be recovered at all.
pub fn parse_transcription_json(raw: &str) -> Result<PageTranscription> {
    let repaired = repair_truncated_json(raw);
    if let Ok(parsed) = serde_json::from_str::<PageTranscription>(&repaired) {
        return Ok(parsed);
    }

    warn!("Transcription JSON parse failed, attempting regex salvage");
    let transcription = extract_string_field(&repaired, "transcription");
    let translation = extract_string_field(&repaired, "translation");
    let confidence = extract_int_field(&repaired, "confidenceScore");

    match transcription {
        Some(transcription) => Ok(PageTranscription {
            transcription,
            translation: translation.unwrap_or_default(),
            confidence_score: confidence.unwrap_or(3),
        }),
        None => Err(Error::Inference(
            "Unrecoverable transcription response".to_string(),
        )),
    }
}

fn extract_string_field(json: &str, field: &str) -> Option<String> {
    let pattern = format!(r#""{field}"\s*:\s*"((?s).*?)"\s*[,}}]"#);
    let re = Regex::new(&pattern).ok()?;
    let captured = re.captures(json)?.get(1)?.as_str();
    Some(captured.replace("\\n", "\n").replace("\\\"", "\""))
}

fn extract_int_field(json: &str, field: &str) -> Option<u8> {
    let pattern = format!(r#""{field}"\s*:\s*(\d+)"#);
    let re = Regex::new(&pattern).ok()?;
    re.captures(json)?.get(1)?.as_str().parse().ok()
}
