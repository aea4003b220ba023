//! Text processing tools.

use crate::{envelope, fields, Args, ToolError, ToolResult};
use regex::{Regex, RegexBuilder};
use serde_json::{json, Value};

const DEFAULT_MAX_MATCHES: i64 = 100;

/// Character, word, line, sentence and paragraph counts.
pub fn text_stats(args: &Value) -> Value {
    envelope(text_stats_impl(args))
}

fn text_stats_impl(args: &Value) -> ToolResult {
    let args = Args::new(args)?;
    let text = args.str("text")?;

    let characters = text.chars().count();
    let characters_no_spaces = text.chars().filter(|c| !c.is_whitespace()).count();
    let words = text.split_whitespace().count();
    let lines = text.lines().count();
    let sentences = text
        .split(|c: char| c == '.' || c == '!' || c == '?')
        .filter(|s| !s.trim().is_empty())
        .count();
    let paragraphs = text
        .split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .count();

    Ok(fields(json!({
        "characters": characters,
        "characters_no_spaces": characters_no_spaces,
        "words": words,
        "lines": lines,
        "sentences": sentences,
        "paragraphs": paragraphs,
    })))
}

/// Convert text to upper, lower, title, snake, kebab or camel case.
pub fn transform_case(args: &Value) -> Value {
    envelope(transform_case_impl(args))
}

fn transform_case_impl(args: &Value) -> ToolResult {
    let args = Args::new(args)?;
    let text = args.str("text")?;
    let mode = args.str("mode")?;

    let result = match mode.to_ascii_lowercase().as_str() {
        "upper" => text.to_uppercase(),
        "lower" => text.to_lowercase(),
        "title" => text
            .split_whitespace()
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" "),
        "snake" => identifier_words(text).join("_"),
        "kebab" => identifier_words(text).join("-"),
        "camel" => identifier_words(text)
            .iter()
            .enumerate()
            .map(|(i, w)| if i == 0 { w.clone() } else { capitalize(w) })
            .collect(),
        _ => {
            return Err(ToolError::InvalidField {
                field: "mode",
                expected: "must be one of upper, lower, title, snake, kebab, camel",
            })
        }
    };

    Ok(fields(json!({ "result": result, "mode": mode })))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Lower-cased alphanumeric runs, splitting on camelCase boundaries too.
fn identifier_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in text.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_numeric();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn build_regex(pattern: &str, case_insensitive: bool) -> Result<Regex, ToolError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| ToolError::Failed(format!("invalid pattern: {}", e)))
}

/// Find regex matches with their byte offsets and capture groups.
pub fn regex_search(args: &Value) -> Value {
    envelope(regex_search_impl(args))
}

fn regex_search_impl(args: &Value) -> ToolResult {
    let args = Args::new(args)?;
    let pattern = args.str("pattern")?;
    let text = args.str("text")?;
    let case_insensitive = args.opt_bool("case_insensitive")?.unwrap_or(false);
    let max_matches = args.opt_i64("max_matches")?.unwrap_or(DEFAULT_MAX_MATCHES);
    if max_matches < 1 {
        return Err(ToolError::InvalidField {
            field: "max_matches",
            expected: "must be at least 1",
        });
    }

    let re = build_regex(pattern, case_insensitive)?;
    let mut total = 0usize;
    let mut matches = Vec::new();
    for caps in re.captures_iter(text) {
        total += 1;
        if matches.len() as i64 >= max_matches {
            continue;
        }
        let Some(whole) = caps.get(0) else { continue };
        let groups: Vec<Value> = caps
            .iter()
            .skip(1)
            .map(|g| g.map_or(Value::Null, |m| Value::String(m.as_str().to_string())))
            .collect();
        matches.push(json!({
            "match": whole.as_str(),
            "start": whole.start(),
            "end": whole.end(),
            "groups": groups,
        }));
    }

    Ok(fields(json!({
        "count": total,
        "truncated": total > matches.len(),
        "matches": matches,
    })))
}

/// Replace every regex match; `$1`-style group references are expanded.
pub fn regex_replace(args: &Value) -> Value {
    envelope(regex_replace_impl(args))
}

fn regex_replace_impl(args: &Value) -> ToolResult {
    let args = Args::new(args)?;
    let pattern = args.str("pattern")?;
    let replacement = args.str("replacement")?;
    let text = args.str("text")?;
    let case_insensitive = args.opt_bool("case_insensitive")?.unwrap_or(false);

    let re = build_regex(pattern, case_insensitive)?;
    let replacements = re.find_iter(text).count();
    let result = re.replace_all(text, replacement).into_owned();

    Ok(fields(json!({
        "result": result,
        "replacements": replacements,
    })))
}

/// Pull emails, URLs, phone numbers or numbers out of free text.
pub fn extract_patterns(args: &Value) -> Value {
    envelope(extract_patterns_impl(args))
}

fn extract_patterns_impl(args: &Value) -> ToolResult {
    let args = Args::new(args)?;
    let text = args.str("text")?;
    let kind = args.str("kind")?;

    let pattern = match kind {
        "emails" => r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}",
        "urls" => r#"https?://[^\s<>"']+"#,
        "phone_numbers" => r"\+?\d[\d\s().-]{6,}\d",
        "numbers" => r"-?\d+(?:\.\d+)?",
        _ => {
            return Err(ToolError::InvalidField {
                field: "kind",
                expected: "must be one of emails, urls, phone_numbers, numbers",
            })
        }
    };
    let re = build_regex(pattern, false)?;

    let mut found: Vec<String> = Vec::new();
    for m in re.find_iter(text) {
        let item = match kind {
            "urls" => m.as_str().trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | ')' | '!' | '?')),
            _ => m.as_str(),
        };
        if !found.iter().any(|f| f == item) {
            found.push(item.to_string());
        }
    }

    Ok(fields(json!({
        "kind": kind,
        "count": found.len(),
        "items": found,
    })))
}

/// Cut text to at most `max_chars` characters, appending a suffix when cut.
pub fn truncate_text(args: &Value) -> Value {
    envelope(truncate_text_impl(args))
}

fn truncate_text_impl(args: &Value) -> ToolResult {
    let args = Args::new(args)?;
    let text = args.str("text")?;
    let max_chars = args.i64("max_chars")?;
    let suffix = args.opt_str("suffix")?.unwrap_or("...");
    let max_chars = usize::try_from(max_chars).map_err(|_| ToolError::InvalidField {
        field: "max_chars",
        expected: "must not be negative",
    })?;

    let original_length = text.chars().count();
    let truncated = original_length > max_chars;
    let result = if truncated {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push_str(suffix);
        cut
    } else {
        text.to_string()
    };

    Ok(fields(json!({
        "result": result,
        "truncated": truncated,
        "original_length": original_length,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_stats() {
        let out = text_stats(&json!({
            "text": "Hello world. How are you?\n\nFine thanks!"
        }));
        assert_eq!(out["success"], true);
        assert_eq!(out["words"], 7);
        assert_eq!(out["sentences"], 3);
        assert_eq!(out["paragraphs"], 2);
        assert_eq!(out["lines"], 3);
    }

    #[test]
    fn test_text_stats_requires_text() {
        let out = text_stats(&json!({}));
        assert_eq!(out["success"], false);
        assert_eq!(out["error"], "missing required field 'text'");
    }

    #[test]
    fn test_transform_case_modes() {
        let run = |mode: &str| transform_case(&json!({ "text": "helloWorld from rust", "mode": mode }));
        assert_eq!(run("upper")["result"], "HELLOWORLD FROM RUST");
        assert_eq!(run("title")["result"], "Helloworld From Rust");
        assert_eq!(run("snake")["result"], "hello_world_from_rust");
        assert_eq!(run("kebab")["result"], "hello-world-from-rust");
        assert_eq!(run("camel")["result"], "helloWorldFromRust");
        assert_eq!(run("shouty")["success"], false);
    }

    #[test]
    fn test_regex_search_reports_groups() {
        let out = regex_search(&json!({
            "pattern": r"(\w+)@(\w+)\.com",
            "text": "mail ann@example.com or bob@test.com"
        }));
        assert_eq!(out["count"], 2);
        assert_eq!(out["matches"][0]["match"], "ann@example.com");
        assert_eq!(out["matches"][0]["start"], 5);
        assert_eq!(out["matches"][1]["groups"], json!(["bob", "test"]));
        assert_eq!(out["truncated"], false);
    }

    #[test]
    fn test_regex_search_limits_and_errors() {
        let out = regex_search(&json!({ "pattern": "a", "text": "aaaa", "max_matches": 2 }));
        assert_eq!(out["count"], 4);
        assert_eq!(out["matches"].as_array().unwrap().len(), 2);
        assert_eq!(out["truncated"], true);

        let bad = regex_search(&json!({ "pattern": "(", "text": "x" }));
        assert_eq!(bad["success"], false);
        assert!(bad["error"].as_str().unwrap().starts_with("invalid pattern"));
    }

    #[test]
    fn test_regex_replace() {
        let out = regex_replace(&json!({
            "pattern": r"(\d+)-(\d+)",
            "replacement": "$2-$1",
            "text": "10-20 and 3-4"
        }));
        assert_eq!(out["result"], "20-10 and 4-3");
        assert_eq!(out["replacements"], 2);
    }

    #[test]
    fn test_extract_patterns() {
        let text = "Write to a@b.io, see https://example.com/docs. Call +1 (555) 123-4567. a@b.io";
        let emails = extract_patterns(&json!({ "text": text, "kind": "emails" }));
        assert_eq!(emails["items"], json!(["a@b.io"]));

        let urls = extract_patterns(&json!({ "text": text, "kind": "urls" }));
        assert_eq!(urls["items"], json!(["https://example.com/docs"]));

        let phones = extract_patterns(&json!({ "text": text, "kind": "phone_numbers" }));
        assert_eq!(phones["count"], 1);

        let bad = extract_patterns(&json!({ "text": text, "kind": "colors" }));
        assert_eq!(bad["success"], false);
    }

    #[test]
    fn test_truncate_text_respects_char_boundaries() {
        let out = truncate_text(&json!({ "text": "héllo wörld", "max_chars": 5 }));
        assert_eq!(out["result"], "héllo...");
        assert_eq!(out["truncated"], true);
        assert_eq!(out["original_length"], 11);

        let short = truncate_text(&json!({ "text": "hi", "max_chars": 5, "suffix": "~" }));
        assert_eq!(short["result"], "hi");
        assert_eq!(short["truncated"], false);

        let negative = truncate_text(&json!({ "text": "hi", "max_chars": -1 }));
        assert_eq!(negative["success"], false);
    }
}
