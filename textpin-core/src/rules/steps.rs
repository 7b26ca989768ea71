// Step handlers — each is a pure (text, params) -> text function over one
// step kind. Dispatch lives in execute(); the engine isolates failures per
// step, so handlers report errors instead of panicking.

use crate::types::{
    CaseMode, CaseTransformParams, FindReplaceParams, PrefixParams, RegexReplaceParams, Step,
    StripLinesParams, StripMode, SuffixParams,
};
use regex::{NoExpand, RegexBuilder};
use thiserror::Error;

/// Failure of a single step. Never aborts the pipeline — the engine records
/// it as a diagnostic and keeps the pre-step text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("unknown step type: {}", .kind.as_deref().unwrap_or("<missing>"))]
    UnknownType { kind: Option<String> },
    #[error("invalid step parameters: {0}")]
    InvalidParams(String),
    #[error("regex error: {0}")]
    Regex(String),
}

/// Apply one step to the text.
pub(crate) fn execute(step: &Step, text: &str) -> Result<String, StepError> {
    match step {
        Step::FindReplace(params) => Ok(find_replace(text, params)),
        Step::RegexReplace(params) => regex_replace(text, params),
        Step::RemoveEmptyLines => Ok(remove_empty_lines(text)),
        Step::CaseTransform(params) => Ok(case_transform(text, params)),
        Step::StripLines(params) => Ok(strip_lines(text, params)),
        Step::AddPrefix(params) => Ok(add_prefix(text, params)),
        Step::AddSuffix(params) => Ok(add_suffix(text, params)),
        Step::Unknown { kind, .. } => Err(StepError::UnknownType { kind: kind.clone() }),
        Step::Malformed { error, .. } => Err(StepError::InvalidParams(error.clone())),
    }
}

/// Literal substring replacement of all non-overlapping occurrences.
/// Case-insensitive matching inserts the replacement verbatim — the case of
/// the matched text is intentionally not preserved.
fn find_replace(text: &str, params: &FindReplaceParams) -> String {
    if params.find.is_empty() {
        return text.to_string();
    }

    if params.case_sensitive {
        text.replace(&params.find, &params.replace)
    } else {
        // Escaped literal, so compilation can only fail on pathological
        // sizes; fall back to the unchanged input in that case
        match RegexBuilder::new(&regex::escape(&params.find))
            .case_insensitive(true)
            .build()
        {
            Ok(re) => re.replace_all(text, NoExpand(&params.replace)).into_owned(),
            Err(_) => text.to_string(),
        }
    }
}

/// Regex substitution of every match. Replacement may reference capture
/// groups (`$1`, `$name`). An invalid pattern is reported, not fatal.
fn regex_replace(text: &str, params: &RegexReplaceParams) -> Result<String, StepError> {
    if params.pattern.is_empty() {
        return Ok(text.to_string());
    }

    let re = RegexBuilder::new(&params.pattern)
        .case_insensitive(params.flags.ignore_case)
        .multi_line(params.flags.multiline)
        .dot_matches_new_line(params.flags.dot_all)
        .build()
        .map_err(|e| StepError::Regex(e.to_string()))?;

    Ok(re.replace_all(text, params.replacement.as_str()).into_owned())
}

/// Drop lines that are empty after trimming whitespace.
fn remove_empty_lines(text: &str) -> String {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whole-text case transform. An unrecognized mode is a no-op.
fn case_transform(text: &str, params: &CaseTransformParams) -> String {
    match &params.mode {
        CaseMode::Upper => text.to_uppercase(),
        CaseMode::Lower => text.to_lowercase(),
        CaseMode::Title => title_case(text),
        CaseMode::Capitalize => capitalize(text),
        CaseMode::Other(_) => text.to_string(),
    }
}

/// Uppercase the first letter of every word, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alphabetic = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_alphabetic {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alphabetic = true;
        } else {
            out.push(ch);
            prev_alphabetic = false;
        }
    }
    out
}

/// Uppercase the first character, lowercase everything else.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Trim whitespace from every line independently.
fn strip_lines(text: &str, params: &StripLinesParams) -> String {
    let trimmed: Vec<&str> = text
        .split('\n')
        .map(|line| match params.mode {
            StripMode::Left => line.trim_start(),
            StripMode::Right => line.trim_end(),
            StripMode::Both => line.trim(),
        })
        .collect();
    trimmed.join("\n")
}

/// Prepend a prefix to every line, or once to the whole text.
fn add_prefix(text: &str, params: &PrefixParams) -> String {
    if params.prefix.is_empty() {
        return text.to_string();
    }

    if params.per_line {
        text.split('\n')
            .map(|line| format!("{}{}", params.prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        format!("{}{}", params.prefix, text)
    }
}

/// Append a suffix to every line, or once to the whole text.
fn add_suffix(text: &str, params: &SuffixParams) -> String {
    if params.suffix.is_empty() {
        return text.to_string();
    }

    if params.per_line {
        text.split('\n')
            .map(|line| format!("{}{}", line, params.suffix))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        format!("{}{}", text, params.suffix)
    }
}
