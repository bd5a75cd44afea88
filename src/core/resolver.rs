// src/core/resolver.rs
use crate::core::phonetic::PhoneticKeys;
use crate::core::types::{MatchOutcome, MatchVia, Resolution};
use tracing::debug;

/// `raw` as plain ASCII digits if it is made of digits only. Fullwidth
/// digits from CJK input methods are folded to ASCII; "+1" or " 1" are text.
pub fn index_digits(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    raw.chars()
        .map(|c| match c {
            '0'..='9' => Some(c),
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32),
            _ => None,
        })
        .collect()
}

/// Parses `raw` as a 1-based index into `candidates`.
pub fn select_index<'a>(raw: &str, candidates: &'a [String]) -> Option<&'a str> {
    let n: usize = index_digits(raw)?.parse().ok()?;
    if n >= 1 && n <= candidates.len() {
        Some(candidates[n - 1].as_str())
    } else {
        None
    }
}

/// Candidates whose phonetic key equals `raw` (when `phonetic`) or that contain
/// `raw` as a substring. Case-insensitive, vocabulary order kept.
pub fn text_matches<'a>(
    raw: &str,
    candidates: &'a [String],
    phonetic: bool,
    keys: &dyn PhoneticKeys,
) -> Vec<&'a String> {
    let needle = raw.to_lowercase();
    candidates
        .iter()
        .filter(|candidate| {
            (phonetic && keys.abbreviate(candidate).to_lowercase() == needle)
                || candidate.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Resolves operator input against a field's vocabulary.
///
/// Precedence: blank input with a default, then index selection, then
/// phonetic/substring matching. No match means the input is taken verbatim.
pub fn resolve(
    raw: &str,
    candidates: &[String],
    phonetic: bool,
    default: Option<&str>,
    keys: &dyn PhoneticKeys,
) -> Resolution {
    if raw.is_empty() {
        if let Some(default) = default {
            return Resolution {
                outcome: MatchOutcome::Selected(default.to_string()),
                via: MatchVia::Default,
            };
        }
    }

    if let Some(chosen) = select_index(raw, candidates) {
        debug!(input = raw, chosen, "index selection");
        return Resolution {
            outcome: MatchOutcome::Selected(chosen.to_string()),
            via: MatchVia::Index,
        };
    }

    let matches = text_matches(raw, candidates, phonetic, keys);
    debug!(input = raw, matches = matches.len(), phonetic, "text matching");
    match matches.as_slice() {
        [] => Resolution {
            outcome: MatchOutcome::Literal(raw.to_string()),
            via: MatchVia::Verbatim,
        },
        [only] => Resolution {
            outcome: MatchOutcome::Selected((*only).clone()),
            via: MatchVia::Text,
        },
        many => Resolution {
            outcome: MatchOutcome::Ambiguous(many.iter().map(|s| (*s).clone()).collect()),
            via: MatchVia::Text,
        },
    }
}
