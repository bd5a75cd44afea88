// src/core/phonetic.rs
use pinyin::ToPinyin;

/// Maps text to its phonetic key, e.g. "广州" -> "gz".
///
/// Implementations must be deterministic and total: every input yields a key,
/// characters without a reading may contribute nothing.
pub trait PhoneticKeys {
    fn abbreviate(&self, text: &str) -> String;
}

impl<F> PhoneticKeys for F
where
    F: Fn(&str) -> String,
{
    fn abbreviate(&self, text: &str) -> String {
        self(text)
    }
}

/// First letter of each Han character's pinyin. ASCII letters and digits pass
/// through, anything else is dropped. Always lower-case.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinyinInitials;

impl PinyinInitials {
    pub fn new() -> Self {
        Self
    }
}

impl PhoneticKeys for PinyinInitials {
    fn abbreviate(&self, text: &str) -> String {
        let mut key = String::with_capacity(text.len());
        for c in text.chars() {
            if let Some(reading) = c.to_pinyin() {
                key.push_str(reading.first_letter());
            } else if c.is_ascii_alphanumeric() {
                key.push(c);
            }
        }
        key.to_lowercase()
    }
}
