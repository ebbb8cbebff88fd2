//! Configurable string validation policy.
//!
//! The disallowed set and length bound are heuristics layered on top of
//! parameter binding, so they are carried as data instead of constants baked
//! into the validators.

use super::{Rejection, ValidationError, ValidationResult};

/// Default upper bound for free-text input, in characters.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 200;
/// Characters rejected by the default policy.
pub const DEFAULT_DISALLOWED_CHARS: &[char] = &[';', '"', '\\'];
/// Bound for `albums.Title` input.
pub const TITLE_MAX_CHARS: usize = 100;
/// Bound for album search terms.
pub const SEARCH_TERM_MAX_CHARS: usize = 50;

/// Rules applied by [`ValidationPolicy::validate_string`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Maximum accepted length in characters, after trimming.
    pub max_length: usize,
    /// Characters that cause rejection wherever they appear.
    pub disallowed_chars: Vec<char>,
    /// Rejects characters below U+0020 (tabs and newlines included).
    pub reject_control_chars: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_INPUT_CHARS,
            disallowed_chars: DEFAULT_DISALLOWED_CHARS.to_vec(),
            reject_control_chars: true,
        }
    }
}

impl ValidationPolicy {
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_disallowed_chars(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.disallowed_chars = chars.into_iter().collect();
        self
    }

    pub fn with_control_chars_rejected(mut self, reject: bool) -> Self {
        self.reject_control_chars = reject;
        self
    }

    /// Trims `raw` and checks it against this policy.
    ///
    /// Checks run in order: empty, length, disallowed characters, control
    /// characters. The first failing check determines the rejection.
    pub fn validate_string(&self, raw: &str, field_name: &str) -> ValidationResult<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::new(field_name, Rejection::Empty));
        }

        if trimmed.chars().count() > self.max_length {
            return Err(ValidationError::new(
                field_name,
                Rejection::TooLong {
                    max: self.max_length,
                },
            ));
        }

        let found = self
            .disallowed_chars
            .iter()
            .copied()
            .filter(|candidate| trimmed.contains(*candidate))
            .collect::<Vec<_>>();
        if !found.is_empty() {
            return Err(ValidationError::new(
                field_name,
                Rejection::DisallowedCharacters(found),
            ));
        }

        if self.reject_control_chars && trimmed.chars().any(|ch| u32::from(ch) < 0x20) {
            return Err(ValidationError::new(field_name, Rejection::ControlCharacter));
        }

        Ok(trimmed.to_string())
    }
}
