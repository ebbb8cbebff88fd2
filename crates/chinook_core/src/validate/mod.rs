//! Input validation applied before any value reaches a query.
//!
//! # Responsibility
//! - Normalize raw user input into typed values (`i64`, trimmed `String`).
//! - Reject empty, oversized, non-numeric and disallowed-character input with
//!   a reason that names the offending field.
//!
//! # Invariants
//! - Every validator is pure: no I/O, no logging, same input -> same result.
//! - Accepted strings are returned trimmed and otherwise unchanged.
//! - Apostrophes are accepted; values are always bound as parameters.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::IntErrorKind;

mod policy;

pub use policy::{
    ValidationPolicy, DEFAULT_DISALLOWED_CHARS, DEFAULT_MAX_INPUT_CHARS, SEARCH_TERM_MAX_CHARS,
    TITLE_MAX_CHARS,
};

static INTEGER_LITERAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+$").expect("valid integer literal regex"));

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Reason a raw value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    TooLong { max: usize },
    DisallowedCharacters(Vec<char>),
    ControlCharacter,
    NotNumeric,
    NotPositive,
    Overflow,
    OutOfRange { min: i64, max: i64 },
    NotAnOption { expected: &'static [&'static str] },
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "cannot be empty"),
            Self::TooLong { max } => write!(f, "is too long (maximum {max} characters)"),
            Self::DisallowedCharacters(chars) => {
                let listed = chars
                    .iter()
                    .map(char::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "contains invalid characters: {listed}")
            }
            Self::ControlCharacter => write!(f, "contains invalid control characters"),
            Self::NotNumeric => write!(f, "must be a valid number"),
            Self::NotPositive => write!(f, "must be a positive number (greater than 0)"),
            Self::Overflow => write!(f, "is too large"),
            Self::OutOfRange { min, max } => {
                write!(f, "must be a number between {min} and {max}")
            }
            Self::NotAnOption { expected } => {
                write!(f, "must be one of: {}", expected.join(", "))
            }
        }
    }
}

/// Rejected input, tagged with the field it was collected for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub reason: Rejection,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: Rejection) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

impl Error for ValidationError {}

/// Raw value that can be checked by [`validate_positive_integer`].
///
/// Text input is trimmed and parsed; numeric input is range-checked only.
pub trait IntegerInput {
    fn to_integer(&self) -> Result<i64, Rejection>;
}

impl IntegerInput for str {
    fn to_integer(&self) -> Result<i64, Rejection> {
        parse_integer_text(self)
    }
}

impl IntegerInput for String {
    fn to_integer(&self) -> Result<i64, Rejection> {
        parse_integer_text(self)
    }
}

impl IntegerInput for i64 {
    fn to_integer(&self) -> Result<i64, Rejection> {
        Ok(*self)
    }
}

impl IntegerInput for i32 {
    fn to_integer(&self) -> Result<i64, Rejection> {
        Ok(i64::from(*self))
    }
}

impl IntegerInput for u32 {
    fn to_integer(&self) -> Result<i64, Rejection> {
        Ok(i64::from(*self))
    }
}

impl IntegerInput for u64 {
    fn to_integer(&self) -> Result<i64, Rejection> {
        i64::try_from(*self).map_err(|_| Rejection::Overflow)
    }
}

/// Validates a store identifier or count: an integer `> 0` that fits `i64`.
///
/// # Errors
/// - `Empty` / `NotNumeric` for blank or non-integer text.
/// - `NotPositive` for zero and negative values (including negative overflow).
/// - `Overflow` for values above `i64::MAX`.
pub fn validate_positive_integer<T>(raw: &T, field_name: &str) -> ValidationResult<i64>
where
    T: IntegerInput + ?Sized,
{
    match raw.to_integer() {
        Ok(value) if value > 0 => Ok(value),
        Ok(_) => Err(ValidationError::new(field_name, Rejection::NotPositive)),
        Err(reason) => Err(ValidationError::new(field_name, reason)),
    }
}

/// Validates free text with the default disallowed set and `max_length`.
///
/// Returns the trimmed value.
pub fn validate_string(raw: &str, field_name: &str, max_length: usize) -> ValidationResult<String> {
    ValidationPolicy::default()
        .with_max_length(max_length)
        .validate_string(raw, field_name)
}

/// Validates a numbered menu selection within `[min_value, max_value]`.
pub fn validate_menu_choice(raw: &str, min_value: i64, max_value: i64) -> ValidationResult<i64> {
    const FIELD: &str = "Choice";

    let value = match parse_integer_text(raw) {
        Ok(value) => value,
        Err(Rejection::Overflow) | Err(Rejection::NotPositive) => {
            return Err(ValidationError::new(
                FIELD,
                Rejection::OutOfRange {
                    min: min_value,
                    max: max_value,
                },
            ));
        }
        Err(reason) => return Err(ValidationError::new(FIELD, reason)),
    };

    if (min_value..=max_value).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::new(
            FIELD,
            Rejection::OutOfRange {
                min: min_value,
                max: max_value,
            },
        ))
    }
}

/// Matches a keyword answer (case-insensitive, trimmed) against `options`.
///
/// Returns the matching entry of `options`.
pub fn validate_option(
    raw: &str,
    field_name: &str,
    options: &'static [&'static str],
) -> ValidationResult<&'static str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field_name, Rejection::Empty));
    }
    options
        .iter()
        .copied()
        .find(|option| option.eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| {
            ValidationError::new(field_name, Rejection::NotAnOption { expected: options })
        })
}

fn parse_integer_text(raw: &str) -> Result<i64, Rejection> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Rejection::Empty);
    }
    if !INTEGER_LITERAL_RE.is_match(trimmed) {
        return Err(Rejection::NotNumeric);
    }

    trimmed.parse::<i64>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow => Rejection::Overflow,
        // Below i64::MIN is still "not positive" for every caller here.
        IntErrorKind::NegOverflow => Rejection::NotPositive,
        _ => Rejection::NotNumeric,
    })
}
