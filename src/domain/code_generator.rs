//! Random promo code generation.
//!
//! Candidates are checked against a snapshot of the existing codes supplied
//! by the caller. The check is advisory: the unique index on
//! `promo_codes(hub_id, code)` remains the authority at insert time.

use std::collections::HashSet;

use chrono::{NaiveDateTime, Utc};
use rand::Rng;

/// Symbols a generated code is drawn from.
pub const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of the random part when the caller does not specify one.
pub const DEFAULT_CODE_LENGTH: usize = 8;

/// Number of random candidates tried before falling back.
pub const MAX_GENERATION_ATTEMPTS: usize = 100;

/// Shape of the codes to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeOptions {
    /// Number of random symbols appended to the prefix.
    pub length: usize,
    /// Fixed text placed in front of the random part.
    pub prefix: String,
}

impl Default for CodeOptions {
    fn default() -> Self {
        Self {
            length: DEFAULT_CODE_LENGTH,
            prefix: String::new(),
        }
    }
}

impl CodeOptions {
    /// Options with the given random-part length and no prefix.
    pub fn with_length(length: usize) -> Self {
        Self {
            length,
            ..Self::default()
        }
    }

    /// Place `prefix` in front of every generated code.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

/// Outcome of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedCode {
    /// Random code that did not collide with any existing code.
    Unique(String),
    /// Timestamp-derived code produced after every random attempt collided.
    /// It was not checked against the existing codes and may collide.
    Fallback(String),
}

impl GeneratedCode {
    /// Borrow the generated code.
    pub fn as_str(&self) -> &str {
        match self {
            GeneratedCode::Unique(code) | GeneratedCode::Fallback(code) => code,
        }
    }

    /// Take the generated code.
    pub fn into_code(self) -> String {
        match self {
            GeneratedCode::Unique(code) | GeneratedCode::Fallback(code) => code,
        }
    }

    /// Whether the weaker timestamp fallback produced this code.
    pub fn is_fallback(&self) -> bool {
        matches!(self, GeneratedCode::Fallback(_))
    }
}

/// Generate a code that does not collide case-insensitively with `existing`,
/// using the thread-local RNG and the current time.
pub fn generate_unique_code<I, S>(existing: I, options: &CodeOptions) -> GeneratedCode
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    generate_unique_code_with(
        existing,
        options,
        &mut rand::rng(),
        Utc::now().naive_utc(),
    )
}

/// Generate a code with an explicit RNG and clock.
///
/// Tries at most [`MAX_GENERATION_ATTEMPTS`] random candidates. When all of
/// them collide, returns [`GeneratedCode::Fallback`] built from the last
/// `options.length` digits of `now` in Unix milliseconds.
pub fn generate_unique_code_with<I, S, R>(
    existing: I,
    options: &CodeOptions,
    rng: &mut R,
    now: NaiveDateTime,
) -> GeneratedCode
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    let taken: HashSet<String> = existing
        .into_iter()
        .map(|code| code.as_ref().to_uppercase())
        .collect();

    for _ in 0..MAX_GENERATION_ATTEMPTS {
        let candidate = random_candidate(&options.prefix, options.length, rng);
        if !taken.contains(&candidate.to_uppercase()) {
            return GeneratedCode::Unique(candidate);
        }
    }

    GeneratedCode::Fallback(fallback_code(&options.prefix, options.length, now))
}

fn random_candidate<R: Rng + ?Sized>(prefix: &str, length: usize, rng: &mut R) -> String {
    let mut candidate = String::with_capacity(prefix.len() + length);
    candidate.push_str(prefix);
    for _ in 0..length {
        let index = rng.random_range(0..CODE_ALPHABET.len());
        candidate.push(char::from(CODE_ALPHABET[index]));
    }
    candidate
}

fn fallback_code(prefix: &str, length: usize, now: NaiveDateTime) -> String {
    let digits = now.and_utc().timestamp_millis().unsigned_abs().to_string();
    let start = digits.len().saturating_sub(length);
    format!("{prefix}{}", &digits[start..])
}
