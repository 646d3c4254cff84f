//! Slug generation and validation.
//!
//! Generated slugs come from a [`SlugGenerator`]; caller-requested slugs go through
//! [`normalize_requested_slug`]. Both produce values matching `^[a-z0-9-]{1,24}$`.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use serde_json::json;

use crate::error::AppError;

/// Longest slug the store accepts.
pub const MAX_SLUG_LENGTH: usize = 24;

/// Slugs that would shadow fixed routes.
pub const RESERVED_SLUGS: &[&str] = &["health", "links", "stats"];

/// Default generator alphabet.
pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

static SLUG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9-]{1,24}$").unwrap());

/// Rejected generator settings.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SlugGeneratorError {
    #[error("Slug alphabet must not be empty")]
    EmptyAlphabet,

    #[error("Slug alphabet may only contain a-z, 0-9 and '-', found '{0}'")]
    InvalidCharacter(char),

    #[error("Slug lengths must satisfy 1 <= min ({min}) <= max ({max}) <= 24")]
    InvalidLength { min: usize, max: usize },

    #[error("Slug generator needs at least one attempt")]
    NoAttempts,
}

/// Produces random slug candidates.
///
/// Each candidate has a length drawn uniformly from `min_len..=max_len` and characters drawn
/// uniformly from the alphabet using the thread-local CSPRNG. The generator never checks the
/// store; uniqueness is the store's job.
#[derive(Debug, Clone)]
pub struct SlugGenerator {
    alphabet: Vec<char>,
    min_len: usize,
    max_len: usize,
    max_attempts: usize,
}

impl SlugGenerator {
    pub fn new(
        alphabet: &str,
        min_len: usize,
        max_len: usize,
        max_attempts: usize,
    ) -> Result<Self, SlugGeneratorError> {
        let alphabet: BTreeSet<char> = alphabet.chars().collect();
        if alphabet.is_empty() {
            return Err(SlugGeneratorError::EmptyAlphabet);
        }
        if let Some(c) = alphabet
            .iter()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || **c == '-'))
        {
            return Err(SlugGeneratorError::InvalidCharacter(*c));
        }
        if min_len == 0 || min_len > max_len || max_len > MAX_SLUG_LENGTH {
            return Err(SlugGeneratorError::InvalidLength {
                min: min_len,
                max: max_len,
            });
        }
        if max_attempts == 0 {
            return Err(SlugGeneratorError::NoAttempts);
        }

        Ok(Self {
            alphabet: alphabet.into_iter().collect(),
            min_len,
            max_len,
            max_attempts,
        })
    }

    /// Number of candidates the allocator may try before giving up.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn generate(&self) -> String {
        let mut rng = rand::rng();
        let len = rng.random_range(self.min_len..=self.max_len);

        (0..len)
            .map(|_| self.alphabet[rng.random_range(0..self.alphabet.len())])
            .collect()
    }
}

impl Default for SlugGenerator {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.chars().collect(),
            min_len: 6,
            max_len: 9,
            max_attempts: 10,
        }
    }
}

/// Returns true if `slug` has the shape of a stored slug.
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_REGEX.is_match(slug)
}

/// Turns a slug taken from a request path into lookup form.
///
/// Trims and lowercases; returns `None` when the result could never name a stored link.
pub fn canonical_slug(raw: &str) -> Option<String> {
    let slug = raw.trim().to_ascii_lowercase();
    is_valid_slug(&slug).then_some(slug)
}

pub fn is_reserved(slug: &str) -> bool {
    RESERVED_SLUGS.contains(&slug)
}

/// Validates a caller-requested slug.
///
/// Blank input means "no slug requested" and yields `Ok(None)`. Otherwise the input is trimmed
/// and must already be in normal form: lowercase, only `[a-z0-9-]`, at most
/// [`MAX_SLUG_LENGTH`] characters and not reserved. When the input fails only because of case or
/// stray characters, the normalized form is returned as `details.suggestion`.
///
/// # Errors
///
/// Returns [`AppError::InvalidSlugFormat`] for any rejected input.
pub fn normalize_requested_slug(raw: &str) -> Result<Option<String>, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let normalized: String = trimmed
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();

    if normalized != trimmed {
        let details = if normalized.is_empty() {
            json!({ "slug": trimmed })
        } else {
            json!({ "slug": trimmed, "suggestion": normalized })
        };
        return Err(AppError::invalid_slug_format(
            "Slug may only contain lowercase letters, digits and hyphens",
            details,
        ));
    }

    if normalized.len() > MAX_SLUG_LENGTH {
        return Err(AppError::invalid_slug_format(
            format!("Slug must be at most {MAX_SLUG_LENGTH} characters"),
            json!({ "slug": trimmed, "provided_length": normalized.len() }),
        ));
    }

    if !is_valid_slug(&normalized) {
        return Err(AppError::invalid_slug_format(
            "Slug has an invalid format",
            json!({ "slug": trimmed }),
        ));
    }

    if is_reserved(&normalized) {
        return Err(AppError::invalid_slug_format(
            "This slug is reserved",
            json!({ "slug": normalized }),
        ));
    }

    Ok(Some(normalized))
}
