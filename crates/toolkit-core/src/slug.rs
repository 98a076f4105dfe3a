//! URL-safe slug generation

use crate::error::AppError;
use regex::Regex;
use std::sync::LazyLock;

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"));

/// Turn arbitrary text into a lowercase, hyphen-separated slug.
///
/// Runs of characters outside `[a-z0-9]` (after lower-casing) collapse into a single
/// hyphen and leading/trailing hyphens are trimmed.
///
/// # Errors
/// - [`AppError::EmptyInput`] when `s` is empty
/// - [`AppError::EmptyResult`] when nothing slug-worthy remains
pub fn slugify(s: &str) -> Result<String, AppError> {
    if s.is_empty() {
        return Err(AppError::EmptyInput);
    }

    let lowered = s.to_lowercase();
    let slug = NON_SLUG_CHARS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string();

    if slug.is_empty() {
        return Err(AppError::EmptyResult);
    }

    Ok(slug)
}
