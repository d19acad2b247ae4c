//! Validation for card and item text fields. Fails fast, before any store
//! access.

use lazy_regex::regex_is_match;

use crate::errors::domain::{DomainError, ValidationKind};

pub const MAX_TITLE_LEN: usize = 120;
pub const MAX_CATEGORY_LEN: usize = 40;
pub const MAX_CONTENT_LEN: usize = 255;
pub const MAX_NOTES_LEN: usize = 1000;

/// Trim and bound an optional title. `None` stays `None`; an empty or
/// whitespace-only title is rejected rather than silently treated as absent.
pub fn validate_title(title: Option<&str>) -> Result<Option<String>, DomainError> {
    let Some(raw) = title else {
        return Ok(None);
    };
    let title = raw.trim();
    if title.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::Title,
            "Title must not be empty",
        ));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::validation(
            ValidationKind::Title,
            format!("Title exceeds {MAX_TITLE_LEN} characters"),
        ));
    }
    Ok(Some(title.to_owned()))
}

pub fn validate_category(category: Option<&str>) -> Result<Option<String>, DomainError> {
    let Some(raw) = category else {
        return Ok(None);
    };
    let category = raw.trim();
    if category.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::Category,
            "Category must not be empty",
        ));
    }
    if category.chars().count() > MAX_CATEGORY_LEN {
        return Err(DomainError::validation(
            ValidationKind::Category,
            format!("Category exceeds {MAX_CATEGORY_LEN} characters"),
        ));
    }
    Ok(Some(category.to_owned()))
}

pub fn validate_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::Content,
            "Item content must not be empty",
        ));
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(DomainError::validation(
            ValidationKind::Content,
            format!("Item content exceeds {MAX_CONTENT_LEN} characters"),
        ));
    }
    Ok(content.to_owned())
}

pub fn validate_notes(notes: Option<&str>) -> Result<Option<String>, DomainError> {
    let Some(notes) = notes else {
        return Ok(None);
    };
    if notes.chars().count() > MAX_NOTES_LEN {
        return Err(DomainError::validation(
            ValidationKind::Other("Notes".into()),
            format!("Notes exceed {MAX_NOTES_LEN} characters"),
        ));
    }
    Ok(Some(notes.to_owned()))
}

/// Proof links must be plain http(s) URLs.
pub fn validate_proof_url(url: Option<&str>) -> Result<Option<String>, DomainError> {
    let Some(raw) = url else {
        return Ok(None);
    };
    let url = raw.trim();
    if !regex_is_match!(r"^https?://\S+$", url) {
        return Err(DomainError::validation(
            ValidationKind::ProofUrl,
            "Proof URL must be an http(s) URL",
        ));
    }
    Ok(Some(url.to_owned()))
}
