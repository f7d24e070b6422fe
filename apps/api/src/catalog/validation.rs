use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::models::{Category, PromptDraft, PromptRecord};

/// Date format written to the `datum` field, e.g. `07.03.2025`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("prompt text must not be empty")]
    EmptyText,

    #[error("a prompt titled '{0}' already exists")]
    DuplicateTitle(String),
}

/// Turns a draft into a record ready to be persisted, stamping today's date
/// when the draft carries none.
pub fn validate(draft: &PromptDraft) -> Result<PromptRecord, ValidationError> {
    validate_at(draft, Local::now().date_naive())
}

/// Same as [`validate`] with an explicit "today".
///
/// Rules:
/// - `title` and `text` must be non-empty after trimming
/// - tags: split on commas, trimmed, empties and repeats dropped, input order kept
/// - category: mapped onto the closed enumeration, `Other` when absent or unknown
/// - created date: kept when supplied, otherwise `today`
pub fn validate_at(draft: &PromptDraft, today: NaiveDate) -> Result<PromptRecord, ValidationError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if draft.text.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }

    let created_date = draft
        .created_date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from)
        .unwrap_or_else(|| today.format(DATE_FORMAT).to_string());

    Ok(PromptRecord {
        title: title.to_string(),
        category: Category::from_label(&draft.category).label().to_string(),
        description: draft.description.trim().to_string(),
        text: draft.text.clone(),
        tags: parse_tags(&draft.tags),
        created_date,
        ..Default::default()
    })
}

/// Splits a comma-separated tag string.
pub fn parse_tags(raw: &str) -> Vec<String> {
    clean_tags(raw.split(','))
}

/// Trims each tag and drops empty and repeated ones, keeping first-seen order.
pub fn clean_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || cleaned.iter().any(|t| t == tag) {
            continue;
        }
        cleaned.push(tag.to_string());
    }
    cleaned
}
