//! AI Normalizer: turns raw pasted text into a suggested catalog entry.
//!
//! Best-effort and advisory. A failure never touches the caller's draft; the
//! handler only applies a suggestion after `normalize` returned `Ok`.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::validation::clean_tags;
use crate::llm_client::{parse_json, prompts::JSON_ONLY_SYSTEM, LlmError, TextGenerator};
use crate::models::{Category, PartialRecord};

pub mod handlers;
pub mod prompts;

use prompts::{NORMALIZE_PROMPT, NORMALIZE_SYSTEM};

/// Suggestions carry at most this many tags.
pub const MAX_SUGGESTED_TAGS: usize = 5;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("nothing to analyze: pasted text is empty")]
    EmptyInput,

    #[error("AI analysis failed: {0}")]
    Llm(#[from] LlmError),

    #[error("AI analysis returned no usable fields")]
    EmptySuggestion,
}

/// The shape we ask the model for. Everything is optional because the model
/// is not trusted to follow the schema.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSuggestion {
    title: Option<String>,
    category: Option<String>,
    description: Option<String>,
    tags: Option<Value>,
    text: Option<String>,
}

#[derive(Clone)]
pub struct Normalizer {
    generator: Arc<dyn TextGenerator>,
    operator_language: String,
}

impl Normalizer {
    pub fn new(generator: Arc<dyn TextGenerator>, operator_language: impl Into<String>) -> Self {
        Self {
            generator,
            operator_language: operator_language.into(),
        }
    }

    pub async fn normalize(&self, raw_text: &str) -> Result<PartialRecord, NormalizeError> {
        if raw_text.trim().is_empty() {
            return Err(NormalizeError::EmptyInput);
        }

        let prompt = build_prompt(raw_text, &self.operator_language);
        let system = format!("{NORMALIZE_SYSTEM} {JSON_ONLY_SYSTEM}");

        let result = async {
            let output = self.generator.generate(&prompt, &system).await?;
            let raw: RawSuggestion = parse_json(&output)?;
            Ok::<_, LlmError>(raw)
        }
        .await;

        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "prompt normalization failed");
                return Err(e.into());
            }
        };

        let suggestion = into_partial(raw);
        if suggestion == PartialRecord::default() {
            warn!("prompt normalization returned an empty suggestion");
            return Err(NormalizeError::EmptySuggestion);
        }

        info!(
            title = suggestion.title.as_deref().unwrap_or(""),
            category = ?suggestion.category,
            tags = suggestion.tags.len(),
            "prompt normalized"
        );
        Ok(suggestion)
    }
}

fn build_prompt(raw_text: &str, language: &str) -> String {
    NORMALIZE_PROMPT
        .replace("{language}", language)
        .replace("{categories}", &Category::label_list())
        .replace("{raw_text}", raw_text)
}

fn into_partial(raw: RawSuggestion) -> PartialRecord {
    PartialRecord {
        title: non_blank(raw.title),
        category: non_blank(raw.category).map(|c| Category::from_label(&c)),
        description: non_blank(raw.description),
        tags: raw.tags.map(tags_from_value).unwrap_or_default(),
        text: raw.text.filter(|t| !t.trim().is_empty()),
    }
}

/// Accepts either a JSON array of strings or a comma-separated string.
fn tags_from_value(value: Value) -> Vec<String> {
    let mut tags = match &value {
        Value::Array(items) => clean_tags(items.iter().filter_map(Value::as_str)),
        Value::String(s) => clean_tags(s.split(',')),
        _ => Vec::new(),
    };
    tags.truncate(MAX_SUGGESTED_TAGS);
    tags
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
