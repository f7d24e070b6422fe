use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::category::Category;

/// A stored prompt, exactly as it appears in the persisted document.
///
/// Field order matters: it is the key order written to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredRecord", into = "StoredRecord")]
pub struct PromptRecord {
    pub title: String,
    pub category: String,
    pub description: String,
    pub text: String,
    pub tags: Vec<String>,
    pub created_date: String,
    /// Optional keys the stored object did not have. They stay absent when an
    /// untouched record is written back.
    pub absent: AbsentKeys,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbsentKeys {
    category: bool,
    description: bool,
    tags: bool,
    created_date: bool,
}

/// On-disk shape of a record.
#[derive(Serialize, Deserialize)]
struct StoredRecord {
    nazev: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kategorie: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    popis: Option<String>,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tagy: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    datum: Option<String>,
}

impl From<StoredRecord> for PromptRecord {
    fn from(stored: StoredRecord) -> Self {
        Self {
            absent: AbsentKeys {
                category: stored.kategorie.is_none(),
                description: stored.popis.is_none(),
                tags: stored.tagy.is_none(),
                created_date: stored.datum.is_none(),
            },
            title: stored.nazev,
            category: stored.kategorie.unwrap_or_default(),
            description: stored.popis.unwrap_or_default(),
            text: stored.text,
            tags: stored.tagy.unwrap_or_default(),
            created_date: stored.datum.unwrap_or_default(),
        }
    }
}

impl From<PromptRecord> for StoredRecord {
    fn from(record: PromptRecord) -> Self {
        let keep = |absent: bool, empty: bool| !(absent && empty);
        let absent = record.absent;
        Self {
            kategorie: keep(absent.category, record.category.is_empty()).then_some(record.category),
            popis: keep(absent.description, record.description.is_empty())
                .then_some(record.description),
            tagy: keep(absent.tags, record.tags.is_empty()).then_some(record.tags),
            datum: keep(absent.created_date, record.created_date.is_empty())
                .then_some(record.created_date),
            nazev: record.title,
            text: record.text,
        }
    }
}

impl PromptRecord {
    /// The record's category as interpreted against the closed enumeration.
    pub fn category_kind(&self) -> Category {
        Category::from_label(&self.category)
    }
}

/// A record as held in the catalog: the persisted record plus an identity
/// that lives only as long as the catalog does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: Uuid,
    pub record: PromptRecord,
}

impl CatalogEntry {
    pub fn new(record: PromptRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            record,
        }
    }
}

/// API representation of a catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptView {
    pub id: Uuid,
    pub title: String,
    /// Label as stored.
    pub category: String,
    /// Label mapped onto the closed enumeration.
    pub category_group: Category,
    pub description: String,
    pub text: String,
    pub tags: Vec<String>,
    pub created_date: String,
}

impl From<&CatalogEntry> for PromptView {
    fn from(entry: &CatalogEntry) -> Self {
        let r = &entry.record;
        Self {
            id: entry.id,
            title: r.title.clone(),
            category: r.category.clone(),
            category_group: r.category_kind(),
            description: r.description.clone(),
            text: r.text.clone(),
            tags: r.tags.clone(),
            created_date: r.created_date.clone(),
        }
    }
}

/// Editable form state for the add and edit flows.
///
/// Tags are kept as the comma-separated string the operator types. To reset a
/// form, replace the draft with `PromptDraft::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptDraft {
    pub title: String,
    pub category: String,
    pub description: String,
    pub text: String,
    pub tags: String,
    pub created_date: Option<String>,
}

impl PromptDraft {
    /// Pre-fills an edit form from an existing record.
    pub fn from_record(record: &PromptRecord) -> Self {
        Self {
            title: record.title.clone(),
            category: record.category.clone(),
            description: record.description.clone(),
            text: record.text.clone(),
            tags: record.tags.join(", "),
            created_date: Some(record.created_date.clone()).filter(|d| !d.is_empty()),
        }
    }

    /// Applies an AI suggestion. Only fields the suggestion actually carries
    /// overwrite the draft; everything else is left as the operator typed it.
    pub fn prefill(&mut self, suggestion: &PartialRecord) {
        if let Some(title) = non_blank(&suggestion.title) {
            self.title = title.to_string();
        }
        if let Some(category) = suggestion.category {
            self.category = category.label().to_string();
        }
        if let Some(description) = non_blank(&suggestion.description) {
            self.description = description.to_string();
        }
        if let Some(text) = non_blank(&suggestion.text) {
            self.text = text.to_string();
        }
        if !suggestion.tags.is_empty() {
            self.tags = suggestion.tags.join(", ");
        }
    }
}

/// Structured suggestion produced from raw pasted text. Advisory only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialRecord {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub text: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> PromptRecord {
        PromptRecord {
            title: "Blindspot Cartographer".to_string(),
            category: "Business".to_string(),
            description: "Maps blind spots".to_string(),
            text: "You are a strategist...".to_string(),
            tags: vec!["strategie".to_string(), "analýza".to_string()],
            created_date: "03.02.2025".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_record_uses_persisted_key_names_in_order() {
        let json = serde_json::to_string(&sample_record()).unwrap();
        assert!(json.starts_with(
            "{\"nazev\":\"Blindspot Cartographer\",\"kategorie\":\"Business\",\"popis\":"
        ));
        let nazev = json.find("nazev").unwrap();
        let datum = json.find("datum").unwrap();
        assert!(nazev < datum);
    }

    #[test]
    fn test_record_missing_optional_keys_deserializes() {
        let record: PromptRecord =
            serde_json::from_str(r#"{"nazev": "X", "text": "do X"}"#).unwrap();
        assert_eq!(record.category, "");
        assert!(record.tags.is_empty());
        assert_eq!(record.category_kind(), Category::Other);
    }

    #[test]
    fn test_record_missing_optional_keys_stay_absent_on_write() {
        let raw = r#"{"nazev":"A","text":"a"}"#;
        let record: PromptRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(serde_json::to_string(&record).unwrap(), raw);
    }

    #[test]
    fn test_filled_in_optional_key_is_written() {
        let mut record: PromptRecord =
            serde_json::from_str(r#"{"nazev":"A","text":"a","tagy":[]}"#).unwrap();
        record.created_date = "01.01.2025".to_string();
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"nazev":"A","text":"a","tagy":[],"datum":"01.01.2025"}"#
        );
    }

    #[test]
    fn test_draft_from_record_joins_tags() {
        let draft = PromptDraft::from_record(&sample_record());
        assert_eq!(draft.tags, "strategie, analýza");
        assert_eq!(draft.created_date.as_deref(), Some("03.02.2025"));
    }

    #[test]
    fn test_prefill_overwrites_only_suggested_fields() {
        let mut draft = PromptDraft {
            title: "Moje".to_string(),
            description: "ruční popis".to_string(),
            text: "raw paste".to_string(),
            ..Default::default()
        };
        draft.prefill(&PartialRecord {
            title: Some("Nový název".to_string()),
            category: Some(Category::Creativity),
            description: Some("   ".to_string()),
            tags: vec!["a".to_string(), "b".to_string()],
            text: None,
        });
        assert_eq!(draft.title, "Nový název");
        assert_eq!(draft.category, "Creativity");
        assert_eq!(draft.description, "ruční popis");
        assert_eq!(draft.text, "raw paste");
        assert_eq!(draft.tags, "a, b");
    }

    #[test]
    fn test_view_carries_interpreted_category() {
        let mut record = sample_record();
        record.category = "Strategické myšlení".to_string();
        let view = PromptView::from(&CatalogEntry::new(record));
        assert_eq!(view.category, "Strategické myšlení");
        assert_eq!(view.category_group, Category::Other);
    }
}
