use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::catalog::dedup::find_title_conflict;
use crate::catalog::search::{filter_by_category, search, summarize_categories, CategoryFilter, CategorySummary};
use crate::catalog::validation::{validate, ValidationError};
use crate::models::{CatalogEntry, PromptDraft, PromptRecord, PromptView};
use crate::storage::{encode_document, Loaded, PromptStore, StoreError};

/// Outcome of the last load, kept apart so "nothing stored yet" is never
/// confused with "could not read the store".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadState {
    Empty,
    Populated { count: usize },
    /// The store has no document at `location`. Writable; the first save
    /// creates it there.
    Missing { location: String },
    Failed { message: String },
}

/// Whether a mutation reached the store. The in-memory change stands either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Persistence {
    Saved,
    Failed { message: String },
}

impl Persistence {
    pub fn is_saved(&self) -> bool {
        matches!(self, Persistence::Saved)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Mutation<T> {
    pub value: T,
    pub persistence: Persistence,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("prompt {0} not found")]
    NotFound(Uuid),

    #[error("catalog could not be loaded ({0}); reload before making changes")]
    NotLoaded(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub prompts: Vec<PromptView>,
    pub shown: usize,
    pub total: usize,
    pub load_state: LoadState,
}

struct Catalog {
    entries: Vec<CatalogEntry>,
    load_state: LoadState,
}

impl Catalog {
    fn ensure_loaded(&self) -> Result<(), CatalogError> {
        match &self.load_state {
            LoadState::Failed { message } => Err(CatalogError::NotLoaded(message.clone())),
            _ => Ok(()),
        }
    }

    fn settle(&mut self) {
        self.load_state = match self.entries.len() {
            0 => LoadState::Empty,
            count => LoadState::Populated { count },
        };
    }

    fn position(&self, id: Uuid) -> Result<usize, CatalogError> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(CatalogError::NotFound(id))
    }

    fn records(&self) -> Vec<PromptRecord> {
        self.entries.iter().map(|e| e.record.clone()).collect()
    }
}

/// The in-memory catalog plus the store it persists to.
///
/// One mutex guards the collection and is held across each `save`, so
/// mutations are applied and persisted one at a time.
pub struct CatalogService {
    store: Arc<dyn PromptStore>,
    inner: Mutex<Catalog>,
}

impl CatalogService {
    /// Builds the service and performs the initial load. A failed load is not
    /// fatal: the catalog starts empty with `LoadState::Failed`.
    pub async fn open(store: Arc<dyn PromptStore>) -> Self {
        let service = Self {
            store,
            inner: Mutex::new(Catalog {
                entries: Vec::new(),
                load_state: LoadState::Empty,
            }),
        };
        service.reload().await;
        service
    }

    /// Replaces the collection with whatever the store holds now.
    pub async fn reload(&self) -> LoadState {
        let mut catalog = self.inner.lock().await;
        match self.store.load().await {
            Ok(Loaded::Records(records)) => {
                catalog.entries = records.into_iter().map(CatalogEntry::new).collect();
                catalog.settle();
                info!(store = %self.store.describe(), count = catalog.entries.len(), "catalog loaded");
            }
            Ok(Loaded::Missing) => {
                let location = self.store.describe();
                warn!(store = %location, "no prompt document at the configured location");
                catalog.entries.clear();
                catalog.load_state = LoadState::Missing { location };
            }
            Err(e) => {
                error!(store = %self.store.describe(), error = %e, "catalog load failed");
                catalog.entries.clear();
                catalog.load_state = LoadState::Failed {
                    message: e.to_string(),
                };
            }
        }
        catalog.load_state.clone()
    }

    pub async fn load_state(&self) -> LoadState {
        self.inner.lock().await.load_state.clone()
    }

    pub fn describe_store(&self) -> String {
        self.store.describe()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    /// Search, then category filter, in catalog order.
    pub async fn list(&self, query: &str, filter: CategoryFilter) -> Listing {
        let catalog = self.inner.lock().await;
        let prompts: Vec<PromptView> = filter_by_category(search(&catalog.entries, query), filter)
            .into_iter()
            .map(PromptView::from)
            .collect();
        Listing {
            shown: prompts.len(),
            total: catalog.entries.len(),
            load_state: catalog.load_state.clone(),
            prompts,
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<PromptView> {
        let catalog = self.inner.lock().await;
        catalog.entries.iter().find(|e| e.id == id).map(PromptView::from)
    }

    pub async fn draft_for(&self, id: Uuid) -> Option<PromptDraft> {
        let catalog = self.inner.lock().await;
        catalog
            .entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| PromptDraft::from_record(&e.record))
    }

    pub async fn summary(&self) -> Vec<CategorySummary> {
        summarize_categories(&self.inner.lock().await.entries)
    }

    /// The current collection encoded exactly as `save` would write it.
    /// Refused after a failed load, where an empty array would pass for a backup.
    pub async fn export(&self) -> Result<String, CatalogError> {
        let catalog = self.inner.lock().await;
        catalog.ensure_loaded()?;
        Ok(encode_document(&catalog.records())?)
    }

    pub async fn add(&self, draft: &PromptDraft) -> Result<Mutation<PromptView>, CatalogError> {
        let mut catalog = self.inner.lock().await;
        catalog.ensure_loaded()?;

        let record = validate(draft)?;
        if let Some(existing) = find_title_conflict(&catalog.entries, &record.title, None) {
            return Err(ValidationError::DuplicateTitle(existing.record.title.clone()).into());
        }

        let entry = CatalogEntry::new(record);
        let view = PromptView::from(&entry);
        catalog.entries.push(entry);
        catalog.settle();
        info!(id = %view.id, title = %view.title, "prompt added");

        let persistence = self.persist(&catalog).await;
        Ok(Mutation {
            value: view,
            persistence,
        })
    }

    /// Replaces the record in place. The original creation date survives the
    /// edit; a record that never had one gets today's.
    pub async fn update(
        &self,
        id: Uuid,
        draft: &PromptDraft,
    ) -> Result<Mutation<PromptView>, CatalogError> {
        let mut catalog = self.inner.lock().await;
        catalog.ensure_loaded()?;
        let index = catalog.position(id)?;

        let original_date = catalog.entries[index].record.created_date.clone();
        let draft = PromptDraft {
            created_date: Some(original_date).filter(|d| !d.trim().is_empty()),
            ..draft.clone()
        };
        let record = validate(&draft)?;
        if let Some(existing) = find_title_conflict(&catalog.entries, &record.title, Some(id)) {
            return Err(ValidationError::DuplicateTitle(existing.record.title.clone()).into());
        }

        catalog.entries[index].record = record;
        let view = PromptView::from(&catalog.entries[index]);
        info!(id = %id, title = %view.title, "prompt updated");

        let persistence = self.persist(&catalog).await;
        Ok(Mutation {
            value: view,
            persistence,
        })
    }

    pub async fn remove(&self, id: Uuid) -> Result<Mutation<PromptView>, CatalogError> {
        let mut catalog = self.inner.lock().await;
        catalog.ensure_loaded()?;
        let index = catalog.position(id)?;

        let removed = catalog.entries.remove(index);
        catalog.settle();
        info!(id = %id, title = %removed.record.title, "prompt removed");

        let persistence = self.persist(&catalog).await;
        Ok(Mutation {
            value: PromptView::from(&removed),
            persistence,
        })
    }

    async fn persist(&self, catalog: &Catalog) -> Persistence {
        match self.store.save(&catalog.records()).await {
            Ok(()) => Persistence::Saved,
            Err(e) => {
                warn!(store = %self.store.describe(), error = %e, "catalog change kept in memory but not persisted");
                Persistence::Failed {
                    message: e.to_string(),
                }
            }
        }
    }
}
