pub mod category;
pub mod prompt;

pub use category::Category;
pub use prompt::{CatalogEntry, PartialRecord, PromptDraft, PromptRecord, PromptView};
