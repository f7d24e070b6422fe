// Prompt catalog: validation, dedup, search/filter, and the persisted
// in-memory collection.

pub mod dedup;
pub mod handlers;
pub mod search;
pub mod service;
pub mod validation;
