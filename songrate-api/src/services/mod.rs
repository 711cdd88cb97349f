//! Outbound service clients

pub mod catalog;

pub use catalog::{apply_match, search_term, CatalogError, CatalogLookup, CatalogMatch, ItunesCatalog};
