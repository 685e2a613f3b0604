//! Catalog: category hierarchy, listings and their administration

pub mod admin;
pub mod query;
pub mod repository;
pub mod service;
pub mod tree;

#[cfg(test)]
pub(crate) mod memory;

pub use query::{ItemFilter, Listing, ListingParams, SortBy};
pub use repository::CatalogRepository;
pub use tree::CategoryTree;
