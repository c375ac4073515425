//! Catalog service application library
//!
//! Hosts the feature modules and the bootstrap that wires them to the store
//! and the HTTP server.

pub mod app;
pub mod modules;

pub use app::App;
pub use modules::catalog::{
    models::{Author, Book, BookFilter, ResetSummary},
    seed::{SeedCatalog, SeedSource},
    service::{CatalogError, CatalogService},
};
