pub mod catalog;

use libris_db::{DbModule, SqliteStore};
use libris_kernel::{settings::Settings, ModuleRegistry};
use std::sync::Arc;

/// Register the core and feature modules over one shared store
pub fn register_all(registry: &mut ModuleRegistry, store: &SqliteStore, settings: &Settings) {
    registry.register_core(Arc::new(DbModule::new(store.clone())));

    let seed = catalog::seed::SeedSource::from_path(settings.seed.path.clone());
    registry.register_custom(catalog::create_module(store.clone(), seed));
}
