use anyhow::Context;
use axum::Router;
use libris_db::SqliteStore;
use libris_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;
use crate::modules::catalog::service::CatalogService;

/// Fully wired application: settings, the shared store, and every module
pub struct App {
    settings: Settings,
    store: SqliteStore,
    registry: ModuleRegistry,
}

impl App {
    /// Open the store and register modules. Nothing is initialized yet.
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let store = SqliteStore::open(&settings.database)
            .with_context(|| format!("failed to open database '{}'", settings.database.path))?;

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &store, &settings);

        Ok(Self {
            settings,
            store,
            registry,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Catalog operations over the application's store
    pub fn catalog(&self) -> CatalogService<SqliteStore> {
        CatalogService::new(std::sync::Arc::new(self.store.clone()))
    }

    /// Initialize modules, then apply their pending migrations
    pub async fn prepare(&self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
        };
        self.registry.init_core_modules(&ctx).await?;
        self.registry.init_custom_modules(&ctx).await?;

        let migrations = self.registry.collect_migrations();
        let applied = self
            .store
            .apply_migrations(&migrations)
            .context("failed to apply migrations")?;
        tracing::info!(
            applied,
            known = migrations.len(),
            "migrations complete"
        );
        Ok(())
    }

    /// Full HTTP router for the registered modules
    pub fn router(&self) -> Router {
        libris_http::build_router(&self.registry, &self.settings)
    }

    /// Start modules, serve HTTP until shutdown, then stop modules
    pub async fn serve(self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
        };
        self.registry.start_core_modules(&ctx).await?;
        self.registry.start_custom_modules(&ctx).await?;

        let served = libris_http::start_server(&self.registry, &self.settings).await;

        self.registry.stop_custom_modules().await?;
        self.registry.stop_core_modules().await?;
        served
    }
}
