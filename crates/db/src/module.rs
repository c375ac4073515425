use async_trait::async_trait;
use libris_kernel::{InitCtx, Module};

use crate::store::SqliteStore;

/// Core module owning the store's lifecycle.
pub struct DbModule {
    store: SqliteStore,
}

impl DbModule {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for DbModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.store.ping()?;
        tracing::info!(
            module = self.name(),
            location = self.store.location(),
            busy_timeout_ms = ctx.settings.database.busy_timeout_ms,
            "database reachable"
        );
        Ok(())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let applied = self.store.applied_migrations()?;
        tracing::info!(
            module = self.name(),
            migrations = applied.len(),
            "database started"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.store.optimize()?;
        tracing::info!(module = self.name(), "database stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris_kernel::settings::Settings;

    #[tokio::test]
    async fn lifecycle_against_memory_store() {
        let store = SqliteStore::open_in_memory().unwrap();
        let module = DbModule::new(store);
        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
        };

        module.init(&ctx).await.unwrap();
        module.start(&ctx).await.unwrap();
        module.stop().await.unwrap();
        assert!(module.migrations().is_empty());
    }
}
