//! Core module exposing the store to the module lifecycle.

use async_trait::async_trait;
use bookshelf_kernel::{InitCtx, Module};

use crate::SharedStore;

/// Probes the store at startup and reports what it holds.
pub struct DbModule {
    store: SharedStore,
}

impl DbModule {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for DbModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let records = self.store.count().await?;
        tracing::info!(
            module = self.name(),
            backend = self.store.backend(),
            environment = ?ctx.settings.environment,
            records,
            "book store ready"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), backend = self.store.backend(), "book store released");
        Ok(())
    }
}
