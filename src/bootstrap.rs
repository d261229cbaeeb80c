//! Wiring from settings to a running server.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use bookshelf_db::{DbModule, SharedStore};
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// Registry holding the core `db` module and every custom module, all
/// sharing one store handle.
pub fn build_registry(store: SharedStore) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register_core(Arc::new(DbModule::new(store.clone())));
    modules::register_all(&mut registry, store);
    registry
}

/// Full HTTP application over an already opened store.
pub fn build_app(settings: &Settings, store: SharedStore) -> Router {
    let registry = build_registry(store);
    bookshelf_http::build_router(&registry, settings)
}

/// Open the store, bring the modules up, serve until a shutdown signal
/// arrives, then stop the modules.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        "bookshelf bootstrap starting"
    );

    let store = bookshelf_db::connect(&settings.database)
        .await
        .context("failed to connect to the book store")?;
    let registry = build_registry(store);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;
    tracing::info!(
        core = registry.core_module_count(),
        custom = registry.custom_module_count(),
        "bookshelf bootstrap complete"
    );

    let served =
        bookshelf_http::start_server(&registry, &settings, bookshelf_http::shutdown_signal()).await;

    registry.stop_all().await?;
    served
}
