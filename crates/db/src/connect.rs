//! Store bootstrap with bounded retries.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bookshelf_kernel::settings::{DatabaseSettings, StoreBackend};

use crate::{MemoryStore, RedbStore, SharedStore};

/// Open the configured backend, retrying with exponential backoff.
///
/// A redb file held by another process fails to open; the retry loop gives a
/// restarting predecessor time to release it.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SharedStore> {
    match settings.backend {
        StoreBackend::Memory => {
            tracing::info!(target: "bookshelf-db", "using in-memory book store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Redb => {
            let attempts = settings.connect_attempts.max(1);
            let mut delay = Duration::from_millis(settings.retry_delay_ms);

            let mut attempt = 1;
            loop {
                let path = settings.path.clone();
                let opened = tokio::task::spawn_blocking(move || RedbStore::open(path))
                    .await
                    .context("store open task panicked")?;

                match opened {
                    Ok(store) => {
                        tracing::info!(
                            target: "bookshelf-db",
                            path = %settings.path.display(),
                            attempt,
                            "connected to redb book store"
                        );
                        return Ok(Arc::new(store));
                    }
                    Err(err) if attempt < attempts => {
                        tracing::warn!(
                            target: "bookshelf-db",
                            error = %err,
                            attempt,
                            retry_in_ms = delay.as_millis() as u64,
                            "failed to open book store, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        delay = delay.saturating_mul(2);
                        attempt += 1;
                    }
                    Err(err) => {
                        return Err(err).with_context(|| {
                            format!(
                                "failed to open book store at {} after {} attempts",
                                settings.path.display(),
                                attempts
                            )
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn memory_backend_connects_immediately() {
        let settings = DatabaseSettings {
            backend: StoreBackend::Memory,
            ..DatabaseSettings::default()
        };
        let store = connect(&settings).await.unwrap();
        assert_eq!(store.backend(), "memory");
    }

    #[tokio::test]
    async fn redb_backend_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let settings = DatabaseSettings {
            backend: StoreBackend::Redb,
            path: dir.path().join("data").join("books.redb"),
            connect_attempts: 1,
            retry_delay_ms: 1,
        };
        let store = connect(&settings).await.unwrap();
        assert_eq!(store.backend(), "redb");
        assert!(settings.path.exists());
    }

    #[tokio::test]
    async fn gives_up_after_configured_attempts() {
        let dir = TempDir::new().unwrap();
        // A directory where the database file should be cannot be opened.
        let blocked = dir.path().join("books.redb");
        std::fs::create_dir_all(&blocked).unwrap();

        let settings = DatabaseSettings {
            backend: StoreBackend::Redb,
            path: blocked,
            connect_attempts: 2,
            retry_delay_ms: 1,
        };
        let err = connect(&settings).await.err().unwrap();
        assert!(format!("{err:#}").contains("after 2 attempts"));
    }
}
