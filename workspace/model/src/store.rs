//! Key-value storage collaborators.
//!
//! [`KeyValueStore`] is the seam through which approved predictions are kept
//! between sessions. [`DatabaseStore`] writes to the `kv_entries` table;
//! [`MemoryStore`] keeps everything in process.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use tracing::{debug, instrument, trace};

use crate::entities::kv_entry;
use crate::error::Result;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn save(&self, key: &str, value: String) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    async fn save(&self, key: &str, value: String) -> Result<()> {
        self.entries().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Store backed by the `kv_entries` table.
#[derive(Debug, Clone)]
pub struct DatabaseStore {
    db: DatabaseConnection,
}

impl DatabaseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl KeyValueStore for DatabaseStore {
    #[instrument(skip(self))]
    async fn load(&self, key: &str) -> Result<Option<String>> {
        trace!("Loading key {}", key);
        let entry = kv_entry::Entity::find_by_id(key.to_string())
            .one(&self.db)
            .await?;
        Ok(entry.map(|e| e.value))
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn save(&self, key: &str, value: String) -> Result<()> {
        let entry = kv_entry::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            updated_at: Set(chrono::Utc::now().naive_utc()),
        };

        kv_entry::Entity::insert(entry)
            .on_conflict(
                OnConflict::column(kv_entry::Column::Key)
                    .update_columns([kv_entry::Column::Value, kv_entry::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;
        debug!("Saved key {}", key);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> Result<()> {
        let result = kv_entry::Entity::delete_by_id(key.to_string())
            .exec(&self.db)
            .await?;
        debug!("Removed key {} ({} rows)", key, result.rows_affected);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.expect("Migrations failed.");
        db
    }

    async fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.load("a").await.unwrap(), None);

        store.save("a", "1".to_string()).await.unwrap();
        assert_eq!(store.load("a").await.unwrap(), Some("1".to_string()));

        store.save("a", "2".to_string()).await.unwrap();
        assert_eq!(store.load("a").await.unwrap(), Some("2".to_string()));

        store.remove("a").await.unwrap();
        assert_eq!(store.load("a").await.unwrap(), None);

        // removing twice is fine
        store.remove("a").await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store() {
        exercise(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_database_store() {
        let store = DatabaseStore::new(setup_db().await);
        exercise(&store).await;
    }

    #[tokio::test]
    async fn test_database_store_keeps_keys_apart() {
        let store = DatabaseStore::new(setup_db().await);
        store.save("a", "1".to_string()).await.unwrap();
        store.save("b", "2".to_string()).await.unwrap();
        store.remove("a").await.unwrap();
        assert_eq!(store.load("b").await.unwrap(), Some("2".to_string()));
    }
}
