//! Per-user key-value persistence for profiles, plan history, progress and
//! meditations. Values are opaque JSON blobs under fixed key prefixes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    HealthProfile, MeditationEntry, NewMeditationEntry, NewPlanRecord, NewProgressEntry, PlanRecord,
    ProgressEntry,
};

const USER_KEY: &str = "carely_user";
const HISTORY_KEY: &str = "carely_history";
const PROGRESS_KEY: &str = "carely_progress";
const MEDITATIONS_KEY: &str = "carely_meditations";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored value under {key} is malformed: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn put(&self, key: &str, value: Value) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.write().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl KeyValueStore for PgStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let row: Option<(Json<Value>,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(Json(v),)| v))
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO kv_store (key, value) VALUES ($1, $2)
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
        )
        .bind(key)
        .bind(Json(value))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM kv_store WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct WellnessRepository {
    store: Arc<dyn KeyValueStore>,
}

fn key(prefix: &str, user_id: Uuid) -> String {
    format!("{prefix}:{user_id}")
}

impl WellnessRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.store.get(key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| StoreError::Serialization {
                    key: key.to_owned(),
                    source,
                }),
            None => Ok(None),
        }
    }

    async fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(value).map_err(|source| StoreError::Serialization {
            key: key.to_owned(),
            source,
        })?;
        self.store.put(key, value).await
    }

    async fn load_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        Ok(self.load(key).await?.unwrap_or_default())
    }

    pub async fn save_user(&self, user_id: Uuid, profile: &HealthProfile) -> Result<(), StoreError> {
        self.save(&key(USER_KEY, user_id), profile).await
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<HealthProfile>, StoreError> {
        self.load(&key(USER_KEY, user_id)).await
    }

    /// Newest plan first.
    pub async fn save_plan_to_history(
        &self,
        user_id: Uuid,
        plan: NewPlanRecord,
    ) -> Result<PlanRecord, StoreError> {
        let key = key(HISTORY_KEY, user_id);
        let mut history: Vec<PlanRecord> = self.load_list(&key).await?;
        let record = PlanRecord {
            profile: plan.profile,
            recommendations: plan.recommendations,
            date: Utc::now(),
        };
        history.insert(0, record.clone());
        self.save(&key, &history).await?;
        Ok(record)
    }

    pub async fn get_history(&self, user_id: Uuid) -> Result<Vec<PlanRecord>, StoreError> {
        self.load_list(&key(HISTORY_KEY, user_id)).await
    }

    /// Kept in ascending date order for charting.
    pub async fn save_progress_entry(
        &self,
        user_id: Uuid,
        entry: NewProgressEntry,
    ) -> Result<ProgressEntry, StoreError> {
        let key = key(PROGRESS_KEY, user_id);
        let mut progress: Vec<ProgressEntry> = self.load_list(&key).await?;
        let entry = ProgressEntry {
            weight: entry.weight,
            sleep: entry.sleep,
            mood: entry.mood,
            date: Utc::now(),
        };
        progress.push(entry.clone());
        progress.sort_by_key(|e| e.date);
        self.save(&key, &progress).await?;
        Ok(entry)
    }

    pub async fn get_progress(&self, user_id: Uuid) -> Result<Vec<ProgressEntry>, StoreError> {
        self.load_list(&key(PROGRESS_KEY, user_id)).await
    }

    pub async fn clear_progress(&self, user_id: Uuid) -> Result<(), StoreError> {
        self.store.remove(&key(PROGRESS_KEY, user_id)).await
    }

    /// Newest meditation first.
    pub async fn save_meditation(
        &self,
        user_id: Uuid,
        entry: NewMeditationEntry,
    ) -> Result<MeditationEntry, StoreError> {
        let key = key(MEDITATIONS_KEY, user_id);
        let mut history: Vec<MeditationEntry> = self.load_list(&key).await?;
        let entry = MeditationEntry {
            title: entry.title,
            stress_source: entry.stress_source,
            mood: entry.mood,
            meditation_type: entry.meditation_type,
            duration: entry.duration,
            script: entry.script,
            date: Utc::now(),
        };
        history.insert(0, entry.clone());
        self.save(&key, &history).await?;
        Ok(entry)
    }

    pub async fn get_meditation_history(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<MeditationEntry>, StoreError> {
        self.load_list(&key(MEDITATIONS_KEY, user_id)).await
    }
}
