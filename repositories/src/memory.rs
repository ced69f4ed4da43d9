use error_stack::{Report, ResultExt};
use kitchen_core::KitchenRepository;
use kitchen_core::filter::EqFilter;
use kitchen_core::model::Entity;
use kitchen_core::result::{OptRepoResult, RepoError, RepoResult};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Keeps every collection in process memory as JSON, in insertion order.
/// Nothing survives a restart. Meant for tests and local development.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepo {
    collections: Arc<RwLock<HashMap<&'static str, Vec<Value>>>>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

fn has_key<E: Entity>(record: &Value, key: &str) -> bool {
    record.get(E::KEY_FIELD).and_then(Value::as_str) == Some(key)
}

fn decode<E: Entity>(record: &Value) -> Result<E, Report<serde_json::Error>> {
    Ok(E::deserialize(record)?)
}

impl KitchenRepository for MemoryRepo {
    async fn list<E: Entity>(&self, filter: Option<EqFilter>) -> RepoResult<Vec<E>> {
        let collections = self.collections.read().await;
        let Some(records) = collections.get(E::COLLECTION) else {
            return Ok(Vec::new());
        };

        records
            .iter()
            .filter(|r| filter.as_ref().is_none_or(|f| f.matches(r)))
            .map(|r| decode(r).change_context(RepoError::List))
            .collect()
    }

    async fn find<E: Entity>(&self, key: &str) -> OptRepoResult<E> {
        let collections = self.collections.read().await;

        collections
            .get(E::COLLECTION)
            .and_then(|records| records.iter().find(|r| has_key::<E>(r, key)))
            .map(|r| decode(r).change_context(RepoError::Find))
            .transpose()
    }

    async fn insert<E: Entity>(&self, entity: &E) -> RepoResult<()> {
        let record = serde_json::to_value(entity).change_context(RepoError::Insert)?;

        let mut collections = self.collections.write().await;
        let records = collections.entry(E::COLLECTION).or_default();

        if records.iter().any(|r| has_key::<E>(r, entity.key())) {
            return Err(Report::new(RepoError::Insert)).attach_with(|| {
                format!("duplicate key '{}' in '{}'", entity.key(), E::COLLECTION)
            });
        }

        records.push(record);
        debug!("{} now holds {} records", E::COLLECTION, records.len());
        Ok(())
    }

    async fn replace<E: Entity>(&self, key: &str, entity: &E) -> OptRepoResult<()> {
        let record = serde_json::to_value(entity).change_context(RepoError::Replace)?;

        let mut collections = self.collections.write().await;
        let existing = collections
            .get_mut(E::COLLECTION)
            .and_then(|records| records.iter_mut().find(|r| has_key::<E>(r, key)));

        match existing {
            Some(existing) => {
                *existing = record;
                Ok(Some(()))
            }
            None => Ok(None),
        }
    }

    async fn delete<E: Entity>(&self, key: &str) -> OptRepoResult<()> {
        let mut collections = self.collections.write().await;
        let Some(records) = collections.get_mut(E::COLLECTION) else {
            return Ok(None);
        };

        Ok(records
            .iter()
            .position(|r| has_key::<E>(r, key))
            .map(|i| {
                records.remove(i);
            }))
    }
}
