use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Collection, Document, DocumentStore, Fields, Query, StoreError, StoreResult};

/// In-process document store. Used when no database is configured and in tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<Collection, BTreeMap<String, Fields>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare_field(a: &Fields, b: &Fields, field: &str) -> Ordering {
    match (a.get(field), b.get(field)) {
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: Collection, fields: Fields) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection)
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|records| records.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn list(&self, collection: Collection, query: &Query) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let mut documents: Vec<Document> = collections
            .get(&collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|(_, fields)| query.matches(fields))
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            documents.sort_by(|a, b| {
                let ordering = compare_field(&a.fields, &b.fields, &order.field);
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        Ok(documents)
    }

    async fn update(&self, collection: Collection, id: &str, patch: Fields) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let record = collections
            .get_mut(&collection)
            .and_then(|records| records.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        for (key, value) in patch {
            record.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<bool> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(&collection)
            .map(|records| records.remove(id).is_some())
            .unwrap_or(false))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
