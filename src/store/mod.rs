//! Document store abstraction.
//!
//! Every collection is a flat set of JSON records keyed by an opaque string
//! id. Typed models are encoded into and decoded from these records with
//! [`encode`] and [`decode`].

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Field that carries the owning user's uid in every collection.
pub const OWNER_FIELD: &str = "userId";

pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Moods,
    Goals,
    Categories,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Moods => "moods",
            Collection::Goals => "goals",
            Collection::Categories => "categories",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

/// Filter and ordering for [`DocumentStore::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub owner: Option<String>,
    pub order: Option<OrderBy>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn owned_by(uid: impl Into<String>) -> Self {
        Self {
            owner: Some(uid.into()),
            order: None,
        }
    }

    pub fn order_by_desc(mut self, field: impl Into<String>) -> Self {
        self.order = Some(OrderBy {
            field: field.into(),
            descending: true,
        });
        self
    }

    pub fn order_by_asc(mut self, field: impl Into<String>) -> Self {
        self.order = Some(OrderBy {
            field: field.into(),
            descending: false,
        });
        self
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        match &self.owner {
            Some(uid) => fields.get(OWNER_FIELD).and_then(Value::as_str) == Some(uid.as_str()),
            None => true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{collection}/{id} not found")]
    NotFound { collection: Collection, id: String },

    #[error("Malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Malformed record: {collection}/{id} has a non-object body")]
    NotAnObject { collection: Collection, id: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a record and return its newly assigned id.
    async fn create(&self, collection: Collection, fields: Fields) -> StoreResult<String>;

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>>;

    async fn list(&self, collection: Collection, query: &Query) -> StoreResult<Vec<Document>>;

    /// Merge `patch` into the existing record. Fields absent from the patch
    /// are left untouched.
    async fn update(&self, collection: Collection, id: &str, patch: Fields) -> StoreResult<()>;

    /// Returns whether a record was removed.
    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<bool>;

    async fn ping(&self) -> StoreResult<()>;
}

pub fn encode<T: Serialize>(value: &T) -> StoreResult<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(mut fields) => {
            fields.remove("id");
            Ok(fields)
        }
        other => Err(StoreError::Malformed(serde::ser::Error::custom(format!(
            "expected an object, got {other}"
        )))),
    }
}

pub fn decode<T: DeserializeOwned>(document: Document) -> StoreResult<T> {
    let mut fields = document.fields;
    fields.insert("id".into(), Value::String(document.id));
    Ok(serde_json::from_value(Value::Object(fields))?)
}

/// Decode every document, skipping the ones that do not fit `T`.
pub fn decode_all<T: DeserializeOwned>(collection: Collection, documents: Vec<Document>) -> Vec<T> {
    documents
        .into_iter()
        .filter_map(|doc| {
            let id = doc.id.clone();
            match decode(doc) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(%collection, id = %id, error = %e, "Skipping malformed record");
                    None
                }
            }
        })
        .collect()
}

/// Fetch a record and check that it belongs to `uid`.
pub async fn get_owned<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
    uid: &str,
) -> StoreResult<Option<T>> {
    match store.get(collection, id).await? {
        Some(doc) if Query::owned_by(uid).matches(&doc.fields) => Ok(Some(decode(doc)?)),
        _ => Ok(None),
    }
}
