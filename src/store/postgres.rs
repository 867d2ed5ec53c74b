use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    Collection, Document, DocumentStore, Fields, Query, StoreError, StoreResult, OWNER_FIELD,
};
use crate::db;

/// Postgres-backed document store: one `documents` table, JSONB bodies.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool and apply the embedded migrations.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = db::create_pool(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
        Ok(Self::new(pool))
    }
}

fn into_fields(collection: Collection, id: &str, body: Value) -> StoreResult<Fields> {
    match body {
        Value::Object(fields) => Ok(fields),
        _ => Err(StoreError::NotAnObject {
            collection,
            id: id.to_string(),
        }),
    }
}

/// `$1` collection, `$2` owner (nullable), `$3` sort field when ordered.
fn list_sql(query: &Query) -> String {
    let order_clause = match &query.order {
        Some(order) if order.descending => "ORDER BY body->$3 DESC, created_at DESC",
        Some(_) => "ORDER BY body->$3 ASC, created_at ASC",
        None => "ORDER BY created_at ASC",
    };
    format!(
        r#"
        SELECT id, body FROM documents
        WHERE collection = $1 AND ($2::text IS NULL OR body->>'{OWNER_FIELD}' = $2)
        {order_clause}
        "#
    )
}

/// Rows with a non-object body are skipped so one bad record cannot hide the rest.
fn documents_from_rows(collection: Collection, rows: Vec<(String, Value)>) -> Vec<Document> {
    rows.into_iter()
        .filter_map(|(id, body)| match into_fields(collection, &id, body) {
            Ok(fields) => Some(Document { id, fields }),
            Err(e) => {
                tracing::warn!(%collection, id = %id, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect()
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn create(&self, collection: Collection, fields: Fields) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection.as_str())
            .bind(&id)
            .bind(Value::Object(fields))
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let row = sqlx::query_as::<_, (String, Value)>(
            "SELECT id, body FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(id, body)| {
            let fields = into_fields(collection, &id, body)?;
            Ok(Document { id, fields })
        })
        .transpose()
    }

    async fn list(&self, collection: Collection, query: &Query) -> StoreResult<Vec<Document>> {
        let sql = list_sql(query);
        let mut statement = sqlx::query_as::<_, (String, Value)>(&sql)
            .bind(collection.as_str())
            .bind(query.owner.as_deref());
        if let Some(order) = &query.order {
            statement = statement.bind(order.field.as_str());
        }

        let rows = statement.fetch_all(&self.pool).await?;
        Ok(documents_from_rows(collection, rows))
    }

    async fn update(&self, collection: Collection, id: &str, patch: Fields) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE documents SET body = body || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Value::Object(patch))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
