use sqlx::SqlitePool;
use tracing::debug;

use crate::models::timestamp;
use crate::store::record::{for_kind, with_record};
use crate::store::{ChangeSet, Entity, EntityKind, Graph, Record, StoreError};

/// Reads and writes the record graph, one table per entity kind.
pub struct GraphRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct BodyRow {
    body: String,
}

struct RecordRow {
    id: String,
    link_id: Option<String>,
    owner_id: Option<String>,
    created_at: String,
    updated_at: String,
    body: String,
}

impl RecordRow {
    fn from_record<R: Record>(record: &R) -> Result<Self, StoreError> {
        let body = serde_json::to_string(record).map_err(|source| StoreError::Corrupt {
            kind: R::KIND,
            source,
        })?;
        Ok(Self {
            id: record.id().to_string(),
            link_id: record.link_id().map(|id| id.to_string()),
            owner_id: record.owner().map(|id| id.to_string()),
            created_at: timestamp::format(&record.created_at()),
            updated_at: timestamp::format(&record.updated_at()),
            body,
        })
    }
}

impl GraphRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Loads every stored record.
    pub async fn load(&self) -> Result<Graph, StoreError> {
        let mut graph = Graph::new();
        for kind in EntityKind::ALL {
            for_kind!(kind, R => self.load_table::<R>(&mut graph).await?);
        }
        Ok(graph)
    }

    async fn load_table<R: Record>(&self, graph: &mut Graph) -> Result<(), StoreError> {
        let sql = format!("SELECT body FROM {}", R::KIND.table_name());
        let rows: Vec<BodyRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        let table = R::table_mut(graph);
        for row in rows {
            let record: R = serde_json::from_str(&row.body).map_err(|source| {
                StoreError::Corrupt {
                    kind: R::KIND,
                    source,
                }
            })?;
            table.insert(record.id(), record);
        }
        Ok(())
    }

    /// Writes a change set in one transaction.
    pub async fn persist(&self, changes: &ChangeSet) -> Result<(), StoreError> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for entity in &changes.upserts {
            let row = upsert_row(entity)?;
            let sql = format!(
                r#"
                INSERT INTO {} (id, link_id, owner_id, created_at, updated_at, body)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    link_id = excluded.link_id,
                    owner_id = excluded.owner_id,
                    created_at = excluded.created_at,
                    updated_at = excluded.updated_at,
                    body = excluded.body
                "#,
                entity.kind().table_name()
            );
            sqlx::query(&sql)
                .bind(&row.id)
                .bind(&row.link_id)
                .bind(&row.owner_id)
                .bind(&row.created_at)
                .bind(&row.updated_at)
                .bind(&row.body)
                .execute(&mut *tx)
                .await?;
        }

        for (kind, id) in &changes.deletes {
            let sql = format!("DELETE FROM {} WHERE id = ?", kind.table_name());
            sqlx::query(&sql)
                .bind(id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        debug!(
            upserts = changes.upserts.len(),
            deletes = changes.deletes.len(),
            "persisted change set"
        );
        Ok(())
    }
}

fn upsert_row(entity: &Entity) -> Result<RecordRow, StoreError> {
    with_record!(entity, r => RecordRow::from_record(r))
}
