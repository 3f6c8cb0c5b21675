//! SQLite Rule Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::application::ports::{RepositoryError, RuleRecord, RuleRepositoryPort};
use crate::domain::rewrite::ReplaceRule;

/// SQLite Rule Repository
pub struct SqliteRuleRepository {
    pool: DbPool,
}

impl SqliteRuleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct RuleRow {
    id: String,
    name: String,
    is_enabled: bool,
    is_regex: bool,
    pattern: String,
    replacement: String,
    sort_order: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<RuleRow> for RuleRecord {
    type Error = RepositoryError;

    fn try_from(row: RuleRow) -> Result<Self, Self::Error> {
        Ok(RuleRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            rule: ReplaceRule {
                name: row.name,
                is_enabled: row.is_enabled,
                is_regex: row.is_regex,
                pattern: row.pattern,
                replacement: row.replacement,
            },
            sort_order: row.sort_order,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

const SELECT_COLUMNS: &str = "id, name, is_enabled, is_regex, pattern, replacement, sort_order, \
                              created_at, updated_at";

#[async_trait]
impl RuleRepositoryPort for SqliteRuleRepository {
    async fn save(&self, record: &RuleRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO replace_rules
                (id, name, is_enabled, is_regex, pattern, replacement, sort_order,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                is_enabled = excluded.is_enabled,
                is_regex = excluded.is_regex,
                pattern = excluded.pattern,
                replacement = excluded.replacement,
                sort_order = excluded.sort_order,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.rule.name)
        .bind(record.rule.is_enabled)
        .bind(record.rule.is_regex)
        .bind(&record.rule.pattern)
        .bind(&record.rule.replacement)
        .bind(record.sort_order)
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RuleRecord>, RepositoryError> {
        let sql = format!("SELECT {} FROM replace_rules WHERE id = ?", SELECT_COLUMNS);
        let row: Option<RuleRow> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(RuleRecord::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<RuleRecord>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM replace_rules ORDER BY sort_order ASC",
            SELECT_COLUMNS
        );
        let rows: Vec<RuleRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(RuleRecord::try_from).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM replace_rules WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
