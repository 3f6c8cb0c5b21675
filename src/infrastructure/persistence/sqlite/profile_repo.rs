//! SQLite Profile Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::application::ports::{ProfileRecord, ProfileRepositoryPort, RepositoryError};
use crate::domain::profile::{ApiKind, ExpressAs, Prosody, VoiceProfile};

/// SQLite Profile Repository
pub struct SqliteProfileRepository {
    pool: DbPool,
}

impl SqliteProfileRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ProfileRow {
    id: String,
    name: String,
    api: String,
    format: String,
    locale: String,
    secondary_locale: Option<String>,
    voice_name: String,
    voice_id: Option<String>,
    rate: i64,
    volume: i64,
    pitch: i64,
    style: Option<String>,
    style_degree: f64,
    role: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ProfileRow> for ProfileRecord {
    type Error = RepositoryError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let api: ApiKind = row
            .api
            .parse()
            .map_err(|e: &'static str| RepositoryError::SerializationError(e.to_string()))?;

        // style 与 role 均为 NULL 视为未请求表达风格
        let express_as = if row.style.is_none() && row.role.is_none() {
            None
        } else {
            Some(ExpressAs {
                style: row.style,
                style_degree: row.style_degree as f32,
                role: row.role,
            })
        };

        Ok(ProfileRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            name: row.name,
            profile: VoiceProfile {
                api,
                format: row.format,
                locale: row.locale,
                secondary_locale: row.secondary_locale,
                voice_name: row.voice_name,
                voice_id: row.voice_id,
                prosody: Prosody {
                    rate: row.rate as i32,
                    volume: row.volume as i32,
                    pitch: row.pitch as i32,
                },
                express_as,
            },
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

const SELECT_COLUMNS: &str = "id, name, api, format, locale, secondary_locale, voice_name, \
                              voice_id, rate, volume, pitch, style, style_degree, role, \
                              created_at, updated_at";

#[async_trait]
impl ProfileRepositoryPort for SqliteProfileRepository {
    async fn save(&self, record: &ProfileRecord) -> Result<(), RepositoryError> {
        let profile = &record.profile;
        let express = profile.express_as.as_ref();

        sqlx::query(
            r#"
            INSERT INTO voice_profiles
                (id, name, api, format, locale, secondary_locale, voice_name, voice_id,
                 rate, volume, pitch, style, style_degree, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                api = excluded.api,
                format = excluded.format,
                locale = excluded.locale,
                secondary_locale = excluded.secondary_locale,
                voice_name = excluded.voice_name,
                voice_id = excluded.voice_id,
                rate = excluded.rate,
                volume = excluded.volume,
                pitch = excluded.pitch,
                style = excluded.style,
                style_degree = excluded.style_degree,
                role = excluded.role,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.name)
        .bind(profile.api.as_str())
        .bind(&profile.format)
        .bind(&profile.locale)
        .bind(&profile.secondary_locale)
        .bind(&profile.voice_name)
        .bind(&profile.voice_id)
        .bind(profile.prosody.rate)
        .bind(profile.prosody.volume)
        .bind(profile.prosody.pitch)
        .bind(express.and_then(|e| e.style.as_deref()))
        .bind(express.map(|e| e.style_degree as f64).unwrap_or(1.0))
        .bind(express.and_then(|e| e.role.as_deref()))
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProfileRecord>, RepositoryError> {
        let sql = format!("SELECT {} FROM voice_profiles WHERE id = ?", SELECT_COLUMNS);
        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(ProfileRecord::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<ProfileRecord>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM voice_profiles ORDER BY created_at ASC",
            SELECT_COLUMNS
        );
        let rows: Vec<ProfileRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(ProfileRecord::try_from).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM voice_profiles WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::database::{create_pool, run_migrations, DatabaseConfig};
    use super::*;

    async fn repo() -> SqliteProfileRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteProfileRepository::new(pool)
    }

    #[tokio::test]
    async fn test_roundtrip_with_expressive_fields() {
        let repo = repo().await;

        let mut profile = VoiceProfile::new("zh-CN-XiaomoNeural");
        profile.api = ApiKind::Azure;
        profile.prosody = Prosody {
            rate: 20,
            volume: -5,
            pitch: 0,
        };
        profile.express_as = Some(ExpressAs {
            style: Some("cheerful".to_string()),
            style_degree: 1.5,
            role: Some("Girl".to_string()),
        });
        let record = ProfileRecord::new("旁白", profile.clone());

        repo.save(&record).await.unwrap();
        let loaded = repo.find_by_id(record.id).await.unwrap().unwrap();

        assert_eq!(loaded.name, "旁白");
        assert_eq!(loaded.profile, profile);
    }

    #[tokio::test]
    async fn test_roundtrip_preserves_sentinels_and_absent_style() {
        let repo = repo().await;
        let record = ProfileRecord::new("默认", VoiceProfile::default());

        repo.save(&record).await.unwrap();
        let loaded = repo.find_by_id(record.id).await.unwrap().unwrap();

        assert!(loaded.profile.is_rate_follow_system());
        assert!(loaded.profile.is_pitch_follow_system());
        assert!(loaded.profile.express_as.is_none());
    }

    #[tokio::test]
    async fn test_save_updates_existing() {
        let repo = repo().await;
        let mut record = ProfileRecord::new("档案", VoiceProfile::default());
        repo.save(&record).await.unwrap();

        record.profile.prosody.rate = 50;
        record.profile.format = "raw-16khz-16bit-mono-pcm".to_string();
        repo.save(&record).await.unwrap();

        let loaded = repo.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(loaded.profile.prosody.rate, 50);
        assert_eq!(loaded.profile.format, "raw-16khz-16bit-mono-pcm");
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        let record = ProfileRecord::new("临时", VoiceProfile::default());
        repo.save(&record).await.unwrap();

        repo.delete(record.id).await.unwrap();
        assert!(repo.find_by_id(record.id).await.unwrap().is_none());
    }
}
