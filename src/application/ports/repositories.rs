//! Repository Ports - 出站端口
//!
//! 替换规则与合成档案的持久化抽象
//! 具体实现在 infrastructure 层（SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::profile::VoiceProfile;
use crate::domain::rewrite::ReplaceRule;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 替换规则记录（用于持久化）
#[derive(Debug, Clone)]
pub struct RuleRecord {
    pub id: Uuid,
    pub rule: ReplaceRule,
    /// 列表内排序，find_all 按此升序返回，保持插入顺序
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RuleRecord {
    /// 以当前时间创建新记录
    pub fn new(rule: ReplaceRule, sort_order: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            rule,
            sort_order,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Rule Repository Port
#[async_trait]
pub trait RuleRepositoryPort: Send + Sync {
    /// 保存规则（存在则更新）
    async fn save(&self, record: &RuleRecord) -> Result<(), RepositoryError>;

    /// 根据 ID 查找规则
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RuleRecord>, RepositoryError>;

    /// 按 sort_order 升序返回全部规则
    async fn find_all(&self) -> Result<Vec<RuleRecord>, RepositoryError>;

    /// 删除规则
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

/// 合成档案记录（用于持久化）
#[derive(Debug, Clone)]
pub struct ProfileRecord {
    pub id: Uuid,
    /// 显示名称
    pub name: String,
    pub profile: VoiceProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRecord {
    /// 以当前时间创建新记录
    pub fn new(name: impl Into<String>, profile: VoiceProfile) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            profile,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Profile Repository Port
#[async_trait]
pub trait ProfileRepositoryPort: Send + Sync {
    /// 保存档案（存在则更新）
    async fn save(&self, record: &ProfileRecord) -> Result<(), RepositoryError>;

    /// 根据 ID 查找档案
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProfileRecord>, RepositoryError>;

    /// 按创建时间返回全部档案
    async fn find_all(&self) -> Result<Vec<ProfileRecord>, RepositoryError>;

    /// 删除档案
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}
