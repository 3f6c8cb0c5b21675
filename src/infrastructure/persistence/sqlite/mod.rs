//! SQLite Persistence - 规则与档案存储

mod database;
mod profile_repo;
mod rule_repo;

pub use database::{create_pool, run_migrations, DatabaseConfig, DbPool};
pub use profile_repo::SqliteProfileRepository;
pub use rule_repo::SqliteRuleRepository;
