//! Infrastructure Layer - 基础设施层
//!
//! - Adapters: 合成后端适配器（HTTP / Fake）
//! - Persistence: SQLite 规则与档案存储

pub mod adapters;
pub mod persistence;
