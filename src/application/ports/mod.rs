//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod backend;
mod repositories;

pub use backend::{BackendSettings, SynthesisBackendPort, SynthesisError};
pub use repositories::{
    ProfileRecord, ProfileRepositoryPort, RepositoryError, RuleRecord, RuleRepositoryPort,
};
