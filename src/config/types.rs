//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;

use crate::application::ports::BackendSettings;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 合成后端配置
    #[serde(default)]
    pub backend: BackendConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 合成后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// 合成服务基础 URL
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// 请求超时（毫秒），prepare 时下发给后端
    #[serde(default = "default_timeout_millis")]
    pub timeout_millis: u64,

    /// 是否启用自定义 DNS 解析
    #[serde(default)]
    pub dns_lookup_enabled: bool,
}

fn default_backend_url() -> String {
    "http://localhost:1233".to_string()
}

fn default_timeout_millis() -> u64 {
    5000
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            timeout_millis: default_timeout_millis(),
            dns_lookup_enabled: false,
        }
    }
}

impl BackendConfig {
    /// 转换为 prepare 下发的进程级设置
    pub fn settings(&self) -> BackendSettings {
        BackendSettings {
            dns_lookup_enabled: self.dns_lookup_enabled,
            timeout_millis: self.timeout_millis,
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/revox.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.backend.url, "http://localhost:1233");
        assert_eq!(config.backend.timeout_millis, 5000);
        assert!(!config.backend.dns_lookup_enabled);
        assert_eq!(config.database.path, "data/revox.db");
    }

    #[test]
    fn test_backend_settings_conversion() {
        let mut config = BackendConfig::default();
        config.dns_lookup_enabled = true;
        config.timeout_millis = 3000;

        let settings = config.settings();
        assert!(settings.dns_lookup_enabled);
        assert_eq!(settings.timeout_millis, 3000);
    }

    #[test]
    fn test_database_url() {
        let config = DatabaseConfig::default();
        assert_eq!(config.database_url(), "sqlite:data/revox.db?mode=rwc");
    }
}
