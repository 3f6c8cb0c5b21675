//! Revox - 文本替换与语音合成请求管线
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Rewrite Context: 有序文本替换规则与规则引擎
//! - Profile Context: 合成请求描述（locale/发音人/prosody/表达风格）与音频格式注册表
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SynthesisBackend, Repositories）
//! - Synthesizer: 节流 prepare、阻塞合成与流式合成
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP / Fake 合成后端
//! - Persistence: SQLite 规则与档案存储
//!
//! 调用链: 调用方文本 → 规则引擎重写 → SynthesisClient → 后端 → 音频字节/流

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
