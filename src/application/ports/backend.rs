//! Synthesis Backend Port - 合成后端抽象
//!
//! 后端是不透明能力：协议、编解码与网络细节在 infrastructure 层实现。
//! 核心只依赖本端口定义的契约。

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::profile::{AudioFormatSpec, VoiceProfile};

/// 合成错误
///
/// 对单次合成调用致命，原样上抛给调用方；核心内不做重试
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid voice: {0}")]
    InvalidVoice(String),

    #[error("Quota or auth failure: {0}")]
    Quota(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 进程级后端设置
///
/// 由 prepare 经 configure 下发，对后端全局生效
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendSettings {
    /// 是否启用自定义 DNS 解析
    pub dns_lookup_enabled: bool,
    /// 请求超时（毫秒）
    pub timeout_millis: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            dns_lookup_enabled: false,
            timeout_millis: 5000,
        }
    }
}

/// Synthesis Backend Port
///
/// configure 假定在后端侧幂等。fetch_stream 只向 sink 发送非空数据块，
/// 完成或失败通过返回值表达，结束哨兵由调用方补发。
#[async_trait]
pub trait SynthesisBackendPort: Send + Sync {
    /// 应用进程级设置（重配置）
    fn configure(&self, settings: BackendSettings);

    /// 获取完整音频
    async fn fetch(
        &self,
        text: &str,
        profile: &VoiceProfile,
        format: &AudioFormatSpec,
    ) -> Result<Vec<u8>, SynthesisError>;

    /// 流式获取音频
    ///
    /// 数据块按生成顺序写入 sink，块边界由后端决定，不对齐音频帧
    async fn fetch_stream(
        &self,
        text: &str,
        profile: &VoiceProfile,
        format: &AudioFormatSpec,
        chunk_size: usize,
        sink: mpsc::Sender<Vec<u8>>,
    ) -> Result<(), SynthesisError>;
}
