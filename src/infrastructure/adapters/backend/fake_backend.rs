//! Fake Synthesis Backend - 用于测试的合成后端
//!
//! 返回确定性的固定音频，不访问网络；记录 configure 调用
//! 供节流测试断言，可预设失败方式

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::ports::{BackendSettings, SynthesisBackendPort, SynthesisError};
use crate::domain::profile::{AudioFormatSpec, VoiceProfile};

/// 预设失败方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeFailure {
    /// 网络失败
    Network,
    /// 发音人无效
    InvalidVoice,
    /// 配额耗尽
    Quota,
}

impl FakeFailure {
    fn into_error(self, voice: &str) -> SynthesisError {
        match self {
            FakeFailure::Network => {
                SynthesisError::Network("simulated network failure".to_string())
            }
            FakeFailure::InvalidVoice => SynthesisError::InvalidVoice(voice.to_string()),
            FakeFailure::Quota => SynthesisError::Quota("simulated quota exhaustion".to_string()),
        }
    }
}

/// Fake 后端配置
#[derive(Debug, Clone)]
pub struct FakeBackendConfig {
    /// 固定返回的音频数据
    pub audio: Vec<u8>,
    /// 每块之间的模拟延迟（毫秒）
    pub chunk_delay_ms: u64,
    /// Some 时 fetch/fetch_stream 直接以该方式失败
    pub failure: Option<FakeFailure>,
}

impl Default for FakeBackendConfig {
    fn default() -> Self {
        Self {
            audio: (0u8..=255).collect(),
            chunk_delay_ms: 0,
            failure: None,
        }
    }
}

/// Fake 合成后端
pub struct FakeSynthesisBackend {
    config: FakeBackendConfig,
    configure_calls: AtomicUsize,
    last_settings: Mutex<Option<BackendSettings>>,
}

impl FakeSynthesisBackend {
    pub fn new(config: FakeBackendConfig) -> Self {
        Self {
            config,
            configure_calls: AtomicUsize::new(0),
            last_settings: Mutex::new(None),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeBackendConfig::default())
    }

    /// configure 被调用的次数
    pub fn configure_calls(&self) -> usize {
        self.configure_calls.load(Ordering::SeqCst)
    }

    /// 最近一次应用的设置
    pub fn last_settings(&self) -> Option<BackendSettings> {
        *self
            .last_settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SynthesisBackendPort for FakeSynthesisBackend {
    fn configure(&self, settings: BackendSettings) {
        self.configure_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(settings);
    }

    async fn fetch(
        &self,
        text: &str,
        profile: &VoiceProfile,
        _format: &AudioFormatSpec,
    ) -> Result<Vec<u8>, SynthesisError> {
        if let Some(failure) = self.config.failure {
            return Err(failure.into_error(&profile.voice_name));
        }

        tracing::debug!(
            text_len = text.len(),
            voice = %profile.voice_name,
            "FakeSynthesisBackend: returning fixed audio"
        );

        Ok(self.config.audio.clone())
    }

    async fn fetch_stream(
        &self,
        _text: &str,
        profile: &VoiceProfile,
        _format: &AudioFormatSpec,
        chunk_size: usize,
        sink: mpsc::Sender<Vec<u8>>,
    ) -> Result<(), SynthesisError> {
        if let Some(failure) = self.config.failure {
            return Err(failure.into_error(&profile.voice_name));
        }

        let chunk_size = chunk_size.max(1);
        for chunk in self.config.audio.chunks(chunk_size) {
            if self.config.chunk_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.chunk_delay_ms)).await;
            }
            if sink.send(chunk.to_vec()).await.is_err() {
                // 接收端关闭，视为取消
                return Ok(());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_returns_configured_audio() {
        let backend = FakeSynthesisBackend::new(FakeBackendConfig {
            audio: vec![9, 9, 9],
            ..Default::default()
        });
        let profile = VoiceProfile::default();

        let audio = backend
            .fetch("text", &profile, profile.audio_format())
            .await
            .unwrap();
        assert_eq!(audio, vec![9, 9, 9]);
    }

    #[tokio::test]
    async fn test_fetch_stream_chunks_cover_audio_in_order() {
        let backend = FakeSynthesisBackend::with_defaults();
        let profile = VoiceProfile::default();
        let (tx, mut rx) = mpsc::channel(16);

        backend
            .fetch_stream("text", &profile, profile.audio_format(), 100, tx)
            .await
            .unwrap();

        let mut collected = Vec::new();
        while let Some(chunk) = rx.recv().await {
            collected.extend_from_slice(&chunk);
        }
        assert_eq!(collected, (0u8..=255).collect::<Vec<u8>>());
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let backend = FakeSynthesisBackend::new(FakeBackendConfig {
            failure: Some(FakeFailure::InvalidVoice),
            ..Default::default()
        });
        let profile = VoiceProfile::default();

        let result = backend.fetch("text", &profile, profile.audio_format()).await;
        assert!(matches!(result, Err(SynthesisError::InvalidVoice(_))));
    }

    #[tokio::test]
    async fn test_configure_recorded() {
        let backend = FakeSynthesisBackend::with_defaults();
        assert_eq!(backend.configure_calls(), 0);

        backend.configure(BackendSettings {
            dns_lookup_enabled: true,
            timeout_millis: 100,
        });
        assert_eq!(backend.configure_calls(), 1);
        assert!(backend.last_settings().unwrap().dns_lookup_enabled);
    }
}
