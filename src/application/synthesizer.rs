//! Synthesis Client - 合成请求服务
//!
//! 调用链: 调用方文本 → 规则引擎 → SynthesisClient → 后端 → 音频。
//!
//! prepare 的后端重配置在冷却窗口（500ms）内节流。节流时间戳是
//! 本核心唯一的共享可变状态：随客户端创建，进程内每个后端持有
//! 一个客户端，所有档案共享同一时间戳。

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::application::ports::{BackendSettings, SynthesisBackendPort, SynthesisError};
use crate::domain::profile::VoiceProfile;

/// prepare 重配置冷却窗口
pub const PREPARE_COOLDOWN: Duration = Duration::from_millis(500);

/// 流式合成事件
///
/// 每个流交付零或多个 Chunk，之后恰好一个 End；
/// 终止性失败以 Failed 取代 End
#[derive(Debug)]
pub enum StreamEvent {
    /// 非空音频数据块，按生成顺序交付
    Chunk(Vec<u8>),
    /// 结束哨兵
    End,
    /// 终止性失败
    Failed(SynthesisError),
}

/// 重配置节流器
///
/// 「上次应用时间」在所有档案间共享；并发 prepare 下
/// 每个冷却窗口恰好放行一次
struct PrepareThrottle {
    last_applied: Mutex<Option<Instant>>,
    cooldown: Duration,
}

impl PrepareThrottle {
    fn new(cooldown: Duration) -> Self {
        Self {
            last_applied: Mutex::new(None),
            cooldown,
        }
    }

    /// 尝试取得执行权，窗口内的后续调用返回 false
    fn try_acquire(&self) -> bool {
        let mut last = self
            .last_applied
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let now = Instant::now();
        match *last {
            Some(applied) if now.duration_since(applied) < self.cooldown => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}

/// 合成客户端
///
/// 持有后端端口与进程级设置，可在多个并发合成请求间共享
pub struct SynthesisClient {
    backend: Arc<dyn SynthesisBackendPort>,
    settings: BackendSettings,
    throttle: PrepareThrottle,
}

impl SynthesisClient {
    pub fn new(backend: Arc<dyn SynthesisBackendPort>, settings: BackendSettings) -> Self {
        Self::with_cooldown(backend, settings, PREPARE_COOLDOWN)
    }

    /// 指定冷却窗口创建
    pub fn with_cooldown(
        backend: Arc<dyn SynthesisBackendPort>,
        settings: BackendSettings,
        cooldown: Duration,
    ) -> Self {
        Self {
            backend,
            settings,
            throttle: PrepareThrottle::new(cooldown),
        }
    }

    /// 合成前的后端重配置
    ///
    /// 冷却窗口内的重复调用是空操作，避免 UI 短时间内反复
    /// 触发加载导致冗余重配置
    pub fn prepare(&self, profile: &VoiceProfile) {
        if !self.throttle.try_acquire() {
            return;
        }
        tracing::debug!(
            api = profile.api.as_str(),
            dns_lookup = self.settings.dns_lookup_enabled,
            timeout_ms = self.settings.timeout_millis,
            "Applying backend settings"
        );
        self.backend.configure(self.settings);
    }

    /// 请求完整音频
    pub async fn synthesize(
        &self,
        text: &str,
        profile: &VoiceProfile,
    ) -> Result<Vec<u8>, SynthesisError> {
        if let Err(reason) = profile.validate() {
            return Err(SynthesisError::InvalidVoice(reason.to_string()));
        }

        self.prepare(profile);
        let format = profile.audio_format();
        tracing::debug!(
            voice = %profile.voice_name,
            format = format.id,
            text_len = text.len(),
            "Requesting synthesis"
        );
        self.backend.fetch(text, profile, format).await
    }

    /// 流式请求音频
    ///
    /// 返回事件接收端。丢弃接收端会中止生产（尽力而为），
    /// 不同流之间没有顺序保证。
    pub fn synthesize_stream(
        &self,
        text: &str,
        profile: &VoiceProfile,
        chunk_size: usize,
    ) -> mpsc::Receiver<StreamEvent> {
        let (event_tx, event_rx) = mpsc::channel(32);

        if let Err(reason) = profile.validate() {
            let _ = event_tx.try_send(StreamEvent::Failed(SynthesisError::InvalidVoice(
                reason.to_string(),
            )));
            return event_rx;
        }

        self.prepare(profile);

        let backend = Arc::clone(&self.backend);
        let text = text.to_owned();
        let profile = profile.clone();

        tokio::spawn(async move {
            let format = profile.audio_format();
            let (chunk_tx, mut chunk_rx) = mpsc::channel::<Vec<u8>>(32);

            let producer = tokio::spawn(async move {
                backend
                    .fetch_stream(&text, &profile, format, chunk_size, chunk_tx)
                    .await
            });

            while let Some(chunk) = chunk_rx.recv().await {
                if event_tx.send(StreamEvent::Chunk(chunk)).await.is_err() {
                    // 接收端已丢弃，停止生产
                    producer.abort();
                    return;
                }
            }

            let event = match producer.await {
                Ok(Ok(())) => StreamEvent::End,
                Ok(Err(e)) => StreamEvent::Failed(e),
                Err(e) => {
                    StreamEvent::Failed(SynthesisError::Service(format!("stream producer: {e}")))
                }
            };
            let _ = event_tx.send(event).await;
        });

        event_rx
    }

    /// 后端类型标签（纯查询）
    pub fn backend_kind(&self, profile: &VoiceProfile) -> &'static str {
        profile.api.as_str()
    }

    /// 已解析音频格式的显示串（纯查询）
    pub fn format_summary(&self, profile: &VoiceProfile) -> String {
        profile.audio_format().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::{
        FakeBackendConfig, FakeFailure, FakeSynthesisBackend,
    };

    fn client_with(
        config: FakeBackendConfig,
        cooldown: Duration,
    ) -> (Arc<FakeSynthesisBackend>, SynthesisClient) {
        let backend = Arc::new(FakeSynthesisBackend::new(config));
        let client = SynthesisClient::with_cooldown(
            backend.clone(),
            BackendSettings::default(),
            cooldown,
        );
        (backend, client)
    }

    async fn collect(mut rx: mpsc::Receiver<StreamEvent>) -> (Vec<u8>, usize, bool) {
        let mut audio = Vec::new();
        let mut ends = 0;
        let mut failed = false;
        while let Some(event) = rx.recv().await {
            match event {
                StreamEvent::Chunk(chunk) => {
                    assert!(!chunk.is_empty());
                    assert_eq!(ends, 0, "chunk after completion sentinel");
                    audio.extend_from_slice(&chunk);
                }
                StreamEvent::End => ends += 1,
                StreamEvent::Failed(_) => failed = true,
            }
        }
        (audio, ends, failed)
    }

    #[tokio::test(start_paused = true)]
    async fn test_prepare_throttled_within_cooldown() {
        let (backend, client) = client_with(FakeBackendConfig::default(), PREPARE_COOLDOWN);
        let profile = VoiceProfile::default();

        client.prepare(&profile);
        client.prepare(&profile);
        assert_eq!(backend.configure_calls(), 1);

        tokio::time::advance(Duration::from_millis(600)).await;
        client.prepare(&profile);
        assert_eq!(backend.configure_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prepare_noop_just_inside_window() {
        let (backend, client) = client_with(FakeBackendConfig::default(), PREPARE_COOLDOWN);
        let profile = VoiceProfile::default();

        client.prepare(&profile);
        tokio::time::advance(Duration::from_millis(499)).await;
        client.prepare(&profile);
        assert_eq!(backend.configure_calls(), 1);
    }

    #[tokio::test]
    async fn test_throttle_shared_across_profiles() {
        let (backend, client) = client_with(FakeBackendConfig::default(), PREPARE_COOLDOWN);

        client.prepare(&VoiceProfile::new("zh-CN-XiaoxiaoNeural"));
        client.prepare(&VoiceProfile::new("zh-CN-YunxiNeural"));
        assert_eq!(backend.configure_calls(), 1);
    }

    #[tokio::test]
    async fn test_synthesize_returns_backend_audio_and_settings_applied() {
        let config = FakeBackendConfig {
            audio: vec![7u8; 100],
            ..Default::default()
        };
        let (backend, client) = client_with(config, PREPARE_COOLDOWN);

        let audio = client
            .synthesize("你好", &VoiceProfile::default())
            .await
            .unwrap();
        assert_eq!(audio, vec![7u8; 100]);
        assert_eq!(backend.last_settings(), Some(BackendSettings::default()));
    }

    #[tokio::test]
    async fn test_synthesize_rejects_empty_voice_name() {
        let (_, client) = client_with(FakeBackendConfig::default(), PREPARE_COOLDOWN);

        let result = client.synthesize("你好", &VoiceProfile::new("")).await;
        assert!(matches!(result, Err(SynthesisError::InvalidVoice(_))));
    }

    #[tokio::test]
    async fn test_stream_delivers_chunks_then_single_end() {
        let config = FakeBackendConfig {
            audio: (0u8..200).collect(),
            ..Default::default()
        };
        let (_, client) = client_with(config, PREPARE_COOLDOWN);

        let rx = client.synthesize_stream("你好", &VoiceProfile::default(), 64);
        let (audio, ends, failed) = collect(rx).await;

        assert_eq!(audio, (0u8..200).collect::<Vec<u8>>());
        assert_eq!(ends, 1);
        assert!(!failed);
    }

    #[tokio::test]
    async fn test_stream_chunk_size_one() {
        let config = FakeBackendConfig {
            audio: vec![1, 2, 3],
            ..Default::default()
        };
        let (_, client) = client_with(config, PREPARE_COOLDOWN);

        let rx = client.synthesize_stream("你好", &VoiceProfile::default(), 1);
        let (audio, ends, _) = collect(rx).await;
        assert_eq!(audio, vec![1, 2, 3]);
        assert_eq!(ends, 1);
    }

    #[tokio::test]
    async fn test_stream_matches_blocking_fetch() {
        let config = FakeBackendConfig {
            audio: (0u8..=255).collect(),
            ..Default::default()
        };
        let (_, client) = client_with(config, Duration::ZERO);
        let profile = VoiceProfile::default();

        let full = client.synthesize("文本", &profile).await.unwrap();
        let rx = client.synthesize_stream("文本", &profile, 40);
        let (streamed, _, _) = collect(rx).await;
        assert_eq!(full, streamed);
    }

    #[tokio::test]
    async fn test_stream_failure_replaces_end() {
        let config = FakeBackendConfig {
            failure: Some(FakeFailure::Network),
            ..Default::default()
        };
        let (_, client) = client_with(config, PREPARE_COOLDOWN);

        let rx = client.synthesize_stream("你好", &VoiceProfile::default(), 64);
        let (audio, ends, failed) = collect(rx).await;
        assert!(audio.is_empty());
        assert_eq!(ends, 0);
        assert!(failed);
    }

    #[tokio::test]
    async fn test_synthesize_surfaces_backend_failure() {
        let config = FakeBackendConfig {
            failure: Some(FakeFailure::Quota),
            ..Default::default()
        };
        let (_, client) = client_with(config, PREPARE_COOLDOWN);

        let result = client.synthesize("你好", &VoiceProfile::default()).await;
        assert!(matches!(result, Err(SynthesisError::Quota(_))));
    }

    #[tokio::test]
    async fn test_pure_queries() {
        let (_, client) = client_with(FakeBackendConfig::default(), PREPARE_COOLDOWN);
        let profile = VoiceProfile::default();

        assert_eq!(client.backend_kind(&profile), "edge");
        assert_eq!(
            client.format_summary(&profile),
            "audio-24khz-48kbitrate-mono-mp3"
        );
    }
}
