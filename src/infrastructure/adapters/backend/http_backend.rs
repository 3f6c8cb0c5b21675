//! HTTP Synthesis Backend - 调用外部合成服务
//!
//! 实现 SynthesisBackendPort trait，通过 HTTP 调用合成后端
//!
//! 外部 API:
//! POST {base_url}/api/v1/synthesis
//! Request: JSON（文本 + 档案参数 + 格式标识）
//! Response: audio 二进制

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::application::ports::{BackendSettings, SynthesisBackendPort, SynthesisError};
use crate::domain::profile::{AudioFormatSpec, VoiceProfile};

/// 合成请求体 (JSON)
#[derive(Debug, Serialize)]
struct SynthesisHttpRequest<'a> {
    /// 要合成的文本
    text: &'a str,
    voice: &'a str,
    locale: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secondary_locale: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_id: Option<&'a str>,
    rate: i32,
    volume: i32,
    pitch: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    style_degree: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    api: &'a str,
    format: &'a str,
}

/// HTTP 后端配置
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// 合成服务基础 URL
    pub base_url: String,
    /// 初始进程级设置，可被 configure 覆盖
    pub settings: BackendSettings,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1233".to_string(),
            settings: BackendSettings::default(),
        }
    }
}

impl HttpBackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout_millis(mut self, millis: u64) -> Self {
        self.settings.timeout_millis = millis;
        self
    }
}

/// HTTP 合成后端
pub struct HttpSynthesisBackend {
    client: Client,
    config: HttpBackendConfig,
    /// configure 下发的进程级设置
    settings: RwLock<BackendSettings>,
}

impl HttpSynthesisBackend {
    /// 创建新的 HTTP 合成后端
    pub fn new(config: HttpBackendConfig) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.settings.timeout_millis))
            .build()
            .map_err(|e| SynthesisError::Network(e.to_string()))?;
        let settings = RwLock::new(config.settings);

        Ok(Self {
            client,
            config,
            settings,
        })
    }

    /// 使用默认配置创建
    pub fn with_default_config() -> Result<Self, SynthesisError> {
        Self::new(HttpBackendConfig::default())
    }

    fn synthesis_url(&self) -> String {
        format!("{}/api/v1/synthesis", self.config.base_url)
    }

    fn current_settings(&self) -> BackendSettings {
        *self
            .settings
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn build_request<'a>(
        text: &'a str,
        profile: &'a VoiceProfile,
        format: &'a AudioFormatSpec,
    ) -> SynthesisHttpRequest<'a> {
        let express = profile.express_as.as_ref();
        SynthesisHttpRequest {
            text,
            voice: &profile.voice_name,
            locale: &profile.locale,
            secondary_locale: profile.secondary_locale.as_deref(),
            voice_id: profile.voice_id.as_deref(),
            rate: profile.prosody.rate,
            volume: profile.prosody.volume,
            pitch: profile.prosody.pitch,
            style: express.and_then(|e| e.style.as_deref()),
            style_degree: express.map(|e| e.style_degree),
            role: express.and_then(|e| e.role.as_deref()),
            api: profile.api.as_str(),
            format: format.id,
        }
    }

    async fn send(
        &self,
        text: &str,
        profile: &VoiceProfile,
        format: &AudioFormatSpec,
    ) -> Result<reqwest::Response, SynthesisError> {
        let settings = self.current_settings();
        let body = Self::build_request(text, profile, format);

        tracing::debug!(
            url = %self.synthesis_url(),
            voice = %profile.voice_name,
            format = format.id,
            text_len = text.len(),
            "Sending synthesis request"
        );

        let response = self
            .client
            .post(self.synthesis_url())
            .timeout(Duration::from_millis(settings.timeout_millis))
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(map_status_error(status, &message, &profile.voice_name));
        }

        Ok(response)
    }
}

fn map_transport_error(e: reqwest::Error) -> SynthesisError {
    if e.is_timeout() {
        SynthesisError::Timeout
    } else if e.is_connect() {
        SynthesisError::Network(format!("cannot connect to synthesis backend: {}", e))
    } else {
        SynthesisError::Network(e.to_string())
    }
}

fn map_status_error(status: StatusCode, message: &str, voice: &str) -> SynthesisError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
            SynthesisError::Quota(format!("HTTP {}: {}", status, message))
        }
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
            SynthesisError::InvalidVoice(format!("{}: HTTP {}: {}", voice, status, message))
        }
        _ => SynthesisError::Service(format!("HTTP {}: {}", status, message)),
    }
}

#[async_trait]
impl SynthesisBackendPort for HttpSynthesisBackend {
    fn configure(&self, settings: BackendSettings) {
        let mut guard = self
            .settings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = settings;

        tracing::info!(
            dns_lookup = settings.dns_lookup_enabled,
            timeout_ms = settings.timeout_millis,
            "Synthesis backend reconfigured"
        );
    }

    async fn fetch(
        &self,
        text: &str,
        profile: &VoiceProfile,
        format: &AudioFormatSpec,
    ) -> Result<Vec<u8>, SynthesisError> {
        let response = self.send(text, profile, format).await?;

        let audio = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::InvalidResponse(format!("failed to read audio: {}", e)))?
            .to_vec();

        tracing::info!(
            voice = %profile.voice_name,
            audio_size = audio.len(),
            "Synthesis completed"
        );

        Ok(audio)
    }

    async fn fetch_stream(
        &self,
        text: &str,
        profile: &VoiceProfile,
        format: &AudioFormatSpec,
        chunk_size: usize,
        sink: mpsc::Sender<Vec<u8>>,
    ) -> Result<(), SynthesisError> {
        let chunk_size = chunk_size.max(1);
        let response = self.send(text, profile, format).await?;
        let mut stream = response.bytes_stream();

        // 重组为 chunk_size 大小的数据块；块边界不对齐音频帧
        let mut buffer: Vec<u8> = Vec::with_capacity(chunk_size);
        while let Some(piece) = stream.next().await {
            let piece = piece.map_err(|e| SynthesisError::Network(e.to_string()))?;
            buffer.extend_from_slice(&piece);

            while buffer.len() >= chunk_size {
                let rest = buffer.split_off(chunk_size);
                let chunk = std::mem::replace(&mut buffer, rest);
                if sink.send(chunk).await.is_err() {
                    // 接收端关闭，视为取消
                    return Ok(());
                }
            }
        }

        if !buffer.is_empty() {
            let _ = sink.send(buffer).await;
        }

        Ok(())
    }
}
