//! 音频格式注册表
//!
//! 维护已知格式标识到格式描述的静态映射。未知标识一律静默回退到
//! 默认格式：这是注册表的既定策略，调用方不会从查询得到错误。

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// 默认音频格式标识
pub const DEFAULT_FORMAT: &str = "audio-24khz-48kbitrate-mono-mp3";

/// 音频编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioEncoding {
    Mp3,
    Opus,
    Pcm,
}

impl std::fmt::Display for AudioEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioEncoding::Mp3 => write!(f, "mp3"),
            AudioEncoding::Opus => write!(f, "opus"),
            AudioEncoding::Pcm => write!(f, "pcm"),
        }
    }
}

/// 音频格式描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFormatSpec {
    /// 格式标识，同时是对外显示串
    pub id: &'static str,
    pub encoding: AudioEncoding,
    /// 采样率（Hz）
    pub sample_rate: u32,
    /// 比特率（bps），PCM 无
    pub bitrate: Option<u32>,
    /// 位深度，仅原始采样格式标注
    pub bit_depth: Option<u8>,
    /// 声道数
    pub channels: u8,
}

impl std::fmt::Display for AudioFormatSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// 已知格式表
static FORMATS: Lazy<HashMap<&'static str, AudioFormatSpec>> = Lazy::new(|| {
    let mut m = HashMap::new();
    let mut insert = |spec: AudioFormatSpec| {
        m.insert(spec.id, spec);
    };

    insert(mp3("audio-16khz-32kbitrate-mono-mp3", 16000, 32000));
    insert(mp3("audio-16khz-128kbitrate-mono-mp3", 16000, 128000));
    insert(mp3("audio-24khz-48kbitrate-mono-mp3", 24000, 48000));
    insert(mp3("audio-24khz-96kbitrate-mono-mp3", 24000, 96000));
    insert(mp3("audio-48khz-96kbitrate-mono-mp3", 48000, 96000));
    insert(opus("webm-24khz-16bit-mono-opus", 24000));
    insert(opus("ogg-24khz-16bit-mono-opus", 24000));
    insert(pcm("raw-16khz-16bit-mono-pcm", 16000));
    insert(pcm("raw-24khz-16bit-mono-pcm", 24000));

    m
});

fn mp3(id: &'static str, sample_rate: u32, bitrate: u32) -> AudioFormatSpec {
    AudioFormatSpec {
        id,
        encoding: AudioEncoding::Mp3,
        sample_rate,
        bitrate: Some(bitrate),
        bit_depth: None,
        channels: 1,
    }
}

fn opus(id: &'static str, sample_rate: u32) -> AudioFormatSpec {
    AudioFormatSpec {
        id,
        encoding: AudioEncoding::Opus,
        sample_rate,
        bitrate: None,
        bit_depth: Some(16),
        channels: 1,
    }
}

fn pcm(id: &'static str, sample_rate: u32) -> AudioFormatSpec {
    AudioFormatSpec {
        id,
        encoding: AudioEncoding::Pcm,
        sample_rate,
        bitrate: None,
        bit_depth: Some(16),
        channels: 1,
    }
}

/// 解析格式标识
///
/// 已知标识返回映射的描述；未知标识返回默认格式，不报错
pub fn resolve(id: &str) -> &'static AudioFormatSpec {
    FORMATS.get(id).unwrap_or_else(|| &FORMATS[DEFAULT_FORMAT])
}

/// 遍历全部已知格式
pub fn all() -> impl Iterator<Item = &'static AudioFormatSpec> {
    FORMATS.values()
}
