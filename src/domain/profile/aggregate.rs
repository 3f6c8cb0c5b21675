//! Profile Context - Aggregate Root

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::format::{self, AudioFormatSpec};
use super::{ApiKind, ExpressAs, Prosody};

/// 默认语言
pub const DEFAULT_LOCALE: &str = "zh-CN";

/// 默认发音人
pub const DEFAULT_VOICE: &str = "zh-CN-XiaoxiaoNeural";

/// 合成请求描述
///
/// 不变量:
/// - voice_name 不能为空
/// - 解析后的音频格式由 format 派生，随 format 变化重新计算，不单独持久化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// 后端接口类型
    #[serde(default)]
    pub api: ApiKind,

    /// 音频格式标识，经注册表解析
    #[serde(default = "default_format_id")]
    pub format: String,

    /// 语言标签
    #[serde(default = "default_locale")]
    pub locale: String,

    /// 二级语言，仅对特定多语言发音人有意义
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_locale: Option<String>,

    /// 发音人名称
    pub voice_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,

    #[serde(default)]
    pub prosody: Prosody,

    /// 表达风格，None 表示未请求
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub express_as: Option<ExpressAs>,
}

fn default_format_id() -> String {
    format::DEFAULT_FORMAT.to_string()
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self::new(DEFAULT_VOICE)
    }
}

impl VoiceProfile {
    /// 以默认 locale/格式/prosody 创建
    pub fn new(voice_name: impl Into<String>) -> Self {
        Self::with_prosody(voice_name, Prosody::default())
    }

    /// 指定 prosody 创建
    pub fn with_prosody(voice_name: impl Into<String>, prosody: Prosody) -> Self {
        Self {
            api: ApiKind::default(),
            format: default_format_id(),
            locale: default_locale(),
            secondary_locale: None,
            voice_name: voice_name.into(),
            voice_id: None,
            prosody,
            express_as: None,
        }
    }

    /// 校验不变量
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.voice_name.is_empty() {
            return Err("发音人名称不能为空");
        }
        Ok(())
    }

    /// 解析后的音频格式（派生状态，每次从 format 重新计算）
    pub fn audio_format(&self) -> &'static AudioFormatSpec {
        format::resolve(&self.format)
    }

    /// 语速是否跟随系统
    pub fn is_rate_follow_system(&self) -> bool {
        self.prosody.is_rate_follow_system()
    }

    /// 音高是否跟随系统
    pub fn is_pitch_follow_system(&self) -> bool {
        self.prosody.is_pitch_follow_system()
    }

    /// 人类可读的参数摘要
    ///
    /// 哨兵值显示为「跟随」；style/role/强度仅在后端接口
    /// 支持表达风格时出现，未设置的风格显示「无」
    pub fn describe(&self) -> String {
        let rate = if self.is_rate_follow_system() {
            "跟随".to_string()
        } else {
            self.prosody.rate.to_string()
        };
        let pitch = if self.is_pitch_follow_system() {
            "跟随".to_string()
        } else {
            self.prosody.pitch.to_string()
        };
        let base = format!("语速:{} | 音量:{} | 音高:{}", rate, self.prosody.volume, pitch);

        if !self.api.supports_expressive() {
            return base;
        }

        let express = self.express_as.as_ref();
        let style = express.and_then(|e| e.style.as_deref()).unwrap_or("无");
        let role = express.and_then(|e| e.role.as_deref()).unwrap_or("无");
        let degree = express.map(|e| e.style_degree).unwrap_or(1.0);
        format!("{}-{} | 强度:{} | {}", style, role, degree, base)
    }
}

// express_as 含 f32 强度，按位模式哈希，与 PartialEq 保持一致
impl Hash for VoiceProfile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.api.hash(state);
        self.format.hash(state);
        self.locale.hash(state);
        self.secondary_locale.hash(state);
        self.voice_name.hash(state);
        self.voice_id.hash(state);
        self.prosody.hash(state);
        self.express_as.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(profile: &VoiceProfile) -> u64 {
        let mut hasher = DefaultHasher::new();
        profile.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_default_profile_follows_system() {
        let profile = VoiceProfile::new("zh-CN-XiaoxiaoNeural");
        assert!(profile.is_rate_follow_system());
        assert!(profile.is_pitch_follow_system());
        assert_eq!(profile.locale, "zh-CN");
        assert_eq!(profile.format, format::DEFAULT_FORMAT);
    }

    #[test]
    fn test_validate_rejects_empty_voice_name() {
        let profile = VoiceProfile::new("");
        assert!(profile.validate().is_err());
        assert!(VoiceProfile::default().validate().is_ok());
    }

    #[test]
    fn test_audio_format_recomputed_on_format_change() {
        let mut profile = VoiceProfile::default();
        assert_eq!(profile.audio_format().id, format::DEFAULT_FORMAT);

        profile.format = "raw-24khz-16bit-mono-pcm".to_string();
        assert_eq!(profile.audio_format().id, "raw-24khz-16bit-mono-pcm");

        profile.format = "made-up".to_string();
        assert_eq!(profile.audio_format().id, format::DEFAULT_FORMAT);
    }

    #[test]
    fn test_describe_omits_style_for_edge() {
        let mut profile = VoiceProfile::default();
        profile.express_as = Some(ExpressAs {
            style: Some("cheerful".to_string()),
            style_degree: 1.5,
            role: None,
        });

        let text = profile.describe();
        assert!(!text.contains("强度"));
        assert!(!text.contains("cheerful"));
        assert!(text.contains("语速:跟随"));
        assert!(text.contains("音量:0"));
        assert!(text.contains("音高:跟随"));
    }

    #[test]
    fn test_describe_includes_style_for_azure() {
        let mut profile = VoiceProfile::default();
        profile.api = ApiKind::Azure;
        profile.prosody.rate = 20;
        profile.express_as = Some(ExpressAs {
            style: Some("cheerful".to_string()),
            style_degree: 1.5,
            role: None,
        });

        let text = profile.describe();
        assert!(text.starts_with("cheerful-无 | 强度:1.5"));
        assert!(text.contains("语速:20"));
    }

    #[test]
    fn test_describe_placeholder_when_no_style_requested() {
        let mut profile = VoiceProfile::default();
        profile.api = ApiKind::Creation;
        assert!(profile.describe().starts_with("无-无 | 强度:1"));
    }

    #[test]
    fn test_structural_equality_and_hash() {
        let mut a = VoiceProfile::default();
        a.express_as = Some(ExpressAs::default());
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let mut c = b.clone();
        c.prosody.volume = 10;
        assert_ne!(a, c);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut profile = VoiceProfile::new("en-US-JennyMultilingualNeural");
        profile.api = ApiKind::Azure;
        profile.secondary_locale = Some("en-US".to_string());
        profile.express_as = Some(ExpressAs {
            style: Some("assistant".to_string()),
            style_degree: 0.8,
            role: Some("Girl".to_string()),
        });

        let json = serde_json::to_string(&profile).unwrap();
        let back: VoiceProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(profile, back);
    }
}
