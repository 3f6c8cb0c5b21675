//! Profile Context - Value Objects

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// 语速跟随系统的哨兵值，按严格相等判定
pub const RATE_FOLLOW_SYSTEM: i32 = -100;

/// 音高跟随系统的哨兵值，按严格相等判定
pub const PITCH_FOLLOW_SYSTEM: i32 = -50;

/// 后端接口类型
///
/// 闭合枚举，新增变体时穷尽匹配在编译期强制更新
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKind {
    /// Edge 接口，不支持表达风格
    #[default]
    Edge,
    /// Azure 订阅接口
    Azure,
    /// Creation 接口
    Creation,
}

impl ApiKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKind::Edge => "edge",
            ApiKind::Azure => "azure",
            ApiKind::Creation => "creation",
        }
    }

    /// 该接口是否支持表达风格（style/role/强度）
    pub fn supports_expressive(&self) -> bool {
        !matches!(self, ApiKind::Edge)
    }
}

impl std::fmt::Display for ApiKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ApiKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "edge" => Ok(ApiKind::Edge),
            "azure" => Ok(ApiKind::Azure),
            "creation" => Ok(ApiKind::Creation),
            _ => Err("未知的后端接口类型"),
        }
    }
}

/// Prosody 语音数值参数，单位: % 百分比增量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Prosody {
    /// 语速，-100 表示跟随系统
    pub rate: i32,
    /// 音量，0 表示不变
    pub volume: i32,
    /// 音高，-50 表示跟随系统
    pub pitch: i32,
}

impl Default for Prosody {
    fn default() -> Self {
        Self {
            rate: RATE_FOLLOW_SYSTEM,
            volume: 0,
            pitch: PITCH_FOLLOW_SYSTEM,
        }
    }
}

impl Prosody {
    /// 语速是否跟随系统，严格等于哨兵值时成立
    pub fn is_rate_follow_system(&self) -> bool {
        self.rate == RATE_FOLLOW_SYSTEM
    }

    /// 音高是否跟随系统，严格等于哨兵值时成立
    pub fn is_pitch_follow_system(&self) -> bool {
        self.pitch == PITCH_FOLLOW_SYSTEM
    }
}

/// 表达风格，仅部分后端接口支持
///
/// style/role 缺省表示未请求表达风格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressAs {
    /// 说话风格
    pub style: Option<String>,
    /// 风格强度倍率
    pub style_degree: f32,
    /// 扮演角色
    pub role: Option<String>,
}

impl Default for ExpressAs {
    fn default() -> Self {
        Self {
            style: None,
            style_degree: 1.0,
            role: None,
        }
    }
}

// style_degree 为 f32，按位模式参与哈希以保持与 PartialEq 一致
impl Hash for ExpressAs {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.style.hash(state);
        self.style_degree.to_bits().hash(state);
        self.role.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prosody_default_follows_system() {
        let prosody = Prosody::default();
        assert!(prosody.is_rate_follow_system());
        assert!(prosody.is_pitch_follow_system());
        assert_eq!(prosody.volume, 0);
    }

    #[test]
    fn test_follow_system_is_exact_equality() {
        let mut prosody = Prosody::default();
        prosody.rate = -99;
        assert!(!prosody.is_rate_follow_system());
        prosody.rate = -101;
        assert!(!prosody.is_rate_follow_system());
        prosody.rate = -100;
        assert!(prosody.is_rate_follow_system());

        prosody.pitch = -49;
        assert!(!prosody.is_pitch_follow_system());
        prosody.pitch = -51;
        assert!(!prosody.is_pitch_follow_system());
        prosody.pitch = -50;
        assert!(prosody.is_pitch_follow_system());
    }

    #[test]
    fn test_api_kind_roundtrip() {
        for kind in [ApiKind::Edge, ApiKind::Azure, ApiKind::Creation] {
            assert_eq!(kind.as_str().parse::<ApiKind>().unwrap(), kind);
        }
        assert!("unknown".parse::<ApiKind>().is_err());
    }

    #[test]
    fn test_expressive_support() {
        assert!(!ApiKind::Edge.supports_expressive());
        assert!(ApiKind::Azure.supports_expressive());
        assert!(ApiKind::Creation.supports_expressive());
    }

    #[test]
    fn test_express_as_default_degree() {
        let express = ExpressAs::default();
        assert!(express.style.is_none());
        assert!(express.role.is_none());
        assert_eq!(express.style_degree, 1.0);
    }
}
