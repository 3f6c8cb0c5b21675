//! Profile Context - 合成请求限界上下文
//!
//! 职责:
//! - 合成参数描述 (locale/发音人/prosody/表达风格)
//! - 音频格式注册表

mod aggregate;
pub mod format;
mod value_objects;

pub use aggregate::{VoiceProfile, DEFAULT_LOCALE, DEFAULT_VOICE};
pub use format::{AudioEncoding, AudioFormatSpec, DEFAULT_FORMAT};
pub use value_objects::{ApiKind, ExpressAs, Prosody, PITCH_FOLLOW_SYSTEM, RATE_FOLLOW_SYSTEM};
