//! 替换规则实体

use serde::{Deserialize, Serialize};

/// 文本替换规则
///
/// 规则序列按列表顺序依次作用于当前文本，顺序敏感。
/// 引擎不会修改规则本身。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplaceRule {
    /// 显示名称（允许重名）
    pub name: String,

    /// 是否启用
    pub is_enabled: bool,

    /// 是否按正则匹配
    ///
    /// false 时 pattern 作为字面子串匹配；true 时 pattern 在使用时编译，
    /// 编译失败的规则被跳过并产生警告
    pub is_regex: bool,

    /// 匹配内容
    pub pattern: String,

    /// 替换为
    pub replacement: String,
}

impl ReplaceRule {
    /// 创建字面替换规则
    pub fn literal(
        name: impl Into<String>,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            is_enabled: true,
            is_regex: false,
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    /// 创建正则替换规则
    pub fn regex(
        name: impl Into<String>,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            is_regex: true,
            ..Self::literal(name, pattern, replacement)
        }
    }

    /// 返回禁用副本
    pub fn disabled(mut self) -> Self {
        self.is_enabled = false;
        self
    }
}
