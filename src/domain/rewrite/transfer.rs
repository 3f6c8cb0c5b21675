//! 规则列表的 JSON 导入导出
//!
//! 用于规则的备份与分享，数组顺序即规则应用顺序

use super::ReplaceRule;

/// 将规则列表序列化为 JSON 文本
pub fn export_rules(rules: &[ReplaceRule]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rules)
}

/// 从 JSON 文本解析规则列表，保持数组顺序
pub fn import_rules(json: &str) -> serde_json::Result<Vec<ReplaceRule>> {
    serde_json::from_str(json)
}
