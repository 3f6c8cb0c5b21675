//! Rewrite Context - 文本替换限界上下文
//!
//! 职责:
//! - 替换规则实体
//! - 按给定顺序将规则作用于待合成文本
//! - 规则列表的 JSON 导入导出

mod engine;
mod rule;
mod transfer;

pub use engine::{apply_rules, RewriteOutcome, RuleWarning};
pub use rule::ReplaceRule;
pub use transfer::{export_rules, import_rules};
