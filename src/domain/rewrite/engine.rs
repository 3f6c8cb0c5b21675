//! 规则引擎
//!
//! 按给定顺序将替换规则依次作用于文本。规则顺序组合：
//! 每条规则作用于前一条规则产出的当前文本，而非各自独立作用于原文。

use regex::Regex;

use super::ReplaceRule;

/// 单条正则规则编译失败的警告
///
/// 编译失败不致命：该规则被跳过，后续规则照常处理
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleWarning {
    /// 规则显示名称
    pub rule_name: String,
    /// 编译失败的 pattern
    pub pattern: String,
    /// 正则引擎给出的错误信息
    pub message: String,
}

/// 规则应用结果
#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    /// 重写后的文本
    pub text: String,
    /// 收集到的非致命警告，每条违规规则一条
    pub warnings: Vec<RuleWarning>,
}

/// 将规则序列按序应用于文本
///
/// - 禁用规则与空 pattern 规则直接跳过
/// - 字面规则替换当前文本中所有不重叠出现，不做转义
/// - 正则规则在使用时编译，编译失败记为警告并继续
///
/// 对固定输入与固定规则序列，结果是确定性的。
pub fn apply_rules(text: &str, rules: &[ReplaceRule]) -> RewriteOutcome {
    let mut current = text.to_string();
    let mut warnings = Vec::new();

    for rule in rules {
        if !rule.is_enabled || rule.pattern.is_empty() {
            continue;
        }

        if rule.is_regex {
            match Regex::new(&rule.pattern) {
                Ok(re) => {
                    let replacement = brace_group_refs(&rule.replacement);
                    current = re.replace_all(&current, replacement.as_str()).into_owned();
                }
                Err(e) => {
                    tracing::warn!(
                        rule = %rule.name,
                        pattern = %rule.pattern,
                        "invalid regex pattern, rule skipped"
                    );
                    warnings.push(RuleWarning {
                        rule_name: rule.name.clone(),
                        pattern: rule.pattern.clone(),
                        message: e.to_string(),
                    });
                }
            }
        } else {
            current = current.replace(rule.pattern.as_str(), &rule.replacement);
        }
    }

    RewriteOutcome {
        text: current,
        warnings,
    }
}

/// 将替换串中的数字组引用规范化为花括号形式
///
/// regex crate 会把 `$1z` 解析为名为 `1z` 的组引用，这里改写为
/// `${1}z`，使数字引用后可以紧跟普通文字。`$$` 转义与已有的
/// `${...}` 形式原样保留。
fn brace_group_refs(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len() + 4);
    let mut chars = replacement.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                out.push_str("$$");
                chars.next();
            }
            Some(c) if c.is_ascii_digit() => {
                out.push_str("${");
                while let Some(&d) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    out.push(d);
                    chars.next();
                }
                out.push('}');
            }
            _ => out.push('$'),
        }
    }

    out
}
