//! 表单题目模型
//!
//! 描述从页面上提取出来的一道题：题干、类型、可写入的控件

use serde::Deserialize;

/// 隐私相关的跳过关键词
///
/// 题干中（大小写不敏感地）包含任一关键词的题目在提取阶段就被排除，
/// 永远不会进入作答流程
pub const SKIP_KEYWORDS: &[&str] = &["name", "phone", "email", "contact", "mobile"];

/// 题干是否命中跳过关键词
pub fn is_personal(text: &str) -> bool {
    let lower = text.to_lowercase();
    SKIP_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// 题目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    /// 自由文本（input / textarea）
    FreeText,
    /// 单选（radio）
    SingleChoice,
    /// 多选（checkbox）
    MultiChoice,
    /// 下拉框（select）
    Dropdown,
}

impl QuestionKind {
    /// 从探测脚本返回的类型字符串解析，未知类型按自由文本处理
    pub fn from_raw(s: &str) -> Self {
        match s {
            "radio" => QuestionKind::SingleChoice,
            "checkbox" => QuestionKind::MultiChoice,
            "select" => QuestionKind::Dropdown,
            _ => QuestionKind::FreeText,
        }
    }

    /// 是否需要逐选项解析控件（单选 / 多选）
    pub fn is_choice(self) -> bool {
        matches!(self, QuestionKind::SingleChoice | QuestionKind::MultiChoice)
    }
}

/// 一个可选项：选项文本 + 指向控件的选择器
///
/// 文档顺序即隐含的字母编号 A、B、C…
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    pub control: String,
}

/// 探测脚本直接返回的原始题目数据
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    /// 所属页面区域的标记选择器
    #[serde(default)]
    pub container: String,
    /// 题干文本（可能为空，精炼阶段过滤）
    #[serde(default)]
    pub text: String,
    /// 类型字符串："text" | "radio" | "checkbox" | "select"
    #[serde(default)]
    pub kind: String,
    /// 可写入控件的选择器（FreeText / Dropdown）
    #[serde(default)]
    pub target: Option<String>,
    /// 选项列表（单选 / 多选 / 下拉）
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
}

/// 一道已发现的表单题目
#[derive(Debug, Clone)]
pub struct QuestionDescriptor {
    /// 所属页面区域的标记选择器（借用自页面，提取器不修改其内容）
    pub container: String,
    /// 题干（非空，且不含跳过关键词）
    pub text: String,
    pub kind: QuestionKind,
    /// FreeText / Dropdown 的可写入控件；选择类题目为 None，作答时逐选项解析
    pub target: Option<String>,
    /// 文档顺序的选项列表
    pub options: Vec<ChoiceOption>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_personal_case_insensitive() {
        assert!(is_personal("What is your Name?"));
        assert!(is_personal("EMAIL address"));
        assert!(is_personal("Mobile number please"));
        assert!(!is_personal("What is your favorite color?"));
    }

    #[test]
    fn test_is_personal_substring_match() {
        // 子串匹配，不要求独立成词
        assert!(is_personal("Your nickname"));
        assert!(is_personal("Emergency contact person"));
    }

    #[test]
    fn test_kind_from_raw() {
        assert_eq!(QuestionKind::from_raw("radio"), QuestionKind::SingleChoice);
        assert_eq!(QuestionKind::from_raw("checkbox"), QuestionKind::MultiChoice);
        assert_eq!(QuestionKind::from_raw("select"), QuestionKind::Dropdown);
        assert_eq!(QuestionKind::from_raw("text"), QuestionKind::FreeText);
        assert_eq!(QuestionKind::from_raw("unknown"), QuestionKind::FreeText);
    }
}
