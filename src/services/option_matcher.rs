//! 选项匹配 - 业务能力层
//!
//! 把模型的自由文本回答映射到一个或多个离散选项。
//! 提示词里明确给出了字母编号，模型最可能按字母作答，
//! 所以字母解码优先于一切文本匹配。

use std::sync::OnceLock;

use regex::Regex;

use crate::models::question::ChoiceOption;

/// 多选题最多选中的选项数，防止复选框题目被过度勾选
pub const MAX_MULTI_SELECT: usize = 3;

fn letter_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([A-Za-z])[).]").expect("字母前缀正则"))
}

fn letter_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Za-z])\b").expect("字母扫描正则"))
}

/// 把单个 ASCII 字母解码为 0 起始的选项索引
///
/// 超出选项数量的索引直接拒绝，不做回绕
fn letter_index(letter: char, option_count: usize) -> Option<usize> {
    let upper = letter.to_ascii_uppercase();
    if !upper.is_ascii_uppercase() {
        return None;
    }
    let index = (upper as usize) - ('A' as usize);
    (index < option_count).then_some(index)
}

/// 单选匹配：返回选中选项的索引
///
/// 优先级：字母编号 → 精确匹配 → 词重叠打分 → 首个非空选项兜底。
/// 只有在没有选项或所有选项文本为空时才返回 None。
pub fn match_one(options: &[ChoiceOption], answer: &str) -> Option<usize> {
    if options.is_empty() {
        return None;
    }

    // 1. 字母编号："B) London" 这种形式直接解码
    if let Some(cap) = letter_prefix_re().captures(answer) {
        if let Some(letter) = cap[1].chars().next() {
            if let Some(index) = letter_index(letter, options.len()) {
                return Some(index);
            }
        }
    }

    // 2. 精确匹配（大小写不敏感）
    let answer_trim = answer.trim();
    for (i, opt) in options.iter().enumerate() {
        if opt.label.trim().eq_ignore_ascii_case(answer_trim) {
            return Some(i);
        }
    }

    // 3. 词重叠打分：回答里的词命中选项文本 +1，选项整体出现在回答里 +3
    let answer_lower = answer.to_lowercase();
    let words: Vec<&str> = answer_lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .collect();

    let mut best: Option<(usize, u32)> = None;
    for (i, opt) in options.iter().enumerate() {
        let label_lower = opt.label.to_lowercase();
        let mut score = 0u32;
        for word in &words {
            if label_lower.contains(word) {
                score += 1;
            }
        }
        if label_lower.len() > 3 && answer_lower.contains(&label_lower) {
            score += 3;
        }
        // 平分时保留先遇到的选项
        if score > 0 {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((i, score)),
            }
        }
    }
    if let Some((index, _)) = best {
        return Some(index);
    }

    // 4. 兜底：第一个有非空文本的选项
    options.iter().position(|opt| !opt.label.trim().is_empty())
}

/// 多选匹配：返回选中选项的索引列表
///
/// 按回答中首次出现的顺序收集，无论走哪条路径结果都不超过
/// [`MAX_MULTI_SELECT`] 个
pub fn match_many(options: &[ChoiceOption], answer: &str) -> Vec<usize> {
    if options.is_empty() {
        return Vec::new();
    }

    // 1. 扫描回答中的所有单字母 token，解码出有效索引
    let mut by_letter = Vec::new();
    for cap in letter_token_re().captures_iter(answer) {
        if let Some(letter) = cap[1].chars().next() {
            if let Some(index) = letter_index(letter, options.len()) {
                if !by_letter.contains(&index) {
                    by_letter.push(index);
                }
            }
        }
    }
    if !by_letter.is_empty() {
        by_letter.truncate(MAX_MULTI_SELECT);
        return by_letter;
    }

    let answer_lower = answer.to_lowercase();

    // 2. 选项与回答互为子串
    let mut matched: Vec<usize> = options
        .iter()
        .enumerate()
        .filter(|(_, opt)| {
            let label_lower = opt.label.to_lowercase();
            label_lower.len() > 3
                && (answer_lower.contains(&label_lower) || label_lower.contains(&answer_lower))
        })
        .map(|(i, _)| i)
        .collect();

    // 3. 词重叠
    if matched.is_empty() {
        let words: Vec<&str> = answer_lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 3)
            .collect();
        matched = options
            .iter()
            .enumerate()
            .filter(|(_, opt)| {
                let label_lower = opt.label.to_lowercase();
                words.iter().any(|w| label_lower.contains(w))
            })
            .map(|(i, _)| i)
            .collect();
    }

    // 4. 兜底：第一个选项
    if matched.is_empty() {
        matched.push(0);
    }

    matched.truncate(MAX_MULTI_SELECT);
    matched
}
