//! 提示词构建 - 业务能力层
//!
//! 把一道题和已累积的答案历史变成可直接发送给模型的指令文本。
//! 选择类题目按文档顺序给选项编上合成字母 A、B、C…，
//! 这个编号与选项匹配器的字母解码一一对应。

use crate::models::question::{QuestionDescriptor, QuestionKind};

/// 字母编号能覆盖的最大选项数
const MAX_LETTERED_OPTIONS: usize = 26;

/// 选项的字母编号：0 → A，1 → B … 25 → Z，越界不回绕
fn option_letter(index: usize) -> Option<char> {
    (index < MAX_LETTERED_OPTIONS).then(|| char::from(b'A' + index as u8))
}

/// 选项数超过 26 时整体放弃字母编号，改用纯文本作答指令，
/// 避免提示词里出现选项匹配器无法解码的回绕字母
fn lettered(question: &QuestionDescriptor) -> bool {
    question.options.len() <= MAX_LETTERED_OPTIONS
}

/// 构建一道题的提示词
///
/// `history` 非空时在末尾附加此前所有 (题干, 答案) 对，
/// 按插入顺序排列，引导模型保持前后回答一致
pub fn build(question: &QuestionDescriptor, history: &[(String, String)]) -> String {
    let mut prompt = format!("Answer this form question: {}\n", question.text);

    match question.kind {
        QuestionKind::FreeText => {
            prompt.push_str(
                "Provide a short answer of one to three sentences. \
                 Respond with the answer text only.\n",
            );
        }
        QuestionKind::SingleChoice | QuestionKind::Dropdown => {
            if lettered(question) {
                prompt.push_str(
                    "Choose exactly one of the following options. \
                     Answer with the option letter (e.g. \"B)\") or the option text.\n",
                );
            } else {
                prompt.push_str(
                    "Choose exactly one of the following options. \
                     Answer with the option text exactly as written.\n",
                );
            }
            push_options(&mut prompt, question);
        }
        QuestionKind::MultiChoice => {
            if lettered(question) {
                prompt.push_str(
                    "You may choose one or more of the following options. \
                     Answer with the option letters or texts, comma-separated.\n",
                );
            } else {
                prompt.push_str(
                    "You may choose one or more of the following options. \
                     Answer with the option texts, comma-separated.\n",
                );
            }
            push_options(&mut prompt, question);
        }
    }

    if !history.is_empty() {
        prompt.push_str("\nFor consistency, consider the answers already given:\n");
        for (q, a) in history {
            prompt.push_str(&format!("Q: {}\nA: {}\n", q, a));
        }
    }

    prompt
}

fn push_options(prompt: &mut String, question: &QuestionDescriptor) {
    prompt.push_str("Options:\n");
    let use_letters = lettered(question);
    for (i, opt) in question.options.iter().enumerate() {
        match option_letter(i).filter(|_| use_letters) {
            Some(letter) => prompt.push_str(&format!("{}) {}\n", letter, opt.label)),
            None => prompt.push_str(&format!("- {}\n", opt.label)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::ChoiceOption;

    fn choice_question(kind: QuestionKind, labels: &[&str]) -> QuestionDescriptor {
        QuestionDescriptor {
            container: "[data-fg-ref=\"1\"]".to_string(),
            text: "What is the capital of France?".to_string(),
            kind,
            target: None,
            options: labels
                .iter()
                .map(|l| ChoiceOption {
                    label: l.to_string(),
                    control: "[data-fg-ref=\"2\"]".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_free_text_prompt() {
        let q = QuestionDescriptor {
            container: "[data-fg-ref=\"1\"]".to_string(),
            text: "Describe your ideal weekend".to_string(),
            kind: QuestionKind::FreeText,
            target: Some("[data-fg-ref=\"2\"]".to_string()),
            options: Vec::new(),
        };
        let prompt = build(&q, &[]);
        assert!(prompt.contains("Describe your ideal weekend"));
        assert!(prompt.contains("short answer"));
        assert!(!prompt.contains("Options:"));
    }

    #[test]
    fn test_options_lettered_in_document_order() {
        let q = choice_question(QuestionKind::SingleChoice, &["Paris", "London", "Berlin"]);
        let prompt = build(&q, &[]);
        assert!(prompt.contains("A) Paris"));
        assert!(prompt.contains("B) London"));
        assert!(prompt.contains("C) Berlin"));
        assert!(prompt.contains("exactly one"));
    }

    #[test]
    fn test_multi_choice_instruction() {
        let q = choice_question(QuestionKind::MultiChoice, &["Reading", "Swimming"]);
        let prompt = build(&q, &[]);
        assert!(prompt.contains("one or more"));
        assert!(prompt.contains("comma-separated"));
        assert!(prompt.contains("A) Reading"));
    }

    #[test]
    fn test_dropdown_uses_single_choice_instruction() {
        let q = choice_question(QuestionKind::Dropdown, &["Red", "Green"]);
        let prompt = build(&q, &[]);
        assert!(prompt.contains("exactly one"));
        assert!(prompt.contains("B) Green"));
    }

    #[test]
    fn test_more_than_26_options_drop_letters_entirely() {
        // 第 27 个选项不能回绕到 A，否则字母对模型和匹配器含义不一致；
        // 超过 26 个选项时整体退化为纯文本作答
        let labels: Vec<String> = (1..=27).map(|i| format!("Option {}", i)).collect();
        let label_refs: Vec<&str> = labels.iter().map(|s| s.as_str()).collect();
        let q = choice_question(QuestionKind::SingleChoice, &label_refs);

        let prompt = build(&q, &[]);
        assert!(prompt.contains("- Option 1\n"));
        assert!(prompt.contains("- Option 27\n"));
        assert!(!prompt.contains("A) Option 1"));
        assert!(prompt.contains("option text exactly as written"));
        assert!(!prompt.contains("option letter"));
    }

    #[test]
    fn test_exactly_26_options_still_lettered() {
        let labels: Vec<String> = (1..=26).map(|i| format!("Option {}", i)).collect();
        let label_refs: Vec<&str> = labels.iter().map(|s| s.as_str()).collect();
        let q = choice_question(QuestionKind::SingleChoice, &label_refs);

        let prompt = build(&q, &[]);
        assert!(prompt.contains("A) Option 1"));
        assert!(prompt.contains("Z) Option 26"));
    }

    #[test]
    fn test_history_appended_in_insertion_order() {
        let q = choice_question(QuestionKind::SingleChoice, &["Yes", "No"]);
        let history = vec![
            ("First question".to_string(), "first answer".to_string()),
            ("Second question".to_string(), "second answer".to_string()),
        ];
        let prompt = build(&q, &history);

        let first = prompt.find("Q: First question").expect("缺少第一条历史");
        let second = prompt.find("Q: Second question").expect("缺少第二条历史");
        assert!(first < second);
        assert!(prompt.contains("A: first answer"));
    }

    #[test]
    fn test_no_history_block_when_empty() {
        let q = choice_question(QuestionKind::SingleChoice, &["Yes", "No"]);
        let prompt = build(&q, &[]);
        assert!(!prompt.contains("answers already given"));
    }
}
