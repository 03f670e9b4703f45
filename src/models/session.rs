//! 填表会话模型
//!
//! 一次"填表"调用的单位：持有会话开始时发现的题目列表、答案记录和每题结果。
//! 会话内的状态不跨会话存活。

use crate::models::question::QuestionDescriptor;

/// 已接受答案的记录，按插入顺序保存 (题干, 答案)
///
/// 供提示词构建器给后续题目提供上下文；生命周期与一次会话一致，
/// 会话结束即丢弃
#[derive(Debug, Default, Clone)]
pub struct AnswerRecord {
    entries: Vec<(String, String)>,
}

impl AnswerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条已接受的答案
    pub fn push(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.entries.push((question.into(), answer.into()));
    }

    /// 派发时刻的历史快照
    ///
    /// 快照是独立副本：之后对记录的追加不会出现在已取走的快照里
    pub fn snapshot(&self) -> Vec<(String, String)> {
        self.entries.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// 单题的最终结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOutcome {
    /// 已写入答案
    Answered,
    /// 跳过（空答案或选择题没有选项）
    Skipped,
    /// 失败（原因），只影响本题
    Failed(String),
}

/// 会话统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub answered: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl SessionStats {
    pub fn total(&self) -> usize {
        self.answered + self.skipped + self.failed
    }
}

/// 一次填表会话
///
/// 每道题都有了最终结果即视为会话结束；单题失败不影响会话整体完成
pub struct FillSession {
    questions: Vec<QuestionDescriptor>,
    answers: AnswerRecord,
    outcomes: Vec<Option<FillOutcome>>,
}

impl FillSession {
    /// 用会话开始时发现的题目列表创建
    pub fn new(questions: Vec<QuestionDescriptor>) -> Self {
        let outcomes = vec![None; questions.len()];
        Self {
            questions,
            answers: AnswerRecord::new(),
            outcomes,
        }
    }

    pub fn questions(&self) -> &[QuestionDescriptor] {
        &self.questions
    }

    pub fn answers(&self) -> &AnswerRecord {
        &self.answers
    }

    /// 记录某题的答案：写入历史并标记为已作答
    pub fn record_answer(&mut self, index: usize, answer: &str) {
        if let Some(q) = self.questions.get(index) {
            self.answers.push(q.text.clone(), answer);
        }
        self.set_outcome(index, FillOutcome::Answered);
    }

    /// 记录某题的最终结果
    pub fn set_outcome(&mut self, index: usize, outcome: FillOutcome) {
        if let Some(slot) = self.outcomes.get_mut(index) {
            *slot = Some(outcome);
        }
    }

    /// 所有题目是否都有了最终结果
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|o| o.is_some())
    }

    /// 汇总统计
    pub fn stats(&self) -> SessionStats {
        let mut stats = SessionStats::default();
        for outcome in self.outcomes.iter().flatten() {
            match outcome {
                FillOutcome::Answered => stats.answered += 1,
                FillOutcome::Skipped => stats.skipped += 1,
                FillOutcome::Failed(_) => stats.failed += 1,
            }
        }
        stats
    }

    /// 失败题目的 (索引, 原因) 列表，用于最终报告
    pub fn failures(&self) -> Vec<(usize, &str)> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(i, o)| match o {
                Some(FillOutcome::Failed(reason)) => Some((i, reason.as_str())),
                _ => None,
            })
            .collect()
    }
}
