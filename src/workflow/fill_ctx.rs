//! 作答上下文
//!
//! 封装"我正在作答第几题"这一信息

use std::fmt::Display;

/// 单题作答上下文
#[derive(Debug, Clone)]
pub struct FillCtx {
    /// 题目索引（从 1 开始，仅用于日志显示）
    pub question_index: usize,
    /// 会话中的题目总数
    pub total: usize,
}

impl FillCtx {
    pub fn new(question_index: usize, total: usize) -> Self {
        Self {
            question_index,
            total,
        }
    }
}

impl Display for FillCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[题目 {}/{}]", self.question_index, self.total)
    }
}
