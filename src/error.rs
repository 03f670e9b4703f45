//! 应用错误类型
//!
//! 题目级错误被限制在单题边界内，记录为该题的失败结果；
//! 只有会话级前置条件（无凭据、无题目）会在任何写入发生前中止会话

use thiserror::Error;

/// 填表错误
#[derive(Debug, Error)]
pub enum FillError {
    /// 四个提取策略都没有产生候选题目，会话立即结束，不写入任何内容
    #[error("页面上没有找到可作答的题目")]
    NoQuestionsFound,

    /// 会话开始前检查到凭据缺失，会话不会开始
    #[error("缺少答案服务凭据，请在凭据文件中配置 {0}")]
    MissingCredential(String),

    /// 答案服务最终失败（内部已含一次服务端重试），只影响本题
    #[error("答案服务调用失败: {0}")]
    AnswerService(String),

    /// 目标控件解析后仍找不到可写入的控件，只影响本题
    #[error("未找到可写入的控件: {0}")]
    NoMatchingControl(String),
}
