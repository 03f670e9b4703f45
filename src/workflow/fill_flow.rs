//! 单题作答流程 - 流程层
//!
//! 流程顺序：构建提示词 → 请求答案服务 → 解析目标控件 → 写入并派发事件。
//! 单题的任何失败都被限制在该题边界内，记录为该题的结果，不中断会话。

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::error::FillError;
use crate::infrastructure::JsExecutor;
use crate::models::question::{QuestionDescriptor, QuestionKind};
use crate::models::session::FillOutcome;
use crate::services::answer_service::{clean_answer, AnswerService};
use crate::services::form_writer::FormWriter;
use crate::services::{option_matcher, prompt_builder};
use crate::utils::logging::truncate_text;
use crate::workflow::fill_ctx::FillCtx;

/// 写入阶段的结果
enum WriteResult {
    /// 答案已写入页面
    Written,
    /// 选择题没有任何选项
    NoOptions,
    /// 找不到可写入的控件
    NoControl,
}

/// 单题作答流程
///
/// - 编排单题的完整处理
/// - 不持有任何资源（page）
/// - 只依赖业务能力（services）
pub struct FillFlow {
    answer_service: AnswerService,
    form_writer: FormWriter,
}

impl FillFlow {
    pub fn new(answer_service: AnswerService) -> Self {
        Self {
            answer_service,
            form_writer: FormWriter::new(),
        }
    }

    /// 作答一道题
    ///
    /// `history` 是派发时刻的答案快照。
    /// 返回 (最终结果, 被接受的答案文本)；答案文本只在已作答时存在，
    /// 由调用方追加进答案记录
    pub async fn run(
        &self,
        executor: &JsExecutor,
        question: &QuestionDescriptor,
        ctx: &FillCtx,
        history: &[(String, String)],
    ) -> Result<(FillOutcome, Option<String>)> {
        info!("{} 题干: {}", ctx, truncate_text(&question.text, 80));

        let prompt = prompt_builder::build(question, history);
        debug!("{} 提示词长度: {} 字符", ctx, prompt.len());

        let answer = match self.answer_service.ask(&prompt).await {
            Ok(answer) => answer,
            Err(err) => {
                warn!("{} ⚠️ 答案服务失败: {}", ctx, err);
                return Ok((FillOutcome::Failed(err.to_string()), None));
            }
        };

        if answer.is_empty() {
            warn!("{} 模型返回空答案，跳过", ctx);
            return Ok((FillOutcome::Skipped, None));
        }

        let cleaned = clean_answer(&answer);
        debug!("{} 模型答案: {}", ctx, cleaned);

        match self.write_answer(executor, question, &cleaned).await? {
            WriteResult::Written => {
                info!("{} ✓ 已写入答案", ctx);
                Ok((FillOutcome::Answered, Some(cleaned)))
            }
            WriteResult::NoOptions => {
                warn!("{} 选择题没有任何选项，跳过", ctx);
                Ok((FillOutcome::Skipped, None))
            }
            WriteResult::NoControl => {
                let err = FillError::NoMatchingControl(question.text.clone());
                warn!("{} ⚠️ {}", ctx, err);
                Ok((FillOutcome::Failed(err.to_string()), None))
            }
        }
    }

    /// 解析目标控件并写入答案
    ///
    /// FreeText / Dropdown 用提取阶段记下的目标控件；
    /// 选择类题目在这里按答案逐选项解析
    async fn write_answer(
        &self,
        executor: &JsExecutor,
        question: &QuestionDescriptor,
        answer: &str,
    ) -> Result<WriteResult> {
        match question.kind {
            QuestionKind::FreeText => {
                let Some(target) = question.target.as_deref() else {
                    return Ok(WriteResult::NoControl);
                };
                if self.form_writer.write_text(executor, target, answer).await? {
                    Ok(WriteResult::Written)
                } else {
                    Ok(WriteResult::NoControl)
                }
            }
            QuestionKind::Dropdown => {
                if question.options.is_empty() {
                    return Ok(WriteResult::NoOptions);
                }
                let Some(target) = question.target.as_deref() else {
                    return Ok(WriteResult::NoControl);
                };
                let Some(index) = option_matcher::match_one(&question.options, answer) else {
                    return Ok(WriteResult::NoControl);
                };
                if self
                    .form_writer
                    .select_option(executor, target, index)
                    .await?
                {
                    Ok(WriteResult::Written)
                } else {
                    Ok(WriteResult::NoControl)
                }
            }
            QuestionKind::SingleChoice => {
                if question.options.is_empty() {
                    return Ok(WriteResult::NoOptions);
                }
                let Some(index) = option_matcher::match_one(&question.options, answer) else {
                    return Ok(WriteResult::NoControl);
                };
                if self
                    .form_writer
                    .check_control(executor, &question.options[index].control)
                    .await?
                {
                    Ok(WriteResult::Written)
                } else {
                    Ok(WriteResult::NoControl)
                }
            }
            QuestionKind::MultiChoice => {
                if question.options.is_empty() {
                    return Ok(WriteResult::NoOptions);
                }
                let picked = option_matcher::match_many(&question.options, answer);
                let mut any_written = false;
                for index in picked {
                    if self
                        .form_writer
                        .check_control(executor, &question.options[index].control)
                        .await?
                    {
                        any_written = true;
                    }
                }
                if any_written {
                    Ok(WriteResult::Written)
                } else {
                    Ok(WriteResult::NoControl)
                }
            }
        }
    }
}
