//! 答案服务 - 业务能力层
//!
//! 只负责"把提示词变成答案文本"，不关心题目流程。
//! 服务端一类的失败短暂等待后重试一次，其余错误原样上抛。

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::FillError;

/// 表单作答的系统提示词
const SYSTEM_MESSAGE: &str = "You are a helpful assistant that provides concise, relevant \
    answers to form questions. Keep your answers brief and to the point. For multiple choice \
    questions, select the most appropriate option from the given choices.";

/// 答案服务
///
/// 职责：
/// - 调用 LLM API 取得单题答案
/// - 服务端错误重试一次
/// - 不出现 Vec<QuestionDescriptor>
/// - 不关心流程顺序
#[derive(Clone)]
pub struct AnswerService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl AnswerService {
    pub fn new(config: &Config, api_key: &str) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 发送提示词并返回修剪后的答案文本
    ///
    /// 服务端一类的失败等待一秒后恰好重试一次；
    /// 重试后仍失败的按最终错误返回，由调用方记为该题的失败结果
    pub async fn ask(&self, prompt: &str) -> Result<String, FillError> {
        match self.attempt(prompt).await {
            Ok(answer) => Ok(answer),
            Err(err) if is_server_error(&err) => {
                warn!("答案服务服务端错误，1 秒后重试: {}", err);
                sleep(Duration::from_secs(1)).await;
                self.attempt(prompt)
                    .await
                    .map_err(|e| FillError::AnswerService(e.to_string()))
            }
            Err(err) => Err(FillError::AnswerService(err.to_string())),
        }
    }

    async fn attempt(&self, prompt: &str) -> Result<String, OpenAIError> {
        debug!("调用答案服务，模型: {}", self.model_name);

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_MESSAGE)
            .build()?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(0.7)
            .max_tokens(150u32)
            .build()?;

        let response = self.client.chat().create(request).await?;
        debug!("答案服务调用成功");

        // 空回答不在这里报错，调用方会把它记为跳过
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }
}

/// 是否属于值得重试的服务端错误
fn is_server_error(err: &OpenAIError) -> bool {
    match err {
        OpenAIError::Reqwest(_) => true,
        OpenAIError::ApiError(api) => {
            api.r#type.as_deref() == Some("server_error")
                || api.message.contains("500")
                || api.message.contains("502")
                || api.message.contains("503")
        }
        _ => false,
    }
}

/// 清理模型答案里常见的包装符号（加粗、引号、反引号）
pub fn clean_answer(answer: &str) -> String {
    answer
        .trim()
        .trim_start_matches("**")
        .trim_end_matches("**")
        .trim_matches('`')
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
        .to_string()
}
