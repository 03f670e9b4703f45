//! 填表会话运行器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次填表会话的编排和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、连接（或启动）浏览器、创建 JsExecutor
//! 2. **凭据解析**：环境配置优先，其次凭据文件，都没有则拒绝开始会话
//! 3. **题目提取**：委托 QuestionExtractor 扫描页面
//! 4. **并发控制**：使用 Semaphore 限制同时作答的题目数量
//! 5. **分批作答**：题目分批处理，每批派发时共享同一份答案快照
//! 6. **资源管理**：持有 Browser 和 JsExecutor，确保生命周期正确
//! 7. **会话统计**：汇总每题结果并输出最终报告
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单道题目的细节
//! - **资源所有者**：唯一持有 Browser 的模块
//! - **单题隔离**：任务失败只记为该题的失败结果，不中断会话
//! - **向下委托**：委托 workflow::FillFlow 作答单道题目

use std::fs;
use std::sync::Arc;

use anyhow::Result;
use chromiumoxide::Browser;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::FillError;
use crate::infrastructure::JsExecutor;
use crate::models::session::{FillOutcome, FillSession, SessionStats};
use crate::services::credential_store::{CredentialStore, API_KEY_NAME};
use crate::services::{AnswerService, QuestionExtractor};
use crate::workflow::{FillCtx, FillFlow};

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    executor: JsExecutor,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        // 连接或启动浏览器
        let (browser, page) = if config.headless {
            browser::launch_headless_browser(&config.target_url).await?
        } else {
            browser::connect_to_browser_and_page(
                config.browser_debug_port,
                Some(&config.target_url),
            )
            .await?
        };

        // 创建 JsExecutor（持有 page）
        let executor = JsExecutor::new(page);

        Ok(Self {
            config,
            _browser: browser,
            executor,
        })
    }

    /// 运行一次填表会话
    pub async fn run(&self) -> Result<SessionStats> {
        let api_key = self.resolve_api_key()?;
        let answer_service = AnswerService::new(&self.config, &api_key);

        // 提取页面上的题目
        let extractor = QuestionExtractor::new();
        let questions = extractor.extract(&self.executor).await?;

        if questions.is_empty() {
            // 任何写入发生前就结束会话
            return Err(FillError::NoQuestionsFound.into());
        }

        let total = questions.len();
        log_questions_found(total, self.config.max_concurrent_questions);

        let mut session = FillSession::new(questions);
        self.fill_all(&mut session, answer_service).await?;

        let stats = session.stats();
        print_final_stats(&stats, &session, &self.config);

        Ok(stats)
    }

    /// 解析答案服务凭据：环境配置优先，其次凭据文件
    fn resolve_api_key(&self) -> Result<String> {
        if !self.config.llm_api_key.is_empty() {
            return Ok(self.config.llm_api_key.clone());
        }

        let store = CredentialStore::new(&self.config.credentials_file);
        match store.get(API_KEY_NAME)? {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(FillError::MissingCredential(API_KEY_NAME.to_string()).into()),
        }
    }

    /// 分批作答所有题目
    ///
    /// 同一批的题目在派发时共享同一份答案快照；
    /// 已接受的答案在每批结束后统一写回会话，供下一批使用
    async fn fill_all(&self, session: &mut FillSession, answer_service: AnswerService) -> Result<()> {
        let batch_size = self.config.max_concurrent_questions.max(1);
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let flow = Arc::new(FillFlow::new(answer_service));
        let total = session.questions().len();

        for batch_start in (0..total).step_by(batch_size) {
            let batch_end = (batch_start + batch_size).min(total);
            let batch_num = (batch_start / batch_size) + 1;
            let total_batches = (total + batch_size - 1) / batch_size;

            log_batch_start(batch_num, total_batches, batch_start + 1, batch_end, total);

            // 本批所有题目共享派发时刻的同一份快照
            let history = Arc::new(session.answers().snapshot());
            let mut batch_handles = Vec::new();

            for index in batch_start..batch_end {
                let permit = semaphore.clone().acquire_owned().await?;

                // JsExecutor 持有 page，但 page 可以安全地 clone
                // 因为 chromiumoxide 的 Page 内部使用 Arc
                let executor = JsExecutor::new(self.executor.page().clone());
                let question = session.questions()[index].clone();
                let ctx = FillCtx::new(index + 1, total);
                let flow = flow.clone();
                let history = history.clone();

                let handle = tokio::spawn(async move {
                    let _permit = permit;
                    flow.run(&executor, &question, &ctx, &history).await
                });
                batch_handles.push((index, handle));
            }

            // 等待本批所有任务完成并写回结果
            for (index, handle) in batch_handles {
                match handle.await {
                    Ok(Ok((FillOutcome::Answered, Some(answer)))) => {
                        session.record_answer(index, &answer);
                    }
                    Ok(Ok((outcome, _))) => {
                        session.set_outcome(index, outcome);
                    }
                    Ok(Err(e)) => {
                        error!("[题目 {}] ❌ 作答过程中发生错误: {}", index + 1, e);
                        session.set_outcome(index, FillOutcome::Failed(e.to_string()));
                    }
                    Err(e) => {
                        error!("[题目 {}] 任务执行失败: {}", index + 1, e);
                        session.set_outcome(index, FillOutcome::Failed(e.to_string()));
                    }
                }
            }

            log_batch_complete(batch_num, session);
        }

        Ok(())
    }
}

// ========== 日志辅助函数 ==========

fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n填表日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 自动填表模式");
    info!("📊 最大并发数: {}", config.max_concurrent_questions);
    info!("🌐 目标表单: {}", config.target_url);
    info!("{}", "=".repeat(60));
}

fn log_questions_found(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 道待作答的题目", total);
    info!("📋 将以每批 {} 道的方式作答", max_concurrent);
    info!("💡 每批完成后再开始下一批\n");
}

fn log_batch_start(batch_num: usize, total_batches: usize, start: usize, end: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始作答第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批题目: {}-{} / 共 {} 道", start, end, total);
    info!("{}", "=".repeat(60));
}

fn log_batch_complete(batch_num: usize, session: &FillSession) {
    let stats = session.stats();
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 第 {} 批完成: 已作答 {} / 跳过 {} / 失败 {}",
        batch_num, stats.answered, stats.skipped, stats.failed
    );
    info!("{}", "─".repeat(60));
}

fn print_final_stats(stats: &SessionStats, session: &FillSession, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 填表会话完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已作答: {}/{}", stats.answered, stats.total());
    info!("⏭️ 跳过: {}", stats.skipped);
    info!("❌ 失败: {}", stats.failed);

    let failures = session.failures();
    if !failures.is_empty() {
        warn!("失败题目明细:");
        for (index, reason) in failures {
            warn!("  [题目 {}] {}", index + 1, reason);
        }
    }

    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", config.output_log_file);
}
