//! # Form Genie
//!
//! 一个用于自动填写网页表单的 Rust 应用程序：
//! 提取页面题目，调用 LLM 生成答案，再把答案写回表单控件
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() 能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单道题目
//! - `QuestionExtractor` - 四策略题目提取能力
//! - `AnswerService` - LLM 作答能力
//! - `FormWriter` - 表单写入能力
//! - `option_matcher` / `prompt_builder` - 纯函数能力
//! - `CredentialStore` - 凭据读写能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"的完整作答流程
//! - `FillCtx` - 上下文封装（题目索引 + 总数）
//! - `FillFlow` - 流程编排（prompt → LLM → match → write）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/session_runner` - 填表会话运行器，管理资源和并发

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{connect_to_browser_and_page, launch_headless_browser};
pub use config::Config;
pub use error::FillError;
pub use infrastructure::JsExecutor;
pub use models::question::{QuestionDescriptor, QuestionKind};
pub use models::session::{AnswerRecord, FillOutcome, FillSession, SessionStats};
pub use orchestrator::App;
pub use workflow::{FillCtx, FillFlow};
