//! 编排层
//!
//! 持有稀缺资源（Browser），管理会话级流程和并发

pub mod session_runner;

pub use session_runner::App;
