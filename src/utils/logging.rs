//! 日志工具模块

use tracing_subscriber::EnvFilter;

/// 初始化全局日志订阅器
///
/// 环境变量 RUST_LOG 优先；未设置时按 verbose 开关回退
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_short_unchanged() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
    }

    #[test]
    fn test_truncate_text_long_gets_ellipsis() {
        assert_eq!(truncate_text("abcdefgh", 5), "abcde...");
    }
}
