/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时作答的题目数量
    pub max_concurrent_questions: usize,
    /// 浏览器调试端口（连接已打开的浏览器时使用）
    pub browser_debug_port: u16,
    /// 是否启动无头浏览器（否则连接调试端口）
    pub headless: bool,
    /// 目标表单 URL
    pub target_url: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 凭据文件路径
    pub credentials_file: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_questions: 4,
            browser_debug_port: 9222,
            headless: false,
            target_url: "https://docs.google.com/forms/".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            credentials_file: "credentials.toml".to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-3.5-turbo".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_questions: std::env::var("MAX_CONCURRENT_QUESTIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_questions),
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.browser_debug_port),
            headless: std::env::var("HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            target_url: std::env::var("TARGET_URL").unwrap_or(default.target_url),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            credentials_file: std::env::var("CREDENTIALS_FILE").unwrap_or(default.credentials_file),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
        }
    }
}
