use form_genie::browser::connect_to_browser_and_page;
use form_genie::config::Config;
use form_genie::infrastructure::JsExecutor;
use form_genie::services::QuestionExtractor;
use form_genie::App;

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_browser_connection() {
    // 初始化日志
    let _ = tracing_subscriber::fmt::try_init();

    // 加载配置
    let config = Config::from_env();

    // 测试浏览器连接
    let result = connect_to_browser_and_page(config.browser_debug_port, Some(&config.target_url)).await;

    assert!(result.is_ok(), "应该能够成功连接浏览器");
}

#[tokio::test]
#[ignore]
async fn test_extract_questions_from_open_form() {
    // 初始化日志
    let _ = tracing_subscriber::fmt::try_init();

    // 加载配置
    let config = Config::from_env();

    // 连接浏览器（需要已打开目标表单的标签页）
    let (_browser, page) =
        connect_to_browser_and_page(config.browser_debug_port, Some(&config.target_url))
            .await
            .expect("连接浏览器失败");

    let executor = JsExecutor::new(page);
    let extractor = QuestionExtractor::new();

    let questions = extractor.extract(&executor).await.expect("提取题目失败");
    println!("找到 {} 道题目", questions.len());

    for q in &questions {
        println!("  [{:?}] {}", q.kind, q.text);
        // 选择类题目应当带有选项
        if q.kind.is_choice() {
            assert!(!q.options.is_empty(), "选择题应该有选项: {}", q.text);
        }
    }
}

#[tokio::test]
#[ignore]
async fn test_full_fill_session() {
    // 初始化日志
    let _ = tracing_subscriber::fmt::try_init();

    // 加载配置（需要配置好凭据和目标表单）
    let config = Config::from_env();

    let stats = App::initialize(config)
        .await
        .expect("初始化应用失败")
        .run()
        .await
        .expect("填表会话失败");

    println!(
        "已作答 {} / 跳过 {} / 失败 {}",
        stats.answered, stats.skipped, stats.failed
    );
    assert!(stats.total() > 0, "会话应该至少处理一道题");
}
