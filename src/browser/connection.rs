use anyhow::Result;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// 连接到已开启调试端口的浏览器并定位表单页面
///
/// 优先复用已经打开了目标表单的标签页，找不到时再新建页面并导航过去
pub async fn connect_to_browser_and_page(
    port: u16,
    target_url: Option<&str>,
) -> Result<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        e
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 短暂延迟，等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    debug!("获取到 {} 个页面", pages.len());

    // 查找已经打开了目标表单的标签页
    if let Some(url_fragment) = target_url {
        for p in pages.iter() {
            if let Ok(Some(page_url)) = p.url().await {
                debug!("检查页面: {}", page_url);
                if page_url.contains(url_fragment) || url_fragment.contains(&page_url) {
                    info!("✓ 找到目标表单页面: {}", page_url);
                    return Ok((browser, p.clone()));
                }
            }
        }
        debug!("没有打开目标表单的标签页，将创建新页面");
    }

    // 新建页面并导航
    let new_page = if let Some(url) = target_url {
        let page = browser.new_page("about:blank").await.map_err(|e| {
            error!("创建新页面失败: {}", e);
            e
        })?;
        page.goto(url).await.map_err(|e| {
            error!("导航到 {} 失败: {}", url, e);
            e
        })?;
        info!("已导航到: {}", url);
        page
    } else {
        browser.new_page("about:blank").await.map_err(|e| {
            error!("创建空白页面失败: {}", e);
            e
        })?
    };

    Ok((browser, new_page))
}
