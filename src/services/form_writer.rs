//! 表单写入 - 业务能力层
//!
//! 把答案写回页面控件，并派发宿主页面期望的 input / change 事件。
//! 所有写入都按提取阶段打好的 `data-fg-ref` 选择器寻址。

use anyhow::Result;
use tracing::debug;

use crate::infrastructure::JsExecutor;

/// 表单写入器
///
/// 职责：
/// - 写文本、勾选控件、选下拉项
/// - 每次写入后派发对应事件
/// - 不认识 QuestionDescriptor，只认选择器
pub struct FormWriter;

impl FormWriter {
    pub fn new() -> Self {
        Self
    }

    /// 向文本控件写入答案并派发 input 事件
    ///
    /// 返回是否找到了控件
    pub async fn write_text(
        &self,
        executor: &JsExecutor,
        selector: &str,
        value: &str,
    ) -> Result<bool> {
        debug!("写入文本控件: {}", selector);
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({selector});
                if (!el) return false;
                el.value = {value};
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                return true;
            }})()"#,
            selector = serde_json::to_string(selector)?,
            value = serde_json::to_string(value)?,
        );
        let found: bool = executor.eval_as(js).await?;
        Ok(found)
    }

    /// 勾选单个 radio / checkbox 并派发 change 事件
    pub async fn check_control(&self, executor: &JsExecutor, selector: &str) -> Result<bool> {
        debug!("勾选控件: {}", selector);
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({selector});
                if (!el) return false;
                el.checked = true;
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            selector = serde_json::to_string(selector)?,
        );
        let found: bool = executor.eval_as(js).await?;
        Ok(found)
    }

    /// 按索引选中下拉框选项并派发 change 事件
    pub async fn select_option(
        &self,
        executor: &JsExecutor,
        select_selector: &str,
        option_index: usize,
    ) -> Result<bool> {
        debug!("选中下拉项: {} -> {}", select_selector, option_index);
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({selector});
                if (!el || !el.options || el.options.length <= {index}) return false;
                el.selectedIndex = {index};
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            selector = serde_json::to_string(select_selector)?,
            index = option_index,
        );
        let found: bool = executor.eval_as(js).await?;
        Ok(found)
    }
}

impl Default for FormWriter {
    fn default() -> Self {
        Self::new()
    }
}
