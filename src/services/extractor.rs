//! 题目提取 - 业务能力层
//!
//! 通过四个特异性递减的策略在页面上寻找候选题目，
//! 命中即止（严格瀑布，不做合并）。
//! 目标页面的结构标记会随版本变化，提取器从精确匹配逐级退化到启发式，
//! 而不是直接失败。
//!
//! 探测脚本在页面里给发现的容器和控件打上 `data-fg-ref` 标记，
//! 返回的描述里只携带选择器字符串，后续写入按选择器寻址。

use std::collections::HashSet;
use std::future::Future;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::infrastructure::JsExecutor;
use crate::models::question::{
    is_personal, ChoiceOption, QuestionDescriptor, QuestionKind, RawQuestion,
};

/// 所有探测脚本共享的前导：元素标记 + 单个容器的描述
const PROBE_HELPER: &str = r#"
const mark = (el) => {
    if (!el.dataset.fgRef) {
        window.__fgSeq = (window.__fgSeq || 0) + 1;
        el.dataset.fgRef = String(window.__fgSeq);
    }
    return '[data-fg-ref="' + el.dataset.fgRef + '"]';
};
const describe = (item, text) => {
    let kind = 'text';
    if (item.querySelector("input[type='radio']")) kind = 'radio';
    else if (item.querySelector("input[type='checkbox']")) kind = 'checkbox';
    else if (item.querySelector('select')) kind = 'select';

    let target = null;
    const options = [];
    if (kind === 'select') {
        const select = item.querySelector('select');
        target = mark(select);
        select.querySelectorAll('option').forEach((opt) => {
            options.push({ label: (opt.textContent || '').trim(), control: mark(opt) });
        });
    } else if (kind === 'text') {
        const input = item.querySelector("textarea, input[type='text'], input:not([type])");
        if (input) target = mark(input);
    } else {
        const selector = kind === 'radio' ? "input[type='radio']" : "input[type='checkbox']";
        item.querySelectorAll('label').forEach((labelEl) => {
            const control = labelEl.querySelector(selector);
            if (!control) return;
            options.push({ label: (labelEl.textContent || '').trim(), control: mark(control) });
        });
        if (options.length === 0) {
            item.querySelectorAll(selector).forEach((control) => {
                options.push({ label: (control.value || '').trim(), control: mark(control) });
            });
        }
    }
    return { container: mark(item), text: text, kind: kind, target: target, options: options };
};
"#;

/// 策略 1：页面当前版本的标准题目容器，带专用标题字段
const STRATEGY_CANONICAL: &str = r#"
const items = [];
document.querySelectorAll('div[role="listitem"]').forEach((item) => {
    const title = item.querySelector('.M7eMe');
    if (!title) return;
    items.push(describe(item, (title.textContent || '').trim()));
});
"#;

/// 策略 2：旧版页面布局的容器和标题类名
const STRATEGY_LEGACY: &str = r#"
const items = [];
document.querySelectorAll('.freebirdFormviewerViewItemsItemItem').forEach((item) => {
    const title = item.querySelector('.freebirdFormviewerViewItemsItemItemTitle, [role="heading"]');
    if (!title) return;
    items.push(describe(item, (title.textContent || '').trim()));
});
"#;

/// 策略 3：任意列表项；标题元素 → 短文本叶子 → 合成占位标题
const STRATEGY_LIST_ITEM: &str = r#"
const items = [];
const shortTextLeaf = (item) => {
    for (const node of item.querySelectorAll('*')) {
        if (node.children.length >= 3) continue;
        if (node.querySelector('input, textarea, select')) continue;
        const text = (node.textContent || '').trim();
        if (text.length > 0 && text.length < 200) return text;
    }
    return '';
};
document.querySelectorAll('div[role="listitem"], li').forEach((item, index) => {
    if (!item.querySelector('input, textarea, select')) return;
    const heading = item.querySelector('[role="heading"], h1, h2, h3, h4');
    let text = heading ? (heading.textContent || '').trim() : '';
    if (!text) text = shortTextLeaf(item);
    if (!text) text = 'Question ' + (index + 1);
    items.push(describe(item, text));
});
"#;

/// 策略 4：全局兜底，从每个控件向上找最近的容器和最长的文本兄弟
const STRATEGY_GLOBAL: &str = r#"
const items = [];
const questionTextFor = (control) => {
    let node = control.parentElement;
    for (let depth = 0; node && depth < 4; depth += 1) {
        let best = '';
        for (const sibling of node.children) {
            if (sibling.querySelector && sibling.querySelector('input, textarea, select')) continue;
            const text = (sibling.textContent || '').trim();
            if (text.length > 10 && text.length > best.length) best = text;
        }
        if (best) return best;
        node = node.parentElement;
    }
    return '';
};
document.querySelectorAll('input, textarea, select').forEach((control) => {
    const type = (control.getAttribute('type') || '').toLowerCase();
    if (type === 'hidden' || type === 'submit' || type === 'button') return;
    const text = questionTextFor(control);
    if (!text) return;
    const item = control.closest('div, fieldset, li') || control.parentElement;
    if (!item) return;
    items.push(describe(item, text));
});
"#;

/// (策略名, 探测脚本) 的固定优先级列表
const STRATEGIES: &[(&str, &str)] = &[
    ("canonical", STRATEGY_CANONICAL),
    ("legacy", STRATEGY_LEGACY),
    ("list-item", STRATEGY_LIST_ITEM),
    ("global", STRATEGY_GLOBAL),
];

/// 题目提取器
///
/// 职责：
/// - 在页面上运行探测脚本，发现候选题目
/// - 过滤隐私题目、空题干，按题干去重
/// - 不关心作答流程
pub struct QuestionExtractor;

impl QuestionExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 按优先级依次运行各策略，返回第一个产生结果的策略的题目列表
    ///
    /// 前一个策略产生了 ≥1 道题目时，后面的策略不会执行
    pub async fn extract(&self, executor: &JsExecutor) -> Result<Vec<QuestionDescriptor>> {
        self.extract_via(|js| executor.eval_as::<Vec<RawQuestion>>(js))
            .await
    }

    /// 瀑布主体：探测脚本的执行方式由调用方注入
    ///
    /// 严格命中即止，后面的探测脚本根本不会被执行
    async fn extract_via<F, Fut>(&self, mut run_probe: F) -> Result<Vec<QuestionDescriptor>>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<Vec<RawQuestion>>>,
    {
        let mut seen = HashSet::new();

        for (name, body) in STRATEGIES {
            let raw = run_probe(compose_probe(body)).await?;
            debug!("策略 {} 命中 {} 个候选", name, raw.len());

            let questions = refine(raw, &mut seen);
            if !questions.is_empty() {
                info!("✓ 策略 {} 提取到 {} 道题目", name, questions.len());
                return Ok(questions);
            }
        }

        warn!("⚠️ 四个提取策略均未找到题目");
        Ok(Vec::new())
    }
}

impl Default for QuestionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// 把策略主体包进带共享前导的立即执行表达式
fn compose_probe(body: &str) -> String {
    format!("(() => {{\n{PROBE_HELPER}\n{body}\nreturn items;\n}})()")
}

/// 精炼原始候选：丢弃空题干和隐私题目，按题干去重
///
/// `seen` 跨策略累积，已收集过的题干不再重复产出
fn refine(raw: Vec<RawQuestion>, seen: &mut HashSet<String>) -> Vec<QuestionDescriptor> {
    let mut questions = Vec::new();

    for item in raw {
        let text = item.text.trim().to_string();
        if text.is_empty() {
            continue;
        }
        if is_personal(&text) {
            debug!("跳过隐私题目: {}", text);
            continue;
        }
        if !seen.insert(text.to_lowercase()) {
            continue;
        }

        questions.push(QuestionDescriptor {
            container: item.container,
            text,
            kind: QuestionKind::from_raw(&item.kind),
            target: item.target,
            options: item
                .options
                .into_iter()
                .map(|o| ChoiceOption {
                    label: o.label.trim().to_string(),
                    control: o.control,
                })
                .collect(),
        });
    }

    questions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str, kind: &str) -> RawQuestion {
        RawQuestion {
            container: "[data-fg-ref=\"1\"]".to_string(),
            text: text.to_string(),
            kind: kind.to_string(),
            target: Some("[data-fg-ref=\"2\"]".to_string()),
            options: Vec::new(),
        }
    }

    #[test]
    fn test_refine_excludes_skip_keywords() {
        let mut seen = HashSet::new();
        let questions = refine(
            vec![
                raw("What is your Name?", "text"),
                raw("Your Email address", "text"),
                raw("Favorite color?", "text"),
                raw("Contact phone", "text"),
            ],
            &mut seen,
        );

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].text, "Favorite color?");
    }

    #[test]
    fn test_refine_drops_empty_text() {
        let mut seen = HashSet::new();
        let questions = refine(vec![raw("", "text"), raw("   ", "text")], &mut seen);
        assert!(questions.is_empty());
    }

    #[test]
    fn test_refine_dedups_by_text() {
        // 兜底策略里多个控件共享容器时会产出重复题干，只保留第一个
        let mut seen = HashSet::new();
        let questions = refine(
            vec![
                raw("Favorite color?", "text"),
                raw("favorite color?", "radio"),
                raw("Favorite food?", "text"),
            ],
            &mut seen,
        );

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].kind, QuestionKind::FreeText);
    }

    #[test]
    fn test_refine_dedup_spans_strategies() {
        let mut seen = HashSet::new();
        let first = refine(vec![raw("Favorite color?", "text")], &mut seen);
        assert_eq!(first.len(), 1);

        let second = refine(vec![raw("Favorite color?", "text")], &mut seen);
        assert!(second.is_empty());
    }

    #[test]
    fn test_refine_maps_kind_and_trims_labels() {
        let mut seen = HashSet::new();
        let mut item = raw("Pick one", "radio");
        item.options = vec![ChoiceOption {
            label: "  Paris \n".to_string(),
            control: "[data-fg-ref=\"3\"]".to_string(),
        }];

        let questions = refine(vec![item], &mut seen);
        assert_eq!(questions[0].kind, QuestionKind::SingleChoice);
        assert_eq!(questions[0].options[0].label, "Paris");
    }

    #[tokio::test]
    async fn test_waterfall_short_circuits_on_first_hit() {
        let calls = std::cell::Cell::new(0usize);
        let extractor = QuestionExtractor::new();

        let questions = extractor
            .extract_via(|_js| {
                calls.set(calls.get() + 1);
                std::future::ready(Ok(vec![raw("Favorite color?", "text")]))
            })
            .await
            .unwrap();

        assert_eq!(questions.len(), 1);
        // 第一个策略命中后，后面的策略根本不执行
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_waterfall_falls_through_empty_strategies() {
        let calls = std::cell::Cell::new(0usize);
        let extractor = QuestionExtractor::new();

        // 前两个策略空手而归，第三个命中
        let questions = extractor
            .extract_via(|_js| {
                calls.set(calls.get() + 1);
                let batch = if calls.get() == 3 {
                    vec![raw("Favorite color?", "text")]
                } else {
                    Vec::new()
                };
                std::future::ready(Ok(batch))
            })
            .await
            .unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].text, "Favorite color?");
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_waterfall_treats_filtered_out_batch_as_miss() {
        let calls = std::cell::Cell::new(0usize);
        let extractor = QuestionExtractor::new();

        // 策略 1 只找到隐私题目，精炼后为空，应继续向下退化
        let questions = extractor
            .extract_via(|_js| {
                calls.set(calls.get() + 1);
                let batch = if calls.get() == 1 {
                    vec![raw("Your Email address", "text")]
                } else {
                    vec![raw("Favorite color?", "text")]
                };
                std::future::ready(Ok(batch))
            })
            .await
            .unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].text, "Favorite color?");
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_waterfall_exhausts_all_strategies() {
        let calls = std::cell::Cell::new(0usize);
        let extractor = QuestionExtractor::new();

        let questions = extractor
            .extract_via(|_js| {
                calls.set(calls.get() + 1);
                std::future::ready(Ok(Vec::new()))
            })
            .await
            .unwrap();

        assert!(questions.is_empty());
        assert_eq!(calls.get(), STRATEGIES.len());
    }

    #[test]
    fn test_probe_scripts_are_well_formed() {
        // 每个策略都要能包成合法的立即执行表达式
        for (name, body) in STRATEGIES {
            let js = compose_probe(body);
            assert!(js.starts_with("(() => {"), "策略 {} 前导缺失", name);
            assert!(js.contains("return items;"), "策略 {} 没有返回 items", name);
            assert!(js.ends_with("})()"), "策略 {} 结尾不完整", name);
        }
    }
}
