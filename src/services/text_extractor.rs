//! 正文提取服务 - 业务能力层
//!
//! 只负责 "HTML → 纯文本"，纯函数，无副作用

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node};

use crate::models::{ExtractedText, FetchedPage};

/// 整棵子树都会被跳过的元素
const SKIP_TAGS: &[&str] = &["script", "style"];

/// 块级元素前后插入分隔符，避免相邻段落的文字粘在一起
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul", "ol", "tr", "td", "th",
    "table", "article", "section", "main", "header", "footer", "nav", "aside", "blockquote",
    "pre", "figcaption", "dt", "dd", "title", "body", "head",
];

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // \s 已包含全角空格 U+3000，这里显式写出
    RE.get_or_init(|| Regex::new(r"[\s\u{3000}]+").expect("whitespace regex"))
}

/// 将原始 HTML 转换为可评估的纯文本
///
/// - 容错解析，任何输入都不会报错
/// - 删除 `script` / `style` 及其子树
/// - 按文档顺序拼接文本节点
/// - 连续空白（含全角空格）折叠为一个半角空格并去除首尾空白
pub fn extract(raw_html: &str) -> String {
    if raw_html.trim().is_empty() {
        return String::new();
    }

    let document = Html::parse_document(raw_html);
    let mut buf = String::with_capacity(raw_html.len() / 2);
    collect_text(document.root_element(), &mut buf);

    normalize_whitespace(&buf)
}

/// 对抓取结果执行提取
pub fn extract_page(page: &FetchedPage) -> ExtractedText {
    ExtractedText {
        url: page.url.clone(),
        text: extract(&page.raw_body),
    }
}

/// 折叠空白
pub fn normalize_whitespace(text: &str) -> String {
    whitespace_re().replace_all(text, " ").trim().to_string()
}

/// 把纯文本包装成最小的 HTML 文档
pub fn to_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 32);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    format!("<!DOCTYPE html><html><body><p>{}</p></body></html>", escaped)
}

fn collect_text(element: ElementRef<'_>, buf: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => buf.push_str(text),
            Node::Element(el) => {
                let tag = el.name();
                if SKIP_TAGS.contains(&tag) {
                    continue;
                }
                let is_block = BLOCK_TAGS.contains(&tag);
                if is_block {
                    buf.push(' ');
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(child_ref, buf);
                }
                if is_block {
                    buf.push(' ');
                }
            }
            _ => {}
        }
    }
}
