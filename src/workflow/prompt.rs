//! 评分 prompt
//!
//! 评估轴的优先级和减点列表是给模型的指令，代码不做强制，
//! 但必须原样写入 prompt。

use crate::models::Axis;

/// 减点对象，模型在给出总合评价前应用
pub const PENALTIES: [&str; 5] = [
    "宣伝・広告を目的とした内容",
    "内容が薄く表面的な記事",
    "キーワードを不自然に詰め込んだ内容",
    "他サイトの内容を言い換えただけの内容",
    "公式ドキュメントを許可なく転載した内容",
];

/// 页面正文为空时写入 prompt 的占位文字
pub const EMPTY_PAGE_NOTE: &str = "(ページの本文を取得できませんでした)";

/// 构建评分所需的输入
#[derive(Debug, Clone, Copy)]
pub struct ScoringPrompt<'a> {
    pub original_keywords: &'a str,
    pub suggested_question: &'a str,
    pub url: &'a str,
    pub page_text: &'a str,
    pub max_page_chars: usize,
}

impl ScoringPrompt<'_> {
    pub fn render(&self) -> String {
        let keywords = bullet_list(self.original_keywords.split_whitespace());
        let questions = bullet_list(
            self.suggested_question
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        );
        let page = if self.page_text.is_empty() {
            EMPTY_PAGE_NOTE.to_string()
        } else {
            truncate_chars(self.page_text, self.max_page_chars)
        };
        let axes = bullet_list(
            Axis::ALL
                .iter()
                .map(|axis| format!("{} ({})", axis.label(), axis.rubric())),
        );
        let penalties = bullet_list(PENALTIES.iter());

        format!(
            r#"## 元の検索ワード
{keywords}

## ユーザーが知りたいと思われる質問
{questions}

## ページのURL
{url}

## ページの内容
{page}

このページは上記の質問に対してどの程度適切な回答や情報を含んでいますか？
以下の評価軸を基に**0から10の範囲の整数**でスコアをつけてください。それぞれの評価軸のスコアと総合評価、全体的な理由も簡潔に記述してください。

## 評価軸
重要な評価軸は優先順位順に以下の通りです:
{axes}

## 減点対象
総合評価をつける前に、以下に該当する場合は減点してください:
{penalties}"#,
            url = self.url,
        )
    }
}

fn bullet_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| format!("- {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}…", &text[..end]),
        None => text.to_string(),
    }
}
