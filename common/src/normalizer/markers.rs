//! 重複マーカーのルール
//!
//! OSやエクスポート時の複製で付く末尾の印（`(1)`, `- Copy`, `copy 2` など）。
//! ルールは固定の優先順で評価し、どれも当たらなくなるまで繰り返す。
//! すべて末尾に固定されているので、名前の途中にある語は消さない。

use super::NormalizeOptions;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

/// ルールの適用範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// 常に適用
    Always,
    /// `strip_view_suffixes` 有効時のみ
    ViewSuffix,
}

/// 重複マーカー1種類
#[derive(Debug)]
pub struct MarkerRule {
    pub name: &'static str,
    pub scope: RuleScope,
    pattern: Regex,
}

impl MarkerRule {
    fn new(name: &'static str, scope: RuleScope, pattern: &str) -> Self {
        Self {
            name,
            scope,
            pattern: Regex::new(pattern).unwrap(),
        }
    }

    /// この候補に適用するか
    pub fn applies(&self, options: &NormalizeOptions) -> bool {
        match self.scope {
            RuleScope::Always => true,
            RuleScope::ViewSuffix => options.strip_view_suffixes,
        }
    }

    /// 末尾のマーカーを外した文字列（当たらなければ `None`）
    pub fn strip(&self, text: &str) -> Option<String> {
        self.pattern
            .find(text)
            .map(|m| text[..m.start()].trim_end().to_string())
    }
}

lazy_static! {
    static ref RULES: Vec<MarkerRule> = vec![
        // "Soup (1)"
        MarkerRule::new("parenthesized-counter", RuleScope::Always, r"\s*\(\d+\)$"),
        // "Soup - Copy", "Soup copy 3", "Soup_Copy(2)"
        MarkerRule::new(
            "copy-suffix",
            RuleScope::Always,
            r"(?i)(?:^|[\s_-]+)copy(?:\s*(?:\(\d+\)|\d+))?$",
        ),
        // "Sopa - Cópia"
        MarkerRule::new(
            "copia-suffix",
            RuleScope::Always,
            r"(?i)(?:^|[\s_-]+)c[oó]pia(?:\s*(?:\(\d+\)|\d+))?$",
        ),
        // "Burger_Top", "Pizza-Side"
        MarkerRule::new(
            "view-suffix",
            RuleScope::ViewSuffix,
            r"(?i)(?:^|[\s_-]+)(?:top|straight|macro|side|angle|left|right|front|back)$",
        ),
    ];
}

/// 優先順に並んだルール一覧
pub fn rules() -> &'static [MarkerRule] {
    &RULES
}

/// 末尾のマーカーを固定点まで取り除く
///
/// 由来（見出し/ファイル名）には依存しない。ファイル名の連番 `_2` は抽出時に外す。
pub fn strip_markers(text: &str, options: &NormalizeOptions) -> String {
    let mut current = text.trim().to_string();

    loop {
        let fired = rules()
            .iter()
            .filter(|rule| rule.applies(options))
            .find_map(|rule| rule.strip(&current).map(|next| (rule.name, next)));

        match fired {
            Some((name, next)) => {
                trace!("マーカー除去 {}: '{}' -> '{}'", name, current, next);
                current = next;
            }
            None => return current,
        }
    }
}
