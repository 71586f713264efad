//! 名前の正規化モジュール
//!
//! 生の候補から貼り付け用の表示名とグルーピング用のキーを作る。
//!
//! ## 処理フロー
//! 1. 前後の空白を除去し、連続する空白を1つにまとめる
//! 2. 末尾の重複マーカーを除去（[`markers`]）
//! 3. `-` と `_` はマーカーの一部でない限り残す
//!
//! キーの値は表示名と同じ文字列で、比較だけを小文字で行う（[`BaseKey`]）。
//! 結果は文字列だけで決まり、候補の由来には依存しない。そのため
//! 正規化済みのキーをもう一度正規化しても同じキーになる。

pub mod markers;

use crate::error::Skip;
use crate::types::{BaseKey, NormalizedEntry, RawCandidate};
use tracing::debug;

/// 正規化オプション
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// 末尾のカメラアングル語（Top, Side など）も除去する
    pub strip_view_suffixes: bool,
}

/// 空白の正規化（前後除去 + 連続空白を1つに）
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 候補1件を正規化する
///
/// 空の名前やマーカーだけの名前は `Skip` として返す。
pub fn normalize(
    candidate: &RawCandidate,
    options: &NormalizeOptions,
) -> std::result::Result<NormalizedEntry, Skip> {
    let collapsed = collapse_whitespace(&candidate.text);
    if collapsed.is_empty() {
        return Err(Skip::normalization(&candidate.text, "空の名前"));
    }

    let display_name = markers::strip_markers(&collapsed, options);
    if display_name.is_empty() {
        return Err(Skip::normalization(&candidate.text, "重複マーカーのみの名前"));
    }

    let base_key = BaseKey::new(display_name.clone());
    Ok(NormalizedEntry::new(display_name, base_key))
}

/// 文字列からキーだけを求める
pub fn base_key(text: &str, options: &NormalizeOptions) -> Option<BaseKey> {
    normalize(&RawCandidate::title(text), options)
        .ok()
        .map(|entry| entry.base_key)
}

/// 候補をまとめて正規化する（順序を保持）
pub fn normalize_all<I>(
    candidates: I,
    options: &NormalizeOptions,
) -> (Vec<(RawCandidate, NormalizedEntry)>, Vec<Skip>)
where
    I: IntoIterator<Item = RawCandidate>,
{
    let mut entries = Vec::new();
    let mut skips = Vec::new();

    for candidate in candidates {
        match normalize(&candidate, options) {
            Ok(entry) => entries.push((candidate, entry)),
            Err(skip) => {
                debug!("{}", skip);
                skips.push(skip);
            }
        }
    }

    (entries, skips)
}
