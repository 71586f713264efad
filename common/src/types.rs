//! 型定義
//!
//! 抽出 → 正規化 → グルーピングの各段階で受け渡すデータ

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// 候補の出所
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CandidateSource {
    /// タイル見出し（h6）のテキスト
    Title,
    /// 画像URLのファイル名（拡張子なし）
    Filename,
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateSource::Title => write!(f, "title"),
            CandidateSource::Filename => write!(f, "filename"),
        }
    }
}

/// HTMLから取り出した未加工の名前候補
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCandidate {
    pub text: String,
    pub source: CandidateSource,
}

impl RawCandidate {
    pub fn title(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: CandidateSource::Title,
        }
    }

    pub fn filename(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: CandidateSource::Filename,
        }
    }
}

/// グルーピング・クリップボード用のキー
///
/// 値は大文字小文字をそのまま保持するが、比較とハッシュは小文字化した形で行う。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseKey(String);

impl BaseKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 比較用の小文字キー
    pub fn folded(&self) -> String {
        self.0.to_lowercase()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl PartialEq for BaseKey {
    fn eq(&self, other: &Self) -> bool {
        self.folded() == other.folded()
    }
}

impl Eq for BaseKey {}

impl Hash for BaseKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded().hash(state);
    }
}

impl fmt::Display for BaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BaseKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 正規化済みの名前
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEntry {
    /// 貼り付け用の表示名（大文字小文字・区切り文字を保持）
    pub display_name: String,
    /// グルーピング・クリップボード用のキー
    pub base_key: BaseKey,
}

impl NormalizedEntry {
    pub fn new(display_name: impl Into<String>, base_key: BaseKey) -> Self {
        Self {
            display_name: display_name.into(),
            base_key,
        }
    }
}

/// グループに属する個々の候補
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub raw: String,
    pub display_name: String,
    pub source: CandidateSource,
}

/// 同じbase_keyに畳み込まれた候補の集まり
///
/// 代表の表示名とキーは最初に出現した候補のもの。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    base_key: BaseKey,
    display_name: String,
    variants: Vec<Variant>,
}

impl Group {
    pub(crate) fn new(entry: NormalizedEntry, first: Variant) -> Self {
        Self {
            base_key: entry.base_key,
            display_name: entry.display_name,
            variants: vec![first],
        }
    }

    pub(crate) fn push(&mut self, variant: Variant) {
        self.variants.push(variant);
    }

    pub fn base_key(&self) -> &BaseKey {
        &self.base_key
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }
}

/// 文書内の初出順に並んだグループ列
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineResult {
    groups: Vec<Group>,
}

impl PipelineResult {
    pub(crate) fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn get(&self, index: usize) -> Option<&Group> {
        self.groups.get(index)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Group> {
        self.groups.iter()
    }

    /// 表示名の列
    pub fn display_names(&self) -> Vec<&str> {
        self.groups.iter().map(Group::display_name).collect()
    }

    /// キーの列（表示名と行が揃う）
    pub fn base_keys(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.base_key().as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a PipelineResult {
    type Item = &'a Group;
    type IntoIter = std::slice::Iter<'a, Group>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}
