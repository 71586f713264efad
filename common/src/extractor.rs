//! メディアライブラリHTMLの抽出
//!
//! 1タイル = 1候補。タイル見出し（h6）を優先し、見出しが空なら
//! タイル内の画像URLのファイル名にフォールバックする。
//! タイル外の画像はそれぞれ単独のブロックとして扱い、タイルと同じく
//! 文書順に並べる。
//!
//! 壊れたブロックはスキップとして記録し、抽出自体は止めない。

use crate::error::Skip;
use crate::normalizer::collapse_whitespace;
use crate::types::RawCandidate;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use tracing::debug;
use url::Url;

/// 画像URLを探す属性（優先順）
const URL_ATTRIBUTES: &[&str] = &["src", "data-src", "data-original", "data-lazy-src"];

/// ファイル名から外す画像拡張子
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "avif", "heic", "svg", "bmp", "tif", "tiff",
];

lazy_static! {
    static ref TITLE: Selector =
        Selector::parse(r#"[data-cy^="media-tile-image-title-"]"#).unwrap();
    static ref HEADING: Selector = Selector::parse("h6").unwrap();
    static ref IMAGE: Selector = Selector::parse("img, source").unwrap();
    static ref BASE_URL: Url = Url::parse("http://localhost/").unwrap();
    // 複製時に付くファイル名の連番（"Soup_2.jpg"）
    static ref FILE_COUNTER: Regex = Regex::new(r"(?:_\d+)+$").unwrap();
}

/// 抽出結果（候補またはスキップ）
pub type Extracted = std::result::Result<RawCandidate, Skip>;

/// パース済みのHTML文書
pub struct Extractor {
    document: Html,
}

impl Extractor {
    /// HTMLを読み込む（整形式でなくてもよい）
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// 文書順に候補を返す
    ///
    /// タイルとタイル外の画像を、文書内で現れた順にそのまま並べる。
    pub fn candidates(&self) -> impl Iterator<Item = Extracted> + '_ {
        let titles: Vec<ElementRef<'_>> = self.document.select(&TITLE).collect();

        // 見出しを複数含む親はタイルとみなさない（平坦なマークアップ対策）
        let mut titles_per_parent: HashMap<_, usize> = HashMap::new();
        for title in &titles {
            if let Some(parent) = title.parent() {
                *titles_per_parent.entry(parent.id()).or_insert(0) += 1;
            }
        }

        // ブロック要素 → その見出し
        let mut blocks = HashMap::new();
        for title in titles {
            let block = title
                .parent()
                .filter(|parent| titles_per_parent.get(&parent.id()) == Some(&1))
                .and_then(ElementRef::wrap)
                .unwrap_or(title);
            blocks.entry(block.id()).or_insert(title);
        }

        let mut seen_urls = HashSet::new();

        self.document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter_map(move |element| {
                if let Some(title) = blocks.get(&element.id()) {
                    return Some(tile_candidate(element, *title));
                }
                if !IMAGE.matches(&element)
                    || element.ancestors().any(|node| blocks.contains_key(&node.id()))
                {
                    return None;
                }
                let url = image_url(element)?;
                seen_urls
                    .insert(url.clone())
                    .then(|| stem_candidate(&url))
            })
    }
}

/// HTMLから候補とスキップを取り出す
pub fn extract_candidates(html: &str) -> (Vec<RawCandidate>, Vec<Skip>) {
    let extractor = Extractor::parse(html);
    let mut candidates = Vec::new();
    let mut skips = Vec::new();

    for item in extractor.candidates() {
        match item {
            Ok(candidate) => candidates.push(candidate),
            Err(skip) => {
                debug!("{}", skip);
                skips.push(skip);
            }
        }
    }

    (candidates, skips)
}

/// 1タイル分の候補（見出し優先、なければ画像ファイル名）
fn tile_candidate(block: ElementRef<'_>, title: ElementRef<'_>) -> Extracted {
    let heading = title.select(&HEADING).next().unwrap_or(title);
    let text = collapse_whitespace(&decode_entities(&heading.text().collect::<String>()));
    if !text.is_empty() {
        return Ok(RawCandidate::title(text));
    }

    match block.select(&IMAGE).find_map(image_url) {
        Some(url) => stem_candidate(&url),
        None => Err(Skip::extraction(
            title.value().attr("data-cy").unwrap_or_default(),
            "見出しも画像もないタイル",
        )),
    }
}

fn stem_candidate(url: &str) -> Extracted {
    filename_stem(url)
        .map(RawCandidate::filename)
        .ok_or_else(|| Skip::extraction(url, "画像URLからファイル名を取得できない"))
}

/// 要素の画像URL（属性の優先順、最後にsrcsetの先頭）
fn image_url(element: ElementRef<'_>) -> Option<String> {
    let value = element.value();
    URL_ATTRIBUTES
        .iter()
        .filter_map(|attr| value.attr(attr))
        .map(str::trim)
        .find(|url| !url.is_empty())
        .map(str::to_string)
        .or_else(|| value.attr("srcset").and_then(first_srcset_url))
}

fn first_srcset_url(srcset: &str) -> Option<String> {
    srcset
        .split(',')
        .next()?
        .split_whitespace()
        .next()
        .map(str::to_string)
}

/// 画像URLからファイル名の語幹を取り出す
///
/// クエリ・フラグメントを除き、パーセントデコードし、画像拡張子とその直前の
/// 連番（`_2`）を外す。`data:` URLや末尾が空のパスは `None`。
pub fn filename_stem(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() || trimmed.to_ascii_lowercase().starts_with("data:") {
        return None;
    }

    let path = match BASE_URL.join(trimmed) {
        Ok(resolved) => resolved.path().to_string(),
        Err(_) => trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let segment = path.rsplit(['/', '\\']).next().unwrap_or_default();
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    file_name_base(&decoded).or_else(|| {
        let stem = decoded.trim();
        (!stem.is_empty()).then(|| stem.to_string())
    })
}

/// 画像ファイル名から拡張子と直前の連番を外した名前
///
/// 画像拡張子がなければ `None`。連番だけの名前（`_2.jpg`）は残す。
pub fn file_name_base(name: &str) -> Option<String> {
    let stem = split_image_extension(name.trim())?;
    let without_counter = FILE_COUNTER.replace(stem, "");
    if without_counter.trim().is_empty() {
        Some(stem.trim().to_string())
    } else {
        Some(without_counter.trim().to_string())
    }
}

/// 画像拡張子付きのファイル名なら語幹を返す
pub fn split_image_extension(name: &str) -> Option<&str> {
    let (stem, ext) = name.rsplit_once('.')?;
    if !stem.is_empty() && IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
        Some(stem)
    } else {
        None
    }
}

/// 二重エスケープされた実体参照の残りを展開
fn decode_entities(text: &str) -> String {
    if !text.contains('&') || text.contains('<') {
        return text.to_string();
    }
    Html::parse_fragment(text).root_element().text().collect()
}
