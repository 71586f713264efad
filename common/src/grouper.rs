//! グルーピング
//!
//! 大文字小文字を無視したキーの一致でまとめる。代表の表示名は初出のもの
//! （後から出た重複は再エクスポートされた低品質版とみなす）。
//! グループの順序は初出順。

use crate::types::{BaseKey, Group, NormalizedEntry, PipelineResult, RawCandidate, Variant};
use std::collections::HashMap;
use tracing::debug;

/// 正規化済みの候補をグループにまとめる
pub fn group_entries<I>(items: I) -> PipelineResult
where
    I: IntoIterator<Item = (RawCandidate, NormalizedEntry)>,
{
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<BaseKey, usize> = HashMap::new();

    for (candidate, entry) in items {
        let variant = Variant {
            raw: candidate.text,
            display_name: entry.display_name.clone(),
            source: candidate.source,
        };

        match index.get(&entry.base_key) {
            Some(&i) => {
                debug!(
                    "'{}' をグループ '{}' に追加",
                    variant.raw,
                    groups[i].base_key()
                );
                groups[i].push(variant);
            }
            None => {
                index.insert(entry.base_key.clone(), groups.len());
                groups.push(Group::new(entry, variant));
            }
        }
    }

    PipelineResult::new(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::{normalize_all, NormalizeOptions};
    use crate::types::CandidateSource;

    fn group_titles(titles: &[&str]) -> PipelineResult {
        let candidates = titles.iter().map(|t| RawCandidate::title(*t));
        let (entries, _) = normalize_all(candidates, &NormalizeOptions::default());
        group_entries(entries)
    }

    #[test]
    fn test_first_seen_display_name_wins() {
        let result = group_titles(&["grilled salmon", "Grilled Salmon (1)", "GRILLED SALMON"]);
        assert_eq!(result.len(), 1);
        let group = &result.groups()[0];
        assert_eq!(group.display_name(), "grilled salmon");
        assert_eq!(group.base_key().as_str(), "grilled salmon");
        assert_eq!(group.variants().len(), 3);
    }

    #[test]
    fn test_group_order_is_first_seen() {
        let result = group_titles(&["Bread", "Soup", "bread copy", "Salad", "soup"]);
        assert_eq!(result.display_names(), vec!["Bread", "Soup", "Salad"]);
        assert_eq!(result.groups()[0].variants().len(), 2);
        assert_eq!(result.groups()[1].variants().len(), 2);
        assert_eq!(result.groups()[2].variants().len(), 1);
    }

    #[test]
    fn test_soup_copy_groups_with_soup_in_either_order() {
        for titles in [["Soup - Copy", "Soup"], ["Soup", "Soup - Copy"]] {
            let result = group_titles(&titles);
            assert_eq!(result.len(), 1);
            assert_eq!(result.groups()[0].base_key().as_str(), "Soup");
        }
    }

    #[test]
    fn test_variants_keep_raw_text_and_source() {
        let entries = vec![
            RawCandidate::title("Soup"),
            RawCandidate::filename("soup (2)"),
        ];
        let (entries, _) = normalize_all(entries, &NormalizeOptions::default());
        let result = group_entries(entries);
        let variants = result.groups()[0].variants();
        assert_eq!(variants[1].raw, "soup (2)");
        assert_eq!(variants[1].display_name, "soup");
        assert_eq!(variants[1].source, CandidateSource::Filename);
    }

    #[test]
    fn test_empty_input_gives_empty_result() {
        let result = group_entries(Vec::new());
        assert!(result.is_empty());
    }
}
