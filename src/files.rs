//! 行単位ファイルの入出力（parse / fix / paste の受け渡し）
//!
//! 表示名ファイルとキーファイルは行が揃っている（N行目同士が同じ項目）。

use crate::error::{PipelineError, Result};
use menu_pipeline_common::normalizer::base_key;
use menu_pipeline_common::{BaseKey, NormalizeOptions, NormalizedEntry, PipelineResult, RawCandidate};
use std::path::Path;
use tracing::warn;

pub const NAMES_FILE: &str = "names.txt";
pub const DISPLAY_FILE: &str = "dish_names.txt";
pub const KEYS_FILE: &str = "dish_names2.txt";
pub const NO_MATCHES_FILE: &str = "no_matches.txt";

#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// 各行を改行付きで連結（空なら空文字列）
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line.as_ref());
        out.push_str(LINE_ENDING);
    }
    out
}

pub fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, join_lines(lines))?;
    Ok(())
}

/// 行を読み込む（前後の空白を除去し、空行は捨てる）
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = read_text(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// UTF-8として読み込む（不正なバイトは置換）
pub fn read_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(PipelineError::InputNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// 表示名・キーの2ファイルからグループ列を作る
///
/// キーファイルがない、または行数が合わない場合は表示名から作り直す。
pub fn load_paste_files(dir: &Path, options: &NormalizeOptions) -> Result<PipelineResult> {
    let display_path = dir.join(DISPLAY_FILE);
    if !display_path.exists() {
        return Err(PipelineError::InputNotFound(format!(
            "{}（先に fix を実行してください）",
            display_path.display()
        )));
    }

    let display = read_lines(&display_path)?;
    if display.is_empty() {
        return Err(PipelineError::EmptyInput(display_path.display().to_string()));
    }

    let keys_path = dir.join(KEYS_FILE);
    let keys = if keys_path.exists() {
        let keys = read_lines(&keys_path)?;
        if keys.len() == display.len() {
            Some(keys)
        } else {
            // tracing のマクロ内では `display` が tracing::field::display に解決されるため先に束縛する
            let display_len = display.len();
            warn!(
                "{} の行数が一致しません（{} / {}）。キーを作り直します",
                keys_path.display(),
                keys.len(),
                display_len
            );
            None
        }
    } else {
        None
    };

    let pairs = display.into_iter().enumerate().map(|(i, name)| {
        let key = match &keys {
            Some(keys) => BaseKey::new(keys[i].clone()),
            None => base_key(&name, options)
                .unwrap_or_else(|| BaseKey::new(name.clone())),
        };
        (RawCandidate::title(name.clone()), NormalizedEntry::new(name, key))
    });

    Ok(menu_pipeline_common::group_entries(pairs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_join_lines() {
        assert_eq!(join_lines::<&str>(&[]), "");
        assert_eq!(join_lines(&["a", "b"]), format!("a{0}b{0}", LINE_ENDING));
    }

    #[test]
    fn test_read_lines_trims_and_skips_blank() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(NAMES_FILE);
        std::fs::write(&path, "  Soup \r\n\r\nBread\n   \n").unwrap();
        assert_eq!(read_lines(&path).unwrap(), vec!["Soup", "Bread"]);
    }

    #[test]
    fn test_read_missing_file_is_input_error() {
        let err = read_lines(Path::new("/nonexistent/names.txt")).unwrap_err();
        assert!(matches!(err, PipelineError::InputNotFound(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_read_text_replaces_invalid_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, b"<h6>Caf\xe9</h6>").unwrap();
        let text = read_text(&path).unwrap();
        assert!(text.starts_with("<h6>Caf"));
        assert!(text.ends_with("</h6>"));
    }

    #[test]
    fn test_load_paste_files_uses_keys_file() {
        let dir = tempdir().unwrap();
        write_lines(&dir.path().join(DISPLAY_FILE), &["Grilled Salmon", "Soup"]).unwrap();
        write_lines(&dir.path().join(KEYS_FILE), &["grilledsalmon", "soup"]).unwrap();
        let result = load_paste_files(dir.path(), &NormalizeOptions::default()).unwrap();
        assert_eq!(result.display_names(), vec!["Grilled Salmon", "Soup"]);
        assert_eq!(result.base_keys(), vec!["grilledsalmon", "soup"]);
    }

    #[test]
    fn test_load_paste_files_rebuilds_mismatched_keys() {
        let dir = tempdir().unwrap();
        write_lines(&dir.path().join(DISPLAY_FILE), &["Soup - Copy", "Bread"]).unwrap();
        write_lines(&dir.path().join(KEYS_FILE), &["soup"]).unwrap();
        let result = load_paste_files(dir.path(), &NormalizeOptions::default()).unwrap();
        assert_eq!(result.base_keys(), vec!["Soup", "Bread"]);
        assert_eq!(result.display_names(), vec!["Soup - Copy", "Bread"]);
    }

    #[test]
    fn test_load_paste_files_requires_display_file() {
        let dir = tempdir().unwrap();
        let err = load_paste_files(dir.path(), &NormalizeOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::InputNotFound(_)));

        write_lines::<&str>(&dir.path().join(DISPLAY_FILE), &[]).unwrap();
        let err = load_paste_files(dir.path(), &NormalizeOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput(_)));
    }
}
