use crate::error::{PipelineError, Result};
use crate::files::NO_MATCHES_FILE;
use menu_pipeline_common::NormalizeOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// no_matches.txt の場所を上書きする環境変数
pub const NO_MATCHES_ENV: &str = "MENU_PIPELINE_NO_MATCHES";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub no_matches_path: Option<PathBuf>,
    /// 入力前に Ctrl+A（macOSは Cmd+A）で全選択する
    pub select_all_before_paste: bool,
    pub strip_view_suffixes: bool,
    /// 全選択から入力までの待ち時間
    pub type_delay_ms: u64,
}

const APP_DIR: &str = "menu-pipeline";
const CONFIG_FILE: &str = "config.json";

impl Default for Config {
    fn default() -> Self {
        Self {
            no_matches_path: None,
            select_all_before_paste: true,
            strip_view_suffixes: false,
            type_delay_ms: 0,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// ファイルがなければ既定値。壊れたJSONは設定エラー
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content)
            .map_err(|e| PipelineError::Config(format!("{}: {}", config_path.display(), e)))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(config_path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// `~/.config/menu-pipeline/config.json`
    pub fn config_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".config").join(APP_DIR).join(CONFIG_FILE))
            .ok_or_else(|| PipelineError::Config("ホームディレクトリが見つかりません".into()))
    }

    /// no_matches.txt の保存先
    ///
    /// 優先順: 引数 → 環境変数 → 設定ファイル → ドキュメント → ホーム → カレント
    pub fn resolve_no_matches(&self, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(no_matches_from_env)
            .or_else(|| self.no_matches_path.clone())
            .unwrap_or_else(|| {
                dirs::document_dir()
                    .or_else(dirs::home_dir)
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(NO_MATCHES_FILE)
            })
    }

    /// CLIフラグと合わせた正規化オプション
    pub fn normalize_options(&self, strip_views_flag: bool) -> NormalizeOptions {
        NormalizeOptions {
            strip_view_suffixes: self.strip_view_suffixes || strip_views_flag,
        }
    }

    pub fn set_no_matches_path(&mut self, path: PathBuf) -> Result<()> {
        self.no_matches_path = Some(path);
        self.save()
    }
}

fn no_matches_from_env() -> Option<PathBuf> {
    std::env::var_os(NO_MATCHES_ENV)
        .filter(|value| !value.to_string_lossy().trim().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.select_all_before_paste);
        assert!(!config.strip_view_suffixes);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            no_matches_path: Some(PathBuf::from("/tmp/nm.txt")),
            strip_view_suffixes: true,
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"type_delay_ms": 40}"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.type_delay_ms, 40);
        assert!(config.select_all_before_paste);
    }

    #[test]
    fn test_broken_config_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_explicit_no_matches_path_wins() {
        let config = Config {
            no_matches_path: Some(PathBuf::from("from-config.txt")),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_no_matches(Some(Path::new("explicit.txt"))),
            PathBuf::from("explicit.txt")
        );
    }

    #[test]
    fn test_default_no_matches_file_name() {
        let path = Config::default().resolve_no_matches(None);
        assert!(path.ends_with(NO_MATCHES_FILE) || std::env::var(NO_MATCHES_ENV).is_ok());
    }

    #[test]
    fn test_strip_views_flag_or_config() {
        let config = Config::default();
        assert!(!config.normalize_options(false).strip_view_suffixes);
        assert!(config.normalize_options(true).strip_view_suffixes);
    }
}
