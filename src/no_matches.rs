//! no_matches.txt への追記ログ
//!
//! 1キー1行。追記ごとに flush + sync するので、途中で終了しても
//! それまでの行は残る。既存の内容は消さない。

use crate::files::LINE_ENDING;
use menu_pipeline_common::{BaseKey, NoMatchLog, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct NoMatchFile {
    path: PathBuf,
    file: Option<File>,
    entries: Vec<BaseKey>,
}

impl NoMatchFile {
    /// ファイルは最初の追記時に開く
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
            entries: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&mut self) -> Result<&mut File> {
        let file = match self.file.take() {
            Some(file) => file,
            None => {
                if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)?;
                debug!("no_matches を開きました: {}", self.path.display());
                file
            }
        };
        Ok(self.file.insert(file))
    }
}

impl NoMatchLog for NoMatchFile {
    fn append(&mut self, base_key: &BaseKey) -> Result<()> {
        let file = self.open()?;
        write!(file, "{}{}", base_key, LINE_ENDING)?;
        file.flush()?;
        file.sync_data()?;
        self.entries.push(base_key.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
            file.sync_data()?;
        }
        Ok(())
    }

    fn entries(&self) -> &[BaseKey] {
        &self.entries
    }
}
