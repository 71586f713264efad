//! OSへのキー入力とクリップボード
//!
//! enigo でフォーカス中のアプリへ入力し、arboard でクリップボードを設定する。

use crate::config::Config;
use crate::error::{PipelineError, Result};
use anyhow::Context;
use arboard::Clipboard;
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use menu_pipeline_common::PasteSink;
use std::time::Duration;
use tracing::debug;

#[cfg(target_os = "macos")]
const SELECT_ALL_MODIFIER: Key = Key::Meta;
#[cfg(not(target_os = "macos"))]
const SELECT_ALL_MODIFIER: Key = Key::Control;

pub struct DesktopPaster {
    enigo: Enigo,
    clipboard: Clipboard,
    select_all: bool,
    type_delay: Duration,
}

impl DesktopPaster {
    pub fn new(config: &Config) -> Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .context("キー入力の初期化に失敗")
            .map_err(|e| PipelineError::Paste(format!("{:#}", e)))?;
        let clipboard = Clipboard::new()
            .context("クリップボードの初期化に失敗")
            .map_err(|e| PipelineError::Paste(format!("{:#}", e)))?;

        Ok(Self {
            enigo,
            clipboard,
            select_all: config.select_all_before_paste,
            type_delay: Duration::from_millis(config.type_delay_ms),
        })
    }

    fn select_all(&mut self) -> anyhow::Result<()> {
        self.enigo
            .key(SELECT_ALL_MODIFIER, Direction::Press)
            .context("修飾キーの押下に失敗")?;
        let typed = self
            .enigo
            .key(Key::Unicode('a'), Direction::Click)
            .context("全選択に失敗");
        // 修飾キーは失敗しても必ず離す
        self.enigo
            .key(SELECT_ALL_MODIFIER, Direction::Release)
            .context("修飾キーの解放に失敗")?;
        typed
    }

    fn type_text(&mut self, text: &str) -> anyhow::Result<()> {
        if self.select_all {
            self.select_all()?;
            if !self.type_delay.is_zero() {
                std::thread::sleep(self.type_delay);
            }
        }
        self.enigo.text(text).context("テキスト入力に失敗")?;
        debug!("入力: {} 文字", text.chars().count());
        Ok(())
    }
}

impl PasteSink for DesktopPaster {
    fn paste(&mut self, display_name: &str) -> menu_pipeline_common::Result<()> {
        self.type_text(display_name)
            .map_err(|e| menu_pipeline_common::Error::Sink(format!("{:#}", e)))
    }

    fn set_clipboard(&mut self, base_key: &str) -> menu_pipeline_common::Result<()> {
        self.clipboard
            .set_text(base_key)
            .context("クリップボードへの書き込みに失敗")
            .map_err(|e| menu_pipeline_common::Error::Sink(format!("{:#}", e)))
    }
}
