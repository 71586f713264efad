//! 対話セッション（INTERACTIVE_ACTIVE）
//!
//! カーソル位置と no_matches ログを持つ明示的なオブジェクト。
//! イベントは1件ずつ最後まで処理する（貼り付けが重なることはない）。
//!
//! - DOWN: 次のグループの表示名を貼り付け、キーをクリップボードへ
//! - UP:   現在のキーを no_matches に追記（カーソルは動かさない）
//! - F8:   ログをフラッシュして終了
//!
//! 「現在のキー」は最後に貼り付けたグループのもの。まだ一度も貼り付けて
//! いなければカーソル位置（先頭）のグループのもの。

use crate::error::{Error, Result};
use crate::pipeline::PipelineState;
use crate::types::{BaseKey, Group, PipelineResult};
use tracing::{debug, warn};

/// セッションを操作するホットキー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyEvent {
    /// ↓: 貼り付けて次へ
    Down,
    /// ↑: 現在のキーを記録
    Up,
    /// F8: 終了
    Quit,
}

/// キー入力・クリップボードの出力先
pub trait PasteSink {
    /// 表示名をフォーカス中のアプリへ入力する
    fn paste(&mut self, display_name: &str) -> Result<()>;

    /// クリップボードにキーを設定する
    fn set_clipboard(&mut self, base_key: &str) -> Result<()>;
}

/// 一致しなかったキーの追記専用ログ
pub trait NoMatchLog {
    /// 1件追記する（永続化まで含む）
    fn append(&mut self, base_key: &BaseKey) -> Result<()>;

    fn flush(&mut self) -> Result<()>;

    /// このセッションで追記したキー
    fn entries(&self) -> &[BaseKey];
}

/// メモリ上の NoMatchLog（ドライラン・テスト用）
#[derive(Debug, Default)]
pub struct MemoryNoMatchLog {
    entries: Vec<BaseKey>,
}

impl NoMatchLog for MemoryNoMatchLog {
    fn append(&mut self, base_key: &BaseKey) -> Result<()> {
        self.entries.push(base_key.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn entries(&self) -> &[BaseKey] {
        &self.entries
    }
}

/// 1イベントの処理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// 貼り付けた（失敗してもカーソルは進む）
    Pasted {
        position: usize,
        total: usize,
        display_name: String,
        base_key: BaseKey,
        paste_error: Option<String>,
        clipboard_error: Option<String>,
    },
    /// もう貼り付けるグループがない
    Exhausted { total: usize },
    /// no_matches に追記した
    Logged { base_key: BaseKey },
    /// 記録できるグループがない
    NothingToLog,
    /// 終了
    Quit,
}

/// 対話セッション
pub struct Session<P, L> {
    result: PipelineResult,
    cursor: usize,
    last_pasted: Option<usize>,
    sink: P,
    log: L,
    state: PipelineState,
}

impl<P, L> Session<P, L>
where
    P: PasteSink,
    L: NoMatchLog,
{
    pub fn new(result: PipelineResult, sink: P, log: L) -> Self {
        Self {
            result,
            cursor: 0,
            last_pasted: None,
            sink,
            log,
            state: PipelineState::InteractiveActive,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// 次に貼り付けるグループの位置
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.result.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.result.len()
    }

    /// UP で記録されるグループ
    pub fn current(&self) -> Option<&Group> {
        match self.last_pasted {
            Some(index) => self.result.get(index),
            None => self.result.get(self.cursor),
        }
    }

    pub fn sink(&self) -> &P {
        &self.sink
    }

    pub fn no_match_log(&self) -> &L {
        &self.log
    }

    /// イベントを1件処理する
    ///
    /// 追記の失敗はそのイベントだけのエラーで、セッションは続行できる。
    pub fn handle(&mut self, event: HotkeyEvent) -> Result<SessionEvent> {
        if self.state == PipelineState::Done {
            return Err(Error::InvalidTransition {
                from: PipelineState::Done,
                to: PipelineState::InteractiveActive,
            });
        }

        match event {
            HotkeyEvent::Down => Ok(self.advance()),
            HotkeyEvent::Up => self.log_current(),
            HotkeyEvent::Quit => self.quit(),
        }
    }

    fn advance(&mut self) -> SessionEvent {
        let total = self.result.len();
        let Some(group) = self.result.get(self.cursor) else {
            return SessionEvent::Exhausted { total };
        };

        let display_name = group.display_name().to_string();
        let base_key = group.base_key().clone();

        let paste_error = self.sink.paste(&display_name).err().map(|e| e.to_string());
        if let Some(e) = &paste_error {
            warn!("貼り付けに失敗: {}", e);
        }
        let clipboard_error = self
            .sink
            .set_clipboard(base_key.as_str())
            .err()
            .map(|e| e.to_string());
        if let Some(e) = &clipboard_error {
            warn!("クリップボード設定に失敗: {}", e);
        }

        self.last_pasted = Some(self.cursor);
        self.cursor += 1;

        SessionEvent::Pasted {
            position: self.cursor,
            total,
            display_name,
            base_key,
            paste_error,
            clipboard_error,
        }
    }

    fn log_current(&mut self) -> Result<SessionEvent> {
        let Some(base_key) = self.current().map(|g| g.base_key().clone()) else {
            return Ok(SessionEvent::NothingToLog);
        };

        self.log.append(&base_key)?;
        debug!("no_matches に追記: {}", base_key);
        Ok(SessionEvent::Logged { base_key })
    }

    fn quit(&mut self) -> Result<SessionEvent> {
        self.state = PipelineState::Done;
        self.log.flush()?;
        Ok(SessionEvent::Quit)
    }
}
