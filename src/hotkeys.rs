//! グローバルホットキー（↓ / ↑ / F8）
//!
//! rdev のリスナースレッドでキーを拾い、チャネルで対話ループへ送る。
//! キーを押しっぱなしにしたときのリピートは1回として扱う。

use crate::error::{PipelineError, Result};
use menu_pipeline_common::HotkeyEvent;
use rdev::{EventType, Key};
use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use tracing::{debug, error};

fn hotkey_for(key: Key) -> Option<HotkeyEvent> {
    match key {
        Key::DownArrow => Some(HotkeyEvent::Down),
        Key::UpArrow => Some(HotkeyEvent::Up),
        Key::F8 => Some(HotkeyEvent::Quit),
        _ => None,
    }
}

/// 押下中のキーを覚えてリピートを捨てる
#[derive(Debug, Default)]
pub struct KeyMapper {
    held: HashSet<HotkeyEvent>,
}

impl KeyMapper {
    pub fn map(&mut self, event: &EventType) -> Option<HotkeyEvent> {
        match event {
            EventType::KeyPress(key) => {
                let hotkey = hotkey_for(*key)?;
                self.held.insert(hotkey).then_some(hotkey)
            }
            EventType::KeyRelease(key) => {
                if let Some(hotkey) = hotkey_for(*key) {
                    self.held.remove(&hotkey);
                }
                None
            }
            _ => None,
        }
    }
}

/// リスナースレッドを起動し、ホットキーの受信側を返す
///
/// rdev::listen は戻らないので、スレッドはプロセス終了まで残る。
pub fn spawn_listener() -> Result<Receiver<HotkeyEvent>> {
    let (tx, rx) = mpsc::channel();

    thread::Builder::new()
        .name("hotkeys".into())
        .spawn(move || {
            let mut mapper = KeyMapper::default();
            let result = rdev::listen(move |event| {
                if let Some(hotkey) = mapper.map(&event.event_type) {
                    debug!("ホットキー: {:?}", hotkey);
                    // 受信側が閉じていれば捨てる
                    let _ = tx.send(hotkey);
                }
            });
            if let Err(e) = result {
                error!("キー入力の監視に失敗: {:?}", e);
            }
        })
        .map_err(|e| PipelineError::Hotkey(e.to_string()))?;

    Ok(rx)
}
