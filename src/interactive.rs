//! 対話貼り付けループ
//!
//! ホットキーを1件ずつセッションに渡し、結果を表示する。

use crate::error::Result;
use menu_pipeline_common::{HotkeyEvent, NoMatchLog, PasteSink, PipelineState, Session, SessionEvent};

/// ループ終了時の集計
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoopSummary {
    pub pasted: usize,
    pub logged: usize,
    pub log_errors: usize,
    /// F8 で終了したか（false ならイベント元が閉じた）
    pub quit_by_hotkey: bool,
}

pub fn print_instructions(total: usize) {
    println!("🎹 対話貼り付け（{}件）", total);
    println!("  ↓  : 次の表示名を入力し、キーをクリップボードへ");
    println!("  ↑  : 現在のキーを no_matches に記録");
    println!("  F8 : 終了\n");
}

/// イベントが尽きるか F8 が来るまで処理する
///
/// 追記の失敗は表示して続行する。イベント元が閉じた場合もログはフラッシュする。
pub fn run_session_loop<P, L, I>(session: &mut Session<P, L>, events: I) -> Result<LoopSummary>
where
    P: PasteSink,
    L: NoMatchLog,
    I: IntoIterator<Item = HotkeyEvent>,
{
    let mut summary = LoopSummary::default();

    for event in events {
        match session.handle(event) {
            Ok(SessionEvent::Pasted {
                position,
                total,
                display_name,
                base_key,
                paste_error,
                clipboard_error,
            }) => {
                summary.pasted += 1;
                println!(
                    "[{}/{}] 表示名='{}' | クリップボード='{}'",
                    position, total, display_name, base_key
                );
                if let Some(e) = paste_error {
                    eprintln!("⚠ 入力に失敗: {}", e);
                }
                if let Some(e) = clipboard_error {
                    eprintln!("⚠ クリップボード設定に失敗: {}", e);
                }
            }
            Ok(SessionEvent::Exhausted { total }) => {
                println!("✔ すべて貼り付けました（{}件）。↑で記録、F8で終了", total);
            }
            Ok(SessionEvent::Logged { base_key }) => {
                summary.logged += 1;
                println!("📝 no_matches に記録: {}", base_key);
            }
            Ok(SessionEvent::NothingToLog) => {
                println!("- 記録できる項目がありません");
            }
            Ok(SessionEvent::Quit) => {
                summary.quit_by_hotkey = true;
                break;
            }
            Err(e) if event == HotkeyEvent::Up => {
                summary.log_errors += 1;
                eprintln!("❌ no_matches への記録に失敗: {}", e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if session.state() != PipelineState::Done {
        session.handle(HotkeyEvent::Quit)?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use menu_pipeline_common::{BaseKey, MemoryNoMatchLog, Pipeline, NormalizeOptions};

    #[derive(Default)]
    struct FakeSink {
        typed: Vec<String>,
        clipboard: Vec<String>,
    }

    impl PasteSink for FakeSink {
        fn paste(&mut self, display_name: &str) -> menu_pipeline_common::Result<()> {
            self.typed.push(display_name.to_string());
            Ok(())
        }

        fn set_clipboard(&mut self, base_key: &str) -> menu_pipeline_common::Result<()> {
            self.clipboard.push(base_key.to_string());
            Ok(())
        }
    }

    struct BrokenLog;

    impl NoMatchLog for BrokenLog {
        fn append(&mut self, _base_key: &BaseKey) -> menu_pipeline_common::Result<()> {
            Err(menu_pipeline_common::Error::Io(std::io::Error::other("disk full")))
        }

        fn flush(&mut self) -> menu_pipeline_common::Result<()> {
            Ok(())
        }

        fn entries(&self) -> &[BaseKey] {
            &[]
        }
    }

    fn session<L: NoMatchLog>(lines: &[&str], log: L) -> Session<FakeSink, L> {
        Pipeline::from_raw_lines(lines.iter().copied(), NormalizeOptions::default())
            .unwrap()
            .into_session(FakeSink::default(), log)
            .unwrap()
    }

    #[test]
    fn test_loop_pastes_logs_and_quits() {
        use HotkeyEvent::*;
        let mut s = session(&["Soup", "Soup (1)", "Bread"], MemoryNoMatchLog::default());
        let summary = run_session_loop(&mut s, vec![Down, Up, Down, Down, Quit, Down]).unwrap();

        assert_eq!(summary.pasted, 2);
        assert_eq!(summary.logged, 1);
        assert!(summary.quit_by_hotkey);
        assert_eq!(s.sink().typed, vec!["Soup", "Bread"]);
        assert_eq!(s.sink().clipboard, vec!["Soup", "Bread"]);
        assert_eq!(s.no_match_log().entries(), &[BaseKey::new("Soup")]);
        assert_eq!(s.state(), PipelineState::Done);
    }

    #[test]
    fn test_loop_continues_after_append_failure() {
        use HotkeyEvent::*;
        let mut s = session(&["Soup", "Bread"], BrokenLog);
        let summary = run_session_loop(&mut s, vec![Down, Up, Down]).unwrap();

        assert_eq!(summary.log_errors, 1);
        assert_eq!(summary.pasted, 2);
        assert!(!summary.quit_by_hotkey);
        assert_eq!(s.state(), PipelineState::Done);
    }
}
