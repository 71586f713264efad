//! 抽出から貼り付けまでの統合テスト
//!
//! OS入力の代わりに記録用の PasteSink を使う。

use menu_pipeline::files::{self, DISPLAY_FILE, KEYS_FILE, NAMES_FILE};
use menu_pipeline::interactive::run_session_loop;
use menu_pipeline::no_matches::NoMatchFile;
use menu_pipeline_common::{
    HotkeyEvent, NoMatchLog, NormalizeOptions, PasteSink, Pipeline, PipelineResult, PipelineState,
};
use tempfile::tempdir;

#[derive(Default)]
struct RecordingSink {
    typed: Vec<String>,
    clipboard: Option<String>,
}

impl PasteSink for RecordingSink {
    fn paste(&mut self, display_name: &str) -> menu_pipeline_common::Result<()> {
        self.typed.push(display_name.to_string());
        Ok(())
    }

    fn set_clipboard(&mut self, base_key: &str) -> menu_pipeline_common::Result<()> {
        self.clipboard = Some(base_key.to_string());
        Ok(())
    }
}

fn tile(id: usize, title: &str, src: &str) -> String {
    format!(
        r#"<div class="tile"><img src="{src}"><h6 data-cy="media-tile-image-title-{id}">{title}</h6></div>"#
    )
}

fn page(tiles: &[String]) -> String {
    format!("<html><body><main>{}</main></body></html>", tiles.join("\n"))
}

/// "Soup - Copy" と "Soup" は1グループになり、先に出た方が代表になる
#[test]
fn test_copy_and_original_group_together() {
    let html = page(&[
        tile(1, "Soup - Copy", "/media/soup-copy.jpg"),
        tile(2, "Soup", "/media/soup.jpg"),
    ]);
    let pipeline = Pipeline::from_html(&html, NormalizeOptions::default()).unwrap();
    let result = pipeline.result().unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.base_keys(), vec!["Soup"]);
    assert_eq!(result.groups()[0].variants().len(), 2);

    let reversed = page(&[
        tile(2, "Soup", "/media/soup.jpg"),
        tile(1, "Soup - Copy", "/media/soup-copy.jpg"),
    ]);
    let pipeline = Pipeline::from_html(&reversed, NormalizeOptions::default()).unwrap();
    assert_eq!(pipeline.result().unwrap().base_keys(), vec!["Soup"]);
}

/// 有効なタイルがないページは空の結果（エラーではない）
#[test]
fn test_page_without_tiles_yields_empty_result() {
    let pipeline = Pipeline::from_html("<html><body><p>nothing</p></body></html>", NormalizeOptions::default()).unwrap();
    assert!(pipeline.result().unwrap().is_empty());
}

/// 抽出 → 対話 → no_matches 追記まで
#[test]
fn test_end_to_end_session_appends_no_matches() {
    use HotkeyEvent::*;

    let dir = tempdir().expect("Failed to create temp dir");
    let no_matches = dir.path().join("no_matches.txt");
    let html = page(&[
        tile(1, "Grilled Salmon (1)", "/m/a.jpg"),
        tile(2, "Mac-and-Cheese_v2 - Copy", "/m/b.jpg"),
        tile(3, "grilled salmon", "/m/c.jpg"),
    ]);

    let pipeline = Pipeline::from_html(&html, NormalizeOptions::default()).unwrap();
    let mut session = pipeline
        .into_session(RecordingSink::default(), NoMatchFile::new(&no_matches))
        .unwrap();

    // ↑を先に押すと、カーソル位置（先頭）のキーが記録される
    let summary = run_session_loop(&mut session, vec![Up, Down, Down, Up, Down, Quit]).unwrap();

    assert_eq!(summary.pasted, 2);
    assert_eq!(summary.logged, 2);
    assert_eq!(session.sink().typed, vec!["Grilled Salmon", "Mac-and-Cheese_v2"]);
    assert_eq!(session.sink().clipboard.as_deref(), Some("Mac-and-Cheese_v2"));
    assert_eq!(session.state(), PipelineState::Done);

    let lines = files::read_lines(&no_matches).unwrap();
    assert_eq!(lines, vec!["Grilled Salmon", "Mac-and-Cheese_v2"]);
}

/// no_matches.txt は次のセッションでも消えない
#[test]
fn test_no_matches_persists_across_sessions() {
    use HotkeyEvent::*;

    let dir = tempdir().expect("Failed to create temp dir");
    let no_matches = dir.path().join("no_matches.txt");

    for title in ["Soup", "Bread"] {
        let pipeline = Pipeline::from_raw_lines([title], NormalizeOptions::default()).unwrap();
        let mut session = pipeline
            .into_session(RecordingSink::default(), NoMatchFile::new(&no_matches))
            .unwrap();
        run_session_loop(&mut session, vec![Down, Up, Quit]).unwrap();
        assert_eq!(session.no_match_log().entries().len(), 1);
    }

    assert_eq!(files::read_lines(&no_matches).unwrap(), vec!["Soup", "Bread"]);
}

/// fix の出力を paste で読むと同じ順序になる
#[test]
fn test_legacy_files_replay_same_order() {
    let dir = tempdir().expect("Failed to create temp dir");
    let names = dir.path().join(NAMES_FILE);
    files::write_lines(
        &names,
        &["Caesar Salad (2)", "Tomato Soup copy", "caesar salad", "dish_3.jpg"],
    )
    .unwrap();

    let options = NormalizeOptions::default();
    let pipeline = Pipeline::from_raw_lines(files::read_lines(&names).unwrap(), options.clone()).unwrap();
    let fixed: PipelineResult = pipeline.result().cloned().unwrap();
    files::write_lines(&dir.path().join(DISPLAY_FILE), &fixed.display_names()).unwrap();
    files::write_lines(&dir.path().join(KEYS_FILE), &fixed.base_keys()).unwrap();

    let display = files::read_lines(&dir.path().join(DISPLAY_FILE)).unwrap();
    let keys = files::read_lines(&dir.path().join(KEYS_FILE)).unwrap();
    assert_eq!(display.len(), keys.len());
    assert_eq!(display, vec!["Caesar Salad", "Tomato Soup", "dish"]);

    let replayed = files::load_paste_files(dir.path(), &options).unwrap();
    assert_eq!(replayed.display_names(), fixed.display_names());
    assert_eq!(replayed.base_keys(), fixed.base_keys());
}

/// ドライランは no_matches に触れない
#[test]
fn test_dry_run_reports_plan_only() {
    let html = page(&[tile(1, "Soup", "/m/a.jpg"), tile(2, "Bread (3)", "/m/b.jpg")]);
    let mut pipeline = Pipeline::from_html(&html, NormalizeOptions::default()).unwrap();
    let report = pipeline.dry_run().unwrap();

    assert_eq!(pipeline.state(), PipelineState::DryRunReported);
    assert_eq!(report.actions.len(), 2);
    assert_eq!(report.actions[1].position, 2);
    assert_eq!(report.actions[1].display_name, "Bread");

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["actions"].is_array());

    // ドライラン後に対話へは進めない
    assert!(pipeline
        .into_session(RecordingSink::default(), menu_pipeline_common::MemoryNoMatchLog::default())
        .is_err());
}
