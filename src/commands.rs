//! サブコマンドの実装

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::desktop::DesktopPaster;
use crate::error::{PipelineError, Result};
use crate::files::{self, DISPLAY_FILE, KEYS_FILE, NAMES_FILE, NO_MATCHES_FILE};
use crate::hotkeys;
use crate::interactive::{print_instructions, run_session_loop};
use crate::no_matches::NoMatchFile;
use menu_pipeline_common::{DryRunReport, NormalizeOptions, Pipeline, PipelineResult};
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn dispatch(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    let options = config.normalize_options(cli.strip_views);

    match cli.command {
        Commands::Run { html, input, no_matches, dry_run, json } => cmd_run(
            RunArgs {
                html: html.as_deref(),
                input: input.as_deref(),
                no_matches: no_matches.as_deref(),
                dry_run,
                json,
            },
            &config,
            options,
        ),
        Commands::Parse { html, out } => cmd_parse(&html, out.as_deref()).map(|_| ()),
        Commands::Fix { input, out_display, out_keys } => cmd_fix(
            input.as_deref(),
            out_display.as_deref(),
            out_keys.as_deref(),
            options,
        )
        .map(|_| ()),
        Commands::All { html, out_dir } => cmd_all(&html, out_dir.as_deref(), options).map(|_| ()),
        Commands::Paste { dir, no_matches, dry_run } => {
            let dir = dir.unwrap_or_else(|| PathBuf::from("."));
            // フォルダ指定時は、そのフォルダの no_matches.txt を既定にする
            let no_matches = no_matches.or_else(|| {
                (std::env::var_os(crate::config::NO_MATCHES_ENV).is_none()
                    && config.no_matches_path.is_none())
                .then(|| dir.join(NO_MATCHES_FILE))
            });
            cmd_paste(&dir, no_matches.as_deref(), dry_run, &config, options)
        }
        Commands::Config { set_no_matches, default_strip_views, show } => {
            cmd_config(&mut config, set_no_matches, default_strip_views, show)
        }
    }
}

pub struct RunArgs<'a> {
    pub html: Option<&'a Path>,
    pub input: Option<&'a Path>,
    pub no_matches: Option<&'a Path>,
    pub dry_run: bool,
    pub json: bool,
}

/// 抽出からGROUPEDまでをメモリ上で行い、ドライランか対話貼り付けへ
pub fn cmd_run(args: RunArgs<'_>, config: &Config, options: NormalizeOptions) -> Result<()> {
    if !args.json {
        println!("🍽 menu-pipeline - 抽出・貼り付け\n");
    }

    let mut pipeline = match (args.html, args.input) {
        (Some(html), _) => {
            if !args.json {
                println!("[1/2] HTMLを解析中...");
            }
            Pipeline::from_html(&files::read_text(html)?, options)?
        }
        (None, Some(input)) => {
            if !args.json {
                println!("[1/2] {} を読み込み中...", input.display());
            }
            Pipeline::from_raw_lines(files::read_lines(input)?, options)?
        }
        (None, None) => {
            return Err(PipelineError::MissingInput("--html または --input".into()));
        }
    };

    if !args.json {
        print_pipeline_summary(&pipeline);
    }

    if args.dry_run {
        let report = pipeline.dry_run()?;
        print_dry_run(&report, args.json)?;
        pipeline.finish();
        return Ok(());
    }

    println!("[2/2] 対話貼り付け");
    run_interactive(pipeline, config, &config.resolve_no_matches(args.no_matches))
}

/// HTMLから名前を抽出して names.txt に書き出す
pub fn cmd_parse(html: &Path, out: Option<&Path>) -> Result<PathBuf> {
    println!("📄 menu-pipeline - 抽出\n");

    let out = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| sibling(html, NAMES_FILE));

    println!("[1/2] HTMLを解析中...");
    let mut pipeline = Pipeline::new(NormalizeOptions::default());
    pipeline.extract(&files::read_text(html)?)?;
    let names: Vec<&str> = pipeline.candidates().iter().map(|c| c.text.as_str()).collect();
    println!("✔ {}件の名前を抽出", names.len());
    print_skip_count(&pipeline);

    println!("[2/2] 書き出し中...");
    files::write_lines(&out, &names)?;
    println!("✔ 保存: {}", out.display());
    pipeline.finish();

    Ok(out)
}

/// names.txt を表示名ファイルとキーファイルに整形する
pub fn cmd_fix(
    input: Option<&Path>,
    out_display: Option<&Path>,
    out_keys: Option<&Path>,
    options: NormalizeOptions,
) -> Result<(PathBuf, PathBuf)> {
    println!("🔧 menu-pipeline - 整形\n");

    let input = input
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(NAMES_FILE));
    let out_display = out_display
        .map(Path::to_path_buf)
        .unwrap_or_else(|| sibling(&input, DISPLAY_FILE));
    let out_keys = out_keys
        .map(Path::to_path_buf)
        .unwrap_or_else(|| sibling(&input, KEYS_FILE));

    println!("[1/2] {} を正規化中...", input.display());
    let lines = files::read_lines(&input)?;
    if lines.is_empty() {
        return Err(PipelineError::EmptyInput(input.display().to_string()));
    }
    let mut pipeline = Pipeline::from_raw_lines(lines, options)?;
    print_pipeline_summary(&pipeline);

    println!("[2/2] 書き出し中...");
    let result = pipeline.result().cloned().unwrap_or_default();
    write_legacy_pair(&result, &out_display, &out_keys)?;
    pipeline.finish();

    Ok((out_display, out_keys))
}

/// parse + fix（メモリ上で続けて実行）
pub fn cmd_all(html: &Path, out_dir: Option<&Path>, options: NormalizeOptions) -> Result<PathBuf> {
    println!("📦 menu-pipeline - 抽出・整形\n");

    let out_dir = out_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    println!("[1/2] HTMLを解析中...");
    let mut pipeline = Pipeline::from_html(&files::read_text(html)?, options)?;
    print_pipeline_summary(&pipeline);

    println!("[2/2] 書き出し中...");
    let names: Vec<&str> = pipeline.candidates().iter().map(|c| c.text.as_str()).collect();
    files::write_lines(&out_dir.join(NAMES_FILE), &names)?;
    let result = pipeline.result().cloned().unwrap_or_default();
    write_legacy_pair(&result, &out_dir.join(DISPLAY_FILE), &out_dir.join(KEYS_FILE))?;
    pipeline.finish();

    Ok(out_dir)
}

/// 整形済みファイルから対話貼り付け（またはドライラン）
pub fn cmd_paste(
    dir: &Path,
    no_matches: Option<&Path>,
    dry_run: bool,
    config: &Config,
    options: NormalizeOptions,
) -> Result<()> {
    println!("📋 menu-pipeline - 貼り付け\n");

    println!("[1/2] {} を読み込み中...", dir.join(DISPLAY_FILE).display());
    let result = files::load_paste_files(dir, &options)?;
    println!("✔ {}件", result.len());
    let mut pipeline = Pipeline::from_grouped(result, options);

    if dry_run {
        let report = pipeline.dry_run()?;
        print_dry_run(&report, false)?;
        pipeline.finish();
        return Ok(());
    }

    println!("[2/2] 対話貼り付け");
    run_interactive(pipeline, config, &config.resolve_no_matches(no_matches))
}

pub fn cmd_config(
    config: &mut Config,
    set_no_matches: Option<PathBuf>,
    default_strip_views: Option<bool>,
    show: bool,
) -> Result<()> {
    let mut changed = false;

    if let Some(path) = set_no_matches {
        config.set_no_matches_path(path)?;
        println!("✔ no_matches の保存先を設定しました");
        changed = true;
    }

    if let Some(enabled) = default_strip_views {
        config.strip_view_suffixes = enabled;
        config.save()?;
        println!(
            "✔ アングル語の除去を{}にしました",
            if enabled { "有効" } else { "無効" }
        );
        changed = true;
    }

    if show || !changed {
        println!("設定ファイル: {}", Config::config_path()?.display());
        println!("{}", serde_json::to_string_pretty(config)?);
        println!("no_matches: {}", config.resolve_no_matches(None).display());
    }

    Ok(())
}

fn run_interactive(pipeline: Pipeline, config: &Config, no_matches: &Path) -> Result<()> {
    let total = pipeline.result().map(PipelineResult::len).unwrap_or(0);
    if total == 0 {
        println!("⚠ 貼り付ける項目がありません");
        return Ok(());
    }

    let sink = DesktopPaster::new(config)?;
    let log = NoMatchFile::new(no_matches);
    let mut session = pipeline.into_session(sink, log)?;

    println!("no_matches: {}", no_matches.display());
    print_instructions(total);

    let events = hotkeys::spawn_listener()?;
    let summary = run_session_loop(&mut session, events)?;
    debug!("{:?}", summary);

    println!(
        "\n✅ 終了: 貼り付け {}件 / 記録 {}件",
        summary.pasted, summary.logged
    );
    if summary.log_errors > 0 {
        eprintln!("⚠ 記録に失敗: {}件", summary.log_errors);
    }
    Ok(())
}

fn write_legacy_pair(result: &PipelineResult, display_path: &Path, keys_path: &Path) -> Result<()> {
    files::write_lines(display_path, &result.display_names())?;
    files::write_lines(keys_path, &result.base_keys())?;
    println!("✔ 表示名: {}", display_path.display());
    println!("✔ キー: {}", keys_path.display());
    Ok(())
}

fn print_pipeline_summary(pipeline: &Pipeline) {
    let groups = pipeline.result().map(PipelineResult::len).unwrap_or(0);
    println!(
        "✔ {}件の候補 → {}グループ",
        pipeline.candidates().len(),
        groups
    );
    print_skip_count(pipeline);
    println!();
}

fn print_skip_count(pipeline: &Pipeline) {
    let skips = pipeline.skips();
    if !skips.is_empty() {
        println!("- スキップ: {}件（-v で詳細）", skips.len());
        for skip in skips {
            debug!("{}", skip);
        }
    }
}

fn print_dry_run(report: &DryRunReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("ドライラン（キー入力なし）:");
    for action in &report.actions {
        println!(
            "[dry {}/{}] 表示名='{}' | クリップボード='{}'",
            action.position, action.total, action.display_name, action.base_key
        );
    }
    println!("\n✅ {}件", report.actions.len());
    Ok(())
}

/// 同じフォルダの別ファイル
fn sibling(path: &Path, name: &str) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(name),
        _ => PathBuf::from(name),
    }
}
