use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "menu-pipeline")]
#[command(about = "メディアライブラリHTMLの料理名抽出・貼り付けツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 末尾のアングル語（Top, Side など）も除去
    #[arg(long, global = true)]
    pub strip_views: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 抽出・正規化・貼り付けをメモリ上で一括実行（no_matches.txt のみ書き込む）
    Run {
        /// メディアライブラリHTML
        #[arg(long, required_unless_present = "input", conflicts_with = "input")]
        html: Option<PathBuf>,

        /// HTMLの代わりに names.txt を使う
        #[arg(long)]
        input: Option<PathBuf>,

        /// no_matches.txt のパス
        #[arg(long)]
        no_matches: Option<PathBuf>,

        /// キー入力せず予定だけ表示
        #[arg(long)]
        dry_run: bool,

        /// ドライランの予定をJSONで出力
        #[arg(long, requires = "dry_run")]
        json: bool,
    },

    /// HTMLから名前を抽出して names.txt に書き出す
    Parse {
        /// メディアライブラリHTML
        #[arg(long, required = true)]
        html: PathBuf,

        /// 出力ファイル（デフォルト: HTMLと同じフォルダの names.txt）
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// names.txt を表示名ファイルとキーファイルに整形
    Fix {
        /// 入力ファイル（デフォルト: ./names.txt）
        #[arg(long)]
        input: Option<PathBuf>,

        /// 表示名の出力先（デフォルト: 入力と同じフォルダの dish_names.txt）
        #[arg(long)]
        out_display: Option<PathBuf>,

        /// キーの出力先（デフォルト: 入力と同じフォルダの dish_names2.txt）
        #[arg(long)]
        out_keys: Option<PathBuf>,
    },

    /// parse + fix を一度に実行
    All {
        /// メディアライブラリHTML
        #[arg(long, required = true)]
        html: PathBuf,

        /// 出力フォルダ（デフォルト: カレント）
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// ファイルから読み込んで対話貼り付け
    Paste {
        /// dish_names.txt / dish_names2.txt のあるフォルダ（デフォルト: カレント）
        #[arg(long)]
        dir: Option<PathBuf>,

        /// no_matches.txt のパス（デフォルト: フォルダ内の no_matches.txt）
        #[arg(long)]
        no_matches: Option<PathBuf>,

        /// キー入力せず予定だけ表示
        #[arg(long)]
        dry_run: bool,
    },

    /// 設定を表示/編集
    Config {
        /// no_matches.txt の既定パスを設定
        #[arg(long)]
        set_no_matches: Option<PathBuf>,

        /// アングル語の除去を既定で有効/無効にする
        #[arg(long)]
        default_strip_views: Option<bool>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
