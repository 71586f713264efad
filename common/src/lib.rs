//! Menu Pipeline Common Library
//!
//! メディアライブラリHTMLから貼り付け用の名前を作るコア処理。
//! OS入力（キー送信・クリップボード）には依存しない。

pub mod types;
pub mod error;
pub mod extractor;
pub mod normalizer;
pub mod grouper;
pub mod pipeline;
pub mod session;

pub use types::{BaseKey, CandidateSource, Group, NormalizedEntry, PipelineResult, RawCandidate, Variant};
pub use error::{Error, Result, Skip, SkipStage};
pub use extractor::{extract_candidates, file_name_base, filename_stem, split_image_extension, Extractor};
pub use normalizer::{normalize, normalize_all, NormalizeOptions};
pub use grouper::group_entries;
pub use pipeline::{DryRunReport, Pipeline, PipelineState, PlannedAction};
pub use session::{HotkeyEvent, MemoryNoMatchLog, NoMatchLog, PasteSink, Session, SessionEvent};
