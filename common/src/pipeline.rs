//! パイプラインの状態遷移
//!
//! ```text
//! IDLE → EXTRACTED → NORMALIZED → GROUPED → {DRY_RUN_REPORTED | INTERACTIVE_ACTIVE} → DONE
//! ```
//!
//! 順序外の遷移は `InvalidTransition` で拒否する。

use crate::error::{Error, Result, Skip};
use crate::extractor::{file_name_base, Extractor};
use crate::grouper::group_entries;
use crate::normalizer::{normalize_all, NormalizeOptions};
use crate::session::{NoMatchLog, PasteSink, Session};
use crate::types::{NormalizedEntry, PipelineResult, RawCandidate};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// パイプラインの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    Idle,
    Extracted,
    Normalized,
    Grouped,
    DryRunReported,
    InteractiveActive,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "IDLE",
            PipelineState::Extracted => "EXTRACTED",
            PipelineState::Normalized => "NORMALIZED",
            PipelineState::Grouped => "GROUPED",
            PipelineState::DryRunReported => "DRY_RUN_REPORTED",
            PipelineState::InteractiveActive => "INTERACTIVE_ACTIVE",
            PipelineState::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// ドライランで予定される1操作
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedAction {
    /// 1始まりの位置
    pub position: usize,
    pub total: usize,
    pub display_name: String,
    pub base_key: String,
}

/// ドライランの結果（副作用なし）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DryRunReport {
    pub actions: Vec<PlannedAction>,
}

impl DryRunReport {
    pub fn from_result(result: &PipelineResult) -> Self {
        let total = result.len();
        let actions = result
            .iter()
            .enumerate()
            .map(|(i, group)| PlannedAction {
                position: i + 1,
                total,
                display_name: group.display_name().to_string(),
                base_key: group.base_key().to_string(),
            })
            .collect();
        Self { actions }
    }
}

/// 抽出 → 正規化 → グルーピングのオーケストレータ
#[derive(Debug)]
pub struct Pipeline {
    state: PipelineState,
    options: NormalizeOptions,
    candidates: Vec<RawCandidate>,
    entries: Vec<(RawCandidate, NormalizedEntry)>,
    result: Option<PipelineResult>,
    skips: Vec<Skip>,
}

impl Pipeline {
    pub fn new(options: NormalizeOptions) -> Self {
        Self {
            state: PipelineState::Idle,
            options,
            candidates: Vec::new(),
            entries: Vec::new(),
            result: None,
            skips: Vec::new(),
        }
    }

    /// グルーピング済みの結果から始める（ディスクからの再生用）
    pub fn from_grouped(result: PipelineResult, options: NormalizeOptions) -> Self {
        Self {
            state: PipelineState::Grouped,
            result: Some(result),
            ..Self::new(options)
        }
    }

    /// HTMLからGROUPEDまで一気に進める
    pub fn from_html(html: &str, options: NormalizeOptions) -> Result<Self> {
        let mut pipeline = Self::new(options);
        pipeline.extract(html)?;
        pipeline.normalize()?;
        pipeline.group()?;
        Ok(pipeline)
    }

    /// 抽出済みの行（names.txt）からGROUPEDまで進める
    pub fn from_raw_lines<I, S>(lines: I, options: NormalizeOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pipeline = Self::new(options);
        pipeline.load_raw_lines(lines)?;
        pipeline.normalize()?;
        pipeline.group()?;
        Ok(pipeline)
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// 抽出された候補（正規化前）
    pub fn candidates(&self) -> &[RawCandidate] {
        &self.candidates
    }

    /// これまでに記録されたスキップ
    pub fn skips(&self) -> &[Skip] {
        &self.skips
    }

    pub fn result(&self) -> Option<&PipelineResult> {
        self.result.as_ref()
    }

    /// IDLE → EXTRACTED
    ///
    /// 空のHTMLは入力エラー（状態は変えない）。
    pub fn extract(&mut self, html: &str) -> Result<()> {
        self.expect(PipelineState::Idle, PipelineState::Extracted)?;
        if html.trim().is_empty() {
            return Err(Error::Input("HTMLが空です".into()));
        }

        let extractor = Extractor::parse(html);
        for item in extractor.candidates() {
            match item {
                Ok(candidate) => self.candidates.push(candidate),
                Err(skip) => {
                    debug!("{}", skip);
                    self.skips.push(skip);
                }
            }
        }

        self.state = PipelineState::Extracted;
        Ok(())
    }

    /// IDLE → EXTRACTED（names.txt の行から）
    ///
    /// 画像拡張子付きの行はファイル名として扱い、拡張子と連番を外す。
    pub fn load_raw_lines<I, S>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.expect(PipelineState::Idle, PipelineState::Extracted)?;
        self.candidates = lines
            .into_iter()
            .map(|line| candidate_from_line(line.as_ref()))
            .collect();
        self.state = PipelineState::Extracted;
        Ok(())
    }

    /// EXTRACTED → NORMALIZED
    pub fn normalize(&mut self) -> Result<()> {
        self.expect(PipelineState::Extracted, PipelineState::Normalized)?;
        let candidates = std::mem::take(&mut self.candidates);
        let (entries, skips) = normalize_all(candidates.iter().cloned(), &self.options);
        self.candidates = candidates;
        self.entries = entries;
        self.skips.extend(skips);
        self.state = PipelineState::Normalized;
        Ok(())
    }

    /// NORMALIZED → GROUPED
    pub fn group(&mut self) -> Result<&PipelineResult> {
        self.expect(PipelineState::Normalized, PipelineState::Grouped)?;
        let entries = std::mem::take(&mut self.entries);
        self.state = PipelineState::Grouped;
        Ok(&*self.result.insert(group_entries(entries)))
    }

    /// GROUPED → DRY_RUN_REPORTED
    pub fn dry_run(&mut self) -> Result<DryRunReport> {
        self.expect(PipelineState::Grouped, PipelineState::DryRunReported)?;
        let report = self
            .result
            .as_ref()
            .map(DryRunReport::from_result)
            .unwrap_or_default();
        self.state = PipelineState::DryRunReported;
        Ok(report)
    }

    /// GROUPED → INTERACTIVE_ACTIVE
    pub fn into_session<P, L>(mut self, sink: P, log: L) -> Result<Session<P, L>>
    where
        P: PasteSink,
        L: NoMatchLog,
    {
        self.expect(PipelineState::Grouped, PipelineState::InteractiveActive)?;
        let result = self.result.take().unwrap_or_default();
        Ok(Session::new(result, sink, log))
    }

    /// 任意の状態 → DONE
    pub fn finish(&mut self) {
        self.state = PipelineState::Done;
    }

    fn expect(&self, from: PipelineState, to: PipelineState) -> Result<()> {
        if self.state == from {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                from: self.state,
                to,
            })
        }
    }
}

/// names.txt の1行を候補にする
fn candidate_from_line(line: &str) -> RawCandidate {
    let trimmed = line.trim();
    match file_name_base(trimmed) {
        Some(stem) => RawCandidate::filename(stem),
        None => RawCandidate::title(trimmed),
    }
}
