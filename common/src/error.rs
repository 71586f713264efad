//! エラー型定義

use crate::pipeline::PipelineState;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Invalid pipeline transition: {from} -> {to}")]
    InvalidTransition {
        from: PipelineState,
        to: PipelineState,
    },

    #[error("Paste sink error: {0}")]
    Sink(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

/// スキップが発生した段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipStage {
    Extraction,
    Normalization,
}

impl fmt::Display for SkipStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipStage::Extraction => write!(f, "抽出"),
            SkipStage::Normalization => write!(f, "正規化"),
        }
    }
}

/// 候補単位で捨てられた入力の記録
///
/// エラーではなく、パイプラインは処理を続ける。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skip {
    pub stage: SkipStage,
    pub input: String,
    pub reason: &'static str,
}

impl Skip {
    pub fn extraction(input: impl Into<String>, reason: &'static str) -> Self {
        Self {
            stage: SkipStage::Extraction,
            input: input.into(),
            reason,
        }
    }

    pub fn normalization(input: impl Into<String>, reason: &'static str) -> Self {
        Self {
            stage: SkipStage::Normalization,
            input: input.into(),
            reason,
        }
    }
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: '{}'", self.stage, self.reason, self.input)
    }
}
