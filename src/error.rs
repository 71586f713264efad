use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    InputNotFound(String),

    #[error("入力が空です: {0}")]
    EmptyInput(String),

    #[error("入力を指定してください: {0}")]
    MissingInput(String),

    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("貼り付けエラー: {0}")]
    Paste(String),

    #[error("ホットキーエラー: {0}")]
    Hotkey(String),

    #[error(transparent)]
    Common(#[from] menu_pipeline_common::Error),
}

impl PipelineError {
    /// 入力エラーは2、それ以外は1
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::InputNotFound(_)
            | PipelineError::EmptyInput(_)
            | PipelineError::MissingInput(_)
            | PipelineError::Common(menu_pipeline_common::Error::Input(_)) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
