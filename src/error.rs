use thiserror::Error;

#[derive(Error, Debug)]
pub enum FloorAssignError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("入力が不正です: {0}")]
    InvalidInput(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel読み込みエラー: {0}")]
    ExcelRead(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("対話入力エラー: {0}")]
    Interactive(String),

    #[error(transparent)]
    Common(#[from] floor_assign_common::Error),
}

pub type Result<T> = std::result::Result<T, FloorAssignError>;
