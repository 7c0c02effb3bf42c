use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("リストファイルが見つかりません（候補: {0}）")]
    ListNotFound(String),

    #[error("リストを認識できませんでした（0件）: {0}")]
    UnrecognizedList(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] mokeke_common::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
