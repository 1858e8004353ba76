use thiserror::Error;

#[derive(Error, Debug)]
pub enum FoodScanError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ストレージ読み込みエラー: {0}")]
    StorageRead(String),

    #[error("ストレージ書き込みエラー: {0}")]
    StorageWrite(String),

    #[error("不正な引数: {0}")]
    InvalidArgument(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("解析結果が不正: {0}")]
    Classification(String),

    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, FoodScanError>;
