//! 永続化レイヤー
//!
//! 文字列キーのKey-Valueストアと、その上に載る2つのストア:
//! - [`preferences::PreferenceStore`]: アレルゲン設定（user_allergensキー）
//! - [`history::HistoryStore`]: スキャン履歴（scan_historyキー）
//!
//! 各キーは1回の書き込みで値全体を置き換える（last-write-wins、
//! キーをまたぐトランザクションはない）。

pub mod history;
pub mod preferences;

use crate::error::{FoodScanError, Result};
use std::path::PathBuf;

/// アレルゲン設定の保存キー
pub const USER_ALLERGENS_KEY: &str = "user_allergens";
/// スキャン履歴の保存キー
pub const SCAN_HISTORY_KEY: &str = "scan_history";

/// ファイルベースのKey-Valueストア
///
/// キーごとに `<root>/<key>.json` へ保存する。
#[derive(Debug, Clone)]
pub struct KvStore {
    root: PathBuf,
}

impl KvStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// デフォルトの保存先（~/.local/share/food-scan）で開く
    pub fn open_default() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| FoodScanError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(Self::new(home.join(".local").join("share").join("food-scan")))
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// キーの値を取得（未保存ならNone）
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.key_path(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FoodScanError::StorageRead(format!("{}: {}", key, e))),
        }
    }

    /// キーの値を置き換え
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| FoodScanError::StorageWrite(format!("{}: {}", key, e)))?;

        tokio::fs::write(self.key_path(key), value)
            .await
            .map_err(|e| FoodScanError::StorageWrite(format!("{}: {}", key, e)))
    }
}
