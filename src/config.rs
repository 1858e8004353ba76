use crate::error::{FoodScanError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// デフォルトの分類エンドポイント
const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/identify";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 分類エンドポイントURL
    pub api_url: String,
    /// HTTPタイムアウト（秒）
    pub timeout_seconds: u64,
    /// Key-Valueストアの保存先（未設定なら ~/.local/share/food-scan）
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            timeout_seconds: 60,
            data_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| FoodScanError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("food-scan").join("config.json"))
    }

    /// エンドポイントURLを取得
    pub fn api_url(&self) -> String {
        // 環境変数を優先
        if let Ok(url) = std::env::var("FOOD_SCAN_API_URL") {
            if !url.trim().is_empty() {
                return url;
            }
        }
        self.api_url.clone()
    }

    pub fn set_api_url(&mut self, url: String) -> Result<()> {
        self.api_url = url;
        self.save()
    }
}
