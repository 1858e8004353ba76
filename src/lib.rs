//! food-scan コアライブラリ
//!
//! 食品写真をリモートの分類サービスへ送り、検出された
//! アレルゲンをユーザー設定と突き合わせるツールの中核:
//! 永続化（設定・履歴）と照合ロジック

pub mod catalog;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod matcher;
pub mod storage;
pub mod types;

pub use catalog::{AllergenDefinition, COMMON_ALLERGENS};
pub use classifier::Classifier;
pub use config::Config;
pub use error::{FoodScanError, Result};
pub use matcher::{filter_dangerous, is_dangerous};
pub use storage::history::{HistorySession, HistoryStore};
pub use storage::preferences::PreferenceStore;
pub use storage::KvStore;
pub use types::{ConfidenceLevel, FoodAnalysis, HistoryItem, UserAllergen};
