//! アレルゲン設定ストア
//!
//! ユーザーの有効/無効アレルゲン選択をuser_allergensキーに
//! 単一のJSON配列として保存する。変更のたびに即時永続化（バッチなし）。

use crate::catalog;
use crate::error::{FoodScanError, Result};
use crate::types::UserAllergen;
use super::{KvStore, USER_ALLERGENS_KEY};
use chrono::Utc;

#[derive(Debug, Clone)]
pub struct PreferenceStore {
    store: KvStore,
}

impl PreferenceStore {
    pub fn new(store: KvStore) -> Self {
        Self { store }
    }

    /// 設定を読み込み
    ///
    /// デコード方針（旧フォーマット互換を含めて固定）:
    /// 1. 未保存 → カタログデフォルト（すべてenabled=false）
    /// 2. `common`/`custom`キーを持つオブジェクト → 旧フォーマットとみなし
    ///    カタログデフォルトを返す（旧enabled状態は破棄する。観測された挙動を維持）
    /// 3. 配列 → そのまま返す
    /// 4. パース失敗・想定外の形 → ログしてカタログデフォルト
    ///
    /// 失敗しても常に値を返す（読み込みエラーは呼び出し元に伝播しない）。
    pub async fn load(&self) -> Vec<UserAllergen> {
        let raw = match self.store.get(USER_ALLERGENS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return catalog::default_preferences(),
            Err(e) => {
                eprintln!("設定読み込みエラー、デフォルトを使用: {}", e);
                return catalog::default_preferences();
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("設定のパースに失敗、デフォルトを使用: {}", e);
                return catalog::default_preferences();
            }
        };

        if let serde_json::Value::Object(ref map) = value {
            if map.contains_key("common") || map.contains_key("custom") {
                // 旧フォーマット。enabled状態は引き継がない
                return catalog::default_preferences();
            }
        }

        if value.is_array() {
            match serde_json::from_value(value) {
                Ok(prefs) => return prefs,
                Err(e) => {
                    eprintln!("設定エントリのパースに失敗、デフォルトを使用: {}", e);
                    return catalog::default_preferences();
                }
            }
        }

        catalog::default_preferences()
    }

    /// 設定を保存（配列全体を1回の書き込みで置き換え）
    pub async fn save(&self, preferences: &[UserAllergen]) -> Result<()> {
        let json = serde_json::to_string(preferences)?;
        self.store.set(USER_ALLERGENS_KEY, &json).await
    }

    /// 指定indexのenabledを反転して保存
    ///
    /// 書き込み完了までトグルは確定しない。更新後の一覧を返す。
    pub async fn toggle(&self, index: usize) -> Result<Vec<UserAllergen>> {
        let mut preferences = self.load().await;

        if index >= preferences.len() {
            return Err(FoodScanError::InvalidArgument(format!(
                "index {} が範囲外（設定は{}件）",
                index,
                preferences.len()
            )));
        }

        preferences[index].enabled = !preferences[index].enabled;
        self.save(&preferences).await?;
        Ok(preferences)
    }

    /// カスタムアレルゲンを末尾に追加して保存（enabled=trueで作成）
    pub async fn add_custom(&self, name: &str) -> Result<Vec<UserAllergen>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FoodScanError::InvalidArgument(
                "アレルゲン名が空です".into(),
            ));
        }

        let mut preferences = self.load().await;
        preferences.push(UserAllergen {
            id: format!("custom-{}", Utc::now().timestamp_millis()),
            name: name.to_string(),
            enabled: true,
        });
        self.save(&preferences).await?;
        Ok(preferences)
    }
}
