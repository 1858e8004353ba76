//! データモデル定義
//!
//! 元アプリがAsyncStorageに保存していたJSONとバイト互換を保つため、
//! すべてcamelCaseでシリアライズする:
//! - UserAllergen: ユーザーのアレルゲン設定（preferences キー）
//! - HistoryItem: スキャン履歴エントリ（history キー）
//! - FoodAnalysis: 分類サービスの解析結果（保存前の一時データ）

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// ユーザーのアレルゲン設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserAllergen {
    /// カタログのid、またはカスタム追加時の生成id
    pub id: String,
    pub name: String,
    /// 有効（ユーザーがこのアレルゲンに敏感）かどうか
    pub enabled: bool,
}

/// 分類サービスの確信度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// 大文字小文字を区別せずパース（"mid"はMediumの別表記）
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "mid" | "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Serialize for ConfidenceLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ConfidenceLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("不明な確信度: {}", value)))
    }
}

/// スキャン履歴エントリ
///
/// `allergens` は分類サービスが返したラベルそのまま
/// （ユーザーの有効アレルゲンでフィルタしない）。作成後は不変。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryItem {
    /// 作成時刻由来の一意なid（ミリ秒タイムスタンプ、単調増加）
    pub id: String,
    pub product_name: String,
    /// ISO-8601作成時刻
    pub date: String,
    /// 検出アレルゲンがゼロならtrue
    pub safe: bool,
    pub allergens: Vec<String>,
    pub ingredients: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_level: Option<ConfidenceLevel>,
}

/// 分類サービスの解析結果（履歴保存前の一時データ）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FoodAnalysis {
    pub food_name: String,
    pub allergens: Vec<String>,
    pub ingredients: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_level: Option<ConfidenceLevel>,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_allergen_default() {
        let allergen = UserAllergen::default();
        assert_eq!(allergen.id, "");
        assert!(!allergen.enabled);
    }

    #[test]
    fn test_user_allergen_roundtrip() {
        let original = UserAllergen {
            id: "milk".to_string(),
            name: "Milk".to_string(),
            enabled: true,
        };

        let json = serde_json::to_string(&original).expect("シリアライズ失敗");
        assert!(json.contains("\"id\":\"milk\""));
        assert!(json.contains("\"enabled\":true"));

        let restored: UserAllergen = serde_json::from_str(&json).expect("デシリアライズ失敗");
        assert_eq!(original, restored);
    }

    #[test]
    fn test_confidence_level_parse_case_insensitive() {
        assert_eq!(ConfidenceLevel::parse("High"), Some(ConfidenceLevel::High));
        assert_eq!(ConfidenceLevel::parse("MEDIUM"), Some(ConfidenceLevel::Medium));
        assert_eq!(ConfidenceLevel::parse("mid"), Some(ConfidenceLevel::Medium));
        assert_eq!(ConfidenceLevel::parse("low"), Some(ConfidenceLevel::Low));
        assert_eq!(ConfidenceLevel::parse("unknown"), None);
    }

    #[test]
    fn test_confidence_level_serialize_normalized() {
        // "mid"で読んでも書き出しは"medium"に正規化される
        let level: ConfidenceLevel = serde_json::from_str("\"mid\"").expect("デシリアライズ失敗");
        assert_eq!(level, ConfidenceLevel::Medium);
        assert_eq!(serde_json::to_string(&level).unwrap(), "\"medium\"");
    }

    #[test]
    fn test_history_item_serialize_camel_case() {
        let item = HistoryItem {
            id: "1700000000000".to_string(),
            product_name: "Pizza".to_string(),
            date: "2025-01-18T10:00:00.000Z".to_string(),
            safe: false,
            allergens: vec!["Wheat".to_string(), "Dairy".to_string()],
            ingredients: vec!["Pizza dough".to_string()],
            image_url: Some("file:///tmp/pizza.jpg".to_string()),
            confidence_level: Some(ConfidenceLevel::High),
        };

        let json = serde_json::to_string(&item).expect("シリアライズ失敗");
        assert!(json.contains("\"productName\":\"Pizza\""));
        assert!(json.contains("\"imageUrl\":\"file:///tmp/pizza.jpg\""));
        assert!(json.contains("\"confidenceLevel\":\"high\""));
    }

    #[test]
    fn test_history_item_deserialize_missing_optionals() {
        // 旧アプリ保存分にはimageUrl/confidenceLevelがない場合がある
        let json = r#"{
            "id": "1700000000000",
            "productName": "Salad",
            "date": "2025-01-18T10:00:00.000Z",
            "safe": true,
            "allergens": [],
            "ingredients": ["Lettuce", "Tomato"]
        }"#;

        let item: HistoryItem = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(item.product_name, "Salad");
        assert!(item.safe);
        assert!(item.image_url.is_none());
        assert!(item.confidence_level.is_none());
    }

    #[test]
    fn test_food_analysis_default() {
        let analysis = FoodAnalysis::default();
        assert_eq!(analysis.food_name, "");
        assert!(analysis.allergens.is_empty());
        assert!(analysis.warnings.is_empty());
        assert!(analysis.confidence_level.is_none());
    }

    #[test]
    fn test_food_analysis_roundtrip() {
        let original = FoodAnalysis {
            food_name: "Pad Thai".to_string(),
            allergens: vec!["Peanuts".to_string()],
            ingredients: vec!["Rice noodles".to_string(), "Peanuts".to_string()],
            image_url: None,
            confidence_level: Some(ConfidenceLevel::Medium),
            warnings: vec!["Contains common allergens".to_string()],
        };

        let json = serde_json::to_string(&original).expect("シリアライズ失敗");
        let restored: FoodAnalysis = serde_json::from_str(&json).expect("デシリアライズ失敗");
        assert_eq!(original, restored);
    }
}
