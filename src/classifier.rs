//! 分類サービス連携モジュール
//!
//! 食品写真をbase64でリモートの分類エンドポイントへPOSTし、
//! 解析結果（食品名・アレルゲン候補・材料）を受け取る。
//! リトライはしない。失敗はそのまま呼び出し元へ伝播する。

use crate::config::Config;
use crate::error::{FoodScanError, Result};
use crate::types::{ConfidenceLevel, FoodAnalysis, UserAllergen};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Serialize)]
struct IdentifyRequest<'a> {
    image_data: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_allergens: Option<&'a [UserAllergen]>,
}

/// エンドポイントのレスポンス。欠けたフィールドはデフォルトで埋める
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IdentifyResponse {
    success: bool,
    food_name: Option<String>,
    potential_allergens: Option<Vec<String>>,
    likely_ingredients: Option<Vec<String>>,
    confidence_level: Option<String>,
    warnings: Option<Vec<String>>,
    error: Option<String>,
}

pub struct Classifier {
    client: reqwest::Client,
    api_url: String,
}

impl Classifier {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url(),
        })
    }

    /// 画像ファイルを読み込んで解析
    pub async fn classify_image(
        &self,
        image_path: &Path,
        user_allergens: Option<&[UserAllergen]>,
    ) -> Result<FoodAnalysis> {
        let bytes = tokio::fs::read(image_path).await.map_err(|e| {
            FoodScanError::Config(format!("画像を読み込めません {}: {}", image_path.display(), e))
        })?;
        let image_data = STANDARD.encode(&bytes);

        let mut analysis = self.classify_base64(&image_data, user_allergens).await?;
        analysis.image_url = Some(image_path.display().to_string());
        Ok(analysis)
    }

    /// base64エンコード済み画像データを解析
    pub async fn classify_base64(
        &self,
        image_data: &str,
        user_allergens: Option<&[UserAllergen]>,
    ) -> Result<FoodAnalysis> {
        let request = IdentifyRequest {
            image_data,
            user_allergens,
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| FoodScanError::ApiCall(format!("{}: {}", self.api_url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FoodScanError::ApiCall(format!(
                "status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        let parsed: IdentifyResponse = serde_json::from_str(&body)
            .map_err(|e| FoodScanError::Classification(format!("{}: {}", e, body)))?;

        into_analysis(parsed)
    }
}

/// レスポンスを解析結果へ変換
///
/// 欠けたフィールドは元アプリと同じデフォルトで埋める:
/// 食品名は"Unknown Food"、配列は空、確信度はlow。
fn into_analysis(response: IdentifyResponse) -> Result<FoodAnalysis> {
    if !response.success {
        return Err(FoodScanError::Classification(
            response.error.unwrap_or_else(|| "解析に失敗しました".into()),
        ));
    }

    let confidence_level = response
        .confidence_level
        .as_deref()
        .and_then(ConfidenceLevel::parse)
        .or(Some(ConfidenceLevel::Low));

    Ok(FoodAnalysis {
        food_name: response.food_name.unwrap_or_else(|| "Unknown Food".into()),
        allergens: response.potential_allergens.unwrap_or_default(),
        ingredients: response.likely_ingredients.unwrap_or_default(),
        image_url: None,
        confidence_level,
        warnings: response.warnings.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_analysis_full_response() {
        let response: IdentifyResponse = serde_json::from_str(
            r#"{
                "success": true,
                "food_name": "Pizza",
                "potential_allergens": ["Wheat", "Dairy"],
                "likely_ingredients": ["Pizza dough", "Mozzarella cheese"],
                "confidence_level": "high",
                "warnings": ["Contains common allergens: wheat and dairy"]
            }"#,
        )
        .expect("デシリアライズ失敗");

        let analysis = into_analysis(response).expect("変換失敗");
        assert_eq!(analysis.food_name, "Pizza");
        assert_eq!(analysis.allergens, vec!["Wheat", "Dairy"]);
        assert_eq!(analysis.confidence_level, Some(ConfidenceLevel::High));
        assert_eq!(analysis.warnings.len(), 1);
    }

    #[test]
    fn test_into_analysis_fills_defaults() {
        // 欠けたフィールドは元アプリと同じデフォルト
        let response: IdentifyResponse =
            serde_json::from_str(r#"{"success": true}"#).expect("デシリアライズ失敗");

        let analysis = into_analysis(response).expect("変換失敗");
        assert_eq!(analysis.food_name, "Unknown Food");
        assert!(analysis.allergens.is_empty());
        assert!(analysis.ingredients.is_empty());
        assert_eq!(analysis.confidence_level, Some(ConfidenceLevel::Low));
    }

    #[test]
    fn test_into_analysis_failure_uses_error_field() {
        let response: IdentifyResponse = serde_json::from_str(
            r#"{"success": false, "error": "No image data provided"}"#,
        )
        .expect("デシリアライズ失敗");

        let err = into_analysis(response).unwrap_err();
        assert!(matches!(err, FoodScanError::Classification(_)));
        assert!(format!("{}", err).contains("No image data provided"));
    }

    #[test]
    fn test_into_analysis_failure_without_error_field() {
        let response: IdentifyResponse =
            serde_json::from_str(r#"{"success": false}"#).expect("デシリアライズ失敗");

        let err = into_analysis(response).unwrap_err();
        assert!(matches!(err, FoodScanError::Classification(_)));
    }

    #[test]
    fn test_into_analysis_unknown_confidence_falls_back() {
        let response: IdentifyResponse = serde_json::from_str(
            r#"{"success": true, "food_name": "Soup", "confidence_level": "certain"}"#,
        )
        .expect("デシリアライズ失敗");

        let analysis = into_analysis(response).expect("変換失敗");
        assert_eq!(analysis.confidence_level, Some(ConfidenceLevel::Low));
    }

    #[test]
    fn test_identify_request_omits_allergens_when_none() {
        let request = IdentifyRequest {
            image_data: "aGVsbG8=",
            user_allergens: None,
        };
        let json = serde_json::to_string(&request).expect("シリアライズ失敗");
        assert!(!json.contains("user_allergens"));

        let allergens = vec![UserAllergen {
            id: "milk".into(),
            name: "Milk".into(),
            enabled: true,
        }];
        let request = IdentifyRequest {
            image_data: "aGVsbG8=",
            user_allergens: Some(&allergens),
        };
        let json = serde_json::to_string(&request).expect("シリアライズ失敗");
        assert!(json.contains("\"user_allergens\""));
        assert!(json.contains("\"name\":\"Milk\""));
    }
}
