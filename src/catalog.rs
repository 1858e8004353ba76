//! アレルゲンカタログ
//!
//! コンパイル時に組み込まれる既知アレルゲン9種の定義。
//! 実行時に変更されることはない。

use crate::types::UserAllergen;

/// カタログエントリ
#[derive(Debug, Clone, Copy)]
pub struct AllergenDefinition {
    /// カタログ内で一意な短縮id
    pub id: &'static str,
    pub name: &'static str,
    /// 小文字の同義語（表記ゆれ用）
    pub aliases: &'static [&'static str],
}

/// 既知アレルゲン一覧（並び順も固定）
pub const COMMON_ALLERGENS: &[AllergenDefinition] = &[
    AllergenDefinition {
        id: "milk",
        name: "Milk",
        aliases: &["dairy", "lactose", "whey", "casein", "butter", "cream"],
    },
    AllergenDefinition {
        id: "egg",
        name: "Egg",
        aliases: &["eggs", "albumin", "mayonnaise", "meringue"],
    },
    AllergenDefinition {
        id: "peanut",
        name: "Peanut",
        aliases: &["peanuts", "arachis", "groundnut"],
    },
    AllergenDefinition {
        id: "soy",
        name: "Soy",
        aliases: &["soybeans", "soya", "tofu", "edamame"],
    },
    AllergenDefinition {
        id: "wheat",
        name: "Wheat",
        aliases: &["flour", "gluten", "semolina", "spelt", "durum"],
    },
    AllergenDefinition {
        id: "treenuts",
        name: "Tree Nuts",
        aliases: &["almonds", "cashews", "walnuts", "pecans", "pistachios", "macadamia"],
    },
    AllergenDefinition {
        id: "shellfish",
        name: "Shellfish",
        aliases: &["shrimp", "crab", "lobster", "crayfish", "prawn"],
    },
    AllergenDefinition {
        id: "fish",
        name: "Fish",
        aliases: &["salmon", "tuna", "cod", "tilapia", "halibut"],
    },
    AllergenDefinition {
        id: "sesame",
        name: "Sesame",
        aliases: &["sesame seeds", "tahini", "sesamol", "gingelly"],
    },
];

/// カタログからデフォルト設定を生成（すべてenabled=false）
pub fn default_preferences() -> Vec<UserAllergen> {
    COMMON_ALLERGENS
        .iter()
        .map(|def| UserAllergen {
            id: def.id.to_string(),
            name: def.name.to_string(),
            enabled: false,
        })
        .collect()
}
