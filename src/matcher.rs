//! アレルゲン照合モジュール
//!
//! 検出ラベルとユーザー設定の突き合わせ。安全側に倒すため
//! 意図的に緩い部分一致（偽陰性より偽陽性を許容する）。

use crate::types::UserAllergen;

/// 検出ラベルがユーザーアレルゲンに該当するか判定
///
/// 1. 双方を小文字化
/// 2. どちらかがもう一方を部分文字列として含めばマッチ
/// 3. 双方が "nut" を含む場合もマッチ
///    （"Tree Nuts" と "Peanuts" のように互いを含まない組を拾う）
pub fn is_dangerous(scanned_label: &str, allergen: &UserAllergen) -> bool {
    let label = scanned_label.to_lowercase();
    let name = allergen.name.to_lowercase();

    // 空文字はcontainsが常にtrueになるため先に弾く
    if label.is_empty() || name.is_empty() {
        return false;
    }

    if label.contains(&name) || name.contains(&label) {
        return true;
    }

    label.contains("nut") && name.contains("nut")
}

/// 有効なユーザーアレルゲンのいずれかに該当するラベルを抽出
///
/// 元の並び順を保持し、重複除去はしない。
pub fn filter_dangerous(scanned: &[String], allergens: &[UserAllergen]) -> Vec<String> {
    scanned
        .iter()
        .filter(|label| {
            allergens
                .iter()
                .filter(|a| a.enabled)
                .any(|a| is_dangerous(label, a))
        })
        .cloned()
        .collect()
}
