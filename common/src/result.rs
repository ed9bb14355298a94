//! 認識結果の整形と手動補正
//!
//! 補正（手動ダイアログ / 代替候補の選択）はどちらも新しい CurrentResult を作り、
//! 信頼度は常に 100 になる。

use crate::types::{Alternative, Classification, CurrentResult, PriceQuote, WeightEstimate};
use crate::{MANUAL_CONFIDENCE, MAX_CANDIDATES};

/// 補正の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// カタログから手動で選択
    Manual,
    /// 代替候補から選択
    Alternative,
}

impl Correction {
    /// 重量欄に表示する注記
    pub fn note(&self) -> &'static str {
        match self {
            Correction::Manual => "Ręcznie poprawione",
            Correction::Alternative => "Wybrano ręcznie z listy",
        }
    }
}

/// 1位 + 代替候補を受信順のまま最大5件並べる
///
/// 代替候補が無い場合は空（候補パネルを出さない）。
pub fn ranked_candidates(classification: &Classification) -> Vec<Alternative> {
    if classification.alternatives.is_empty() {
        return Vec::new();
    }

    std::iter::once(Alternative {
        label: classification.product.clone(),
        confidence: classification.confidence,
    })
    .chain(classification.alternatives.iter().cloned())
    .take(MAX_CANDIDATES)
    .collect()
}

/// 補正時に引き継ぐ重量
///
/// 現在の結果があればその重量、無ければ（または0以下なら）`fallback`。
pub fn carried_weight(current: Option<&CurrentResult>, fallback: f64) -> f64 {
    current
        .map(|r| r.weight.weight_grams)
        .filter(|&g| g > 0.0)
        .unwrap_or(fallback)
}

/// 補正後の結果を作る
///
/// 代替候補から選んだ場合は元の候補リストを残す。
pub fn corrected_result(
    kind: Correction,
    product: &str,
    weight_grams: f64,
    price: PriceQuote,
    previous: Option<&CurrentResult>,
) -> CurrentResult {
    let alternatives = match kind {
        Correction::Alternative => previous
            .map(|r| r.classification.alternatives.clone())
            .unwrap_or_default(),
        Correction::Manual => Vec::new(),
    };

    CurrentResult {
        classification: Classification {
            product: product.to_string(),
            confidence: MANUAL_CONFIDENCE,
            alternatives,
        },
        weight: WeightEstimate::from_grams(weight_grams, kind.note()),
        price,
    }
}
