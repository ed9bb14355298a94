//! 表示用の整形
//!
//! - 信頼度: 小数1桁 + "%"
//! - 重量: グラムは小数1桁、kgは小数3桁
//! - 価格: 小数2桁

use crate::cart::Cart;
use crate::result::ranked_candidates;
use crate::types::CurrentResult;

pub fn format_confidence(confidence: f64) -> String {
    format!("{:.1}%", confidence)
}

pub fn format_grams(grams: f64) -> String {
    format!("{:.1}", grams)
}

pub fn format_kg(kg: f64) -> String {
    format!("{:.3}", kg)
}

pub fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}

/// 候補パネルの1行
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateLine {
    /// 1始まり
    pub rank: usize,
    pub label: String,
    pub confidence: String,
}

/// 結果パネル
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub product_name: String,
    pub product_english: String,
    pub confidence: String,
    /// プログレスバー幅（0-100）
    pub confidence_width: f64,
    pub candidates: Vec<CandidateLine>,
    pub weight_grams: String,
    pub weight_kg: String,
    pub weight_note: String,
    pub price_per_kg: String,
    pub total_price: String,
}

impl ResultView {
    pub fn new(result: &CurrentResult) -> Self {
        let classification = &result.classification;

        let candidates = ranked_candidates(classification)
            .into_iter()
            .enumerate()
            .map(|(i, alt)| CandidateLine {
                rank: i + 1,
                label: alt.label,
                confidence: format_confidence(alt.confidence),
            })
            .collect();

        Self {
            product_name: result.price.product_name_polish.clone(),
            product_english: classification.product.clone(),
            confidence: format_confidence(classification.confidence),
            confidence_width: classification.confidence.clamp(0.0, 100.0),
            candidates,
            weight_grams: format_grams(result.weight.weight_grams),
            weight_kg: format_kg(result.weight.weight_kg),
            weight_note: result.weight.note.clone().unwrap_or_default(),
            price_per_kg: format_price(result.price.price_per_kg),
            total_price: format_price(result.price.total_price),
        }
    }
}

/// カートの1行
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// 0始まり（削除に使う）
    pub index: usize,
    pub name: String,
    /// "0.182 kg × 4.50 PLN/kg"
    pub details: String,
    /// "0.82 PLN"
    pub price: String,
}

/// カートパネル
#[derive(Debug, Clone, PartialEq)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub count: String,
    pub total: String,
    pub checkout_enabled: bool,
    pub clear_visible: bool,
}

impl CartView {
    pub fn new(cart: &Cart, currency: &str) -> Self {
        let lines = cart
            .items()
            .iter()
            .enumerate()
            .map(|(index, item)| CartLine {
                index,
                name: item.name.clone(),
                details: format!(
                    "{} kg × {} {}/kg",
                    format_kg(item.weight_kg),
                    format_price(item.price_per_kg),
                    currency
                ),
                price: format!("{} {}", format_price(item.total_price), currency),
            })
            .collect();

        Self {
            lines,
            count: cart.len().to_string(),
            total: format!("{} {}", format_price(cart.total()), currency),
            checkout_enabled: cart.can_checkout(),
            clear_visible: !cart.is_empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
