//! データ型定義
//!
//! バックエンドAPIとキオスクで共有される型:
//! - Classification: 画像認識の結果（1位 + 代替候補）
//! - WeightEstimate / PriceQuote: 重量推定と価格
//! - CurrentResult: 現在スケールに載っている商品（上記3つの合成）
//! - CartItem: カートに確定した商品

use serde::{Deserialize, Serialize};

/// 代替候補（ラベルと信頼度）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub label: String,
    /// 0-100
    pub confidence: f64,
}

/// 画像認識結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub product: String,

    /// 0-100
    pub confidence: f64,

    /// バックエンドが返した順序のまま保持する（並べ替えない）
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

/// 重量推定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightEstimate {
    pub weight_grams: f64,
    pub weight_kg: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// 推定の確からしさ（"low" / "medium"）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
}

impl WeightEstimate {
    pub fn from_grams(weight_grams: f64, note: impl Into<String>) -> Self {
        Self {
            weight_grams,
            weight_kg: weight_grams / 1000.0,
            note: Some(note.into()),
            confidence: None,
        }
    }
}

/// 価格見積もり（商品名と重量から毎回再計算される）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub product_name_polish: String,
    pub price_per_kg: f64,
    pub total_price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// 現在の結果（`/predict` のレスポンスもこの形）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentResult {
    pub classification: Classification,
    pub weight: WeightEstimate,
    pub price: PriceQuote,
}

/// 商品カタログの1件（`/products`）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub name_polish: String,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub price_per_kg: Option<f64>,
}

impl Product {
    /// 選択ダイアログ用の表示名: "Jabłko (apple)"
    pub fn label(&self) -> String {
        format!("{} ({})", self.name_polish, self.name)
    }
}

/// 商品の詳細（`/product/{name}`）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub name: String,

    #[serde(default)]
    pub name_polish: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub price_per_kg: Option<f64>,

    /// 重量推定のヒント
    #[serde(default)]
    pub typical_weight_g: Option<f64>,
}

/// カートの商品（作成後は不変）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: u64,
    pub name: String,
    pub name_english: String,
    pub weight_grams: f64,
    pub weight_kg: f64,
    pub price_per_kg: f64,
    pub total_price: f64,
    pub confidence: f64,
}

impl CartItem {
    /// 現在の結果をコピーしてカート商品を作る
    pub fn from_result(id: u64, result: &CurrentResult) -> Self {
        let weight_grams = result.weight.weight_grams;
        Self {
            id,
            name: result.price.product_name_polish.clone(),
            name_english: result.classification.product.clone(),
            weight_grams,
            weight_kg: weight_grams / 1000.0,
            price_per_kg: result.price.price_per_kg,
            total_price: result.price.total_price,
            confidence: result.classification.confidence,
        }
    }

    /// `total_price == price_per_kg * weight_kg` を許容誤差内で満たすか
    pub fn is_priced_consistently(&self, tolerance: f64) -> bool {
        (self.price_per_kg * self.weight_kg - self.total_price).abs() <= tolerance
    }

    /// 取引記録用のペイロード
    pub fn to_record(&self) -> TransactionRecord {
        TransactionRecord {
            product_name: self.name_english.clone(),
            weight_g: self.weight_grams,
            price_per_kg: self.price_per_kg,
            total_price: self.total_price,
            confidence: self.confidence,
        }
    }
}

/// `/transaction` に送る取引記録
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub product_name: String,
    pub weight_g: f64,
    pub price_per_kg: f64,
    pub total_price: f64,
    pub confidence: f64,
}

/// 記録済みの取引（`/transactions`）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: i64,
    pub product_name: String,
    pub weight_g: f64,
    pub price_per_kg: f64,
    pub total_price: f64,

    #[serde(default)]
    pub confidence: Option<f64>,

    #[serde(default)]
    pub created_at: Option<String>,
}
