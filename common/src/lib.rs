//! Shop Scale Common Library
//!
//! キオスク本体（CLI/端末UI）から切り離した純粋な状態遷移ロジック:
//! - types: バックエンドとやり取りするデータ型
//! - result: 認識結果の候補整形と手動補正
//! - cart: ショッピングカート
//! - view: 表示用の整形（小数桁・通貨）

pub mod types;
pub mod result;
pub mod cart;
pub mod view;
pub mod error;

pub use types::{
    Alternative, CartItem, Classification, CurrentResult, PriceQuote, Product, ProductDetails,
    Transaction, TransactionRecord, WeightEstimate,
};
pub use result::{carried_weight, corrected_result, ranked_candidates, Correction};
pub use cart::{Cart, CheckoutSummary, IdGenerator};
pub use view::{CartLine, CartView, CandidateLine, ResultView};
pub use error::{Error, Result};

/// 表示する候補の最大数（1位 + 代替候補）
pub const MAX_CANDIDATES: usize = 5;

/// 人が確定した結果の信頼度
pub const MANUAL_CONFIDENCE: f64 = 100.0;

/// 現在の重量が無いときに使う重量（グラム）
pub const DEFAULT_WEIGHT_GRAMS: f64 = 150.0;

/// デフォルト通貨
pub const DEFAULT_CURRENCY: &str = "PLN";
