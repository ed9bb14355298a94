//! キオスクのセッション状態
//!
//! 現在の結果・カート・カメラを1つのオブジェクトが所有する。
//! 操作はすべて `&mut self` で行うため、リクエスト中に別の操作が割り込むことはない。
//! 失敗した操作は以前の状態を変えない。

use crate::capture::{CaptureController, CapturedImage, DisplayState};
use crate::client::ScaleBackend;
use crate::config::Config;
use crate::error::{Result, ShopScaleError};
use crate::ledger::LedgerHandle;
use shop_scale_common::{
    carried_weight, corrected_result, Cart, CartItem, CartView, CheckoutSummary, Correction,
    CurrentResult, Product, ResultView,
};
use std::path::Path;

pub struct KioskSession<B: ScaleBackend> {
    backend: B,
    capture: CaptureController,
    ledger: LedgerHandle,
    current: Option<CurrentResult>,
    cart: Cart,
    catalog: Vec<Product>,
    default_weight_grams: f64,
    currency: String,
}

impl<B: ScaleBackend> KioskSession<B> {
    pub fn new(backend: B, capture: CaptureController, ledger: LedgerHandle, config: &Config) -> Self {
        Self {
            backend,
            capture,
            ledger,
            current: None,
            cart: Cart::new(),
            catalog: Vec::new(),
            default_weight_grams: config.default_weight_grams,
            currency: config.currency.clone(),
        }
    }

    /// 手動補正用のカタログを読み込む
    pub async fn load_catalog(&mut self) -> Result<&[Product]> {
        self.catalog = self.backend.products().await?;
        tracing::info!(count = self.catalog.len(), "product catalog loaded");
        Ok(&self.catalog)
    }

    pub fn start_camera(&mut self) -> Result<()> {
        self.capture.start()
    }

    /// 撮影して分類
    pub async fn capture_and_classify(&mut self) -> Result<&CurrentResult> {
        let image = self.capture.capture()?;
        self.classify(image).await
    }

    /// ファイルを読み込んで分類
    pub async fn upload_and_classify(&mut self, path: &Path) -> Result<&CurrentResult> {
        let image = self.capture.upload_file(path)?;
        self.classify(image).await
    }

    /// 画像を送って現在の結果を置き換える（失敗時は何も変えない）
    pub async fn classify(&mut self, image: CapturedImage) -> Result<&CurrentResult> {
        let result = self.backend.predict(&image).await?;
        tracing::info!(
            product = %result.classification.product,
            confidence = result.classification.confidence,
            "classification received"
        );
        Ok(&*self.current.insert(result))
    }

    /// 結果を捨ててカメラを再起動
    pub fn retake(&mut self) -> Result<()> {
        self.current = None;
        self.capture.start()
    }

    /// カタログから選んだ商品で補正
    pub async fn manual_correct(&mut self, product: &str) -> Result<&CurrentResult> {
        let product = product.trim();
        if product.is_empty() {
            return Err(ShopScaleError::Validation("Wybierz produkt z listy".into()));
        }
        if !self.catalog.is_empty() && !self.catalog.iter().any(|p| p.name == product) {
            return Err(ShopScaleError::Validation(format!("Nieznany produkt: {}", product)));
        }

        self.correct(Correction::Manual, product).await
    }

    /// 代替候補を選んで補正
    pub async fn select_alternative(&mut self, label: &str) -> Result<&CurrentResult> {
        if label.trim().is_empty() {
            return Err(ShopScaleError::Validation("Wybierz produkt z listy".into()));
        }
        self.correct(Correction::Alternative, label.trim()).await
    }

    async fn correct(&mut self, kind: Correction, product: &str) -> Result<&CurrentResult> {
        let details = self.backend.product(product).await?;
        tracing::debug!(product, typical_weight_g = ?details.typical_weight_g, "product details");

        let weight_grams = carried_weight(self.current.as_ref(), self.default_weight_grams);
        let price = self.backend.calculate_price(product, weight_grams).await?;

        let result = corrected_result(kind, product, weight_grams, price, self.current.as_ref());
        tracing::info!(product, weight_grams, ?kind, "result corrected");
        Ok(&*self.current.insert(result))
    }

    /// 現在の結果をカートへ。取引記録は待たずに送る
    pub fn add_to_cart(&mut self) -> Result<CartItem> {
        let item = self.cart.add(self.current.as_ref())?.clone();
        self.ledger.record(item.to_record());
        tracing::info!(id = item.id, name = %item.name, total = item.total_price, "added to cart");
        Ok(item)
    }

    pub fn remove_from_cart(&mut self, index: usize) -> Result<CartItem> {
        Ok(self.cart.remove(index)?)
    }

    /// 確認が取れたらカートを空にする
    pub fn clear_cart<F>(&mut self, confirm: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        self.cart.clear_with(confirm)
    }

    /// 会計（デモ: 実際の決済は無い）
    pub fn checkout(&mut self) -> Result<CheckoutSummary> {
        let summary = self.cart.checkout()?;
        tracing::info!(items = summary.item_count, total = summary.total, "checkout");
        Ok(summary)
    }

    pub fn current(&self) -> Option<&CurrentResult> {
        self.current.as_ref()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn display(&self) -> &DisplayState {
        self.capture.display()
    }

    pub fn is_streaming(&self) -> bool {
        self.capture.is_streaming()
    }

    pub fn result_view(&self) -> Option<ResultView> {
        self.current.as_ref().map(ResultView::new)
    }

    pub fn cart_view(&self) -> CartView {
        CartView::new(&self.cart, &self.currency)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
