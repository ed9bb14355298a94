//! キオスクセッションの統合テスト
//!
//! メモリ上の偽バックエンドと偽カメラで、撮影→分類→補正→カート→会計を検証

use image::DynamicImage;
use shop_scale::capture::{Camera, CaptureController, CapturedImage, DisplayState, ImageSource, VideoStream};
use shop_scale::client::ScaleBackend;
use shop_scale::config::{CameraSettings, Config};
use shop_scale::error::{Result, ShopScaleError};
use shop_scale::ledger::LedgerHandle;
use shop_scale::session::KioskSession;
use shop_scale_common::{
    Alternative, Classification, CurrentResult, PriceQuote, Product, ProductDetails, TransactionRecord,
    WeightEstimate,
};
use std::cell::RefCell;
use tempfile::tempdir;
use tokio::sync::mpsc::UnboundedReceiver;

/// 偽バックエンド
struct FakeBackend {
    prediction: RefCell<Option<CurrentResult>>,
    price_calls: RefCell<Vec<(String, f64)>>,
}

impl FakeBackend {
    fn new(prediction: CurrentResult) -> Self {
        Self {
            prediction: RefCell::new(Some(prediction)),
            price_calls: RefCell::new(Vec::new()),
        }
    }

    fn set_prediction(&self, prediction: Option<CurrentResult>) {
        *self.prediction.borrow_mut() = prediction;
    }

    fn price_per_kg(name: &str) -> f64 {
        match name {
            "apple" => 4.50,
            "pear" => 6.00,
            "banana" => 5.20,
            _ => 10.0,
        }
    }
}

impl ScaleBackend for FakeBackend {
    async fn predict(&self, _image: &CapturedImage) -> Result<CurrentResult> {
        self.prediction
            .borrow()
            .clone()
            .ok_or_else(|| ShopScaleError::Network("HTTP 500: Classification failed".into()))
    }

    async fn calculate_price(&self, product_name: &str, weight_grams: f64) -> Result<PriceQuote> {
        self.price_calls
            .borrow_mut()
            .push((product_name.to_string(), weight_grams));
        let per_kg = Self::price_per_kg(product_name);
        Ok(PriceQuote {
            product_name_polish: format!("PL-{}", product_name),
            price_per_kg: per_kg,
            total_price: (per_kg * weight_grams / 1000.0 * 100.0).round() / 100.0,
            currency: Some("PLN".into()),
        })
    }

    async fn product(&self, name: &str) -> Result<ProductDetails> {
        Ok(ProductDetails {
            name: name.to_string(),
            typical_weight_g: Some(180.0),
            ..Default::default()
        })
    }

    async fn products(&self) -> Result<Vec<Product>> {
        Ok(["apple", "banana", "pear"]
            .iter()
            .map(|name| Product {
                name: name.to_string(),
                name_polish: format!("PL-{}", name),
                category: Some("fruit".into()),
                price_per_kg: Some(Self::price_per_kg(name)),
            })
            .collect())
    }
}

struct FakeStream {
    active: bool,
}

impl VideoStream for FakeStream {
    fn snapshot(&mut self) -> Result<DynamicImage> {
        Ok(DynamicImage::new_rgb8(16, 9))
    }

    fn stop(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

struct FakeCamera {
    available: bool,
}

impl Camera for FakeCamera {
    fn open(&self, _settings: &CameraSettings) -> Result<Box<dyn VideoStream>> {
        if self.available {
            Ok(Box::new(FakeStream { active: true }))
        } else {
            Err(ShopScaleError::Device("Permission denied".into()))
        }
    }
}

fn apple_prediction() -> CurrentResult {
    CurrentResult {
        classification: Classification {
            product: "apple".into(),
            confidence: 87.3,
            alternatives: vec![Alternative { label: "pear".into(), confidence: 9.1 }],
        },
        weight: WeightEstimate {
            weight_grams: 182.4,
            weight_kg: 0.182,
            note: Some("Estimated based on typical apple weight".into()),
            confidence: Some("medium".into()),
        },
        price: PriceQuote {
            product_name_polish: "Jabłko".into(),
            price_per_kg: 4.50,
            total_price: 0.82,
            currency: Some("PLN".into()),
        },
    }
}

fn priced(total: f64) -> CurrentResult {
    let mut result = apple_prediction();
    result.price.total_price = total;
    result
}

fn session_with(
    prediction: Option<CurrentResult>,
    camera_available: bool,
) -> (KioskSession<FakeBackend>, UnboundedReceiver<TransactionRecord>) {
    let backend = FakeBackend::new(apple_prediction());
    backend.set_prediction(prediction);
    let capture = CaptureController::new(
        Box::new(FakeCamera { available: camera_available }),
        CameraSettings::default(),
    );
    let (ledger, rx) = LedgerHandle::channel();
    (KioskSession::new(backend, capture, ledger, &Config::default()), rx)
}

fn jpeg_image() -> CapturedImage {
    CapturedImage {
        bytes: vec![0xff, 0xd8, 0xff, 0xe0],
        mime: "image/jpeg".into(),
        source: ImageSource::Camera,
    }
}

/// 分類結果の表示（信頼度・重量・価格の桁）
#[tokio::test]
async fn test_classification_display() {
    let (mut session, _rx) = session_with(Some(apple_prediction()), true);

    session.classify(jpeg_image()).await.expect("分類失敗");
    let view = session.result_view().expect("結果がない");

    assert_eq!(view.product_name, "Jabłko");
    assert_eq!(view.product_english, "apple");
    assert_eq!(view.confidence, "87.3%");
    assert_eq!(view.weight_grams, "182.4");
    assert_eq!(view.weight_kg, "0.182");
    assert_eq!(view.total_price, "0.82");
    assert_eq!(view.candidates[0].label, "apple");
    assert_eq!(view.candidates[1].label, "pear");
}

/// 分類失敗時は以前の結果を残す
#[tokio::test]
async fn test_failed_classification_keeps_previous_result() {
    let (mut session, _rx) = session_with(Some(apple_prediction()), true);
    session.classify(jpeg_image()).await.unwrap();

    session.backend().set_prediction(None);
    let err = session.classify(jpeg_image()).await.unwrap_err();

    assert!(matches!(err, ShopScaleError::Network(_)));
    assert_eq!(session.current(), Some(&apple_prediction()));
}

/// 結果が無い状態で代替候補を選ぶと150gで価格を再取得する
#[tokio::test]
async fn test_alternative_without_weight_defaults_to_150g() {
    let (mut session, _rx) = session_with(None, true);

    let result = session.select_alternative("pear").await.expect("選択失敗");
    assert_eq!(result.classification.product, "pear");
    assert_eq!(result.classification.confidence, 100.0);
    assert_eq!(result.weight.weight_grams, 150.0);

    let calls = session.backend().price_calls.borrow().clone();
    assert_eq!(calls, vec![("pear".to_string(), 150.0)]);
}

/// 代替候補の選択は候補リストを残し、重量を引き継ぐ
#[tokio::test]
async fn test_alternative_selection_keeps_ranking() {
    let (mut session, _rx) = session_with(Some(apple_prediction()), true);
    session.classify(jpeg_image()).await.unwrap();

    let result = session.select_alternative("pear").await.unwrap();
    assert_eq!(result.classification.confidence, 100.0);
    assert_eq!(result.weight.weight_grams, 182.4);
    assert_eq!(result.classification.alternatives, apple_prediction().classification.alternatives);
    assert_eq!(result.price.price_per_kg, 6.0);
    assert_eq!(result.price.total_price, 1.09);
}

/// 手動補正: 信頼度100、重量は引き継ぎ
#[tokio::test]
async fn test_manual_correction() {
    let (mut session, _rx) = session_with(Some(apple_prediction()), true);
    session.load_catalog().await.unwrap();
    session.classify(jpeg_image()).await.unwrap();

    let result = session.manual_correct("banana").await.unwrap();
    assert_eq!(result.classification.product, "banana");
    assert_eq!(result.classification.confidence, 100.0);
    assert_eq!(result.weight.weight_grams, 182.4);
    assert_eq!(result.weight.note.as_deref(), Some("Ręcznie poprawione"));
}

/// 手動補正: 未選択・カタログ外は入力エラー
#[tokio::test]
async fn test_manual_correction_validation() {
    let (mut session, _rx) = session_with(None, true);
    session.load_catalog().await.unwrap();

    assert!(matches!(session.manual_correct("  ").await, Err(ShopScaleError::Validation(_))));
    assert!(matches!(session.manual_correct("durian").await, Err(ShopScaleError::Validation(_))));
    assert!(session.current().is_none());
    assert!(session.backend().price_calls.borrow().is_empty());
}

/// 手動補正（結果なし）は150g
#[tokio::test]
async fn test_manual_correction_without_result() {
    let (mut session, _rx) = session_with(None, true);

    let result = session.manual_correct("apple").await.unwrap();
    assert_eq!(result.weight.weight_grams, 150.0);
    assert_eq!(result.weight.weight_kg, 0.15);
}

/// 結果が無いとカートに追加できない
#[tokio::test]
async fn test_add_without_result() {
    let (mut session, mut rx) = session_with(None, true);

    assert!(matches!(session.add_to_cart(), Err(ShopScaleError::State(_))));
    assert!(session.cart().is_empty());
    assert!(rx.try_recv().is_err());
}

/// カート追加で取引記録がキューに入る
#[tokio::test]
async fn test_add_records_transaction() {
    let (mut session, mut rx) = session_with(Some(apple_prediction()), true);
    session.classify(jpeg_image()).await.unwrap();

    let item = session.add_to_cart().unwrap();
    assert_eq!(item.name, "Jabłko");
    assert_eq!(item.name_english, "apple");

    let record = rx.recv().await.expect("記録がない");
    assert_eq!(record.product_name, "apple");
    assert_eq!(record.weight_g, 182.4);
    assert_eq!(record.total_price, 0.82);
    assert_eq!(record.confidence, 87.3);
}

/// 記録キューが閉じていてもカート追加は成功する
#[tokio::test]
async fn test_add_with_closed_ledger() {
    let (mut session, rx) = session_with(Some(apple_prediction()), true);
    drop(rx);
    session.classify(jpeg_image()).await.unwrap();

    assert!(session.add_to_cart().is_ok());
    assert_eq!(session.cart().len(), 1);
}

/// 2商品の合計
#[tokio::test]
async fn test_cart_total_two_items() {
    let (mut session, _rx) = session_with(Some(priced(3.20)), true);
    session.classify(jpeg_image()).await.unwrap();
    session.add_to_cart().unwrap();

    session.backend().set_prediction(Some(priced(5.75)));
    session.classify(jpeg_image()).await.unwrap();
    session.add_to_cart().unwrap();

    let view = session.cart_view();
    assert_eq!(view.count, "2");
    assert_eq!(view.total, "8.95 PLN");
    assert!(view.checkout_enabled);
}

/// 追加して同じ位置を削除すると元に戻る
#[tokio::test]
async fn test_add_then_remove_restores_cart() {
    let (mut session, _rx) = session_with(Some(priced(1.25)), true);
    session.classify(jpeg_image()).await.unwrap();
    session.add_to_cart().unwrap();
    let before = session.cart().items().to_vec();
    let total = session.cart().total();

    session.add_to_cart().unwrap();
    session.remove_from_cart(1).unwrap();

    assert_eq!(session.cart().items(), before.as_slice());
    assert_eq!(session.cart().total(), total);
}

/// 空のカートで会計
#[tokio::test]
async fn test_checkout_empty_cart() {
    let (mut session, _rx) = session_with(None, true);

    assert!(matches!(session.checkout(), Err(ShopScaleError::EmptyCart)));
    assert!(session.cart().items().is_empty());
}

/// 会計後はカートが空
#[tokio::test]
async fn test_checkout_clears_cart() {
    let (mut session, _rx) = session_with(Some(priced(3.20)), true);
    session.classify(jpeg_image()).await.unwrap();
    session.add_to_cart().unwrap();
    session.add_to_cart().unwrap();

    let summary = session.checkout().unwrap();
    assert_eq!(summary.item_count, 2);
    assert_eq!(format!("{:.2}", summary.total), "6.40");
    assert!(session.cart().is_empty());
}

/// 確認なしのクリアは何もしない
#[tokio::test]
async fn test_clear_requires_confirmation() {
    let (mut session, _rx) = session_with(Some(apple_prediction()), true);
    session.classify(jpeg_image()).await.unwrap();
    session.add_to_cart().unwrap();

    assert!(!session.clear_cart(|| false));
    assert_eq!(session.cart().len(), 1);

    assert!(session.clear_cart(|| true));
    assert!(session.cart().is_empty());
    assert!(!session.cart_view().checkout_enabled);
}

/// 撮影後はカメラが止まりプレビュー表示になる
#[tokio::test]
async fn test_capture_flow() {
    let (mut session, _rx) = session_with(Some(apple_prediction()), true);

    assert!(matches!(
        session.capture_and_classify().await,
        Err(ShopScaleError::State(_))
    ));

    session.start_camera().unwrap();
    assert!(session.is_streaming());
    assert_eq!(session.display(), &DisplayState::CameraFeed);

    session.capture_and_classify().await.unwrap();
    assert!(!session.is_streaming());
    assert_eq!(session.display(), &DisplayState::Preview(ImageSource::Camera));
    assert!(session.current().is_some());
}

/// 撮り直しで結果を捨ててカメラ再起動
#[tokio::test]
async fn test_retake() {
    let (mut session, _rx) = session_with(Some(apple_prediction()), true);
    session.classify(jpeg_image()).await.unwrap();

    session.retake().unwrap();
    assert!(session.current().is_none());
    assert!(session.is_streaming());
}

/// カメラが使えない場合
#[tokio::test]
async fn test_camera_unavailable() {
    let (mut session, _rx) = session_with(None, false);
    assert!(matches!(session.start_camera(), Err(ShopScaleError::Device(_))));
    assert!(!session.is_streaming());
}

/// 画像ファイルのアップロード
#[tokio::test]
async fn test_upload_and_classify() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("apple.png");
    DynamicImage::new_rgb8(8, 8).save(&path).unwrap();

    let (mut session, _rx) = session_with(Some(apple_prediction()), true);
    let result = session.upload_and_classify(&path).await.unwrap();
    assert_eq!(result.classification.product, "apple");
    assert_eq!(session.display(), &DisplayState::Preview(ImageSource::Upload(path)));
}

/// 画像以外のファイルは拒否
#[tokio::test]
async fn test_upload_non_image() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("receipt.txt");
    std::fs::write(&path, "not an image").unwrap();

    let (mut session, _rx) = session_with(Some(apple_prediction()), true);
    assert!(matches!(
        session.upload_and_classify(&path).await,
        Err(ShopScaleError::Validation(_))
    ));
    assert!(session.current().is_none());
}
