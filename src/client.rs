//! スケールバックエンドAPIクライアント
//!
//! 分類・重量推定・価格計算はすべてバックエンド側で行う。
//! リトライはしない（1回だけ送って失敗したら即エラー）。

use crate::capture::CapturedImage;
use crate::error::{Result, ShopScaleError};
use serde::{Deserialize, Serialize};
use shop_scale_common::{CurrentResult, PriceQuote, Product, ProductDetails, Transaction, TransactionRecord};
use std::time::Duration;

/// セッションから見たバックエンド
#[allow(async_fn_in_trait)]
pub trait ScaleBackend {
    async fn predict(&self, image: &CapturedImage) -> Result<CurrentResult>;

    async fn calculate_price(&self, product_name: &str, weight_grams: f64) -> Result<PriceQuote>;

    async fn product(&self, name: &str) -> Result<ProductDetails>;

    async fn products(&self) -> Result<Vec<Product>>;
}

#[derive(Serialize)]
struct PredictRequest {
    image: String,
}

#[derive(Serialize)]
struct PriceRequest<'a> {
    product_name: &'a str,
    weight_grams: f64,
}

#[derive(Deserialize)]
struct ProductsResponse {
    products: Vec<Product>,
}

#[derive(Deserialize)]
struct TransactionsResponse {
    transactions: Vec<Transaction>,
}

/// バックエンドのエラーボディ `{"error": "..."}`
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// 稼働確認レスポンス
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ShopScaleError::Config(format!("Nie można utworzyć klienta HTTP: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// 2xx以外はエラー本文を読んで Network エラーにする
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);

        Err(ShopScaleError::Network(format!("HTTP {}: {}", status.as_u16(), detail)))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!(url, "GET");
        let response = self.client.get(url).send().await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        tracing::debug!(url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// サーバールート（`/`）で稼働確認
    pub async fn health(&self, root_url: &str) -> Result<HealthStatus> {
        self.get_json(root_url).await
    }

    pub async fn model_info(&self) -> Result<serde_json::Value> {
        self.get_json(&self.endpoint("model_info")).await
    }

    pub async fn transactions(&self, limit: usize) -> Result<Vec<Transaction>> {
        let url = format!("{}?limit={}", self.endpoint("transactions"), limit);
        let data: TransactionsResponse = self.get_json(&url).await?;
        Ok(data.transactions)
    }

    pub async fn record_transaction(&self, record: &TransactionRecord) -> Result<()> {
        let _: serde_json::Value = self.post_json(&self.endpoint("transaction"), record).await?;
        Ok(())
    }
}

impl ScaleBackend for ApiClient {
    async fn predict(&self, image: &CapturedImage) -> Result<CurrentResult> {
        // Base64化は別スレッドで
        let image = image.clone();
        let data_url = tokio::task::spawn_blocking(move || image.to_data_url())
            .await
            .map_err(|e| ShopScaleError::ImageEncode(e.to_string()))?;

        tracing::debug!(chars = data_url.len(), "sending image for classification");

        self.post_json(&self.endpoint("predict"), &PredictRequest { image: data_url })
            .await
    }

    async fn calculate_price(&self, product_name: &str, weight_grams: f64) -> Result<PriceQuote> {
        self.post_json(
            &self.endpoint("calculate_price"),
            &PriceRequest { product_name, weight_grams },
        )
        .await
    }

    async fn product(&self, name: &str) -> Result<ProductDetails> {
        let mut url = reqwest::Url::parse(&self.endpoint("product"))
            .map_err(|e| ShopScaleError::Config(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ShopScaleError::Config(format!("Nieprawidłowy adres API: {}", self.base_url)))?
            .push(name);

        self.get_json(url.as_str()).await
    }

    async fn products(&self) -> Result<Vec<Product>> {
        let data: ProductsResponse = self.get_json(&self.endpoint("products")).await?;
        Ok(data.products)
    }
}
