use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShopScaleError {
    #[error("Błąd konfiguracji: {0}")]
    Config(String),

    /// カメラが使えない（権限なし・デバイスなし）
    #[error("Błąd kamery: {0}")]
    Device(String),

    #[error("Nieprawidłowe dane: {0}")]
    Validation(String),

    /// 通信失敗・2xx以外のステータス
    #[error("Błąd połączenia z serwerem: {0}")]
    Network(String),

    #[error("{0}")]
    State(String),

    #[error("Koszyk jest pusty")]
    EmptyCart,

    #[error("Błąd kodowania obrazu: {0}")]
    ImageEncode(String),

    #[error("Błąd wprowadzania: {0}")]
    Prompt(String),

    #[error("Błąd JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Błąd IO: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(shop_scale_common::Error),
}

impl From<shop_scale_common::Error> for ShopScaleError {
    /// カート・補正の共通エラーをキオスク側の分類に揃える
    fn from(err: shop_scale_common::Error) -> Self {
        match err {
            shop_scale_common::Error::State(msg) => ShopScaleError::State(msg),
            shop_scale_common::Error::EmptyCart => ShopScaleError::EmptyCart,
            shop_scale_common::Error::Validation(msg) => ShopScaleError::Validation(msg),
            other => ShopScaleError::Common(other),
        }
    }
}

impl From<reqwest::Error> for ShopScaleError {
    fn from(err: reqwest::Error) -> Self {
        ShopScaleError::Network(err.to_string())
    }
}

impl From<image::ImageError> for ShopScaleError {
    fn from(err: image::ImageError) -> Self {
        ShopScaleError::ImageEncode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShopScaleError>;
