use crate::error::{Result, ShopScaleError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const API_URL_ENV: &str = "SHOP_SCALE_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// V4Lデバイスのパス
    pub device: String,
    pub width: u32,
    pub height: u32,
    /// JPEG品質 (1-100)
    pub jpeg_quality: u8,
    /// 静止画を1枚撮るコマンド（JPEGを標準出力に書く）
    pub snapshot_command: String,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device: "/dev/video0".into(),
            width: 1280,
            height: 720,
            jpeg_quality: 95,
            snapshot_command: "fswebcam".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub timeout_seconds: u64,
    pub default_weight_grams: f64,
    pub currency: String,
    pub camera: CameraSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api".into(),
            timeout_seconds: 30,
            default_weight_grams: shop_scale_common::DEFAULT_WEIGHT_GRAMS,
            currency: shop_scale_common::DEFAULT_CURRENCY.into(),
            camera: CameraSettings::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;

        // 環境変数を優先
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_url = url;
            }
        }

        Ok(config)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ShopScaleError::Config("Nie znaleziono katalogu domowego".into()))?;
        Ok(home.join(".config").join("shop-scale").join("config.json"))
    }

    pub fn set_api_url(&mut self, url: String) -> Result<()> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ShopScaleError::Config(format!("Nieprawidłowy adres API: {}", url)));
        }
        self.api_url = url.trim_end_matches('/').to_string();
        self.save()
    }

    /// 稼働確認用のサーバールートURL（末尾の `/api` を外す）
    pub fn server_root(&self) -> String {
        let base = self.api_url.trim_end_matches('/');
        let root = base.strip_suffix("/api").unwrap_or(base);
        format!("{}/", root)
    }
}
