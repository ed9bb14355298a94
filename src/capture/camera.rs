//! カメラデバイス
//!
//! ストリームを開き、静止画を1枚取り出し、停止する。
//! 既定の実装は外部コマンド（fswebcam互換）でV4Lデバイスから撮影する。

use crate::config::CameraSettings;
use crate::error::{Result, ShopScaleError};
use image::DynamicImage;
use std::path::Path;
use std::process::Command;

/// 開いているカメラストリーム
pub trait VideoStream {
    /// 現在のフレームを静止画として取り出す
    fn snapshot(&mut self) -> Result<DynamicImage>;

    /// デバイスを解放する
    fn stop(&mut self);

    fn is_active(&self) -> bool;
}

pub trait Camera {
    fn open(&self, settings: &CameraSettings) -> Result<Box<dyn VideoStream>>;
}

/// 外部コマンドで撮影するカメラ
#[derive(Debug, Default, Clone)]
pub struct CommandCamera;

impl Camera for CommandCamera {
    fn open(&self, settings: &CameraSettings) -> Result<Box<dyn VideoStream>> {
        let device = Path::new(&settings.device);
        if !device.exists() {
            return Err(ShopScaleError::Device(format!(
                "Nie znaleziono kamery: {}",
                settings.device
            )));
        }

        // 権限チェック（開けるかどうかだけ確認する）
        if let Err(e) = std::fs::OpenOptions::new().read(true).open(device) {
            return Err(ShopScaleError::Device(match e.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    format!("Brak uprawnień do kamery: {}", settings.device)
                }
                _ => format!("{}: {}", settings.device, e),
            }));
        }

        tracing::info!(device = %settings.device, width = settings.width, height = settings.height, "camera stream opened");

        Ok(Box::new(CommandStream {
            settings: settings.clone(),
            active: true,
        }))
    }
}

struct CommandStream {
    settings: CameraSettings,
    active: bool,
}

impl CommandStream {
    fn snapshot_args(&self) -> Vec<String> {
        vec![
            "-d".into(),
            self.settings.device.clone(),
            "-r".into(),
            format!("{}x{}", self.settings.width, self.settings.height),
            "--no-banner".into(),
            "--jpeg".into(),
            self.settings.jpeg_quality.to_string(),
            "-".into(),
        ]
    }
}

impl VideoStream for CommandStream {
    fn snapshot(&mut self) -> Result<DynamicImage> {
        if !self.active {
            return Err(ShopScaleError::Device("Kamera została zatrzymana".into()));
        }

        let output = Command::new(&self.settings.snapshot_command)
            .args(self.snapshot_args())
            .output()
            .map_err(|e| {
                ShopScaleError::Device(format!(
                    "Nie można uruchomić {}: {}",
                    self.settings.snapshot_command, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ShopScaleError::Device(stderr.trim().to_string()));
        }

        tracing::debug!(bytes = output.stdout.len(), "frame captured");

        image::load_from_memory(&output.stdout)
            .map_err(|e| ShopScaleError::Device(format!("Nieprawidłowa klatka: {}", e)))
    }

    fn stop(&mut self) {
        if self.active {
            self.active = false;
            tracing::info!(device = %self.settings.device, "camera stream stopped");
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for CommandStream {
    fn drop(&mut self) {
        self.stop();
    }
}
