//! 撮影・アップロード
//!
//! カメラ映像と静止画プレビューは同時に表示されない（DisplayState）。
//! 静止画を撮ったらカメラは必ず停止する。

pub mod camera;

pub use camera::{Camera, CommandCamera, VideoStream};

use crate::config::CameraSettings;
use crate::error::{Result, ShopScaleError};
use base64::{engine::general_purpose, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};

/// 画像の出どころ
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Camera,
    Upload(PathBuf),
}

/// 撮影またはアップロードされた画像（送信後は破棄）
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub source: ImageSource,
}

impl CapturedImage {
    /// "data:image/jpeg;base64,..." 形式
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// 表示中のもの
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState {
    Idle,
    CameraFeed,
    Preview(ImageSource),
}

pub struct CaptureController {
    camera: Box<dyn Camera>,
    settings: CameraSettings,
    stream: Option<Box<dyn VideoStream>>,
    display: DisplayState,
}

impl CaptureController {
    pub fn new(camera: Box<dyn Camera>, settings: CameraSettings) -> Self {
        Self {
            camera,
            settings,
            stream: None,
            display: DisplayState::Idle,
        }
    }

    /// カメラを起動（既存のストリームは先に解放）
    pub fn start(&mut self) -> Result<()> {
        self.stop();
        let stream = self.camera.open(&self.settings)?;
        self.stream = Some(stream);
        self.display = DisplayState::CameraFeed;
        Ok(())
    }

    /// 現在のフレームを撮影してカメラを停止
    pub fn capture(&mut self) -> Result<CapturedImage> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| ShopScaleError::State("Kamera nie jest włączona".into()))?;

        let frame = stream.snapshot()?;
        let bytes = encode_jpeg(&frame, self.settings.jpeg_quality)?;

        self.stop();
        self.display = DisplayState::Preview(ImageSource::Camera);

        Ok(CapturedImage {
            bytes,
            mime: "image/jpeg".into(),
            source: ImageSource::Camera,
        })
    }

    /// ファイルをアップロード（カメラは使わない）
    pub fn upload_file(&mut self, path: &Path) -> Result<CapturedImage> {
        let bytes = std::fs::read(path)?;
        let mime = detect_image_mime(path, &bytes)
            .ok_or_else(|| ShopScaleError::Validation("Proszę wybrać plik obrazu".into()))?;

        self.stop();
        let source = ImageSource::Upload(path.to_path_buf());
        self.display = DisplayState::Preview(source.clone());

        tracing::debug!(path = %path.display(), mime, bytes = bytes.len(), "image uploaded");

        Ok(CapturedImage {
            bytes,
            mime: mime.to_string(),
            source,
        })
    }

    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
        if self.display == DisplayState::CameraFeed {
            self.display = DisplayState::Idle;
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_active())
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }
}

/// 中身から判定し、だめなら拡張子から判定する
pub fn detect_image_mime(path: &Path, bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes)
        .ok()
        .or_else(|| ImageFormat::from_path(path).ok())
        .map(|format| format.to_mime_type())
        .filter(|mime| mime.starts_with("image/"))
}

fn encode_jpeg(frame: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    DynamicImage::ImageRgb8(frame.to_rgb8()).write_with_encoder(encoder)?;
    Ok(buffer)
}
