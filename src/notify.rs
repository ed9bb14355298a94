//! ステータス表示とトースト通知
//!
//! エラーは操作の境界でここに渡され、表示されるだけでセッションは続く。

use crate::error::ShopScaleError;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

impl Level {
    fn icon(&self) -> &'static str {
        match self {
            Level::Info => "ℹ",
            Level::Success => "✔",
            Level::Error => "✖",
        }
    }
}

/// ステータス行（カメラ欄）
pub fn status(level: Level, message: &str) {
    println!("[{}] {}", level.icon(), message);
}

/// 一時的な通知
pub fn toast(level: Level, message: &str) {
    match level {
        Level::Error => eprintln!("  {} {}", level.icon(), message),
        _ => println!("  {} {}", level.icon(), message),
    }
}

/// 失敗した操作をトーストに変換
pub fn report(context: &str, err: &ShopScaleError) {
    tracing::warn!(error = %err, "{}", context);
    toast(Level::Error, &format!("{}: {}", context, err));
}

/// 通信中のスピナー
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::default_spinner());
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
