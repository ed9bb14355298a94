//! ショッピングカート
//!
//! 合計は毎回カート全体から再計算する（キャッシュしない）。

use crate::error::{Error, Result};
use crate::types::{CartItem, CurrentResult};

/// 時刻ベースで単調増加するID
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    /// 現在時刻（ミリ秒）。同じミリ秒内なら前回+1
    pub fn next_id(&mut self) -> u64 {
        let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        self.last = now.max(self.last + 1);
        self.last
    }
}

/// 会計のまとめ
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSummary {
    pub item_count: usize,
    pub total: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
    ids: IdGenerator,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在の結果をカートに追加
    pub fn add(&mut self, current: Option<&CurrentResult>) -> Result<&CartItem> {
        let result = current.ok_or_else(|| Error::State("Brak produktu do dodania".into()))?;
        let item = CartItem::from_result(self.ids.next_id(), result);
        self.items.push(item);
        Ok(&self.items[self.items.len() - 1])
    }

    /// 表示位置で削除
    pub fn remove(&mut self, index: usize) -> Result<CartItem> {
        if index >= self.items.len() {
            return Err(Error::Validation(format!(
                "Nieprawidłowa pozycja koszyka: {}",
                index + 1
            )));
        }
        Ok(self.items.remove(index))
    }

    /// 確認が取れた場合のみ空にする。空にしたら true
    pub fn clear_with<F>(&mut self, confirm: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        if !confirm() {
            return false;
        }
        self.items.clear();
        true
    }

    /// 会計（支払い処理は無い）。まとめを返してカートを空にする
    pub fn checkout(&mut self) -> Result<CheckoutSummary> {
        if self.items.is_empty() {
            return Err(Error::EmptyCart);
        }

        let summary = CheckoutSummary {
            item_count: self.items.len(),
            total: self.total(),
        };
        self.items.clear();
        Ok(summary)
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(|item| item.total_price).sum()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn can_checkout(&self) -> bool {
        !self.items.is_empty()
    }
}
