//! 取引記録（ベストエフォート）
//!
//! カートが正。バックエンドへの記録はキュー経由で別タスクが送り、
//! 失敗してもログに残すだけでカートは巻き戻さない。

use crate::client::ApiClient;
use shop_scale_common::TransactionRecord;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// 記録キューへの送信側
#[derive(Debug, Clone)]
pub struct LedgerHandle {
    tx: mpsc::UnboundedSender<TransactionRecord>,
}

impl LedgerHandle {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TransactionRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// 送るだけで待たない
    pub fn record(&self, record: TransactionRecord) {
        if let Err(e) = self.tx.send(record) {
            tracing::warn!(product = %e.0.product_name, "transaction ledger is closed, record dropped");
        }
    }
}

/// 記録ワーカーを起動する。全ハンドルが落ちると終了し、送信成功件数を返す
pub fn spawn(client: ApiClient) -> (LedgerHandle, JoinHandle<usize>) {
    let (handle, mut rx) = LedgerHandle::channel();

    let worker = tokio::spawn(async move {
        let mut recorded = 0;
        while let Some(record) = rx.recv().await {
            match client.record_transaction(&record).await {
                Ok(()) => {
                    recorded += 1;
                    tracing::debug!(product = %record.product_name, total = record.total_price, "transaction recorded");
                }
                Err(e) => {
                    tracing::warn!(product = %record.product_name, error = %e, "transaction recording failed");
                }
            }
        }
        recorded
    });

    (handle, worker)
}
