//! スキャン履歴ストア
//!
//! scan_historyキーに新しい順のJSON配列として保存する。
//! 挿入のたびに直近50件へ切り詰め、常に配列全体を1回で書き込む。
//!
//! 削除は2段階（undo対応）:
//! - 第1段階: メモリ上の一覧から外してundoバッファへ退避
//! - 5秒のタイマーが発火したら第2段階として永続化
//! undoバッファは[`HistorySession`]のフィールドであり、
//! 画面の入場で生成・退出で破棄されるセッション単位の状態。

use crate::error::{FoodScanError, Result};
use crate::types::{FoodAnalysis, HistoryItem};
use super::{KvStore, SCAN_HISTORY_KEY};
use chrono::{SecondsFormat, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

/// 履歴の最大保持件数
pub const MAX_ENTRIES: usize = 50;

/// undo猶予時間
pub const UNDO_WINDOW: Duration = Duration::from_secs(5);

/// 履歴の永続化操作
#[derive(Debug, Clone)]
pub struct HistoryStore {
    store: KvStore,
}

impl HistoryStore {
    pub fn new(store: KvStore) -> Self {
        Self { store }
    }

    /// 履歴を読み込み（新しい順）
    ///
    /// 未保存・パース失敗時は空を返す（呼び出し元にエラーは伝播しない）。
    pub async fn list(&self) -> Vec<HistoryItem> {
        let raw = match self.store.get(SCAN_HISTORY_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                eprintln!("履歴読み込みエラー、空として扱います: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                eprintln!("履歴のパースに失敗、空として扱います: {}", e);
                Vec::new()
            }
        }
    }

    /// 一覧全体を置き換えて保存
    pub async fn persist(&self, items: &[HistoryItem]) -> Result<()> {
        let json = serde_json::to_string(items)?;
        self.store.set(SCAN_HISTORY_KEY, &json).await
    }

    /// 解析結果を履歴に追加
    ///
    /// idは時刻由来（既存先頭より必ず大きくなるよう調整）、
    /// safeは検出アレルゲンがゼロかどうかで決まる。
    /// 先頭に挿入して50件に切り詰め、保存が成功した場合のみ
    /// 作成したエントリを返す（書き込み失敗時に保存済み一覧は変化しない）。
    pub async fn append(&self, analysis: &FoodAnalysis) -> Result<HistoryItem> {
        let mut items = self.list().await;
        let item = build_item(analysis, &items);

        items.insert(0, item.clone());
        items.truncate(MAX_ENTRIES);

        self.persist(&items).await?;
        Ok(item)
    }

    /// undoなしの即時削除。更新後の一覧を返す
    pub async fn delete_immediate(&self, id: &str) -> Result<Vec<HistoryItem>> {
        let mut items = self.list().await;
        let before = items.len();
        items.retain(|item| item.id != id);

        if items.len() == before {
            return Err(FoodScanError::InvalidArgument(format!(
                "履歴にid {} が見つかりません",
                id
            )));
        }

        self.persist(&items).await?;
        Ok(items)
    }

    /// 履歴を全削除（空配列で無条件に上書き）
    pub async fn clear(&self) -> Result<()> {
        self.persist(&[]).await
    }
}

/// 新規エントリを構築
fn build_item(analysis: &FoodAnalysis, existing: &[HistoryItem]) -> HistoryItem {
    HistoryItem {
        id: next_id(existing),
        product_name: analysis.food_name.clone(),
        date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        safe: analysis.allergens.is_empty(),
        allergens: analysis.allergens.clone(),
        ingredients: analysis.ingredients.clone(),
        image_url: analysis.image_url.clone(),
        confidence_level: analysis.confidence_level,
    }
}

/// 時刻由来の一意なidを生成
///
/// 同一ミリ秒内の連続追加でも先頭エントリより大きくなることを保証する。
fn next_id(existing: &[HistoryItem]) -> String {
    let now = Utc::now().timestamp_millis();
    let newest = existing
        .first()
        .and_then(|item| item.id.parse::<i64>().ok())
        .unwrap_or(0);
    now.max(newest + 1).to_string()
}

/// undoバッファの中身（1件のみ）
struct PendingDelete {
    generation: u64,
    index: usize,
    item: HistoryItem,
    /// 削除確定時に保存する一覧のスナップショット
    remaining: Vec<HistoryItem>,
}

/// undoバッファをロックする
///
/// ガード保持区間にパニックする処理はないため、
/// 毒化していても中身はそのまま利用できる。
fn lock_pending(slot: &Mutex<Option<PendingDelete>>) -> MutexGuard<'_, Option<PendingDelete>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 履歴画面のセッションコントローラ
///
/// メモリ上の一覧とundoバッファ（最大1件）を持つ。
/// タイマー発火とundoはバッファのOptionをmutex越しにtakeすることで
/// 排他になり、期限ちょうどのキャンセルでも二重確定しない。
/// セッション側の書き込みは、発火済みタイマーの保存が進行中なら
/// その完了を待ってから行う（確定済みの削除が巻き戻らないように）。
pub struct HistorySession {
    store: HistoryStore,
    items: Vec<HistoryItem>,
    pending: Arc<Mutex<Option<PendingDelete>>>,
    timer: Option<JoinHandle<()>>,
    undo_window: Duration,
    next_generation: u64,
}

impl HistorySession {
    /// 履歴を読み込んでセッションを開始
    pub async fn open(store: HistoryStore) -> Self {
        Self::with_undo_window(store, UNDO_WINDOW).await
    }

    /// 猶予時間を指定して開始（テスト用）
    pub async fn with_undo_window(store: HistoryStore, undo_window: Duration) -> Self {
        let items = store.list().await;
        Self {
            store,
            items,
            pending: Arc::new(Mutex::new(None)),
            timer: None,
            undo_window,
            next_generation: 0,
        }
    }

    /// 表示用の一覧（未確定の削除を反映済み）
    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    /// undo待ちの削除があるか
    pub fn has_pending_delete(&self) -> bool {
        lock_pending(&self.pending).is_some()
    }

    /// タイマータスクの終了を待つ（発火済みなら保存完了まで）
    async fn join_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            let _ = timer.await;
        }
    }

    /// 第1段階の削除
    ///
    /// 一覧から外してundoバッファに退避し、猶予タイマーを開始する。
    /// バッファは1件のみなので、未確定の削除が残っていれば先に確定する。
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.commit_pending().await?;

        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| {
                FoodScanError::InvalidArgument(format!("履歴にid {} が見つかりません", id))
            })?;

        let item = self.items.remove(index);
        let remaining = self.items.clone();

        let generation = self.next_generation;
        self.next_generation += 1;

        *lock_pending(&self.pending) = Some(PendingDelete {
            generation,
            index,
            item,
            remaining,
        });

        let slot = Arc::clone(&self.pending);
        let store = self.store.clone();
        let window = self.undo_window;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;

            // 自分の世代のバッファが残っている場合のみ消費する
            let taken = {
                let mut guard = lock_pending(&slot);
                match guard.as_ref() {
                    Some(p) if p.generation == generation => guard.take(),
                    _ => None,
                }
            };

            if let Some(pending) = taken {
                // タイマー経由の確定はロールバック先がないため報告のみ
                if let Err(e) = store.persist(&pending.remaining).await {
                    eprintln!("履歴削除の保存に失敗: {}", e);
                }
            }
        }));

        Ok(())
    }

    /// 未確定の削除を取り消す
    ///
    /// タイマーが既に発火していればfalse（復元は不可能）。
    pub fn undo(&mut self) -> bool {
        let taken = lock_pending(&self.pending).take();
        match taken {
            Some(pending) => {
                // バッファを取れた＝タイマーはまだ保存していない
                if let Some(timer) = self.timer.take() {
                    timer.abort();
                }
                let index = pending.index.min(self.items.len());
                self.items.insert(index, pending.item);
                true
            }
            None => false,
        }
    }

    /// 未確定の削除を即時確定
    ///
    /// 書き込み失敗時はアイテムをメモリ上の一覧へ戻してエラーを返す。
    pub async fn commit_pending(&mut self) -> Result<bool> {
        let taken = lock_pending(&self.pending).take();
        let pending = match taken {
            Some(pending) => pending,
            None => {
                // タイマー発火による保存が進行中であれば完了を待つ
                self.join_timer().await;
                return Ok(false);
            }
        };

        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        match self.store.persist(&pending.remaining).await {
            Ok(()) => Ok(true),
            Err(e) => {
                let index = pending.index.min(self.items.len());
                self.items.insert(index, pending.item);
                Err(e)
            }
        }
    }

    /// 解析結果を履歴に追加（未確定の削除は先に確定する）
    pub async fn append(&mut self, analysis: &FoodAnalysis) -> Result<HistoryItem> {
        self.commit_pending().await?;

        let item = self.store.append(analysis).await?;
        self.items.insert(0, item.clone());
        self.items.truncate(MAX_ENTRIES);
        Ok(item)
    }

    /// 履歴を全削除（未確定の削除は破棄する）
    pub async fn clear(&mut self) -> Result<()> {
        if lock_pending(&self.pending).take().is_some() {
            if let Some(timer) = &self.timer {
                timer.abort();
            }
        }
        self.join_timer().await;

        self.store.clear().await?;
        self.items.clear();
        Ok(())
    }

    /// セッション終了処理。未確定の削除を確定する
    pub async fn close(&mut self) -> Result<()> {
        self.commit_pending().await.map(|_| ())
    }
}

impl Drop for HistorySession {
    fn drop(&mut self) {
        // 破棄後にタイマーが確定処理を走らせないようにする。
        // バッファが空＝発火済みの場合は保存を走り切らせる
        if lock_pending(&self.pending).take().is_some() {
            if let Some(timer) = &self.timer {
                timer.abort();
            }
        }
    }
}
