//! Single-slot cache for the newest browser-extension product capture.
//!
//! The extension pushes one product snapshot per page visit; the dashboard
//! only ever asks for the most recent one. The slot is owned by the process
//! and injected through `AppState`, with one writer path and any number of
//! readers. Every push replaces the previous capture wholesale.

use crate::domain::{Marketplace, StoreId, TimeMs};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// One product snapshot lifted from a marketplace product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCapture {
    /// Server-assigned id for this capture.
    pub id: Uuid,
    /// Instant the server accepted it.
    pub received_ms: TimeMs,
    /// Store the capturing seller was signed into.
    pub store_id: StoreId,
    /// Marketplace the page belongs to.
    pub marketplace: Marketplace,
    /// Raw captured fields, passed through untouched.
    pub payload: serde_json::Value,
}

/// Process-scoped slot holding the latest capture.
#[derive(Debug, Default)]
pub struct CaptureSlot {
    slot: RwLock<Option<ProductCapture>>,
}

impl CaptureSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot's contents with a fresh capture and return it.
    pub async fn publish(
        &self,
        store_id: StoreId,
        marketplace: Marketplace,
        payload: serde_json::Value,
    ) -> ProductCapture {
        let capture = ProductCapture {
            id: Uuid::new_v4(),
            received_ms: TimeMs::now(),
            store_id,
            marketplace,
            payload,
        };
        *self.slot.write().await = Some(capture.clone());
        capture
    }

    /// The most recent capture, when any has been pushed.
    pub async fn latest(&self) -> Option<ProductCapture> {
        self.slot.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> StoreId {
        StoreId::new("store-1".to_string())
    }

    fn marketplace() -> Marketplace {
        Marketplace::new("trendyol")
    }

    #[tokio::test]
    async fn test_empty_slot_has_no_latest() {
        let slot = CaptureSlot::new();
        assert!(slot.latest().await.is_none());
    }

    #[tokio::test]
    async fn test_publish_then_latest_round_trips() {
        let slot = CaptureSlot::new();
        let payload = json!({"name": "Kulaklik", "salesPrice": 299.90});

        let published = slot
            .publish(store(), marketplace(), payload.clone())
            .await;
        let latest = slot.latest().await.unwrap();

        assert_eq!(latest.id, published.id);
        assert_eq!(latest.payload, payload);
        assert_eq!(latest.marketplace, marketplace());
    }

    #[tokio::test]
    async fn test_second_publish_replaces_first() {
        let slot = CaptureSlot::new();

        let first = slot
            .publish(store(), marketplace(), json!({"name": "A"}))
            .await;
        let second = slot
            .publish(store(), marketplace(), json!({"name": "B"}))
            .await;

        let latest = slot.latest().await.unwrap();
        assert_eq!(latest.id, second.id);
        assert_ne!(latest.id, first.id);
        assert_eq!(latest.payload["name"], "B");
    }
}
