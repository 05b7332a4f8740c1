//! Local order history and the one-shot confirmation flag.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use souq_core::{OrderNumber, OrderRecord};

use crate::storage::{DurableStorage, PersistentCollectionStore, keys};

/// Orders placed from this client, oldest first.
///
/// Besides the append-only list, a successful checkout stores the latest
/// order number and raises a flag that lets the confirmation be shown once.
#[derive(Debug)]
pub struct OrderHistory {
    storage: Arc<dyn DurableStorage>,
    store: PersistentCollectionStore<OrderRecord>,
    records: Vec<OrderRecord>,
}

impl OrderHistory {
    /// Restore the history from `storage`.
    #[must_use]
    pub fn load(storage: Arc<dyn DurableStorage>) -> Self {
        let store = PersistentCollectionStore::new(Arc::clone(&storage), keys::ORDERS);
        let records = store.load();
        Self {
            storage,
            store,
            records,
        }
    }

    /// Every recorded order, oldest first.
    #[must_use]
    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    /// Append an order and arm the confirmation.
    pub fn record(&mut self, order_number: OrderNumber, placed_at: DateTime<Utc>) -> OrderRecord {
        let record = OrderRecord::new(order_number, placed_at);

        let mut next = self.records.clone();
        next.push(record.clone());
        self.store.save(&next);
        self.records = next;

        self.write(keys::LATEST_ORDER, record.order_number.as_str());
        self.write(keys::CAME_FROM_CHECKOUT, "true");
        record
    }

    /// The most recent order number, if any.
    #[must_use]
    pub fn latest(&self) -> Option<OrderNumber> {
        match self.storage.get(keys::LATEST_ORDER) {
            Ok(latest) => latest.map(OrderNumber::new),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read latest order");
                self.records.last().map(|r| r.order_number.clone())
            }
        }
    }

    /// Consume the confirmation.
    ///
    /// Returns the latest order number the first time it is called after a
    /// checkout, and `None` on every later call until the next checkout.
    pub fn take_confirmation(&self) -> Option<OrderNumber> {
        let armed = match self.storage.get(keys::CAME_FROM_CHECKOUT) {
            Ok(flag) => flag.is_some(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read confirmation flag");
                false
            }
        };
        if !armed {
            return None;
        }

        if let Err(e) = self.storage.remove(keys::CAME_FROM_CHECKOUT) {
            tracing::warn!(error = %e, "Failed to clear confirmation flag");
        }
        self.latest()
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            tracing::warn!(key, error = %e, "Failed to persist order state");
        }
    }
}
