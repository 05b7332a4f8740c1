//! Shopping cart.
//!
//! Mutations are pure functions over a slice of entries that return the next
//! collection. [`CartEngine`] commits the result and saves it before the
//! mutating call returns, so the persisted mirror never lags the in-memory
//! state by more than one operation.

use souq_core::{CartEntry, Item, ItemUuid, Price, Quantity};

use crate::storage::{PersistentCollectionStore, dedupe_by_key};

/// Options for adding an item that is not yet in the cart.
///
/// Ignored when the item is already present; re-adding only bumps the
/// quantity by one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// Initial quantity (defaults to one).
    pub quantity: Option<Quantity>,
    /// Initial notes (defaults to empty).
    pub notes: Option<String>,
}

// =============================================================================
// Pure operations
// =============================================================================

/// Cart transitions as functions from the current entries to the next.
pub mod ops {
    use super::{AddOptions, CartEntry, Item, ItemUuid};

    /// Add `item`, or bump its quantity by one if already present.
    #[must_use]
    pub fn add(entries: &[CartEntry], item: Item, options: AddOptions) -> Vec<CartEntry> {
        if entries.iter().any(|e| e.item.uuid == item.uuid) {
            return increment(entries, &item.uuid);
        }

        let mut next = entries.to_vec();
        next.push(CartEntry::new(
            item,
            options.quantity.unwrap_or_default(),
            options.notes.unwrap_or_default(),
        ));
        next
    }

    /// Bump the quantity of `uuid` by one. Absent items are left alone.
    #[must_use]
    pub fn increment(entries: &[CartEntry], uuid: &ItemUuid) -> Vec<CartEntry> {
        entries
            .iter()
            .map(|e| {
                if &e.item.uuid == uuid {
                    CartEntry {
                        quantity: e.quantity.incremented(),
                        ..e.clone()
                    }
                } else {
                    e.clone()
                }
            })
            .collect()
    }

    /// Lower the quantity of `uuid` by one, removing the line at one.
    #[must_use]
    pub fn decrement(entries: &[CartEntry], uuid: &ItemUuid) -> Vec<CartEntry> {
        entries
            .iter()
            .filter_map(|e| {
                if &e.item.uuid == uuid {
                    e.quantity.decremented().map(|quantity| CartEntry {
                        quantity,
                        ..e.clone()
                    })
                } else {
                    Some(e.clone())
                }
            })
            .collect()
    }

    /// Drop the line for `uuid`.
    #[must_use]
    pub fn remove(entries: &[CartEntry], uuid: &ItemUuid) -> Vec<CartEntry> {
        entries
            .iter()
            .filter(|e| &e.item.uuid != uuid)
            .cloned()
            .collect()
    }

    /// Replace the notes on `uuid`, keeping its quantity.
    #[must_use]
    pub fn update_notes(entries: &[CartEntry], uuid: &ItemUuid, notes: &str) -> Vec<CartEntry> {
        entries
            .iter()
            .map(|e| {
                if &e.item.uuid == uuid {
                    CartEntry {
                        notes: notes.to_string(),
                        ..e.clone()
                    }
                } else {
                    e.clone()
                }
            })
            .collect()
    }
}

// =============================================================================
// Engine
// =============================================================================

/// The cart, held in memory and mirrored to durable storage.
#[derive(Debug)]
pub struct CartEngine {
    entries: Vec<CartEntry>,
    store: PersistentCollectionStore<CartEntry>,
}

impl CartEngine {
    /// Restore the cart from `store`.
    ///
    /// Duplicate lines for the same item (possible only if the document was
    /// edited outside the client) are collapsed to the first one.
    #[must_use]
    pub fn load(store: PersistentCollectionStore<CartEntry>) -> Self {
        let entries = dedupe_by_key(store.load());
        tracing::debug!(lines = entries.len(), "Restored cart");
        Self { entries, store }
    }

    /// Current cart lines, in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn commit(&mut self, next: Vec<CartEntry>) {
        self.store.save(&next);
        self.entries = next;
    }

    /// Add an item, or bump its quantity if it is already in the cart.
    pub fn add_to_cart(&mut self, item: Item, options: AddOptions) {
        let next = ops::add(&self.entries, item, options);
        self.commit(next);
    }

    /// Bump the quantity of `uuid` by one.
    pub fn increment_quantity(&mut self, uuid: &ItemUuid) {
        let next = ops::increment(&self.entries, uuid);
        self.commit(next);
    }

    /// Lower the quantity of `uuid` by one; a line at one is removed.
    pub fn decrement_quantity(&mut self, uuid: &ItemUuid) {
        let next = ops::decrement(&self.entries, uuid);
        self.commit(next);
    }

    /// Remove the line for `uuid`.
    pub fn remove_from_cart(&mut self, uuid: &ItemUuid) {
        let next = ops::remove(&self.entries, uuid);
        self.commit(next);
    }

    /// Replace the notes on the line for `uuid`.
    pub fn update_item_notes(&mut self, uuid: &ItemUuid, notes: &str) {
        let next = ops::update_notes(&self.entries, uuid, notes);
        self.commit(next);
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.commit(Vec::new());
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn cart_total(&self) -> Price {
        self.entries.iter().map(CartEntry::line_total).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| u64::from(e.quantity.get()))
            .sum()
    }

    /// Whether `uuid` has a line in the cart.
    #[must_use]
    pub fn is_in_cart(&self, uuid: &ItemUuid) -> bool {
        self.find(uuid).is_some()
    }

    /// Quantity of `uuid`, if it is in the cart.
    #[must_use]
    pub fn quantity_of(&self, uuid: &ItemUuid) -> Option<Quantity> {
        self.find(uuid).map(|e| e.quantity)
    }

    /// Notes on the line for `uuid`; empty if absent.
    #[must_use]
    pub fn notes_for(&self, uuid: &ItemUuid) -> &str {
        self.find(uuid).map_or("", |e| e.notes.as_str())
    }

    fn find(&self, uuid: &ItemUuid) -> Option<&CartEntry> {
        self.entries.iter().find(|e| &e.item.uuid == uuid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::{DurableStorage, MemoryStorage, keys};

    fn item(uuid: &str, price: u32) -> Item {
        Item {
            uuid: ItemUuid::new(uuid),
            title: format!("Item {uuid}"),
            price: Price::from(price),
            collection: "Grill".into(),
            image: String::new(),
        }
    }

    fn engine_on(storage: &Arc<dyn DurableStorage>) -> CartEngine {
        CartEngine::load(PersistentCollectionStore::new(
            Arc::clone(storage),
            keys::CART,
        ))
    }

    fn engine() -> (Arc<dyn DurableStorage>, CartEngine) {
        let storage: Arc<dyn DurableStorage> = Arc::new(MemoryStorage::default());
        let engine = engine_on(&storage);
        (storage, engine)
    }

    #[test]
    fn test_add_to_empty_cart() {
        let (_, mut cart) = engine();
        cart.add_to_cart(item("A", 1000), AddOptions::default());

        assert_eq!(cart.cart_total(), Price::from(1000));
        assert_eq!(cart.total_item_count(), 1);
        assert_eq!(cart.notes_for(&ItemUuid::new("A")), "");
    }

    #[test]
    fn test_readding_increments_and_ignores_options() {
        let (_, mut cart) = engine();
        cart.add_to_cart(item("A", 1000), AddOptions::default());
        cart.add_to_cart(
            item("A", 1000),
            AddOptions {
                quantity: Some(Quantity::new(5).unwrap()),
                notes: Some("spicy".to_string()),
            },
        );

        assert_eq!(cart.entries().len(), 1);
        assert_eq!(cart.quantity_of(&ItemUuid::new("A")), Some(Quantity::new(2).unwrap()));
        assert_eq!(cart.notes_for(&ItemUuid::new("A")), "");
    }

    #[test]
    fn test_add_with_initial_quantity_and_notes() {
        let (_, mut cart) = engine();
        cart.add_to_cart(
            item("A", 250),
            AddOptions {
                quantity: Some(Quantity::new(3).unwrap()),
                notes: Some("no onions".to_string()),
            },
        );

        assert_eq!(cart.total_item_count(), 3);
        assert_eq!(cart.cart_total(), Price::from(750));
        assert_eq!(cart.notes_for(&ItemUuid::new("A")), "no onions");
    }

    #[test]
    fn test_decrement_at_one_removes_line_and_mirror() {
        let (storage, mut cart) = engine();
        cart.add_to_cart(item("A", 1000), AddOptions::default());
        cart.decrement_quantity(&ItemUuid::new("A"));

        assert!(cart.is_empty());
        assert_eq!(cart.cart_total(), Price::ZERO);
        assert_eq!(cart.total_item_count(), 0);
        assert!(engine_on(&storage).is_empty());
    }

    #[test]
    fn test_decrement_above_one_keeps_line() {
        let (_, mut cart) = engine();
        let uuid = ItemUuid::new("A");
        cart.add_to_cart(item("A", 1000), AddOptions::default());
        cart.increment_quantity(&uuid);
        cart.increment_quantity(&uuid);
        cart.decrement_quantity(&uuid);

        assert_eq!(cart.quantity_of(&uuid), Some(Quantity::new(2).unwrap()));
    }

    #[test]
    fn test_operations_on_absent_item_are_noops() {
        let (_, mut cart) = engine();
        cart.add_to_cart(item("A", 1000), AddOptions::default());
        let before = cart.entries().to_vec();

        let missing = ItemUuid::new("missing");
        cart.increment_quantity(&missing);
        cart.decrement_quantity(&missing);
        cart.remove_from_cart(&missing);
        cart.update_item_notes(&missing, "ignored");

        assert_eq!(cart.entries(), before.as_slice());
        assert!(!cart.is_in_cart(&missing));
    }

    #[test]
    fn test_update_notes_preserves_quantity() {
        let (_, mut cart) = engine();
        let uuid = ItemUuid::new("A");
        cart.add_to_cart(item("A", 1000), AddOptions::default());
        cart.increment_quantity(&uuid);
        cart.update_item_notes(&uuid, "well done");

        assert_eq!(cart.notes_for(&uuid), "well done");
        assert_eq!(cart.quantity_of(&uuid), Some(Quantity::new(2).unwrap()));
    }

    #[test]
    fn test_totals_track_mixed_operations() {
        let (_, mut cart) = engine();
        let a = ItemUuid::new("A");
        let b = ItemUuid::new("B");

        cart.add_to_cart(item("A", 1000), AddOptions::default());
        cart.add_to_cart(item("B", 2500), AddOptions::default());
        cart.add_to_cart(item("C", 300), AddOptions::default());
        cart.increment_quantity(&b);
        cart.add_to_cart(item("A", 1000), AddOptions::default());
        cart.decrement_quantity(&a);
        cart.remove_from_cart(&ItemUuid::new("C"));

        let expected_count: u64 = cart
            .entries()
            .iter()
            .map(|e| u64::from(e.quantity.get()))
            .sum();
        assert_eq!(cart.total_item_count(), expected_count);
        assert_eq!(cart.total_item_count(), 3);
        assert_eq!(cart.cart_total(), Price::from(6000));
    }

    #[test]
    fn test_clear_persists_empty_collection() {
        let (storage, mut cart) = engine();
        cart.add_to_cart(item("A", 1000), AddOptions::default());
        cart.clear_cart();

        assert!(cart.is_empty());
        assert_eq!(storage.get(keys::CART).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_reload_restores_identical_cart() {
        let (storage, mut cart) = engine();
        cart.add_to_cart(item("A", 1000), AddOptions::default());
        cart.add_to_cart(
            item("B", 500),
            AddOptions {
                quantity: Some(Quantity::new(4).unwrap()),
                notes: Some("cold".to_string()),
            },
        );

        let reloaded = engine_on(&storage);

        assert_eq!(reloaded.entries(), cart.entries());
    }

    #[test]
    fn test_load_collapses_duplicate_lines() {
        let storage: Arc<dyn DurableStorage> = Arc::new(MemoryStorage::default());
        storage
            .set(
                keys::CART,
                r#"[
                    {"uuid":"A","title":"First","price":100,"quan":2,"notes":""},
                    {"uuid":"A","title":"Second","price":100,"quan":7,"notes":""}
                ]"#,
            )
            .unwrap();

        let cart = engine_on(&storage);

        assert_eq!(cart.entries().len(), 1);
        assert_eq!(cart.total_item_count(), 2);
    }

    #[test]
    fn test_pure_ops_leave_input_untouched() {
        let start = vec![CartEntry::new(item("A", 100), Quantity::ONE, String::new())];
        let next = ops::decrement(&start, &ItemUuid::new("A"));

        assert!(next.is_empty());
        assert_eq!(start.len(), 1);
    }

    #[test]
    fn test_total_of_huge_persisted_price_saturates() {
        let storage: Arc<dyn DurableStorage> = Arc::new(MemoryStorage::default());
        storage
            .set(
                keys::CART,
                r#"[{"uuid":"A","title":"Gold","price":5e28,"quan":2,"notes":""}]"#,
            )
            .unwrap();

        let cart = engine_on(&storage);

        assert_eq!(cart.entries().len(), 1);
        assert_eq!(cart.cart_total().amount(), Decimal::MAX);
    }

    // =========================================================================
    // Random operation sequences
    // =========================================================================

    const POOL: [(&str, u32); 4] = [("A", 1000), ("B", 250), ("C", 4000), ("D", 75)];

    #[derive(Debug, Clone)]
    enum CartOp {
        Add(usize, Option<u32>),
        Increment(usize),
        Decrement(usize),
        Remove(usize),
        Notes(usize, String),
        Clear,
    }

    fn arb_op() -> impl Strategy<Value = CartOp> {
        let slot = 0..POOL.len();
        prop_oneof![
            4 => (slot.clone(), proptest::option::of(1..5_u32))
                .prop_map(|(i, quantity)| CartOp::Add(i, quantity)),
            3 => slot.clone().prop_map(CartOp::Increment),
            3 => slot.clone().prop_map(CartOp::Decrement),
            1 => slot.clone().prop_map(CartOp::Remove),
            1 => (slot, "[a-z ]{0,8}").prop_map(|(i, notes)| CartOp::Notes(i, notes)),
            1 => Just(CartOp::Clear),
        ]
    }

    fn apply(cart: &mut CartEngine, op: CartOp) {
        let uuid = |i: usize| ItemUuid::new(POOL[i].0);
        match op {
            CartOp::Add(i, quantity) => cart.add_to_cart(
                item(POOL[i].0, POOL[i].1),
                AddOptions {
                    quantity: quantity.map(|q| Quantity::new(q).unwrap()),
                    notes: None,
                },
            ),
            CartOp::Increment(i) => cart.increment_quantity(&uuid(i)),
            CartOp::Decrement(i) => cart.decrement_quantity(&uuid(i)),
            CartOp::Remove(i) => cart.remove_from_cart(&uuid(i)),
            CartOp::Notes(i, notes) => cart.update_item_notes(&uuid(i), &notes),
            CartOp::Clear => cart.clear_cart(),
        }
    }

    proptest! {
        #[test]
        fn prop_cart_invariants_hold_for_any_sequence(
            ops in proptest::collection::vec(arb_op(), 0..40)
        ) {
            let (storage, mut cart) = engine();
            for op in ops {
                apply(&mut cart, op);
            }
            let entries = cart.entries();

            let count: u64 = entries.iter().map(|e| u64::from(e.quantity.get())).sum();
            prop_assert_eq!(cart.total_item_count(), count);

            let total: Decimal = entries
                .iter()
                .map(|e| e.item.price.amount() * Decimal::from(e.quantity.get()))
                .sum();
            prop_assert_eq!(cart.cart_total().amount(), total);

            prop_assert!(entries.iter().all(|e| e.quantity.get() > 0));
            let uuids: HashSet<&ItemUuid> = entries.iter().map(|e| &e.item.uuid).collect();
            prop_assert_eq!(uuids.len(), entries.len());
            prop_assert_eq!(cart.total_item_count() == 0, cart.is_empty());

            let reloaded = engine_on(&storage);
            prop_assert_eq!(reloaded.entries(), cart.entries());
        }
    }
}
