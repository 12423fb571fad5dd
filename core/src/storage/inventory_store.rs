//! Inventory store
//!
//! Whole-collection access to the inventory slot: `load` reads and decodes
//! every item, `save` re-encodes and replaces the whole array in a single
//! write. A value that no longer decodes is moved aside to a fresh
//! quarantine slot before the inventory is treated as empty; earlier
//! quarantined copies are kept.

use crate::config::{INVENTORY_KEY, INVENTORY_QUARANTINE_KEY};
use crate::database::Repository;
use crate::error::Result;
use crate::inventory::InventoryItem;

#[derive(Clone)]
pub struct InventoryStore {
    repo: Repository,
}

impl InventoryStore {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Read every stored item. Empty when nothing is stored or the stored
    /// value cannot be decoded.
    pub async fn load(&self) -> Result<Vec<InventoryItem>> {
        let Some(raw) = self.repo.get_value(INVENTORY_KEY).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<InventoryItem>>(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!(
                    "Stored inventory could not be decoded ({}); moving it aside and starting empty",
                    e
                );
                self.repo.quarantine(INVENTORY_QUARANTINE_KEY, &raw).await?;
                self.repo.delete_value(INVENTORY_KEY).await?;
                Ok(Vec::new())
            }
        }
    }

    /// Replace the stored collection with `items`
    pub async fn save(&self, items: &[InventoryItem]) -> Result<()> {
        let json = serde_json::to_string(items)?;
        self.repo.set_value(INVENTORY_KEY, &json).await?;

        tracing::debug!("Saved {} inventory items", items.len());
        Ok(())
    }

    /// Raw values moved aside by failed decodes, oldest first
    pub async fn quarantined(&self) -> Result<Vec<String>> {
        let entries = self.repo.quarantined(INVENTORY_QUARANTINE_KEY).await?;
        Ok(entries.into_iter().map(|(_, value)| value).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_memory_pool;
    use crate::inventory::{ItemId, ItemStatus};
    use chrono::NaiveDate;

    async fn create_test_store() -> (InventoryStore, Repository) {
        let repo = Repository::new(create_memory_pool().await.unwrap());
        (InventoryStore::new(repo.clone()), repo)
    }

    fn sample_items() -> Vec<InventoryItem> {
        let mut milk = InventoryItem::new(ItemId::from("1712000000000"), "Milk", ItemStatus::Active);
        milk.category = "dairy".to_string();
        milk.quantity = "1".to_string();
        milk.quantity_type = "l".to_string();
        milk.price = Some(1.49);
        milk.bought_date = NaiveDate::from_ymd_opt(2024, 4, 1);
        milk.expiration_date = NaiveDate::from_ymd_opt(2024, 4, 8);
        milk.notes = "semi-skimmed".to_string();

        let eggs = InventoryItem::new(ItemId::from("1712000000001"), "Eggs", ItemStatus::ToBuy);

        let mut apples =
            InventoryItem::new(ItemId::from("1712000000002"), "Apples", ItemStatus::InProgress);
        apples.image = Some("https://example.com/apples.jpg".to_string());

        vec![milk, eggs, apples]
    }

    #[tokio::test]
    async fn test_load_empty_store() {
        let (store, _repo) = create_test_store().await;

        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_round_trip() {
        let (store, _repo) = create_test_store().await;
        let items = sample_items();

        store.load().await.unwrap();
        store.save(&items).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, items);
    }

    #[tokio::test]
    async fn test_save_replaces_whole_collection() {
        let (store, _repo) = create_test_store().await;
        let items = sample_items();

        store.save(&items).await.unwrap();
        store.save(&items[..1]).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Milk");
    }

    #[tokio::test]
    async fn test_corrupt_value_is_quarantined() {
        let (store, repo) = create_test_store().await;
        repo.set_value(INVENTORY_KEY, "[{\"id\": ").await.unwrap();

        let loaded = store.load().await.unwrap();

        assert!(loaded.is_empty());
        assert_eq!(store.quarantined().await.unwrap(), vec!["[{\"id\": "]);
        assert_eq!(repo.get_value(INVENTORY_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_second_corruption_keeps_first_copy() {
        let (store, repo) = create_test_store().await;

        repo.set_value(INVENTORY_KEY, "[{\"name\": \"Milk\"}]").await.unwrap();
        store.load().await.unwrap();
        repo.set_value(INVENTORY_KEY, "not json").await.unwrap();
        store.load().await.unwrap();

        assert_eq!(
            store.quarantined().await.unwrap(),
            vec!["[{\"name\": \"Milk\"}]", "not json"]
        );
    }

    #[tokio::test]
    async fn test_unknown_status_keeps_other_items() {
        let (store, repo) = create_test_store().await;
        repo.set_value(
            INVENTORY_KEY,
            r#"[{"id": "1", "name": "Milk", "status": "active"},
                {"id": "2", "name": "Eggs", "status": "done", "inProgress": true}]"#,
        )
        .await
        .unwrap();

        let loaded = store.load().await.unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].status, ItemStatus::Active);
        assert_eq!(loaded[1].status, ItemStatus::InProgress);
        assert!(store.quarantined().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_legacy_array_loads() {
        let (store, repo) = create_test_store().await;
        repo.set_value(
            INVENTORY_KEY,
            r#"[{"id": 1, "name": "Yogurt", "toBuy": false, "inProgress": true, "price": "0,99"}]"#,
        )
        .await
        .unwrap();

        let loaded = store.load().await.unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].status, ItemStatus::InProgress);
        assert_eq!(loaded[0].price, Some(0.99));
    }
}
