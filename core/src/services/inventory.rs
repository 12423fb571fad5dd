//! Inventory service
//!
//! Every operation follows the same cycle: load the whole list, mutate it in
//! memory, save the whole list back. Concurrent mutations race and the last
//! write wins.

use crate::config::{LIST_EXPIRES_SOON_DAYS, MAX_ITEM_NAME_LENGTH, MAX_NOTES_LENGTH};
use crate::error::{AppError, Result};
use crate::inventory::{
    IdGenerator, InventoryItem, ItemId, ItemStatus, NewItemRequest, UpdateItemRequest,
};
use crate::services::scan::ScannedItem;
use crate::stats::{today, DashboardSummary};
use crate::storage::InventoryStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// List views offered by the inventory screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemFilter {
    #[default]
    All,
    ToBuy,
    /// Acquired items expiring within [`LIST_EXPIRES_SOON_DAYS`], expired included
    ExpiresSoon,
    InProgress,
}

impl ItemFilter {
    pub fn matches(self, item: &InventoryItem, today: NaiveDate) -> bool {
        match self {
            ItemFilter::All => true,
            ItemFilter::ToBuy => item.is_to_buy(),
            ItemFilter::InProgress => item.is_in_progress(),
            ItemFilter::ExpiresSoon => {
                !item.is_to_buy()
                    && item
                        .days_until_expiration(today)
                        .is_some_and(|days| days <= LIST_EXPIRES_SOON_DAYS)
            }
        }
    }
}

/// Service for managing inventory items
#[derive(Clone)]
pub struct InventoryService {
    store: InventoryStore,
    ids: Arc<IdGenerator>,
}

impl InventoryService {
    pub fn new(store: InventoryStore) -> Self {
        Self {
            store,
            ids: Arc::new(IdGenerator::new()),
        }
    }

    /// Load the whole list and make sure no stored id is handed out again
    async fn load(&self) -> Result<Vec<InventoryItem>> {
        let items = self.store.load().await?;
        for item in &items {
            self.ids.observe(&item.id);
        }
        Ok(items)
    }

    pub async fn list_items(&self) -> Result<Vec<InventoryItem>> {
        self.load().await
    }

    pub async fn get_item(&self, id: &ItemId) -> Result<InventoryItem> {
        self.load()
            .await?
            .into_iter()
            .find(|item| &item.id == id)
            .ok_or_else(|| AppError::ItemNotFound(id.to_string()))
    }

    /// Items shown for a list filter, in stored order
    pub async fn filter_items(&self, filter: ItemFilter, today: NaiveDate) -> Result<Vec<InventoryItem>> {
        let items = self.load().await?;
        Ok(items
            .into_iter()
            .filter(|item| filter.matches(item, today))
            .collect())
    }

    pub async fn dashboard(&self, today: NaiveDate) -> Result<DashboardSummary> {
        let items = self.load().await?;
        Ok(DashboardSummary::compute(&items, today))
    }

    /// Manually add an item: to the shopping list when `to_buy` is set,
    /// otherwise straight into the pantry.
    pub async fn add_item(&self, req: NewItemRequest) -> Result<InventoryItem> {
        tracing::info!("Adding item: {}", req.name);

        let mut items = self.load().await?;

        let status = if req.to_buy {
            ItemStatus::ToBuy
        } else {
            ItemStatus::Active
        };

        let mut item = InventoryItem::new(self.ids.next_id(), req.name.trim(), status);
        item.category = req.category.trim().to_string();
        item.quantity = req.quantity.trim().to_string();
        item.quantity_type = req.quantity_type.trim().to_string();
        item.notes = req.notes;

        if !req.to_buy {
            item.price = req.price;
            item.bought_date = Some(req.bought_date.unwrap_or_else(today));
            item.expiration_date = req.expiration_date;
            item.image = req.image.filter(|uri| !uri.trim().is_empty());
        }

        validate_item(&item)?;

        items.push(item.clone());
        self.store.save(&items).await?;

        tracing::info!("Item added: {} ({})", item.id, item.status);
        Ok(item)
    }

    /// Add the accepted results of a photo scan as in-progress items bought today
    pub async fn add_scanned_items(&self, scanned: &[ScannedItem]) -> Result<Vec<InventoryItem>> {
        if scanned.is_empty() {
            return Err(AppError::Validation("No scanned items to add".to_string()));
        }

        let mut items = self.load().await?;
        let bought = today();
        let mut added = Vec::with_capacity(scanned.len());

        for entry in scanned {
            let mut item =
                InventoryItem::new(self.ids.next_id(), entry.name.trim(), ItemStatus::InProgress);
            item.category = entry.item_category.trim().to_string();
            item.quantity = entry.quantity_estimate.trim().to_string();
            item.quantity_type = entry.quantity_estimate_type.trim().to_string();
            item.bought_date = Some(bought);

            validate_item(&item)?;
            added.push(item);
        }

        items.extend(added.iter().cloned());
        self.store.save(&items).await?;

        tracing::info!("Added {} scanned items", added.len());
        Ok(added)
    }

    /// Apply a partial edit. Status is left unchanged.
    pub async fn update_item(&self, req: UpdateItemRequest) -> Result<InventoryItem> {
        tracing::info!("Updating item: {}", req.id);

        let mut items = self.load().await?;
        let item = find_mut(&mut items, &req.id)?;

        let mut updated = item.clone();
        req.apply_to(&mut updated);
        validate_item(&updated)?;
        *item = updated.clone();

        self.store.save(&items).await?;

        Ok(updated)
    }

    pub async fn delete_item(&self, id: &ItemId) -> Result<()> {
        tracing::info!("Deleting item: {}", id);

        let mut items = self.load().await?;
        let before = items.len();
        items.retain(|item| &item.id != id);

        if items.len() == before {
            return Err(AppError::ItemNotFound(id.to_string()));
        }

        self.store.save(&items).await
    }

    /// Move a shopping-list item to in-progress, stamping today's date as
    /// the bought date when none is recorded.
    pub async fn mark_bought(&self, id: &ItemId) -> Result<InventoryItem> {
        let mut items = self.load().await?;
        let item = find_mut(&mut items, id)?;

        if item.status != ItemStatus::ToBuy {
            return Err(AppError::InvalidTransition {
                id: id.to_string(),
                action: "mark as bought",
                status: item.status.as_str(),
            });
        }

        item.status = ItemStatus::InProgress;
        if item.bought_date.is_none() {
            item.bought_date = Some(today());
        }
        let bought = item.clone();

        self.store.save(&items).await?;

        tracing::info!("Item marked as bought: {}", id);
        Ok(bought)
    }

    /// Finish an in-progress item. The edits are applied first; the result
    /// must carry price, expiration date, quantity and quantity type.
    pub async fn mark_done(&self, edits: UpdateItemRequest) -> Result<InventoryItem> {
        let mut items = self.load().await?;
        let item = find_mut(&mut items, &edits.id)?;

        if item.status != ItemStatus::InProgress {
            return Err(AppError::InvalidTransition {
                id: edits.id.to_string(),
                action: "mark as done",
                status: item.status.as_str(),
            });
        }

        let mut done = item.clone();
        edits.apply_to(&mut done);
        validate_item(&done)?;

        let missing = done.missing_completion_fields();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Please fill in all fields: {}",
                missing.join(", ")
            )));
        }

        done.status = ItemStatus::Active;
        *item = done.clone();

        self.store.save(&items).await?;

        tracing::info!("Item marked as done: {}", edits.id);
        Ok(done)
    }
}

fn find_mut<'a>(items: &'a mut [InventoryItem], id: &ItemId) -> Result<&'a mut InventoryItem> {
    items
        .iter_mut()
        .find(|item| &item.id == id)
        .ok_or_else(|| AppError::ItemNotFound(id.to_string()))
}

fn validate_item(item: &InventoryItem) -> Result<()> {
    if item.name.trim().is_empty() {
        return Err(AppError::Validation("Item name is required".to_string()));
    }
    if item.name.chars().count() > MAX_ITEM_NAME_LENGTH {
        return Err(AppError::Validation(format!(
            "Item name must be at most {} characters",
            MAX_ITEM_NAME_LENGTH
        )));
    }
    if item.notes.chars().count() > MAX_NOTES_LENGTH {
        return Err(AppError::Validation(format!(
            "Notes must be at most {} characters",
            MAX_NOTES_LENGTH
        )));
    }
    if item.price.is_some_and(|price| !price.is_finite() || price < 0.0) {
        return Err(AppError::Validation(
            "Price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, Repository};
    use chrono::Duration;

    async fn create_test_service() -> InventoryService {
        let repo = Repository::new(create_memory_pool().await.unwrap());
        InventoryService::new(InventoryStore::new(repo))
    }

    fn new_item(name: &str, to_buy: bool) -> NewItemRequest {
        NewItemRequest {
            name: name.to_string(),
            to_buy,
            ..NewItemRequest::default()
        }
    }

    fn scanned(name: &str) -> ScannedItem {
        ScannedItem {
            name: name.to_string(),
            quantity_estimate: "2".to_string(),
            quantity_estimate_type: "pcs".to_string(),
            item_category: "fruit".to_string(),
            confidence_score: Some(0.9),
        }
    }

    #[tokio::test]
    async fn test_add_item_to_pantry_defaults_bought_date() {
        let service = create_test_service().await;

        let item = service
            .add_item(NewItemRequest {
                name: "  Cheese ".to_string(),
                price: Some(4.2),
                ..NewItemRequest::default()
            })
            .await
            .unwrap();

        assert_eq!(item.name, "Cheese");
        assert_eq!(item.status, ItemStatus::Active);
        assert_eq!(item.bought_date, Some(today()));
        assert_eq!(item.price, Some(4.2));

        let stored = service.list_items().await.unwrap();
        assert_eq!(stored, vec![item]);
    }

    #[tokio::test]
    async fn test_add_item_to_shopping_list_drops_purchase_fields() {
        let service = create_test_service().await;

        let item = service
            .add_item(NewItemRequest {
                name: "Bread".to_string(),
                price: Some(2.0),
                expiration_date: NaiveDate::from_ymd_opt(2030, 1, 1),
                image: Some("file:///bread.jpg".to_string()),
                to_buy: true,
                ..NewItemRequest::default()
            })
            .await
            .unwrap();

        assert_eq!(item.status, ItemStatus::ToBuy);
        assert_eq!(item.price, None);
        assert_eq!(item.bought_date, None);
        assert_eq!(item.expiration_date, None);
        assert_eq!(item.image, None);
    }

    #[tokio::test]
    async fn test_add_item_validation() {
        let service = create_test_service().await;

        let blank = service.add_item(new_item("   ", false)).await;
        assert!(matches!(blank, Err(AppError::Validation(_))));

        let long = service
            .add_item(new_item(&"a".repeat(MAX_ITEM_NAME_LENGTH + 1), false))
            .await;
        assert!(matches!(long, Err(AppError::Validation(_))));

        assert!(service.list_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let service = create_test_service().await;

        let a = service.add_item(new_item("A", true)).await.unwrap();
        let b = service.add_item(new_item("B", true)).await.unwrap();
        let c = service.add_item(new_item("C", true)).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
        assert_ne!(a.id, c.id);
    }

    #[tokio::test]
    async fn test_new_ids_follow_stored_ids() {
        let repo = Repository::new(create_memory_pool().await.unwrap());
        let future = InventoryItem::new(ItemId::from("9999999999999"), "Honey", ItemStatus::Active);
        InventoryStore::new(repo.clone()).save(&[future]).await.unwrap();

        let service = InventoryService::new(InventoryStore::new(repo.clone()));
        let manual = service.add_item(new_item("Jam", true)).await.unwrap();
        assert_eq!(manual.id.as_str(), "10000000000000");

        let service = InventoryService::new(InventoryStore::new(repo));
        let from_scan = service.add_scanned_items(&[scanned("Plum")]).await.unwrap();
        assert_eq!(from_scan[0].id.as_str(), "10000000000001");
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let service = create_test_service().await;
        let item = service.add_item(new_item("Milk", true)).await.unwrap();

        let bought = service.mark_bought(&item.id).await.unwrap();
        assert_eq!(bought.status, ItemStatus::InProgress);
        assert_eq!(bought.bought_date, Some(today()));

        let mut edits = UpdateItemRequest::new(item.id.clone());
        edits.price = Some(Some(1.29));
        edits.expiration_date = Some(Some(today() + Duration::days(7)));
        edits.quantity = Some("1".to_string());
        edits.quantity_type = Some("l".to_string());

        let done = service.mark_done(edits).await.unwrap();
        assert_eq!(done.status, ItemStatus::Active);
        assert_eq!(done.price, Some(1.29));

        let stored = service.get_item(&item.id).await.unwrap();
        assert_eq!(stored, done);
    }

    #[tokio::test]
    async fn test_mark_done_requires_completion_fields() {
        let service = create_test_service().await;
        let item = service.add_item(new_item("Rice", true)).await.unwrap();
        service.mark_bought(&item.id).await.unwrap();

        let mut edits = UpdateItemRequest::new(item.id.clone());
        edits.price = Some(Some(3.0));

        let result = service.mark_done(edits).await;
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg.contains("expiration date")));

        let stored = service.get_item(&item.id).await.unwrap();
        assert_eq!(stored.status, ItemStatus::InProgress);
        assert_eq!(stored.price, None);
    }

    #[tokio::test]
    async fn test_invalid_transitions_rejected() {
        let service = create_test_service().await;
        let active = service.add_item(new_item("Salt", false)).await.unwrap();
        let to_buy = service.add_item(new_item("Pepper", true)).await.unwrap();

        let result = service.mark_bought(&active.id).await;
        assert!(matches!(result, Err(AppError::InvalidTransition { .. })));

        let result = service.mark_done(UpdateItemRequest::new(to_buy.id.clone())).await;
        assert!(matches!(result, Err(AppError::InvalidTransition { .. })));

        let result = service.mark_done(UpdateItemRequest::new(active.id.clone())).await;
        assert!(matches!(result, Err(AppError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let service = create_test_service().await;
        let item = service.add_item(new_item("Butter", false)).await.unwrap();

        let mut edits = UpdateItemRequest::new(item.id.clone());
        edits.notes = Some("unsalted".to_string());
        edits.price = Some(Some(2.5));
        let updated = service.update_item(edits).await.unwrap();
        assert_eq!(updated.notes, "unsalted");
        assert_eq!(updated.status, ItemStatus::Active);

        service.delete_item(&item.id).await.unwrap();
        assert!(service.list_items().await.unwrap().is_empty());

        let missing = service.delete_item(&item.id).await;
        assert!(matches!(missing, Err(AppError::ItemNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_unknown_item() {
        let service = create_test_service().await;

        let result = service
            .update_item(UpdateItemRequest::new(ItemId::from("404")))
            .await;

        assert!(matches!(result, Err(AppError::ItemNotFound(id)) if id == "404"));
    }

    #[tokio::test]
    async fn test_add_scanned_items() {
        let service = create_test_service().await;

        let added = service
            .add_scanned_items(&[scanned("Apple"), scanned("Pear")])
            .await
            .unwrap();

        assert_eq!(added.len(), 2);
        for item in &added {
            assert_eq!(item.status, ItemStatus::InProgress);
            assert_eq!(item.bought_date, Some(today()));
            assert_eq!(item.quantity, "2");
            assert_eq!(item.quantity_type, "pcs");
            assert_eq!(item.category, "fruit");
        }

        let empty = service.add_scanned_items(&[]).await;
        assert!(matches!(empty, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_filters() {
        let service = create_test_service().await;
        let today = today();

        service.add_item(new_item("List item", true)).await.unwrap();

        let mut soon = new_item("Soon", false);
        soon.expiration_date = Some(today + Duration::days(4));
        service.add_item(soon).await.unwrap();

        let mut expired = new_item("Expired", false);
        expired.expiration_date = Some(today - Duration::days(2));
        service.add_item(expired).await.unwrap();

        let mut later = new_item("Later", false);
        later.expiration_date = Some(today + Duration::days(5));
        service.add_item(later).await.unwrap();

        service.add_scanned_items(&[scanned("Kiwi")]).await.unwrap();

        let names = |items: Vec<InventoryItem>| -> Vec<String> {
            items.into_iter().map(|item| item.name).collect()
        };

        assert_eq!(service.filter_items(ItemFilter::All, today).await.unwrap().len(), 5);
        assert_eq!(
            names(service.filter_items(ItemFilter::ToBuy, today).await.unwrap()),
            vec!["List item"]
        );
        assert_eq!(
            names(service.filter_items(ItemFilter::ExpiresSoon, today).await.unwrap()),
            vec!["Soon", "Expired"]
        );
        assert_eq!(
            names(service.filter_items(ItemFilter::InProgress, today).await.unwrap()),
            vec!["Kiwi"]
        );
    }

    #[tokio::test]
    async fn test_dashboard_counts() {
        let service = create_test_service().await;
        let today = today();

        service.add_item(new_item("Eggs", true)).await.unwrap();
        let mut yogurt = new_item("Yogurt", false);
        yogurt.expiration_date = Some(today + Duration::days(3));
        yogurt.price = Some(0.8);
        service.add_item(yogurt).await.unwrap();

        let summary = service.dashboard(today).await.unwrap();

        assert_eq!(summary.stats.total, 2);
        assert_eq!(summary.stats.to_buy, 1);
        assert_eq!(summary.stats.expires_soon, 1);
        assert_eq!(summary.expiration_windows.within_week, 1);
        assert_eq!(summary.purchases.this_month, 1);
        assert!((summary.spending.this_month - 0.8).abs() < f64::EPSILON);
    }
}
