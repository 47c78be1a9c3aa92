//! In-memory content store
//!
//! The local substitute used for guest (not-signed-in) sessions, and the
//! store double the pipeline tests run against.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::model::{ContentItem, ItemStatus, Visibility};

use super::{ContentChanges, ContentStore, NewContent, StoreError};

/// A `ContentStore` backed by a process-local map.
#[derive(Default)]
pub struct MemoryContentStore {
    items: RwLock<HashMap<String, ContentItem>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store, keyed by item id.
    pub async fn seed(&self, items: Vec<ContentItem>) {
        let mut map = self.items.write().await;
        for item in items {
            map.insert(item.id.clone(), item);
        }
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn create(&self, item: NewContent) -> Result<ContentItem, StoreError> {
        let now = Utc::now();
        let created = ContentItem {
            id: Uuid::new_v4().to_string(),
            kind: item.kind,
            title: item.title,
            body: item.body,
            file_ref: None,
            category: item.category,
            tags: item.tags,
            visibility: item.visibility,
            owner_id: item.owner_id,
            status: ItemStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.items
            .write()
            .await
            .insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn get(&self, id: &str) -> Result<ContentItem, StoreError> {
        self.items
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<ContentItem>, StoreError> {
        let map = self.items.read().await;
        let mut items: Vec<ContentItem> = map
            .values()
            .filter(|i| i.owner_id == owner_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(items)
    }

    async fn update(&self, id: &str, changes: ContentChanges) -> Result<ContentItem, StoreError> {
        let mut map = self.items.write().await;
        let item = map
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if let Some(title) = changes.title {
            item.title = title;
        }
        if let Some(body) = changes.body {
            item.body = Some(body);
        }
        if let Some(category) = changes.category {
            item.category = category;
        }
        if let Some(tags) = changes.tags {
            item.tags = tags;
        }
        if let Some(visibility) = changes.visibility {
            item.visibility = visibility;
        }
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.items
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn duplicate(&self, id: &str) -> Result<ContentItem, StoreError> {
        let original = self.get(id).await?;
        let now = Utc::now();
        let copy = ContentItem {
            id: Uuid::new_v4().to_string(),
            title: format!("{} (copy)", original.title),
            visibility: Visibility::Private,
            created_at: now,
            updated_at: now,
            ..original
        };
        self.items
            .write()
            .await
            .insert(copy.id.clone(), copy.clone());
        Ok(copy)
    }

    async fn set_visibility(
        &self,
        id: &str,
        visibility: Visibility,
    ) -> Result<ContentItem, StoreError> {
        let mut map = self.items.write().await;
        let item = map
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        item.visibility = visibility;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentKind, GUEST_OWNER};

    fn new_note(title: &str) -> NewContent {
        NewContent {
            kind: ContentKind::Text,
            title: title.to_string(),
            body: None,
            category: "general".to_string(),
            tags: vec![],
            visibility: Visibility::Private,
            owner_id: GUEST_OWNER.to_string(),
            expiry: None,
        }
    }

    #[tokio::test]
    async fn test_create_get_delete_round_trip() {
        let store = MemoryContentStore::new();
        let created = store.create(new_note("Groceries")).await.unwrap();
        assert_eq!(store.get(&created.id).await.unwrap().title, "Groceries");

        store.delete(&created.id).await.unwrap();
        assert!(matches!(
            store.get(&created.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_gets_fresh_id_and_private_visibility() {
        let store = MemoryContentStore::new();
        let mut original = new_note("Reading list");
        original.visibility = Visibility::Public;
        let created = store.create(original).await.unwrap();

        let copy = store.duplicate(&created.id).await.unwrap();
        assert_ne!(copy.id, created.id);
        assert_eq!(copy.title, "Reading list (copy)");
        assert_eq!(copy.visibility, Visibility::Private);
    }

    #[tokio::test]
    async fn test_update_applies_only_set_fields() {
        let store = MemoryContentStore::new();
        let created = store.create(new_note("Draft")).await.unwrap();

        let updated = store
            .update(
                &created.id,
                ContentChanges {
                    title: Some("Final".to_string()),
                    ..ContentChanges::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.category, "general");
    }
}
