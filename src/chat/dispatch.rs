//! Operation dispatcher
//!
//! One handler per intent kind. Each handler re-validates its required
//! parameters and the caller's permission independently of the gate and
//! evaluator, awaits the injected store call, and normalizes the outcome
//! into an [`OperationResult`]. Failures come back as data with a taxonomy
//! code; nothing propagates past this boundary.

use std::sync::Arc;

use serde_json::json;

use crate::chat::intent::{Intent, IntentKind, IntentParams};
use crate::chat::permissions::{denial_message, Permissions};
use crate::model::{
    ContentItem, ContentKind, ErrorCode, OperationResult, User, Visibility, GUEST_OWNER,
};
use crate::stores::{ContentChanges, ContentStore, NewContent};

/// Dispatches gated, permission-checked intents to the content store.
pub struct Dispatcher {
    store: Arc<dyn ContentStore>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Invoke the handler for the intent's kind.
    ///
    /// The message processor calls this directly for read-only intents; for
    /// mutating intents the surrounding UI calls it once the modal (and any
    /// required verification) has completed.
    pub async fn dispatch(
        &self,
        user: Option<&User>,
        intent: &Intent,
        snapshot: &[ContentItem],
    ) -> OperationResult {
        if intent.needs_clarification() {
            return OperationResult::err(
                ErrorCode::MissingParameter,
                intent
                    .clarification_needed
                    .clone()
                    .unwrap_or_else(|| "I need more detail to do that.".to_string()),
            );
        }

        match (&intent.kind, &intent.params) {
            (IntentKind::Create, IntentParams::Create { kind, title, tags, category, visibility, expiry }) => {
                self.handle_create(user, *kind, title.as_deref(), tags, category.as_deref(), *visibility, *expiry)
                    .await
            }
            (IntentKind::Retrieve, IntentParams::Retrieve { item }) => {
                self.handle_retrieve(user, item.as_ref()).await
            }
            (IntentKind::Update, IntentParams::Update { item, title, tags, category, visibility }) => {
                self.handle_update(user, item.as_ref(), title.clone(), tags, category.clone(), *visibility)
                    .await
            }
            (IntentKind::Delete, IntentParams::Delete { item }) => {
                self.handle_delete(user, item.as_ref()).await
            }
            (IntentKind::Share, IntentParams::Share { item, visibility, .. }) => {
                self.handle_share(user, item.as_ref(), *visibility).await
            }
            (IntentKind::Protect, IntentParams::Protect { item }) => {
                self.handle_protect(user, item.as_ref()).await
            }
            (IntentKind::List, IntentParams::List { kind, category, tags }) => {
                Self::handle_list(user, snapshot, *kind, category.as_deref(), tags)
            }
            (IntentKind::Duplicate, IntentParams::Duplicate { item }) => {
                self.handle_duplicate(user, item.as_ref()).await
            }
            (IntentKind::Search, IntentParams::Search { query }) => {
                Self::handle_search(user, snapshot, query)
            }
            _ => OperationResult {
                success: false,
                message: "I'm not sure what you'd like to do with your content.".to_string(),
                data: None,
                error_code: None,
            },
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn handle_create(
        &self,
        user: Option<&User>,
        kind: Option<ContentKind>,
        title: Option<&str>,
        tags: &[String],
        category: Option<&str>,
        visibility: Option<Visibility>,
        expiry: Option<crate::model::AutoExpiry>,
    ) -> OperationResult {
        let (Some(kind), Some(title)) = (kind, title) else {
            return OperationResult::err(
                ErrorCode::MissingParameter,
                "I need a content type and a title before I can create anything.",
            );
        };

        let owner_id = user
            .map(|u| u.id.clone())
            .unwrap_or_else(|| GUEST_OWNER.to_string());
        let new_content = NewContent {
            kind,
            title: title.to_string(),
            body: None,
            category: category.unwrap_or("general").to_string(),
            tags: tags.to_vec(),
            visibility: visibility.unwrap_or(Visibility::Private),
            owner_id,
            expiry,
        };

        match self.store.create(new_content).await {
            Ok(item) => OperationResult::ok_with(
                format!("Created {} \"{}\".", item.kind, item.title),
                json!({ "id": item.id, "title": item.title, "kind": item.kind }),
            ),
            Err(e) => {
                tracing::warn!(error = %e, "content store rejected create");
                OperationResult::err(
                    ErrorCode::CreateFailed,
                    format!("Sorry, I couldn't create that content: {e}"),
                )
            }
        }
    }

    async fn handle_retrieve(
        &self,
        user: Option<&User>,
        item: Option<&ContentItem>,
    ) -> OperationResult {
        let Some(item) = item else {
            return missing_item_result();
        };
        if !item.can_view(user) {
            return denied(user, "view");
        }

        match self.store.get(&item.id).await {
            Ok(fresh) => OperationResult::ok_with(
                format!("Here's \"{}\".", fresh.title),
                json!({ "id": fresh.id, "title": fresh.title, "kind": fresh.kind }),
            ),
            Err(e) => {
                tracing::warn!(item = %item.id, error = %e, "content store get failed");
                OperationResult::err(
                    ErrorCode::NotFound,
                    "I couldn't find that content item - it may have been removed.",
                )
            }
        }
    }

    async fn handle_update(
        &self,
        user: Option<&User>,
        item: Option<&ContentItem>,
        title: Option<String>,
        tags: &[String],
        category: Option<String>,
        visibility: Option<Visibility>,
    ) -> OperationResult {
        let Some(item) = item else {
            return missing_item_result();
        };
        if !item.can_edit(user) {
            return denied(user, "edit");
        }

        let changes = ContentChanges {
            title,
            body: None,
            category,
            tags: if tags.is_empty() {
                None
            } else {
                Some(tags.to_vec())
            },
            visibility,
        };

        match self.store.update(&item.id, changes).await {
            Ok(updated) => OperationResult::ok_with(
                format!("Updated \"{}\".", updated.title),
                json!({ "id": updated.id, "title": updated.title, "kind": updated.kind }),
            ),
            Err(e) => {
                tracing::warn!(item = %item.id, error = %e, "content store update failed");
                OperationResult::err(
                    ErrorCode::UpdateFailed,
                    format!("Sorry, I couldn't update \"{}\": {e}", item.title),
                )
            }
        }
    }

    async fn handle_delete(
        &self,
        user: Option<&User>,
        item: Option<&ContentItem>,
    ) -> OperationResult {
        let Some(item) = item else {
            return missing_item_result();
        };
        if !item.can_delete(user) {
            return denied(user, "delete");
        }

        match self.store.delete(&item.id).await {
            Ok(()) => OperationResult::ok_with(
                format!("Deleted \"{}\".", item.title),
                json!({ "id": item.id, "title": item.title }),
            ),
            Err(e) => {
                tracing::warn!(item = %item.id, error = %e, "content store delete failed");
                OperationResult::err(
                    ErrorCode::DeleteFailed,
                    format!("Sorry, I couldn't delete \"{}\": {e}", item.title),
                )
            }
        }
    }

    async fn handle_share(
        &self,
        user: Option<&User>,
        item: Option<&ContentItem>,
        visibility: Option<Visibility>,
    ) -> OperationResult {
        let Some(item) = item else {
            return missing_item_result();
        };
        if !item.can_share(user) {
            return denied(user, "share");
        }

        let target = visibility.unwrap_or(Visibility::Public);
        match self.store.set_visibility(&item.id, target).await {
            Ok(updated) => {
                let state = match target {
                    Visibility::Public => "public",
                    Visibility::Private => "private",
                };
                OperationResult::ok_with(
                    format!("\"{}\" is now {state}.", updated.title),
                    json!({ "id": updated.id, "title": updated.title, "visibility": target }),
                )
            }
            Err(e) => {
                tracing::warn!(item = %item.id, error = %e, "content store set_visibility failed");
                OperationResult::err(
                    ErrorCode::ShareFailed,
                    format!("Sorry, I couldn't change sharing for \"{}\": {e}", item.title),
                )
            }
        }
    }

    async fn handle_protect(
        &self,
        user: Option<&User>,
        item: Option<&ContentItem>,
    ) -> OperationResult {
        let Some(item) = item else {
            return missing_item_result();
        };
        if !item.can_protect(user) {
            return denied(user, "protect");
        }

        match self.store.set_visibility(&item.id, Visibility::Private).await {
            Ok(updated) => OperationResult::ok_with(
                format!("\"{}\" is now protected and private.", updated.title),
                json!({ "id": updated.id, "title": updated.title }),
            ),
            Err(e) => {
                tracing::warn!(item = %item.id, error = %e, "content store protect failed");
                OperationResult::err(
                    ErrorCode::UpdateFailed,
                    format!("Sorry, I couldn't protect \"{}\": {e}", item.title),
                )
            }
        }
    }

    async fn handle_duplicate(
        &self,
        user: Option<&User>,
        item: Option<&ContentItem>,
    ) -> OperationResult {
        let Some(item) = item else {
            return missing_item_result();
        };
        if !item.can_duplicate(user) {
            return denied(user, "duplicate");
        }

        match self.store.duplicate(&item.id).await {
            Ok(copy) => OperationResult::ok_with(
                format!("Duplicated \"{}\" as \"{}\".", item.title, copy.title),
                json!({ "id": copy.id, "title": copy.title, "kind": copy.kind }),
            ),
            Err(e) => {
                tracing::warn!(item = %item.id, error = %e, "content store duplicate failed");
                OperationResult::err(
                    ErrorCode::DuplicateFailed,
                    format!("Sorry, I couldn't duplicate \"{}\": {e}", item.title),
                )
            }
        }
    }

    /// LIST filters the caller's snapshot synchronously and never calls the
    /// store: kind, category, tag-set intersection, then view permission.
    fn handle_list(
        user: Option<&User>,
        snapshot: &[ContentItem],
        kind: Option<ContentKind>,
        category: Option<&str>,
        tags: &[String],
    ) -> OperationResult {
        let matches: Vec<&ContentItem> = snapshot
            .iter()
            .filter(|i| kind.is_none_or(|k| i.kind == k))
            .filter(|i| {
                category.is_none_or(|c| i.category.eq_ignore_ascii_case(c))
            })
            .filter(|i| {
                tags.is_empty()
                    || i.tags
                        .iter()
                        .any(|t| tags.iter().any(|f| t.eq_ignore_ascii_case(f)))
            })
            .filter(|i| i.can_view(user))
            .collect();

        let payload: Vec<serde_json::Value> = matches
            .iter()
            .map(|i| json!({ "id": i.id, "title": i.title, "kind": i.kind }))
            .collect();

        let message = match matches.len() {
            0 => "I didn't find any matching content.".to_string(),
            1 => "Found 1 item.".to_string(),
            n => format!("Found {n} items."),
        };
        OperationResult::ok_with(message, json!(payload))
    }

    /// SEARCH scans titles, bodies, and tags of viewable snapshot items.
    fn handle_search(user: Option<&User>, snapshot: &[ContentItem], query: &str) -> OperationResult {
        let needle = query.to_lowercase();
        let matches: Vec<&ContentItem> = snapshot
            .iter()
            .filter(|i| i.can_view(user))
            .filter(|i| {
                i.title.to_lowercase().contains(&needle)
                    || i.body
                        .as_deref()
                        .is_some_and(|b| b.to_lowercase().contains(&needle))
                    || i.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            })
            .collect();

        let payload: Vec<serde_json::Value> = matches
            .iter()
            .map(|i| json!({ "id": i.id, "title": i.title, "kind": i.kind }))
            .collect();

        let message = match matches.len() {
            0 => format!("No results for \"{query}\"."),
            1 => format!("Found 1 result for \"{query}\"."),
            n => format!("Found {n} results for \"{query}\"."),
        };
        OperationResult::ok_with(message, json!(payload))
    }
}

fn missing_item_result() -> OperationResult {
    OperationResult::err(
        ErrorCode::MissingParameter,
        "I couldn't tell which content item you meant.",
    )
}

fn denied(user: Option<&User>, action: &str) -> OperationResult {
    tracing::debug!(action, anonymous = user.is_none(), "permission denied");
    OperationResult::err(ErrorCode::PermissionDenied, denial_message(user, action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AutoExpiry, ItemStatus};
    use crate::stores::{MemoryContentStore, StoreError};
    use async_trait::async_trait;
    use chrono::Utc;

    fn item(id: &str, owner: &str, title: &str, tags: &[&str]) -> ContentItem {
        ContentItem {
            id: id.to_string(),
            kind: ContentKind::Text,
            title: title.to_string(),
            body: None,
            file_ref: None,
            category: "general".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            visibility: Visibility::Private,
            owner_id: owner.to_string(),
            status: ItemStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: format!("{id}@example.com"),
        }
    }

    fn delete_intent(item: Option<ContentItem>) -> Intent {
        Intent::new(IntentKind::Delete, IntentParams::Delete { item }, 0.9)
    }

    async fn dispatcher_with(items: Vec<ContentItem>) -> Dispatcher {
        let store = MemoryContentStore::new();
        store.seed(items).await;
        Dispatcher::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_is_permission_denied() {
        let target = item("a1", "alice", "Python Notes", &[]);
        let dispatcher = dispatcher_with(vec![target.clone()]).await;

        let result = dispatcher
            .dispatch(Some(&user("bob")), &delete_intent(Some(target)), &[])
            .await;

        assert!(!result.success);
        assert_eq!(result.error_code, Some(ErrorCode::PermissionDenied));
        assert_eq!(
            result.message,
            "You don't have permission to delete this content."
        );
    }

    #[tokio::test]
    async fn test_anonymous_delete_of_owned_item_asks_to_sign_in() {
        let target = item("a1", "alice", "Python Notes", &[]);
        let dispatcher = dispatcher_with(vec![target.clone()]).await;

        let result = dispatcher
            .dispatch(None, &delete_intent(Some(target)), &[])
            .await;

        assert_eq!(result.error_code, Some(ErrorCode::PermissionDenied));
        assert_eq!(result.message, "You must sign in to delete this content.");
    }

    #[tokio::test]
    async fn test_delete_by_owner_succeeds() {
        let target = item("a1", "alice", "Python Notes", &[]);
        let dispatcher = dispatcher_with(vec![target.clone()]).await;

        let result = dispatcher
            .dispatch(Some(&user("alice")), &delete_intent(Some(target)), &[])
            .await;

        assert!(result.success);
        assert_eq!(result.message, "Deleted \"Python Notes\".");
    }

    #[tokio::test]
    async fn test_create_happy_path_returns_payload() {
        let dispatcher = dispatcher_with(vec![]).await;
        let intent = Intent::new(
            IntentKind::Create,
            IntentParams::Create {
                kind: Some(ContentKind::Code),
                title: Some("Quicksort".to_string()),
                tags: vec!["algorithms".to_string()],
                category: None,
                visibility: None,
                expiry: Some(AutoExpiry {
                    enabled: true,
                    expires_at: None,
                }),
            },
            0.9,
        );

        let result = dispatcher.dispatch(None, &intent, &[]).await;
        assert!(result.success);
        assert_eq!(result.message, "Created code \"Quicksort\".");
        let data = result.data.unwrap();
        assert_eq!(data["title"], "Quicksort");
        assert!(data["id"].is_string());
    }

    #[tokio::test]
    async fn test_create_without_title_is_missing_parameter() {
        let dispatcher = dispatcher_with(vec![]).await;
        let intent = Intent::new(
            IntentKind::Create,
            IntentParams::Create {
                kind: Some(ContentKind::Text),
                title: None,
                tags: vec![],
                category: None,
                visibility: None,
                expiry: None,
            },
            0.9,
        );

        let result = dispatcher.dispatch(None, &intent, &[]).await;
        assert_eq!(result.error_code, Some(ErrorCode::MissingParameter));
    }

    #[tokio::test]
    async fn test_list_filters_by_tag_intersection() {
        let dispatcher = dispatcher_with(vec![]).await;
        let snapshot = vec![
            item("a1", GUEST_OWNER, "Python utils", &["python", "util"]),
            item("b2", GUEST_OWNER, "Java notes", &["java"]),
        ];
        let intent = Intent::new(
            IntentKind::List,
            IntentParams::List {
                kind: None,
                category: None,
                tags: vec!["python".to_string()],
            },
            0.8,
        );

        let result = dispatcher.dispatch(None, &intent, &snapshot).await;
        assert!(result.success);
        let data = result.data.unwrap();
        let rows = data.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "a1");
    }

    #[tokio::test]
    async fn test_list_excludes_items_the_user_cannot_view() {
        let dispatcher = dispatcher_with(vec![]).await;
        let mut public = item("a1", "alice", "Shared recipe", &[]);
        public.visibility = Visibility::Public;
        let private = item("b2", "alice", "Secret plan", &[]);
        let snapshot = vec![public, private];

        let intent = Intent::new(
            IntentKind::List,
            IntentParams::List {
                kind: None,
                category: None,
                tags: vec![],
            },
            0.8,
        );
        let result = dispatcher.dispatch(Some(&user("bob")), &intent, &snapshot).await;
        let data = result.data.unwrap();
        assert_eq!(data.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_share_defaults_to_public_and_search_scans_tags() {
        let target = item("a1", GUEST_OWNER, "Reading list", &["books"]);
        let dispatcher = dispatcher_with(vec![target.clone()]).await;

        let share = Intent::new(
            IntentKind::Share,
            IntentParams::Share {
                item: Some(target.clone()),
                visibility: None,
                link_expires_at: None,
            },
            0.9,
        );
        let result = dispatcher.dispatch(None, &share, &[]).await;
        assert!(result.success);
        assert_eq!(result.message, "\"Reading list\" is now public.");

        let search = Intent::new(
            IntentKind::Search,
            IntentParams::Search {
                query: "books".to_string(),
            },
            0.7,
        );
        let result = dispatcher.dispatch(None, &search, &[target]).await;
        assert!(result.success);
        assert_eq!(result.data.unwrap().as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_maps_to_operation_code() {
        struct FailingStore;

        #[async_trait]
        impl ContentStore for FailingStore {
            async fn create(&self, _: NewContent) -> Result<ContentItem, StoreError> {
                Err(StoreError::Unavailable("connection reset".to_string()))
            }
            async fn get(&self, id: &str) -> Result<ContentItem, StoreError> {
                Err(StoreError::NotFound(id.to_string()))
            }
            async fn list(&self, _: &str) -> Result<Vec<ContentItem>, StoreError> {
                Err(StoreError::Unavailable("connection reset".to_string()))
            }
            async fn update(&self, _: &str, _: ContentChanges) -> Result<ContentItem, StoreError> {
                Err(StoreError::Unavailable("connection reset".to_string()))
            }
            async fn delete(&self, _: &str) -> Result<(), StoreError> {
                Err(StoreError::Unavailable("connection reset".to_string()))
            }
            async fn duplicate(&self, _: &str) -> Result<ContentItem, StoreError> {
                Err(StoreError::Unavailable("connection reset".to_string()))
            }
            async fn set_visibility(
                &self,
                _: &str,
                _: Visibility,
            ) -> Result<ContentItem, StoreError> {
                Err(StoreError::Unavailable("connection reset".to_string()))
            }
        }

        let dispatcher = Dispatcher::new(Arc::new(FailingStore));
        let target = item("a1", GUEST_OWNER, "Doomed", &[]);

        let result = dispatcher
            .dispatch(None, &delete_intent(Some(target.clone())), &[])
            .await;
        assert!(!result.success);
        assert_eq!(result.error_code, Some(ErrorCode::DeleteFailed));
        assert!(result.message.contains("connection reset"));

        let share = Intent::new(
            IntentKind::Share,
            IntentParams::Share {
                item: Some(target),
                visibility: Some(Visibility::Public),
                link_expires_at: None,
            },
            0.9,
        );
        let result = dispatcher.dispatch(None, &share, &[]).await;
        assert_eq!(result.error_code, Some(ErrorCode::ShareFailed));
    }
}
