//! Boundary collaborator contracts
//!
//! The interpreter consumes its storage and auth collaborators through these
//! narrow async traits. Signed-in users get a remote-backed implementation,
//! guests a local one; the interpreter never knows which it holds.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AutoExpiry, ChatMessage, ContentItem, ContentKind, User, Visibility};

pub use memory::MemoryContentStore;

/// Failure reported by any backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("content item not found: {0}")]
    NotFound(String),

    #[error("store rejected the request: {0}")]
    Rejected(String),

    #[error("backing service unavailable: {0}")]
    Unavailable(String),
}

/// Fields for a new content item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContent {
    pub kind: ContentKind,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub visibility: Visibility,
    pub owner_id: String,
    #[serde(default)]
    pub expiry: Option<AutoExpiry>,
}

/// Partial update applied to an existing item. `None` fields are untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
}

impl ContentChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.category.is_none()
            && self.tags.is_none()
            && self.visibility.is_none()
    }
}

/// Content persistence operations the dispatcher may request.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn create(&self, item: NewContent) -> Result<ContentItem, StoreError>;
    async fn get(&self, id: &str) -> Result<ContentItem, StoreError>;
    async fn list(&self, owner_id: &str) -> Result<Vec<ContentItem>, StoreError>;
    async fn update(&self, id: &str, changes: ContentChanges) -> Result<ContentItem, StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
    async fn duplicate(&self, id: &str) -> Result<ContentItem, StoreError>;
    async fn set_visibility(
        &self,
        id: &str,
        visibility: Visibility,
    ) -> Result<ContentItem, StoreError>;
}

/// A scoped share link minted by the share-link collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLink {
    pub id: String,
    pub content_id: String,
    pub token: String,
    pub password_protected: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Share-link operations. Scoped-link rules (e.g. guests may not mint
/// links) are enforced by the implementation, not by the interpreter.
#[async_trait]
pub trait ShareLinkStore: Send + Sync {
    async fn create(
        &self,
        content_id: &str,
        password: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShareLink, StoreError>;
    async fn list(&self, content_id: &str) -> Result<Vec<ShareLink>, StoreError>;
    async fn delete(&self, link_id: &str) -> Result<(), StoreError>;
}

/// A persisted conversation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

/// Chat-history persistence. All operations are best-effort; callers fall
/// back to a local transcript when any of them fail.
#[async_trait]
pub trait ChatHistoryStore: Send + Sync {
    async fn create_session(&self, user_id: &str) -> Result<ChatSession, StoreError>;
    async fn load_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>, StoreError>;
    async fn append_message(
        &self,
        session_id: &str,
        message: &ChatMessage,
    ) -> Result<(), StoreError>;
    async fn touch(&self, session_id: &str) -> Result<(), StoreError>;
}

/// Yields the acting user, or `None` for an anonymous guest.
pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> Option<User>;
}
