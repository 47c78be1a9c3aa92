//! Domain types for the Stash content manager
//!
//! These are the value types the conversational interpreter reads and
//! produces. Content items themselves are owned by the backing stores; the
//! interpreter only works on caller-supplied snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Owner id used for content created by an unauthenticated, local-only user.
pub const GUEST_OWNER: &str = "guest";

/// An authenticated user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

/// The nine content kinds the application manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Code,
    Link,
    Image,
    Video,
    Audio,
    Document,
    Archive,
    Other,
}

impl ContentKind {
    /// All kinds, in display order.
    pub const ALL: [ContentKind; 9] = [
        ContentKind::Text,
        ContentKind::Code,
        ContentKind::Link,
        ContentKind::Image,
        ContentKind::Video,
        ContentKind::Audio,
        ContentKind::Document,
        ContentKind::Archive,
        ContentKind::Other,
    ];

    /// Canonical lower-case name, also the substring the extractor matches.
    pub fn name(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Code => "code",
            ContentKind::Link => "link",
            ContentKind::Image => "image",
            ContentKind::Video => "video",
            ContentKind::Audio => "audio",
            ContentKind::Document => "document",
            ContentKind::Archive => "archive",
            ContentKind::Other => "other",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Item visibility flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Public,
}

/// Lifecycle status of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Active,
    Archived,
}

/// Auto-expiry settings extracted from a message or carried on an item.
///
/// `expires_at` is only present when the message named an exact day count;
/// looser duration mentions enable expiry without a concrete timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoExpiry {
    pub enabled: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A stored content item.
///
/// The interpreter never mutates one of these; mutations go through the
/// injected [`ContentStore`](crate::stores::ContentStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub kind: ContentKind,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub file_ref: Option<String>,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub visibility: Visibility,
    pub owner_id: String,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_guest_owned(&self) -> bool {
        self.owner_id == GUEST_OWNER
    }
}

/// Error taxonomy returned as data from the dispatcher.
///
/// Nothing is thrown past the dispatcher boundary; every failure mode maps
/// to one of these codes inside an [`OperationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingParameter,
    NotFound,
    PermissionDenied,
    CreateFailed,
    UpdateFailed,
    DeleteFailed,
    ShareFailed,
    DuplicateFailed,
    ListFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingParameter => "MISSING_PARAMETER",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::CreateFailed => "CREATE_FAILED",
            ErrorCode::UpdateFailed => "UPDATE_FAILED",
            ErrorCode::DeleteFailed => "DELETE_FAILED",
            ErrorCode::ShareFailed => "SHARE_FAILED",
            ErrorCode::DuplicateFailed => "DUPLICATE_FAILED",
            ErrorCode::ListFailed => "LIST_FAILED",
        }
    }
}

/// Terminal result of a dispatched operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error_code: Option<ErrorCode>,
}

impl OperationResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error_code: None,
        }
    }

    pub fn ok_with(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error_code: None,
        }
    }

    pub fn err(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error_code: Some(code),
        }
    }
}

/// Which UI surface must complete an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModalKind {
    None,
    ContentEdit,
    Share,
    DeleteConfirm,
}

/// Partial content item used to seed a modal form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentSeed {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub kind: Option<ContentKind>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub expiry: Option<AutoExpiry>,
    /// Expiry for a scoped share link, handed to the share-link store by
    /// the share dialog.
    #[serde(default)]
    pub link_expires_at: Option<DateTime<Utc>>,
}

/// Signal to the caller that a UI surface must complete the action rather
/// than the dispatcher executing it directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModalState {
    pub kind: ModalKind,
    pub is_open: bool,
    #[serde(default)]
    pub seed: Option<ContentSeed>,
}

impl ModalState {
    pub fn closed() -> Self {
        Self {
            kind: ModalKind::None,
            is_open: false,
            seed: None,
        }
    }

    pub fn open(kind: ModalKind, seed: ContentSeed) -> Self {
        Self {
            kind,
            is_open: true,
            seed: Some(seed),
        }
    }
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A suggested follow-up action attached to an assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub action: String,
    pub label: String,
    pub description: String,
}

impl Suggestion {
    pub fn new(action: &str, label: &str, description: &str) -> Self {
        Self {
            action: action.to_string(),
            label: label.to_string(),
            description: description.to_string(),
        }
    }
}

/// One turn in the conversation, persisted best-effort by the history store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::User,
            text: text.into(),
            timestamp: Utc::now(),
            suggestions: Vec::new(),
        }
    }

    pub fn assistant(text: impl Into<String>, suggestions: Vec<Suggestion>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::Assistant,
            text: text.into(),
            timestamp: Utc::now(),
            suggestions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::PermissionDenied).unwrap();
        assert_eq!(json, "\"PERMISSION_DENIED\"");
        assert_eq!(ErrorCode::PermissionDenied.as_str(), "PERMISSION_DENIED");
    }

    #[test]
    fn test_kind_names_cover_all_variants() {
        let names: Vec<&str> = ContentKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), 9);
        assert!(names.contains(&"text"));
        assert!(names.contains(&"other"));
    }

    #[test]
    fn test_guest_ownership() {
        let item = sample_item();
        assert!(item.is_guest_owned());
        assert!(!item.is_public());
    }

    fn sample_item() -> ContentItem {
        ContentItem {
            id: "itm-1".to_string(),
            kind: ContentKind::Text,
            title: "Scratch note".to_string(),
            body: None,
            file_ref: None,
            category: "general".to_string(),
            tags: vec![],
            visibility: Visibility::Private,
            owner_id: GUEST_OWNER.to_string(),
            status: ItemStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
