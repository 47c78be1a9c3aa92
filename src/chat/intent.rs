//! Intent structures for conversational commands
//!
//! A classified message becomes one immutable [`Intent`] value carrying the
//! intent kind, the slots extracted for that kind, a confidence score, and
//! the gate's clarification/verification flags. Parameters are a tagged
//! union keyed by intent kind, so each handler sees only the fields its
//! contract requires.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{AutoExpiry, ContentItem, ContentKind, Visibility};

/// The closed set of operation categories a message can classify into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntentKind {
    Create,
    Retrieve,
    Update,
    Delete,
    Share,
    Protect,
    List,
    Duplicate,
    Search,
    Unknown,
}

impl IntentKind {
    /// Stable operation name recorded on the intent.
    pub fn operation_name(&self) -> &'static str {
        match self {
            IntentKind::Create => "create_content",
            IntentKind::Retrieve => "get_content",
            IntentKind::Update => "update_content",
            IntentKind::Delete => "delete_content",
            IntentKind::Share => "share_content",
            IntentKind::Protect => "protect_content",
            IntentKind::List => "list_content",
            IntentKind::Duplicate => "duplicate_content",
            IntentKind::Search => "search_content",
            IntentKind::Unknown => "unknown",
        }
    }

    /// Whether this intent mutates content and therefore completes through
    /// a UI surface rather than an eager store call.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            IntentKind::Create
                | IntentKind::Update
                | IntentKind::Delete
                | IntentKind::Share
                | IntentKind::Protect
        )
    }

    /// Whether this intent needs a resolved item reference before dispatch.
    pub fn needs_item_reference(&self) -> bool {
        matches!(
            self,
            IntentKind::Retrieve
                | IntentKind::Update
                | IntentKind::Delete
                | IntentKind::Share
                | IntentKind::Protect
                | IntentKind::Duplicate
        )
    }
}

/// Slots extracted for one intent, keyed by intent kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "lowercase")]
pub enum IntentParams {
    Create {
        kind: Option<ContentKind>,
        title: Option<String>,
        tags: Vec<String>,
        category: Option<String>,
        visibility: Option<Visibility>,
        expiry: Option<AutoExpiry>,
    },
    Retrieve {
        item: Option<ContentItem>,
    },
    Update {
        item: Option<ContentItem>,
        title: Option<String>,
        tags: Vec<String>,
        category: Option<String>,
        visibility: Option<Visibility>,
    },
    Delete {
        item: Option<ContentItem>,
    },
    Share {
        item: Option<ContentItem>,
        visibility: Option<Visibility>,
        link_expires_at: Option<DateTime<Utc>>,
    },
    Protect {
        item: Option<ContentItem>,
    },
    List {
        kind: Option<ContentKind>,
        category: Option<String>,
        tags: Vec<String>,
    },
    Duplicate {
        item: Option<ContentItem>,
    },
    Search {
        query: String,
    },
    Unknown,
}

impl IntentParams {
    /// The resolved item reference, for the intent kinds that carry one.
    pub fn item(&self) -> Option<&ContentItem> {
        match self {
            IntentParams::Retrieve { item }
            | IntentParams::Update { item, .. }
            | IntentParams::Delete { item }
            | IntentParams::Share { item, .. }
            | IntentParams::Protect { item }
            | IntentParams::Duplicate { item } => item.as_ref(),
            _ => None,
        }
    }

    /// Target visibility for SHARE intents (`None` elsewhere).
    pub fn share_visibility(&self) -> Option<Visibility> {
        match self {
            IntentParams::Share { visibility, .. } => *visibility,
            _ => None,
        }
    }
}

/// A classified user message, ready for the gate and dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub kind: IntentKind,
    pub operation_name: String,
    pub params: IntentParams,
    /// Heuristic certainty in [0, 1]; not a probability.
    pub confidence: f32,
    /// Question to ask instead of executing; set only by the gate.
    pub clarification_needed: Option<String>,
    /// Whether the caller must obtain explicit confirmation before the
    /// mutation is considered final.
    pub requires_verification: bool,
}

impl Intent {
    pub fn new(kind: IntentKind, params: IntentParams, confidence: f32) -> Self {
        Self {
            kind,
            operation_name: kind.operation_name().to_string(),
            params,
            confidence,
            clarification_needed: None,
            requires_verification: false,
        }
    }

    pub fn unknown() -> Self {
        Self::new(IntentKind::Unknown, IntentParams::Unknown, 0.0)
    }

    pub fn needs_clarification(&self) -> bool {
        self.clarification_needed.is_some()
    }
}
