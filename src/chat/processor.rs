//! Message processor
//!
//! The single entry point: wraps one user message through classifier →
//! gate → permission evaluator → dispatcher → formatter. Mutating intents
//! (CREATE, UPDATE, DELETE, SHARE, PROTECT) never execute eagerly; the
//! processor raises a [`ModalState`] and the surrounding UI drives the
//! dispatcher once the user has confirmed. Processing is strictly linear
//! and message-at-a-time; nothing here calls back into an earlier stage.

use std::sync::Arc;

use crate::chat::classifier::IntentClassifier;
use crate::chat::dispatch::Dispatcher;
use crate::chat::gate;
use crate::chat::intent::{Intent, IntentKind, IntentParams};
use crate::chat::permissions::{denial_message, Permissions};
use crate::chat::respond::{self, Reply};
use crate::history::HistoryRecorder;
use crate::model::{
    ChatMessage, ContentItem, ContentSeed, ErrorCode, ModalKind, ModalState, OperationResult, User,
    Visibility,
};
use crate::stores::{AuthProvider, ContentStore};

/// Everything the caller needs after one processed message.
#[derive(Debug)]
pub struct ProcessedMessage {
    pub user_message: ChatMessage,
    pub assistant_message: ChatMessage,
    pub intent: Intent,
    /// Which UI surface must complete the action, if any.
    pub modal: ModalState,
    /// Present only when an operation was dispatched this turn.
    pub result: Option<OperationResult>,
}

/// Orchestrates one conversation against an injected store and auth
/// provider.
pub struct MessageProcessor {
    classifier: IntentClassifier,
    dispatcher: Dispatcher,
    auth: Arc<dyn AuthProvider>,
    history: HistoryRecorder,
}

impl MessageProcessor {
    pub fn new(
        store: Arc<dyn ContentStore>,
        auth: Arc<dyn AuthProvider>,
        history: HistoryRecorder,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            dispatcher: Dispatcher::new(store),
            auth,
            history,
        }
    }

    /// The dispatcher the UI drives after a modal confirms a mutation.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Process one user message against the caller's item snapshot.
    ///
    /// The snapshot is borrowed and never mutated; after a successful
    /// dispatch the caller must refresh it.
    pub async fn process(&self, text: &str, snapshot: &[ContentItem]) -> ProcessedMessage {
        let user_message = ChatMessage::user(text);
        self.history.record(&user_message).await;

        let intent = gate::apply(self.classifier.classify(text, snapshot));
        let user = self.auth.current_user();

        let (reply, modal, result) = self.route(&intent, user.as_ref(), snapshot).await;

        let assistant_message = ChatMessage::assistant(reply.text, reply.suggestions);
        self.history.record(&assistant_message).await;

        ProcessedMessage {
            user_message,
            assistant_message,
            intent,
            modal,
            result,
        }
    }

    async fn route(
        &self,
        intent: &Intent,
        user: Option<&User>,
        snapshot: &[ContentItem],
    ) -> (Reply, ModalState, Option<OperationResult>) {
        if let Some(question) = &intent.clarification_needed {
            return (
                respond::clarification_reply(question),
                ModalState::closed(),
                None,
            );
        }

        if intent.kind == IntentKind::Unknown {
            return (respond::unknown_reply(), ModalState::closed(), None);
        }

        if let Some(denied) = Self::permission_check(intent, user) {
            let reply = respond::format_reply(intent.kind, &denied);
            return (reply, ModalState::closed(), Some(denied));
        }

        if intent.kind.is_mutating() {
            let modal = Self::modal_for(intent);
            let reply = respond::modal_reply(intent.kind, intent.requires_verification);
            return (reply, modal, None);
        }

        let result = self.dispatcher.dispatch(user, intent, snapshot).await;
        let reply = respond::format_reply(intent.kind, &result);
        (reply, ModalState::closed(), Some(result))
    }

    /// Evaluate the capability the intent needs on its resolved item.
    /// CREATE has no target item and is always permitted (guests create
    /// guest-owned items).
    fn permission_check(intent: &Intent, user: Option<&User>) -> Option<OperationResult> {
        let item = intent.params.item()?;
        let (allowed, action) = match intent.kind {
            IntentKind::Retrieve => (item.can_view(user), "view"),
            IntentKind::Update => (item.can_edit(user), "edit"),
            IntentKind::Delete => (item.can_delete(user), "delete"),
            IntentKind::Share => (item.can_share(user), "share"),
            IntentKind::Protect => (item.can_protect(user), "protect"),
            IntentKind::Duplicate => (item.can_duplicate(user), "duplicate"),
            _ => return None,
        };
        if allowed {
            None
        } else {
            tracing::debug!(intent = ?intent.kind, action, "permission denied before dispatch");
            Some(OperationResult::err(
                ErrorCode::PermissionDenied,
                denial_message(user, action),
            ))
        }
    }

    /// Build the modal the UI must raise for a mutating intent, seeded from
    /// the extracted slots.
    fn modal_for(intent: &Intent) -> ModalState {
        match &intent.params {
            IntentParams::Create {
                kind,
                title,
                tags,
                category,
                visibility,
                expiry,
            } => ModalState::open(
                ModalKind::ContentEdit,
                ContentSeed {
                    id: None,
                    kind: *kind,
                    title: title.clone(),
                    category: category.clone(),
                    tags: tags.clone(),
                    visibility: *visibility,
                    expiry: *expiry,
                    link_expires_at: None,
                },
            ),
            IntentParams::Update {
                item,
                title,
                tags,
                category,
                visibility,
            } => {
                let Some(item) = item.as_ref() else {
                    return ModalState::closed();
                };
                ModalState::open(
                    ModalKind::ContentEdit,
                    ContentSeed {
                        id: Some(item.id.clone()),
                        kind: Some(item.kind),
                        title: title.clone().or_else(|| Some(item.title.clone())),
                        category: category.clone().or_else(|| Some(item.category.clone())),
                        tags: if tags.is_empty() {
                            item.tags.clone()
                        } else {
                            tags.clone()
                        },
                        visibility: visibility.or(Some(item.visibility)),
                        expiry: None,
                        link_expires_at: None,
                    },
                )
            }
            IntentParams::Delete { item } => {
                let Some(item) = item.as_ref() else {
                    return ModalState::closed();
                };
                ModalState::open(
                    ModalKind::DeleteConfirm,
                    ContentSeed {
                        id: Some(item.id.clone()),
                        title: Some(item.title.clone()),
                        ..ContentSeed::default()
                    },
                )
            }
            IntentParams::Share {
                item,
                visibility,
                link_expires_at,
            } => {
                let Some(item) = item.as_ref() else {
                    return ModalState::closed();
                };
                ModalState::open(
                    ModalKind::Share,
                    ContentSeed {
                        id: Some(item.id.clone()),
                        title: Some(item.title.clone()),
                        visibility: Some(visibility.unwrap_or(Visibility::Public)),
                        link_expires_at: *link_expires_at,
                        ..ContentSeed::default()
                    },
                )
            }
            IntentParams::Protect { item } => {
                let Some(item) = item.as_ref() else {
                    return ModalState::closed();
                };
                ModalState::open(
                    ModalKind::Share,
                    ContentSeed {
                        id: Some(item.id.clone()),
                        title: Some(item.title.clone()),
                        visibility: Some(Visibility::Private),
                        ..ContentSeed::default()
                    },
                )
            }
            _ => ModalState::closed(),
        }
    }
}
