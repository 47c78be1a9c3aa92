//! Conversational command interpreter for the Stash personal content
//! manager.
//!
//! Users store, tag, and share items of nine content kinds; this crate
//! turns a free-text command ("delete my python notes", "make this
//! public") into a classified intent, extracts structured parameters,
//! checks permissions, invokes the matching content operation through an
//! injected store, and renders a reply with suggested next steps.
//!
//! Classification is deterministic keyword/phrase matching - there is no
//! language-model inference anywhere in this crate. Storage, auth, and
//! chat-history collaborators are consumed through the narrow traits in
//! [`stores`].

pub mod chat;
pub mod history;
pub mod model;
pub mod stores;

pub use chat::{Dispatcher, Intent, IntentClassifier, IntentKind, IntentParams, MessageProcessor,
               ProcessedMessage, Reply};
pub use history::HistoryRecorder;
pub use model::{
    ChatMessage, ContentItem, ContentKind, ErrorCode, ModalKind, ModalState, OperationResult,
    Suggestion, User, Visibility, GUEST_OWNER,
};
pub use stores::{AuthProvider, ChatHistoryStore, ContentStore, ShareLinkStore, StoreError};
