//! Conversational command pipeline
//!
//! ```text
//! Message → Classifier → Gate → Permission Evaluator → Dispatcher → Formatter
//! ```
//!
//! Control flow is strictly linear per incoming message; no component calls
//! back into an earlier one. Mutating intents are deferred to a modal
//! instead of executing eagerly.

pub mod classifier;
pub mod dispatch;
pub mod extract;
pub mod gate;
pub mod intent;
pub mod permissions;
pub mod processor;
pub mod respond;


pub use classifier::IntentClassifier;
pub use dispatch::Dispatcher;
pub use intent::{Intent, IntentKind, IntentParams};
pub use permissions::Permissions;
pub use processor::{MessageProcessor, ProcessedMessage};
pub use respond::Reply;
