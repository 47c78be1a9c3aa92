//! Clarification and verification gate
//!
//! Inspects a classified intent for missing required parameters and flags
//! intents whose side effects are irreversible or privacy-widening. A set
//! clarification question halts the pipeline for this message; there is no
//! multi-turn slot memory, the next message classifies independently.

use crate::chat::intent::{Intent, IntentKind, IntentParams};
use crate::model::{ContentKind, Visibility};

/// Question asked when CREATE is missing a content kind.
pub fn kind_question() -> String {
    let kinds: Vec<&str> = ContentKind::ALL.iter().map(|k| k.name()).collect();
    format!(
        "What type of content would you like to create? I can work with {}.",
        kinds.join(", ")
    )
}

/// Question asked when CREATE is missing a title.
pub const TITLE_QUESTION: &str = "What would you like to title this content?";

/// Question asked when an item-bound intent has no resolved reference.
pub const REFERENCE_QUESTION: &str = "Which content item would you like to work with?";

/// Apply the minimal parameter contract and the verification policy.
///
/// Returns the intent with `clarification_needed` and
/// `requires_verification` populated. When a clarification is set the
/// dispatcher must not run for this message.
pub fn apply(mut intent: Intent) -> Intent {
    intent.clarification_needed = missing_parameter_question(&intent);
    intent.requires_verification = requires_verification(&intent);
    intent
}

fn missing_parameter_question(intent: &Intent) -> Option<String> {
    match (&intent.kind, &intent.params) {
        (IntentKind::Create, IntentParams::Create { kind, title, .. }) => {
            if kind.is_none() {
                Some(kind_question())
            } else if title.is_none() {
                Some(TITLE_QUESTION.to_string())
            } else {
                None
            }
        }
        (kind, params) if kind.needs_item_reference() => {
            if params.item().is_none() {
                Some(REFERENCE_QUESTION.to_string())
            } else {
                None
            }
        }
        _ => None,
    }
}

/// DELETE and PROTECT always require explicit confirmation; SHARE only when
/// the target visibility is public. A share with no explicit visibility
/// defaults to public and is therefore also confirmed.
fn requires_verification(intent: &Intent) -> bool {
    match (&intent.kind, &intent.params) {
        (IntentKind::Delete, _) | (IntentKind::Protect, _) => true,
        (IntentKind::Share, IntentParams::Share { visibility, .. }) => {
            visibility.unwrap_or(Visibility::Public) == Visibility::Public
        }
        _ => false,
    }
}
