//! Response formatting
//!
//! Converts an operation outcome into the assistant-facing reply plus a
//! small set of suggested follow-up actions.

use crate::chat::intent::IntentKind;
use crate::model::{OperationResult, Suggestion};

/// An assistant reply: the text shown to the user and up to three
/// suggested next actions.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub suggestions: Vec<Suggestion>,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            suggestions: Vec::new(),
        }
    }
}

/// Reply for a clarification question. No suggestions; the user's next
/// message is expected to be the answer.
pub fn clarification_reply(question: &str) -> Reply {
    Reply::plain(question)
}

/// Reply announcing that a modal will complete the action.
pub fn modal_reply(kind: IntentKind, requires_verification: bool) -> Reply {
    let text = match kind {
        IntentKind::Create => "I've opened the editor so you can finish creating this content.",
        IntentKind::Update => "I've opened the editor with this item's details ready to change.",
        IntentKind::Delete => "Please confirm - deleting this content can't be undone.",
        IntentKind::Share => {
            if requires_verification {
                "Making this public means anyone can see it. Please confirm in the share dialog."
            } else {
                "I've opened the share dialog so you can review the change."
            }
        }
        IntentKind::Protect => "Please confirm protection settings in the dialog.",
        _ => "I've opened a dialog to finish this action.",
    };
    Reply {
        text: text.to_string(),
        suggestions: vec![Suggestion::new(
            "cancel",
            "Cancel",
            "Close the dialog without making changes",
        )],
    }
}

/// Reply for a completed (or failed) dispatched operation.
pub fn format_reply(kind: IntentKind, result: &OperationResult) -> Reply {
    if !result.success {
        return Reply {
            text: result.message.clone(),
            suggestions: vec![
                Suggestion::new("list", "View all content", "See everything you have stored"),
                Suggestion::new("help", "What can I do?", "See example commands"),
            ],
        };
    }

    let suggestions = match kind {
        IntentKind::Create => vec![
            Suggestion::new("view", "View it", "Open the content you just created"),
            Suggestion::new("share", "Share it", "Make this content shareable"),
            Suggestion::new("create", "Add more", "Create another content item"),
        ],
        IntentKind::Retrieve => vec![
            Suggestion::new("edit", "Edit", "Change this item"),
            Suggestion::new("share", "Share", "Make this item shareable"),
            Suggestion::new("duplicate", "Duplicate", "Make a copy of this item"),
        ],
        IntentKind::Update => vec![
            Suggestion::new("view", "View it", "Open the updated content"),
            Suggestion::new("list", "View all", "See everything you have stored"),
        ],
        IntentKind::Delete => vec![
            Suggestion::new("undo", "Undo", "Restore the deleted content"),
            Suggestion::new("list", "View all", "See your remaining content"),
        ],
        IntentKind::Share => vec![
            Suggestion::new("copy-link", "Copy link", "Copy the share link"),
            Suggestion::new("protect", "Protect", "Add a password to this content"),
        ],
        IntentKind::Protect => vec![
            Suggestion::new("view", "View it", "Open the protected content"),
            Suggestion::new("share", "Share", "Create a scoped share link"),
        ],
        IntentKind::List | IntentKind::Search => vec![
            Suggestion::new("create", "Add content", "Create a new content item"),
            Suggestion::new("search", "Search", "Look for something specific"),
        ],
        IntentKind::Duplicate => vec![
            Suggestion::new("edit", "Edit the copy", "Open the duplicate for editing"),
            Suggestion::new("list", "View all", "See everything you have stored"),
        ],
        IntentKind::Unknown => vec![],
    };

    Reply {
        text: result.message.clone(),
        suggestions,
    }
}

/// Reply when no category matched the message at all.
pub fn unknown_reply() -> Reply {
    Reply {
        text: "I'm not sure what you'd like to do. You can ask me to create, \
               find, share, or organize your content."
            .to_string(),
        suggestions: vec![
            Suggestion::new("create", "Create content", "Add a new content item"),
            Suggestion::new("list", "View all content", "See everything you have stored"),
            Suggestion::new("search", "Search", "Look for something specific"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorCode;

    #[test]
    fn test_create_success_suggestions() {
        let result = OperationResult::ok("Created text \"Groceries\".");
        let reply = format_reply(IntentKind::Create, &result);
        assert_eq!(reply.text, "Created text \"Groceries\".");
        let actions: Vec<&str> = reply.suggestions.iter().map(|s| s.action.as_str()).collect();
        assert_eq!(actions, vec!["view", "share", "create"]);
    }

    #[test]
    fn test_delete_success_offers_undo() {
        let result = OperationResult::ok("Deleted \"Groceries\".");
        let reply = format_reply(IntentKind::Delete, &result);
        assert_eq!(reply.suggestions[0].action, "undo");
    }

    #[test]
    fn test_failure_reply_keeps_error_message() {
        let result = OperationResult::err(
            ErrorCode::PermissionDenied,
            "You must sign in to delete this content.",
        );
        let reply = format_reply(IntentKind::Delete, &result);
        assert_eq!(reply.text, "You must sign in to delete this content.");
        assert!(!reply.suggestions.is_empty());
    }

    #[test]
    fn test_modal_reply_for_public_share_mentions_confirmation() {
        let reply = modal_reply(IntentKind::Share, true);
        assert!(reply.text.contains("confirm"));
    }
}
