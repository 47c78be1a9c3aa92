//! Permission evaluation
//!
//! Pure predicates over an acting user (possibly anonymous) and a content
//! item. A guest session owns the guest-sentinel items in its local store;
//! an authenticated user owns items carrying their id. Scoped share-link
//! rules are enforced by the share-link store, not here.

use crate::model::{ContentItem, User};

/// Capability checks for one (user, item) pair.
pub trait Permissions {
    fn can_view(&self, user: Option<&User>) -> bool;
    fn can_edit(&self, user: Option<&User>) -> bool;
    fn can_delete(&self, user: Option<&User>) -> bool;
    fn can_share(&self, user: Option<&User>) -> bool;
    fn can_protect(&self, user: Option<&User>) -> bool;
    fn can_duplicate(&self, user: Option<&User>) -> bool;
}

impl Permissions for ContentItem {
    fn can_view(&self, user: Option<&User>) -> bool {
        self.is_public() || owns(self, user)
    }

    fn can_edit(&self, user: Option<&User>) -> bool {
        owns(self, user)
    }

    fn can_delete(&self, user: Option<&User>) -> bool {
        owns(self, user)
    }

    fn can_share(&self, user: Option<&User>) -> bool {
        owns(self, user)
    }

    fn can_protect(&self, user: Option<&User>) -> bool {
        owns(self, user)
    }

    fn can_duplicate(&self, user: Option<&User>) -> bool {
        self.can_view(user)
    }
}

/// Ownership: the acting user is the owner, or an anonymous session is
/// acting on a guest-sentinel item.
fn owns(item: &ContentItem, user: Option<&User>) -> bool {
    match user {
        Some(user) => item.owner_id == user.id,
        None => item.is_guest_owned(),
    }
}

/// All-or-nothing bulk variants: any failing item denies the whole batch.
pub fn can_bulk_delete(user: Option<&User>, items: &[ContentItem]) -> bool {
    items.iter().all(|i| i.can_delete(user))
}

pub fn can_bulk_edit(user: Option<&User>, items: &[ContentItem]) -> bool {
    items.iter().all(|i| i.can_edit(user))
}

pub fn can_bulk_share(user: Option<&User>, items: &[ContentItem]) -> bool {
    items.iter().all(|i| i.can_share(user))
}

/// Human-readable denial message for a failed capability check.
pub fn denial_message(user: Option<&User>, action: &str) -> String {
    match user {
        None => format!("You must sign in to {action} this content."),
        Some(_) => format!("You don't have permission to {action} this content."),
    }
}
