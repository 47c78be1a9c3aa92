//! Intent classifier
//!
//! Maps raw message text to one intent kind from the closed set using
//! ordered keyword rules, then scores confidence and populates the slots
//! for the winning kind.
//!
//! Categories are evaluated in a fixed priority order with DELETE first:
//! misclassifying a destructive command as benign is the costlier error, so
//! destructive intent wins any lexical tie. The first category whose keyword
//! set matches a substring of the lower-cased message wins; nothing matching
//! yields UNKNOWN.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::chat::extract;
use crate::chat::intent::{Intent, IntentKind, IntentParams};
use crate::model::ContentItem;

/// One classification rule: keyword set plus an exact-phrase pattern.
struct CategoryRule {
    kind: IntentKind,
    keywords: &'static [&'static str],
    phrase: Regex,
}

/// Rules in priority order. Order is part of the contract; do not sort.
static RULES: Lazy<Vec<CategoryRule>> = Lazy::new(|| {
    vec![
        CategoryRule {
            kind: IntentKind::Delete,
            keywords: &["delete", "remove", "trash", "erase", "discard", "get rid of"],
            phrase: rule_regex(r"\b(?:delete|remove|trash|erase)\s+(?:my|the|this|that|it)\b"),
        },
        CategoryRule {
            kind: IntentKind::Create,
            keywords: &["create", "add", "save", "upload", "new", "make a", "make an", "jot"],
            phrase: rule_regex(r"\b(?:create|add|make|save)\s+(?:a|an|the|this|my)?\s*(?:new\s+)?\w+"),
        },
        CategoryRule {
            kind: IntentKind::Update,
            keywords: &["update", "edit", "change", "modify", "rename", "retitle"],
            phrase: rule_regex(r"\b(?:update|edit|change|modify|rename)\s+(?:my|the|this|that|it)\b"),
        },
        CategoryRule {
            kind: IntentKind::Share,
            keywords: &["share", "publish", "make public", "make private", "public", "private", "send to"],
            phrase: rule_regex(
                r"\bshare\s+(?:my|the|this|that|it)\b|\bmake\s+(?:this|that|it)\s+(?:public|private|shareable)\b|\bpublish\b",
            ),
        },
        CategoryRule {
            kind: IntentKind::Protect,
            keywords: &["protect", "password", "lock", "secure", "encrypt"],
            phrase: rule_regex(
                r"\bpassword[\s-]?protect\b|\b(?:protect|lock|secure)\s+(?:my|the|this|that|it)\b",
            ),
        },
        CategoryRule {
            kind: IntentKind::Retrieve,
            keywords: &["show me the", "open", "view", "display", "read", "retrieve", "pull up"],
            phrase: rule_regex(
                r"\b(?:show\s+me\s+the|open|view|display|read|pull\s+up)\s+(?:my\s+|the\s+)?\w+",
            ),
        },
        CategoryRule {
            kind: IntentKind::List,
            keywords: &["list", "show all", "all my", "everything", "show me my"],
            phrase: rule_regex(
                r"\blist\s+(?:all|my|everything)\b|\bshow\s+(?:me\s+)?all\b|\ball\s+my\b",
            ),
        },
        CategoryRule {
            kind: IntentKind::Duplicate,
            keywords: &["duplicate", "copy", "clone"],
            phrase: rule_regex(r"\b(?:duplicate|copy|clone)\s+(?:my|the|this|that|it)\b"),
        },
        CategoryRule {
            kind: IntentKind::Search,
            keywords: &["search", "find", "look for", "locate"],
            phrase: rule_regex(r"\b(?:search|look)\s+for\b|\bfind\s+(?:my|a|an|the)\b"),
        },
    ]
});

fn rule_regex(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("category phrase pattern is valid")
}

/// Deterministic keyword/phrase classifier. Stateless; one instance can
/// serve any number of conversations.
#[derive(Debug, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify one message against the caller's item snapshot.
    pub fn classify(&self, message: &str, snapshot: &[ContentItem]) -> Intent {
        let lowered = message.to_lowercase();

        for rule in RULES.iter() {
            let matched = rule
                .keywords
                .iter()
                .filter(|k| lowered.contains(*k))
                .count();
            if matched == 0 {
                continue;
            }

            let confidence = Self::confidence(rule, &lowered, matched);
            let params = Self::extract_params(rule.kind, message, snapshot);
            tracing::debug!(
                intent = ?rule.kind,
                confidence,
                matched_keywords = matched,
                "classified message"
            );
            return Intent::new(rule.kind, params, confidence);
        }

        tracing::debug!("no category matched, classifying as unknown");
        Intent::unknown()
    }

    /// Heuristic confidence: keyword density contributes up to 0.3, one
    /// exact phrase match a flat 0.7, multiple keywords a 0.1 bonus; the
    /// sum is capped at 1.0. Deterministic, not a probability.
    fn confidence(rule: &CategoryRule, lowered: &str, matched: usize) -> f32 {
        let fraction = matched as f32 / rule.keywords.len() as f32;
        let phrase = if rule.phrase.is_match(lowered) { 1.0 } else { 0.0 };
        let bonus = if matched > 1 { 0.1 } else { 0.0 };
        (0.3 * fraction + 0.7 * phrase + bonus).min(1.0)
    }

    /// Populate the slot union for the winning kind.
    fn extract_params(kind: IntentKind, message: &str, snapshot: &[ContentItem]) -> IntentParams {
        match kind {
            IntentKind::Create => IntentParams::Create {
                kind: extract::extract_kind(message),
                title: extract::extract_title(message),
                tags: extract::extract_tags(message),
                category: extract::extract_category(message),
                visibility: extract::extract_visibility(message),
                expiry: extract::extract_expiry(message),
            },
            IntentKind::Retrieve => IntentParams::Retrieve {
                item: extract::resolve_reference(message, snapshot).cloned(),
            },
            IntentKind::Update => IntentParams::Update {
                item: extract::resolve_reference(message, snapshot).cloned(),
                title: extract::extract_title(message),
                tags: extract::extract_tags(message),
                category: extract::extract_category(message),
                visibility: extract::extract_visibility(message),
            },
            IntentKind::Delete => IntentParams::Delete {
                item: extract::resolve_reference(message, snapshot).cloned(),
            },
            IntentKind::Share => IntentParams::Share {
                item: extract::resolve_reference(message, snapshot).cloned(),
                visibility: extract::extract_visibility(message),
                link_expires_at: extract::extract_expiry(message).and_then(|e| e.expires_at),
            },
            IntentKind::Protect => IntentParams::Protect {
                item: extract::resolve_reference(message, snapshot).cloned(),
            },
            IntentKind::List => IntentParams::List {
                kind: extract::extract_kind(message),
                category: extract::extract_category(message),
                tags: extract::extract_tags(message),
            },
            IntentKind::Duplicate => IntentParams::Duplicate {
                item: extract::resolve_reference(message, snapshot).cloned(),
            },
            IntentKind::Search => IntentParams::Search {
                query: extract::extract_search_query(message),
            },
            IntentKind::Unknown => IntentParams::Unknown,
        }
    }
}
