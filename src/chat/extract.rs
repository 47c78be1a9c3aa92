//! Slot extractors
//!
//! Pure functions that pull individual parameters out of raw message text.
//! Each extractor is a cascade of patterns tried in a fixed order; the first
//! match wins. Patterns are compiled once into static tables.

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{AutoExpiry, ContentItem, ContentKind, Visibility};

/// Content-kind vocabulary: canonical names first, then the alias table.
/// Each entry matches as a whole word, with an optional plural `s`.
static KIND_VOCABULARY: &[(&str, ContentKind)] = &[
    ("text", ContentKind::Text),
    ("code", ContentKind::Code),
    ("link", ContentKind::Link),
    ("image", ContentKind::Image),
    ("video", ContentKind::Video),
    ("audio", ContentKind::Audio),
    ("document", ContentKind::Document),
    ("archive", ContentKind::Archive),
    // Aliases
    ("note", ContentKind::Text),
    ("memo", ContentKind::Text),
    ("snippet", ContentKind::Code),
    ("python", ContentKind::Code),
    ("javascript", ContentKind::Code),
    ("script", ContentKind::Code),
    ("url", ContentKind::Link),
    ("website", ContentKind::Link),
    ("bookmark", ContentKind::Link),
    ("photo", ContentKind::Image),
    ("picture", ContentKind::Image),
    ("screenshot", ContentKind::Image),
    ("movie", ContentKind::Video),
    ("clip", ContentKind::Video),
    ("song", ContentKind::Audio),
    ("music", ContentKind::Audio),
    ("podcast", ContentKind::Audio),
    ("pdf", ContentKind::Document),
    ("report", ContentKind::Document),
    ("zip", ContentKind::Archive),
    ("backup", ContentKind::Archive),
    ("file", ContentKind::Other),
    ("other", ContentKind::Other),
];

static KIND_PATTERNS: Lazy<Vec<(Regex, ContentKind)>> = Lazy::new(|| {
    KIND_VOCABULARY
        .iter()
        .map(|(word, kind)| {
            let re = Regex::new(&format!(r"(?i)\b{}s?\b", regex::escape(word)))
                .expect("kind vocabulary pattern is valid");
            (re, *kind)
        })
        .collect()
});

static QUOTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]+)"|'([^']+)'"#).expect("quoted pattern is valid"));

static NAMED_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:about|called|named|titled|title|name)\s+(.+?)(?:\s+(?:for|of)\b|\s+tags?\s*:|\s*#|$)")
        .expect("named-title pattern is valid")
});

static LEADING_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:create|add|new|make)\s+(?:(?:a|an|the|me)\s+)?(?:new\s+)?(.+?)\s+for\b")
        .expect("leading-title pattern is valid")
});

static HASHTAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([A-Za-z0-9_]+)").expect("hashtag pattern is valid"));

static TAG_LIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\btags?\s*:\s*([^#\r\n]+)").expect("tag-list pattern is valid"));

static IN_CATEGORY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bin\s+(?:category\s+)?(.+?)(?:\s+(?:with|for|by)\b|$)")
        .expect("in-category pattern is valid")
});

static UNDER_CATEGORY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bunder\s+(.+?)(?:\s+(?:with|for|by)\b|$)")
        .expect("under-category pattern is valid")
});

static PUBLIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bpublic\b").expect("public pattern is valid"));
static PRIVATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bprivate\b").expect("private pattern is valid"));
static SHARED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bshareable\b|\bshared\b").expect("shared pattern is valid"));

static EXPIRY_DAYS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:delete|expire)s?\s+(?:after|in)\s+(\d+)\s+days?\b")
        .expect("expiry-days pattern is valid")
});

static EXPIRY_LOOSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:delete|expire)s?\s+(?:after|in)\s+\d+\s+(?:hours?|weeks?|months?)\b")
        .expect("expiry-loose pattern is valid")
});

static AUTO_DELETE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bauto[\s-]?delete\b").expect("auto-delete pattern is valid")
});

static ID_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:id|item)\s*:?\s*([A-Za-z0-9][A-Za-z0-9_-]*)")
        .expect("id-reference pattern is valid")
});

static NAMED_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:about|called|named)\s+(.+?)\s*$").expect("named-ref pattern is valid")
});

static SEARCH_QUERY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:search(?:\s+for)?|look\s+for|find|locate)\s+(.+)$")
        .expect("search-query pattern is valid")
});

/// Extract the content kind mentioned in the message, if any.
pub fn extract_kind(text: &str) -> Option<ContentKind> {
    KIND_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, kind)| *kind)
}

/// Extract a title. First match wins among: quoted substring, an
/// about/called/named/title/name phrase, then a leading create-…-for form.
pub fn extract_title(text: &str) -> Option<String> {
    if let Some(caps) = QUOTED_RE.captures(text) {
        let quoted = caps.get(1).or_else(|| caps.get(2));
        if let Some(m) = quoted {
            return Some(m.as_str().trim().to_string());
        }
    }

    if let Some(caps) = NAMED_TITLE_RE.captures(text) {
        return Some(clean_fragment(caps[1].trim()));
    }

    if let Some(caps) = LEADING_TITLE_RE.captures(text) {
        return Some(clean_fragment(caps[1].trim()));
    }

    None
}

/// Extract tags: the union of `#hashtag` tokens and a `tags:` prefixed
/// comma/semicolon-separated list, case-folded and deduplicated.
pub fn extract_tags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();

    for caps in HASHTAG_RE.captures_iter(text) {
        push_tag(&mut tags, &caps[1]);
    }

    if let Some(caps) = TAG_LIST_RE.captures(text) {
        for raw in caps[1].split([',', ';']) {
            push_tag(&mut tags, raw);
        }
    }

    tags
}

fn push_tag(tags: &mut Vec<String>, raw: &str) {
    let tag = raw.trim().to_lowercase();
    if !tag.is_empty() && !tags.contains(&tag) {
        tags.push(tag);
    }
}

/// Extract a category from `in (category)? X` or `under X` phrasing.
pub fn extract_category(text: &str) -> Option<String> {
    for re in [&*IN_CATEGORY_RE, &*UNDER_CATEGORY_RE] {
        if let Some(caps) = re.captures(text) {
            let value = clean_fragment(caps[1].trim());
            // "in 7 days" belongs to the expiry extractor, not here.
            if !value.is_empty() && !value.starts_with(|c: char| c.is_ascii_digit()) {
                return Some(value);
            }
        }
    }
    None
}

/// Extract an explicit visibility mention.
pub fn extract_visibility(text: &str) -> Option<Visibility> {
    if PUBLIC_RE.is_match(text) {
        Some(Visibility::Public)
    } else if PRIVATE_RE.is_match(text) {
        Some(Visibility::Private)
    } else if SHARED_RE.is_match(text) {
        Some(Visibility::Public)
    } else {
        None
    }
}

/// Extract auto-expiry settings, anchored at `now`.
///
/// An explicit day count yields an absolute timestamp; an hour/week/month
/// mention enables expiry without one; a bare "auto delete" enables only.
/// A day count too large to represent enables expiry without a timestamp.
pub fn extract_expiry_at(text: &str, now: DateTime<Utc>) -> Option<AutoExpiry> {
    if let Some(caps) = EXPIRY_DAYS_RE.captures(text) {
        let expires_at = caps[1]
            .parse::<i64>()
            .ok()
            .and_then(Duration::try_days)
            .and_then(|d| now.checked_add_signed(d));
        return Some(AutoExpiry {
            enabled: true,
            expires_at,
        });
    }

    if EXPIRY_LOOSE_RE.is_match(text) || AUTO_DELETE_RE.is_match(text) {
        return Some(AutoExpiry {
            enabled: true,
            expires_at: None,
        });
    }

    None
}

/// Extract auto-expiry settings relative to the current time.
pub fn extract_expiry(text: &str) -> Option<AutoExpiry> {
    extract_expiry_at(text, Utc::now())
}

/// Resolve an item reference against the caller's snapshot.
///
/// Cascade: explicit `id:`/`item:` token against ids, quoted text against
/// titles (exact match first, then substring), then an about/called/named
/// phrase as a title substring. Ambiguous matches resolve to the first item
/// in snapshot order.
pub fn resolve_reference<'a>(text: &str, items: &'a [ContentItem]) -> Option<&'a ContentItem> {
    if let Some(caps) = ID_REF_RE.captures(text) {
        let id = &caps[1];
        if let Some(item) = items.iter().find(|i| i.id == *id) {
            return Some(item);
        }
    }

    if let Some(caps) = QUOTED_RE.captures(text) {
        if let Some(m) = caps.get(1).or_else(|| caps.get(2)) {
            let quoted = m.as_str().trim().to_lowercase();
            if let Some(item) = items.iter().find(|i| i.title.to_lowercase() == quoted) {
                return Some(item);
            }
            if let Some(item) = items
                .iter()
                .find(|i| i.title.to_lowercase().contains(&quoted))
            {
                return Some(item);
            }
        }
    }

    if let Some(caps) = NAMED_REF_RE.captures(text) {
        let needle = clean_fragment(caps[1].trim()).to_lowercase();
        if !needle.is_empty() {
            if let Some(item) = items
                .iter()
                .find(|i| i.title.to_lowercase().contains(&needle))
            {
                return Some(item);
            }
        }
    }

    None
}

/// Extract the free-text query for SEARCH intents. Falls back to the whole
/// message when no search verb is present.
pub fn extract_search_query(text: &str) -> String {
    if let Some(caps) = SEARCH_QUERY_RE.captures(text) {
        let query = clean_fragment(caps[1].trim());
        if !query.is_empty() {
            return query;
        }
    }
    text.trim().to_string()
}

/// Strip trailing punctuation a user is likely to leave on a fragment.
fn clean_fragment(raw: &str) -> String {
    raw.trim_end_matches(['.', ',', '!', '?', ';', ':'])
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GUEST_OWNER, ItemStatus};
    use proptest::prelude::*;

    fn item(id: &str, title: &str) -> ContentItem {
        ContentItem {
            id: id.to_string(),
            kind: ContentKind::Text,
            title: title.to_string(),
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

    #[test]
    fn test_kind_canonical_and_aliases() {
        assert_eq!(extract_kind("create a new text note"), Some(ContentKind::Text));
        assert_eq!(extract_kind("save this python snippet"), Some(ContentKind::Code));
        assert_eq!(extract_kind("bookmark this website"), Some(ContentKind::Link));
        assert_eq!(extract_kind("upload a photo"), Some(ContentKind::Image));
        assert_eq!(extract_kind("save the clip"), Some(ContentKind::Video));
        assert_eq!(extract_kind("add this podcast"), Some(ContentKind::Audio));
        assert_eq!(extract_kind("store the pdf"), Some(ContentKind::Document));
        assert_eq!(extract_kind("keep the zip"), Some(ContentKind::Archive));
        assert_eq!(extract_kind("hello there"), None);
    }

    #[test]
    fn test_kind_does_not_match_inside_words() {
        // "another" must not read as the "other" kind
        assert_eq!(extract_kind("add another thing"), None);
    }

    #[test]
    fn test_title_quoted_wins_over_named() {
        assert_eq!(
            extract_title(r#"create a note called drafts titled "Real Title""#),
            Some("Real Title".to_string())
        );
        assert_eq!(
            extract_title("create a note about rust lifetimes"),
            Some("rust lifetimes".to_string())
        );
        assert_eq!(
            extract_title("add a note named groceries for the weekend"),
            Some("groceries".to_string())
        );
    }

    #[test]
    fn test_title_leading_create_for_pattern() {
        assert_eq!(
            extract_title("create shopping list for monday"),
            Some("shopping list".to_string())
        );
        assert_eq!(extract_title("create a new text note"), None);
    }

    #[test]
    fn test_tags_union_dedup_case_folded() {
        let tags = extract_tags("#foo, #bar tags: baz, qux");
        assert_eq!(tags, vec!["foo", "bar", "baz", "qux"]);

        let tags = extract_tags("#Rust tags: rust; Async");
        assert_eq!(tags, vec!["rust", "async"]);
    }

    #[test]
    fn test_category_in_and_under_forms() {
        assert_eq!(
            extract_category("save this in category recipes with tags: food"),
            Some("recipes".to_string())
        );
        assert_eq!(
            extract_category("file it under work notes"),
            Some("work notes".to_string())
        );
        // expiry phrasing is not a category
        assert_eq!(extract_category("delete in 7 days"), None);
    }

    #[test]
    fn test_visibility_aliases() {
        assert_eq!(extract_visibility("make it public"), Some(Visibility::Public));
        assert_eq!(extract_visibility("keep this private"), Some(Visibility::Private));
        assert_eq!(extract_visibility("make it shareable"), Some(Visibility::Public));
        assert_eq!(extract_visibility("just a note"), None);
    }

    #[test]
    fn test_expiry_exact_days_sets_timestamp() {
        let now = Utc::now();
        let expiry = extract_expiry_at("delete after 7 days", now).unwrap();
        assert!(expiry.enabled);
        assert_eq!(expiry.expires_at, Some(now + Duration::days(7)));

        let expiry = extract_expiry_at("expire in 30 days", now).unwrap();
        assert_eq!(expiry.expires_at, Some(now + Duration::days(30)));
    }

    #[test]
    fn test_expiry_loose_duration_and_bare_auto_delete() {
        let now = Utc::now();
        let expiry = extract_expiry_at("expire after 2 weeks", now).unwrap();
        assert!(expiry.enabled);
        assert!(expiry.expires_at.is_none());

        let expiry = extract_expiry_at("turn on auto-delete", now).unwrap();
        assert!(expiry.enabled);
        assert!(expiry.expires_at.is_none());

        assert!(extract_expiry_at("a plain note", now).is_none());
    }

    #[test]
    fn test_expiry_out_of_range_day_count_enables_without_timestamp() {
        let now = Utc::now();

        // exceeds what a chrono duration can hold
        let expiry =
            extract_expiry_at("create a note that expires in 999999999999999 days", now).unwrap();
        assert!(expiry.enabled);
        assert!(expiry.expires_at.is_none());

        // exceeds i64 entirely
        let expiry = extract_expiry_at("expire in 99999999999999999999 days", now).unwrap();
        assert!(expiry.enabled);
        assert!(expiry.expires_at.is_none());
    }

    #[test]
    fn test_reference_by_id_then_quoted_then_named() {
        let items = vec![item("a1", "Python Notes"), item("b2", "Java Notes")];

        let hit = resolve_reference("delete item: b2", &items).unwrap();
        assert_eq!(hit.id, "b2");

        let hit = resolve_reference(r#"open "python notes""#, &items).unwrap();
        assert_eq!(hit.id, "a1");

        let hit = resolve_reference("show the one called java", &items).unwrap();
        assert_eq!(hit.id, "b2");

        assert!(resolve_reference("delete my spreadsheet", &items).is_none());
    }

    #[test]
    fn test_reference_ambiguity_resolves_to_first_in_snapshot_order() {
        let items = vec![item("a1", "Notes one"), item("b2", "Notes two")];
        let hit = resolve_reference("open the item called notes", &items).unwrap();
        assert_eq!(hit.id, "a1");
    }

    #[test]
    fn test_search_query_extraction() {
        assert_eq!(extract_search_query("search for rust macros"), "rust macros");
        assert_eq!(extract_search_query("find my tax documents"), "my tax documents");
        assert_eq!(extract_search_query("rust macros"), "rust macros");
    }

    proptest! {
        // Short tag tokens collide often, so deduplication is exercised.
        #[test]
        fn prop_extracted_tags_are_unique_and_case_folded(
            message in r"(#[A-Za-z]{1,2} ){0,5}(tags: [A-Za-z]{1,2}(, [A-Za-z]{1,2}){0,4})?",
        ) {
            let tags = extract_tags(&message);
            let unique: std::collections::HashSet<&String> = tags.iter().collect();
            prop_assert_eq!(unique.len(), tags.len());
            for tag in &tags {
                prop_assert!(!tag.is_empty());
                prop_assert_eq!(tag.clone(), tag.to_lowercase());
            }
        }
    }
}
