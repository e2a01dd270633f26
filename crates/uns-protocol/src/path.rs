//! Slash-delimited topic path handling.
//!
//! Paths are normalized by dropping empty segments, so `"/a//b/"` and
//! `"a/b"` name the same node. The topic type of a leaf is declared by the
//! segment right before its name: `<...>/<type>/<topic-name>`.

use crate::constants::CONTAINER_ROOT;
use crate::error::{NamespaceError, Result};
use crate::types::TopicType;

/// Split a path into its non-empty segments.
pub fn parse(path: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Err(NamespaceError::InvalidPath(path.to_string()));
    }
    Ok(segments)
}

/// Canonical form of a path: its segments joined by a single `/`.
pub fn normalize(path: &str) -> Result<String> {
    Ok(parse(path)?.join("/"))
}

/// Number of non-empty segments.
pub fn depth(path: &str) -> usize {
    path.split('/').filter(|s| !s.is_empty()).count()
}

/// Display name of the node at `path`.
pub fn name(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .last()
        .unwrap_or(CONTAINER_ROOT)
        .to_string()
}

/// Normalized path of the parent, `None` for top-level paths.
pub fn parent(path: &str) -> Option<String> {
    let segments = parse(path).ok()?;
    if segments.len() < 2 {
        return None;
    }
    Some(segments[..segments.len() - 1].join("/"))
}

/// The segment at the canonical type position (second-to-last).
pub fn penultimate(path: &str) -> Option<&str> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return None;
    }
    Some(segments[segments.len() - 2])
}

/// Topic type declared at the canonical position of `path`.
pub fn type_hint(path: &str) -> Option<TopicType> {
    penultimate(path).and_then(|seg| seg.parse().ok())
}

/// Legacy scan: the first reserved literal found in any segment.
///
/// Misclassifies entity names that happen to be `state`, `info`, ...; only
/// used when the live feed is configured for compatibility.
pub fn type_hint_any_segment(path: &str) -> Option<TopicType> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .find_map(|seg| seg.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collapses_empty_segments() {
        assert_eq!(parse("/a//b/").unwrap(), vec!["a", "b"]);
        assert_eq!(normalize("//v1/FY-Fab//erp").unwrap(), "v1/FY-Fab/erp");
    }

    #[test]
    fn test_parse_rejects_empty_paths() {
        assert!(matches!(parse(""), Err(NamespaceError::InvalidPath(_))));
        assert!(matches!(parse("///"), Err(NamespaceError::InvalidPath(_))));
    }

    #[test]
    fn test_name_and_parent() {
        assert_eq!(name("a/b/state/x"), "x");
        assert_eq!(name("a"), "a");
        assert_eq!(name(""), "root");
        assert_eq!(parent("a/b/state/x").as_deref(), Some("a/b/state"));
        assert_eq!(parent("a"), None);
    }

    #[test]
    fn test_type_hint_canonical_position_only() {
        assert_eq!(type_hint("a/b/state/x"), Some(TopicType::State));
        assert_eq!(type_hint("a/b/Metrics/x"), Some(TopicType::Metrics));
        // "state" used as an entity name, not at the type position
        assert_eq!(type_hint("plant/state/line1/speed"), None);
        assert_eq!(type_hint("state"), None);
    }

    #[test]
    fn test_type_hint_legacy_scan_is_permissive() {
        assert_eq!(
            type_hint_any_segment("plant/state/line1/speed"),
            Some(TopicType::State)
        );
        assert_eq!(
            type_hint_any_segment("a/info/b/action/x"),
            Some(TopicType::Info)
        );
        assert_eq!(type_hint_any_segment("a/b/c"), None);
    }
}
