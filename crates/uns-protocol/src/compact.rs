//! Compact leaf-only import/export.
//!
//! Only typed leaves are written; folders are rebuilt from path prefixes on
//! import, so folder descriptions do not survive a round-trip.
//!
//! ```json
//! {"version":"v1","topics":[{"path":"v1/FY-Fab/wh/site/state/inventory","type":"state","estMps":0.05}]}
//! ```

use serde_json::Value;

use crate::builder::{TopicAttributes, TreeBuilder};
use crate::constants::MAX_INPUT_SEGMENTS;
use crate::error::{NamespaceError, Result};
use crate::metrics::collect_leaves;
use crate::path;
use crate::types::{CompactDocument, CompactTopic, Node, TopicType};

/// Export every typed leaf of `root`, depth-first.
pub fn to_compact(root: &Node) -> CompactDocument {
    let topics = collect_leaves(root)
        .into_iter()
        .map(|n| CompactTopic {
            path: n.path.clone(),
            topic_type: n.topic_type,
            template: n.template.clone(),
            est_mps: n.est_mps,
            description: n.description.clone(),
        })
        .collect();
    CompactDocument::new(topics)
}

/// Rebuild a tree from a compact document.
pub fn from_compact(doc: &CompactDocument) -> Result<Node> {
    let mut builder = TreeBuilder::new();
    for topic in &doc.topics {
        if path::depth(&topic.path) > MAX_INPUT_SEGMENTS {
            return Err(malformed(format!(
                "topic path has more than {MAX_INPUT_SEGMENTS} segments"
            )));
        }
        let attrs = TopicAttributes {
            topic_type: topic.topic_type,
            est_mps: topic.est_mps,
            template: topic.template.clone(),
            description: topic.description.clone(),
        };
        builder.insert(&topic.path, attrs).map_err(|e| match e {
            NamespaceError::InvalidPath(p) => {
                NamespaceError::MalformedDocument(format!("topic path {p:?} has no segments"))
            }
            other => other,
        })?;
    }
    tracing::debug!(topics = doc.topics.len(), nodes = builder.len(), "rebuilt tree from compact document");
    Ok(builder.build())
}

/// Parse and validate pasted JSON text.
pub fn parse_document(text: &str) -> Result<CompactDocument> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| NamespaceError::MalformedDocument(format!("invalid JSON: {e}")))?;
    document_from_value(value)
}

/// Parse, validate and build in one step. Either the whole document is
/// imported or an error is returned.
pub fn import_str(text: &str) -> Result<Node> {
    from_compact(&parse_document(text)?)
}

/// Validate an already decoded JSON value as a compact document.
pub fn document_from_value(value: Value) -> Result<CompactDocument> {
    let obj = value
        .as_object()
        .ok_or_else(|| malformed("expected a JSON object with a `topics` array"))?;

    let version = match obj.get("version") {
        None | Some(Value::Null) => crate::constants::COMPACT_SCHEMA_VERSION.to_string(),
        Some(Value::String(v)) => v.clone(),
        Some(_) => return Err(malformed("`version` must be a string")),
    };

    let raw_topics = obj
        .get("topics")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("missing `topics` array"))?;

    let mut topics = Vec::with_capacity(raw_topics.len());
    for (i, raw) in raw_topics.iter().enumerate() {
        topics.push(topic_from_value(i, raw)?);
    }

    Ok(CompactDocument { version, topics })
}

fn topic_from_value(i: usize, raw: &Value) -> Result<CompactTopic> {
    let obj = raw
        .as_object()
        .ok_or_else(|| malformed(format!("topics[{i}] is not an object")))?;

    let topic_path = obj
        .get("path")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| malformed(format!("topics[{i}] has no `path` string")))?;
    if path::parse(topic_path).is_err() {
        return Err(malformed(format!("topics[{i}].path {topic_path:?} has no segments")));
    }
    if path::depth(topic_path) > MAX_INPUT_SEGMENTS {
        return Err(malformed(format!(
            "topics[{i}].path has more than {MAX_INPUT_SEGMENTS} segments"
        )));
    }

    let topic_type = match obj.get("type") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(
            s.parse::<TopicType>()
                .map_err(|e| malformed(format!("topics[{i}]: {e}")))?,
        ),
        Some(_) => return Err(malformed(format!("topics[{i}].type must be a string"))),
    };

    let est_mps = match obj.get("estMps") {
        None | Some(Value::Null) => None,
        Some(v) => match v.as_f64() {
            Some(n) if n.is_finite() && n >= 0.0 => Some(n),
            _ => {
                return Err(malformed(format!(
                    "topics[{i}].estMps must be a non-negative number"
                )))
            }
        },
    };

    let template = match obj.get("template") {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map.clone()),
        Some(_) => return Err(malformed(format!("topics[{i}].template must be an object"))),
    };

    let description = match obj.get("description") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(malformed(format!("topics[{i}].description must be a string"))),
    };

    Ok(CompactTopic {
        path: topic_path.to_string(),
        topic_type,
        template,
        est_mps,
        description,
    })
}

fn malformed(msg: impl Into<String>) -> NamespaceError {
    NamespaceError::MalformedDocument(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_export_skips_folders() {
        let root = TreeBuilder::from_records(vec![
            ("a/b", TopicAttributes::default().with_description("folder")),
            ("a/b/state/x", TopicAttributes::typed(TopicType::State).with_est_mps(1.0)),
        ])
        .unwrap();
        let doc = to_compact(&root);
        assert_eq!(doc.version, "v1");
        assert_eq!(doc.topics.len(), 1);
        assert_eq!(doc.topics[0].path, "a/b/state/x");
    }

    #[test]
    fn test_export_omits_absent_fields() {
        let root = TreeBuilder::from_records(vec![(
            "a/info/x",
            TopicAttributes::typed(TopicType::Info),
        )])
        .unwrap();
        let json = serde_json::to_value(to_compact(&root)).unwrap();
        assert_eq!(
            json,
            json!({"version": "v1", "topics": [{"path": "a/info/x", "type": "info"}]})
        );
    }

    #[test]
    fn test_missing_topics_is_malformed() {
        let err = parse_document(r#"{"version":"v1"}"#).unwrap_err();
        assert!(matches!(err, NamespaceError::MalformedDocument(_)));
    }

    #[test]
    fn test_non_object_is_malformed() {
        assert!(matches!(
            parse_document("[1,2,3]"),
            Err(NamespaceError::MalformedDocument(_))
        ));
        assert!(matches!(
            parse_document("not json"),
            Err(NamespaceError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_topic_validation() {
        let cases = [
            json!({"topics": [{"type": "state"}]}),
            json!({"topics": [{"path": ""}]}),
            json!({"topics": [{"path": "///"}]}),
            json!({"topics": [{"path": 7}]}),
            json!({"topics": ["a/b"]}),
            json!({"topics": [{"path": "a/x", "type": "bogus"}]}),
            json!({"topics": [{"path": "a/x", "estMps": -1.0}]}),
            json!({"topics": [{"path": "a/x", "template": [1, 2]}]}),
        ];
        for case in cases {
            assert!(
                matches!(document_from_value(case.clone()), Err(NamespaceError::MalformedDocument(_))),
                "expected rejection of {case}"
            );
        }
    }

    #[test]
    fn test_one_bad_topic_rejects_whole_import() {
        let text = r#"{"version":"v1","topics":[{"path":"a/state/x","type":"state"},{"nopath":true}]}"#;
        assert!(import_str(text).is_err());
    }

    #[test]
    fn test_version_defaults_when_missing() {
        let doc = parse_document(r#"{"topics":[]}"#).unwrap();
        assert_eq!(doc.version, "v1");
    }

    #[test]
    fn test_type_is_case_insensitive_on_import() {
        let doc = parse_document(r#"{"topics":[{"path":"a/State/x","type":"State"}]}"#).unwrap();
        assert_eq!(doc.topics[0].topic_type, Some(TopicType::State));
    }

    #[test]
    fn test_overly_deep_path_is_rejected() {
        let deep = vec!["s"; 10_000].join("/");
        let text = json!({"version": "v1", "topics": [{"path": deep, "type": "state"}]}).to_string();
        let err = import_str(&text).unwrap_err();
        assert!(matches!(err, NamespaceError::MalformedDocument(ref m) if m.contains("segments")));

        let doc = CompactDocument::new(vec![CompactTopic {
            path: vec!["s"; MAX_INPUT_SEGMENTS + 1].join("/"),
            topic_type: None,
            template: None,
            est_mps: None,
            description: None,
        }]);
        assert!(matches!(from_compact(&doc), Err(NamespaceError::MalformedDocument(_))));
    }

    #[test]
    fn test_path_at_segment_limit_is_accepted() {
        let path = vec!["s"; MAX_INPUT_SEGMENTS].join("/");
        let text = json!({"topics": [{"path": path}]}).to_string();
        assert!(import_str(&text).is_ok());
    }
}
