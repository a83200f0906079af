//! Snapshot ingestion - building an arena from CDP-shaped DOM JSON
//!
//! Input format matches CDP's `DOM.getDocument` response, with one
//! extension: a node may carry a `rect` object giving its layout box in
//! document coordinates.
//!
//! ```json
//! {
//!   "root": {
//!     "nodeType": 9,
//!     "nodeName": "#document",
//!     "children": [{
//!       "nodeType": 1,
//!       "nodeName": "FORM",
//!       "attributes": ["id", "checkout"],
//!       "rect": {"x": 0.0, "y": 120.0, "width": 640.0, "height": 480.0},
//!       "children": []
//!     }]
//!   }
//! }
//! ```
//!
//! CDP-side identifiers (`nodeId`, `backendNodeId`) are ignored; the
//! arena assigns its own ids in document order.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType};
use serde_json::Value;
use smallvec::SmallVec;

/// Refuse snapshots nested deeper than this many levels.
pub const MAX_SNAPSHOT_DEPTH: usize = 256;

/// Parse a CDP-shaped document snapshot into an arena
pub fn parse_document(snapshot: &Value) -> Result<DomArena> {
    let root = snapshot
        .get("root")
        .ok_or_else(|| DomError::Snapshot("missing `root`".to_string()))?;

    let mut arena = DomArena::new();
    let root_id = parse_node(&mut arena, root, None, 0)?;
    arena.set_root(root_id)?;

    Ok(arena)
}

/// Recursively parse one node and its subtree
fn parse_node(
    arena: &mut DomArena,
    value: &Value,
    parent_id: Option<NodeId>,
    depth: usize,
) -> Result<NodeId> {
    if depth > MAX_SNAPSHOT_DEPTH {
        return Err(DomError::Snapshot(format!(
            "nesting deeper than {MAX_SNAPSHOT_DEPTH} levels"
        )));
    }

    let node_type_val = value["nodeType"]
        .as_u64()
        .ok_or_else(|| DomError::Snapshot("missing nodeType".to_string()))? as u8;
    let node_type = NodeType::from_u8(node_type_val)
        .ok_or_else(|| DomError::Snapshot(format!("unknown nodeType {node_type_val}")))?;

    let node_name = value["nodeName"].as_str().unwrap_or("").to_string();

    let mut node = DomNode::new(node_type, node_name);
    node.node_value = value["nodeValue"].as_str().unwrap_or("").to_string();
    node.parent_id = parent_id;

    // Attributes arrive as a flat [name, value, name, value, ...] array
    if let Some(attrs) = value["attributes"].as_array() {
        let mut i = 0;
        while i + 1 < attrs.len() {
            if let (Some(key), Some(val)) = (attrs[i].as_str(), attrs[i + 1].as_str()) {
                node.attributes.insert(key.to_string(), val.to_string());
            }
            i += 2;
        }
    }

    if let Some(rect) = value.get("rect") {
        node.rect = Some(serde_json::from_value(rect.clone())?);
    }

    let node_id = arena.add_node(node);

    if let Some(children) = value["children"].as_array() {
        let mut child_ids = SmallVec::new();
        for child in children {
            child_ids.push(parse_node(arena, child, Some(node_id), depth + 1)?);
        }
        arena.get_mut(node_id)?.children_ids = child_ids;
    }

    Ok(node_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_simple_document() {
        let snapshot = json!({
            "root": {
                "nodeType": 9,
                "nodeName": "#document",
                "children": [{
                    "nodeType": 1,
                    "nodeName": "HTML",
                    "attributes": []
                }]
            }
        });

        let arena = parse_document(&snapshot).unwrap();
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.root_id(), Some(0));

        let html = arena.get(1).unwrap();
        assert_eq!(html.node_name, "HTML");
        assert_eq!(html.parent_id, Some(0));
    }

    #[test]
    fn test_parse_attributes_and_rect() {
        let snapshot = json!({
            "root": {
                "nodeType": 1,
                "nodeName": "FORM",
                "attributes": ["id", "checkout", "class", "wide"],
                "rect": {"x": 10.0, "y": 120.0, "width": 640.0, "height": 480.0}
            }
        });

        let arena = parse_document(&snapshot).unwrap();
        let form = arena.get(0).unwrap();
        assert_eq!(form.attr("id"), Some("checkout"));
        assert_eq!(form.attr("class"), Some("wide"));

        let rect = form.rect.unwrap();
        assert_eq!(rect.y, 120.0);
        assert_eq!(rect.width, 640.0);

        // parse registered the id in the arena index
        assert_eq!(arena.find_by_id("checkout"), Some(0));
    }

    #[test]
    fn test_arena_ids_follow_document_order() {
        let snapshot = json!({
            "root": {
                "nodeType": 1,
                "nodeName": "BODY",
                "children": [
                    {"nodeType": 1, "nodeName": "DIV", "children": [
                        {"nodeType": 1, "nodeName": "SPAN"}
                    ]},
                    {"nodeType": 1, "nodeName": "P"}
                ]
            }
        });

        let arena = parse_document(&snapshot).unwrap();
        let names: Vec<&str> = arena.iter().map(|n| n.node_name.as_str()).collect();
        assert_eq!(names, vec!["BODY", "DIV", "SPAN", "P"]);
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let err = parse_document(&json!({})).unwrap_err();
        assert!(matches!(err, DomError::Snapshot(_)));
    }

    #[test]
    fn test_unknown_node_type_is_rejected() {
        let snapshot = json!({"root": {"nodeType": 42, "nodeName": "X"}});
        let err = parse_document(&snapshot).unwrap_err();
        assert!(matches!(err, DomError::Snapshot(_)));
    }

    #[test]
    fn test_malformed_rect_is_rejected() {
        let snapshot = json!({
            "root": {"nodeType": 1, "nodeName": "DIV", "rect": {"x": "ten"}}
        });
        let err = parse_document(&snapshot).unwrap_err();
        assert!(matches!(err, DomError::Parse(_)));
    }

    #[test]
    fn test_depth_guard() {
        let mut node = json!({"nodeType": 1, "nodeName": "DIV"});
        for _ in 0..(MAX_SNAPSHOT_DEPTH + 2) {
            node = json!({"nodeType": 1, "nodeName": "DIV", "children": [node]});
        }

        let err = parse_document(&json!({ "root": node })).unwrap_err();
        assert!(matches!(err, DomError::Snapshot(_)));
    }
}
