//! Core node and geometry types
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Use SmallVec for child lists (most nodes have few children)
//! 3. Keep per-node data flat; geometry is optional, identity is cheap

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Node identifier (index into arena)
/// u32 allows 4 billion nodes, enough for any webpage
pub type NodeId = u32;

/// Selector applied when a caller does not supply an error predicate:
/// explicit error markers, the conventional class, or ARIA invalid state.
pub const DEFAULT_ERROR_SELECTOR: &str = r#"[data-error], .error, [aria-invalid="true"]"#;

/// Selector for the controls a revealed error hands focus to.
pub const INPUT_TARGET_SELECTOR: &str = "input, textarea, select";

/// Tag names matched by [`INPUT_TARGET_SELECTOR`], for structural matching.
pub const INPUT_TARGET_TAGS: &[&str] = &["input", "textarea", "select"];

/// Node type codes from the DOM standard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CdataSection = 4,
    EntityReference = 5,
    Entity = 6,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
    Notation = 12,
}

impl NodeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(NodeType::Element),
            2 => Some(NodeType::Attribute),
            3 => Some(NodeType::Text),
            4 => Some(NodeType::CdataSection),
            5 => Some(NodeType::EntityReference),
            6 => Some(NodeType::Entity),
            7 => Some(NodeType::ProcessingInstruction),
            8 => Some(NodeType::Comment),
            9 => Some(NodeType::Document),
            10 => Some(NodeType::DocumentType),
            11 => Some(NodeType::DocumentFragment),
            12 => Some(NodeType::Notation),
            _ => None,
        }
    }
}

/// Rectangle in document coordinates (top-left of page, ignores scroll)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DomRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

/// A single DOM node
///
/// Design:
/// - Navigation via indices, never pointers
/// - `rect` is the layout box in document coordinates; nodes that were
///   never laid out (or snapshots without geometry) carry `None`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    pub node_id: NodeId,
    pub node_type: NodeType,

    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>,

    pub node_name: String,
    pub node_value: String,
    pub attributes: HashMap<String, String>,

    pub rect: Option<DomRect>,

    // UUID for tracking nodes across snapshots
    pub uuid: String,
}

impl DomNode {
    /// Create a new node. The arena assigns `node_id` on insertion.
    pub fn new(node_type: NodeType, node_name: String) -> Self {
        Self {
            node_id: 0,
            node_type,
            parent_id: None,
            children_ids: SmallVec::new(),
            node_name,
            node_value: String::new(),
            attributes: HashMap::new(),
            rect: None,
            uuid: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Get tag name for element nodes
    pub fn tag_name(&self) -> Option<&str> {
        if self.node_type == NodeType::Element {
            Some(&self.node_name)
        } else {
            None
        }
    }

    /// Check if node is an element
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Check if node is text
    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Check tag name, ignoring case (CDP reports element names uppercase)
    pub fn tag_is(&self, tag: &str) -> bool {
        self.is_element() && self.node_name.eq_ignore_ascii_case(tag)
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Check whether the `class` attribute contains a whole token
    pub fn has_class(&self, token: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_ascii_whitespace().any(|c| c == token))
            .unwrap_or(false)
    }

    /// Document-coordinate layout box, zero when the node was never laid out
    pub fn rect_or_zero(&self) -> DomRect {
        self.rect.unwrap_or_else(DomRect::zero)
    }

    /// Check if this is an input, textarea or select element
    pub fn is_input_like(&self) -> bool {
        INPUT_TARGET_TAGS.iter().any(|tag| self.tag_is(tag))
    }

    /// Check if the element carries the `disabled` attribute
    pub fn is_disabled(&self) -> bool {
        self.attributes.contains_key("disabled")
    }

    /// Check if the element can take focus
    ///
    /// Mirrors browser behavior: form controls unless disabled or hidden,
    /// links with an href, and anything opted in via tabindex or
    /// contenteditable.
    pub fn can_receive_focus(&self) -> bool {
        if !self.is_element() || self.is_disabled() {
            return false;
        }
        if self.tag_is("input") {
            return self
                .attr("type")
                .map(|t| !t.eq_ignore_ascii_case("hidden"))
                .unwrap_or(true);
        }
        if self.tag_is("textarea") || self.tag_is("select") || self.tag_is("button") {
            return true;
        }
        if (self.tag_is("a") || self.tag_is("area")) && self.attr("href").is_some() {
            return true;
        }
        self.attr("tabindex").is_some() || self.attr("contenteditable").is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(name: &str, attrs: &[(&str, &str)]) -> DomNode {
        let mut node = DomNode::new(NodeType::Element, name.to_string());
        for (k, v) in attrs {
            node.attributes.insert(k.to_string(), v.to_string());
        }
        node
    }

    #[test]
    fn test_has_class_matches_whole_tokens() {
        let node = element("DIV", &[("class", "field error-summary error")]);
        assert!(node.has_class("error"));
        assert!(node.has_class("field"));
        assert!(!node.has_class("err"));
        assert!(!node.has_class("summary"));
    }

    #[test]
    fn test_input_like_is_case_insensitive() {
        assert!(element("INPUT", &[]).is_input_like());
        assert!(element("select", &[]).is_input_like());
        assert!(element("TEXTAREA", &[]).is_input_like());
        assert!(!element("BUTTON", &[]).is_input_like());
    }

    #[test]
    fn test_focusability() {
        assert!(element("INPUT", &[("type", "text")]).can_receive_focus());
        assert!(element("INPUT", &[]).can_receive_focus());
        assert!(!element("INPUT", &[("type", "hidden")]).can_receive_focus());
        assert!(!element("INPUT", &[("disabled", "")]).can_receive_focus());
        assert!(element("SELECT", &[]).can_receive_focus());
        assert!(!element("A", &[]).can_receive_focus());
        assert!(element("A", &[("href", "/next")]).can_receive_focus());
        assert!(element("DIV", &[("tabindex", "0")]).can_receive_focus());
        assert!(!element("DIV", &[]).can_receive_focus());
    }
}
