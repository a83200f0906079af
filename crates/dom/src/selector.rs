//! Minimal CSS selector engine for snapshot queries
//!
//! Supports the subset the navigator needs: tag names, `#id`, `.class`,
//! `[attr]`, `[attr=value]` with quoted or bare values, compounds of
//! those, and comma-separated lists. Combinators and pseudo-classes are
//! rejected with a syntax error rather than silently matching nothing.

use crate::error::{DomError, Result};
use crate::types::{DEFAULT_ERROR_SELECTOR, DomNode};
use serde::{Deserialize, Serialize};

/// Which descendants count as validation errors
///
/// Carries the raw selector string; validity is checked where the
/// predicate is used, so a malformed custom selector surfaces as a
/// syntax error from the query, not at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorPredicate {
    selector: String,
}

impl ErrorPredicate {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }

    /// Build a predicate, validating the selector up front
    ///
    /// For callers that want the syntax fault at configuration time
    /// instead of at the first reveal.
    pub fn parse(selector: &str) -> Result<Self> {
        SelectorList::parse(selector)?;
        Ok(Self::new(selector))
    }

    /// Raw selector text, as handed to a live query engine
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Parse into a matcher for snapshot-side queries
    pub fn matcher(&self) -> Result<SelectorList> {
        SelectorList::parse(&self.selector)
    }
}

impl Default for ErrorPredicate {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_SELECTOR)
    }
}

impl std::fmt::Display for ErrorPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.selector)
    }
}

/// A parsed, matchable selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    compounds: Vec<Compound>,
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self> {
        let mut compounds = Vec::new();
        for part in split_on_commas(input)? {
            let part = part.trim();
            if part.is_empty() {
                return Err(DomError::selector(input, "empty selector in list"));
            }
            compounds.push(parse_compound(input, part)?);
        }
        Ok(Self { compounds })
    }

    /// True when any compound in the list matches the node
    pub fn matches(&self, node: &DomNode) -> bool {
        self.compounds.iter().any(|c| c.matches(node))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound {
    /// Lowercase tag name; `None` matches any element
    tag: Option<String>,
    parts: Vec<Simple>,
}

impl Compound {
    fn matches(&self, node: &DomNode) -> bool {
        if !node.is_element() {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !node.node_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.parts.iter().all(|p| p.matches(node))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Simple {
    Id(String),
    Class(String),
    AttrPresent(String),
    AttrEquals(String, String),
}

impl Simple {
    fn matches(&self, node: &DomNode) -> bool {
        match self {
            Simple::Id(id) => node.attr("id") == Some(id.as_str()),
            Simple::Class(class) => node.has_class(class),
            Simple::AttrPresent(name) => node.attributes.contains_key(name),
            Simple::AttrEquals(name, value) => node.attr(name) == Some(value.as_str()),
        }
    }
}

/// Split a selector list on commas, ignoring commas inside quoted values
fn split_on_commas(input: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;

    for (i, ch) in input.char_indices() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                ',' => {
                    parts.push(&input[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    if quote.is_some() {
        return Err(DomError::selector(input, "unterminated quoted value"));
    }
    parts.push(&input[start..]);
    Ok(parts)
}

fn parse_compound(source: &str, part: &str) -> Result<Compound> {
    let mut cur = Cursor::new(part);
    let mut tag = None;
    let mut universal = false;
    let mut parts = Vec::new();

    match cur.peek() {
        Some('*') => {
            cur.bump();
            universal = true;
        }
        Some(c) if is_ident_char(c) => {
            tag = Some(cur.take_ident().to_ascii_lowercase());
        }
        _ => {}
    }

    while let Some(ch) = cur.peek() {
        match ch {
            '#' => {
                cur.bump();
                let id = cur.take_ident();
                if id.is_empty() {
                    return Err(DomError::selector(source, "expected id after `#`"));
                }
                parts.push(Simple::Id(id.to_string()));
            }
            '.' => {
                cur.bump();
                let class = cur.take_ident();
                if class.is_empty() {
                    return Err(DomError::selector(source, "expected class name after `.`"));
                }
                parts.push(Simple::Class(class.to_string()));
            }
            '[' => {
                cur.bump();
                parts.push(parse_attr(source, &mut cur)?);
            }
            ':' => {
                return Err(DomError::selector(source, "pseudo-classes are not supported"));
            }
            '>' | '+' | '~' => {
                return Err(DomError::selector(source, "combinators are not supported"));
            }
            c if c.is_whitespace() => {
                return Err(DomError::selector(
                    source,
                    "descendant combinators are not supported",
                ));
            }
            c => {
                return Err(DomError::selector(
                    source,
                    format!("unexpected character `{c}`"),
                ));
            }
        }
    }

    if tag.is_none() && !universal && parts.is_empty() {
        return Err(DomError::selector(source, "expected a selector"));
    }
    Ok(Compound { tag, parts })
}

fn parse_attr(source: &str, cur: &mut Cursor) -> Result<Simple> {
    let name = cur.take_ident().to_ascii_lowercase();
    if name.is_empty() {
        return Err(DomError::selector(
            source,
            "expected attribute name after `[`",
        ));
    }

    match cur.peek() {
        Some(']') => {
            cur.bump();
            Ok(Simple::AttrPresent(name))
        }
        Some('=') => {
            cur.bump();
            let value = match cur.peek() {
                Some(q @ ('"' | '\'')) => {
                    cur.bump();
                    let value = cur
                        .take_until(q)
                        .ok_or_else(|| DomError::selector(source, "unterminated quoted value"))?;
                    cur.bump();
                    value.to_string()
                }
                _ => cur
                    .take_until(']')
                    .ok_or_else(|| DomError::selector(source, "unterminated attribute selector"))?
                    .to_string(),
            };
            match cur.peek() {
                Some(']') => {
                    cur.bump();
                    Ok(Simple::AttrEquals(name, value))
                }
                _ => Err(DomError::selector(
                    source,
                    "expected `]` after attribute value",
                )),
            }
        }
        _ => Err(DomError::selector(
            source,
            "expected `]` or `=` in attribute selector",
        )),
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Byte-position cursor over a compound selector
struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    /// Consume a run of identifier characters (possibly empty)
    fn take_ident(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !is_ident_char(c) {
                break;
            }
            self.bump();
        }
        &self.input[start..self.pos]
    }

    /// Consume up to (not including) the terminator; None if it never appears
    fn take_until(&mut self, terminator: char) -> Option<&'a str> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == terminator {
                return Some(&self.input[start..self.pos]);
            }
            self.bump();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeType;

    fn element(name: &str, attrs: &[(&str, &str)]) -> DomNode {
        let mut node = DomNode::new(NodeType::Element, name.to_string());
        for (k, v) in attrs {
            node.attributes.insert(k.to_string(), v.to_string());
        }
        node
    }

    #[test]
    fn test_default_predicate_clauses() {
        let matcher = ErrorPredicate::default().matcher().unwrap();

        assert!(matcher.matches(&element("DIV", &[("data-error", "required")])));
        assert!(matcher.matches(&element("SPAN", &[("class", "field error")])));
        assert!(matcher.matches(&element("INPUT", &[("aria-invalid", "true")])));

        assert!(!matcher.matches(&element("DIV", &[("class", "errors")])));
        assert!(!matcher.matches(&element("INPUT", &[("aria-invalid", "false")])));
        assert!(!matcher.matches(&element("DIV", &[])));
    }

    #[test]
    fn test_text_nodes_never_match() {
        let matcher = ErrorPredicate::default().matcher().unwrap();
        let mut text = DomNode::new(NodeType::Text, "#text".to_string());
        text.node_value = "error".to_string();
        assert!(!matcher.matches(&text));
    }

    #[test]
    fn test_compound_selector() {
        let list = SelectorList::parse(r#"input.wide#serial[type="text"]"#).unwrap();

        let full = element(
            "INPUT",
            &[("class", "wide"), ("id", "serial"), ("type", "text")],
        );
        assert!(list.matches(&full));

        let wrong_type = element(
            "INPUT",
            &[("class", "wide"), ("id", "serial"), ("type", "email")],
        );
        assert!(!list.matches(&wrong_type));
    }

    #[test]
    fn test_tag_match_ignores_case() {
        let list = SelectorList::parse("textarea").unwrap();
        assert!(list.matches(&element("TEXTAREA", &[])));
        assert!(list.matches(&element("textarea", &[])));
    }

    #[test]
    fn test_bare_and_single_quoted_values() {
        let bare = SelectorList::parse("[aria-invalid=true]").unwrap();
        let quoted = SelectorList::parse("[aria-invalid='true']").unwrap();
        let node = element("INPUT", &[("aria-invalid", "true")]);
        assert!(bare.matches(&node));
        assert!(quoted.matches(&node));
    }

    #[test]
    fn test_universal_selector() {
        let list = SelectorList::parse("*[data-error]").unwrap();
        assert!(list.matches(&element("P", &[("data-error", "")])));
        assert!(!list.matches(&element("P", &[])));
    }

    #[test]
    fn test_syntax_faults() {
        for bad in [
            "",
            "  ",
            ".error,,#x",
            "div span",
            "div > .error",
            "input:focus",
            "[data-error",
            "[=x]",
            r#"[data-error="unclosed]"#,
            ".",
            "#",
        ] {
            let err = SelectorList::parse(bad).unwrap_err();
            assert!(
                matches!(err, DomError::Selector { .. }),
                "expected syntax fault for {bad:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_predicate_parse_validates_up_front() {
        assert!(ErrorPredicate::parse(".invalid").is_ok());
        assert!(matches!(
            ErrorPredicate::parse("div >> p"),
            Err(DomError::Selector { .. })
        ));

        // `new` stays lazy; the fault surfaces from `matcher`.
        let lazy = ErrorPredicate::new("div >> p");
        assert!(lazy.matcher().is_err());
    }

    #[test]
    fn test_predicate_serde_is_transparent() {
        let predicate = ErrorPredicate::new(".invalid");
        let json = serde_json::to_string(&predicate).unwrap();
        assert_eq!(json, r#"".invalid""#);

        let back: ErrorPredicate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, predicate);
    }
}
