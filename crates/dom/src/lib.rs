//! DOM snapshot model for form-error navigation
//!
//! Arena-backed DOM trees plus the small query surface the navigator
//! needs: document-order search, an id index, and a CSS selector
//! subset for error predicates.
//!
//! ## Core Design
//!
//! ```text
//! CDP-shaped JSON → parse_document → DomArena → find_first_within
//!                                        ↓
//!                                   NodeId (u32)
//! ```
//!
//! Trees are ephemeral: each snapshot builds a fresh arena and nothing
//! is retained across loads.

pub mod arena;
pub mod error;
pub mod selector;
pub mod snapshot;
pub mod types;

pub use arena::DomArena;
pub use error::{DomError, Result};
pub use selector::{ErrorPredicate, SelectorList};
pub use snapshot::parse_document;
pub use types::{
    DEFAULT_ERROR_SELECTOR, DomNode, DomRect, INPUT_TARGET_SELECTOR, INPUT_TARGET_TAGS, NodeId,
    NodeType,
};
