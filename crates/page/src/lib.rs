//! Headless form-error navigation
//!
//! A deterministic stand-in for the browser-side reveal: load a DOM
//! snapshot into a [`Page`], run [`Page::reveal_first_error`] or
//! [`Page::reveal_form_errors`], then drive the clock to observe the
//! deferred focus. The same arithmetic and selection rules back the
//! live CDP surface, so behavior proven here holds there too.
//!
//! ```
//! use formnav_page::{Page, RevealOptions};
//! use serde_json::json;
//!
//! let mut page = Page::from_snapshot(&json!({
//!     "root": {
//!         "nodeType": 1, "nodeName": "FORM",
//!         "children": [{
//!             "nodeType": 1, "nodeName": "DIV",
//!             "attributes": ["class", "error"],
//!             "rect": {"x": 0.0, "y": 250.0, "width": 640.0, "height": 80.0},
//!             "children": [
//!                 {"nodeType": 1, "nodeName": "INPUT", "attributes": ["type", "text"]}
//!             ]
//!         }]
//!     }
//! })).unwrap();
//!
//! let revealed = page.reveal_form_errors(None, &RevealOptions::default()).unwrap();
//! assert!(revealed);
//! assert_eq!(page.last_scroll_request().unwrap().top, 150.0);
//!
//! page.advance_time(300);
//! assert!(page.active_element().is_some());
//! ```

pub mod error;
pub mod navigate;
pub mod page;

pub use error::{PageError, Result};
pub use navigate::{
    DEFAULT_SCROLL_OFFSET, FOCUS_SETTLE_DELAY_MS, RevealOptions, RevealReport, scroll_target,
};
pub use page::{Page, ScrollBehavior, ScrollRequest};
