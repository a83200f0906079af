//! Live form-error navigation over CDP
//!
//! Connects to a running Chrome via the DevTools Protocol and reveals
//! form errors in real pages: find the first element matching the
//! error predicate, smooth-scroll it into view with a fixed offset,
//! then focus its first input once the scroll has settled.
//!
//! The flow mirrors the headless `formnav-page` crate; this one trades
//! the deterministic clock for real browser timing, so the deferred
//! focus runs on a detached tokio task instead of a timer queue.

pub mod cdp;
pub mod events;
pub mod ops;
pub mod reveal;
pub mod session;

pub use cdp::{CdpClient, CdpError, CdpNodeId, CdpSession};
pub use events::{EventBus, PageEvent};
pub use ops::{CdpPage, ElementMetrics, PageOps};
pub use reveal::{resolve_form_container, reveal_first_error, reveal_form_errors};
pub use session::{BrowserError, BrowserSession, SessionConfig};
