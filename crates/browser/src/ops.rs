//! Page operations - the seam between the navigator and its transport
//!
//! The reveal logic only needs four capabilities from a page. They are
//! a trait so the navigator can run against a scripted page in tests
//! and against CDP in production without branching.

use crate::cdp::{CdpNodeId, CdpSession, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// Function evaluated on an element to read its position data in one
/// round trip. Keys mirror [`ElementMetrics`].
const METRICS_FN: &str = "function() {
    const rect = this.getBoundingClientRect();
    return { viewportTop: rect.top, pageYOffset: window.pageYOffset };
}";

/// Element position data for the scroll arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementMetrics {
    /// `getBoundingClientRect().top` - distance from the viewport top
    pub viewport_top: f64,
    /// `window.pageYOffset` - current vertical scroll
    pub page_y_offset: f64,
}

/// Browser capabilities a reveal needs
#[async_trait]
pub trait PageOps: Send + Sync {
    /// First descendant of `scope` matching `selector` in document
    /// order; `None` scope means the whole document
    async fn find_first(
        &self,
        scope: Option<CdpNodeId>,
        selector: &str,
    ) -> Result<Option<CdpNodeId>>;

    /// Position data, read atomically so both numbers describe the
    /// same instant even while the page is mid-scroll
    async fn metrics(&self, node: CdpNodeId) -> Result<ElementMetrics>;

    /// Ask the window for a smooth scroll to `top` in document
    /// coordinates
    async fn request_smooth_scroll(&self, top: f64) -> Result<()>;

    /// Give a node input focus
    async fn focus(&self, node: CdpNodeId) -> Result<()>;
}

/// CDP-backed page operations
#[derive(Clone)]
pub struct CdpPage {
    session: CdpSession,
}

impl CdpPage {
    pub fn new(session: CdpSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &CdpSession {
        &self.session
    }
}

#[async_trait]
impl PageOps for CdpPage {
    async fn find_first(
        &self,
        scope: Option<CdpNodeId>,
        selector: &str,
    ) -> Result<Option<CdpNodeId>> {
        let scope = match scope {
            Some(node) => node,
            None => self.session.document_node().await?,
        };
        self.session.query_selector(scope, selector).await
    }

    async fn metrics(&self, node: CdpNodeId) -> Result<ElementMetrics> {
        let object_id = self.session.resolve_node(node).await?;
        let value = self.session.call_function_on(&object_id, METRICS_FN).await?;
        serde_json::from_value(value).map_err(Into::into)
    }

    async fn request_smooth_scroll(&self, top: f64) -> Result<()> {
        self.session
            .evaluate(format!(
                "window.scrollTo({{ top: {top}, behavior: 'smooth' }})"
            ))
            .await?;
        Ok(())
    }

    async fn focus(&self, node: CdpNodeId) -> Result<()> {
        self.session.focus_node(node).await
    }
}
