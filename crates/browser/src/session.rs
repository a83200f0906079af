//! Browser session management
//!
//! The high-level entry point: connects to a running Chrome over CDP,
//! tracks tabs, and runs error reveals against the active one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::cdp::protocol::TargetId;
use crate::cdp::{CdpClient, CdpError, CdpNodeId, CdpSession};
use crate::events::{EventBus, PageEvent};
use crate::ops::CdpPage;
use crate::reveal;
use formnav_page::RevealOptions;

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub id: String,
    pub cdp_url: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            cdp_url: "ws://localhost:9222".to_string(),
        }
    }
}

/// Session-level failures, with CDP transport errors folded in
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Not connected to a browser")]
    NotConnected,
    #[error("No active tab")]
    NoActiveTab,
    #[error("Unknown target: {0}")]
    UnknownTarget(TargetId),
    #[error("Unexpected CDP payload: {0}")]
    Payload(String),
    #[error(transparent)]
    Cdp(#[from] CdpError),
}

pub type Result<T> = std::result::Result<T, BrowserError>;

/// Browser session: one CDP connection, many tabs, one active tab
pub struct BrowserSession {
    pub config: SessionConfig,
    pub event_bus: EventBus,

    client: RwLock<Option<Arc<CdpClient>>>,
    tabs: RwLock<HashMap<TargetId, CdpSession>>,
    current_target: RwLock<Option<TargetId>>,
}

impl BrowserSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            event_bus: EventBus::new(),
            client: RwLock::new(None),
            tabs: RwLock::new(HashMap::new()),
            current_target: RwLock::new(None),
        }
    }

    /// Connect to the Chrome endpoint from the config
    pub async fn connect(&self) -> Result<()> {
        let client = CdpClient::connect(&self.config.cdp_url).await?;
        *self.client.write().await = Some(client);

        self.event_bus.publish(PageEvent::Connected {
            endpoint: self.config.cdp_url.clone(),
        });
        Ok(())
    }

    /// Close the connection and drop all tab sessions
    pub async fn close(&self) -> Result<()> {
        self.tabs.write().await.clear();
        *self.current_target.write().await = None;

        if let Some(client) = self.client.write().await.take() {
            client.close().await?;
        }

        self.event_bus.publish(PageEvent::Disconnected);
        Ok(())
    }

    async fn client(&self) -> Result<Arc<CdpClient>> {
        self.client
            .read()
            .await
            .as_ref()
            .cloned()
            .ok_or(BrowserError::NotConnected)
    }

    /// Open a new tab and make it the active one
    pub async fn new_tab(&self, url: Option<String>) -> Result<TargetId> {
        let client = self.client().await?;
        let url = url.unwrap_or_else(|| "about:blank".to_string());

        let result = client
            .send_request(
                "Target.createTarget",
                Some(serde_json::json!({ "url": url })),
                None,
            )
            .await?;

        let target_id: TargetId = result["targetId"]
            .as_str()
            .ok_or_else(|| BrowserError::Payload("Target.createTarget without targetId".into()))?
            .to_string();

        let session = CdpSession::attach(client, target_id.clone(), None).await?;

        self.tabs.write().await.insert(target_id.clone(), session);
        *self.current_target.write().await = Some(target_id.clone());

        self.event_bus.publish(PageEvent::TabOpened {
            target_id: target_id.clone(),
        });
        Ok(target_id)
    }

    /// Make an already-open tab the active one
    pub async fn switch_tab(&self, target_id: TargetId) -> Result<()> {
        if !self.tabs.read().await.contains_key(&target_id) {
            return Err(BrowserError::UnknownTarget(target_id));
        }

        *self.current_target.write().await = Some(target_id.clone());
        self.event_bus.publish(PageEvent::TabSwitched { target_id });
        Ok(())
    }

    /// The active tab's CDP session
    pub async fn current_session(&self) -> Option<CdpSession> {
        let target_id = self.current_target.read().await.clone()?;
        self.tabs.read().await.get(&target_id).cloned()
    }

    /// The active tab as a page surface for reveals
    pub async fn current_page(&self) -> Result<CdpPage> {
        self.current_session()
            .await
            .map(CdpPage::new)
            .ok_or(BrowserError::NoActiveTab)
    }

    /// Navigate the active tab
    pub async fn navigate(&self, url: impl Into<String>) -> Result<()> {
        let url = url.into();
        let session = self
            .current_session()
            .await
            .ok_or(BrowserError::NoActiveTab)?;

        session.navigate(&url).await?;

        self.event_bus.publish(PageEvent::Navigated { url });
        Ok(())
    }

    /// Reveal the first error under `container` in the active tab
    ///
    /// `None` and a container with no matches both come back as
    /// `Ok(false)` with the page untouched.
    pub async fn reveal_first_error(
        &self,
        container: Option<CdpNodeId>,
        options: &RevealOptions,
    ) -> Result<bool> {
        let page = self.current_page().await?;
        Ok(reveal::reveal_first_error(&page, container, options, &self.event_bus).await?)
    }

    /// Reveal the first error in a form of the active tab
    ///
    /// The container is the element with id `form_id` when present,
    /// otherwise the document's first form.
    pub async fn reveal_form_errors(
        &self,
        form_id: Option<&str>,
        options: &RevealOptions,
    ) -> Result<bool> {
        let page = self.current_page().await?;
        Ok(reveal::reveal_form_errors(&page, form_id, options, &self.event_bus).await?)
    }
}
