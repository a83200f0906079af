//! CDP Session - Represents a connection to a specific browser target
//!
//! Design: Lightweight wrapper around CdpClient with target-specific
//! context. All sessions share the same WebSocket - no per-session
//! connection overhead.

use super::client::{CdpClient, CdpError, Result};
use super::protocol::{
    AttachToTargetResult, CdpNodeId, RemoteObjectId, SessionId, TargetId, TargetInfo,
};
use serde_json::{Value, json};
use std::sync::Arc;

/// Domains enabled on every session unless the caller overrides them.
const DEFAULT_DOMAINS: &[&str] = &["Page", "DOM", "Runtime"];

/// CDP Session bound to a specific target
#[derive(Clone)]
pub struct CdpSession {
    /// Shared CDP client
    client: Arc<CdpClient>,

    /// Target this session is attached to
    pub target_id: TargetId,

    /// Session ID assigned by Chrome
    pub session_id: SessionId,

    /// Cached target info
    pub title: String,
    pub url: String,
}

impl CdpSession {
    /// Attach to a target and create a session
    pub async fn attach(
        client: Arc<CdpClient>,
        target_id: TargetId,
        domains: Option<Vec<&str>>,
    ) -> Result<Self> {
        let result = client
            .send_request(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": target_id,
                    "flatten": true,
                })),
                None,
            )
            .await?;

        let attach_result: AttachToTargetResult =
            serde_json::from_value(result).map_err(CdpError::Json)?;
        let session_id = attach_result.session_id;

        // Enable domains in parallel
        let domains = domains.unwrap_or_else(|| DEFAULT_DOMAINS.to_vec());
        let enable_futures: Vec<_> = domains
            .into_iter()
            .map(|domain| {
                let client = client.clone();
                let session_id = session_id.clone();
                async move {
                    client
                        .send_request(format!("{}.enable", domain), None, Some(session_id))
                        .await
                }
            })
            .collect();

        // Wait for all enables (ignore individual failures)
        let results = futures_util::future::join_all(enable_futures).await;
        let failures = results.iter().filter(|r| r.is_err()).count();
        if failures > 0 {
            tracing::warn!("Some domain enables failed: {}/{}", failures, results.len());
        }

        let info_result = client
            .send_request(
                "Target.getTargetInfo",
                Some(json!({ "targetId": &target_id })),
                None,
            )
            .await?;
        let target_info: TargetInfo =
            serde_json::from_value(info_result["targetInfo"].clone()).map_err(CdpError::Json)?;

        Ok(Self {
            client,
            target_id,
            session_id,
            title: target_info.title,
            url: target_info.url,
        })
    }

    /// Send a command within this session's context
    pub async fn send(&self, method: impl Into<String>, params: Option<Value>) -> Result<Value> {
        self.client
            .send_request(method, params, Some(self.session_id.clone()))
            .await
    }

    /// Get current target info
    pub async fn get_target_info(&self) -> Result<TargetInfo> {
        let result = self
            .client
            .send_request(
                "Target.getTargetInfo",
                Some(json!({ "targetId": &self.target_id })),
                None,
            )
            .await?;

        serde_json::from_value(result["targetInfo"].clone()).map_err(CdpError::Json)
    }

    /// Navigate to a URL
    pub async fn navigate(&self, url: impl Into<String>) -> Result<Value> {
        self.send("Page.navigate", Some(json!({ "url": url.into() })))
            .await
    }

    /// Evaluate JavaScript in the page
    pub async fn evaluate(&self, expression: impl Into<String>) -> Result<Value> {
        self.send(
            "Runtime.evaluate",
            Some(json!({
                "expression": expression.into(),
                "returnByValue": true,
            })),
        )
        .await
    }

    /// Root node of the current document
    pub async fn document_node(&self) -> Result<CdpNodeId> {
        let result = self
            .send("DOM.getDocument", Some(json!({ "depth": 0 })))
            .await?;
        result["root"]["nodeId"]
            .as_i64()
            .ok_or(CdpError::Protocol {
                code: 0,
                message: "DOM.getDocument returned no root nodeId".to_string(),
            })
    }

    /// First descendant of `scope` matching a CSS selector
    ///
    /// Chrome reports "no match" as nodeId 0 rather than an error;
    /// selector syntax faults come back as protocol errors and are
    /// passed through.
    pub async fn query_selector(
        &self,
        scope: CdpNodeId,
        selector: &str,
    ) -> Result<Option<CdpNodeId>> {
        let result = self
            .send(
                "DOM.querySelector",
                Some(json!({ "nodeId": scope, "selector": selector })),
            )
            .await?;

        match result["nodeId"].as_i64() {
            Some(0) | None => Ok(None),
            Some(node_id) => Ok(Some(node_id)),
        }
    }

    /// Resolve a DOM node into a Runtime remote object
    pub async fn resolve_node(&self, node_id: CdpNodeId) -> Result<RemoteObjectId> {
        let result = self
            .send("DOM.resolveNode", Some(json!({ "nodeId": node_id })))
            .await?;

        result["object"]["objectId"]
            .as_str()
            .map(str::to_string)
            .ok_or(CdpError::Protocol {
                code: 0,
                message: format!("DOM.resolveNode returned no objectId for node {node_id}"),
            })
    }

    /// Call a JS function with a resolved node as `this`
    pub async fn call_function_on(
        &self,
        object_id: &RemoteObjectId,
        declaration: &str,
    ) -> Result<Value> {
        let result = self
            .send(
                "Runtime.callFunctionOn",
                Some(json!({
                    "objectId": object_id,
                    "functionDeclaration": declaration,
                    "returnByValue": true,
                })),
            )
            .await?;

        Ok(result["result"]["value"].clone())
    }

    /// Give a DOM node input focus
    pub async fn focus_node(&self, node_id: CdpNodeId) -> Result<()> {
        self.send("DOM.focus", Some(json!({ "nodeId": node_id })))
            .await?;
        Ok(())
    }
}
