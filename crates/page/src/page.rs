//! Headless page state
//!
//! A [`Page`] wraps a parsed DOM snapshot with the pieces of browser
//! state the navigator touches: scroll offsets, the active (focused)
//! element, and a clock driving deferred work. Timed callbacks run only
//! when the caller advances the clock, so tests control exactly when a
//! deferred focus lands.

use crate::error::Result;
use formnav_dom::{DomArena, NodeId, parse_document};
use serde_json::Value;
use tracing::{debug, trace};

/// How a scroll was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// A recorded scroll request
///
/// `top` is kept exactly as requested, even when negative or past the
/// end of the document; clamping is the page's concern, not the
/// requester's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

/// A focus application waiting on the clock
#[derive(Debug, Clone, Copy)]
struct PendingFocus {
    due_at: u64,
    seq: u64,
    target: NodeId,
}

/// A loaded document plus the mutable browser state around it
#[derive(Debug)]
pub struct Page {
    arena: DomArena,
    scroll_x: f64,
    scroll_y: f64,
    active_element: Option<NodeId>,
    last_scroll_request: Option<ScrollRequest>,
    now_ms: u64,
    next_seq: u64,
    pending_focus: Vec<PendingFocus>,
}

impl Page {
    /// Wrap an already-built arena
    pub fn new(arena: DomArena) -> Self {
        Self {
            arena,
            scroll_x: 0.0,
            scroll_y: 0.0,
            active_element: None,
            last_scroll_request: None,
            now_ms: 0,
            next_seq: 0,
            pending_focus: Vec::new(),
        }
    }

    /// Load a page from CDP-shaped document JSON
    pub fn from_snapshot(snapshot: &Value) -> Result<Self> {
        Ok(Self::new(parse_document(snapshot)?))
    }

    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    pub fn scroll_x(&self) -> f64 {
        self.scroll_x
    }

    /// Vertical scroll offset (the `pageYOffset` analog)
    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Currently focused node, if any
    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    /// Most recent scroll request, exactly as it was issued
    pub fn last_scroll_request(&self) -> Option<ScrollRequest> {
        self.last_scroll_request
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of focus applications still waiting on the clock
    pub fn pending_focus_count(&self) -> usize {
        self.pending_focus.len()
    }

    /// Set scroll state directly, without recording a request
    /// (initial conditions, session restore)
    pub fn set_scroll(&mut self, x: f64, y: f64) {
        self.scroll_x = x;
        self.scroll_y = y;
    }

    /// Distance from the viewport top to the node's box
    /// (the `getBoundingClientRect().top` analog)
    pub fn viewport_top(&self, node_id: NodeId) -> Result<f64> {
        let node = self.arena.get(node_id)?;
        Ok(node.rect_or_zero().y - self.scroll_y)
    }

    /// Issue a vertical scroll request
    ///
    /// The request is recorded verbatim; the applied offset is clamped
    /// at the document top. Horizontal scroll is never touched.
    pub fn request_scroll(&mut self, top: f64, behavior: ScrollBehavior) {
        trace!("Scroll requested to {} ({:?})", top, behavior);
        self.last_scroll_request = Some(ScrollRequest { top, behavior });
        self.scroll_y = top.max(0.0);
    }

    /// Focus a node immediately (the `element.focus()` analog)
    ///
    /// Nodes that cannot take focus leave the active element unchanged,
    /// the way a real browser ignores the call.
    pub fn focus_node(&mut self, target: NodeId) {
        self.apply_focus(target);
    }

    /// Schedule a focus application `delay_ms` from now
    pub fn schedule_focus(&mut self, target: NodeId, delay_ms: u64) {
        let due_at = self.now_ms.saturating_add(delay_ms);
        let seq = self.next_seq;
        self.next_seq += 1;
        trace!("Focus on node {} scheduled for t={}ms", target, due_at);
        self.pending_focus.push(PendingFocus {
            due_at,
            seq,
            target,
        });
    }

    /// Advance the clock, running every deferred task that comes due
    ///
    /// Tasks run in (due time, schedule order) order, matching how a
    /// single-threaded event loop drains its timer queue.
    pub fn advance_time(&mut self, delta_ms: u64) {
        self.now_ms = self.now_ms.saturating_add(delta_ms);

        loop {
            let next = self
                .pending_focus
                .iter()
                .enumerate()
                .filter(|(_, task)| task.due_at <= self.now_ms)
                .min_by_key(|(_, task)| (task.due_at, task.seq))
                .map(|(index, _)| index);

            let Some(index) = next else {
                break;
            };
            let task = self.pending_focus.remove(index);
            self.apply_focus(task.target);
        }
    }

    fn apply_focus(&mut self, target: NodeId) {
        let Ok(node) = self.arena.get(target) else {
            debug!("Focus target {} no longer exists", target);
            return;
        };
        if node.can_receive_focus() {
            self.active_element = Some(target);
            debug!("Focus applied to node {}", target);
        } else {
            debug!(
                "Focus skipped for node {} ({}): cannot take focus",
                target, node.node_name
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// body -> [input#first, input#second (disabled), div#plain, input#third]
    fn controls_page() -> Page {
        Page::from_snapshot(&json!({
            "root": {
                "nodeType": 1,
                "nodeName": "BODY",
                "children": [
                    {"nodeType": 1, "nodeName": "INPUT", "attributes": ["id", "first"]},
                    {"nodeType": 1, "nodeName": "INPUT",
                     "attributes": ["id", "second", "disabled", ""]},
                    {"nodeType": 1, "nodeName": "DIV", "attributes": ["id", "plain"]},
                    {"nodeType": 1, "nodeName": "INPUT", "attributes": ["id", "third"]}
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_scroll_request_recorded_verbatim() {
        let mut page = controls_page();

        page.request_scroll(240.5, ScrollBehavior::Smooth);
        assert_eq!(
            page.last_scroll_request(),
            Some(ScrollRequest {
                top: 240.5,
                behavior: ScrollBehavior::Smooth
            })
        );
        assert_eq!(page.scroll_y(), 240.5);

        // Negative targets are recorded as-is but the page stays at the top.
        page.request_scroll(-60.0, ScrollBehavior::Smooth);
        assert_eq!(page.last_scroll_request().unwrap().top, -60.0);
        assert_eq!(page.scroll_y(), 0.0);
    }

    #[test]
    fn test_scroll_requests_leave_horizontal_alone() {
        let mut page = controls_page();
        page.set_scroll(33.0, 0.0);

        page.request_scroll(500.0, ScrollBehavior::Smooth);
        assert_eq!(page.scroll_x(), 33.0);
        assert_eq!(page.scroll_y(), 500.0);
    }

    #[test]
    fn test_viewport_top_subtracts_scroll() {
        let mut page = Page::from_snapshot(&json!({
            "root": {
                "nodeType": 1,
                "nodeName": "BODY",
                "children": [{
                    "nodeType": 1,
                    "nodeName": "DIV",
                    "rect": {"x": 0.0, "y": 400.0, "width": 100.0, "height": 50.0}
                }]
            }
        }))
        .unwrap();

        assert_eq!(page.viewport_top(1).unwrap(), 400.0);
        page.set_scroll(0.0, 150.0);
        assert_eq!(page.viewport_top(1).unwrap(), 250.0);
    }

    #[test]
    fn test_nodes_without_rect_read_as_zero() {
        let page = controls_page();
        assert_eq!(page.viewport_top(1).unwrap(), 0.0);
    }

    #[test]
    fn test_immediate_focus_respects_focusability() {
        let mut page = controls_page();
        let first = page.arena().find_by_id("first").unwrap();
        let second = page.arena().find_by_id("second").unwrap();
        let plain = page.arena().find_by_id("plain").unwrap();

        page.focus_node(first);
        assert_eq!(page.active_element(), Some(first));

        // Disabled controls and plain divs are refused; focus stays put.
        page.focus_node(second);
        assert_eq!(page.active_element(), Some(first));
        page.focus_node(plain);
        assert_eq!(page.active_element(), Some(first));
    }

    #[test]
    fn test_deferred_focus_waits_for_the_clock() {
        let mut page = controls_page();
        let first = page.arena().find_by_id("first").unwrap();

        page.schedule_focus(first, 300);
        assert_eq!(page.active_element(), None);
        assert_eq!(page.pending_focus_count(), 1);

        page.advance_time(299);
        assert_eq!(page.active_element(), None);

        page.advance_time(1);
        assert_eq!(page.active_element(), Some(first));
        assert_eq!(page.pending_focus_count(), 0);
    }

    #[test]
    fn test_due_tasks_run_in_due_order_not_schedule_order() {
        let mut page = controls_page();
        let first = page.arena().find_by_id("first").unwrap();
        let third = page.arena().find_by_id("third").unwrap();

        // Scheduled first but due later.
        page.schedule_focus(third, 500);
        page.schedule_focus(first, 100);

        page.advance_time(100);
        assert_eq!(page.active_element(), Some(first));

        // The later task still runs and takes the focus over.
        page.advance_time(400);
        assert_eq!(page.active_element(), Some(third));
        assert_eq!(page.pending_focus_count(), 0);
    }

    #[test]
    fn test_same_due_time_runs_in_schedule_order() {
        let mut page = controls_page();
        let first = page.arena().find_by_id("first").unwrap();
        let third = page.arena().find_by_id("third").unwrap();

        page.schedule_focus(first, 300);
        page.advance_time(100);

        // Lands at the same absolute due time as the first request; the
        // earlier-scheduled one applies first, so this one wins.
        page.schedule_focus(third, 200);
        page.advance_time(200);

        assert_eq!(page.active_element(), Some(third));
        assert_eq!(page.pending_focus_count(), 0);
    }
}
