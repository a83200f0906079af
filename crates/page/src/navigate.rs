//! Form-error navigation
//!
//! The reveal walks a container's descendants for the first node
//! matching the error predicate, requests a smooth scroll that puts it
//! `offset` pixels below the viewport top, and schedules focus for its
//! first input-like descendant (or the node itself) once the scroll has
//! had time to settle.
//!
//! Reveals report what they did but deliberately do not expose the
//! deferred part: callers get `true` the moment the scroll is requested
//! and the focus is queued, mirroring how the operation behaves behind
//! a real event loop.

use crate::error::Result;
use crate::page::{Page, ScrollBehavior};
use formnav_dom::{ErrorPredicate, NodeId};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Pause between requesting the scroll and applying focus, long enough
/// for a smooth scroll to finish before the viewport jumps to the
/// focused control.
pub const FOCUS_SETTLE_DELAY_MS: u64 = 300;

/// Default gap between the viewport top and the revealed element, px.
pub const DEFAULT_SCROLL_OFFSET: f64 = 100.0;

/// Knobs for a reveal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealOptions {
    /// Which descendants count as errors
    pub predicate: ErrorPredicate,
    /// Pixels kept between the viewport top and the revealed element
    pub offset: f64,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            predicate: ErrorPredicate::default(),
            offset: DEFAULT_SCROLL_OFFSET,
        }
    }
}

/// What a successful reveal decided to do
#[derive(Debug, Clone, Serialize)]
pub struct RevealReport {
    /// The error node that was matched
    pub matched: NodeId,
    /// Stable identity of the matched node
    pub matched_uuid: String,
    /// Vertical scroll target, exactly as requested
    pub scroll_target: f64,
    /// Node the deferred focus was scheduled for
    pub focus_target: NodeId,
    /// True when no input-like descendant existed and the matched
    /// element itself took the focus slot
    pub focus_fallback: bool,
}

/// Scroll target that puts the element `offset` pixels below the
/// viewport top: its viewport position converted to document
/// coordinates, minus the offset.
pub fn scroll_target(viewport_top: f64, page_offset_y: f64, offset: f64) -> f64 {
    viewport_top + page_offset_y - offset
}

impl Page {
    /// Reveal the first error inside `container`
    ///
    /// Returns `Ok(true)` when an error was found, the scroll was
    /// requested and focus was queued. `Ok(false)` means no container
    /// or no match, with the page left untouched. Selector syntax
    /// faults in a custom predicate propagate as errors.
    pub fn reveal_first_error(
        &mut self,
        container: Option<NodeId>,
        options: &RevealOptions,
    ) -> Result<bool> {
        Ok(self.reveal_first_error_report(container, options)?.is_some())
    }

    /// Like [`Page::reveal_first_error`], but says what was done
    pub fn reveal_first_error_report(
        &mut self,
        container: Option<NodeId>,
        options: &RevealOptions,
    ) -> Result<Option<RevealReport>> {
        let Some(container) = container else {
            trace!("Reveal skipped: no container");
            return Ok(None);
        };

        let matcher = options.predicate.matcher()?;
        let Some(matched) = self
            .arena()
            .find_first_within(container, |node| matcher.matches(node))?
        else {
            trace!("No error nodes under container {}", container);
            return Ok(None);
        };

        let viewport_top = self.viewport_top(matched)?;
        let target = scroll_target(viewport_top, self.scroll_y(), options.offset);
        self.request_scroll(target, ScrollBehavior::Smooth);

        let input = self
            .arena()
            .find_first_within(matched, |node| node.is_input_like())?;
        let (focus_target, focus_fallback) = match input {
            Some(id) => (id, false),
            None => (matched, true),
        };
        let matched_uuid = self.arena().get(matched)?.uuid.clone();
        self.schedule_focus(focus_target, FOCUS_SETTLE_DELAY_MS);

        debug!(
            "Revealing error node {}: scroll to {}, focus {} in {}ms",
            matched, target, focus_target, FOCUS_SETTLE_DELAY_MS
        );

        Ok(Some(RevealReport {
            matched,
            matched_uuid,
            scroll_target: target,
            focus_target,
            focus_fallback,
        }))
    }

    /// Reveal the first error in a form
    ///
    /// The container is the element with id `form_id` when that
    /// resolves, otherwise the document's first form. No resolvable
    /// container means `Ok(false)`.
    pub fn reveal_form_errors(
        &mut self,
        form_id: Option<&str>,
        options: &RevealOptions,
    ) -> Result<bool> {
        Ok(self.reveal_form_errors_report(form_id, options)?.is_some())
    }

    /// Like [`Page::reveal_form_errors`], but says what was done
    pub fn reveal_form_errors_report(
        &mut self,
        form_id: Option<&str>,
        options: &RevealOptions,
    ) -> Result<Option<RevealReport>> {
        let container = self.resolve_form_container(form_id)?;
        self.reveal_first_error_report(container, options)
    }

    fn resolve_form_container(&self, form_id: Option<&str>) -> Result<Option<NodeId>> {
        if let Some(id) = form_id {
            if let Some(node_id) = self.arena().find_by_id(id) {
                return Ok(Some(node_id));
            }
            debug!("No element with id `{}`, trying the first form", id);
        }
        Ok(self.arena().first_by_tag("form")?)
    }
}
