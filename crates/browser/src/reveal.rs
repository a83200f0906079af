//! Live form-error navigation over a CDP page
//!
//! Same contract as the headless reveal in `formnav-page`: find the
//! first error under the container, request a smooth scroll that
//! leaves it `offset` pixels below the viewport top, then focus its
//! first input-like descendant once the scroll has settled.
//!
//! The focus step runs in a detached task after the settle delay.
//! Nothing holds its handle: overlapping reveals race and the last
//! one to fire wins, the same way stacked timer callbacks behave in a
//! page. The reveal's return value only covers the synchronous part.

use crate::cdp::{CdpNodeId, Result};
use crate::events::{EventBus, PageEvent};
use crate::ops::PageOps;
use formnav_dom::INPUT_TARGET_SELECTOR;
use formnav_page::{FOCUS_SETTLE_DELAY_MS, RevealOptions, scroll_target};
use std::time::Duration;
use tracing::{debug, trace};

/// Reveal the first error inside `container`
///
/// `Ok(true)` means an error was matched, the scroll was requested and
/// the focus was queued. `Ok(false)` means no container or no match,
/// with the page untouched. Selector faults from a custom predicate
/// come back as CDP protocol errors.
pub async fn reveal_first_error<O>(
    ops: &O,
    container: Option<CdpNodeId>,
    options: &RevealOptions,
    events: &EventBus,
) -> Result<bool>
where
    O: PageOps + Clone + 'static,
{
    let Some(container) = container else {
        trace!("Reveal skipped: no container");
        return Ok(false);
    };

    let Some(matched) = ops
        .find_first(Some(container), options.predicate.selector())
        .await?
    else {
        trace!("No error nodes under container {}", container);
        return Ok(false);
    };

    let metrics = ops.metrics(matched).await?;
    let target = scroll_target(metrics.viewport_top, metrics.page_y_offset, options.offset);
    ops.request_smooth_scroll(target).await?;
    events.publish(PageEvent::ErrorRevealed {
        node: matched,
        scroll_target: target,
    });

    let focus_target = ops
        .find_first(Some(matched), INPUT_TARGET_SELECTOR)
        .await?
        .unwrap_or(matched);

    debug!(
        "Revealing error node {}: scroll to {}, focus {} in {}ms",
        matched, target, focus_target, FOCUS_SETTLE_DELAY_MS
    );

    let ops = ops.clone();
    let events = events.clone();
    // The settle timer starts now, when the focus is scheduled, not
    // when the spawned task gets its first poll.
    let settle = tokio::time::sleep(Duration::from_millis(FOCUS_SETTLE_DELAY_MS));
    tokio::spawn(async move {
        settle.await;
        match ops.focus(focus_target).await {
            Ok(()) => {
                events.publish(PageEvent::FocusApplied { node: focus_target });
            }
            Err(e) => {
                // The reveal already reported success; a focus that can
                // no longer land is an event, not an error.
                debug!("Deferred focus on node {} failed: {}", focus_target, e);
                events.publish(PageEvent::FocusSkipped {
                    node: focus_target,
                    reason: e.to_string(),
                });
            }
        }
    });

    Ok(true)
}

/// Reveal the first error in a form
///
/// The container is the element with id `form_id` when that resolves,
/// otherwise the document's first form.
pub async fn reveal_form_errors<O>(
    ops: &O,
    form_id: Option<&str>,
    options: &RevealOptions,
    events: &EventBus,
) -> Result<bool>
where
    O: PageOps + Clone + 'static,
{
    let container = resolve_form_container(ops, form_id).await?;
    reveal_first_error(ops, container, options, events).await
}

/// Container lookup for form reveals: the element with the given id,
/// else the first form in the document, else nothing
pub async fn resolve_form_container<O: PageOps>(
    ops: &O,
    form_id: Option<&str>,
) -> Result<Option<CdpNodeId>> {
    if let Some(id) = form_id {
        if let Some(node) = ops.find_first(None, &id_selector(id)).await? {
            return Ok(Some(node));
        }
        debug!("No element with id `{}`, trying the first form", id);
    }
    ops.find_first(None, "form").await
}

/// Exact-id attribute selector with the id escaped for a quoted string
fn id_selector(id: &str) -> String {
    format!(
        "[id=\"{}\"]",
        id.replace('\\', "\\\\").replace('"', "\\\"")
    )
}
