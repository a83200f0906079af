//! Error types for headless page operations

use formnav_dom::DomError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PageError>;

/// Failures surfaced by page operations.
///
/// Everything fallible here is rooted in the DOM layer: bad snapshots,
/// dangling node ids, selector syntax faults. Scroll and clock updates
/// never fail.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Dom(#[from] DomError),
}
