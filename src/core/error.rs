//! # Navigation Errors
//!
//! Structural failures of a page tree. These are configuration defects
//! (an empty page source, a navigator page without a nested container, a
//! coordinator bound twice), not runtime conditions, so callers are expected
//! to surface them rather than retry.
//!
//! Running out of pages is *not* an error: `next_page()` / `previous_page()`
//! return `Ok(false)` for that.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavigationError {
    /// A navigator was initialised with a page manager that yields no first page.
    #[error("navigator `{navigator}` needs at least one page, but its page manager is empty")]
    EmptyPageSource { navigator: String },

    /// A child navigator was rendered into a node without the nested slot it needs.
    #[error(
        "navigator `{navigator}` tried to attach child navigator `{child}` to a surface \
         without a `{slot}` container"
    )]
    MissingNestedContainer {
        navigator: String,
        child: String,
        slot: &'static str,
    },

    /// A coordinator received an attach for a second surface while still bound to another.
    #[error("coordinator `{coordinator}` is already attached to a surface")]
    AlreadyAttached { coordinator: String },

    /// A navigation call reached a navigator that has no container yet.
    #[error("navigator `{navigator}` has no container; call initialize() first")]
    NotInitialized { navigator: String },

    /// The render factory could not materialise a layout.
    #[error("failed to render layout `{layout}`: {reason}")]
    Render { layout: String, reason: String },
}
