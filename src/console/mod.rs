//! The `console` module holds the view state of the console and the
//! interactive panels attached to list items.
//!
//! - `controller`: selection, lists, refresh sequencing and expansion.
//! - `publish_panel`: draft and submit messages for one topic.
//! - `pull_panel`: pull, keep a bounded history and acknowledge for one
//!   subscription.
//! - `render`: plain-text rendering of all of the above.

pub mod controller;
pub mod panel;
pub mod publish_panel;
pub mod pull_panel;
mod render;

pub use controller::{
    ActionKind, ActionStatus, RefreshOutcome, RefreshTicket, View, ViewController, ViewState,
};
pub use panel::{Panel, PanelPhase};
pub use publish_panel::{PublishDraft, PublishPanel, parse_attributes};
pub use pull_panel::{DEFAULT_HISTORY_LIMIT, PullPanel};
