use std::fmt;

use super::publish_panel::PublishPanel;
use super::pull_panel::PullPanel;

/// Progress of a panel's current action.
///
/// Edits move an idle or finished panel to `Drafting`; starting the action
/// moves it to `Submitting`; its completion lands in `Succeeded` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PanelPhase {
    #[default]
    Idle,
    Drafting,
    Submitting,
    Succeeded(String),
    Failed(String),
}

impl PanelPhase {
    pub fn is_submitting(&self) -> bool {
        matches!(self, PanelPhase::Submitting)
    }

    /// The status line shown under a panel, if any.
    pub fn status(&self) -> Option<String> {
        match self {
            PanelPhase::Idle | PanelPhase::Drafting => None,
            PanelPhase::Submitting => Some("working...".to_string()),
            PanelPhase::Succeeded(msg) => Some(format!("ok: {}", msg)),
            PanelPhase::Failed(msg) => Some(format!("error: {}", msg)),
        }
    }
}

/// The panel attached to the expanded list item.
#[derive(Debug)]
pub enum Panel {
    Publish(PublishPanel),
    Pull(PullPanel),
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Panel::Publish(panel) => fmt::Display::fmt(panel, f),
            Panel::Pull(panel) => fmt::Display::fmt(panel, f),
        }
    }
}
