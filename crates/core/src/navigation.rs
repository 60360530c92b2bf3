//! Pane navigation.
//!
//! The UI is a set of named panes, one shown at a time. The shown pane is mirrored into a
//! location fragment (`#timeline`) so a view can be restored from a URL.

use std::fmt;
use std::str::FromStr;

use crate::HealthError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Pane {
    #[default]
    Login,
    Dashboard,
    Upload,
    Vitals,
    Timeline,
    Reports,
    Summary,
}

impl Pane {
    pub const ALL: [Pane; 7] = [
        Pane::Login,
        Pane::Dashboard,
        Pane::Upload,
        Pane::Vitals,
        Pane::Timeline,
        Pane::Reports,
        Pane::Summary,
    ];

    /// Stable id, also used as the fragment.
    pub fn id(self) -> &'static str {
        match self {
            Pane::Login => "login",
            Pane::Dashboard => "dashboard",
            Pane::Upload => "upload",
            Pane::Vitals => "vitals",
            Pane::Timeline => "timeline",
            Pane::Reports => "reports",
            Pane::Summary => "summary",
        }
    }

    pub fn from_id(id: &str) -> Option<Pane> {
        Pane::ALL.into_iter().find(|p| p.id() == id)
    }
}

impl fmt::Display for Pane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Pane {
    type Err = HealthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pane::from_id(s).ok_or_else(|| HealthError::Validation(format!("unknown pane '{}'", s)))
    }
}

/// Tracks the shown pane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigator {
    current: Pane,
}

impl Navigator {
    /// Restores from a location fragment, with or without the leading `#`.
    ///
    /// No fragment, an empty one, or an unknown pane id all land on [`Pane::Login`].
    pub fn from_fragment(fragment: Option<&str>) -> Self {
        let current = fragment
            .map(|f| f.trim_start_matches('#'))
            .filter(|f| !f.is_empty())
            .and_then(|id| {
                let pane = Pane::from_id(id);
                if pane.is_none() {
                    tracing::debug!(fragment = id, "unknown pane in fragment, showing login");
                }
                pane
            })
            .unwrap_or_default();
        Self { current }
    }

    pub fn show(&mut self, pane: Pane) {
        self.current = pane;
    }

    pub fn current(&self) -> Pane {
        self.current
    }

    pub fn fragment(&self) -> String {
        format!("#{}", self.current.id())
    }
}
