//! User intents and the context menu that raises them

use crate::listing::Entry;
use std::fmt;

/// Something the user asked the browser to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Parent row: go up; directory: enter; file: preview
    Open,
    Rename,
    Copy,
    Move,
    Remove,
    /// Upload a local directory into the current path
    Upload,
    /// Download the selected entry into a local directory
    Download,
    /// Jump to whatever was typed into the path bar
    Go(String),
    Refresh,
}

impl Intent {
    /// Does this intent act on the selected entry?
    pub fn needs_selection(&self) -> bool {
        matches!(
            self,
            Intent::Open
                | Intent::Rename
                | Intent::Copy
                | Intent::Move
                | Intent::Remove
                | Intent::Download
        )
    }

    /// Does this intent change or export the selected entry?
    ///
    /// Those make no sense on the parent row.
    pub fn acts_on_object(&self) -> bool {
        self.needs_selection() && *self != Intent::Open
    }

    pub fn label(&self) -> &'static str {
        match self {
            Intent::Open => "Open",
            Intent::Rename => "Rename",
            Intent::Copy => "Copy",
            Intent::Move => "Move",
            Intent::Remove => "Remove",
            Intent::Upload => "Upload",
            Intent::Download => "Download",
            Intent::Go(_) => "Go",
            Intent::Refresh => "Refresh",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Go(target) => write!(f, "Go {}", target),
            other => f.write_str(other.label()),
        }
    }
}

/// One line of the context menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Action { label: &'static str, intent: Intent },
    Separator,
}

/// Context menu for the selected entry; empty without a selection
pub fn context_menu(selection: Option<&Entry>) -> Vec<MenuItem> {
    let Some(entry) = selection else {
        return Vec::new();
    };

    let open_label = if entry.is_dir() || entry.is_parent() {
        "Open"
    } else {
        "Preview"
    };
    let action = |intent: Intent| MenuItem::Action {
        label: intent.label(),
        intent,
    };

    vec![
        MenuItem::Action {
            label: open_label,
            intent: Intent::Open,
        },
        action(Intent::Rename),
        action(Intent::Copy),
        action(Intent::Move),
        action(Intent::Remove),
        MenuItem::Separator,
        action(Intent::Upload),
        action(Intent::Download),
    ]
}
