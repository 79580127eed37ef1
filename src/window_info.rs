use dpi::{PhysicalPosition, PhysicalSize};
use serde::{Deserialize, Serialize};

/// Placement and rendering mode for a window about to be created. For
/// popups this starts from the opener's defaults, gets the script-supplied
/// [`PopupFeatures`] applied, and may then be rewritten by the popup
/// interception hook.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WindowInfo {
    /// Optional window title/name.
    pub window_name: Option<String>,
    /// Initial outer position, if requested.
    pub position: Option<PhysicalPosition<i32>>,
    /// Initial inner size, if requested.
    pub size: Option<PhysicalSize<u32>>,
    /// Create the window hidden.
    pub hidden: bool,
    /// Render off-screen instead of into a native window.
    pub windowless_rendering_enabled: bool,
}

impl WindowInfo {
    /// Fold script-supplied popup features into the window placement.
    /// Features the script did not specify leave the current values alone.
    pub fn apply_popup_features(&mut self, features: &PopupFeatures) {
        if let Some(position) = features.position {
            self.position = Some(position);
        }
        if let Some(size) = features.size {
            self.size = Some(size);
        }
    }
}

/// Window features requested by the script that opened the popup, e.g. the
/// third argument of `window.open()`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PopupFeatures {
    /// Requested outer position.
    pub position: Option<PhysicalPosition<i32>>,
    /// Requested inner size.
    pub size: Option<PhysicalSize<u32>>,
    /// Whether the menu bar was requested.
    pub menu_bar_visible: bool,
    /// Whether the status bar was requested.
    pub status_bar_visible: bool,
    /// Whether the tool bar was requested.
    pub tool_bar_visible: bool,
    /// Whether scrollbars were requested.
    pub scrollbars_visible: bool,
}

impl Default for PopupFeatures {
    fn default() -> Self {
        Self {
            position: None,
            size: None,
            menu_bar_visible: true,
            status_bar_visible: true,
            tool_bar_visible: true,
            scrollbars_visible: true,
        }
    }
}
