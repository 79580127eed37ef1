use serde::{Deserialize, Serialize};

/// Per-browser settings, chosen before the browser object exists. The popup
/// interception hook may rewrite these for a popup before its platform
/// delegate is constructed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserSettings {
    /// Frame rate used when rendering off-screen.
    pub windowless_frame_rate: i32,
    /// Whether script may run at all.
    pub javascript: bool,
    /// Whether script may close windows it did not open.
    pub javascript_close_windows: bool,
    /// Whether script may read from and write to the clipboard.
    pub javascript_access_clipboard: bool,
    /// Whether local storage is available.
    pub local_storage: bool,
    /// Background color drawn before the first paint, as ARGB.
    pub background_color: u32,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            windowless_frame_rate: 30,
            javascript: true,
            javascript_close_windows: true,
            javascript_access_clipboard: false,
            local_storage: true,
            background_color: 0xFFFF_FFFF,
        }
    }
}
