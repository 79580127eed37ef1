use std::sync::Arc;

use url::Url;

use crate::browser::Browser;
use crate::popup::WindowOpenDisposition;
use crate::settings::BrowserSettings;
use crate::window_info::{PopupFeatures, WindowInfo};
use wrenview_messages::{BrowserId, RenderId};

/// Outcome of an embedder decision hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllowOrDeny {
    Allow,
    Deny,
}

/// Embedder callbacks attached to a browser. A popup initially inherits the
/// opener's client; the hook may swap in a different one.
pub trait BrowserClient: Send + Sync {
    /// Called on the UI thread before a popup window is created. Returning
    /// [`AllowOrDeny::Deny`] cancels creation. The hook may rewrite
    /// `window_info`, `client`, `settings` and `no_javascript_access`; the
    /// rewritten values are the ones the popup is built with.
    #[allow(clippy::too_many_arguments)]
    fn on_before_popup(
        &self,
        opener: &Arc<dyn Browser>,
        opener_frame_id: RenderId,
        target_url: &Url,
        target_frame_name: &str,
        disposition: WindowOpenDisposition,
        user_gesture: bool,
        popup_features: &PopupFeatures,
        window_info: &mut WindowInfo,
        client: &mut Arc<dyn BrowserClient>,
        settings: &mut BrowserSettings,
        no_javascript_access: &mut bool,
    ) -> AllowOrDeny {
        let _ = (
            opener,
            opener_frame_id,
            target_url,
            target_frame_name,
            disposition,
            user_gesture,
            popup_features,
            window_info,
            client,
            settings,
            no_javascript_access,
        );
        AllowOrDeny::Allow
    }
}

/// Platform-specific window machinery for one browser. Created up front for
/// popups so the window exists before the engine-side contents do.
pub trait PlatformDelegate: Send {
    /// Create the view objects for an off-screen browser. Only called for
    /// windowless popups, before the contents exist.
    fn create_windowless_view(&mut self) {}

    /// The browser object for this window has been created.
    fn browser_created(&mut self, browser_id: BrowserId) {
        let _ = browser_id;
    }

    /// The browser object for this window is being destroyed.
    fn browser_destroyed(&mut self, browser_id: BrowserId) {
        let _ = browser_id;
    }
}

/// Constructs platform delegates for windows about to be created.
pub trait PlatformDelegateFactory: Send + Sync {
    /// Create the delegate for a window described by `window_info`.
    fn create_delegate(
        &self,
        window_info: &WindowInfo,
        settings: &BrowserSettings,
    ) -> Box<dyn PlatformDelegate>;
}
