use std::fmt;
use std::sync::Arc;

use url::Url;
use uuid::Uuid;

use crate::client::BrowserClient;
use wrenview_messages::RenderId;

/// A live browser object, owned by application code. The registry only ever
/// holds a weak reference to it, so "the owner is already gone" is a checked
/// condition rather than a dangling pointer.
pub trait Browser: Send + Sync {
    /// The client handling embedder callbacks for this browser.
    fn client(&self) -> Arc<dyn BrowserClient>;

    /// Ask the browser to tear itself down. The browser is expected to call
    /// [`BrowserInfoManager::remove_browser_info`] exactly once while doing
    /// so.
    ///
    /// [`BrowserInfoManager::remove_browser_info`]:
    ///     crate::BrowserInfoManager::remove_browser_info
    fn request_close(&self);

    /// Navigate the browser's main frame. Used to reroute popups opened
    /// from guest views into their owner browser.
    fn load_url(&self, url: Url);
}

/// Opaque identity of one engine-side contents object. Later popup steps
/// key by this once the target URL is no longer discriminating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentsId(Uuid);

impl ContentsId {
    /// Mint a fresh contents identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContentsId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContentsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The engine-side contents of a browser under construction. Consumed only
/// to learn the identifiers a freshly created popup answers to.
pub trait WebContents {
    /// Stable identity of this contents object.
    fn contents_id(&self) -> ContentsId;
    /// Render id of the contents' view.
    fn render_view_id(&self) -> RenderId;
    /// Render id of the contents' main frame.
    fn main_frame_id(&self) -> RenderId;
}
