use std::fmt;

use ipc_channel::ipc;
use serde::{Deserialize, Serialize};

/// Composite identifier addressing a renderer-side view or frame from the
/// browser process. Routing ids are only meaningful together with the id of
/// the render process that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderId {
    /// Id of the render process owning the object.
    pub process_id: i32,
    /// Routing id of the object within that process.
    pub routing_id: i32,
}

impl RenderId {
    /// Create a render id from its components.
    pub const fn new(process_id: i32, routing_id: i32) -> Self {
        Self {
            process_id,
            routing_id,
        }
    }

    /// Both components must be positive for the id to address anything.
    pub fn is_valid(&self) -> bool {
        self.process_id > 0 && self.routing_id > 0
    }
}

impl fmt::Display for RenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.process_id, self.routing_id)
    }
}

/// Stable identity of one logical browser, assigned by the browser process.
/// Ids are positive, monotonically increasing and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BrowserId(pub i32);

impl fmt::Display for BrowserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A renderer asking which browser its view/frame pair belongs to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct NewBrowserInfoRequest {
    pub render_process_id: i32,
    pub render_view_routing_id: i32,
    pub render_frame_routing_id: i32,
}

impl NewBrowserInfoRequest {
    /// The view half of the request as a [`RenderId`].
    pub fn view_id(&self) -> RenderId {
        RenderId::new(self.render_process_id, self.render_view_routing_id)
    }

    /// The frame half of the request as a [`RenderId`].
    pub fn frame_id(&self) -> RenderId {
        RenderId::new(self.render_process_id, self.render_frame_routing_id)
    }
}

/// Reply to a [`NewBrowserInfoRequest`]. Exactly one reply is sent per
/// request unless the requesting render process dies first.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct NewBrowserInfoReply {
    /// Identity of the matched browser.
    pub browser_id: BrowserId,
    /// Whether the browser was created through the popup pipeline.
    pub is_popup: bool,
    /// Whether the browser renders off-screen.
    pub is_windowless: bool,
    /// Whether the ids matched a guest view hosted inside the browser
    /// rather than the browser's own view.
    pub is_guest_view: bool,
}

/// Message sent from a render process to the browser process.
#[derive(Debug, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ToBrowserMessage {
    /// Ask for the browser info matching the given identifiers, replying on
    /// the embedded sender once it is known.
    GetNewBrowserInfo {
        request: NewBrowserInfoRequest,
        reply_sender: ipc::IpcSender<NewBrowserInfoReply>,
    },
}
