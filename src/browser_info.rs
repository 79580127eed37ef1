use std::collections::HashSet;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::browser::Browser;
use wrenview_messages::{BrowserId, NewBrowserInfoReply, RenderId};

/// Transient render-side identifiers a browser currently answers to. View
/// and frame ids live in separate address spaces and accumulate over the
/// browser's lifetime; they are never discriminating on their own, only
/// together with the process id baked into [`RenderId`].
#[derive(Debug, Default)]
pub struct RenderIdManager {
    view_ids: HashSet<RenderId>,
    frame_ids: HashSet<RenderId>,
}

impl RenderIdManager {
    /// Register a view id.
    pub fn add_view_id(&mut self, id: RenderId) {
        self.view_ids.insert(id);
    }

    /// Register a frame id.
    pub fn add_frame_id(&mut self, id: RenderId) {
        self.frame_ids.insert(id);
    }

    /// Whether the view id is registered.
    pub fn is_view_match(&self, id: RenderId) -> bool {
        self.view_ids.contains(&id)
    }

    /// Whether the frame id is registered.
    pub fn is_frame_match(&self, id: RenderId) -> bool {
        self.frame_ids.contains(&id)
    }

    /// Match either id, view first. A view match registers the accompanying
    /// frame id (and vice versa) so that future lookups by the other key
    /// succeed without a second round trip.
    fn match_and_register(&mut self, view: Option<RenderId>, frame: Option<RenderId>) -> bool {
        if view.is_some_and(|id| self.is_view_match(id)) {
            if let Some(frame) = frame {
                self.frame_ids.insert(frame);
            }
            return true;
        }
        if frame.is_some_and(|id| self.is_frame_match(id)) {
            if let Some(view) = view {
                self.view_ids.insert(view);
            }
            return true;
        }
        false
    }
}

/// How a joint id lookup matched a [`BrowserInfo`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdMatch {
    /// The ids matched a guest view hosted inside this browser, not the
    /// browser's own view. Callers redirect behavior instead of treating
    /// the result as an ordinary owned browser.
    pub is_guest_view: bool,
}

struct RenderIds {
    render: RenderIdManager,
    guest: RenderIdManager,
}

/// Canonical identity record for one logical browser. Created before or
/// after the engine-side objects exist, and outlived by nothing: the record
/// is removed from the registry when the owning browser is destroyed.
pub struct BrowserInfo {
    browser_id: BrowserId,
    is_popup: bool,
    is_windowless: bool,
    ids: Mutex<RenderIds>,
    browser: Mutex<Option<Weak<dyn Browser>>>,
}

impl BrowserInfo {
    pub(crate) fn new(browser_id: BrowserId, is_popup: bool, is_windowless: bool) -> Self {
        Self {
            browser_id,
            is_popup,
            is_windowless,
            ids: Mutex::new(RenderIds {
                render: RenderIdManager::default(),
                guest: RenderIdManager::default(),
            }),
            browser: Mutex::new(None),
        }
    }

    /// Process-wide unique id of this browser. Never reused, even after the
    /// record is destroyed.
    pub fn browser_id(&self) -> BrowserId {
        self.browser_id
    }

    /// Whether this browser was created through the popup pipeline.
    pub fn is_popup(&self) -> bool {
        self.is_popup
    }

    /// Whether this browser renders off-screen.
    pub fn is_windowless(&self) -> bool {
        self.is_windowless
    }

    /// Register a view id for this browser.
    pub fn add_render_view_id(&self, id: RenderId) {
        self.ids.lock().render.add_view_id(id);
    }

    /// Register a frame id for this browser.
    pub fn add_render_frame_id(&self, id: RenderId) {
        self.ids.lock().render.add_frame_id(id);
    }

    /// Register a view id of a guest view hosted inside this browser.
    pub fn add_guest_render_view_id(&self, id: RenderId) {
        self.ids.lock().guest.add_view_id(id);
    }

    /// Register a frame id of a guest view hosted inside this browser.
    pub fn add_guest_render_frame_id(&self, id: RenderId) {
        self.ids.lock().guest.add_frame_id(id);
    }

    /// Attach the live browser object. The registry keeps only a weak
    /// reference; ownership stays with application code.
    pub fn set_browser(&self, browser: &Arc<dyn Browser>) {
        *self.browser.lock() = Some(Arc::downgrade(browser));
    }

    /// The live browser object, if it still exists.
    pub fn browser(&self) -> Option<Arc<dyn Browser>> {
        self.browser.lock().as_ref().and_then(Weak::upgrade)
    }

    /// Joint lookup against this record. Own view ids win over own frame
    /// ids, which win over guest ids; the first matching category also
    /// cross-registers the accompanying id (see
    /// [`RenderIdManager::match_and_register`]).
    pub(crate) fn match_ids(
        &self,
        view: Option<RenderId>,
        frame: Option<RenderId>,
    ) -> Option<IdMatch> {
        let mut ids = self.ids.lock();
        if ids.render.match_and_register(view, frame) {
            return Some(IdMatch {
                is_guest_view: false,
            });
        }
        if ids.guest.match_and_register(view, frame) {
            return Some(IdMatch {
                is_guest_view: true,
            });
        }
        None
    }

    /// Reply payload describing this browser.
    pub(crate) fn reply(&self, is_guest_view: bool) -> NewBrowserInfoReply {
        NewBrowserInfoReply {
            browser_id: self.browser_id,
            is_popup: self.is_popup,
            is_windowless: self.is_windowless,
            is_guest_view,
        }
    }
}
