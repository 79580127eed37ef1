use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ipc_channel::ipc::IpcSender;
use parking_lot::Mutex;
use url::Url;

use crate::browser::{ContentsId, WebContents};
use crate::browser_info::{BrowserInfo, IdMatch};
use crate::client::{AllowOrDeny, PlatformDelegateFactory};
use crate::errors::{Error, Result};
use crate::popup::{
    NewPopupParams, PendingPopup, PendingPopupList, PopupAttach, PopupKey, PopupStep, PopupToken,
    WindowOpenDisposition,
};
use crate::settings::BrowserSettings;
use crate::task::UiTaskProxy;
use crate::window_info::{PopupFeatures, WindowInfo};
use wrenview_messages::{
    BrowserId, NewBrowserInfoReply, NewBrowserInfoRequest, RenderId, ToBrowserMessage,
};

/// A renderer asked for browser info before the matching record existed.
/// The reply handle is parked until the record is created or the process
/// dies.
struct PendingNewBrowserInfo {
    view_id: RenderId,
    frame_id: RenderId,
    reply_sender: IpcSender<NewBrowserInfoReply>,
}

/// State shared across threads: the browser list, the id counter and the
/// parked renderer requests all live behind one lock so existence checks
/// and enqueues are atomic with respect to record creation.
struct Registry {
    next_browser_id: i32,
    browser_infos: Vec<Arc<BrowserInfo>>,
    pending_new: HashMap<RenderId, PendingNewBrowserInfo>,
}

impl Registry {
    fn allocate(&mut self, is_popup: bool, is_windowless: bool) -> Arc<BrowserInfo> {
        let id = BrowserId(self.next_browser_id);
        self.next_browser_id += 1;
        let info = Arc::new(BrowserInfo::new(id, is_popup, is_windowless));
        self.browser_infos.push(info.clone());
        log::trace!("Browser info {id} created (popup: {is_popup}, windowless: {is_windowless})");
        info
    }

    /// Joint lookup across all registered records. Checks each record's own
    /// view ids, then its own frame ids, then its guest ids; the first
    /// matching category wins and opportunistically cross-registers the
    /// accompanying id.
    fn lookup(
        &self,
        view: Option<RenderId>,
        frame: Option<RenderId>,
    ) -> Option<(Arc<BrowserInfo>, IdMatch)> {
        self.browser_infos
            .iter()
            .find_map(|info| info.match_ids(view, frame).map(|m| (info.clone(), m)))
    }
}

/// Process-wide authority on browser identity and popup creation.
///
/// One instance is constructed by the application context and handed to
/// everything that needs it; registry lookups and renderer requests may
/// arrive on any thread, while the window-creation pipeline methods are
/// UI-thread-serial by contract.
pub struct BrowserInfoManager {
    delegate_factory: Box<dyn PlatformDelegateFactory>,
    ui_proxy: UiTaskProxy,
    registry: Mutex<Registry>,
    /// Only the UI thread parks and pops popups; the lock is there for the
    /// odd cross-thread read, not for contention.
    pending_popups: Mutex<PendingPopupList>,
    next_popup_token: AtomicU64,
}

impl BrowserInfoManager {
    /// Create the coordinator. `delegate_factory` builds the platform layer
    /// for popup windows; `ui_proxy` is where cross-thread reply delivery
    /// is redispatched.
    pub fn new(delegate_factory: Box<dyn PlatformDelegateFactory>, ui_proxy: UiTaskProxy) -> Self {
        Self {
            delegate_factory,
            ui_proxy,
            registry: Mutex::new(Registry {
                next_browser_id: 1,
                browser_infos: Vec::new(),
                pending_new: HashMap::new(),
            }),
            pending_popups: Mutex::new(PendingPopupList::default()),
            next_popup_token: AtomicU64::new(1),
        }
    }

    /// Create the identity record for a browser whose engine-side objects
    /// do not exist yet (top-level and DevTools browsers). Callable from
    /// any thread; never fails.
    pub fn create_browser_info(&self, is_popup: bool, is_windowless: bool) -> Arc<BrowserInfo> {
        self.registry.lock().allocate(is_popup, is_windowless)
    }

    /// Create the identity record for a popup whose engine contents were
    /// just observed, registering the contents' view and frame ids. Any
    /// renderer request already parked for those ids is answered before the
    /// lock is released, so a request can never be queued and then missed.
    pub fn create_popup_browser_info(
        &self,
        new_contents: &dyn WebContents,
        is_windowless: bool,
    ) -> Arc<BrowserInfo> {
        let view_id = new_contents.render_view_id();
        let frame_id = new_contents.main_frame_id();

        let mut registry = self.registry.lock();
        let info = registry.allocate(true, is_windowless);
        info.add_render_view_id(view_id);
        info.add_render_frame_id(frame_id);

        let matched: Vec<(RenderId, IdMatch)> = registry
            .pending_new
            .iter()
            .filter_map(|(key, pending)| {
                info.match_ids(Some(pending.view_id), Some(pending.frame_id))
                    .map(|id_match| (*key, id_match))
            })
            .collect();
        for (key, id_match) in matched {
            if let Some(pending) = registry.pending_new.remove(&key) {
                log::trace!(
                    "Answering parked browser info request for frame {} with browser {}",
                    pending.frame_id,
                    info.browser_id(),
                );
                self.post_reply(pending.reply_sender, info.reply(id_match.is_guest_view));
            }
        }

        info
    }

    /// Route a renderer message to the matching handler.
    pub fn handle_renderer_message(&self, message: ToBrowserMessage) -> Result<()> {
        match message {
            ToBrowserMessage::GetNewBrowserInfo {
                request,
                reply_sender,
            } => self.on_get_new_browser_info(request, reply_sender),
            message => {
                log::trace!("Ignoring unhandled renderer message: {message:?}");
                Ok(())
            }
        }
    }

    /// A renderer asked which browser its view/frame pair belongs to.
    /// Replies immediately if the record exists, otherwise parks the reply
    /// handle until [`create_popup_browser_info`] observes matching ids.
    /// Callable from any thread.
    ///
    /// At most one request may be in flight per identifier triple; a
    /// duplicate means the renderer side lost track of its own requests.
    ///
    /// [`create_popup_browser_info`]: Self::create_popup_browser_info
    pub fn on_get_new_browser_info(
        &self,
        request: NewBrowserInfoRequest,
        reply_sender: IpcSender<NewBrowserInfoReply>,
    ) -> Result<()> {
        let view_id = request.view_id();
        let frame_id = request.frame_id();
        if !view_id.is_valid() || !frame_id.is_valid() {
            return Err(Error::InvalidRequest(request));
        }

        let mut registry = self.registry.lock();
        if let Some((info, id_match)) = registry.lookup(Some(view_id), Some(frame_id)) {
            self.post_reply(reply_sender, info.reply(id_match.is_guest_view));
            return Ok(());
        }

        // The miss above and the insert below happen under one lock
        // acquisition; create_popup_browser_info takes the same lock for
        // its append-and-flush, so this request cannot fall through the
        // gap between them.
        assert!(
            !registry.pending_new.contains_key(&frame_id),
            "duplicate browser info request for frame {frame_id}",
        );
        registry.pending_new.insert(
            frame_id,
            PendingNewBrowserInfo {
                view_id,
                frame_id,
                reply_sender,
            },
        );
        log::trace!("Parked browser info request for view {view_id} / frame {frame_id}");
        Ok(())
    }

    /// Thread-safe lookup by view id alone.
    pub fn browser_info_for_view(&self, view_id: RenderId) -> Option<(Arc<BrowserInfo>, IdMatch)> {
        self.registry.lock().lookup(Some(view_id), None)
    }

    /// Thread-safe lookup by frame id alone.
    pub fn browser_info_for_frame(
        &self,
        frame_id: RenderId,
    ) -> Option<(Arc<BrowserInfo>, IdMatch)> {
        self.registry.lock().lookup(None, Some(frame_id))
    }

    /// Snapshot of every registered browser info.
    pub fn all_browser_infos(&self) -> Vec<Arc<BrowserInfo>> {
        self.registry.lock().browser_infos.clone()
    }

    /// A render process died; its parked requests can never be answered and
    /// would leak their reply handles. Invoked by the host's process
    /// supervision for every terminated process, whether or not it had
    /// requests in flight.
    pub fn on_render_process_destroyed(&self, process_id: i32) {
        let mut registry = self.registry.lock();
        let before = registry.pending_new.len();
        registry
            .pending_new
            .retain(|_, pending| pending.frame_id.process_id != process_id);
        let purged = before - registry.pending_new.len();
        if purged > 0 {
            log::trace!(
                "Purged {purged} parked browser info request(s) for dead render process {process_id}"
            );
        }
    }

    /// Vet a `window.open()`-style popup. UI-thread-serial by contract.
    ///
    /// Resolves the opener from its frame id, runs the popup interception
    /// hook and, if allowed, creates the platform delegate and parks a
    /// pending popup at [`PopupStep::CanCreateWindow`]. A guest-view opener
    /// never gets a real popup; the navigation is rerouted into the owner
    /// browser instead.
    #[allow(clippy::too_many_arguments)]
    pub fn can_create_window(
        &self,
        opener_frame_id: RenderId,
        target_url: &Url,
        target_frame_name: &str,
        disposition: WindowOpenDisposition,
        user_gesture: bool,
        popup_features: &PopupFeatures,
        window_info: &mut WindowInfo,
    ) -> bool {
        let Some((info, id_match)) = self.browser_info_for_frame(opener_frame_id) else {
            log::warn!("No browser info matching opener frame {opener_frame_id}");
            return false;
        };
        let Some(browser) = info.browser() else {
            log::warn!(
                "Opener browser {} is already gone, cancelling popup",
                info.browser_id()
            );
            return false;
        };

        if id_match.is_guest_view {
            log::trace!(
                "Popup opener {opener_frame_id} is a guest view, navigating owner browser {}",
                info.browser_id()
            );
            browser.load_url(target_url.clone());
            return false;
        }

        window_info.apply_popup_features(popup_features);

        let opener_client = browser.client();
        let mut client = opener_client.clone();
        let mut settings = BrowserSettings::default();
        let mut no_javascript_access = false;
        let decision = opener_client.on_before_popup(
            &browser,
            opener_frame_id,
            target_url,
            target_frame_name,
            disposition,
            user_gesture,
            popup_features,
            window_info,
            &mut client,
            &mut settings,
            &mut no_javascript_access,
        );
        if decision == AllowOrDeny::Deny {
            log::trace!("Popup to {target_url} denied by client");
            return false;
        }

        let platform_delegate = self.delegate_factory.create_delegate(window_info, &settings);
        let token = PopupToken(self.next_popup_token.fetch_add(1, Ordering::Relaxed));
        self.pending_popups.lock().push(PendingPopup {
            token,
            step: PopupStep::CanCreateWindow,
            opener_frame_id,
            target_url: target_url.clone(),
            target_frame_name: target_frame_name.to_owned(),
            window_info: window_info.clone(),
            settings,
            client,
            platform_delegate,
            no_javascript_access,
            contents_id: None,
        });
        true
    }

    /// The window pipeline asked for the popup's view objects. Only happens
    /// after [`can_create_window`] returned `true`, so a missing record is
    /// a protocol violation. Creates windowless view objects when the
    /// popup renders off-screen. UI-thread-serial by contract.
    ///
    /// [`can_create_window`]: Self::can_create_window
    pub fn get_custom_web_contents_view(&self, opener_frame_id: RenderId, target_url: &Url) {
        let mut pending = self.pending_popups.lock();
        let mut popup = pending
            .pop(
                PopupStep::CanCreateWindow,
                PopupKey::Opener {
                    frame: opener_frame_id,
                    url: target_url,
                },
            )
            .unwrap_or_else(|error| panic!("window-creation pipeline out of order: {error}"));
        if popup.window_info.windowless_rendering_enabled {
            popup.platform_delegate.create_windowless_view();
        }
        popup.advance(PopupStep::GetCustomWebContentsView);
        pending.push(popup);
    }

    /// The engine contents for the popup exist now. In the direct path the
    /// caller constructs the browser immediately and the pending record is
    /// consumed; in the tab-strip path the record is re-parked, keyed by
    /// contents identity, until [`popup_creation_complete`]. UI-thread-serial
    /// by contract.
    ///
    /// [`popup_creation_complete`]: Self::popup_creation_complete
    pub fn web_contents_created(
        &self,
        opener_frame_id: RenderId,
        target_url: &Url,
        new_contents: &dyn WebContents,
        attach: PopupAttach,
    ) -> Option<NewPopupParams> {
        let mut pending = self.pending_popups.lock();
        let mut popup = pending
            .pop(
                PopupStep::GetCustomWebContentsView,
                PopupKey::Opener {
                    frame: opener_frame_id,
                    url: target_url,
                },
            )
            .unwrap_or_else(|error| panic!("window-creation pipeline out of order: {error}"));
        popup.advance(PopupStep::WebContentsCreated);
        popup.contents_id = Some(new_contents.contents_id());
        match attach {
            PopupAttach::Direct => Some(popup.into_params()),
            PopupAttach::TabStrip => {
                pending.push(popup);
                None
            }
        }
    }

    /// Terminal step of the tab-strip path: the contents have been inserted
    /// and the browser object is about to be constructed. UI-thread-serial
    /// by contract.
    pub fn popup_creation_complete(&self, contents_id: ContentsId) -> NewPopupParams {
        let mut pending = self.pending_popups.lock();
        let mut popup = pending
            .pop(PopupStep::WebContentsCreated, PopupKey::Contents(contents_id))
            .unwrap_or_else(|error| panic!("window-creation pipeline out of order: {error}"));
        popup.advance(PopupStep::CreationComplete);
        popup.into_params()
    }

    /// Number of popups currently parked in the pipeline.
    pub fn pending_popup_count(&self) -> usize {
        self.pending_popups.lock().len()
    }

    /// Number of renderer requests currently parked for a reply.
    pub fn pending_request_count(&self) -> usize {
        self.registry.lock().pending_new.len()
    }

    /// Drop the record for a destroyed browser. Must be called exactly once
    /// per record; a second call means browser teardown ran twice.
    /// UI-thread-serial by contract.
    pub fn remove_browser_info(&self, info: &Arc<BrowserInfo>) {
        let mut registry = self.registry.lock();
        let position = registry
            .browser_infos
            .iter()
            .position(|registered| Arc::ptr_eq(registered, info));
        match position {
            Some(index) => {
                registry.browser_infos.remove(index);
                log::trace!("Browser info {} removed", info.browser_id());
            }
            None => panic!("browser info {} removed twice", info.browser_id()),
        }
    }

    /// Ask every live browser to tear itself down. Works on a snapshot of
    /// the list because each browser calls back into
    /// [`remove_browser_info`] while closing. The list must be empty when
    /// this returns. UI-thread-serial by contract.
    ///
    /// [`remove_browser_info`]: Self::remove_browser_info
    pub fn destroy_all_browsers(&self) {
        let snapshot = self.all_browser_infos();
        for info in snapshot {
            match info.browser() {
                Some(browser) => browser.request_close(),
                None => log::warn!(
                    "Browser {} has no live object at teardown",
                    info.browser_id()
                ),
            }
        }
        assert!(
            self.registry.lock().browser_infos.is_empty(),
            "browsers still registered after teardown",
        );
    }

    /// Replies are computed wherever the lookup ran, but the channel to the
    /// renderer may only be used from the UI thread; hand the send over.
    fn post_reply(&self, reply_sender: IpcSender<NewBrowserInfoReply>, payload: NewBrowserInfoReply) {
        self.ui_proxy.post(Box::new(move || {
            if let Err(error) = reply_sender.send(payload) {
                log::error!(
                    "Failed to send browser info reply for browser {}: {error}",
                    payload.browser_id
                );
            }
        }));
    }
}
