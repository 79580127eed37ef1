//! Shared mock collaborators for the integration suites: an in-memory
//! browser object, contents stand-ins, a recording platform delegate
//! factory and a veto-configurable client.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::Mutex;
use url::Url;

use wrenview::{
    AllowOrDeny, Browser, BrowserClient, BrowserId, BrowserInfo, BrowserInfoManager,
    BrowserSettings, ContentsId, EventLoopWaker, PlatformDelegate, PlatformDelegateFactory,
    PopupFeatures, RenderId, UiTaskRunner, WebContents, WindowInfo, WindowOpenDisposition,
    ui_task_channel,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Clone)]
pub struct NoopWaker;

impl EventLoopWaker for NoopWaker {
    fn clone_box(&self) -> Box<dyn EventLoopWaker> {
        Box::new(self.clone())
    }

    fn wake(&self) {}
}

/// Counters shared with the delegate factory handed to the manager.
pub struct DelegateEvents {
    pub delegates_created: AtomicUsize,
    pub windowless_views_created: AtomicUsize,
    pub browser_notifications: Mutex<Vec<(String, BrowserId)>>,
}

impl DelegateEvents {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            delegates_created: AtomicUsize::new(0),
            windowless_views_created: AtomicUsize::new(0),
            browser_notifications: Mutex::new(Vec::new()),
        })
    }
}

pub struct TestDelegateFactory {
    events: Arc<DelegateEvents>,
}

impl PlatformDelegateFactory for TestDelegateFactory {
    fn create_delegate(
        &self,
        _window_info: &WindowInfo,
        _settings: &BrowserSettings,
    ) -> Box<dyn PlatformDelegate> {
        self.events.delegates_created.fetch_add(1, Ordering::SeqCst);
        Box::new(TestDelegate {
            events: self.events.clone(),
        })
    }
}

pub struct TestDelegate {
    events: Arc<DelegateEvents>,
}

impl PlatformDelegate for TestDelegate {
    fn create_windowless_view(&mut self) {
        self.events
            .windowless_views_created
            .fetch_add(1, Ordering::SeqCst);
    }

    fn browser_created(&mut self, browser_id: BrowserId) {
        self.events
            .browser_notifications
            .lock()
            .push(("created".into(), browser_id));
    }

    fn browser_destroyed(&mut self, browser_id: BrowserId) {
        self.events
            .browser_notifications
            .lock()
            .push(("destroyed".into(), browser_id));
    }
}

/// Build a manager with a recording delegate factory and a drainable UI
/// task queue.
pub fn test_manager() -> (Arc<BrowserInfoManager>, UiTaskRunner, Arc<DelegateEvents>) {
    init_logging();
    let events = DelegateEvents::new();
    let (proxy, runner) = ui_task_channel(Box::new(NoopWaker));
    let manager = Arc::new(BrowserInfoManager::new(
        Box::new(TestDelegateFactory {
            events: events.clone(),
        }),
        proxy,
    ));
    (manager, runner, events)
}

/// Client with a configurable popup decision and settings rewrite.
pub struct TestClient {
    pub decision: AllowOrDeny,
    pub windowless_frame_rate: Option<i32>,
    pub revoke_javascript_access: bool,
    pub replacement_client: Mutex<Option<Arc<dyn BrowserClient>>>,
    pub popups_seen: Mutex<Vec<Url>>,
}

impl TestClient {
    pub fn allowing() -> Arc<Self> {
        Arc::new(Self {
            decision: AllowOrDeny::Allow,
            windowless_frame_rate: None,
            revoke_javascript_access: false,
            replacement_client: Mutex::new(None),
            popups_seen: Mutex::new(Vec::new()),
        })
    }

    pub fn denying() -> Arc<Self> {
        Arc::new(Self {
            decision: AllowOrDeny::Deny,
            windowless_frame_rate: None,
            revoke_javascript_access: false,
            replacement_client: Mutex::new(None),
            popups_seen: Mutex::new(Vec::new()),
        })
    }
}

impl BrowserClient for TestClient {
    fn on_before_popup(
        &self,
        _opener: &Arc<dyn Browser>,
        _opener_frame_id: RenderId,
        target_url: &Url,
        _target_frame_name: &str,
        _disposition: WindowOpenDisposition,
        _user_gesture: bool,
        _popup_features: &PopupFeatures,
        _window_info: &mut WindowInfo,
        client: &mut Arc<dyn BrowserClient>,
        settings: &mut BrowserSettings,
        no_javascript_access: &mut bool,
    ) -> AllowOrDeny {
        self.popups_seen.lock().push(target_url.clone());
        if let Some(rate) = self.windowless_frame_rate {
            settings.windowless_frame_rate = rate;
        }
        if self.revoke_javascript_access {
            *no_javascript_access = true;
        }
        if let Some(replacement) = self.replacement_client.lock().clone() {
            *client = replacement;
        }
        self.decision
    }
}

/// Browser object mock. Closing removes the identity record, the way a real
/// browser does while tearing down.
pub struct TestBrowser {
    manager: Weak<BrowserInfoManager>,
    info: OnceLock<Arc<BrowserInfo>>,
    client: Arc<dyn BrowserClient>,
    pub loaded_urls: Mutex<Vec<Url>>,
    pub closed: AtomicBool,
}

impl Browser for TestBrowser {
    fn client(&self) -> Arc<dyn BrowserClient> {
        self.client.clone()
    }

    fn request_close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        if let (Some(manager), Some(info)) = (self.manager.upgrade(), self.info.get()) {
            manager.remove_browser_info(info);
        }
    }

    fn load_url(&self, url: Url) {
        self.loaded_urls.lock().push(url);
    }
}

/// Wire a mock browser object to an identity record.
pub fn attach_browser(
    manager: &Arc<BrowserInfoManager>,
    info: &Arc<BrowserInfo>,
    client: Arc<dyn BrowserClient>,
) -> Arc<TestBrowser> {
    let browser = Arc::new(TestBrowser {
        manager: Arc::downgrade(manager),
        info: OnceLock::new(),
        client,
        loaded_urls: Mutex::new(Vec::new()),
        closed: AtomicBool::new(false),
    });
    let _ = browser.info.set(info.clone());
    let as_dyn: Arc<dyn Browser> = browser.clone();
    info.set_browser(&as_dyn);
    browser
}

/// Engine-contents stand-in carrying the ids a popup answers to.
pub struct TestContents {
    id: ContentsId,
    view_id: RenderId,
    frame_id: RenderId,
}

impl TestContents {
    pub fn new(view_id: RenderId, frame_id: RenderId) -> Self {
        Self {
            id: ContentsId::new(),
            view_id,
            frame_id,
        }
    }
}

impl WebContents for TestContents {
    fn contents_id(&self) -> ContentsId {
        self.id
    }

    fn render_view_id(&self) -> RenderId {
        self.view_id
    }

    fn main_frame_id(&self) -> RenderId {
        self.frame_id
    }
}

pub fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}
