use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::browser::ContentsId;
use crate::client::{BrowserClient, PlatformDelegate};
use crate::errors::Error;
use crate::settings::BrowserSettings;
use crate::window_info::WindowInfo;
use wrenview_messages::RenderId;

/// Stage of the popup-creation handshake a pending popup is parked at.
/// Steps only ever advance, one at a time; a popup parked at step N must be
/// popped before it can be parked at step N + 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PopupStep {
    /// Vetted by the popup interception hook, platform delegate created.
    CanCreateWindow,
    /// Windowless view objects created, waiting for the engine contents.
    GetCustomWebContentsView,
    /// Engine contents observed; only used when creation flows through a
    /// separate tab-strip insertion step.
    WebContentsCreated,
    /// Terminal: the record is consumed on the way out of this step.
    CreationComplete,
}

/// Correlation token minted when a popup enters the pipeline, carried
/// through every later step. Monotonic per coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PopupToken(pub(crate) u64);

impl fmt::Display for PopupToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "popup#{}", self.0)
    }
}

/// How the window that was opened by the script asked to be disposed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowOpenDisposition {
    CurrentTab,
    NewForegroundTab,
    NewBackgroundTab,
    NewPopup,
    NewWindow,
}

/// Whether the caller of `web_contents_created` builds the browser object
/// immediately or hands the contents to a tab strip first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopupAttach {
    /// The caller constructs the browser right away; the pending record is
    /// consumed.
    Direct,
    /// The contents go through tab-strip insertion; the record stays parked
    /// (keyed by contents identity) until `popup_creation_complete`.
    TabStrip,
}

/// Everything the caller needs to construct the popup's browser object,
/// extracted from the pending record at terminal consumption.
pub struct NewPopupParams {
    /// Correlation token assigned when the popup entered the pipeline.
    pub token: PopupToken,
    /// URL the popup was opened towards.
    pub target_url: Url,
    /// Name of the target frame, if the script supplied one.
    pub target_frame_name: String,
    /// Final window placement, after hook rewrites.
    pub window_info: WindowInfo,
    /// Final browser settings, after hook rewrites.
    pub settings: BrowserSettings,
    /// Client for the new browser (the opener's unless the hook swapped it).
    pub client: Arc<dyn BrowserClient>,
    /// Platform delegate created for the popup's window.
    pub platform_delegate: Box<dyn PlatformDelegate>,
    /// Whether the hook revoked script access for the new window.
    pub no_javascript_access: bool,
}

/// A popup between its interception hook and the creation of its browser
/// object.
pub(crate) struct PendingPopup {
    pub token: PopupToken,
    pub step: PopupStep,
    pub opener_frame_id: RenderId,
    pub target_url: Url,
    pub target_frame_name: String,
    pub window_info: WindowInfo,
    pub settings: BrowserSettings,
    pub client: Arc<dyn BrowserClient>,
    pub platform_delegate: Box<dyn PlatformDelegate>,
    pub no_javascript_access: bool,
    /// Known once the engine contents have been observed; the lookup key
    /// for the late pipeline steps.
    pub contents_id: Option<ContentsId>,
}

impl fmt::Debug for PendingPopup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingPopup")
            .field("token", &self.token)
            .field("step", &self.step)
            .field("opener_frame_id", &self.opener_frame_id)
            .field("target_url", &self.target_url)
            .field("target_frame_name", &self.target_frame_name)
            .field("window_info", &self.window_info)
            .field("settings", &self.settings)
            .field("client", &"<dyn BrowserClient>")
            .field("platform_delegate", &"<dyn PlatformDelegate>")
            .field("no_javascript_access", &self.no_javascript_access)
            .field("contents_id", &self.contents_id)
            .finish()
    }
}

impl PendingPopup {
    /// Advance to the next step. Skipping or revisiting a step means the
    /// window-creation pipeline was driven out of order.
    pub fn advance(&mut self, to: PopupStep) {
        assert_eq!(
            to as u8,
            self.step as u8 + 1,
            "{} stepped from {:?} to {to:?}",
            self.token,
            self.step,
        );
        self.step = to;
    }

    pub fn into_params(self) -> NewPopupParams {
        NewPopupParams {
            token: self.token,
            target_url: self.target_url,
            target_frame_name: self.target_frame_name,
            window_info: self.window_info,
            settings: self.settings,
            client: self.client,
            platform_delegate: self.platform_delegate,
            no_javascript_access: self.no_javascript_access,
        }
    }

    fn matches(&self, step: PopupStep, key: &PopupKey<'_>) -> bool {
        if self.step != step {
            return false;
        }
        match key {
            PopupKey::Opener { frame, url } => {
                self.opener_frame_id == *frame && self.target_url == **url
            }
            PopupKey::Contents(id) => self.contents_id == Some(*id),
        }
    }
}

/// Lookup key for pending popups. Early steps key by opener identity plus
/// target URL; once the engine contents exist they become the key, because
/// several popups may share a URL by then.
#[derive(Clone, Copy, Debug)]
pub(crate) enum PopupKey<'a> {
    Opener { frame: RenderId, url: &'a Url },
    Contents(ContentsId),
}

impl fmt::Display for PopupKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopupKey::Opener { frame, url } => write!(f, "opener {frame} -> {url}"),
            PopupKey::Contents(id) => write!(f, "contents {id}"),
        }
    }
}

/// The parked popups. Single-writer from the UI thread; the pipeline pops a
/// record, advances its step and either re-parks or consumes it, so no two
/// records ever share a (key, step) bucket.
#[derive(Default)]
pub(crate) struct PendingPopupList {
    popups: Vec<PendingPopup>,
}

impl PendingPopupList {
    pub fn push(&mut self, popup: PendingPopup) {
        debug_assert!(
            !self.popups.iter().any(|parked| {
                parked.step == popup.step
                    && match popup.step {
                        PopupStep::CanCreateWindow | PopupStep::GetCustomWebContentsView => {
                            parked.opener_frame_id == popup.opener_frame_id
                                && parked.target_url == popup.target_url
                        }
                        PopupStep::WebContentsCreated | PopupStep::CreationComplete => {
                            parked.contents_id == popup.contents_id
                        }
                    }
            }),
            "two pending popups share a key at step {:?}",
            popup.step,
        );
        log::trace!("{} parked at step {:?}", popup.token, popup.step);
        self.popups.push(popup);
    }

    pub fn pop(&mut self, step: PopupStep, key: PopupKey<'_>) -> Result<PendingPopup, Error> {
        match self.popups.iter().position(|p| p.matches(step, &key)) {
            Some(index) => Ok(self.popups.swap_remove(index)),
            None => Err(Error::MissingPendingPopup {
                step,
                key: key.to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.popups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopClient;
    impl BrowserClient for NoopClient {}

    struct NoopDelegate;
    impl PlatformDelegate for NoopDelegate {}

    fn popup(token: u64, opener: RenderId, url: &str) -> PendingPopup {
        PendingPopup {
            token: PopupToken(token),
            step: PopupStep::CanCreateWindow,
            opener_frame_id: opener,
            target_url: Url::parse(url).unwrap(),
            target_frame_name: String::new(),
            window_info: WindowInfo::default(),
            settings: BrowserSettings::default(),
            client: Arc::new(NoopClient),
            platform_delegate: Box::new(NoopDelegate),
            no_javascript_access: false,
            contents_id: None,
        }
    }

    #[test]
    fn pop_by_opener_and_url() {
        let mut list = PendingPopupList::default();
        let opener = RenderId::new(1, 2);
        list.push(popup(1, opener, "https://a.example/"));
        list.push(popup(2, opener, "https://b.example/"));

        let url = Url::parse("https://b.example/").unwrap();
        let popped = list
            .pop(
                PopupStep::CanCreateWindow,
                PopupKey::Opener {
                    frame: opener,
                    url: &url,
                },
            )
            .unwrap();
        assert_eq!(popped.token, PopupToken(2));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn pop_at_wrong_step_is_a_typed_error() {
        let mut list = PendingPopupList::default();
        let opener = RenderId::new(1, 2);
        list.push(popup(1, opener, "https://a.example/"));

        let url = Url::parse("https://a.example/").unwrap();
        let error = list
            .pop(
                PopupStep::GetCustomWebContentsView,
                PopupKey::Opener {
                    frame: opener,
                    url: &url,
                },
            )
            .unwrap_err();
        assert!(matches!(
            error,
            Error::MissingPendingPopup {
                step: PopupStep::GetCustomWebContentsView,
                ..
            }
        ));
        // The record is still parked at its real step.
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn pop_by_contents_identity() {
        let mut list = PendingPopupList::default();
        let contents = ContentsId::new();
        let mut parked = popup(1, RenderId::new(1, 2), "https://a.example/");
        parked.advance(PopupStep::GetCustomWebContentsView);
        parked.advance(PopupStep::WebContentsCreated);
        parked.contents_id = Some(contents);
        list.push(parked);

        let popped = list
            .pop(PopupStep::WebContentsCreated, PopupKey::Contents(contents))
            .unwrap();
        assert_eq!(popped.token, PopupToken(1));
        assert!(
            list.pop(PopupStep::WebContentsCreated, PopupKey::Contents(contents))
                .is_err()
        );
    }

    #[test]
    #[should_panic(expected = "stepped from")]
    fn steps_cannot_be_skipped() {
        let mut parked = popup(1, RenderId::new(1, 2), "https://a.example/");
        parked.advance(PopupStep::WebContentsCreated);
    }

    #[test]
    #[should_panic(expected = "share a key")]
    fn duplicate_key_at_same_step_is_rejected() {
        let mut list = PendingPopupList::default();
        let opener = RenderId::new(1, 2);
        list.push(popup(1, opener, "https://a.example/"));
        list.push(popup(2, opener, "https://a.example/"));
    }
}
