//! Browser identity and popup-creation coordination for embedded web views.
//!
//! The browser process owns one [`BrowserInfoManager`]. Render processes
//! address their views and frames by opaque `(process id, routing id)`
//! pairs; the manager correlates those identifiers with the browser objects
//! being constructed on the UI thread, parks renderer requests that arrive
//! before their browser exists, and sequences the multi-step popup-creation
//! handshake.

pub mod browser;
pub mod browser_info;
pub mod browser_info_manager;
pub mod client;
pub mod errors;
pub mod popup;
pub mod settings;
pub mod task;
pub mod window_info;

pub use browser::{Browser, ContentsId, WebContents};
pub use browser_info::{BrowserInfo, IdMatch, RenderIdManager};
pub use browser_info_manager::BrowserInfoManager;
pub use client::{AllowOrDeny, BrowserClient, PlatformDelegate, PlatformDelegateFactory};
pub use errors::{Error, Result};
pub use popup::{NewPopupParams, PopupAttach, PopupStep, PopupToken, WindowOpenDisposition};
pub use settings::BrowserSettings;
pub use task::{EventLoopWaker, UiTask, UiTaskProxy, UiTaskRunner, ui_task_channel};
pub use window_info::{PopupFeatures, WindowInfo};
pub use wrenview_messages::{
    BrowserId, NewBrowserInfoReply, NewBrowserInfoRequest, RenderId, ToBrowserMessage,
};
