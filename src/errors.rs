use crate::popup::PopupStep;
use wrenview_messages::NewBrowserInfoRequest;

/// Convenient type alias of Result type for wrenview.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by wrenview.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A browser-info request carried routing ids that cannot address
    /// anything; parking it would leak a reply handle forever.
    #[error("invalid browser info request {0:?}")]
    InvalidRequest(NewBrowserInfoRequest),
    /// No pending popup was queued under the given key at the given step.
    /// Reaching this from the window-creation pipeline means the pipeline
    /// was driven out of order.
    #[error("no pending popup for {key} at step {step:?}")]
    MissingPendingPopup {
        /// Step the caller expected the popup to be parked at.
        step: PopupStep,
        /// Description of the lookup key that failed to match.
        key: String,
    },
}
