//! Queued alert and confirm dialogs with awaitable outcomes.
//!
//! This module provides the dialog machinery shared by every screen of the app:
//!
//! - [`AlertOptions`]: What a caller wants to show (title, body, variant, buttons)
//! - [`DialogController`]: Caller handle queuing alerts and confirms
//! - [`OverlayHandle`]: Renderer handle observing the active dialog and posting gestures
//! - [`DialogService`]: Task owning the queue and the active slot
//!
//! # Architecture
//!
//! ```text
//! show_alert / show_confirm ──► DialogService ──► DialogView ──► renderer
//!          ▲                      │    ▲                           │
//!          └── PendingDialog ◄────┘    └────────── Gesture ◄───────┘
//! ```
//!
//! Requests wait in strict FIFO order and only one is active at a time. Each
//! request answers its caller exactly once through a [`PendingDialog`]:
//!
//! - `Ok(true)` when the user confirmed,
//! - `Ok(false)` when the user declined or the dialog was dismissed,
//! - `Err(DialogError)` when the confirm action failed or timed out.
//!
//! # Example Usage
//!
//! ```text
//! let (dialogs, _overlay, _task) = DialogService::spawn(ServiceSettings::default());
//!
//! let delete = dialogs.show_confirm(
//!     AlertOptions::new("Delete goal?")
//!         .variant("warning")
//!         .on_confirm(|| async { Ok(()) }),
//! );
//!
//! if let Err(error) = delete.await {
//!     dialogs.show_alert(AlertOptions::new(error.to_string()).variant("error"));
//! }
//! ```

use std::time::Duration;

use thiserror::Error;

mod options;
mod presenter;
mod queue;
mod request;
mod service;
mod variant;

pub use crate::dialogs::options::{AlertOptions, Body, Content};
pub use crate::dialogs::presenter::{ButtonView, DialogView, Gesture};
pub use crate::dialogs::request::{PendingDialog, RequestId};
pub use crate::dialogs::service::{DialogController, DialogService, OverlayHandle, ServiceSettings};
pub use crate::dialogs::variant::Variant;

/// What a dialog hands back to its caller.
pub type Outcome = Result<bool, DialogError>;

/// Errors a pending dialog can complete with.
///
/// A declined dialog is not an error; it resolves `Ok(false)`.
#[derive(Debug, Error)]
pub enum DialogError {
    /// The confirm action returned an error, carried unchanged.
    #[error("confirm action failed: {0}")]
    ConfirmFailed(anyhow::Error),

    /// The confirm action did not settle within the configured limit.
    #[error("confirm action timed out after {0:?}")]
    ConfirmTimedOut(Duration),

    /// The dialog service stopped before answering.
    #[error("dialog service is not running")]
    ServiceClosed,
}

impl DialogError {
    /// Returns the error of a failed confirm action.
    pub fn confirm_error(&self) -> Option<&anyhow::Error> {
        match self {
            DialogError::ConfirmFailed(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_error_accessors() {
        let error = DialogError::ConfirmFailed(anyhow::anyhow!("403"));
        assert_eq!(error.confirm_error().unwrap().to_string(), "403");

        assert!(DialogError::ServiceClosed.confirm_error().is_none());
        assert!(
            DialogError::ConfirmTimedOut(Duration::from_secs(1))
                .confirm_error()
                .is_none()
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DialogError::ConfirmTimedOut(Duration::from_secs(30)).to_string(),
            "confirm action timed out after 30s"
        );
        assert_eq!(
            DialogError::ServiceClosed.to_string(),
            "dialog service is not running"
        );
    }
}
