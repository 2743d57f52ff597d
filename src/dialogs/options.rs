//! Caller-facing dialog options.
//!
//! [`AlertOptions`] carries everything a caller can say about a dialog. It is
//! built with chained setters, in the same spirit as a notification builder:
//!
//! ```text
//! let options = AlertOptions::new("Saved")
//!     .message("Your goal was updated")
//!     .variant(Variant::Success);
//! ```

use std::{fmt, future::Future, sync::Arc};

use futures::{FutureExt, future::BoxFuture};
use serde::Serialize;

use crate::dialogs::variant::Variant;

/// Future returned by a confirm action.
pub type ConfirmFuture = BoxFuture<'static, anyhow::Result<()>>;

/// Asynchronous side effect run when the user confirms a dialog.
///
/// While the future is pending the dialog stays open and its controls are
/// disabled. An `Err` rejects the caller's pending dialog with that same
/// error.
#[derive(Clone)]
pub struct ConfirmAction(Arc<dyn Fn() -> ConfirmFuture + Send + Sync>);

impl ConfirmAction {
    /// Wraps an async closure as a confirm action.
    pub fn new<F, Fut>(action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        ConfirmAction(Arc::new(move || action().boxed()))
    }

    /// Starts one run of the action.
    pub(crate) fn run(&self) -> ConfirmFuture {
        (self.0)()
    }
}

impl fmt::Debug for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConfirmAction(..)")
    }
}

/// Pre-formatted body block that replaces the plain message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Content {
    lines: Vec<String>,
}

impl Content {
    /// Builds a content block from lines of text.
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Content {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }
}

/// Resolved body of a dialog as the renderer should show it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Body {
    /// Neither message nor content were given.
    Empty,
    /// Plain message text.
    Message(String),
    /// Custom content lines, which win over the message.
    Content(Vec<String>),
}

/// Options describing one alert or confirm dialog.
///
/// `title` is the only required field. Defaults describe a single-button,
/// dismissible, informational alert.
#[derive(Clone, Debug)]
pub struct AlertOptions {
    /// Heading text.
    pub title: String,
    /// Body text, ignored when `content` is set.
    pub message: Option<String>,
    /// Custom body block.
    pub content: Option<Content>,
    /// Icon, accent colour and button style selector.
    pub variant: Variant,
    /// Confirm button text, the service default when `None`.
    pub confirm_label: Option<String>,
    /// Cancel button text, the service default when `None`.
    pub cancel_label: Option<String>,
    /// Whether a secondary cancel button is shown.
    pub show_cancel: bool,
    /// Whether an explicit close icon is shown.
    pub show_close_icon: bool,
    /// Whether backdrop click and escape key may close the dialog.
    pub dismissible: bool,
    /// Action gating the close on confirm.
    pub on_confirm: Option<ConfirmAction>,
}

impl AlertOptions {
    pub fn new(title: impl Into<String>) -> Self {
        AlertOptions {
            title: title.into(),
            message: None,
            content: None,
            variant: Variant::Info,
            confirm_label: None,
            cancel_label: None,
            show_cancel: false,
            show_close_icon: false,
            dismissible: true,
            on_confirm: None,
        }
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }

    /// Sets the variant. Accepts a [`Variant`] or a raw tag; unknown tags
    /// become [`Variant::Info`].
    #[must_use]
    pub fn variant(mut self, variant: impl Into<Variant>) -> Self {
        self.variant = variant.into();
        self
    }

    #[must_use]
    pub fn confirm_label(mut self, label: impl Into<String>) -> Self {
        self.confirm_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn cancel_label(mut self, label: impl Into<String>) -> Self {
        self.cancel_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn show_cancel(mut self, show: bool) -> Self {
        self.show_cancel = show;
        self
    }

    #[must_use]
    pub fn show_close_icon(mut self, show: bool) -> Self {
        self.show_close_icon = show;
        self
    }

    #[must_use]
    pub fn dismissible(mut self, dismissible: bool) -> Self {
        self.dismissible = dismissible;
        self
    }

    /// Attaches an async action run on confirm.
    #[must_use]
    pub fn on_confirm<F, Fut>(mut self, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on_confirm = Some(ConfirmAction::new(action));
        self
    }

    /// Applies the confirm-dialog overrides on top of the caller's options.
    ///
    /// Confirm dialogs always show cancel and close affordances and can never
    /// be dismissed by backdrop or escape, whatever the caller asked for.
    pub(crate) fn into_confirm(mut self) -> Self {
        self.show_cancel = true;
        self.show_close_icon = true;
        self.dismissible = false;
        self
    }

    /// Resolves which body should be displayed.
    pub fn body(&self) -> Body {
        match (&self.content, &self.message) {
            (Some(content), _) => Body::Content(content.as_lines().to_vec()),
            (None, Some(message)) => Body::Message(message.clone()),
            (None, None) => Body::Empty,
        }
    }
}
