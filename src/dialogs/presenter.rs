//! Overlay presenter: view model of the active dialog and gesture handling.
//!
//! The presenter is toolkit-neutral. It turns the active request into a
//! [`DialogView`] any renderer can draw, and decides what a user [`Gesture`]
//! means for that request. It never completes requests itself; the service
//! applies its [`Decision`].

use serde::Serialize;

use crate::dialogs::{
    options::{Body, ConfirmAction},
    queue::ActiveDialog,
    request::RequestId,
    variant::{Variant, VariantStyle},
};

/// Glyph used for the close affordance.
const CLOSE_GLYPH: &str = "×";

/// User interaction with the overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gesture {
    /// Confirm (primary) button.
    Confirm,
    /// Secondary cancel button.
    Cancel,
    /// Explicit close icon.
    CloseIcon,
    /// Click outside the dialog.
    Backdrop,
    /// Escape key.
    Escape,
}

/// What a gesture means for the active request.
#[derive(Debug)]
pub enum Decision {
    /// Nothing happens; carries the reason for logging.
    Ignore(&'static str),
    /// Complete the request with this answer.
    Resolve(bool),
    /// Mark the dialog busy and run its confirm action.
    RunConfirm(ConfirmAction),
}

/// Button text applied when a request leaves its labels unset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelDefaults {
    pub confirm_label: String,
    pub cancel_label: String,
}

impl Default for LabelDefaults {
    fn default() -> Self {
        LabelDefaults {
            confirm_label: "OK".to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }
}

/// A button as the renderer should draw it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ButtonView {
    pub label: String,
    pub enabled: bool,
}

/// Everything a renderer needs to draw the active dialog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DialogView {
    pub id: RequestId,
    pub title: String,
    pub body: Body,
    pub variant: Variant,
    pub style: VariantStyle,
    pub confirm: ButtonView,
    pub cancel: Option<ButtonView>,
    pub close_icon: Option<ButtonView>,
    /// Whether backdrop click and escape key currently close the dialog.
    pub dismissible: bool,
    /// Whether the confirm action is running.
    pub busy: bool,
    /// Number of requests waiting behind this one.
    pub waiting: usize,
}

/// Translates the active dialog into views and gestures into decisions.
#[derive(Clone, Debug, Default)]
pub struct OverlayPresenter {
    defaults: LabelDefaults,
}

impl OverlayPresenter {
    pub fn new(defaults: LabelDefaults) -> Self {
        OverlayPresenter { defaults }
    }

    /// Decides what `gesture` does to `active`.
    ///
    /// Every control is inert while the dialog is busy, which also makes a
    /// second confirm press a no-op. Backdrop and escape require the dialog
    /// to be dismissible; cancel and close require their control to be shown.
    pub fn decide(&self, active: &ActiveDialog, gesture: Gesture) -> Decision {
        if active.is_busy() {
            return Decision::Ignore("confirm action in progress");
        }

        let options = active.request().options();
        match gesture {
            Gesture::Confirm => match &options.on_confirm {
                Some(action) => Decision::RunConfirm(action.clone()),
                None => Decision::Resolve(true),
            },
            Gesture::Cancel if options.show_cancel => Decision::Resolve(false),
            Gesture::Cancel => Decision::Ignore("no cancel button"),
            Gesture::CloseIcon if options.show_close_icon => Decision::Resolve(false),
            Gesture::CloseIcon => Decision::Ignore("no close icon"),
            Gesture::Backdrop | Gesture::Escape if options.dismissible => Decision::Resolve(false),
            Gesture::Backdrop | Gesture::Escape => Decision::Ignore("not dismissible"),
        }
    }

    /// Builds the view of `active`; `waiting` is the queue length behind it.
    pub fn view(&self, active: &ActiveDialog, waiting: usize) -> DialogView {
        let options = active.request().options();
        let enabled = !active.is_busy();

        let cancel = options.show_cancel.then(|| ButtonView {
            label: options
                .cancel_label
                .clone()
                .unwrap_or_else(|| self.defaults.cancel_label.clone()),
            enabled,
        });
        let close_icon = options.show_close_icon.then(|| ButtonView {
            label: CLOSE_GLYPH.to_string(),
            enabled,
        });

        DialogView {
            id: active.id(),
            title: options.title.clone(),
            body: options.body(),
            variant: options.variant,
            style: *options.variant.style(),
            confirm: ButtonView {
                label: options
                    .confirm_label
                    .clone()
                    .unwrap_or_else(|| self.defaults.confirm_label.clone()),
                enabled,
            },
            cancel,
            close_icon,
            dismissible: options.dismissible && enabled,
            busy: active.is_busy(),
            waiting,
        }
    }
}
