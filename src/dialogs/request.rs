//! Dialog requests and the awaitable handle given back to callers.
//!
//! Each request owns the sending half of a one-shot channel; the caller keeps
//! the receiving half inside a [`PendingDialog`]. Completing a request consumes
//! it, so a request can only ever be resolved or rejected once.

use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::atomic::{AtomicU64, Ordering},
    task::{Context, Poll},
};

use log::debug;
use serde::Serialize;
use tokio::sync::oneshot;

use crate::dialogs::{DialogError, Outcome, options::AlertOptions};

/// Identifier of a dialog request, unique within the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct RequestId(u64);

impl RequestId {
    /// Allocates the next identifier.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        RequestId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dlg-{}", self.0)
    }
}

impl From<RequestId> for String {
    fn from(id: RequestId) -> Self {
        id.to_string()
    }
}

/// A dialog waiting for, or going through, user interaction.
#[derive(Debug)]
pub struct DialogRequest {
    id: RequestId,
    options: AlertOptions,
    reply: oneshot::Sender<Outcome>,
}

impl DialogRequest {
    /// Creates a request and the pending handle bound to it.
    pub fn new(options: AlertOptions) -> (Self, PendingDialog) {
        let id = RequestId::next();
        let (reply, receiver) = oneshot::channel();

        (
            DialogRequest { id, options, reply },
            PendingDialog { id, receiver },
        )
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn options(&self) -> &AlertOptions {
        &self.options
    }

    /// Completes the request with the user's answer.
    pub fn resolve(self, answer: bool) {
        debug!("{} resolved with {}", self.id, answer);
        self.complete(Ok(answer));
    }

    /// Completes the request with an error.
    pub fn reject(self, error: DialogError) {
        debug!("{} rejected: {}", self.id, error);
        self.complete(Err(error));
    }

    fn complete(self, outcome: Outcome) {
        // The caller may have dropped its handle, nobody is left to tell
        if self.reply.send(outcome).is_err() {
            debug!("{} completed after its caller went away", self.id);
        }
    }
}

/// Awaitable outcome of a dialog.
///
/// Resolves to `Ok(true)` when the user confirmed, `Ok(false)` when the dialog
/// was declined or dismissed, and `Err` when the confirm action failed or the
/// service stopped without answering.
#[derive(Debug)]
pub struct PendingDialog {
    id: RequestId,
    receiver: oneshot::Receiver<Outcome>,
}

impl PendingDialog {
    pub fn id(&self) -> RequestId {
        self.id
    }
}

impl Future for PendingDialog {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(DialogError::ServiceClosed)))
    }
}
