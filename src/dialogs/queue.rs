//! FIFO queue of dialog requests with a single active slot.

use std::collections::VecDeque;

use log::debug;

use crate::dialogs::request::{DialogRequest, RequestId};

/// The request currently shown to the user.
#[derive(Debug)]
pub struct ActiveDialog {
    request: DialogRequest,
    /// Set while the confirm action is running.
    busy: bool,
}

impl ActiveDialog {
    pub fn request(&self) -> &DialogRequest {
        &self.request
    }

    pub fn id(&self) -> RequestId {
        self.request.id()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub(crate) fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn into_request(self) -> DialogRequest {
        self.request
    }
}

/// Waiting requests plus the active slot.
///
/// Pushing never activates anything by itself; [`DialogQueue::promote`] is
/// called by the owner after every state change.
#[derive(Debug, Default)]
pub struct DialogQueue {
    /// Requests waiting for the active slot, oldest first.
    waiting: VecDeque<DialogRequest>,
    /// Request shown to the user, if any.
    active: Option<ActiveDialog>,
}

impl DialogQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request behind every waiting one.
    pub fn push(&mut self, request: DialogRequest) {
        debug!(
            "queued {} behind {} waiting",
            request.id(),
            self.waiting.len()
        );
        self.waiting.push_back(request);
    }

    /// Moves the oldest waiting request into the active slot when it is free.
    ///
    /// Returns the id of the newly activated request, `None` if nothing moved.
    pub fn promote(&mut self) -> Option<RequestId> {
        if self.active.is_some() {
            return None;
        }

        let request = self.waiting.pop_front()?;
        let id = request.id();
        debug!("activated {}, {} still waiting", id, self.waiting.len());
        self.active = Some(ActiveDialog {
            request,
            busy: false,
        });

        Some(id)
    }

    pub fn active(&self) -> Option<&ActiveDialog> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut ActiveDialog> {
        self.active.as_mut()
    }

    /// Empties the active slot and hands back its request.
    pub fn take_active(&mut self) -> Option<ActiveDialog> {
        self.active.take()
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    /// Removes every request, the active one first, then waiting ones in order.
    pub fn drain(&mut self) -> Vec<DialogRequest> {
        let mut requests = Vec::with_capacity(self.waiting.len() + 1);
        if let Some(active) = self.active.take() {
            requests.push(active.into_request());
        }
        requests.extend(self.waiting.drain(..));
        requests
    }
}
