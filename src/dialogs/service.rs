//! Dialog service: the task owning the queue, and the handles talking to it.
//!
//! The [`DialogService`] runs as a single task. Callers reach it through a
//! [`DialogController`], renderers through an [`OverlayHandle`]; both post
//! events on one unbounded channel, so the channel order is the FIFO order of
//! the queue. After each event the service promotes the next waiting request
//! and publishes the view of the active one on a watch channel.
//!
//! Confirm actions run on their own task and report back on an internal
//! channel, which keeps the service responsive to new requests meanwhile.

use std::time::Duration;

use log::{debug, info, warn};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time,
};

use crate::{
    config::Dialogs,
    dialogs::{
        DialogError, Outcome,
        options::{AlertOptions, ConfirmAction},
        presenter::{Decision, DialogView, Gesture, LabelDefaults, OverlayPresenter},
        queue::DialogQueue,
        request::{DialogRequest, PendingDialog, RequestId},
    },
};

/// Events accepted by the service task.
#[derive(Debug)]
enum ServiceEvent {
    Enqueue(DialogRequest),
    Dismiss,
    Gesture(Gesture),
    /// Acknowledged once every earlier event is applied
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Result of a confirm action, posted back by its task.
#[derive(Debug)]
struct Settlement {
    id: RequestId,
    result: Result<(), DialogError>,
}

/// Runtime settings of the service.
#[derive(Clone, Debug, Default)]
pub struct ServiceSettings {
    /// Button text for requests that leave their labels unset.
    pub labels: LabelDefaults,
    /// Upper bound on confirm actions, unbounded when `None`.
    pub confirm_timeout: Option<Duration>,
}

impl From<&Dialogs> for ServiceSettings {
    fn from(config: &Dialogs) -> Self {
        ServiceSettings {
            labels: LabelDefaults {
                confirm_label: config.confirm_label.clone(),
                cancel_label: config.cancel_label.clone(),
            },
            confirm_timeout: config.confirm_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Task owning the dialog queue.
///
/// # Examples
///
/// ```text
/// let (controller, overlay, _task) = DialogService::spawn(ServiceSettings::default());
///
/// let saved = controller.show_alert(AlertOptions::new("Saved").variant("success"));
/// // A renderer draws `overlay.current()` and posts gestures with `overlay.press(..)`
/// let acknowledged = saved.await;
/// ```
pub struct DialogService {
    events: mpsc::UnboundedReceiver<ServiceEvent>,
    settlements: mpsc::UnboundedReceiver<Settlement>,
    /// Cloned into every confirm task
    settlements_tx: mpsc::UnboundedSender<Settlement>,
    queue: DialogQueue,
    presenter: OverlayPresenter,
    views: watch::Sender<Option<DialogView>>,
    confirm_timeout: Option<Duration>,
    /// Task running the confirm action of the active request
    confirm_task: Option<JoinHandle<()>>,
}

impl DialogService {
    /// Creates the service and the handles bound to it.
    ///
    /// Nothing happens until [`DialogService::run`] is polled; requests posted
    /// before that simply wait in the channel.
    pub fn new(settings: ServiceSettings) -> (Self, DialogController, OverlayHandle) {
        let (events_tx, events) = mpsc::unbounded_channel();
        let (settlements_tx, settlements) = mpsc::unbounded_channel();
        let (views, views_rx) = watch::channel(None);

        let service = DialogService {
            events,
            settlements,
            settlements_tx,
            queue: DialogQueue::new(),
            presenter: OverlayPresenter::new(settings.labels),
            views,
            confirm_timeout: settings.confirm_timeout,
            confirm_task: None,
        };
        let controller = DialogController {
            events: events_tx.clone(),
        };
        let overlay = OverlayHandle {
            events: events_tx,
            views: views_rx,
        };

        (service, controller, overlay)
    }

    /// Creates the service and runs it on a new task.
    pub fn spawn(settings: ServiceSettings) -> (DialogController, OverlayHandle, JoinHandle<()>) {
        let (service, controller, overlay) = DialogService::new(settings);
        let task = tokio::spawn(service.run());
        (controller, overlay, task)
    }

    /// Processes events until shutdown or until every handle is dropped.
    ///
    /// On exit the running confirm action is aborted and every request still
    /// active or waiting resolves `false`.
    pub async fn run(mut self) {
        info!("dialog service started");

        loop {
            tokio::select! {
                event = self.events.recv() => {
                    let Some(event) = event else {
                        debug!("every dialog handle dropped");
                        break;
                    };
                    if !self.handle_event(event) {
                        break;
                    }
                }
                Some(settlement) = self.settlements.recv() => self.settle(settlement),
            }

            self.queue.promote();
            self.publish();
        }

        self.shutdown();
        info!("dialog service stopped");
    }

    /// Applies one event; returns `false` when the service must stop.
    fn handle_event(&mut self, event: ServiceEvent) -> bool {
        match event {
            ServiceEvent::Enqueue(request) => self.queue.push(request),
            ServiceEvent::Dismiss => self.dismiss(),
            ServiceEvent::Gesture(gesture) => self.handle_gesture(gesture),
            ServiceEvent::Flush(done) => {
                // The view published after the previous event is already out
                let _ = done.send(());
            }
            ServiceEvent::Shutdown => {
                info!("dialog service shutdown requested");
                return false;
            }
        }
        true
    }

    fn handle_gesture(&mut self, gesture: Gesture) {
        let Some(active) = self.queue.active() else {
            debug!("{:?} with nothing active", gesture);
            return;
        };

        match self.presenter.decide(active, gesture) {
            Decision::Ignore(reason) => {
                debug!("{:?} ignored on {}: {}", gesture, active.id(), reason);
            }
            Decision::Resolve(answer) => {
                if let Some(active) = self.queue.take_active() {
                    self.finish(active.into_request(), Ok(answer));
                }
            }
            Decision::RunConfirm(action) => self.run_confirm(action),
        }
    }

    /// Marks the active dialog busy and starts its confirm action.
    fn run_confirm(&mut self, action: ConfirmAction) {
        let Some(active) = self.queue.active_mut() else {
            return;
        };
        active.set_busy(true);

        let id = active.id();
        let settlements = self.settlements_tx.clone();
        let timeout = self.confirm_timeout;
        info!("running confirm action of {}", id);

        self.confirm_task = Some(tokio::spawn(async move {
            let result = match timeout {
                Some(limit) => match time::timeout(limit, action.run()).await {
                    Ok(result) => result.map_err(DialogError::ConfirmFailed),
                    Err(_) => Err(DialogError::ConfirmTimedOut(limit)),
                },
                None => action.run().await.map_err(DialogError::ConfirmFailed),
            };

            let _ = settlements.send(Settlement { id, result });
        }));
    }

    /// Completes the busy dialog with the result of its confirm action.
    fn settle(&mut self, settlement: Settlement) {
        let is_current = self
            .queue
            .active()
            .is_some_and(|active| active.id() == settlement.id && active.is_busy());
        if !is_current {
            debug!("dropping stale confirm result of {}", settlement.id);
            return;
        }

        self.confirm_task = None;
        let Some(active) = self.queue.take_active() else {
            return;
        };

        if let Err(error) = &settlement.result {
            warn!("confirm action of {} failed: {}", settlement.id, error);
        }
        self.finish(active.into_request(), settlement.result.map(|()| true));
    }

    /// Declines the active dialog, cancelling its confirm action if running.
    fn dismiss(&mut self) {
        let Some(active) = self.queue.take_active() else {
            debug!("dismiss with nothing active");
            return;
        };

        if active.is_busy() {
            info!("cancelling confirm action of {}", active.id());
            self.abort_confirm();
        }

        info!("dismissed {}", active.id());
        self.finish(active.into_request(), Ok(false));
    }

    /// Promotes the next request and publishes its view, then completes
    /// `request`. A caller woken by the completion never reads its own
    /// dialog back from the overlay.
    fn finish(&mut self, request: DialogRequest, outcome: Outcome) {
        self.queue.promote();
        self.publish();

        match outcome {
            Ok(answer) => request.resolve(answer),
            Err(error) => request.reject(error),
        }
    }

    fn abort_confirm(&mut self) {
        if let Some(task) = self.confirm_task.take() {
            task.abort();
        }
    }

    /// Declines everything still pending, including requests sent after the
    /// shutdown event but before the channel closed.
    fn shutdown(&mut self) {
        self.abort_confirm();

        self.events.close();
        while let Ok(event) = self.events.try_recv() {
            if let ServiceEvent::Enqueue(request) = event {
                self.queue.push(request);
            }
        }

        let requests = self.queue.drain();
        self.publish();

        if !requests.is_empty() {
            info!("declining {} pending dialogs", requests.len());
        }
        for request in requests {
            request.resolve(false);
        }
    }

    /// Publishes the view of the active dialog when it changed.
    fn publish(&self) {
        let view = self
            .queue
            .active()
            .map(|active| self.presenter.view(active, self.queue.waiting_count()));

        self.views.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }
}

/// Caller-side handle of the dialog service.
///
/// Cheap to clone; pass it to whatever needs to ask the user something.
#[derive(Clone, Debug)]
pub struct DialogController {
    events: mpsc::UnboundedSender<ServiceEvent>,
}

impl DialogController {
    /// Queues a single-button alert.
    ///
    /// The returned handle resolves `true` on acknowledgement and `false` when
    /// the alert is dismissed.
    pub fn show_alert(&self, options: AlertOptions) -> PendingDialog {
        self.enqueue(options)
    }

    /// Queues a confirm dialog.
    ///
    /// Cancel button and close icon are always shown and the dialog is never
    /// dismissible by backdrop or escape, whatever `options` says.
    pub fn show_confirm(&self, options: AlertOptions) -> PendingDialog {
        self.enqueue(options.into_confirm())
    }

    /// Declines the active dialog, if any.
    pub fn dismiss(&self) {
        self.send(ServiceEvent::Dismiss);
    }

    /// Waits until the service has applied every event sent before this call.
    ///
    /// Returns immediately when the service is gone.
    pub async fn flush(&self) {
        let (done, applied) = oneshot::channel();
        if self.events.send(ServiceEvent::Flush(done)).is_ok() {
            let _ = applied.await;
        }
    }

    /// Stops the service, declining every pending dialog.
    pub fn shutdown(&self) {
        self.send(ServiceEvent::Shutdown);
    }

    fn enqueue(&self, options: AlertOptions) -> PendingDialog {
        let (request, pending) = DialogRequest::new(options);
        debug!(
            "enqueue {} \"{}\" ({})",
            request.id(),
            request.options().title,
            request.options().variant
        );

        // On failure the request is dropped and the handle reports ServiceClosed
        if self.events.send(ServiceEvent::Enqueue(request)).is_err() {
            warn!("dialog service stopped, {} cannot be shown", pending.id());
        }

        pending
    }

    fn send(&self, event: ServiceEvent) {
        if self.events.send(event).is_err() {
            debug!("dialog service stopped, event dropped");
        }
    }
}

/// Renderer-side handle of the dialog service.
#[derive(Clone, Debug)]
pub struct OverlayHandle {
    events: mpsc::UnboundedSender<ServiceEvent>,
    views: watch::Receiver<Option<DialogView>>,
}

impl OverlayHandle {
    /// Posts a user gesture for the active dialog.
    pub fn press(&self, gesture: Gesture) {
        if self.events.send(ServiceEvent::Gesture(gesture)).is_err() {
            debug!("dialog service stopped, {:?} dropped", gesture);
        }
    }

    /// Returns the view of the active dialog, `None` when nothing is shown.
    pub fn current(&self) -> Option<DialogView> {
        self.views.borrow().clone()
    }

    /// Waits for the next view change and returns the new view.
    pub async fn changed(&mut self) -> Result<Option<DialogView>, DialogError> {
        self.views
            .changed()
            .await
            .map_err(|_| DialogError::ServiceClosed)?;

        Ok(self.views.borrow_and_update().clone())
    }
}
