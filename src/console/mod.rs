//! Terminal front end of the dialog service.
//!
//! The console reads one command per line (from stdin or a script), turns
//! them into dialog requests and gestures, and draws whatever the service
//! shows on a [`Surface`]. Every queued dialog is awaited on its own task, so
//! outcomes are reported as soon as they are known:
//!
//! ```text
//! > alert --variant success Saved
//! dlg-1 queued: Saved
//! ┌ ✔ Saved  (dlg-1, success)
//! │ [ OK ]
//! └ escape closes
//! > press confirm
//! └ (no dialog)
//! dlg-1 resolved: true
//! ```
//!
//! # Commands
//!
//! - `alert [--variant V] [-m MESSAGE] [--line L]... [--cancel] [--close-icon] [--sticky] TITLE...`
//! - `confirm [--variant V] [-m MESSAGE] [--delay-ms N] [--fail REASON] TITLE...`
//! - `press confirm|cancel|close|backdrop|escape`
//! - `dismiss`, `status`, `quit`, `help`
//!
//! # End of Input
//!
//! When input runs out, running confirm actions are allowed to settle, then
//! the service shuts down and declines whatever is left. `quit` shuts down
//! right away, cancelling a running confirm action.

use log::{debug, error, info, warn};
use tokio::{
    io::{self, AsyncBufRead, AsyncBufReadExt},
    sync::mpsc,
};

use crate::{
    config::{self, OutputFormat},
    dialogs::{DialogController, OverlayHandle, PendingDialog, Variant},
};

mod command;
mod surface;

pub use crate::console::command::{Command, CommandParsingError};
pub use crate::console::surface::{JsonSurface, Report, Surface, TextSurface};

/// Whether the console keeps reading after a command.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Line-oriented front end driving a [`DialogController`] and an [`OverlayHandle`].
pub struct Console<S: Surface> {
    controller: DialogController,
    overlay: OverlayHandle,
    surface: S,
    default_variant: Variant,
    /// Cloned into every outcome task
    reports_tx: mpsc::UnboundedSender<Report>,
    reports: mpsc::UnboundedReceiver<Report>,
    /// Dialogs queued from this console whose outcome is not reported yet
    outstanding: usize,
}

impl<S: Surface> Console<S> {
    pub fn new(
        controller: DialogController,
        overlay: OverlayHandle,
        surface: S,
        default_variant: Variant,
    ) -> Self {
        let (reports_tx, reports) = mpsc::unbounded_channel();
        Console {
            controller,
            overlay,
            surface,
            default_variant,
            reports_tx,
            reports,
            outstanding: 0,
        }
    }

    /// Runs commands from `input` until it ends or `quit` is read.
    ///
    /// Returns once the service is stopped and every queued dialog has been
    /// reported.
    pub async fn run<R>(mut self, input: R)
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut flow = Flow::Continue;

        loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        flow = self.execute(&line);
                        if flow == Flow::Quit {
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!("end of console input");
                        break;
                    }
                    Err(e) => {
                        error!("Failed to read console input: {}", e);
                        break;
                    }
                },
                view = self.overlay.changed() => match view {
                    Ok(Some(view)) => self.surface.render(&view),
                    Ok(None) => self.surface.clear(),
                    Err(_) => {
                        warn!("dialog service stopped");
                        break;
                    }
                },
                Some(report) = self.reports.recv() => self.receive(report),
            }
        }

        if flow == Flow::Continue {
            self.settle().await;
        }
        self.controller.shutdown();

        while self.outstanding > 0 {
            match self.reports.recv().await {
                Some(report) => self.receive(report),
                None => break,
            }
        }
        info!("console stopped");
    }

    fn execute(&mut self, line: &str) -> Flow {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(CommandParsingError::Empty) => return Flow::Continue,
            Err(CommandParsingError::UnclosedQuote) => {
                self.surface.report(&Report::notice("unclosed quote"));
                return Flow::Continue;
            }
            Err(CommandParsingError::Invalid(usage)) => {
                self.surface.report(&Report::notice(usage));
                return Flow::Continue;
            }
        };

        match command {
            Command::Alert(args) => {
                let pending = self.controller.show_alert(args.options(self.default_variant));
                self.track(pending, args.dialog.title.join(" "));
            }
            Command::Confirm(args) => {
                let pending = self
                    .controller
                    .show_confirm(args.options(self.default_variant));
                self.track(pending, args.dialog.title.join(" "));
            }
            Command::Press { control } => self.overlay.press(control.into()),
            Command::Dismiss => self.controller.dismiss(),
            Command::Status => match self.overlay.current() {
                Some(view) => self.surface.render(&view),
                None => self.surface.report(&Report::notice("no active dialog")),
            },
            Command::Quit => return Flow::Quit,
        }

        Flow::Continue
    }

    /// Reports the outcome of `pending` once it completes.
    fn track(&mut self, pending: PendingDialog, title: String) {
        let id = pending.id();
        let reports = self.reports_tx.clone();
        self.outstanding += 1;
        self.surface.report(&Report::Queued { id, title });

        tokio::spawn(async move {
            let outcome = pending.await;
            let _ = reports.send(Report::outcome(id, &outcome));
        });
    }

    fn receive(&mut self, report: Report) {
        if report.is_outcome() {
            self.outstanding = self.outstanding.saturating_sub(1);
        }
        self.surface.report(&report);
    }

    /// Waits until the service has seen every command and no confirm action
    /// is running anymore.
    async fn settle(&mut self) {
        self.controller.flush().await;

        while self.overlay.current().is_some_and(|view| view.busy) {
            match self.overlay.changed().await {
                Ok(Some(view)) => self.surface.render(&view),
                Ok(None) => self.surface.clear(),
                Err(_) => break,
            }
        }
    }
}

/// Runs a console on `input`, printing to stdout in the configured format.
pub async fn run_on_stdout<R>(
    config: &config::Console,
    controller: DialogController,
    overlay: OverlayHandle,
    input: R,
) where
    R: AsyncBufRead + Unpin,
{
    let stdout = std::io::stdout();
    match config.format {
        OutputFormat::Text => {
            Console::new(
                controller,
                overlay,
                TextSurface::new(stdout),
                config.default_variant,
            )
            .run(input)
            .await
        }
        OutputFormat::Json => {
            Console::new(
                controller,
                overlay,
                JsonSurface::new(stdout),
                config.default_variant,
            )
            .run(input)
            .await
        }
    }
}

/// Reads commands from standard input.
pub fn stdin() -> io::BufReader<io::Stdin> {
    io::BufReader::new(io::stdin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::surface::MockSurface;
    use crate::dialogs::{DialogService, RequestId, ServiceSettings};
    use std::{
        collections::HashMap,
        io::Write,
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    /// Everything a mocked surface was asked to show.
    #[derive(Default)]
    struct Recording {
        reports: Mutex<Vec<Report>>,
        renders: AtomicUsize,
        clears: AtomicUsize,
    }

    fn recording_surface() -> (MockSurface, Arc<Recording>) {
        let recording = Arc::new(Recording::default());
        let mut surface = MockSurface::new();

        let sink = Arc::clone(&recording);
        surface.expect_render().returning(move |_| {
            sink.renders.fetch_add(1, Ordering::SeqCst);
        });
        let sink = Arc::clone(&recording);
        surface.expect_clear().returning(move || {
            sink.clears.fetch_add(1, Ordering::SeqCst);
        });
        let sink = Arc::clone(&recording);
        surface
            .expect_report()
            .returning(move |report| sink.reports.lock().unwrap().push(report.clone()));

        (surface, recording)
    }

    async fn run_console<R>(input: R, default_variant: Variant) -> Arc<Recording>
    where
        R: AsyncBufRead + Unpin,
    {
        let (controller, overlay, task) = DialogService::spawn(ServiceSettings::default());
        let (surface, recording) = recording_surface();

        Console::new(controller, overlay, surface, default_variant)
            .run(input)
            .await;
        task.await.unwrap();

        recording
    }

    async fn run_script(script: &str) -> Vec<Report> {
        let recording = run_console(script.as_bytes(), Variant::Info).await;
        let reports = recording.reports.lock().unwrap().clone();
        reports
    }

    /// Outcome of every queued dialog, in queue order, without its id.
    fn answers(reports: &[Report]) -> Vec<String> {
        let outcomes: HashMap<RequestId, String> = reports
            .iter()
            .filter_map(|report| match report {
                Report::Resolved { id, answer } => Some((*id, format!("resolved: {}", answer))),
                Report::Rejected { id, error } => Some((*id, format!("rejected: {}", error))),
                _ => None,
            })
            .collect();

        reports
            .iter()
            .filter_map(|report| match report {
                Report::Queued { id, .. } => Some(
                    outcomes
                        .get(id)
                        .cloned()
                        .unwrap_or_else(|| "missing".to_string()),
                ),
                _ => None,
            })
            .collect()
    }

    fn notices(reports: &[Report]) -> Vec<String> {
        reports
            .iter()
            .filter_map(|report| match report {
                Report::Notice { text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_alert_confirmed() {
        let reports = run_script("alert --variant success Saved\npress confirm\n").await;

        assert!(matches!(
            &reports[0],
            Report::Queued { title, .. } if title == "Saved"
        ));
        assert_eq!(answers(&reports), vec!["resolved: true"]);
    }

    #[tokio::test]
    async fn test_pending_dialogs_declined_at_end_of_input() {
        let reports =
            run_script("alert Saved\nalert --variant error Network issue\npress confirm\n").await;

        assert_eq!(answers(&reports), vec!["resolved: true", "resolved: false"]);
    }

    #[tokio::test]
    async fn test_failing_confirm_action_rejects() {
        let reports = run_script("confirm --fail 403 Delete?\npress confirm\n").await;

        assert_eq!(
            answers(&reports),
            vec!["rejected: confirm action failed: 403"]
        );
    }

    #[tokio::test]
    async fn test_running_action_settles_before_shutdown() {
        let recording = run_console(
            "confirm --delay-ms 20 Sync now?\npress confirm\n".as_bytes(),
            Variant::Info,
        )
        .await;
        let reports = recording.reports.lock().unwrap().clone();

        assert_eq!(answers(&reports), vec!["resolved: true"]);
        assert!(recording.clears.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_quit_cancels_running_action() {
        let reports = run_script(
            "confirm --delay-ms 60000 Upload?\npress confirm\nquit\nalert Never shown\n",
        )
        .await;

        assert_eq!(answers(&reports), vec!["resolved: false"]);
    }

    #[tokio::test]
    async fn test_dismiss_declines_confirm() {
        let reports = run_script("confirm Leave group?\ndismiss\nalert Next\npress ok\n").await;

        assert_eq!(answers(&reports), vec!["resolved: false", "resolved: true"]);
    }

    #[tokio::test]
    async fn test_sticky_alert_ignores_backdrop_and_escape() {
        let reports =
            run_script("alert --sticky Keep me\npress backdrop\npress escape\npress confirm\n")
                .await;

        assert_eq!(answers(&reports), vec!["resolved: true"]);
    }

    #[tokio::test]
    async fn test_cancel_button_declines() {
        let reports = run_script("alert --cancel Continue?\npress cancel\n").await;

        assert_eq!(answers(&reports), vec!["resolved: false"]);
    }

    #[tokio::test]
    async fn test_invalid_commands_are_reported() {
        let reports =
            run_script("# setup\n\nfrobnicate\nalert \"broken\nstatus\nalert Fine\npress y\n")
                .await;

        let notices = notices(&reports);
        assert_eq!(notices.len(), 3);
        assert!(notices[0].contains("frobnicate"));
        assert_eq!(notices[1], "unclosed quote");
        assert_eq!(notices[2], "no active dialog");
        assert_eq!(answers(&reports), vec!["resolved: true"]);
    }

    #[tokio::test]
    async fn test_status_renders_active_dialog() {
        let (controller, overlay, task) = DialogService::spawn(ServiceSettings::default());
        let _pending = controller.show_alert(crate::dialogs::AlertOptions::new("Existing"));
        controller.flush().await;

        let (surface, recording) = recording_surface();
        Console::new(controller, overlay, surface, Variant::Info)
            .run("status\n".as_bytes())
            .await;
        task.await.unwrap();

        assert!(recording.renders.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_script_file() {
        let mut script = tempfile::NamedTempFile::new().unwrap();
        writeln!(script, "alert --variant warning Low battery").unwrap();
        writeln!(script, "press x").unwrap();
        writeln!(script, "confirm --cancel-label Stay Leave?").unwrap();
        writeln!(script, "press n").unwrap();
        script.flush().unwrap();

        let file = tokio::fs::File::open(script.path()).await.unwrap();
        let recording = run_console(io::BufReader::new(file), Variant::Info).await;
        let reports = recording.reports.lock().unwrap().clone();

        // No close icon on the alert, so `press x` does nothing and the alert
        // is declined at the end of the script.
        assert_eq!(answers(&reports), vec!["resolved: false", "resolved: false"]);
    }
}
