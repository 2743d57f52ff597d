//! Output surfaces of the console.
//!
//! A [`Surface`] is where the console draws the active dialog and prints
//! reports. Two implementations exist:
//!
//! - [`TextSurface`]: human readable boxes for an interactive terminal
//! - [`JsonSurface`]: one JSON object per line for scripts and other programs

use std::{fmt, io::Write};

use log::error;
use mockall::automock;
use serde::Serialize;

use crate::dialogs::{Body, ButtonView, DialogError, DialogView, Outcome, RequestId};

/// Something the console tells the user besides the dialog itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Report {
    /// A dialog entered the queue.
    Queued { id: RequestId, title: String },
    /// A dialog answered its caller.
    Resolved { id: RequestId, answer: bool },
    /// A dialog failed its caller.
    Rejected { id: RequestId, error: String },
    /// Free text: usage errors, status.
    Notice { text: String },
}

impl Report {
    /// Builds the report of a completed dialog.
    pub fn outcome(id: RequestId, outcome: &Outcome) -> Self {
        match outcome {
            Ok(answer) => Report::Resolved {
                id,
                answer: *answer,
            },
            Err(error) => Report::Rejected {
                id,
                error: describe(error),
            },
        }
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Report::Notice { text: text.into() }
    }

    /// Whether this report completes a queued dialog.
    pub fn is_outcome(&self) -> bool {
        matches!(self, Report::Resolved { .. } | Report::Rejected { .. })
    }
}

/// Error text including the chain of causes of a failed confirm action.
fn describe(error: &DialogError) -> String {
    match error.confirm_error() {
        Some(source) => format!("confirm action failed: {:#}", source),
        None => error.to_string(),
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Queued { id, title } => write!(f, "{} queued: {}", id, title),
            Report::Resolved { id, answer } => write!(f, "{} resolved: {}", id, answer),
            Report::Rejected { id, error } => write!(f, "{} rejected: {}", id, error),
            Report::Notice { text } => write!(f, "{}", text.trim_end()),
        }
    }
}

/// Destination of everything the console shows.
#[automock]
pub trait Surface {
    /// Draws the active dialog, replacing the previous one.
    fn render(&mut self, view: &DialogView);

    /// Removes the dialog, nothing is active anymore.
    fn clear(&mut self);

    fn report(&mut self, report: &Report);
}

/// Human readable output.
pub struct TextSurface<W: Write> {
    out: W,
}

impl<W: Write> TextSurface<W> {
    pub fn new(out: W) -> Self {
        TextSurface { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            error!("Failed to write to the console: {}", e);
        }
    }
}

/// `[ OK ]` when enabled, `( OK )` when disabled.
fn button(view: &ButtonView) -> String {
    if view.enabled {
        format!("[ {} ]", view.label)
    } else {
        format!("( {} )", view.label)
    }
}

impl<W: Write> Surface for TextSurface<W> {
    fn render(&mut self, view: &DialogView) {
        let mut text = format!(
            "┌ {} {}  ({}, {})\n",
            view.style.icon, view.title, view.id, view.variant
        );

        match &view.body {
            Body::Empty => {}
            Body::Message(message) => text.push_str(&format!("│ {}\n", message)),
            Body::Content(lines) => {
                for line in lines {
                    text.push_str(&format!("│ {}\n", line));
                }
            }
        }

        let mut buttons = vec![button(&view.confirm)];
        buttons.extend(view.cancel.as_ref().map(button));
        buttons.extend(view.close_icon.as_ref().map(button));
        text.push_str(&format!("│ {}\n", buttons.join(" ")));

        let mut footer = Vec::new();
        if view.busy {
            footer.push("working...".to_string());
        }
        if view.dismissible {
            footer.push("escape closes".to_string());
        }
        if view.waiting > 0 {
            footer.push(format!("{} waiting", view.waiting));
        }
        text.push_str(&format!("└ {}\n", footer.join(", ")));

        self.write(&text);
    }

    fn clear(&mut self) {
        self.write("└ (no dialog)\n");
    }

    fn report(&mut self, report: &Report) {
        self.write(&format!("{}\n", report));
    }
}

/// One line of JSON output.
#[derive(Serialize)]
#[serde(tag = "frame", rename_all = "lowercase")]
enum Frame<'a> {
    View { view: &'a DialogView },
    Clear,
    Report { report: &'a Report },
}

/// Machine readable output, one [`Frame`] per line.
pub struct JsonSurface<W: Write> {
    out: W,
}

impl<W: Write> JsonSurface<W> {
    pub fn new(out: W) -> Self {
        JsonSurface { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, frame: &Frame) {
        let result = serde_json::to_writer(&mut self.out, frame)
            .map_err(std::io::Error::from)
            .and_then(|_| self.out.write_all(b"\n"))
            .and_then(|_| self.out.flush());

        if let Err(e) = result {
            error!("Failed to write JSON frame: {}", e);
        }
    }
}

impl<W: Write> Surface for JsonSurface<W> {
    fn render(&mut self, view: &DialogView) {
        self.emit(&Frame::View { view });
    }

    fn clear(&mut self) {
        self.emit(&Frame::Clear);
    }

    fn report(&mut self, report: &Report) {
        self.emit(&Frame::Report { report });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogs::{
        AlertOptions, DialogService, Gesture, ServiceSettings, Variant,
    };
    use serde_json::Value;

    /// Builds the view of a single dialog through a real service.
    async fn view_of(options: AlertOptions) -> DialogView {
        let (controller, overlay, _task) = DialogService::spawn(ServiceSettings::default());
        let _pending = controller.show_alert(options);
        controller.flush().await;
        overlay.current().unwrap()
    }

    fn text(surface: TextSurface<Vec<u8>>) -> String {
        String::from_utf8(surface.into_inner()).unwrap()
    }

    fn frames(surface: JsonSurface<Vec<u8>>) -> Vec<Value> {
        String::from_utf8(surface.into_inner())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_text_render_alert() {
        let view = view_of(
            AlertOptions::new("Network issue")
                .message("Retrying")
                .variant(Variant::Error)
                .show_cancel(true),
        )
        .await;

        let mut surface = TextSurface::new(Vec::new());
        surface.render(&view);
        let output = text(surface);

        assert!(output.contains("✖ Network issue"));
        assert!(output.contains(&format!("({}, error)", view.id)));
        assert!(output.contains("│ Retrying"));
        assert!(output.contains("[ OK ] [ Cancel ]"));
        assert!(output.contains("escape closes"));
    }

    #[tokio::test]
    async fn test_text_render_content_lines() {
        let view = view_of(
            AlertOptions::new("Streak")
                .message("ignored")
                .content(crate::dialogs::Content::lines(["day 1", "day 2"])),
        )
        .await;

        let mut surface = TextSurface::new(Vec::new());
        surface.render(&view);
        let output = text(surface);

        assert!(output.contains("│ day 1\n│ day 2\n"));
        assert!(!output.contains("ignored"));
    }

    #[tokio::test]
    async fn test_text_render_busy_confirm() {
        let (controller, mut overlay, _task) = DialogService::spawn(ServiceSettings::default());
        let _pending = controller.show_confirm(
            AlertOptions::new("Upload?")
                .on_confirm(|| futures::future::pending::<anyhow::Result<()>>()),
        );
        overlay.press(Gesture::Confirm);
        let view = loop {
            match overlay.changed().await.unwrap() {
                Some(view) if view.busy => break view,
                _ => continue,
            }
        };

        let mut surface = TextSurface::new(Vec::new());
        surface.render(&view);
        let output = text(surface);

        assert!(output.contains("( OK ) ( Cancel ) ( × )"));
        assert!(output.contains("working..."));
        assert!(!output.contains("escape closes"));
    }

    #[test]
    fn test_text_reports() {
        let id = RequestId::next();

        let mut surface = TextSurface::new(Vec::new());
        surface.report(&Report::outcome(id, &Ok(true)));
        surface.report(&Report::outcome(
            id,
            &Err(DialogError::ConfirmFailed(anyhow::anyhow!("403"))),
        ));
        surface.report(&Report::notice("no active dialog\n"));

        assert_eq!(
            text(surface),
            format!(
                "{id} resolved: true\n{id} rejected: confirm action failed: 403\nno active dialog\n"
            )
        );
    }

    #[test]
    fn test_rejection_keeps_error_context() {
        let id = RequestId::next();
        let error = anyhow::anyhow!("403").context("delete goal");

        let report = Report::outcome(id, &Err(DialogError::ConfirmFailed(error)));

        assert_eq!(
            report,
            Report::Rejected {
                id,
                error: "confirm action failed: delete goal: 403".to_string()
            }
        );
        assert!(report.is_outcome());
        assert!(!Report::notice("hello").is_outcome());
    }

    #[tokio::test]
    async fn test_json_frames() {
        let view = view_of(AlertOptions::new("Saved").variant(Variant::Success)).await;

        let mut surface = JsonSurface::new(Vec::new());
        surface.render(&view);
        surface.clear();
        surface.report(&Report::outcome(view.id, &Ok(false)));
        let frames = frames(surface);

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0]["frame"], "view");
        assert_eq!(frames[0]["view"]["id"], view.id.to_string());
        assert_eq!(frames[0]["view"]["variant"], "success");
        assert_eq!(frames[0]["view"]["style"]["accent"], "#16A34A");
        assert_eq!(frames[0]["view"]["style"]["button"], "primary");
        assert_eq!(frames[0]["view"]["body"]["kind"], "empty");
        assert_eq!(frames[0]["view"]["confirm"]["label"], "OK");
        assert_eq!(frames[1]["frame"], "clear");
        assert_eq!(frames[2]["frame"], "report");
        assert_eq!(frames[2]["report"]["kind"], "resolved");
        assert_eq!(frames[2]["report"]["answer"], false);
    }
}
