//! Console command parsing.
//!
//! Each input line is one command. Lines are split into words (double quotes
//! group words) and parsed with `clap`, so every command gets usage errors and
//! `help` for free.

use std::time::Duration;

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::debug;
use tokio::time;

use crate::dialogs::{AlertOptions, Content, Gesture, Variant};

/// Command line as typed in the console.
#[derive(Debug, Parser)]
#[command(name = "alertbox", no_binary_name = true, disable_version_flag = true)]
struct CommandLine {
    #[command(subcommand)]
    command: Command,
}

/// A console command.
#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Queue a single-button alert
    Alert(AlertArgs),
    /// Queue a confirm dialog
    Confirm(ConfirmArgs),
    /// Act on the active dialog
    Press {
        #[arg(value_enum)]
        control: Control,
    },
    /// Decline the active dialog
    Dismiss,
    /// Show the active dialog again
    Status,
    /// Stop immediately, declining every pending dialog
    Quit,
}

/// Options shared by `alert` and `confirm`.
#[derive(Debug, PartialEq, Eq, Args)]
pub struct DialogArgs {
    /// success, warning, error or info
    #[arg(long)]
    pub variant: Option<String>,
    /// Body text
    #[arg(long, short)]
    pub message: Option<String>,
    /// Body line, replaces the message (repeatable)
    #[arg(long = "line")]
    pub lines: Vec<String>,
    /// Confirm button text
    #[arg(long)]
    pub confirm_label: Option<String>,
    /// Cancel button text
    #[arg(long)]
    pub cancel_label: Option<String>,
    /// Dialog title
    #[arg(required = true, num_args = 1..)]
    pub title: Vec<String>,
}

impl DialogArgs {
    /// Builds dialog options, using `default_variant` when none was given.
    pub fn options(&self, default_variant: Variant) -> AlertOptions {
        let variant = self
            .variant
            .as_deref()
            .map_or(default_variant, Variant::from_tag);
        let mut options = AlertOptions::new(self.title.join(" ")).variant(variant);

        if let Some(message) = &self.message {
            options = options.message(message.clone());
        }
        if !self.lines.is_empty() {
            options = options.content(Content::lines(self.lines.clone()));
        }
        if let Some(label) = &self.confirm_label {
            options = options.confirm_label(label.clone());
        }
        if let Some(label) = &self.cancel_label {
            options = options.cancel_label(label.clone());
        }

        options
    }
}

#[derive(Debug, PartialEq, Eq, Args)]
pub struct AlertArgs {
    #[command(flatten)]
    pub dialog: DialogArgs,
    /// Show a cancel button
    #[arg(long)]
    pub cancel: bool,
    /// Show a close icon
    #[arg(long)]
    pub close_icon: bool,
    /// Ignore backdrop clicks and escape
    #[arg(long)]
    pub sticky: bool,
}

impl AlertArgs {
    pub fn options(&self, default_variant: Variant) -> AlertOptions {
        self.dialog
            .options(default_variant)
            .show_cancel(self.cancel)
            .show_close_icon(self.close_icon)
            .dismissible(!self.sticky)
    }
}

#[derive(Debug, PartialEq, Eq, Args)]
pub struct ConfirmArgs {
    #[command(flatten)]
    pub dialog: DialogArgs,
    /// Run a confirm action lasting this many milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,
    /// Make the confirm action fail with this reason
    #[arg(long)]
    pub fail: Option<String>,
}

impl ConfirmArgs {
    /// Builds dialog options; `--delay-ms` and `--fail` attach a simulated
    /// confirm action.
    pub fn options(&self, default_variant: Variant) -> AlertOptions {
        let options = self.dialog.options(default_variant);
        if self.delay_ms.is_none() && self.fail.is_none() {
            return options;
        }

        let delay = Duration::from_millis(self.delay_ms.unwrap_or(0));
        let failure = self.fail.clone();
        options.on_confirm(move || {
            let failure = failure.clone();
            async move {
                time::sleep(delay).await;
                match failure {
                    Some(reason) => Err(anyhow!(reason)),
                    None => Ok(()),
                }
            }
        })
    }
}

/// Overlay control targeted by `press`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Control {
    #[value(alias = "ok", alias = "y")]
    Confirm,
    #[value(alias = "n")]
    Cancel,
    #[value(alias = "x")]
    Close,
    Backdrop,
    #[value(alias = "esc")]
    Escape,
}

impl From<Control> for Gesture {
    fn from(control: Control) -> Self {
        match control {
            Control::Confirm => Gesture::Confirm,
            Control::Cancel => Gesture::Cancel,
            Control::Close => Gesture::CloseIcon,
            Control::Backdrop => Gesture::Backdrop,
            Control::Escape => Gesture::Escape,
        }
    }
}

/// Errors that can occur during command parsing.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandParsingError {
    /// Blank line or `#` comment, nothing to do
    Empty,
    /// Unbalanced quotes in the line
    UnclosedQuote,
    /// Rejected by the command parser, carries the rendered usage message
    Invalid(String),
}

impl Command {
    /// Parses one console line into a command.
    ///
    /// # Errors
    ///
    /// - Blank lines and comments - [`CommandParsingError::Empty`]
    /// - A double quote is never closed - [`CommandParsingError::UnclosedQuote`]
    /// - Unknown command, bad flag or `help` - [`CommandParsingError::Invalid`]
    pub fn parse(line: &str) -> Result<Self, CommandParsingError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Err(CommandParsingError::Empty);
        }

        let words = split_words(line)?;
        debug!("parsing command words {:?}", words);

        CommandLine::try_parse_from(words)
            .map(|command_line| command_line.command)
            .map_err(|error| CommandParsingError::Invalid(error.render().to_string()))
    }
}

/// Splits a line on whitespace, keeping double-quoted runs together.
fn split_words(line: &str) -> Result<Vec<String>, CommandParsingError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for character in line.chars() {
        match character {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quoted {
        return Err(CommandParsingError::UnclosedQuote);
    }
    if in_word {
        words.push(current);
    }

    Ok(words)
}
