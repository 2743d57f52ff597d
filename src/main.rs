//! Alertbox - Queued alert and confirm dialogs with awaitable outcomes.
//!
//! This is the main entry point of alertbox, a dialog service with a terminal
//! front end. Any part of an application can ask the user something and await
//! the answer, while the service makes sure only one dialog is shown at a time.
//!
//! # Overview
//!
//! Callers queue dialogs through a [`dialogs::DialogController`] and get back a
//! future resolving to the outcome:
//!
//! - `Ok(true)` when the user confirmed
//! - `Ok(false)` when the user declined, closed or dismissed the dialog
//! - `Err(..)` when the confirm action attached to the dialog failed
//!
//! Dialogs are shown in the order they were requested. A renderer observes the
//! active dialog through a [`dialogs::OverlayHandle`] and posts user gestures
//! back to it.
//!
//! # Features
//!
//! - **FIFO Queue**: Alerts requested in a burst are shown one after the other
//! - **Variants**: Success, warning, error and info styling with a safe fallback
//! - **Confirm Actions**: Async work run on confirm, with a busy state and optional timeout
//! - **Scripting**: Commands can be read from a file, output can be JSON lines
//! - **YAML Configuration**: Simple configuration file format with environment variable support
//!
//! # Configuration
//!
//! Create an `alertbox.yaml` file (optional, every field has a default):
//!
//! ```yaml
//! dialogs:
//!   confirm_label: "OK"
//!   cancel_label: "Cancel"
//!   confirm_timeout_secs: 30
//!
//! console:
//!   format: text
//!   default_variant: info
//! ```
//!
//! # Environment Variable Overrides
//!
//! Override any configuration value using environment variables with the `ALERTBOX_` prefix:
//!
//! ```bash
//! export ALERTBOX_DIALOGS__CONFIRM_TIMEOUT_SECS=10
//! export ALERTBOX_CONSOLE__FORMAT=json
//! ```
//!
//! # Usage
//!
//! ```bash
//! alertbox --config alertbox.yaml
//! alertbox --script demo.txt --format json
//! ```
//!
//! # Architecture
//!
//! - [`config`] - YAML configuration file structures and loading with environment variable support
//! - [`dialogs`] - Dialog queue, presenter and the service task owning them
//! - [`console`] - Command parsing and output surfaces of the terminal front end
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`), logs go to stderr

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use tokio::{fs::File, io::BufReader};

use crate::{
    config::{Config, OutputFormat},
    dialogs::{DialogService, ServiceSettings},
};

mod config;
mod console;
mod dialogs;

/// Command-line arguments of alertbox.
///
/// # Examples
///
/// ```bash
/// alertbox --config alertbox.yaml --script demo.txt
/// ```
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    ///
    /// A missing file is not an error; defaults and `ALERTBOX_` environment
    /// variables apply.
    #[arg(short, long, default_value = "alertbox.yaml")]
    config: String,

    /// Read console commands from this file instead of stdin.
    #[arg(short, long)]
    script: Option<String>,

    /// Output format, overrides `console.format` from the configuration.
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
}

/// Main entry point of alertbox.
///
/// 1. **Logging Setup**: `info` level by default, overridable with `RUST_LOG`
/// 2. **Configuration Loading**: YAML file plus environment overrides
/// 3. **Dialog Service**: Spawned on its own task
/// 4. **Console**: Reads commands until end of input or `quit`, then waits
///    for the service to decline whatever is still pending
#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("Starting alertbox {}...", env!("CARGO_PKG_VERSION"));

    // Parse command line arguments
    let args = Args::parse();

    let mut config: Config = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load config file: {}", e);
            return;
        }
    };
    if let Some(format) = args.format {
        config.console.format = format;
    }

    let (controller, overlay, service) =
        DialogService::spawn(ServiceSettings::from(&config.dialogs));

    match &args.script {
        Some(path) => {
            let file = match File::open(path).await {
                Ok(file) => file,
                Err(e) => {
                    error!("Failed to open script {}: {}", path, e);
                    controller.shutdown();
                    return;
                }
            };
            console::run_on_stdout(&config.console, controller, overlay, BufReader::new(file))
                .await;
        }
        None => {
            console::run_on_stdout(&config.console, controller, overlay, console::stdin()).await;
        }
    }

    if let Err(e) = service.await {
        error!("Dialog service task failed: {}", e);
    }
}
