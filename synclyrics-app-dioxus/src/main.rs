#![cfg_attr(feature = "bundle", windows_subsystem = "windows")]
mod app;
mod bridge;
mod components;
mod state;

use crate::app::App;
use crate::bridge::use_display_bridge;
use crate::state::LyricsState;
use dioxus::desktop::{LogicalSize, WindowBuilder};
use dioxus::prelude::*;
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use synclyrics_client::{LyricsSocket, WebSocketConfig, WEBSOCKET_CONFIG_TEMPLATE};
use synclyrics_core::{
    build_config_template, CoreError, DisplayCommand, EngineHandle, Session, SyncEngine,
    SyncLyricsConfig, TokioClock, TomlParseError,
};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const APP_NAME: &str = "SyncLyrics";

/// Transport sections appended to the generated config file
const TRANSPORT_TEMPLATES: &[&str] = &[WEBSOCKET_CONFIG_TEMPLATE];

fn main() {
    // Tracing comes first so config loading can log
    let file_logging_enabled = check_file_logging_enabled();
    init_tracing(file_logging_enabled);

    let config = match SyncLyricsConfig::load_or_create(Some(TRANSPORT_TEMPLATES)) {
        Ok(config) => config,
        Err(CoreError::ConfigNotFound { path }) => {
            show_new_config_dialog(&path);
            SyncLyricsConfig::default()
        }
        Err(CoreError::ConfigParseError(parse_error)) => {
            show_config_parse_error_dialog(&parse_error, &SyncLyricsConfig::config_path());
            std::process::exit(1);
        }
        Err(e) => {
            error!("{e}");
            show_generic_error_dialog(&e.to_string());
            std::process::exit(1);
        }
    };

    let websocket_config = match load_websocket_config(&config) {
        Ok(websocket_config) => websocket_config,
        Err(e) => {
            error!("{e}");
            show_config_error_dialog(&e, &SyncLyricsConfig::config_path());
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Cannot start the async runtime: {e}");
            std::process::exit(1);
        }
    };

    // Ctrl+C and window close both fire this
    let cancel_token = CancellationToken::new();

    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Ctrl+C received, shutting down");
        ctrlc_token.cancel();
    }) {
        warn!("Ctrl+C handler not installed: {e}");
    }

    let session = Session::new(Arc::new(TokioClock), config.sync.auto_offset_secs());
    let (engine, engine_handle) = SyncEngine::new(
        session,
        config.ui.animation.frame_interval(),
        cancel_token.clone(),
    );
    let display_tx = engine.display_sender();

    let socket = Arc::new(LyricsSocket::new(
        &websocket_config,
        engine_handle.clone(),
        Some(cancel_token.clone()),
    ));

    runtime.spawn(async move {
        let session = engine.run().await;
        info!(
            "Sync engine stopped (manual offset {:+.2}s)",
            session.estimator().offsets().manual
        );
    });
    runtime.spawn(async move {
        info!("Connecting to {}", websocket_config.url);
        if let Err(e) = socket.start().await {
            error!("Websocket task panicked: {e}");
        }
    });

    let window = WindowBuilder::new()
        .with_title(APP_NAME)
        .with_resizable(true)
        .with_inner_size(LogicalSize::new(1280.0, 720.0));

    let dioxus_config = dioxus::desktop::Config::default()
        .with_window(window)
        .with_disable_context_menu(true);

    // Shared with components through use_context
    dioxus::LaunchBuilder::desktop()
        .with_cfg(dioxus_config)
        .with_context(display_tx)
        .with_context(engine_handle)
        .with_context(config.sync)
        .with_context(cancel_token)
        .launch(app);
}

/// Root component: owns the display state and the engine bridge
fn app() -> Element {
    let lyrics = use_context_provider(LyricsState::new);

    let display_tx: broadcast::Sender<DisplayCommand> = use_context();
    let engine: EngineHandle = use_context();
    use_display_bridge(display_tx, engine, lyrics);

    // Closing the window tears down the engine and socket
    let cancel_token: CancellationToken = use_context();
    use_drop(move || cancel_token.cancel());

    rsx! {
        document::Title { "{APP_NAME}" }
        App {}
    }
}

/// Read and validate the websocket section, falling back to defaults when absent
fn load_websocket_config(config: &SyncLyricsConfig) -> Result<WebSocketConfig, CoreError> {
    config.validate()?;
    let websocket_config = WebSocketConfig::from_transports(&config.transport)?.unwrap_or_default();
    websocket_config.validate()?;
    Ok(websocket_config)
}

const OPEN_CONFIG: &str = "Open Config";
const RESET_CONFIG: &str = "Reset Config";

fn dialog(level: MessageLevel, title: &str, body: &str) -> MessageDialog {
    MessageDialog::new()
        .set_level(level)
        .set_title(format!("{APP_NAME} - {title}"))
        .set_description(body)
}

/// Show a two-button dialog and report which custom button was pressed.
fn ask(level: MessageLevel, title: &str, body: &str, yes: &str, no: &str) -> Option<String> {
    let result = dialog(level, title, body)
        .set_buttons(MessageButtons::OkCancelCustom(yes.into(), no.into()))
        .show();
    match result {
        MessageDialogResult::Custom(button) => Some(button),
        _ => None,
    }
}

fn notify(level: MessageLevel, title: &str, body: &str) {
    dialog(level, title, body)
        .set_buttons(MessageButtons::Ok)
        .show();
}

fn open_config(config_path: &Path) {
    if let Err(e) = open::that(config_path) {
        error!("Could not open {}: {e}", config_path.display());
    }
}

fn show_config_error_dialog(error: &CoreError, config_path: &Path) {
    let body = format!("The configuration is invalid:\n\n{error}\n\nFix it and restart {APP_NAME}.");
    if ask(MessageLevel::Error, "Invalid Configuration", &body, OPEN_CONFIG, "Exit").as_deref()
        == Some(OPEN_CONFIG)
    {
        open_config(config_path);
    }
}

fn show_new_config_dialog(config_path: &Path) {
    let body = format!(
        "Created a configuration file at:\n{}\n\n\
        Using the default server for now. Change [transport.websocket] url \
        if the backend runs somewhere else.",
        config_path.display()
    );
    if ask(MessageLevel::Info, "Welcome", &body, OPEN_CONFIG, "Continue").as_deref()
        == Some(OPEN_CONFIG)
    {
        open_config(config_path);
    }
}

/// Offer to open or regenerate a config file that is not valid TOML.
fn show_config_parse_error_dialog(parse_error: &TomlParseError, config_path: &Path) {
    let body = format!(
        "{} could not be read:\n\n{parse_error}\n\n\
        Open it to fix the syntax, or replace it with a fresh template.",
        config_path.display()
    );
    match ask(MessageLevel::Error, "Configuration Error", &body, OPEN_CONFIG, RESET_CONFIG) {
        Some(button) if button == OPEN_CONFIG => open_config(config_path),
        Some(button) if button == RESET_CONFIG => {
            let template = build_config_template(Some(TRANSPORT_TEMPLATES));
            match std::fs::write(config_path, template) {
                Ok(()) => notify(
                    MessageLevel::Info,
                    "Configuration Reset",
                    &format!("Wrote a fresh template. Restart {APP_NAME} to use it."),
                ),
                Err(e) => {
                    error!("Could not reset {}: {e}", config_path.display());
                    notify(
                        MessageLevel::Error,
                        "Reset Failed",
                        &format!("Could not write the template:\n{e}"),
                    );
                }
            }
        }
        _ => {}
    }
}

fn show_generic_error_dialog(error_message: &str) {
    notify(
        MessageLevel::Error,
        "Error",
        &format!("{APP_NAME} could not start:\n\n{error_message}"),
    );
}

/// Peek at `[logging] enabled` before the full config load, so tracing is up
/// before anything else logs. Any read or parse failure means `false`.
fn check_file_logging_enabled() -> bool {
    std::fs::read_to_string(SyncLyricsConfig::config_path())
        .ok()
        .and_then(|content| content.parse::<toml::Table>().ok())
        .and_then(|table| table.get("logging")?.get("enabled")?.as_bool())
        .unwrap_or(false)
}

/// Console logging, plus a plain-text copy in the cache dir when enabled.
fn init_tracing(file_logging_enabled: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tungstenite=warn,tokio_tungstenite=warn"));

    let log_path = synclyrics_core::log_file_path();
    let log_file = file_logging_enabled
        .then(|| {
            if let Some(parent) = log_path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            File::create(&log_path)
                .inspect_err(|e| eprintln!("Cannot log to {}: {e}", log_path.display()))
                .ok()
        })
        .flatten();
    let file_layer = log_file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_writer(Arc::new(file))
            .with_ansi(false)
    });
    let file_missing = file_logging_enabled && file_layer.is_none();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    if file_missing {
        warn!("File logging is enabled but {} could not be created", log_path.display());
    }
}
