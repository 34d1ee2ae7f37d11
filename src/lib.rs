/*
 * Asynchronous native dialog bridge: file-open, file-save and folder dialogs
 * that run on their own worker thread and report back through a callback,
 * plus a taskbar progress service for the same windows.
 *
 * `DialogService` is the entry point. `platform_layer` supplies the native
 * backends and the `WindowRegistry` that maps caller window ids to handles.
 */
pub mod core;
pub mod dialog_service;
pub mod platform_layer;

pub use crate::core::{
    CoreSettingsManager, DialogError, DialogMode, DialogResult, DialogSettings, FilterEntry,
    SettingsManagerOperations, TaskbarOperations, TaskbarState, WindowId,
};
pub use dialog_service::DialogService;
pub use platform_layer::{WindowRegistry, default_taskbar};

use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::sync::Once;

static LOGGING_INIT: Once = Once::new();

/// Installs the terminal logger at the given level. Later calls are no-ops.
pub fn initialize_logging_with_level(level: LevelFilter) {
    LOGGING_INIT.call_once(|| {
        let config = ConfigBuilder::new()
            .set_thread_level(LevelFilter::Debug)
            .set_target_level(LevelFilter::Error)
            .build();
        if TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto).is_err() {
            eprintln!("Logging: A logger was already installed; keeping it.");
        }
    });
}

pub fn initialize_logging() {
    initialize_logging_with_level(LevelFilter::Debug);
}
