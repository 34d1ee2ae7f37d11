// src/main.rs

use native_dialog_bridge::core::config::DialogSettings;
use native_dialog_bridge::{
    CoreSettingsManager, DialogResult, DialogService, FilterEntry, SettingsManagerOperations,
    WindowRegistry,
};
use std::sync::Arc;
use std::sync::mpsc;

const APP_NAME: &str = "NativeDialogBridge";

fn report(kind: &str, result: DialogResult) {
    match result {
        DialogResult::Succeeded {
            paths,
            filter_index,
        } => {
            println!("{kind}: {} path(s), filter {filter_index}", paths.len());
            for path in paths {
                println!("  {path}");
            }
        }
        DialogResult::Cancelled { filter_index } => {
            println!("{kind}: cancelled (filter {filter_index})");
        }
        DialogResult::Failed(error) => println!("{kind}: failed: {error}"),
    }
}

fn main() {
    let settings = match CoreSettingsManager::new().load_settings(APP_NAME) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Could not load settings, using defaults: {e}");
            DialogSettings::default()
        }
    };
    native_dialog_bridge::initialize_logging_with_level(settings.log_level_filter());
    log::info!("Main: Starting dialog demo with {settings:?}");

    // No host window in the demo; dialogs are shown unparented.
    let service = DialogService::new(&settings, Arc::new(WindowRegistry::new()));
    let filters = [
        FilterEntry::new("Text files", "txt;md"),
        FilterEntry::new("Rust sources", "rs"),
        FilterEntry::new("All files", "*"),
    ];

    let (tx, rx) = mpsc::channel();
    let open_tx = tx.clone();
    service.show_open_dialog(
        move |result| {
            let _ = open_tx.send(("Open", result));
        },
        None,
        &filters,
        None,
        true,
    );
    let (kind, result) = match rx.recv() {
        Ok(delivered) => delivered,
        Err(e) => {
            log::error!("Main: Open dialog result was lost: {e}");
            return;
        }
    };
    report(kind, result);

    service.show_folder_dialog(
        move |result| {
            let _ = tx.send(("Folder", result));
        },
        None,
        None,
        false,
    );
    match rx.recv() {
        Ok((kind, result)) => report(kind, result),
        Err(e) => log::error!("Main: Folder dialog result was lost: {e}"),
    }
}
