/*
 * Platform-agnostic core of the dialog bridge: filter encoding, selection
 * decoding, the dialog invoker that drives one request through the native
 * boundary, the runner that puts each request on its own worker thread, and
 * the per-request memory accounting they share. Native dialog and taskbar
 * access are reached only through the `NativeDialogOperations`,
 * `WindowHandleResolver` and `TaskbarOperations` traits, implemented by
 * `platform_layer`.
 */
pub mod config;
pub mod error;
pub mod filter_encoder;
pub mod invoker;
pub mod path_utils;
pub mod request;
pub mod request_arena;
pub mod result_decoder;
pub mod runner;
pub mod taskbar;
pub mod types;
pub mod wide_buffer;

pub use config::{CoreSettingsManager, DialogSettings, SettingsError, SettingsManagerOperations};
pub use error::{DialogError, Result};
pub use filter_encoder::encode_filters;
pub use invoker::{
    DialogInvoker, FileDialogCall, FolderDialogCall, NativeDialogOperations, NativeOutcome,
    WindowHandleResolver,
};
pub use request::RequestArgs;
pub use request_arena::RequestArena;
pub use result_decoder::{decode_selection, map_filter_index};
pub use runner::{AsyncRunner, ThreadSpawner, WorkerSpawner};
pub use taskbar::{TaskbarOperations, TaskbarState, UnavailableTaskbar};
pub use types::{
    DialogCallback, DialogFlags, DialogMode, DialogResult, FilterEntry, NativeWindowHandle,
    WindowId,
};
