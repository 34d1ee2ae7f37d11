/*
 * Native side of the dialog bridge. On Windows the dialogs are the common
 * file dialogs and the shell folder browser, and taskbar progress goes through
 * `ITaskbarList3`; on other targets every dialog request fails and taskbar
 * calls report that no taskbar is available. The window registry maps the
 * opaque window ids used by callers to native handles on all targets.
 */
#[cfg(windows)]
pub(crate) mod com_apartment;
#[cfg(windows)]
pub mod dialog_handler;
pub mod error;
#[cfg(windows)]
pub mod taskbar_handler;
#[cfg(not(windows))]
pub mod unsupported;
pub mod window_registry;

use crate::core::invoker::{NativeDialogOperations, WindowHandleResolver};
use crate::core::taskbar::TaskbarOperations;
use std::sync::Arc;

pub use error::{PlatformError, Result as PlatformResult};
pub use window_registry::WindowRegistry;

/// The native dialog backend for the target platform.
pub fn default_native_dialogs() -> Arc<dyn NativeDialogOperations> {
    #[cfg(windows)]
    {
        Arc::new(dialog_handler::Win32CommonDialogs::new())
    }
    #[cfg(not(windows))]
    {
        Arc::new(unsupported::UnsupportedDialogs)
    }
}

/// The taskbar service for the target platform, resolving windows through `windows`.
pub fn default_taskbar(windows: Arc<dyn WindowHandleResolver>) -> Arc<dyn TaskbarOperations> {
    #[cfg(windows)]
    {
        Arc::new(taskbar_handler::Win32Taskbar::new(windows))
    }
    #[cfg(not(windows))]
    {
        log::debug!("Platform: No taskbar integration on this target.");
        drop(windows);
        Arc::new(crate::core::taskbar::UnavailableTaskbar)
    }
}
