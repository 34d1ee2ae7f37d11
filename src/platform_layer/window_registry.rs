/*
 * Maps the opaque `WindowId`s handed to callers onto the native handles that
 * parent dialogs and own taskbar buttons. The host registers its top-level
 * windows once and then refers to them only by id; worker threads resolve the
 * id at the moment a dialog is shown.
 */
use crate::core::invoker::WindowHandleResolver;
use crate::core::types::{NativeWindowHandle, WindowId};
use crate::platform_layer::error::{PlatformError, Result as PlatformResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

#[derive(Debug)]
pub struct WindowRegistry {
    windows: RwLock<HashMap<WindowId, NativeWindowHandle>>,
    next_window_id: AtomicUsize,
}

impl Default for WindowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowRegistry {
    pub fn new() -> Self {
        WindowRegistry {
            windows: RwLock::new(HashMap::new()),
            next_window_id: AtomicUsize::new(1),
        }
    }

    /// Registers a native handle and returns the id callers use for it.
    pub fn register(&self, handle: NativeWindowHandle) -> PlatformResult<WindowId> {
        if handle.is_invalid() {
            log::warn!("WindowRegistry: Refusing to register an invalid native handle.");
            return Err(PlatformError::InvalidHandle(
                "Cannot register a null window handle".to_string(),
            ));
        }
        let id = WindowId(self.next_window_id.fetch_add(1, Ordering::Relaxed));
        self.windows
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, handle);
        log::debug!("WindowRegistry: Registered {:?} as {:?}", handle, id);
        Ok(id)
    }

    /// Forgets a window, e.g. when it is destroyed. Returns its last handle.
    pub fn unregister(&self, window: WindowId) -> Option<NativeWindowHandle> {
        let removed = self
            .windows
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&window);
        if removed.is_none() {
            log::warn!("WindowRegistry: {:?} was not registered.", window);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.windows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WindowHandleResolver for WindowRegistry {
    fn resolve(&self, window: WindowId) -> Option<NativeWindowHandle> {
        self.windows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&window)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_register_then_resolve() {
        // Arrange
        let registry = WindowRegistry::new();

        // Act
        let first = registry.register(NativeWindowHandle(0x1234)).unwrap();
        let second = registry.register(NativeWindowHandle(0x5678)).unwrap();

        // Assert
        assert_ne!(first, second);
        assert_eq!(registry.resolve(first), Some(NativeWindowHandle(0x1234)));
        assert_eq!(registry.resolve(second), Some(NativeWindowHandle(0x5678)));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_invalid_handle_is_rejected() {
        let registry = WindowRegistry::new();

        let result = registry.register(NativeWindowHandle(0));

        assert!(matches!(result, Err(PlatformError::InvalidHandle(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregistered_window_no_longer_resolves() {
        let registry = WindowRegistry::new();
        let id = registry.register(NativeWindowHandle(42)).unwrap();

        assert_eq!(registry.unregister(id), Some(NativeWindowHandle(42)));
        assert_eq!(registry.resolve(id), None);
        assert_eq!(registry.unregister(id), None);
    }

    #[test]
    fn test_resolve_from_worker_threads() {
        let registry = Arc::new(WindowRegistry::new());
        let id = registry.register(NativeWindowHandle(7)).unwrap();

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.resolve(id))
            })
            .collect();

        for worker in workers {
            assert_eq!(worker.join().unwrap(), Some(NativeWindowHandle(7)));
        }
    }
}
