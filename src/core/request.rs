/*
 * One in-flight dialog request and the one-shot delivery of its result.
 *
 * `RequestArgs` is built by the public entry points, moved into exactly one
 * worker, and dropped by that worker once the callback has returned.
 * `ResultDelivery` owns the callback: delivering consumes it, and if it is
 * dropped without having delivered (an unwinding worker, a request that was
 * never run) it reports a failure instead, so every request produces exactly
 * one callback invocation.
 */
use crate::core::error::DialogError;
use crate::core::request_arena::RequestArena;
use crate::core::types::{
    DialogCallback, DialogFlags, DialogMode, DialogResult, FilterEntry, WindowId,
};
use std::path::PathBuf;

pub struct ResultDelivery {
    mode: DialogMode,
    callback: Option<DialogCallback>,
}

impl ResultDelivery {
    pub fn new(mode: DialogMode, callback: DialogCallback) -> Self {
        ResultDelivery {
            mode,
            callback: Some(callback),
        }
    }

    pub fn deliver(mut self, result: DialogResult) {
        if let Some(callback) = self.callback.take() {
            log::debug!(
                "ResultDelivery: Delivering {} result: {:?}",
                self.mode.name(),
                result
            );
            callback(result);
        }
    }
}

impl Drop for ResultDelivery {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            log::error!(
                "ResultDelivery: {} request ended without a result; reporting failure.",
                self.mode.name()
            );
            callback(DialogResult::Failed(DialogError::NativeCallFailed(
                "Dialog worker ended without producing a result".to_string(),
            )));
        }
    }
}

impl std::fmt::Debug for ResultDelivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultDelivery")
            .field("mode", &self.mode)
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

#[derive(Debug)]
pub struct RequestArgs {
    pub mode: DialogMode,
    pub filters: Vec<FilterEntry>,
    pub default_file: Option<PathBuf>,
    pub default_folder: Option<PathBuf>,
    pub parent: Option<WindowId>,
    pub flags: DialogFlags,
    pub arena: RequestArena,
    pub(crate) delivery: ResultDelivery,
}

impl RequestArgs {
    pub fn new<F>(mode: DialogMode, callback: F) -> Self
    where
        F: FnOnce(DialogResult) + Send + 'static,
    {
        RequestArgs {
            mode,
            filters: Vec::new(),
            default_file: None,
            default_folder: None,
            parent: None,
            flags: DialogFlags::empty(),
            arena: RequestArena::unbounded(),
            delivery: ResultDelivery::new(mode, Box::new(callback)),
        }
    }

    pub fn with_filters(mut self, filters: &[FilterEntry]) -> Self {
        self.filters = filters.to_vec();
        self
    }

    pub fn with_default_file(mut self, path: Option<PathBuf>) -> Self {
        self.default_file = path;
        self
    }

    pub fn with_default_folder(mut self, path: Option<PathBuf>) -> Self {
        self.default_folder = path;
        self
    }

    pub fn with_parent(mut self, window: Option<WindowId>) -> Self {
        self.parent = window;
        self
    }

    pub fn with_flags(mut self, flags: DialogFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_arena(mut self, arena: RequestArena) -> Self {
        self.arena = arena;
        self
    }

    /// Ends the request with `error` without running it.
    pub fn fail(self, error: DialogError) {
        self.delivery.deliver(DialogResult::Failed(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording_callback() -> (
        Arc<Mutex<Vec<DialogResult>>>,
        impl FnOnce(DialogResult) + Send + 'static,
    ) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        (received, move |result| sink.lock().unwrap().push(result))
    }

    #[test]
    fn test_deliver_invokes_callback_once() {
        let (received, callback) = recording_callback();
        let delivery = ResultDelivery::new(DialogMode::Open, Box::new(callback));

        delivery.deliver(DialogResult::Cancelled { filter_index: 0 });

        let received = received.lock().unwrap();
        assert_eq!(received.as_slice(), &[DialogResult::Cancelled { filter_index: 0 }]);
    }

    #[test]
    fn test_dropped_request_reports_failure() {
        // Arrange
        let (received, callback) = recording_callback();
        let args = RequestArgs::new(DialogMode::Save, callback);

        // Act
        drop(args);

        // Assert
        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert!(received[0].paths().is_none());
        assert_eq!(received[0].filter_index(), -1);
    }

    #[test]
    fn test_fail_delivers_given_error() {
        let (received, callback) = recording_callback();
        let args = RequestArgs::new(DialogMode::BrowseFolder, callback);

        args.fail(DialogError::WorkerSpawnFailed("no threads".to_string()));

        let received = received.lock().unwrap();
        assert_eq!(
            received.as_slice(),
            &[DialogResult::Failed(DialogError::WorkerSpawnFailed(
                "no threads".to_string()
            ))]
        );
    }
}
