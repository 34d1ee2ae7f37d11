/*
 * Public entry points for showing native dialogs without blocking the caller.
 *
 * `DialogService` wires a native backend, a window-handle resolver and a
 * worker spawner into an `AsyncRunner`, and turns the three dialog calls into
 * `RequestArgs`. Each call returns immediately; the result reaches the
 * callback exactly once, normally on the request's worker thread.
 */
use crate::core::config::DialogSettings;
use crate::core::invoker::{DialogInvoker, NativeDialogOperations, WindowHandleResolver};
use crate::core::request::RequestArgs;
use crate::core::request_arena::RequestArena;
use crate::core::runner::{AsyncRunner, ThreadSpawner, WorkerSpawner};
use crate::core::types::{DialogFlags, DialogMode, DialogResult, FilterEntry, WindowId};
use crate::platform_layer;
use std::path::Path;
use std::sync::Arc;

pub struct DialogService {
    runner: AsyncRunner,
    allocation_limit: Option<usize>,
}

impl DialogService {
    /// Service using the platform's native dialogs and one OS thread per request.
    pub fn new(settings: &DialogSettings, windows: Arc<dyn WindowHandleResolver>) -> Self {
        Self::with_backend(
            settings,
            platform_layer::default_native_dialogs(),
            windows,
            Arc::new(ThreadSpawner),
        )
    }

    pub fn with_backend(
        settings: &DialogSettings,
        native: Arc<dyn NativeDialogOperations>,
        windows: Arc<dyn WindowHandleResolver>,
        spawner: Arc<dyn WorkerSpawner>,
    ) -> Self {
        let settings = settings.clone().validated();
        log::debug!(
            "DialogService: Created with path limit {} and allocation limit {:?}.",
            settings.path_limit,
            settings.allocation_limit
        );
        let invoker = Arc::new(DialogInvoker::new(native, windows, settings.path_limit));
        DialogService {
            runner: AsyncRunner::new(invoker, spawner, settings.worker_name_prefix.clone()),
            allocation_limit: settings.allocation_limit,
        }
    }

    /// Number of requests handed to the runner so far.
    pub fn submitted(&self) -> usize {
        self.runner.submitted()
    }

    fn request<F>(&self, mode: DialogMode, callback: F, window: Option<WindowId>) -> RequestArgs
    where
        F: FnOnce(DialogResult) + Send + 'static,
    {
        RequestArgs::new(mode, callback)
            .with_parent(window)
            .with_arena(RequestArena::new(self.allocation_limit))
    }

    pub fn show_open_dialog<F>(
        &self,
        callback: F,
        window: Option<WindowId>,
        filters: &[FilterEntry],
        default_path: Option<&Path>,
        allow_multiple: bool,
    ) where
        F: FnOnce(DialogResult) + Send + 'static,
    {
        let mut flags =
            DialogFlags::PATH_MUST_EXIST | DialogFlags::FILE_MUST_EXIST | DialogFlags::NO_CHANGE_DIR;
        flags.set(DialogFlags::ALLOW_MULTIPLE, allow_multiple);
        let args = self
            .request(DialogMode::Open, callback, window)
            .with_filters(filters)
            .with_default_file(default_path.map(Path::to_path_buf))
            .with_flags(flags);
        self.submit(args);
    }

    pub fn show_save_dialog<F>(
        &self,
        callback: F,
        window: Option<WindowId>,
        filters: &[FilterEntry],
        default_path: Option<&Path>,
    ) where
        F: FnOnce(DialogResult) + Send + 'static,
    {
        let args = self
            .request(DialogMode::Save, callback, window)
            .with_filters(filters)
            .with_default_file(default_path.map(Path::to_path_buf))
            .with_flags(
                DialogFlags::PATH_MUST_EXIST
                    | DialogFlags::OVERWRITE_PROMPT
                    | DialogFlags::NO_CHANGE_DIR,
            );
        self.submit(args);
    }

    /*
     * Shows a folder picker. The native folder browser selects a single
     * folder, so `allow_multiple` is accepted for API symmetry only.
     */
    pub fn show_folder_dialog<F>(
        &self,
        callback: F,
        window: Option<WindowId>,
        default_path: Option<&Path>,
        allow_multiple: bool,
    ) where
        F: FnOnce(DialogResult) + Send + 'static,
    {
        let mut flags = DialogFlags::empty();
        flags.set(DialogFlags::ALLOW_MULTIPLE, allow_multiple);
        let args = self
            .request(DialogMode::BrowseFolder, callback, window)
            .with_default_folder(default_path.map(Path::to_path_buf))
            .with_flags(flags);
        self.submit(args);
    }

    /// Submits a fully prepared request.
    pub fn submit(&self, args: RequestArgs) {
        log::trace!("DialogService: Submitting {} request.", args.mode.name());
        self.runner.submit(args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{DialogError, Result};
    use crate::core::invoker::{FileDialogCall, FolderDialogCall, NativeOutcome};
    use crate::core::types::NativeWindowHandle;
    use crate::platform_layer::WindowRegistry;
    use std::io;
    use std::sync::Mutex;
    use std::sync::mpsc;
    use std::time::Duration;

    // --- Mock Structures ---

    #[derive(Debug, Clone, PartialEq)]
    struct SeenFileCall {
        mode: DialogMode,
        parent: Option<NativeWindowHandle>,
        flags: DialogFlags,
        has_filters: bool,
        default_text: String,
    }

    // Accepts every dialog with `answer` and remembers what it was asked for.
    struct RecordingNativeDialogs {
        answer: String,
        file_calls: Mutex<Vec<SeenFileCall>>,
        initial_folders: Mutex<Vec<Option<String>>>,
    }

    impl RecordingNativeDialogs {
        fn answering(answer: &str) -> Arc<Self> {
            Arc::new(RecordingNativeDialogs {
                answer: answer.to_string(),
                file_calls: Mutex::new(Vec::new()),
                initial_folders: Mutex::new(Vec::new()),
            })
        }
    }

    fn until_terminator(units: &[u16]) -> String {
        let len = units.iter().position(|&c| c == 0).unwrap_or(units.len());
        String::from_utf16_lossy(&units[..len])
    }

    impl NativeDialogOperations for RecordingNativeDialogs {
        fn show_file_dialog(&self, call: &mut FileDialogCall<'_>) -> Result<NativeOutcome> {
            self.file_calls.lock().unwrap().push(SeenFileCall {
                mode: call.mode,
                parent: call.parent,
                flags: call.flags,
                has_filters: call.filters.is_some(),
                default_text: until_terminator(call.selection),
            });
            call.selection.fill(0);
            let units: Vec<u16> = self.answer.encode_utf16().collect();
            call.selection[..units.len()].copy_from_slice(&units);
            call.filter_index = 1;
            Ok(NativeOutcome::Accepted)
        }

        fn browse_for_folder(&self, call: &mut FolderDialogCall<'_>) -> Result<bool> {
            self.initial_folders
                .lock()
                .unwrap()
                .push(call.initial_folder.map(until_terminator));
            let units: Vec<u16> = self.answer.encode_utf16().collect();
            call.selection[..units.len()].copy_from_slice(&units);
            Ok(true)
        }
    }

    struct InlineSpawner;

    impl WorkerSpawner for InlineSpawner {
        fn spawn_detached(
            &self,
            _name: String,
            task: crate::core::runner::WorkerTask,
        ) -> io::Result<()> {
            task();
            Ok(())
        }
    }

    fn service_with(
        settings: &DialogSettings,
        native: Arc<RecordingNativeDialogs>,
        windows: Arc<WindowRegistry>,
    ) -> DialogService {
        DialogService::with_backend(settings, native, windows, Arc::new(InlineSpawner))
    }

    #[test]
    fn test_open_dialog_passes_parent_filters_and_multi_select() {
        // Arrange
        crate::initialize_logging();
        let native = RecordingNativeDialogs::answering("C:\\pics\0a.png\0b.png");
        let windows = Arc::new(WindowRegistry::new());
        let window = windows.register(NativeWindowHandle(0x42)).unwrap();
        let service = service_with(&DialogSettings::default(), native.clone(), windows);
        let (tx, rx) = mpsc::channel();
        let filters = [FilterEntry::new("Images", "png;jpg")];

        // Act
        service.show_open_dialog(
            move |result| tx.send(result).unwrap(),
            Some(window),
            &filters,
            Some(Path::new("C:\\start.png")),
            true,
        );

        // Assert
        let calls = native.file_calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].mode, DialogMode::Open);
        assert_eq!(calls[0].parent, Some(NativeWindowHandle(0x42)));
        assert!(calls[0].has_filters);
        assert!(calls[0].flags.contains(DialogFlags::ALLOW_MULTIPLE));
        assert!(calls[0].flags.contains(DialogFlags::FILE_MUST_EXIST));
        assert_eq!(calls[0].default_text, "C:\\start.png");
        assert_eq!(service.submitted(), 1);

        let result = rx.try_recv().unwrap();
        assert_eq!(
            result.paths(),
            Some(&["C:\\pics\\a.png".to_string(), "C:\\pics\\b.png".to_string()][..])
        );
        assert_eq!(result.filter_index(), 0);
    }

    #[test]
    fn test_save_dialog_asks_before_overwriting() {
        let native = RecordingNativeDialogs::answering("C:\\out.txt");
        let service = service_with(
            &DialogSettings::default(),
            native.clone(),
            Arc::new(WindowRegistry::new()),
        );
        let (tx, rx) = mpsc::channel();

        service.show_save_dialog(move |result| tx.send(result).unwrap(), None, &[], None);

        let calls = native.file_calls.lock().unwrap().clone();
        assert_eq!(calls[0].mode, DialogMode::Save);
        assert!(calls[0].flags.contains(DialogFlags::OVERWRITE_PROMPT));
        assert!(!calls[0].flags.contains(DialogFlags::ALLOW_MULTIPLE));
        assert!(!calls[0].has_filters);
        let result = rx.try_recv().unwrap();
        assert_eq!(result.paths(), Some(&["C:\\out.txt".to_string()][..]));
    }

    #[test]
    fn test_folder_dialog_starts_in_default_path() {
        let native = RecordingNativeDialogs::answering("D:\\Projects");
        let service = service_with(
            &DialogSettings::default(),
            native.clone(),
            Arc::new(WindowRegistry::new()),
        );
        let (tx, rx) = mpsc::channel();

        service.show_folder_dialog(
            move |result| tx.send(result).unwrap(),
            None,
            Some(Path::new("D:\\")),
            true,
        );

        assert_eq!(
            native.initial_folders.lock().unwrap().as_slice(),
            &[Some("D:\\".to_string())]
        );
        let result = rx.try_recv().unwrap();
        assert_eq!(result.paths(), Some(&["D:\\Projects".to_string()][..]));
        assert_eq!(result.filter_index(), -1);
    }

    #[test]
    fn test_allocation_limit_from_settings_applies_per_request() {
        let settings = DialogSettings {
            allocation_limit: Some(16),
            ..DialogSettings::default()
        };
        let native = RecordingNativeDialogs::answering("C:\\never.txt");
        let service = service_with(&settings, native.clone(), Arc::new(WindowRegistry::new()));
        let (tx, rx) = mpsc::channel();
        let tx_second = tx.clone();

        service.show_save_dialog(move |result| tx.send(result).unwrap(), None, &[], None);
        service.show_save_dialog(move |result| tx_second.send(result).unwrap(), None, &[], None);

        for _ in 0..2 {
            let result = rx.try_recv().unwrap();
            assert!(matches!(
                result.error(),
                Some(DialogError::ResourceExhausted(_))
            ));
        }
        assert!(native.file_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unusable_path_limit_falls_back_to_default() {
        // Arrange
        let settings = DialogSettings {
            path_limit: 0,
            ..DialogSettings::default()
        };
        let native = RecordingNativeDialogs::answering("C:\\b.txt");
        let service = service_with(&settings, native.clone(), Arc::new(WindowRegistry::new()));
        let (tx, rx) = mpsc::channel();

        // Act
        service.show_save_dialog(
            move |result| tx.send(result).unwrap(),
            None,
            &[],
            Some(Path::new("C:\\a.txt")),
        );

        // Assert
        let calls = native.file_calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].default_text, "C:\\a.txt");
        let result = rx.try_recv().unwrap();
        assert_eq!(result.paths(), Some(&["C:\\b.txt".to_string()][..]));
    }

    #[test]
    fn test_threaded_service_delivers_on_named_worker() {
        let settings = DialogSettings {
            worker_name_prefix: "picker".to_string(),
            ..DialogSettings::default()
        };
        let service = DialogService::with_backend(
            &settings,
            RecordingNativeDialogs::answering("C:\\a.txt"),
            Arc::new(WindowRegistry::new()),
            Arc::new(ThreadSpawner),
        );
        let (tx, rx) = mpsc::channel();

        service.show_save_dialog(
            move |result| {
                let name = std::thread::current().name().map(str::to_string);
                tx.send((result, name)).unwrap();
            },
            None,
            &[],
            None,
        );

        let (result, name) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(result.paths(), Some(&["C:\\a.txt".to_string()][..]));
        assert_eq!(name.as_deref(), Some("picker-save-1"));
    }
}
