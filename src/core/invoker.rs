/*
 * Runs one native dialog call for a request and delivers its result.
 *
 * A request moves through `Idle -> FilterEncoded -> NativeCallPending ->
 * ResultDecoded | Failed -> Delivered`. Every path ends in exactly one
 * delivery: the fallible steps are collected into a single `Result`, and the
 * request's `ResultDelivery` is consumed once that result is known. All
 * buffers are scoped to the invocation and released on every exit path.
 *
 * The native calls themselves sit behind `NativeDialogOperations`, so the
 * invoker is the same on every target and can be driven by a scripted backend
 * in tests.
 */
use crate::core::error::{DialogError, Result};
use crate::core::filter_encoder;
use crate::core::request::RequestArgs;
use crate::core::request_arena::{ArenaLease, RequestArena};
use crate::core::result_decoder::{self, DecodedPaths};
use crate::core::types::{
    DialogFlags, DialogMode, DialogResult, FilterEntry, NativeWindowHandle, WindowId,
    active_filters,
};
use crate::core::wide_buffer::{SelectionBuffer, wide_path};
use std::path::Path;
use std::sync::Arc;

/// Native error code reported when the user dismissed the dialog.
pub const CANCELLED_BY_USER: u32 = 0;

/// Filter index reported by dialogs with no filter concept.
pub const NO_FILTER_INDEX: i32 = -1;

/*
 * Resolves an opaque window reference to the native handle that parents the
 * dialog. Returning `None` leaves the dialog unparented.
 */
pub trait WindowHandleResolver: Send + Sync {
    fn resolve(&self, window: WindowId) -> Option<NativeWindowHandle>;
}

/*
 * Parameters for one native open/save call. The backend writes the chosen
 * path(s) into `selection` and the 1-based filter index into `filter_index`.
 */
#[derive(Debug)]
pub struct FileDialogCall<'a> {
    pub mode: DialogMode,
    pub parent: Option<NativeWindowHandle>,
    /// Encoded filter list, or `None` for no filter restriction.
    pub filters: Option<&'a [u16]>,
    pub selection: &'a mut [u16],
    pub flags: DialogFlags,
    pub filter_index: u32,
}

/*
 * Parameters for one native folder-browse call. `initial_folder` is
 * null-terminated. The backend writes the chosen folder into `selection`.
 */
#[derive(Debug)]
pub struct FolderDialogCall<'a> {
    pub parent: Option<NativeWindowHandle>,
    pub initial_folder: Option<&'a [u16]>,
    pub selection: &'a mut [u16],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeOutcome {
    /// The user confirmed a selection.
    Accepted,
    /// The dialog closed without a selection; code 0 means the user cancelled.
    Dismissed { extended_error: u32 },
}

pub trait NativeDialogOperations: Send + Sync {
    fn show_file_dialog(&self, call: &mut FileDialogCall<'_>) -> Result<NativeOutcome>;

    /// Returns `true` when a folder was chosen and written to `call.selection`.
    fn browse_for_folder(&self, call: &mut FolderDialogCall<'_>) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InvocationState {
    Idle,
    FilterEncoded,
    NativeCallPending,
    ResultDecoded,
    Failed,
    Delivered,
}

struct Invocation {
    mode: DialogMode,
    state: InvocationState,
}

impl Invocation {
    fn new(mode: DialogMode) -> Self {
        Invocation {
            mode,
            state: InvocationState::Idle,
        }
    }

    fn advance(&mut self, next: InvocationState) {
        log::trace!(
            "DialogInvoker: {} request {:?} -> {:?}",
            self.mode.name(),
            self.state,
            next
        );
        self.state = next;
    }
}

// What a completed native call produced, before it becomes a `DialogResult`.
enum Completion {
    Selected {
        decoded: DecodedPaths,
        filter_index: i32,
    },
    Cancelled {
        filter_index: i32,
    },
}

pub struct DialogInvoker {
    native: Arc<dyn NativeDialogOperations>,
    windows: Arc<dyn WindowHandleResolver>,
    path_limit: usize,
}

impl DialogInvoker {
    pub fn new(
        native: Arc<dyn NativeDialogOperations>,
        windows: Arc<dyn WindowHandleResolver>,
        path_limit: usize,
    ) -> Self {
        DialogInvoker {
            native,
            windows,
            path_limit,
        }
    }

    /// Runs the request according to its mode and delivers the result.
    pub fn run(&self, args: RequestArgs) {
        match args.mode {
            DialogMode::Open | DialogMode::Save => self.run_file_dialog(args),
            DialogMode::BrowseFolder => self.run_browse_folder(args),
        }
    }

    pub fn run_open(&self, mut args: RequestArgs) {
        args.mode = DialogMode::Open;
        self.run_file_dialog(args);
    }

    pub fn run_save(&self, mut args: RequestArgs) {
        args.mode = DialogMode::Save;
        self.run_file_dialog(args);
    }

    fn run_file_dialog(&self, args: RequestArgs) {
        let RequestArgs {
            mode,
            filters,
            default_file,
            default_folder,
            parent,
            flags,
            arena,
            delivery,
        } = args;
        let mut invocation = Invocation::new(mode);

        let parent_handle = self.resolve_parent(parent);
        let default_location = default_file.or(default_folder);
        let outcome = self.show_file_dialog(
            &mut invocation,
            &filters,
            default_location.as_deref(),
            parent_handle,
            flags,
            &arena,
        );

        let (result, lease) = finish(&mut invocation, outcome);
        delivery.deliver(result);
        invocation.advance(InvocationState::Delivered);
        // The decoded paths are accounted until the callback has returned.
        drop(lease);
    }

    pub fn run_browse_folder(&self, args: RequestArgs) {
        let RequestArgs {
            mode,
            default_file,
            default_folder,
            parent,
            flags,
            arena,
            delivery,
            ..
        } = args;
        let mut invocation = Invocation::new(mode);

        if flags.contains(DialogFlags::ALLOW_MULTIPLE) {
            log::debug!("DialogInvoker: Folder dialog ignores multiple selection.");
        }
        let parent_handle = self.resolve_parent(parent);
        let initial_folder = default_folder.or(default_file);
        let outcome = self.browse_for_folder(
            &mut invocation,
            initial_folder.as_deref(),
            parent_handle,
            &arena,
        );

        let (result, lease) = finish(&mut invocation, outcome);
        delivery.deliver(result);
        invocation.advance(InvocationState::Delivered);
        drop(lease);
    }

    fn resolve_parent(&self, window: Option<WindowId>) -> Option<NativeWindowHandle> {
        let window = window?;
        let handle = self.windows.resolve(window);
        if handle.is_none() {
            log::warn!(
                "DialogInvoker: No native handle for {:?}; showing dialog without a parent.",
                window
            );
        }
        handle
    }

    fn show_file_dialog(
        &self,
        invocation: &mut Invocation,
        filters: &[FilterEntry],
        default_location: Option<&Path>,
        parent: Option<NativeWindowHandle>,
        flags: DialogFlags,
        arena: &RequestArena,
    ) -> Result<Completion> {
        let filter_buffer = filter_encoder::encode_filters(filters, arena)?;
        invocation.advance(InvocationState::FilterEncoded);

        let mut selection = SelectionBuffer::zeroed(arena, self.path_limit)?;
        if let Some(location) = default_location {
            selection.write_default(&wide_path(location)?)?;
        }

        let has_filters = !active_filters(filters).is_empty();
        let mut call = FileDialogCall {
            mode: invocation.mode,
            parent,
            filters: has_filters.then(|| filter_buffer.as_slice()),
            selection: selection.as_mut_slice(),
            flags,
            filter_index: 0,
        };
        invocation.advance(InvocationState::NativeCallPending);
        let outcome = self.native.show_file_dialog(&mut call)?;
        let native_index = call.filter_index;
        drop(filter_buffer);

        let filter_index = result_decoder::map_filter_index(native_index, filters);
        match outcome {
            NativeOutcome::Accepted => {
                let decoded = result_decoder::decode_selection(
                    selection.as_slice(),
                    flags.contains(DialogFlags::ALLOW_MULTIPLE),
                    self.path_limit,
                    arena,
                )?;
                Ok(Completion::Selected {
                    decoded,
                    filter_index,
                })
            }
            NativeOutcome::Dismissed {
                extended_error: CANCELLED_BY_USER,
            } => {
                log::debug!("DialogInvoker: Dialog cancelled by user (no error).");
                Ok(Completion::Cancelled { filter_index })
            }
            NativeOutcome::Dismissed { extended_error } => {
                log::error!(
                    "DialogInvoker: Dialog function failed. CommDlgExtendedError: {extended_error}"
                );
                Err(DialogError::NativeCallFailed(format!(
                    "Windows error, CommDlgExtendedError: {extended_error}"
                )))
            }
        }
    }

    fn browse_for_folder(
        &self,
        invocation: &mut Invocation,
        initial_folder: Option<&Path>,
        parent: Option<NativeWindowHandle>,
        arena: &RequestArena,
    ) -> Result<Completion> {
        let mut selection = SelectionBuffer::zeroed(arena, self.path_limit)?;
        let initial_units = initial_folder
            .map(terminated_wide_path)
            .transpose()?;

        let mut call = FolderDialogCall {
            parent,
            initial_folder: initial_units.as_deref(),
            selection: selection.as_mut_slice(),
        };
        invocation.advance(InvocationState::NativeCallPending);
        let chosen = self.native.browse_for_folder(&mut call)?;

        if !chosen {
            log::debug!("DialogInvoker: Folder dialog closed without a selection.");
            return Ok(Completion::Cancelled {
                filter_index: NO_FILTER_INDEX,
            });
        }
        let decoded = result_decoder::decode_single(selection.as_slice(), self.path_limit, arena)?;
        Ok(Completion::Selected {
            decoded,
            filter_index: NO_FILTER_INDEX,
        })
    }
}

fn terminated_wide_path(path: &Path) -> Result<Vec<u16>> {
    let mut units = wide_path(path)?;
    units.push(0);
    Ok(units)
}

/*
 * Turns the outcome of an invocation into the result to deliver, handing back
 * the lease of any decoded paths so the caller can release it after delivery.
 */
fn finish(
    invocation: &mut Invocation,
    outcome: Result<Completion>,
) -> (DialogResult, Option<ArenaLease>) {
    match outcome {
        Ok(Completion::Selected {
            decoded,
            filter_index,
        }) => {
            invocation.advance(InvocationState::ResultDecoded);
            let (paths, lease) = decoded.into_parts();
            let result = if paths.is_empty() {
                DialogResult::Cancelled { filter_index }
            } else {
                DialogResult::Succeeded {
                    paths,
                    filter_index,
                }
            };
            (result, Some(lease))
        }
        Ok(Completion::Cancelled { filter_index }) => {
            invocation.advance(InvocationState::ResultDecoded);
            (DialogResult::Cancelled { filter_index }, None)
        }
        Err(error) => {
            invocation.advance(InvocationState::Failed);
            log::error!(
                "DialogInvoker: {} request failed: {error}",
                invocation.mode.name()
            );
            (DialogResult::Failed(error), None)
        }
    }
}

#[cfg(test)]
#[path = "invoker_tests.rs"]
mod invoker_tests;
