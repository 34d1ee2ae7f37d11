/*
 * Win32 implementation of the native dialog boundary. Open and save requests
 * use the common file dialogs (`GetOpenFileNameW` / `GetSaveFileNameW`) with
 * the caller-prepared filter and selection buffers; folder requests use the
 * shell's `SHBrowseForFolderW`, pre-selecting the initial folder from the
 * browse callback once the dialog is initialized.
 *
 * These functions block until the user closes the dialog, which is why they
 * are only ever called from a request's worker thread.
 */
use crate::core::error::{DialogError, Result};
use crate::core::invoker::{
    CANCELLED_BY_USER, FileDialogCall, FolderDialogCall, NativeDialogOperations, NativeOutcome,
};
use crate::core::types::{DialogFlags, DialogMode, NativeWindowHandle};
use crate::platform_layer::com_apartment::ComApartment;
use crate::platform_layer::error::PlatformError;

use std::ffi::c_void;

use windows::{
    Win32::{
        Foundation::{HWND, LPARAM, MAX_PATH, WPARAM},
        System::Com::CoTaskMemFree,
        UI::Controls::Dialogs::{
            CommDlgExtendedError, GetOpenFileNameW, GetSaveFileNameW, OFN_ALLOWMULTISELECT,
            OFN_EXPLORER, OFN_FILEMUSTEXIST, OFN_HIDEREADONLY, OFN_NOCHANGEDIR,
            OFN_OVERWRITEPROMPT, OFN_PATHMUSTEXIST, OPEN_FILENAME_FLAGS, OPENFILENAMEW,
        },
        UI::Shell::{
            BFFM_INITIALIZED, BFFM_SETSELECTIONW, BIF_USENEWUI, BROWSEINFOW, SHBrowseForFolderW,
            SHGetPathFromIDListW,
        },
        UI::WindowsAndMessaging::SendMessageW,
    },
    core::{PCWSTR, PWSTR},
};

fn owner_hwnd(parent: Option<NativeWindowHandle>) -> HWND {
    HWND(parent.map_or(0, |handle| handle.0) as *mut c_void)
}

fn native_file_flags(mode: DialogMode, flags: DialogFlags) -> OPEN_FILENAME_FLAGS {
    let mut native = OFN_EXPLORER | OFN_HIDEREADONLY;
    if mode == DialogMode::Open && flags.contains(DialogFlags::ALLOW_MULTIPLE) {
        native |= OFN_ALLOWMULTISELECT;
    }
    if flags.contains(DialogFlags::PATH_MUST_EXIST) {
        native |= OFN_PATHMUSTEXIST;
    }
    if flags.contains(DialogFlags::FILE_MUST_EXIST) {
        native |= OFN_FILEMUSTEXIST;
    }
    if flags.contains(DialogFlags::OVERWRITE_PROMPT) {
        native |= OFN_OVERWRITEPROMPT;
    }
    if flags.contains(DialogFlags::NO_CHANGE_DIR) {
        native |= OFN_NOCHANGEDIR;
    }
    native
}

/*
 * Pre-selects the initial folder. `data` is the null-terminated wide path
 * passed through `BROWSEINFOW::lParam`, or 0 when there is none.
 */
unsafe extern "system" fn browse_callback(
    hwnd: HWND,
    msg: u32,
    _lparam: LPARAM,
    data: LPARAM,
) -> i32 {
    if msg == BFFM_INITIALIZED && data.0 != 0 {
        // WPARAM 1: lParam is a path string rather than an item id list.
        unsafe { SendMessageW(hwnd, BFFM_SETSELECTIONW, Some(WPARAM(1)), Some(data)) };
    }
    0
}

#[derive(Debug, Default)]
pub struct Win32CommonDialogs;

impl Win32CommonDialogs {
    pub fn new() -> Self {
        Win32CommonDialogs
    }
}

impl NativeDialogOperations for Win32CommonDialogs {
    fn show_file_dialog(&self, call: &mut FileDialogCall<'_>) -> Result<NativeOutcome> {
        let _com = ComApartment::enter()?;

        let mut ofn = OPENFILENAMEW {
            lStructSize: std::mem::size_of::<OPENFILENAMEW>() as u32,
            hwndOwner: owner_hwnd(call.parent),
            lpstrFilter: call
                .filters
                .map_or(PCWSTR::null(), |filters| PCWSTR(filters.as_ptr())),
            nFilterIndex: call.filter_index,
            lpstrFile: PWSTR(call.selection.as_mut_ptr()),
            nMaxFile: call.selection.len() as u32,
            Flags: native_file_flags(call.mode, call.flags),
            ..Default::default()
        };

        log::debug!(
            "DialogHandler: Showing {} dialog (flags {:?}).",
            call.mode.name(),
            ofn.Flags
        );
        let accepted = match call.mode {
            DialogMode::Save => unsafe { GetSaveFileNameW(&mut ofn) },
            _ => unsafe { GetOpenFileNameW(&mut ofn) },
        }
        .as_bool();
        call.filter_index = ofn.nFilterIndex;

        if accepted {
            log::debug!(
                "DialogHandler: Dialog function succeeded (filter index {}).",
                ofn.nFilterIndex
            );
            return Ok(NativeOutcome::Accepted);
        }
        // CommDlgExtendedError returns 0 if the user cancelled.
        let extended_error = unsafe { CommDlgExtendedError() }.0;
        if extended_error == CANCELLED_BY_USER {
            log::debug!("DialogHandler: Dialog cancelled by user (no error).");
        }
        Ok(NativeOutcome::Dismissed { extended_error })
    }

    fn browse_for_folder(&self, call: &mut FolderDialogCall<'_>) -> Result<bool> {
        let _com = ComApartment::enter()?;

        let mut display_name = [0u16; MAX_PATH as usize];
        let info = BROWSEINFOW {
            hwndOwner: owner_hwnd(call.parent),
            pszDisplayName: PWSTR(display_name.as_mut_ptr()),
            ulFlags: BIF_USENEWUI,
            lpfn: Some(browse_callback),
            lParam: LPARAM(call.initial_folder.map_or(0, |folder| folder.as_ptr() as isize)),
            ..Default::default()
        };

        log::debug!("DialogHandler: Showing folder dialog.");
        let item = unsafe { SHBrowseForFolderW(&info) };
        if item.is_null() {
            log::debug!("DialogHandler: Folder dialog closed without a selection.");
            return Ok(false);
        }

        let mut path = [0u16; MAX_PATH as usize];
        let resolved = unsafe { SHGetPathFromIDListW(item, &mut path) }.as_bool();
        unsafe { CoTaskMemFree(Some(item as *const c_void)) };
        if !resolved {
            log::error!("DialogHandler: Chosen shell item has no file system path.");
            return Err(PlatformError::OperationFailed(
                "The chosen item is not a file system folder".to_string(),
            )
            .into());
        }

        let len = path.iter().position(|&c| c == 0).unwrap_or(path.len());
        if len >= call.selection.len() {
            return Err(DialogError::PathTooLong(format!(
                "Chosen folder needs {} characters, buffer holds {}",
                len + 1,
                call.selection.len()
            )));
        }
        call.selection[..len].copy_from_slice(&path[..len]);
        call.selection[len] = 0;
        Ok(true)
    }
}
