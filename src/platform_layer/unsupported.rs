/*
 * Native dialog backend for targets without a supported dialog system. Every
 * request fails with the same error, delivered through the normal callback.
 */
use crate::core::error::{DialogError, Result};
use crate::core::invoker::{
    FileDialogCall, FolderDialogCall, NativeDialogOperations, NativeOutcome,
};

const UNAVAILABLE: &str = "No native dialog system for this platform";

#[derive(Debug, Default)]
pub struct UnsupportedDialogs;

impl NativeDialogOperations for UnsupportedDialogs {
    fn show_file_dialog(&self, call: &mut FileDialogCall<'_>) -> Result<NativeOutcome> {
        log::warn!("UnsupportedDialogs: Cannot show {} dialog.", call.mode.name());
        Err(DialogError::NativeCallFailed(UNAVAILABLE.to_string()))
    }

    fn browse_for_folder(&self, _call: &mut FolderDialogCall<'_>) -> Result<bool> {
        log::warn!("UnsupportedDialogs: Cannot show folder dialog.");
        Err(DialogError::NativeCallFailed(UNAVAILABLE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DialogFlags, DialogMode};

    #[test]
    fn test_every_dialog_kind_fails_the_same_way() {
        let dialogs = UnsupportedDialogs;
        let mut selection = vec![0u16; 16];

        let file = dialogs.show_file_dialog(&mut FileDialogCall {
            mode: DialogMode::Save,
            parent: None,
            filters: None,
            selection: &mut selection,
            flags: DialogFlags::empty(),
            filter_index: 0,
        });
        let folder = dialogs.browse_for_folder(&mut FolderDialogCall {
            parent: None,
            initial_folder: None,
            selection: &mut selection,
        });

        let expected = DialogError::NativeCallFailed(UNAVAILABLE.to_string());
        assert_eq!(file, Err(expected.clone()));
        assert_eq!(folder, Err(expected));
    }
}
