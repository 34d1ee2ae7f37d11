use crate::core::error::DialogError;

#[cfg(windows)]
use windows::core::Error as WinError;

// Errors raised while talking to the native window system: COM setup for
// dialogs and the taskbar, and registering window handles with the bridge.
#[derive(Debug, Clone)]
pub enum PlatformError {
    /// An error originating from the Windows API.
    #[cfg(windows)]
    Win32(WinError),
    /// Failure during the initialization of COM or a native service.
    InitializationFailed(String),
    /// A native handle that cannot parent a dialog was supplied.
    InvalidHandle(String),
    /// A requested operation could not be completed.
    OperationFailed(String),
}

#[cfg(windows)]
impl From<WinError> for PlatformError {
    fn from(err: WinError) -> Self {
        PlatformError::Win32(err)
    }
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(windows)]
            PlatformError::Win32(e) => write!(f, "Win32 Error: {}", e),
            PlatformError::InitializationFailed(s) => write!(f, "Initialization Failed: {}", s),
            PlatformError::InvalidHandle(s) => write!(f, "Invalid Handle: {}", s),
            PlatformError::OperationFailed(s) => write!(f, "Operation Failed: {}", s),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(windows)]
            PlatformError::Win32(e) => Some(e),
            _ => None,
        }
    }
}

// A failing native call ends the request; the caller sees it as a native failure.
impl From<PlatformError> for DialogError {
    fn from(err: PlatformError) -> Self {
        DialogError::NativeCallFailed(err.to_string())
    }
}

/// A specialized `Result` type for platform layer operations.
pub type Result<T> = std::result::Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_error_becomes_native_call_failure() {
        let err = PlatformError::InitializationFailed("CoInitializeEx failed".to_string());

        let dialog_err: DialogError = err.into();

        assert_eq!(
            dialog_err,
            DialogError::NativeCallFailed("Initialization Failed: CoInitializeEx failed".to_string())
        );
    }
}
