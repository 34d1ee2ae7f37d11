/*
 * Errors produced while servicing a dialog request.
 *
 * None of these cross the worker thread boundary as a panic or a returned
 * `Result`; each one ends up attached to `DialogResult::Failed` and is handed
 * to the request's callback. They are logged where they are created.
 */

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogError {
    /// A buffer or path list could not be allocated or grown.
    ResourceExhausted(String),
    /// Illegal filter pattern character, or path text that cannot be represented.
    Encoding(String),
    /// A decoded or supplied path does not fit the native path-length limit.
    PathTooLong(String),
    /// The detached worker for the request could not be started.
    WorkerSpawnFailed(String),
    /// The OS reported an error that is not a user cancellation.
    NativeCallFailed(String),
}

impl std::fmt::Display for DialogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DialogError::ResourceExhausted(s) => write!(f, "Resource Exhausted: {s}"),
            DialogError::Encoding(s) => write!(f, "Encoding Error: {s}"),
            DialogError::PathTooLong(s) => write!(f, "Path Too Long: {s}"),
            DialogError::WorkerSpawnFailed(s) => write!(f, "Worker Spawn Failed: {s}"),
            DialogError::NativeCallFailed(s) => write!(f, "Native Call Failed: {s}"),
        }
    }
}

impl std::error::Error for DialogError {}

/// A specialized `Result` type for the dialog core.
pub type Result<T> = std::result::Result<T, DialogError>;
