/*
 * This module defines the data types exchanged between callers of the dialog
 * bridge and the worker that services a request: filter entries, the dialog
 * mode and option flags, window references, and the tagged `DialogResult`
 * delivered to the callback.
 */
use crate::core::error::DialogError;
use bitflags::bitflags;

// An opaque identifier for a window the caller has registered with the bridge.
//
// The dialog core never looks inside it; a `WindowHandleResolver` maps it to
// the native handle used to parent the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub(crate) usize);

// A raw native window handle (an `HWND` value on Windows). Zero means "none".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeWindowHandle(pub isize);

impl NativeWindowHandle {
    pub fn is_invalid(self) -> bool {
        self.0 == 0
    }
}

/*
 * A named group of extension patterns shown to the user as one selectable
 * filter. `pattern` is a `;`-separated list such as `"png;jpg"` or `"*"`.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEntry {
    pub name: String,
    pub pattern: String,
}

impl FilterEntry {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        FilterEntry {
            name: name.into(),
            pattern: pattern.into(),
        }
    }

    /// The empty-name or empty-pattern entry that ends a filter list.
    pub fn is_sentinel(&self) -> bool {
        self.name.is_empty() || self.pattern.is_empty()
    }
}

/*
 * Returns the filters that are actually in effect: everything before the
 * first sentinel entry.
 */
pub fn active_filters(filters: &[FilterEntry]) -> &[FilterEntry] {
    let end = filters
        .iter()
        .position(FilterEntry::is_sentinel)
        .unwrap_or(filters.len());
    &filters[..end]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    Open,
    Save,
    BrowseFolder,
}

impl DialogMode {
    pub fn name(self) -> &'static str {
        match self {
            DialogMode::Open => "open",
            DialogMode::Save => "save",
            DialogMode::BrowseFolder => "browse-folder",
        }
    }
}

bitflags! {
    /// Platform-neutral dialog options; the Win32 backend maps them to `OFN_*` flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DialogFlags: u32 {
        const ALLOW_MULTIPLE = 1 << 0;
        const PATH_MUST_EXIST = 1 << 1;
        const FILE_MUST_EXIST = 1 << 2;
        const OVERWRITE_PROMPT = 1 << 3;
        const NO_CHANGE_DIR = 1 << 4;
    }
}

/*
 * The outcome of one dialog request, delivered exactly once to its callback.
 *
 * `Cancelled` and `Succeeded` both present a non-null path list to the caller
 * (empty vs non-empty); `Failed` presents none. Callers should distinguish
 * cancellation from failure through `paths()`, not through `filter_index()`.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogResult {
    Failed(DialogError),
    Cancelled { filter_index: i32 },
    Succeeded { paths: Vec<String>, filter_index: i32 },
}

impl DialogResult {
    /// `None` on failure, empty on cancellation, non-empty on success.
    pub fn paths(&self) -> Option<&[String]> {
        match self {
            DialogResult::Failed(_) => None,
            DialogResult::Cancelled { .. } => Some(&[]),
            DialogResult::Succeeded { paths, .. } => Some(paths),
        }
    }

    /// 0-based filter index; -1 on failure and for folder dialogs.
    pub fn filter_index(&self) -> i32 {
        match self {
            DialogResult::Failed(_) => -1,
            DialogResult::Cancelled { filter_index } => *filter_index,
            DialogResult::Succeeded { filter_index, .. } => *filter_index,
        }
    }

    pub fn error(&self) -> Option<&DialogError> {
        match self {
            DialogResult::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, DialogResult::Cancelled { .. })
    }
}

/// Receives the single `DialogResult` of a request. Any user context is captured by the closure.
pub type DialogCallback = Box<dyn FnOnce(DialogResult) + Send + 'static>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_filters_stop_at_sentinel() {
        let filters = vec![
            FilterEntry::new("Images", "png;jpg"),
            FilterEntry::new("Text", "txt"),
            FilterEntry::new("", ""),
            FilterEntry::new("Ignored", "bin"),
        ];

        let active = active_filters(&filters);

        assert_eq!(active.len(), 2);
        assert_eq!(active[1].name, "Text");
    }

    #[test]
    fn test_active_filters_without_sentinel_uses_all() {
        let filters = vec![FilterEntry::new("All", "*")];
        assert_eq!(active_filters(&filters).len(), 1);
        assert!(active_filters(&[]).is_empty());
    }

    #[test]
    fn test_result_views_match_callback_contract() {
        let failed = DialogResult::Failed(DialogError::NativeCallFailed("x".into()));
        assert!(failed.paths().is_none());
        assert_eq!(failed.filter_index(), -1);

        let cancelled = DialogResult::Cancelled { filter_index: 0 };
        assert_eq!(cancelled.paths(), Some(&[][..]));
        assert!(cancelled.is_cancelled());

        let succeeded = DialogResult::Succeeded {
            paths: vec!["C:\\pic.png".to_string()],
            filter_index: 0,
        };
        assert_eq!(succeeded.paths().map(|p| p.len()), Some(1));
        assert!(succeeded.error().is_none());
    }
}
