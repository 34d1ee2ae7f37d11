/*
 * Boundary of the taskbar progress/state service: reflecting the progress of
 * a long operation on a window's taskbar button. The dialog core does not
 * use it; it is the sibling service exposed next to the dialogs. On targets
 * without taskbar integration every call fails the same way.
 */
use crate::core::types::WindowId;

/// Scale the OS progress bar uses for a percentage in `0.0..=1.0`.
pub const PROGRESS_TOTAL: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskbarState {
    Idle,
    InProgress,
    Paused,
    Error,
}

pub trait TaskbarOperations: Send + Sync {
    /// Shows `percentage` (0.0 to 1.0) as the window's taskbar progress.
    fn set_progress_value(&self, window: WindowId, percentage: f32) -> bool;

    fn set_state(&self, window: WindowId, state: TaskbarState) -> bool;
}

/*
 * Converts a percentage into completed units out of `PROGRESS_TOTAL`.
 * Values outside the range are clamped; NaN counts as no progress.
 */
pub fn progress_units(percentage: f32) -> u64 {
    if percentage.is_nan() {
        return 0;
    }
    let clamped = percentage.clamp(0.0, 1.0);
    (clamped * PROGRESS_TOTAL as f32).round() as u64
}

/*
 * Taskbar service for targets with no taskbar integration.
 */
#[derive(Debug, Default)]
pub struct UnavailableTaskbar;

impl TaskbarOperations for UnavailableTaskbar {
    fn set_progress_value(&self, window: WindowId, percentage: f32) -> bool {
        log::warn!(
            "Taskbar: No available taskbar system for this platform (progress {percentage} for {:?}).",
            window
        );
        false
    }

    fn set_state(&self, window: WindowId, state: TaskbarState) -> bool {
        log::warn!(
            "Taskbar: No available taskbar system for this platform (state {:?} for {:?}).",
            state,
            window
        );
        false
    }
}
