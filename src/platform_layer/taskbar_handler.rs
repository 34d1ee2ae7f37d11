/*
 * Win32 taskbar progress through `ITaskbarList3`. The taskbar list is created
 * per call on the calling thread, so the service can be shared freely between
 * threads without holding a COM pointer.
 */
use crate::core::invoker::WindowHandleResolver;
use crate::core::taskbar::{PROGRESS_TOTAL, TaskbarOperations, TaskbarState, progress_units};
use crate::core::types::WindowId;
use crate::platform_layer::com_apartment::ComApartment;
use crate::platform_layer::error::Result as PlatformResult;

use std::ffi::c_void;
use std::sync::Arc;

use windows::Win32::{
    Foundation::HWND,
    System::Com::{CLSCTX_INPROC_SERVER, CoCreateInstance},
    UI::Shell::{
        ITaskbarList3, TBPF_ERROR, TBPF_NOPROGRESS, TBPF_NORMAL, TBPF_PAUSED, TBPFLAG, TaskbarList,
    },
};

fn native_state(state: TaskbarState) -> TBPFLAG {
    match state {
        TaskbarState::Idle => TBPF_NOPROGRESS,
        TaskbarState::InProgress => TBPF_NORMAL,
        TaskbarState::Paused => TBPF_PAUSED,
        TaskbarState::Error => TBPF_ERROR,
    }
}

pub struct Win32Taskbar {
    windows: Arc<dyn WindowHandleResolver>,
}

impl Win32Taskbar {
    pub fn new(windows: Arc<dyn WindowHandleResolver>) -> Self {
        Win32Taskbar { windows }
    }

    fn with_taskbar_list<F>(&self, window: WindowId, operation: &str, apply: F) -> bool
    where
        F: FnOnce(&ITaskbarList3, HWND) -> windows::core::Result<()>,
    {
        let Some(handle) = self.windows.resolve(window) else {
            log::warn!(
                "Taskbar: Cannot {operation}: {:?} is not a registered window.",
                window
            );
            return false;
        };
        let hwnd = HWND(handle.0 as *mut c_void);

        let result: PlatformResult<()> = (|| {
            let _com = ComApartment::enter()?;
            let taskbar: ITaskbarList3 =
                unsafe { CoCreateInstance(&TaskbarList, None, CLSCTX_INPROC_SERVER) }?;
            unsafe { taskbar.HrInit() }?;
            apply(&taskbar, hwnd)?;
            Ok(())
        })();

        match result {
            Ok(()) => true,
            Err(e) => {
                log::error!("Taskbar: Failed to {operation} for {:?}: {e}", window);
                false
            }
        }
    }
}

impl TaskbarOperations for Win32Taskbar {
    fn set_progress_value(&self, window: WindowId, percentage: f32) -> bool {
        let completed = progress_units(percentage);
        self.with_taskbar_list(window, "set progress", |taskbar, hwnd| unsafe {
            taskbar.SetProgressValue(hwnd, completed, PROGRESS_TOTAL)
        })
    }

    fn set_state(&self, window: WindowId, state: TaskbarState) -> bool {
        self.with_taskbar_list(window, "set progress state", |taskbar, hwnd| unsafe {
            taskbar.SetProgressState(hwnd, native_state(state))
        })
    }
}
