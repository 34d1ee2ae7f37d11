/*
 * Scoped COM initialization for a worker thread. Shell dialogs and the
 * taskbar list are COM-backed, and every request runs on a fresh thread, so
 * each native call enters a single-threaded apartment for its duration.
 */
use crate::platform_layer::error::{PlatformError, Result as PlatformResult};
use windows::Win32::{
    Foundation::RPC_E_CHANGED_MODE,
    System::Com::{COINIT_APARTMENTTHREADED, CoInitializeEx, CoUninitialize},
};

pub(crate) struct ComApartment {
    owns_initialization: bool,
}

impl ComApartment {
    pub(crate) fn enter() -> PlatformResult<Self> {
        let hr = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) };
        if hr == RPC_E_CHANGED_MODE {
            // Someone already initialized this thread with another model; use it as is.
            log::debug!("ComApartment: Thread already in a multi-threaded apartment.");
            return Ok(ComApartment {
                owns_initialization: false,
            });
        }
        if hr.is_err() {
            log::error!("ComApartment: CoInitializeEx failed: {:?}", hr);
            return Err(PlatformError::InitializationFailed(format!(
                "CoInitializeEx failed: {:?}",
                hr
            )));
        }
        // S_OK and S_FALSE both need a matching CoUninitialize.
        Ok(ComApartment {
            owns_initialization: true,
        })
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        if self.owns_initialization {
            unsafe { CoUninitialize() };
        }
    }
}
