/*
 * Owned UTF-16 buffers handed to the native dialog functions.
 *
 * `WideBuffer` is an append-only buffer with a capacity fixed at creation;
 * every write is bounds-checked against that capacity instead of relying on a
 * pre-computed pointer offset. `SelectionBuffer` is the zero-filled scratch
 * region the native picker writes the chosen path(s) into. Both account their
 * storage on the request's arena for as long as they live.
 */
use crate::core::error::{DialogError, Result};
use crate::core::request_arena::{ArenaLease, RequestArena};
use std::path::Path;

const UNIT_BYTES: usize = std::mem::size_of::<u16>();

fn reserve_units(units: &mut Vec<u16>, capacity: usize, purpose: &str) -> Result<()> {
    units.try_reserve_exact(capacity).map_err(|e| {
        log::error!("WideBuffer: Reserving {capacity} code units for {purpose} failed: {e}");
        DialogError::ResourceExhausted(format!("Out of memory reserving {purpose}: {e}"))
    })
}

#[derive(Debug)]
pub struct WideBuffer {
    units: Vec<u16>,
    capacity: usize,
    _lease: ArenaLease,
}

impl WideBuffer {
    pub fn with_capacity(arena: &RequestArena, capacity: usize, purpose: &str) -> Result<Self> {
        let lease = arena.acquire(capacity * UNIT_BYTES, purpose)?;
        let mut units = Vec::new();
        reserve_units(&mut units, capacity, purpose)?;
        Ok(WideBuffer {
            units,
            capacity,
            _lease: lease,
        })
    }

    pub fn push(&mut self, unit: u16) -> Result<()> {
        self.append(&[unit])
    }

    pub fn append(&mut self, units: &[u16]) -> Result<()> {
        if units.len() > self.remaining() {
            log::error!(
                "WideBuffer: Append of {} units overflows buffer ({} of {} used).",
                units.len(),
                self.units.len(),
                self.capacity
            );
            return Err(DialogError::ResourceExhausted(format!(
                "Buffer of {} code units is too small",
                self.capacity
            )));
        }
        self.units.extend_from_slice(units);
        Ok(())
    }

    pub fn append_str(&mut self, text: &str) -> Result<()> {
        for unit in text.encode_utf16() {
            self.push(unit)?;
        }
        Ok(())
    }

    /// Writes a single null terminator.
    pub fn terminate(&mut self) -> Result<()> {
        self.push(0)
    }

    pub fn current_len(&self) -> usize {
        self.units.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.units.len()
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.units
    }
}

/*
 * Fixed-capacity scratch region for the native picker's output. The whole
 * region is zeroed on creation and on `clear`, because the multi-select
 * format is terminated by a double null rather than by a length.
 */
#[derive(Debug)]
pub struct SelectionBuffer {
    units: Vec<u16>,
    _lease: ArenaLease,
}

impl SelectionBuffer {
    pub fn zeroed(arena: &RequestArena, capacity: usize) -> Result<Self> {
        let lease = arena.acquire(capacity * UNIT_BYTES, "selection buffer")?;
        let mut units = Vec::new();
        reserve_units(&mut units, capacity, "selection buffer")?;
        units.resize(capacity, 0);
        Ok(SelectionBuffer {
            units,
            _lease: lease,
        })
    }

    pub fn clear(&mut self) {
        self.units.fill(0);
    }

    /*
     * Pre-fills the buffer with a default path. The path plus its terminator
     * must fit; a path that does not is rejected rather than truncated.
     */
    pub fn write_default(&mut self, path_units: &[u16]) -> Result<()> {
        self.clear();
        if path_units.len() >= self.units.len() {
            log::error!(
                "SelectionBuffer: Default path of {} units does not fit {} units.",
                path_units.len(),
                self.units.len()
            );
            return Err(DialogError::PathTooLong(format!(
                "Default path is {} code units, limit is {}",
                path_units.len(),
                self.units.len().saturating_sub(1)
            )));
        }
        self.units[..path_units.len()].copy_from_slice(path_units);
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.units.len()
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.units
    }

    pub fn as_mut_slice(&mut self) -> &mut [u16] {
        &mut self.units
    }
}

/*
 * Converts a path to UTF-16 code units without a terminator. On Windows this
 * is lossless; elsewhere the path must be valid Unicode.
 */
#[cfg(windows)]
pub fn wide_path(path: &Path) -> Result<Vec<u16>> {
    use std::os::windows::ffi::OsStrExt;
    Ok(path.as_os_str().encode_wide().collect())
}

#[cfg(not(windows))]
pub fn wide_path(path: &Path) -> Result<Vec<u16>> {
    match path.to_str() {
        Some(text) => Ok(text.encode_utf16().collect()),
        None => {
            log::error!("WideBuffer: Path {path:?} is not valid Unicode.");
            Err(DialogError::Encoding(format!(
                "Path {path:?} cannot be converted to UTF-16"
            )))
        }
    }
}
