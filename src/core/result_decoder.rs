/*
 * Turns what the native picker wrote into its selection buffer into an
 * ordered list of path strings, and maps the native filter index onto the
 * caller's filter list.
 *
 * Single selection: the buffer holds one null-terminated path.
 * Multiple selection: the buffer holds `folder\0name1\0name2\0...\0\0`. The
 * first run is the folder; every following non-empty run is a file name in
 * that folder; the first empty run (a null right after a null) ends the list.
 *
 * The path list grows one entry at a time and each growth is accounted on
 * the request arena. If any step fails, the partially built list and its
 * lease are dropped together, returning the arena to its previous balance.
 */
use crate::core::error::{DialogError, Result};
use crate::core::request_arena::{ArenaLease, RequestArena};
use crate::core::types::{FilterEntry, active_filters};

pub const PATH_SEPARATOR: char = '\\';

const SLOT_BYTES: usize = std::mem::size_of::<String>();

/*
 * Decoded paths together with the arena lease that accounts for them. The
 * invoker keeps the lease alive until the callback that receives the paths
 * has returned.
 */
#[derive(Debug)]
pub struct DecodedPaths {
    paths: Vec<String>,
    lease: ArenaLease,
}

impl DecodedPaths {
    fn new(arena: &RequestArena) -> Result<Self> {
        // One slot for the list terminator, as the callback's path array has.
        let lease = arena.acquire(SLOT_BYTES, "path list")?;
        Ok(DecodedPaths {
            paths: Vec::new(),
            lease,
        })
    }

    fn push(&mut self, path: String) -> Result<()> {
        self.lease
            .grow(SLOT_BYTES + path.len(), "path list entry")?;
        self.paths.try_reserve(1).map_err(|e| {
            log::error!("ResultDecoder: Growing path list failed: {e}");
            DialogError::ResourceExhausted(format!("Out of memory growing path list: {e}"))
        })?;
        self.paths.push(path);
        Ok(())
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn into_parts(self) -> (Vec<String>, ArenaLease) {
        (self.paths, self.lease)
    }
}

fn find_terminator(buffer: &[u16], from: usize) -> Option<usize> {
    buffer
        .get(from..)?
        .iter()
        .position(|&unit| unit == 0)
        .map(|offset| from + offset)
}

fn text_from_units(units: &[u16]) -> Result<String> {
    String::from_utf16(units).map_err(|e| {
        log::error!("ResultDecoder: Selected path is not valid UTF-16: {e}");
        DialogError::Encoding(format!("Path too long or invalid character in path: {e}"))
    })
}

fn path_too_long(len: usize, path_limit: usize) -> DialogError {
    log::error!("ResultDecoder: Decoded path of {len} code units exceeds limit {path_limit}.");
    DialogError::PathTooLong(format!(
        "Path too long or invalid character in path ({len} code units, limit {})",
        path_limit.saturating_sub(1)
    ))
}

/*
 * Decodes the single null-terminated path at the start of `buffer`.
 */
pub fn decode_single(
    buffer: &[u16],
    path_limit: usize,
    arena: &RequestArena,
) -> Result<DecodedPaths> {
    let end = find_terminator(buffer, 0).unwrap_or(buffer.len());
    if end >= path_limit {
        return Err(path_too_long(end, path_limit));
    }

    let mut decoded = DecodedPaths::new(arena)?;
    decoded.push(text_from_units(&buffer[..end])?)?;
    Ok(decoded)
}

/*
 * Decodes a multi-selection buffer into `folder\name` paths in the order the
 * native picker listed them. A folder followed directly by the double null
 * decodes to an empty list.
 */
pub fn decode_multiple(
    buffer: &[u16],
    path_limit: usize,
    arena: &RequestArena,
) -> Result<DecodedPaths> {
    let folder_end = find_terminator(buffer, 0).unwrap_or(buffer.len());
    if folder_end >= path_limit || folder_end == buffer.len() {
        return Err(path_too_long(folder_end, path_limit));
    }
    let folder = text_from_units(&buffer[..folder_end])?;

    let mut decoded = DecodedPaths::new(arena)?;
    let mut cursor = folder_end + 1;
    while cursor < buffer.len() && buffer[cursor] != 0 {
        let Some(name_end) = find_terminator(buffer, cursor) else {
            // The name runs off the end of the buffer; it cannot be complete.
            return Err(path_too_long(
                folder_end + 1 + (buffer.len() - cursor),
                path_limit,
            ));
        };

        let full_len = folder_end + 1 + (name_end - cursor);
        if full_len >= path_limit {
            return Err(path_too_long(full_len, path_limit));
        }

        let name = text_from_units(&buffer[cursor..name_end])?;
        let mut path = String::with_capacity(folder.len() + 1 + name.len());
        path.push_str(&folder);
        path.push(PATH_SEPARATOR);
        path.push_str(&name);
        decoded.push(path)?;

        cursor = name_end + 1;
    }

    log::trace!(
        "ResultDecoder: Decoded {} paths from multi-selection in {folder:?}.",
        decoded.paths().len()
    );
    Ok(decoded)
}

pub fn decode_selection(
    buffer: &[u16],
    allow_multiple: bool,
    path_limit: usize,
    arena: &RequestArena,
) -> Result<DecodedPaths> {
    if allow_multiple {
        decode_multiple(buffer, path_limit, arena)
    } else {
        decode_single(buffer, path_limit, arena)
    }
}

/*
 * Maps the native 1-based filter index onto the 0-based index into the
 * active filters. Native 0 ("no filter chosen", also what an empty filter
 * list reports) maps to the last filter, or 0 when there are none.
 */
pub fn map_filter_index(native_index: u32, filters: &[FilterEntry]) -> i32 {
    if native_index == 0 {
        let count = active_filters(filters).len() as i32;
        return (count - 1).max(0);
    }
    native_index as i32 - 1
}
