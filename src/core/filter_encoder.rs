/*
 * Converts a portable filter list into the filter string the Win32 common
 * file dialogs expect: pairs of `display name\0pattern\0`, ended by an extra
 * null. Patterns are rewritten from `png;jpg` into `*.png;*.jpg`; a bare `*`
 * stays `*`, so `"*"` becomes `*.*`.
 *
 * The buffer is sized up front and filled through bounds-checked appends, so
 * a sizing mistake surfaces as an error instead of a write past the end.
 */
use crate::core::error::{DialogError, Result};
use crate::core::request_arena::RequestArena;
use crate::core::types::{FilterEntry, active_filters};
use crate::core::wide_buffer::WideBuffer;

const WILDCARD_PREFIX: [u16; 2] = [b'*' as u16, b'.' as u16];

fn is_allowed_pattern_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-'
}

/*
 * Number of UTF-16 code units the encoded form of `filters` needs, excluding
 * the final list terminator. Per entry: name + terminator, the leading `*.`,
 * the pattern, its terminator, and two extra units for the `*.` that follows
 * every `;`.
 */
pub fn encoded_len(filters: &[FilterEntry]) -> usize {
    active_filters(filters)
        .iter()
        .map(|filter| {
            let name_len = filter.name.encode_utf16().count();
            let pattern_len = filter.pattern.encode_utf16().count();
            let separators = filter.pattern.chars().filter(|&c| c == ';').count();
            name_len + pattern_len + 4 + 2 * separators
        })
        .sum()
}

/*
 * Encodes `filters` into a double-null-terminated wide buffer accounted on
 * `arena`. An empty list yields a buffer holding only the terminator.
 * Fails with `Encoding` on the first pattern character outside
 * `[A-Za-z0-9._-]`, `;` or a bare trailing `*`.
 */
pub fn encode_filters(filters: &[FilterEntry], arena: &RequestArena) -> Result<WideBuffer> {
    let required = encoded_len(filters) + 1;
    let mut buffer = WideBuffer::with_capacity(arena, required, "filter list")?;

    for filter in active_filters(filters) {
        buffer.append_str(&filter.name)?;
        buffer.terminate()?;
        encode_pattern(filter, &mut buffer)?;
        buffer.terminate()?;
    }
    buffer.terminate()?;

    log::trace!(
        "FilterEncoder: Encoded {} filters into {} code units.",
        active_filters(filters).len(),
        buffer.current_len()
    );
    Ok(buffer)
}

fn encode_pattern(filter: &FilterEntry, buffer: &mut WideBuffer) -> Result<()> {
    buffer.append(&WILDCARD_PREFIX)?;

    let mut chars = filter.pattern.chars().peekable();
    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        if c == ';' {
            buffer.push(b';' as u16)?;
            buffer.append(&WILDCARD_PREFIX)?;
        } else if c == '*' && matches!(next, None | Some(';')) {
            buffer.push(b'*' as u16)?;
        } else if is_allowed_pattern_char(c) {
            buffer.push(c as u16)?;
        } else {
            log::error!(
                "FilterEncoder: Illegal character {c:?} in pattern {:?} of filter {:?}.",
                filter.pattern,
                filter.name
            );
            return Err(DialogError::Encoding(format!(
                "Illegal character in pattern name: {c} (Only alphanumeric characters, periods, underscores and hyphens allowed) in filter '{}'",
                filter.name
            )));
        }
    }
    Ok(())
}
