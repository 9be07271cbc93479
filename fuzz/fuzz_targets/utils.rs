use std::str;

pub const MAX_INPUT_SIZE: usize = 64 * 1024;

/// Returns `data` as UTF-8, capped at `MAX_INPUT_SIZE` bytes.
///
/// A cap that lands inside a multibyte codepoint is backed off by up to 3 bytes.
#[inline]
pub fn truncate_utf8(data: &[u8]) -> Option<&str> {
    let cap = data.len().min(MAX_INPUT_SIZE);
    (0..=3.min(cap)).find_map(|trim| str::from_utf8(&data[..cap - trim]).ok())
}
