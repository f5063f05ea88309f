//! Byte-subslice search used by the attribute codec and the patch engine.

/// Index of the first occurrence of `needle` at or after `from`.
pub(crate) fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| i + from)
}

/// Index of the `n`-th occurrence of `needle` (1-based). Occurrences may
/// overlap; the search steps one byte past each match.
pub(crate) fn find_nth(haystack: &[u8], needle: &[u8], n: usize) -> Option<usize> {
    if n == 0 {
        return None;
    }
    let mut from = 0;
    let mut found = None;
    for _ in 0..n {
        let idx = find(haystack, needle, from)?;
        found = Some(idx);
        from = idx + 1;
    }
    found
}
