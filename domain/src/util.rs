//! Shared utility functions.

/// Truncate a string to approximately `max_bytes` without splitting a UTF-8
/// character boundary.
///
/// Returns a sub-slice of the original string. If the string is shorter than
/// `max_bytes`, the entire string is returned unchanged.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Take the first `max_lines` lines of `s`, then cap the result at
/// `max_bytes`. Returns the preview and whether anything was cut.
pub fn head_preview(s: &str, max_lines: usize, max_bytes: usize) -> (String, bool) {
    let mut lines = s.lines();
    let head: Vec<&str> = lines.by_ref().take(max_lines).collect();
    let more_lines = lines.next().is_some();
    let joined = head.join("\n");
    let capped = truncate_str(&joined, max_bytes);
    let cut = more_lines || capped.len() < joined.len();
    (capped.to_string(), cut)
}

/// Take the last `max_lines` lines of `s`.
pub fn tail_preview(s: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = s.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

/// Serde adapter storing a [`Duration`](std::time::Duration) as whole seconds.
pub mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
