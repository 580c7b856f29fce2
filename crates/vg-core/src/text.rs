//! Text clipping for length-capped spoken output

/// Marker appended to clipped text
pub const ELLIPSIS: char = '…';

/// Trim `text` and cap it at `max_chars` characters
///
/// Longer text keeps its first `max_chars - 1` characters, is trimmed again
/// and gets [`ELLIPSIS`] appended, so the result never exceeds the cap.
/// A cap of zero only trims.
pub fn clip(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if max_chars == 0 || text.chars().count() <= max_chars {
        return text.to_string();
    }

    let head: String = text.chars().take(max_chars - 1).collect();
    let mut clipped = head.trim().to_string();
    clipped.push(ELLIPSIS);
    clipped
}
