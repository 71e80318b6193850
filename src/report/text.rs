//! Text clean-up applied before anything is measured or drawn.

/// Title used when a presentation title is empty after sanitising.
pub const DEFAULT_TITLE: &str = "Presentation Results";

/// Longest title kept before it is cut with an ellipsis.
pub const MAX_TITLE_CHARS: usize = 100;

fn is_stripped(ch: char) -> bool {
    matches!(ch,
        '\u{0000}'..='\u{001F}'
        | '\u{007F}'..='\u{009F}'
        | '\u{200B}'..='\u{200D}'
        | '\u{FEFF}')
}

/// Clean a document title.
///
/// Control and zero-width characters are removed and the result is trimmed.
/// An empty result falls back to [`DEFAULT_TITLE`]; anything longer than
/// [`MAX_TITLE_CHARS`] characters is cut and gets `"..."` appended.
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title.chars().filter(|c| !is_stripped(*c)).collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        log::warn!("title is empty after sanitising, using {:?}", DEFAULT_TITLE);
        return DEFAULT_TITLE.to_string();
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        let cut: String = trimmed.chars().take(MAX_TITLE_CHARS).collect();
        return format!("{}...", cut);
    }
    trimmed.to_string()
}

/// Clean body text, keeping line breaks and tabs.
///
/// Returns `fallback` when nothing printable is left.
pub fn sanitize_text(text: &str, fallback: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| *c == '\n' || *c == '\t' || !is_stripped(*c))
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Shorten an identifier for display.
///
/// Hyphenated values longer than 20 characters keep their first 6 and last 4
/// characters (`"550e8400-...-446655440000"` becomes `"550e84...0000"`).
/// Other values longer than `max_len` are cut to `max_len - 3` characters
/// plus `"..."`.
pub fn shorten_id(value: &str, max_len: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if value.contains('-') && chars.len() > 20 {
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        return format!("{}...{}", head, tail);
    }
    if chars.len() <= max_len {
        return value.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let head: String = chars[..keep].iter().collect();
    format!("{}...", head)
}

/// [`shorten_id`] with the default length of 16.
pub fn shorten(value: &str) -> String {
    shorten_id(value, 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_title_strips_invisible() {
        assert_eq!(sanitize_title("  Quarterly\u{200B} Review\u{0007} "), "Quarterly Review");
        assert_eq!(sanitize_title("\u{FEFF}"), DEFAULT_TITLE);
        assert_eq!(sanitize_title(""), DEFAULT_TITLE);
    }

    #[test]
    fn test_sanitize_title_caps_length() {
        let long = "x".repeat(150);
        let out = sanitize_title(&long);
        assert_eq!(out.chars().count(), 103);
        assert!(out.ends_with("..."));
        assert_eq!(sanitize_title(&"y".repeat(100)), "y".repeat(100));
    }

    #[test]
    fn test_sanitize_text_keeps_breaks() {
        assert_eq!(sanitize_text("a\nb\tc\u{0001}", "-"), "a\nb\tc");
        assert_eq!(sanitize_text("\u{200C}", "Untitled"), "Untitled");
    }

    #[test]
    fn test_shorten_uuid() {
        assert_eq!(shorten("550e8400-e29b-41d4-a716-446655440000"), "550e84...0000");
    }

    #[test]
    fn test_shorten_plain() {
        assert_eq!(shorten("short"), "short");
        assert_eq!(shorten("exactly-16-chars"), "exactly-16-chars");
        assert_eq!(shorten("abcdefghijklmnopqrstu"), "abcdefghijklm...");
        assert_eq!(shorten_id("A very long answer option", 20), "A very long answe...");
    }

    #[test]
    fn test_shorten_multibyte() {
        assert_eq!(shorten_id("ééééééééééé", 8), "ééééé...");
    }
}
