//! Plain-text helpers: output truncation and the boxed display container.

use unicode_width::UnicodeWidthChar;

/// Cut `text` to `max` characters and append `ellipsis` when it is longer.
pub fn truncate(text: &str, max: usize, ellipsis: &str) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{ellipsis}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Draw a rounded border with one cell of padding around `content`.
///
/// Escape sequences in `content` are kept but do not count towards the width.
pub fn frame(content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let width = lines.iter().map(|line| visible_width(line)).max().unwrap_or(0);
    let inner = width + 2;

    let mut out = String::new();
    out.push_str(&format!("╭{}╮\n", "─".repeat(inner)));
    out.push_str(&format!("│{}│\n", " ".repeat(inner)));
    for line in &lines {
        let fill = width - visible_width(line);
        out.push_str(&format!("│ {line}{} │\n", " ".repeat(fill)));
    }
    out.push_str(&format!("│{}│\n", " ".repeat(inner)));
    out.push_str(&format!("╰{}╯", "─".repeat(inner)));
    out
}

/// Display width of `line`, skipping CSI escape sequences.
pub fn visible_width(line: &str) -> usize {
    let mut width = 0;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for p in chars.by_ref() {
                if ('\x40'..='\x7e').contains(&p) {
                    break;
                }
            }
            continue;
        }
        width += c.width().unwrap_or(0);
    }
    width
}
