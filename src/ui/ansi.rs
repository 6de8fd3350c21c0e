//! Turns renderer output carrying SGR escape sequences into ratatui text.
//!
//! Only the sequences `crossterm` emits for colours and basic attributes are
//! interpreted; any other CSI sequence is dropped.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

pub fn to_text(input: &str) -> Text<'static> {
    let mut style = Style::default();
    let lines: Vec<Line<'static>> = input
        .lines()
        .map(|line| parse_line(line, &mut style))
        .collect();
    Text::from(lines)
}

fn parse_line(line: &str, style: &mut Style) -> Line<'static> {
    let mut spans = Vec::new();
    let mut buf = String::new();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\x1b' || chars.peek() != Some(&'[') {
            buf.push(c);
            continue;
        }
        chars.next();
        let mut params = String::new();
        let mut terminator = None;
        for p in chars.by_ref() {
            if ('\x40'..='\x7e').contains(&p) {
                terminator = Some(p);
                break;
            }
            params.push(p);
        }
        if terminator == Some('m') {
            if !buf.is_empty() {
                spans.push(Span::styled(std::mem::take(&mut buf), *style));
            }
            *style = apply_sgr(*style, &params);
        }
    }
    if !buf.is_empty() {
        spans.push(Span::styled(buf, *style));
    }
    Line::from(spans)
}

fn apply_sgr(mut style: Style, params: &str) -> Style {
    let codes: Vec<u8> = params
        .split(';')
        .map(|p| p.parse().unwrap_or(0))
        .collect();
    let mut i = 0;
    while i < codes.len() {
        match codes[i] {
            0 => style = Style::default(),
            1 => style = style.add_modifier(Modifier::BOLD),
            2 => style = style.add_modifier(Modifier::DIM),
            3 => style = style.add_modifier(Modifier::ITALIC),
            4 => style = style.add_modifier(Modifier::UNDERLINED),
            22 => style = style.remove_modifier(Modifier::BOLD | Modifier::DIM),
            23 => style = style.remove_modifier(Modifier::ITALIC),
            24 => style = style.remove_modifier(Modifier::UNDERLINED),
            n @ 30..=37 => style = style.fg(Color::Indexed(n - 30)),
            n @ 90..=97 => style = style.fg(Color::Indexed(n - 90 + 8)),
            n @ 40..=47 => style = style.bg(Color::Indexed(n - 40)),
            n @ 100..=107 => style = style.bg(Color::Indexed(n - 100 + 8)),
            39 => style = style.fg(Color::Reset),
            49 => style = style.bg(Color::Reset),
            code @ (38 | 48) => {
                let (color, used) = extended_color(&codes[i + 1..]);
                if let Some(color) = color {
                    style = if code == 38 { style.fg(color) } else { style.bg(color) };
                }
                i += used;
            }
            _ => {}
        }
        i += 1;
    }
    style
}

/// Parses `5;n` or `2;r;g;b`, returning the colour and the number of codes consumed.
fn extended_color(rest: &[u8]) -> (Option<Color>, usize) {
    match rest {
        [5, n, ..] => (Some(Color::Indexed(*n)), 2),
        [2, r, g, b, ..] => (Some(Color::Rgb(*r, *g, *b)), 4),
        _ => (None, rest.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Category, Styler, Theme};

    #[test]
    fn test_plain_text_passes_through() {
        let text = to_text("{\n  \"a\": 1\n}");
        assert_eq!(text.lines.len(), 3);
        assert_eq!(text.lines[1].spans[0].content, "  \"a\": 1");
        assert_eq!(text.lines[1].spans[0].style, Style::default());
    }

    #[test]
    fn test_indexed_foreground() {
        let text = to_text("x \x1b[38;5;14mkey\x1b[39m y");
        let spans = &text.lines[0].spans;
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[1].content, "key");
        assert_eq!(spans[1].style.fg, Some(Color::Indexed(14)));
        assert_eq!(spans[2].style.fg, Some(Color::Reset));
    }

    #[test]
    fn test_rgb_and_reset() {
        let text = to_text("\x1b[1;38;2;10;20;30mhot\x1b[0mcold");
        let spans = &text.lines[0].spans;
        assert_eq!(spans[0].style.fg, Some(Color::Rgb(10, 20, 30)));
        assert!(spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(spans[1].style, Style::default());
    }

    #[test]
    fn test_theme_output_round_trips_to_spans() {
        let painted = Theme::default().paint(Category::String, "\"v\"");
        let text = to_text(&painted);
        let content: String = text.lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(content, "\"v\"");
    }

    #[test]
    fn test_unknown_sequences_dropped() {
        let text = to_text("a\x1b[2Kb");
        let content: String = text.lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(content, "ab");
    }
}
