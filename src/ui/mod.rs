mod ansi;
mod layout;

use layout::{centered, AppLayout};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, InputMode, Panel, RequestField, ResponseStatus};
use crate::method::HttpMethod;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn render(frame: &mut Frame, app: &App) {
    let layout = AppLayout::new(frame.area());

    render_method_field(frame, app, layout.request_row.method_area);
    frame.render_widget(&app.url, layout.request_row.url_area);
    render_response_panel(frame, app, layout.response_area);
    render_status_bar(frame, app, layout.status_bar);

    if app.show_method_popup {
        render_method_popup(frame, app);
    }
    if app.show_help {
        render_help(frame);
    }
}

fn focus_color(focused: bool) -> Color {
    if focused {
        Color::Yellow
    } else {
        Color::White
    }
}

fn rounded_block(title: impl Into<Line<'static>>, color: Color) -> Block<'static> {
    Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .title(title)
}

fn render_method_field(frame: &mut Frame, app: &App, area: Rect) {
    let focused =
        app.focus.panel == Panel::Request && app.focus.request_field == RequestField::Method;
    let color = focus_color(focused);
    let method = Paragraph::new(Line::from(app.method.as_str()))
        .style(Style::default().fg(color))
        .block(rounded_block("Method", color));
    frame.render_widget(method, area);
}

fn render_response_panel(frame: &mut Frame, app: &App, area: Rect) {
    let color = focus_color(app.focus.panel == Panel::Response);

    let (title, body) = match &app.response {
        ResponseStatus::Empty => (
            Line::from("Response"),
            Paragraph::new(Line::from(Span::styled(
                "Press Enter to send the request",
                Style::default().fg(Color::DarkGray),
            ))),
        ),
        ResponseStatus::Loading => {
            let frame_index = (app.loading_tick as usize / 2) % SPINNER.len();
            (
                Line::from("Response"),
                Paragraph::new(format!("{} Loading...", SPINNER[frame_index])),
            )
        }
        ResponseStatus::Ready(rendered) => {
            let mut title = vec![Span::raw("Response")];
            if let Some(status) = rendered.status {
                let status_color = if rendered.failed { Color::Red } else { Color::Green };
                title.push(Span::raw(" "));
                title.push(Span::styled(
                    status.to_string(),
                    Style::default().fg(status_color).add_modifier(Modifier::BOLD),
                ));
            }
            if let Some(ms) = rendered.duration_ms {
                title.push(Span::raw(format!(" · {ms} ms")));
            }
            (
                Line::from(title),
                Paragraph::new(ansi::to_text(&rendered.content)).scroll((app.response_scroll, 0)),
            )
        }
    };

    frame.render_widget(body.block(rounded_block(title, color)), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode = match app.input_mode {
        InputMode::Normal => Span::styled(
            " NORMAL ",
            Style::default().fg(Color::Black).bg(Color::Blue),
        ),
        InputMode::Insert => Span::styled(
            " INSERT ",
            Style::default().fg(Color::Black).bg(Color::Green),
        ),
    };
    let hints = Span::styled(
        " Tab focus · i edit URL · Enter send · ? help · q quit",
        Style::default().fg(Color::DarkGray),
    );
    frame.render_widget(Paragraph::new(Line::from(vec![mode, hints])), area);
}

fn render_method_popup(frame: &mut Frame, app: &App) {
    let area = centered(frame.area(), 14, HttpMethod::ALL.len() as u16 + 2);
    let items: Vec<ListItem> = HttpMethod::ALL
        .iter()
        .enumerate()
        .map(|(i, method)| {
            let style = if i == app.method_popup_index {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default()
            };
            ListItem::new(format!(" {} ", method.as_str())).style(style)
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(List::new(items).block(rounded_block("Method", Color::Yellow)), area);
}

fn render_help(frame: &mut Frame) {
    let lines = vec![
        Line::from("Tab        cycle Method / URL / Response"),
        Line::from("h / l      move between Method and URL"),
        Line::from("Enter      send (on Method: choose method)"),
        Line::from("i          edit URL, Esc to leave"),
        Line::from("j / k      scroll the response"),
        Line::from("?          toggle this help"),
        Line::from("q / Esc    quit"),
    ];
    let area = centered(frame.area(), 48, lines.len() as u16 + 2);
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(rounded_block("Help", Color::Cyan)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_renders_fields_and_empty_response() {
        let app = App::new(&Config::default(), HttpMethod::Post, Some("http://x.test".into())).unwrap();
        let screen = draw(&app);
        assert!(screen.contains("POST"));
        assert!(screen.contains("http://x.test"));
        assert!(screen.contains("Press Enter to send the request"));
    }

    #[test]
    fn test_renders_help_overlay() {
        let mut app = App::new(&Config::default(), HttpMethod::Get, None).unwrap();
        app.show_help = true;
        assert!(draw(&app).contains("toggle this help"));
    }
}
