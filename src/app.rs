use std::io::stdout;
use std::panic;

use anyhow::Result;
use crossterm::{
    cursor::SetCursorStyle,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::debug;
use tui_textarea::{CursorMove, TextArea};

use crate::classify::{classify, display_text, ErrorKind, RenderOptions, ResponseError};
use crate::config::Config;
use crate::http::{is_valid_url, Fetched, Fetcher};
use crate::method::HttpMethod;
use crate::render::{Plain, Styler};
use crate::ui;

type FetchResult = Result<Fetched, ResponseError>;

#[derive(Debug, Clone, Default)]
pub enum ResponseStatus {
    #[default]
    Empty,
    Loading,
    Ready(RenderedResponse),
}

/// What the response panel shows once a request has resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResponse {
    pub status: Option<u16>,
    pub content: String,
    pub failed: bool,
    pub duration_ms: Option<u64>,
}

/// Classify a fetch outcome into displayable text. Success and failure end
/// up in the same shape so both land in the same container.
pub fn present(result: FetchResult, options: &RenderOptions, styler: &dyn Styler) -> RenderedResponse {
    match result {
        Ok(fetched) => {
            let classified = classify(
                fetched.status,
                &fetched.content_type,
                &fetched.body,
                options,
                styler,
            );
            RenderedResponse {
                status: Some(fetched.status),
                failed: classified.is_err(),
                content: display_text(&classified),
                duration_ms: Some(fetched.duration_ms),
            }
        }
        Err(err) => RenderedResponse {
            status: None,
            content: err.to_document(),
            failed: true,
            duration_ms: None,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Insert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Request,
    Response,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestField {
    Method,
    #[default]
    Url,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FocusState {
    pub panel: Panel,
    pub request_field: RequestField,
}

pub struct App {
    running: bool,
    pub method: HttpMethod,
    pub url: TextArea<'static>,
    pub focus: FocusState,
    pub response: ResponseStatus,
    fetcher: Fetcher,
    options: RenderOptions,
    styler: Box<dyn Styler>,
    pub input_mode: InputMode,
    pub response_scroll: u16,
    pub loading_tick: u8,
    pub show_help: bool,
    pub show_method_popup: bool,
    pub method_popup_index: usize,
}

impl App {
    pub fn new(config: &Config, method: HttpMethod, url: Option<String>) -> Result<Self> {
        let fetcher = Fetcher::new(&config.http)?;
        let styler: Box<dyn Styler> = if config.render.color {
            Box::new(config.theme())
        } else {
            Box::new(Plain)
        };

        let mut url_input = TextArea::new(vec![url.unwrap_or_default()]);
        url_input.move_cursor(CursorMove::End);

        let mut app = Self {
            running: true,
            method,
            url: url_input,
            focus: FocusState::default(),
            response: ResponseStatus::Empty,
            fetcher,
            options: config.render_options(),
            styler,
            input_mode: InputMode::Normal,
            response_scroll: 0,
            loading_tick: 0,
            show_help: false,
            show_method_popup: false,
            method_popup_index: 0,
        };
        app.sync_url_widget();
        Ok(app)
    }

    pub fn url_text(&self) -> &str {
        self.url.lines().first().map(String::as_str).unwrap_or("")
    }

    pub async fn run(&mut self) -> Result<()> {
        self.install_panic_hook();
        self.setup_terminal()?;

        let result = self.event_loop().await;

        self.restore_terminal()?;
        result
    }

    fn install_panic_hook(&self) {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = stdout().execute(LeaveAlternateScreen);
            original_hook(panic_info);
        }));
    }

    fn setup_terminal(&self) -> Result<()> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        Ok(())
    }

    fn restore_terminal(&self) -> Result<()> {
        disable_raw_mode()?;
        stdout().execute(LeaveAlternateScreen)?;
        let _ = stdout().execute(SetCursorStyle::DefaultUserShape);
        Ok(())
    }

    async fn event_loop(&mut self) -> Result<()> {
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        let (tx, mut rx) = mpsc::channel::<FetchResult>(1);

        while self.running {
            terminal.draw(|frame| {
                ui::render(frame, self);
            })?;

            if let Ok(result) = rx.try_recv() {
                self.receive(result);
            }

            if matches!(self.response, ResponseStatus::Loading) {
                self.loading_tick = self.loading_tick.wrapping_add(1);
            }

            if event::poll(std::time::Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key, tx.clone());
                    }
                }
            }
        }

        Ok(())
    }

    fn receive(&mut self, result: FetchResult) {
        self.response = ResponseStatus::Ready(present(result, &self.options, self.styler.as_ref()));
        self.response_scroll = 0;
    }

    fn handle_key(&mut self, key: KeyEvent, tx: mpsc::Sender<FetchResult>) {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_mode(key, tx),
            InputMode::Insert => self.handle_insert_mode(key, tx),
        }
        self.sync_url_widget();
    }

    fn handle_normal_mode(&mut self, key: KeyEvent, tx: mpsc::Sender<FetchResult>) {
        // Handle method popup navigation when open
        if self.show_method_popup {
            match key.code {
                KeyCode::Down | KeyCode::Char('j') => {
                    self.method_popup_index = (self.method_popup_index + 1) % HttpMethod::ALL.len();
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.method_popup_index = if self.method_popup_index == 0 {
                        HttpMethod::ALL.len() - 1
                    } else {
                        self.method_popup_index - 1
                    };
                }
                KeyCode::Enter => {
                    self.method = HttpMethod::from_index(self.method_popup_index);
                    self.show_method_popup = false;
                }
                KeyCode::Esc => {
                    self.show_method_popup = false;
                }
                _ => {}
            }
            return;
        }

        let in_request_panel = self.focus.panel == Panel::Request;
        let in_response_panel = self.focus.panel == Panel::Response;
        let in_method_field = self.focus.request_field == RequestField::Method;
        let in_url_field = self.focus.request_field == RequestField::Url;

        // Horizontal navigation with h/l between Method and URL fields
        if in_request_panel {
            match key.code {
                KeyCode::Left | KeyCode::Char('h') if in_url_field => {
                    self.focus.request_field = RequestField::Method;
                    return;
                }
                KeyCode::Right | KeyCode::Char('l') if in_method_field => {
                    self.focus.request_field = RequestField::Url;
                    return;
                }
                _ => {}
            }
        }

        if in_request_panel && in_method_field && key.code == KeyCode::Enter {
            self.method_popup_index = self.method.index();
            self.show_method_popup = true;
            return;
        }

        if in_response_panel {
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.response_scroll = self.response_scroll.saturating_sub(1);
                    return;
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.response_scroll = self.response_scroll.saturating_add(1);
                    return;
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
            }
            KeyCode::Char('i') => {
                if in_request_panel && in_url_field {
                    self.input_mode = InputMode::Insert;
                    let _ = stdout().execute(SetCursorStyle::SteadyUnderScore);
                }
            }
            KeyCode::Enter => {
                if in_request_panel {
                    self.send_request(tx);
                }
            }
            KeyCode::Tab => self.cycle_focus(),
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            _ => {}
        }
    }

    fn handle_insert_mode(&mut self, key: KeyEvent, tx: mpsc::Sender<FetchResult>) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                let _ = stdout().execute(SetCursorStyle::DefaultUserShape);
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                let _ = stdout().execute(SetCursorStyle::DefaultUserShape);
                self.send_request(tx);
            }
            _ => {
                self.url.input(key);
            }
        }
    }

    fn send_request(&mut self, tx: mpsc::Sender<FetchResult>) {
        if matches!(self.response, ResponseStatus::Loading) {
            return;
        }

        let url = self.url_text().trim().to_string();
        if !is_valid_url(&url) {
            debug!(url = %url, "not sending request for invalid URL");
            self.receive(Err(ResponseError::new(ErrorKind::InvalidUrl, "")));
            return;
        }

        self.response = ResponseStatus::Loading;

        let fetcher = self.fetcher.clone();
        let method = self.method;

        tokio::spawn(async move {
            let result = fetcher.fetch(method, &url).await;
            let _ = tx.send(result).await;
        });
    }

    fn cycle_focus(&mut self) {
        // Tab cycles: Method -> URL -> Response -> Method
        self.focus = match (self.focus.panel, self.focus.request_field) {
            (Panel::Request, RequestField::Method) => FocusState {
                panel: Panel::Request,
                request_field: RequestField::Url,
            },
            (Panel::Request, RequestField::Url) => FocusState {
                panel: Panel::Response,
                request_field: RequestField::Url,
            },
            (Panel::Response, _) => FocusState {
                panel: Panel::Request,
                request_field: RequestField::Method,
            },
        };
    }

    fn sync_url_widget(&mut self) {
        let focused =
            self.focus.panel == Panel::Request && self.focus.request_field == RequestField::Url;
        let color = match (focused, self.input_mode) {
            (true, InputMode::Insert) => Color::Green,
            (true, InputMode::Normal) => Color::Yellow,
            (false, _) => Color::White,
        };
        let cursor = if self.input_mode == InputMode::Insert {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        self.url.set_block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color))
                .title("URL"),
        );
        self.url.set_style(Style::default().fg(color));
        self.url.set_cursor_style(cursor);
        self.url.set_cursor_line_style(Style::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn app(url: &str) -> App {
        let mut config = Config::default();
        config.render.color = false;
        App::new(&config, HttpMethod::Get, Some(url.to_string())).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) {
        let (tx, _rx) = mpsc::channel(1);
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), tx);
    }

    fn ready(app: &App) -> &RenderedResponse {
        match &app.response {
            ResponseStatus::Ready(rendered) => rendered,
            other => panic!("expected ready response, got {other:?}"),
        }
    }

    #[test]
    fn test_initial_url_prefilled() {
        let app = app("https://api.github.com");
        assert_eq!(app.url_text(), "https://api.github.com");
        assert_eq!(app.focus.request_field, RequestField::Url);
    }

    #[test]
    fn test_enter_with_invalid_url_shows_error() {
        let mut app = app("invalid-url");
        press(&mut app, KeyCode::Enter);
        let rendered = ready(&app);
        assert!(rendered.failed);
        assert_eq!(rendered.content, r#"{ "error": "invalid URL, please try again" }"#);
    }

    #[test]
    fn test_insert_mode_edits_url() {
        let mut app = app("http://a");
        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.input_mode, InputMode::Insert);
        press(&mut app, KeyCode::Char('b'));
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.url_text(), "http:/");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.running);
    }

    #[test]
    fn test_focus_toggles_between_fields() {
        let mut app = app("");
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.focus.request_field, RequestField::Method);
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.focus.request_field, RequestField::Url);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus.panel, Panel::Response);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus.panel, Panel::Request);
        assert_eq!(app.focus.request_field, RequestField::Method);
    }

    #[test]
    fn test_method_popup_selects_method() {
        let mut app = app("");
        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Enter);
        assert!(app.show_method_popup);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert!(!app.show_method_popup);
        assert_eq!(app.method, HttpMethod::Put);
    }

    #[test]
    fn test_method_popup_wraps_upwards() {
        let mut app = app("");
        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('k'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.method, HttpMethod::Delete);
    }

    #[test]
    fn test_response_scroll() {
        let mut app = app("");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.response_scroll, 0);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.response_scroll, 2);
    }

    #[test]
    fn test_quit() {
        let mut app = app("");
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn test_present_success_and_failure_share_shape() {
        let options = RenderOptions::default();
        let ok = present(
            Ok(Fetched {
                status: 200,
                content_type: "application/json".to_string(),
                body: br#"{"key": "value"}"#.to_vec(),
                duration_ms: 7,
            }),
            &options,
            &Plain,
        );
        assert!(!ok.failed);
        assert_eq!(ok.status, Some(200));
        assert_eq!(ok.content, "{\n  \"key\": \"value\"\n}");

        let not_found = present(
            Ok(Fetched {
                status: 404,
                content_type: "application/json".to_string(),
                body: Vec::new(),
                duration_ms: 3,
            }),
            &options,
            &Plain,
        );
        assert!(not_found.failed);
        assert_eq!(
            not_found.content,
            r#"{ "error": "received non-200 response code", "details": "404" }"#
        );

        let refused = present(
            Err(ResponseError::new(ErrorKind::RequestFailed, "Connection failed")),
            &options,
            &Plain,
        );
        assert!(refused.failed);
        assert_eq!(refused.status, None);
    }
}
