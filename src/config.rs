use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing_subscriber::filter::LevelFilter;

use crate::classify::{NonJsonPolicy, RenderOptions, DEFAULT_ELLIPSIS, DEFAULT_MAX_TEXT_LENGTH};
use crate::render::{parse_color, Theme};

// ---------------------------------------------------------------------------
// Top-level Config: all fields have defaults, unknown keys silently ignored.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub render: RenderConfig,
    pub theme: ThemeConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Timeout in seconds. 0 = no timeout.
    pub timeout: u64,
    pub follow_redirects: bool,
    pub max_redirects: u32,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Character limit for formatted non-JSON output.
    pub max_text_length: usize,
    pub ellipsis: String,
    pub non_json: NonJsonPolicy,
    pub color: bool,
}

/// Colour names or 0-255 palette indices per token category.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub key: String,
    pub string: String,
    pub number: String,
    pub boolean: String,
    pub null: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            render: RenderConfig::default(),
            theme: ThemeConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: 10,
            follow_redirects: true,
            max_redirects: 10,
            user_agent: concat!("httpeek/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            ellipsis: DEFAULT_ELLIPSIS.to_string(),
            non_json: NonJsonPolicy::Format,
            color: true,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            key: "cyan".to_string(),
            string: "green".to_string(),
            number: "yellow".to_string(),
            boolean: "magenta".to_string(),
            null: "dark_grey".to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Overlay config: partial deserialization for field-level merging.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct OverlayConfig {
    http: OverlayHttpConfig,
    render: OverlayRenderConfig,
    theme: OverlayThemeConfig,
    log: OverlayLogConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct OverlayHttpConfig {
    timeout: Option<u64>,
    follow_redirects: Option<bool>,
    max_redirects: Option<u32>,
    user_agent: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct OverlayRenderConfig {
    max_text_length: Option<usize>,
    ellipsis: Option<String>,
    non_json: Option<NonJsonPolicy>,
    color: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct OverlayThemeConfig {
    key: Option<String>,
    string: Option<String>,
    number: Option<String>,
    boolean: Option<String>,
    null: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct OverlayLogConfig {
    level: Option<String>,
    file: Option<PathBuf>,
}

impl Config {
    /// Apply overlay values over self. Only `Some` fields are overridden.
    fn merge(mut self, overlay: OverlayConfig) -> Self {
        if let Some(v) = overlay.http.timeout {
            self.http.timeout = v;
        }
        if let Some(v) = overlay.http.follow_redirects {
            self.http.follow_redirects = v;
        }
        if let Some(v) = overlay.http.max_redirects {
            self.http.max_redirects = v;
        }
        if let Some(v) = overlay.http.user_agent {
            self.http.user_agent = v;
        }
        if let Some(v) = overlay.render.max_text_length {
            self.render.max_text_length = v;
        }
        if let Some(v) = overlay.render.ellipsis {
            self.render.ellipsis = v;
        }
        if let Some(v) = overlay.render.non_json {
            self.render.non_json = v;
        }
        if let Some(v) = overlay.render.color {
            self.render.color = v;
        }
        if let Some(v) = overlay.theme.key {
            self.theme.key = v;
        }
        if let Some(v) = overlay.theme.string {
            self.theme.string = v;
        }
        if let Some(v) = overlay.theme.number {
            self.theme.number = v;
        }
        if let Some(v) = overlay.theme.boolean {
            self.theme.boolean = v;
        }
        if let Some(v) = overlay.theme.null {
            self.theme.null = v;
        }
        if let Some(v) = overlay.log.level {
            self.log.level = v;
        }
        if let Some(v) = overlay.log.file {
            self.log.file = Some(v);
        }
        self
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            max_text_length: self.render.max_text_length,
            ellipsis: self.render.ellipsis.clone(),
            non_json: self.render.non_json,
        }
    }

    /// Resolved theme. Unparseable names fall back to the default colour;
    /// `validate` reports them before this is reached.
    pub fn theme(&self) -> Theme {
        let fallback = Theme::default();
        let pick = |name: &str, default| parse_color(name).unwrap_or(default);
        Theme {
            key: pick(&self.theme.key, fallback.key),
            string: pick(&self.theme.string, fallback.string),
            number: pick(&self.theme.number, fallback.number),
            boolean: pick(&self.theme.boolean, fallback.boolean),
            null: pick(&self.theme.null, fallback.null),
        }
    }
}

// ---------------------------------------------------------------------------
// Path resolution
// ---------------------------------------------------------------------------

const CONFIG_DIR_NAME: &str = "httpeek";
const CONFIG_FILE_NAME: &str = "config.toml";
const PROJECT_DIR_NAME: &str = ".httpeek";
const PROJECT_MARKERS: &[&str] = &[".git", PROJECT_DIR_NAME];

fn global_config_path() -> Option<PathBuf> {
    if let Ok(dir) = env::var("XDG_CONFIG_HOME") {
        if !dir.trim().is_empty() {
            return Some(PathBuf::from(dir).join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME),
    )
}

fn find_project_root() -> Option<PathBuf> {
    let current = env::current_dir().ok()?;
    current
        .ancestors()
        .find(|dir| PROJECT_MARKERS.iter().any(|marker| dir.join(marker).exists()))
        .map(Path::to_path_buf)
}

fn project_config_path() -> Option<PathBuf> {
    let path = find_project_root()?
        .join(PROJECT_DIR_NAME)
        .join(CONFIG_FILE_NAME);
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tilde expansion
// ---------------------------------------------------------------------------

fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(s) = path.to_str() {
        if let Some(rest) = s.strip_prefix('~') {
            if let Ok(home) = env::var("HOME") {
                return PathBuf::from(home).join(rest.strip_prefix('/').unwrap_or(rest));
            }
        }
    }
    path.to_path_buf()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
#[error("{}", .messages.join("\n"))]
pub struct ConfigError {
    pub messages: Vec<String>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.http.timeout > 600 {
            errors.push(format!(
                "config error: http.timeout = {} is out of range (0..=600)",
                self.http.timeout
            ));
        }
        if self.http.max_redirects > 100 {
            errors.push(format!(
                "config error: http.max_redirects = {} is out of range (0..=100)",
                self.http.max_redirects
            ));
        }
        if self.http.user_agent.trim().is_empty() {
            errors.push("config error: http.user_agent must not be empty".to_string());
        }
        if !(1..=1_000_000).contains(&self.render.max_text_length) {
            errors.push(format!(
                "config error: render.max_text_length = {} is out of range (1..=1000000)",
                self.render.max_text_length
            ));
        }

        let colors = [
            ("theme.key", &self.theme.key),
            ("theme.string", &self.theme.string),
            ("theme.number", &self.theme.number),
            ("theme.boolean", &self.theme.boolean),
            ("theme.null", &self.theme.null),
        ];
        for (field, value) in colors {
            if parse_color(value).is_none() {
                errors.push(format!(
                    "config error: {} = \"{}\" is not a colour name or 0-255 index",
                    field, value
                ));
            }
        }

        if self.log.level.parse::<LevelFilter>().is_err() {
            errors.push(format!(
                "config error: log.level = \"{}\" is not one of off, error, warn, info, debug, trace",
                self.log.level
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError { messages: errors })
        }
    }

    /// Expand tilde in all path fields. Called after merging, before validation.
    fn expand_paths(&mut self) {
        if let Some(ref path) = self.log.file {
            self.log.file = Some(expand_tilde(path));
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn load_overlay(path: &Path) -> Result<OverlayConfig, String> {
    let content = fs::read_to_string(path).map_err(|e| {
        format!(
            "config error: could not read \"{}\": {}",
            path.display(),
            e
        )
    })?;
    toml::from_str(&content).map_err(|e| {
        format!(
            "config error: failed to parse \"{}\": {}",
            path.display(),
            e
        )
    })
}

/// Load configuration from global, project and explicit config files.
/// Missing global/project files are silently skipped (all defaults apply);
/// an explicit file must exist. Parse or validation errors are returned as `Err`.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, String> {
    let mut config = Config::default();

    // Global config layer
    if let Some(path) = global_config_path() {
        if path.exists() {
            let overlay = load_overlay(&path)?;
            config = config.merge(overlay);
        }
    }

    // Project config layer
    if let Some(path) = project_config_path() {
        let overlay = load_overlay(&path)?;
        config = config.merge(overlay);
    }

    // Command-line layer
    if let Some(path) = explicit {
        let overlay = load_overlay(&expand_tilde(path))?;
        config = config.merge(overlay);
    }

    config.expand_paths();
    config.validate().map_err(|e| e.to_string())?;

    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
