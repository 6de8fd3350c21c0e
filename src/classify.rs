//! Response classification.
//!
//! Decides which renderer formats a response body, or which error the user
//! sees instead. The declared content type alone governs routing: a JSON body
//! served as `text/plain` never reaches the JSON renderer.

use serde::Deserialize;
use tracing::debug;

use crate::perf;
use crate::render::{html, json, text, Styler};

pub const DEFAULT_MAX_TEXT_LENGTH: usize = 2000;
pub const DEFAULT_ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUrl,
    RequestFailed,
    NonSuccessStatus(u16),
    NotJson,
    InvalidJson,
    BodyReadFailed,
    HtmlParseFailed,
}

impl ErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUrl => "invalid URL, please try again",
            ErrorKind::RequestFailed => "failed to make the request",
            ErrorKind::NonSuccessStatus(_) => "received non-200 response code",
            ErrorKind::NotJson => "response is not JSON",
            ErrorKind::InvalidJson => "invalid JSON format",
            ErrorKind::BodyReadFailed => "failed to read the response body",
            ErrorKind::HtmlParseFailed => "error formatting text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}: {}", .kind.message(), .detail)]
pub struct ResponseError {
    pub kind: ErrorKind,
    pub detail: String,
}

impl ResponseError {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn status(code: u16) -> Self {
        Self::new(ErrorKind::NonSuccessStatus(code), code.to_string())
    }

    /// `{ "error": "<message>", "details": "<detail>" }`, without `details`
    /// when there is nothing to add.
    pub fn to_document(&self) -> String {
        let error = quote(self.kind.message());
        if self.detail.is_empty() {
            format!("{{ \"error\": {error} }}")
        } else {
            format!("{{ \"error\": {error}, \"details\": {} }}", quote(&self.detail))
        }
    }
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

/// What to do with a body whose declared type is not JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonJsonPolicy {
    /// Format it with the HTML/text renderer.
    #[default]
    Format,
    /// Refuse it with `NotJson`.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub max_text_length: usize,
    pub ellipsis: String,
    pub non_json: NonJsonPolicy,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            ellipsis: DEFAULT_ELLIPSIS.to_string(),
            non_json: NonJsonPolicy::Format,
        }
    }
}

/// Route a response to a renderer and return the formatted body.
pub fn classify(
    status: u16,
    content_type: &str,
    body: &[u8],
    options: &RenderOptions,
    styler: &dyn Styler,
) -> Result<String, ResponseError> {
    let _timer = perf::stage("classify", body.len());

    if status != 200 {
        debug!(status, "non-success status, body not parsed");
        return Err(ResponseError::status(status));
    }

    if is_json_media_type(content_type) {
        debug!(content_type, "routing to json renderer");
        let _timer = perf::stage("json", body.len());
        let value = json::parse(body)
            .map_err(|e| ResponseError::new(ErrorKind::InvalidJson, e.to_string()))?;
        return Ok(json::render(&value, 0, styler));
    }

    if options.non_json == NonJsonPolicy::Reject {
        debug!(content_type, "non-json content type rejected");
        return Err(ResponseError::new(ErrorKind::NotJson, content_type));
    }

    debug!(content_type, "routing to html renderer");
    let _timer = perf::stage("html", body.len());
    let root = html::parse(body)
        .map_err(|e| ResponseError::new(ErrorKind::HtmlParseFailed, e.to_string()))?;
    let formatted = html::render(&root);
    Ok(text::truncate(
        &formatted,
        options.max_text_length,
        &options.ellipsis,
    ))
}

/// True for `application/json`, `application/*+json` and `text/json`,
/// ignoring parameters and case.
pub fn is_json_media_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || essence == "text/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Text shown to the user for either outcome.
pub fn display_text(result: &Result<String, ResponseError>) -> String {
    match result {
        Ok(formatted) => formatted.clone(),
        Err(err) => err.to_document(),
    }
}
