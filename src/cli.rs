use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::method::HttpMethod;

#[derive(Debug, Parser)]
#[command(name = "httpeek", version, about = "Send an HTTP request and pretty-print the response")]
pub struct Args {
    /// Target URL
    #[arg(env = "FETCH_URL")]
    pub url: Option<String>,

    /// HTTP method: GET, POST, PUT, PATCH or DELETE
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: HttpMethod,

    /// Fetch once, print the formatted response and exit
    #[arg(long)]
    pub once: bool,

    /// Disable syntax colouring
    #[arg(long)]
    pub no_color: bool,

    /// Request timeout in seconds (0 disables it)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(0..=600))]
    pub timeout: Option<u64>,

    /// Extra config file applied over the global and project layers
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Command-line flags win over every config file layer.
    pub fn apply(&self, config: &mut Config) {
        if let Some(timeout) = self.timeout {
            config.http.timeout = timeout;
        }
        if self.no_color {
            config.render.color = false;
        }
        if let Some(ref path) = self.log_file {
            config.log.file = Some(path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["httpeek", "https://example.com"]).unwrap();
        assert_eq!(args.url.as_deref(), Some("https://example.com"));
        assert_eq!(args.method, HttpMethod::Get);
        assert!(!args.once);
        assert!(!args.no_color);
    }

    #[test]
    fn test_method_flag() {
        let args = Args::try_parse_from(["httpeek", "-X", "patch", "https://example.com"]).unwrap();
        assert_eq!(args.method, HttpMethod::Patch);
        assert!(Args::try_parse_from(["httpeek", "-X", "TRACE", "https://example.com"]).is_err());
    }

    #[test]
    fn test_apply_overrides_config() {
        let args = Args::try_parse_from([
            "httpeek",
            "--once",
            "--no-color",
            "--timeout",
            "3",
            "--log-file",
            "/tmp/httpeek.log",
            "https://example.com",
        ])
        .unwrap();
        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.http.timeout, 3);
        assert!(!config.render.color);
        assert_eq!(config.log.file, Some(PathBuf::from("/tmp/httpeek.log")));
    }

    #[test]
    fn test_timeout_range_checked() {
        assert!(Args::try_parse_from(["httpeek", "--timeout", "99999"]).is_err());
        let args = Args::try_parse_from(["httpeek", "--timeout", "600"]).unwrap();
        assert_eq!(args.timeout, Some(600));
    }

    #[test]
    fn test_config_revalidated_after_flags() {
        let args = Args::try_parse_from(["httpeek", "--timeout", "0"]).unwrap();
        let mut config = Config::default();
        args.apply(&mut config);
        assert!(config.validate().is_ok());

        config.http.timeout = 601;
        assert!(config.validate().is_err());
    }
}
