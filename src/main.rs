mod app;
mod classify;
mod cli;
mod config;
mod http;
mod logging;
mod method;
mod perf;
mod render;
mod ui;

use std::io::{stdout, IsTerminal};
use std::process::ExitCode;

use anyhow::Result;
use app::{present, App};
use clap::Parser;
use cli::Args;
use config::Config;
use http::{Fetcher, DEFAULT_URL};
use render::{text, Plain, Styler};
use tracing::error;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let mut config = config::load_config(args.config.as_deref()).map_err(anyhow::Error::msg)?;
    args.apply(&mut config);
    config.validate()?;
    logging::init(&config.log, !args.once)?;

    if args.once {
        return run_once(&args, &config).await;
    }

    let mut app = App::new(&config, args.method, args.url.clone())?;
    app.run().await?;
    Ok(ExitCode::SUCCESS)
}

/// Fetch, print the boxed result and exit non-zero on any error.
async fn run_once(args: &Args, config: &Config) -> Result<ExitCode> {
    let url = args.url.as_deref().unwrap_or(DEFAULT_URL);
    let fetcher = Fetcher::new(&config.http)?;

    let styler: Box<dyn Styler> = if config.render.color && stdout().is_terminal() {
        Box::new(config.theme())
    } else {
        Box::new(Plain)
    };

    let result = fetcher.fetch(args.method, url).await;
    let rendered = present(result, &config.render_options(), styler.as_ref());
    if rendered.failed {
        error!(url, content = %rendered.content, "request did not produce a formatted body");
    }

    println!("{}", text::frame(&rendered.content));

    Ok(if rendered.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
