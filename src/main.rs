use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error};

use jptrans::config::Config;
use jptrans::logger::{self, LogConfig};
use jptrans::orchestrator::Orchestrator;
use jptrans::render::JsonPageRenderer;
use jptrans::translate::{DryRunTranslator, OpenAiTranslator, Translator};
use jptrans::viewer;

/// Translate text into Japanese.
#[derive(Debug, Parser)]
#[command(name = "jptrans", version)]
#[command(after_help = "Example: jptrans -t \"Target Text\"")]
struct Args {
    /// Text to translate
    #[arg(short = 't', long = "text", default_value = "Hello, World!")]
    text: String,

    /// Read the text to translate from the clipboard
    #[arg(short = 'c', long)]
    clipboard: bool,

    /// Output verbose log, including request and response bodies
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Skip the API call and show a placeholder translation
    #[arg(long)]
    dry_run: bool,

    /// Print the translation to stdout instead of opening a window
    #[arg(long)]
    headless: bool,

    /// Append log output to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[cfg(windows)]
fn read_clipboard_string() -> anyhow::Result<String> {
    clipboard_win::get_clipboard_string().map_err(|e| anyhow::anyhow!("failed to read clipboard: {e}"))
}

#[cfg(not(windows))]
fn read_clipboard_string() -> anyhow::Result<String> {
    anyhow::bail!("reading the clipboard is only supported on Windows")
}

fn launch<T: Translator>(translator: T, target: String, headless: bool, cfg: &Config) -> anyhow::Result<()> {
    if headless {
        let rt = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
        let translated = rt.block_on(translator.translate(&target)).map_err(|e| {
            error!(error = %e, "translation failed");
            e
        })?;
        println!("translated: {translated}");
        return Ok(());
    }

    let orchestrator = Orchestrator::new(translator, JsonPageRenderer::default())?;
    viewer::run(orchestrator, target, &cfg.window)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cfg = Config::load()?.with_env();

    let log = LogConfig::new(args.verbose).with_file(args.log_file.clone().or_else(|| cfg.log_file.clone()));
    logger::init(&log)?;
    debug!(?args, "arguments parsed");

    let target = if args.clipboard { read_clipboard_string()? } else { args.text };

    if args.dry_run {
        launch(DryRunTranslator, target, args.headless, &cfg)
    } else {
        launch(OpenAiTranslator::new(cfg.openai_api_key.clone(), log), target, args.headless, &cfg)
    }
}
