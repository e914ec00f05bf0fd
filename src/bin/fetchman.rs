//! CLI binary for fetchman.
//!
//! A thin shim over the library crate that maps CLI flags to `FetchConfig`,
//! runs one fetch and turns the outcome into an exit code.

use anyhow::{Context, Result};
use clap::Parser;
use fetchman::error::EXIT_OTHER;
use fetchman::{
    FetchConfig, FetchOutput, FetchProgressCallback, Fetcher, FetchmanError, OutputMode, Stage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI spinner using indicatif ──────────────────────────────────────────────

/// Terminal spinner that shows the current pipeline stage on stderr.
struct CliSpinner {
    bar: ProgressBar,
}

impl CliSpinner {
    fn new(topic: &str) -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix(topic.to_string());
        bar.set_message("starting…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl FetchProgressCallback for CliSpinner {
    fn on_stage(&self, stage: Stage) {
        // Nothing to wait for while writing; clear before stdout output lands.
        if stage == Stage::Persist {
            self.bar.finish_and_clear();
        } else {
            self.bar.set_message(format!("{stage}…"));
        }
    }

    fn on_complete(&self, _topic: &str, _markdown_len: usize) {
        self.bar.finish_and_clear();
    }

    fn on_failed(&self, _stage: Stage, _error: &str) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Cache ls(1) as Markdown (and HTML) under the user cache directory
  fetchman ls

  # Print the Markdown instead of writing files
  fetchman --output stdout grep

  # Use a different cache directory and renderer
  fetchman --cache-dir ./pages --man /usr/local/bin/man tar

  # Machine-readable summary
  fetchman --json printf

FILES:
  <user-cache-dir>/fetchman/<topic>.md     converted page   (rw-r--r--)
  <user-cache-dir>/fetchman/<topic>.html   raw renderer output (rw-r--r--)

  <user-cache-dir> is ~/.cache on Linux, ~/Library/Caches on macOS.

EXIT STATUS:
  0  success
  1  other error
  2  usage error (missing or empty topic, bad option)
  3  environment error (man not found in PATH, no cache directory)
  4  invocation error (man failed or found no page)
  5  conversion error
  6  persistence error (cannot create directory or write file)

ENVIRONMENT VARIABLES:
  FETCHMAN_OUTPUT     Default for --output (cache, stdout)
  FETCHMAN_CACHE_DIR  Default for --cache-dir
  FETCHMAN_MAN        Default for --man
  RUST_LOG            Override the log filter (e.g. fetchman=debug)
"#;

/// Fetch a man page as HTML and cache it as Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "fetchman",
    version,
    about = "Fetch a man page as HTML and cache it as Markdown",
    long_about = "Runs `man -Thtml <topic>`, converts the HTML to Markdown and writes both \
to <user-cache-dir>/fetchman/<topic>.{html,md}, or prints the Markdown to stdout.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Manual page topic, e.g. ls or printf.
    topic: String,

    /// Where the Markdown goes.
    #[arg(short, long, env = "FETCHMAN_OUTPUT", value_enum, default_value = "cache")]
    output: OutputArg,

    /// Cache directory to write into (default: <user-cache-dir>/fetchman).
    #[arg(long, env = "FETCHMAN_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Renderer program name or path.
    #[arg(long = "man", env = "FETCHMAN_MAN", default_value = "man")]
    man: String,

    /// Do not keep the raw HTML next to the Markdown.
    #[arg(long, env = "FETCHMAN_NO_HTML")]
    no_html: bool,

    /// Keep the converter's Markdown as is, without layout cleanup.
    #[arg(long)]
    no_normalize: bool,

    /// Print a JSON summary (including the Markdown) instead of text.
    #[arg(long)]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "FETCHMAN_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FETCHMAN_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "FETCHMAN_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OutputArg {
    Cache,
    Stdout,
}

impl From<OutputArg> for OutputMode {
    fn from(v: OutputArg) -> Self {
        match v {
            OutputArg::Cache => OutputMode::Cache,
            OutputArg::Stdout => OutputMode::Stdout,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // While the spinner is up, only warnings (e.g. renderer diagnostics)
    // are worth breaking its line for.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli, show_progress) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err
                .downcast_ref::<FetchmanError>()
                .map(FetchmanError::exit_code)
                .unwrap_or(EXIT_OTHER);
            eprintln!("{} {:#}", red("error:"), err);
            ExitCode::from(code)
        }
    }
}

fn run(cli: &Cli, show_progress: bool) -> Result<()> {
    let config = build_config(cli)?;

    // ── Locate the renderer before touching the filesystem ───────────────
    let mut fetcher = Fetcher::system(config).context("Cannot fetch man pages")?;

    if show_progress {
        fetcher = fetcher.with_progress(CliSpinner::new(&cli.topic));
    }

    // ── Run the pipeline ─────────────────────────────────────────────────
    let output = if cli.json {
        // The Markdown travels inside the JSON; keep stdout clean.
        fetcher.fetch_to(&cli.topic, &mut io::sink())
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        fetcher.fetch_to(&cli.topic, &mut handle)
    }
    .with_context(|| format!("Failed to fetch man page '{}'", cli.topic))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{json}").context("Failed to write to stdout")?;
    } else if !cli.quiet {
        print_summary(&output);
    }

    Ok(())
}

/// Map CLI args to `FetchConfig`.
fn build_config(cli: &Cli) -> Result<FetchConfig> {
    let mut builder = FetchConfig::builder()
        .output(cli.output.into())
        .renderer(cli.man.clone())
        .keep_html(!cli.no_html)
        .normalize_markdown(!cli.no_normalize);

    if let Some(ref dir) = cli.cache_dir {
        builder = builder.cache_dir(dir);
    }

    builder.build().context("Invalid configuration")
}

/// One-line result on stderr; stdout is reserved for the page itself.
fn print_summary(output: &FetchOutput) {
    match output.artifacts {
        Some(ref artifacts) => {
            eprintln!(
                "{}  {}  →  {}",
                green("✔"),
                bold(&output.topic),
                artifacts.markdown.display(),
            );
            if let Some(ref html) = artifacts.html {
                eprintln!("   {}", dim(&format!("html: {}", html.display())));
            }
        }
        None => {
            eprintln!(
                "{}  {}  {}",
                green("✔"),
                bold(&output.topic),
                dim("written to stdout"),
            );
        }
    }
    eprintln!(
        "   {}",
        dim(&format!(
            "{} bytes html → {} bytes markdown in {}ms",
            output.html_bytes,
            output.markdown.len(),
            output.stats.total_duration_ms
        )),
    );
}
