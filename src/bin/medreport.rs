//! CLI binary for medreport-upload.
//!
//! A thin shim over the library crate: maps CLI flags to `UploadConfig`,
//! runs one upload, and draws the panel. `--interactive` keeps the panel on
//! screen and lets the user expand and collapse rows.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use medreport_upload::terminal::{paint, BOLD, DIM, RED};
use medreport_upload::{
    render_panel, RenderOptions, ResultsPanel, SharedPanel, UploadConfig, UploadError,
    UploadObserver, Uploader,
};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ── CLI observer using indicatif ─────────────────────────────────────────────

/// Shows a spinner while the request is in flight and prints the blocking
/// notification to stderr.
struct CliObserver {
    bar: Mutex<Option<ProgressBar>>,
    show_progress: bool,
    color: bool,
}

impl CliObserver {
    fn new(show_progress: bool, color: bool) -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
            show_progress,
            color,
        })
    }

    fn finish(&self) {
        if let Some(bar) = self.bar.lock().unwrap_or_else(|e| e.into_inner()).take() {
            bar.finish_and_clear();
        }
    }
}

impl UploadObserver for CliObserver {
    fn alert(&self, message: &str) {
        eprintln!(
            "{} {}",
            paint("✘", RED, self.color),
            paint(message, BOLD, self.color)
        );
    }

    fn on_upload_start(&self, file_name: &str, size: usize) {
        if !self.show_progress {
            return;
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Processing...");
        bar.set_message(format!("{file_name} ({size} bytes)"));
        bar.enable_steady_tick(Duration::from_millis(80));
        *self.bar.lock().unwrap_or_else(|e| e.into_inner()) = Some(bar);
    }

    fn on_upload_complete(&self, _row_count: usize) {
        self.finish();
    }

    fn on_upload_error(&self, _error: &UploadError) {
        self.finish();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Upload a report to the local analysis service
  medreport blood_test.pdf

  # Show every row expanded
  medreport --expand-all scan.png

  # Browse rows interactively (type a row number to expand/collapse it)
  medreport -i blood_test.pdf

  # Different server, template summary instead of AI
  medreport --endpoint http://10.0.0.5:8000/upload --prefer-ai false report.pdf

  # Machine-readable panel state
  medreport --json report.pdf > panel.json

INTERACTIVE COMMANDS:
  <n>   toggle row n
  a     expand all rows
  c     collapse all rows
  u     upload the same file again
  q     quit

ENVIRONMENT VARIABLES:
  MEDREPORT_ENDPOINT   Analysis service URL (default http://127.0.0.1:8000/upload)
  MEDREPORT_PREFER_AI  Send prefer_ai=true|false with the file
  MEDREPORT_TIMEOUT    Request timeout in seconds (0 = none)
  NO_COLOR             Disable ANSI colours
  RUST_LOG             Override the log filter
"#;

/// Upload a medical report and browse the interpreted values.
#[derive(Parser, Debug)]
#[command(
    name = "medreport",
    version,
    about = "Upload a medical report and browse the interpreted lab values",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Report file (PDF or image).
    file: Option<PathBuf>,

    /// Analysis service upload URL.
    #[arg(long, env = "MEDREPORT_ENDPOINT", default_value = medreport_upload::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Ask the service for an AI summary (true) or its template summary (false).
    #[arg(long, env = "MEDREPORT_PREFER_AI")]
    prefer_ai: Option<bool>,

    /// Request timeout in seconds; 0 leaves the transport default.
    #[arg(long, env = "MEDREPORT_TIMEOUT", default_value_t = 0)]
    timeout: u64,

    /// Print the panel state as JSON instead of drawing it.
    #[arg(long)]
    json: bool,

    /// Start with every row expanded.
    #[arg(long)]
    expand_all: bool,

    /// Keep the panel open and toggle rows from the keyboard.
    #[arg(short, long)]
    interactive: bool,

    /// Disable ANSI colours.
    #[arg(long, env = "NO_COLOR")]
    no_color: bool,

    /// Print the summary exactly as received (no HTML flattening).
    #[arg(long)]
    raw_summary: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MEDREPORT_VERBOSE")]
    verbose: bool,

    /// Suppress everything except the panel and errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers the only long wait, so INFO logs stay off unless
    // asked for.
    let show_progress = !cli.quiet && !cli.json && io::stderr().is_terminal();
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let stderr_color = !cli.no_color && io::stderr().is_terminal();
    let observer = CliObserver::new(show_progress, stderr_color);
    let config = build_config(&cli, observer)?;
    let uploader = Uploader::new(config).context("Failed to create HTTP client")?;

    let opts = RenderOptions {
        color: !cli.no_color && io::stdout().is_terminal(),
        flatten_summary: !cli.raw_summary,
    };

    // ── Upload ───────────────────────────────────────────────────────────
    let panel = ResultsPanel::shared();
    let outcome = uploader.submit(cli.file.as_deref(), &panel).await;
    if let Err(ref e) = outcome {
        if e.is_blocking() {
            // Already shown by CliObserver::alert; nothing was sent.
            return Ok(ExitCode::from(2));
        }
    }

    if cli.expand_all {
        lock(&panel).expand_all();
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&*lock(&panel))
            .context("Failed to serialise panel")?;
        println!("{json}");
    } else {
        draw(&panel, &opts)?;
    }

    if cli.interactive && !cli.json {
        interact(&uploader, cli.file.as_deref(), &panel, &opts, stderr_color).await?;
    }

    if lock(&panel).raw_text.starts_with("Error: ") {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Map CLI args to `UploadConfig`.
fn build_config(cli: &Cli, observer: Arc<CliObserver>) -> Result<UploadConfig> {
    let mut builder = UploadConfig::builder()
        .endpoint(cli.endpoint.clone())
        .request_timeout_secs(cli.timeout)
        .observer(observer as Arc<dyn UploadObserver>);

    if let Some(v) = cli.prefer_ai {
        builder = builder.prefer_ai(v);
    }

    builder.build().context("Invalid configuration")
}

fn lock(panel: &SharedPanel) -> std::sync::MutexGuard<'_, ResultsPanel> {
    medreport_upload::panel::lock_panel(panel)
}

fn draw(panel: &SharedPanel, opts: &RenderOptions) -> Result<()> {
    let text = render_panel(&lock(panel), opts);
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    handle.flush().ok();
    Ok(())
}

/// Read commands from stdin until `q` or EOF.
async fn interact(
    uploader: &Uploader,
    file: Option<&std::path::Path>,
    panel: &SharedPanel,
    opts: &RenderOptions,
    prompt_color: bool,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("{} ", paint("row # / a / c / u / q ›", DIM, prompt_color));
        io::stderr().flush().ok();

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            return Ok(());
        };

        match line.trim() {
            "q" | "quit" => return Ok(()),
            "a" => lock(panel).expand_all(),
            "c" => lock(panel).collapse_all(),
            "u" => {
                // Errors land in the panel; blocking ones were alerted.
                let _ = uploader.submit(file, panel).await;
            }
            "" => continue,
            other => {
                let toggled = other
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| lock(panel).toggle(i));
                if toggled.is_none() {
                    let msg = format!("No such row: '{other}'");
                    eprintln!("{}", paint(&msg, RED, prompt_color));
                    continue;
                }
            }
        }
        draw(panel, opts)?;
    }
}
