//! CLI binary for docmistral.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConverterConfig` and reports results. Batch mode mirrors `--input` into
//! `--output`; `--file` converts one file into `--output`.

use anyhow::{bail, Context, Result};
use clap::Parser;
use docmistral::{
    process_directory, BatchProgressCallback, BatchTally, Converter, ConverterConfig, DocMistralError,
    ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the files of a batch run, with a
/// log line per finished file.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start time of the file currently being converted.
    started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("Looking for documents…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Mutex::new(None),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .ok()
            .and_then(|mut t| t.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_files as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Found {total_files} files to convert…"))
        ));
    }

    fn on_file_start(&self, path: &Path, _index: usize, _total: usize) {
        if let Ok(mut t) = self.started.lock() {
            *t = Some(Instant::now());
        }
        self.bar.set_message(file_label(path));
    }

    fn on_file_complete(&self, path: &Path, index: usize, total: usize, markdown_len: usize) {
        let secs = self.elapsed_secs();
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}  {}",
            green("✓"),
            index,
            total,
            file_label(path),
            dim(&format!("{markdown_len:>6} chars")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, path: &Path, index: usize, total: usize, error: &str) {
        let secs = self.elapsed_secs();
        // First line only; keep the log tidy.
        let first = error.lines().next().unwrap_or_default();
        let msg = if first.chars().count() > 80 {
            format!("{}\u{2026}", first.chars().take(79).collect::<String>())
        } else {
            first.to_string()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}  {}",
            red("✗"),
            index,
            total,
            file_label(path),
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _tally: &BatchTally) {
        self.bar.finish_and_clear();
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Mirror ./input into ./output
  docmistral

  # Custom directories
  docmistral -i ~/scans -o ~/scans-md

  # One file, written to ./output/report.md
  docmistral -f report.pdf

  # Also OCR the images embedded in a PDF (writes report.images.md)
  docmistral -f report.pdf --embedded-images

SUPPORTED FORMATS:
  Documents   .pdf .pptx .docx
  Images      .png .jpg .jpeg .gif .bmp .avif

ENVIRONMENT VARIABLES:
  MISTRAL_API_KEY         Mistral API key (also read from ./.env)
  DOCMISTRAL_MODEL        Override OCR model ID
  DOCMISTRAL_ENDPOINT     Override OCR endpoint URL
  RUST_LOG                Override log filter
"#;

/// Convert documents and images to Markdown using Mistral OCR.
#[derive(Parser, Debug)]
#[command(
    name = "docmistral",
    version,
    about = "Convert documents and images to Markdown using Mistral OCR",
    long_about = "Convert PDF, PowerPoint and Word documents and PNG/JPEG/GIF/BMP/AVIF images to \
Markdown using the Mistral OCR API. Batch mode mirrors an input directory tree into an output \
tree of .md files.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input directory (batch mode).
    #[arg(short, long, default_value = "input")]
    input: PathBuf,

    /// Output directory.
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Convert a single file instead of a directory.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Mistral API key.
    #[arg(short = 'k', long, env = "MISTRAL_API_KEY", hide_env_values = true)]
    mistral_api_key: Option<String>,

    /// OCR model ID.
    #[arg(long, env = "DOCMISTRAL_MODEL")]
    model: Option<String>,

    /// OCR endpoint URL.
    #[arg(long, env = "DOCMISTRAL_ENDPOINT")]
    endpoint: Option<String>,

    /// Per-request timeout in seconds (default: none).
    #[arg(long)]
    timeout: Option<u64>,

    /// With --file on a PDF: also OCR embedded images into <stem>.images.md.
    #[arg(long)]
    embedded_images: bool,

    /// Disable progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; only the real environment is used then.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs in batch mode.
    let show_progress = !cli.quiet && !cli.no_progress && cli.file.is_none();
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

    let Some(api_key) = cli.mistral_api_key.clone().filter(|k| !k.trim().is_empty()) else {
        return Err(DocMistralError::MissingCredential.into());
    };

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, api_key, progress_cb)?;
    let converter = Converter::new(config).context("Failed to initialize Mistral OCR client")?;

    match cli.file {
        Some(ref file) => convert_single(&cli, &converter, file).await,
        None => convert_batch(&cli, &converter).await,
    }
}

/// Map CLI args to `ConverterConfig`.
fn build_config(cli: &Cli, api_key: String, progress: Option<ProgressCallback>) -> Result<ConverterConfig> {
    let mut builder = ConverterConfig::builder().api_key(api_key);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref endpoint) = cli.endpoint {
        builder = builder.endpoint(endpoint);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn is_pdf(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

async fn convert_single(cli: &Cli, converter: &Converter, file: &Path) -> Result<()> {
    if !file.exists() {
        return Err(DocMistralError::InputNotFound {
            path: file.to_path_buf(),
        }
        .into());
    }
    if cli.embedded_images && !is_pdf(file) {
        bail!("--embedded-images only applies to PDF files");
    }

    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let output = cli.output.join(format!("{stem}.md"));

    let started = Instant::now();
    let result = converter.convert_file(file, &output).await;
    if let Some(ref e) = result.error {
        bail!("Conversion of {} failed: {}", file.display(), e);
    }

    if !cli.quiet {
        eprintln!(
            "{}  {} chars  {:.1}s  →  {}",
            green("✔"),
            result.markdown.len(),
            started.elapsed().as_secs_f64(),
            bold(&output.display().to_string()),
        );
    }

    if cli.embedded_images {
        let sidecar = cli.output.join(format!("{stem}.images.md"));
        let report = converter
            .extract_embedded_images_to_file(file, &sidecar)
            .await
            .context("Embedded image extraction failed")?;

        if !cli.quiet {
            if report.is_empty() {
                eprintln!("   {}", dim("no embedded images found"));
            } else {
                eprintln!(
                    "{}  {} images  ({} skipped)  →  {}",
                    if report.skipped.is_empty() { green("✔") } else { cyan("⚠") },
                    report.images.len(),
                    report.skipped.len(),
                    bold(&sidecar.display().to_string()),
                );
            }
        }
    }

    Ok(())
}

async fn convert_batch(cli: &Cli, converter: &Converter) -> Result<()> {
    let started = Instant::now();
    let tally = process_directory(converter, &cli.input, &cli.output)
        .await
        .context("Batch conversion failed")?;

    if !cli.quiet {
        eprintln!(
            "{} {}/{} files converted  {}  →  {}",
            if tally.failed == 0 { green("✔") } else { cyan("⚠") },
            bold(&tally.success.to_string()),
            tally.total(),
            dim(&format!("{:.1}s", started.elapsed().as_secs_f64())),
            bold(&cli.output.display().to_string()),
        );
    }

    if tally.failed > 0 {
        bail!("{} of {} files failed to convert", tally.failed, tally.total());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_images_need_a_pdf() {
        assert!(is_pdf(Path::new("report.pdf")));
        assert!(is_pdf(Path::new("dir/SCAN.PDF")));
        assert!(!is_pdf(Path::new("photo.png")));
        assert!(!is_pdf(Path::new("pdf")));
    }

    #[tokio::test]
    async fn non_pdf_with_embedded_images_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.png");
        std::fs::write(&input, b"\x89PNG").unwrap();
        let out = dir.path().join("out");

        let cli = Cli::parse_from([
            "docmistral".as_ref(),
            "--file".as_ref(),
            input.as_os_str(),
            "--output".as_ref(),
            out.as_os_str(),
            "--embedded-images".as_ref(),
            "--quiet".as_ref(),
        ]);
        let converter = Converter::new(ConverterConfig::default()).unwrap();

        let err = convert_single(&cli, &converter, &input).await.unwrap_err();
        assert!(err.to_string().contains("only applies to PDF"), "{err}");
        assert!(!out.join("photo.md").exists());
    }
}
