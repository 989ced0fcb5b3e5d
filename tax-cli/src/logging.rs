//! Log output for the `salary-tax` binary.
//!
//! Records go to stderr so reports on stdout can be piped or redirected.
//! One global filter caps every output. The terminal output can be switched
//! off on its own, and the file output discards records until a path is set.

use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, reload};

/// Filter used when neither `--log-level` nor `RUST_LOG` is given.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Logging options from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSettings<'a> {
    /// A bare level or any `RUST_LOG`-style directive.
    pub level: Option<&'a str>,
    pub file: Option<&'a Path>,
    /// Silences the terminal; the log file still receives records.
    pub quiet: bool,
}

type Reloader = Box<dyn Fn(EnvFilter) -> Result<()> + Send + Sync>;

/// Runtime handles into the installed subscriber.
struct Controls {
    level: Reloader,
    terminal: Reloader,
    file: Arc<Mutex<Option<File>>>,
}

static CONTROLS: OnceLock<Controls> = OnceLock::new();

fn controls() -> Result<&'static Controls> {
    CONTROLS.get().context("logging not yet initialized")
}

fn reloader<S>(handle: reload::Handle<EnvFilter, S>) -> Reloader
where
    S: Subscriber + Send + Sync + 'static,
{
    Box::new(move |filter| {
        handle
            .reload(filter)
            .map_err(|e| anyhow!("log filter reload failed: {e}"))
    })
}

/// `2025-06-30 14:02:11.512  WARN tax_core::models::salary_input message k=v`
struct LineFormat;

fn level_color(level: Level) -> &'static str {
    match level {
        Level::ERROR => "1;31",
        Level::WARN => "1;33",
        Level::INFO => "1;32",
        Level::DEBUG => "1;34",
        Level::TRACE => "1;35",
    }
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let level = *meta.level();

        if writer.has_ansi_escapes() {
            write!(
                writer,
                "\x1b[2m{stamp}\x1b[0m \x1b[{}m{level:>5}\x1b[0m \x1b[36m{}\x1b[0m ",
                level_color(level),
                meta.target()
            )?;
        } else {
            write!(writer, "{stamp} {level:>5} {} ", meta.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// File output that can be attached after the subscriber is installed.
#[derive(Clone)]
struct LogFile(Arc<Mutex<Option<File>>>);

struct LogFileGuard<'a>(MutexGuard<'a, Option<File>>);

impl Write for LogFileGuard<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        match self.0.as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.as_mut().map_or(Ok(()), |file| file.flush())
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFileGuard<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileGuard(self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Installs the global subscriber. Later calls leave the first one in place.
///
/// The starting filter is `RUST_LOG` when set, else [`DEFAULT_LOG_LEVEL`].
/// Colors are used only when stderr is a terminal.
pub fn init_default_logging() {
    let file = Arc::new(Mutex::new(None));
    let (level_filter, level_handle) = reload::Layer::new(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
    );
    let (terminal_gate, terminal_handle) = reload::Layer::new(EnvFilter::new("trace"));

    let terminal = tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_filter(terminal_gate);
    let log_file = tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_ansi(false)
        .with_writer(LogFile(Arc::clone(&file)));

    let installed = tracing_subscriber::registry()
        .with(level_filter)
        .with(terminal)
        .with(log_file)
        .try_init();

    if installed.is_ok() {
        let _ = CONTROLS.set(Controls {
            level: reloader(level_handle),
            terminal: reloader(terminal_handle),
            file,
        });
    }
}

/// Replaces the global filter.
pub fn set_log_level(level: &str) -> Result<()> {
    let filter =
        EnvFilter::try_new(level).map_err(|e| anyhow!("invalid log level '{level}': {e}"))?;
    (controls()?.level)(filter)
}

/// Turns terminal output on or off.
pub fn set_terminal_enabled(enabled: bool) -> Result<()> {
    let gate = if enabled { "trace" } else { "off" };
    (controls()?.terminal)(EnvFilter::new(gate))
}

/// Appends records to `path` from now on, replacing any earlier file.
pub fn enable_file_logging(path: &Path) -> Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))?;

    *controls()?.file.lock().unwrap_or_else(PoisonError::into_inner) = Some(file);
    Ok(())
}

/// Applies command-line logging options to the installed subscriber.
pub fn apply(settings: &LogSettings<'_>) -> Result<()> {
    if let Some(level) = settings.level {
        set_log_level(level)?;
    }
    if let Some(path) = settings.file {
        enable_file_logging(path)?;
    }
    if settings.quiet {
        set_terminal_enabled(false)?;
    }
    Ok(())
}
