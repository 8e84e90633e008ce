//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use std::fs;
use std::io::Write as _;
use std::sync::Mutex;

use super::utils::{HEADER_STAMP, LINE_STAMP, log_file_path, strip_ansi, timestamp};

/// Target used for stage headers.
pub(super) const STAGE_TARGET: &str = "dotlink::stage";
/// Target used for actions reported (but not performed) by a dry run.
pub(super) const DRY_RUN_TARGET: &str = "dotlink::dry_run";

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// Prefix of a log file line, chosen by level and target.
fn file_tag(level: tracing::Level, target: &str) -> &'static str {
    match (level, target) {
        (tracing::Level::INFO, STAGE_TARGET) => "==> ",
        (tracing::Level::INFO, DRY_RUN_TARGET) => "    [dry run] ",
        (tracing::Level::INFO, _) => "    ",
        (tracing::Level::ERROR, _) => "    [error] ",
        (tracing::Level::WARN, _) => "    [warn] ",
        _ => "    [debug] ",
    }
}

/// A [`tracing_subscriber::Layer`] that appends all events to the persistent
/// log file with timestamps and ANSI codes stripped.
///
/// Always captures events at `DEBUG` and above regardless of the console
/// verbosity, so executed filesystem actions end up in the file even when
/// the console only shows the per-file summary.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open (or create) the log file for `command`, write a run header, and
    /// return a new `FileLayer` ready to receive events.
    ///
    /// Returns `None` if the cache directory cannot be created or the file
    /// cannot be opened.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command)?;
        let version =
            option_env!("DOTLINK_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let header = format!("# dotlink {version} {command} {}\n", timestamp(HEADER_STAMP));
        fs::write(&path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let line = format!(
            "[{}] {}{}",
            timestamp(LINE_STAMP),
            file_tag(*metadata.level(), metadata.target()),
            strip_ansi(&extractor.message)
        );

        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] that emits dotlink-style
/// console output.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        writeln!(
            writer,
            "{}",
            console_line(*metadata.level(), metadata.target(), &extractor.message)
        )
    }
}

/// Console rendering of one event.
fn console_line(level: tracing::Level, target: &str, msg: &str) -> String {
    match (level, target) {
        (tracing::Level::ERROR, _) => format!("\x1b[31mERROR\x1b[0m {msg}"),
        (tracing::Level::WARN, _) => format!("\x1b[33mWARN\x1b[0m  {msg}"),
        (tracing::Level::INFO, STAGE_TARGET) => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
        (tracing::Level::INFO, DRY_RUN_TARGET) => format!("  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
        (tracing::Level::INFO, _) => format!("  {msg}"),
        _ => format!("  \x1b[2m{msg}\x1b[0m"),
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Console output goes to stdout (info and below) and stderr (warnings and
/// errors); every event from `DEBUG` up is also appended to
/// `$XDG_CACHE_HOME/dotlink/<command>.log`. `RUST_LOG` overrides the console
/// level when set. Must be called once at program startup, before any
/// logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        EnvFilter, Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let console_filter = EnvFilter::builder()
        .with_default_directive(console_level.into())
        .from_env_lossy();

    let make_writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .and(std::io::stdout.with_min_level(tracing::Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(make_writer)
        .with_filter(console_filter);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
