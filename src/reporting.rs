//! Utilities for logging and automated bug reporting.

use std::{
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};

use eyre::Context;
use tracing_appender::{
    non_blocking::{NonBlockingBuilder, WorkerGuard},
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt};

/// Name of the log file, rotated files get a date suffix.
const LOG_FILE_NAME: &str = "pohod-weather.log";

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "warn,pohod_weather=debug,weather_api=debug,tower_http=debug";

/// Options for writing to log file.
#[derive(Clone)]
struct LogFileOptions {
    /// The directory to store the log files in.
    /// Will be created if it doesn't yet exist.
    pub directory: PathBuf,
    /// How often to rotate the log files
    pub rotation: Rotation,
}

#[derive(Clone)]
struct ReportWriterOptions {
    /// Whether to write to stdout.
    stdout: bool,
    /// Whether to write to stderr.
    stderr: bool,
    /// Whether to write to the log file.
    log_file: Option<LogFileOptions>,
}

/// Implements [std::io::Write] to write `tracing`/panic messages to
/// multiple outputs.
struct ReportWriter {
    stdout: bool,
    stderr: bool,
    log_file_writer: Option<RollingFileAppender>,
}

fn create_dir_if_not_exists(path: &Path) -> eyre::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .wrap_err_with(|| format!("Error creating directory {:?}", path))?;
    }

    Ok(())
}

impl ReportWriter {
    /// Try creating a new [ReportWriter].
    fn try_new(options: &ReportWriterOptions) -> eyre::Result<Self> {
        let log_file_writer = if let Some(log_file_options) = &options.log_file {
            create_dir_if_not_exists(&log_file_options.directory)
                .wrap_err("Unable to create log file directory")?;
            let appender = RollingFileAppender::new(
                log_file_options.rotation.clone(),
                log_file_options.directory.clone(),
                LOG_FILE_NAME,
            );

            Some(appender)
        } else {
            None
        };

        Ok(Self {
            stdout: options.stdout,
            stderr: options.stderr,
            log_file_writer,
        })
    }
}

impl Write for ReportWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut retval: usize = buf.len();

        if self.stdout || self.stderr {
            let out_str = String::from_utf8_lossy(buf);
            if self.stdout {
                print!("{}", out_str);
            }

            if self.stderr {
                eprint!("{}", out_str);
            }
        }

        if let Some(writer) = &mut self.log_file_writer {
            retval = usize::min(retval, writer.write(buf)?);
        }

        Ok(retval)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if self.stdout {
            std::io::stdout().flush()?;
        }

        if self.stderr {
            std::io::stderr().flush()?;
        }

        if let Some(writer) = &mut self.log_file_writer {
            writer.flush()?;
        }

        Ok(())
    }
}

/// Keeps the reporting backends alive, dropping it flushes any buffered log lines.
pub struct ReportingGuard {
    _sentry: Option<sentry::ClientInitGuard>,
    _writer: WorkerGuard,
}

/// Options for [`setup_reporting()`].
pub struct Options {
    /// Directory where application data is stored, logs are written to `log/` within it.
    pub data_dir: PathBuf,
    /// How often to rotate the log files.
    pub log_rotation: Rotation,
}

impl Options {
    fn log_dir(&self) -> PathBuf {
        self.data_dir.join("log")
    }
}

/// Set up `tracing` logging to stdout and the log file, error/panic reporting hooks, and
/// [sentry.io](https://sentry.io) reporting if the `SENTRY_DSN` environment variable is set.
pub fn setup_reporting(options: &Options) -> eyre::Result<ReportingGuard> {
    let sentry = if let Ok(sentry_dsn) = std::env::var("SENTRY_DSN") {
        Some(sentry::init(sentry::ClientOptions {
            dsn: Some(
                sentry_dsn
                    .parse()
                    .wrap_err("Error parsing SENTRY_DSN environment variable")?,
            ),
            release: sentry::release_name!(),
            traces_sample_rate: 0.2,
            ..sentry::ClientOptions::default()
        }))
    } else {
        None
    };

    let report_writer = ReportWriter::try_new(&ReportWriterOptions {
        stdout: true,
        stderr: false,
        log_file: Some(LogFileOptions {
            directory: options.log_dir(),
            rotation: options.log_rotation.clone(),
        }),
    })?;

    let (non_blocking_writer, report_writer_guard) = NonBlockingBuilder::default()
        .buffered_lines_limit(1000)
        .lossy(false)
        .finish(report_writer);

    let rust_log_env: String =
        std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(non_blocking_writer);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(tracing_subscriber::EnvFilter::from_str(rust_log_env.as_str()).unwrap_or_default())
        .with(tracing_error::ErrorLayer::default())
        .with(sentry.as_ref().map(|_| sentry_tracing::layer()))
        .init();

    color_eyre::install()?;

    if sentry.is_some() {
        tracing::info!("sentry.io reporting is enabled");
    }

    Ok(ReportingGuard {
        _sentry: sentry,
        _writer: report_writer_guard,
    })
}
