use std::io::{stderr, stdout};

use time::UtcOffset;
use time::format_description::well_known::Rfc3339;
use tracing::Level;
use tracing::Subscriber;
use tracing_appender::non_blocking::NonBlockingBuilder;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

use crate::LoggerGuard;

// Lifecycle commands log a handful of lines; the tracing-appender default is far larger.
const OUTPUT_BUFFER_LIMIT: usize = 256;

#[derive(thiserror::Error, Debug)]
pub enum LoggerCreationError {
    #[error("Invalid filter directive: {0}")]
    InvalidDirective(#[from] ParseError),
    #[cfg(feature = "linux-journald")]
    #[error("Error creating journald logging layer: {0}")]
    JournaldFailure(std::io::Error),
    #[cfg(feature = "file")]
    #[error("Error creating file logging layer: Unable to locate a home directory")]
    NoHomeDir,
}

#[derive(Debug, Clone)]
pub struct LoggerBuilder {
    #[cfg_attr(
        not(any(feature = "file", feature = "linux-journald")),
        allow(dead_code)
    )]
    name: String,
    log_level: Level,
    env_filter_directives: Vec<String>,
    log_to_stdout: bool,
    log_to_stderr: bool,
}

impl LoggerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            log_level: Level::INFO,
            env_filter_directives: vec![],
            log_to_stdout: false,
            log_to_stderr: true,
        }
    }

    pub fn with_log_level(mut self, log_level: Level) -> Self {
        self.log_level = log_level;
        self
    }

    pub fn with_log_to_stdout(mut self, log_to_stdout: bool) -> Self {
        self.log_to_stdout = log_to_stdout;
        self
    }

    pub fn with_log_to_stderr(mut self, log_to_stderr: bool) -> Self {
        self.log_to_stderr = log_to_stderr;
        self
    }

    /// Adds a directive such as `svcapp_client=trace`. Parsed when the logger is built.
    pub fn with_env_filter_directive(mut self, directive: impl Into<String>) -> Self {
        self.env_filter_directives.push(directive.into());
        self
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggerCreationError> {
        let mut filter = EnvFilter::from_default_env().add_directive(self.log_level.into());
        for directive in &self.env_filter_directives {
            filter = filter.add_directive(directive.parse::<Directive>()?);
        }
        Ok(filter)
    }

    pub fn build(
        self,
    ) -> Result<
        (
            impl SubscriberInitExt + Subscriber + for<'a> LookupSpan<'a>,
            LoggerGuard,
        ),
        LoggerCreationError,
    > {
        // Must run before any threads are spawned or the local offset is indeterminate.
        let timer = OffsetTime::local_rfc_3339()
            .unwrap_or_else(|_| OffsetTime::new(UtcOffset::UTC, Rfc3339));
        let mut guard = LoggerGuard::default();

        let collector = tracing_subscriber::registry()
            .with(self.env_filter()?)
            .with(tracing_error::ErrorLayer::default());

        let stdout_layer = if self.log_to_stdout {
            let (writer, writer_guard) = NonBlockingBuilder::default()
                .buffered_lines_limit(OUTPUT_BUFFER_LIMIT)
                .finish(stdout());
            guard.add_guard(writer_guard);
            Some(Layer::new().with_timer(timer.clone()).with_writer(writer))
        } else {
            None
        };

        let stderr_layer = if self.log_to_stderr {
            let (writer, writer_guard) = NonBlockingBuilder::default()
                .buffered_lines_limit(OUTPUT_BUFFER_LIMIT)
                .finish(stderr());
            guard.add_guard(writer_guard);
            Some(Layer::new().with_timer(timer.clone()).with_writer(writer))
        } else {
            None
        };

        let collector = collector.with(stdout_layer).with(stderr_layer);

        #[cfg(feature = "file")]
        let collector = {
            use tracing::metadata::LevelFilter;
            use tracing_subscriber::Layer as _;

            let dirs = directories::ProjectDirs::from("", "", &self.name)
                .ok_or(LoggerCreationError::NoHomeDir)?;
            let appender = tracing_appender::rolling::RollingFileAppender::new(
                tracing_appender::rolling::Rotation::DAILY,
                dirs.cache_dir(),
                format!("{}.log", self.name),
            );
            let (writer, writer_guard) = NonBlockingBuilder::default()
                .buffered_lines_limit(OUTPUT_BUFFER_LIMIT)
                .finish(appender);
            guard.add_guard(writer_guard);
            collector.with(
                Layer::new()
                    .with_timer(timer.clone())
                    .with_thread_ids(true)
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(LevelFilter::from_level(self.log_level)),
            )
        };

        #[cfg(all(target_os = "linux", feature = "linux-journald"))]
        let collector = collector.with(
            tracing_journald::layer()
                .map_err(LoggerCreationError::JournaldFailure)?
                .with_syslog_identifier(self.name.clone()),
        );

        Ok((collector, guard))
    }
}

#[cfg(test)]
#[path = "./logger_builder_test.rs"]
mod logger_builder_test;
