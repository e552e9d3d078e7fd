use std::fmt::{Debug, Display};
use std::sync::OnceLock;

pub use color_eyre;
use color_eyre::Report;
use color_eyre::config::Theme;
use tracing::error;

static HANDLER: OnceLock<ErrorHandler> = OnceLock::new();

#[derive(thiserror::Error, Debug)]
#[error("Unable to install error handler: {0}")]
pub struct HookInstallError(String);

/// Decides where fatal errors and panics are written.
#[derive(Clone, Default)]
pub struct ErrorHandler {
    log: bool,
}

impl ErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends errors to the logger instead of stderr, for processes without a console.
    pub fn with_log(self, log: bool) -> Self {
        Self { log }
    }

    /// Installs the color-eyre hooks and a panic hook that writes through this handler.
    /// Can only succeed once per process.
    pub fn install(self) -> Result<(), HookInstallError> {
        let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
            .add_default_filters()
            .theme(Theme::dark())
            .into_hooks();

        HANDLER
            .set(self.clone())
            .map_err(|_| HookInstallError("Handler was already set".to_owned()))?;

        eyre_hook
            .install()
            .map_err(|e| HookInstallError(e.to_string()))?;

        std::panic::set_hook(Box::new(move |info| {
            self.write_output(panic_hook.panic_report(info));
        }));
        Ok(())
    }

    fn write_output(&self, output: impl Display) {
        if self.log {
            error!("{output}");
        } else {
            eprintln!("{output}");
        }
    }
}

/// Error type for `main`. Returning it prints the error through the installed handler.
pub struct ErrorSink {
    report: Report,
}

impl ErrorSink {
    pub fn new(source: impl Into<Report>) -> Self {
        Self {
            report: source.into(),
        }
    }

    /// True for lifecycle refusals such as `AlreadyRunning`, which render as one line.
    pub fn is_brief(&self) -> bool {
        self.report
            .downcast_ref::<svcapp_core::Error>()
            .is_some_and(svcapp_core::Error::is_precondition)
    }

    pub fn render(&self) -> String {
        if self.is_brief() {
            self.report.to_string()
        } else {
            format!("{:?}", self.report)
        }
    }
}

impl<R> From<R> for ErrorSink
where
    R: Into<Report>,
{
    fn from(value: R) -> Self {
        Self::new(value)
    }
}

impl Debug for ErrorSink {
    fn fmt(&self, _: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handler = HANDLER.get().cloned().unwrap_or_default();
        handler.write_output(self.render());
        Ok(())
    }
}
