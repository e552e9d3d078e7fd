use clap::Parser;
use svcapp_error_handler::{ErrorHandler, ErrorSink};
use svcapp_logging::LoggerBuilder;
use svcapp_logging::tracing_subscriber::util::SubscriberInitExt;

mod cli;
use cli::Cli;

fn main() -> Result<(), ErrorSink> {
    let cli = Cli::parse();
    ErrorHandler::new().with_log(cli.logs_errors()).install()?;

    let (logger, _guard) = LoggerBuilder::new("svcapp")
        .with_log_level(cli.log_level())
        .build()?;
    logger.init();

    cli.run()
}
