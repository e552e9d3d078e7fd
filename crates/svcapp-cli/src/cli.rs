use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use svcapp_client::config::ClientConfig;
use svcapp_client::{InstallParams, Manager};
use svcapp_error_handler::ErrorSink;
use tracing::{Level, info};

#[derive(Parser, Debug)]
#[command(name = "svcapp", version, about = "Install and control a native OS service")]
pub struct Cli {
    /// TOML file with host settings. Environment variables take precedence.
    #[arg(long, global = true, env = "SVCAPP_CONFIG")]
    pub config: Option<PathBuf>,
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Register the service with the host's service manager
    Install {
        #[arg(long)]
        name: String,
        /// Absolute path to the program the host launches
        #[arg(long)]
        executable: String,
        /// Space-separated arguments, passed through without quoting
        #[arg(long, allow_hyphen_values = true)]
        args: Option<String>,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Start an installed service
    Start { name: String },
    /// Stop a running service and wait for it to exit
    Stop { name: String },
    /// Print the service's current state
    Status { name: String },
    /// Remove the service from the host
    Uninstall { name: String },
    /// Run as the service process until the host asks it to stop
    Run { name: String },
    /// Print a config file template
    Config,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.verbose { Level::DEBUG } else { Level::INFO }
    }

    /// A service process may have no console, so its errors go to the logger.
    pub fn logs_errors(&self) -> bool {
        matches!(self.command, Command::Run { .. })
    }

    pub fn run(self) -> Result<(), ErrorSink> {
        let mut stdout = io::stdout();
        match &self.command {
            Command::Config => {
                write!(stdout, "{}", ClientConfig::template())?;
                Ok(())
            }
            Command::Run { name } => {
                let signal = svcapp_server::run(name)?;
                info!("{name} exited after {signal}");
                Ok(())
            }
            command => {
                let config = ClientConfig::load(self.config.as_deref())?;
                let manager = svcapp_client::builder().with_config(&config).build()?;
                let color = stdout.is_terminal();
                command.execute(manager.as_ref(), &mut stdout, color)
            }
        }
    }
}

impl Command {
    /// Applies a lifecycle command to `manager`, writing any output to `out`.
    pub fn execute(
        &self,
        manager: &dyn Manager,
        out: &mut impl Write,
        color: bool,
    ) -> Result<(), ErrorSink> {
        match self {
            Command::Install {
                name,
                executable,
                args,
                display_name,
                description,
            } => {
                let mut params = InstallParams::new(name, executable)?;
                if let Some(args) = args {
                    params = params.with_args(args);
                }
                if let Some(display_name) = display_name {
                    params = params.with_display_name(display_name);
                }
                if let Some(description) = description {
                    params = params.with_description(description);
                }
                manager.install(&params)?;
            }
            Command::Start { name } => manager.start(name)?,
            Command::Stop { name } => manager.stop(name)?,
            Command::Status { name } => {
                let state = manager.status(name)?;
                if color {
                    writeln!(out, "{}", state.pretty_print())?;
                } else {
                    writeln!(out, "{state}")?;
                }
            }
            Command::Uninstall { name } => manager.uninstall(name)?,
            Command::Run { .. } | Command::Config => {}
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "./cli_test.rs"]
mod cli_test;
