use std::path::MAIN_SEPARATOR;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum InvalidParams {
    #[error("The service name must not be empty")]
    EmptyName,
    #[error("The service name {0:?} must not contain a path separator")]
    PathSeparator(String),
    #[error("The executable path must not be empty")]
    EmptyExecutable,
}

/// Checks that `name` can only ever refer to a file directly inside the host's
/// service directory.
pub fn validate_name(name: &str) -> Result<(), InvalidParams> {
    if name.is_empty() {
        return Err(InvalidParams::EmptyName);
    }
    if name.contains(['/', '\\', MAIN_SEPARATOR]) {
        return Err(InvalidParams::PathSeparator(name.to_owned()));
    }
    Ok(())
}

/// Everything the host needs to create a new service record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstallParams {
    name: String,
    executable: String,
    args: String,
    display_name: String,
    description: String,
}

impl InstallParams {
    pub fn new(
        name: impl Into<String>,
        executable: impl Into<String>,
    ) -> Result<Self, InvalidParams> {
        let name = name.into();
        let executable = executable.into();
        validate_name(&name)?;
        if executable.is_empty() {
            return Err(InvalidParams::EmptyExecutable);
        }
        Ok(Self {
            name,
            executable,
            args: String::new(),
            display_name: String::new(),
            description: String::new(),
        })
    }

    /// Arguments are passed to the host verbatim. No quoting is applied, so an argument
    /// containing whitespace is split by the host.
    pub fn with_args(mut self, args: impl Into<String>) -> Self {
        self.args = args.into();
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn args(&self) -> &str {
        &self.args
    }

    pub fn display_name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn split_args(&self) -> impl Iterator<Item = &str> {
        self.args.split(' ').filter(|a| !a.is_empty())
    }

    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.executable.clone()
        } else {
            format!("{} {}", self.executable, self.args)
        }
    }
}

#[cfg(test)]
#[path = "./install_params_test.rs"]
mod install_params_test;
