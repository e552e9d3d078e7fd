#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Signal {
    SIGTERM,
    SIGINT,
    SIGQUIT,
    SIGHUP,
    Other(String),
}

impl From<&str> for Signal {
    fn from(source: &str) -> Self {
        match source.to_uppercase().as_ref() {
            "SIGTERM" => Signal::SIGTERM,
            "SIGINT" => Signal::SIGINT,
            "SIGQUIT" => Signal::SIGQUIT,
            "SIGHUP" => Signal::SIGHUP,
            _ => Signal::Other(source.to_string()),
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Other(name) => f.write_str(name),
            other => write!(f, "{other:?}"),
        }
    }
}
