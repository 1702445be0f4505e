//! Tracing subscriber setup for the relay binary.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Installs a formatting subscriber filtered by `RUST_LOG`, falling back to
/// [`DEFAULT_LOG_FILTER`] when the variable is unset or unparsable.
///
/// Log lines go to stderr so stdout stays free for chat output. Returns an error
/// when a global subscriber is already installed.
pub fn try_init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::try_init;

    #[test]
    fn second_initialization_reports_an_error() {
        let _ = try_init();
        assert!(try_init().is_err());
    }
}
