//! Logging initialization.
//!
//! Installs a human-readable `tracing` subscriber on stderr. `RUST_LOG`
//! wins over the configured level when set.

use tracing_subscriber::EnvFilter;

/// Filter directive for a `-v` count, falling back to `default` at zero.
pub fn verbosity_level(verbose: u8, default: &str) -> String {
    match verbose {
        0 => default.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed (tests, embedding
/// hosts); the existing one is left in place.
pub fn init_logging(level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_level() {
        assert_eq!(verbosity_level(0, "warn"), "warn");
        assert_eq!(verbosity_level(1, "warn"), "debug");
        assert_eq!(verbosity_level(4, "warn"), "trace");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging("info");
        assert!(!init_logging("debug"));
    }
}
