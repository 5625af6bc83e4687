//! Diagnostic logging through `tracing`
//!
//! Status lines meant for the user go through [`crate::utils::terminal`];
//! this subscriber only carries the `debug!`/`warn!` trail of what was run.
//! Filter directives come from `MXBUILD_LOG`, then `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Environment variable read before `RUST_LOG`
pub const LOG_ENV: &str = "MXBUILD_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

/// Install the global subscriber. Safe to call more than once.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        init();
        init();
    }
}
