//! Tracing setup shared by the workspace binaries.

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// How chatty the default log filter is when `RUST_LOG` is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Trace,
}

impl Verbosity {
    /// Maps `-q` and repeated `-v` flags onto a verbosity.
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    pub fn level(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Default filter directive for a crate, e.g. `plot_dashboard=info`.
pub fn default_directive(crate_name: &str, verbosity: Verbosity) -> String {
    format!("{}={}", crate_name.replace('-', "_"), verbosity.level())
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over
/// `verbosity`.
pub fn init(crate_name: &str, verbosity: Verbosity) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(crate_name, verbosity)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .context("Failed to install tracing subscriber")
}

/// Initialize tracing for the calling crate.
#[macro_export]
macro_rules! init_tracing {
    () => {
        $crate::logging::init(env!("CARGO_PKG_NAME"), $crate::logging::Verbosity::default())
    };
    ($verbosity:expr) => {
        $crate::logging::init(env!("CARGO_PKG_NAME"), $verbosity)
    };
}
