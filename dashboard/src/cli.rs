//! Command-line flags for the `plot-dashboard` binary.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use shared::config::ServerConfig;
use shared::logging::Verbosity;

use crate::paths::LAYOUT_CONFIG_FILE;

/// Serves pre-rendered workload plots by version, split, distribution,
/// benchmark and database.
///
/// Flags override the PLOT_DASHBOARD_* environment variables.
#[derive(Debug, Parser)]
#[command(name = "plot-dashboard", author, version, about)]
pub struct Cli {
    /// Directory containing the *_plots trees
    #[arg(long, value_name = "DIR")]
    pub plots_root: Option<PathBuf>,

    /// Address to bind, e.g. 0.0.0.0 to serve the LAN
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<IpAddr>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Layout config file [default: <plots-root>/dashboard.toml]
    #[arg(long, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }

    /// Layers the flags over the environment config.
    pub fn apply(&self, config: ServerConfig) -> ServerConfig {
        ServerConfig {
            plots_root: self.plots_root.clone().unwrap_or(config.plots_root),
            bind: self.bind.unwrap_or(config.bind),
            port: self.port.unwrap_or(config.port),
        }
    }

    pub fn layout_path(&self, config: &ServerConfig) -> PathBuf {
        self.layout
            .clone()
            .unwrap_or_else(|| config.plots_root.join(LAYOUT_CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use clap::CommandFactory;

    use super::*;

    fn env_config() -> ServerConfig {
        ServerConfig {
            plots_root: PathBuf::from("/srv/tools"),
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8501,
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_flags_keep_environment() {
        let cli = Cli::try_parse_from(["plot-dashboard"]).unwrap();
        assert_eq!(cli.apply(env_config()), env_config());
        assert_eq!(cli.verbosity(), Verbosity::Normal);
        assert_eq!(
            cli.layout_path(&env_config()),
            PathBuf::from("/srv/tools/dashboard.toml")
        );
    }

    #[test]
    fn flags_override_environment() {
        let cli = Cli::try_parse_from([
            "plot-dashboard",
            "--plots-root",
            "tools",
            "--bind",
            "0.0.0.0",
            "-p",
            "9000",
            "--layout",
            "layout.toml",
            "-vv",
        ])
        .unwrap();
        let config = cli.apply(env_config());
        assert_eq!(config.plots_root, PathBuf::from("tools"));
        assert_eq!(config.bind, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.port, 9000);
        assert_eq!(cli.layout_path(&config), PathBuf::from("layout.toml"));
        assert_eq!(cli.verbosity(), Verbosity::Trace);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["plot-dashboard", "-q", "-v"]).is_err());
        let cli = Cli::try_parse_from(["plot-dashboard", "-q"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn rejects_invalid_bind_address() {
        assert!(Cli::try_parse_from(["plot-dashboard", "--bind", "nowhere"]).is_err());
    }
}
