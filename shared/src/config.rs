use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::{env, io};

use anyhow::{Context, Result};

pub const ROOT_VAR: &str = "PLOT_DASHBOARD_ROOT";
pub const BIND_VAR: &str = "PLOT_DASHBOARD_BIND";
pub const PORT_VAR: &str = "PLOT_DASHBOARD_PORT";

pub const DEFAULT_BIND: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub const DEFAULT_PORT: u16 = 8501;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Directory holding the `*_plots` trees
    pub plots_root: PathBuf,
    pub bind: IpAddr,
    pub port: u16,
}

impl ServerConfig {
    pub fn load(manifest_dir: &Path) -> Result<Self> {
        #[cfg(debug_assertions)]
        if let Err(e) = dotenvy::from_path(manifest_dir.join(".env")) {
            if !e.not_found() {
                return Err(e).context("Can't read .env file");
            }
        }

        Self::from_lookup(|key| match env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        })
    }

    /// Builds the config from an arbitrary variable source. Unset variables
    /// fall back to defaults; set but unparsable ones are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> io::Result<Option<String>>,
    {
        let var = |key: &str| lookup(key).with_context(|| format!("Can't read {key}"));

        let plots_root = var(ROOT_VAR)?
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let bind = match var(BIND_VAR)? {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Expected an IP address in {BIND_VAR}, got {raw:?}"))?,
            None => DEFAULT_BIND,
        };

        let port = match var(PORT_VAR)? {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Expected a port number in {PORT_VAR}, got {raw:?}"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            plots_root,
            bind,
            port,
        })
    }
}

/// Load server config using the calling crate's manifest directory.
#[macro_export]
macro_rules! load_server_config {
    () => {
        $crate::config::ServerConfig::load(std::path::Path::new(env!("CARGO_MANIFEST_DIR")))
    };
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(
        vars: &[(&str, &str)],
    ) -> impl Fn(&str) -> io::Result<Option<String>> + use<> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| Ok(vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.plots_root, PathBuf::from("."));
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.port, 8501);
    }

    #[test]
    fn reads_all_variables() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            (ROOT_VAR, "/srv/tools"),
            (BIND_VAR, "0.0.0.0"),
            (PORT_VAR, " 9000 "),
        ]))
        .unwrap();
        assert_eq!(config.plots_root, PathBuf::from("/srv/tools"));
        assert_eq!(config.bind, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn rejects_bad_port() {
        let err = ServerConfig::from_lookup(lookup_from(&[(PORT_VAR, "eighty")])).unwrap_err();
        assert!(err.to_string().contains(PORT_VAR));
    }

    #[test]
    fn rejects_bad_bind_address() {
        let err = ServerConfig::from_lookup(lookup_from(&[(BIND_VAR, "localhost:80")])).unwrap_err();
        assert!(err.to_string().contains(BIND_VAR));
    }
}
