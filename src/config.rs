//! Application-level configuration loading: listen address and nickname defaults.

use std::{
    env, fs,
    io::ErrorKind,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "ULTIMATE_TTT_CONFIG_PATH";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_NICK_PREFIX: &str = "Player-";
/// Number of client id characters appended to the nickname prefix.
const NICK_SUFFIX_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    host: IpAddr,
    port: u16,
    default_nick_prefix: String,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        port = app_config.port,
                        "loaded config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Replace the listening port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Address the HTTP/WebSocket listener binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Nickname given to a client that never chose one.
    pub fn default_nick(&self, client_id: &str) -> String {
        let suffix: String = client_id.chars().take(NICK_SUFFIX_LEN).collect();
        format!("{}{suffix}", self.default_nick_prefix)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            default_nick_prefix: DEFAULT_NICK_PREFIX.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
/// Missing fields keep their defaults.
struct RawConfig {
    host: Option<IpAddr>,
    port: Option<u16>,
    default_nick_prefix: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            host: value.host.unwrap_or(defaults.host),
            port: value.port.unwrap_or(defaults.port),
            default_nick_prefix: value
                .default_nick_prefix
                .unwrap_or(defaults.default_nick_prefix),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let raw: RawConfig = serde_json::from_str(r#"{"defaultNickPrefix": "Guest-"}"#).unwrap();
        let config = AppConfig::from(raw);

        assert_eq!(config.bind_addr().port(), DEFAULT_PORT);
        assert_eq!(config.default_nick("0a1b2c3d4e5f"), "Guest-0a1b");
    }

    #[test]
    fn port_override_applies() {
        let config = AppConfig::default().with_port(8081);
        assert_eq!(config.bind_addr(), "0.0.0.0:8081".parse().unwrap());
    }
}
