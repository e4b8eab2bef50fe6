//! Server configuration

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use triage_engine::DEFAULT_USER_ID;
use triage_telemetry::TranscriptConfig;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// YAML file overriding the built-in rule tables and responses
    #[serde(default)]
    pub rules_path: Option<PathBuf>,

    /// Maximum number of live sessions (unbounded when unset)
    #[serde(default)]
    pub max_sessions: Option<usize>,

    /// Session identifier used when a request carries none
    #[serde(default = "default_session_id")]
    pub default_session_id: String,

    /// Maximum accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Transcript persistence; disabled when unset
    #[serde(default = "default_transcript")]
    pub transcript: Option<TranscriptConfig>,
}

impl ServerConfig {
    /// Load configuration from defaults, file, environment and CLI overrides,
    /// later sources winning
    pub fn load(config_path: &str, cli: &crate::Cli) -> anyhow::Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(config_path).required(false))
            .add_source(
                ::config::Environment::with_prefix("TRIAGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: ServerConfig = settings.try_deserialize()?;

        // Apply CLI overrides
        if let Some(listen) = &cli.listen {
            config.listen = listen.clone();
        }

        if let Some(port) = cli.port {
            config.port = port;
        }

        if let Some(rules) = &cli.rules {
            config.rules_path = Some(rules.clone());
        }

        if let Some(max_sessions) = cli.max_sessions {
            config.max_sessions = Some(max_sessions);
        }

        if cli.no_transcript {
            config.transcript = None;
        }

        Ok(config)
    }

    /// Socket address to bind; accepts IPv4 and IPv6 listen addresses
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .listen
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid listen address '{}': {}", self.listen, e))?;
        Ok(SocketAddr::from((ip, self.port)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            rules_path: None,
            max_sessions: None,
            default_session_id: default_session_id(),
            max_body_bytes: default_max_body_bytes(),
            transcript: default_transcript(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_session_id() -> String {
    DEFAULT_USER_ID.to_string()
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_transcript() -> Option<TranscriptConfig> {
    Some(TranscriptConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> crate::Cli {
        crate::Cli::parse_from(std::iter::once("triage-server").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults_without_file() {
        let config = ServerConfig::load("does-not-exist.yaml", &cli(&[])).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.default_session_id, "default");
        assert!(config.rules_path.is_none());
        assert!(config.transcript.is_some());
    }

    #[test]
    fn test_socket_addr_accepts_ipv6() {
        let config = ServerConfig {
            listen: "::".to_string(),
            port: 8080,
            ..ServerConfig::default()
        };
        assert_eq!(config.socket_addr().unwrap().to_string(), "[::]:8080");

        let config = ServerConfig {
            listen: "127.0.0.1".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8080");

        let config = ServerConfig {
            listen: "localhost".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_file_then_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triage.yaml");
        std::fs::write(
            &path,
            "port: 9000\nmax_sessions: 50\ntranscript:\n  dir: /tmp/chat\n  hash_session_ids: false\n",
        )
        .unwrap();
        let path = path.to_str().unwrap();

        let config = ServerConfig::load(path, &cli(&[])).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_sessions, Some(50));
        let transcript = config.transcript.unwrap();
        assert_eq!(transcript.dir, PathBuf::from("/tmp/chat"));
        assert!(!transcript.hash_session_ids);

        let config = ServerConfig::load(path, &cli(&["-P", "9100", "--no-transcript"])).unwrap();
        assert_eq!(config.port, 9100);
        assert!(config.transcript.is_none());
    }
}
