use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    /// Sessions expire after this long without a request.
    pub session_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = get("WARBLER_DB_PATH")
            .or_else(|| {
                get("DATABASE_URL").map(|url| {
                    url.trim_start_matches("sqlite://")
                        .trim_start_matches("sqlite:")
                        .to_string()
                })
            })
            .unwrap_or_else(|| "warbler.db".into());
        let host = get("WARBLER_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = get("WARBLER_PORT")
            .unwrap_or_else(|| "5000".into())
            .parse()
            .context("WARBLER_PORT must be a port number")?;
        let session_minutes: i64 = get("WARBLER_SESSION_MINUTES")
            .unwrap_or_else(|| "60".into())
            .parse()
            .context("WARBLER_SESSION_MINUTES must be a whole number of minutes")?;

        Ok(Self {
            db_path: PathBuf::from(db_path),
            host,
            port,
            session_minutes,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.db_path, PathBuf::from("warbler.db"));
        assert_eq!(config.port, 5000);
        assert_eq!(config.session_minutes, 60);
        assert_eq!(config.addr().unwrap().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn database_url_is_a_fallback() {
        let config =
            Config::from_lookup(lookup(&[("DATABASE_URL", "sqlite://data/warbler.db")])).unwrap();
        assert_eq!(config.db_path, PathBuf::from("data/warbler.db"));

        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite://data/warbler.db"),
            ("WARBLER_DB_PATH", "/tmp/w.db"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/w.db"));
    }

    #[test]
    fn bad_port_is_an_error() {
        assert!(Config::from_lookup(lookup(&[("WARBLER_PORT", "http")])).is_err());
    }
}
