use std::time::Duration;

use anyhow::{Context, Result, bail};
use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::warn;

const PLACEHOLDER_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub jwt_secret: String,
    pub persist_interval: Duration,
    pub snapshot_keep: u32,
    pub seed: bool,
    pub remote: Option<RemoteConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());
        let dev = var("NUMU_DEV", "0") == "1";

        let jwt_secret = match get("NUMU_JWT_SECRET") {
            Some(secret) if secret != PLACEHOLDER_SECRET && !secret.is_empty() => secret,
            _ if dev => {
                warn!("NUMU_JWT_SECRET not set, using a random secret for this run");
                rand::rng()
                    .sample_iter(&Alphanumeric)
                    .take(48)
                    .map(char::from)
                    .collect()
            }
            _ => bail!("NUMU_JWT_SECRET must be set (or run with NUMU_DEV=1)"),
        };

        let remote = match (get("NUMU_REMOTE_URL"), get("NUMU_REMOTE_KEY")) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => {
                Some(RemoteConfig { url, key })
            }
            (Some(_), None) | (None, Some(_)) => {
                warn!("NUMU_REMOTE_URL and NUMU_REMOTE_KEY must be set together; running offline");
                None
            }
            _ => None,
        };

        Ok(Self {
            host: var("NUMU_HOST", "0.0.0.0"),
            port: var("NUMU_PORT", "3000").parse().context("NUMU_PORT")?,
            db_path: var("NUMU_DB_PATH", "numu.db"),
            jwt_secret,
            persist_interval: Duration::from_millis(
                var("NUMU_PERSIST_INTERVAL_MS", "2000")
                    .parse()
                    .context("NUMU_PERSIST_INTERVAL_MS")?,
            ),
            snapshot_keep: var("NUMU_SNAPSHOT_KEEP", "10")
                .parse()
                .context("NUMU_SNAPSHOT_KEEP")?,
            seed: var("NUMU_SEED", "1") == "1",
            remote,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let cfg = config(&[("NUMU_JWT_SECRET", "a-real-secret")]).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.db_path, "numu.db");
        assert_eq!(cfg.persist_interval, Duration::from_millis(2000));
        assert_eq!(cfg.snapshot_keep, 10);
        assert!(cfg.seed);
        assert!(cfg.remote.is_none());
    }

    #[test]
    fn placeholder_secret_needs_dev_mode() {
        assert!(config(&[]).is_err());
        assert!(config(&[("NUMU_JWT_SECRET", PLACEHOLDER_SECRET)]).is_err());

        let cfg = config(&[("NUMU_DEV", "1")]).unwrap();
        assert_eq!(cfg.jwt_secret.len(), 48);
    }

    #[test]
    fn remote_needs_both_url_and_key() {
        let secret = ("NUMU_JWT_SECRET", "s");
        assert!(config(&[secret, ("NUMU_REMOTE_URL", "https://x.co")]).unwrap().remote.is_none());
        let cfg = config(&[secret, ("NUMU_REMOTE_URL", "https://x.co"), ("NUMU_REMOTE_KEY", "anon")]).unwrap();
        assert_eq!(cfg.remote.unwrap().key, "anon");
    }

    #[test]
    fn bad_port_is_an_error() {
        assert!(config(&[("NUMU_JWT_SECRET", "s"), ("NUMU_PORT", "http")]).is_err());
    }
}
