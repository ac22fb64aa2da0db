use anyhow::{anyhow, Result};
use clap::Args;
use std::time::Duration;

use crate::net::DEFAULT_RETRY_DELAY;
use crate::rate_limit::DEFAULT_RATE_LIMIT_DELAY;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NetworkKind {
    MainNet,
    TestNet,
    DevNet,
}

impl std::str::FromStr for NetworkKind {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" => Ok(NetworkKind::MainNet),
            "testnet" | "test" => Ok(NetworkKind::TestNet),
            "devnet" | "dev" => Ok(NetworkKind::DevNet),
            _ => Err(anyhow!(
                "Invalid network '{s}'. Valid options: mainnet, testnet, devnet"
            )),
        }
    }
}

impl std::fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkKind::MainNet => write!(f, "mainnet"),
            NetworkKind::TestNet => write!(f, "testnet"),
            NetworkKind::DevNet => write!(f, "devnet"),
        }
    }
}

/// A named node the client can be pointed at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkProfile {
    pub kind: NetworkKind,
    pub display_name: String,
    pub url: String,
    pub description: String,
}

impl NetworkProfile {
    pub fn builtin(kind: NetworkKind) -> Self {
        let (display_name, url, description) = match kind {
            NetworkKind::MainNet => (
                "MainNet",
                "https://stellaris-node.connor33341.dev",
                "Stellaris Main Network",
            ),
            NetworkKind::TestNet => ("TestNet", "http://localhost:3006", "Stellaris Test Network"),
            NetworkKind::DevNet => (
                "DevNet",
                "http://devnet.stellaris-node.connor33341.dev",
                "Stellaris Development Network",
            ),
        };
        Self {
            kind,
            display_name: display_name.to_string(),
            url: url.to_string(),
            description: description.to_string(),
        }
    }

    pub fn all() -> Vec<Self> {
        [NetworkKind::MainNet, NetworkKind::TestNet, NetworkKind::DevNet]
            .into_iter()
            .map(Self::builtin)
            .collect()
    }

    /// Same network, different node. Trailing slashes are dropped so
    /// endpoint paths can be appended directly.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into().trim_end_matches('/').to_string();
        self
    }
}

impl Default for NetworkProfile {
    fn default() -> Self {
        Self::builtin(NetworkKind::MainNet)
    }
}

/// Transport tuning shared by every query a client issues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub rate_limit_delay: Duration,
    pub max_retries: u32,
    /// Backoff base; attempt `n` waits `retry_delay * 2^n`.
    pub retry_delay: Duration,
    pub request_timeout: Duration,
    pub probe_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rate_limit_delay: DEFAULT_RATE_LIMIT_DELAY,
            max_retries: 3,
            retry_delay: DEFAULT_RETRY_DELAY,
            request_timeout: Duration::from_millis(8000),
            probe_timeout: Duration::from_millis(5000),
        }
    }
}

/// Connection options for the `stellarx` binary.
/// Priority: CLI args > Environment variables > Defaults
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Network profile: mainnet, testnet or devnet
    #[arg(short, long, global = true, env = "STELLARIS_NETWORK", value_parser = clap::value_parser!(NetworkKind))]
    pub network: Option<NetworkKind>,

    /// Node URL, overrides the profile's default
    #[arg(long, global = true, env = "STELLARIS_NODE_URL")]
    pub node_url: Option<String>,

    /// Minimum spacing between requests in milliseconds (0-10000)
    #[arg(long, global = true, env = "RATE_LIMIT_DELAY_MS")]
    pub rate_limit_ms: Option<u64>,

    /// Retry attempts on 429 or network failure (0-10)
    #[arg(long, global = true, env = "MAX_RETRIES")]
    pub max_retries: Option<u32>,

    /// Backoff base delay in milliseconds (10-60000)
    #[arg(long, global = true, env = "RETRY_DELAY_MS")]
    pub retry_delay_ms: Option<u64>,

    /// Per-request timeout in milliseconds (1000-60000)
    #[arg(long, global = true, env = "RPC_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub profile: NetworkProfile,
    pub client: ClientConfig,
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

impl ConnectionArgs {
    pub fn resolve(&self) -> Result<Settings> {
        let defaults = ClientConfig::default();

        let mut profile = NetworkProfile::builtin(self.network.unwrap_or(NetworkKind::MainNet));
        if let Some(url) = &self.node_url {
            validate_url(url, "STELLARIS_NODE_URL")?;
            profile = profile.with_url(url.clone());
        }

        let rate_limit_ms = self
            .rate_limit_ms
            .unwrap_or(defaults.rate_limit_delay.as_millis() as u64);
        let rate_limit_ms = validate_in_range(rate_limit_ms, 0, 10_000, "RATE_LIMIT_DELAY_MS")?;

        let max_retries = self.max_retries.unwrap_or(defaults.max_retries);
        let max_retries = validate_in_range(max_retries, 0, 10, "MAX_RETRIES")?;

        let retry_delay_ms = self
            .retry_delay_ms
            .unwrap_or(defaults.retry_delay.as_millis() as u64);
        let retry_delay_ms = validate_in_range(retry_delay_ms, 10, 60_000, "RETRY_DELAY_MS")?;

        let timeout_ms = self
            .timeout_ms
            .unwrap_or(defaults.request_timeout.as_millis() as u64);
        let timeout_ms = validate_in_range(timeout_ms, 1000, 60_000, "RPC_TIMEOUT_MS")?;

        Ok(Settings {
            profile,
            client: ClientConfig {
                rate_limit_delay: Duration::from_millis(rate_limit_ms),
                max_retries,
                retry_delay: Duration::from_millis(retry_delay_ms),
                request_timeout: Duration::from_millis(timeout_ms),
                probe_timeout: defaults.probe_timeout,
            },
        })
    }
}

impl Settings {
    pub fn print_summary(&self) {
        eprintln!("Stellaris Explorer Configuration:");
        eprintln!("  Network: {} ({})", self.profile.display_name, self.profile.kind);
        eprintln!("  Node URL: {}", self.profile.url);
        eprintln!("  Rate Limit: {}ms", self.client.rate_limit_delay.as_millis());
        eprintln!("  Max Retries: {}", self.client.max_retries);
        eprintln!("  Retry Base Delay: {}ms", self.client.retry_delay.as_millis());
        eprintln!("  Request Timeout: {}ms", self.client.request_timeout.as_millis());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_kind_parsing() {
        assert_eq!("MainNet".parse::<NetworkKind>().unwrap(), NetworkKind::MainNet);
        assert_eq!("testnet".parse::<NetworkKind>().unwrap(), NetworkKind::TestNet);
        assert_eq!("DEV".parse::<NetworkKind>().unwrap(), NetworkKind::DevNet);
        assert!("ropsten".parse::<NetworkKind>().is_err());
    }

    #[test]
    fn test_defaults_resolve_to_mainnet() {
        let settings = ConnectionArgs::default().resolve().unwrap();
        assert_eq!(settings.profile.kind, NetworkKind::MainNet);
        assert_eq!(settings.profile.url, "https://stellaris-node.connor33341.dev");
        assert_eq!(settings.client, ClientConfig::default());
        assert_eq!(settings.client.rate_limit_delay, Duration::from_millis(100));
        assert_eq!(settings.client.retry_delay, Duration::from_millis(1000));
        assert_eq!(settings.client.max_retries, 3);
    }

    #[test]
    fn test_node_url_override_is_validated() {
        let args = ConnectionArgs {
            network: Some(NetworkKind::DevNet),
            node_url: Some("http://127.0.0.1:3006/".into()),
            ..Default::default()
        };
        let settings = args.resolve().unwrap();
        assert_eq!(settings.profile.kind, NetworkKind::DevNet);
        assert_eq!(settings.profile.url, "http://127.0.0.1:3006");

        let bad = ConnectionArgs {
            node_url: Some("ftp://node".into()),
            ..Default::default()
        };
        assert!(bad.resolve().is_err());
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let args = ConnectionArgs {
            max_retries: Some(11),
            ..Default::default()
        };
        assert!(args.resolve().is_err());

        let args = ConnectionArgs {
            timeout_ms: Some(500),
            ..Default::default()
        };
        assert!(args.resolve().is_err());
    }

    #[test]
    fn test_catalog_has_three_networks() {
        let all = NetworkProfile::all();
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].url, "http://localhost:3006");
    }
}
