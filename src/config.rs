use log::warn;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::blockchain::{ConsensusPolicy, DEFAULT_DIFFICULTY, MAX_DIFFICULTY};

/// Node settings read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    /// Bootstrap peer to register with at startup.
    pub peer: Option<String>,
    /// Address other nodes should use to reach this one.
    pub public_address: String,
    pub difficulty: usize,
    /// `None` disables the periodic sync driver.
    pub sync_interval: Option<Duration>,
    pub policy: ConsensusPolicy,
    pub peer_timeout: Duration,
}

impl NodeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparsable values fall back to
    /// their defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = parse_or(&lookup, "PORT", 8080);
        let peer = lookup("PEER").filter(|p| !p.trim().is_empty());
        let public_address = lookup("PUBLIC_ADDRESS")
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| format!("http://{host}:{port}"));
        let mut difficulty = parse_or(&lookup, "DIFFICULTY", DEFAULT_DIFFICULTY);
        if difficulty > MAX_DIFFICULTY {
            warn!("ignoring DIFFICULTY={difficulty} above {MAX_DIFFICULTY}; using default");
            difficulty = DEFAULT_DIFFICULTY;
        }
        let sync_secs: u64 = parse_or(&lookup, "SYNC_INTERVAL_SECS", 30);
        let policy = parse_or(&lookup, "CONSENSUS_POLICY", ConsensusPolicy::LongestChain);
        let timeout_secs: u64 = parse_or(&lookup, "PEER_TIMEOUT_SECS", 5);

        Self {
            host,
            port,
            peer,
            public_address,
            difficulty,
            sync_interval: (sync_secs > 0).then(|| Duration::from_secs(sync_secs)),
            policy,
            peer_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring invalid {key}={raw:?}; using default");
            default
        }),
        None => default,
    }
}
