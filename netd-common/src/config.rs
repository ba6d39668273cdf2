//! Loads the shared configuration file both services start from.
//!
//! The key names and all-strings-including-numbers shape match the original
//! Python implementation's `configuration.json` exactly (spec.md §6); the
//! one addition is `UPSTREAM_DNS`, optional and defaulting to `8.8.8.8`.

use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed configuration JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("TIME_IP value {0:?} is not a non-negative decimal integer")]
    BadLeaseTime(String),
    #[error("pool start {pool_start} is greater than pool end {pool_end}")]
    InvertedPool {
        pool_start: Ipv4Addr,
        pool_end: Ipv4Addr,
    },
}

fn default_upstream_dns() -> String {
    "8.8.8.8".to_string()
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(rename = "IP_DHCP")]
    ip_dhcp: Ipv4Addr,
    #[serde(rename = "MASK_DHCP")]
    mask_dhcp: Ipv4Addr,
    #[serde(rename = "IP_ROUTER")]
    ip_router: Ipv4Addr,
    #[serde(rename = "IP_DNS")]
    ip_dns: Ipv4Addr,
    #[serde(rename = "START_IP_ADDRESS")]
    start_ip_address: Ipv4Addr,
    #[serde(rename = "START_IP_END")]
    start_ip_end: Ipv4Addr,
    #[serde(rename = "TIME_IP")]
    time_ip: String,
    #[serde(rename = "UPSTREAM_DNS", default = "default_upstream_dns")]
    upstream_dns: String,
}

/// The configuration record both services load once at startup and never
/// mutate afterward.
#[derive(Debug, Clone)]
pub struct Config {
    pub dhcp_server_ip: Ipv4Addr,
    pub subnet_mask: Ipv4Addr,
    pub router_ip: Ipv4Addr,
    pub dns_ip: Ipv4Addr,
    pub pool_start: Ipv4Addr,
    pub pool_end: Ipv4Addr,
    pub lease_seconds: u32,
    pub upstream_dns: Ipv4Addr,
}

impl Config {
    /// Reads and validates the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let bytes = fs::read(path).map_err(|source| ConfigError::Io {
            path: path_str.clone(),
            source,
        })?;
        let raw: RawConfig = serde_json::from_slice(&bytes).map_err(|source| ConfigError::Json {
            path: path_str.clone(),
            source,
        })?;

        let lease_seconds = raw
            .time_ip
            .parse::<u32>()
            .map_err(|_| ConfigError::BadLeaseTime(raw.time_ip.clone()))?;

        let upstream_dns = raw
            .upstream_dns
            .parse::<Ipv4Addr>()
            .unwrap_or_else(|_| Ipv4Addr::new(8, 8, 8, 8));

        if u32::from(raw.start_ip_address) > u32::from(raw.start_ip_end) {
            return Err(ConfigError::InvertedPool {
                pool_start: raw.start_ip_address,
                pool_end: raw.start_ip_end,
            });
        }

        Ok(Config {
            dhcp_server_ip: raw.ip_dhcp,
            subnet_mask: raw.mask_dhcp,
            router_ip: raw.ip_router,
            dns_ip: raw.ip_dns,
            pool_start: raw.start_ip_address,
            pool_end: raw.start_ip_end,
            lease_seconds,
            upstream_dns,
        })
    }
}
