//! Typed configuration for the extraction core (spec.md §6 "Configuration
//! (recognized options)").
//!
//! Nothing in `readeck-engine` or `readeck-fetch` reads environment
//! variables or files directly — they take an `ExtractorConfig` built here,
//! the way `riptide-api` consumes `riptide-config`'s typed structs instead of
//! reaching into `std::env` itself.

mod builder;
mod proxy;
mod validation;

pub use builder::ExtractorConfigBuilder;
pub use proxy::ProxyMatch;
pub use validation::{ConfigError, ConfigResult};

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

/// One user-supplied site-config root, prepended to the built-in rule set
/// (spec.md §4.E: "priority: user-supplied folders before built-ins").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfigRoot {
    pub name: String,
    pub src: std::path::PathBuf,
}

/// The full set of options spec.md §6 names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// CIDRs that the Safe HTTP Client refuses to dial into. An empty list
    /// disables the SSRF check entirely (spec.md §4.A).
    pub denied_ips: Vec<IpNet>,

    /// Ordered host-glob → proxy URL mapping; first match wins (spec.md §4.A).
    pub proxy_match: Vec<ProxyMatch>,

    /// Directories scanned recursively for `*.js` content scripts
    /// (spec.md §4.E).
    pub content_script_roots: Vec<std::path::PathBuf>,

    /// User-supplied site-config directories, searched before built-ins.
    pub site_config_roots: Vec<SiteConfigRoot>,

    /// Extraction worker-pool size for the (externally implemented)
    /// `TaskRunner`. Defaults to `NumCPU`.
    pub workers: usize,

    /// Reload content scripts/site configs on every extraction instead of
    /// caching them at startup (spec.md §4.E: "Loaded eagerly unless dev
    /// mode").
    pub dev_mode: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            denied_ips: Vec::new(),
            proxy_match: Vec::new(),
            content_script_roots: Vec::new(),
            site_config_roots: Vec::new(),
            workers: num_cpus::get(),
            dev_mode: false,
        }
    }
}

impl ExtractorConfig {
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder::default()
    }

    /// Normalizes a single address into a `/32` (IPv4) or `/128` (IPv6)
    /// network, as spec.md §6 requires for `denied_ips` entries that aren't
    /// already CIDRs.
    pub fn single_ip_to_net(ip: std::net::IpAddr) -> IpNet {
        match ip {
            std::net::IpAddr::V4(v4) => IpNet::new(std::net::IpAddr::V4(v4), 32).unwrap(),
            std::net::IpAddr::V6(v6) => IpNet::new(std::net::IpAddr::V6(v6), 128).unwrap(),
        }
    }

    /// True when any denied CIDR contains the address — the core of the
    /// SSRF guard (spec.md §4.A / §8 invariant 1).
    pub fn denies(&self, ip: std::net::IpAddr) -> Option<&IpNet> {
        self.denied_ips.iter().find(|net| net.contains(&ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_denied_list_denies_nothing() {
        let cfg = ExtractorConfig::default();
        assert!(cfg.denies("127.0.0.1".parse().unwrap()).is_none());
    }

    #[test]
    fn denies_address_in_cidr() {
        let cfg = ExtractorConfig {
            denied_ips: vec!["10.0.0.0/8".parse().unwrap()],
            ..ExtractorConfig::default()
        };
        assert!(cfg.denies("10.1.2.3".parse().unwrap()).is_some());
        assert!(cfg.denies("11.1.2.3".parse().unwrap()).is_none());
    }

    #[test]
    fn single_ip_normalizes_to_host_cidr() {
        let net = ExtractorConfig::single_ip_to_net("192.168.1.5".parse().unwrap());
        assert_eq!(net.prefix_len(), 32);
    }
}
