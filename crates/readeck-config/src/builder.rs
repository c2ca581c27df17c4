use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use ipnet::IpNet;

use crate::{ExtractorConfig, ProxyMatch, SiteConfigRoot};

/// Builder mirroring the fluent `ConfigBuilder` pattern the teacher repo uses
/// across `riptide-config`.
#[derive(Debug, Default)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    pub fn deny_cidr(mut self, cidr: &str) -> Self {
        match IpNet::from_str(cidr) {
            Ok(net) => self.config.denied_ips.push(net),
            Err(err) => tracing::warn!(cidr, %err, "ignoring invalid denied-ips entry"),
        }
        self
    }

    pub fn deny_ip(mut self, ip: IpAddr) -> Self {
        self.config.denied_ips.push(ExtractorConfig::single_ip_to_net(ip));
        self
    }

    pub fn proxy_match(mut self, host_glob: &str, proxy_url: &str) -> Self {
        self.config.proxy_match.push(ProxyMatch::new(host_glob, proxy_url));
        self
    }

    pub fn content_script_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.content_script_roots.push(path.into());
        self
    }

    pub fn site_config_root(mut self, name: impl Into<String>, src: impl Into<PathBuf>) -> Self {
        self.config.site_config_roots.push(SiteConfigRoot {
            name: name.into(),
            src: src.into(),
        });
        self
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.config.workers = n.max(1);
        self
    }

    pub fn dev_mode(mut self, on: bool) -> Self {
        self.config.dev_mode = on;
        self
    }

    pub fn build(self) -> ExtractorConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_fluent_api() {
        let cfg = ExtractorConfig::builder()
            .deny_cidr("169.254.0.0/16")
            .proxy_match("*.internal.example.com", "http://proxy.local:3128")
            .workers(4)
            .build();

        assert_eq!(cfg.denied_ips.len(), 1);
        assert_eq!(cfg.proxy_match.len(), 1);
        assert_eq!(cfg.workers, 4);
    }

    #[test]
    fn invalid_cidr_is_ignored_not_fatal() {
        let cfg = ExtractorConfig::builder().deny_cidr("not-a-cidr").build();
        assert!(cfg.denied_ips.is_empty());
    }
}
