use serde::{Deserialize, Serialize};

/// A single `{host_glob, proxy_url}` entry (spec.md §6). The Safe HTTP
/// Client iterates the configured list in order and dispatches through the
/// first glob that matches the request host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyMatch {
    pub host_glob: String,
    pub proxy_url: String,
}

impl ProxyMatch {
    pub fn new(host_glob: impl Into<String>, proxy_url: impl Into<String>) -> Self {
        Self {
            host_glob: host_glob.into(),
            proxy_url: proxy_url.into(),
        }
    }
}
