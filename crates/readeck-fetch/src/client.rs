//! The Safe HTTP Client itself (spec.md §4.A).

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use readeck_config::ExtractorConfig;
use readeck_types::FetchError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Proxy, Url};

use crate::cache::ResourceCache;
use crate::headers::default_headers;
use crate::proxy::{compile, resolve as resolve_proxy};
use crate::ssrf::{check_denied, resolve_host};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of a successful fetch (spec.md §4.A contract: `(status, headers, body)`).
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub final_url: Url,
    pub from_cache: bool,
}

/// One Safe HTTP Client instance, scoped to a single extraction: it owns the
/// cookie jar (public-suffix-aware via `reqwest`'s bundled cookie store) and
/// the resource cache for the lifetime of that extraction only.
pub struct SafeClient {
    inner: reqwest::Client,
    config: Arc<ExtractorConfig>,
    cache: Arc<ResourceCache>,
}

impl SafeClient {
    pub fn new(config: Arc<ExtractorConfig>) -> Result<Self, FetchError> {
        Self::with_cache(config, Arc::new(ResourceCache::new()))
    }

    pub fn with_cache(
        config: Arc<ExtractorConfig>,
        cache: Arc<ResourceCache>,
    ) -> Result<Self, FetchError> {
        let dispatch_matches = compile(&config.proxy_match);
        let proxy = Proxy::custom(move |url| {
            let host = url.host_str().unwrap_or_default();
            resolve_proxy(host, &dispatch_matches).and_then(|p| Url::parse(p).ok())
        });

        let builder = reqwest::Client::builder()
            .default_headers(default_headers())
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_idle_timeout(IDLE_TIMEOUT)
            .proxy(proxy);

        let inner = builder
            .build()
            .map_err(|source| FetchError::Network {
                url: "<client build>".into(),
                source,
            })?;

        Ok(Self {
            inner,
            config,
            cache,
        })
    }

    pub fn cache(&self) -> &Arc<ResourceCache> {
        &self.cache
    }

    /// Adds a resource to the cache consulted by `fetch` before any socket
    /// is opened (spec.md §3 `AddToCache`).
    pub fn add_to_cache(
        &self,
        url: &str,
        headers: std::collections::HashMap<String, String>,
        body: impl Into<Bytes>,
    ) {
        self.cache
            .insert(url, crate::cache::CachedResource::new(headers, body));
    }

    pub fn is_in_cache(&self, url: &str) -> bool {
        self.cache.contains(url)
    }

    /// Fetches `url`, enforcing the SSRF guard, applying default headers not
    /// already present in `extra_headers`, and pre-empting the network
    /// entirely when the URL is cached (spec.md §4.A contract).
    pub async fn fetch(
        &self,
        url: &Url,
        extra_headers: HeaderMap,
    ) -> Result<FetchResponse, FetchError> {
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(FetchError::InvalidUrl {
                    url: url.to_string(),
                    detail: format!("unsupported scheme {other}"),
                })
            }
        }

        if let Some(cached) = self.cache.get(url.as_str()) {
            let mut headers = HeaderMap::new();
            for (k, v) in &cached.headers {
                if let (Ok(name), Ok(value)) =
                    (HeaderName::from_bytes(k.as_bytes()), HeaderValue::from_str(v))
                {
                    headers.insert(name, value);
                }
            }
            return Ok(FetchResponse {
                status: 200,
                headers,
                body: cached.body.clone(),
                final_url: url.clone(),
                from_cache: true,
            });
        }

        let host = url.host_str().ok_or_else(|| FetchError::InvalidUrl {
            url: url.to_string(),
            detail: "missing host".into(),
        })?;
        let port = url.port_or_known_default().unwrap_or(443);

        let ips = resolve_host(host, port).await?;
        if let Some((ip, cidr)) = check_denied(&ips, &self.config.denied_ips) {
            return Err(FetchError::DeniedIp {
                host: host.to_string(),
                ip,
                cidr: cidr.to_string(),
            });
        }

        let mut request = self.inner.get(url.clone());
        for (name, value) in extra_headers.iter() {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|source| {
            if source.is_timeout() {
                FetchError::Timeout { url: url.to_string() }
            } else {
                FetchError::Network {
                    url: url.to_string(),
                    source,
                }
            }
        })?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;

        Ok(FetchResponse {
            status,
            headers,
            body,
            final_url,
            from_cache: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> Arc<ExtractorConfig> {
        Arc::new(ExtractorConfig::default())
    }

    #[tokio::test]
    async fn cache_hit_never_touches_the_network() {
        let client = SafeClient::new(test_config()).unwrap();
        client.add_to_cache(
            "https://cached.example.invalid/page",
            HashMap::from([("content-type".to_string(), "text/html".to_string())]),
            &b"<html></html>"[..],
        );

        let response = client
            .fetch(
                &Url::parse("https://cached.example.invalid/page").unwrap(),
                HeaderMap::new(),
            )
            .await
            .unwrap();

        assert!(response.from_cache);
        assert_eq!(response.status, 200);
        assert_eq!(&response.body[..], b"<html></html>");
    }

    #[tokio::test]
    async fn ssrf_guard_blocks_denied_loopback() {
        let config = Arc::new(ExtractorConfig {
            denied_ips: vec!["127.0.0.0/8".parse().unwrap()],
            ..ExtractorConfig::default()
        });
        let client = SafeClient::new(config).unwrap();

        let result = client
            .fetch(&Url::parse("http://127.0.0.1:1/anything").unwrap(), HeaderMap::new())
            .await;

        assert!(matches!(result, Err(FetchError::DeniedIp { .. })));
    }

    #[tokio::test]
    async fn fetches_live_response_when_not_cached_and_not_denied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hi"))
            .mount(&server)
            .await;

        let client = SafeClient::new(test_config()).unwrap();
        let url = Url::parse(&format!("{}/ok", server.uri())).unwrap();
        let response = client.fetch(&url, HeaderMap::new()).await.unwrap();

        assert!(!response.from_cache);
        assert_eq!(response.status, 200);
        assert_eq!(&response.body[..], b"hi");
    }

    #[tokio::test]
    async fn rejects_non_http_schemes_fast() {
        let client = SafeClient::new(test_config()).unwrap();
        let result = client
            .fetch(&Url::parse("ftp://example.com/file").unwrap(), HeaderMap::new())
            .await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }
}
