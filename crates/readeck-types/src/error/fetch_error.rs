use thiserror::Error;

/// Errors raised by the Safe HTTP Client (spec.md §4.A).
///
/// `ErrDeniedIP` and validation failures are fail-fast and never retried;
/// the rest abort the current fetch without necessarily aborting the whole
/// extraction — the caller decides (see `ExtractError`).
#[derive(Error, Debug)]
pub enum FetchError {
    /// One of the host's resolved addresses falls inside a denied CIDR.
    #[error("ip {ip} for host {host} is blocked by rule {cidr}")]
    DeniedIp {
        host: String,
        ip: std::net::IpAddr,
        cidr: String,
    },

    /// DNS resolution failed outright.
    #[error("cannot resolve {host}: {source}")]
    DnsFailure {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// The request exceeded its deadline.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// Any other transport-level failure (including TLS errors, which are
    /// folded into this variant per spec.md §4.A).
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server responded, but with a status code or body the caller
    /// considers unusable (e.g. a byte-range failure while re-fetching).
    #[error("bad response from {url}: {detail}")]
    BadResponse { url: String, detail: String },

    /// The URL scheme or host is inherently unsupported (not http/https, or
    /// fails `url::Url` parsing). Fails fast, never retried.
    #[error("invalid or unsupported url {url}: {detail}")]
    InvalidUrl { url: String, detail: String },
}
