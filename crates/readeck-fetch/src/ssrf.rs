//! The SSRF guard (spec.md §4.A / §8 invariant 1): resolve every A/AAAA
//! record for the destination host and refuse to dial if any of them falls
//! inside a configured denied CIDR, *before* a socket is opened.

use std::net::IpAddr;

use ipnet::IpNet;
use readeck_types::FetchError;

/// Resolves `host` to all of its A/AAAA addresses.
pub async fn resolve_host(host: &str, port: u16) -> Result<Vec<IpAddr>, FetchError> {
    let lookup = format!("{host}:{port}");
    tokio::net::lookup_host(lookup)
        .await
        .map(|iter| iter.map(|addr| addr.ip()).collect())
        .map_err(|source| FetchError::DnsFailure {
            host: host.to_string(),
            source,
        })
}

/// Returns the first denied CIDR that contains one of `ips`, if any. An
/// empty `denied` list disables the check entirely, per spec.md §4.A.
pub fn check_denied<'a>(ips: &[IpAddr], denied: &'a [IpNet]) -> Option<(IpAddr, &'a IpNet)> {
    if denied.is_empty() {
        return None;
    }
    for ip in ips {
        for net in denied {
            if net.contains(ip) {
                return Some((*ip, net));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_denylist_allows_everything() {
        let ips = vec!["127.0.0.1".parse().unwrap()];
        assert!(check_denied(&ips, &[]).is_none());
    }

    #[test]
    fn denylist_catches_loopback() {
        let ips = vec!["127.0.0.1".parse().unwrap()];
        let denied: Vec<IpNet> = vec!["127.0.0.0/8".parse().unwrap()];
        let hit = check_denied(&ips, &denied);
        assert!(hit.is_some());
        assert_eq!(hit.unwrap().0.to_string(), "127.0.0.1");
    }

    #[test]
    fn denylist_ignores_unrelated_addresses() {
        let ips = vec!["8.8.8.8".parse().unwrap()];
        let denied: Vec<IpNet> = vec!["10.0.0.0/8".parse().unwrap(), "192.168.0.0/16".parse().unwrap()];
        assert!(check_denied(&ips, &denied).is_none());
    }

    #[tokio::test]
    async fn resolve_host_returns_at_least_one_address() {
        // localhost always resolves without touching the network.
        let ips = resolve_host("localhost", 80).await.unwrap();
        assert!(!ips.is_empty());
    }
}
