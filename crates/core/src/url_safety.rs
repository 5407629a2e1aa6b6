//! Outbound URL safety check.
//!
//! User-supplied URLs are handed to the AIGC service, which fetches them
//! from inside our network. [`validate_fetch_url`] rejects anything that
//! could point that fetch at loopback, link-local or private addresses.
//!
//! Every address the host resolves to is checked, not just the first one:
//! a name with one public and one private record is rejected. The check
//! only covers resolution at request time; the AIGC service resolves the
//! name again on its own and a DNS change in between is not caught here.

use std::fmt;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use async_trait::async_trait;
use url::{Host, Url};

/// Resolves a host name to its IP addresses.
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// Resolver backed by the system DNS configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Why a URL was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionKind {
    Missing,
    Malformed,
    UnsupportedScheme,
    LookupFailed,
    /// Carries the offending address for logging. Not shown to callers.
    PrivateAddress(IpAddr),
}

/// A rejected URL. `Display` renders the caller-facing reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRejection {
    /// Request field the URL came from, e.g. `imageUrl`.
    pub field: &'static str,
    pub kind: RejectionKind,
}

impl fmt::Display for UrlRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field;
        match self.kind {
            RejectionKind::Missing => write!(f, "missing {field}"),
            RejectionKind::Malformed => write!(f, "invalid {field}"),
            RejectionKind::UnsupportedScheme => write!(f, "invalid {field}: unsupported scheme"),
            RejectionKind::LookupFailed => write!(f, "invalid {field}: lookup IP failed"),
            RejectionKind::PrivateAddress(_) => write!(f, "invalid {field}: private IP"),
        }
    }
}

impl std::error::Error for UrlRejection {}

/// Check that `raw` is safe to fetch from inside the network.
///
/// Returns the parsed URL on success. Steps short-circuit in order: empty,
/// unparsable or hostless, non-HTTP scheme, DNS failure, restricted address.
pub async fn validate_fetch_url(
    field: &'static str,
    raw: &str,
    resolver: &dyn HostResolver,
) -> Result<Url, UrlRejection> {
    let reject = |kind| UrlRejection { field, kind };

    if raw.is_empty() {
        return Err(reject(RejectionKind::Missing));
    }

    let url = Url::parse(raw).map_err(|_| reject(RejectionKind::Malformed))?;
    let host = match url.host() {
        Some(Host::Domain(domain)) if domain.is_empty() => {
            return Err(reject(RejectionKind::Malformed))
        }
        Some(host) => host,
        None => return Err(reject(RejectionKind::Malformed)),
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(reject(RejectionKind::UnsupportedScheme));
    }

    let addrs = match host {
        Host::Ipv4(v4) => vec![IpAddr::V4(v4)],
        Host::Ipv6(v6) => vec![IpAddr::V6(v6)],
        Host::Domain(domain) => resolver
            .resolve(domain)
            .await
            .map_err(|_| reject(RejectionKind::LookupFailed))?,
    };
    if addrs.is_empty() {
        return Err(reject(RejectionKind::LookupFailed));
    }

    if let Some(ip) = addrs.into_iter().find(|ip| is_restricted(*ip)) {
        return Err(reject(RejectionKind::PrivateAddress(ip)));
    }

    Ok(url)
}

/// Whether an address must never be fetched on a caller's behalf.
pub fn is_restricted(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_restricted_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_restricted_v4(v4),
            None => is_restricted_v6(v6),
        },
    }
}

fn is_restricted_v4(ip: Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();
    // 224.0.0.0/24 is link-local multicast.
    let link_local_multicast = a == 224 && b == 0 && c == 0;
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || link_local_multicast
}

fn is_restricted_v6(ip: Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    let unique_local = first & 0xfe00 == 0xfc00;
    let link_local_unicast = first & 0xffc0 == 0xfe80;
    let link_local_multicast = first & 0xff0f == 0xff02;
    ip.is_loopback()
        || ip.is_unspecified()
        || unique_local
        || link_local_unicast
        || link_local_multicast
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// Resolver answering from a fixed table; unknown names fail.
    struct StaticResolver(HashMap<&'static str, Vec<IpAddr>>);

    impl StaticResolver {
        fn new(entries: Vec<(&'static str, Vec<&str>)>) -> Self {
            let map = entries
                .into_iter()
                .map(|(host, ips)| (host, ips.iter().map(|ip| ip.parse().unwrap()).collect()))
                .collect();
            Self(map)
        }
    }

    #[async_trait]
    impl HostResolver for StaticResolver {
        async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
            self.0
                .get(host)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such host"))
        }
    }

    fn resolver() -> StaticResolver {
        StaticResolver::new(vec![
            ("cdn.example.com", vec!["93.184.216.34"]),
            ("dual.example.com", vec!["93.184.216.34", "2606:2800:220:1::1"]),
            ("rebind.example.com", vec!["93.184.216.34", "10.0.0.7"]),
            ("internal.example.com", vec!["192.168.1.20"]),
            ("empty.example.com", vec![]),
        ])
    }

    async fn check(raw: &str) -> Result<Url, UrlRejection> {
        validate_fetch_url("imageUrl", raw, &resolver()).await
    }

    async fn reason(raw: &str) -> String {
        check(raw).await.unwrap_err().to_string()
    }

    // -- rejections in step order --------------------------------------------

    #[tokio::test]
    async fn empty_url_is_missing() {
        assert_eq!(reason("").await, "missing imageUrl");
    }

    #[tokio::test]
    async fn unparsable_url_is_invalid() {
        assert_eq!(reason("not a url").await, "invalid imageUrl");
        assert_eq!(reason("http://").await, "invalid imageUrl");
    }

    #[tokio::test]
    async fn hostless_url_is_invalid() {
        assert_eq!(reason("file:///etc/passwd").await, "invalid imageUrl");
    }

    #[tokio::test]
    async fn non_http_schemes_are_rejected() {
        for raw in [
            "ftp://cdn.example.com/a.png",
            "gopher://cdn.example.com/",
            "ws://cdn.example.com/socket",
        ] {
            assert_eq!(
                reason(raw).await,
                "invalid imageUrl: unsupported scheme",
                "{raw}"
            );
        }
    }

    #[tokio::test]
    async fn unresolvable_host_is_rejected() {
        assert_eq!(
            reason("https://nowhere.example.com/a.png").await,
            "invalid imageUrl: lookup IP failed"
        );
        assert_eq!(
            reason("https://empty.example.com/a.png").await,
            "invalid imageUrl: lookup IP failed"
        );
    }

    #[tokio::test]
    async fn cloud_metadata_address_is_private() {
        assert_eq!(
            reason("http://169.254.169.254/latest/meta-data").await,
            "invalid imageUrl: private IP"
        );
    }

    #[tokio::test]
    async fn literal_restricted_addresses_are_rejected() {
        for raw in [
            "http://127.0.0.1/",
            "http://10.1.2.3/",
            "http://172.16.0.1/",
            "http://192.168.0.1/",
            "http://0.0.0.0/",
            "http://224.0.0.1/",
            "http://[::1]/",
            "http://[fe80::1]/",
            "http://[fd00::1]/",
            "http://[ff02::1]/",
            "http://[::ffff:10.0.0.1]/",
        ] {
            let err = check(raw).await.unwrap_err();
            assert!(
                matches!(err.kind, RejectionKind::PrivateAddress(_)),
                "{raw} should be private, got {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn numeric_host_forms_are_normalised_before_checking() {
        // 2130706433 == 127.0.0.1
        assert_eq!(
            reason("http://2130706433/").await,
            "invalid imageUrl: private IP"
        );
    }

    #[tokio::test]
    async fn any_private_record_rejects_the_host() {
        let err = check("https://rebind.example.com/a.png").await.unwrap_err();
        assert_eq!(
            err.kind,
            RejectionKind::PrivateAddress("10.0.0.7".parse().unwrap())
        );
    }

    #[tokio::test]
    async fn private_only_host_is_rejected() {
        assert_eq!(
            reason("https://internal.example.com/a.png").await,
            "invalid imageUrl: private IP"
        );
    }

    #[test]
    fn only_link_local_scope_multicast_is_restricted() {
        assert!(is_restricted("ff02::1".parse().unwrap()));
        assert!(is_restricted("ff12::fb".parse().unwrap()));
        assert!(!is_restricted("ff0e::1".parse().unwrap()));
        assert!(!is_restricted("ff05::2".parse().unwrap()));
    }

    // -- acceptance ----------------------------------------------------------

    #[tokio::test]
    async fn public_hosts_are_accepted() {
        let url = check("https://cdn.example.com/a.png").await.unwrap();
        assert_eq!(url.host_str(), Some("cdn.example.com"));

        assert!(check("http://dual.example.com/b.png").await.is_ok());
        assert!(check("http://93.184.216.34/c.png").await.is_ok());
    }

    #[tokio::test]
    async fn field_name_appears_in_reason() {
        let err = validate_fetch_url("callbackUrl", "", &resolver())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "missing callbackUrl");
    }

    #[tokio::test]
    async fn system_resolver_is_not_consulted_for_literals() {
        let err = validate_fetch_url("imageUrl", "http://127.0.0.1:8080/x", &SystemResolver)
            .await
            .unwrap_err();
        assert_eq!(
            err.kind,
            RejectionKind::PrivateAddress("127.0.0.1".parse().unwrap())
        );
    }
}
