//! Gatekeeping for feed URLs handed to the system opener or a player.
//!
//! `link` and media URLs come straight from the feed, so a crafted item could
//! point the player at a local file or a service on the user's network.

use std::net::{Ipv4Addr, Ipv6Addr};
use thiserror::Error;
use url::{Host, Url};

/// Why a feed URL was not launched. Displays as a status-bar message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LaunchBlocked {
    #[error("Refusing to open URL: not a valid address")]
    Malformed,

    #[error("Refusing to open URL: {0} links are not supported")]
    Scheme(String),

    #[error("Refusing to open URL: {0} is on the local network")]
    LocalHost(String),
}

/// Parses `raw` and accepts it only if it is an http(s) URL on a public host.
pub fn launchable_url(raw: &str) -> Result<Url, LaunchBlocked> {
    let url = Url::parse(raw.trim()).map_err(|_| LaunchBlocked::Malformed)?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(LaunchBlocked::Scheme(url.scheme().to_string()));
    }

    let local = match url.host() {
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            domain == "localhost" || domain.ends_with(".localhost")
        }
        Some(Host::Ipv4(ip)) => is_local_v4(ip),
        Some(Host::Ipv6(ip)) => is_local_v6(ip),
        None => return Err(LaunchBlocked::Malformed),
    };

    if local {
        let host = url.host_str().unwrap_or_default().to_string();
        tracing::warn!(host = %host, "Blocked feed URL pointing at a local host");
        return Err(LaunchBlocked::LocalHost(host));
    }
    Ok(url)
}

fn is_local_v4(ip: Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified()
}

fn is_local_v6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_local_v4(v4);
    }
    let first = ip.segments()[0];
    // fc00::/7 unique local, fe80::/10 link local
    ip.is_loopback() || ip.is_unspecified() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
}
