//! Bind-address discovery for LAN deployments.
//!
//! The service is meant to be reachable from other machines on the local
//! network, so when no `--host` is given we prefer a wireless interface's
//! IPv4 address, then any other non-loopback IPv4, then loopback.

use std::net::{IpAddr, Ipv4Addr};

use local_ip_address::list_afinet_netifas;

const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

fn looks_wireless(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.contains("wi-fi") || name.contains("wifi") || name.contains("wireless") || name.starts_with("wlan")
}

fn is_candidate(ip: &IpAddr) -> bool {
    matches!(ip, IpAddr::V4(v4) if !v4.is_loopback())
}

/// Picks the address the listeners should bind to.
///
/// Never fails: if interface enumeration is unavailable the service still
/// comes up on loopback.
#[must_use]
pub fn discover_bind_addr() -> IpAddr {
    let Ok(interfaces) = list_afinet_netifas() else {
        return LOOPBACK;
    };

    if let Some((_, ip)) = interfaces
        .iter()
        .find(|(name, ip)| looks_wireless(name) && is_candidate(ip))
    {
        return *ip;
    }

    interfaces
        .iter()
        .map(|(_, ip)| *ip)
        .find(is_candidate)
        .unwrap_or(LOOPBACK)
}
