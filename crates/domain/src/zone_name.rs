//! Name algebra for a single zone.
//!
//! Converts between relative names (`www`), the apex marker (`@`) and
//! absolute names (`www.zone.test.`), and between IP addresses and the
//! reverse-address labels a reverse zone owns.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::record::APEX;
use crate::DomainError;

pub const IPV4_REVERSE_DOMAIN: &str = "in-addr.arpa";
pub const IPV6_REVERSE_DOMAIN: &str = "ip6.arpa";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneNameResolver {
    /// Zone name without trailing dot, lowercase.
    relative: String,
    /// Zone name with trailing dot, lowercase.
    absolute: String,
}

impl ZoneNameResolver {
    pub fn new(zone_name: &str) -> Self {
        let relative = zone_name.trim().trim_end_matches('.').to_ascii_lowercase();
        let absolute = format!("{}.", relative);
        Self { relative, absolute }
    }

    pub fn zone_name(&self) -> &str {
        &self.relative
    }

    pub fn absolute_zone_name(&self) -> &str {
        &self.absolute
    }

    /// Returns the absolute form of `name`.
    ///
    /// Names that are already absolute are returned unchanged, even when they
    /// belong to another zone.
    pub fn absolutize(&self, name: &str) -> String {
        let name = name.trim();
        if name.is_empty() || name == APEX {
            return self.absolute.clone();
        }
        if name.ends_with('.') {
            return name.to_string();
        }
        if self.ends_with_zone(name, &self.relative) {
            return format!("{}.", name);
        }
        format!("{}.{}", name, self.absolute)
    }

    /// Returns `name` relative to the zone, `@` for the apex.
    pub fn relativize(&self, name: &str) -> String {
        let name = name.trim();
        let lower = name.to_ascii_lowercase();
        if lower == self.absolute || lower == self.relative {
            return APEX.to_string();
        }
        let absolute_suffix = format!(".{}", self.absolute);
        if lower.ends_with(&absolute_suffix) {
            return name[..name.len() - absolute_suffix.len()].to_string();
        }
        let relative_suffix = format!(".{}", self.relative);
        if lower.ends_with(&relative_suffix) {
            return name[..name.len() - relative_suffix.len()].to_string();
        }
        name.strip_suffix('.').unwrap_or(name).to_string()
    }

    /// Whether `name`, relative to the root or absolute, lies at or below the
    /// zone apex.
    pub fn contains(&self, name: &str) -> bool {
        self.ends_with_zone(name.trim().trim_end_matches('.'), &self.relative)
    }

    fn ends_with_zone(&self, name: &str, zone: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        lower == zone || lower.ends_with(&format!(".{}", zone))
    }

    pub fn is_ipv4_reverse_zone(&self) -> bool {
        self.ends_with_zone(&self.relative, IPV4_REVERSE_DOMAIN)
    }

    pub fn is_ipv6_reverse_zone(&self) -> bool {
        self.ends_with_zone(&self.relative, IPV6_REVERSE_DOMAIN)
    }

    pub fn is_reverse_zone(&self) -> bool {
        self.is_ipv4_reverse_zone() || self.is_ipv6_reverse_zone()
    }

    pub fn is_forward_zone(&self) -> bool {
        !self.is_reverse_zone()
    }

    /// Labels of `ip_address`'s reverse name that this zone owns, i.e. the
    /// full reverse name with the zone suffix removed.
    ///
    /// For zone `1.in-addr.arpa`, `1.2.3.4` yields `4.3.2`.
    pub fn get_reverse_tets(&self, ip_address: &str) -> Result<String, DomainError> {
        let ip: IpAddr = ip_address
            .trim()
            .parse()
            .map_err(|_| DomainError::InvalidIpAddress(ip_address.to_string()))?;

        let reverse = match ip {
            IpAddr::V4(v4) if self.is_ipv4_reverse_zone() => ipv4_reverse_name(v4),
            IpAddr::V6(v6) if self.is_ipv6_reverse_zone() => ipv6_reverse_name(v6),
            _ => {
                return Err(DomainError::InvalidIpAddress(format!(
                    "{} does not belong to zone {}",
                    ip_address, self.relative
                )))
            }
        };

        let suffix = format!(".{}", self.relative);
        reverse
            .strip_suffix(&suffix)
            .map(str::to_string)
            .ok_or_else(|| {
                DomainError::InvalidIpAddress(format!(
                    "{} does not belong to zone {}",
                    ip_address, self.relative
                ))
            })
    }

    /// Inverse of [`Self::get_reverse_tets`]: rebuilds the IP address from the
    /// labels the zone owns.
    pub fn get_ip_address(&self, reverse_tets: &str) -> Result<String, DomainError> {
        let tets = reverse_tets.trim().trim_end_matches('.');
        let full = format!("{}.{}", tets, self.relative);

        if self.is_ipv4_reverse_zone() {
            let labels = full
                .strip_suffix(&format!(".{}", IPV4_REVERSE_DOMAIN))
                .ok_or_else(|| DomainError::InvalidDomainName(full.clone()))?;
            let mut octets: Vec<&str> = labels.split('.').collect();
            if octets.len() != 4 {
                return Err(DomainError::InvalidIpAddress(format!(
                    "{} does not name a full IPv4 address",
                    full
                )));
            }
            octets.reverse();
            let text = octets.join(".");
            let ip: Ipv4Addr = text
                .parse()
                .map_err(|_| DomainError::InvalidIpAddress(text.clone()))?;
            Ok(ip.to_string())
        } else if self.is_ipv6_reverse_zone() {
            let labels = full
                .strip_suffix(&format!(".{}", IPV6_REVERSE_DOMAIN))
                .ok_or_else(|| DomainError::InvalidDomainName(full.clone()))?;
            let nibbles: Vec<&str> = labels.split('.').rev().collect();
            if nibbles.len() != 32 || nibbles.iter().any(|n| n.len() != 1) {
                return Err(DomainError::InvalidIpAddress(format!(
                    "{} does not name a full IPv6 address",
                    full
                )));
            }
            let hex = nibbles.concat();
            let groups: Vec<&str> = (0..8).map(|i| &hex[i * 4..i * 4 + 4]).collect();
            let text = groups.join(":");
            let ip: Ipv6Addr = text
                .parse()
                .map_err(|_| DomainError::InvalidIpAddress(text.clone()))?;
            Ok(ip.to_string())
        } else {
            Err(DomainError::InvalidDomainName(format!(
                "{} is not a reverse zone",
                self.relative
            )))
        }
    }
}

fn ipv4_reverse_name(ip: Ipv4Addr) -> String {
    let [a, b, c, d] = ip.octets();
    format!("{}.{}.{}.{}.{}", d, c, b, a, IPV4_REVERSE_DOMAIN)
}

fn ipv6_reverse_name(ip: Ipv6Addr) -> String {
    let mut labels: Vec<String> = ip
        .octets()
        .iter()
        .flat_map(|byte| [byte >> 4, byte & 0x0f])
        .map(|nibble| format!("{:x}", nibble))
        .collect();
    labels.reverse();
    labels.push(IPV6_REVERSE_DOMAIN.to_string());
    labels.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolutize_relative_name() {
        let resolver = ZoneNameResolver::new("zone.test");
        assert_eq!(resolver.absolutize("name"), "name.zone.test.");
        assert_eq!(resolver.absolutize("a.b"), "a.b.zone.test.");
    }

    #[test]
    fn test_absolutize_apex() {
        let resolver = ZoneNameResolver::new("zone.test.");
        assert_eq!(resolver.absolutize("@"), "zone.test.");
        assert_eq!(resolver.absolutize(""), "zone.test.");
    }

    #[test]
    fn test_absolutize_already_qualified() {
        let resolver = ZoneNameResolver::new("zone.test");
        assert_eq!(resolver.absolutize("name.zone.test"), "name.zone.test.");
        assert_eq!(resolver.absolutize("zone.test"), "zone.test.");
        assert_eq!(resolver.absolutize("name.zone.test."), "name.zone.test.");
        assert_eq!(resolver.absolutize("mail.other.test."), "mail.other.test.");
    }

    #[test]
    fn test_relativize() {
        let resolver = ZoneNameResolver::new("zone.test");
        assert_eq!(resolver.relativize("name.zone.test."), "name");
        assert_eq!(resolver.relativize("name.zone.test"), "name");
        assert_eq!(resolver.relativize("zone.test."), "@");
        assert_eq!(resolver.relativize("zone.test"), "@");
        assert_eq!(resolver.relativize("mail.other.test."), "mail.other.test");
        assert_eq!(resolver.relativize("name"), "name");
    }

    #[test]
    fn test_relativize_is_case_insensitive_on_suffix() {
        let resolver = ZoneNameResolver::new("zone.test");
        assert_eq!(resolver.relativize("Host.ZONE.Test."), "Host");
    }

    #[test]
    fn test_relativize_absolutize_identity() {
        let resolver = ZoneNameResolver::new("zone.test");
        for name in ["name", "@", "a.b", "name.zone.test", "name.zone.test.", "zone.test"] {
            assert_eq!(
                resolver.relativize(&resolver.absolutize(name)),
                resolver.relativize(name),
                "{}",
                name
            );
        }
    }

    #[test]
    fn test_zone_classification() {
        assert!(ZoneNameResolver::new("zone.test").is_forward_zone());
        assert!(ZoneNameResolver::new("1.in-addr.arpa").is_ipv4_reverse_zone());
        assert!(ZoneNameResolver::new("in-addr.arpa").is_reverse_zone());
        assert!(ZoneNameResolver::new("8.b.d.0.1.0.0.2.ip6.arpa.").is_ipv6_reverse_zone());
        assert!(!ZoneNameResolver::new("notin-addr.arpa").is_reverse_zone());
    }

    #[test]
    fn test_contains() {
        let resolver = ZoneNameResolver::new("zone.test");
        assert!(resolver.contains("zone.test."));
        assert!(resolver.contains("www.Zone.Test."));
        assert!(resolver.contains("www.zone.test"));
        assert!(!resolver.contains("ns1.other.test."));
        assert!(!resolver.contains("notzone.test."));
    }

    #[test]
    fn test_ipv4_reverse_tets() {
        let resolver = ZoneNameResolver::new("1.in-addr.arpa");
        assert_eq!(resolver.get_ip_address("4.3.2").unwrap(), "1.2.3.4");
        assert_eq!(resolver.get_reverse_tets("1.2.3.4").unwrap(), "4.3.2");
    }

    #[test]
    fn test_ipv4_ownership_width() {
        let slash24 = ZoneNameResolver::new("3.2.1.in-addr.arpa");
        assert_eq!(slash24.get_reverse_tets("1.2.3.4").unwrap(), "4");
        assert_eq!(slash24.get_ip_address("4").unwrap(), "1.2.3.4");

        let slash16 = ZoneNameResolver::new("168.192.in-addr.arpa");
        assert_eq!(slash16.get_reverse_tets("192.168.10.20").unwrap(), "20.10");
        assert_eq!(slash16.get_ip_address("20.10").unwrap(), "192.168.10.20");
    }

    #[test]
    fn test_ipv4_outside_zone() {
        let resolver = ZoneNameResolver::new("1.in-addr.arpa");
        assert!(resolver.get_reverse_tets("10.2.3.4").is_err());
        assert!(resolver.get_reverse_tets("2001:db8::1").is_err());
        assert!(resolver.get_reverse_tets("not-an-ip").is_err());
        assert!(resolver.get_ip_address("3.2").is_err());
    }

    #[test]
    fn test_ipv6_round_trip() {
        let resolver = ZoneNameResolver::new("8.b.d.0.1.0.0.2.ip6.arpa");
        for ip in ["2001:db8::1", "2001:db8:1234:5678:9abc:def0:1:2"] {
            let tets = resolver.get_reverse_tets(ip).unwrap();
            assert_eq!(tets.split('.').count(), 24);
            assert_eq!(resolver.get_ip_address(&tets).unwrap(), ip);
        }
        assert_eq!(
            resolver.get_reverse_tets("2001:db8::1").unwrap(),
            "1.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0"
        );
    }

    #[test]
    fn test_ipv4_round_trip_across_zone_widths() {
        for zone in ["in-addr.arpa", "10.in-addr.arpa", "0.10.in-addr.arpa", "5.0.10.in-addr.arpa"] {
            let resolver = ZoneNameResolver::new(zone);
            let tets = resolver.get_reverse_tets("10.0.5.7").unwrap();
            assert_eq!(resolver.get_ip_address(&tets).unwrap(), "10.0.5.7", "{}", zone);
        }
    }
}
