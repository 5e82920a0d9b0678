use std::net::Ipv4Addr;

/// A static entry of the host table.
///
/// `0.0.0.0` in the host file marks a blocked name, answered with a
/// name-error response instead of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEntry {
    Address(Ipv4Addr),
    Blocked,
}

impl HostEntry {
    pub fn from_ip(ip: Ipv4Addr) -> Self {
        if ip.is_unspecified() {
            HostEntry::Blocked
        } else {
            HostEntry::Address(ip)
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, HostEntry::Blocked)
    }
}
