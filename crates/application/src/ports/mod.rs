mod dns_cache_port;
mod host_table;
mod upstream_transport;

pub use dns_cache_port::DnsCachePort;
pub use host_table::HostTable;
pub use upstream_transport::UpstreamTransport;

// Re-export for convenience
pub use dnsrelay_domain::DnsQuery;
