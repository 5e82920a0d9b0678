use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    #[serde(default = "default_upstream_servers")]
    pub upstream_servers: Vec<String>,

    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Upper bound on CNAME hops followed when answering from cache.
    #[serde(default = "default_max_cname_hops")]
    pub max_cname_hops: usize,

    /// Worker tasks; one per upstream server when unset.
    #[serde(default)]
    pub workers: Option<usize>,

    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default)]
    pub hosts_file: Option<String>,
}

impl DnsConfig {
    /// Upstream servers that parse as socket addresses, in configured order.
    pub fn upstream_addrs(&self) -> Vec<SocketAddr> {
        self.upstream_servers
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect()
    }

    pub fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or(self.upstream_servers.len())
            .max(1)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            upstream_servers: default_upstream_servers(),
            query_timeout_ms: default_query_timeout_ms(),
            max_cname_hops: default_max_cname_hops(),
            workers: None,
            queue_capacity: default_queue_capacity(),
            hosts_file: None,
        }
    }
}

fn default_upstream_servers() -> Vec<String> {
    vec![
        "119.29.29.29:53".to_string(),
        "180.76.76.76:53".to_string(),
        "114.114.114.114:53".to_string(),
        "1.1.1.1:53".to_string(),
    ]
}

fn default_query_timeout_ms() -> u64 {
    1000
}

fn default_max_cname_hops() -> usize {
    100
}

fn default_queue_capacity() -> usize {
    1024
}
