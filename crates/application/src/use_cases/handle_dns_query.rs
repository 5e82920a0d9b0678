use crate::ports::{DnsCachePort, HostTable, UpstreamTransport};
use dnsrelay_domain::dns_query::{set_transaction_id, transaction_id};
use dnsrelay_domain::{DnsQuery, DomainError, HostEntry, RecordType};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of handling one client query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsResolution {
    /// Static host-table address for an A query.
    Host(Ipv4Addr),
    /// Host-table entry `0.0.0.0`: answer with a name error.
    Blocked,
    /// Complete reply built from the record cache.
    Cached(Vec<u8>),
    /// Upstream reply carrying the client's transaction id.
    Forwarded(Vec<u8>),
    /// Nothing to send back (timeout, transport failure, spoofed reply).
    Unanswered,
}

pub struct HandleDnsQueryUseCase {
    hosts: Arc<dyn HostTable>,
    cache: Arc<dyn DnsCachePort>,
    upstreams: Vec<Arc<dyn UpstreamTransport>>,
    query_timeout: Duration,
}

impl HandleDnsQueryUseCase {
    pub fn new(
        hosts: Arc<dyn HostTable>,
        cache: Arc<dyn DnsCachePort>,
        upstreams: Vec<Arc<dyn UpstreamTransport>>,
        query_timeout: Duration,
    ) -> Self {
        Self {
            hosts,
            cache,
            upstreams,
            query_timeout,
        }
    }

    pub fn upstream_count(&self) -> usize {
        self.upstreams.len()
    }

    /// Host table, then cache, then upstream `worker_id % upstreams`.
    pub async fn execute(&self, query: &DnsQuery, worker_id: usize) -> DnsResolution {
        if query.record_type() == Some(RecordType::A) {
            match self.hosts.lookup(&query.domain) {
                Some(HostEntry::Address(addr)) => {
                    debug!(domain = %query.domain, address = %addr, "Answered from host table");
                    return DnsResolution::Host(addr);
                }
                Some(HostEntry::Blocked) => {
                    debug!(domain = %query.domain, "Blocked by host table");
                    return DnsResolution::Blocked;
                }
                None => {}
            }
        }

        if query.is_address_query() {
            if let Some(reply) = self.cache.answer_from_cache(query) {
                debug!(
                    domain = %query.domain,
                    record_type = query.qtype,
                    "Answered from cache"
                );
                return DnsResolution::Cached(reply);
            }
        }

        match self.forward(query, worker_id).await {
            Ok(reply) => DnsResolution::Forwarded(reply),
            Err(e) => {
                warn!(
                    domain = %query.domain,
                    record_type = query.qtype,
                    worker = worker_id,
                    error = %e,
                    "Upstream query failed"
                );
                DnsResolution::Unanswered
            }
        }
    }

    async fn forward(&self, query: &DnsQuery, worker_id: usize) -> Result<Vec<u8>, DomainError> {
        if self.upstreams.is_empty() {
            return Err(DomainError::NoUpstreamServers);
        }
        let upstream = &self.upstreams[worker_id % self.upstreams.len()];

        let relay_id = fastrand::u16(..);
        let message = query.with_transaction_id(relay_id);

        let mut reply = tokio::time::timeout(
            self.query_timeout,
            upstream.exchange(&message, self.query_timeout),
        )
        .await
        .map_err(|_| DomainError::TransportTimeout {
            server: upstream.server(),
        })??;

        match transaction_id(&reply) {
            Some(received) if received == relay_id => {}
            Some(received) => {
                return Err(DomainError::SpoofedResponse {
                    expected: relay_id,
                    received,
                })
            }
            None => {
                return Err(DomainError::InvalidDnsResponse(format!(
                    "{}-byte reply from {}",
                    reply.len(),
                    upstream.server()
                )))
            }
        }

        set_transaction_id(&mut reply, query.id);
        let stored = self.cache.absorb_reply(&reply);

        debug!(
            domain = %query.domain,
            server = %upstream.server(),
            bytes = reply.len(),
            stored,
            "Forwarded query"
        );

        Ok(reply)
    }
}
