use super::clock::unix_now_secs;
use super::wire::{
    build_host_response, build_no_such_name_response, build_not_implemented_response, is_response,
    opcode, parse_query, read_header_field, HeaderField, HEADER_SIZE,
};
use dnsrelay_application::use_cases::{DnsResolution, HandleDnsQueryUseCase};
use dnsrelay_domain::{Answer, DnsQuery, INFINITE_TTL};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

const OPCODE_QUERY: u8 = 0;

/// Turns one client datagram into the reply to send back, if any.
pub struct DnsServerHandler {
    use_case: Arc<HandleDnsQueryUseCase>,
}

impl DnsServerHandler {
    pub fn new(use_case: Arc<HandleDnsQueryUseCase>) -> Self {
        Self { use_case }
    }

    pub async fn handle(&self, bytes: &[u8], client: SocketAddr, worker_id: usize) -> Option<Vec<u8>> {
        if bytes.len() < HEADER_SIZE {
            debug!(client = %client, len = bytes.len(), "Dropping runt datagram");
            return None;
        }
        let flags = read_header_field(bytes, HeaderField::Flags).ok()?;
        if is_response(flags) {
            debug!(client = %client, "Dropping datagram with QR set");
            return None;
        }
        if opcode(flags) != OPCODE_QUERY {
            warn!(client = %client, opcode = opcode(flags), "Unsupported opcode");
            return Some(build_not_implemented_response(bytes));
        }

        let Some(meta) = parse_query(bytes) else {
            debug!(client = %client, "Dropping malformed question");
            return None;
        };
        let domain = meta.domain(bytes)?;

        info!(domain = %domain, record_type = meta.qtype, client = %client, "DNS query received");

        let query = DnsQuery::new(domain, meta.qtype, bytes);

        match self.use_case.execute(&query, worker_id).await {
            DnsResolution::Host(addr) => {
                let answer = Answer::a(&query.domain, addr, INFINITE_TTL, unix_now_secs()).ok()?;
                build_host_response(bytes, &answer, unix_now_secs())
            }
            DnsResolution::Blocked => Some(build_no_such_name_response(bytes)),
            DnsResolution::Cached(reply) | DnsResolution::Forwarded(reply) => Some(reply),
            DnsResolution::Unanswered => None,
        }
    }
}
