use super::clock::unix_now_secs;
use super::inverse_query::InverseQuery;
use dnsrelay_application::ports::DnsCachePort;
use dnsrelay_domain::DnsQuery;

/// [`DnsCachePort`] backed by the record cache.
pub struct CacheResponder {
    inverse: InverseQuery,
}

impl CacheResponder {
    pub fn new(inverse: InverseQuery) -> Self {
        Self { inverse }
    }
}

impl DnsCachePort for CacheResponder {
    fn answer_from_cache(&self, query: &DnsQuery) -> Option<Vec<u8>> {
        self.inverse.answer(&query.message)
    }

    fn absorb_reply(&self, reply: &[u8]) -> usize {
        self.inverse
            .cache()
            .absorb_upstream_reply(reply, unix_now_secs())
    }
}
