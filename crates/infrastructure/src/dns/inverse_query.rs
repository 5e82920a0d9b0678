use super::cache::RecordCache;
use super::clock::unix_now_secs;
use super::wire::{
    append_cname_record, build_a_record, build_aaaa_record, parse_query, response_skeleton,
    write_header_field, HeaderField, HEADER_SIZE, MAX_POINTER_OFFSET, MAX_UDP_REPLY,
};
use dnsrelay_domain::RecordType;
use std::sync::Arc;
use tracing::debug;

/// Offset of the rdata inside a record whose owner is a pointer.
const RDATA_OFFSET: usize = 12;
const MAX_ADDRESS_RECORD: usize = 28;

/// Builds complete replies to A / AAAA queries from the record cache,
/// following cached CNAME chains.
pub struct InverseQuery {
    cache: Arc<RecordCache>,
    max_cname_hops: usize,
}

impl InverseQuery {
    pub fn new(cache: Arc<RecordCache>, max_cname_hops: usize) -> Self {
        Self {
            cache,
            max_cname_hops,
        }
    }

    pub fn cache(&self) -> &Arc<RecordCache> {
        &self.cache
    }

    pub fn answer(&self, query: &[u8]) -> Option<Vec<u8>> {
        self.answer_at(query, unix_now_secs())
    }

    /// Reply to `query` as of `now`, or `None` when the cache cannot answer
    /// it completely with fresh records.
    pub fn answer_at(&self, query: &[u8], now: u64) -> Option<Vec<u8>> {
        let meta = parse_query(query)?;
        let record_type = RecordType::from_u16(meta.qtype).filter(RecordType::is_address)?;
        let mut current = meta.domain(query)?;

        let mut response = response_skeleton(query, &meta)?;
        let mut name_ref = HEADER_SIZE;
        let mut hops = 0usize;

        while hops < self.max_cname_hops {
            let Some(cname) = self.cache.query_cname(&current) else {
                break;
            };
            if !RecordCache::is_fresh(&cname, now) {
                debug!(domain = %current, "Stale CNAME ends the chain");
                break;
            }
            let Some(target) = cname.cname_target() else {
                break;
            };

            let record_at = response.len();
            match append_cname_record(&mut response, name_ref as u16, &cname, now) {
                Ok(written) if written > 0 => {}
                Ok(_) => return None,
                Err(e) => {
                    debug!(domain = %current, error = %e, "CNAME not encodable");
                    return None;
                }
            }
            if response.len() > MAX_UDP_REPLY {
                debug!(domain = %current, hops, "Cached reply exceeds UDP limit");
                return None;
            }

            name_ref = record_at + RDATA_OFFSET;
            if name_ref > MAX_POINTER_OFFSET {
                return None;
            }
            current = target.to_string();
            hops += 1;
        }

        let addresses = self.cache.query_addresses(&current, record_type)?;
        if addresses.is_empty() {
            return None;
        }

        let mut record = [0u8; MAX_ADDRESS_RECORD];
        for answer in &addresses {
            if !RecordCache::is_fresh(answer, now) {
                debug!(domain = %current, record_type = %record_type, "Stale address record");
                return None;
            }
            let written = match record_type {
                RecordType::A => build_a_record(name_ref as u16, answer, now, &mut record),
                _ => build_aaaa_record(name_ref as u16, answer, now, &mut record),
            };
            if written == 0 {
                return None;
            }
            response.extend_from_slice(&record[..written]);
        }

        if response.len() > MAX_UDP_REPLY {
            debug!(domain = %current, "Cached reply exceeds UDP limit");
            return None;
        }

        let count = u16::try_from(hops + addresses.len()).ok()?;
        write_header_field(&mut response, HeaderField::AnswerCount, count).ok()?;

        debug!(
            domain = %current,
            record_type = %record_type,
            hops,
            addresses = addresses.len(),
            "Built reply from cache"
        );
        Some(response)
    }
}
