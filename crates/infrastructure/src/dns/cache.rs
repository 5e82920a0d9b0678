use super::trie::DomainTrie;
use super::wire::decode_answers;
use dnsrelay_domain::{Answer, DomainError, RecordType};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

type AddressPool = RwLock<DomainTrie<Vec<Answer>>>;

/// Entry counts per pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolSizes {
    pub a: usize,
    pub aaaa: usize,
    pub cname: usize,
}

/// A / AAAA / CNAME record store.
///
/// Each pool sits behind its own lock; nothing spans two pools. Entries are
/// never swept: readers check freshness with [`RecordCache::is_fresh`].
pub struct RecordCache {
    a: AddressPool,
    aaaa: AddressPool,
    cname: RwLock<DomainTrie<Answer>>,
}

impl Default for RecordCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordCache {
    pub fn new() -> Self {
        info!("Initializing record cache");
        Self {
            a: RwLock::new(DomainTrie::new()),
            aaaa: RwLock::new(DomainTrie::new()),
            cname: RwLock::new(DomainTrie::new()),
        }
    }

    fn address_pool(&self, record_type: RecordType) -> Option<&AddressPool> {
        match record_type {
            RecordType::A => Some(&self.a),
            RecordType::AAAA => Some(&self.aaaa),
            _ => None,
        }
    }

    #[inline]
    pub fn is_fresh(answer: &Answer, now: u64) -> bool {
        !answer.is_expired_at(now)
    }

    /// Copy of the address list for `domain`, stale entries included.
    pub fn query_addresses(&self, domain: &str, record_type: RecordType) -> Option<Vec<Answer>> {
        let pool = self.address_pool(record_type)?;
        let pool = pool.read().unwrap_or_else(PoisonError::into_inner);
        pool.find(domain).cloned()
    }

    pub fn query_cname(&self, domain: &str) -> Option<Answer> {
        let pool = self.cname.read().unwrap_or_else(PoisonError::into_inner);
        pool.find(domain).cloned()
    }

    /// Replaces the whole address list of `domain`.
    pub fn refresh_addresses(
        &self,
        domain: &str,
        record_type: RecordType,
        answers: Vec<Answer>,
    ) -> Result<(), DomainError> {
        let pool = self
            .address_pool(record_type)
            .ok_or_else(|| DomainError::UnsupportedRecordType(record_type.to_string()))?;
        let mut pool = pool.write().unwrap_or_else(PoisonError::into_inner);
        pool.remove(domain);
        pool.insert(domain, answers)?;
        Ok(())
    }

    pub fn refresh_cname(&self, domain: &str, answer: Answer) -> Result<(), DomainError> {
        if answer.record_type() != RecordType::CNAME {
            return Err(DomainError::UnsupportedRecordType(
                answer.record_type().to_string(),
            ));
        }
        let mut pool = self.cname.write().unwrap_or_else(PoisonError::into_inner);
        pool.remove(domain);
        pool.insert(domain, answer)?;
        Ok(())
    }

    /// Drops the entry for `(domain, record_type)`. Returns whether one existed.
    pub fn remove(&self, domain: &str, record_type: RecordType) -> bool {
        match record_type {
            RecordType::CNAME => self
                .cname
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(domain)
                .is_some(),
            other => self.address_pool(other).is_some_and(|pool| {
                pool.write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(domain)
                    .is_some()
            }),
        }
    }

    pub fn pool_sizes(&self) -> PoolSizes {
        PoolSizes {
            a: self.a.read().unwrap_or_else(PoisonError::into_inner).len(),
            aaaa: self.aaaa.read().unwrap_or_else(PoisonError::into_inner).len(),
            cname: self.cname.read().unwrap_or_else(PoisonError::into_inner).len(),
        }
    }

    /// Stores the A / AAAA / CNAME answers of an upstream reply.
    ///
    /// Address lists of every domain in the reply are replaced by exactly the
    /// addresses the reply carries. Returns the number of answers stored.
    pub fn absorb_upstream_reply(&self, raw: &[u8], now: u64) -> usize {
        let mut a = Vec::new();
        let mut aaaa = Vec::new();
        let mut cname = Vec::new();
        for answer in decode_answers(raw, now) {
            match answer.record_type() {
                RecordType::A => a.push(answer),
                RecordType::AAAA => aaaa.push(answer),
                _ => cname.push(answer),
            }
        }

        let mut stored = Self::replace_batch(&self.a, a) + Self::replace_batch(&self.aaaa, aaaa);

        if !cname.is_empty() {
            let mut pool = self.cname.write().unwrap_or_else(PoisonError::into_inner);
            for answer in cname {
                let domain = answer.domain.clone();
                pool.remove(&domain);
                match pool.insert(&domain, answer) {
                    Ok(_) => stored += 1,
                    Err(e) => debug!(domain = %domain, error = %e, "CNAME not cached"),
                }
            }
        }

        debug!(stored, "Absorbed upstream reply");
        stored
    }

    fn replace_batch(pool: &AddressPool, batch: Vec<Answer>) -> usize {
        if batch.is_empty() {
            return 0;
        }
        let mut pool = pool.write().unwrap_or_else(PoisonError::into_inner);

        for answer in &batch {
            pool.remove(&answer.domain);
        }

        let mut stored = 0;
        for answer in batch {
            let domain = answer.domain.clone();
            if let Some(list) = pool.find_mut(&domain) {
                list.push(answer);
                stored += 1;
                continue;
            }
            match pool.insert(&domain, vec![answer]) {
                Ok(_) => stored += 1,
                Err(e) => debug!(domain = %domain, error = %e, "Address not cached"),
            }
        }
        stored
    }
}
