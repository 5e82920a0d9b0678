use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use super::RecordType;
use crate::errors::DomainError;

/// Longest domain the cache keeps, in bytes.
pub const MAX_DOMAIN_LEN: usize = 128;

/// TTL carried by answers that never expire (host-table entries).
pub const INFINITE_TTL: u32 = u32::MAX;

pub const CLASS_IN: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Cname(Arc<str>),
}

/// A decoded A / AAAA / CNAME resource record owned by the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub domain: Arc<str>,
    /// Unix seconds at which the record was received.
    pub last_update: u64,
    pub class: u16,
    pub ttl: u32,
    pub data_length: u16,
    pub data: AnswerData,
}

impl Answer {
    pub fn a(domain: &str, addr: Ipv4Addr, ttl: u32, now: u64) -> Result<Self, DomainError> {
        Ok(Self {
            domain: Self::checked_domain(domain)?,
            last_update: now,
            class: CLASS_IN,
            ttl,
            data_length: 4,
            data: AnswerData::A(addr),
        })
    }

    pub fn aaaa(domain: &str, addr: Ipv6Addr, ttl: u32, now: u64) -> Result<Self, DomainError> {
        Ok(Self {
            domain: Self::checked_domain(domain)?,
            last_update: now,
            class: CLASS_IN,
            ttl,
            data_length: 16,
            data: AnswerData::Aaaa(addr),
        })
    }

    /// `data_length` is the wire length of the target as received.
    pub fn cname(
        domain: &str,
        target: &str,
        data_length: u16,
        ttl: u32,
        now: u64,
    ) -> Result<Self, DomainError> {
        if target.len() > MAX_DOMAIN_LEN {
            return Err(DomainError::InvalidDomainName(format!(
                "CNAME target exceeds {} bytes: {}",
                MAX_DOMAIN_LEN, target
            )));
        }
        Ok(Self {
            domain: Self::checked_domain(domain)?,
            last_update: now,
            class: CLASS_IN,
            ttl,
            data_length,
            data: AnswerData::Cname(Arc::from(target)),
        })
    }

    fn checked_domain(domain: &str) -> Result<Arc<str>, DomainError> {
        if domain.is_empty() {
            return Err(DomainError::InvalidDomainName(
                "empty domain name".to_string(),
            ));
        }
        if domain.len() > MAX_DOMAIN_LEN {
            return Err(DomainError::InvalidDomainName(format!(
                "domain exceeds {} bytes: {}",
                MAX_DOMAIN_LEN, domain
            )));
        }
        Ok(Arc::from(domain))
    }

    pub fn record_type(&self) -> RecordType {
        match self.data {
            AnswerData::A(_) => RecordType::A,
            AnswerData::Aaaa(_) => RecordType::AAAA,
            AnswerData::Cname(_) => RecordType::CNAME,
        }
    }

    pub fn cname_target(&self) -> Option<&str> {
        match &self.data {
            AnswerData::Cname(target) => Some(target),
            _ => None,
        }
    }

    /// Stale once `now - last_update >= ttl`.
    #[inline]
    pub fn is_expired_at(&self, now: u64) -> bool {
        if self.ttl == INFINITE_TTL {
            return false;
        }
        now.saturating_sub(self.last_update) >= u64::from(self.ttl)
    }

    #[inline]
    pub fn remaining_ttl_at(&self, now: u64) -> u32 {
        let age = now.saturating_sub(self.last_update);
        u64::from(self.ttl).saturating_sub(age) as u32
    }
}
