use std::net::{Ipv4Addr, Ipv6Addr};

use dnsrelay_domain::{Answer, MAX_DOMAIN_LEN};
use tracing::debug;

use super::header::{read_header_field, HeaderField};
use super::name::{humanize_name, name_end, resolve_name};
use super::query::parse_query;
use super::{HEADER_SIZE, MAX_NAME_LEN, RR_FIXED_LEN, TYPE_A, TYPE_AAAA, TYPE_CNAME};

/// Offsets and fixed fields of one resource record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordMeta {
    pub begin: usize,
    /// Offset of the owner name (literal labels or a pointer).
    pub name: usize,
    pub rtype: u16,
    pub class: u16,
    pub ttl: u32,
    pub rdata_len: u16,
    pub rdata: usize,
    pub end: usize,
}

impl RecordMeta {
    pub fn rdata<'a>(&self, buf: &'a [u8]) -> Option<&'a [u8]> {
        buf.get(self.rdata..self.end)
    }
}

fn parse_record(buf: &[u8], begin: usize) -> Option<RecordMeta> {
    let fixed_at = name_end(buf, begin)?;
    let fixed = buf.get(fixed_at..fixed_at + RR_FIXED_LEN)?;

    let rdata_len = u16::from_be_bytes([fixed[8], fixed[9]]);
    let rdata = fixed_at + RR_FIXED_LEN;
    let end = rdata + usize::from(rdata_len);
    if end > buf.len() {
        return None;
    }

    Some(RecordMeta {
        begin,
        name: begin,
        rtype: u16::from_be_bytes([fixed[0], fixed[1]]),
        class: u16::from_be_bytes([fixed[2], fixed[3]]),
        ttl: u32::from_be_bytes([fixed[4], fixed[5], fixed[6], fixed[7]]),
        rdata_len,
        rdata,
        end,
    })
}

/// Answer and authority records of a response, in order.
///
/// A record whose framing does not fit the buffer is reported as `None`;
/// its end is unknown, so nothing after it is scanned.
pub fn parse_resource_records(buf: &[u8]) -> Vec<Option<RecordMeta>> {
    if buf.len() < HEADER_SIZE + 4 {
        return Vec::new();
    }
    let Some(question) = parse_query(buf) else {
        return Vec::new();
    };
    let (Ok(answers), Ok(authority)) = (
        read_header_field(buf, HeaderField::AnswerCount),
        read_header_field(buf, HeaderField::AuthorityCount),
    ) else {
        return Vec::new();
    };

    let count = usize::from(answers) + usize::from(authority);
    let mut records = Vec::with_capacity(count.min(64));
    let mut cursor = question.end;

    for _ in 0..count {
        match parse_record(buf, cursor) {
            Some(meta) => {
                cursor = meta.end;
                records.push(Some(meta));
            }
            None => {
                records.push(None);
                break;
            }
        }
    }
    records
}

/// Owned A / AAAA / CNAME answers of a response, stamped with `now`.
pub fn decode_answers(buf: &[u8], now: u64) -> Vec<Answer> {
    parse_resource_records(buf)
        .into_iter()
        .flatten()
        .filter_map(|meta| decode_answer(buf, &meta, now))
        .collect()
}

fn decode_answer(buf: &[u8], meta: &RecordMeta, now: u64) -> Option<Answer> {
    if !matches!(meta.rtype, TYPE_A | TYPE_AAAA | TYPE_CNAME) {
        return None;
    }

    let owner = resolve_name(buf, meta.name, MAX_NAME_LEN).ok()?;
    let domain = humanize_name(&owner);
    let rdata = meta.rdata(buf)?;

    let decoded = match (meta.rtype, rdata.len()) {
        (TYPE_A, 4) => {
            let addr = Ipv4Addr::new(rdata[0], rdata[1], rdata[2], rdata[3]);
            Answer::a(&domain, addr, meta.ttl, now)
        }
        (TYPE_AAAA, 16) => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(rdata);
            Answer::aaaa(&domain, Ipv6Addr::from(octets), meta.ttl, now)
        }
        (TYPE_CNAME, _) => {
            let target = resolve_name(buf, meta.rdata, MAX_DOMAIN_LEN + 1).ok()?;
            Answer::cname(&domain, &humanize_name(&target), meta.rdata_len, meta.ttl, now)
        }
        _ => {
            debug!(
                domain = %domain,
                record_type = meta.rtype,
                rdata_len = meta.rdata_len,
                "Skipping address record with unexpected length"
            );
            return None;
        }
    };

    match decoded {
        Ok(mut answer) => {
            answer.class = meta.class;
            Some(answer)
        }
        Err(e) => {
            debug!(domain = %domain, error = %e, "Skipping undecodable answer");
            None
        }
    }
}
