use dnsrelay_domain::{Answer, AnswerData, INFINITE_TTL};
use tracing::debug;

use super::header::{write_header_field, HeaderField};
use super::name::{encode_name, label_offset, resolve_name, split_labels};
use super::query::{parse_query, QueryMeta};
use super::{
    WireError, FLAGS_NAME_ERROR, FLAGS_NOT_IMPLEMENTED, FLAGS_RESPONSE_OK, HEADER_SIZE,
    INFINITE_TTL_EMITTED, MAX_NAME_LEN, MAX_POINTER_OFFSET, MAX_UDP_REPLY, TYPE_A, TYPE_AAAA,
    TYPE_CNAME,
};

const A_RECORD_LEN: usize = 16;
const AAAA_RECORD_LEN: usize = 28;
const RR_HEADER_LEN: usize = 12;

fn echo_with_flags(query: &[u8], flags: u16) -> Vec<u8> {
    let mut reply = query.to_vec();
    if let Err(e) = write_header_field(&mut reply, HeaderField::Flags, flags) {
        debug!(error = %e, "Echoing query without a complete header");
    }
    reply
}

/// The query verbatim with the name-error flags.
pub fn build_no_such_name_response(query: &[u8]) -> Vec<u8> {
    echo_with_flags(query, FLAGS_NAME_ERROR)
}

/// The query verbatim with the not-implemented flags.
pub fn build_not_implemented_response(query: &[u8]) -> Vec<u8> {
    echo_with_flags(query, FLAGS_NOT_IMPLEMENTED)
}

/// Header and question of `query` with response flags and empty answer,
/// authority and additional sections.
pub fn response_skeleton(query: &[u8], meta: &QueryMeta) -> Option<Vec<u8>> {
    let header = query.get(..HEADER_SIZE)?;
    let question = meta.question(query)?;

    let mut response = Vec::with_capacity(MAX_UDP_REPLY);
    response.extend_from_slice(header);
    response.extend_from_slice(question);

    write_header_field(&mut response, HeaderField::Flags, FLAGS_RESPONSE_OK).ok()?;
    write_header_field(&mut response, HeaderField::QuestionCount, 1).ok()?;
    write_header_field(&mut response, HeaderField::AnswerCount, 0).ok()?;
    write_header_field(&mut response, HeaderField::AuthorityCount, 0).ok()?;
    write_header_field(&mut response, HeaderField::AdditionalCount, 0).ok()?;
    Some(response)
}

/// Single-answer reply for a host-table address.
pub fn build_host_response(query: &[u8], answer: &Answer, now: u64) -> Option<Vec<u8>> {
    let meta = parse_query(query)?;
    let mut response = response_skeleton(query, &meta)?;

    let mut record = [0u8; A_RECORD_LEN];
    if build_a_record(HEADER_SIZE as u16, answer, now, &mut record) == 0 {
        return None;
    }
    response.extend_from_slice(&record);
    write_header_field(&mut response, HeaderField::AnswerCount, 1).ok()?;
    Some(response)
}

#[inline]
fn emitted_ttl(answer: &Answer, now: u64) -> u32 {
    if answer.ttl == INFINITE_TTL {
        INFINITE_TTL_EMITTED
    } else {
        answer.remaining_ttl_at(now)
    }
}

fn write_rr_header(dest: &mut [u8], name_ref: u16, rtype: u16, class: u16, ttl: u32, rdlen: u16) {
    dest[0..2].copy_from_slice(&(0xC000 | name_ref).to_be_bytes());
    dest[2..4].copy_from_slice(&rtype.to_be_bytes());
    dest[4..6].copy_from_slice(&class.to_be_bytes());
    dest[6..10].copy_from_slice(&ttl.to_be_bytes());
    dest[10..12].copy_from_slice(&rdlen.to_be_bytes());
}

/// Writes a 16-byte A record owned by the name at `name_ref`. Returns 0 for
/// a non-A answer or a short `dest`.
pub fn build_a_record(name_ref: u16, answer: &Answer, now: u64, dest: &mut [u8]) -> usize {
    let AnswerData::A(addr) = answer.data else {
        return 0;
    };
    let Some(dest) = dest.get_mut(..A_RECORD_LEN) else {
        return 0;
    };
    write_rr_header(dest, name_ref, TYPE_A, answer.class, emitted_ttl(answer, now), 4);
    dest[RR_HEADER_LEN..].copy_from_slice(&addr.octets());
    A_RECORD_LEN
}

/// Writes a 28-byte AAAA record owned by the name at `name_ref`.
pub fn build_aaaa_record(name_ref: u16, answer: &Answer, now: u64, dest: &mut [u8]) -> usize {
    let AnswerData::Aaaa(addr) = answer.data else {
        return 0;
    };
    let Some(dest) = dest.get_mut(..AAAA_RECORD_LEN) else {
        return 0;
    };
    write_rr_header(dest, name_ref, TYPE_AAAA, answer.class, emitted_ttl(answer, now), 16);
    dest[RR_HEADER_LEN..].copy_from_slice(&addr.octets());
    AAAA_RECORD_LEN
}

/// Appends a CNAME record owned by the name at `name_ref` and returns its
/// length (0 for a non-CNAME answer).
///
/// Trailing labels the target shares with the owner name are replaced by a
/// pointer into the owner name. A target sharing nothing, or sharing the whole
/// owner name, is written literally.
pub fn append_cname_record(
    response: &mut Vec<u8>,
    name_ref: u16,
    answer: &Answer,
    now: u64,
) -> Result<usize, WireError> {
    let Some(target) = answer.cname_target() else {
        return Ok(0);
    };
    if usize::from(name_ref) > MAX_POINTER_OFFSET {
        return Err(WireError::PointerOutOfBounds {
            offset: usize::from(name_ref),
            len: response.len(),
        });
    }

    let target_wire = encode_name(target)?;
    let owner = resolve_name(response, usize::from(name_ref), MAX_NAME_LEN)?;
    let owner_labels = split_labels(&owner);
    let target_labels = split_labels(&target_wire[..target_wire.len() - 1]);

    let shared = owner_labels
        .iter()
        .rev()
        .zip(target_labels.iter().rev())
        .take_while(|(owner, target)| owner.eq_ignore_ascii_case(target))
        .count();

    let suffix_at = if shared == 0 || shared == owner_labels.len() {
        None
    } else {
        label_offset(response, usize::from(name_ref), owner_labels.len() - shared)
            .filter(|&offset| offset <= MAX_POINTER_OFFSET)
    };

    let rdata = match suffix_at {
        Some(offset) => {
            let mut rdata = Vec::with_capacity(target_wire.len());
            for label in &target_labels[..target_labels.len() - shared] {
                rdata.push(label.len() as u8);
                rdata.extend_from_slice(label);
            }
            rdata.extend_from_slice(&(0xC000 | offset as u16).to_be_bytes());
            rdata
        }
        None => target_wire,
    };

    let mut fixed = [0u8; RR_HEADER_LEN];
    write_rr_header(
        &mut fixed,
        name_ref,
        TYPE_CNAME,
        answer.class,
        emitted_ttl(answer, now),
        rdata.len() as u16,
    );
    response.extend_from_slice(&fixed);
    response.extend_from_slice(&rdata);
    Ok(RR_HEADER_LEN + rdata.len())
}
