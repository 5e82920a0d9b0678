//! DNS wire format (RFC 1035) for the A / AAAA / CNAME subset.
//!
//! Every read is a checked slice access against the buffer it came from.
//! Malformed input comes back as `None` or an empty list; only exhaustion of a
//! caller-supplied bound is reported as an error.

mod builder;
mod header;
mod name;
mod query;
mod record;

pub use builder::{
    append_cname_record, build_a_record, build_aaaa_record, build_host_response,
    build_no_such_name_response, build_not_implemented_response, response_skeleton,
};
pub use header::{is_response, opcode, read_header_field, write_header_field, HeaderField};
pub use name::{encode_name, humanize_name, label_offset, name_end, resolve_name, split_labels};
pub use query::{parse_query, QueryMeta};
pub use record::{decode_answers, parse_resource_records, RecordMeta};

use thiserror::Error;

pub const HEADER_SIZE: usize = 12;

/// Largest reply sent without EDNS0.
pub const MAX_UDP_REPLY: usize = 512;

/// Longest name in raw label form, terminator excluded.
pub const MAX_NAME_LEN: usize = 255;

pub const MAX_LABEL_LEN: usize = 63;

/// Compression pointers followed while decoding one name.
pub const MAX_POINTER_HOPS: usize = 64;

/// Offsets above this cannot be encoded in a compression pointer.
pub const MAX_POINTER_OFFSET: usize = 0x3FFF;

pub const FLAGS_RESPONSE_OK: u16 = 0x8180;
pub const FLAGS_NAME_ERROR: u16 = 0x8183;
pub const FLAGS_NOT_IMPLEMENTED: u16 = 0x8184;

pub const TYPE_A: u16 = 1;
pub const TYPE_CNAME: u16 = 5;
pub const TYPE_AAAA: u16 = 28;

/// TTL emitted for answers whose TTL is the `INFINITE_TTL` sentinel.
pub const INFINITE_TTL_EMITTED: u32 = 86_400;

/// Size of the fixed part of a resource record following its name.
pub const RR_FIXED_LEN: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("message truncated: need {needed} bytes, have {len}")]
    Truncated { needed: usize, len: usize },

    #[error("decoded name exceeds {capacity} bytes")]
    NameTooLong { capacity: usize },

    #[error("label of {0} bytes exceeds 63")]
    LabelTooLong(usize),

    #[error("empty label in {0:?}")]
    EmptyLabel(String),

    #[error("reserved label type {0:#04x}")]
    ReservedLabel(u8),

    #[error("compression pointer to {offset} outside {len}-byte message")]
    PointerOutOfBounds { offset: usize, len: usize },

    #[error("more than 64 compression pointers")]
    PointerLoop,
}
