use super::name::{humanize_name, resolve_name};
use super::{HEADER_SIZE, MAX_NAME_LEN};

/// Location of the question inside a query buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryMeta {
    /// Offset of the question name.
    pub name: usize,
    pub qtype: u16,
    pub qclass: u16,
    /// First byte of the question section.
    pub begin: usize,
    /// One past the question class.
    pub end: usize,
}

impl QueryMeta {
    /// Question name in display form.
    pub fn domain(&self, buf: &[u8]) -> Option<String> {
        resolve_name(buf, self.name, MAX_NAME_LEN)
            .ok()
            .map(|raw| humanize_name(&raw))
    }

    pub fn question<'a>(&self, buf: &'a [u8]) -> Option<&'a [u8]> {
        buf.get(self.begin..self.end)
    }
}

/// Walks the question name from the header end.
///
/// Returns `None` when the name runs off the buffer, when it contains a
/// compression pointer or a reserved label type, or when the type and class
/// words do not fit.
pub fn parse_query(buf: &[u8]) -> Option<QueryMeta> {
    if buf.len() < HEADER_SIZE {
        return None;
    }

    let mut pos = HEADER_SIZE;
    loop {
        let len = *buf.get(pos)?;
        if len == 0 {
            pos += 1;
            break;
        }
        if len & 0xC0 != 0 {
            return None;
        }
        pos += 1 + usize::from(len);
    }

    let fixed = buf.get(pos..pos + 4)?;
    Some(QueryMeta {
        name: HEADER_SIZE,
        qtype: u16::from_be_bytes([fixed[0], fixed[1]]),
        qclass: u16::from_be_bytes([fixed[2], fixed[3]]),
        begin: HEADER_SIZE,
        end: pos + 4,
    })
}
