use super::{WireError, HEADER_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    Id,
    Flags,
    QuestionCount,
    AnswerCount,
    AuthorityCount,
    AdditionalCount,
}

impl HeaderField {
    #[inline]
    const fn offset(self) -> usize {
        match self {
            HeaderField::Id => 0,
            HeaderField::Flags => 2,
            HeaderField::QuestionCount => 4,
            HeaderField::AnswerCount => 6,
            HeaderField::AuthorityCount => 8,
            HeaderField::AdditionalCount => 10,
        }
    }
}

/// Header word in host byte order.
pub fn read_header_field(buf: &[u8], field: HeaderField) -> Result<u16, WireError> {
    if buf.len() < HEADER_SIZE {
        return Err(WireError::Truncated {
            needed: HEADER_SIZE,
            len: buf.len(),
        });
    }
    let at = field.offset();
    Ok(u16::from_be_bytes([buf[at], buf[at + 1]]))
}

/// Writes `value` big-endian into the header word.
pub fn write_header_field(buf: &mut [u8], field: HeaderField, value: u16) -> Result<(), WireError> {
    if buf.len() < HEADER_SIZE {
        return Err(WireError::Truncated {
            needed: HEADER_SIZE,
            len: buf.len(),
        });
    }
    let at = field.offset();
    buf[at..at + 2].copy_from_slice(&value.to_be_bytes());
    Ok(())
}

#[inline]
pub fn opcode(flags: u16) -> u8 {
    ((flags >> 11) & 0x0F) as u8
}

#[inline]
pub fn is_response(flags: u16) -> bool {
    flags & 0x8000 != 0
}
