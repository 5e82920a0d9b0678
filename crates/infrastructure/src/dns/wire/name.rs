use super::{WireError, MAX_LABEL_LEN, MAX_NAME_LEN, MAX_POINTER_HOPS};
use tracing::warn;

const POINTER_MASK: u8 = 0xC0;

#[inline]
fn pointer_target(hi: u8, lo: u8) -> usize {
    (usize::from(hi & 0x3F) << 8) | usize::from(lo)
}

/// Decodes the name at `start`, following compression pointers.
///
/// Returns the raw label form: each label keeps its length byte, the zero
/// terminator is dropped. `capacity` bounds the decoded length.
pub fn resolve_name(message: &[u8], start: usize, capacity: usize) -> Result<Vec<u8>, WireError> {
    let mut out = Vec::new();
    let mut pos = start;
    let mut hops = 0usize;

    loop {
        let len = *message.get(pos).ok_or(WireError::Truncated {
            needed: pos + 1,
            len: message.len(),
        })?;

        match len & POINTER_MASK {
            POINTER_MASK => {
                let lo = *message.get(pos + 1).ok_or(WireError::Truncated {
                    needed: pos + 2,
                    len: message.len(),
                })?;
                let target = pointer_target(len, lo);
                if target >= message.len() {
                    return Err(WireError::PointerOutOfBounds {
                        offset: target,
                        len: message.len(),
                    });
                }
                hops += 1;
                if hops > MAX_POINTER_HOPS {
                    return Err(WireError::PointerLoop);
                }
                pos = target;
            }
            0x00 => {
                if len == 0 {
                    return Ok(out);
                }
                let len = usize::from(len);
                let label = message
                    .get(pos + 1..pos + 1 + len)
                    .ok_or(WireError::Truncated {
                        needed: pos + 1 + len,
                        len: message.len(),
                    })?;
                if out.len() + 1 + len > capacity {
                    warn!(capacity, start, "Decoded name exceeds destination capacity");
                    return Err(WireError::NameTooLong { capacity });
                }
                out.push(len as u8);
                out.extend_from_slice(label);
                pos += 1 + len;
            }
            _ => return Err(WireError::ReservedLabel(len)),
        }
    }
}

/// Labels of a name in raw label form. Stops at the first length byte that
/// runs past the end.
pub fn split_labels(raw: &[u8]) -> Vec<&[u8]> {
    let mut labels = Vec::new();
    let mut pos = 0;
    while let Some(&len) = raw.get(pos) {
        let len = usize::from(len);
        match raw.get(pos + 1..pos + 1 + len) {
            Some(label) if len > 0 => labels.push(label),
            _ => break,
        }
        pos += 1 + len;
    }
    labels
}

/// Display form of a raw name: `www.example.com`, no leading or trailing dot.
pub fn humanize_name(raw: &[u8]) -> String {
    let mut out = Vec::with_capacity(raw.len());
    for label in split_labels(raw) {
        if !out.is_empty() {
            out.push(b'.');
        }
        out.extend_from_slice(label);
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Dotted name to wire labels, terminator included. A single trailing dot is
/// accepted; `""` and `"."` encode the root.
pub fn encode_name(dotted: &str) -> Result<Vec<u8>, WireError> {
    let trimmed = dotted.strip_suffix('.').unwrap_or(dotted);
    let mut out = Vec::with_capacity(trimmed.len() + 2);

    if !trimmed.is_empty() {
        for label in trimmed.split('.') {
            if label.is_empty() {
                return Err(WireError::EmptyLabel(dotted.to_string()));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(WireError::LabelTooLong(label.len()));
            }
            out.push(label.len() as u8);
            out.extend_from_slice(label.as_bytes());
        }
    }

    if out.len() > MAX_NAME_LEN {
        return Err(WireError::NameTooLong {
            capacity: MAX_NAME_LEN,
        });
    }
    out.push(0);
    Ok(out)
}

/// Offset just past the name at `start`, without following pointers: after
/// the zero label, or after the two bytes of a trailing pointer.
pub fn name_end(message: &[u8], start: usize) -> Option<usize> {
    let mut pos = start;
    loop {
        let len = *message.get(pos)?;
        match len & POINTER_MASK {
            POINTER_MASK => {
                message.get(pos + 1)?;
                return Some(pos + 2);
            }
            0x00 if len == 0 => return Some(pos + 1),
            0x00 => {
                pos += 1 + usize::from(len);
                if pos > message.len() {
                    return None;
                }
            }
            _ => return None,
        }
    }
}

/// Offset of the label reached after skipping `skip` labels of the name at
/// `start`. Pointers are followed, so the result always lands on a length
/// byte.
pub fn label_offset(message: &[u8], start: usize, skip: usize) -> Option<usize> {
    let mut pos = start;
    let mut skipped = 0usize;
    let mut hops = 0usize;

    loop {
        let len = *message.get(pos)?;
        match len & POINTER_MASK {
            POINTER_MASK => {
                let lo = *message.get(pos + 1)?;
                hops += 1;
                if hops > MAX_POINTER_HOPS {
                    return None;
                }
                pos = pointer_target(len, lo);
            }
            0x00 => {
                if skipped == skip {
                    return Some(pos);
                }
                if len == 0 {
                    return None;
                }
                pos += 1 + usize::from(len);
                skipped += 1;
            }
            _ => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Header padding, `example.com` at 12, `www` + pointer to 12 at 25.
    fn message() -> Vec<u8> {
        let mut buf = vec![0u8; 12];
        buf.extend_from_slice(b"\x07example\x03com\x00");
        buf.extend_from_slice(b"\x03www\xC0\x0C");
        buf
    }

    #[test]
    fn test_resolve_literal_name() {
        let buf = message();
        let raw = resolve_name(&buf, 12, MAX_NAME_LEN).unwrap();
        assert_eq!(raw, b"\x07example\x03com");
        assert_eq!(humanize_name(&raw), "example.com");
    }

    #[test]
    fn test_resolve_name_through_pointer() {
        let buf = message();
        let raw = resolve_name(&buf, 25, MAX_NAME_LEN).unwrap();
        assert_eq!(humanize_name(&raw), "www.example.com");
    }

    #[test]
    fn test_pure_pointer_equals_target() {
        let mut buf = message();
        let ptr_at = buf.len();
        buf.extend_from_slice(&[0xC0, 25]);
        assert_eq!(
            resolve_name(&buf, ptr_at, MAX_NAME_LEN).unwrap(),
            resolve_name(&buf, 25, MAX_NAME_LEN).unwrap()
        );
    }

    #[test]
    fn test_capacity_exceeded() {
        let buf = message();
        assert_eq!(
            resolve_name(&buf, 12, 8),
            Err(WireError::NameTooLong { capacity: 8 })
        );
    }

    #[test]
    fn test_pointer_loop_detected() {
        let mut buf = vec![0u8; 12];
        buf.extend_from_slice(&[0xC0, 0x0C]);
        assert_eq!(resolve_name(&buf, 12, MAX_NAME_LEN), Err(WireError::PointerLoop));
    }

    #[test]
    fn test_pointer_out_of_bounds() {
        let mut buf = vec![0u8; 12];
        buf.extend_from_slice(&[0xC0, 0x40]);
        assert!(matches!(
            resolve_name(&buf, 12, MAX_NAME_LEN),
            Err(WireError::PointerOutOfBounds { offset: 0x40, .. })
        ));
    }

    #[test]
    fn test_name_running_off_buffer() {
        let mut buf = vec![0u8; 12];
        buf.extend_from_slice(b"\x07exam");
        assert!(matches!(
            resolve_name(&buf, 12, MAX_NAME_LEN),
            Err(WireError::Truncated { .. })
        ));
        assert_eq!(name_end(&buf, 12), None);
    }

    #[test]
    fn test_reserved_label_type() {
        let mut buf = vec![0u8; 12];
        buf.extend_from_slice(&[0x41, 0x00]);
        assert_eq!(
            resolve_name(&buf, 12, MAX_NAME_LEN),
            Err(WireError::ReservedLabel(0x41))
        );
    }

    #[test]
    fn test_encode_name() {
        assert_eq!(encode_name("example.com").unwrap(), b"\x07example\x03com\x00");
        assert_eq!(encode_name("example.com.").unwrap(), b"\x07example\x03com\x00");
        assert_eq!(encode_name("").unwrap(), b"\x00");
        assert!(matches!(encode_name("a..b"), Err(WireError::EmptyLabel(_))));
        assert_eq!(
            encode_name(&"x".repeat(64)),
            Err(WireError::LabelTooLong(64))
        );
        let long = vec!["abcdefgh"; 40].join(".");
        assert!(matches!(encode_name(&long), Err(WireError::NameTooLong { .. })));
    }

    #[test]
    fn test_name_end_literal_and_pointer() {
        let buf = message();
        assert_eq!(name_end(&buf, 12), Some(25));
        assert_eq!(name_end(&buf, 25), Some(31));
    }

    #[test]
    fn test_label_offset_follows_pointers() {
        let buf = message();
        assert_eq!(label_offset(&buf, 25, 0), Some(25));
        assert_eq!(label_offset(&buf, 25, 1), Some(12));
        assert_eq!(label_offset(&buf, 25, 2), Some(20));
        assert_eq!(label_offset(&buf, 25, 4), None);
    }

    #[test]
    fn test_split_labels_stops_on_overrun() {
        assert_eq!(split_labels(b"\x03www\x07example"), vec![&b"www"[..], &b"example"[..]]);
        assert_eq!(split_labels(b"\x03www\x09exa"), vec![&b"www"[..]]);
        assert!(split_labels(b"").is_empty());
    }
}
