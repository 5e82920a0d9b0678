use std::sync::Arc;

use crate::dns_record::RecordType;

/// A client question together with the raw message it arrived in.
///
/// The raw bytes are kept because cached answers echo the question section
/// verbatim and forwarding relays the message unchanged apart from its id.
#[derive(Debug, Clone)]
pub struct DnsQuery {
    pub id: u16,
    pub domain: Arc<str>,
    pub qtype: u16,
    pub message: Arc<[u8]>,
}

impl DnsQuery {
    pub fn new(domain: impl Into<Arc<str>>, qtype: u16, message: impl Into<Arc<[u8]>>) -> Self {
        let message = message.into();
        Self {
            id: transaction_id(&message).unwrap_or(0),
            domain: domain.into(),
            qtype,
            message,
        }
    }

    pub fn record_type(&self) -> Option<RecordType> {
        RecordType::from_u16(self.qtype)
    }

    pub fn is_address_query(&self) -> bool {
        self.record_type().is_some_and(|t| t.is_address())
    }

    /// Copy of the raw message carrying `id` as its transaction id.
    pub fn with_transaction_id(&self, id: u16) -> Vec<u8> {
        let mut bytes = self.message.to_vec();
        set_transaction_id(&mut bytes, id);
        bytes
    }
}

pub fn transaction_id(message: &[u8]) -> Option<u16> {
    match message {
        [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo])),
        _ => None,
    }
}

/// No-op on messages shorter than two bytes.
pub fn set_transaction_id(message: &mut [u8], id: u16) {
    if let Some(slot) = message.get_mut(..2) {
        slot.copy_from_slice(&id.to_be_bytes());
    }
}
