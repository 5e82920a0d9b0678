/// `example.com` -> `\x07example\x03com\x00`
pub fn wire_name(domain: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for label in domain.split('.').filter(|l| !l.is_empty()) {
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);
    out
}

pub fn build_query(domain: &str, qtype: u16, id: u16) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&id.to_be_bytes()); // ID
    buf.extend_from_slice(&[0x01, 0x00]); // flags: RD set
    buf.extend_from_slice(&[0x00, 0x01]); // QDCOUNT = 1
    buf.extend_from_slice(&[0x00, 0x00]); // ANCOUNT = 0
    buf.extend_from_slice(&[0x00, 0x00]); // NSCOUNT = 0
    buf.extend_from_slice(&[0x00, 0x00]); // ARCOUNT = 0
    buf.extend_from_slice(&wire_name(domain));
    buf.extend_from_slice(&qtype.to_be_bytes());
    buf.extend_from_slice(&[0x00, 0x01]); // QCLASS = IN
    buf
}

pub fn append_opt_record(buf: &mut Vec<u8>) {
    buf[11] += 1; // ARCOUNT
    buf.push(0x00); // NAME = root
    buf.extend_from_slice(&[0x00, 41]); // TYPE = OPT
    buf.extend_from_slice(&[0x10, 0x00]); // CLASS = 4096
    buf.extend_from_slice(&[0, 0, 0, 0]); // extended RCODE, version, flags
    buf.extend_from_slice(&[0x00, 0x00]); // RDLEN = 0
}

/// Upstream-style reply assembled record by record on top of a query.
pub struct ReplyBuilder {
    buf: Vec<u8>,
    answers: u16,
    authority: u16,
}

impl ReplyBuilder {
    pub fn for_query(query: &[u8]) -> Self {
        let mut buf = query.to_vec();
        buf[2] = 0x81;
        buf[3] = 0x80;
        buf[10] = 0;
        buf[11] = 0;
        Self {
            buf,
            answers: 0,
            authority: 0,
        }
    }

    /// Offset the next record will start at.
    pub fn offset(&self) -> usize {
        self.buf.len()
    }

    /// Appends a record with a raw owner name; returns the rdata offset.
    pub fn record(&mut self, owner: &[u8], rtype: u16, ttl: u32, rdata: &[u8]) -> usize {
        self.buf.extend_from_slice(owner);
        self.buf.extend_from_slice(&rtype.to_be_bytes());
        self.buf.extend_from_slice(&[0x00, 0x01]); // IN
        self.buf.extend_from_slice(&ttl.to_be_bytes());
        self.buf.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        let rdata_at = self.buf.len();
        self.buf.extend_from_slice(rdata);
        self.answers += 1;
        rdata_at
    }

    pub fn a(&mut self, owner_ptr: u16, addr: [u8; 4], ttl: u32) -> usize {
        self.record(&pointer(owner_ptr), 1, ttl, &addr)
    }

    pub fn aaaa(&mut self, owner_ptr: u16, addr: [u8; 16], ttl: u32) -> usize {
        self.record(&pointer(owner_ptr), 28, ttl, &addr)
    }

    pub fn cname(&mut self, owner_ptr: u16, target: &str, ttl: u32) -> usize {
        self.record(&pointer(owner_ptr), 5, ttl, &wire_name(target))
    }

    /// Moves the last record from the answer to the authority count.
    pub fn as_authority(&mut self) {
        self.answers -= 1;
        self.authority += 1;
    }

    pub fn build(mut self) -> Vec<u8> {
        self.buf[6..8].copy_from_slice(&self.answers.to_be_bytes());
        self.buf[8..10].copy_from_slice(&self.authority.to_be_bytes());
        self.buf
    }
}

pub fn pointer(offset: u16) -> [u8; 2] {
    (0xC000 | offset).to_be_bytes()
}

pub fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([buf[at], buf[at + 1]])
}
