use async_trait::async_trait;
use dnsrelay_application::ports::{DnsCachePort, HostTable, UpstreamTransport};
use dnsrelay_domain::{DnsQuery, DomainError, HostEntry};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub struct MockHostTable {
    entries: HashMap<String, HostEntry>,
}

impl MockHostTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, domain: &str, entry: HostEntry) -> Self {
        self.entries.insert(domain.to_string(), entry);
        self
    }
}

impl HostTable for MockHostTable {
    fn lookup(&self, domain: &str) -> Option<HostEntry> {
        self.entries.get(domain).copied()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Default)]
pub struct MockDnsCache {
    cached: Mutex<HashMap<String, Vec<u8>>>,
    absorbed: Mutex<Vec<Vec<u8>>>,
    lookups: AtomicUsize,
}

impl MockDnsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cached_reply(&self, domain: &str, reply: Vec<u8>) {
        self.cached
            .lock()
            .unwrap()
            .insert(domain.to_string(), reply);
    }

    pub fn absorbed(&self) -> Vec<Vec<u8>> {
        self.absorbed.lock().unwrap().clone()
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl DnsCachePort for MockDnsCache {
    fn answer_from_cache(&self, query: &DnsQuery) -> Option<Vec<u8>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.cached.lock().unwrap().get(&*query.domain).cloned()
    }

    fn absorb_reply(&self, reply: &[u8]) -> usize {
        self.absorbed.lock().unwrap().push(reply.to_vec());
        1
    }
}

#[derive(Debug, Clone, Copy)]
pub enum UpstreamBehavior {
    /// Reply with the request bytes, QR set, same id.
    Echo,
    /// Reply with the id flipped.
    WrongId,
    /// Sleep longer than any test timeout before echoing.
    Hang,
    Refuse,
}

pub struct MockUpstream {
    name: String,
    behavior: UpstreamBehavior,
    sent: Mutex<Vec<Vec<u8>>>,
}

impl MockUpstream {
    pub fn new(name: &str, behavior: UpstreamBehavior) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            behavior,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamTransport for MockUpstream {
    async fn exchange(&self, message: &[u8], _timeout: Duration) -> Result<Vec<u8>, DomainError> {
        self.sent.lock().unwrap().push(message.to_vec());

        let mut reply = message.to_vec();
        reply[2] |= 0x80;
        match self.behavior {
            UpstreamBehavior::Echo => Ok(reply),
            UpstreamBehavior::WrongId => {
                reply[0] ^= 0xFF;
                Ok(reply)
            }
            UpstreamBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(reply)
            }
            UpstreamBehavior::Refuse => Err(DomainError::TransportConnectionRefused {
                server: self.name.clone(),
            }),
        }
    }

    fn server(&self) -> String {
        self.name.clone()
    }
}
