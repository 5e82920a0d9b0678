use async_trait::async_trait;
use dnsrelay_domain::DomainError;
use std::time::Duration;

/// One upstream resolver reachable by a single request / reply exchange.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    /// Sends `message` and waits at most `timeout` for one reply datagram.
    async fn exchange(&self, message: &[u8], timeout: Duration) -> Result<Vec<u8>, DomainError>;

    /// Printable address of the upstream, used in logs and errors.
    fn server(&self) -> String;
}
