//! UDP transport to an upstream resolver (RFC 1035 §4.2.1).
//!
//! Messages are sent as-is. Replies larger than 4096 bytes are truncated by
//! the receive buffer.

use async_trait::async_trait;
use dnsrelay_application::ports::UpstreamTransport;
use dnsrelay_domain::DomainError;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Maximum UDP DNS response size accepted from upstream
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// DNS over UDP to one upstream server
pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    fn failed(&self, action: &str, e: std::io::Error) -> DomainError {
        if e.kind() == ErrorKind::ConnectionRefused {
            return DomainError::TransportConnectionRefused {
                server: self.server_addr.to_string(),
            };
        }
        DomainError::TransportFailed {
            server: self.server_addr.to_string(),
            message: format!("{}: {}", action, e),
        }
    }

    fn timed_out(&self) -> DomainError {
        DomainError::TransportTimeout {
            server: self.server_addr.to_string(),
        }
    }
}

#[async_trait]
impl UpstreamTransport for UdpTransport {
    async fn exchange(&self, message: &[u8], timeout: Duration) -> Result<Vec<u8>, DomainError> {
        // Ephemeral port of the upstream's family
        let bind_addr: SocketAddr = if self.server_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| self.failed("bind", e))?;

        let bytes_sent = tokio::time::timeout(timeout, socket.send_to(message, self.server_addr))
            .await
            .map_err(|_| self.timed_out())?
            .map_err(|e| self.failed("send", e))?;

        debug!(
            server = %self.server_addr,
            bytes_sent = bytes_sent,
            "UDP query sent"
        );

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];

        let (bytes_received, from_addr) =
            tokio::time::timeout(timeout, socket.recv_from(&mut recv_buf))
                .await
                .map_err(|_| self.timed_out())?
                .map_err(|e| self.failed("receive", e))?;

        if from_addr.ip() != self.server_addr.ip() {
            warn!(
                expected = %self.server_addr,
                received_from = %from_addr,
                "UDP response from unexpected source"
            );
        }

        recv_buf.truncate(bytes_received);

        debug!(
            server = %self.server_addr,
            bytes_received = bytes_received,
            "UDP response received"
        );

        Ok(recv_buf)
    }

    fn server(&self) -> String {
        self.server_addr.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_udp_transport_creation() {
        let addr: SocketAddr = "8.8.8.8:53".parse().unwrap();
        let transport = UdpTransport::new(addr);
        assert_eq!(transport.server_addr(), addr);
        assert_eq!(transport.server(), "8.8.8.8:53");
    }

    #[test]
    fn test_udp_transport_ipv6() {
        let addr: SocketAddr = "[2001:4860:4860::8888]:53".parse().unwrap();
        let transport = UdpTransport::new(addr);
        assert_eq!(transport.server(), "[2001:4860:4860::8888]:53");
    }

    #[tokio::test]
    async fn test_exchange_with_local_echo_server() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let server_addr = server.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 512];
            let (len, from) = server.recv_from(&mut buf).await.unwrap();
            buf[2] |= 0x80;
            server.send_to(&buf[..len], from).await.unwrap();
        });

        let transport = UdpTransport::new(server_addr);
        let reply = transport
            .exchange(&[0x12, 0x34, 0x01, 0x00], Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(reply, vec![0x12, 0x34, 0x81, 0x00]);
    }

    #[tokio::test]
    async fn test_exchange_times_out() {
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let transport = UdpTransport::new(silent.local_addr().unwrap());

        let err = transport
            .exchange(&[0, 1, 1, 0], Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::TransportTimeout { .. }));
    }
}
