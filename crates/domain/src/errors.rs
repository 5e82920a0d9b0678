use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Unsupported record type: {0}")]
    UnsupportedRecordType(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Transport timeout waiting for {server}")]
    TransportTimeout { server: String },

    #[error("Transport connection refused by {server}")]
    TransportConnectionRefused { server: String },

    #[error("Transport error talking to {server}: {message}")]
    TransportFailed { server: String, message: String },

    #[error("Response id {received:#06x} does not match query id {expected:#06x}")]
    SpoofedResponse { expected: u16, received: u16 },

    #[error("No upstream servers configured")]
    NoUpstreamServers,
}
