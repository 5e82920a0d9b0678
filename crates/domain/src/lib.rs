//! dnsrelay domain layer
pub mod config;
pub mod dns_query;
pub mod dns_record;
pub mod errors;
pub mod host_entry;

pub use config::{
    CliOverrides, Config, ConfigError, DnsConfig, LogFormat, LoggingConfig, ServerConfig,
};
pub use dns_query::DnsQuery;
pub use dns_record::{Answer, AnswerData, RecordType, CLASS_IN, INFINITE_TTL, MAX_DOMAIN_LEN};
pub use errors::DomainError;
pub use host_entry::HostEntry;
