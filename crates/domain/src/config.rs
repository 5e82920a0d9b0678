mod dns;
mod errors;
mod logging;
mod root;
mod server;

pub use dns::DnsConfig;
pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
