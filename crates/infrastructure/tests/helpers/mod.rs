#![allow(dead_code)]

mod builders;
mod dns_server_mock;

#[allow(unused_imports)]
pub use builders::*;
#[allow(unused_imports)]
pub use dns_server_mock::MockDnsServer;
