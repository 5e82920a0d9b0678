pub mod cache;
pub mod clock;
pub mod hosts;
pub mod inverse_query;
pub mod request_queue;
pub mod responder;
pub mod server;
pub mod transport;
pub mod trie;
pub mod wire;

pub use cache::{PoolSizes, RecordCache};
pub use hosts::HostFile;
pub use inverse_query::InverseQuery;
pub use request_queue::{request_queue, InboundRequest, RequestConsumer, RequestProducer};
pub use responder::CacheResponder;
pub use server::DnsServerHandler;
pub use transport::UdpTransport;
pub use trie::DomainTrie;
