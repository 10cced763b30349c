pub mod cache;
pub mod forwarding;
pub mod server;
pub mod transport;

pub use cache::{MemoryCacheStore, RedisCacheStore};
pub use forwarding::UpstreamForwarder;
pub use server::{DnsRequestHandler, Protocol};
