#![allow(dead_code)]
use cascade_dns_application::use_cases::{ResolutionPolicy, ResolveQueryUseCase};
use cascade_dns_domain::{
    RecordType, StaticRecordStore, UpstreamAddr, UpstreamEndpoint, UpstreamTimeouts,
};
use cascade_dns_infrastructure::dns::{MemoryCacheStore, UpstreamForwarder};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub struct EndpointBuilder;

impl EndpointBuilder {
    pub fn udp(addr: SocketAddr) -> UpstreamEndpoint {
        UpstreamEndpoint::Udp {
            addr: UpstreamAddr::Resolved(addr),
        }
    }

    pub fn tcp(addr: SocketAddr) -> UpstreamEndpoint {
        UpstreamEndpoint::Tcp {
            addr: UpstreamAddr::Resolved(addr),
        }
    }
}

pub fn short_timeouts() -> UpstreamTimeouts {
    UpstreamTimeouts::uniform(Duration::from_millis(300))
}

pub fn example_store() -> Arc<StaticRecordStore> {
    Arc::new(
        StaticRecordStore::builder()
            .record("example.com", RecordType::A, "93.184.216.34")
            .record("example.com", RecordType::TXT, "\"v=spf1 -all\"")
            .build(),
    )
}

/// Full pipeline against a real forwarder and in-memory cache.
pub fn pipeline(upstream: UpstreamEndpoint) -> (Arc<ResolveQueryUseCase>, Arc<MemoryCacheStore>) {
    let cache = Arc::new(MemoryCacheStore::new(1_000));
    let forwarder = Arc::new(UpstreamForwarder::new(upstream).unwrap());
    let policy = ResolutionPolicy {
        upstream_timeouts: short_timeouts(),
        cache_timeout: Duration::from_millis(200),
        ..ResolutionPolicy::default()
    };
    let use_case = ResolveQueryUseCase::new(example_store(), forwarder, policy)
        .with_cache(cache.clone());
    (Arc::new(use_case), cache)
}
