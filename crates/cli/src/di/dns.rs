use cascade_dns_application::ports::{CacheMaintenancePort, CacheStore};
use cascade_dns_application::services::PipelineMetrics;
use cascade_dns_application::use_cases::{ResolutionPolicy, ResolveQueryUseCase};
use cascade_dns_domain::config::CacheBackend;
use cascade_dns_domain::{Config, StaticRecordStore};
use cascade_dns_infrastructure::dns::transport::resolver::resolve_endpoint;
use cascade_dns_infrastructure::dns::{
    DnsRequestHandler, MemoryCacheStore, RedisCacheStore, UpstreamForwarder,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const REDIS_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct DnsServices {
    pub handler: Arc<DnsRequestHandler>,
    pub metrics: Arc<PipelineMetrics>,
    pub cache_maintenance: Option<Arc<dyn CacheMaintenancePort>>,
}

impl DnsServices {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        info!("Initializing DNS services");

        let store = Arc::new(StaticRecordStore::from_config(
            &config.static_records,
            config.dns.static_answer_ttl,
        )?);
        info!(
            entries = store.len(),
            names = store.names().count(),
            "Static records loaded"
        );

        let forwarder = Self::build_forwarder(config).await?;
        let metrics = Arc::new(PipelineMetrics::new());
        let policy = Self::build_policy(config);

        let mut use_case =
            ResolveQueryUseCase::new(store, forwarder, policy).with_metrics(metrics.clone());

        let cache_maintenance = if !config.cache.enabled {
            info!("Answer cache disabled");
            None
        } else {
            match config.cache.backend {
                CacheBackend::Memory => {
                    let cache = Arc::new(MemoryCacheStore::new(config.cache.max_entries));
                    use_case = use_case.with_cache(cache.clone() as Arc<dyn CacheStore>);
                    Some(cache as Arc<dyn CacheMaintenancePort>)
                }
                CacheBackend::Redis => {
                    // Expiry is left to the server; no local sweep job.
                    let cache = Self::connect_redis(config).await?;
                    use_case = use_case.with_cache(cache as Arc<dyn CacheStore>);
                    None
                }
            }
        };

        Ok(Self {
            handler: Arc::new(DnsRequestHandler::new(Arc::new(use_case))),
            metrics,
            cache_maintenance,
        })
    }

    async fn build_forwarder(config: &Config) -> anyhow::Result<Arc<UpstreamForwarder>> {
        let endpoint = config
            .upstream
            .endpoint()
            .map_err(|e| anyhow::anyhow!("Invalid upstream: {}", e))?;
        let timeouts = config.upstream.timeouts();

        let endpoint = resolve_endpoint(&endpoint, timeouts.dial).await?;
        let forwarder = UpstreamForwarder::new(endpoint)?;

        info!(
            upstream = %forwarder.endpoint(),
            dial_timeout_ms = timeouts.dial.as_millis() as u64,
            read_timeout_ms = timeouts.read.as_millis() as u64,
            write_timeout_ms = timeouts.write.as_millis() as u64,
            "Upstream forwarder ready"
        );
        Ok(Arc::new(forwarder))
    }

    async fn connect_redis(config: &Config) -> anyhow::Result<Arc<RedisCacheStore>> {
        let url = config.cache.redis_url();
        let store = RedisCacheStore::connect(&url, REDIS_CONNECT_TIMEOUT)
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Could not connect to Redis at {}: {}. Please ensure Redis is running",
                    config.cache.redis_address,
                    e
                )
            })?;

        info!(address = %config.cache.redis_address, "Redis answer cache ready");
        Ok(Arc::new(store))
    }

    fn build_policy(config: &Config) -> ResolutionPolicy {
        ResolutionPolicy {
            static_answer_ttl: config.dns.static_answer_ttl,
            cache_answer_ttl: config.cache.answer_ttl,
            cache_entry_ttl: config.cache.entry_ttl(),
            cache_timeout: config.cache.operation_timeout(),
            upstream_timeouts: config.upstream.timeouts(),
        }
    }
}
