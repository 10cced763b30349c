use crate::ports::{CacheStore, UpstreamExchanger};
use crate::services::cache_value::{join_records, split_records};
use crate::services::record_text::render_record;
use crate::services::{PipelineMetrics, RecordMatcher};
use cascade_dns_domain::{DnsQuery, DomainError, RecordType, StaticRecordStore, UpstreamTimeouts};
use hickory_proto::op::{Header, Message, ResponseCode};
use hickory_proto::rr::Record;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// TTLs and timeouts applied by the pipeline.
#[derive(Debug, Clone)]
pub struct ResolutionPolicy {
    /// TTL stamped on answers from the static tier.
    pub static_answer_ttl: u32,
    /// TTL stamped on answers from the cache tier.
    pub cache_answer_ttl: u32,
    /// Lifetime of a cache entry written after an upstream answer.
    pub cache_entry_ttl: Duration,
    /// Bound on each cache get or set.
    pub cache_timeout: Duration,
    pub upstream_timeouts: UpstreamTimeouts,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            static_answer_ttl: 60,
            cache_answer_ttl: 300,
            cache_entry_ttl: Duration::from_secs(300),
            cache_timeout: Duration::from_millis(1000),
            upstream_timeouts: UpstreamTimeouts::default(),
        }
    }
}

/// Which step of the pipeline produced the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Malformed,
    Static,
    Cache,
    Upstream,
    UpstreamFailure,
}

impl ResolutionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionSource::Malformed => "malformed",
            ResolutionSource::Static => "static",
            ResolutionSource::Cache => "cache",
            ResolutionSource::Upstream => "upstream",
            ResolutionSource::UpstreamFailure => "upstream_failure",
        }
    }
}

/// The single response for one request.
#[derive(Debug)]
pub struct Resolution {
    pub response: Message,
    pub source: ResolutionSource,
}

/// Static records first, then the shared cache, then the upstream resolver.
pub struct ResolveQueryUseCase {
    store: Arc<StaticRecordStore>,
    cache: Option<Arc<dyn CacheStore>>,
    upstream: Arc<dyn UpstreamExchanger>,
    policy: ResolutionPolicy,
    metrics: Arc<PipelineMetrics>,
}

impl ResolveQueryUseCase {
    pub fn new(
        store: Arc<StaticRecordStore>,
        upstream: Arc<dyn UpstreamExchanger>,
        policy: ResolutionPolicy,
    ) -> Self {
        Self {
            store,
            cache: None,
            upstream,
            policy,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<PipelineMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }

    pub fn policy(&self) -> &ResolutionPolicy {
        &self.policy
    }

    pub async fn execute(&self, request: &Message) -> Resolution {
        self.metrics.record_query();

        let Some(question) = request.queries().first() else {
            warn!(id = request.id(), "Request without a question");
            self.metrics.record_malformed();
            let mut response = reply_to(request);
            response.set_response_code(ResponseCode::ServFail);
            return Resolution {
                response,
                source: ResolutionSource::Malformed,
            };
        };

        if request.queries().len() > 1 {
            debug!(
                id = request.id(),
                questions = request.queries().len(),
                "Only the first question is resolved"
            );
        }

        let query = DnsQuery::new(
            &question.name().to_ascii(),
            RecordType::from(u16::from(question.query_type())),
        );

        if let Some(resolution) = self.resolve_static(request, &query) {
            return resolution;
        }

        if let Some(resolution) = self.resolve_cached(request, &query).await {
            return resolution;
        }

        self.resolve_upstream(request, &query).await
    }

    fn resolve_static(&self, request: &Message, query: &DnsQuery) -> Option<Resolution> {
        let lines = self.store.lookup(query)?;

        let outcome =
            RecordMatcher::build_answers(query, lines, self.policy.static_answer_ttl);
        debug!(
            domain = %query.name,
            record_type = %query.record_type,
            answers = outcome.answers.len(),
            "Static record hit"
        );
        self.metrics.record_static_hit();

        let mut response = reply_to(request);
        response.set_authoritative(true);
        response.add_answers(outcome.answers);
        Some(Resolution {
            response,
            source: ResolutionSource::Static,
        })
    }

    async fn resolve_cached(&self, request: &Message, query: &DnsQuery) -> Option<Resolution> {
        let cache = self.cache.as_ref()?;
        let key = query.cache_key();

        let value = match tokio::time::timeout(self.policy.cache_timeout, cache.get(&key)).await
        {
            Ok(Ok(Some(value))) => value,
            Ok(Ok(None)) => {
                debug!(key = %key, "Cache miss");
                self.metrics.record_cache_miss();
                return None;
            }
            Ok(Err(e)) => {
                warn!(error = %e, key = %key, "Cache lookup failed, treating as miss");
                self.metrics.record_cache_error();
                return None;
            }
            Err(_) => {
                warn!(
                    error = %DomainError::CacheTimeout,
                    key = %key,
                    "Cache lookup timed out, treating as miss"
                );
                self.metrics.record_cache_error();
                return None;
            }
        };

        let lines = split_records(&value);
        let outcome = RecordMatcher::build_answers(query, &lines, self.policy.cache_answer_ttl);
        debug!(key = %key, answers = outcome.answers.len(), "Cache hit");
        self.metrics.record_cache_hit();

        let mut response = reply_to(request);
        response.set_authoritative(false);
        response.add_answers(outcome.answers);
        Some(Resolution {
            response,
            source: ResolutionSource::Cache,
        })
    }

    async fn resolve_upstream(&self, request: &Message, query: &DnsQuery) -> Resolution {
        let timeouts = &self.policy.upstream_timeouts;
        let exchange = self.upstream.exchange(request, timeouts);

        let reply = match tokio::time::timeout(timeouts.total(), exchange).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => return self.upstream_failure(request, query, e),
            Err(_) => return self.upstream_failure(request, query, DomainError::QueryTimeout),
        };

        self.metrics.record_upstream_answer();
        let mut response = reply_to(request);
        response.set_authoritative(false);

        if reply.response_code() != ResponseCode::NoError {
            info!(
                domain = %query.name,
                rcode = %reply.response_code(),
                upstream = %self.upstream.upstream_name(),
                "Upstream returned error code"
            );
            response.set_response_code(reply.response_code());
            return Resolution {
                response,
                source: ResolutionSource::Upstream,
            };
        }

        if !reply.answers().is_empty() {
            let answers = reply.answers().to_vec();
            self.store_in_cache(query, &answers).await;
            response.add_answers(answers);
        } else if !reply.name_servers().is_empty() {
            debug!(domain = %query.name, "Upstream returned authority records only");
            response.add_name_servers(reply.name_servers().to_vec());
        } else {
            debug!(domain = %query.name, "Upstream returned no data");
        }

        Resolution {
            response,
            source: ResolutionSource::Upstream,
        }
    }

    fn upstream_failure(
        &self,
        request: &Message,
        query: &DnsQuery,
        error: DomainError,
    ) -> Resolution {
        warn!(
            error = %error,
            domain = %query.name,
            upstream = %self.upstream.upstream_name(),
            "Upstream exchange failed"
        );
        self.metrics.record_upstream_failure();

        let mut response = reply_to(request);
        response.set_response_code(ResponseCode::ServFail);
        Resolution {
            response,
            source: ResolutionSource::UpstreamFailure,
        }
    }

    async fn store_in_cache(&self, query: &DnsQuery, answers: &[Record]) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };

        let lines: Vec<String> = answers.iter().map(render_record).collect();
        let value = join_records(&lines);
        let key = query.cache_key();

        let write = cache.set(&key, &value, self.policy.cache_entry_ttl);
        match tokio::time::timeout(self.policy.cache_timeout, write).await {
            Ok(Ok(())) => debug!(key = %key, records = lines.len(), "Cached upstream answer"),
            Ok(Err(e)) => warn!(error = %e, key = %key, "Failed to cache upstream answer"),
            Err(_) => warn!(
                error = %DomainError::CacheTimeout,
                key = %key,
                "Failed to cache upstream answer"
            ),
        }
    }
}

/// Empty NOERROR reply echoing the request id, opcode, RD flag and questions.
fn reply_to(request: &Message) -> Message {
    let mut response = Message::new();
    response.set_header(Header::response_from_request(request.header()));
    response.add_queries(request.queries().to_vec());
    response.set_recursion_available(true);
    response
}
