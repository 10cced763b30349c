#![allow(dead_code)]

use async_trait::async_trait;
use cascade_dns_application::ports::{CacheStore, UpstreamExchanger, UpstreamTimeouts};
use cascade_dns_domain::DomainError;
use hickory_proto::op::{Message, MessageType, Query, ResponseCode};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheFailure {
    None,
    Error,
    Hang,
}

#[derive(Clone)]
pub struct MockCacheStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    ttls: Arc<RwLock<HashMap<String, Duration>>>,
    failure: Arc<RwLock<CacheFailure>>,
    gets: Arc<AtomicUsize>,
    sets: Arc<AtomicUsize>,
}

impl MockCacheStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttls: Arc::new(RwLock::new(HashMap::new())),
            failure: Arc::new(RwLock::new(CacheFailure::None)),
            gets: Arc::new(AtomicUsize::new(0)),
            sets: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn unreachable() -> Self {
        let store = Self::new();
        store.set_failure(CacheFailure::Error);
        store
    }

    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn set_failure(&self, failure: CacheFailure) {
        *self.failure.write().unwrap() = failure;
    }

    pub fn entry(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.ttls.read().unwrap().get(key).copied()
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn set_count(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    fn current_failure(&self) -> CacheFailure {
        *self.failure.read().unwrap()
    }
}

impl Default for MockCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MockCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        match self.current_failure() {
            CacheFailure::Error => {
                return Err(DomainError::CacheUnavailable("connection refused".into()))
            }
            CacheFailure::Hang => std::future::pending::<()>().await,
            CacheFailure::None => {}
        }
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        match self.current_failure() {
            CacheFailure::Error => {
                return Err(DomainError::CacheUnavailable("connection refused".into()))
            }
            CacheFailure::Hang => std::future::pending::<()>().await,
            CacheFailure::None => {}
        }
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self.ttls.write().unwrap().insert(key.to_string(), ttl);
        Ok(())
    }
}

#[derive(Clone)]
enum UpstreamBehavior {
    Reply(Message),
    Fail(DomainError),
    Hang,
}

/// Upstream that answers every exchange the same way and records requests.
#[derive(Clone)]
pub struct MockUpstream {
    behavior: Arc<RwLock<UpstreamBehavior>>,
    requests: Arc<RwLock<Vec<Message>>>,
}

impl MockUpstream {
    pub fn replying(reply: Message) -> Self {
        Self::with_behavior(UpstreamBehavior::Reply(reply))
    }

    pub fn failing(error: DomainError) -> Self {
        Self::with_behavior(UpstreamBehavior::Fail(error))
    }

    pub fn hanging() -> Self {
        Self::with_behavior(UpstreamBehavior::Hang)
    }

    fn with_behavior(behavior: UpstreamBehavior) -> Self {
        Self {
            behavior: Arc::new(RwLock::new(behavior)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.read().unwrap().len()
    }

    pub fn last_request(&self) -> Option<Message> {
        self.requests.read().unwrap().last().cloned()
    }
}

#[async_trait]
impl UpstreamExchanger for MockUpstream {
    async fn exchange(
        &self,
        request: &Message,
        _timeouts: &UpstreamTimeouts,
    ) -> Result<Message, DomainError> {
        self.requests.write().unwrap().push(request.clone());
        let behavior = self.behavior.read().unwrap().clone();
        match behavior {
            UpstreamBehavior::Reply(mut reply) => {
                reply.set_id(request.id());
                Ok(reply)
            }
            UpstreamBehavior::Fail(error) => Err(error),
            UpstreamBehavior::Hang => std::future::pending().await,
        }
    }

    fn upstream_name(&self) -> String {
        "mock://upstream".to_string()
    }
}

pub fn query_message(id: u16, name: &str, record_type: RecordType) -> Message {
    let mut message = Message::new();
    message.set_id(id);
    message.set_recursion_desired(true);
    message.add_query(Query::query(Name::from_str(name).unwrap(), record_type));
    message
}

pub fn upstream_reply(rcode: ResponseCode, answers: Vec<Record>, authority: Vec<Record>) -> Message {
    let mut message = Message::new();
    message.set_message_type(MessageType::Response);
    message.set_response_code(rcode);
    message.add_answers(answers);
    message.add_name_servers(authority);
    message
}

pub fn a_record(name: &str, ttl: u32, ip: &str) -> Record {
    Record::from_rdata(
        Name::from_str(name).unwrap(),
        ttl,
        RData::A(hickory_proto::rr::rdata::A(ip.parse().unwrap())),
    )
}

pub fn caa_record(name: &str, ttl: u32, issuer: &str) -> Record {
    Record::from_rdata(
        Name::from_str(name).unwrap(),
        ttl,
        RData::CAA(hickory_proto::rr::rdata::CAA::new_issue(
            false,
            Some(Name::from_str(issuer).unwrap()),
            vec![],
        )),
    )
}

pub fn soa_record(zone: &str) -> Record {
    Record::from_rdata(
        Name::from_str(zone).unwrap(),
        900,
        RData::SOA(hickory_proto::rr::rdata::SOA::new(
            Name::from_str("ns1.example.com.").unwrap(),
            Name::from_str("admin.example.com.").unwrap(),
            2024010101,
            7200,
            3600,
            1209600,
            300,
        )),
    )
}
