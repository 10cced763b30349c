#![allow(dead_code)]

use async_trait::async_trait;
use cascade_dns_application::ports::{CacheMaintenancePort, CacheSweepOutcome};
use cascade_dns_domain::DomainError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub struct MockCacheMaintenancePort {
    sweep_calls: AtomicUsize,
    should_fail: AtomicBool,
}

impl MockCacheMaintenancePort {
    pub fn new() -> Self {
        Self {
            sweep_calls: AtomicUsize::new(0),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn failing() -> Self {
        let mock = Self::new();
        mock.should_fail.store(true, Ordering::SeqCst);
        mock
    }

    pub fn sweep_call_count(&self) -> usize {
        self.sweep_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockCacheMaintenancePort {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheMaintenancePort for MockCacheMaintenancePort {
    async fn run_sweep_cycle(&self) -> Result<CacheSweepOutcome, DomainError> {
        self.sweep_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::CacheUnavailable("mock failure".to_string()));
        }
        Ok(CacheSweepOutcome {
            entries_removed: 2,
            cache_size: 10,
        })
    }
}
