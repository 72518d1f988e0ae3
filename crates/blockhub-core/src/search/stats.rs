//! Engine statistics with atomic counters

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Search,
    Suggest,
}

#[derive(Debug, Default)]
pub struct SearchStats {
    searches: AtomicU64,
    suggestions: AtomicU64,
    failed_searches: AtomicU64,
    module_failures: AtomicU64,
    search_latency_us: AtomicU64,
    suggest_latency_us: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStatsSnapshot {
    pub searches: u64,
    pub suggestions: u64,
    pub failed_searches: u64,
    pub module_failures: u64,
    pub avg_search_latency_us: u64,
    pub avg_suggest_latency_us: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self, request_type: RequestType, latency: Duration) {
        let latency_us = latency.as_micros() as u64;
        match request_type {
            RequestType::Search => {
                self.searches.fetch_add(1, Ordering::Relaxed);
                self.search_latency_us
                    .fetch_add(latency_us, Ordering::Relaxed);
            }
            RequestType::Suggest => {
                self.suggestions.fetch_add(1, Ordering::Relaxed);
                self.suggest_latency_us
                    .fetch_add(latency_us, Ordering::Relaxed);
            }
        }
    }

    pub fn record_failed_search(&self) {
        self.failed_searches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_module_failure(&self) {
        self.module_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SearchStatsSnapshot {
        let searches = self.searches.load(Ordering::Relaxed);
        let suggestions = self.suggestions.load(Ordering::Relaxed);
        let average = |total: u64, count: u64| if count > 0 { total / count } else { 0 };

        SearchStatsSnapshot {
            searches,
            suggestions,
            failed_searches: self.failed_searches.load(Ordering::Relaxed),
            module_failures: self.module_failures.load(Ordering::Relaxed),
            avg_search_latency_us: average(
                self.search_latency_us.load(Ordering::Relaxed),
                searches,
            ),
            avg_suggest_latency_us: average(
                self.suggest_latency_us.load(Ordering::Relaxed),
                suggestions,
            ),
        }
    }
}
