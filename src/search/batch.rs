//! Batch fan-out and rendezvous
//!
//! One task is spawned per valid address. Outcomes are collected from a
//! channel until exactly as many have arrived as tasks were spawned, so
//! results appear in completion order rather than input order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info};

use super::models::{LookupFailure, LookupOutcome, ResponseEnvelope};
use super::validator::is_valid_ipv4;
use super::worker::lookup_country;
use crate::config::SearchConfig;
use crate::geoip::GeoLookup;

pub struct BatchSearcher {
    db: Arc<dyn GeoLookup>,
    lang: Arc<str>,
    limiter: Arc<Semaphore>,
}

impl BatchSearcher {
    pub fn new(db: Arc<dyn GeoLookup>, config: &SearchConfig) -> Self {
        Self {
            db,
            lang: Arc::from(config.lang.as_str()),
            limiter: Arc::new(Semaphore::new(config.max_concurrent_lookups.max(1))),
        }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Look up every valid IPv4 address in `raw_ips`
    ///
    /// Empty and malformed entries are skipped. Each valid entry yields
    /// exactly one item in either `data` or `errors`.
    pub async fn search(&self, raw_ips: Vec<String>) -> ResponseEnvelope {
        let started = Instant::now();
        info!("current ip len:{}", raw_ips.len());

        let valid: Vec<String> = raw_ips
            .into_iter()
            .filter(|ip| {
                if ip.is_empty() {
                    return false;
                }
                if !is_valid_ipv4(ip) {
                    info!("ip invalid:{}", ip);
                    return false;
                }
                true
            })
            .collect();

        let dispatched = valid.len();
        let (tx, mut rx) = mpsc::channel::<LookupOutcome>(dispatched.max(1));

        let mut pending: HashMap<String, usize> = HashMap::with_capacity(dispatched);
        for ip in valid {
            *pending.entry(ip.clone()).or_default() += 1;

            let tx = tx.clone();
            let db = Arc::clone(&self.db);
            let lang = Arc::clone(&self.lang);
            let limiter = Arc::clone(&self.limiter);

            tokio::spawn(async move {
                let Ok(_permit) = limiter.acquire_owned().await else {
                    return;
                };
                let outcome = lookup_country(&*db, &ip, &lang);
                // Receiver only goes away if the request itself was dropped
                let _ = tx.send(outcome).await;
            });
        }
        // Workers hold the remaining senders; the channel closes once all of them finish
        drop(tx);

        let mut data = Vec::with_capacity(dispatched);
        let mut errors = Vec::new();
        let mut received = 0;

        while received < dispatched {
            let Some(outcome) = rx.recv().await else {
                break;
            };
            received += 1;

            if let Some(count) = pending.get_mut(outcome.ip()) {
                *count -= 1;
            }

            match outcome {
                LookupOutcome::Found(info) => data.push(info),
                LookupOutcome::Failed(failure) => errors.push(failure),
            }
        }

        if received < dispatched {
            error!(
                dispatched,
                received, "lookup workers exited without reporting a result"
            );
            for (ip, count) in pending {
                for _ in 0..count {
                    errors.push(LookupFailure {
                        ip: ip.clone(),
                        reason: "lookup worker terminated".to_string(),
                    });
                }
            }
        }

        info!("finished ip check len:{}", received);
        info!("check ip(s) spent time:{:?}", started.elapsed());

        ResponseEnvelope::success(data, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geoip::{GeoRecord, GeoResult, InMemoryGeoDatabase};
    use std::net::IpAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn searcher(db: impl GeoLookup + 'static, max_concurrent_lookups: usize) -> BatchSearcher {
        BatchSearcher::new(
            Arc::new(db),
            &SearchConfig {
                lang: "en".to_string(),
                max_concurrent_lookups,
            },
        )
    }

    fn fixture() -> InMemoryGeoDatabase {
        InMemoryGeoDatabase::new()
            .with_country(
                "8.8.8.8".parse().unwrap(),
                "US",
                "NA",
                &[("en", "United States")],
            )
            .with_country(
                "9.9.9.9".parse().unwrap(),
                "CH",
                "EU",
                &[("en", "Switzerland")],
            )
    }

    fn ips(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_collects_one_result_per_valid_ip() {
        let searcher = searcher(fixture(), 8);
        let envelope = searcher
            .search(ips(&["8.8.8.8", "9.9.9.9", "8.8.8.8"]))
            .await;

        assert_eq!(envelope.status_code, ResponseEnvelope::SUCCESS);
        assert_eq!(envelope.data.len(), 3);
        assert!(envelope.errors.is_empty());
        assert_eq!(
            envelope.data.iter().filter(|c| c.ip == "8.8.8.8").count(),
            2
        );
    }

    #[tokio::test]
    async fn test_skips_empty_and_invalid_entries() {
        let searcher = searcher(fixture(), 8);
        let envelope = searcher
            .search(ips(&["", "1.2.3.999", "9.9.9.9", "localhost"]))
            .await;

        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.data[0].ip, "9.9.9.9");
        assert_eq!(envelope.data[0].iso_code, "CH");
        assert_eq!(envelope.data[0].country_name, "Switzerland");
    }

    #[tokio::test]
    async fn test_empty_batch_is_success() {
        let envelope = searcher(fixture(), 8).search(Vec::new()).await;
        assert_eq!(envelope.status_code, ResponseEnvelope::SUCCESS);
        assert!(envelope.data.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_ip_reported_without_failing_batch() {
        let envelope = searcher(fixture(), 8)
            .search(ips(&["8.8.8.8", "203.0.113.7"]))
            .await;

        assert_eq!(envelope.status_code, ResponseEnvelope::SUCCESS);
        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.errors.len(), 1);
        assert_eq!(envelope.errors[0].ip, "203.0.113.7");
    }

    struct PanickingLookup;

    impl GeoLookup for PanickingLookup {
        fn lookup(&self, _ip: IpAddr) -> GeoResult<GeoRecord> {
            panic!("corrupt record");
        }
    }

    #[tokio::test]
    async fn test_worker_panic_becomes_item_failure() {
        let envelope = searcher(PanickingLookup, 8)
            .search(ips(&["8.8.8.8", "8.8.8.8"]))
            .await;

        assert!(envelope.data.is_empty());
        assert_eq!(envelope.errors.len(), 2);
        assert!(envelope
            .errors
            .iter()
            .all(|f| f.reason == "lookup worker terminated"));
    }

    #[derive(Default)]
    struct SlowLookup {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl GeoLookup for Arc<SlowLookup> {
        fn lookup(&self, _ip: IpAddr) -> GeoResult<GeoRecord> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(GeoRecord::default())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_is_bounded() {
        let slow = Arc::new(SlowLookup::default());
        let searcher = searcher(Arc::clone(&slow), 2);

        let batch: Vec<String> = (1..=12).map(|i| format!("10.0.0.{i}")).collect();
        let envelope = searcher.search(batch).await;

        assert_eq!(envelope.data.len(), 12);
        assert!(slow.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_bound_is_shared_across_requests() {
        let slow = Arc::new(SlowLookup::default());
        let searcher = Arc::new(searcher(Arc::clone(&slow), 2));

        let batch = |offset: usize| -> Vec<String> {
            (1..=6).map(|i| format!("10.0.{offset}.{i}")).collect()
        };
        let (first, second) = tokio::join!(
            searcher.search(batch(1)),
            searcher.search(batch(2))
        );

        assert_eq!(first.data.len() + second.data.len(), 12);
        assert!(slow.peak.load(Ordering::SeqCst) <= 2);
    }
}
