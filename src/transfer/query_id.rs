//! Query id generator
//!
//! Wall-clock milliseconds, bumped to `last + 1` whenever the clock has not
//! advanced, so ids are strictly increasing within the process.

use std::sync::atomic::{AtomicU64, Ordering};

use super::types::QueryId;

#[derive(Debug, Default)]
pub struct QueryIdGenerator {
    last: AtomicU64,
}

impl QueryIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> QueryId {
        self.next_at(chrono::Utc::now().timestamp_millis().max(0) as u64)
    }

    fn next_at(&self, now_ms: u64) -> QueryId {
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_ms.max(prev.saturating_add(1));
            match self.last.compare_exchange_weak(
                prev,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return QueryId(candidate),
                Err(actual) => prev = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_same_millisecond_is_bumped() {
        let g = QueryIdGenerator::new();
        assert_eq!(g.next_at(1000), QueryId(1000));
        assert_eq!(g.next_at(1000), QueryId(1001));
        assert_eq!(g.next_at(999), QueryId(1002));
        assert_eq!(g.next_at(5000), QueryId(5000));
    }

    #[test]
    fn test_concurrent_ids_unique() {
        let g = Arc::new(QueryIdGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let g = g.clone();
                std::thread::spawn(move || (0..1000).map(|_| g.next()).collect::<Vec<_>>())
            })
            .collect();
        let mut all = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert!(all.insert(id));
            }
        }
        assert_eq!(all.len(), 4000);
    }
}
