use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a registry's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryStats {
    /// Keys currently present.
    pub entries: usize,
    /// Lookups answered from the table.
    pub hits: u64,
    /// Lookups that had to run a factory.
    pub misses: u64,
    /// Factories that succeeded and were published.
    pub constructions: u64,
    /// Factories that returned an error or panicked.
    pub failures: u64,
    /// Values built under `RaceTolerant` that lost the race.
    pub discarded: u64,
}

impl RegistryStats {
    /// Fraction of lookups served without running a factory, `0.0` when idle.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) hits: AtomicU64,
    pub(crate) misses: AtomicU64,
    pub(crate) constructions: AtomicU64,
    pub(crate) failures: AtomicU64,
    pub(crate) discarded: AtomicU64,
}

impl Counters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, entries: usize) -> RegistryStats {
        RegistryStats {
            entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            constructions: self.constructions.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_idle() {
        assert_eq!(RegistryStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate() {
        let stats = RegistryStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_snapshot() {
        let counters = Counters::default();
        Counters::bump(&counters.hits);
        Counters::bump(&counters.hits);
        Counters::bump(&counters.misses);
        Counters::bump(&counters.constructions);

        let stats = counters.snapshot(1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.constructions, 1);
        assert_eq!(stats.failures, 0);
        assert_eq!(stats.discarded, 0);
    }
}
