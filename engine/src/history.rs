use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use corelib::models::PriceUpdate;

/// Recent-observation buffer for one symbol.
///
/// The detector depends only on this trait, so the count-bounded buffer
/// below can be swapped for an age-bounded one without touching the
/// detection algorithm.
pub trait PriceHistory: Send + 'static {
    /// Append `update` at the tail, evicting from the head as needed.
    fn record(&mut self, update: PriceUpdate);

    /// Oldest-first scan for the first entry at or before `cutoff`.
    ///
    /// Ties resolve to the oldest qualifying entry, i.e. the largest
    /// possible lookback rather than the tightest one.
    fn reference_at_or_before(&self, cutoff: DateTime<Utc>) -> Option<PriceUpdate>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// History bounded by entry count.
///
/// Memory per symbol is capped at `capacity` entries; how much wall-clock
/// time that covers depends on the arrival rate.
#[derive(Debug)]
pub struct CountBoundedHistory {
    entries: VecDeque<PriceUpdate>,
    capacity: usize,
}

impl CountBoundedHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn oldest(&self) -> Option<&PriceUpdate> {
        self.entries.front()
    }

    pub fn latest(&self) -> Option<&PriceUpdate> {
        self.entries.back()
    }
}

impl PriceHistory for CountBoundedHistory {
    fn record(&mut self, update: PriceUpdate) {
        self.entries.push_back(update);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    fn reference_at_or_before(&self, cutoff: DateTime<Utc>) -> Option<PriceUpdate> {
        self.entries.iter().find(|u| u.timestamp <= cutoff).cloned()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at_secs(s: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + s, 0).unwrap()
    }

    fn update(price: f64, ts: DateTime<Utc>) -> PriceUpdate {
        PriceUpdate::new("fameli", price, ts)
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut h = CountBoundedHistory::new(3);

        for i in 0..50 {
            h.record(update(100.0 + i as f64, at_secs(i)));
            assert!(h.len() <= 3);
        }

        // Oldest entries were evicted first.
        assert_eq!(h.oldest().unwrap().price, 147.0);
        assert_eq!(h.latest().unwrap().price, 149.0);
    }

    #[test]
    fn replaying_an_update_keeps_the_bound() {
        let mut h = CountBoundedHistory::new(2);
        let u = update(100.0, at_secs(0));

        for _ in 0..10 {
            h.record(u.clone());
        }

        assert_eq!(h.len(), 2);
    }

    #[test]
    fn picks_oldest_qualifying_entry() {
        let mut h = CountBoundedHistory::new(10);
        h.record(update(100.0, at_secs(0)));
        h.record(update(105.0, at_secs(1)));
        h.record(update(110.0, at_secs(2)));

        // Both t=0 and t=1 qualify against a t=1 cutoff; the scan returns
        // the oldest.
        let reference = h.reference_at_or_before(at_secs(1)).unwrap();
        assert_eq!(reference.price, 100.0);
    }

    #[test]
    fn no_reference_when_history_is_too_young() {
        let mut h = CountBoundedHistory::new(10);
        h.record(update(100.0, at_secs(10)));

        assert!(h.reference_at_or_before(at_secs(9)).is_none());
    }

    #[test]
    fn cutoff_is_inclusive() {
        let mut h = CountBoundedHistory::new(10);
        let ts = at_secs(5) + Duration::milliseconds(250);
        h.record(update(100.0, ts));

        assert!(h.reference_at_or_before(ts).is_some());
        assert!(
            h.reference_at_or_before(ts - Duration::milliseconds(1))
                .is_none()
        );
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut h = CountBoundedHistory::new(0);
        h.record(update(100.0, at_secs(0)));
        assert_eq!(h.len(), 1);
    }
}
