//! Sharded symbol → history map.
//!
//! Lock granularity is per shard: updates for symbols hashing to different
//! shards proceed in parallel, while append/evict/scan for a single symbol
//! always runs under its shard's lock. Histories are created lazily on the
//! first observation of a symbol and live for the process lifetime.

use std::collections::HashMap;
use std::hash::{BuildHasher, Hash, Hasher, RandomState};

use parking_lot::Mutex;

use crate::history::PriceHistory;

pub const DEFAULT_SHARD_COUNT: usize = 32;

pub struct SymbolStore<H> {
    shards: Vec<Mutex<HashMap<String, H>>>,
    hasher: RandomState,
    build: Box<dyn Fn() -> H + Send + Sync>,
}

impl<H: PriceHistory> SymbolStore<H> {
    /// `build` constructs the empty history for a symbol seen for the
    /// first time.
    pub fn new(build: impl Fn() -> H + Send + Sync + 'static) -> Self {
        Self::with_shards(DEFAULT_SHARD_COUNT, build)
    }

    pub fn with_shards(shards: usize, build: impl Fn() -> H + Send + Sync + 'static) -> Self {
        let shards = shards.max(1);
        Self {
            shards: (0..shards).map(|_| Mutex::new(HashMap::new())).collect(),
            hasher: RandomState::new(),
            build: Box::new(build),
        }
    }

    fn shard_for(&self, symbol: &str) -> &Mutex<HashMap<String, H>> {
        let mut hasher = self.hasher.build_hasher();
        symbol.hash(&mut hasher);
        let idx = hasher.finish() as usize % self.shards.len();
        &self.shards[idx]
    }

    /// Run `f` with exclusive access to the symbol's history, creating it
    /// on first use. Fetch-or-create and `f` execute under one lock
    /// acquisition, so mutations for the same symbol never interleave.
    pub fn with_history<R>(&self, symbol: &str, f: impl FnOnce(&mut H) -> R) -> R {
        let mut shard = self.shard_for(symbol).lock();
        let history = shard
            .entry(symbol.to_string())
            .or_insert_with(|| (self.build)());
        f(history)
    }

    /// Number of distinct symbols seen so far.
    pub fn symbol_count(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::CountBoundedHistory;
    use chrono::Utc;
    use corelib::models::PriceUpdate;
    use std::sync::Arc;

    fn store(capacity: usize) -> SymbolStore<CountBoundedHistory> {
        SymbolStore::new(move || CountBoundedHistory::new(capacity))
    }

    #[test]
    fn creates_one_history_per_symbol() {
        let store = store(10);

        store.with_history("fameli", |h| {
            h.record(PriceUpdate::new("fameli", 100.0, Utc::now()))
        });
        store.with_history("fameli", |h| {
            h.record(PriceUpdate::new("fameli", 101.0, Utc::now()))
        });
        store.with_history("folad", |h| {
            h.record(PriceUpdate::new("folad", 50.0, Utc::now()))
        });

        assert_eq!(store.symbol_count(), 2);
        assert_eq!(store.with_history("fameli", |h| h.len()), 2);
        assert_eq!(store.with_history("folad", |h| h.len()), 1);
    }

    #[test]
    fn concurrent_first_access_creates_a_single_history() {
        let store = Arc::new(store(1_000));
        let threads = 16;

        std::thread::scope(|scope| {
            for _ in 0..threads {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    for _ in 0..100 {
                        store.with_history("shapna", |h| {
                            h.record(PriceUpdate::new("shapna", 1.0, Utc::now()))
                        });
                    }
                });
            }
        });

        assert_eq!(store.symbol_count(), 1);
        // Every record landed in the same instance.
        assert_eq!(store.with_history("shapna", |h| h.len()), threads * 100);
    }

    #[test]
    fn symbols_spread_across_shards() {
        let store = store(10);
        for i in 0..200 {
            let symbol = format!("sym{i}");
            store.with_history(&symbol, |h| {
                h.record(PriceUpdate::new(&symbol, 1.0, Utc::now()))
            });
        }
        assert_eq!(store.symbol_count(), 200);
    }
}
