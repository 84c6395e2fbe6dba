use crate::core::Pool;
use dashmap::DashMap;
use ethers::types::Address;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct CacheEntry {
    pools: Vec<Pool>,
    block_number: u64,
    inserted_at: Instant,
}

/// Thread-safe pool snapshot cache. Entries are keyed by unordered token
/// pair and considered fresh only while both the block-age bound and the
/// wall-clock TTL hold; stale entries are dropped on read.
pub struct PoolCache {
    cache: DashMap<(Address, Address), CacheEntry>,
    max_block_age: u64,
    ttl: Duration,
}

impl PoolCache {
    pub fn new(max_block_age: u64, ttl_secs: u64) -> Self {
        Self {
            cache: DashMap::new(),
            max_block_age,
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    fn key(a: Address, b: Address) -> (Address, Address) {
        if a < b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Fresh pools for the pair, judged against the latest known block.
    pub fn get(&self, a: Address, b: Address, latest_block: u64) -> Option<Vec<Pool>> {
        let key = Self::key(a, b);
        if let Some(entry) = self.cache.get(&key) {
            let block_age = latest_block.saturating_sub(entry.block_number);
            if block_age <= self.max_block_age && entry.inserted_at.elapsed() <= self.ttl {
                return Some(entry.pools.clone());
            }
            drop(entry);
            self.cache.remove(&key);
        }
        None
    }

    pub fn set(&self, a: Address, b: Address, block_number: u64, pools: Vec<Pool>) {
        self.cache.insert(
            Self::key(a, b),
            CacheEntry {
                pools,
                block_number,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, a: Address, b: Address) {
        self.cache.remove(&Self::key(a, b));
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
