pub mod pair_finder;
pub mod pool_cache;

pub use pair_finder::{PairFinder, V2PairFinder};
pub use pool_cache::PoolCache;

use crate::core::{Currency, Pool, Route, SwapError, SwapResult, TokenInfo};
use ethers::types::Address;
use futures::future::join_all;
use log::{debug, info, warn};

/// Enumerates candidate routes between two currencies from on-chain state:
/// the direct pair plus two-hop routes through the configured base tokens.
pub struct RouteDiscovery {
    finders: Vec<Box<dyn PairFinder>>,
    cache: PoolCache,
    weth: Address,
    bases: Vec<TokenInfo>,
}

impl RouteDiscovery {
    pub fn new(
        finders: Vec<Box<dyn PairFinder>>,
        cache: PoolCache,
        weth: Address,
        bases: Vec<TokenInfo>,
    ) -> Self {
        Self {
            finders,
            cache,
            weth,
            bases,
        }
    }

    fn wrapped_token_info(&self, currency: &Currency) -> SwapResult<TokenInfo> {
        match currency {
            Currency::Token(token) => Ok(token.clone()),
            Currency::Native { .. } => self
                .bases
                .iter()
                .find(|base| base.address == self.weth)
                .cloned()
                .ok_or_else(|| {
                    SwapError::ConfigError(
                        "wrapped-native token missing from routing bases".to_string(),
                    )
                }),
        }
    }

    /// Pools for one unordered pair, served from the cache when the cached
    /// snapshot is still fresh at `latest_block`.
    async fn pools_for(
        &self,
        token_a: &TokenInfo,
        token_b: &TokenInfo,
        latest_block: u64,
    ) -> Vec<Pool> {
        if let Some(pools) = self.cache.get(token_a.address, token_b.address, latest_block) {
            debug!(
                "Pool cache hit for {}/{}",
                token_a.symbol, token_b.symbol
            );
            return pools;
        }

        let futures = self
            .finders
            .iter()
            .map(|finder| finder.find_pools(token_a, token_b));
        let results = join_all(futures).await;

        let mut pools = Vec::new();
        for (i, result) in results.into_iter().enumerate() {
            match result {
                Ok(found) => pools.extend(found),
                Err(e) => {
                    warn!(
                        "Finder {} failed for {}/{}: {}",
                        i, token_a.symbol, token_b.symbol, e
                    );
                }
            }
        }

        self.cache
            .set(token_a.address, token_b.address, latest_block, pools.clone());
        pools
    }

    /// All candidate routes from `currency_in` to `currency_out`, direct
    /// first, then one route per (base, pool, pool) combination.
    pub async fn discover_routes(
        &self,
        currency_in: &Currency,
        currency_out: &Currency,
        latest_block: u64,
    ) -> SwapResult<Vec<Route>> {
        let token_in = self.wrapped_token_info(currency_in)?;
        let token_out = self.wrapped_token_info(currency_out)?;
        if token_in.address == token_out.address {
            return Ok(vec![]);
        }

        let intermediates: Vec<&TokenInfo> = self
            .bases
            .iter()
            .filter(|base| {
                base.address != token_in.address && base.address != token_out.address
            })
            .collect();

        let mut pair_queries = vec![(token_in.clone(), token_out.clone())];
        for base in &intermediates {
            pair_queries.push((token_in.clone(), (*base).clone()));
            pair_queries.push(((*base).clone(), token_out.clone()));
        }

        let lookups = pair_queries
            .iter()
            .map(|(a, b)| self.pools_for(a, b, latest_block));
        let mut results = join_all(lookups).await;

        // results arrive in query order: direct pair first, then the
        // (in, base) / (base, out) pairs per intermediate
        let direct = results.remove(0);
        let mut routes = Vec::new();
        for pool in direct {
            match Route::new(
                vec![pool],
                currency_in.clone(),
                currency_out.clone(),
                self.weth,
            ) {
                Ok(route) => routes.push(route),
                Err(e) => debug!("Skipping direct route: {}", e),
            }
        }

        for chunk in results.chunks(2) {
            let (first_legs, second_legs) = match chunk {
                [a, b] => (a, b),
                _ => break,
            };
            for p1 in first_legs {
                for p2 in second_legs {
                    match Route::new(
                        vec![p1.clone(), p2.clone()],
                        currency_in.clone(),
                        currency_out.clone(),
                        self.weth,
                    ) {
                        Ok(route) => routes.push(route),
                        Err(e) => debug!("Skipping two-hop route: {}", e),
                    }
                }
            }
        }

        info!(
            "Found {} candidate routes for {}/{}",
            routes.len(),
            currency_in.symbol(),
            currency_out.symbol()
        );
        Ok(routes)
    }
}
