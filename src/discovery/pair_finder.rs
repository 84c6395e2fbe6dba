use crate::core::{
    abi, constants::V2_FEE_BIPS, error::SwapResult, Pool, SwapError, TokenInfo,
};
use ethabi::Token;
use ethers::providers::Middleware;
use ethers::types::Address;
use log::debug;
use std::sync::Arc;

/// Trait for venue-specific pool discovery.
#[async_trait::async_trait]
pub trait PairFinder: Send + Sync {
    async fn find_pools(
        &self,
        token_a: &TokenInfo,
        token_b: &TokenInfo,
    ) -> SwapResult<Vec<Pool>>;
}

/// Discovers v2 pairs through the factory and snapshots their reserves.
pub struct V2PairFinder<M> {
    client: Arc<M>,
    factory: Address,
    fee_bips: u32,
}

impl<M: Middleware> V2PairFinder<M> {
    pub fn new(client: Arc<M>, factory: Address) -> Self {
        Self {
            client,
            factory,
            fee_bips: V2_FEE_BIPS,
        }
    }

    async fn read_pair(
        &self,
        pair: Address,
        token_a: &TokenInfo,
        token_b: &TokenInfo,
    ) -> SwapResult<Pool> {
        let token0_out = abi::call_read(
            self.client.as_ref(),
            pair,
            &abi::pair_token0(),
            &[],
        )
        .await?;
        let token0_addr = abi::as_address(
            token0_out
                .first()
                .ok_or_else(|| SwapError::AbiError("empty token0 result".to_string()))?,
        )?;

        let reserves_out = abi::call_read(
            self.client.as_ref(),
            pair,
            &abi::pair_get_reserves(),
            &[],
        )
        .await?;
        if reserves_out.len() < 2 {
            return Err(SwapError::AbiError(
                "unexpected getReserves result".to_string(),
            ));
        }
        let reserve0 = abi::as_uint(&reserves_out[0])?;
        let reserve1 = abi::as_uint(&reserves_out[1])?;

        let block_number = self
            .client
            .get_block_number()
            .await
            .map_err(SwapError::provider)?
            .as_u64();

        // map canonical reserves back onto the requested tokens
        let (reserve_a, reserve_b) = if token_a.address == token0_addr {
            (reserve0, reserve1)
        } else if token_b.address == token0_addr {
            (reserve1, reserve0)
        } else {
            return Err(SwapError::InvalidPoolState(format!(
                "pair {:?} token0 {:?} matches neither requested token",
                pair, token0_addr
            )));
        };

        Pool::new(
            pair,
            token_a.clone(),
            token_b.clone(),
            reserve_a,
            reserve_b,
            self.fee_bips,
            block_number,
        )
    }
}

#[async_trait::async_trait]
impl<M: Middleware + 'static> PairFinder for V2PairFinder<M> {
    async fn find_pools(
        &self,
        token_a: &TokenInfo,
        token_b: &TokenInfo,
    ) -> SwapResult<Vec<Pool>> {
        debug!(
            "Searching for v2 pair {}/{}",
            token_a.symbol, token_b.symbol
        );

        let result = abi::call_read(
            self.client.as_ref(),
            self.factory,
            &abi::factory_get_pair(),
            &[
                Token::Address(token_a.address),
                Token::Address(token_b.address),
            ],
        )
        .await?;

        let pair = abi::as_address(
            result
                .first()
                .ok_or_else(|| SwapError::AbiError("empty getPair result".to_string()))?,
        )?;

        if pair == Address::zero() {
            return Ok(vec![]);
        }

        let pool = self.read_pair(pair, token_a, token_b).await?;
        Ok(vec![pool])
    }
}
