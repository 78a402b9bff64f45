//! In-memory protocol doubles deployed on a [`crate::chain::Chain`]: a
//! Chainlink-style feed, Uniswap V2/V3-style routers and a position-based
//! staking contract.

use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::errors::PoolError;
use crate::math::mul_div;

pub mod aggregator;
pub mod staking;
pub mod uniswap_v2;
pub mod uniswap_v3;

pub use aggregator::MockAggregator;
pub use staking::MockStaking;
pub use uniswap_v2::MockUniswapV2Router;
pub use uniswap_v3::MockUniswapV3Router;

/// Fixed exchange rates between token pairs: `out = in * numerator / denominator`
#[derive(Clone, Debug, Default)]
pub struct RateTable {
    rates: BTreeMap<(Pubkey, Pubkey), (u128, u128)>,
}

impl RateTable {
    /// Set the rate in both directions
    pub fn set(&mut self, from: Pubkey, to: Pubkey, numerator: u128, denominator: u128) {
        self.rates.insert((from, to), (numerator, denominator));
        self.rates.insert((to, from), (denominator, numerator));
    }

    fn rate(&self, from: &Pubkey, to: &Pubkey) -> Result<(u128, u128)> {
        self.rates
            .get(&(*from, *to))
            .copied()
            .ok_or(error!(PoolError::InvalidRoutingAsset))
    }

    /// Output for an exact input along `path`
    pub fn quote_out(&self, path: &[Pubkey], amount_in: u128) -> Result<u128> {
        require!(path.len() >= 2, PoolError::InvalidRoutingAsset);
        path.windows(2).try_fold(amount_in, |amount, hop| {
            let (numerator, denominator) = self.rate(&hop[0], &hop[1])?;
            mul_div(amount, numerator, denominator)
        })
    }

    /// Input needed for an exact output along `path`, rounded up
    pub fn quote_in(&self, path: &[Pubkey], amount_out: u128) -> Result<u128> {
        require!(path.len() >= 2, PoolError::InvalidRoutingAsset);
        path.windows(2).rev().try_fold(amount_out, |amount, hop| {
            let (numerator, denominator) = self.rate(&hop[0], &hop[1])?;
            let scaled = amount
                .checked_mul(denominator)
                .ok_or(error!(PoolError::MathOverflow))?;
            Ok(scaled.div_ceil(numerator))
        })
    }
}
