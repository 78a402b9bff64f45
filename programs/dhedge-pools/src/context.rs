use anchor_lang::prelude::*;

use crate::asset_guards::AssetGuard;
use crate::asset_handler::AssetHandler;
use crate::chain::Chain;
use crate::errors::PoolError;
use crate::governance::Governance;
use crate::position_tracker::PositionTracker;

/// Read-only view of everything needed to value a pool
///
/// Built fresh for each entry point so a valuation never outlives the
/// state it was computed from.
#[derive(Clone, Copy)]
pub struct ValuationContext<'a> {
    pub chain: &'a Chain,
    pub governance: &'a Governance,
    pub asset_handler: &'a AssetHandler,
    pub tracker: &'a PositionTracker,
}

impl<'a> ValuationContext<'a> {
    pub fn new(
        chain: &'a Chain,
        governance: &'a Governance,
        asset_handler: &'a AssetHandler,
        tracker: &'a PositionTracker,
    ) -> Self {
        Self {
            chain,
            governance,
            asset_handler,
            tracker,
        }
    }

    pub fn now(&self) -> i64 {
        self.chain.now
    }

    pub fn token_balance(&self, token: &Pubkey, holder: &Pubkey) -> u128 {
        self.chain.tokens.balance_of(token, holder)
    }

    /// Asset guard responsible for `asset`, resolved through its asset type
    pub fn asset_guard(&self, asset: &Pubkey) -> Result<&'a dyn AssetGuard> {
        let asset_type = self.asset_handler.get_asset_type(asset)?;
        self.governance
            .get_asset_guard(asset_type)
            .map(|registered| registered.guard.as_ref())
            .ok_or(error!(PoolError::InvalidAsset))
    }
}
