//! Asset guards: one per asset type, they value a pool's holding of an
//! asset and plan the pro-rata payout of it on withdrawal.

use anchor_lang::prelude::*;

use crate::context::ValuationContext;
use crate::guards::ContractGuard;

pub mod erc20_asset_guard;
pub mod staked_lp_asset_guard;

pub use staked_lp_asset_guard::*;

/// A call the pool makes on its own behalf while paying out a withdrawal
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardedCall {
    pub to: Pubkey,
    pub data: Vec<u8>,
}

/// How an investor's share of one asset leaves the pool
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawPlan {
    pub withdraw_asset: Pubkey,
    /// Amount transferred to the investor once `transactions` ran
    pub withdraw_balance: u128,
    /// Unwinding calls executed first, e.g. unstaking a share of a position
    pub transactions: Vec<GuardedCall>,
}

impl WithdrawPlan {
    pub fn transfer_only(withdraw_asset: Pubkey, withdraw_balance: u128) -> Self {
        Self {
            withdraw_asset,
            withdraw_balance,
            transactions: Vec::new(),
        }
    }
}

/// Valuation and settlement capability of one asset type
///
/// Asset guards are contract guards too: when a pool calls one of its
/// supported assets directly, the asset's guard vets the call.
pub trait AssetGuard: ContractGuard {
    /// Pool holding in the asset's own units, including anything deployed
    /// in external positions
    fn get_balance(&self, ctx: &ValuationContext, pool: Pubkey, asset: Pubkey) -> Result<u128>;

    fn get_decimals(&self, ctx: &ValuationContext, asset: Pubkey) -> Result<u8> {
        ctx.chain.tokens.decimals(&asset)
    }

    /// Plan the transfer of `portion` (18 decimals) of the pool's holding
    fn withdraw_processing(
        &self,
        ctx: &ValuationContext,
        pool: Pubkey,
        asset: Pubkey,
        portion: u128,
        to: Pubkey,
    ) -> Result<WithdrawPlan>;

    /// Veto removal of an asset the pool still holds
    fn remove_asset_check(&self, ctx: &ValuationContext, pool: Pubkey, asset: Pubkey) -> Result<()>;
}
