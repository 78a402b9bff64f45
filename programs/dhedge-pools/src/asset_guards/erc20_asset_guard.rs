use anchor_lang::prelude::*;

use crate::asset_guards::{AssetGuard, WithdrawPlan};
use crate::context::ValuationContext;
use crate::errors::PoolError;
use crate::guards::Erc20Guard;
use crate::math::apply_portion;

impl AssetGuard for Erc20Guard {
    fn get_balance(&self, ctx: &ValuationContext, pool: Pubkey, asset: Pubkey) -> Result<u128> {
        Ok(ctx.token_balance(&asset, &pool))
    }

    fn withdraw_processing(
        &self,
        ctx: &ValuationContext,
        pool: Pubkey,
        asset: Pubkey,
        portion: u128,
        _to: Pubkey,
    ) -> Result<WithdrawPlan> {
        let balance = self.get_balance(ctx, pool, asset)?;
        Ok(WithdrawPlan::transfer_only(asset, apply_portion(balance, portion)?))
    }

    fn remove_asset_check(
        &self,
        ctx: &ValuationContext,
        pool: Pubkey,
        asset: Pubkey,
    ) -> Result<()> {
        require!(
            self.get_balance(ctx, pool, asset)? == 0,
            PoolError::CannotRemoveNonEmptyAsset
        );
        Ok(())
    }
}
