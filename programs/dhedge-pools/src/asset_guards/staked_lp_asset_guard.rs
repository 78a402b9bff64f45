use anchor_lang::prelude::*;

use crate::asset_guards::{AssetGuard, GuardedCall, WithdrawPlan};
use crate::constants::{STAKING_POSITIONS_KEY, STAKING_POSITION_TYPE};
use crate::context::ValuationContext;
use crate::errors::PoolError;
use crate::events::EventLog;
use crate::guards::{guard_approve, ContractGuard, GuardContext, GuardOutcome, StakingGuard};
use crate::interfaces::encode_call;
use crate::interfaces::staking::{Claim, Unstake, CLAIM, STAKING_TOKEN, UNSTAKE};
use crate::math::apply_portion;

/// What happens to unclaimed staking rewards when an investor withdraws
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RewardPolicy {
    /// Rewards stay in the positions for the remaining investors
    #[default]
    Ignore,
    /// Rewards are claimed into the pool before unstaking
    ClaimOnWithdraw,
}

/// Asset guard for an LP token that may be staked in the staking contract
/// registered under `stakingPositions`
///
/// The pool's balance is its idle LP tokens plus the amount of every
/// staking position the position tracker lists for it.
#[derive(Clone, Copy, Debug, Default)]
pub struct StakedLpAssetGuard {
    pub reward_policy: RewardPolicy,
}

/// A tracked staking position holding the asset
struct StakedPosition {
    id: u64,
    amount: u128,
}

impl StakedLpAssetGuard {
    pub fn new(reward_policy: RewardPolicy) -> Self {
        Self { reward_policy }
    }

    fn staked_positions(
        &self,
        ctx: &ValuationContext,
        pool: Pubkey,
        asset: Pubkey,
    ) -> Result<Option<(Pubkey, Vec<StakedPosition>)>> {
        let Some(staking_contract) = ctx.governance.get_address(STAKING_POSITIONS_KEY) else {
            return Ok(None);
        };
        let ids = ctx
            .tracker
            .position_ids(&staking_contract, STAKING_POSITION_TYPE, &pool);
        if ids.is_empty() {
            return Ok(None);
        }

        let staking_token = StakingGuard::query_token(ctx.chain, staking_contract, STAKING_TOKEN)?;
        if staking_token != asset {
            return Ok(None);
        }

        let mut positions = Vec::with_capacity(ids.len());
        for id in ids {
            let info = StakingGuard::query_position(ctx.chain, staking_contract, *id)?;
            if info.owner == pool {
                positions.push(StakedPosition {
                    id: *id,
                    amount: info.amount,
                });
            }
        }
        Ok(Some((staking_contract, positions)))
    }
}

impl ContractGuard for StakedLpAssetGuard {
    fn tx_guard(
        &self,
        ctx: &GuardContext,
        _events: &mut EventLog,
        _to: Pubkey,
        data: &[u8],
    ) -> Result<GuardOutcome> {
        guard_approve(ctx, data)
    }
}

impl AssetGuard for StakedLpAssetGuard {
    fn get_balance(&self, ctx: &ValuationContext, pool: Pubkey, asset: Pubkey) -> Result<u128> {
        let mut balance = ctx.token_balance(&asset, &pool);
        if let Some((_, positions)) = self.staked_positions(ctx, pool, asset)? {
            for position in positions {
                balance = balance
                    .checked_add(position.amount)
                    .ok_or(error!(PoolError::MathOverflow))?;
            }
        }
        Ok(balance)
    }

    fn withdraw_processing(
        &self,
        ctx: &ValuationContext,
        pool: Pubkey,
        asset: Pubkey,
        portion: u128,
        _to: Pubkey,
    ) -> Result<WithdrawPlan> {
        let mut withdraw_balance = apply_portion(ctx.token_balance(&asset, &pool), portion)?;
        let mut transactions = Vec::new();

        if let Some((staking_contract, positions)) = self.staked_positions(ctx, pool, asset)? {
            for position in positions {
                let amount = apply_portion(position.amount, portion)?;
                if amount == 0 {
                    continue;
                }

                if self.reward_policy == RewardPolicy::ClaimOnWithdraw {
                    transactions.push(GuardedCall {
                        to: staking_contract,
                        data: encode_call(
                            CLAIM,
                            &Claim {
                                position_id: position.id,
                                recipient: pool,
                            },
                        ),
                    });
                }
                transactions.push(GuardedCall {
                    to: staking_contract,
                    data: encode_call(
                        UNSTAKE,
                        &Unstake {
                            position_id: position.id,
                            amount,
                            recipient: pool,
                        },
                    ),
                });

                withdraw_balance = withdraw_balance
                    .checked_add(amount)
                    .ok_or(error!(PoolError::MathOverflow))?;
            }
        }

        Ok(WithdrawPlan {
            withdraw_asset: asset,
            withdraw_balance,
            transactions,
        })
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
