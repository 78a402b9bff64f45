use anchor_lang::prelude::*;

use crate::chain::Chain;
use crate::constants::{STAKING_POSITIONS_KEY, STAKING_POSITION_TYPE};
use crate::errors::PoolError;
use crate::events::{EventLog, RewardsClaimed, Staked, Unstaked};
use crate::guards::validation::{require_recipient_is_pool, require_supported};
use crate::guards::{AfterTxContext, ContractGuard, GuardContext, GuardOutcome, TransactionType};
use crate::interfaces::staking::{
    Claim, PositionInfo, PositionQuery, Stake, Unstake, CLAIM, POSITION, REWARD_TOKEN, STAKE,
    STAKING_TOKEN, UNSTAKE,
};
use crate::interfaces::{decode_args, decode_return, encode_call, selector, split_selector};

/// Guard for a position-based staking contract
///
/// Every `stake` opens a position the guard records in the position
/// tracker once the call succeeded, so the staked LP asset guard can value
/// and unwind it later. New positions may only be opened on the contract
/// registered as `stakingPositions`. `claim` only moves rewards into the
/// pool and is callable by anyone.
#[derive(Clone, Copy, Debug)]
pub struct StakingGuard {
    /// Address this guard is registered under in governance
    pub address: Pubkey,
}

impl StakingGuard {
    pub fn new(address: Pubkey) -> Self {
        Self { address }
    }

    pub fn query_token(chain: &Chain, staking_contract: Pubkey, method: &str) -> Result<Pubkey> {
        decode_return(&chain.static_call(staking_contract, &encode_call(method, &()))?)
    }

    pub fn query_position(
        chain: &Chain,
        staking_contract: Pubkey,
        position_id: u64,
    ) -> Result<PositionInfo> {
        let data = encode_call(POSITION, &PositionQuery { position_id });
        decode_return(&chain.static_call(staking_contract, &data)?)
    }

    fn require_owned(
        ctx: &GuardContext,
        staking_contract: &Pubkey,
        position_id: u64,
    ) -> Result<()> {
        require!(
            ctx.view
                .tracker
                .contains(staking_contract, STAKING_POSITION_TYPE, &ctx.pool, position_id),
            PoolError::PositionNotOwnedByPool
        );
        Ok(())
    }
}

impl ContractGuard for StakingGuard {
    fn tx_guard(
        &self,
        ctx: &GuardContext,
        events: &mut EventLog,
        to: Pubkey,
        data: &[u8],
    ) -> Result<GuardOutcome> {
        let (sel, args) = split_selector(data)?;

        if sel == selector(STAKE) {
            let args: Stake = decode_args(args)?;
            // Only positions in the registered contract are valued and unwound
            let registered = ctx.view.governance.get_address(STAKING_POSITIONS_KEY);
            if registered != Some(to) {
                msg!("Stake rejected: {} is not the registered staking contract", to);
                return err!(PoolError::UnsupportedStakingContract);
            }
            let staking_token = Self::query_token(ctx.view.chain, to, STAKING_TOKEN)?;
            require_supported(ctx, &staking_token, PoolError::UnsupportedAsset)?;
            require_recipient_is_pool(ctx, &args.recipient)?;

            let open = ctx
                .view
                .tracker
                .position_ids(&to, STAKING_POSITION_TYPE, &ctx.pool)
                .len();
            require!(
                open < ctx.config.maximum_staking_positions,
                PoolError::TooManyStakingPositions
            );

            events.record(Staked {
                pool: ctx.pool,
                staking_contract: to,
                staking_token,
                amount: args.amount,
                time: ctx.now(),
            });
            return Ok(GuardOutcome::restricted(TransactionType::Stake));
        }

        if sel == selector(UNSTAKE) {
            let args: Unstake = decode_args(args)?;
            Self::require_owned(ctx, &to, args.position_id)?;
            let staking_token = Self::query_token(ctx.view.chain, to, STAKING_TOKEN)?;
            require_supported(ctx, &staking_token, PoolError::UnsupportedAsset)?;
            require_recipient_is_pool(ctx, &args.recipient)?;

            events.record(Unstaked {
                pool: ctx.pool,
                staking_contract: to,
                position_id: args.position_id,
                amount: args.amount,
                time: ctx.now(),
            });
            return Ok(GuardOutcome::restricted(TransactionType::Unstake));
        }

        if sel == selector(CLAIM) {
            let args: Claim = decode_args(args)?;
            Self::require_owned(ctx, &to, args.position_id)?;
            let reward_token = Self::query_token(ctx.view.chain, to, REWARD_TOKEN)?;
            require_supported(ctx, &reward_token, PoolError::UnsupportedAsset)?;
            require_recipient_is_pool(ctx, &args.recipient)?;

            events.record(RewardsClaimed {
                pool: ctx.pool,
                staking_contract: to,
                position_id: args.position_id,
                time: ctx.now(),
            });
            return Ok(GuardOutcome::public(TransactionType::Claim));
        }

        Ok(GuardOutcome::unclassified())
    }

    fn after_tx_guard(
        &self,
        ctx: &mut AfterTxContext,
        to: Pubkey,
        data: &[u8],
        return_data: &[u8],
    ) -> Result<()> {
        let (sel, args) = split_selector(data)?;

        if sel == selector(STAKE) {
            let position_id: u64 = decode_return(return_data)?;
            msg!("Tracking staking position {} for pool {}", position_id, ctx.pool);
            ctx.tracker.add_position_id(
                ctx.governance,
                &self.address,
                to,
                STAKING_POSITION_TYPE,
                ctx.pool,
                position_id,
            )?;
        } else if sel == selector(UNSTAKE) {
            let args: Unstake = decode_args(args)?;
            let position = Self::query_position(ctx.chain, to, args.position_id)?;
            let tracked = ctx
                .tracker
                .contains(&to, STAKING_POSITION_TYPE, &ctx.pool, args.position_id);
            if position.amount == 0 && tracked {
                msg!("Staking position {} closed", args.position_id);
                ctx.tracker.remove_position_id(
                    ctx.governance,
                    &self.address,
                    to,
                    STAKING_POSITION_TYPE,
                    ctx.pool,
                    args.position_id,
                )?;
            }
        }

        Ok(())
    }
}
