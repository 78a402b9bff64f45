use std::any::Any;
use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::chain::{CallEnv, ExternalContract};
use crate::errors::PoolError;
use crate::interfaces::staking::{
    Claim, PositionInfo, PositionQuery, Stake, Unstake, CLAIM, POSITION, REWARD_TOKEN, STAKE,
    STAKING_TOKEN, UNSTAKE,
};
use crate::interfaces::{decode_args, encode_return, selector, split_selector};
use crate::token::TokenLedger;

/// Position-based staking contract
///
/// Staked tokens are held by the contract. Rewards accrue only through
/// [`MockStaking::accrue_rewards`] and are minted on claim.
#[derive(Clone, Debug)]
pub struct MockStaking {
    pub staking_token: Pubkey,
    pub reward_token: Pubkey,
    positions: BTreeMap<u64, PositionInfo>,
    next_id: u64,
}

impl MockStaking {
    pub fn new(staking_token: Pubkey, reward_token: Pubkey) -> Self {
        Self {
            staking_token,
            reward_token,
            positions: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn position(&self, position_id: u64) -> Option<&PositionInfo> {
        self.positions.get(&position_id)
    }

    pub fn accrue_rewards(&mut self, position_id: u64, amount: u128) -> Result<()> {
        let position = self
            .positions
            .get_mut(&position_id)
            .ok_or(error!(PoolError::InvalidIndex))?;
        position.pending_rewards = position
            .pending_rewards
            .checked_add(amount)
            .ok_or(error!(PoolError::MathOverflow))?;
        Ok(())
    }

    fn owned_position(&mut self, position_id: u64, caller: &Pubkey) -> Result<&mut PositionInfo> {
        let position = self
            .positions
            .get_mut(&position_id)
            .ok_or(error!(PoolError::InvalidIndex))?;
        require_keys_eq!(position.owner, *caller, PoolError::PositionNotOwnedByPool);
        Ok(position)
    }
}

impl ExternalContract for MockStaking {
    fn call(&mut self, env: &mut CallEnv, data: &[u8]) -> Result<Vec<u8>> {
        let (sel, args) = split_selector(data)?;

        if sel == selector(STAKE) {
            let args: Stake = decode_args(args)?;
            require!(args.amount > 0, PoolError::InvalidAmount);
            env.tokens.transfer_from(
                &self.staking_token,
                &env.this,
                &env.caller,
                &env.this,
                args.amount,
            )?;

            let position_id = self.next_id;
            self.next_id += 1;
            self.positions.insert(
                position_id,
                PositionInfo {
                    owner: args.recipient,
                    amount: args.amount,
                    pending_rewards: 0,
                },
            );
            Ok(encode_return(&position_id))
        } else if sel == selector(UNSTAKE) {
            let args: Unstake = decode_args(args)?;
            let staking_token = self.staking_token;
            let position = self.owned_position(args.position_id, &env.caller)?;
            require!(position.amount >= args.amount, PoolError::InsufficientBalance);

            position.amount -= args.amount;
            env.tokens
                .transfer(&staking_token, &env.this, &args.recipient, args.amount)?;
            Ok(encode_return(&args.amount))
        } else if sel == selector(CLAIM) {
            let args: Claim = decode_args(args)?;
            let reward_token = self.reward_token;
            let position = self.owned_position(args.position_id, &env.caller)?;

            let rewards = std::mem::take(&mut position.pending_rewards);
            env.tokens.mint(&reward_token, &args.recipient, rewards)?;
            Ok(encode_return(&rewards))
        } else {
            err!(PoolError::InvalidTransactionData)
        }
    }

    fn view(&self, _tokens: &TokenLedger, data: &[u8]) -> Result<Vec<u8>> {
        let (sel, args) = split_selector(data)?;

        if sel == selector(POSITION) {
            let args: PositionQuery = decode_args(args)?;
            let position = self
                .positions
                .get(&args.position_id)
                .ok_or(error!(PoolError::InvalidIndex))?;
            Ok(encode_return(position))
        } else if sel == selector(STAKING_TOKEN) {
            Ok(encode_return(&self.staking_token))
        } else if sel == selector(REWARD_TOKEN) {
            Ok(encode_return(&self.reward_token))
        } else {
            err!(PoolError::InvalidTransactionData)
        }
    }

    fn box_clone(&self) -> Box<dyn ExternalContract> {
        Box::new(self.clone())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
