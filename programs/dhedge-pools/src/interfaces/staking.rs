use anchor_lang::prelude::*;

// Position-based staking: every stake opens a position identified by an id

pub const STAKE: &str = "stake";
pub const UNSTAKE: &str = "unstake";
pub const CLAIM: &str = "claim";
pub const POSITION: &str = "position";
pub const STAKING_TOKEN: &str = "staking_token";
pub const REWARD_TOKEN: &str = "reward_token";

/// Returns the new position id (`u64`)
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct Stake {
    pub amount: u128,
    pub recipient: Pubkey,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct Unstake {
    pub position_id: u64,
    pub amount: u128,
    pub recipient: Pubkey,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct Claim {
    pub position_id: u64,
    pub recipient: Pubkey,
}

/// View arguments for `position`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct PositionQuery {
    pub position_id: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct PositionInfo {
    pub owner: Pubkey,
    pub amount: u128,
    pub pending_rewards: u128,
}
