use anchor_lang::prelude::*;

pub const SWAP_EXACT_TOKENS_FOR_TOKENS: &str = "swap_exact_tokens_for_tokens";
pub const SWAP_TOKENS_FOR_EXACT_TOKENS: &str = "swap_tokens_for_exact_tokens";
pub const ADD_LIQUIDITY: &str = "add_liquidity";
pub const REMOVE_LIQUIDITY: &str = "remove_liquidity";
pub const PAIR_FOR: &str = "pair_for";

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct SwapExactTokensForTokens {
    pub amount_in: u128,
    pub amount_out_min: u128,
    pub path: Vec<Pubkey>,
    pub to: Pubkey,
    pub deadline: i64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct SwapTokensForExactTokens {
    pub amount_out: u128,
    pub amount_in_max: u128,
    pub path: Vec<Pubkey>,
    pub to: Pubkey,
    pub deadline: i64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct AddLiquidity {
    pub token_a: Pubkey,
    pub token_b: Pubkey,
    pub amount_a_desired: u128,
    pub amount_b_desired: u128,
    pub amount_a_min: u128,
    pub amount_b_min: u128,
    pub to: Pubkey,
    pub deadline: i64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct RemoveLiquidity {
    pub token_a: Pubkey,
    pub token_b: Pubkey,
    pub liquidity: u128,
    pub amount_a_min: u128,
    pub amount_b_min: u128,
    pub to: Pubkey,
    pub deadline: i64,
}

/// View: LP token of the (token_a, token_b) pair, returns `Option<Pubkey>`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct PairFor {
    pub token_a: Pubkey,
    pub token_b: Pubkey,
}
