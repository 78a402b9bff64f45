use anchor_lang::prelude::*;

pub const APPROVE: &str = "approve";
pub const TRANSFER: &str = "transfer";
pub const BALANCE_OF: &str = "balance_of";

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct Approve {
    pub spender: Pubkey,
    pub amount: u128,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct Transfer {
    pub to: Pubkey,
    pub amount: u128,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct BalanceOf {
    pub owner: Pubkey,
}
