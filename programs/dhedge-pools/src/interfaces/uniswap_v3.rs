use anchor_lang::prelude::*;

pub const EXACT_INPUT_SINGLE: &str = "exact_input_single";
pub const EXACT_INPUT: &str = "exact_input";
pub const EXACT_OUTPUT_SINGLE: &str = "exact_output_single";
pub const MULTICALL: &str = "multicall";

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct ExactInputSingle {
    pub token_in: Pubkey,
    pub token_out: Pubkey,
    pub fee: u32,
    pub recipient: Pubkey,
    pub deadline: i64,
    pub amount_in: u128,
    pub amount_out_minimum: u128,
}

/// Multi-hop swap; `path` lists every token from input to output, `fees`
/// holds one pool fee per hop
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct ExactInput {
    pub path: Vec<Pubkey>,
    pub fees: Vec<u32>,
    pub recipient: Pubkey,
    pub deadline: i64,
    pub amount_in: u128,
    pub amount_out_minimum: u128,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct ExactOutputSingle {
    pub token_in: Pubkey,
    pub token_out: Pubkey,
    pub fee: u32,
    pub recipient: Pubkey,
    pub deadline: i64,
    pub amount_out: u128,
    pub amount_in_maximum: u128,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct Multicall {
    pub data: Vec<Vec<u8>>,
}
