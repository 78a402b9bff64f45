use std::any::Any;

use anchor_lang::prelude::*;

/// Answer of a Chainlink-compatible price feed
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundData {
    pub round_id: u128,
    pub answer: i128,
    pub started_at: i64,
    pub updated_at: i64,
    pub answered_in_round: u128,
}

/// Chainlink `AggregatorV3Interface` as consumed by the asset handler
pub trait AggregatorV3 {
    fn decimals(&self) -> u8;

    fn latest_round_data(&self) -> Result<RoundData>;

    fn box_clone(&self) -> Box<dyn AggregatorV3>;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl Clone for Box<dyn AggregatorV3> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}
