use std::any::Any;

use anchor_lang::prelude::*;

use crate::errors::PoolError;
use crate::interfaces::aggregator::{AggregatorV3, RoundData};

/// Price feed with a settable answer
#[derive(Clone, Debug)]
pub struct MockAggregator {
    decimals: u8,
    round: RoundData,
    failing: bool,
}

impl MockAggregator {
    pub fn new(decimals: u8, answer: i128, updated_at: i64) -> Self {
        Self {
            decimals,
            round: RoundData {
                round_id: 1,
                answer,
                started_at: updated_at,
                updated_at,
                answered_in_round: 1,
            },
            failing: false,
        }
    }

    /// Publish a new round
    pub fn set_answer(&mut self, answer: i128, updated_at: i64) {
        self.round = RoundData {
            round_id: self.round.round_id + 1,
            answer,
            started_at: updated_at,
            updated_at,
            answered_in_round: self.round.round_id + 1,
        };
    }

    /// Make `latest_round_data` revert
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl AggregatorV3 for MockAggregator {
    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn latest_round_data(&self) -> Result<RoundData> {
        require!(!self.failing, PoolError::PriceGetFailed);
        Ok(self.round)
    }

    fn box_clone(&self) -> Box<dyn AggregatorV3> {
        Box::new(self.clone())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
