use std::any::Any;

use anchor_lang::prelude::*;

use crate::chain::{CallEnv, ExternalContract};
use crate::errors::PoolError;
use crate::interfaces::uniswap_v3::{
    ExactInput, ExactInputSingle, ExactOutputSingle, Multicall, EXACT_INPUT, EXACT_INPUT_SINGLE,
    EXACT_OUTPUT_SINGLE, MULTICALL,
};
use crate::interfaces::{decode_args, encode_return, selector, split_selector};
use crate::mock::RateTable;
use crate::token::TokenLedger;

/// V3-style swap router over fixed rates; pool fees are accepted and ignored
#[derive(Clone, Debug, Default)]
pub struct MockUniswapV3Router {
    pub rates: RateTable,
}

impl MockUniswapV3Router {
    pub fn new() -> Self {
        Self::default()
    }

    fn settle(
        env: &mut CallEnv,
        token_in: Pubkey,
        token_out: Pubkey,
        amount_in: u128,
        amount_out: u128,
        recipient: Pubkey,
    ) -> Result<()> {
        env.tokens
            .transfer_from(&token_in, &env.this, &env.caller, &env.this, amount_in)?;
        env.tokens.transfer(&token_out, &env.this, &recipient, amount_out)
    }
}

impl ExternalContract for MockUniswapV3Router {
    fn call(&mut self, env: &mut CallEnv, data: &[u8]) -> Result<Vec<u8>> {
        let (sel, args) = split_selector(data)?;

        if sel == selector(EXACT_INPUT_SINGLE) {
            let args: ExactInputSingle = decode_args(args)?;
            require!(args.deadline >= env.now, PoolError::InvalidTransaction);
            let amount_out = self
                .rates
                .quote_out(&[args.token_in, args.token_out], args.amount_in)?;
            require!(amount_out >= args.amount_out_minimum, PoolError::InvalidAmount);
            Self::settle(
                env,
                args.token_in,
                args.token_out,
                args.amount_in,
                amount_out,
                args.recipient,
            )?;
            Ok(encode_return(&amount_out))
        } else if sel == selector(EXACT_INPUT) {
            let args: ExactInput = decode_args(args)?;
            require!(args.deadline >= env.now, PoolError::InvalidTransaction);
            require!(args.fees.len() + 1 == args.path.len(), PoolError::InvalidRoutingAsset);
            let amount_out = self.rates.quote_out(&args.path, args.amount_in)?;
            require!(amount_out >= args.amount_out_minimum, PoolError::InvalidAmount);
            let (token_in, token_out) = match (args.path.first(), args.path.last()) {
                (Some(first), Some(last)) => (*first, *last),
                _ => return err!(PoolError::InvalidRoutingAsset),
            };
            Self::settle(env, token_in, token_out, args.amount_in, amount_out, args.recipient)?;
            Ok(encode_return(&amount_out))
        } else if sel == selector(EXACT_OUTPUT_SINGLE) {
            let args: ExactOutputSingle = decode_args(args)?;
            require!(args.deadline >= env.now, PoolError::InvalidTransaction);
            let amount_in = self
                .rates
                .quote_in(&[args.token_in, args.token_out], args.amount_out)?;
            require!(amount_in <= args.amount_in_maximum, PoolError::InvalidAmount);
            Self::settle(
                env,
                args.token_in,
                args.token_out,
                amount_in,
                args.amount_out,
                args.recipient,
            )?;
            Ok(encode_return(&amount_in))
        } else if sel == selector(MULTICALL) {
            let args: Multicall = decode_args(args)?;
            let results = args
                .data
                .iter()
                .map(|inner| self.call(env, inner))
                .collect::<Result<Vec<_>>>()?;
            Ok(encode_return(&results))
        } else {
            err!(PoolError::InvalidTransactionData)
        }
    }

    fn view(&self, _tokens: &TokenLedger, _data: &[u8]) -> Result<Vec<u8>> {
        err!(PoolError::InvalidTransactionData)
    }

    fn box_clone(&self) -> Box<dyn ExternalContract> {
        Box::new(self.clone())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
