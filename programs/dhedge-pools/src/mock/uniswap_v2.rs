use std::any::Any;
use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::chain::{CallEnv, ExternalContract};
use crate::errors::PoolError;
use crate::interfaces::uniswap_v2::{
    AddLiquidity, PairFor, RemoveLiquidity, SwapExactTokensForTokens, SwapTokensForExactTokens,
    ADD_LIQUIDITY, PAIR_FOR, REMOVE_LIQUIDITY, SWAP_EXACT_TOKENS_FOR_TOKENS,
    SWAP_TOKENS_FOR_EXACT_TOKENS,
};
use crate::interfaces::{decode_args, encode_return, selector, split_selector};
use crate::math::mul_div;
use crate::mock::RateTable;
use crate::token::TokenLedger;

#[derive(Clone, Debug)]
struct Pair {
    lp_token: Pubkey,
    token0: Pubkey,
    reserve0: u128,
    reserve1: u128,
}

impl Pair {
    fn reserves_for(&self, token_a: &Pubkey) -> (u128, u128) {
        if *token_a == self.token0 {
            (self.reserve0, self.reserve1)
        } else {
            (self.reserve1, self.reserve0)
        }
    }

    fn set_reserves_for(&mut self, token_a: &Pubkey, reserve_a: u128, reserve_b: u128) {
        if *token_a == self.token0 {
            self.reserve0 = reserve_a;
            self.reserve1 = reserve_b;
        } else {
            self.reserve0 = reserve_b;
            self.reserve1 = reserve_a;
        }
    }
}

fn pair_key(token_a: Pubkey, token_b: Pubkey) -> (Pubkey, Pubkey) {
    if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    }
}

/// Router that swaps at fixed rates out of its own reserves and keeps
/// constant-share liquidity pairs
///
/// Inputs are pulled with `transfer_from`, so callers approve the router
/// first. Swap outputs come from the router's token balances; fund them
/// by minting to the router address.
#[derive(Clone, Debug, Default)]
pub struct MockUniswapV2Router {
    pub rates: RateTable,
    pairs: BTreeMap<(Pubkey, Pubkey), Pair>,
}

impl MockUniswapV2Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the LP token of a pair; the LP token must exist on the ledger
    pub fn create_pair(&mut self, token_a: Pubkey, token_b: Pubkey, lp_token: Pubkey) {
        let key = pair_key(token_a, token_b);
        self.pairs.insert(
            key,
            Pair {
                lp_token,
                token0: key.0,
                reserve0: 0,
                reserve1: 0,
            },
        );
    }

    fn pair_mut(&mut self, token_a: Pubkey, token_b: Pubkey) -> Result<&mut Pair> {
        self.pairs
            .get_mut(&pair_key(token_a, token_b))
            .ok_or(error!(PoolError::UnsupportedLpAsset))
    }

    fn swap(
        &self,
        env: &mut CallEnv,
        path: &[Pubkey],
        amount_in: u128,
        amount_out: u128,
        to: Pubkey,
    ) -> Result<Vec<u8>> {
        let (first, last) = match (path.first(), path.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return err!(PoolError::InvalidRoutingAsset),
        };
        env.tokens
            .transfer_from(&first, &env.this, &env.caller, &env.this, amount_in)?;
        env.tokens.transfer(&last, &env.this, &to, amount_out)?;
        Ok(encode_return(&vec![amount_in, amount_out]))
    }

    fn add_liquidity(&mut self, env: &mut CallEnv, args: AddLiquidity) -> Result<Vec<u8>> {
        let pair = self.pair_mut(args.token_a, args.token_b)?;
        let lp_token = pair.lp_token;
        let (reserve_a, reserve_b) = pair.reserves_for(&args.token_a);
        let total = env.tokens.info(&lp_token)?.total_supply;

        let liquidity = if total == 0 {
            args.amount_a_desired
                .checked_add(args.amount_b_desired)
                .ok_or(error!(PoolError::MathOverflow))?
        } else {
            mul_div(args.amount_a_desired, total, reserve_a)?
                .min(mul_div(args.amount_b_desired, total, reserve_b)?)
        };
        require!(liquidity > 0, PoolError::InvalidAmount);

        env.tokens.transfer_from(
            &args.token_a,
            &env.this,
            &env.caller,
            &env.this,
            args.amount_a_desired,
        )?;
        env.tokens.transfer_from(
            &args.token_b,
            &env.this,
            &env.caller,
            &env.this,
            args.amount_b_desired,
        )?;
        env.tokens.mint(&lp_token, &args.to, liquidity)?;

        pair.set_reserves_for(
            &args.token_a,
            reserve_a + args.amount_a_desired,
            reserve_b + args.amount_b_desired,
        );
        Ok(encode_return(&(args.amount_a_desired, args.amount_b_desired, liquidity)))
    }

    fn remove_liquidity(&mut self, env: &mut CallEnv, args: RemoveLiquidity) -> Result<Vec<u8>> {
        let pair = self.pair_mut(args.token_a, args.token_b)?;
        let lp_token = pair.lp_token;
        let (reserve_a, reserve_b) = pair.reserves_for(&args.token_a);
        let total = env.tokens.info(&lp_token)?.total_supply;

        let amount_a = mul_div(reserve_a, args.liquidity, total)?;
        let amount_b = mul_div(reserve_b, args.liquidity, total)?;
        require!(
            amount_a >= args.amount_a_min && amount_b >= args.amount_b_min,
            PoolError::InvalidAmount
        );

        env.tokens
            .transfer_from(&lp_token, &env.this, &env.caller, &env.this, args.liquidity)?;
        env.tokens.burn(&lp_token, &env.this, args.liquidity)?;
        env.tokens.transfer(&args.token_a, &env.this, &args.to, amount_a)?;
        env.tokens.transfer(&args.token_b, &env.this, &args.to, amount_b)?;

        pair.set_reserves_for(&args.token_a, reserve_a - amount_a, reserve_b - amount_b);
        Ok(encode_return(&(amount_a, amount_b)))
    }
}

impl ExternalContract for MockUniswapV2Router {
    fn call(&mut self, env: &mut CallEnv, data: &[u8]) -> Result<Vec<u8>> {
        let (sel, args) = split_selector(data)?;

        if sel == selector(SWAP_EXACT_TOKENS_FOR_TOKENS) {
            let args: SwapExactTokensForTokens = decode_args(args)?;
            require!(args.deadline >= env.now, PoolError::InvalidTransaction);
            let amount_out = self.rates.quote_out(&args.path, args.amount_in)?;
            require!(amount_out >= args.amount_out_min, PoolError::InvalidAmount);
            self.swap(env, &args.path, args.amount_in, amount_out, args.to)
        } else if sel == selector(SWAP_TOKENS_FOR_EXACT_TOKENS) {
            let args: SwapTokensForExactTokens = decode_args(args)?;
            require!(args.deadline >= env.now, PoolError::InvalidTransaction);
            let amount_in = self.rates.quote_in(&args.path, args.amount_out)?;
            require!(amount_in <= args.amount_in_max, PoolError::InvalidAmount);
            self.swap(env, &args.path, amount_in, args.amount_out, args.to)
        } else if sel == selector(ADD_LIQUIDITY) {
            let args: AddLiquidity = decode_args(args)?;
            self.add_liquidity(env, args)
        } else if sel == selector(REMOVE_LIQUIDITY) {
            let args: RemoveLiquidity = decode_args(args)?;
            self.remove_liquidity(env, args)
        } else {
            err!(PoolError::InvalidTransactionData)
        }
    }

    fn view(&self, _tokens: &TokenLedger, data: &[u8]) -> Result<Vec<u8>> {
        let (sel, args) = split_selector(data)?;
        require!(sel == selector(PAIR_FOR), PoolError::InvalidTransactionData);

        let args: PairFor = decode_args(args)?;
        let lp_token = self
            .pairs
            .get(&pair_key(args.token_a, args.token_b))
            .map(|pair| pair.lp_token);
        Ok(encode_return(&lp_token))
    }

    fn box_clone(&self) -> Box<dyn ExternalContract> {
        Box::new(self.clone())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
