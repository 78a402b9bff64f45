use anchor_lang::prelude::*;

use crate::errors::PoolError;
use crate::events::{EventLog, ExchangeFrom, ExchangeTo, LiquidityAdded, LiquidityRemoved};
use crate::guards::validation::{require_recipient_is_pool, require_supported, require_swap_path};
use crate::guards::{ContractGuard, GuardContext, GuardOutcome, TransactionType};
use crate::interfaces::uniswap_v2::{
    AddLiquidity, PairFor, RemoveLiquidity, SwapExactTokensForTokens, SwapTokensForExactTokens,
    ADD_LIQUIDITY, PAIR_FOR, REMOVE_LIQUIDITY, SWAP_EXACT_TOKENS_FOR_TOKENS,
    SWAP_TOKENS_FOR_EXACT_TOKENS,
};
use crate::interfaces::{decode_args, decode_return, encode_call, selector, split_selector};

/// Guard for a Uniswap V2 style router: path swaps and pair liquidity
#[derive(Clone, Copy, Debug, Default)]
pub struct UniswapV2RouterGuard;

impl UniswapV2RouterGuard {
    /// Both pair tokens and the pair's LP token must be supported
    fn check_pair(
        &self,
        ctx: &GuardContext,
        router: Pubkey,
        token_a: Pubkey,
        token_b: Pubkey,
    ) -> Result<Pubkey> {
        require_supported(ctx, &token_a, PoolError::UnsupportedAssetTokenA)?;
        require_supported(ctx, &token_b, PoolError::UnsupportedAssetTokenB)?;

        let query = encode_call(PAIR_FOR, &PairFor { token_a, token_b });
        let pair: Option<Pubkey> = decode_return(&ctx.view.chain.static_call(router, &query)?)?;
        let pair = pair.ok_or(error!(PoolError::UnsupportedLpAsset))?;
        require_supported(ctx, &pair, PoolError::UnsupportedLpAsset)?;

        Ok(pair)
    }
}

impl ContractGuard for UniswapV2RouterGuard {
    fn tx_guard(
        &self,
        ctx: &GuardContext,
        events: &mut EventLog,
        to: Pubkey,
        data: &[u8],
    ) -> Result<GuardOutcome> {
        let (sel, args) = split_selector(data)?;

        if sel == selector(SWAP_EXACT_TOKENS_FOR_TOKENS) {
            let args: SwapExactTokensForTokens = decode_args(args)?;
            let (source_asset, destination_asset) = require_swap_path(ctx, &args.path)?;
            require_recipient_is_pool(ctx, &args.to)?;

            events.record(ExchangeFrom {
                pool: ctx.pool,
                source_asset,
                source_amount: args.amount_in,
                destination_asset,
                time: ctx.now(),
            });
            return Ok(GuardOutcome::restricted(TransactionType::Exchange));
        }

        if sel == selector(SWAP_TOKENS_FOR_EXACT_TOKENS) {
            let args: SwapTokensForExactTokens = decode_args(args)?;
            let (source_asset, destination_asset) = require_swap_path(ctx, &args.path)?;
            require_recipient_is_pool(ctx, &args.to)?;

            events.record(ExchangeTo {
                pool: ctx.pool,
                source_asset,
                destination_asset,
                destination_amount: args.amount_out,
                time: ctx.now(),
            });
            return Ok(GuardOutcome::restricted(TransactionType::Exchange));
        }

        if sel == selector(ADD_LIQUIDITY) {
            let args: AddLiquidity = decode_args(args)?;
            let pair = self.check_pair(ctx, to, args.token_a, args.token_b)?;
            require_recipient_is_pool(ctx, &args.to)?;

            events.record(LiquidityAdded {
                pool: ctx.pool,
                pair,
                token_a: args.token_a,
                token_b: args.token_b,
                amount_a: args.amount_a_desired,
                amount_b: args.amount_b_desired,
                time: ctx.now(),
            });
            return Ok(GuardOutcome::restricted(TransactionType::AddLiquidity));
        }

        if sel == selector(REMOVE_LIQUIDITY) {
            let args: RemoveLiquidity = decode_args(args)?;
            let pair = self.check_pair(ctx, to, args.token_a, args.token_b)?;
            require_recipient_is_pool(ctx, &args.to)?;

            events.record(LiquidityRemoved {
                pool: ctx.pool,
                pair,
                token_a: args.token_a,
                token_b: args.token_b,
                liquidity: args.liquidity,
                time: ctx.now(),
            });
            return Ok(GuardOutcome::restricted(TransactionType::RemoveLiquidity));
        }

        Ok(GuardOutcome::unclassified())
    }
}
