use anchor_lang::prelude::*;

use crate::errors::PoolError;
use crate::events::{EventLog, ExchangeFrom, ExchangeTo};
use crate::guards::validation::{require_recipient_is_pool, require_supported, require_swap_path};
use crate::guards::{ContractGuard, GuardContext, GuardOutcome, TransactionType};
use crate::interfaces::uniswap_v3::{
    ExactInput, ExactInputSingle, ExactOutputSingle, Multicall, EXACT_INPUT, EXACT_INPUT_SINGLE,
    EXACT_OUTPUT_SINGLE, MULTICALL,
};
use crate::interfaces::{decode_args, selector, split_selector};

/// Guard for a Uniswap V3 style swap router
///
/// `multicall` batches are decomposed and every inner call goes through
/// the same checks as a direct call. A single unrecognised inner call
/// rejects the whole batch, and batches do not nest.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniswapV3RouterGuard;

impl UniswapV3RouterGuard {
    fn check_single_hop(
        &self,
        ctx: &GuardContext,
        token_in: &Pubkey,
        token_out: &Pubkey,
        recipient: &Pubkey,
    ) -> Result<()> {
        require_supported(ctx, token_in, PoolError::UnsupportedSourceAsset)?;
        require_supported(ctx, token_out, PoolError::UnsupportedDestinationAsset)?;
        require_recipient_is_pool(ctx, recipient)
    }
}

impl ContractGuard for UniswapV3RouterGuard {
    fn tx_guard(
        &self,
        ctx: &GuardContext,
        events: &mut EventLog,
        to: Pubkey,
        data: &[u8],
    ) -> Result<GuardOutcome> {
        let (sel, args) = split_selector(data)?;

        if sel == selector(EXACT_INPUT_SINGLE) {
            let args: ExactInputSingle = decode_args(args)?;
            self.check_single_hop(ctx, &args.token_in, &args.token_out, &args.recipient)?;

            events.record(ExchangeFrom {
                pool: ctx.pool,
                source_asset: args.token_in,
                source_amount: args.amount_in,
                destination_asset: args.token_out,
                time: ctx.now(),
            });
            return Ok(GuardOutcome::restricted(TransactionType::Exchange));
        }

        if sel == selector(EXACT_INPUT) {
            let args: ExactInput = decode_args(args)?;
            require!(
                args.fees.len() + 1 == args.path.len(),
                PoolError::InvalidTransactionData
            );
            let (source_asset, destination_asset) = require_swap_path(ctx, &args.path)?;
            require_recipient_is_pool(ctx, &args.recipient)?;

            events.record(ExchangeFrom {
                pool: ctx.pool,
                source_asset,
                source_amount: args.amount_in,
                destination_asset,
                time: ctx.now(),
            });
            return Ok(GuardOutcome::restricted(TransactionType::Exchange));
        }

        if sel == selector(EXACT_OUTPUT_SINGLE) {
            let args: ExactOutputSingle = decode_args(args)?;
            self.check_single_hop(ctx, &args.token_in, &args.token_out, &args.recipient)?;

            events.record(ExchangeTo {
                pool: ctx.pool,
                source_asset: args.token_in,
                destination_asset: args.token_out,
                destination_amount: args.amount_out,
                time: ctx.now(),
            });
            return Ok(GuardOutcome::restricted(TransactionType::Exchange));
        }

        if sel == selector(MULTICALL) {
            let args: Multicall = decode_args(args)?;
            require!(!args.data.is_empty(), PoolError::InvalidTransaction);

            for inner in &args.data {
                let (inner_sel, _) = split_selector(inner)?;
                if inner_sel == selector(MULTICALL) {
                    msg!("Multicall rejected: nested multicall");
                    return err!(PoolError::InvalidTransaction);
                }
                let outcome = self.tx_guard(ctx, events, to, inner)?;
                if !outcome.is_classified() {
                    msg!("Multicall rejected: unrecognised inner call");
                    return err!(PoolError::InvalidTransaction);
                }
            }
            return Ok(GuardOutcome::restricted(TransactionType::Multicall));
        }

        Ok(GuardOutcome::unclassified())
    }
}
