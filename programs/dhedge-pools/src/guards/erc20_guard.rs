use anchor_lang::prelude::*;

use crate::events::EventLog;
use crate::guards::validation::require_supported_spender;
use crate::guards::{ContractGuard, GuardContext, GuardOutcome, TransactionType};
use crate::interfaces::erc20::{Approve, APPROVE};
use crate::interfaces::{decode_args, selector, split_selector};

/// Guard for calls made directly on a supported token
///
/// Only `approve` is recognised, and only towards a spender the protocol
/// has a contract guard for. Registered as the asset guard of plain
/// ERC-20 assets, so it is what `exec_transaction` uses when the target is
/// one of the pool's own tokens.
#[derive(Clone, Copy, Debug, Default)]
pub struct Erc20Guard;

/// Shared `approve` check for every guard that sits on a token
pub fn guard_approve(ctx: &GuardContext, data: &[u8]) -> Result<GuardOutcome> {
    let (sel, args) = split_selector(data)?;
    if sel != selector(APPROVE) {
        return Ok(GuardOutcome::unclassified());
    }

    let args: Approve = decode_args(args)?;
    require_supported_spender(ctx, &args.spender)?;

    Ok(GuardOutcome::restricted(TransactionType::Approve))
}

impl ContractGuard for Erc20Guard {
    fn tx_guard(
        &self,
        ctx: &GuardContext,
        _events: &mut EventLog,
        _to: Pubkey,
        data: &[u8],
    ) -> Result<GuardOutcome> {
        guard_approve(ctx, data)
    }
}
