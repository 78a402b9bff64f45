use anchor_lang::prelude::*;

use crate::errors::PoolError;
use crate::guards::GuardContext;

/// The asset must be in the pool's supported set
pub fn require_supported(ctx: &GuardContext, asset: &Pubkey, error: PoolError) -> Result<()> {
    if !ctx.is_supported_asset(asset) {
        msg!("Rejected asset {} for pool {}", asset, ctx.pool);
        return Err(error.into());
    }
    Ok(())
}

/// Tokens produced by the call must land in the pool
pub fn require_recipient_is_pool(ctx: &GuardContext, recipient: &Pubkey) -> Result<()> {
    require_keys_eq!(*recipient, ctx.pool, PoolError::RecipientIsNotPool);
    Ok(())
}

/// Validate a swap path and return its (source, destination) assets
///
/// Source and destination must be supported, and so must every hop in
/// between.
pub fn require_swap_path(ctx: &GuardContext, path: &[Pubkey]) -> Result<(Pubkey, Pubkey)> {
    require!(path.len() >= 2, PoolError::InvalidTransactionData);

    let source = path[0];
    let destination = path[path.len() - 1];

    require_supported(ctx, &source, PoolError::UnsupportedSourceAsset)?;
    for hop in &path[1..path.len() - 1] {
        require_supported(ctx, hop, PoolError::InvalidRoutingAsset)?;
    }
    require_supported(ctx, &destination, PoolError::UnsupportedDestinationAsset)?;

    Ok((source, destination))
}

/// Approvals are only granted to contracts the protocol has a guard for
pub fn require_supported_spender(ctx: &GuardContext, spender: &Pubkey) -> Result<()> {
    require!(
        ctx.view.governance.get_contract_guard(spender).is_some(),
        PoolError::UnsupportedSpenderApproval
    );
    Ok(())
}
