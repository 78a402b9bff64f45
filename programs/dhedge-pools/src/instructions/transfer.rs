use anchor_lang::prelude::*;

use crate::errors::PoolError;
use crate::events::PoolTokenTransfer;
use crate::DHedge;

/// Transfer pool shares; the sender's exit cooldown applies to transfers
/// as it does to withdrawals
pub fn handler(
    world: &mut DHedge,
    pool: Pubkey,
    from: Pubkey,
    to: Pubkey,
    amount: u128,
) -> Result<()> {
    let now = world.chain.now;
    let exit_cooldown = world.factory.config.exit_cooldown;
    let fund = world.factory.fund_mut(&pool)?;

    // CHECKS
    require_keys_neq!(to, Pubkey::default(), PoolError::NonZeroAddressRequired);
    require!(amount > 0, PoolError::InvalidAmount);
    fund.logic.require_cooldown_elapsed(&from, now, exit_cooldown)?;

    // EFFECTS
    fund.logic.move_shares(&from, &to, amount)?;

    world.events.record(PoolTokenTransfer {
        pool,
        from,
        to,
        amount,
    });
    Ok(())
}
