use anchor_lang::prelude::*;

use crate::errors::PoolError;
use crate::events::TraderSet;
use crate::DHedge;

/// Delegate trading to `trader`; the trader can execute guarded calls and
/// change assets but not fees, members or roles
pub fn set_handler(world: &mut DHedge, pool: Pubkey, caller: Pubkey, trader: Pubkey) -> Result<()> {
    let fund = world.factory.fund_mut(&pool)?;

    // CHECKS
    fund.manager_logic.require_manager(&caller)?;
    require_keys_neq!(trader, Pubkey::default(), PoolError::NonZeroAddressRequired);

    // EFFECTS
    fund.manager_logic.trader = Some(trader);
    msg!("Trader of {} set to {}", pool, trader);

    world.events.record(TraderSet {
        pool_manager_logic: fund.manager_logic.address,
        trader: Some(trader),
    });
    Ok(())
}

pub fn remove_handler(world: &mut DHedge, pool: Pubkey, caller: Pubkey) -> Result<()> {
    let fund = world.factory.fund_mut(&pool)?;
    fund.manager_logic.require_manager(&caller)?;

    fund.manager_logic.trader = None;
    world.events.record(TraderSet {
        pool_manager_logic: fund.manager_logic.address,
        trader: None,
    });
    Ok(())
}
