use anchor_lang::prelude::*;

use crate::context::ValuationContext;
use crate::errors::PoolError;
use crate::events::{
    EventLog, ManagerFeeIncreaseAnnounced, ManagerFeeIncreaseRenounced, ManagerFeeMinted,
    ManagerFeeSet,
};
use crate::state::{split_fee, FactoryConfig, Fund};
use crate::DHedge;

/// Mint the performance fee accrued since the last mint
///
/// Returns the fund value the fee was computed from, which minting
/// shares does not change.
pub fn mint_available_fee(
    fund: &mut Fund,
    view: &ValuationContext,
    config: &FactoryConfig,
    events: &mut EventLog,
) -> Result<u128> {
    let fund_value = fund.manager_logic.total_fund_value(view)?;
    let available = fund.logic.available_manager_fee(
        fund_value,
        fund.manager_logic.manager_fee_numerator,
        fund.manager_logic.manager_fee_denominator,
    )?;
    if available == 0 {
        // Gains made while no fee is charged are never charged later
        if fund.manager_logic.manager_fee_numerator == 0 {
            let token_price = fund.logic.token_price(fund_value)?;
            if token_price > fund.logic.token_price_at_last_fee_mint {
                fund.logic.token_price_at_last_fee_mint = token_price;
            }
        }
        return Ok(fund_value);
    }

    let (dao_fee, manager_fee) = split_fee(
        available,
        config.dao_fee_numerator,
        config.dao_fee_denominator,
    )?;
    let manager = fund.manager_logic.manager;

    // Price is taken before minting: it becomes the new high-water mark
    let token_price = fund.logic.token_price(fund_value)?;
    fund.logic.mint(&config.dao, dao_fee)?;
    fund.logic.mint(&manager, manager_fee)?;
    fund.logic.token_price_at_last_fee_mint = token_price;
    fund.logic.last_fee_mint_time = view.now();

    events.record(ManagerFeeMinted {
        pool: fund.logic.address,
        manager,
        available_fee_in_shares: available,
        dao_fee,
        manager_fee,
        token_price_at_last_fee_mint: token_price,
        time: view.now(),
    });

    Ok(fund_value)
}

/// Anyone may trigger the fee mint
pub fn mint_handler(world: &mut DHedge, pool: Pubkey) -> Result<()> {
    let DHedge {
        chain,
        factory,
        governance,
        asset_handler,
        tracker,
        events,
    } = world;

    factory.require_not_paused()?;
    let config = factory.config.clone();
    let fund = factory.fund_mut(&pool)?;

    let view = ValuationContext::new(chain, governance, asset_handler, tracker);
    mint_available_fee(fund, &view, &config, events)?;
    Ok(())
}

/// Lower the manager fee immediately
///
/// The fee accrued at the old rate is minted first.
pub fn set_handler(
    world: &mut DHedge,
    pool: Pubkey,
    caller: Pubkey,
    numerator: u128,
) -> Result<()> {
    let DHedge {
        chain,
        factory,
        governance,
        asset_handler,
        tracker,
        events,
    } = world;
    let config = factory.config.clone();
    let fund = factory.fund_mut(&pool)?;

    // CHECKS: Manager only; increases must go through the timelock
    fund.manager_logic.require_manager(&caller)?;
    require!(
        numerator <= fund.manager_logic.manager_fee_numerator,
        PoolError::ManagerFeeTooHigh
    );

    // EFFECTS
    let view = ValuationContext::new(chain, governance, asset_handler, tracker);
    mint_available_fee(fund, &view, &config, events)?;
    fund.manager_logic.set_fee_numerator(numerator)?;

    let event = ManagerFeeSet {
        pool_manager_logic: fund.manager_logic.address,
        manager: caller,
        numerator,
        denominator: fund.manager_logic.manager_fee_denominator,
    };
    events.record(event);
    Ok(())
}

pub fn announce_handler(
    world: &mut DHedge,
    pool: Pubkey,
    caller: Pubkey,
    numerator: u128,
) -> Result<()> {
    let now = world.chain.now;
    let config = world.factory.config.clone();
    let fund = world.factory.fund_mut(&pool)?;

    fund.manager_logic.require_manager(&caller)?;
    let activation_time = fund
        .manager_logic
        .announce_fee_increase(numerator, &config, now)?;

    msg!(
        "Fee increase to {} announced for {}, active at {}",
        numerator,
        pool,
        activation_time
    );
    let event = ManagerFeeIncreaseAnnounced {
        pool_manager_logic: fund.manager_logic.address,
        new_numerator: numerator,
        announced_fee_activation_time: activation_time,
    };
    world.events.record(event);
    Ok(())
}

pub fn renounce_handler(world: &mut DHedge, pool: Pubkey, caller: Pubkey) -> Result<()> {
    let fund = world.factory.fund_mut(&pool)?;

    fund.manager_logic.require_manager(&caller)?;
    fund.manager_logic.renounce_fee_increase();

    let event = ManagerFeeIncreaseRenounced {
        pool_manager_logic: fund.manager_logic.address,
    };
    world.events.record(event);
    Ok(())
}

/// Apply an announced fee increase once its delay has passed
///
/// Gains up to now are settled at the old rate before the new one applies.
pub fn commit_handler(world: &mut DHedge, pool: Pubkey, caller: Pubkey) -> Result<()> {
    let DHedge {
        chain,
        factory,
        governance,
        asset_handler,
        tracker,
        events,
    } = world;
    let now = chain.now;
    let config = factory.config.clone();
    let fund = factory.fund_mut(&pool)?;

    // CHECKS
    fund.manager_logic.require_manager(&caller)?;
    fund.manager_logic.require_fee_increase_due(now)?;

    // EFFECTS
    let view = ValuationContext::new(chain, governance, asset_handler, tracker);
    mint_available_fee(fund, &view, &config, events)?;
    let numerator = fund.manager_logic.commit_fee_increase(now)?;

    let event = ManagerFeeSet {
        pool_manager_logic: fund.manager_logic.address,
        manager: caller,
        numerator,
        denominator: fund.manager_logic.manager_fee_denominator,
    };
    events.record(event);
    Ok(())
}
