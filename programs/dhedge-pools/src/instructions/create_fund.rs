use anchor_lang::prelude::*;

use crate::constants::{MAX_POOL_NAME_LENGTH, MAX_POOL_SYMBOL_LENGTH};
use crate::context::ValuationContext;
use crate::errors::PoolError;
use crate::events::FundCreated;
use crate::instructions::change_assets::apply_asset_changes;
use crate::state::{Asset, Fund, PoolLogic, PoolManagerLogic};
use crate::DHedge;

/// Parameters of a new pool
#[derive(Clone, Debug)]
pub struct CreateFundParams {
    pub manager: Pubkey,
    pub name: String,
    pub symbol: String,
    pub is_private: bool,
    pub manager_fee_numerator: u128,
    pub assets: Vec<Asset>,
}

/// Deploy a pool and its manager logic, returns (pool, manager logic)
pub fn handler(world: &mut DHedge, params: CreateFundParams) -> Result<(Pubkey, Pubkey)> {
    let DHedge {
        chain,
        factory,
        governance,
        asset_handler,
        tracker,
        events,
    } = world;

    // CHECKS: Protocol state and parameters
    factory.require_not_paused()?;
    require_keys_neq!(params.manager, Pubkey::default(), PoolError::NonZeroAddressRequired);
    require!(params.name.len() <= MAX_POOL_NAME_LENGTH, PoolError::NameTooLong);
    require!(params.symbol.len() <= MAX_POOL_SYMBOL_LENGTH, PoolError::NameTooLong);

    let config = factory.config.clone();
    if params.manager_fee_numerator > config.maximum_manager_fee {
        msg!(
            "Manager fee {}/{} above maximum {}",
            params.manager_fee_numerator,
            config.manager_fee_denominator,
            config.maximum_manager_fee
        );
        return err!(PoolError::InvalidFraction);
    }

    // EFFECTS: Build the pair and register it
    let (pool, manager_logic_address) = factory.next_addresses(&params.manager);
    let logic = PoolLogic::new(
        pool,
        manager_logic_address,
        params.name.clone(),
        params.symbol.clone(),
        params.is_private,
        chain.now,
    );
    let mut manager_logic = PoolManagerLogic::new(
        manager_logic_address,
        pool,
        params.manager,
        params.manager_fee_numerator,
        config.manager_fee_denominator,
    );

    let view = ValuationContext::new(chain, governance, asset_handler, tracker);
    apply_asset_changes(&mut manager_logic, &view, &config, events, &params.assets, &[])?;

    factory.register_fund(Fund {
        logic,
        manager_logic,
    });

    msg!("Fund {} created by {}", pool, params.manager);
    events.record(FundCreated {
        pool,
        pool_manager_logic: manager_logic_address,
        manager: params.manager,
        name: params.name,
        symbol: params.symbol,
        is_private: params.is_private,
        manager_fee_numerator: params.manager_fee_numerator,
        manager_fee_denominator: config.manager_fee_denominator,
        time: view.now(),
    });

    Ok((pool, manager_logic_address))
}
