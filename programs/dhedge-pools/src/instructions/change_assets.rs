use anchor_lang::prelude::*;

use crate::context::ValuationContext;
use crate::errors::PoolError;
use crate::events::{AssetAdded, AssetRemoved, EventLog};
use crate::state::{Asset, FactoryConfig, PoolManagerLogic};
use crate::DHedge;

/// Apply removals, then additions, to a pool's supported-asset set
///
/// Removals are vetoed by the asset's guard while the pool still holds
/// any of it. Additions need a registered asset whose type has a guard.
pub fn apply_asset_changes(
    manager_logic: &mut PoolManagerLogic,
    view: &ValuationContext,
    config: &FactoryConfig,
    events: &mut EventLog,
    add: &[Asset],
    remove: &[Pubkey],
) -> Result<()> {
    for asset in remove {
        require!(
            manager_logic.is_supported_asset(asset),
            PoolError::UnsupportedAsset
        );
        view.asset_guard(asset)?
            .remove_asset_check(view, manager_logic.pool, *asset)?;
        manager_logic.remove_supported_asset(asset)?;

        events.record(AssetRemoved {
            pool_manager_logic: manager_logic.address,
            asset: *asset,
        });
    }

    for asset in add {
        // Resolving the guard also proves the asset is registered
        view.asset_guard(&asset.asset)?;
        manager_logic.add_supported_asset(*asset, config.maximum_supported_asset_count)?;

        events.record(AssetAdded {
            pool_manager_logic: manager_logic.address,
            asset: asset.asset,
            is_deposit: asset.is_deposit,
        });
    }

    require!(
        manager_logic.has_deposit_asset(),
        PoolError::AtLeastOneDepositAsset
    );
    Ok(())
}

pub fn handler(
    world: &mut DHedge,
    pool: Pubkey,
    caller: Pubkey,
    add: Vec<Asset>,
    remove: Vec<Pubkey>,
) -> Result<()> {
    let DHedge {
        chain,
        factory,
        governance,
        asset_handler,
        tracker,
        events,
    } = world;

    // CHECKS: Role
    let config = factory.config.clone();
    let fund = factory.fund_mut(&pool)?;
    fund.manager_logic.require_manager_or_trader(&caller)?;

    msg!(
        "Changing assets of {}: +{} -{}",
        pool,
        add.len(),
        remove.len()
    );

    // EFFECTS: Supported-asset set
    let view = ValuationContext::new(chain, governance, asset_handler, tracker);
    apply_asset_changes(&mut fund.manager_logic, &view, &config, events, &add, &remove)
}
