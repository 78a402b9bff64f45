use anchor_lang::prelude::*;

use crate::asset_guards::AssetGuard;
use crate::context::ValuationContext;
use crate::errors::PoolError;
use crate::events::{EventLog, TransactionExecuted};
use crate::guards::{AfterTxContext, ContractGuard, GuardContext, GuardOutcome};
use crate::DHedge;

/// The guard that vets a call: the asset guard when the target is one of
/// the pool's assets, otherwise the target's contract guard
enum SelectedGuard<'a> {
    Asset(&'a dyn AssetGuard),
    Contract(&'a dyn ContractGuard),
}

impl<'a> SelectedGuard<'a> {
    fn tx_guard(
        &self,
        ctx: &GuardContext,
        events: &mut EventLog,
        to: Pubkey,
        data: &[u8],
    ) -> Result<GuardOutcome> {
        match self {
            SelectedGuard::Asset(guard) => guard.tx_guard(ctx, events, to, data),
            SelectedGuard::Contract(guard) => guard.tx_guard(ctx, events, to, data),
        }
    }

    fn after_tx_guard(
        &self,
        ctx: &mut AfterTxContext,
        to: Pubkey,
        data: &[u8],
        return_data: &[u8],
    ) -> Result<()> {
        match self {
            SelectedGuard::Asset(guard) => guard.after_tx_guard(ctx, to, data, return_data),
            SelectedGuard::Contract(guard) => guard.after_tx_guard(ctx, to, data, return_data),
        }
    }
}

/// Forward a guarded external call on behalf of the pool
///
/// Security checklist:
/// 1. PAUSE: Rejected while the factory is paused
/// 2. DESTINATION: No zero address, no calls into the pool itself or its manager logic
/// 3. POLICY: Unregistered targets are denied; the guard's revert reason propagates
/// 4. CLASSIFICATION: Calls the guard does not recognise are refused
/// 5. ACCESS: Manager or trader, unless the guard marks the call public
/// 6. EVENTS: Emits TransactionExecuted
pub fn handler(
    world: &mut DHedge,
    pool: Pubkey,
    caller: Pubkey,
    to: Pubkey,
    data: Vec<u8>,
) -> Result<Vec<u8>> {
    let DHedge {
        chain,
        factory,
        governance,
        asset_handler,
        tracker,
        events,
    } = world;

    // CHECKS: Pool state and destination
    factory.require_not_paused()?;
    require_keys_neq!(to, Pubkey::default(), PoolError::NonZeroAddressRequired);

    let fund = factory.fund(&pool)?;
    let manager_logic = &fund.manager_logic;
    if to == pool || to == manager_logic.address {
        msg!("Pool {} may not call itself ({})", pool, to);
        return err!(PoolError::InvalidDestination);
    }

    // CHECKS: Guard policy
    let guard = if manager_logic.is_supported_asset(&to) {
        let asset_type = asset_handler.get_asset_type(&to)?;
        let registered = governance
            .get_asset_guard(asset_type)
            .ok_or(error!(PoolError::InvalidAsset))?;
        SelectedGuard::Asset(registered.guard.as_ref())
    } else {
        match governance.get_contract_guard(&to) {
            Some(registered) => SelectedGuard::Contract(registered.guard.as_ref()),
            None => {
                msg!("No guard registered for {}", to);
                return err!(PoolError::InvalidDestinationOrAssetNotSupported);
            }
        }
    };

    let outcome = {
        let ctx = GuardContext {
            pool,
            manager_logic,
            config: &factory.config,
            view: ValuationContext::new(chain, governance, asset_handler, tracker),
        };
        guard.tx_guard(&ctx, events, to, &data)?
    };

    require!(outcome.is_classified(), PoolError::InvalidTransaction);
    if !outcome.is_public {
        manager_logic.require_manager_or_trader(&caller)?;
    }

    // INTERACTIONS: Forward the call as the pool
    let return_data = chain.call(pool, to, &data).map_err(|e| {
        msg!("Call from {} to {} reverted: {}", pool, to, e);
        error!(PoolError::FailedToExecuteCall)
    })?;

    let mut after_ctx = AfterTxContext {
        pool,
        chain: &*chain,
        governance: &*governance,
        tracker: &mut *tracker,
    };
    guard.after_tx_guard(&mut after_ctx, to, &data, &return_data)?;

    events.record(TransactionExecuted {
        pool,
        manager: manager_logic.manager,
        transaction_type: outcome.tx_type,
        time: chain.now,
    });

    Ok(return_data)
}
