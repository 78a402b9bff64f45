use anchor_lang::prelude::*;

use crate::asset_guards::WithdrawPlan;
use crate::constants::PRECISION;
use crate::context::ValuationContext;
use crate::errors::PoolError;
use crate::events::{Withdrawal, WithdrawnAsset};
use crate::guards::AfterTxContext;
use crate::instructions::manager_fee::mint_available_fee;
use crate::math::mul_div;
use crate::DHedge;

/// Burn shares and pay out the investor's pro-rata slice of every asset
///
/// Security checklist:
/// 1. PAUSE: Rejected while the factory is paused
/// 2. COOLDOWN: No withdrawal before `last_deposit + exit_cooldown`
/// 3. BALANCE: Cannot burn more shares than held
/// 4. PORTION: Computed from the supply BEFORE burning
/// 5. BUSINESS LOGIC: Shares burned before any asset leaves the pool
/// 6. EVENTS: Emits Withdrawal with before/after accounting
pub fn handler(
    world: &mut DHedge,
    pool: Pubkey,
    investor: Pubkey,
    fund_token_amount: u128,
) -> Result<Vec<WithdrawnAsset>> {
    let DHedge {
        chain,
        factory,
        governance,
        asset_handler,
        tracker,
        events,
    } = world;

    // CHECKS: Pool state, cooldown and balance
    factory.require_not_paused()?;
    let config = factory.config.clone();
    let fund = factory.fund_mut(&pool)?;
    let now = chain.now;

    require!(fund_token_amount > 0, PoolError::InvalidAmount);
    require!(
        fund.logic.balance_of(&investor) >= fund_token_amount,
        PoolError::InsufficientBalance
    );
    fund.logic
        .require_cooldown_elapsed(&investor, now, config.exit_cooldown)?;

    let (fund_value_before, total_supply_before, portion, plans) = {
        let view = ValuationContext::new(chain, governance, asset_handler, tracker);

        let fund_value_before = mint_available_fee(fund, &view, &config, events)?;
        let total_supply_before = fund.logic.total_supply;
        let portion = fund.logic.portion_of(fund_token_amount)?;

        let mut plans: Vec<WithdrawPlan> = Vec::new();
        for asset in fund.manager_logic.supported_assets() {
            let plan = view.asset_guard(&asset.asset)?.withdraw_processing(
                &view,
                pool,
                asset.asset,
                portion,
                investor,
            )?;
            plans.push(plan);
        }
        (fund_value_before, total_supply_before, portion, plans)
    };

    // EFFECTS: Burn shares BEFORE any transfer out
    fund.logic.burn(&investor, fund_token_amount)?;

    // INTERACTIONS: Unwind external positions, then pay out
    let mut withdrawn_assets = Vec::with_capacity(plans.len());
    for plan in plans {
        let external_withdraw_processed = !plan.transactions.is_empty();

        for tx in &plan.transactions {
            let return_data = chain.call(pool, tx.to, &tx.data).map_err(|e| {
                msg!("Withdraw transaction to {} failed: {}", tx.to, e);
                error!(PoolError::FailedToWithdrawTokens)
            })?;

            if let Some(registered) = governance.get_contract_guard(&tx.to) {
                let mut after_ctx = AfterTxContext {
                    pool,
                    chain: &*chain,
                    governance: &*governance,
                    tracker: &mut *tracker,
                };
                registered
                    .guard
                    .after_tx_guard(&mut after_ctx, tx.to, &tx.data, &return_data)?;
            }
        }

        if plan.withdraw_balance > 0 {
            chain.tokens.transfer(
                &plan.withdraw_asset,
                &pool,
                &investor,
                plan.withdraw_balance,
            )?;
            withdrawn_assets.push(WithdrawnAsset {
                asset: plan.withdraw_asset,
                amount: plan.withdraw_balance,
                external_withdraw_processed,
            });
        }
    }

    let value_withdrawn = mul_div(fund_value_before, portion, PRECISION)?;
    msg!(
        "Withdrawal from {}: {} shares, value {}",
        pool,
        fund_token_amount,
        value_withdrawn
    );
    events.record(Withdrawal {
        pool,
        investor,
        value_withdrawn,
        fund_tokens_withdrawn: fund_token_amount,
        total_investor_fund_tokens: fund.logic.balance_of(&investor),
        fund_value_before,
        fund_value: fund_value_before - value_withdrawn,
        total_supply_before,
        total_supply: fund.logic.total_supply,
        withdrawn_assets: withdrawn_assets.clone(),
        time: now,
    });

    Ok(withdrawn_assets)
}
