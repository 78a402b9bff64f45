use anchor_lang::prelude::*;

use crate::constants::PRECISION;
use crate::context::ValuationContext;
use crate::errors::PoolError;
use crate::events::Deposit;
use crate::instructions::manager_fee::mint_available_fee;
use crate::DHedge;

/// Deposit a supported deposit asset and receive pool shares
///
/// Security checklist:
/// 1. PAUSE: Rejected while the factory is paused
/// 2. ACCESS: Private pools only admit the manager and members
/// 3. ASSET: Only assets flagged as deposit assets
/// 4. VALUATION: Fund value computed fresh, after the fee mint
/// 5. MATH SAFETY: 256-bit intermediates for share calculation
/// 6. BUSINESS LOGIC: Checks-effects-interactions pattern
/// 7. EVENTS: Emits Deposit with before/after accounting
pub fn handler(
    world: &mut DHedge,
    pool: Pubkey,
    investor: Pubkey,
    asset: Pubkey,
    amount: u128,
) -> Result<u128> {
    let DHedge {
        chain,
        factory,
        governance,
        asset_handler,
        tracker,
        events,
    } = world;

    // CHECKS: Pool state, access and asset
    factory.require_not_paused()?;
    let config = factory.config.clone();
    let fund = factory.fund_mut(&pool)?;

    if fund.logic.is_private && !fund.manager_logic.is_member_allowed(&investor) {
        msg!("Deposit by non-member {} into private pool {}", investor, pool);
        return err!(PoolError::OnlyMembersAllowed);
    }
    require!(
        fund.manager_logic.is_deposit_asset(&asset),
        PoolError::InvalidDepositAsset
    );
    require!(amount > 0, PoolError::InvalidAmount);

    let now = chain.now;
    let (fund_value_before, total_supply_before, value_deposited, shares) = {
        let view = ValuationContext::new(chain, governance, asset_handler, tracker);

        // Accrued fee is minted at the pre-deposit price
        let fund_value_before = mint_available_fee(fund, &view, &config, events)?;
        let total_supply_before = fund.logic.total_supply;

        let value_deposited = fund.manager_logic.asset_value(&view, &asset, amount)?;
        let shares = fund
            .logic
            .shares_for_deposit(value_deposited, fund_value_before)?;
        (fund_value_before, total_supply_before, value_deposited, shares)
    };
    require!(shares > 0, PoolError::InvalidAmount);

    // EFFECTS: Mint shares and start the cooldown BEFORE pulling tokens
    if total_supply_before == 0 {
        fund.logic.token_price_at_last_fee_mint = PRECISION;
        fund.logic.last_fee_mint_time = now;
    }
    fund.logic.mint(&investor, shares)?;
    fund.logic.record_deposit(&investor, now);

    // INTERACTIONS: Pull the deposit, the pool spends the investor's allowance
    chain
        .tokens
        .transfer_from(&asset, &pool, &investor, &pool, amount)?;

    msg!(
        "Deposit into {}: {} of {} for {} shares",
        pool,
        amount,
        asset,
        shares
    );
    events.record(Deposit {
        pool,
        investor,
        asset_deposited: asset,
        amount_deposited: amount,
        value_deposited,
        fund_tokens_received: shares,
        total_investor_fund_tokens: fund.logic.balance_of(&investor),
        fund_value_before,
        fund_value: fund_value_before
            .checked_add(value_deposited)
            .ok_or(error!(PoolError::MathOverflow))?,
        total_supply_before,
        total_supply: fund.logic.total_supply,
        time: now,
    });

    Ok(shares)
}
