use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::constants::PRECISION;
use crate::errors::PoolError;
use crate::math::mul_div;

/// Per-pool share token and fee accounting
///
/// Security considerations:
/// - Share balances always sum to `total_supply`
/// - Cooldown timestamps are stored per investor and refreshed on deposit
/// - Fee high-water mark only moves up
#[derive(Clone, Debug)]
pub struct PoolLogic {
    pub address: Pubkey,
    pub manager_logic: Pubkey,
    pub name: String,
    pub symbol: String,
    pub is_private: bool,
    pub creation_time: i64,

    /// Shares outstanding, 18 decimals
    pub total_supply: u128,

    /// Token price (18 decimals) at the last fee mint, the high-water mark
    pub token_price_at_last_fee_mint: u128,
    pub last_fee_mint_time: i64,

    balances: BTreeMap<Pubkey, u128>,
    last_deposit: BTreeMap<Pubkey, i64>,
}

impl PoolLogic {
    pub fn new(
        address: Pubkey,
        manager_logic: Pubkey,
        name: String,
        symbol: String,
        is_private: bool,
        now: i64,
    ) -> Self {
        Self {
            address,
            manager_logic,
            name,
            symbol,
            is_private,
            creation_time: now,
            total_supply: 0,
            token_price_at_last_fee_mint: 0,
            last_fee_mint_time: now,
            balances: BTreeMap::new(),
            last_deposit: BTreeMap::new(),
        }
    }

    pub fn balance_of(&self, holder: &Pubkey) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    pub fn mint(&mut self, to: &Pubkey, amount: u128) -> Result<()> {
        let balance = self.balances.entry(*to).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(error!(PoolError::MathOverflow))?;
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(error!(PoolError::MathOverflow))?;
        Ok(())
    }

    pub fn burn(&mut self, from: &Pubkey, amount: u128) -> Result<()> {
        let balance = self.balance_of(from);
        require!(balance >= amount, PoolError::InsufficientBalance);
        self.balances.insert(*from, balance - amount);
        self.total_supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(error!(PoolError::MathOverflow))?;
        Ok(())
    }

    /// Move shares between holders; the supply is untouched
    pub fn move_shares(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<()> {
        let balance = self.balance_of(from);
        require!(balance >= amount, PoolError::InsufficientBalance);
        self.balances.insert(*from, balance - amount);
        let receiver = self.balances.entry(*to).or_insert(0);
        *receiver = receiver
            .checked_add(amount)
            .ok_or(error!(PoolError::MathOverflow))?;
        Ok(())
    }

    pub fn record_deposit(&mut self, investor: &Pubkey, now: i64) {
        self.last_deposit.insert(*investor, now);
    }

    pub fn last_deposit(&self, investor: &Pubkey) -> i64 {
        self.last_deposit.get(investor).copied().unwrap_or(0)
    }

    /// Seconds until `investor` may withdraw or transfer, 0 when free
    pub fn exit_remaining_cooldown(&self, investor: &Pubkey, now: i64, exit_cooldown: i64) -> i64 {
        let cooldown_end = self.last_deposit(investor).saturating_add(exit_cooldown);
        (cooldown_end - now).max(0)
    }

    pub fn require_cooldown_elapsed(
        &self,
        investor: &Pubkey,
        now: i64,
        exit_cooldown: i64,
    ) -> Result<()> {
        let remaining = self.exit_remaining_cooldown(investor, now, exit_cooldown);
        if remaining > 0 {
            msg!("Cooldown active for {}: {}s remaining", investor, remaining);
            return err!(PoolError::CooldownActive);
        }
        Ok(())
    }

    /// Fund value per share, 18 decimals; 0 while there are no shares
    pub fn token_price(&self, fund_value: u128) -> Result<u128> {
        if self.total_supply == 0 {
            return Ok(0);
        }
        mul_div(fund_value, PRECISION, self.total_supply)
    }

    /// Shares minted for a deposit worth `value_deposited`
    ///
    /// - First deposit: shares = value (1:1 bootstrap)
    /// - Otherwise: shares = value * supply / fund value before the deposit
    pub fn shares_for_deposit(
        &self,
        value_deposited: u128,
        fund_value_before: u128,
    ) -> Result<u128> {
        if self.total_supply == 0 {
            return Ok(value_deposited);
        }
        require!(fund_value_before > 0, PoolError::FundValueIsZero);
        mul_div(value_deposited, self.total_supply, fund_value_before)
    }

    /// Fraction of the pool `shares` represent, 18 decimals
    pub fn portion_of(&self, shares: u128) -> Result<u128> {
        mul_div(shares, PRECISION, self.total_supply)
    }

    /// Performance fee owed in shares
    ///
    /// fee = (price - high_water_mark) * supply * numerator / denominator / price
    pub fn available_manager_fee(
        &self,
        fund_value: u128,
        fee_numerator: u128,
        fee_denominator: u128,
    ) -> Result<u128> {
        if self.total_supply == 0 || fund_value == 0 || fee_numerator == 0 {
            return Ok(0);
        }

        let price = self.token_price(fund_value)?;
        if price <= self.token_price_at_last_fee_mint {
            return Ok(0);
        }

        let gain_in_shares = mul_div(
            price - self.token_price_at_last_fee_mint,
            self.total_supply,
            price,
        )?;
        mul_div(gain_in_shares, fee_numerator, fee_denominator)
    }
}

/// Split a fee between the dao and the manager: (dao, manager)
pub fn split_fee(
    available: u128,
    dao_numerator: u128,
    dao_denominator: u128,
) -> Result<(u128, u128)> {
    let dao_fee = mul_div(available, dao_numerator, dao_denominator)?;
    Ok((dao_fee, available - dao_fee))
}
