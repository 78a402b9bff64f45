use std::collections::BTreeSet;

use anchor_lang::prelude::*;

use crate::context::ValuationContext;
use crate::errors::PoolError;
use crate::math::usd_value;
use crate::state::FactoryConfig;

/// Supported asset entry
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Asset {
    pub asset: Pubkey,
    pub is_deposit: bool,
}

/// One line of `fund_composition`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssetComposition {
    pub asset: Pubkey,
    pub balance: u128,
    pub value: u128,
    pub is_deposit: bool,
}

/// Per-pool configuration: roles, supported assets and fee terms
///
/// Security considerations:
/// - The supported-asset set is the whitelist every guard checks against
/// - Fee increases go through an announce/commit timelock
/// - Members only matter while the pool is private
#[derive(Clone, Debug)]
pub struct PoolManagerLogic {
    pub address: Pubkey,
    pub pool: Pubkey,
    pub manager: Pubkey,
    pub trader: Option<Pubkey>,

    pub manager_fee_numerator: u128,
    pub manager_fee_denominator: u128,

    /// Pending fee increase; `announced_fee_activation_time` is 0 when none
    pub announced_fee_increase_numerator: u128,
    pub announced_fee_activation_time: i64,

    supported_assets: Vec<Asset>,
    members: BTreeSet<Pubkey>,
}

impl PoolManagerLogic {
    pub fn new(
        address: Pubkey,
        pool: Pubkey,
        manager: Pubkey,
        manager_fee_numerator: u128,
        manager_fee_denominator: u128,
    ) -> Self {
        Self {
            address,
            pool,
            manager,
            trader: None,
            manager_fee_numerator,
            manager_fee_denominator,
            announced_fee_increase_numerator: 0,
            announced_fee_activation_time: 0,
            supported_assets: Vec::new(),
            members: BTreeSet::new(),
        }
    }

    // ===== Roles =====

    pub fn require_manager(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(*caller, self.manager, PoolError::OnlyManager);
        Ok(())
    }

    pub fn is_manager_or_trader(&self, caller: &Pubkey) -> bool {
        *caller == self.manager || self.trader == Some(*caller)
    }

    pub fn require_manager_or_trader(&self, caller: &Pubkey) -> Result<()> {
        require!(
            self.is_manager_or_trader(caller),
            PoolError::OnlyManagerOrTrader
        );
        Ok(())
    }

    pub fn is_member(&self, who: &Pubkey) -> bool {
        self.members.contains(who)
    }

    /// The manager counts as a member of their own pool
    pub fn is_member_allowed(&self, who: &Pubkey) -> bool {
        *who == self.manager || self.is_member(who)
    }

    /// Returns whether `member` was newly added
    pub fn add_member(&mut self, member: Pubkey) -> bool {
        self.members.insert(member)
    }

    pub fn remove_member(&mut self, member: &Pubkey) -> bool {
        self.members.remove(member)
    }

    pub fn members(&self) -> impl Iterator<Item = &Pubkey> {
        self.members.iter()
    }

    // ===== Supported assets =====

    pub fn supported_assets(&self) -> &[Asset] {
        &self.supported_assets
    }

    pub fn is_supported_asset(&self, asset: &Pubkey) -> bool {
        self.supported_assets.iter().any(|a| a.asset == *asset)
    }

    pub fn is_deposit_asset(&self, asset: &Pubkey) -> bool {
        self.supported_assets
            .iter()
            .any(|a| a.asset == *asset && a.is_deposit)
    }

    pub fn has_deposit_asset(&self) -> bool {
        self.supported_assets.iter().any(|a| a.is_deposit)
    }

    /// Add `asset`, or update its deposit flag when already supported
    ///
    /// Returns whether the asset is new to the pool.
    pub fn add_supported_asset(&mut self, asset: Asset, maximum_count: usize) -> Result<bool> {
        if let Some(existing) = self
            .supported_assets
            .iter_mut()
            .find(|a| a.asset == asset.asset)
        {
            existing.is_deposit = asset.is_deposit;
            return Ok(false);
        }

        require!(
            self.supported_assets.len() < maximum_count,
            PoolError::MaximumAssetsReached
        );
        self.supported_assets.push(asset);
        Ok(true)
    }

    pub fn remove_supported_asset(&mut self, asset: &Pubkey) -> Result<()> {
        let index = self
            .supported_assets
            .iter()
            .position(|a| a.asset == *asset)
            .ok_or(error!(PoolError::UnsupportedAsset))?;
        self.supported_assets.remove(index);
        Ok(())
    }

    // ===== Manager fee =====

    /// Lowering the fee takes effect immediately
    pub fn set_fee_numerator(&mut self, numerator: u128) -> Result<()> {
        require!(
            numerator <= self.manager_fee_numerator,
            PoolError::ManagerFeeTooHigh
        );
        self.manager_fee_numerator = numerator;
        Ok(())
    }

    /// Start the timelock for a fee increase, returns the activation time
    pub fn announce_fee_increase(
        &mut self,
        numerator: u128,
        config: &FactoryConfig,
        now: i64,
    ) -> Result<i64> {
        let allowed = self
            .manager_fee_numerator
            .checked_add(config.maximum_manager_fee_numerator_change)
            .ok_or(error!(PoolError::MathOverflow))?;
        require!(
            numerator <= config.maximum_manager_fee && numerator <= allowed,
            PoolError::ExceededAllowedIncrease
        );

        let activation_time = now
            .checked_add(config.manager_fee_numerator_change_delay)
            .ok_or(error!(PoolError::MathOverflow))?;
        self.announced_fee_increase_numerator = numerator;
        self.announced_fee_activation_time = activation_time;
        Ok(activation_time)
    }

    pub fn renounce_fee_increase(&mut self) {
        self.announced_fee_increase_numerator = 0;
        self.announced_fee_activation_time = 0;
    }

    /// Fails unless an announced increase has passed its delay
    pub fn require_fee_increase_due(&self, now: i64) -> Result<()> {
        require!(
            self.announced_fee_activation_time != 0,
            PoolError::NoFeeIncreaseAnnounced
        );
        if now < self.announced_fee_activation_time {
            msg!(
                "Fee increase activates at {}, now {}",
                self.announced_fee_activation_time,
                now
            );
            return err!(PoolError::FeeIncreaseDelayActive);
        }
        Ok(())
    }

    pub fn commit_fee_increase(&mut self, now: i64) -> Result<u128> {
        self.require_fee_increase_due(now)?;
        self.manager_fee_numerator = self.announced_fee_increase_numerator;
        self.renounce_fee_increase();
        Ok(self.manager_fee_numerator)
    }

    // ===== Valuation =====

    /// Pool holding of `asset` in its own units, as its asset guard sees it
    pub fn asset_balance(&self, ctx: &ValuationContext, asset: &Pubkey) -> Result<u128> {
        ctx.asset_guard(asset)?.get_balance(ctx, self.pool, *asset)
    }

    /// USD value (18 decimals) of `amount` units of `asset`
    pub fn asset_value(
        &self,
        ctx: &ValuationContext,
        asset: &Pubkey,
        amount: u128,
    ) -> Result<u128> {
        let decimals = ctx.asset_guard(asset)?.get_decimals(ctx, *asset)?;
        let price = ctx.asset_handler.get_usd_price(ctx.chain, asset)?;
        usd_value(amount, price, decimals)
    }

    /// Sum of the USD value of every supported asset
    pub fn total_fund_value(&self, ctx: &ValuationContext) -> Result<u128> {
        let mut total: u128 = 0;
        for asset in &self.supported_assets {
            let balance = self.asset_balance(ctx, &asset.asset)?;
            let value = self.asset_value(ctx, &asset.asset, balance)?;
            total = total
                .checked_add(value)
                .ok_or(error!(PoolError::MathOverflow))?;
        }
        Ok(total)
    }

    pub fn fund_composition(&self, ctx: &ValuationContext) -> Result<Vec<AssetComposition>> {
        self.supported_assets
            .iter()
            .map(|asset| {
                let balance = self.asset_balance(ctx, &asset.asset)?;
                Ok(AssetComposition {
                    asset: asset.asset,
                    balance,
                    value: self.asset_value(ctx, &asset.asset, balance)?,
                    is_deposit: asset.is_deposit,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_manager_logic(fee_numerator: u128) -> PoolManagerLogic {
        PoolManagerLogic::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            fee_numerator,
            10_000,
        )
    }

    fn asset(is_deposit: bool) -> Asset {
        Asset {
            asset: Pubkey::new_unique(),
            is_deposit,
        }
    }

    #[test]
    fn test_readding_asset_updates_deposit_flag() {
        let mut logic = mock_manager_logic(0);
        let usdc = asset(true);
        assert!(logic.add_supported_asset(usdc, 10).unwrap());
        assert!(logic.is_deposit_asset(&usdc.asset));

        let updated = Asset {
            is_deposit: false,
            ..usdc
        };
        assert!(!logic.add_supported_asset(updated, 10).unwrap());
        assert_eq!(logic.supported_assets().len(), 1);
        assert!(logic.is_supported_asset(&usdc.asset));
        assert!(!logic.is_deposit_asset(&usdc.asset));
    }

    #[test]
    fn test_maximum_assets() {
        let mut logic = mock_manager_logic(0);
        logic.add_supported_asset(asset(true), 2).unwrap();
        logic.add_supported_asset(asset(false), 2).unwrap();
        assert_eq!(
            logic.add_supported_asset(asset(false), 2).unwrap_err(),
            anchor_lang::error::Error::from(PoolError::MaximumAssetsReached)
        );
    }

    #[test]
    fn test_trader_role() {
        let mut logic = mock_manager_logic(0);
        let trader = Pubkey::new_unique();
        assert!(!logic.is_manager_or_trader(&trader));
        logic.trader = Some(trader);
        assert!(logic.is_manager_or_trader(&trader));
        assert!(logic.require_manager(&trader).is_err());
    }

    #[test]
    fn test_fee_decrease_only() {
        let mut logic = mock_manager_logic(1_000);
        logic.set_fee_numerator(500).unwrap();
        assert_eq!(
            logic.set_fee_numerator(600).unwrap_err(),
            anchor_lang::error::Error::from(PoolError::ManagerFeeTooHigh)
        );
    }

    #[test]
    fn test_fee_increase_timelock() {
        let config = FactoryConfig::default();
        let mut logic = mock_manager_logic(1_000);

        assert_eq!(
            logic.commit_fee_increase(0).unwrap_err(),
            anchor_lang::error::Error::from(PoolError::NoFeeIncreaseAnnounced)
        );

        let activation = logic.announce_fee_increase(2_000, &config, 100).unwrap();
        assert_eq!(activation, 100 + config.manager_fee_numerator_change_delay);

        assert_eq!(
            logic.commit_fee_increase(activation - 1).unwrap_err(),
            anchor_lang::error::Error::from(PoolError::FeeIncreaseDelayActive)
        );
        assert_eq!(logic.commit_fee_increase(activation).unwrap(), 2_000);
        assert_eq!(logic.announced_fee_activation_time, 0);
    }

    #[test]
    fn test_fee_increase_cap() {
        let config = FactoryConfig::default();
        let mut logic = mock_manager_logic(1_000);

        // more than +1000 in one step
        assert!(logic.announce_fee_increase(2_001, &config, 0).is_err());

        let mut logic = mock_manager_logic(4_500);
        // above the 50% maximum
        assert_eq!(
            logic.announce_fee_increase(5_500, &config, 0).unwrap_err(),
            anchor_lang::error::Error::from(PoolError::ExceededAllowedIncrease)
        );
    }

    #[test]
    fn test_members() {
        let mut logic = mock_manager_logic(0);
        let member = Pubkey::new_unique();
        let manager = logic.manager;
        assert!(logic.is_member_allowed(&manager));
        assert!(!logic.is_member_allowed(&member));
        assert!(logic.add_member(member));
        assert!(!logic.add_member(member));
        assert!(logic.is_member_allowed(&member));
        assert!(logic.remove_member(&member));
        assert!(!logic.is_member_allowed(&member));
    }
}
