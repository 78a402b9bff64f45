// dHedge Pools - guarded, multi-asset managed pools
// Security: every manager call is vetted by a registered contract guard before the pool forwards it
// Architecture: Governance registry + asset handler + per-protocol guards

use std::sync::Arc;

use anchor_lang::prelude::*;

pub mod asset_guards;
pub mod asset_handler;
pub mod chain;
pub mod constants;
pub mod context;
pub mod errors;
pub mod events;
pub mod governance;
pub mod guards;
pub mod instructions;
pub mod interfaces;
pub mod math;
pub mod mock;
pub mod position_tracker;
pub mod state;
pub mod token;

use asset_guards::AssetGuard;
use asset_handler::{AssetConfig, AssetHandler};
use chain::Chain;
use context::ValuationContext;
use events::{EventLog, PoolEvent, WithdrawnAsset};
use governance::{AdminContext, Governance};
use guards::ContractGuard;
use instructions::CreateFundParams;
use position_tracker::PositionTracker;
use state::{Asset, AssetComposition, FactoryConfig, Fund, PoolFactory};

/// The whole system: host ledger, registries, pools and the event log
///
/// Every mutating entry point runs through [`DHedge::transact`]: if it
/// fails, every change it made (token balances, pool shares, tracked
/// positions, recorded events) is rolled back.
#[derive(Clone)]
pub struct DHedge {
    pub chain: Chain,
    pub factory: PoolFactory,
    pub governance: Governance,
    pub asset_handler: AssetHandler,
    pub tracker: PositionTracker,
    pub(crate) events: EventLog,
}

impl DHedge {
    /// Governance, the asset handler and the factory are all owned by `config.dao`
    pub fn new(config: FactoryConfig, chain: Chain) -> Result<Self> {
        config.validate()?;
        let dao = config.dao;
        require_keys_neq!(dao, Pubkey::default(), errors::PoolError::NonZeroAddressRequired);
        msg!("dHedge initialised, dao {}", dao);

        Ok(Self {
            chain,
            factory: PoolFactory::new(config),
            governance: Governance::new(dao),
            asset_handler: AssetHandler::new(dao),
            tracker: PositionTracker::default(),
            events: EventLog::default(),
        })
    }

    /// Run `op` atomically: on error the state before the call is restored
    pub fn transact<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let checkpoint = self.clone();
        let result = op(self);
        if result.is_err() {
            *self = checkpoint;
        }
        result
    }

    // ===== Governance =====

    pub fn transfer_governance(&mut self, signer: Pubkey, new_dao: Pubkey) -> Result<()> {
        self.transact(|world| {
            world
                .governance
                .transfer_dao(&AdminContext::new(signer), new_dao)
        })
    }

    /// Register the guard that vets calls to `target`
    ///
    /// Security considerations:
    /// - DAO-only
    /// - A target without a guard cannot be called by any pool
    pub fn set_contract_guard(
        &mut self,
        signer: Pubkey,
        target: Pubkey,
        guard_address: Pubkey,
        guard: Arc<dyn ContractGuard>,
    ) -> Result<()> {
        self.transact(|world| {
            world.governance.set_contract_guard(
                &AdminContext::new(signer),
                target,
                guard_address,
                guard,
            )
        })
    }

    /// Register the guard that values and unwinds assets of `asset_type`
    ///
    /// Security considerations:
    /// - DAO-only
    /// - Assets whose type has no guard cannot be added to a pool
    pub fn set_asset_guard(
        &mut self,
        signer: Pubkey,
        asset_type: u16,
        guard_address: Pubkey,
        guard: Arc<dyn AssetGuard>,
    ) -> Result<()> {
        self.transact(|world| {
            world.governance.set_asset_guard(
                &AdminContext::new(signer),
                asset_type,
                guard_address,
                guard,
            )
        })
    }

    pub fn set_addresses(&mut self, signer: Pubkey, entries: &[(&str, Pubkey)]) -> Result<()> {
        self.transact(|world| {
            world
                .governance
                .set_addresses(&AdminContext::new(signer), entries)
        })
    }

    // ===== Asset handler =====

    /// Register assets with their type and price feed
    ///
    /// Security considerations:
    /// - DAO-only
    /// - Feeds are read fresh on every valuation, never cached
    pub fn add_assets(&mut self, signer: Pubkey, assets: &[AssetConfig]) -> Result<()> {
        self.transact(|world| {
            world
                .asset_handler
                .add_assets(&AdminContext::new(signer), assets)
        })
    }

    pub fn remove_asset(&mut self, signer: Pubkey, asset: Pubkey) -> Result<()> {
        self.transact(|world| {
            world
                .asset_handler
                .remove_asset(&AdminContext::new(signer), &asset)
        })
    }

    pub fn set_chainlink_timeout(&mut self, signer: Pubkey, timeout: i64) -> Result<()> {
        self.transact(|world| {
            world
                .asset_handler
                .set_chainlink_timeout(&AdminContext::new(signer), timeout)
        })
    }

    // ===== Factory settings =====

    pub fn set_dao_address(&mut self, signer: Pubkey, dao: Pubkey) -> Result<()> {
        self.transact(|world| world.factory.set_dao_address(&AdminContext::new(signer), dao))
    }

    /// Pause or resume every pool
    ///
    /// Security considerations:
    /// - DAO-only
    /// - While paused, deposits, withdrawals, guarded calls and fund creation are rejected
    pub fn set_paused(&mut self, signer: Pubkey, paused: bool) -> Result<()> {
        self.transact(|world| world.factory.set_paused(&AdminContext::new(signer), paused))
    }

    pub fn set_exit_cooldown(&mut self, signer: Pubkey, exit_cooldown: i64) -> Result<()> {
        self.transact(|world| {
            world
                .factory
                .set_exit_cooldown(&AdminContext::new(signer), exit_cooldown)
        })
    }

    pub fn set_maximum_manager_fee(&mut self, signer: Pubkey, numerator: u128) -> Result<()> {
        self.transact(|world| {
            world
                .factory
                .set_maximum_manager_fee(&AdminContext::new(signer), numerator)
        })
    }

    pub fn set_maximum_manager_fee_numerator_change(
        &mut self,
        signer: Pubkey,
        amount: u128,
        delay: i64,
    ) -> Result<()> {
        self.transact(|world| {
            world.factory.set_maximum_manager_fee_numerator_change(
                &AdminContext::new(signer),
                amount,
                delay,
            )
        })
    }

    pub fn set_dao_fee(
        &mut self,
        signer: Pubkey,
        numerator: u128,
        denominator: u128,
    ) -> Result<()> {
        self.transact(|world| {
            world
                .factory
                .set_dao_fee(&AdminContext::new(signer), numerator, denominator)
        })
    }

    pub fn set_maximum_supported_asset_count(
        &mut self,
        signer: Pubkey,
        count: usize,
    ) -> Result<()> {
        self.transact(|world| {
            world
                .factory
                .set_maximum_supported_asset_count(&AdminContext::new(signer), count)
        })
    }

    pub fn set_maximum_staking_positions(&mut self, signer: Pubkey, count: usize) -> Result<()> {
        self.transact(|world| {
            world
                .factory
                .set_maximum_staking_positions(&AdminContext::new(signer), count)
        })
    }

    // ===== Pools =====

    /// Deploy a new pool, returns (pool, pool manager logic)
    ///
    /// Security considerations:
    /// - Manager fee capped by `maximum_manager_fee`
    /// - Initial assets go through the same checks as `change_assets`
    /// - Emits FundCreated
    pub fn create_fund(&mut self, params: CreateFundParams) -> Result<(Pubkey, Pubkey)> {
        self.transact(|world| instructions::create_fund::handler(world, params))
    }

    /// Deposit `amount` of `asset` into `pool`, returns the shares minted
    ///
    /// Security considerations:
    /// - Investor must have approved the pool for `amount`
    /// - Shares priced from a fresh fund valuation after the fee mint
    /// - Restarts the investor's exit cooldown
    pub fn deposit(
        &mut self,
        pool: Pubkey,
        investor: Pubkey,
        asset: Pubkey,
        amount: u128,
    ) -> Result<u128> {
        self.transact(|world| instructions::deposit::handler(world, pool, investor, asset, amount))
    }

    /// Burn `fund_token_amount` shares for a pro-rata slice of every asset
    ///
    /// Security considerations:
    /// - Blocked during the exit cooldown
    /// - Shares are burned before any asset leaves the pool
    /// - Any failing unwind transaction aborts the whole withdrawal
    pub fn withdraw(
        &mut self,
        pool: Pubkey,
        investor: Pubkey,
        fund_token_amount: u128,
    ) -> Result<Vec<WithdrawnAsset>> {
        self.transact(|world| {
            instructions::withdraw::handler(world, pool, investor, fund_token_amount)
        })
    }

    /// Forward `data` to `to` on behalf of `pool`, returns the call's return data
    ///
    /// Security considerations:
    /// - The target's guard must recognise and approve the call
    /// - Manager or trader only, unless the guard marks the call public
    pub fn exec_transaction(
        &mut self,
        pool: Pubkey,
        caller: Pubkey,
        to: Pubkey,
        data: Vec<u8>,
    ) -> Result<Vec<u8>> {
        self.transact(|world| {
            instructions::exec_transaction::handler(world, pool, caller, to, data)
        })
    }

    pub fn change_assets(
        &mut self,
        pool: Pubkey,
        caller: Pubkey,
        add: Vec<Asset>,
        remove: Vec<Pubkey>,
    ) -> Result<()> {
        self.transact(|world| {
            instructions::change_assets::handler(world, pool, caller, add, remove)
        })
    }

    pub fn set_trader(&mut self, pool: Pubkey, caller: Pubkey, trader: Pubkey) -> Result<()> {
        self.transact(|world| instructions::trader::set_handler(world, pool, caller, trader))
    }

    pub fn remove_trader(&mut self, pool: Pubkey, caller: Pubkey) -> Result<()> {
        self.transact(|world| instructions::trader::remove_handler(world, pool, caller))
    }

    pub fn add_members(
        &mut self,
        pool: Pubkey,
        caller: Pubkey,
        members: Vec<Pubkey>,
    ) -> Result<()> {
        self.transact(|world| {
            instructions::members::add_members_handler(world, pool, caller, members)
        })
    }

    pub fn remove_members(
        &mut self,
        pool: Pubkey,
        caller: Pubkey,
        members: Vec<Pubkey>,
    ) -> Result<()> {
        self.transact(|world| {
            instructions::members::remove_members_handler(world, pool, caller, members)
        })
    }

    pub fn set_pool_private(
        &mut self,
        pool: Pubkey,
        caller: Pubkey,
        is_private: bool,
    ) -> Result<()> {
        self.transact(|world| {
            instructions::members::set_pool_private_handler(world, pool, caller, is_private)
        })
    }

    /// Lower the manager fee immediately
    pub fn set_manager_fee_numerator(
        &mut self,
        pool: Pubkey,
        caller: Pubkey,
        numerator: u128,
    ) -> Result<()> {
        self.transact(|world| {
            instructions::manager_fee::set_handler(world, pool, caller, numerator)
        })
    }

    /// Start the timelock for a fee increase
    ///
    /// Security considerations:
    /// - Bounded by `maximum_manager_fee` and `maximum_manager_fee_numerator_change`
    /// - Only takes effect through `commit_manager_fee_increase` after the delay
    pub fn announce_manager_fee_increase(
        &mut self,
        pool: Pubkey,
        caller: Pubkey,
        numerator: u128,
    ) -> Result<()> {
        self.transact(|world| {
            instructions::manager_fee::announce_handler(world, pool, caller, numerator)
        })
    }

    pub fn renounce_manager_fee_increase(&mut self, pool: Pubkey, caller: Pubkey) -> Result<()> {
        self.transact(|world| instructions::manager_fee::renounce_handler(world, pool, caller))
    }

    pub fn commit_manager_fee_increase(&mut self, pool: Pubkey, caller: Pubkey) -> Result<()> {
        self.transact(|world| instructions::manager_fee::commit_handler(world, pool, caller))
    }

    pub fn mint_manager_fee(&mut self, pool: Pubkey) -> Result<()> {
        self.transact(|world| instructions::manager_fee::mint_handler(world, pool))
    }

    /// Transfer pool shares between holders
    pub fn transfer(&mut self, pool: Pubkey, from: Pubkey, to: Pubkey, amount: u128) -> Result<()> {
        self.transact(|world| instructions::transfer::handler(world, pool, from, to, amount))
    }

    // ===== Views =====

    pub fn valuation(&self) -> ValuationContext<'_> {
        ValuationContext::new(&self.chain, &self.governance, &self.asset_handler, &self.tracker)
    }

    pub fn fund(&self, pool: &Pubkey) -> Result<&Fund> {
        self.factory.fund(pool)
    }

    pub fn total_fund_value(&self, pool: &Pubkey) -> Result<u128> {
        self.fund(pool)?.manager_logic.total_fund_value(&self.valuation())
    }

    pub fn asset_balance(&self, pool: &Pubkey, asset: &Pubkey) -> Result<u128> {
        self.fund(pool)?.manager_logic.asset_balance(&self.valuation(), asset)
    }

    pub fn asset_value(&self, pool: &Pubkey, asset: &Pubkey, amount: u128) -> Result<u128> {
        self.fund(pool)?
            .manager_logic
            .asset_value(&self.valuation(), asset, amount)
    }

    pub fn fund_composition(&self, pool: &Pubkey) -> Result<Vec<AssetComposition>> {
        self.fund(pool)?.manager_logic.fund_composition(&self.valuation())
    }

    /// Share price in USD, 18 decimals
    pub fn token_price(&self, pool: &Pubkey) -> Result<u128> {
        let fund = self.fund(pool)?;
        let fund_value = fund.manager_logic.total_fund_value(&self.valuation())?;
        fund.logic.token_price(fund_value)
    }

    /// Performance fee in shares a `mint_manager_fee` would mint now
    pub fn available_manager_fee(&self, pool: &Pubkey) -> Result<u128> {
        let fund = self.fund(pool)?;
        let fund_value = fund.manager_logic.total_fund_value(&self.valuation())?;
        fund.logic.available_manager_fee(
            fund_value,
            fund.manager_logic.manager_fee_numerator,
            fund.manager_logic.manager_fee_denominator,
        )
    }

    pub fn balance_of(&self, pool: &Pubkey, holder: &Pubkey) -> Result<u128> {
        Ok(self.fund(pool)?.logic.balance_of(holder))
    }

    pub fn total_supply(&self, pool: &Pubkey) -> Result<u128> {
        Ok(self.fund(pool)?.logic.total_supply)
    }

    /// Seconds until `investor` may withdraw or transfer
    pub fn exit_remaining_cooldown(&self, pool: &Pubkey, investor: &Pubkey) -> Result<i64> {
        Ok(self.fund(pool)?.logic.exit_remaining_cooldown(
            investor,
            self.chain.now,
            self.factory.config.exit_cooldown,
        ))
    }

    pub fn is_deposit_asset(&self, pool: &Pubkey, asset: &Pubkey) -> Result<bool> {
        Ok(self.fund(pool)?.manager_logic.is_deposit_asset(asset))
    }

    pub fn is_supported_asset(&self, pool: &Pubkey, asset: &Pubkey) -> Result<bool> {
        Ok(self.fund(pool)?.manager_logic.is_supported_asset(asset))
    }

    pub fn is_pool(&self, address: &Pubkey) -> bool {
        self.factory.is_pool(address)
    }

    pub fn deployed_funds(&self) -> &[Pubkey] {
        self.factory.deployed_funds()
    }

    // ===== Events =====

    pub fn events(&self) -> &[PoolEvent] {
        self.events.events()
    }

    /// Drain every event recorded so far
    pub fn take_events(&mut self) -> Vec<PoolEvent> {
        self.events.take()
    }
}
