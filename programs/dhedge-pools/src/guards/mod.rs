//! Contract guards: policy objects that vet a manager's external call
//! before the pool forwards it.
//!
//! A guard decodes the call data, checks every asset, recipient and
//! routing hop against the pool's supported-asset set, and classifies the
//! call. It never performs the call itself. Unrecognised selectors come back
//! as `TransactionType` 0, which the pool refuses.

use anchor_lang::prelude::*;

use crate::chain::Chain;
use crate::context::ValuationContext;
use crate::events::EventLog;
use crate::governance::Governance;
use crate::position_tracker::PositionTracker;
use crate::state::{FactoryConfig, PoolManagerLogic};

pub mod erc20_guard;
pub mod staking_guard;
pub mod uniswap_v2_router_guard;
pub mod uniswap_v3_router_guard;
pub mod validation;

pub use erc20_guard::*;
pub use staking_guard::*;
pub use uniswap_v2_router_guard::*;
pub use uniswap_v3_router_guard::*;

/// Semantic kind of an authorised call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum TransactionType {
    Approve = 1,
    Exchange = 2,
    AddLiquidity = 3,
    RemoveLiquidity = 4,
    Stake = 5,
    Unstake = 6,
    Claim = 7,
    Multicall = 25,
}

impl From<TransactionType> for u16 {
    fn from(tx_type: TransactionType) -> u16 {
        tx_type as u16
    }
}

/// What a guard decided about a call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuardOutcome {
    /// 0 when the call is not specifically classified
    pub tx_type: u16,
    /// Callable by anyone, not just the manager or trader
    pub is_public: bool,
}

impl GuardOutcome {
    pub fn unclassified() -> Self {
        Self {
            tx_type: 0,
            is_public: false,
        }
    }

    pub fn restricted(tx_type: TransactionType) -> Self {
        Self {
            tx_type: tx_type.into(),
            is_public: false,
        }
    }

    pub fn public(tx_type: TransactionType) -> Self {
        Self {
            tx_type: tx_type.into(),
            is_public: true,
        }
    }

    pub fn is_classified(&self) -> bool {
        self.tx_type > 0
    }
}

/// Read-only state a guard sees while vetting a call
pub struct GuardContext<'a> {
    pub pool: Pubkey,
    pub manager_logic: &'a PoolManagerLogic,
    pub config: &'a FactoryConfig,
    pub view: ValuationContext<'a>,
}

impl<'a> GuardContext<'a> {
    pub fn is_supported_asset(&self, asset: &Pubkey) -> bool {
        self.manager_logic.is_supported_asset(asset)
    }

    pub fn now(&self) -> i64 {
        self.view.now()
    }
}

/// State a guard may touch once the call has succeeded
pub struct AfterTxContext<'a> {
    pub pool: Pubkey,
    pub chain: &'a Chain,
    pub governance: &'a Governance,
    pub tracker: &'a mut PositionTracker,
}

pub trait ContractGuard {
    /// Vet a call to `to`; reverts with the policy reason or classifies it
    fn tx_guard(
        &self,
        ctx: &GuardContext,
        events: &mut EventLog,
        to: Pubkey,
        data: &[u8],
    ) -> Result<GuardOutcome>;

    /// Bookkeeping after the call returned, e.g. recording a new position
    fn after_tx_guard(
        &self,
        _ctx: &mut AfterTxContext,
        _to: Pubkey,
        _data: &[u8],
        _return_data: &[u8],
    ) -> Result<()> {
        Ok(())
    }
}
