use anchor_lang::prelude::*;

/// Event emitted when the factory deploys a new pool
#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct FundCreated {
    pub pool: Pubkey,
    pub pool_manager_logic: Pubkey,
    pub manager: Pubkey,
    pub name: String,
    pub symbol: String,
    pub is_private: bool,
    pub manager_fee_numerator: u128,
    pub manager_fee_denominator: u128,
    pub time: i64,
}

/// Event emitted when an investor deposits into a pool
#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct Deposit {
    pub pool: Pubkey,
    pub investor: Pubkey,
    pub asset_deposited: Pubkey,
    pub amount_deposited: u128,
    pub value_deposited: u128,
    pub fund_tokens_received: u128,
    pub total_investor_fund_tokens: u128,
    /// Fund value before the deposit
    pub fund_value_before: u128,
    /// Fund value after the deposit
    pub fund_value: u128,
    pub total_supply_before: u128,
    pub total_supply: u128,
    pub time: i64,
}

/// One asset paid out by a withdrawal
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct WithdrawnAsset {
    pub asset: Pubkey,
    pub amount: u128,
    /// Whether the payout required unwinding an external position
    pub external_withdraw_processed: bool,
}

/// Event emitted when an investor withdraws from a pool
#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct Withdrawal {
    pub pool: Pubkey,
    pub investor: Pubkey,
    pub value_withdrawn: u128,
    pub fund_tokens_withdrawn: u128,
    pub total_investor_fund_tokens: u128,
    pub fund_value_before: u128,
    pub fund_value: u128,
    pub total_supply_before: u128,
    pub total_supply: u128,
    pub withdrawn_assets: Vec<WithdrawnAsset>,
    pub time: i64,
}

/// Event emitted after a guarded external call went through
#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionExecuted {
    pub pool: Pubkey,
    pub manager: Pubkey,
    pub transaction_type: u16,
    pub time: i64,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct ExchangeFrom {
    pub pool: Pubkey,
    pub source_asset: Pubkey,
    pub source_amount: u128,
    pub destination_asset: Pubkey,
    pub time: i64,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct ExchangeTo {
    pub pool: Pubkey,
    pub source_asset: Pubkey,
    pub destination_asset: Pubkey,
    pub destination_amount: u128,
    pub time: i64,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct LiquidityAdded {
    pub pool: Pubkey,
    pub pair: Pubkey,
    pub token_a: Pubkey,
    pub token_b: Pubkey,
    pub amount_a: u128,
    pub amount_b: u128,
    pub time: i64,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct LiquidityRemoved {
    pub pool: Pubkey,
    pub pair: Pubkey,
    pub token_a: Pubkey,
    pub token_b: Pubkey,
    pub liquidity: u128,
    pub time: i64,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct Staked {
    pub pool: Pubkey,
    pub staking_contract: Pubkey,
    pub staking_token: Pubkey,
    pub amount: u128,
    pub time: i64,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct Unstaked {
    pub pool: Pubkey,
    pub staking_contract: Pubkey,
    pub position_id: u64,
    pub amount: u128,
    pub time: i64,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct RewardsClaimed {
    pub pool: Pubkey,
    pub staking_contract: Pubkey,
    pub position_id: u64,
    pub time: i64,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct AssetAdded {
    pub pool_manager_logic: Pubkey,
    pub asset: Pubkey,
    pub is_deposit: bool,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct AssetRemoved {
    pub pool_manager_logic: Pubkey,
    pub asset: Pubkey,
}

/// Event emitted when performance fee shares are minted
#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct ManagerFeeMinted {
    pub pool: Pubkey,
    pub manager: Pubkey,
    pub available_fee_in_shares: u128,
    pub dao_fee: u128,
    pub manager_fee: u128,
    pub token_price_at_last_fee_mint: u128,
    pub time: i64,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct ManagerFeeSet {
    pub pool_manager_logic: Pubkey,
    pub manager: Pubkey,
    pub numerator: u128,
    pub denominator: u128,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct ManagerFeeIncreaseAnnounced {
    pub pool_manager_logic: Pubkey,
    pub new_numerator: u128,
    pub announced_fee_activation_time: i64,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct ManagerFeeIncreaseRenounced {
    pub pool_manager_logic: Pubkey,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct MemberAdded {
    pub pool_manager_logic: Pubkey,
    pub member: Pubkey,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct MemberRemoved {
    pub pool_manager_logic: Pubkey,
    pub member: Pubkey,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct TraderSet {
    pub pool_manager_logic: Pubkey,
    pub trader: Option<Pubkey>,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct PoolPrivacyUpdated {
    pub pool: Pubkey,
    pub is_private: bool,
}

/// Event emitted when pool shares change hands
#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct PoolTokenTransfer {
    pub pool: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u128,
}

/// Every record a pool operation can produce, in emission order
#[derive(Clone, Debug, PartialEq)]
pub enum PoolEvent {
    FundCreated(FundCreated),
    Deposit(Deposit),
    Withdrawal(Withdrawal),
    TransactionExecuted(TransactionExecuted),
    ExchangeFrom(ExchangeFrom),
    ExchangeTo(ExchangeTo),
    LiquidityAdded(LiquidityAdded),
    LiquidityRemoved(LiquidityRemoved),
    Staked(Staked),
    Unstaked(Unstaked),
    RewardsClaimed(RewardsClaimed),
    AssetAdded(AssetAdded),
    AssetRemoved(AssetRemoved),
    ManagerFeeMinted(ManagerFeeMinted),
    ManagerFeeSet(ManagerFeeSet),
    ManagerFeeIncreaseAnnounced(ManagerFeeIncreaseAnnounced),
    ManagerFeeIncreaseRenounced(ManagerFeeIncreaseRenounced),
    MemberAdded(MemberAdded),
    MemberRemoved(MemberRemoved),
    TraderSet(TraderSet),
    PoolPrivacyUpdated(PoolPrivacyUpdated),
    PoolTokenTransfer(PoolTokenTransfer),
}

macro_rules! impl_pool_event {
    ($($name:ident),* $(,)?) => {
        $(
            impl From<$name> for PoolEvent {
                fn from(event: $name) -> Self {
                    PoolEvent::$name(event)
                }
            }
        )*
    };
}

impl_pool_event!(
    FundCreated,
    Deposit,
    Withdrawal,
    TransactionExecuted,
    ExchangeFrom,
    ExchangeTo,
    LiquidityAdded,
    LiquidityRemoved,
    Staked,
    Unstaked,
    RewardsClaimed,
    AssetAdded,
    AssetRemoved,
    ManagerFeeMinted,
    ManagerFeeSet,
    ManagerFeeIncreaseAnnounced,
    ManagerFeeIncreaseRenounced,
    MemberAdded,
    MemberRemoved,
    TraderSet,
    PoolPrivacyUpdated,
    PoolTokenTransfer,
);

/// Structured record sink: events are logged through `emit!` and kept
/// for callers to drain
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<PoolEvent>,
}

impl EventLog {
    pub fn record<E>(&mut self, event: E)
    where
        E: anchor_lang::Event + Into<PoolEvent> + Clone,
    {
        emit!(event.clone());
        self.events.push(event.into());
    }

    pub fn events(&self) -> &[PoolEvent] {
        &self.events
    }

    /// Remove and return everything recorded so far
    pub fn take(&mut self) -> Vec<PoolEvent> {
        std::mem::take(&mut self.events)
    }
}
