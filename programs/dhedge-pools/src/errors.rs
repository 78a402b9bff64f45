use anchor_lang::prelude::*;

/// Revert reasons surfaced by pools, guards and registries
///
/// Every failure aborts the whole entry point; messages are the exact
/// reason strings callers match on.
#[error_code]
pub enum PoolError {
    // Authorization
    #[msg("only dao")]
    OnlyDao,

    #[msg("only manager")]
    OnlyManager,

    #[msg("only manager or trader")]
    OnlyManagerOrTrader,

    #[msg("only members allowed")]
    OnlyMembersAllowed,

    #[msg("not correct contract guard")]
    NotCorrectContractGuard,

    // Guard and whitelist policy
    #[msg("unsupported asset")]
    UnsupportedAsset,

    #[msg("unsupported source asset")]
    UnsupportedSourceAsset,

    #[msg("unsupported destination asset")]
    UnsupportedDestinationAsset,

    #[msg("invalid routing asset")]
    InvalidRoutingAsset,

    #[msg("unsupported asset: tokenA")]
    UnsupportedAssetTokenA,

    #[msg("unsupported asset: tokenB")]
    UnsupportedAssetTokenB,

    #[msg("unsupported lp asset")]
    UnsupportedLpAsset,

    #[msg("unsupported spender approval")]
    UnsupportedSpenderApproval,

    #[msg("recipient is not pool")]
    RecipientIsNotPool,

    #[msg("invalid destination")]
    InvalidDestination,

    #[msg("invalid destination or asset not supported")]
    InvalidDestinationOrAssetNotSupported,

    #[msg("invalid transaction")]
    InvalidTransaction,

    #[msg("invalid transaction data")]
    InvalidTransactionData,

    #[msg("non-zero address is required")]
    NonZeroAddressRequired,

    #[msg("invalid deposit asset")]
    InvalidDepositAsset,

    #[msg("invalid asset")]
    InvalidAsset,

    #[msg("position not owned by pool")]
    PositionNotOwnedByPool,

    #[msg("too many staking positions")]
    TooManyStakingPositions,

    #[msg("unsupported staking contract")]
    UnsupportedStakingContract,

    // State preconditions
    #[msg("cooldown active")]
    CooldownActive,

    #[msg("fee increase delay active")]
    FeeIncreaseDelayActive,

    #[msg("no fee increase announced")]
    NoFeeIncreaseAnnounced,

    #[msg("contracts paused")]
    ContractsPaused,

    #[msg("invalid index")]
    InvalidIndex,

    #[msg("insufficient balance")]
    InsufficientBalance,

    #[msg("insufficient allowance")]
    InsufficientAllowance,

    #[msg("invalid amount")]
    InvalidAmount,

    #[msg("fund value is zero")]
    FundValueIsZero,

    // Invariant protection
    #[msg("cannot remove non-empty asset")]
    CannotRemoveNonEmptyAsset,

    #[msg("at least one deposit asset")]
    AtLeastOneDepositAsset,

    #[msg("maximum assets reached")]
    MaximumAssetsReached,

    #[msg("invalid fraction")]
    InvalidFraction,

    #[msg("manager fee too high")]
    ManagerFeeTooHigh,

    #[msg("exceeded allowed increase")]
    ExceededAllowedIncrease,

    #[msg("name too long")]
    NameTooLong,

    #[msg("invalid config")]
    InvalidConfig,

    // External calls
    #[msg("failed to execute the call")]
    FailedToExecuteCall,

    #[msg("failed to withdraw tokens")]
    FailedToWithdrawTokens,

    #[msg("call to non-contract")]
    CallToNonContract,

    #[msg("unknown token")]
    UnknownToken,

    #[msg("pool not found")]
    PoolNotFound,

    // Price feeds
    #[msg("price expired")]
    PriceExpired,

    #[msg("price get failed")]
    PriceGetFailed,

    #[msg("invalid aggregator")]
    InvalidAggregator,

    // Math
    #[msg("math overflow")]
    MathOverflow,

    #[msg("division by zero")]
    DivisionByZero,
}
