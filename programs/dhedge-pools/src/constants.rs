// Constants for the dHEDGE pools engine

/// Fixed-point unit for USD values, token prices and withdrawal portions (18 decimals)
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

// TIME
pub const ONE_HOUR: i64 = 60 * 60;
pub const ONE_DAY: i64 = ONE_HOUR * 24;
pub const ONE_WEEK: i64 = ONE_DAY * 7;

/// Default minimum time between an investor's deposit and their next withdrawal
pub const DEFAULT_EXIT_COOLDOWN: i64 = ONE_DAY;

/// Default max age of an aggregator answer before it is considered stale (25 hours)
pub const DEFAULT_CHAINLINK_TIMEOUT: i64 = 90_000;

// FEES
pub const DEFAULT_MANAGER_FEE_DENOMINATOR: u128 = 10_000;

/// Default cap on the manager fee numerator (50%)
pub const DEFAULT_MAXIMUM_MANAGER_FEE: u128 = 5_000;

/// Default cap on a single announced fee increase (10 percentage points)
pub const DEFAULT_MAXIMUM_MANAGER_FEE_NUMERATOR_CHANGE: u128 = 1_000;

/// Default timelock between announcing and committing a fee increase
pub const DEFAULT_MANAGER_FEE_NUMERATOR_CHANGE_DELAY: i64 = ONE_WEEK * 4;

pub const DEFAULT_DAO_FEE_NUMERATOR: u128 = 10;
pub const DEFAULT_DAO_FEE_DENOMINATOR: u128 = 100;

// LIMITS
pub const DEFAULT_MAXIMUM_SUPPORTED_ASSET_COUNT: usize = 10;
pub const DEFAULT_MAXIMUM_STAKING_POSITIONS: usize = 3;
pub const MAX_POOL_NAME_LENGTH: usize = 50;
pub const MAX_POOL_SYMBOL_LENGTH: usize = 10;

// ASSET TYPES
/// Plain token priced directly by a USD aggregator
pub const ASSET_TYPE_ERC20: u16 = 0;

/// LP token that may also sit in tracked staking positions
pub const ASSET_TYPE_STAKED_LP: u16 = 5;

// NAMED ADDRESSES (governance address registry keys)
pub const STAKING_POSITIONS_KEY: &str = "stakingPositions";

/// Position tracker type tag for staking position ids
pub const STAKING_POSITION_TYPE: &str = "stakingPosition";
