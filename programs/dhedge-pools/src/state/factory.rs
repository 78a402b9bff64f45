use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use serde::{Deserialize, Serialize};
use solana_sha256_hasher::hashv;

use crate::constants::*;
use crate::errors::PoolError;
use crate::governance::AdminContext;
use crate::state::{PoolLogic, PoolManagerLogic};

/// Protocol-wide settings read by every pool
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Owner of the factory settings and receiver of the dao fee share
    #[serde(with = "pubkey_string")]
    pub dao: Pubkey,
    pub paused: bool,
    /// Seconds after a deposit before the investor may withdraw
    pub exit_cooldown: i64,
    pub maximum_manager_fee: u128,
    pub manager_fee_denominator: u128,
    pub maximum_manager_fee_numerator_change: u128,
    pub manager_fee_numerator_change_delay: i64,
    pub dao_fee_numerator: u128,
    pub dao_fee_denominator: u128,
    pub maximum_supported_asset_count: usize,
    pub maximum_staking_positions: usize,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            dao: Pubkey::default(),
            paused: false,
            exit_cooldown: DEFAULT_EXIT_COOLDOWN,
            maximum_manager_fee: DEFAULT_MAXIMUM_MANAGER_FEE,
            manager_fee_denominator: DEFAULT_MANAGER_FEE_DENOMINATOR,
            maximum_manager_fee_numerator_change: DEFAULT_MAXIMUM_MANAGER_FEE_NUMERATOR_CHANGE,
            manager_fee_numerator_change_delay: DEFAULT_MANAGER_FEE_NUMERATOR_CHANGE_DELAY,
            dao_fee_numerator: DEFAULT_DAO_FEE_NUMERATOR,
            dao_fee_denominator: DEFAULT_DAO_FEE_DENOMINATOR,
            maximum_supported_asset_count: DEFAULT_MAXIMUM_SUPPORTED_ASSET_COUNT,
            maximum_staking_positions: DEFAULT_MAXIMUM_STAKING_POSITIONS,
        }
    }
}

impl FactoryConfig {
    /// Parse a JSON config; omitted fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            msg!("Invalid factory config: {}", e);
            error!(PoolError::InvalidConfig)
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|_| error!(PoolError::InvalidConfig))
    }

    pub fn validate(&self) -> Result<()> {
        require!(self.manager_fee_denominator > 0, PoolError::InvalidFraction);
        require!(
            self.maximum_manager_fee <= self.manager_fee_denominator,
            PoolError::InvalidFraction
        );
        require!(
            self.dao_fee_denominator > 0 && self.dao_fee_numerator <= self.dao_fee_denominator,
            PoolError::InvalidFraction
        );
        require!(self.exit_cooldown >= 0, PoolError::InvalidConfig);
        require!(
            self.manager_fee_numerator_change_delay >= 0,
            PoolError::InvalidConfig
        );
        Ok(())
    }
}

/// Base58 string form of a key in JSON
mod pubkey_string {
    use std::str::FromStr;

    use anchor_lang::prelude::Pubkey;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&key.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Pubkey::from_str(&encoded).map_err(D::Error::custom)
    }
}

/// A deployed pool: share token plus its manager logic
#[derive(Clone, Debug)]
pub struct Fund {
    pub logic: PoolLogic,
    pub manager_logic: PoolManagerLogic,
}

/// Registry of deployed pools and owner of the protocol settings
#[derive(Clone, Debug)]
pub struct PoolFactory {
    pub config: FactoryConfig,
    funds: BTreeMap<Pubkey, Fund>,
    deployed_funds: Vec<Pubkey>,
    nonce: u64,
}

impl PoolFactory {
    pub fn new(config: FactoryConfig) -> Self {
        Self {
            config,
            funds: BTreeMap::new(),
            deployed_funds: Vec::new(),
            nonce: 0,
        }
    }

    pub fn require_not_paused(&self) -> Result<()> {
        require!(!self.config.paused, PoolError::ContractsPaused);
        Ok(())
    }

    /// Derive fresh (pool, manager logic) addresses for `manager`
    pub fn next_addresses(&mut self, manager: &Pubkey) -> (Pubkey, Pubkey) {
        self.nonce += 1;
        let nonce = self.nonce.to_le_bytes();
        let pool = hashv(&[b"pool".as_ref(), manager.as_ref(), nonce.as_ref()]);
        let manager_logic = hashv(&[
            b"pool_manager_logic".as_ref(),
            manager.as_ref(),
            nonce.as_ref(),
        ]);
        (
            Pubkey::new_from_array(pool.to_bytes()),
            Pubkey::new_from_array(manager_logic.to_bytes()),
        )
    }

    pub fn register_fund(&mut self, fund: Fund) {
        let pool = fund.logic.address;
        self.deployed_funds.push(pool);
        self.funds.insert(pool, fund);
    }

    pub fn fund(&self, pool: &Pubkey) -> Result<&Fund> {
        self.funds
            .get(pool)
            .ok_or(error!(PoolError::PoolNotFound))
    }

    pub fn fund_mut(&mut self, pool: &Pubkey) -> Result<&mut Fund> {
        self.funds
            .get_mut(pool)
            .ok_or(error!(PoolError::PoolNotFound))
    }

    pub fn is_pool(&self, address: &Pubkey) -> bool {
        self.funds.contains_key(address)
    }

    pub fn deployed_funds(&self) -> &[Pubkey] {
        &self.deployed_funds
    }

    // ===== DAO settings =====

    pub fn set_dao_address(&mut self, admin: &AdminContext, dao: Pubkey) -> Result<()> {
        admin.authorize(&self.config.dao)?;
        require_keys_neq!(dao, Pubkey::default(), PoolError::NonZeroAddressRequired);
        self.config.dao = dao;
        Ok(())
    }

    pub fn set_paused(&mut self, admin: &AdminContext, paused: bool) -> Result<()> {
        admin.authorize(&self.config.dao)?;
        msg!("Factory paused: {}", paused);
        self.config.paused = paused;
        Ok(())
    }

    pub fn set_exit_cooldown(&mut self, admin: &AdminContext, exit_cooldown: i64) -> Result<()> {
        admin.authorize(&self.config.dao)?;
        require!(exit_cooldown >= 0, PoolError::InvalidConfig);
        self.config.exit_cooldown = exit_cooldown;
        Ok(())
    }

    pub fn set_maximum_manager_fee(&mut self, admin: &AdminContext, numerator: u128) -> Result<()> {
        admin.authorize(&self.config.dao)?;
        require!(
            numerator <= self.config.manager_fee_denominator,
            PoolError::InvalidFraction
        );
        self.config.maximum_manager_fee = numerator;
        Ok(())
    }

    pub fn set_maximum_manager_fee_numerator_change(
        &mut self,
        admin: &AdminContext,
        amount: u128,
        delay: i64,
    ) -> Result<()> {
        admin.authorize(&self.config.dao)?;
        require!(delay >= 0, PoolError::InvalidConfig);
        self.config.maximum_manager_fee_numerator_change = amount;
        self.config.manager_fee_numerator_change_delay = delay;
        Ok(())
    }

    pub fn set_dao_fee(
        &mut self,
        admin: &AdminContext,
        numerator: u128,
        denominator: u128,
    ) -> Result<()> {
        admin.authorize(&self.config.dao)?;
        require!(
            denominator > 0 && numerator <= denominator,
            PoolError::InvalidFraction
        );
        self.config.dao_fee_numerator = numerator;
        self.config.dao_fee_denominator = denominator;
        Ok(())
    }

    pub fn set_maximum_supported_asset_count(
        &mut self,
        admin: &AdminContext,
        count: usize,
    ) -> Result<()> {
        admin.authorize(&self.config.dao)?;
        self.config.maximum_supported_asset_count = count;
        Ok(())
    }

    pub fn set_maximum_staking_positions(
        &mut self,
        admin: &AdminContext,
        count: usize,
    ) -> Result<()> {
        admin.authorize(&self.config.dao)?;
        self.config.maximum_staking_positions = count;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FactoryConfig::default();
        assert_eq!(config.exit_cooldown, ONE_DAY);
        assert_eq!(config.maximum_manager_fee, 5_000);
        assert_eq!(config.manager_fee_denominator, 10_000);
        assert_eq!(config.maximum_staking_positions, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_partial_json() {
        let dao = Pubkey::new_unique();
        let json = format!(r#"{{ "dao": "{}", "exit_cooldown": 3600 }}"#, dao);

        let config = FactoryConfig::from_json(&json).unwrap();
        assert_eq!(config.dao, dao);
        assert_eq!(config.exit_cooldown, 3_600);
        assert_eq!(config.maximum_manager_fee, DEFAULT_MAXIMUM_MANAGER_FEE);
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = FactoryConfig {
            dao: Pubkey::new_unique(),
            paused: true,
            ..FactoryConfig::default()
        };
        let parsed = FactoryConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_rejects_fee_above_denominator() {
        let json = r#"{ "maximum_manager_fee": 20000 }"#;
        assert_eq!(
            FactoryConfig::from_json(json).unwrap_err(),
            anchor_lang::error::Error::from(PoolError::InvalidFraction)
        );
    }

    #[test]
    fn test_config_rejects_malformed_json() {
        assert!(FactoryConfig::from_json("{ not json").is_err());
        assert!(FactoryConfig::from_json(r#"{ "dao": "not-a-key" }"#).is_err());
    }

    #[test]
    fn test_only_dao_pauses() {
        let dao = Pubkey::new_unique();
        let mut factory = PoolFactory::new(FactoryConfig {
            dao,
            ..FactoryConfig::default()
        });

        assert!(factory
            .set_paused(&AdminContext::new(Pubkey::new_unique()), true)
            .is_err());
        factory.set_paused(&AdminContext::new(dao), true).unwrap();
        assert_eq!(
            factory.require_not_paused().unwrap_err(),
            anchor_lang::error::Error::from(PoolError::ContractsPaused)
        );
    }

    #[test]
    fn test_addresses_are_unique() {
        let mut factory = PoolFactory::new(FactoryConfig::default());
        let manager = Pubkey::new_unique();
        let (pool_a, logic_a) = factory.next_addresses(&manager);
        let (pool_b, logic_b) = factory.next_addresses(&manager);
        assert_ne!(pool_a, pool_b);
        assert_ne!(pool_a, logic_a);
        assert_ne!(logic_a, logic_b);
    }
}
