use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::chain::Chain;
use crate::constants::DEFAULT_CHAINLINK_TIMEOUT;
use crate::errors::PoolError;
use crate::governance::AdminContext;
use crate::math::normalize_price;

/// Registration of one asset with the handler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssetConfig {
    pub asset: Pubkey,
    pub asset_type: u16,
    pub aggregator: Pubkey,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct AssetEntry {
    asset_type: u16,
    aggregator: Pubkey,
}

/// Global asset registry and USD price source
///
/// Every price leaves this module with 18 decimals whatever the decimals
/// of the underlying feed.
#[derive(Clone, Debug)]
pub struct AssetHandler {
    pub owner: Pubkey,
    /// Maximum feed age in seconds
    pub chainlink_timeout: i64,
    assets: BTreeMap<Pubkey, AssetEntry>,
}

impl AssetHandler {
    pub fn new(owner: Pubkey) -> Self {
        Self {
            owner,
            chainlink_timeout: DEFAULT_CHAINLINK_TIMEOUT,
            assets: BTreeMap::new(),
        }
    }

    /// Register or overwrite assets
    pub fn add_assets(&mut self, admin: &AdminContext, assets: &[AssetConfig]) -> Result<()> {
        admin.authorize(&self.owner)?;
        for config in assets {
            require_keys_neq!(config.asset, Pubkey::default(), PoolError::NonZeroAddressRequired);
            require_keys_neq!(config.aggregator, Pubkey::default(), PoolError::InvalidAggregator);
            msg!(
                "Asset {} registered: type {}, aggregator {}",
                config.asset,
                config.asset_type,
                config.aggregator
            );
            self.assets.insert(
                config.asset,
                AssetEntry {
                    asset_type: config.asset_type,
                    aggregator: config.aggregator,
                },
            );
        }
        Ok(())
    }

    pub fn remove_asset(&mut self, admin: &AdminContext, asset: &Pubkey) -> Result<()> {
        admin.authorize(&self.owner)?;
        self.assets
            .remove(asset)
            .ok_or(error!(PoolError::InvalidAsset))?;
        msg!("Asset {} deregistered", asset);
        Ok(())
    }

    pub fn set_chainlink_timeout(&mut self, admin: &AdminContext, timeout: i64) -> Result<()> {
        admin.authorize(&self.owner)?;
        require!(timeout > 0, PoolError::InvalidAmount);
        self.chainlink_timeout = timeout;
        Ok(())
    }

    pub fn is_registered(&self, asset: &Pubkey) -> bool {
        self.assets.contains_key(asset)
    }

    pub fn get_asset_type(&self, asset: &Pubkey) -> Result<u16> {
        self.assets
            .get(asset)
            .map(|entry| entry.asset_type)
            .ok_or(error!(PoolError::InvalidAsset))
    }

    pub fn price_aggregator(&self, asset: &Pubkey) -> Option<Pubkey> {
        self.assets.get(asset).map(|entry| entry.aggregator)
    }

    /// Latest USD price of `asset`, 18 decimals
    ///
    /// Fails closed on an unknown asset, a missing feed, a non-positive
    /// answer or an answer older than `chainlink_timeout`.
    pub fn get_usd_price(&self, chain: &Chain, asset: &Pubkey) -> Result<u128> {
        let entry = self
            .assets
            .get(asset)
            .ok_or(error!(PoolError::InvalidAsset))?;
        let aggregator = chain
            .aggregator(&entry.aggregator)
            .ok_or(error!(PoolError::InvalidAggregator))?;

        let round = aggregator
            .latest_round_data()
            .map_err(|_| error!(PoolError::PriceGetFailed))?;
        require!(round.answer > 0, PoolError::PriceGetFailed);

        let expiry = round
            .updated_at
            .checked_add(self.chainlink_timeout)
            .ok_or(error!(PoolError::MathOverflow))?;
        if expiry < chain.now {
            msg!(
                "Stale price for {}: updated at {}, now {}",
                asset,
                round.updated_at,
                chain.now
            );
            return err!(PoolError::PriceExpired);
        }

        normalize_price(round.answer as u128, aggregator.decimals())
    }
}
