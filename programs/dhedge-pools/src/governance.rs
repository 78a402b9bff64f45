use std::collections::BTreeMap;
use std::sync::Arc;

use anchor_lang::prelude::*;

use crate::asset_guards::AssetGuard;
use crate::errors::PoolError;
use crate::guards::ContractGuard;

/// Capability proving who signed an administrative call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdminContext {
    pub signer: Pubkey,
}

impl AdminContext {
    pub fn new(signer: Pubkey) -> Self {
        Self { signer }
    }

    /// Fails `only dao` unless the signer is `dao`
    pub fn authorize(&self, dao: &Pubkey) -> Result<()> {
        require_keys_eq!(self.signer, *dao, PoolError::OnlyDao);
        Ok(())
    }
}

/// A guard together with the address it is registered under
pub struct RegisteredGuard<G: ?Sized> {
    pub address: Pubkey,
    pub guard: Arc<G>,
}

impl<G: ?Sized> Clone for RegisteredGuard<G> {
    fn clone(&self) -> Self {
        Self {
            address: self.address,
            guard: Arc::clone(&self.guard),
        }
    }
}

/// Protocol-wide guard registry
///
/// Security: a target without a contract guard cannot be called through a
/// pool, and an asset type without an asset guard cannot be supported.
/// Only the dao can write.
#[derive(Clone)]
pub struct Governance {
    pub dao: Pubkey,
    contract_guards: BTreeMap<Pubkey, RegisteredGuard<dyn ContractGuard>>,
    asset_guards: BTreeMap<u16, RegisteredGuard<dyn AssetGuard>>,
    addresses: BTreeMap<String, Pubkey>,
}

impl Governance {
    pub fn new(dao: Pubkey) -> Self {
        Self {
            dao,
            contract_guards: BTreeMap::new(),
            asset_guards: BTreeMap::new(),
            addresses: BTreeMap::new(),
        }
    }

    pub fn transfer_dao(&mut self, admin: &AdminContext, new_dao: Pubkey) -> Result<()> {
        admin.authorize(&self.dao)?;
        require_keys_neq!(new_dao, Pubkey::default(), PoolError::NonZeroAddressRequired);
        self.dao = new_dao;
        Ok(())
    }

    /// Register (or replace) the guard for calls to `target`
    pub fn set_contract_guard(
        &mut self,
        admin: &AdminContext,
        target: Pubkey,
        guard_address: Pubkey,
        guard: Arc<dyn ContractGuard>,
    ) -> Result<()> {
        admin.authorize(&self.dao)?;
        msg!("Contract guard {} set for {}", guard_address, target);
        self.contract_guards.insert(
            target,
            RegisteredGuard {
                address: guard_address,
                guard,
            },
        );
        Ok(())
    }

    /// Register (or replace) the guard for an asset type
    pub fn set_asset_guard(
        &mut self,
        admin: &AdminContext,
        asset_type: u16,
        guard_address: Pubkey,
        guard: Arc<dyn AssetGuard>,
    ) -> Result<()> {
        admin.authorize(&self.dao)?;
        msg!("Asset guard {} set for asset type {}", guard_address, asset_type);
        self.asset_guards.insert(
            asset_type,
            RegisteredGuard {
                address: guard_address,
                guard,
            },
        );
        Ok(())
    }

    /// Named addresses for well-known dependencies of guards
    pub fn set_addresses(
        &mut self,
        admin: &AdminContext,
        entries: &[(&str, Pubkey)],
    ) -> Result<()> {
        admin.authorize(&self.dao)?;
        for (name, address) in entries {
            self.addresses.insert(name.to_string(), *address);
        }
        Ok(())
    }

    pub fn get_contract_guard(
        &self,
        target: &Pubkey,
    ) -> Option<&RegisteredGuard<dyn ContractGuard>> {
        self.contract_guards.get(target)
    }

    pub fn get_contract_guard_address(&self, target: &Pubkey) -> Option<Pubkey> {
        self.contract_guards.get(target).map(|g| g.address)
    }

    pub fn get_asset_guard(&self, asset_type: u16) -> Option<&RegisteredGuard<dyn AssetGuard>> {
        self.asset_guards.get(&asset_type)
    }

    pub fn get_address(&self, name: &str) -> Option<Pubkey> {
        self.addresses.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guards::Erc20Guard;

    #[test]
    fn test_only_dao_can_register_guards() {
        let dao = Pubkey::new_unique();
        let mut governance = Governance::new(dao);
        let target = Pubkey::new_unique();

        let intruder = AdminContext::new(Pubkey::new_unique());
        let result = governance.set_contract_guard(
            &intruder,
            target,
            Pubkey::new_unique(),
            Arc::new(Erc20Guard::default()),
        );
        assert!(result.is_err());
        assert!(governance.get_contract_guard(&target).is_none());

        let guard_address = Pubkey::new_unique();
        governance
            .set_contract_guard(
                &AdminContext::new(dao),
                target,
                guard_address,
                Arc::new(Erc20Guard::default()),
            )
            .unwrap();
        assert_eq!(governance.get_contract_guard_address(&target), Some(guard_address));
    }

    #[test]
    fn test_unset_guard_is_none() {
        let governance = Governance::new(Pubkey::new_unique());
        assert!(governance.get_contract_guard(&Pubkey::new_unique()).is_none());
        assert!(governance.get_asset_guard(42).is_none());
    }

    #[test]
    fn test_guard_overwrite() {
        let dao = Pubkey::new_unique();
        let admin = AdminContext::new(dao);
        let mut governance = Governance::new(dao);
        let target = Pubkey::new_unique();
        let second = Pubkey::new_unique();

        governance
            .set_contract_guard(
                &admin,
                target,
                Pubkey::new_unique(),
                Arc::new(Erc20Guard::default()),
            )
            .unwrap();
        governance
            .set_contract_guard(&admin, target, second, Arc::new(Erc20Guard::default()))
            .unwrap();

        assert_eq!(governance.get_contract_guard_address(&target), Some(second));
    }

    #[test]
    fn test_named_addresses() {
        let dao = Pubkey::new_unique();
        let mut governance = Governance::new(dao);
        let staking = Pubkey::new_unique();

        governance
            .set_addresses(&AdminContext::new(dao), &[("stakingPositions", staking)])
            .unwrap();

        assert_eq!(governance.get_address("stakingPositions"), Some(staking));
        assert_eq!(governance.get_address("unknown"), None);
    }

    #[test]
    fn test_transfer_dao() {
        let dao = Pubkey::new_unique();
        let new_dao = Pubkey::new_unique();
        let mut governance = Governance::new(dao);

        governance
            .transfer_dao(&AdminContext::new(dao), new_dao)
            .unwrap();
        assert_eq!(governance.dao, new_dao);
        assert!(governance
            .set_addresses(&AdminContext::new(dao), &[("x", Pubkey::new_unique())])
            .is_err());
    }
}
