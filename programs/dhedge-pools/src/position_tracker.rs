use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::errors::PoolError;
use crate::governance::Governance;

/// (guarded contract, position type, pool)
type PositionKey = (Pubkey, String, Pubkey);

/// Position ids opened by pools in external protocols
///
/// A list keyed by (guarded contract, type, pool) is written only by the
/// contract guard registered for that guarded contract.
#[derive(Clone, Debug, Default)]
pub struct PositionTracker {
    positions: BTreeMap<PositionKey, Vec<u64>>,
}

impl PositionTracker {
    fn only_contract_guard(
        governance: &Governance,
        guard: &Pubkey,
        guarded_contract: &Pubkey,
    ) -> Result<()> {
        if governance.get_contract_guard_address(guarded_contract) != Some(*guard) {
            msg!("Guard {} may not write positions of {}", guard, guarded_contract);
            return err!(PoolError::NotCorrectContractGuard);
        }
        Ok(())
    }

    pub fn add_position_id(
        &mut self,
        governance: &Governance,
        guard: &Pubkey,
        guarded_contract: Pubkey,
        position_type: &str,
        pool: Pubkey,
        id: u64,
    ) -> Result<()> {
        Self::only_contract_guard(governance, guard, &guarded_contract)?;
        self.positions
            .entry((guarded_contract, position_type.to_string(), pool))
            .or_default()
            .push(id);
        Ok(())
    }

    /// Remove the entry at `index`, preserving the order of the rest
    pub fn remove_at(
        &mut self,
        governance: &Governance,
        guard: &Pubkey,
        guarded_contract: Pubkey,
        position_type: &str,
        pool: Pubkey,
        index: usize,
    ) -> Result<u64> {
        Self::only_contract_guard(governance, guard, &guarded_contract)?;
        let ids = self
            .positions
            .get_mut(&(guarded_contract, position_type.to_string(), pool))
            .ok_or(error!(PoolError::InvalidIndex))?;
        require!(index < ids.len(), PoolError::InvalidIndex);
        Ok(ids.remove(index))
    }

    /// Remove `id` wherever it sits in the list
    pub fn remove_position_id(
        &mut self,
        governance: &Governance,
        guard: &Pubkey,
        guarded_contract: Pubkey,
        position_type: &str,
        pool: Pubkey,
        id: u64,
    ) -> Result<()> {
        let index = self
            .position_ids(&guarded_contract, position_type, &pool)
            .iter()
            .position(|tracked| *tracked == id)
            .ok_or(error!(PoolError::InvalidIndex))?;
        self.remove_at(governance, guard, guarded_contract, position_type, pool, index)?;
        Ok(())
    }

    pub fn position_ids(
        &self,
        guarded_contract: &Pubkey,
        position_type: &str,
        pool: &Pubkey,
    ) -> &[u64] {
        self.positions
            .get(&(*guarded_contract, position_type.to_string(), *pool))
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(
        &self,
        guarded_contract: &Pubkey,
        position_type: &str,
        pool: &Pubkey,
        id: u64,
    ) -> bool {
        self.position_ids(guarded_contract, position_type, pool)
            .contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governance::AdminContext;
    use crate::guards::Erc20Guard;
    use std::sync::Arc;

    const TYPE: &str = "stakingPosition";

    fn setup() -> (Governance, Pubkey, Pubkey) {
        let dao = Pubkey::new_unique();
        let mut governance = Governance::new(dao);
        let guarded = Pubkey::new_unique();
        let guard = Pubkey::new_unique();
        governance
            .set_contract_guard(&AdminContext::new(dao), guarded, guard, Arc::new(Erc20Guard))
            .unwrap();
        (governance, guarded, guard)
    }

    #[test]
    fn test_add_and_remove_positions() {
        let (governance, guarded, guard) = setup();
        let pool = Pubkey::new_unique();
        let mut tracker = PositionTracker::default();

        for id in [7, 8, 9] {
            tracker
                .add_position_id(&governance, &guard, guarded, TYPE, pool, id)
                .unwrap();
        }
        assert_eq!(tracker.position_ids(&guarded, TYPE, &pool), &[7, 8, 9]);

        tracker
            .remove_position_id(&governance, &guard, guarded, TYPE, pool, 8)
            .unwrap();
        assert_eq!(tracker.position_ids(&guarded, TYPE, &pool), &[7, 9]);
        assert!(tracker.contains(&guarded, TYPE, &pool, 9));
        assert!(!tracker.contains(&guarded, TYPE, &pool, 8));
    }

    #[test]
    fn test_only_registered_guard_can_write() {
        let (governance, guarded, _guard) = setup();
        let mut tracker = PositionTracker::default();

        let result = tracker.add_position_id(
            &governance,
            &Pubkey::new_unique(),
            guarded,
            TYPE,
            Pubkey::new_unique(),
            1,
        );
        assert_eq!(
            result.unwrap_err(),
            anchor_lang::error::Error::from(PoolError::NotCorrectContractGuard)
        );
    }

    #[test]
    fn test_remove_at_invalid_index() {
        let (governance, guarded, guard) = setup();
        let pool = Pubkey::new_unique();
        let mut tracker = PositionTracker::default();
        tracker
            .add_position_id(&governance, &guard, guarded, TYPE, pool, 1)
            .unwrap();

        let result = tracker.remove_at(&governance, &guard, guarded, TYPE, pool, 1);
        assert_eq!(
            result.unwrap_err(),
            anchor_lang::error::Error::from(PoolError::InvalidIndex)
        );
    }

    #[test]
    fn test_lists_are_partitioned_per_pool() {
        let (governance, guarded, guard) = setup();
        let pool_a = Pubkey::new_unique();
        let pool_b = Pubkey::new_unique();
        let mut tracker = PositionTracker::default();

        tracker
            .add_position_id(&governance, &guard, guarded, TYPE, pool_a, 1)
            .unwrap();

        assert_eq!(tracker.position_ids(&guarded, TYPE, &pool_a), &[1]);
        assert!(tracker.position_ids(&guarded, TYPE, &pool_b).is_empty());
    }
}
