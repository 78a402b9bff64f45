use anchor_lang::prelude::*;

use crate::events::{MemberAdded, MemberRemoved, PoolPrivacyUpdated};
use crate::DHedge;

pub fn add_members_handler(
    world: &mut DHedge,
    pool: Pubkey,
    caller: Pubkey,
    members: Vec<Pubkey>,
) -> Result<()> {
    let fund = world.factory.fund_mut(&pool)?;
    fund.manager_logic.require_manager(&caller)?;

    for member in members {
        if fund.manager_logic.add_member(member) {
            world.events.record(MemberAdded {
                pool_manager_logic: fund.manager_logic.address,
                member,
            });
        }
    }
    Ok(())
}

pub fn remove_members_handler(
    world: &mut DHedge,
    pool: Pubkey,
    caller: Pubkey,
    members: Vec<Pubkey>,
) -> Result<()> {
    let fund = world.factory.fund_mut(&pool)?;
    fund.manager_logic.require_manager(&caller)?;

    for member in members {
        if fund.manager_logic.remove_member(&member) {
            world.events.record(MemberRemoved {
                pool_manager_logic: fund.manager_logic.address,
                member,
            });
        }
    }
    Ok(())
}

/// Switch between a public pool and a members-only pool
pub fn set_pool_private_handler(
    world: &mut DHedge,
    pool: Pubkey,
    caller: Pubkey,
    is_private: bool,
) -> Result<()> {
    let fund = world.factory.fund_mut(&pool)?;
    fund.manager_logic.require_manager(&caller)?;

    fund.logic.is_private = is_private;
    msg!("Pool {} private: {}", pool, is_private);
    world.events.record(PoolPrivacyUpdated { pool, is_private });
    Ok(())
}
