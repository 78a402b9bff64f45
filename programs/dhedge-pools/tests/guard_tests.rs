/// Guarded execution tests: every external call a manager makes through
/// `exec_transaction` against the mock routers, tokens and staking
/// contract, plus withdrawals that unwind staked positions.
mod common;

use std::sync::Arc;

use anchor_lang::prelude::*;
use common::*;
use dhedge_pools::{
    asset_guards::RewardPolicy,
    constants::*,
    errors::PoolError,
    events::PoolEvent,
    guards::{StakingGuard, TransactionType},
    interfaces::erc20::{Transfer, APPROVE, TRANSFER},
    interfaces::staking::{Claim, Stake, Unstake, CLAIM, STAKE, UNSTAKE},
    interfaces::uniswap_v2::{
        AddLiquidity, RemoveLiquidity, SwapExactTokensForTokens, SwapTokensForExactTokens,
        ADD_LIQUIDITY, REMOVE_LIQUIDITY, SWAP_EXACT_TOKENS_FOR_TOKENS,
        SWAP_TOKENS_FOR_EXACT_TOKENS,
    },
    interfaces::uniswap_v3::{
        ExactInput, ExactInputSingle, ExactOutputSingle, Multicall, EXACT_INPUT,
        EXACT_INPUT_SINGLE, EXACT_OUTPUT_SINGLE, MULTICALL,
    },
    interfaces::{decode_return, encode_call},
    mock::MockStaking,
};

const DEADLINE: i64 = i64::MAX;

fn swap_exact(path: Vec<Pubkey>, amount_in: u128, to: Pubkey) -> Vec<u8> {
    encode_call(
        SWAP_EXACT_TOKENS_FOR_TOKENS,
        &SwapExactTokensForTokens {
            amount_in,
            amount_out_min: 0,
            path,
            to,
            deadline: DEADLINE,
        },
    )
}

fn exact_input_single(
    token_in: Pubkey,
    token_out: Pubkey,
    amount_in: u128,
    recipient: Pubkey,
) -> Vec<u8> {
    encode_call(
        EXACT_INPUT_SINGLE,
        &ExactInputSingle {
            token_in,
            token_out,
            fee: 3_000,
            recipient,
            deadline: DEADLINE,
            amount_in,
            amount_out_minimum: 0,
        },
    )
}

fn multicall(data: Vec<Vec<u8>>) -> Vec<u8> {
    encode_call(MULTICALL, &Multicall { data })
}

fn stake(amount: u128, recipient: Pubkey) -> Vec<u8> {
    encode_call(STAKE, &Stake { amount, recipient })
}

fn unstake(position_id: u64, amount: u128, recipient: Pubkey) -> Vec<u8> {
    encode_call(
        UNSTAKE,
        &Unstake {
            position_id,
            amount,
            recipient,
        },
    )
}

fn count_events(f: &Fixture, pred: impl Fn(&PoolEvent) -> bool) -> usize {
    f.world.events().iter().filter(|event| pred(event)).count()
}

/// Pool with 100 sUSD deposited and the router approved
fn funded(router: fn(&Fixture) -> Pubkey) -> Fixture {
    let mut f = setup();
    f.deposit(100 * E18);
    let (susd, spender) = (f.susd.address, router(&f));
    f.approve(susd, spender).unwrap();
    f
}

/// Pool holding 100 sUSD and 10 LP, with LP supported and the staking
/// contract approved
fn staked_lp_pool(reward_policy: RewardPolicy) -> Fixture {
    let mut f = setup_with(reward_policy);
    let (lp, reward, staking) = (f.lp.address, f.reward.address, f.staking);
    f.add_pool_asset(lp, false);
    f.add_pool_asset(reward, false);
    f.deposit(100 * E18);
    f.world.chain.tokens.mint(&lp, &f.pool, 10 * E18).unwrap();
    f.approve(lp, staking).unwrap();
    f
}

fn staking_positions(f: &Fixture) -> Vec<u64> {
    f.world
        .tracker
        .position_ids(&f.staking, STAKING_POSITION_TYPE, &f.pool)
        .to_vec()
}

// =============================================================================
// DESTINATION CHECKS
// =============================================================================

#[test]
fn test_exec_destination_checks() {
    let mut f = setup();
    let (pool, manager_logic, dai) = (f.pool, f.manager_logic, f.dai.address);

    assert_pool_error(
        f.exec(Pubkey::default(), vec![]),
        PoolError::NonZeroAddressRequired,
    );
    assert_pool_error(f.exec(pool, vec![]), PoolError::InvalidDestination);
    assert_pool_error(f.exec(manager_logic, vec![]), PoolError::InvalidDestination);

    // Registered asset the pool does not support, no contract guard either
    let data = encode_call(
        TRANSFER,
        &Transfer {
            to: Pubkey::new_unique(),
            amount: 1,
        },
    );
    assert_pool_error(
        f.exec(dai, data),
        PoolError::InvalidDestinationOrAssetNotSupported,
    );
    assert_pool_error(
        f.exec(Pubkey::new_unique(), vec![0; 8]),
        PoolError::InvalidDestinationOrAssetNotSupported,
    );
}

// =============================================================================
// ERC-20 GUARD
// =============================================================================

#[test]
fn test_approve_only_guarded_spenders() {
    let mut f = setup();
    let (susd, v2_router) = (f.susd.address, f.v2_router);

    assert_pool_error(
        f.approve(susd, Pubkey::new_unique()),
        PoolError::UnsupportedSpenderApproval,
    );

    f.approve(susd, v2_router).unwrap();
    assert_eq!(
        f.world.chain.tokens.allowance(&susd, &f.pool, &v2_router),
        u128::MAX
    );
    assert!(f.world.events().iter().any(|event| matches!(
        event,
        PoolEvent::TransactionExecuted(tx) if tx.transaction_type == TransactionType::Approve as u16
    )));
}

#[test]
fn test_token_transfer_is_not_allowed() {
    let mut f = setup();
    f.deposit(100 * E18);
    let susd = f.susd.address;

    let data = encode_call(
        TRANSFER,
        &Transfer {
            to: f.manager,
            amount: 100 * E18,
        },
    );
    assert_pool_error(f.exec(susd, data), PoolError::InvalidTransaction);
    assert_eq!(f.pool_balance(&susd), 100 * E18);
}

#[test]
fn test_malformed_call_data() {
    let mut f = setup();
    let susd = f.susd.address;

    assert_pool_error(f.exec(susd, vec![1, 2, 3]), PoolError::InvalidTransactionData);
    let router = f.v2_router;
    assert_pool_error(f.exec(router, vec![]), PoolError::InvalidTransactionData);

    let mut data = encode_call(
        APPROVE,
        &Transfer {
            to: f.v2_router,
            amount: 1,
        },
    );
    data.truncate(20);
    assert_pool_error(f.exec(susd, data), PoolError::InvalidTransactionData);
}

// =============================================================================
// UNISWAP V2 ROUTER GUARD
// =============================================================================

#[test]
fn test_v2_swap_keeps_fund_value() {
    let mut f = funded(|f| f.v2_router);
    let (pool, susd, seth, router) = (f.pool, f.susd.address, f.seth.address, f.v2_router);

    let ret = f
        .exec(router, swap_exact(vec![susd, seth], 20 * E18, pool))
        .unwrap();

    let amounts: Vec<u128> = decode_return(&ret).unwrap();
    assert_eq!(amounts, vec![20 * E18, E18 / 100]);
    assert_eq!(f.pool_balance(&susd), 80 * E18);
    assert_eq!(f.pool_balance(&seth), E18 / 100);
    assert_eq!(f.world.total_fund_value(&pool).unwrap(), 100 * E18);
    assert_eq!(
        count_events(&f, |event| matches!(
            event,
            PoolEvent::ExchangeFrom(e) if e.destination_asset == seth
        )),
        1
    );
}

#[test]
fn test_v2_swap_for_exact_tokens() {
    let mut f = funded(|f| f.v2_router);
    let (pool, susd, seth, router) = (f.pool, f.susd.address, f.seth.address, f.v2_router);

    let data = encode_call(
        SWAP_TOKENS_FOR_EXACT_TOKENS,
        &SwapTokensForExactTokens {
            amount_out: E18 / 100,
            amount_in_max: 25 * E18,
            path: vec![susd, seth],
            to: pool,
            deadline: DEADLINE,
        },
    );
    f.exec(router, data).unwrap();

    assert_eq!(f.pool_balance(&susd), 80 * E18);
    assert_eq!(
        count_events(&f, |event| matches!(event, PoolEvent::ExchangeTo(_))),
        1
    );
}

#[test]
fn test_v2_swap_path_checks() {
    let mut f = funded(|f| f.v2_router);
    let (pool, susd, seth, dai, router) = (
        f.pool,
        f.susd.address,
        f.seth.address,
        f.dai.address,
        f.v2_router,
    );

    assert_pool_error(
        f.exec(router, swap_exact(vec![susd, dai], E18, pool)),
        PoolError::UnsupportedDestinationAsset,
    );
    assert_pool_error(
        f.exec(router, swap_exact(vec![dai, susd], E18, pool)),
        PoolError::UnsupportedSourceAsset,
    );
    assert_pool_error(
        f.exec(router, swap_exact(vec![susd, dai, seth], E18, pool)),
        PoolError::InvalidRoutingAsset,
    );
    assert_pool_error(
        f.exec(router, swap_exact(vec![susd, seth], E18, Pubkey::new_unique())),
        PoolError::RecipientIsNotPool,
    );
    assert_pool_error(
        f.exec(router, encode_call("skim", &())),
        PoolError::InvalidTransaction,
    );
    assert_eq!(f.pool_balance(&susd), 100 * E18);
}

#[test]
fn test_v2_swap_requires_manager_or_trader() {
    let mut f = funded(|f| f.v2_router);
    let (pool, manager, investor, router) = (f.pool, f.manager, f.investor, f.v2_router);
    let data = swap_exact(vec![f.susd.address, f.seth.address], E18, pool);

    assert_pool_error(
        f.world
            .exec_transaction(pool, investor, router, data.clone()),
        PoolError::OnlyManagerOrTrader,
    );

    let trader = Pubkey::new_unique();
    f.world.set_trader(pool, manager, trader).unwrap();
    f.world
        .exec_transaction(pool, trader, router, data)
        .unwrap();
}

#[test]
fn test_v2_reverted_swap_rolls_back() {
    let mut f = funded(|f| f.v2_router);
    let (pool, susd, seth, router) = (f.pool, f.susd.address, f.seth.address, f.v2_router);
    let events_before = f.world.events().len();

    let data = encode_call(
        SWAP_EXACT_TOKENS_FOR_TOKENS,
        &SwapExactTokensForTokens {
            amount_in: 20 * E18,
            amount_out_min: E18,
            path: vec![susd, seth],
            to: pool,
            deadline: DEADLINE,
        },
    );
    assert_pool_error(f.exec(router, data), PoolError::FailedToExecuteCall);

    assert_eq!(f.pool_balance(&susd), 100 * E18);
    assert_eq!(f.world.events().len(), events_before);
}

#[test]
fn test_v2_liquidity_round_trip() {
    let mut f = funded(|f| f.v2_router);
    let (pool, susd, seth, dai, lp, router) = (
        f.pool,
        f.susd.address,
        f.seth.address,
        f.dai.address,
        f.lp.address,
        f.v2_router,
    );
    f.world.chain.tokens.mint(&seth, &pool, E18).unwrap();
    f.approve(seth, router).unwrap();

    let add = |token_a: Pubkey, token_b: Pubkey, to: Pubkey| {
        encode_call(
            ADD_LIQUIDITY,
            &AddLiquidity {
                token_a,
                token_b,
                amount_a_desired: 20 * E18,
                amount_b_desired: E18 / 100,
                amount_a_min: 0,
                amount_b_min: 0,
                to,
                deadline: DEADLINE,
            },
        )
    };

    assert_pool_error(
        f.exec(router, add(susd, seth, pool)),
        PoolError::UnsupportedLpAsset,
    );
    f.add_pool_asset(lp, false);
    assert_pool_error(
        f.exec(router, add(dai, seth, pool)),
        PoolError::UnsupportedAssetTokenA,
    );
    assert_pool_error(
        f.exec(router, add(susd, dai, pool)),
        PoolError::UnsupportedAssetTokenB,
    );
    assert_pool_error(
        f.exec(router, add(susd, seth, Pubkey::new_unique())),
        PoolError::RecipientIsNotPool,
    );

    f.exec(router, add(susd, seth, pool)).unwrap();
    let liquidity = 20 * E18 + E18 / 100;
    assert_eq!(f.pool_balance(&lp), liquidity);
    assert_eq!(f.pool_balance(&susd), 80 * E18);

    f.approve(lp, router).unwrap();
    let remove = encode_call(
        REMOVE_LIQUIDITY,
        &RemoveLiquidity {
            token_a: susd,
            token_b: seth,
            liquidity,
            amount_a_min: 0,
            amount_b_min: 0,
            to: pool,
            deadline: DEADLINE,
        },
    );
    f.exec(router, remove).unwrap();

    assert_eq!(f.pool_balance(&lp), 0);
    assert_eq!(f.pool_balance(&susd), 100 * E18);
    assert_eq!(f.pool_balance(&seth), E18);
    assert_eq!(
        count_events(&f, |event| matches!(event, PoolEvent::LiquidityRemoved(_))),
        1
    );
}

#[test]
fn test_drained_asset_becomes_removable() {
    let mut f = funded(|f| f.v2_router);
    let (pool, manager, susd, dai, router) = (
        f.pool,
        f.manager,
        f.susd.address,
        f.dai.address,
        f.v2_router,
    );
    f.add_pool_asset(dai, false);
    f.approve(dai, router).unwrap();

    f.exec(router, swap_exact(vec![susd, dai], 10 * E18, pool))
        .unwrap();
    assert_eq!(f.pool_balance(&dai), 10 * E18);
    assert_pool_error(
        f.world.change_assets(pool, manager, vec![], vec![dai]),
        PoolError::CannotRemoveNonEmptyAsset,
    );

    f.exec(router, swap_exact(vec![dai, susd], 10 * E18, pool))
        .unwrap();
    assert_eq!(f.pool_balance(&dai), 0);
    f.world
        .change_assets(pool, manager, vec![], vec![dai])
        .unwrap();
    assert!(!f.world.is_supported_asset(&pool, &dai).unwrap());
}

// =============================================================================
// UNISWAP V3 ROUTER GUARD
// =============================================================================

#[test]
fn test_v3_single_hop_swaps() {
    let mut f = funded(|f| f.v3_router);
    let (pool, susd, seth, dai, router) = (
        f.pool,
        f.susd.address,
        f.seth.address,
        f.dai.address,
        f.v3_router,
    );

    f.exec(router, exact_input_single(susd, seth, 20 * E18, pool))
        .unwrap();
    assert_eq!(f.pool_balance(&seth), E18 / 100);

    let exact_output = encode_call(
        EXACT_OUTPUT_SINGLE,
        &ExactOutputSingle {
            token_in: susd,
            token_out: seth,
            fee: 500,
            recipient: pool,
            deadline: DEADLINE,
            amount_out: E18 / 100,
            amount_in_maximum: 20 * E18,
        },
    );
    f.exec(router, exact_output).unwrap();
    assert_eq!(f.pool_balance(&susd), 60 * E18);
    assert_eq!(f.pool_balance(&seth), E18 / 50);

    assert_pool_error(
        f.exec(router, exact_input_single(susd, dai, E18, pool)),
        PoolError::UnsupportedDestinationAsset,
    );
    assert_pool_error(
        f.exec(router, exact_input_single(susd, seth, E18, f.manager)),
        PoolError::RecipientIsNotPool,
    );
}

#[test]
fn test_v3_multi_hop_path() {
    let mut f = funded(|f| f.v3_router);
    let (pool, susd, seth, dai, router) = (
        f.pool,
        f.susd.address,
        f.seth.address,
        f.dai.address,
        f.v3_router,
    );
    let exact_input = |path: Vec<Pubkey>, fees: Vec<u32>| {
        encode_call(
            EXACT_INPUT,
            &ExactInput {
                path,
                fees,
                recipient: pool,
                deadline: DEADLINE,
                amount_in: 10 * E18,
                amount_out_minimum: 0,
            },
        )
    };

    assert_pool_error(
        f.exec(router, exact_input(vec![susd, dai, seth], vec![500, 3_000])),
        PoolError::InvalidRoutingAsset,
    );
    assert_pool_error(
        f.exec(router, exact_input(vec![susd, seth], vec![])),
        PoolError::InvalidTransactionData,
    );

    f.exec(router, exact_input(vec![susd, seth], vec![3_000]))
        .unwrap();
    assert_eq!(f.pool_balance(&seth), E18 / 200);
}

#[test]
fn test_v3_multicall_all_inner_calls_valid() {
    let mut f = funded(|f| f.v3_router);
    let (pool, susd, seth, router) = (f.pool, f.susd.address, f.seth.address, f.v3_router);

    let ret = f
        .exec(
            router,
            multicall(vec![
                exact_input_single(susd, seth, 10 * E18, pool),
                exact_input_single(susd, seth, 10 * E18, pool),
            ]),
        )
        .unwrap();

    let results: Vec<Vec<u8>> = decode_return(&ret).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(f.pool_balance(&seth), E18 / 100);
    assert_eq!(
        count_events(&f, |event| matches!(event, PoolEvent::ExchangeFrom(_))),
        2
    );
    assert!(f.world.events().iter().any(|event| matches!(
        event,
        PoolEvent::TransactionExecuted(tx)
            if tx.transaction_type == TransactionType::Multicall as u16
    )));
}

#[test]
fn test_v3_multicall_rejects_whole_batch() {
    let mut f = funded(|f| f.v3_router);
    let (pool, susd, seth, dai, router) = (
        f.pool,
        f.susd.address,
        f.seth.address,
        f.dai.address,
        f.v3_router,
    );

    assert_pool_error(
        f.exec(
            router,
            multicall(vec![
                exact_input_single(susd, seth, 10 * E18, pool),
                encode_call("sweep_token", &(susd, f.manager)),
            ]),
        ),
        PoolError::InvalidTransaction,
    );
    assert_pool_error(
        f.exec(
            router,
            multicall(vec![
                exact_input_single(susd, seth, 10 * E18, pool),
                exact_input_single(susd, dai, 10 * E18, pool),
            ]),
        ),
        PoolError::UnsupportedDestinationAsset,
    );
    assert_pool_error(f.exec(router, multicall(vec![])), PoolError::InvalidTransaction);

    assert_eq!(f.pool_balance(&susd), 100 * E18);
    assert_eq!(f.pool_balance(&seth), 0);
    assert_eq!(
        count_events(&f, |event| matches!(event, PoolEvent::ExchangeFrom(_))),
        0
    );
}

#[test]
fn test_v3_multicall_does_not_nest() {
    let mut f = funded(|f| f.v3_router);
    let (pool, susd, seth, router) = (f.pool, f.susd.address, f.seth.address, f.v3_router);
    let swap = exact_input_single(susd, seth, 10 * E18, pool);

    assert_pool_error(
        f.exec(router, multicall(vec![multicall(vec![swap.clone()])])),
        PoolError::InvalidTransaction,
    );

    // Deep nesting from an outsider is rejected at the first level
    let mut data = swap;
    for _ in 0..1_000 {
        data = multicall(vec![data]);
    }
    let stranger = Pubkey::new_unique();
    assert_pool_error(
        f.world.exec_transaction(pool, stranger, router, data),
        PoolError::InvalidTransaction,
    );
    assert_eq!(f.pool_balance(&susd), 100 * E18);
}

// =============================================================================
// STAKING GUARD & STAKED LP ASSET GUARD
// =============================================================================

#[test]
fn test_stake_tracks_position() {
    let mut f = staked_lp_pool(RewardPolicy::Ignore);
    let (pool, lp, staking) = (f.pool, f.lp.address, f.staking);
    assert_eq!(f.world.total_fund_value(&pool).unwrap(), 200 * E18);

    let ret = f.exec(staking, stake(6 * E18, pool)).unwrap();

    let position_id: u64 = decode_return(&ret).unwrap();
    assert_eq!(staking_positions(&f), vec![position_id]);
    assert_eq!(f.pool_balance(&lp), 4 * E18);
    assert_eq!(f.world.asset_balance(&pool, &lp).unwrap(), 10 * E18);
    assert_eq!(f.world.total_fund_value(&pool).unwrap(), 200 * E18);
    assert_eq!(
        count_events(&f, |event| matches!(event, PoolEvent::Staked(_))),
        1
    );
}

#[test]
fn test_stake_checks() {
    let mut f = staked_lp_pool(RewardPolicy::Ignore);
    let (pool, staking) = (f.pool, f.staking);

    assert_pool_error(
        f.exec(staking, stake(E18, Pubkey::new_unique())),
        PoolError::RecipientIsNotPool,
    );
    assert_pool_error(
        f.exec(staking, unstake(99, E18, pool)),
        PoolError::PositionNotOwnedByPool,
    );

    for _ in 0..DEFAULT_MAXIMUM_STAKING_POSITIONS {
        f.exec(staking, stake(E18, pool)).unwrap();
    }
    assert_pool_error(
        f.exec(staking, stake(E18, pool)),
        PoolError::TooManyStakingPositions,
    );
    assert_eq!(staking_positions(&f).len(), DEFAULT_MAXIMUM_STAKING_POSITIONS);
}

#[test]
fn test_stake_requires_supported_lp() {
    let mut f = setup();
    let (pool, staking) = (f.pool, f.staking);

    assert_pool_error(
        f.exec(staking, stake(E18, pool)),
        PoolError::UnsupportedAsset,
    );
}

#[test]
fn test_manager_unstake_removes_empty_position() {
    let mut f = staked_lp_pool(RewardPolicy::Ignore);
    let (pool, lp, staking) = (f.pool, f.lp.address, f.staking);
    f.exec(staking, stake(6 * E18, pool)).unwrap();

    f.exec(staking, unstake(1, 2 * E18, pool)).unwrap();
    assert_eq!(staking_positions(&f), vec![1]);

    f.exec(staking, unstake(1, 4 * E18, pool)).unwrap();
    assert!(staking_positions(&f).is_empty());
    assert_eq!(f.pool_balance(&lp), 10 * E18);
}

#[test]
fn test_withdraw_unstakes_pro_rata() {
    let mut f = staked_lp_pool(RewardPolicy::Ignore);
    let (pool, investor, lp, staking) = (f.pool, f.investor, f.lp.address, f.staking);
    f.exec(staking, stake(6 * E18, pool)).unwrap();
    f.warp(ONE_DAY);

    let withdrawn = f.world.withdraw(pool, investor, 50 * E18).unwrap();

    let lp_out = withdrawn.iter().find(|w| w.asset == lp).unwrap();
    assert_eq!(lp_out.amount, 5 * E18);
    assert!(lp_out.external_withdraw_processed);
    assert_eq!(f.world.chain.tokens.balance_of(&lp, &investor), 5 * E18);
    assert_eq!(f.pool_balance(&lp), 2 * E18);
    assert_eq!(
        f.world
            .chain
            .contract_mut::<MockStaking>(&staking)
            .unwrap()
            .position(1)
            .unwrap()
            .amount,
        3 * E18
    );
    assert_eq!(staking_positions(&f), vec![1]);
    assert_eq!(f.world.total_fund_value(&pool).unwrap(), 100 * E18);

    // The last investor out empties the position
    f.world.withdraw(pool, investor, 50 * E18).unwrap();
    assert_eq!(f.world.chain.tokens.balance_of(&lp, &investor), 10 * E18);
    assert!(staking_positions(&f).is_empty());
    assert_eq!(f.world.total_supply(&pool).unwrap(), 0);
}

#[test]
fn test_claim_is_public_and_rewards_excluded_from_value() {
    let mut f = staked_lp_pool(RewardPolicy::Ignore);
    let (pool, reward, staking) = (f.pool, f.reward.address, f.staking);
    f.exec(staking, stake(6 * E18, pool)).unwrap();
    f.world
        .chain
        .contract_mut::<MockStaking>(&staking)
        .unwrap()
        .accrue_rewards(1, 5 * E18)
        .unwrap();

    assert_eq!(f.world.total_fund_value(&pool).unwrap(), 200 * E18);

    let stranger = Pubkey::new_unique();
    let claim = encode_call(
        CLAIM,
        &Claim {
            position_id: 1,
            recipient: pool,
        },
    );
    f.world
        .exec_transaction(pool, stranger, staking, claim)
        .unwrap();

    assert_eq!(f.pool_balance(&reward), 5 * E18);
    assert_eq!(f.world.total_fund_value(&pool).unwrap(), 205 * E18);

    // Staking calls other than claim stay restricted
    assert_pool_error(
        f.world
            .exec_transaction(pool, stranger, staking, unstake(1, E18, pool)),
        PoolError::OnlyManagerOrTrader,
    );
}

#[test]
fn test_withdraw_claims_rewards_when_configured() {
    let mut f = staked_lp_pool(RewardPolicy::ClaimOnWithdraw);
    let (pool, investor, reward, staking) = (f.pool, f.investor, f.reward.address, f.staking);
    f.exec(staking, stake(6 * E18, pool)).unwrap();
    f.world
        .chain
        .contract_mut::<MockStaking>(&staking)
        .unwrap()
        .accrue_rewards(1, 4 * E18)
        .unwrap();
    f.warp(ONE_DAY);

    f.world.withdraw(pool, investor, 50 * E18).unwrap();

    // Claimed into the pool for the remaining holders
    assert_eq!(f.pool_balance(&reward), 4 * E18);
    assert_eq!(
        f.world
            .chain
            .contract_mut::<MockStaking>(&staking)
            .unwrap()
            .position(1)
            .unwrap()
            .pending_rewards,
        0
    );
}

#[test]
fn test_stake_with_mismatched_guard_rolls_back() {
    let mut f = staked_lp_pool(RewardPolicy::Ignore);
    let (pool, lp, staking, dao) = (f.pool, f.lp.address, f.staking, f.dao);

    // Guard registered under one address but reporting another
    let registered_as = Pubkey::new_unique();
    f.world
        .set_contract_guard(
            dao,
            staking,
            registered_as,
            Arc::new(StakingGuard::new(Pubkey::new_unique())),
        )
        .unwrap();

    assert_pool_error(
        f.exec(staking, stake(6 * E18, pool)),
        PoolError::NotCorrectContractGuard,
    );
    assert_eq!(f.pool_balance(&lp), 10 * E18);
    assert!(staking_positions(&f).is_empty());
}

#[test]
fn test_stake_only_on_registered_staking_contract() {
    let mut f = staked_lp_pool(RewardPolicy::Ignore);
    let (pool, lp, reward, dao) = (f.pool, f.lp.address, f.reward.address, f.dao);

    let other_staking = Pubkey::new_unique();
    let other_guard = Pubkey::new_unique();
    f.world
        .chain
        .deploy_contract(other_staking, Box::new(MockStaking::new(lp, reward)));
    f.world
        .set_contract_guard(
            dao,
            other_staking,
            other_guard,
            Arc::new(StakingGuard::new(other_guard)),
        )
        .unwrap();
    f.approve(lp, other_staking).unwrap();

    assert_pool_error(
        f.exec(other_staking, stake(10 * E18, pool)),
        PoolError::UnsupportedStakingContract,
    );
    assert_eq!(f.pool_balance(&lp), 10 * E18);
    assert_eq!(f.world.total_fund_value(&pool).unwrap(), 200 * E18);
}

#[test]
fn test_staked_lp_cannot_be_removed() {
    let mut f = staked_lp_pool(RewardPolicy::Ignore);
    let (pool, manager, lp, staking) = (f.pool, f.manager, f.lp.address, f.staking);
    f.exec(staking, stake(10 * E18, pool)).unwrap();
    assert_eq!(f.pool_balance(&lp), 0);

    assert_pool_error(
        f.world.change_assets(pool, manager, vec![], vec![lp]),
        PoolError::CannotRemoveNonEmptyAsset,
    );
    assert!(f.world.is_supported_asset(&pool, &lp).unwrap());
}
