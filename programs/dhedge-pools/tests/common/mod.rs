#![allow(dead_code)]

use std::sync::Arc;

use anchor_lang::prelude::*;
use dhedge_pools::{
    asset_guards::{RewardPolicy, StakedLpAssetGuard},
    asset_handler::AssetConfig,
    chain::Chain,
    constants::*,
    errors::PoolError,
    guards::{Erc20Guard, StakingGuard, UniswapV2RouterGuard, UniswapV3RouterGuard},
    instructions::CreateFundParams,
    interfaces::encode_call,
    interfaces::erc20::{Approve, APPROVE},
    mock::{MockAggregator, MockStaking, MockUniswapV2Router, MockUniswapV3Router},
    state::{Asset, FactoryConfig},
    DHedge,
};

pub const NOW: i64 = 1_700_000_000;
pub const E18: u128 = PRECISION;

/// 8-decimal feed answers
pub const SUSD_PRICE: i128 = 100_000_000;
pub const SETH_PRICE: i128 = 200_000_000_000;
pub const DAI_PRICE: i128 = 100_000_000;
pub const LP_PRICE: i128 = 1_000_000_000;
pub const REWARD_PRICE: i128 = 100_000_000;

pub struct Token {
    pub address: Pubkey,
    pub feed: Pubkey,
    pub answer: i128,
}

/// A deployed protocol with oracles, guards, the mock protocols and one pool
///
/// - sUSD ($1, deposit asset) and sETH ($2000) are supported by the pool
/// - DAI ($1) is registered with the asset handler but not supported
/// - LP ($10, staked LP type) and RWD ($1) are registered, not supported
pub struct Fixture {
    pub world: DHedge,
    pub dao: Pubkey,
    pub manager: Pubkey,
    pub investor: Pubkey,
    pub susd: Token,
    pub seth: Token,
    pub dai: Token,
    pub lp: Token,
    pub reward: Token,
    pub v2_router: Pubkey,
    pub v3_router: Pubkey,
    pub staking: Pubkey,
    pub staking_guard: Pubkey,
    pub pool: Pubkey,
    pub manager_logic: Pubkey,
}

fn token(chain: &mut Chain, symbol: &str, answer: i128) -> Token {
    let address = Pubkey::new_unique();
    let feed = Pubkey::new_unique();
    chain.tokens.register(address, symbol, 18);
    chain.deploy_aggregator(feed, Box::new(MockAggregator::new(8, answer, NOW)));
    Token {
        address,
        feed,
        answer,
    }
}

pub fn setup() -> Fixture {
    setup_with(RewardPolicy::Ignore)
}

pub fn setup_with(reward_policy: RewardPolicy) -> Fixture {
    let dao = Pubkey::new_unique();
    let manager = Pubkey::new_unique();
    let investor = Pubkey::new_unique();

    let mut chain = Chain::new(NOW);
    let susd = token(&mut chain, "sUSD", SUSD_PRICE);
    let seth = token(&mut chain, "sETH", SETH_PRICE);
    let dai = token(&mut chain, "DAI", DAI_PRICE);
    let lp = token(&mut chain, "LP", LP_PRICE);
    let reward = token(&mut chain, "RWD", REWARD_PRICE);

    // 1 sETH = 2000 sUSD, 1 sUSD = 1 DAI
    let v2_router = Pubkey::new_unique();
    let mut v2 = MockUniswapV2Router::new();
    v2.rates.set(seth.address, susd.address, 2_000, 1);
    v2.rates.set(susd.address, dai.address, 1, 1);
    v2.create_pair(susd.address, seth.address, lp.address);
    chain.deploy_contract(v2_router, Box::new(v2));

    let v3_router = Pubkey::new_unique();
    let mut v3 = MockUniswapV3Router::new();
    v3.rates.set(seth.address, susd.address, 2_000, 1);
    v3.rates.set(susd.address, dai.address, 1, 1);
    chain.deploy_contract(v3_router, Box::new(v3));

    let staking = Pubkey::new_unique();
    chain.deploy_contract(staking, Box::new(MockStaking::new(lp.address, reward.address)));

    // Router liquidity
    for router in [v2_router, v3_router] {
        chain.tokens.mint(&seth.address, &router, 1_000 * E18).unwrap();
        chain.tokens.mint(&susd.address, &router, 1_000_000 * E18).unwrap();
        chain.tokens.mint(&dai.address, &router, 1_000_000 * E18).unwrap();
    }

    let config = FactoryConfig {
        dao,
        ..FactoryConfig::default()
    };
    let mut world = DHedge::new(config, chain).unwrap();

    let assets: Vec<AssetConfig> = [
        (&susd, ASSET_TYPE_ERC20),
        (&seth, ASSET_TYPE_ERC20),
        (&dai, ASSET_TYPE_ERC20),
        (&lp, ASSET_TYPE_STAKED_LP),
        (&reward, ASSET_TYPE_ERC20),
    ]
    .iter()
    .map(|(token, asset_type)| AssetConfig {
        asset: token.address,
        asset_type: *asset_type,
        aggregator: token.feed,
    })
    .collect();
    world.add_assets(dao, &assets).unwrap();

    world
        .set_asset_guard(dao, ASSET_TYPE_ERC20, Pubkey::new_unique(), Arc::new(Erc20Guard))
        .unwrap();
    world
        .set_asset_guard(
            dao,
            ASSET_TYPE_STAKED_LP,
            Pubkey::new_unique(),
            Arc::new(StakedLpAssetGuard::new(reward_policy)),
        )
        .unwrap();

    world
        .set_contract_guard(dao, v2_router, Pubkey::new_unique(), Arc::new(UniswapV2RouterGuard))
        .unwrap();
    world
        .set_contract_guard(dao, v3_router, Pubkey::new_unique(), Arc::new(UniswapV3RouterGuard))
        .unwrap();
    let staking_guard = Pubkey::new_unique();
    world
        .set_contract_guard(dao, staking, staking_guard, Arc::new(StakingGuard::new(staking_guard)))
        .unwrap();
    world
        .set_addresses(dao, &[(STAKING_POSITIONS_KEY, staking)])
        .unwrap();

    let (pool, manager_logic) = world
        .create_fund(CreateFundParams {
            manager,
            name: "Barren Wuffet".to_string(),
            symbol: "BW".to_string(),
            is_private: false,
            manager_fee_numerator: 0,
            assets: vec![
                Asset {
                    asset: susd.address,
                    is_deposit: true,
                },
                Asset {
                    asset: seth.address,
                    is_deposit: false,
                },
            ],
        })
        .unwrap();

    world
        .chain
        .tokens
        .mint(&susd.address, &investor, 1_000 * E18)
        .unwrap();
    world
        .chain
        .tokens
        .approve(&susd.address, &investor, &pool, u128::MAX)
        .unwrap();
    world.take_events();

    Fixture {
        world,
        dao,
        manager,
        investor,
        susd,
        seth,
        dai,
        lp,
        reward,
        v2_router,
        v3_router,
        staking,
        staking_guard,
        pool,
        manager_logic,
    }
}

impl Fixture {
    /// Publish every feed's answer again at the current time
    pub fn refresh_prices(&mut self) {
        let now = self.world.chain.now;
        for token in [&self.susd, &self.seth, &self.dai, &self.lp, &self.reward] {
            self.world
                .chain
                .aggregator_mut::<MockAggregator>(&token.feed)
                .unwrap()
                .set_answer(token.answer, now);
        }
    }

    /// Advance the clock and keep the feeds fresh
    pub fn warp(&mut self, seconds: i64) {
        self.world.chain.warp(seconds);
        self.refresh_prices();
    }

    pub fn deposit(&mut self, amount: u128) -> u128 {
        let (pool, investor, susd) = (self.pool, self.investor, self.susd.address);
        self.world.deposit(pool, investor, susd, amount).unwrap()
    }

    /// Manager approves `spender` for `token` through the pool
    pub fn approve(&mut self, token: Pubkey, spender: Pubkey) -> Result<Vec<u8>> {
        let data = encode_call(
            APPROVE,
            &Approve {
                spender,
                amount: u128::MAX,
            },
        );
        self.world
            .exec_transaction(self.pool, self.manager, token, data)
    }

    pub fn exec(&mut self, to: Pubkey, data: Vec<u8>) -> Result<Vec<u8>> {
        self.world
            .exec_transaction(self.pool, self.manager, to, data)
    }

    pub fn pool_balance(&self, token: &Pubkey) -> u128 {
        self.world.chain.tokens.balance_of(token, &self.pool)
    }

    pub fn add_pool_asset(&mut self, asset: Pubkey, is_deposit: bool) {
        self.world
            .change_assets(
                self.pool,
                self.manager,
                vec![Asset { asset, is_deposit }],
                vec![],
            )
            .unwrap();
    }
}

pub fn assert_pool_error<T: std::fmt::Debug>(result: Result<T>, expected: PoolError) {
    assert_eq!(result.unwrap_err(), anchor_lang::error::Error::from(expected));
}
