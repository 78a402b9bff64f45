use std::any::Any;
use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::errors::PoolError;
use crate::interfaces::aggregator::AggregatorV3;
use crate::interfaces::erc20::{Approve, BalanceOf, Transfer, APPROVE, BALANCE_OF, TRANSFER};
use crate::interfaces::{decode_args, encode_return, selector, split_selector};
use crate::token::TokenLedger;

/// Execution environment handed to an external contract for one call
pub struct CallEnv<'a> {
    pub now: i64,
    /// Address of the contract being called
    pub this: Pubkey,
    pub caller: Pubkey,
    pub tokens: &'a mut TokenLedger,
}

/// An external protocol contract reachable through low-level calls
pub trait ExternalContract {
    /// State-changing call; returns borsh-encoded return data
    fn call(&mut self, env: &mut CallEnv, data: &[u8]) -> Result<Vec<u8>>;

    /// Read-only call
    fn view(&self, tokens: &TokenLedger, data: &[u8]) -> Result<Vec<u8>>;

    fn box_clone(&self) -> Box<dyn ExternalContract>;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl Clone for Box<dyn ExternalContract> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Host ledger the pools live on: clock, tokens, external contracts and
/// price feeds
#[derive(Clone, Default)]
pub struct Chain {
    /// Current unix timestamp
    pub now: i64,
    pub tokens: TokenLedger,
    contracts: BTreeMap<Pubkey, Box<dyn ExternalContract>>,
    aggregators: BTreeMap<Pubkey, Box<dyn AggregatorV3>>,
}

impl Chain {
    pub fn new(now: i64) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    /// Advance the clock
    pub fn warp(&mut self, seconds: i64) {
        self.now += seconds;
    }

    pub fn deploy_contract(&mut self, address: Pubkey, contract: Box<dyn ExternalContract>) {
        self.contracts.insert(address, contract);
    }

    pub fn deploy_aggregator(&mut self, address: Pubkey, aggregator: Box<dyn AggregatorV3>) {
        self.aggregators.insert(address, aggregator);
    }

    /// Typed mutable access to a deployed contract
    pub fn contract_mut<T: 'static>(&mut self, address: &Pubkey) -> Option<&mut T> {
        self.contracts
            .get_mut(address)
            .and_then(|c| c.as_any_mut().downcast_mut::<T>())
    }

    pub fn aggregator(&self, address: &Pubkey) -> Option<&dyn AggregatorV3> {
        self.aggregators.get(address).map(|a| &**a)
    }

    /// Typed mutable access to a deployed price feed
    pub fn aggregator_mut<T: 'static>(&mut self, address: &Pubkey) -> Option<&mut T> {
        self.aggregators
            .get_mut(address)
            .and_then(|a| a.as_any_mut().downcast_mut::<T>())
    }

    /// Low-level call from `caller` to `target`
    pub fn call(&mut self, caller: Pubkey, target: Pubkey, data: &[u8]) -> Result<Vec<u8>> {
        if self.tokens.is_token(&target) {
            return self.call_token(caller, target, data);
        }

        let contract = self
            .contracts
            .get_mut(&target)
            .ok_or(error!(PoolError::CallToNonContract))?;
        let mut env = CallEnv {
            now: self.now,
            this: target,
            caller,
            tokens: &mut self.tokens,
        };
        contract.call(&mut env, data)
    }

    /// Read-only call to `target`
    pub fn static_call(&self, target: Pubkey, data: &[u8]) -> Result<Vec<u8>> {
        if self.tokens.is_token(&target) {
            let (sel, args) = split_selector(data)?;
            require!(sel == selector(BALANCE_OF), PoolError::InvalidTransactionData);
            let args: BalanceOf = decode_args(args)?;
            return Ok(encode_return(&self.tokens.balance_of(&target, &args.owner)));
        }

        let contract = self
            .contracts
            .get(&target)
            .ok_or(error!(PoolError::CallToNonContract))?;
        contract.view(&self.tokens, data)
    }

    fn call_token(&mut self, caller: Pubkey, token: Pubkey, data: &[u8]) -> Result<Vec<u8>> {
        let (sel, args) = split_selector(data)?;
        if sel == selector(APPROVE) {
            let args: Approve = decode_args(args)?;
            self.tokens.approve(&token, &caller, &args.spender, args.amount)?;
        } else if sel == selector(TRANSFER) {
            let args: Transfer = decode_args(args)?;
            self.tokens.transfer(&token, &caller, &args.to, args.amount)?;
        } else {
            return err!(PoolError::InvalidTransactionData);
        }
        Ok(encode_return(&true))
    }
}
