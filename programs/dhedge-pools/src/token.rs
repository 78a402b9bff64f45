use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::errors::PoolError;

/// A registered ERC-20-like token
#[derive(Clone, Debug, PartialEq)]
pub struct TokenInfo {
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: u128,
}

/// Balances and allowances of every token on the host ledger
#[derive(Clone, Debug, Default)]
pub struct TokenLedger {
    tokens: BTreeMap<Pubkey, TokenInfo>,
    /// (token, holder) -> balance
    balances: BTreeMap<(Pubkey, Pubkey), u128>,
    /// (token, owner, spender) -> allowance
    allowances: BTreeMap<(Pubkey, Pubkey, Pubkey), u128>,
}

impl TokenLedger {
    pub fn register(&mut self, token: Pubkey, symbol: &str, decimals: u8) {
        self.tokens.insert(
            token,
            TokenInfo {
                symbol: symbol.to_string(),
                decimals,
                total_supply: 0,
            },
        );
    }

    pub fn is_token(&self, token: &Pubkey) -> bool {
        self.tokens.contains_key(token)
    }

    pub fn info(&self, token: &Pubkey) -> Result<&TokenInfo> {
        self.tokens
            .get(token)
            .ok_or(error!(PoolError::UnknownToken))
    }

    pub fn decimals(&self, token: &Pubkey) -> Result<u8> {
        Ok(self.info(token)?.decimals)
    }

    pub fn balance_of(&self, token: &Pubkey, holder: &Pubkey) -> u128 {
        self.balances
            .get(&(*token, *holder))
            .copied()
            .unwrap_or(0)
    }

    pub fn allowance(&self, token: &Pubkey, owner: &Pubkey, spender: &Pubkey) -> u128 {
        self.allowances
            .get(&(*token, *owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn approve(
        &mut self,
        token: &Pubkey,
        owner: &Pubkey,
        spender: &Pubkey,
        amount: u128,
    ) -> Result<()> {
        self.info(token)?;
        self.allowances.insert((*token, *owner, *spender), amount);
        Ok(())
    }

    pub fn transfer(
        &mut self,
        token: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u128,
    ) -> Result<()> {
        self.info(token)?;
        let from_balance = self.balance_of(token, from);
        require!(from_balance >= amount, PoolError::InsufficientBalance);
        if from == to || amount == 0 {
            return Ok(());
        }

        self.balances.insert((*token, *from), from_balance - amount);
        let to_balance = self
            .balance_of(token, to)
            .checked_add(amount)
            .ok_or(error!(PoolError::MathOverflow))?;
        self.balances.insert((*token, *to), to_balance);
        Ok(())
    }

    /// Move `amount` from `from` to `to`, spending `spender`'s allowance
    pub fn transfer_from(
        &mut self,
        token: &Pubkey,
        spender: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u128,
    ) -> Result<()> {
        let allowance = self.allowance(token, from, spender);
        require!(allowance >= amount, PoolError::InsufficientAllowance);

        self.transfer(token, from, to, amount)?;
        if allowance != u128::MAX {
            self.allowances
                .insert((*token, *from, *spender), allowance - amount);
        }
        Ok(())
    }

    pub fn mint(&mut self, token: &Pubkey, to: &Pubkey, amount: u128) -> Result<()> {
        let info = self
            .tokens
            .get_mut(token)
            .ok_or(error!(PoolError::UnknownToken))?;
        info.total_supply = info
            .total_supply
            .checked_add(amount)
            .ok_or(error!(PoolError::MathOverflow))?;

        let balance = self
            .balance_of(token, to)
            .checked_add(amount)
            .ok_or(error!(PoolError::MathOverflow))?;
        self.balances.insert((*token, *to), balance);
        Ok(())
    }

    pub fn burn(&mut self, token: &Pubkey, from: &Pubkey, amount: u128) -> Result<()> {
        let balance = self.balance_of(token, from);
        require!(balance >= amount, PoolError::InsufficientBalance);

        let info = self
            .tokens
            .get_mut(token)
            .ok_or(error!(PoolError::UnknownToken))?;
        info.total_supply = info.total_supply.saturating_sub(amount);
        self.balances.insert((*token, *from), balance - amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with_token() -> (TokenLedger, Pubkey) {
        let mut ledger = TokenLedger::default();
        let token = Pubkey::new_unique();
        ledger.register(token, "USDC", 6);
        (ledger, token)
    }

    #[test]
    fn test_mint_and_transfer() {
        let (mut ledger, token) = ledger_with_token();
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();

        ledger.mint(&token, &alice, 1_000).unwrap();
        ledger.transfer(&token, &alice, &bob, 400).unwrap();

        assert_eq!(ledger.balance_of(&token, &alice), 600);
        assert_eq!(ledger.balance_of(&token, &bob), 400);
        assert_eq!(ledger.info(&token).unwrap().total_supply, 1_000);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let (mut ledger, token) = ledger_with_token();
        let alice = Pubkey::new_unique();
        ledger.mint(&token, &alice, 10).unwrap();

        assert!(ledger
            .transfer(&token, &alice, &Pubkey::new_unique(), 11)
            .is_err());
        assert_eq!(ledger.balance_of(&token, &alice), 10);
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let (mut ledger, token) = ledger_with_token();
        let owner = Pubkey::new_unique();
        let spender = Pubkey::new_unique();
        ledger.mint(&token, &owner, 1_000).unwrap();

        assert!(ledger
            .transfer_from(&token, &spender, &owner, &spender, 100)
            .is_err());

        ledger.approve(&token, &owner, &spender, 300).unwrap();
        ledger
            .transfer_from(&token, &spender, &owner, &spender, 100)
            .unwrap();

        assert_eq!(ledger.allowance(&token, &owner, &spender), 200);
        assert_eq!(ledger.balance_of(&token, &spender), 100);
    }

    #[test]
    fn test_unknown_token() {
        let mut ledger = TokenLedger::default();
        assert!(ledger
            .mint(&Pubkey::new_unique(), &Pubkey::new_unique(), 1)
            .is_err());
    }
}
