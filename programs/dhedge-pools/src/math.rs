use alloy_primitives::U256;
use anchor_lang::prelude::*;

use crate::constants::PRECISION;
use crate::errors::PoolError;

/// `a * b / denominator` with a 256-bit intermediate product, rounding down
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128> {
    require!(denominator != 0, PoolError::DivisionByZero);

    let product = U256::from(a)
        .checked_mul(U256::from(b))
        .ok_or(error!(PoolError::MathOverflow))?;
    let quotient = product
        .checked_div(U256::from(denominator))
        .ok_or(error!(PoolError::DivisionByZero))?;

    u128::try_from(quotient).map_err(|_| error!(PoolError::MathOverflow))
}

/// 10^exponent as u128
pub fn pow10(exponent: u32) -> Result<u128> {
    10u128
        .checked_pow(exponent)
        .ok_or(error!(PoolError::MathOverflow))
}

/// USD value (18 decimals) of `amount` native units priced at `price` (18 decimals)
pub fn usd_value(amount: u128, price: u128, decimals: u8) -> Result<u128> {
    mul_div(amount, price, pow10(decimals as u32)?)
}

/// Rescale an aggregator answer from `decimals` to 18 decimals
pub fn normalize_price(answer: u128, decimals: u8) -> Result<u128> {
    let decimals = decimals as u32;
    if decimals <= 18 {
        answer
            .checked_mul(pow10(18 - decimals)?)
            .ok_or(error!(PoolError::MathOverflow))
    } else {
        Ok(answer / pow10(decimals - 18)?)
    }
}

/// Apply an 18-decimal fraction to an amount: amount * portion / 1e18
pub fn apply_portion(amount: u128, portion: u128) -> Result<u128> {
    mul_div(amount, portion, PRECISION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_wide_intermediate() {
        // 1e30 * 1e20 overflows u128 but the quotient fits
        let a = 1_000_000_000_000_000_000_000_000_000_000u128;
        let b = 100_000_000_000_000_000_000u128;
        assert_eq!(mul_div(a, b, b).unwrap(), a);
    }

    #[test]
    fn test_mul_div_rounds_down() {
        assert_eq!(mul_div(100, 333, 1000).unwrap(), 33);
    }

    #[test]
    fn test_mul_div_zero_denominator() {
        assert!(mul_div(1, 1, 0).is_err());
    }

    #[test]
    fn test_mul_div_result_overflow() {
        assert!(mul_div(u128::MAX, u128::MAX, 1).is_err());
    }

    #[test]
    fn test_normalize_price() {
        // Chainlink style 8 decimals: $2000
        assert_eq!(
            normalize_price(2_000_00000000, 8).unwrap(),
            2_000 * PRECISION
        );
        // Already 18 decimals
        assert_eq!(normalize_price(PRECISION, 18).unwrap(), PRECISION);
        // More than 18 decimals truncates
        assert_eq!(normalize_price(5 * 10u128.pow(20), 20).unwrap(), 5 * PRECISION);
    }

    #[test]
    fn test_usd_value_six_decimal_token() {
        // 100 USDC (6 decimals) at $1
        assert_eq!(usd_value(100_000_000, PRECISION, 6).unwrap(), 100 * PRECISION);
    }

    #[test]
    fn test_apply_portion() {
        assert_eq!(apply_portion(1_000, PRECISION / 2).unwrap(), 500);
        assert_eq!(apply_portion(1_000, PRECISION).unwrap(), 1_000);
    }
}
