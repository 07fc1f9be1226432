use std::fmt;
use std::ops::{Div, Mul, Neg};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::MoneyError;

use super::Currency;

/* An amount tied to its currency. Combining two amounts requires the same currency,
conversion is always explicit (see CurrencyConverter). */
#[derive(Hash, Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Money { amount, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Money::new(Decimal::ZERO, currency)
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.same_currency(other)?;
        Ok(Money::new(self.amount + other.amount, self.currency.clone()))
    }

    /* Quotient of two amounts of the same currency, e.g. price today / buy price */
    pub fn ratio(&self, other: &Money) -> Result<Decimal, MoneyError> {
        self.same_currency(other)?;
        if other.amount.is_zero() {
            return Err(MoneyError::DivisionByZero(other.currency.clone()));
        }
        Ok(self.amount / other.amount)
    }

    fn same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(())
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, other: Decimal) -> Money {
        Money::new(self.amount * other, self.currency)
    }
}

impl Mul<Decimal> for &Money {
    type Output = Money;

    fn mul(self, other: Decimal) -> Money {
        Money::new(self.amount * other, self.currency.clone())
    }
}

impl Div<Decimal> for Money {
    type Output = Money;

    fn div(self, other: Decimal) -> Money {
        Money::new(self.amount / other, self.currency)
    }
}

impl Div<Decimal> for &Money {
    type Output = Money;

    fn div(self, other: Decimal) -> Money {
        Money::new(self.amount / other, self.currency.clone())
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money::new(-self.amount, self.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match f.precision() {
            Some(dp) => write!(f, "{} {}", self.amount.round_dp(dp as u32), self.currency),
            None => write!(f, "{} {}", self.amount, self.currency),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_add_same_currency() {
        let a = Money::new(dec!(1.5), Currency::new("USD"));
        let b = Money::new(dec!(2), Currency::new("USD"));
        assert_eq!(a.checked_add(&b).unwrap().amount, dec!(3.5));
    }

    #[test]
    fn test_add_other_currency_fails() {
        let a = Money::new(dec!(1), Currency::new("USD"));
        let b = Money::new(dec!(1), Currency::new("EUR"));
        assert!(matches!(
            a.checked_add(&b),
            Err(MoneyError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_display_precision() {
        let a = Money::new(dec!(1.23456), Currency::new("EUR"));
        assert_eq!(format!("{:.2}", a), "1.23 EUR");
    }
}
