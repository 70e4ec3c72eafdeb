use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

/// A currency amount, always held at two decimal places.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Saturates at the `i64` range.
    pub fn to_cents(self) -> i64 {
        let saturated = if self.0.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        };
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.round().to_i64())
            .unwrap_or(saturated)
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies by `factor` and rounds back to cents.
    pub fn scale(self, factor: Decimal) -> Self {
        Money::from_decimal(self.0 * factor)
    }

    /// Mean of `amounts`, or `None` for an empty slice.
    pub fn average(amounts: &[Money]) -> Option<Self> {
        if amounts.is_empty() {
            return None;
        }
        let total: Money = amounts.iter().sum();
        Some(Money::from_decimal(
            total.0 / Decimal::from(amounts.len() as u64),
        ))
    }

    /// Whole-dollar rendering with thousands separators, e.g. `$1,804`.
    pub fn to_whole_dollars(self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let digits = rounded.abs().trunc().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        if rounded < Decimal::ZERO {
            format!("-${grouped}")
        } else {
            format!("${grouped}")
        }
    }
}

/// `part / whole * 100` at two decimal places; `None` when `whole` is zero.
pub fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        return None;
    }
    Some(
        (part / whole * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
    )
}

impl From<Decimal> for Money {
    fn from(decimal: Decimal) -> Self {
        Money::from_decimal(decimal)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < Decimal::ZERO {
            write!(f, "-${:.2}", self.0.abs())
        } else {
            write!(f, "${:.2}", self.0)
        }
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn cents_round_trip() {
        assert_eq!(Money::from_cents(12345).to_cents(), 12345);
        assert_eq!(Money::from_cents(-500).to_cents(), -500);
    }

    #[test]
    fn to_cents_saturates_on_huge_amounts() {
        let huge = dec("1000000000000000000000000000");
        assert_eq!(Money::from_decimal(huge).to_cents(), i64::MAX);
        assert_eq!(Money::from_decimal(-huge).to_cents(), i64::MIN);
        assert_eq!(Money::from_decimal(dec("100000000000000000000")).to_cents(), i64::MAX);
    }

    #[test]
    fn from_decimal_rounds_to_cents() {
        assert_eq!(Money::from_decimal(dec("10.005")), Money::from_cents(1001));
        assert_eq!(Money::from_decimal(dec("433.3333")), Money::from_cents(43333));
    }

    #[test]
    fn display_negative_amount() {
        assert_eq!(Money::from_cents(-1250).to_string(), "-$12.50");
        assert_eq!(Money::from_cents(99).to_string(), "$0.99");
    }

    #[test]
    fn whole_dollars_groups_thousands() {
        assert_eq!(Money::from_cents(60000).to_whole_dollars(), "$600");
        assert_eq!(Money::from_cents(180328).to_whole_dollars(), "$1,803");
        assert_eq!(Money::from_cents(123456789).to_whole_dollars(), "$1,234,568");
        assert_eq!(Money::from_cents(-250000).to_whole_dollars(), "-$2,500");
    }

    #[test]
    fn average_of_empty_is_none() {
        assert_eq!(Money::average(&[]), None);
        assert_eq!(
            Money::average(&[Money::from_cents(10000), Money::from_cents(20000)]),
            Some(Money::from_cents(15000))
        );
    }

    #[test]
    fn percent_of_guards_zero_base() {
        assert_eq!(percent_of(dec("900"), Decimal::ZERO), None);
        assert_eq!(percent_of(dec("900"), dec("1000")), Some(dec("90")));
        assert_eq!(percent_of(dec("5000"), dec("95000")), Some(dec("5.26")));
    }

    #[test]
    fn deserializes_from_json_number() {
        let money: Money = serde_json::from_str("19.999").unwrap();
        assert_eq!(money, Money::from_cents(2000));
    }
}
