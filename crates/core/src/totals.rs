//! Totals
//!
//! The one totals formula shared by anonymous and authenticated carts. Gross is summed exactly in
//! minor units. Net is summed exactly in decimal and rounded once, at the aggregate, to whole minor
//! units using midpoint-away-from-zero.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use serde::Serialize;
use thiserror::Error;

use crate::lines::CartLine;

/// Errors raised while totalling a cart.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TotalsError {
    /// A line is priced in a different currency to the cart.
    #[error("line {0} is priced in {1}, expected {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// The totals do not fit in the supported range.
    #[error("cart totals overflowed")]
    Overflow,
}

/// Aggregates derived from a cart's lines. Never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals<'a> {
    gross: Money<'a, Currency>,
    net: Money<'a, Currency>,
    line_count: usize,
    unit_count: u64,
}

impl<'a> CartTotals<'a> {
    /// Totals of an empty cart.
    pub fn empty(currency: &'a Currency) -> Self {
        Self {
            gross: Money::from_minor(0, currency),
            net: Money::from_minor(0, currency),
            line_count: 0,
            unit_count: 0,
        }
    }

    /// Sum of undiscounted line prices
    pub fn gross(&self) -> &Money<'a, Currency> {
        &self.gross
    }

    /// Sum of discounted line prices
    pub fn net(&self) -> &Money<'a, Currency> {
        &self.net
    }

    /// Difference between gross and net, in minor units
    pub fn savings_minor(&self) -> i64 {
        self.gross.to_minor_units() - self.net.to_minor_units()
    }

    /// Number of distinct lines
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Total number of units across all lines
    pub fn unit_count(&self) -> u64 {
        self.unit_count
    }

    /// Serializable minor-unit summary.
    pub fn summary(&self) -> TotalsSummary {
        TotalsSummary {
            currency: self.gross.currency().iso_alpha_code,
            gross: self.gross.to_minor_units(),
            net: self.net.to_minor_units(),
            line_count: self.line_count,
            unit_count: self.unit_count,
        }
    }
}

/// Minor-unit view of [`CartTotals`], shaped identically for every cart mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TotalsSummary {
    /// ISO 4217 currency code
    pub currency: &'static str,

    /// Gross total in minor units
    pub gross: i64,

    /// Net total in minor units
    pub net: i64,

    /// Number of distinct lines
    pub line_count: usize,

    /// Total number of units
    pub unit_count: u64,
}

/// Compute the totals for a set of cart lines.
///
/// # Errors
///
/// - [`TotalsError::CurrencyMismatch`] when a line is not priced in `currency`.
/// - [`TotalsError::Overflow`] when an intermediate sum overflows.
pub fn compute_totals<'a, 'b, P, I>(
    lines: I,
    currency: &'a Currency,
) -> Result<CartTotals<'a>, TotalsError>
where
    P: 'b,
    'a: 'b,
    I: IntoIterator<Item = &'b CartLine<'a, P>>,
{
    let mut gross_minor: i64 = 0;
    let mut net_exact = Decimal::ZERO;
    let mut line_count: usize = 0;
    let mut unit_count: u64 = 0;

    for (index, line) in lines.into_iter().enumerate() {
        if line.currency() != currency {
            return Err(TotalsError::CurrencyMismatch(
                index,
                line.currency().iso_alpha_code,
                currency.iso_alpha_code,
            ));
        }

        let quantity = i64::from(line.quantity());
        let price_minor = line.unit_price().to_minor_units();

        let line_gross = price_minor
            .checked_mul(quantity)
            .ok_or(TotalsError::Overflow)?;

        gross_minor = gross_minor
            .checked_add(line_gross)
            .ok_or(TotalsError::Overflow)?;

        let line_net = Decimal::from(line_gross)
            .checked_mul(line.discount().payable_fraction())
            .ok_or(TotalsError::Overflow)?;

        net_exact = net_exact
            .checked_add(line_net)
            .ok_or(TotalsError::Overflow)?;

        line_count += 1;
        unit_count += u64::from(line.quantity().get());
    }

    let net_minor = net_exact
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(TotalsError::Overflow)?;

    Ok(CartTotals {
        gross: Money::from_minor(gross_minor, currency),
        net: Money::from_minor(net_minor, currency),
        line_count,
        unit_count,
    })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::{discounts::DiscountPercent, quantity::Quantity};

    use super::*;

    fn line(
        product: u32,
        quantity: u32,
        price: i64,
        discount: u8,
    ) -> Result<CartLine<'static, u32>, Box<dyn std::error::Error>> {
        CartLine::new(
            product,
            Quantity::new(quantity)?,
            Money::from_minor(price, GBP),
            DiscountPercent::new(discount)?,
        )
        .ok_or_else(|| "negative price".into())
    }

    #[test]
    fn empty_cart_totals_zero() -> TestResult {
        let lines: Vec<CartLine<'_, u32>> = Vec::new();
        let totals = compute_totals(&lines, GBP)?;

        assert_eq!(totals, CartTotals::empty(GBP));
        assert_eq!(totals.summary().gross, 0);
        assert_eq!(totals.summary().currency, "GBP");

        Ok(())
    }

    #[test]
    fn sums_gross_net_and_counts() -> TestResult {
        let lines = vec![line(1, 2, 1_000, 10)?, line(2, 1, 500, 0)?];
        let totals = compute_totals(&lines, GBP)?;

        assert_eq!(totals.gross(), &Money::from_minor(2_500, GBP));
        assert_eq!(totals.net(), &Money::from_minor(2_300, GBP));
        assert_eq!(totals.savings_minor(), 200);
        assert_eq!(totals.line_count(), 2);
        assert_eq!(totals.unit_count(), 3);

        Ok(())
    }

    #[test]
    fn rounds_net_once_at_the_aggregate() -> TestResult {
        // 3 lines of 1.05 at 50% off: each line is 52.5 minor units. Rounding per line would give
        // 159; rounding the exact sum of 157.5 gives 158.
        let lines = vec![line(1, 1, 105, 50)?, line(2, 1, 105, 50)?, line(3, 1, 105, 50)?];
        let totals = compute_totals(&lines, GBP)?;

        assert_eq!(totals.net().to_minor_units(), 158);

        Ok(())
    }

    #[test]
    fn rejects_lines_in_another_currency() -> TestResult {
        let usd = CartLine::new(
            1_u32,
            Quantity::ONE,
            Money::from_minor(100, USD),
            DiscountPercent::NONE,
        )
        .ok_or("negative price")?;

        let result = compute_totals(&[usd], GBP);

        assert_eq!(
            result,
            Err(TotalsError::CurrencyMismatch(0, "USD", "GBP"))
        );

        Ok(())
    }

    #[test]
    fn overflowing_gross_errors() -> TestResult {
        let lines = vec![line(1, 2, i64::MAX, 0)?];

        assert_eq!(compute_totals(&lines, GBP), Err(TotalsError::Overflow));

        Ok(())
    }
}
