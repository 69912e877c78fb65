//! Money calculation utilities using rust_decimal for precision
//!
//! All totals are computed in `Decimal` internally, then converted to `f64`
//! for storage/serialization, rounded to 2 decimal places half-up.

use rust_decimal::prelude::*;
use shared::models::SoldLine;

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Line total: unit price * quantity
pub fn line_total(price: f64, qty: i32) -> f64 {
    to_f64(to_decimal(price) * Decimal::from(qty))
}

/// Sale total over all sold lines
pub fn sale_total(lines: &[SoldLine]) -> f64 {
    let sum = lines
        .iter()
        .fold(Decimal::ZERO, |acc, line| {
            acc + to_decimal(line.price) * Decimal::from(line.qty)
        });
    to_f64(sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::ItemOptions;

    fn line(price: f64, qty: i32) -> SoldLine {
        SoldLine {
            product_id: "p".into(),
            name: "x".into(),
            price,
            qty,
            options: ItemOptions::default(),
        }
    }

    #[test]
    fn sale_total_sums_price_times_qty() {
        // (14000 * 2) + (2000 * 1) = 30000
        let lines = vec![line(14000.0, 2), line(2000.0, 1)];
        assert_eq!(sale_total(&lines), 30000.0);
    }

    #[test]
    fn decimal_path_avoids_float_drift() {
        // 0.1 + 0.2 style drift must not leak into totals
        let lines = vec![line(0.1, 3)];
        assert_eq!(sale_total(&lines), 0.3);
    }

    #[test]
    fn empty_sale_totals_zero() {
        assert_eq!(sale_total(&[]), 0.0);
        assert_eq!(line_total(9.99, 0), 0.0);
    }
}
