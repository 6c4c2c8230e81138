//! Currency normalization against a fetched rate table.

use crate::core::rates::RateTable;
use rust_decimal::Decimal;
use tracing::debug;

/// Converts `amount` from one currency to another using `rates`.
///
/// Conversions into or out of the table's base use a single rate; pairs
/// where neither side is the base go through the base. When a needed rate
/// is missing the amount is returned unconverted.
pub fn convert(amount: Decimal, from: &str, to: &str, rates: &RateTable) -> Decimal {
    if from == to {
        return amount;
    }

    let rate_from = if from == rates.base {
        Some(Decimal::ONE)
    } else {
        rates.rate(from)
    };
    let rate_to = if to == rates.base {
        Some(Decimal::ONE)
    } else {
        rates.rate(to)
    };

    match (rate_from, rate_to) {
        (Some(rate_from), Some(rate_to)) => {
            let converted = amount / rate_from * rate_to;
            debug!(
                "Converted {amount} from {from} to {to} via {}: {converted}",
                rates.base
            );
            converted
        }
        _ => {
            debug!("No rate for {from} -> {to} in {} table, leaving unconverted", rates.base);
            amount
        }
    }
}

/// Converts `amount` into the table's base currency.
pub fn to_base(amount: Decimal, from: &str, rates: &RateTable) -> Decimal {
    convert(amount, from, &rates.base, rates)
}
