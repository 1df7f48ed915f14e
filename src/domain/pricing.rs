//! Order totals.
//!
//! Each line is rounded to cents before summation so that every client that
//! prices the same cart arrives at the same subtotal. Tax is charged on the
//! subtotal, and `total = subtotal - discount + tax`.

use bigdecimal::{BigDecimal, RoundingMode, Zero};

use super::errors::DomainError;
use super::order::{check_length, LineItem, ITEM_NAME_MAX};

const MONEY_SCALE: i64 = 2;
/// Unit prices may carry sub-cent precision; line totals never do.
pub const PRICE_SCALE: i64 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    pub subtotal: BigDecimal,
    pub tax_amount: BigDecimal,
    pub discount_amount: BigDecimal,
    pub total_amount: BigDecimal,
}

/// Amounts must stay below 10^10 to fit the stored `NUMERIC(12, 2)`.
fn money_ceiling() -> BigDecimal {
    BigDecimal::from(10_000_000_000_i64)
}

/// Round half away from zero to 2 decimal places.
pub fn round_money(value: &BigDecimal) -> BigDecimal {
    // Zero comes back from with_scale_round at scale 0.
    value
        .with_scale_round(MONEY_SCALE, RoundingMode::HalfUp)
        .with_scale(MONEY_SCALE)
}

pub fn line_total(unit_price: &BigDecimal, quantity: i32) -> BigDecimal {
    round_money(&(unit_price * &BigDecimal::from(quantity)))
}

pub fn validate_items(items: &[LineItem]) -> Result<(), DomainError> {
    if items.is_empty() {
        return Err(DomainError::validation("order must contain at least one item"));
    }
    for (idx, item) in items.iter().enumerate() {
        if item.quantity < 1 {
            return Err(DomainError::validation(format!(
                "item {} ({}): quantity must be at least 1, got {}",
                idx + 1,
                item.name,
                item.quantity
            )));
        }
        if item.unit_price < BigDecimal::zero() {
            return Err(DomainError::validation(format!(
                "item {} ({}): price must not be negative, got {}",
                idx + 1,
                item.name,
                item.unit_price
            )));
        }
        if item.unit_price.normalized().as_bigint_and_exponent().1 > PRICE_SCALE {
            return Err(DomainError::validation(format!(
                "item {} ({}): price has more than {} decimal places",
                idx + 1,
                item.name,
                PRICE_SCALE
            )));
        }
        if item.unit_price >= money_ceiling() {
            return Err(DomainError::validation(format!(
                "item {} ({}): price {} is too large",
                idx + 1,
                item.name,
                item.unit_price
            )));
        }
        if item.name.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "item {}: name must not be empty",
                idx + 1
            )));
        }
        check_length(
            &format!("item {} name", idx + 1),
            &item.display_name(),
            ITEM_NAME_MAX,
        )?;
    }
    Ok(())
}

pub fn validate_tax_rate(rate: &BigDecimal) -> Result<(), DomainError> {
    if *rate < BigDecimal::zero() || *rate >= BigDecimal::from(1) {
        return Err(DomainError::validation(format!(
            "tax rate must be a fraction in [0, 1), got {}",
            rate
        )));
    }
    Ok(())
}

/// Totals for a cart with no discount.
pub fn calculate(items: &[LineItem], tax_rate: &BigDecimal) -> Result<Totals, DomainError> {
    calculate_with_discount(items, tax_rate, &BigDecimal::zero())
}

pub fn calculate_with_discount(
    items: &[LineItem],
    tax_rate: &BigDecimal,
    discount: &BigDecimal,
) -> Result<Totals, DomainError> {
    validate_items(items)?;
    validate_tax_rate(tax_rate)?;

    let subtotal = items
        .iter()
        .fold(BigDecimal::zero(), |acc, item| acc + item.line_total());
    let subtotal = round_money(&subtotal);

    let discount_amount = round_money(discount);
    if discount_amount < BigDecimal::zero() {
        return Err(DomainError::validation(format!(
            "discount must not be negative, got {}",
            discount_amount
        )));
    }
    if discount_amount > subtotal {
        return Err(DomainError::validation(format!(
            "discount {} exceeds subtotal {}",
            discount_amount, subtotal
        )));
    }

    let tax_amount = round_money(&(&subtotal * tax_rate));
    let total_amount = round_money(&(&subtotal - &discount_amount + &tax_amount));
    if subtotal >= money_ceiling() || total_amount >= money_ceiling() {
        return Err(DomainError::validation(format!(
            "order total {} is too large",
            total_amount
        )));
    }

    Ok(Totals {
        subtotal,
        tax_amount,
        discount_amount,
        total_amount,
    })
}
