//! Pricing
//!
//! Customised meal pricing with per-category free allowances. Within a category the free units
//! are always the cheapest ones: once a selection exceeds the allowance, the most expensive
//! selected units are charged first.
//!
//! Prices are recomputed from scratch for every selection change; adding one unit can move a
//! different item from the free tier into the charged tier.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{allowances::FreeAllowanceTable, catalog::Addon};

/// Errors that can occur while calculating prices.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Quantity or price arithmetic overflowed.
    #[error("price calculation overflowed")]
    Overflow,
}

/// Multiply a unit price by a quantity.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the result does not fit in minor units.
pub fn extend_price<'a>(
    unit_price: &Money<'a, Currency>,
    quantity: u32,
) -> Result<Money<'a, Currency>, PricingError> {
    let minor = minor_units(unit_price)?
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, unit_price.currency()))
}

/// Whole minor units of `money` at its currency's exponent (pence for GBP, yen for JPY).
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the amount does not fit in an `i64`.
pub fn minor_units(money: &Money<'_, Currency>) -> Result<i64, PricingError> {
    to_minor(*money.amount(), money.currency())
}

/// Convert a decimal major-unit amount to money, rounding half away from zero to whole minor
/// units of the currency.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the amount does not fit in minor units.
pub fn money_from_decimal(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    Ok(Money::from_minor(to_minor(amount, currency)?, currency))
}

/// Major units as a decimal, scaled to the currency's exponent.
pub fn to_major(money: &Money<'_, Currency>) -> Decimal {
    money.amount().round_dp_with_strategy(
        money.currency().exponent,
        RoundingStrategy::MidpointAwayFromZero,
    )
}

fn to_minor(amount: Decimal, currency: &Currency) -> Result<i64, PricingError> {
    amount
        .checked_div(Decimal::new(1, currency.exponent))
        .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|value| value.to_i64())
        .ok_or(PricingError::Overflow)
}

/// A selected add-on and how many units of it were chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionEntry<'s, 'a> {
    /// The catalog add-on; its category decides the allowance bucket.
    pub item: &'s Addon<'a>,

    /// Number of selected units (always at least 1 inside a [`Selection`])
    pub quantity: u32,
}

/// The add-ons chosen while customising a single meal, in selection order.
#[derive(Debug, Clone, Default)]
pub struct Selection<'s, 'a> {
    entries: Vec<SelectionEntry<'s, 'a>>,
}

impl<'s, 'a> Selection<'s, 'a> {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add one unit of an add-on and return its new quantity.
    pub fn increment(&mut self, item: &'s Addon<'a>) -> u32 {
        let quantity = self.quantity_of(&item.id).saturating_add(1);

        self.set_quantity(item, quantity);

        quantity
    }

    /// Remove one unit of an add-on and return its new quantity.
    pub fn decrement(&mut self, item: &'s Addon<'a>) -> u32 {
        let quantity = self.quantity_of(&item.id).saturating_sub(1);

        self.set_quantity(item, quantity);

        quantity
    }

    /// Set an add-on's quantity. Zero removes it from the selection.
    pub fn set_quantity(&mut self, item: &'s Addon<'a>, quantity: u32) {
        let position = self.entries.iter().position(|entry| entry.item.id == item.id);

        match (position, quantity) {
            (Some(idx), 0) => {
                self.entries.remove(idx);
            }
            (Some(idx), quantity) => {
                if let Some(entry) = self.entries.get_mut(idx) {
                    entry.quantity = quantity;
                }
            }
            (None, 0) => {}
            (None, quantity) => self.entries.push(SelectionEntry { item, quantity }),
        }
    }

    /// Selected quantity of an add-on, zero if it is not selected.
    pub fn quantity_of(&self, item_id: &str) -> u32 {
        self.entries
            .iter()
            .find(|entry| entry.item.id == item_id)
            .map_or(0, |entry| entry.quantity)
    }

    /// Total units selected within a category.
    pub fn total_in_category(&self, category: &str) -> u32 {
        self.entries
            .iter()
            .filter(|entry| entry.item.category == category)
            .fold(0, |acc: u32, entry| acc.saturating_add(entry.quantity))
    }

    /// Free units still available in a category before charges apply.
    pub fn remaining_free(&self, category: &str, allowances: &FreeAllowanceTable) -> u32 {
        allowances
            .free_quantity(category)
            .saturating_sub(self.total_in_category(category))
    }

    /// The selected entries in selection order.
    pub fn entries(&self) -> &[SelectionEntry<'s, 'a>] {
        &self.entries
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every selection.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Extra charges for a single add-on category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCharge<'a> {
    /// Category key
    pub category: String,

    /// Free units included in the base price
    pub free: u32,

    /// Total units selected
    pub selected: u32,

    /// Units charged at their unit price
    pub charged_units: u32,

    /// Amount charged for the category
    pub extra: Money<'a, Currency>,
}

/// A customised meal price split into base price and per-category charges.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBreakdown<'a> {
    /// The meal's base price
    pub base_price: Money<'a, Currency>,

    /// Per-category charges in first-selected order
    pub charges: SmallVec<[CategoryCharge<'a>; 8]>,

    /// Base price plus every category charge
    pub total: Money<'a, Currency>,
}

impl<'a> PriceBreakdown<'a> {
    /// Sum of the add-on charges on top of the base price.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction fails.
    pub fn extras(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.total.sub(self.base_price)
    }
}

/// Calculates the price of a customised meal.
///
/// # Errors
///
/// - [`PricingError::Money`]: an add-on is priced in a different currency to the meal.
/// - [`PricingError::Overflow`]: quantities or prices overflowed.
pub fn customized_price<'a>(
    base_price: Money<'a, Currency>,
    selection: &[SelectionEntry<'_, 'a>],
    allowances: &FreeAllowanceTable,
) -> Result<Money<'a, Currency>, PricingError> {
    Ok(price_breakdown(base_price, selection, allowances)?.total)
}

/// Calculates a customised meal price along with its per-category charges.
///
/// # Errors
///
/// - [`PricingError::Money`]: an add-on is priced in a different currency to the meal.
/// - [`PricingError::Overflow`]: quantities or prices overflowed.
pub fn price_breakdown<'a>(
    base_price: Money<'a, Currency>,
    selection: &[SelectionEntry<'_, 'a>],
    allowances: &FreeAllowanceTable,
) -> Result<PriceBreakdown<'a>, PricingError> {
    let currency = base_price.currency();
    let mut charges = SmallVec::new();
    let mut total = base_price;

    for (category, mut entries) in group_by_category(selection) {
        let free = allowances.free_quantity(category);
        let selected = entries
            .iter()
            .try_fold(0u32, |acc, entry| acc.checked_add(entry.quantity))
            .ok_or(PricingError::Overflow)?;

        let charged_units = selected.saturating_sub(free);

        // Stable sort: equally priced items keep their selection order.
        entries.sort_by(|a, b| {
            b.item
                .price
                .to_minor_units()
                .cmp(&a.item.price.to_minor_units())
        });

        let mut remaining = charged_units;
        let mut extra = Money::from_minor(0, currency);

        for entry in entries {
            if remaining == 0 {
                break;
            }

            let units = remaining.min(entry.quantity);

            extra = extra.add(extend_price(&entry.item.price, units)?)?;
            remaining -= units;
        }

        total = total.add(extra)?;

        charges.push(CategoryCharge {
            category: category.to_string(),
            free,
            selected,
            charged_units,
            extra,
        });
    }

    Ok(PriceBreakdown {
        base_price,
        charges,
        total,
    })
}

/// Group entries by category, keeping categories in first-selected order.
fn group_by_category<'e, 's, 'a>(
    selection: &'e [SelectionEntry<'s, 'a>],
) -> SmallVec<[(&'e str, SmallVec<[&'e SelectionEntry<'s, 'a>; 8]>); 8]> {
    let mut groups: SmallVec<[(&'e str, SmallVec<[&'e SelectionEntry<'s, 'a>; 8]>); 8]> =
        SmallVec::new();

    for entry in selection.iter().filter(|entry| entry.quantity > 0) {
        let category = entry.item.category.as_str();

        match groups.iter_mut().find(|(key, _)| *key == category) {
            Some((_, entries)) => entries.push(entry),
            None => {
                let mut entries = SmallVec::new();
                entries.push(entry);
                groups.push((category, entries));
            }
        }
    }

    groups
}
