//! Cart
//!
//! The cart owns its meal lines and the order totals derived from them. Every mutation runs
//! through [`Cart::update`], which applies the change to a copy of the cart, recomputes the
//! totals from scratch and only then commits, so a failed mutation leaves the previous state
//! intact and the totals never drift from the lines.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    config::CartConfig,
    pricing::{PricingError, minor_units},
};

pub mod line;
pub mod metadata;

use line::{CartLine, LineId, NewLine};
use metadata::OrderMetadata;

/// Errors related to cart mutations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CartError {
    /// The meal has no id or no name.
    #[error("meal is missing an id or a name")]
    InvalidMeal,

    /// The resolved unit price was not positive (minor units).
    #[error("meal unit price must be greater than zero, got {0} minor units")]
    InvalidPrice(i64),

    /// A quantity could not be represented.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// A discount was negative (minor units).
    #[error("discount must not be negative, got {0} minor units")]
    InvalidDiscount(i64),

    /// A price is in a different currency to the cart (price currency, cart currency).
    #[error("price has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Recomputing totals failed; the cart was left unchanged.
    #[error("failed to compute cart totals: {0}")]
    Computation(String),
}

impl From<MoneyError> for CartError {
    fn from(err: MoneyError) -> Self {
        CartError::Computation(err.to_string())
    }
}

impl From<PricingError> for CartError {
    fn from(err: PricingError) -> Self {
        CartError::Computation(err.to_string())
    }
}

/// Result of adding a meal: the new line, or why it was rejected.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum AddLineOutcome<'a> {
    /// The line was added to the cart.
    Added(CartLine<'a>),

    /// The line was rejected and the cart is unchanged.
    Rejected(CartError),
}

impl<'a> AddLineOutcome<'a> {
    /// Whether the line was added.
    pub fn is_success(&self) -> bool {
        matches!(self, AddLineOutcome::Added(_))
    }

    /// The added line, if any.
    pub fn line(&self) -> Option<&CartLine<'a>> {
        match self {
            AddLineOutcome::Added(line) => Some(line),
            AddLineOutcome::Rejected(_) => None,
        }
    }

    /// The rejection reason, if any.
    pub fn error(&self) -> Option<&CartError> {
        match self {
            AddLineOutcome::Added(_) => None,
            AddLineOutcome::Rejected(err) => Some(err),
        }
    }

    /// Convert into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason if the line was not added.
    pub fn into_result(self) -> Result<CartLine<'a>, CartError> {
        match self {
            AddLineOutcome::Added(line) => Ok(line),
            AddLineOutcome::Rejected(err) => Err(err),
        }
    }
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    lines: Vec<CartLine<'a>>,
    metadata: OrderMetadata<'a>,
    default_delivery_fee: Money<'a, Currency>,
    tax_rate: Percentage,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart with no delivery fee and no tax.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self::from_parts(Money::from_minor(0, currency), Percentage::from(Decimal::ZERO), currency)
    }

    /// Create an empty cart using the configured delivery fee and tax rate.
    #[must_use]
    pub fn with_config(config: &CartConfig<'a>) -> Self {
        Self::from_parts(config.delivery_fee, config.tax_rate, config.currency)
    }

    fn from_parts(
        delivery_fee: Money<'a, Currency>,
        tax_rate: Percentage,
        currency: &'static Currency,
    ) -> Self {
        Self {
            lines: Vec::new(),
            metadata: OrderMetadata::empty(delivery_fee),
            default_delivery_fee: delivery_fee,
            tax_rate,
            currency,
        }
    }

    /// Add a meal to the cart as a new line.
    ///
    /// Lines are never merged: adding the same meal twice creates two lines.
    pub fn add_line(&mut self, new_line: NewLine<'a>) -> AddLineOutcome<'a> {
        let meal_id = new_line.meal.id.clone();

        match self.try_add_line(new_line) {
            Ok(line) => {
                info!(line_id = %line.id(), meal_id = %meal_id, total = %line.total_price(), "added meal to cart");

                AddLineOutcome::Added(line)
            }
            Err(err) => {
                warn!(meal_id = %meal_id, error = %err, "rejected meal");

                AddLineOutcome::Rejected(err)
            }
        }
    }

    fn try_add_line(&mut self, new_line: NewLine<'a>) -> Result<CartLine<'a>, CartError> {
        let line = CartLine::build(self.fresh_line_id(), new_line, self.currency)?;
        let added = line.clone();

        self.update("add_line", |lines, _| {
            lines.push(line);

            Ok(true)
        })?;

        Ok(added)
    }

    /// Remove a line and all of its add-ons. Returns whether the line existed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Computation`] if the totals could not be recomputed.
    pub fn remove_line(&mut self, line_id: LineId) -> Result<bool, CartError> {
        self.update("remove_line", |lines, _| {
            let before = lines.len();

            lines.retain(|line| line.id() != line_id);

            Ok(lines.len() != before)
        })
    }

    /// Remove an add-on from a line. Returns whether the add-on existed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Computation`] if the totals could not be recomputed.
    pub fn remove_addon(&mut self, line_id: LineId, item_id: &str) -> Result<bool, CartError> {
        self.update("remove_addon", |lines, _| {
            Ok(find_line(lines, line_id).is_some_and(|line| line.remove_addon(item_id)))
        })
    }

    /// Set a line's quantity. Zero or negative removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if the quantity is too large, or
    /// [`CartError::Computation`] if the totals could not be recomputed.
    pub fn update_line_quantity(&mut self, line_id: LineId, quantity: i64) -> Result<bool, CartError> {
        if quantity <= 0 {
            return self.remove_line(line_id);
        }

        let quantity = to_quantity(quantity)?;

        self.update("update_line_quantity", |lines, _| {
            match find_line(lines, line_id) {
                Some(line) => line.set_quantity(quantity).map(|()| true),
                None => Ok(false),
            }
        })
    }

    /// Set an add-on's quantity. Zero or negative removes the add-on.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if the quantity is too large, or
    /// [`CartError::Computation`] if the totals could not be recomputed.
    pub fn update_addon_quantity(
        &mut self,
        line_id: LineId,
        item_id: &str,
        quantity: i64,
    ) -> Result<bool, CartError> {
        if quantity <= 0 {
            return self.remove_addon(line_id, item_id);
        }

        let quantity = to_quantity(quantity)?;

        self.update("update_addon_quantity", |lines, _| {
            match find_line(lines, line_id).and_then(|line| line.addon_mut(item_id)) {
                Some(addon) => addon.set_quantity(quantity).map(|()| true),
                None => Ok(false),
            }
        })
    }

    /// Store delivery instructions verbatim.
    pub fn set_client_instructions(&mut self, instructions: impl Into<String>) {
        self.metadata.client_instructions = instructions.into();
    }

    /// Apply a discount to the order total.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidDiscount`] for a negative amount,
    /// [`CartError::CurrencyMismatch`] for a foreign currency, or
    /// [`CartError::Computation`] if the totals could not be recomputed.
    pub fn apply_discount(&mut self, amount: Money<'a, Currency>) -> Result<(), CartError> {
        self.check_currency(&amount)?;

        let minor = minor_units(&amount)?;

        if minor < 0 {
            return Err(CartError::InvalidDiscount(minor));
        }

        if minor > self.metadata.subtotal.to_minor_units() {
            warn!(discount = %amount, subtotal = %self.metadata.subtotal, "discount exceeds subtotal");
        }

        self.update("apply_discount", |_, metadata| {
            metadata.discount_amount = amount;

            Ok(true)
        })
        .map(|_| ())
    }

    /// Replace the delivery fee.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CurrencyMismatch`] for a foreign currency, or
    /// [`CartError::Computation`] if the totals could not be recomputed.
    pub fn set_delivery_fee(&mut self, fee: Money<'a, Currency>) -> Result<(), CartError> {
        self.check_currency(&fee)?;

        self.update("set_delivery_fee", |_, metadata| {
            metadata.delivery_fee = fee;

            Ok(true)
        })
        .map(|_| ())
    }

    /// Empty the cart and reset the metadata to its defaults.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.metadata = OrderMetadata::empty(self.default_delivery_fee);

        debug!("cart cleared");
    }

    /// Look up a line by id.
    pub fn line(&self, line_id: LineId) -> Option<&CartLine<'a>> {
        self.lines.iter().find(|line| line.id() == line_id)
    }

    /// The lines in insertion order.
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Iterate over the lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine<'a>> {
        self.lines.iter()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of meals across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity())).sum()
    }

    /// Derived totals and instructions.
    pub fn metadata(&self) -> &OrderMetadata<'a> {
        &self.metadata
    }

    /// Sum of line totals.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.metadata.subtotal
    }

    /// Amount payable.
    pub fn total(&self) -> Money<'a, Currency> {
        self.metadata.total_amount
    }

    /// Tax rate applied to the subtotal.
    pub fn tax_rate(&self) -> Percentage {
        self.tax_rate
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Apply a mutation to a copy of the cart, recompute, and commit.
    ///
    /// The closure returns `Ok(false)` when nothing matched; the cart is then left untouched.
    fn update<F>(&mut self, operation: &'static str, mutate: F) -> Result<bool, CartError>
    where
        F: FnOnce(&mut Vec<CartLine<'a>>, &mut OrderMetadata<'a>) -> Result<bool, CartError>,
    {
        let mut lines = self.lines.clone();
        let mut metadata = self.metadata.clone();

        let changed = mutate(&mut lines, &mut metadata).inspect_err(|err| {
            warn!(operation, error = %err, "cart mutation failed; keeping previous state");
        })?;

        if !changed {
            debug!(operation, "no matching cart entry; cart unchanged");

            return Ok(false);
        }

        let metadata = recompute(&lines, metadata, self.tax_rate).inspect_err(|err| {
            error!(operation, error = %err, "failed to recompute cart totals; keeping previous state");
        })?;

        self.lines = lines;
        self.metadata = metadata;

        debug!(
            operation,
            lines = self.lines.len(),
            subtotal = %self.metadata.subtotal,
            total = %self.metadata.total_amount,
            "cart updated"
        );

        Ok(true)
    }

    fn fresh_line_id(&self) -> LineId {
        let mut id = LineId::generate();

        while self.line(id).is_some() {
            id = LineId::generate();
        }

        id
    }

    fn check_currency(&self, amount: &Money<'a, Currency>) -> Result<(), CartError> {
        if amount.currency() == self.currency {
            Ok(())
        } else {
            Err(CartError::CurrencyMismatch(
                amount.currency().iso_alpha_code,
                self.currency.iso_alpha_code,
            ))
        }
    }
}

fn find_line<'l, 'a>(lines: &'l mut [CartLine<'a>], line_id: LineId) -> Option<&'l mut CartLine<'a>> {
    lines.iter_mut().find(|line| line.id() == line_id)
}

fn to_quantity(quantity: i64) -> Result<u32, CartError> {
    u32::try_from(quantity).map_err(|_err| CartError::InvalidQuantity(quantity))
}

/// Derive every total from the lines and the stored fee and discount.
fn recompute<'a>(
    lines: &[CartLine<'a>],
    mut metadata: OrderMetadata<'a>,
    tax_rate: Percentage,
) -> Result<OrderMetadata<'a>, CartError> {
    let currency = metadata.delivery_fee.currency();
    let overflow = |what: &str| CartError::Computation(format!("{what} overflowed"));

    let subtotal = lines.iter().try_fold(0i64, |acc, line| {
        acc.checked_add(minor_units(line.total_price())?)
            .ok_or_else(|| overflow("subtotal"))
    })?;

    let tax_amount = percent_of_minor(tax_rate, subtotal)?;
    let delivery_fee = minor_units(&metadata.delivery_fee)?;
    let discount_amount = minor_units(&metadata.discount_amount)?;

    let total_amount = subtotal
        .checked_add(tax_amount)
        .and_then(|total| total.checked_add(delivery_fee))
        .and_then(|total| total.checked_sub(discount_amount))
        .ok_or_else(|| overflow("total"))?;

    metadata.subtotal = Money::from_minor(subtotal, currency);
    metadata.tax_amount = Money::from_minor(tax_amount, currency);
    metadata.total_amount = Money::from_minor(total_amount, currency);

    Ok(metadata)
}

/// Calculate a percentage of a minor unit amount, rounding half away from zero.
fn percent_of_minor(percent: Percentage, minor: i64) -> Result<i64, CartError> {
    let rate = percent * Decimal::ONE;

    rate.checked_mul(Decimal::from(minor))
        .map(|applied| applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_i64())
        .ok_or_else(|| CartError::Computation(format!("tax on {minor} minor units overflowed")))
}
