//! Order Metadata

use rusty_money::{Money, iso::Currency};

/// Derived order totals plus the customer's delivery instructions.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderMetadata<'a> {
    pub(crate) subtotal: Money<'a, Currency>,
    pub(crate) tax_amount: Money<'a, Currency>,
    pub(crate) delivery_fee: Money<'a, Currency>,
    pub(crate) discount_amount: Money<'a, Currency>,
    pub(crate) total_amount: Money<'a, Currency>,
    pub(crate) client_instructions: String,
}

impl<'a> OrderMetadata<'a> {
    /// Metadata for an empty cart.
    pub(crate) fn empty(delivery_fee: Money<'a, Currency>) -> Self {
        let zero = Money::from_minor(0, delivery_fee.currency());

        Self {
            subtotal: zero,
            tax_amount: zero,
            delivery_fee,
            discount_amount: zero,
            total_amount: delivery_fee,
            client_instructions: String::new(),
        }
    }

    /// Sum of line totals
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Tax on the subtotal
    pub fn tax_amount(&self) -> Money<'a, Currency> {
        self.tax_amount
    }

    /// Delivery fee
    pub fn delivery_fee(&self) -> Money<'a, Currency> {
        self.delivery_fee
    }

    /// Discount taken off the total
    pub fn discount_amount(&self) -> Money<'a, Currency> {
        self.discount_amount
    }

    /// Subtotal + tax + delivery fee - discount
    pub fn total_amount(&self) -> Money<'a, Currency> {
        self.total_amount
    }

    /// Delivery instructions, stored verbatim
    pub fn client_instructions(&self) -> &str {
        &self.client_instructions
    }
}
