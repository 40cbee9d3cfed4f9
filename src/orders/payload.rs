//! Order Payload
//!
//! The wire format submitted to order creation. Meal rows carry no cart-local ids; the
//! `meal_data` array pairs each line's id with its add-ons so the persistence side can link
//! add-on rows to their meal row once the meal row has a real id.

use jiff::civil::Date;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::{
    cart::{
        Cart,
        line::{CartLine, LineId, SelectedAddon},
    },
    pricing::to_major,
};

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash handed to the courier
    CashOnDelivery,

    /// Card payment
    Card,
}

/// Caller-supplied delivery and payment details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    /// Delivery address
    pub delivery_address: String,

    /// Contact phone number
    pub contact_phone: String,

    /// Payment method
    pub payment_method: PaymentMethod,

    /// Requested delivery date
    pub delivery_date: Date,
}

/// A cart line as persisted in the order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderMeal {
    /// Catalog meal id
    pub meal_id: String,

    /// Number of meals
    pub quantity: u32,

    /// Unit price
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,

    /// Quantity times unit price
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,

    /// Display name
    pub name: String,

    /// Energy in kcal
    pub calories: u32,

    /// Protein in grams
    pub protein: u32,

    /// Carbohydrates in grams
    pub carbs: u32,

    /// Fat in grams
    pub fat: u32,

    /// Free-form customisation notes
    pub customization_notes: String,
}

/// A standalone item not attached to any meal. Every add-on belongs to a meal line, so orders
/// built from a cart never contain these.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    /// Catalog item id
    pub item_id: String,

    /// Number of units
    pub quantity: u32,

    /// Unit price
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,

    /// Quantity times unit price
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

/// An add-on selected for a meal line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedItemData {
    /// Catalog add-on id
    pub item_id: String,

    /// Display name
    pub name: String,

    /// Allowance category
    pub category: String,

    /// Selected quantity
    pub quantity: u32,

    /// Unit price
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,

    /// Quantity times unit price
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

/// Links a cart line id to its add-ons.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealData {
    /// Cart-local line id
    pub temp_meal_id: LineId,

    /// Catalog meal id
    pub meal_id: String,

    /// Selected add-ons in selection order
    #[serde(rename = "selectedItems")]
    pub selected_items: Vec<SelectedItemData>,
}

/// Order creation payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPayload {
    /// Sum of line totals
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,

    /// Tax on the subtotal
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_amount: Decimal,

    /// Delivery fee
    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_fee: Decimal,

    /// Discount taken off the total
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_amount: Decimal,

    /// Amount payable
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,

    /// Delivery instructions
    pub client_instructions: String,

    /// One row per cart line
    pub order_meals: Vec<OrderMeal>,

    /// Standalone items (always empty)
    pub order_items: Vec<OrderItem>,

    /// Line id to add-on linkage
    pub meal_data: Vec<MealData>,

    /// Delivery and payment details
    #[serde(flatten)]
    pub details: OrderDetails,
}

impl OrderPayload {
    /// Build the payload for a cart. The cart is not modified.
    pub fn from_cart(cart: &Cart<'_>, details: &OrderDetails) -> Self {
        let metadata = cart.metadata();

        Self {
            subtotal: to_decimal(&metadata.subtotal()),
            tax_amount: to_decimal(&metadata.tax_amount()),
            delivery_fee: to_decimal(&metadata.delivery_fee()),
            discount_amount: to_decimal(&metadata.discount_amount()),
            total_amount: to_decimal(&metadata.total_amount()),
            client_instructions: metadata.client_instructions().to_string(),
            order_meals: cart.iter().map(OrderMeal::from).collect(),
            order_items: Vec::new(),
            meal_data: cart.iter().map(MealData::from).collect(),
            details: details.clone(),
        }
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&CartLine<'_>> for OrderMeal {
    fn from(line: &CartLine<'_>) -> Self {
        let nutrition = line.nutrition();

        Self {
            meal_id: line.meal_id().to_string(),
            quantity: line.quantity(),
            unit_price: to_decimal(line.unit_price()),
            total_price: to_decimal(line.total_price()),
            name: line.name().to_string(),
            calories: nutrition.calories,
            protein: nutrition.protein,
            carbs: nutrition.carbs,
            fat: nutrition.fat,
            customization_notes: line.notes().to_string(),
        }
    }
}

impl From<&CartLine<'_>> for MealData {
    fn from(line: &CartLine<'_>) -> Self {
        Self {
            temp_meal_id: line.id(),
            meal_id: line.meal_id().to_string(),
            selected_items: line.addons().iter().map(SelectedItemData::from).collect(),
        }
    }
}

impl From<&SelectedAddon<'_>> for SelectedItemData {
    fn from(addon: &SelectedAddon<'_>) -> Self {
        Self {
            item_id: addon.item_id().to_string(),
            name: addon.name().to_string(),
            category: addon.category().to_string(),
            quantity: addon.quantity(),
            unit_price: to_decimal(addon.unit_price()),
            total_price: to_decimal(addon.total_price()),
        }
    }
}

/// Major-unit decimal with two places.
fn to_decimal(money: &Money<'_, Currency>) -> Decimal {
    to_major(money)
}
