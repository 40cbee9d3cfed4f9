//! Mealcart
//!
//! Mealcart is a shopping cart and pricing engine for customisable meal ordering: tiered
//! free-allowance pricing for build-your-own meals, a cart whose totals are recomputed after
//! every change, and the payload handed to order creation.

pub mod allowances;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod fixtures;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod safety;
pub mod summary;
pub mod utils;
