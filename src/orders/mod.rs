//! Orders
//!
//! Turning a cart into an order: build the payload, hand it to an [`OrderService`], and clear
//! the cart once the service has accepted it.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{Span, info, warn};

use crate::{cart::Cart, pricing::to_major};

pub mod payload;
pub mod service;

use payload::{OrderDetails, OrderPayload};
use service::{OrderRecord, OrderService, OrderServiceError};

/// Errors related to checkout.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// The order service failed; the cart was left unchanged.
    #[error(transparent)]
    Service(#[from] OrderServiceError),
}

/// Submit the cart as an order.
///
/// The cart is only cleared after the service confirms the order, so a failed attempt can be
/// retried with an identical payload.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] for an empty cart, or [`CheckoutError::Service`] if the
/// service fails.
#[tracing::instrument(
    name = "orders.checkout",
    skip_all,
    fields(lines = cart.len(), total = %cart.total(), order_id = tracing::field::Empty),
    err
)]
pub fn checkout<S>(
    cart: &mut Cart<'_>,
    details: &OrderDetails,
    service: &S,
) -> Result<OrderRecord, CheckoutError>
where
    S: OrderService + ?Sized,
{
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let payload = OrderPayload::from_cart(cart, details);
    let record = service.create_order(&payload)?;

    Span::current().record("order_id", tracing::field::display(record.id));

    if record.total_amount != payload.total_amount {
        warn!(
            charged = %record.total_amount,
            expected = %payload.total_amount,
            "order total differs from cart total"
        );
    }

    cart.clear();

    info!(status = %record.status, "order submitted");

    Ok(record)
}

/// Amount the customer would be charged for the cart, in major units.
pub fn payable(cart: &Cart<'_>) -> Decimal {
    to_major(&cart.total())
}
